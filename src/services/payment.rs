// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Payment bridge for the client-side checkout widget.
//!
//! The API never talks to the gateway itself. It hands the client a
//! checkout request to open the widget with, and later receives the widget's
//! callback outcome.
//!
//! The payment ID in a success callback is trusted as-is. There is no
//! server-side signature verification before paid state is persisted.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Contact details prefilled in the checkout widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckoutPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Everything the client needs to open the checkout widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckoutRequest {
    /// Publishable gateway key
    pub key: String,
    /// Amount in minor currency units (paise)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub amount: u64,
    pub currency: String,
    /// Merchant name
    pub name: String,
    pub description: String,
    pub prefill: CheckoutPrefill,
    /// Opaque reference echoed back in gateway dashboards
    pub notes: CheckoutNotes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckoutNotes {
    pub wizard_id: String,
    pub user_id: String,
}

/// Callback outcome reported by the checkout widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PaymentOutcome {
    Success { payment_id: String },
    Failed { reason: String },
    Dismissed,
    InitFailed { reason: String },
}

/// Why a payment did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment gateway failed to initialize: {0}")]
    GatewayUnavailable(String),

    #[error("Payment failed: {0}")]
    Failed(String),

    #[error("Payment was cancelled")]
    Dismissed,
}

impl PaymentError {
    /// Stable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::GatewayUnavailable(_) => "payment_gateway_unavailable",
            PaymentError::Failed(_) => "payment_failed",
            PaymentError::Dismissed => "payment_dismissed",
        }
    }
}

/// Builds checkout requests and classifies callbacks.
#[derive(Debug, Clone)]
pub struct PaymentBridge {
    key_id: String,
    currency: String,
    merchant_name: String,
}

impl PaymentBridge {
    pub fn new(key_id: &str, currency: &str, merchant_name: &str) -> Self {
        Self {
            key_id: key_id.to_string(),
            currency: currency.to_string(),
            merchant_name: merchant_name.to_string(),
        }
    }

    /// Build a checkout request for a price in whole rupees.
    pub fn checkout(
        &self,
        price: u32,
        description: &str,
        prefill: CheckoutPrefill,
        notes: CheckoutNotes,
    ) -> CheckoutRequest {
        CheckoutRequest {
            key: self.key_id.clone(),
            amount: to_minor_units(price),
            currency: self.currency.clone(),
            name: self.merchant_name.clone(),
            description: description.to_string(),
            prefill,
            notes,
        }
    }

    /// Turn a widget callback into the payment ID or a payment error.
    pub fn resolve(&self, outcome: PaymentOutcome) -> Result<String, PaymentError> {
        match outcome {
            PaymentOutcome::Success { payment_id } => {
                let payment_id = payment_id.trim();
                if payment_id.is_empty() {
                    Err(PaymentError::Failed(
                        "gateway reported success without a payment id".to_string(),
                    ))
                } else {
                    Ok(payment_id.to_string())
                }
            }
            PaymentOutcome::Failed { reason } => Err(PaymentError::Failed(reason)),
            PaymentOutcome::Dismissed => Err(PaymentError::Dismissed),
            PaymentOutcome::InitFailed { reason } => Err(PaymentError::GatewayUnavailable(reason)),
        }
    }
}

/// Rupees to paise.
pub fn to_minor_units(price: u32) -> u64 {
    u64::from(price) * 100
}
