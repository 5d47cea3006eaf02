// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fixed catalog of bookable session categories and prepaid packages.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single-session category with its price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SessionCategory {
    pub name: &'static str,
    /// Price in whole rupees
    pub price: u32,
    pub description: &'static str,
}

/// A prepaid package of sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PackageOffer {
    pub id: &'static str,
    pub name: &'static str,
    /// Price in whole rupees
    pub price: u32,
    pub total_sessions: u32,
    pub validity_days: u32,
}

pub const SESSION_CATEGORIES: &[SessionCategory] = &[
    SessionCategory {
        name: "Personal Training",
        price: 299,
        description: "One-on-one workout tailored to your level",
    },
    SessionCategory {
        name: "Pro Training",
        price: 399,
        description: "Advanced strength and conditioning with a senior trainer",
    },
    SessionCategory {
        name: "Yoga & Mobility",
        price: 299,
        description: "Flexibility, breathing and joint mobility",
    },
    SessionCategory {
        name: "Weight Loss",
        price: 349,
        description: "Fat-loss focused circuit training",
    },
    SessionCategory {
        name: "Senior Fitness",
        price: 299,
        description: "Low-impact strength and balance for older adults",
    },
];

pub const PACKAGE_OFFERS: &[PackageOffer] = &[
    PackageOffer {
        id: "starter-4",
        name: "Starter Pack",
        price: 1399,
        total_sessions: 4,
        validity_days: 30,
    },
    PackageOffer {
        id: "transform-12",
        name: "Transform Pack",
        price: 3999,
        total_sessions: 12,
        validity_days: 60,
    },
    PackageOffer {
        id: "elite-24",
        name: "Elite Pack",
        price: 7499,
        total_sessions: 24,
        validity_days: 90,
    },
];

/// Look up a session category by exact name.
pub fn find_category(name: &str) -> Option<&'static SessionCategory> {
    SESSION_CATEGORIES.iter().find(|c| c.name == name)
}

/// Look up a package offer by ID.
pub fn find_package(id: &str) -> Option<&'static PackageOffer> {
    PACKAGE_OFFERS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pro_training_price() {
        assert_eq!(find_category("Pro Training").map(|c| c.price), Some(399));
    }

    #[test]
    fn test_unknown_lookups() {
        assert!(find_category("pro training").is_none());
        assert!(find_package("gold").is_none());
    }
}
