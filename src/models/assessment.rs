// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Client assessment questionnaire.
//!
//! An assessment is filled once by a trainer. As soon as any medical
//! condition is recorded (including an explicit "None") it is locked and
//! becomes read-only for every later visit.
//!
//! Updates go through typed, per-section helpers that consume the value and
//! return the updated one, instead of path-based edits over untyped JSON.

use serde::{Deserialize, Serialize};

/// Full assessment stored on the client profile (`latestAssessment`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssessmentData {
    pub health: HealthHistory,
    pub measurements: BodyMeasurements,
    pub evaluation: TrainerEvaluation,
    pub goals: FitnessGoals,
    /// Trainer who filled the assessment
    pub assessed_by: String,
    /// When it was saved (ISO 8601)
    pub assessed_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthHistory {
    /// Any entry here locks the assessment.
    pub medical_conditions: Vec<String>,
    pub medications: String,
    pub injuries: String,
    pub surgeries: String,
    pub lifestyle: Lifestyle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lifestyle {
    pub smoking: bool,
    pub alcohol: String,
    pub sleep_hours: Option<f64>,
    /// 1 (low) to 5 (high)
    pub stress_level: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyMeasurements {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub chest_cm: Option<f64>,
    pub waist_cm: Option<f64>,
    pub hips_cm: Option<f64>,
    pub arms_cm: Option<f64>,
    pub thighs_cm: Option<f64>,
    pub resting_heart_rate: Option<u32>,
    pub blood_pressure: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainerEvaluation {
    pub posture: String,
    pub flexibility: String,
    pub strength: String,
    pub endurance: String,
    pub balance: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FitnessGoals {
    pub primary_goal: String,
    pub secondary_goals: Vec<String>,
    pub target_weight_kg: Option<f64>,
    pub timeline_weeks: Option<u32>,
    pub motivation: String,
}

/// One section of the questionnaire, replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", content = "value", rename_all = "snake_case")]
pub enum AssessmentSection {
    Health(HealthHistory),
    Measurements(BodyMeasurements),
    Evaluation(TrainerEvaluation),
    Goals(FitnessGoals),
}

impl AssessmentData {
    /// Locked once any medical condition has been recorded.
    pub fn is_locked(&self) -> bool {
        !self.health.medical_conditions.is_empty()
    }

    pub fn with_health(self, f: impl FnOnce(HealthHistory) -> HealthHistory) -> Self {
        Self {
            health: f(self.health),
            ..self
        }
    }

    pub fn with_measurements(
        self,
        f: impl FnOnce(BodyMeasurements) -> BodyMeasurements,
    ) -> Self {
        Self {
            measurements: f(self.measurements),
            ..self
        }
    }

    pub fn with_evaluation(self, f: impl FnOnce(TrainerEvaluation) -> TrainerEvaluation) -> Self {
        Self {
            evaluation: f(self.evaluation),
            ..self
        }
    }

    pub fn with_goals(self, f: impl FnOnce(FitnessGoals) -> FitnessGoals) -> Self {
        Self {
            goals: f(self.goals),
            ..self
        }
    }

    /// Replace one section.
    pub fn apply(self, section: AssessmentSection) -> Self {
        match section {
            AssessmentSection::Health(health) => self.with_health(|_| health),
            AssessmentSection::Measurements(m) => self.with_measurements(|_| m),
            AssessmentSection::Evaluation(e) => self.with_evaluation(|_| e),
            AssessmentSection::Goals(g) => self.with_goals(|_| g),
        }
    }

    /// Stamp who saved the assessment and when.
    pub fn signed(self, trainer_name: &str, at: &str) -> Self {
        Self {
            assessed_by: trainer_name.to_string(),
            assessed_at: at.to_string(),
            ..self
        }
    }
}

impl HealthHistory {
    /// Add a condition, ignoring blanks and case-insensitive duplicates.
    pub fn with_condition(mut self, condition: &str) -> Self {
        let condition = condition.trim();
        if !condition.is_empty()
            && !self
                .medical_conditions
                .iter()
                .any(|c| c.eq_ignore_ascii_case(condition))
        {
            self.medical_conditions.push(condition.to_string());
        }
        self
    }
}
