//! Candidate diagnoses proposed by the image classifier or the text predictor.

use serde::{Deserialize, Serialize};

/// A single proposed diagnosis with its confidence.
///
/// Serialised as `{"disease": ..., "score": ...}`, the shape exchanged with
/// the text-generation service and the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "disease", alias = "label")]
    pub label: String,
    #[serde(rename = "score", alias = "confidence")]
    pub confidence: f32,
}

impl Candidate {
    /// Build a candidate, clamping the confidence into `[0, 1]`.
    ///
    /// NaN is treated as zero confidence.
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Build a candidate only if `confidence` already lies in `[0, 1]`.
    pub fn checked(label: impl Into<String>, confidence: f32) -> Option<Self> {
        if (0.0..=1.0).contains(&confidence) {
            Some(Self {
                label: label.into(),
                confidence,
            })
        } else {
            None
        }
    }
}

/// Round a probability to two decimal places.
pub fn round2(p: f32) -> f32 {
    (p * 100.0).round() / 100.0
}

/// Render candidates as pretty JSON for inclusion in a prompt.
pub fn candidates_json(candidates: &[Candidate]) -> String {
    serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".to_string())
}
