//! Threshold Types
//!
//! Core types for safety labeling. No logic here, only data structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// SAFETY LABEL
// ============================================================================

/// Binary ground-truth label, encoded 0 (Unsafe) / 1 (Safe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SafetyLabel {
    Unsafe,
    Safe,
}

impl SafetyLabel {
    pub fn from_safe(safe: bool) -> Self {
        if safe {
            SafetyLabel::Safe
        } else {
            SafetyLabel::Unsafe
        }
    }

    pub fn encoded(&self) -> u8 {
        match self {
            SafetyLabel::Unsafe => 0,
            SafetyLabel::Safe => 1,
        }
    }

    /// Response string served by the prediction endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyLabel::Unsafe => "Unsafe",
            SafetyLabel::Safe => "Safe",
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, SafetyLabel::Safe)
    }
}

impl std::fmt::Display for SafetyLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// VIOLATIONS (diagnostics)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Value empty or NaN
    Missing,
    BelowMinimum { low: f64 },
    AboveMaximum { high: f64 },
}

/// Why a single feature failed its range check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub feature: String,
    pub value: Option<f64>,
    pub kind: ViolationKind,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind, self.value) {
            (ViolationKind::Missing, _) => write!(f, "{}: missing", self.feature),
            (ViolationKind::BelowMinimum { low }, Some(v)) => {
                write!(f, "{}: {} < {}", self.feature, v, low)
            }
            (ViolationKind::AboveMaximum { high }, Some(v)) => {
                write!(f, "{}: {} > {}", self.feature, v, high)
            }
            (_, None) => write!(f, "{}: out of range", self.feature),
        }
    }
}
