//! Threshold Rule Engine
//!
//! Pure functions only: no I/O, no global state. The table is always passed in.
//! Input: MeasurementRecord + ThresholdTable
//! Output: safe / unsafe

use crate::logic::features::MeasurementRecord;

use super::rules::ThresholdTable;
use super::types::{SafetyLabel, Violation, ViolationKind};

/// `true` iff every feature present in both the record and the table is in range.
///
/// - A present-but-missing value (empty cell / NaN) makes the whole record unsafe.
/// - Features absent from the record are skipped, so a record with none of the
///   table's features is vacuously safe.
pub fn evaluate(record: &MeasurementRecord, thresholds: &ThresholdTable) -> bool {
    for (feature, range) in thresholds.iter() {
        match record.get(feature) {
            None => continue,
            Some(None) => return false,
            Some(Some(value)) => {
                if !range.contains(value) {
                    return false;
                }
            }
        }
    }
    true
}

pub fn classify(record: &MeasurementRecord, thresholds: &ThresholdTable) -> SafetyLabel {
    SafetyLabel::from_safe(evaluate(record, thresholds))
}

/// Every failing feature, in table order. Empty iff `evaluate` is `true`.
pub fn violations(record: &MeasurementRecord, thresholds: &ThresholdTable) -> Vec<Violation> {
    let mut found = Vec::new();

    for (feature, range) in thresholds.iter() {
        let value = match record.get(feature) {
            None => continue,
            Some(value) => value,
        };

        let kind = match value {
            None => Some(ViolationKind::Missing),
            Some(v) => match (range.low, range.high) {
                (Some(low), _) if v < low => Some(ViolationKind::BelowMinimum { low }),
                (_, Some(high)) if v > high => Some(ViolationKind::AboveMaximum { high }),
                _ => None,
            },
        };

        if let Some(kind) = kind {
            found.push(Violation {
                feature: feature.to_string(),
                value,
                kind,
            });
        }
    }

    found
}

// ============================================================================
// TESTS
// ============================================================================
