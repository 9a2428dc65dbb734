//! Acceptable Ranges per Measurement
//!
//! Drinking-water limits used to derive the ground-truth label.
//! Constants and table only, the check itself lives in `engine`.

use serde::{Deserialize, Serialize};

// ============================================================================
// LIMITS (fixed at compile time)
// ============================================================================

pub const PH_MIN: f64 = 6.5;
pub const PH_MAX: f64 = 8.5;

/// mg/L
pub const TDS_MAX: f64 = 500.0;
/// NTU
pub const TURBIDITY_MAX: f64 = 5.0;
/// mg/L
pub const NITRATE_MAX: f64 = 50.0;
/// mg/L
pub const ARSENIC_MAX: f64 = 0.01;
/// mg/L
pub const LEAD_MAX: f64 = 0.01;
/// mg/L
pub const FLUORIDE_MAX: f64 = 1.5;
/// mg/L as CaCO3
pub const HARDNESS_MAX: f64 = 300.0;
/// °C
pub const TEMPERATURE_MAX: f64 = 35.0;
/// µS/cm
pub const EC_MAX: f64 = 1500.0;

/// Any coliform count above zero is unsafe
pub const COLIFORM_MIN: f64 = 0.0;
pub const COLIFORM_MAX: f64 = 0.0;

// ============================================================================
// RANGE
// ============================================================================

/// Inclusive range; `None` means unbounded on that side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl ThresholdRange {
    pub const fn between(low: f64, high: f64) -> Self {
        Self { low: Some(low), high: Some(high) }
    }

    pub const fn at_most(high: f64) -> Self {
        Self { low: None, high: Some(high) }
    }

    pub const fn at_least(low: f64) -> Self {
        Self { low: Some(low), high: None }
    }

    /// Both bounds inclusive. NaN never passes.
    pub fn contains(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        if let Some(low) = self.low {
            if value < low {
                return false;
            }
        }
        if let Some(high) = self.high {
            if value > high {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// Ordered feature → range table, shared read-only by every labeling call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    entries: Vec<(String, ThresholdRange)>,
}

impl ThresholdTable {
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = (S, ThresholdRange)>) -> Self {
        Self {
            entries: entries.into_iter().map(|(name, range)| (name.into(), range)).collect(),
        }
    }

    /// The groundwater limits
    pub fn groundwater() -> Self {
        Self::new([
            ("pH", ThresholdRange::between(PH_MIN, PH_MAX)),
            ("TDS", ThresholdRange::at_most(TDS_MAX)),
            ("turbidity", ThresholdRange::at_most(TURBIDITY_MAX)),
            ("nitrate", ThresholdRange::at_most(NITRATE_MAX)),
            ("arsenic", ThresholdRange::at_most(ARSENIC_MAX)),
            ("lead", ThresholdRange::at_most(LEAD_MAX)),
            ("fluoride", ThresholdRange::at_most(FLUORIDE_MAX)),
            ("hardness", ThresholdRange::at_most(HARDNESS_MAX)),
            ("temperature", ThresholdRange::at_most(TEMPERATURE_MAX)),
            ("EC", ThresholdRange::at_most(EC_MAX)),
            ("coliform", ThresholdRange::between(COLIFORM_MIN, COLIFORM_MAX)),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ThresholdRange)> {
        self.entries.iter().map(|(name, range)| (name.as_str(), range))
    }

    pub fn get(&self, feature: &str) -> Option<&ThresholdRange> {
        self.entries
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, range)| range)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::groundwater()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_LAYOUT;

    #[test]
    fn test_table_covers_layout_in_order() {
        let table = ThresholdTable::groundwater();
        let names: Vec<&str> = table.features().collect();
        assert_eq!(names, FEATURE_LAYOUT);
    }

    #[test]
    fn test_range_inclusive() {
        let ph = ThresholdRange::between(PH_MIN, PH_MAX);
        assert!(ph.contains(6.5));
        assert!(ph.contains(8.5));
        assert!(!ph.contains(6.49));
        assert!(!ph.contains(8.51));
        assert!(!ph.contains(f64::NAN));
    }

    #[test]
    fn test_unbounded_sides() {
        assert!(ThresholdRange::at_most(5.0).contains(-100.0));
        assert!(ThresholdRange::at_least(0.0).contains(1e12));
        assert!(!ThresholdRange::at_least(0.0).contains(-0.1));
    }

    #[test]
    fn test_lookup() {
        let table = ThresholdTable::default();
        assert_eq!(table.get("coliform"), Some(&ThresholdRange::between(0.0, 0.0)));
        assert_eq!(table.get("salinity"), None);
        assert_eq!(table.len(), 11);
    }
}
