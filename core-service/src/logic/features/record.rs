//! Measurement Record - one groundwater sample keyed by feature name
//!
//! Three states per feature:
//! - absent (`get` returns `None`): the feature was never measured/has no column
//! - missing (`get` returns `Some(None)`): the column exists but the cell is empty or NaN
//! - present (`get` returns `Some(Some(v))`)

use std::collections::BTreeMap;

use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT};

/// Feature values in FEATURE_LAYOUT order
pub type FeatureVector = [f64; FEATURE_COUNT];

/// A required feature was absent or not a number
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required feature: {0}")]
pub struct MissingFeature(pub &'static str);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementRecord {
    values: BTreeMap<String, Option<f64>>,
}

impl MeasurementRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a complete record from a layout-ordered vector
    pub fn from_vector(vector: &FeatureVector) -> Self {
        let mut record = Self::new();
        for (name, value) in FEATURE_LAYOUT.iter().zip(vector.iter()) {
            record.set(*name, *value);
        }
        record
    }

    /// Set a value; NaN is stored as missing
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let value = if value.is_nan() { None } else { Some(value) };
        self.values.insert(name.into(), value);
    }

    /// Mark a feature as present but missing
    pub fn set_missing(&mut self, name: impl Into<String>) {
        self.values.insert(name.into(), None);
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_missing(mut self, name: impl Into<String>) -> Self {
        self.set_missing(name);
        self
    }

    /// `None` when absent, `Some(None)` when missing
    pub fn get(&self, name: &str) -> Option<Option<f64>> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Extract the layout-ordered vector used for inference.
    /// Every layout feature must be present with a numeric value.
    pub fn to_feature_vector(&self) -> Result<FeatureVector, MissingFeature> {
        let mut vector = [0.0; FEATURE_COUNT];
        for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
            vector[i] = self
                .get(name)
                .flatten()
                .ok_or(MissingFeature(name))?;
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_vs_missing() {
        let record = MeasurementRecord::new()
            .with("pH", 7.0)
            .with_missing("TDS")
            .with("lead", f64::NAN);

        assert_eq!(record.get("pH"), Some(Some(7.0)));
        assert_eq!(record.get("TDS"), Some(None));
        assert_eq!(record.get("lead"), Some(None));
        assert_eq!(record.get("nitrate"), None);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_vector_round_trip() {
        let vector: FeatureVector = [7.0, 300.0, 1.0, 10.0, 0.001, 0.001, 0.5, 150.0, 20.0, 800.0, 0.0];
        let record = MeasurementRecord::from_vector(&vector);
        assert_eq!(record.to_feature_vector().unwrap(), vector);
    }

    #[test]
    fn test_vector_reports_first_missing_feature() {
        let record = MeasurementRecord::new().with("pH", 7.0);
        assert_eq!(record.to_feature_vector(), Err(MissingFeature("TDS")));
    }
}
