//! Standard Scaler - per-feature z-score, fit on training rows only

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::pipeline::TrainingFailure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    /// Population std; 1.0 for constant features
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: ArrayView2<f64>) -> Result<Self, TrainingFailure> {
        if x.nrows() == 0 {
            return Err(TrainingFailure::EmptyTrainingSet);
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or(TrainingFailure::EmptyTrainingSet)?;
        let scale: Vec<f64> = x
            .std_axis(Axis(0), 0.0)
            .iter()
            .map(|&s| if s > 0.0 && s.is_finite() { s } else { 1.0 })
            .collect();

        if mean.iter().any(|m| !m.is_finite()) {
            return Err(TrainingFailure::NumericalInstability(
                "non-finite feature mean".to_string(),
            ));
        }

        Ok(Self {
            mean: mean.to_vec(),
            scale,
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let mut out = x.to_owned();
        for mut row in out.rows_mut() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (*value - self.mean[j]) / self.scale[j];
            }
        }
        out
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Vec<f64> {
        row.iter()
            .enumerate()
            .map(|(j, v)| (v - self.mean[j]) / self.scale[j])
            .collect()
    }
}
