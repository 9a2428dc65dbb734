//! Prediction handler

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use groundwater_core::{FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: &'static str,
}

/// Pull the layout features out of the request body, in layout order.
/// Fields outside the layout are ignored.
fn feature_vector(body: &HashMap<String, Value>) -> AppResult<FeatureVector> {
    let mut vector = [0.0; FEATURE_COUNT];
    let mut missing = Vec::new();

    for (slot, name) in vector.iter_mut().zip(FEATURE_LAYOUT.iter()) {
        match body.get(*name).and_then(Value::as_f64) {
            Some(value) => *slot = value,
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(AppError::MissingFeatures(missing));
    }
    Ok(vector)
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<HashMap<String, Value>>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(body) = payload?;
    let features = feature_vector(&body)?;

    let label = state.model.predict(&features);
    tracing::debug!("Prediction: {}", label);

    Ok(Json(PredictResponse {
        prediction: label.as_str(),
    }))
}
