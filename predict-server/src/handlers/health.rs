//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use groundwater_core::logic::features::LayoutInfo;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model: String,
    inference_count: u64,
    layout: LayoutInfo,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.model.status();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: engine.model_name,
        inference_count: engine.inference_count,
        layout: LayoutInfo::current(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
