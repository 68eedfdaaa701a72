use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::analytics::correlation;
use crate::data::types::{CorrelationMethod, CorrelationPair, DEFAULT_METRICS};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CorrelationRequest {
    pub restaurant_id: i64,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
    #[serde(default, rename = "correlation_type")]
    pub method: CorrelationMethod,
}

#[derive(Debug, Serialize)]
pub struct CorrelationResponse {
    pub restaurant_id: i64,
    pub correlations: Vec<CorrelationPair>,
    pub total_data_points: usize,
    pub analysis_timestamp: DateTime<Utc>,
}

/// Correlate the requested operational metrics against revenue. Always
/// answers with a result set: degraded upstream conditions produce mock
/// correlations instead of an error.
pub async fn correlation_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CorrelationRequest>,
) -> Result<Json<CorrelationResponse>, (StatusCode, String)> {
    let metrics = request
        .metrics
        .unwrap_or_else(|| DEFAULT_METRICS.iter().map(|m| m.to_string()).collect());

    let mut rng = StdRng::from_entropy();
    let analysis = correlation::analyze_revenue_correlations(
        state.provider.as_ref(),
        request.restaurant_id,
        &metrics,
        request.method,
        state.window_days,
        &mut rng,
    )
    .await;

    Ok(Json(CorrelationResponse {
        restaurant_id: request.restaurant_id,
        total_data_points: analysis.pairs.len(),
        correlations: analysis.pairs,
        analysis_timestamp: Utc::now(),
    }))
}
