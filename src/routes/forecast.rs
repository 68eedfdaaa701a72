use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::forecast::{self, ForecastOutcome, HistoricalRevenue};
use crate::data::types::{ForecastPoint, TrendDirection};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub restaurant_id: i64,
    pub historical_data: Vec<HistoricalRevenue>,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
}

fn default_forecast_days() -> u32 {
    30
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub restaurant_id: i64,
    pub forecast_points: Vec<ForecastPoint>,
    pub model_accuracy: f64,
    pub trend_direction: TrendDirection,
    pub analysis_timestamp: DateTime<Utc>,
}

/// Fit a linear trend over the supplied revenue history and project it
/// forward. Unlike the correlation path there is no safe fallback for a
/// degenerate fit, so short or malformed history fails loudly with 400.
pub async fn forecast_handler(
    State(_state): State<Arc<AppState>>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>, (StatusCode, String)> {
    match forecast::forecast_revenue(&request.historical_data, request.forecast_days) {
        ForecastOutcome::Forecast { points, accuracy, trend } => Ok(Json(ForecastResponse {
            restaurant_id: request.restaurant_id,
            forecast_points: points,
            model_accuracy: accuracy,
            trend_direction: trend,
            analysis_timestamp: Utc::now(),
        })),
        ForecastOutcome::InsufficientData => Err((
            StatusCode::BAD_REQUEST,
            "Insufficient data for forecasting. Need at least 7 days of historical data."
                .to_string(),
        )),
        ForecastOutcome::InvalidData => Err((
            StatusCode::BAD_REQUEST,
            "Historical data records must include date and total_revenue fields.".to_string(),
        )),
    }
}
