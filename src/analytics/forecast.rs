//! Linear-trend revenue forecasting with a symmetric confidence band.

use chrono::Duration;
use serde::Deserialize;

use crate::analytics::align;
use crate::analytics::stats;
use crate::data::types::{ForecastPoint, TrendDirection};

pub const MIN_HISTORY_POINTS: usize = 7;

/// Daily slope (currency units/day) beyond which the trend counts as
/// moving rather than stable. Fixed design constant.
const TREND_SLOPE_THRESHOLD: f64 = 50.0;

/// ~95% band under a normality assumption on residuals.
const CONFIDENCE_Z: f64 = 1.96;

/// Historical revenue record as supplied by the caller. Fields are
/// optional so a malformed record surfaces as `InvalidData` rather than
/// a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalRevenue {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total_revenue: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Forecast {
        points: Vec<ForecastPoint>,
        accuracy: f64,
        trend: TrendDirection,
    },
    /// Fewer than `MIN_HISTORY_POINTS` records; a trend fit on less than
    /// a week of data is not meaningful.
    InsufficientData,
    /// Records missing the date or revenue field, or with an
    /// unparseable date.
    InvalidData,
}

/// Fit an OLS line over day offsets and project `forecast_days` future
/// points. Accuracy is R² floored at zero; the band half-width is
/// 1.96 x the population residual standard deviation.
pub fn forecast_revenue(history: &[HistoricalRevenue], forecast_days: u32) -> ForecastOutcome {
    if history.len() < MIN_HISTORY_POINTS {
        return ForecastOutcome::InsufficientData;
    }

    let mut series = Vec::with_capacity(history.len());
    for record in history {
        let (Some(raw_date), Some(amount)) = (&record.date, record.total_revenue) else {
            return ForecastOutcome::InvalidData;
        };
        let Some(date) = align::parse_date(raw_date) else {
            return ForecastOutcome::InvalidData;
        };
        series.push((date, amount));
    }
    series.sort_by_key(|(date, _)| *date);

    let start = series[0].0;
    let days: Vec<f64> = series
        .iter()
        .map(|(date, _)| (*date - start).num_days() as f64)
        .collect();
    let revenue: Vec<f64> = series.iter().map(|(_, amount)| *amount).collect();

    let (slope, intercept) = ols_fit(&days, &revenue);

    let residuals: Vec<f64> = days
        .iter()
        .zip(revenue.iter())
        .map(|(day, actual)| actual - (intercept + slope * day))
        .collect();
    let accuracy = r_squared(&revenue, &residuals).max(0.0);

    let trend = if slope > TREND_SLOPE_THRESHOLD {
        TrendDirection::Up
    } else if slope < -TREND_SLOPE_THRESHOLD {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    // Population (not sample-corrected) residual spread.
    let variance = residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64;
    let margin = CONFIDENCE_Z * variance.sqrt();

    let last_day = days[days.len() - 1];
    let mut points = Vec::with_capacity(forecast_days as usize);
    for i in 1..=i64::from(forecast_days) {
        let future_day = last_day + i as f64;
        let date = start + Duration::days(future_day as i64);
        let raw = intercept + slope * future_day;

        // Revenue cannot go negative; the upper bound stays unclamped as
        // a documented linear-model artifact.
        points.push(ForecastPoint {
            date: date.format("%Y-%m-%d").to_string(),
            predicted_value: raw.max(0.0),
            confidence_interval_lower: (raw - margin).max(0.0),
            confidence_interval_upper: raw + margin,
        });
    }

    ForecastOutcome::Forecast { points, accuracy, trend }
}

/// Ordinary least squares: returns (slope, intercept).
fn ols_fit(x: &[f64], y: &[f64]) -> (f64, f64) {
    let mx = stats::mean(x);
    let my = stats::mean(y);

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        sxx += (xi - mx) * (xi - mx);
        sxy += (xi - mx) * (yi - my);
    }

    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    (slope, my - slope * mx)
}

fn r_squared(actual: &[f64], residuals: &[f64]) -> f64 {
    let mean = stats::mean(actual);
    let ss_tot: f64 = actual.iter().map(|y| (y - mean) * (y - mean)).sum();
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();

    if ss_tot <= f64::EPSILON {
        // Constant history: a flat fit either explains it perfectly or
        // not at all.
        return if ss_res <= f64::EPSILON { 1.0 } else { 0.0 };
    }

    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, revenue: f64) -> HistoricalRevenue {
        HistoricalRevenue {
            date: Some(format!("2024-01-{:02}", day)),
            total_revenue: Some(revenue),
        }
    }

    #[test]
    fn test_perfect_line_forecast() {
        // 7 days at +100/day starting from 1000
        let history: Vec<_> = (0..7).map(|i| record(i + 1, 1000.0 + 100.0 * i as f64)).collect();

        let ForecastOutcome::Forecast { points, accuracy, trend } =
            forecast_revenue(&history, 5)
        else {
            panic!("expected a forecast");
        };

        assert!((accuracy - 1.0).abs() < 1e-9);
        assert_eq!(trend, TrendDirection::Up);
        assert_eq!(points.len(), 5);

        for (i, point) in points.iter().enumerate() {
            // Last observed day offset is 6; extrapolate from there
            let expected = 1000.0 + 100.0 * (7 + i) as f64;
            assert!((point.predicted_value - expected).abs() < 1e-6);
            // Zero residuals -> zero band width
            assert!((point.confidence_interval_lower - expected).abs() < 1e-6);
            assert!((point.confidence_interval_upper - expected).abs() < 1e-6);
        }
        assert_eq!(points[0].date, "2024-01-08");
    }

    #[test]
    fn test_insufficient_history() {
        let history: Vec<_> = (0..6).map(|i| record(i + 1, 1000.0)).collect();
        assert_eq!(forecast_revenue(&history, 30), ForecastOutcome::InsufficientData);
    }

    #[test]
    fn test_invalid_record_shape() {
        let mut history: Vec<_> = (0..7).map(|i| record(i + 1, 1000.0)).collect();
        history[3].total_revenue = None;
        assert_eq!(forecast_revenue(&history, 30), ForecastOutcome::InvalidData);

        let mut history: Vec<_> = (0..7).map(|i| record(i + 1, 1000.0)).collect();
        history[0].date = Some("garbage".to_string());
        assert_eq!(forecast_revenue(&history, 30), ForecastOutcome::InvalidData);
    }

    #[test]
    fn test_negative_projection_clamped() {
        // Steep decline: projections go below zero quickly
        let history: Vec<_> = (0..7).map(|i| record(i + 1, 700.0 - 100.0 * i as f64)).collect();

        let ForecastOutcome::Forecast { points, trend, .. } = forecast_revenue(&history, 10)
        else {
            panic!("expected a forecast");
        };

        assert_eq!(trend, TrendDirection::Down);
        for point in &points {
            assert!(point.predicted_value >= 0.0);
            assert!(point.confidence_interval_lower >= 0.0);
        }
        // Far enough out the raw line is negative and the clamp engages
        assert_eq!(points.last().unwrap().predicted_value, 0.0);
    }

    #[test]
    fn test_stable_trend() {
        let noise = [3.0, -2.0, 5.0, -4.0, 1.0, -3.0, 2.0];
        let history: Vec<_> = (0..7).map(|i| record(i + 1, 2000.0 + noise[i as usize])).collect();

        let ForecastOutcome::Forecast { trend, accuracy, .. } = forecast_revenue(&history, 3)
        else {
            panic!("expected a forecast");
        };

        assert_eq!(trend, TrendDirection::Stable);
        assert!((0.0..=1.0).contains(&accuracy));
    }

    #[test]
    fn test_unsorted_history_is_sorted_before_fit() {
        let mut history: Vec<_> = (0..7).map(|i| record(i + 1, 1000.0 + 100.0 * i as f64)).collect();
        history.reverse();

        let ForecastOutcome::Forecast { points, accuracy, .. } = forecast_revenue(&history, 1)
        else {
            panic!("expected a forecast");
        };
        assert!((accuracy - 1.0).abs() < 1e-9);
        assert!((points[0].predicted_value - 1700.0).abs() < 1e-6);
    }
}
