use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The operational metrics the upstream system tracks per restaurant.
pub const DEFAULT_METRICS: [&str; 5] = [
    "prep_time",
    "table_turnover",
    "order_accuracy",
    "customer_satisfaction",
    "wait_time",
];

/// A single operational metric observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub metric_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
}

/// Correlation between two metrics, with significance under the
/// zero-correlation null.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationPair {
    pub metric1: String,
    pub metric2: String,
    pub correlation_coefficient: f64,
    pub p_value: f64,
    pub strength: String,
    pub significant: bool,
}

/// One projected day of revenue with its 95% band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: String,
    pub predicted_value: f64,
    pub confidence_interval_lower: f64,
    pub confidence_interval_upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Revenue row as returned by the upstream data service. Every field is
/// optional so a malformed payload degrades to the mock fallback instead
/// of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RevenueRow {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "totalRevenue")]
    pub total_revenue: Option<f64>,
}

/// Metric row as returned by the upstream data service.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricRow {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, rename = "metricName")]
    pub metric_name: Option<String>,
}
