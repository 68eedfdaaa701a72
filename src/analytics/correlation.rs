//! Correlation engine: pairwise metric correlations and the
//! metric-vs-revenue path with its mock-data fallback.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::Rng;
use tracing::{info, warn};

use crate::analytics::align;
use crate::analytics::mock;
use crate::analytics::stats;
use crate::data::provider::AnalyticsDataProvider;
use crate::data::types::{
    CorrelationMethod, CorrelationPair, MetricPoint, MetricRow, RevenueRow,
};

/// Minimum aligned points for a pairwise coefficient.
pub const MIN_PAIR_POINTS: usize = 3;
/// Minimum joined rows for the metric-vs-revenue path.
pub const MIN_JOINED_ROWS: usize = 10;

const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Qualitative strength label for an absolute coefficient.
pub fn classify_strength(abs_r: f64) -> &'static str {
    if abs_r >= 0.8 {
        "Very Strong"
    } else if abs_r >= 0.6 {
        "Strong"
    } else if abs_r >= 0.4 {
        "Moderate"
    } else if abs_r >= 0.2 {
        "Weak"
    } else {
        "Very Weak"
    }
}

fn correlate(x: &[f64], y: &[f64], method: CorrelationMethod) -> (f64, f64) {
    let r = match method {
        CorrelationMethod::Pearson => stats::pearson(x, y),
        CorrelationMethod::Spearman => {
            stats::pearson(&stats::average_ranks(x), &stats::average_ranks(y))
        }
    };
    (r, stats::two_sided_p_value(r, x.len()))
}

fn build_pair(metric1: &str, metric2: &str, r: f64, p: f64) -> CorrelationPair {
    CorrelationPair {
        metric1: metric1.to_string(),
        metric2: metric2.to_string(),
        correlation_coefficient: r,
        p_value: p,
        strength: classify_strength(r.abs()).to_string(),
        significant: p < SIGNIFICANCE_LEVEL,
    }
}

/// Pairwise correlations across every metric present in the points.
///
/// Duplicate (date, metric) observations collapse by mean, gaps are
/// forward- then backward-filled, and any pair left with fewer than
/// `MIN_PAIR_POINTS` aligned values is skipped rather than errored.
pub fn compute_correlations(
    points: &[MetricPoint],
    method: CorrelationMethod,
) -> Vec<CorrelationPair> {
    if points.len() < 4 {
        return Vec::new();
    }

    let mut table = align::pivot(points);
    if table.columns.len() < 2 {
        return Vec::new();
    }
    align::fill_gaps(&mut table);

    let names = table.metric_names();
    let mut pairs = Vec::new();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            let Some((x, y)) = align::paired(&table, &names[i], &names[j]) else {
                continue;
            };
            if x.len() < MIN_PAIR_POINTS {
                continue;
            }
            let (r, p) = correlate(&x, &y, method);
            pairs.push(build_pair(&names[i], &names[j], r, p));
        }
    }

    pairs
}

/// Why a correlation request degraded to mock data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FallbackReason {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("revenue rows missing date or totalRevenue")]
    MalformedRevenue,

    #[error("metric rows missing timestamp, value or metricName")]
    MalformedMetrics,

    #[error("only {0} joined rows, need at least 10")]
    InsufficientJoinedRows(usize),

    #[error("no requested metric produced a correlation")]
    NoComputablePairs,
}

/// Where a correlation result set came from.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisSource {
    Live,
    MockFallback(FallbackReason),
}

#[derive(Debug, Clone)]
pub struct CorrelationAnalysis {
    pub pairs: Vec<CorrelationPair>,
    pub source: AnalysisSource,
}

/// Pure core of the metric-vs-revenue path. Every `Err` variant maps to
/// a mock-fallback activation at the service layer.
pub fn correlate_against_revenue(
    revenue_rows: &[RevenueRow],
    metric_rows: &[MetricRow],
    metrics: &[String],
    method: CorrelationMethod,
) -> Result<Vec<CorrelationPair>, FallbackReason> {
    if revenue_rows.is_empty() {
        return Err(FallbackReason::MalformedRevenue);
    }
    // Revenue per date, duplicate dates collapsed by mean.
    let mut revenue_sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for row in revenue_rows {
        let (Some(raw_date), Some(amount)) = (&row.date, row.total_revenue) else {
            return Err(FallbackReason::MalformedRevenue);
        };
        let Some(date) = align::parse_date(raw_date) else {
            return Err(FallbackReason::MalformedRevenue);
        };
        let cell = revenue_sums.entry(date).or_insert((0.0, 0));
        cell.0 += amount;
        cell.1 += 1;
    }

    if metric_rows.is_empty() {
        return Err(FallbackReason::MalformedMetrics);
    }
    let points = metric_rows
        .iter()
        .map(|row| match (row.timestamp, row.value, &row.metric_name) {
            (Some(timestamp), Some(value), Some(name)) => Ok(MetricPoint {
                timestamp,
                value,
                metric_name: name.clone(),
            }),
            _ => Err(FallbackReason::MalformedMetrics),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let table = align::pivot(&points);

    // Inner join: only dates present in both tables survive.
    let joined: Vec<(usize, f64)> = table
        .dates
        .iter()
        .enumerate()
        .filter_map(|(idx, date)| {
            revenue_sums
                .get(date)
                .map(|(sum, count)| (idx, sum / *count as f64))
        })
        .collect();

    if joined.len() < MIN_JOINED_ROWS {
        return Err(FallbackReason::InsufficientJoinedRows(joined.len()));
    }

    let mut pairs = Vec::new();
    for metric in metrics {
        let Some(column) = table.column(metric) else {
            continue;
        };

        let mut metric_values = Vec::new();
        let mut revenue_values = Vec::new();
        for (idx, revenue) in &joined {
            if let Some(value) = column[*idx] {
                metric_values.push(value);
                revenue_values.push(*revenue);
            }
        }
        if metric_values.len() < MIN_JOINED_ROWS {
            continue;
        }

        let (r, p) = correlate(&metric_values, &revenue_values, method);
        pairs.push(build_pair(metric, "revenue", r, p));
    }

    if pairs.is_empty() {
        return Err(FallbackReason::NoComputablePairs);
    }
    Ok(pairs)
}

/// Correlate the requested metrics against revenue for one restaurant.
///
/// Never fails: upstream unavailability, malformed payloads, or an
/// insufficient sample all degrade to the mock generator, and the
/// returned source marker records which path produced the result.
pub async fn analyze_revenue_correlations<R: Rng>(
    provider: &dyn AnalyticsDataProvider,
    restaurant_id: i64,
    metrics: &[String],
    method: CorrelationMethod,
    window_days: u32,
    rng: &mut R,
) -> CorrelationAnalysis {
    let outcome = match fetch_window(provider, restaurant_id, window_days).await {
        Ok((revenue_rows, metric_rows)) => {
            correlate_against_revenue(&revenue_rows, &metric_rows, metrics, method)
        }
        Err(e) => Err(FallbackReason::UpstreamUnavailable(e.to_string())),
    };

    match outcome {
        Ok(pairs) => {
            info!(
                restaurant_id,
                pairs = pairs.len(),
                "computed revenue correlations from live data"
            );
            CorrelationAnalysis {
                pairs,
                source: AnalysisSource::Live,
            }
        }
        Err(reason) => {
            warn!(restaurant_id, %reason, "falling back to mock correlations");
            CorrelationAnalysis {
                pairs: mock::mock_correlations(metrics, rng),
                source: AnalysisSource::MockFallback(reason),
            }
        }
    }
}

async fn fetch_window(
    provider: &dyn AnalyticsDataProvider,
    restaurant_id: i64,
    window_days: u32,
) -> anyhow::Result<(Vec<RevenueRow>, Vec<MetricRow>)> {
    let revenue_rows = provider.fetch_revenue(restaurant_id, window_days).await?;
    let metric_rows = provider.fetch_metrics(restaurant_id, window_days).await?;
    Ok((revenue_rows, metric_rows))
}
