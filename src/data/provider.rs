use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::data::types::{MetricRow, RevenueRow};

/// Fetch-by-restaurant-and-window access to the upstream data service.
/// Modeled as a trait so the correlation engine can be exercised against
/// a deterministic stub.
#[async_trait]
pub trait AnalyticsDataProvider: Send + Sync {
    async fn fetch_revenue(&self, restaurant_id: i64, days: u32) -> Result<Vec<RevenueRow>>;
    async fn fetch_metrics(&self, restaurant_id: i64, days: u32) -> Result<Vec<MetricRow>>;
}

pub struct HttpDataProvider {
    client: Client,
    base_url: String,
}

impl HttpDataProvider {
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl AnalyticsDataProvider for HttpDataProvider {
    async fn fetch_revenue(&self, restaurant_id: i64, days: u32) -> Result<Vec<RevenueRow>> {
        let url = format!("{}/api/restaurants/{}", self.base_url, restaurant_id);
        let response = self
            .client
            .get(&url)
            .query(&[("include_revenue", "true".to_string()), ("days", days.to_string())])
            .send()
            .await
            .context("Failed to fetch revenue data")?;

        if response.status().is_success() {
            return response
                .json()
                .await
                .context("Failed to parse revenue response");
        }

        // Some deployments expose revenue on a flat endpoint instead.
        let alt_url = format!("{}/api/revenues", self.base_url);
        let alt = self
            .client
            .get(&alt_url)
            .send()
            .await
            .context("Failed to fetch revenue data from fallback endpoint")?;

        if !alt.status().is_success() {
            bail!("Failed to fetch revenue data: {}", alt.status());
        }
        alt.json().await.context("Failed to parse revenue response")
    }

    async fn fetch_metrics(&self, restaurant_id: i64, days: u32) -> Result<Vec<MetricRow>> {
        let url = format!("{}/api/metrics", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("restaurant_id", restaurant_id.to_string()), ("days", days.to_string())])
            .send()
            .await
            .context("Failed to fetch metrics data")?;

        if !response.status().is_success() {
            bail!("Failed to fetch metrics data: {}", response.status());
        }
        response
            .json()
            .await
            .context("Failed to parse metrics response")
    }
}
