//! HTTP client for the partner availability API
//!
//! One call shape: `GET {base}/inventory/{product_id}?date=YYYY-MM-DD`
//! authenticated with an `x-api-key` header. A 429 is detected and logged
//! with its Retry-After value but receives no special retry treatment;
//! nothing in this system retries.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;

use crate::config::PartnerConfig;
use crate::error::FetchError;
use crate::models::SlotAvailability;

/// Seam over the partner transport so the pipeline can be driven by mock
/// servers or stub implementations in tests.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Fetch all availability slots for one product on one day.
    async fn fetch_day(
        &self,
        product_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, FetchError>;
}

/// Partner API client over reqwest.
pub struct PartnerClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PartnerClient {
    /// Create a client with the given timeout.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create a client from partner configuration.
    pub fn from_config(config: &PartnerConfig) -> Result<Self, FetchError> {
        Self::new(
            &config.base_url,
            &config.api_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

#[async_trait]
impl InventoryApi for PartnerClient {
    async fn fetch_day(
        &self,
        product_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, FetchError> {
        let url = format!("{}/inventory/{}", self.base_url, product_id);
        let date_param = date.format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("date", date_param.as_str())])
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            tracing::warn!(
                product_id,
                date = %date_param,
                retry_after = ?retry_after,
                "rate limit hit for partner inventory call"
            );
            return Err(FetchError::RateLimited { retry_after });
        }

        if !status.is_success() {
            tracing::error!(
                product_id,
                date = %date_param,
                status = status.as_u16(),
                "partner inventory call failed"
            );
            return Err(FetchError::ServerError(status.as_u16()));
        }

        let slots = response.json::<Vec<SlotAvailability>>().await?;
        Ok(slots)
    }
}
