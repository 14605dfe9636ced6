use reqwest::StatusCode;

use crate::domain::Order;
use crate::utils::{retry_with_backoff, RetryConfig};

// ============================================================================
// Remote Order Registry Client
// ============================================================================
//
// External collaborator boundary: fetch an initial set of order records by
// name filter. The simulation never depends on this path, so every failure
// mode - transport error, non-success status, undecodable body - is logged
// and swallowed; callers get an empty list and carry on.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("registry returned status {0}")]
    BadStatus(StatusCode),
}

pub struct RegistryClient {
    base_url: String,
    client: reqwest::Client,
    retry: RetryConfig,
}

impl RegistryClient {
    pub fn new(base_url: String) -> Self {
        Self::with_retry(base_url, RetryConfig::default())
    }

    pub fn with_retry(base_url: String, retry: RetryConfig) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
            retry,
        }
    }

    /// Fetch order records matching `name`.
    ///
    /// Transient failures are retried with backoff; a definitive failure is
    /// logged and yields an empty list, never an error.
    pub async fn fetch(&self, name: &str) -> Vec<Order> {
        match retry_with_backoff(&self.retry, || self.try_fetch(name)).await {
            Ok(orders) => {
                tracing::info!(count = orders.len(), name, "fetched orders from registry");
                orders
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    name,
                    "registry fetch failed; continuing without remote orders"
                );
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, name: &str) -> Result<Vec<Order>, RegistryError> {
        let response = self
            .client
            .get(format!("{}/orders", self.base_url))
            .query(&[("name", name)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RegistryError::BadStatus(response.status()));
        }

        Ok(response.json::<Vec<Order>>().await?)
    }
}
