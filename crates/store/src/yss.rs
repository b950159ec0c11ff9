//! HTTP-backed YAML document store.

use std::time::Duration;

use moonpost_core::MoonConfig;
use reqwest::StatusCode;

use crate::traits::{ConfigStore, StoreError};

/// Reads and replaces the configuration document at a fixed URL.
///
/// `GET {url}` must answer `200` with the YAML document; `PUT {url}` with the
/// full YAML body must answer `200`.
#[derive(Debug, Clone)]
pub struct YssStore {
    url: url::Url,
    client: reqwest::Client,
}

impl YssStore {
    /// Create a store for `url`, bounding every request by `timeout`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let url = url::Url::parse(url).map_err(|e| StoreError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StoreError::InvalidUrl(format!(
                "{url}: scheme must be http or https"
            )));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }
}

#[async_trait::async_trait]
impl ConfigStore for YssStore {
    async fn fetch(&self) -> Result<MoonConfig, StoreError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(url = %self.url, %status, "config fetch rejected");
            return Err(StoreError::BadStatus { status });
        }

        let body = response.text().await?;
        let config = MoonConfig::from_yaml(&body).map_err(StoreError::Malformed)?;
        tracing::debug!(url = %self.url, bytes = body.len(), "config fetched");
        Ok(config)
    }

    async fn replace(&self, config: &MoonConfig) -> Result<(), StoreError> {
        let body = config.to_yaml().map_err(StoreError::Encode)?;

        let response = self
            .client
            .put(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/yaml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(url = %self.url, %status, "config replace rejected");
            return Err(StoreError::BadStatus { status });
        }

        tracing::debug!(url = %self.url, marker = %config.moon_phase_last, "config replaced");
        Ok(())
    }
}
