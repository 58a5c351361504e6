//! HTTP client for the external model-training service

use reqwest::Client;
use std::time::Duration;

use super::types::*;
use crate::error::{Error, Result};

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TrainingClient {
    client: Client,
    base_url: String,
}

impl TrainingClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BACKEND_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Honors `ML_BACKEND_URL`, falling back to the local default.
    pub fn from_env() -> Result<Self> {
        match std::env::var("ML_BACKEND_URL") {
            Ok(url) if !url.is_empty() => Self::with_base_url(url),
            _ => Self::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit one training request and normalize the response.
    ///
    /// Exactly one POST per call. No retry, no caching, no deduplication.
    pub async fn train(&self, request: &TrainingRequest) -> Result<ModelReport> {
        let url = format!("{}/train_model", self.base_url);

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            return Err(Error::Backend(format!(
                "{} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let raw: RawTrainingResponse = response.json().await?;

        if let Some(message) = raw.error {
            return Err(Error::Training(message));
        }

        ModelReport::from_raw(raw)
    }
}

impl Default for TrainingClient {
    fn default() -> Self {
        Self::new().expect("Failed to create HTTP client")
    }
}
