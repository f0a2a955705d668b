//! HTTP fun fact source backed by a numbersapi-compatible service.

use super::{FactCategory, FunFact, FunFactSource};
use crate::error::{ClassifierError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Queries `GET {base_url}/{number}/{category}?json`
#[derive(Debug, Clone)]
pub struct NumbersApiSource {
    client: Client,
    base_url: String,
}

impl NumbersApiSource {
    /// Build a source whose every request is cut off after `timeout`
    ///
    /// ## Errors
    /// - `ClassifierError::ConfigError`: if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                ClassifierError::config_error(
                    format!("Failed to build fun fact HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Full request URL for a lookup
    #[must_use]
    pub fn fact_url(&self, number: u64, category: FactCategory) -> String {
        format!("{}/{}/{}?json", self.base_url, number, category)
    }
}

#[async_trait]
impl FunFactSource for NumbersApiSource {
    async fn fetch(&self, number: u64, category: FactCategory) -> Result<FunFact> {
        let url = self.fact_url(number, category);
        debug!("Requesting fun fact from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::upstream_error(
                format!("Fun fact service answered {status} for {url}"),
                None,
            ));
        }

        Ok(response.json::<FunFact>().await?)
    }
}
