//! Native HTTP transport backed by `reqwest`.

use crate::config::SatIndexConfig;
use crate::traits::NetworkProvider;
use crate::{Result, SatIndexError};
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = concat!("bitmap-sat-index/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpNetwork {
    http_client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SatIndexError::Network(e.to_string()))?;
        Ok(Self { http_client })
    }

    pub fn from_config(config: &SatIndexConfig) -> Result<Self> {
        Self::new(config.timeout_seconds)
    }
}

#[async_trait]
impl NetworkProvider for HttpNetwork {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {url}");
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SatIndexError::Network(format!("HTTP error: {status} from {url}")));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
