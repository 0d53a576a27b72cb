//! Proxy checker module for asking the liveness API about a proxy

use crate::proxy::models::{CheckResponse, Proxy, ProxyCheckResult};
use crate::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default timeout for proxy checks in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default liveness API endpoint
pub const DEFAULT_API_URL: &str = "https://cekstupid.vercel.app/api/v1";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each proxy check
    pub timeout: Duration,
    /// Liveness API queried as `GET <api_url>?ip=<host>&port=<port>`
    pub api_url: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_url(mut self, url: String) -> Self {
        self.api_url = url;
        self
    }
}

/// Ways a single liveness lookup can fail
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("check timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status: {0}")]
    Status(StatusCode),
}

/// Client for the remote liveness API
#[async_trait]
pub trait CheckApi: Send + Sync {
    /// Ask the API about one proxy; one outbound request per call
    async fn lookup(&self, proxy: &Proxy) -> std::result::Result<CheckResponse, CheckError>;
}

/// reqwest-backed [`CheckApi`]
pub struct HttpCheckApi {
    client: Client,
    api_url: String,
}

impl HttpCheckApi {
    pub fn new(config: &CheckerConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl CheckApi for HttpCheckApi {
    async fn lookup(&self, proxy: &Proxy) -> std::result::Result<CheckResponse, CheckError> {
        let port = proxy.port.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("ip", proxy.host.as_str()), ("port", port.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CheckError::Status(response.status()));
        }

        Ok(response.json::<CheckResponse>().await?)
    }
}

/// Proxy checker classifying proxies as active or dead
///
/// Never fails: every error from the API is recorded as a dead proxy.
#[derive(Clone)]
pub struct ProxyChecker {
    api: Arc<dyn CheckApi>,
    timeout: Duration,
}

impl ProxyChecker {
    /// Create a checker talking to the configured HTTP API
    pub fn with_config(config: CheckerConfig) -> Result<Self> {
        let api = HttpCheckApi::new(&config)?;
        Ok(Self::with_api(Arc::new(api), config.timeout))
    }

    /// Create a checker over any API client
    pub fn with_api(api: Arc<dyn CheckApi>, timeout: Duration) -> Self {
        Self { api, timeout }
    }

    /// Check a single proxy
    pub async fn check_proxy(&self, proxy: &Proxy) -> ProxyCheckResult {
        let outcome = match tokio::time::timeout(self.timeout, self.api.lookup(proxy)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CheckError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(response) if response.is_alive() => ProxyCheckResult::active(
                proxy.clone(),
                response.country_code.unwrap_or_default(),
                response.as_organization.unwrap_or_default(),
            ),
            Ok(_) => ProxyCheckResult::dead(proxy.clone()),
            Err(e) => {
                debug!("Check failed for {}: {}", proxy, e);
                ProxyCheckResult::dead(proxy.clone())
            }
        }
    }
}
