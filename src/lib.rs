//! Proxy Scan Bot - Telegram proxy list checker
//!
//! Accepts an uploaded text file of proxies, checks each one against a
//! remote liveness API in paced batches and sends back the active and dead
//! lists.

pub mod bot;
pub mod proxy;

pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Liveness API settings
    pub checker: CheckerConfig,
    /// Batching, pacing and progress settings
    pub verifier: VerifierConfig,
    /// Maximum number of proxies accepted per upload
    pub max_proxies: usize,
    /// Maximum upload size in bytes
    pub max_file_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checker: CheckerConfig::default(),
            verifier: VerifierConfig::default(),
            max_proxies: proxy::input::DEFAULT_MAX_PROXIES,
            max_file_size: proxy::input::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl Config {
    /// Build the verifier described by this configuration
    pub fn build_verifier(&self) -> Result<BatchVerifier> {
        let checker = ProxyChecker::with_config(self.checker.clone())?;
        Ok(BatchVerifier::new(checker, self.verifier.clone()))
    }
}
