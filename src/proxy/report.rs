//! Aggregated results of a verification run

use crate::proxy::models::ProxyCheckResult;

/// File name used when delivering active proxies
pub const ACTIVE_FILE_NAME: &str = "active.txt";

/// File name used when delivering dead proxies
pub const DEAD_FILE_NAME: &str = "dead.txt";

/// Active and dead results, each in input order
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub active: Vec<ProxyCheckResult>,
    pub dead: Vec<ProxyCheckResult>,
}

impl VerificationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append results, routing each to its partition
    pub fn extend(&mut self, results: impl IntoIterator<Item = ProxyCheckResult>) {
        for result in results {
            if result.is_active() {
                self.active.push(result);
            } else {
                self.dead.push(result);
            }
        }
    }

    pub fn total(&self) -> usize {
        self.active.len() + self.dead.len()
    }

    /// `host,port,countryCode,isp` per active proxy
    pub fn active_content(&self) -> String {
        self.active
            .iter()
            .map(|r| format!("{},{},{},{}", r.proxy.host, r.proxy.port, r.country_code, r.isp))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `host,port` per dead proxy
    pub fn dead_content(&self) -> String {
        self.dead
            .iter()
            .map(|r| format!("{},{}", r.proxy.host, r.proxy.port))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Summary line sent once a run is complete
    pub fn summary(&self) -> String {
        format!("✅ Done!\nActive: {}\nDead: {}", self.active.len(), self.dead.len())
    }
}
