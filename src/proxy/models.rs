//! Proxy data models

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A candidate proxy parsed from an uploaded list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    pub host: String,
    /// Any integer from the input; the range is not checked here
    pub port: i64,
    /// Only present when the input line used the comma format
    pub country_code: Option<String>,
    pub isp: Option<String>,
}

impl Proxy {
    /// Create a new proxy without metadata
    pub fn new(host: String, port: i64) -> Self {
        Self {
            host,
            port,
            country_code: None,
            isp: None,
        }
    }

    /// Create a new proxy carrying the optional comma-format fields
    pub fn with_metadata(
        host: String,
        port: i64,
        country_code: Option<String>,
        isp: Option<String>,
    ) -> Self {
        Self {
            host,
            port,
            country_code,
            isp,
        }
    }

    /// Get the proxy string in HOST:PORT format
    pub fn to_simple_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_simple_string())
    }
}

/// Classification of a checked proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyStatus {
    Active,
    Dead,
}

/// Outcome of checking a single proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCheckResult {
    pub proxy: Proxy,
    pub status: ProxyStatus,
    /// Reported by the checker; empty unless the proxy is active
    pub country_code: String,
    pub isp: String,
}

impl ProxyCheckResult {
    pub fn active(proxy: Proxy, country_code: String, isp: String) -> Self {
        Self {
            proxy,
            status: ProxyStatus::Active,
            country_code,
            isp,
        }
    }

    pub fn dead(proxy: Proxy) -> Self {
        Self {
            proxy,
            status: ProxyStatus::Dead,
            country_code: String::new(),
            isp: String::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProxyStatus::Active
    }
}

/// Response body of the remote liveness API
///
/// Only the fields the bot consumes are modelled; anything else in the body
/// is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    #[serde(default)]
    pub proxyip: Value,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub as_organization: Option<String>,
}

impl CheckResponse {
    /// The API marks a live proxy with a truthy `proxyip` field
    pub fn is_alive(&self) -> bool {
        match &self.proxyip {
            Value::Null => false,
            Value::Bool(alive) => *alive,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_creation() {
        let proxy = Proxy::new("127.0.0.1".to_string(), 8080);
        assert_eq!(proxy.host, "127.0.0.1");
        assert_eq!(proxy.port, 8080);
        assert!(proxy.country_code.is_none());
        assert!(proxy.isp.is_none());
    }

    #[test]
    fn test_proxy_simple_string() {
        let proxy = Proxy::with_metadata(
            "10.0.0.1".to_string(),
            3128,
            Some("US".to_string()),
            Some("ExampleISP".to_string()),
        );
        assert_eq!(proxy.to_simple_string(), "10.0.0.1:3128");
        assert_eq!(proxy.to_string(), "10.0.0.1:3128");
    }

    #[test]
    fn test_proxy_check_result() {
        let proxy = Proxy::new("127.0.0.1".to_string(), 8080);

        let result = ProxyCheckResult::active(proxy.clone(), "DE".to_string(), "Hetzner".to_string());
        assert!(result.is_active());
        assert_eq!(result.country_code, "DE");

        let result = ProxyCheckResult::dead(proxy);
        assert!(!result.is_active());
        assert!(result.country_code.is_empty());
        assert!(result.isp.is_empty());
    }

    #[test]
    fn test_check_response_truthiness() {
        let alive = |body: &str| serde_json::from_str::<CheckResponse>(body).unwrap().is_alive();

        assert!(alive(r#"{"proxyip": true}"#));
        assert!(alive(r#"{"proxyip": "1.2.3.4"}"#));
        assert!(alive(r#"{"proxyip": 1}"#));
        assert!(!alive(r#"{"proxyip": false}"#));
        assert!(!alive(r#"{"proxyip": ""}"#));
        assert!(!alive(r#"{"proxyip": 0}"#));
        assert!(!alive(r#"{"proxyip": null}"#));
        assert!(!alive(r#"{"message": "Proxy Dead"}"#));
    }

    #[test]
    fn test_check_response_fields() {
        let response: CheckResponse = serde_json::from_str(
            r#"{"ip":"1.2.3.4","port":80,"proxyip":true,"countryCode":"US","asOrganization":"Sample ISP","asn":12345}"#,
        )
        .unwrap();
        assert_eq!(response.country_code.as_deref(), Some("US"));
        assert_eq!(response.as_organization.as_deref(), Some("Sample ISP"));
    }
}
