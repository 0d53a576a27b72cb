//! Proxy parser module for parsing uploaded proxy lists

use crate::proxy::models::Proxy;
use crate::Result;
use std::fs;
use std::path::Path;

/// Proxy parser for parsing proxies from strings and files
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single proxy line
    ///
    /// Supports formats:
    /// - HOST,PORT[,COUNTRY[,ISP]]
    /// - HOST:PORT
    ///
    /// A comma anywhere in the line selects the comma format, even if the
    /// line also contains colons.
    pub fn parse_line(line: &str) -> Option<Proxy> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if line.contains(',') {
            Self::parse_comma_format(line)
        } else if line.contains(':') {
            Self::parse_colon_format(line)
        } else {
            None
        }
    }

    /// Parse host,port,countryCode,isp format; fields past the fourth are ignored
    fn parse_comma_format(line: &str) -> Option<Proxy> {
        let mut parts = line.split(',').map(str::trim);

        let host = parts.next().filter(|h| !h.is_empty())?;
        let port: i64 = parts.next()?.parse().ok()?;
        let country_code = parts.next().map(str::to_string);
        let isp = parts.next().map(str::to_string);

        Some(Proxy::with_metadata(host.to_string(), port, country_code, isp))
    }

    /// Parse host:port format; anything after the port is ignored
    fn parse_colon_format(line: &str) -> Option<Proxy> {
        let mut parts = line.split(':').map(str::trim);

        let host = parts.next().filter(|h| !h.is_empty())?;
        let port: i64 = parts.next()?.parse().ok()?;

        Some(Proxy::new(host.to_string(), port))
    }

    /// Parse proxies from a string (multiple lines), keeping input order
    pub fn parse_string(content: &str) -> Vec<Proxy> {
        content.lines().filter_map(Self::parse_line).collect()
    }

    /// Parse proxies from a file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Proxy>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse_string(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_format() {
        let proxy = ProxyParser::parse_line("192.168.1.1:8080").unwrap();
        assert_eq!(proxy.host, "192.168.1.1");
        assert_eq!(proxy.port, 8080);
        assert!(proxy.country_code.is_none());
        assert!(proxy.isp.is_none());
    }

    #[test]
    fn test_parse_comma_format() {
        let proxy = ProxyParser::parse_line("5.6.7.8,8081,US,ExampleISP").unwrap();
        assert_eq!(proxy.host, "5.6.7.8");
        assert_eq!(proxy.port, 8081);
        assert_eq!(proxy.country_code.as_deref(), Some("US"));
        assert_eq!(proxy.isp.as_deref(), Some("ExampleISP"));
    }

    #[test]
    fn test_parse_comma_format_separator_count_decides_fields() {
        let proxy = ProxyParser::parse_line("5.6.7.8,8081").unwrap();
        assert!(proxy.country_code.is_none());
        assert!(proxy.isp.is_none());

        let proxy = ProxyParser::parse_line("5.6.7.8,8081,SG").unwrap();
        assert_eq!(proxy.country_code.as_deref(), Some("SG"));
        assert!(proxy.isp.is_none());

        let proxy = ProxyParser::parse_line("5.6.7.8,8081,,").unwrap();
        assert_eq!(proxy.country_code.as_deref(), Some(""));
        assert_eq!(proxy.isp.as_deref(), Some(""));
    }

    #[test]
    fn test_comma_takes_precedence_over_colon() {
        let proxy = ProxyParser::parse_line("proxy.example.com,3128,JP,Some: ISP").unwrap();
        assert_eq!(proxy.host, "proxy.example.com");
        assert_eq!(proxy.port, 3128);
        assert_eq!(proxy.isp.as_deref(), Some("Some: ISP"));

        // The comma format is chosen, and "1.2.3.4:80" is not a valid port field
        assert!(ProxyParser::parse_line("1.2.3.4:80,extra").is_none());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let proxy = ProxyParser::parse_line("  10.0.0.1 : 3128 \r").unwrap();
        assert_eq!(proxy.host, "10.0.0.1");
        assert_eq!(proxy.port, 3128);
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(ProxyParser::parse_line("").is_none());
        assert!(ProxyParser::parse_line("   ").is_none());
        assert!(ProxyParser::parse_line("badline").is_none());
        assert!(ProxyParser::parse_line("192.168.1.1").is_none());
        assert!(ProxyParser::parse_line("192.168.1.1:abc").is_none());
        assert!(ProxyParser::parse_line("192.168.1.1,abc,US,ISP").is_none());
        assert!(ProxyParser::parse_line(":8080").is_none());
        assert!(ProxyParser::parse_line(" ,8080").is_none());
        assert!(ProxyParser::parse_line("192.168.1.1:").is_none());
    }

    #[test]
    fn test_parse_keeps_any_integer_port() {
        let proxies = ProxyParser::parse_string("1.2.3.4:70000\n5.6.7.8,99999,US,ISP\n9.9.9.9:8080\n");
        let ports: Vec<_> = proxies.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![70000, 99999, 8080]);

        let proxy = ProxyParser::parse_line("192.168.1.1:-1").unwrap();
        assert_eq!(proxy.port, -1);
    }

    #[test]
    fn test_parse_string() {
        let proxies = ProxyParser::parse_string("1.2.3.4:8080\n5.6.7.8,8081,US,ExampleISP\nbadline\n");
        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[0].to_simple_string(), "1.2.3.4:8080");
        assert_eq!(proxies[1].to_simple_string(), "5.6.7.8:8081");
    }

    #[test]
    fn test_parse_string_keeps_order_and_duplicates() {
        let content = "\n9.9.9.9:1\n\n  \n8.8.8.8:2\n9.9.9.9:1\n";
        let hosts: Vec<_> = ProxyParser::parse_string(content)
            .into_iter()
            .map(|p| p.host)
            .collect();
        assert_eq!(hosts, vec!["9.9.9.9", "8.8.8.8", "9.9.9.9"]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(ProxyParser::parse_string("").is_empty());
        assert!(ProxyParser::parse_string(" \n\t\n  ").is_empty());
    }
}
