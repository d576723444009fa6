//! Domain name vocabulary shared by storage and the enrichment service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a stored name is a registrable (apex) domain or a subdomain of one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainType {
    Root,
    Subdomain,
}

impl DomainType {
    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainType::Root => "ROOT",
            DomainType::Subdomain => "SUBDOMAIN",
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROOT" => Ok(DomainType::Root),
            "SUBDOMAIN" => Ok(DomainType::Subdomain),
            other => Err(crate::Error::Internal(format!(
                "Unknown domain type: {}",
                other
            ))),
        }
    }
}

/// Reduce user input to a bare, lower-cased host name
///
/// Accepts URLs and host:port pairs as well as plain names, so
/// `"  'HTTPS://user@Example.com:8443/path' "` becomes `"example.com"`.
/// Returns an empty string when nothing usable remains.
pub fn normalize_domain(value: &str) -> String {
    let value = value
        .trim()
        .to_lowercase()
        .trim_matches(|c| c == ' ' || c == '\'' || c == '"')
        .to_string();

    if value.is_empty() {
        return String::new();
    }

    let without_scheme = match value.find("://") {
        Some(idx) => &value[idx + 3..],
        None => value.as_str(),
    };

    let authority = without_scheme
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or_default();

    let host = authority.rsplit('@').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();

    // Fully qualified form names the same host
    host.trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_name() {
        assert_eq!(normalize_domain("example.com"), "example.com");
    }

    #[test]
    fn test_normalize_lowercases_and_trims() {
        assert_eq!(normalize_domain("  Example.COM  "), "example.com");
    }

    #[test]
    fn test_normalize_strips_quotes() {
        assert_eq!(normalize_domain("'example.com'"), "example.com");
        assert_eq!(normalize_domain("\"example.com\""), "example.com");
    }

    #[test]
    fn test_normalize_url_with_scheme_path_and_port() {
        assert_eq!(
            normalize_domain("https://user:pw@Sub.Example.com:8443/a/b?q=1"),
            "sub.example.com"
        );
    }

    #[test]
    fn test_normalize_host_with_path_without_scheme() {
        assert_eq!(normalize_domain("example.com/index.html"), "example.com");
    }

    #[test]
    fn test_normalize_drops_trailing_root_dot() {
        assert_eq!(normalize_domain("Example.com."), "example.com");
        assert_eq!(normalize_domain("https://example.com.:443/"), "example.com");
        assert_eq!(normalize_domain("."), "");
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize_domain(""), "");
        assert_eq!(normalize_domain("   "), "");
        assert_eq!(normalize_domain("''"), "");
    }

    #[test]
    fn test_domain_type_round_trip_strings() {
        assert_eq!("ROOT".parse::<DomainType>().unwrap(), DomainType::Root);
        assert_eq!(
            "SUBDOMAIN".parse::<DomainType>().unwrap(),
            DomainType::Subdomain
        );
        assert!("root".parse::<DomainType>().is_err());
        assert_eq!(DomainType::Subdomain.to_string(), "SUBDOMAIN");
    }
}
