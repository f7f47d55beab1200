//! Client endpoint configuration

use url::Url;

use crate::core::errors::{LaraError, Result};

/// Production API origin used when no override is supplied
pub const DEFAULT_BASE_URL: &str = "https://api.laratranslate.com";

/// Parsed API endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    /// Whether the endpoint is reached over TLS
    pub secure: bool,
    /// Endpoint host name
    pub hostname: String,
    /// Endpoint port, defaulted from the scheme when absent
    pub port: u16,
}

impl BaseUrl {
    /// Parse and validate a base URL.
    ///
    /// Only `http` and `https` schemes are accepted; anything else fails
    /// fast with an input error before any request is attempted.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| LaraError::InvalidInput {
            message: format!("Invalid URL {raw:?}: {e}"),
        })?;

        let secure = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(LaraError::InvalidInput {
                    message: format!("Invalid URL (protocol): {other}"),
                })
            }
        };

        let hostname = url
            .host_str()
            .ok_or_else(|| LaraError::InvalidInput {
                message: format!("Invalid URL (missing host): {raw}"),
            })?
            .to_string();

        let port = url.port().unwrap_or(if secure { 443 } else { 80 });

        Ok(Self {
            secure,
            hostname,
            port,
        })
    }

    /// Origin string, omitting the port when it is the scheme default
    pub fn origin(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };

        if self.has_default_port() {
            format!("{}://{}", scheme, self.hostname)
        } else {
            format!("{}://{}:{}", scheme, self.hostname, self.port)
        }
    }

    fn has_default_port(&self) -> bool {
        (self.secure && self.port == 443) || (!self.secure && self.port == 80)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_base_url() {
        let base = BaseUrl::parse(DEFAULT_BASE_URL).unwrap();
        assert!(base.secure);
        assert_eq!(base.hostname, "api.laratranslate.com");
        assert_eq!(base.port, 443);
        assert_eq!(base.origin(), "https://api.laratranslate.com");
    }

    #[test]
    fn test_parse_explicit_port() {
        let base = BaseUrl::parse("http://localhost:8000").unwrap();
        assert!(!base.secure);
        assert_eq!(base.port, 8000);
        assert_eq!(base.origin(), "http://localhost:8000");
    }

    #[test]
    fn test_default_port_is_omitted_from_origin() {
        let base = BaseUrl::parse("http://example.com:80").unwrap();
        assert_eq!(base.origin(), "http://example.com");
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let result = BaseUrl::parse("ftp://example.com");
        assert!(matches!(result, Err(LaraError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(BaseUrl::parse("not a url").is_err());
    }
}
