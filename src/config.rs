use std::env;

use url::Url;

use crate::error::{Error, Result};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the content service, normalized to end with a slash
    pub api_url: Url,

    /// Request timeout applied to every HTTP call
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `VITRINE_API_URL` is required; a missing or blank value is a fatal
    /// configuration error. Everything else has a default.
    pub fn from_env() -> Result<Self> {
        let api_url = normalize_api_url(env::var("VITRINE_API_URL").ok())?;

        Ok(Self {
            api_url,
            request_timeout_secs: env::var("VITRINE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            user_agent: env::var("VITRINE_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
        })
    }

    /// Build a configuration from an explicit base URL, using defaults for
    /// everything else
    pub fn new(api_url: &str) -> Result<Self> {
        Ok(Self {
            api_url: normalize_api_url(Some(api_url.to_string()))?,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        })
    }
}

fn default_user_agent() -> String {
    format!("vitrine-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Validate the base address and guarantee a trailing slash so relative
/// paths join underneath it instead of replacing the last segment
fn normalize_api_url(raw: Option<String>) -> Result<Url> {
    let raw = raw
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::Config("VITRINE_API_URL is not set".to_string()))?;

    let normalized = if raw.ends_with('/') {
        raw
    } else {
        format!("{}/", raw)
    };

    Url::parse(&normalized)
        .map_err(|err| Error::Config(format!("invalid VITRINE_API_URL: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_url_is_config_error() {
        let result = normalize_api_url(None);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_api_url_is_config_error() {
        let result = normalize_api_url(Some("   ".to_string()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_api_url_is_config_error() {
        let result = normalize_api_url(Some("not a url".to_string()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_api_url_gains_trailing_slash() {
        let url = normalize_api_url(Some("http://cms.example.com".to_string())).unwrap();
        assert_eq!(url.as_str(), "http://cms.example.com/");
    }

    #[test]
    fn test_api_url_keeps_existing_trailing_slash() {
        let url = normalize_api_url(Some("http://cms.example.com/".to_string())).unwrap();
        assert_eq!(url.as_str(), "http://cms.example.com/");
    }
}
