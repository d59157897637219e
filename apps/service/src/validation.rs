use thiserror::Error;
use url::Url;

use crate::monitoring::Target;

/// Why a target cannot be monitored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target URL cannot be empty")]
    EmptyUrl,

    #[error("URL must include scheme (http:// or https://)")]
    MissingScheme,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid scheme '{0}'. Must be http or https")]
    UnsupportedScheme(String),

    #[error("URL must have a valid host")]
    MissingHost,

    #[error("HTTP method cannot be empty")]
    EmptyMethod,
}

/// Validate a target before it joins the monitored set.
///
/// The method is only checked for presence; any verb is passed through to the
/// transport as is.
pub fn validate_target(target: &Target) -> Result<(), ValidationError> {
    validate_http_endpoint(&target.url)?;

    if target.method.trim().is_empty() {
        return Err(ValidationError::EmptyMethod);
    }

    Ok(())
}

/// Validate HTTP/HTTPS URL endpoint
pub fn validate_http_endpoint(target: &str) -> Result<(), ValidationError> {
    if target.trim().is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    match Url::parse(target) {
        Ok(url) => {
            let scheme = url.scheme();
            if scheme != "http" && scheme != "https" {
                return Err(ValidationError::UnsupportedScheme(scheme.to_string()));
            }

            if url.host_str().is_none_or(str::is_empty) {
                return Err(ValidationError::MissingHost);
            }

            Ok(())
        }
        // If it fails to parse, check if it's missing a scheme
        Err(_) if !target.contains("://") => Err(ValidationError::MissingScheme),
        Err(e) => Err(ValidationError::InvalidUrl(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_targets() {
        assert!(validate_target(&Target::get("https://example.com")).is_ok());
        assert!(validate_target(&Target::new("http://127.0.0.1:8080/health", "head")).is_ok());
        assert!(validate_target(&Target::new("https://example.test/ok", "PURGE")).is_ok());
    }

    #[test]
    fn test_empty_url() {
        assert_eq!(validate_http_endpoint(""), Err(ValidationError::EmptyUrl));
        assert_eq!(validate_http_endpoint("   "), Err(ValidationError::EmptyUrl));
    }

    #[test]
    fn test_missing_scheme() {
        assert_eq!(validate_http_endpoint("example.com"), Err(ValidationError::MissingScheme));
    }

    #[test]
    fn test_unsupported_scheme() {
        assert_eq!(
            validate_http_endpoint("ftp://example.com"),
            Err(ValidationError::UnsupportedScheme("ftp".into()))
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(validate_http_endpoint("http://exa mple.com"), Err(ValidationError::InvalidUrl(_))));
    }

    #[test]
    fn test_empty_method() {
        assert_eq!(validate_target(&Target::new("https://example.com", " ")), Err(ValidationError::EmptyMethod));
    }
}
