use std::error::Error as StdError;
use std::time::Duration;

use reqwest::Method;
use thiserror::Error;

use super::types::Target;

/// Why a check produced no HTTP response
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl CheckError {
    fn from_reqwest(error: &reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            CheckError::Timeout(timeout)
        } else {
            CheckError::Transport(error_chain(error))
        }
    }
}

/// Render an error with all of its sources, `outer: inner: root`.
///
/// reqwest keeps the interesting part ("Connection refused", DNS failures)
/// in the source chain, its own `Display` only names the URL.
fn error_chain(error: &dyn StdError) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

/// Transport used by the probe executor
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Send one request to the target and return the response status code
    async fn check(&self, target: &Target) -> Result<u16, CheckError>;
}

/// HTTP/HTTPS checker
pub struct HttpChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChecker {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, CheckError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| CheckError::Client(error_chain(&e)))?;

        Ok(Self { client, timeout })
    }
}

/// Parse a method case-insensitively.
///
/// Any syntactically valid token is accepted, so verbs reqwest has no
/// constant for (`PURGE`, `PROPFIND`, ...) still go out on the wire.
pub fn parse_method(method: &str) -> Result<Method, CheckError> {
    let normalized = method.trim().to_ascii_uppercase();
    Method::from_bytes(normalized.as_bytes()).map_err(|_| CheckError::InvalidMethod(method.to_string()))
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, target: &Target) -> Result<u16, CheckError> {
        let method = parse_method(&target.method)?;

        let response = self
            .client
            .request(method, &target.url)
            .send()
            .await
            .map_err(|e| CheckError::from_reqwest(&e, self.timeout))?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_is_case_insensitive() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("Post").unwrap(), Method::POST);
        assert_eq!(parse_method(" head ").unwrap(), Method::HEAD);
    }

    #[test]
    fn test_parse_method_passes_unknown_verbs_through() {
        assert_eq!(parse_method("purge").unwrap().as_str(), "PURGE");
    }

    #[test]
    fn test_parse_method_rejects_invalid_tokens() {
        assert!(matches!(parse_method("GE T"), Err(CheckError::InvalidMethod(_))));
        assert!(matches!(parse_method(""), Err(CheckError::InvalidMethod(_))));
    }

    #[test]
    fn test_error_chain_includes_sources() {
        #[derive(Debug, Error)]
        #[error("error sending request")]
        struct Wrapper(#[source] std::io::Error);

        let wrapped = Wrapper(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused"));
        assert_eq!(error_chain(&wrapped), "error sending request: Connection refused");
    }
}
