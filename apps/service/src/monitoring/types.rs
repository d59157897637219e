use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

fn default_method() -> String {
    "GET".to_string()
}

/// An endpoint to probe on every round
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Absolute http(s) URL
    pub url: String,

    /// HTTP verb, sent upper-cased
    #[serde(default = "default_method")]
    pub method: String,
}

impl Target {
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self { url: url.into(), method: method.into() }
    }

    /// Target probed with `GET`
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, default_method())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method.to_uppercase(), self.url)
    }
}

/// Coarse classification of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeCategory {
    Success,
    Warning,
    Failure,
}

impl ProbeCategory {
    /// Glyph used at the start of human readable log lines
    pub fn glyph(self) -> &'static str {
        match self {
            ProbeCategory::Success => "✅",
            ProbeCategory::Warning => "⚠️",
            ProbeCategory::Failure => "❌",
        }
    }
}

impl fmt::Display for ProbeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeCategory::Success => write!(f, "success"),
            ProbeCategory::Warning => write!(f, "warning"),
            ProbeCategory::Failure => write!(f, "failure"),
        }
    }
}

/// What a single probe observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum ProbeResult {
    /// A 2xx response
    Success(u16),

    /// A response outside 2xx
    Warning(u16),

    /// No response at all (timeout, DNS, refused, TLS...)
    Failure(String),
}

impl ProbeResult {
    /// Classify a response status code
    pub fn classify(status_code: u16) -> Self {
        if (200..300).contains(&status_code) {
            ProbeResult::Success(status_code)
        } else {
            ProbeResult::Warning(status_code)
        }
    }

    pub fn category(&self) -> ProbeCategory {
        match self {
            ProbeResult::Success(_) => ProbeCategory::Success,
            ProbeResult::Warning(_) => ProbeCategory::Warning,
            ProbeResult::Failure(_) => ProbeCategory::Failure,
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeResult::Success(code) | ProbeResult::Warning(code) => write!(f, "{code}"),
            ProbeResult::Failure(error) => write!(f, "error: {error}"),
        }
    }
}

/// Result of one probe against one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Target that was probed
    pub target: Target,

    /// When the probe finished
    pub timestamp: DateTime<Utc>,

    /// Wall-clock time from send to response or failure, two decimals
    pub duration_ms: f64,

    pub result: ProbeResult,
}

impl ProbeOutcome {
    pub fn category(&self) -> ProbeCategory {
        self.result.category()
    }

    pub fn is_success(&self) -> bool {
        self.category() == ProbeCategory::Success
    }
}

/// Milliseconds rounded to two decimal places
pub fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_codes() {
        assert_eq!(ProbeResult::classify(200), ProbeResult::Success(200));
        assert_eq!(ProbeResult::classify(204), ProbeResult::Success(204));
        assert_eq!(ProbeResult::classify(299), ProbeResult::Success(299));
        assert_eq!(ProbeResult::classify(301), ProbeResult::Warning(301));
        assert_eq!(ProbeResult::classify(404), ProbeResult::Warning(404));
        assert_eq!(ProbeResult::classify(503), ProbeResult::Warning(503));
        assert_eq!(ProbeResult::classify(199), ProbeResult::Warning(199));
    }

    #[test]
    fn test_target_method_defaults_to_get() {
        let target: Target = serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert_eq!(target.method, "GET");
        assert_eq!(target, Target::get("https://example.com"));
    }

    #[test]
    fn test_round_millis() {
        assert_eq!(round_millis(Duration::from_micros(12_346)), 12.35);
        assert_eq!(round_millis(Duration::from_millis(250)), 250.0);
        assert_eq!(round_millis(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_result_display() {
        assert_eq!(ProbeResult::Warning(404).to_string(), "404");
        assert_eq!(ProbeResult::Failure("refused".into()).to_string(), "error: refused");
        assert_eq!(ProbeCategory::Failure.to_string(), "failure");
    }
}
