use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time::timeout;

use super::checker::{CheckError, Checker, HttpChecker};
use super::types::{ProbeOutcome, ProbeResult, Target, round_millis};

/// Probe executor - runs one request against one target and classifies it
pub struct ProbeExecutor {
    checker: Arc<dyn Checker>,
    timeout: Duration,
}

impl ProbeExecutor {
    /// Create an executor around any transport.
    ///
    /// `timeout` caps the whole check, independently of whatever the
    /// transport enforces on its own.
    pub fn new(checker: Arc<dyn Checker>, timeout: Duration) -> Self {
        Self { checker, timeout }
    }

    /// Create an executor backed by reqwest
    pub fn http(timeout: Duration, user_agent: &str) -> Result<Self, CheckError> {
        let checker = HttpChecker::new(timeout, user_agent)?;
        Ok(Self::new(Arc::new(checker), timeout))
    }

    /// Probe a target. Never fails: transport errors become `Failure`.
    pub async fn probe(&self, target: &Target) -> ProbeOutcome {
        let start = Instant::now();

        let result = match timeout(self.timeout, self.checker.check(target)).await {
            Ok(Ok(status_code)) => ProbeResult::classify(status_code),
            Ok(Err(e)) => ProbeResult::Failure(e.to_string()),
            Err(_) => ProbeResult::Failure(CheckError::Timeout(self.timeout).to_string()),
        };

        ProbeOutcome {
            target: target.clone(),
            timestamp: Utc::now(),
            duration_ms: round_millis(start.elapsed()),
            result,
        }
    }
}
