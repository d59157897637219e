use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::executor::ProbeExecutor;
use super::types::{ProbeCategory, ProbeOutcome, ProbeResult, Target};

/// Capacity of the outcome broadcast; slow subscribers lag, they never block a round
const OUTCOME_CHANNEL_CAPACITY: usize = 256;

/// Everything a single round produced
#[derive(Debug, Clone, Serialize)]
pub struct RoundSummary {
    pub round_id: Uuid,

    /// Outcomes in completion order
    pub outcomes: Vec<ProbeOutcome>,

    /// Set when the round was cut short; outcomes of aborted probes are absent
    pub cancelled: bool,
}

impl RoundSummary {
    pub fn count(&self, category: ProbeCategory) -> usize {
        self.outcomes.iter().filter(|o| o.category() == category).count()
    }
}

/// Probe round - fans one probe per target out and collects the outcomes
pub struct ProbeRound {
    executor: Arc<ProbeExecutor>,
    launch_stagger: Duration,
    outcome_tx: broadcast::Sender<ProbeOutcome>,
}

impl ProbeRound {
    /// Create a round runner.
    ///
    /// Probes are launched `launch_stagger` apart so a long target list does
    /// not open every connection at once; `Duration::ZERO` launches them all
    /// immediately.
    pub fn new(executor: Arc<ProbeExecutor>, launch_stagger: Duration) -> Self {
        let (outcome_tx, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self { executor, launch_stagger, outcome_tx }
    }

    /// Receive every outcome reported from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ProbeOutcome> {
        self.outcome_tx.subscribe()
    }

    pub fn launch_stagger(&self) -> Duration {
        self.launch_stagger
    }

    /// Probe every target concurrently and wait for all of them.
    ///
    /// When `cancel` fires, probes not yet launched are skipped and in-flight
    /// ones are aborted; none of them is reported.
    pub async fn run(&self, targets: &[Target], cancel: &CancellationToken) -> RoundSummary {
        let round_id = Uuid::new_v4();
        info!(%round_id, targets = targets.len(), "Sending periodic probes");

        let mut probes = JoinSet::new();
        let mut outcomes = Vec::with_capacity(targets.len());
        let mut next_target = 0;
        let mut next_launch = Instant::now();
        let mut cancelled = false;

        loop {
            let more_to_launch = next_target < targets.len();
            if !more_to_launch && probes.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }

                Some(joined) = probes.join_next(), if !probes.is_empty() => match joined {
                    Ok(outcome) => {
                        report(&outcome);
                        let _ = self.outcome_tx.send(outcome.clone());
                        outcomes.push(outcome);
                    }
                    Err(e) if e.is_cancelled() => debug!(%round_id, "Probe task aborted"),
                    Err(e) => error!(%round_id, error = %e, "Probe task panicked"),
                },

                () = sleep_until(next_launch), if more_to_launch => {
                    let executor = Arc::clone(&self.executor);
                    let target = targets[next_target].clone();
                    probes.spawn(async move { executor.probe(&target).await });

                    next_target += 1;
                    next_launch = Instant::now() + self.launch_stagger;
                }
            }
        }

        if cancelled {
            probes.shutdown().await;
            info!(
                %round_id,
                completed = outcomes.len(),
                skipped = targets.len() - outcomes.len(),
                "Round cancelled"
            );
        } else {
            debug!(
                %round_id,
                success = outcomes.iter().filter(|o| o.is_success()).count(),
                total = outcomes.len(),
                "Round finished"
            );
        }

        RoundSummary { round_id, outcomes, cancelled }
    }
}

/// Emit the per-probe event
fn report(outcome: &ProbeOutcome) {
    let timestamp = outcome.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
    let category = outcome.category();
    let glyph = category.glyph();
    let url = &outcome.target.url;
    let duration_ms = outcome.duration_ms;

    match &outcome.result {
        ProbeResult::Success(status) => info!(
            %timestamp, %url, %category, status, duration_ms,
            "{timestamp} {glyph} {url} - {status} ({duration_ms}ms)"
        ),
        ProbeResult::Warning(status) => warn!(
            %timestamp, %url, %category, status, duration_ms,
            "{timestamp} {glyph} {url} - {status} ({duration_ms}ms)"
        ),
        ProbeResult::Failure(error) => warn!(
            %timestamp, %url, %category, %error, duration_ms,
            "{timestamp} {glyph} {url} - error: {error} ({duration_ms}ms)"
        ),
    }
}
