pub mod checker;
/// Monitoring engine module - probes targets on a schedule
///
/// This module is responsible for:
/// - Executing single HTTP probes and classifying them
/// - Fanning a probe round out over every target
/// - Scheduling rounds and their start/stop lifecycle
pub mod executor;
pub mod round;
pub mod scheduler;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use checker::{CheckError, Checker, HttpChecker};
pub use executor::ProbeExecutor;
pub use round::{ProbeRound, RoundSummary};
pub use scheduler::{Scheduler, SchedulerSettings, SchedulerStatus, StartOutcome, StopOutcome};
pub use types::{ProbeCategory, ProbeOutcome, ProbeResult, Target};
