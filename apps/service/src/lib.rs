//! pingwatch - periodic HTTP uptime pinger.
//!
//! A [`Scheduler`] runs a [`ProbeRound`] over every configured [`Target`] on
//! a fixed interval. Each round probes all targets concurrently through a
//! [`ProbeExecutor`] and reports one [`ProbeOutcome`] per target, both as a
//! tracing event and on a broadcast channel. The scheduler is started and
//! stopped by whoever owns it: the `pingwatch` CLI or the HTTP control server.

pub mod config;
pub mod monitoring;
pub mod targets;
pub mod validation;

pub use config::{Config, ConfigError};
pub use monitoring::{
    ProbeCategory, ProbeExecutor, ProbeOutcome, ProbeResult, ProbeRound, RoundSummary, Scheduler,
    SchedulerStatus, StartOutcome, StopOutcome, Target,
};
pub use targets::{StoreError, TargetStore};
