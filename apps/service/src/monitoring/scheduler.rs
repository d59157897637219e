use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::executor::ProbeExecutor;
use super::round::{ProbeRound, RoundSummary};
use super::types::{ProbeOutcome, Target};
use crate::config::{Config, ConfigError};

/// Cadence settings of a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    interval: Duration,
    launch_stagger: Duration,
}

impl SchedulerSettings {
    /// Validate and build settings; the interval must be at least one second
    pub fn new(interval_seconds: u64, launch_stagger: Duration) -> Result<Self, ConfigError> {
        if interval_seconds == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        Ok(Self { interval: Duration::from_secs(interval_seconds), launch_stagger })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval.as_secs()
    }

    pub fn launch_stagger(&self) -> Duration {
        self.launch_stagger
    }
}

/// Result of `Scheduler::start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Result of `Scheduler::stop`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
}

/// Snapshot returned by `Scheduler::status`
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub interval_seconds: u64,
    pub targets: Vec<Target>,
    pub rounds_completed: u64,
}

/// A spawned scheduling loop and the token that stops it
struct ActiveLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActiveLoop {
    fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Scheduler - runs a probe round every interval until stopped
///
/// The scheduler is an ordinary owned value: share it behind an `Arc` with
/// whatever drives it (HTTP handlers, the CLI, tests). Each instance runs at
/// most one loop at a time.
pub struct Scheduler {
    round: Arc<ProbeRound>,
    settings: SchedulerSettings,
    targets: Mutex<Arc<[Target]>>,
    active: Mutex<Option<ActiveLoop>>,
    rounds_completed: Arc<AtomicU64>,
    runtime: Handle,
}

impl Scheduler {
    /// Create a stopped scheduler.
    ///
    /// Must be called from within a Tokio runtime; loops started later are
    /// spawned onto that runtime, whichever thread calls `start`.
    pub fn new(
        executor: Arc<ProbeExecutor>,
        settings: SchedulerSettings,
        targets: Vec<Target>,
    ) -> Result<Self, ConfigError> {
        let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;

        Ok(Self {
            round: Arc::new(ProbeRound::new(executor, settings.launch_stagger())),
            settings,
            targets: Mutex::new(targets.into()),
            active: Mutex::new(None),
            rounds_completed: Arc::new(AtomicU64::new(0)),
            runtime,
        })
    }

    /// Create a scheduler probing over HTTP as described by `config`
    pub fn from_config(config: &Config, targets: Vec<Target>) -> Result<Self, ConfigError> {
        let settings = config.scheduler_settings()?;
        let executor = ProbeExecutor::http(config.probe_timeout()?, &config.probe.user_agent)
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Self::new(Arc::new(executor), settings, targets)
    }

    /// Start the scheduling loop; a no-op when it is already running
    pub fn start(&self) -> StartOutcome {
        let mut active = lock(&self.active);
        if active.as_ref().is_some_and(ActiveLoop::is_alive) {
            info!("Scheduler already running");
            return StartOutcome::AlreadyRunning;
        }

        let cancel = CancellationToken::new();
        let targets = Arc::clone(&lock(&self.targets));
        info!(
            interval_seconds = self.settings.interval_seconds(),
            launch_stagger_ms = self.round.launch_stagger().as_millis(),
            targets = targets.len(),
            "Starting periodic probes"
        );

        let handle = self.runtime.spawn(run_loop(
            Arc::clone(&self.round),
            targets,
            self.settings.interval(),
            cancel.clone(),
            Arc::clone(&self.rounds_completed),
        ));

        *active = Some(ActiveLoop { cancel, handle });
        StartOutcome::Started
    }

    /// Signal the loop to stop; a no-op when it is already stopped.
    ///
    /// Returns immediately. The loop and its in-flight probes wind down on
    /// their own; use [`Scheduler::stop_and_wait`] to wait for that.
    pub fn stop(&self) -> StopOutcome {
        match self.take_active() {
            Some(active) => {
                info!("Stopping periodic probes");
                active.cancel.cancel();
                StopOutcome::Stopped
            }
            None => {
                info!("Scheduler already stopped");
                StopOutcome::AlreadyStopped
            }
        }
    }

    /// Stop the loop and wait until it has fully exited
    pub async fn stop_and_wait(&self) -> StopOutcome {
        let Some(active) = self.take_active() else {
            info!("Scheduler already stopped");
            return StopOutcome::AlreadyStopped;
        };

        info!("Stopping periodic probes");
        active.cancel.cancel();
        if let Err(e) = active.handle.await {
            if e.is_panic() {
                error!(error = %e, "Scheduling loop panicked");
            }
        }
        StopOutcome::Stopped
    }

    pub fn is_running(&self) -> bool {
        lock(&self.active).as_ref().is_some_and(ActiveLoop::is_alive)
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.is_running(),
            interval_seconds: self.settings.interval_seconds(),
            targets: self.targets(),
            rounds_completed: self.rounds_completed.load(Ordering::Relaxed),
        }
    }

    pub fn targets(&self) -> Vec<Target> {
        lock(&self.targets).to_vec()
    }

    /// Replace the configured targets.
    ///
    /// A running loop keeps probing the list it was started with; the new
    /// list is picked up by the next `start`.
    pub fn set_targets(&self, targets: Vec<Target>) {
        *lock(&self.targets) = targets.into();
        if self.is_running() {
            warn!("Target list changed while running; restart to apply it");
        }
    }

    /// Receive every probe outcome reported from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ProbeOutcome> {
        self.round.subscribe()
    }

    /// Run a single round right now, outside of the scheduling loop
    pub async fn run_once(&self) -> RoundSummary {
        let targets = Arc::clone(&lock(&self.targets));
        self.round.run(&targets, &CancellationToken::new()).await
    }

    fn take_active(&self) -> Option<ActiveLoop> {
        lock(&self.active).take().filter(ActiveLoop::is_alive)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(active) = lock(&self.active).take() {
            active.cancel.cancel();
        }
    }
}

/// The state behind these locks stays consistent even if a holder panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_loop(
    round: Arc<ProbeRound>,
    targets: Arc<[Target]>,
    interval: Duration,
    cancel: CancellationToken,
    rounds_completed: Arc<AtomicU64>,
) {
    loop {
        let summary = round.run(&targets, &cancel).await;
        if summary.cancelled {
            break;
        }
        rounds_completed.fetch_add(1, Ordering::Relaxed);

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    info!("Periodic probes stopped");
}
