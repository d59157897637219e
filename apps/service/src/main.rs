use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;

use pingwatch_service::monitoring::ProbeCategory;
use pingwatch_service::{Config, Scheduler, Target, TargetStore};

mod cli;

use cli::{Cli, Command, TargetsCommand};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO });

    let mut config = Config::from_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = cli.targets {
        config.targets.path = path;
    }
    if let Some(interval) = cli.interval {
        config.scheduler.interval_seconds = interval;
    }
    config.validate()?;

    let mut store = TargetStore::load(&config.targets.path).context("failed to load targets")?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config, &store).await,
        Command::Check => check(&config, &store).await,
        Command::Targets { action } => manage_targets(&mut store, action),
        Command::Config => {
            print!("{config}");
            Ok(())
        }
    }
}

/// Probe on schedule until interrupted
async fn run(config: &Config, store: &TargetStore) -> Result<()> {
    let scheduler = Scheduler::from_config(config, store.targets().to_vec())?;

    scheduler.start();
    info!(
        "Periodic pinger started, every {} minutes. Press Ctrl+C to stop",
        config.scheduler.interval_seconds as f64 / 60.0
    );

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl+C")?;
    info!("Stopping service...");
    scheduler.stop_and_wait().await;
    Ok(())
}

/// Probe every target once
async fn check(config: &Config, store: &TargetStore) -> Result<()> {
    let scheduler = Scheduler::from_config(config, store.targets().to_vec())?;
    let summary = scheduler.run_once().await;

    let failed = summary.count(ProbeCategory::Failure);
    if failed > 0 {
        bail!("{failed} of {} targets unreachable", summary.outcomes.len());
    }
    Ok(())
}

fn manage_targets(store: &mut TargetStore, action: TargetsCommand) -> Result<()> {
    match action {
        TargetsCommand::List => {
            for target in store.targets() {
                println!("{target}");
            }
        }
        TargetsCommand::Add { url, method } => {
            let added = store.add(Target::new(url, method))?;
            println!("Added {added}");
        }
        TargetsCommand::Remove { url } => {
            let removed = store.remove(&url)?;
            if removed == 0 {
                bail!("{url} is not monitored");
            }
            println!("Removed {removed} target(s) for {url}");
        }
    }
    Ok(())
}
