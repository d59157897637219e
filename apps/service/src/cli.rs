use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pingwatch", version, about = "Periodic HTTP uptime pinger")]
pub struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/pingwatch/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Target list, overrides `targets.path` from the configuration
    #[arg(long, global = true)]
    pub targets: Option<PathBuf>,

    /// Seconds between rounds, overrides `scheduler.interval_seconds`
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe every target on schedule until Ctrl+C (default)
    Run,
    /// Probe every target once and exit, failing if any target is unreachable
    Check,
    /// Inspect or edit the target list
    Targets {
        #[command(subcommand)]
        action: TargetsCommand,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Debug, Subcommand)]
pub enum TargetsCommand {
    /// List monitored targets
    List,
    /// Add a target and save the list
    Add {
        url: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
    /// Remove every target with this URL and save the list
    Remove { url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["pingwatch"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pingwatch", "check", "--interval", "30", "--targets", "t.json"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Check)));
        assert_eq!(cli.interval, Some(30));
        assert_eq!(cli.targets, Some(PathBuf::from("t.json")));
    }

    #[test]
    fn test_targets_add_defaults_to_get() {
        let cli = Cli::try_parse_from(["pingwatch", "targets", "add", "https://example.com"]).unwrap();
        let Some(Command::Targets { action: TargetsCommand::Add { url, method } }) = cli.command else {
            panic!("expected targets add");
        };
        assert_eq!(url, "https://example.com");
        assert_eq!(method, "GET");
    }

    #[test]
    fn test_negative_interval_is_rejected() {
        assert!(Cli::try_parse_from(["pingwatch", "--interval", "-1"]).is_err());
    }
}
