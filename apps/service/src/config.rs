use std::time::Duration;
use std::{env, fmt, fs, io, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::monitoring::SchedulerSettings;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: path::PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed { path: path::PathBuf, source: io::Error },

    #[error("failed to parse {}: {message}", .path.display())]
    ParseFailed { path: path::PathBuf, message: String },

    #[error("failed to serialize configuration: {0}")]
    SerializeFailed(String),

    #[error("no configuration directory: neither XDG_CONFIG_HOME nor HOME is set")]
    ConfigPathUnavailable,

    #[error("scheduler interval must be at least one second")]
    InvalidInterval,

    #[error("probe timeout must be at least one second")]
    InvalidTimeout,

    #[error("invalid target {url:?} in {}: {source}", .path.display())]
    InvalidTarget { path: path::PathBuf, url: String, source: ValidationError },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("scheduler must be created inside a Tokio runtime")]
    NoRuntime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: Scheduler,
    pub probe: Probe,
    pub targets: Targets,
    pub server: Server,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scheduler {
    /// Seconds between the end of one round and the start of the next
    pub interval_seconds: u64,
    /// Delay between launching successive probes of a round, 0 to disable
    pub launch_stagger_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Probe {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Targets {
    /// JSON file holding the target list
    pub path: path::PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    /// Start the scheduling loop as soon as the server is up
    pub autostart: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self { interval_seconds: 13 * 60, launch_stagger_ms: 500 }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("pingwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for Targets {
    fn default() -> Self {
        Self { path: path::PathBuf::from("websites.json") }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8080, autostart: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: Scheduler::default(),
            probe: Probe::default(),
            targets: Targets::default(),
            server: Server::default(),
        }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/pingwatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("pingwatch/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Scheduler")?;
        write_1(f, "Interval (s)", &self.scheduler.interval_seconds)?;
        write_1(f, "Launch Stagger (ms)", &self.scheduler.launch_stagger_ms)?;
        write_title_1(f, "Probe")?;
        write_1(f, "Timeout (s)", &self.probe.timeout_seconds)?;
        write_1(f, "User Agent", &self.probe.user_agent)?;
        write_title_1(f, "Targets")?;
        write_1(f, "File", &self.targets.path.display())?;
        write_title_1(f, "Server")?;
        write_1(f, "Bind Address", &self.server.bind)?;
        write_1(f, "Port", &self.server.port)?;
        write_1(f, "Autostart", &self.server.autostart)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/pingwatch/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```rust,no_run
    /// # use pingwatch_service::config::Config;
    /// let cfg = Config::from_config(None::<&std::path::Path>)?;
    /// println!("{}", cfg);
    /// # Ok::<(), pingwatch_service::config::ConfigError>(())
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        let config = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| ConfigError::ReadFailed { path: config_path.clone(), source })?;
            toml::from_str(raw_string.as_str()).map_err(|err: toml::de::Error| {
                ConfigError::ParseFailed { path: config_path.clone(), message: err.message().to_string() }
            })?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String =
            toml::to_string_pretty(self).map_err(|err| ConfigError::SerializeFailed(err.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::WriteFailed { path: parent.to_path_buf(), source })?;
        }

        fs::write(path, config_str)
            .map_err(|source| ConfigError::WriteFailed { path: path.to_path_buf(), source })
    }

    /// Check the values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler_settings()?;
        self.probe_timeout()?;
        Ok(())
    }

    pub fn scheduler_settings(&self) -> Result<SchedulerSettings, ConfigError> {
        SchedulerSettings::new(
            self.scheduler.interval_seconds,
            Duration::from_millis(self.scheduler.launch_stagger_ms),
        )
    }

    pub fn probe_timeout(&self) -> Result<Duration, ConfigError> {
        match self.probe.timeout_seconds {
            0 => Err(ConfigError::InvalidTimeout),
            seconds => Ok(Duration::from_secs(seconds)),
        }
    }
}
