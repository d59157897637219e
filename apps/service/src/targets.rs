//! File-backed list of monitored targets.
//!
//! The list lives in a JSON array of `{"url": ..., "method": ...}` objects.
//! A missing file is not an error: the built-in defaults are used until the
//! list is saved for the first time. `add` and `remove` write the file before
//! the in-memory list changes, so a failed write leaves the store as it was.

use std::{fs, path};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::monitoring::Target;
use crate::validation::{ValidationError, validate_target};

/// Targets monitored when no target file exists yet
pub const DEFAULT_TARGETS: &[&str] = &["https://example.com"];

/// Why the target list could not be changed
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{method} {url} is already monitored")]
    Duplicate { url: String, method: String },

    #[error("failed to persist targets: {0}")]
    Persist(#[from] ConfigError),
}

#[derive(Debug, Clone)]
pub struct TargetStore {
    path: path::PathBuf,
    targets: Vec<Target>,
}

impl TargetStore {
    /// Load the store from `path`, falling back to [`DEFAULT_TARGETS`]
    pub fn load(path: impl Into<path::PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        if !path.exists() {
            info!(path = %path.display(), "Target file not found, using built-in targets");
            let targets = DEFAULT_TARGETS.iter().map(|url| Target::get(*url)).collect();
            return Ok(Self { path, targets });
        }

        let raw = fs::read_to_string(&path)
            .map_err(|source| ConfigError::ReadFailed { path: path.clone(), source })?;
        let targets: Vec<Target> = serde_json::from_str(&raw)
            .map_err(|err| ConfigError::ParseFailed { path: path.clone(), message: err.to_string() })?;

        for target in &targets {
            validate_target(target).map_err(|source| ConfigError::InvalidTarget {
                path: path.clone(),
                url: target.url.clone(),
                source,
            })?;
        }

        debug!(path = %path.display(), count = targets.len(), "Loaded targets");
        Ok(Self { path, targets })
    }

    pub fn path(&self) -> &path::Path {
        &self.path
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Add a target and persist the list; the method is stored upper-cased
    pub fn add(&mut self, target: Target) -> Result<Target, StoreError> {
        validate_target(&target)?;
        let target = Target::new(target.url.trim(), target.method.trim().to_uppercase());

        if self.targets.iter().any(|t| t.url == target.url && t.method.eq_ignore_ascii_case(&target.method)) {
            return Err(StoreError::Duplicate { url: target.url, method: target.method });
        }

        let mut candidate = self.targets.clone();
        candidate.push(target.clone());
        self.commit(candidate)?;
        Ok(target)
    }

    /// Remove every target with this URL and persist the list, returning how
    /// many were removed. Nothing is written when no target matches.
    pub fn remove(&mut self, url: &str) -> Result<usize, StoreError> {
        let candidate: Vec<Target> = self.targets.iter().filter(|t| t.url != url).cloned().collect();
        let removed = self.targets.len() - candidate.len();
        if removed > 0 {
            self.commit(candidate)?;
        }
        Ok(removed)
    }

    /// Write the list as pretty-printed JSON
    pub fn save(&self) -> Result<(), ConfigError> {
        write_targets(&self.path, &self.targets)
    }

    fn commit(&mut self, candidate: Vec<Target>) -> Result<(), ConfigError> {
        write_targets(&self.path, &candidate)?;
        self.targets = candidate;
        Ok(())
    }
}

fn write_targets(path: &path::Path, targets: &[Target]) -> Result<(), ConfigError> {
    let mut json =
        serde_json::to_string_pretty(targets).map_err(|err| ConfigError::SerializeFailed(err.to_string()))?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| ConfigError::WriteFailed { path: parent.to_path_buf(), source })?;
    }

    fs::write(path, json).map_err(|source| ConfigError::WriteFailed { path: path.to_path_buf(), source })?;
    info!(path = %path.display(), count = targets.len(), "Saved targets");
    Ok(())
}
