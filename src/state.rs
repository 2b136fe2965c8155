//! File-backed store of managed instances
//!
//! Maps an instance name chosen by the user to the resource kind and the
//! declared state last returned by the engine.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use reconcile::DeclaredState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

pub const STATE_FILE: &str = "state.toml";

/// One managed resource instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Registry key, e.g. `latitudesh_server`
    pub kind: String,

    /// Last time this instance was written
    pub last_updated: DateTime<Utc>,

    pub state: DeclaredState,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    instances: BTreeMap<String, Instance>,
}

/// The state file plus where it lives
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    file: StateFile,
}

impl StateStore {
    /// Default state file location
    pub fn default_path() -> Result<PathBuf> {
        Ok(paths::state_dir()?.join(STATE_FILE))
    }

    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            log::debug!("State file does not exist, starting empty");
            return Ok(Self {
                path,
                file: StateFile::default(),
            });
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        let file: StateFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!(
            "Loaded {} instance(s) from {}",
            file.instances.len(),
            path.display()
        );
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the store back to disk
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content =
            toml::to_string_pretty(&self.file).context("Failed to serialize state to TOML")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;

        log::debug!("Saved state to {}", self.path.display());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.file.instances.get(name)
    }

    /// Look up an instance that must exist
    pub fn require(&self, name: &str) -> Result<&Instance> {
        match self.get(name) {
            Some(instance) => Ok(instance),
            None => bail!("No instance named '{name}' in {}", self.path.display()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.file.instances.contains_key(name)
    }

    /// Record the state of an instance, stamping it with the current time
    pub fn put(&mut self, name: &str, kind: &str, state: DeclaredState) {
        self.file.instances.insert(
            name.to_string(),
            Instance {
                kind: kind.to_string(),
                last_updated: Utc::now(),
                state,
            },
        );
    }

    pub fn remove(&mut self, name: &str) -> Option<Instance> {
        self.file.instances.remove(name)
    }

    /// Instances sorted by name
    pub fn instances(&self) -> impl Iterator<Item = (&str, &Instance)> {
        self.file
            .instances
            .iter()
            .map(|(name, instance)| (name.as_str(), instance))
    }

    pub fn is_empty(&self) -> bool {
        self.file.instances.is_empty()
    }
}
