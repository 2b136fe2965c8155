pub mod kinds;
pub mod lookup;
pub mod resource;

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use reconcile::{Registry, RemoteApi};

use crate::cli::Cli;
use crate::config::{FileConfig, Settings};
use crate::paths;
use crate::provider;
use crate::state::StateStore;

/// Everything a command needs: the provider registry and the state store
pub struct Session {
    pub registry: Registry,
    pub store: StateStore,
    pub quiet: bool,
}

impl Session {
    /// Resolve configuration, build the HTTP client and open the state file
    pub fn open(cli: &Cli) -> Result<Self> {
        let config_path = FileConfig::default_path()?;
        let file = FileConfig::load(&config_path)?;
        let settings =
            Settings::resolve(cli.auth_token.as_deref(), cli.api_url.as_deref(), &file);
        log::debug!(
            "API {} (token from {:?})",
            settings.api_url,
            settings.token_source
        );

        let state_path = match &cli.state {
            Some(path) => paths::expand(path),
            None => StateStore::default_path()?,
        };

        Ok(Self::new(
            Arc::new(settings.client()),
            StateStore::open(state_path)?,
            cli.quiet,
        ))
    }

    pub fn new(client: Arc<dyn RemoteApi>, store: StateStore, quiet: bool) -> Self {
        Self {
            registry: provider::registry(client),
            store,
            quiet,
        }
    }
}

/// Split `key=value`
pub fn split_assignment(text: &str) -> Result<(&str, &str)> {
    match text.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("Expected KEY=VALUE, got '{text}'"),
    }
}

/// Read a file of declared fields; `.json` is JSON, anything else TOML
pub fn load_declaration(path: &Path) -> Result<serde_json::Map<String, serde_json::Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_split_assignment() {
        assert_eq!(split_assignment("hostname=web-2").unwrap(), ("hostname", "web-2"));
        assert_eq!(split_assignment("ipxe_url=").unwrap(), ("ipxe_url", ""));
        assert_eq!(split_assignment("user_data=a=b").unwrap(), ("user_data", "a=b"));
        assert!(split_assignment("hostname").is_err());
        assert!(split_assignment("=web").is_err());
    }

    #[test]
    fn test_load_toml_declaration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("web.toml");
        fs::write(
            &path,
            "project = \"proj-1\"\nhostname = \"web-1\"\nssh_keys = [\"key-1\", 2]\n",
        )
        .unwrap();

        let raw = load_declaration(&path).unwrap();
        assert_eq!(raw["project"], json!("proj-1"));
        assert_eq!(raw["ssh_keys"], json!(["key-1", 2]));
    }

    #[test]
    fn test_load_json_declaration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("web.json");
        fs::write(&path, r#"{"hostname": "web-1", "ipxe_url": ""}"#).unwrap();

        let raw = load_declaration(&path).unwrap();
        assert_eq!(raw["ipxe_url"], json!(""));
    }
}
