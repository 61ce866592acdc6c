//! Server configuration — `~/.lsync.yaml`.
//!
//! # File shape
//!
//! ```yaml
//! prod:
//!   hosts: [h1, h2]
//!   base_dir: /srv
//! dev:
//!   hosts: devbox          # scalar form accepted
//!   base_dir: /home/dev
//! ```
//!
//! # API pattern
//!
//! `load_at(path)` takes an explicit path and is what tests use; the CLI
//! resolves the default path with [`default_path`] first.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Default config file name under the user's home directory.
pub const CONFIG_FILE: &str = ".lsync.yaml";

/// One destination server (cluster) entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTarget {
    /// Destination hosts; a scalar in the file is normalized to one entry.
    #[serde(deserialize_with = "one_or_many")]
    pub hosts: Vec<String>,
    /// Remote base directory the sync root is re-rooted under.
    pub base_dir: PathBuf,
}

/// Server name → target mapping, as loaded from the config file.
pub type ServerMap = BTreeMap<String, ServerTarget>;

/// `hosts:` accepts both a scalar and a sequence.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(host) => vec![host],
        OneOrMany::Many(hosts) => hosts,
    })
}

/// `<home>/.lsync.yaml`.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    Ok(dirs::home_dir()
        .ok_or(ConfigError::HomeNotFound)?
        .join(CONFIG_FILE))
}

/// Load the server map from `path`.
///
/// Returns [`ConfigError::NotFound`] if absent, [`ConfigError::Parse`]
/// (with path context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<ServerMap, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Look up `name` in the map, or fail with the configured names listed.
pub fn resolve<'a>(servers: &'a ServerMap, name: &str) -> Result<&'a ServerTarget, ConfigError> {
    servers.get(name).ok_or_else(|| ConfigError::UnknownServer {
        name: name.to_string(),
        known: servers.keys().cloned().collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
