//! User configuration
//!
//! Read from `<config dir>/mirror/config.toml` unless a path is given.
//! Every field is optional; a missing file means built-in defaults.
//!
//! ```toml
//! [defaults]
//! source = "viewvc"
//! interval_ms = 1000
//!
//! [[sources]]
//! name = "cgit"
//! file_pattern = '<a class="ls-blob" href="(?P<url>[^"]+)"'
//! dir_pattern = '<a class="ls-dir" href="(?P<url>[^"]+/)"'
//! download_suffix = "?raw=1"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use mirror_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::fetch::HttpFetcher;
use crate::source::{SourceDefinition, SourceRegistry};
use crate::sync::SyncOptions;
use crate::{Error, Result};

/// Settings applied when the command line does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub source: Option<String>,
    pub interval_ms: u64,
    pub timeout_secs: u64,
    pub tolerance_secs: u64,
    pub user_agent: Option<String>,
    pub recursive: bool,
    pub touch_unchanged: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            source: None,
            interval_ms: 1000,
            timeout_secs: 30,
            tolerance_secs: 1,
            user_agent: None,
            recursive: true,
            touch_unchanged: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub defaults: Defaults,
    /// Additional or overriding source definitions
    pub sources: Vec<SourceDefinition>,
}

impl MirrorConfig {
    /// Default config file location, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mirror").join("config.toml"))
    }

    /// Load from `path`, or from [`default_path`](Self::default_path) when
    /// `None`. A missing default file yields defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let store = ConfigStore::new();
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                Ok(store.load(&NormalizedPath::new(path))?)
            }
            None => match Self::default_path() {
                Some(path) => Ok(store.load_or_default(&NormalizedPath::new(path))?),
                None => Ok(Self::default()),
            },
        }
    }

    /// Built-in sources plus the configured ones.
    pub fn registry(&self) -> Result<SourceRegistry> {
        let mut registry = SourceRegistry::with_builtins()?;
        for def in &self.sources {
            registry.register(def.clone())?;
        }
        Ok(registry)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            min_interval: Duration::from_millis(self.defaults.interval_ms),
            tolerance: Duration::from_secs(self.defaults.tolerance_secs),
            touch_unchanged: self.defaults.touch_unchanged,
            force: false,
        }
    }

    pub fn fetcher(&self) -> Result<HttpFetcher> {
        HttpFetcher::new(
            Duration::from_secs(self.defaults.timeout_secs),
            self.defaults.user_agent.as_deref(),
        )
    }
}
