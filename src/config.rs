//! Client configuration and pin persistence.
//!
//! Settings live in `~/.weft/config.json`. Loading is lenient: a missing or
//! unreadable file yields defaults so a corrupt config never blocks startup.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rows::SortOrder;

/// The config directory name under the home directory.
const CONFIG_DIR: &str = ".weft";

/// The config file name.
const CONFIG_FILE: &str = "config.json";

/// Persisted client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL for backend HTTP calls.
    pub backend_url: String,
    /// URL of the server-sent-events stream.
    pub events_url: String,
    /// Dashboard sort order.
    pub sort_order: SortOrder,
    /// Whether subagent threads appear on the dashboard.
    pub show_subagent_sessions: bool,
    /// Whether speculative response suggestions are fetched.
    pub predictions_enabled: bool,
    /// Pin timestamps keyed by `workspace_id/thread_id`.
    #[serde(default)]
    pub pinned: BTreeMap<String, DateTime<Utc>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            events_url: "http://localhost:8000/v1/events".to_string(),
            sort_order: SortOrder::UpdatedAt,
            show_subagent_sessions: false,
            predictions_enabled: true,
            pinned: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn pin_key(workspace_id: &str, thread_id: &str) -> String {
        format!("{workspace_id}/{thread_id}")
    }

    /// When the thread was pinned, if it is.
    pub fn pinned_at(&self, workspace_id: &str, thread_id: &str) -> Option<DateTime<Utc>> {
        self.pinned
            .get(&Self::pin_key(workspace_id, thread_id))
            .copied()
    }

    /// Toggle a thread's pin. Returns `true` if the thread is now pinned.
    pub fn toggle_pin(&mut self, workspace_id: &str, thread_id: &str) -> bool {
        let key = Self::pin_key(workspace_id, thread_id);
        if self.pinned.remove(&key).is_some() {
            false
        } else {
            self.pinned.insert(key, Utc::now());
            true
        }
    }
}

/// Manages config storage and retrieval.
#[derive(Debug)]
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for the default config location.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        let config_path = home.join(CONFIG_DIR).join(CONFIG_FILE);
        Some(Self { config_path })
    }

    /// Create a manager for an explicit path. Used by tests.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load config from the config file.
    ///
    /// Returns defaults if the file doesn't exist or can't be read.
    pub fn load(&self) -> Config {
        if !self.config_path.exists() {
            return Config::default();
        }

        let file = match File::open(&self.config_path) {
            Ok(f) => f,
            Err(_) => return Config::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(config) => config,
            Err(_) => Config::default(),
        }
    }

    /// Save config to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    /// Returns `true` if successful, `false` otherwise.
    pub fn save(&self, config: &Config) -> bool {
        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() && fs::create_dir_all(parent).is_err() {
                return false;
            }
        }

        let file = match File::create(&self.config_path) {
            Ok(f) => f,
            Err(_) => return false,
        };

        let mut writer = BufWriter::new(file);
        if serde_json::to_writer_pretty(&mut writer, config).is_err() {
            return false;
        }

        writer.flush().is_ok()
    }
}
