use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Built-in Google Scholar profile used when nothing else names one.
pub const DEFAULT_USER_ID: &str = "HzNqQNoAAAAJ";

/// Environment variable naming the Scholar profile to sync.
pub const USER_ID_ENV: &str = "SCHOLAR_USER_ID";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "PUBSYNC_CONFIG";

/// Root configuration, loaded from `pubsync.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub scholar: ScholarConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScholarConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub base_url: String,
    pub user_agent: String,
    /// Minimum spacing between successive page requests.
    pub min_interval_ms: u64,
    pub page_size: u32,
    pub max_pages: u32,
    /// Also fetch each publication's detail page for full authors and venue.
    pub fill_details: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub curated_file: String,
    pub auto_file: String,
    pub template_file: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            base_url: "https://scholar.google.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
                .to_string(),
            min_interval_ms: 2000,
            page_size: 100,
            max_pages: 20,
            fill_details: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            curated_file: "publications.json".to_string(),
            auto_file: "publications.auto.json".to_string(),
            template_file: "publications.auto.manual.template.json".to_string(),
        }
    }
}

impl PathsConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Hand-maintained dataset, never written by pubsync.
    pub fn curated_path(&self) -> PathBuf {
        self.data_dir.join(&self.curated_file)
    }

    /// Auto-generated dataset, replaced on every successful sync.
    pub fn auto_path(&self) -> PathBuf {
        self.data_dir.join(&self.auto_file)
    }

    pub fn template_path(&self) -> PathBuf {
        self.data_dir.join(&self.template_file)
    }
}

// ─── Load ──────────────────────────────────────────────────

impl SyncConfig {
    /// Config file location: `$PUBSYNC_CONFIG`, then `./pubsync.toml` if it
    /// exists, then `~/.config/pubsync/config.toml`.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        let local = PathBuf::from("pubsync.toml");
        if local.exists() {
            return local;
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("pubsync")
            .join("config.toml")
    }

    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a specific path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.scholar.page_size == 0 {
            return Err(SyncError::Config("scholar.page_size must be positive".into()));
        }
        if self.scholar.max_pages == 0 {
            return Err(SyncError::Config("scholar.max_pages must be positive".into()));
        }
        if self
            .scholar
            .page_size
            .checked_mul(self.scholar.max_pages)
            .is_none()
        {
            return Err(SyncError::Config(
                "scholar.page_size * scholar.max_pages is out of range".into(),
            ));
        }
        Ok(())
    }
}

/// Pick the Scholar profile to sync: explicit flag, then environment, then
/// config file, then [`DEFAULT_USER_ID`]. Blank candidates are skipped.
pub fn resolve_user_id(
    flag: Option<&str>,
    env: Option<&str>,
    configured: Option<&str>,
) -> String {
    [flag, env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .unwrap_or(DEFAULT_USER_ID)
        .to_string()
}
