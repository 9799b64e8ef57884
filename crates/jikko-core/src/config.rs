use crate::error::{JikkoError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SdConfig
// ---------------------------------------------------------------------------

/// Stable-diffusion generation host and file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdConfig {
    #[serde(default = "default_sd_host")]
    pub host: String,
    #[serde(default = "default_sd_model")]
    pub model: String,
    #[serde(default = "default_models_dir")]
    pub models_dir: String,
    #[serde(default = "default_outputs_dir")]
    pub outputs_dir: String,
    #[serde(default = "default_local_output_dir")]
    pub local_output_dir: PathBuf,
}

fn default_sd_host() -> String {
    "junkpile".to_string()
}

fn default_sd_model() -> String {
    "obsessiveCompulsive_v20-q8_0.gguf".to_string()
}

fn default_models_dir() -> String {
    "/var/lib/tensors/models".to_string()
}

fn default_outputs_dir() -> String {
    "/var/lib/tensors/outputs".to_string()
}

fn default_local_output_dir() -> PathBuf {
    PathBuf::from("~/Projects/gallery/@output")
}

impl Default for SdConfig {
    fn default() -> Self {
        Self {
            host: default_sd_host(),
            model: default_sd_model(),
            models_dir: default_models_dir(),
            outputs_dir: default_outputs_dir(),
            local_output_dir: default_local_output_dir(),
        }
    }
}

impl SdConfig {
    pub fn checkpoints_dir(&self) -> String {
        format!("{}/checkpoints", self.models_dir.trim_end_matches('/'))
    }

    pub fn loras_dir(&self) -> String {
        format!("{}/loras", self.models_dir.trim_end_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// SyncConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_sync_host")]
    pub host: String,
    #[serde(default = "default_sync_files")]
    pub files: Vec<String>,
}

fn default_sync_host() -> String {
    "chi@junkpile".to_string()
}

fn default_sync_files() -> Vec<String> {
    [".gemrc", ".gitignore", ".gitconfig", ".zshrc"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            host: default_sync_host(),
            files: default_sync_files(),
        }
    }
}

// ---------------------------------------------------------------------------
// HostConfig
// ---------------------------------------------------------------------------

/// A deployment host reachable over ssh. `api` is the service URL as seen
/// from the host itself; health checks curl it over ssh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    pub ssh: String,
    #[serde(default = "default_api")]
    pub api: String,
    #[serde(default)]
    pub description: String,
}

fn default_api() -> String {
    "http://localhost:8080".to_string()
}

fn default_hosts() -> BTreeMap<String, HostConfig> {
    let mut hosts = BTreeMap::new();
    hosts.insert(
        "junkpile".to_string(),
        HostConfig {
            ssh: "chi@junkpile".to_string(),
            api: default_api(),
            description: "Local development server".to_string(),
        },
    );
    hosts
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_color")]
    pub color: bool,
    #[serde(default = "default_repo_dir")]
    pub repo_dir: PathBuf,
    #[serde(default = "default_claude_dir")]
    pub claude_dir: PathBuf,
    /// Defaults to `<repo_dir>/doc/ratatui`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_dir: Option<PathBuf>,
    #[serde(default = "default_tengu_init_dir")]
    pub tengu_init_dir: PathBuf,
    #[serde(default)]
    pub sd: SdConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default = "default_hosts")]
    pub hosts: BTreeMap<String, HostConfig>,
}

fn default_color() -> bool {
    true
}

fn default_repo_dir() -> PathBuf {
    PathBuf::from("~/Projects/claude-scripts")
}

fn default_claude_dir() -> PathBuf {
    PathBuf::from("~/.claude")
}

fn default_tengu_init_dir() -> PathBuf {
    PathBuf::from("~/Projects/tengu-init")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color: default_color(),
            repo_dir: default_repo_dir(),
            claude_dir: default_claude_dir(),
            docs_dir: None,
            tengu_init_dir: default_tengu_init_dir(),
            sd: SdConfig::default(),
            sync: SyncConfig::default(),
            hosts: default_hosts(),
        }
    }
}

impl Config {
    /// Load from `$JIKKO_CONFIG`, else `~/.config/jikko/config.yaml`.
    /// A missing file yields defaults. `NO_COLOR` turns color off.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&paths::config_path()?)?;
        if std::env::var_os("NO_COLOR").is_some() {
            config.color = false;
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default().expanded());
        }
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data, path)
    }

    fn parse(data: &str, path: &Path) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default().expanded());
        }
        let config: Config = serde_yaml::from_str(data).map_err(|e| JikkoError::ConfigParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config.expanded())
    }

    fn expanded(mut self) -> Self {
        self.repo_dir = paths::expand_tilde(&self.repo_dir);
        self.claude_dir = paths::expand_tilde(&self.claude_dir);
        self.tengu_init_dir = paths::expand_tilde(&self.tengu_init_dir);
        self.docs_dir = self.docs_dir.as_deref().map(paths::expand_tilde);
        self.sd.local_output_dir = paths::expand_tilde(&self.sd.local_output_dir);
        self
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.docs_dir
            .clone()
            .unwrap_or_else(|| self.repo_dir.join("doc").join("ratatui"))
    }

    pub fn settings_path(&self) -> PathBuf {
        paths::settings_path(&self.claude_dir)
    }

    pub fn host(&self, name: &str) -> Option<&HostConfig> {
        self.hosts.get(name)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
