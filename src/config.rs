use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file structure for whosinspace.
///
/// Configuration files are loaded from an explicit path, the current
/// directory, or the user's config directory, in that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Endpoints of the roster, profile and photo sources
    #[serde(default)]
    pub sources: SourcesConfig,

    /// HTTP behaviour shared by every request
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Extra roster name corrections, merged over the built-in ones
    #[serde(default)]
    pub aliases: IndexMap<String, String>,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourcesConfig {
    /// Base URL of the Open Notify API
    #[serde(default = "default_roster_url")]
    pub roster_url: String,

    /// Base URL under which Supercluster astronaut pages live
    #[serde(default = "default_profile_url")]
    pub profile_url: String,

    /// Base URL of the NASA API
    #[serde(default = "default_nasa_url")]
    pub nasa_url: String,

    /// NASA API key for the photo of the day
    pub nasa_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of requests in flight at once
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            roster_url: default_roster_url(),
            profile_url: default_profile_url(),
            nasa_url: default_nasa_url(),
            nasa_api_key: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_concurrent_requests: default_max_concurrent_requests(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_roster_url() -> String {
    "http://api.open-notify.org/".to_string()
}

fn default_profile_url() -> String {
    "https://www.supercluster.com/astronauts/".to_string()
}

fn default_nasa_url() -> String {
    "https://api.nasa.gov/".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_concurrent_requests() -> usize {
    8
}

fn default_user_agent() -> String {
    format!("whosinspace/{}", env!("CARGO_PKG_VERSION"))
}

const CONFIG_CANDIDATES: [&str; 4] = [
    "whosinspace.toml",
    "whosinspace.json",
    "whosinspace.yaml",
    "whosinspace.yml",
];

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./whosinspace.toml, ./whosinspace.json, ./whosinspace.yaml, ./whosinspace.yml
    /// 3. `<config dir>/whosinspace/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        for candidate in &CONFIG_CANDIDATES {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(path) = user_config_path().filter(|p| p.exists()) {
            return Self::load_from_path(&path);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// The NASA key from config, falling back to NASA's shared demo key.
    pub fn nasa_api_key(&self) -> &str {
        self.sources.nasa_api_key.as_deref().unwrap_or("DEMO_KEY")
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("whosinspace").join("config.toml"))
}
