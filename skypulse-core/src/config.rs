use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

pub const FORECAST_API_URL: &str = "https://api.open-meteo.com/v1";
pub const AIR_QUALITY_API_URL: &str = "https://air-quality-api.open-meteo.com/v1";
pub const GEOCODING_API_URL: &str = "https://geocoding-api.open-meteo.com/v1";
pub const RAINVIEWER_API_URL: &str = "https://api.rainviewer.com/public/weather-maps.json";

const DEFAULT_GEOCODING_COUNT: u8 = 5;
const DEFAULT_USER_AGENT: &str = concat!("skypulse/", env!("CARGO_PKG_VERSION"));

/// Base URLs of the upstream services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub forecast: String,
    pub air_quality: String,
    pub geocoding: String,
    /// Full URL of the radar frame index.
    pub radar: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: FORECAST_API_URL.to_string(),
            air_quality: AIR_QUALITY_API_URL.to_string(),
            geocoding: GEOCODING_API_URL.to_string(),
            radar: RAINVIEWER_API_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at one base URL, e.g. a local mock server.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            forecast: base.to_string(),
            air_quality: base.to_string(),
            geocoding: base.to_string(),
            radar: format!("{base}/public/weather-maps.json"),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// geocoding_count = 8
/// request_timeout_secs = 15
///
/// [endpoints]
/// forecast = "https://api.open-meteo.com/v1"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoints: Endpoints,

    /// Number of city matches requested per search.
    pub geocoding_count: u8,

    /// Unset means the HTTP client's own default.
    pub request_timeout_secs: Option<u64>,

    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            geocoding_count: DEFAULT_GEOCODING_COUNT,
            request_timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "skypulse", "skypulse-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the persisted settings (unit, favorites, last location, theme).
    pub fn settings_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("settings.json"))
    }
}
