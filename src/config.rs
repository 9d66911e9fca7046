use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::localize::Language;

/// Primary colour presets offered in settings. The first one is the default.
pub const PRIMARY_COLOR_PRESETS: [&str; 10] = [
    "#6750A4", "#1976D2", "#00897B", "#43A047", "#E65100", "#D32F2F", "#7B1FA2", "#5E35B1",
    "#0288D1", "#388E3C",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Root of the photo tree (`places/` and `trip_places/` live under it).
    #[serde(default = "default_photos_dir")]
    pub photos_dir: PathBuf,

    #[serde(default)]
    pub settings: Settings,
}

/// User preferences, read at startup and written on change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub theme: ThemeMode,

    /// One of [`PRIMARY_COLOR_PRESETS`]; anything else falls back to the default.
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(format!("unknown theme {:?} (expected light or dark)", s)),
        }
    }
}

fn default_db_path() -> PathBuf {
    data_dir().join("gonext.db")
}

fn default_photos_dir() -> PathBuf {
    data_dir().join("gonext_photos")
}

fn default_primary_color() -> String {
    PRIMARY_COLOR_PRESETS[0].to_string()
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gonext")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            theme: ThemeMode::default(),
            primary_color: default_primary_color(),
        }
    }
}

impl Settings {
    /// The configured colour if it is a known preset, otherwise the default.
    pub fn primary_color(&self) -> &str {
        PRIMARY_COLOR_PRESETS
            .iter()
            .find(|preset| preset.eq_ignore_ascii_case(&self.primary_color))
            .copied()
            .unwrap_or(PRIMARY_COLOR_PRESETS[0])
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            photos_dir: default_photos_dir(),
            settings: Settings::default(),
        }
    }
}

impl Config {
    /// `GONEXT_CONFIG` if set, otherwise the default location.
    pub fn resolve_path() -> PathBuf {
        match std::env::var_os("GONEXT_CONFIG") {
            Some(path) => PathBuf::from(path),
            None => Self::config_path(),
        }
    }

    /// Load the config file, writing a default one if none exists yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gonext")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}
