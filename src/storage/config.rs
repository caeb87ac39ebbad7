use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::calendar::palette::{ColorRule, Palette, DEFAULT_EVENT_COLOR};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub ui: UiConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub time_format: TimeFormat,
    pub show_draft_summary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarConfig {
    pub default_color: String,
    pub placeholder_title: String,
    pub palette: Vec<ColorRule>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl TimeFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            TimeFormat::TwelveHour => "%I:%M %p",
            TimeFormat::TwentyFourHour => "%H:%M",
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl CalendarConfig {
    pub fn palette(&self) -> Palette {
        Palette::new(self.palette.clone(), self.default_color.clone())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::TwelveHour,
            show_draft_summary: true,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_EVENT_COLOR.to_string(),
            placeholder_title: "Untitled reservation".to_string(),
            palette: ColorRule::defaults(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        Self::load_or_create_at(&Self::config_path())
    }

    pub fn load_or_create_at(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reschat")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_points_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn default_config_has_30_second_timeout() {
        let config = Config::default();
        assert_eq!(config.backend.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn zero_timeout_is_clamped_to_one_second() {
        let backend = BackendConfig {
            request_timeout_secs: 0,
            ..BackendConfig::default()
        };
        assert_eq!(backend.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn default_palette_has_five_names() {
        let config = Config::default();
        assert_eq!(config.calendar.palette.len(), 5);
        assert_eq!(config.calendar.default_color, "#6366f1");
    }

    #[test]
    fn parse_valid_toml_config() {
        let toml_content = r##"
            [backend]
            base_url = "http://reservations.local:8080"
            request_timeout_secs = 5

            [ui]
            time_format = "24h"
            show_draft_summary = false

            [calendar]
            default_color = "#000000"
            placeholder_title = "Reservation"
            palette = [
                { name = "alice", color = "#ff0000" },
            ]
        "##;

        let config = Config::from_toml(toml_content).unwrap();

        assert_eq!(config.backend.base_url, "http://reservations.local:8080");
        assert_eq!(config.backend.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.ui.time_format, TimeFormat::TwentyFourHour);
        assert!(!config.ui.show_draft_summary);
        assert_eq!(config.calendar.palette().color_for(Some("Alice")), "#ff0000");
        assert_eq!(config.calendar.palette().color_for(Some("John")), "#000000");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = Config::from_toml("[ui]\ntime_format = \"24h\"\n").unwrap();

        assert_eq!(config.backend, BackendConfig::default());
        assert_eq!(config.calendar, CalendarConfig::default());
        assert_eq!(config.ui.time_format, TimeFormat::TwentyFourHour);
        assert!(config.ui.show_draft_summary);
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let invalid_toml = "this is not valid toml";
        let result = Config::from_toml(invalid_toml);
        assert!(result.is_err());
    }

    #[test]
    fn load_or_create_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_or_create_at(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(Config::load_or_create_at(&path).unwrap(), config);
    }

    #[test]
    fn load_or_create_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\nbase_url = \"http://example.test\"\n").unwrap();

        let config = Config::load_or_create_at(&path).unwrap();

        assert_eq!(config.backend.base_url, "http://example.test");
        assert_eq!(config.backend.request_timeout_secs, 30);
    }
}
