use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{LogConfig, LogFormat, LogLevel};
use crate::models::Focus;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Workout text parsing behaviour
    #[serde(default)]
    pub parser: ParserSettings,

    /// Week layout preferences
    #[serde(default)]
    pub schedule: ScheduleSettings,

    /// Workout log / plan storage
    #[serde(default)]
    pub storage: StorageSettings,

    /// Logging output
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Settings consumed by the workout parser and history merger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserSettings {
    /// Duration given to warmup/cooldown/cardio segments without a time token
    pub default_segment_seconds: u32,

    /// Focus assumed for sub-workouts that carry none
    pub default_focus: Focus,

    /// Number of most recent completed logs consulted for weight carry-forward
    pub history_depth: usize,

    /// Back-fill blank weights from history
    pub history_enabled: bool,
}

/// Week layout preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// First day of the training week ("Mon", "Sun", ...)
    pub week_start: String,
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database file
    pub database_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            parser: ParserSettings::default(),
            schedule: ScheduleSettings::default(),
            storage: StorageSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        ParserSettings {
            default_segment_seconds: 300,
            default_focus: Focus::Strength,
            history_depth: 5,
            history_enabled: true,
        }
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        ScheduleSettings {
            week_start: "Mon".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: AppConfig::config_dir().join("coachrs.db"),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        // Update modification timestamp
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Directory holding config and database
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".coachrs")
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(path = %config_path.display(), error = %err, "using default configuration");
                Self::default()
            }
        }
    }

    /// Save configuration to default location
    pub fn save_default(&mut self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to_file(config_path)
    }

    /// Dotted keys accepted by `get`/`set`
    pub fn keys() -> &'static [&'static str] {
        &[
            "parser.default_segment_seconds",
            "parser.default_focus",
            "parser.history_depth",
            "parser.history_enabled",
            "schedule.week_start",
            "storage.database_path",
            "logging.level",
            "logging.format",
        ]
    }

    /// Read a single value by dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "parser.default_segment_seconds" => self.parser.default_segment_seconds.to_string(),
            "parser.default_focus" => self.parser.default_focus.to_string(),
            "parser.history_depth" => self.parser.history_depth.to_string(),
            "parser.history_enabled" => self.parser.history_enabled.to_string(),
            "schedule.week_start" => self.schedule.week_start.clone(),
            "storage.database_path" => self.storage.database_path.display().to_string(),
            "logging.level" => self.logging.level.to_filter(),
            "logging.format" => format!("{:?}", self.logging.format).to_lowercase(),
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        };
        Ok(value)
    }

    /// Update a single value by dotted key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "parser.default_segment_seconds" => {
                self.parser.default_segment_seconds = value
                    .parse()
                    .with_context(|| format!("Invalid seconds value: {}", value))?;
            }
            "parser.default_focus" => self.parser.default_focus = Focus::from(value),
            "parser.history_depth" => {
                self.parser.history_depth = value
                    .parse()
                    .with_context(|| format!("Invalid history depth: {}", value))?;
            }
            "parser.history_enabled" => {
                self.parser.history_enabled = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {}", value))?;
            }
            "schedule.week_start" => {
                if crate::schedule::normalize_weekday(value).is_none() {
                    anyhow::bail!("Invalid weekday: {}", value);
                }
                self.schedule.week_start = value.to_string();
            }
            "storage.database_path" => self.storage.database_path = PathBuf::from(value),
            "logging.level" => {
                self.logging.level = value.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
            }
            "logging.format" => {
                self.logging.format = value.parse::<LogFormat>().map_err(anyhow::Error::msg)?;
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }

        self.metadata.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.parser, deserialized.parser);
        assert_eq!(deserialized.parser.default_focus, Focus::Strength);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let toml_str = r#"
            [metadata]
            version = "1.0"
            created_at = "2024-01-01T00:00:00Z"
            updated_at = "2024-01-01T00:00:00Z"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.parser.history_depth, 5);
        assert_eq!(config.schedule.week_start, "Mon");
    }

    #[test]
    fn test_get_and_set() {
        let mut config = AppConfig::default();
        config.set("parser.history_depth", "3").unwrap();
        assert_eq!(config.get("parser.history_depth").unwrap(), "3");

        config.set("parser.default_focus", "Mixed").unwrap();
        assert_eq!(config.parser.default_focus, Focus::Mixed);

        config.set("logging.level", "debug").unwrap();
        assert_eq!(config.get("logging.level").unwrap(), "debug");

        assert!(config.set("schedule.week_start", "Funday").is_err());
        assert!(config.set("parser.history_depth", "many").is_err());
        assert!(config.get("nope").is_err());
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original_config = AppConfig::default();
        original_config.parser.default_segment_seconds = 180;

        original_config.save_to_file(&config_path).unwrap();
        let loaded_config = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded_config.parser.default_segment_seconds, 180);
    }
}
