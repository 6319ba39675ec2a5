use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{DEFAULT_DATABASE_NAME, limits};

pub const CONFIG_FILENAME: &str = "moviechain.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub build: BuildConfig,

    pub verify: VerifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding the four IMDb TSV dumps.
    pub data_dir: PathBuf,

    pub output_dir: PathBuf,

    pub database_name: String,

    /// Rows per multi-row INSERT (default: 1000)
    pub insert_chunk_size: usize,

    /// Cap on rows any in-memory table (ratings, movies, people) may hold.
    /// Unset means unbounded. The principals stream is never materialized.
    pub max_rows_in_memory: Option<usize>,

    /// Rows between progress events while reading an input (0 disables)
    pub progress_interval: u64,

    /// Capacity of the build event channel (default: 256)
    pub event_buffer_size: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("GamesWithFriends/Features/MovieChain/Resources"),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            insert_chunk_size: limits::DEFAULT_INSERT_CHUNK_SIZE,
            max_rows_in_memory: None,
            progress_interval: limits::DEFAULT_PROGRESS_INTERVAL,
            event_buffer_size: 256,
        }
    }
}

impl BuildConfig {
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.output_dir.join(&self.database_name)
    }
}

/// Sample lookups run against the finished artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub enabled: bool,

    pub title_query: String,

    pub name_query: String,

    /// Title and year of a movie whose cast is listed.
    pub title: String,

    pub year: i32,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title_query: "Matrix".to_string(),
            name_query: "Keanu".to_string(),
            title: "The Matrix".to_string(),
            year: 1999,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from(CONFIG_FILENAME));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("moviechain").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".moviechain").join("config.toml"));
        }

        paths
    }

    /// Writes the defaults to `path` unless a file is already there.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.build.insert_chunk_size == 0 {
            anyhow::bail!("build.insert_chunk_size must be > 0");
        }

        let name = self.build.database_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            anyhow::bail!("build.database_name must be a plain file name");
        }

        if self.build.max_rows_in_memory == Some(0) {
            anyhow::bail!("build.max_rows_in_memory must be > 0 when set");
        }

        if !matches!(self.general.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "general.log_format must be \"pretty\" or \"json\", got {:?}",
                self.general.log_format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.build.insert_chunk_size, 1000);
        assert_eq!(config.build.max_rows_in_memory, None);
        assert_eq!(
            config.build.database_path(),
            PathBuf::from("GamesWithFriends/Features/MovieChain/Resources/moviechain_core.sqlite")
        );
        assert!(config.verify.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[build]"));
        assert!(toml_str.contains("[verify]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [build]
            data_dir = "/data/imdb"
            max_rows_in_memory = 5000000
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.build.data_dir, PathBuf::from("/data/imdb"));
        assert_eq!(config.build.max_rows_in_memory, Some(5_000_000));

        assert_eq!(config.build.insert_chunk_size, 1000);
        assert_eq!(config.verify.title, "The Matrix");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.build.insert_chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.build.database_name = "nested/db.sqlite".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
