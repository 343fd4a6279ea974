use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::snake::Snake;

const APP_DIR_NAME: &str = "torus-snake";
const CONFIG_FILE_NAME: &str = "config.json";

/// Default board side length.
pub const DEFAULT_BOARD_SIZE: usize = 10;

/// Default number of leading segments (head plus body) before the end marker.
pub const DEFAULT_INITIAL_LENGTH: usize = 3;

/// Playing-phase tick interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 400;

/// GameOver blink interval in milliseconds.
pub const DEFAULT_BLINK_INTERVAL_MS: u64 = 200;

/// Engine parameters, loadable from a JSON file with every field optional.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub board_size: usize,
    pub initial_length: usize,
    pub tick_interval_ms: u64,
    pub blink_interval_ms: u64,
    /// Fixed rng seed for reproducible food placement.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            initial_length: DEFAULT_INITIAL_LENGTH,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            blink_interval_ms: DEFAULT_BLINK_INTERVAL_MS,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Loads the config file from the platform config directory.
    ///
    /// Returns defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&config_path())
    }

    /// Loads a config file, treating a missing file as all defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks that the board can be built and the snake spawned on it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("tick_interval_ms"));
        }
        if self.blink_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("blink_interval_ms"));
        }

        let mut grid = Grid::build(self.board_size)?;
        let center = grid.center();
        Snake::spawn(&mut grid, center, self.initial_length)?;
        Ok(())
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms)
    }
}

/// Returns the platform-correct config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    let mut base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(CONFIG_FILE_NAME);
    base
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::error::ConfigError;

    use super::EngineConfig;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();

        assert_eq!(config.board_size, 10);
        assert_eq!(config.initial_length, 3);
        assert_eq!(config.tick_interval_ms, 400);
        assert_eq!(config.blink_interval_ms, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let path = unique_test_path("missing");
        let loaded = EngineConfig::load_from_path(&path).expect("missing file should be Ok");
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn partial_config_file_fills_in_defaults() {
        let path = unique_test_path("partial");
        write_test_file(&path, r#"{ "board_size": 16, "seed": 9 }"#);

        let loaded = EngineConfig::load_from_path(&path).expect("partial file should load");

        assert_eq!(loaded.board_size, 16);
        assert_eq!(loaded.seed, Some(9));
        assert_eq!(loaded.tick_interval_ms, 400);
        cleanup_test_path(&path);
    }

    #[test]
    fn malformed_config_file_returns_error() {
        let path = unique_test_path("malformed");
        write_test_file(&path, "not-json");

        assert!(matches!(
            EngineConfig::load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
        cleanup_test_path(&path);
    }

    #[test]
    fn validate_rejects_snake_longer_than_board() {
        let config = EngineConfig {
            board_size: 4,
            ..EngineConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::SnakeTooLong { .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_intervals() {
        let config = EngineConfig {
            blink_interval_ms: 0,
            ..EngineConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroInterval("blink_interval_ms"))
        ));
    }

    fn write_test_file(path: &PathBuf, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("test parent directory should be creatable");
        }
        fs::write(path, contents).expect("test file write should succeed");
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("torus-snake-config-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
    }
}
