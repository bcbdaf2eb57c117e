//! Race configuration loaded from YAML.

use crate::local_map::{DEFAULT_MAP_SIZE, MIN_MAP_SIZE};
use crate::maze::{Maze, MazeError};
use crate::orchestrator::MAX_PARTICIPANTS_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Top-level configuration for a race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Participants launched per race.
    #[serde(default = "default_participants")]
    pub participants: usize,

    /// Upper bound on participants, at most 3.
    #[serde(default = "default_max_participants")]
    pub max_participants: usize,

    /// Turns plus move attempts each participant may spend.
    #[serde(default = "default_step_budget")]
    pub step_budget: u32,

    /// Side length of each explorer's local map.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Simulated round-trip latency per crawler observation or move.
    #[serde(default)]
    pub latency_ms: u64,

    /// Maze rows; the built-in training maze when absent.
    #[serde(default)]
    pub maze: Option<Vec<String>>,
}

fn default_participants() -> usize {
    1
}

fn default_max_participants() -> usize {
    MAX_PARTICIPANTS_LIMIT
}

fn default_step_budget() -> u32 {
    3000
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            participants: default_participants(),
            max_participants: default_max_participants(),
            step_budget: default_step_budget(),
            map_size: default_map_size(),
            latency_ms: 0,
            maze: None,
        }
    }
}

impl RaceConfig {
    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        debug!(path = %path_ref.display(), "Loading configuration from file");
        let content = std::fs::read_to_string(path_ref)?;
        let config: Self = serde_yaml::from_str(&content)?;
        debug!(
            participants = config.participants,
            step_budget = config.step_budget,
            custom_maze = config.maze.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PARTICIPANTS_LIMIT).contains(&self.max_participants) {
            return Err(ConfigError::invalid(
                "max_participants",
                format!("must be between 1 and {MAX_PARTICIPANTS_LIMIT}"),
            ));
        }
        if !(1..=self.max_participants).contains(&self.participants) {
            return Err(ConfigError::invalid(
                "participants",
                format!("must be between 1 and {}", self.max_participants),
            ));
        }
        if self.step_budget == 0 {
            return Err(ConfigError::invalid("step_budget", "must be positive"));
        }
        if self.map_size < MIN_MAP_SIZE {
            return Err(ConfigError::invalid(
                "map_size",
                format!("must be at least {MIN_MAP_SIZE}"),
            ));
        }
        Ok(())
    }

    /// Builds the configured maze.
    pub fn build_maze(&self) -> Result<Maze, ConfigError> {
        let maze = match &self.maze {
            Some(rows) => Maze::from_rows(rows),
            None => Maze::training_default(),
        };
        Ok(maze?)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid maze: {0}")]
    Maze(#[from] MazeError),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RaceConfig::default();
        assert_eq!(config.participants, 1);
        assert_eq!(config.max_participants, 3);
        assert_eq!(config.step_budget, 3000);
        assert_eq!(config.map_size, 100);
        assert_eq!(config.latency(), Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: RaceConfig = serde_yaml::from_str("participants: 2\nlatency_ms: 15\n").unwrap();
        assert_eq!(config.participants, 2);
        assert_eq!(config.step_budget, 3000);
        assert_eq!(config.latency(), Duration::from_millis(15));
    }

    #[test]
    fn test_from_file_with_maze() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "step_budget: 50\nmaze:\n  - \"###\"\n  - \"#x \"\n  - \"###\"\n"
        )
        .unwrap();

        let config = RaceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.step_budget, 50);

        let maze = config.build_maze().unwrap();
        assert_eq!(maze.width(), 3);
        assert_eq!(maze.start(), labyrinth_proto::Position::new(1, 1));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RaceConfig::from_file(dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "participants: [oops").unwrap();
        assert!(matches!(
            RaceConfig::from_file(file.path()).unwrap_err(),
            ConfigError::Yaml(_)
        ));
    }

    #[test]
    fn test_validate_ranges() {
        let cases = [
            (RaceConfig { max_participants: 4, ..RaceConfig::default() }, "max_participants"),
            (RaceConfig { participants: 0, ..RaceConfig::default() }, "participants"),
            (
                RaceConfig { participants: 3, max_participants: 2, ..RaceConfig::default() },
                "participants",
            ),
            (RaceConfig { step_budget: 0, ..RaceConfig::default() }, "step_budget"),
            (RaceConfig { map_size: 2, ..RaceConfig::default() }, "map_size"),
        ];

        for (config, expected) in cases {
            match config.validate() {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_bad_maze_rows() {
        let config = RaceConfig {
            maze: Some(vec!["###".to_string()]),
            ..RaceConfig::default()
        };
        assert!(matches!(
            config.build_maze().unwrap_err(),
            ConfigError::Maze(MazeError::MissingStart)
        ));
    }
}
