use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating a [`PoolConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Identity tracker tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Frames an object may go unmatched before it is evicted (default: 8).
    pub max_disappeared: u32,
    /// Maximum centroid distance for a detection to match an object (default: 40).
    pub max_distance: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_disappeared: 8,
            max_distance: 40.0,
        }
    }
}

/// Game engine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Frames a ball must stay absent before it can count as potted (default: 6).
    pub disappear_for_pot: u32,
    /// Capture radius of each pocket (default: 36).
    pub pocket_radius: f32,
    /// Run the 8-ball rules state machine on pots (default: true).
    pub enable_8ball_rules: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            disappear_for_pot: 6,
            pocket_radius: 36.0,
            enable_8ball_rules: true,
        }
    }
}

/// Canonical (warped) table dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub table_w: u32,
    pub table_h: u32,
    /// Inset of the pocket centers from the table edge.
    pub margin: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            table_w: 2000,
            table_h: 1000,
            margin: 30,
        }
    }
}

/// Top-level configuration, loaded from a JSON file.
/// Every section and field is optional and falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub tracking: TrackerConfig,
    pub game: GameConfig,
    #[serde(alias = "calibration")]
    pub table: TableConfig,
}

impl PoolConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tracking;
        if !(t.max_distance.is_finite() && t.max_distance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tracking.max_distance must be positive, got {}",
                t.max_distance
            )));
        }

        let g = &self.game;
        if g.disappear_for_pot == 0 {
            return Err(ConfigError::Invalid("game.disappear_for_pot must be at least 1".into()));
        }
        if !(g.pocket_radius.is_finite() && g.pocket_radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "game.pocket_radius must be positive, got {}",
                g.pocket_radius
            )));
        }

        let tb = &self.table;
        let border = tb.margin.saturating_mul(2);
        if tb.table_w <= border || tb.table_h <= border {
            return Err(ConfigError::Invalid(format!(
                "table {}x{} leaves no playing area inside margin {}",
                tb.table_w, tb.table_h, tb.margin
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config = PoolConfig::from_json("{}").unwrap();
        assert_eq!(config.tracking.max_disappeared, 8);
        assert_eq!(config.tracking.max_distance, 40.0);
        assert_eq!(config.game.disappear_for_pot, 6);
        assert_eq!(config.game.pocket_radius, 36.0);
        assert!(config.game.enable_8ball_rules);
        assert_eq!(config.table.table_w, 2000);
        assert_eq!(config.table.table_h, 1000);
        assert_eq!(config.table.margin, 30);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let json = r#"{
            "tracking": { "max_distance": 25 },
            "game": { "enable_8ball_rules": false },
            "calibration": { "table_w": 1200 }
        }"#;
        let config = PoolConfig::from_json(json).unwrap();
        assert_eq!(config.tracking.max_distance, 25.0);
        assert_eq!(config.tracking.max_disappeared, 8);
        assert!(!config.game.enable_8ball_rules);
        assert_eq!(config.game.disappear_for_pot, 6);
        assert_eq!(config.table.table_w, 1200);
        assert_eq!(config.table.table_h, 1000);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = PoolConfig::from_json(r#"{ "game": { "disappear_for_pot": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = PoolConfig::from_json(r#"{ "tracking": { "max_distance": -1 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = PoolConfig::from_json(r#"{ "game": { "pocket_radius": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = PoolConfig::from_json(r#"{ "table": { "table_w": 60, "margin": 30 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let mut config = PoolConfig::default();
        config.tracking.max_distance = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.tracking.max_distance = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn huge_margin_is_invalid_not_overflow() {
        let json = r#"{ "table": { "table_w": 2000, "table_h": 1000, "margin": 3000000000 } }"#;
        let err = PoolConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let json = r#"{ "table": { "table_w": 2000, "table_h": 1000, "margin": 2147483648 } }"#;
        assert!(PoolConfig::from_json(json).is_err());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = PoolConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PoolConfig::load("/nonexistent/poolmind.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
