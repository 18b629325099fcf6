use crate::app_dirs::AppDirs;
use crate::geometry::Size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Geometry of the spelling games' letter slots and tray.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub token_size: f64,
    pub gap: f64,
    pub margin: f64,
    pub top_reserved: f64,
    pub bottom_reserved: f64,
    pub tray_height: f64,
    pub jitter: f64,
    pub max_rotation_deg: f64,
    pub max_blanks: usize,
    pub alphabet: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            token_size: 48.0,
            gap: 8.0,
            margin: 16.0,
            top_reserved: 96.0,
            bottom_reserved: 200.0,
            tray_height: 180.0,
            jitter: 4.0,
            max_rotation_deg: 8.0,
            max_blanks: 5,
            alphabet: "ABCDEFGHIJKLMNOPQRSTUVWXYZ".to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn token(&self) -> Size {
        Size::square(self.token_size)
    }
}

/// Card footprint and capacity bounds for the pairing game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    pub card_width: f64,
    pub card_height: f64,
    pub spacing: f64,
    pub max_attempts: usize,
    pub fill_ratio: f64,
    pub min_capacity: usize,
    pub max_capacity: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            card_width: 96.0,
            card_height: 64.0,
            spacing: 8.0,
            max_attempts: 100,
            fill_ratio: 0.5,
            min_capacity: 6,
            max_capacity: 16,
        }
    }
}

impl PlacementConfig {
    pub fn card(&self) -> Size {
        Size::new(self.card_width, self.card_height)
    }
}

/// Feedback holds and animation pacing, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Timing {
    pub correct_hold_ms: u64,
    pub pairing_incorrect_hold_ms: u64,
    pub spelling_incorrect_hold_ms: u64,
    pub celebration_hold_ms: u64,
    pub path_step_delay_ms: u64,
    pub path_steps_per_segment: usize,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            correct_hold_ms: 1000,
            pairing_incorrect_hold_ms: 1500,
            spelling_incorrect_hold_ms: 500,
            celebration_hold_ms: 1200,
            path_step_delay_ms: 40,
            path_steps_per_segment: 6,
        }
    }
}

impl Timing {
    pub fn correct_hold(&self) -> Duration {
        Duration::from_millis(self.correct_hold_ms)
    }

    pub fn pairing_incorrect_hold(&self) -> Duration {
        Duration::from_millis(self.pairing_incorrect_hold_ms)
    }

    pub fn spelling_incorrect_hold(&self) -> Duration {
        Duration::from_millis(self.spelling_incorrect_hold_ms)
    }

    pub fn celebration_hold(&self) -> Duration {
        Duration::from_millis(self.celebration_hold_ms)
    }

    pub fn path_step_delay(&self) -> Duration {
        Duration::from_millis(self.path_step_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub placement: PlacementConfig,
    pub timing: Timing,
    /// Drop radius as a multiple of the dragged token's width.
    pub snap_factor: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            placement: PlacementConfig::default(),
            timing: Timing::default(),
            snap_factor: 1.0,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {v}"),
                })
            }
        }

        positive("layout.token_size", self.layout.token_size)?;
        positive("placement.card_width", self.placement.card_width)?;
        positive("placement.card_height", self.placement.card_height)?;
        positive("placement.fill_ratio", self.placement.fill_ratio)?;
        positive("snap_factor", self.snap_factor)?;

        if self.placement.min_capacity < 2 || self.placement.min_capacity > self.placement.max_capacity {
            return Err(ConfigError::Invalid {
                field: "placement.min_capacity",
                reason: format!(
                    "must be at least 2 and not above max_capacity ({})",
                    self.placement.max_capacity
                ),
            });
        }
        if self.placement.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "placement.max_attempts",
                reason: "must allow at least one attempt".to_string(),
            });
        }
        if self.layout.max_blanks == 0 {
            return Err(ConfigError::Invalid {
                field: "layout.max_blanks",
                reason: "must allow at least one blank".to_string(),
            });
        }
        if self.timing.path_steps_per_segment == 0 {
            return Err(ConfigError::Invalid {
                field: "timing.path_steps_per_segment",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("lexidrag_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like [`ConfigStore::load`] but reports why the file could not be used.
    pub fn try_load(&self) -> Result<Config, ConfigError> {
        let bytes = fs::read(&self.path)?;
        let cfg = serde_json::from_slice::<Config>(&bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "using default config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"timing": {"correct_hold_ms": 250}, "snap_factor": 1.5}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).try_load().unwrap();
        assert_eq!(cfg.timing.correct_hold_ms, 250);
        assert_eq!(cfg.timing.pairing_incorrect_hold_ms, 1500);
        assert_eq!(cfg.snap_factor, 1.5);
        assert_eq!(cfg.layout, LayoutConfig::default());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_matches!(store.try_load(), Err(ConfigError::Io(_)));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert_matches!(
            FileConfigStore::with_path(&path).try_load(),
            Err(ConfigError::Json(_))
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut cfg = Config::default();
        cfg.placement.min_capacity = 20;
        assert_matches!(
            cfg.validate(),
            Err(ConfigError::Invalid {
                field: "placement.min_capacity",
                ..
            })
        );

        let mut cfg = Config::default();
        cfg.layout.token_size = 0.0;
        assert_matches!(cfg.validate(), Err(ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }
}
