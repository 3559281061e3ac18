//! # Core configuration
//!
//! Settings for the runtime substrate: pool sizing, frame timing and logging.
//!
//! ```toml
//! [pools.default]
//! initial_size = 32
//! max_size = 256
//!
//! [pools.overrides.bullets]
//! initial_size = 64
//! max_size = 512
//!
//! [frame]
//! target_fps = 60
//! max_frame_delta = 0.25
//!
//! [logging]
//! level = "info"
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Initial and maximum size of one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSizing {
    /// Instances pre-built at construction
    pub initial_size: usize,
    /// Hard cap on constructed instances
    pub max_size: usize,
}

impl PoolSizing {
    /// Create a sizing
    pub const fn new(initial_size: usize, max_size: usize) -> Self {
        Self {
            initial_size,
            max_size,
        }
    }
}

impl Default for PoolSizing {
    fn default() -> Self {
        Self::new(32, 256)
    }
}

/// Pool sizing with per-spawner overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Sizing for spawners without an override
    pub default: PoolSizing,
    /// Sizing by spawner name
    pub overrides: HashMap<String, PoolSizing>,
}

impl PoolConfig {
    /// Sizing for the named spawner
    pub fn sizing_for(&self, name: &str) -> PoolSizing {
        self.overrides.get(name).copied().unwrap_or(self.default)
    }
}

/// Frame timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Frame rate the driver aims for
    pub target_fps: u32,
    /// Longest delta handed to systems, in seconds
    pub max_frame_delta: f32,
}

impl FrameConfig {
    /// Fixed step matching `target_fps`
    #[allow(clippy::cast_precision_loss)]
    pub fn fixed_delta(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_frame_delta: 0.25,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `env_logger` filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

/// Root configuration of the runtime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Pool sizing
    pub pools: PoolConfig,
    /// Frame timing
    pub frame: FrameConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl Config for CoreConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let sizings = std::iter::once(("default", &self.pools.default))
            .chain(self.pools.overrides.iter().map(|(name, sizing)| (name.as_str(), sizing)));
        for (name, sizing) in sizings {
            if sizing.max_size == 0 {
                return Err(ConfigError::Invalid(format!("pool '{name}' has max_size 0")));
            }
            if sizing.initial_size > sizing.max_size {
                return Err(ConfigError::Invalid(format!(
                    "pool '{name}' initial_size {} exceeds max_size {}",
                    sizing.initial_size, sizing.max_size
                )));
            }
        }

        if self.frame.target_fps == 0 {
            return Err(ConfigError::Invalid("frame.target_fps must be positive".into()));
        }
        if !(self.frame.max_frame_delta.is_finite() && self.frame.max_frame_delta > 0.0) {
            return Err(ConfigError::Invalid("frame.max_frame_delta must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pools.sizing_for("anything"), PoolSizing::new(32, 256));
        assert_relative_eq!(config.frame.fixed_delta(), 1.0 / 60.0);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: CoreConfig = toml::from_str(
            r#"
            [pools.overrides.bullets]
            max_size = 512

            [logging]
            level = "debug"
            "#,
        )
        .expect("parse");

        assert_eq!(config.pools.sizing_for("bullets"), PoolSizing::new(32, 512));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.frame, FrameConfig::default());
    }

    #[test]
    fn test_toml_and_ron_files_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = CoreConfig::default();
        config.pools.overrides.insert("sparks".into(), PoolSizing::new(8, 64));
        config.frame.target_fps = 30;

        for file in ["core.toml", "core.ron"] {
            let path = dir.path().join(file);
            config.save_to_file(&path).expect("save");
            let loaded = CoreConfig::load_from_file(&path).expect("load");
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_invalid_and_unsupported_files() {
        let dir = tempfile::tempdir().expect("tempdir");

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[pools.default]\ninitial_size = 10\nmax_size = 4\n").expect("write");
        assert!(matches!(CoreConfig::load_from_file(&bad), Err(ConfigError::Invalid(_))));

        let json = dir.path().join("core.json");
        assert!(matches!(
            CoreConfig::default().save_to_file(&json),
            Err(ConfigError::UnsupportedFormat(_))
        ));

        let garbage = dir.path().join("garbage.ron");
        std::fs::write(&garbage, "not ron at all (").expect("write");
        assert!(matches!(CoreConfig::load_from_file(&garbage), Err(ConfigError::Parse(_))));
    }
}
