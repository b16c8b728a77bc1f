//! Configuration - per-engine defaults loaded from TOML
//!
//! Every section is optional and falls back to its defaults. Durations are
//! written in milliseconds.
//!
//! ```toml
//! reduced_motion = "auto"   # or "reduce" / "no-preference"
//!
//! [typewriter]
//! type_speed = 60
//! loop = true
//!
//! [rolling]
//! pause = 1500
//! items = [{ text = "Rust", icon = "crab" }, { text = "Go" }]
//!
//! [tilt]
//! intensity = 12.0
//! spring = { stiffness = 200.0, damping = 25.0 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::{
    CursorConfig, GlitchConfig, MagneticConfig, RollingConfig, SplitConfig, TiltConfig,
    TypewriterConfig,
};
use crate::error::{ConfigError, MotionError};
use crate::state::context::MotionContext;
use crate::state::reduced_motion::ReducedMotion;
use crate::state::timeline::Timeline;

/// Where the reduced-motion preference comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReducedMotionMode {
    /// Read the environment (`SPARK_MOTION_REDUCED`).
    #[default]
    Auto,
    Reduce,
    NoPreference,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub reduced_motion: ReducedMotionMode,
    pub typewriter: TypewriterConfig,
    pub rolling: RollingConfig,
    pub split: SplitConfig,
    pub tilt: TiltConfig,
    pub magnetic: MagneticConfig,
    pub cursor: CursorConfig,
    pub glitch: GlitchConfig,
}

impl MotionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: MotionConfig = toml::from_str(content).map_err(ConfigError::Syntax)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`.
    ///
    /// - If the file doesn't exist, returns `MotionConfig::default()`.
    /// - Otherwise parses it as TOML and validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no motion config, using defaults");
            return Ok(MotionConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: MotionConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        tracing::info!(path = %path.display(), "motion config loaded");
        Ok(config)
    }

    /// Checks timing and physics values. An empty rolling item list is
    /// allowed here; the engine refuses to start on it.
    pub fn validate(&self) -> Result<(), MotionError> {
        self.typewriter.validate()?;
        if self.rolling.type_speed.is_zero() {
            return Err(MotionError::ZeroDuration {
                field: "rolling.type_speed",
            });
        }
        if self.glitch.speed.is_zero() {
            return Err(MotionError::ZeroDuration {
                field: "glitch.speed",
            });
        }
        self.tilt.validate()?;
        self.magnetic.validate()?;
        self.cursor.spring.validate("cursor.spring")?;
        self.cursor.ring_spring.validate("cursor.ring_spring")?;
        Ok(())
    }

    pub fn reduced_motion_provider(&self) -> ReducedMotion {
        match self.reduced_motion {
            ReducedMotionMode::Auto => ReducedMotion::from_env(),
            ReducedMotionMode::Reduce => ReducedMotion::fixed(true),
            ReducedMotionMode::NoPreference => ReducedMotion::fixed(false),
        }
    }

    /// Fresh timeline plus this config's reduced-motion provider.
    pub fn context(&self) -> MotionContext {
        MotionContext::new(Timeline::new(), self.reduced_motion_provider())
    }
}

/// Serde helpers for `Duration` fields written as whole milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }

    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(duration) => super::serialize(duration, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
        }
    }
}
