//! Session configuration loaded from TOML.
//!
//! Every section is optional; missing sections and fields fall back to the
//! tuned defaults in [`crate::constants`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    body::BodyConfig,
    collision::{GroundingConfig, Layer},
    movement::{LocomotionConfig, LocomotionModel},
    scoring::ScoreConfig,
    trick::TrickConfig,
};

/// Errors that can occur when loading a session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub body: BodyConfig,
    pub grounding: GroundingConfig,
    /// Locomotion while on skis.
    pub ski: LocomotionConfig,
    /// Locomotion on foot.
    pub walk: LocomotionConfig,
    pub scoring: ScoreConfig,
    pub tricks: TrickConfig,
    /// Contacts on these layers break the chain.
    pub obstacle_layers: Vec<Layer>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            body: BodyConfig::default(),
            grounding: GroundingConfig::default(),
            ski: LocomotionConfig::ski(),
            walk: LocomotionConfig::walk(),
            scoring: ScoreConfig::default(),
            tricks: TrickConfig::default(),
            obstacle_layers: default_obstacle_layers(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate. Missing fields take their default values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PartialSession = toml::from_str(content)?;
        let config = config.into_config()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path`, falling back to the defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default session config");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check(
            self.body.height.is_finite() && self.body.height > 0.0,
            "body.height",
            "must be positive",
        )?;

        let g = &self.grounding;
        check(
            g.probe_margin.is_finite() && g.probe_margin >= 0.0,
            "grounding.probe_margin",
            "must be non-negative",
        )?;
        check(
            g.max_ground_distance.is_finite() && g.max_ground_distance > 0.0,
            "grounding.max_ground_distance",
            "must be positive",
        )?;
        check(
            (0.0..=90.0).contains(&g.max_slope_deg),
            "grounding.max_slope_deg",
            "must be within 0..=90",
        )?;
        check(
            !g.ground_layers.is_empty(),
            "grounding.ground_layers",
            "must name at least one layer",
        )?;

        validate_locomotion(&self.ski, Mode::Ski)?;
        validate_locomotion(&self.walk, Mode::Walk)?;

        let s = &self.scoring;
        check(s.combo_max >= 1.0, "scoring.combo_max", "must be at least 1")?;
        check(
            s.high_speed >= s.min_speed_to_score,
            "scoring.high_speed",
            "must not be below min_speed_to_score",
        )?;
        check(
            s.idle_reset_seconds > 0.0,
            "scoring.idle_reset_seconds",
            "must be positive",
        )?;
        check(
            s.bank_delay >= 0.0 && s.collided_cooldown >= 0.0,
            "scoring.bank_delay",
            "timers must be non-negative",
        )?;
        check(
            s.combo_build_per_second >= 0.0 && s.combo_decay_per_second >= 0.0,
            "scoring.combo_build_per_second",
            "combo rates must be non-negative",
        )?;

        check(
            self.tricks.display_seconds >= 0.0,
            "tricks.display_seconds",
            "must be non-negative",
        )?;
        check(
            self.tricks.catalog.iter().all(|t| t.points >= 0.0),
            "tricks.catalog",
            "trick points must be non-negative",
        )?;

        Ok(())
    }
}

/// Deserialization shadow of [`SessionConfig`] so an absent `walk` table gets the walking
/// preset rather than the skiing one.
#[derive(Deserialize)]
struct PartialSession {
    #[serde(default)]
    body: BodyConfig,
    #[serde(default)]
    grounding: GroundingConfig,
    #[serde(default)]
    ski: LocomotionConfig,
    walk: Option<toml::Value>,
    #[serde(default)]
    scoring: ScoreConfig,
    #[serde(default)]
    tricks: TrickConfig,
    #[serde(default = "default_obstacle_layers")]
    obstacle_layers: Vec<Layer>,
}

impl PartialSession {
    fn into_config(self) -> Result<SessionConfig, ConfigError> {
        let walk = match self.walk {
            Some(patch) => overlay(LocomotionConfig::walk(), patch)?,
            None => LocomotionConfig::walk(),
        };
        Ok(SessionConfig {
            body: self.body,
            grounding: self.grounding,
            ski: self.ski,
            walk,
            scoring: self.scoring,
            tricks: self.tricks,
            obstacle_layers: self.obstacle_layers,
        })
    }
}

fn default_obstacle_layers() -> Vec<Layer> {
    vec![Layer::Obstacle]
}

/// Apply the fields present in `patch` on top of `base`.
fn overlay(base: LocomotionConfig, patch: toml::Value) -> Result<LocomotionConfig, ConfigError> {
    let mut merged = toml::Value::try_from(base).map_err(|_| ConfigError::Invalid {
        field: "walk",
        reason: "walking preset is not representable as TOML",
    })?;
    merge(&mut merged, patch);
    Ok(merged.try_into()?)
}

fn merge(base: &mut toml::Value, patch: toml::Value) {
    match (base, patch) {
        (toml::Value::Table(base), toml::Value::Table(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[derive(Clone, Copy)]
enum Mode {
    Ski,
    Walk,
}

fn validate_locomotion(c: &LocomotionConfig, mode: Mode) -> Result<(), ConfigError> {
    let field = |ski: &'static str, walk: &'static str| match mode {
        Mode::Ski => ski,
        Mode::Walk => walk,
    };

    check(
        c.speed.is_finite() && c.speed >= 0.0,
        field("ski.speed", "walk.speed"),
        "must be non-negative",
    )?;
    check(
        (0.0..=1.0).contains(&c.air_control),
        field("ski.air_control", "walk.air_control"),
        "must be within 0..=1",
    )?;
    check(
        c.ground_drag >= 0.0 && c.velocity_gain >= 0.0,
        field("ski.ground_drag", "walk.ground_drag"),
        "drag and gain must be non-negative",
    )?;
    check(
        c.push.duration >= 0.0 && c.push.extra >= 0.0,
        field("ski.push", "walk.push"),
        "must be non-negative",
    )?;
    if let LocomotionModel::Lerp { rate } = c.model {
        check(
            rate.is_finite() && rate >= 0.0,
            field("ski.model.rate", "walk.model.rate"),
            "must be non-negative",
        )?;
    }
    check(
        c.snap.max_distance >= 0.0 && c.snap.lift >= 0.0,
        field("ski.snap", "walk.snap"),
        "probe lengths must be non-negative",
    )?;
    Ok(())
}

#[inline]
fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::SnapMode;

    #[test]
    fn empty_document_gives_standard_config() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.walk.model, LocomotionModel::DirectVelocity);
        assert_eq!(config.ski.model, LocomotionModel::SlopeProjected);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let toml = r#"
            obstacle_layers = ["Obstacle", "Player"]

            [grounding]
            max_slope_deg = 35.0

            [ski]
            speed = 15.0
            model = { kind = "lerp", rate = 8.0 }

            [walk]
            speed = 4.0

            [walk.snap]
            mode = "position"

            [scoring]
            reset_when_idle = false
            speed_source = "velocity"
        "#;
        let config = SessionConfig::from_toml_str(toml).unwrap();

        assert_eq!(config.grounding.max_slope_deg, 35.0);
        assert_eq!(config.grounding.ground_layers, vec![Layer::Ground]);
        assert_eq!(config.ski.speed, 15.0);
        assert_eq!(config.ski.model, LocomotionModel::Lerp { rate: 8.0 });
        assert_eq!(config.walk.speed, 4.0);
        assert_eq!(config.walk.model, LocomotionModel::DirectVelocity);
        assert!(config.walk.snap.enabled);
        assert_eq!(config.walk.snap.mode, SnapMode::Position);
        assert!(!config.scoring.reset_when_idle);
        assert_eq!(config.scoring.speed_source, crate::scoring::SpeedSource::Velocity);
        assert_eq!(config.obstacle_layers, vec![Layer::Obstacle, Layer::Player]);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = SessionConfig::from_toml_str("[ski]\nair_control = 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "ski.air_control",
                ..
            }
        ));

        let err = SessionConfig::from_toml_str("[scoring]\ncombo_max = 0.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "scoring.combo_max",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SessionConfig::from_toml_str("[ski\nspeed = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error_and_falls_back() {
        let path = Path::new("/definitely/not/here/session.toml");
        assert!(matches!(
            SessionConfig::from_file(path),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(SessionConfig::load_or_default(path), SessionConfig::default());
    }

    #[test]
    fn default_config_validates() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_walk_field_is_a_parse_error() {
        let err = SessionConfig::from_toml_str("[walk]\nspeed = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
