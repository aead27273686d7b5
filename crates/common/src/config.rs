//! Game configuration loaded from YAML.
//!
//! Every field has a default, so an empty document yields `GameConfig::default()`.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Tuning and setup parameters for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Duration of one physics/logic tick in seconds.
    pub fixed_step: f64,
    /// Vertical gravity acceleration applied to dynamic bodies.
    pub gravity: f32,
    /// Walk speed along the local forward axis, units per second.
    pub walk_speed: f32,
    /// Turn rate around the vertical axis, radians per second.
    pub rotation_speed: f32,
    /// Half of the cylindrical part of the player capsule.
    pub capsule_half_height: f32,
    pub capsule_radius: f32,
    /// Maximum ledge height the character controller climbs automatically.
    pub step_height: f32,
    /// Cannon pitch change per mouse count, degrees.
    pub pitch_speed: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,
    /// Maximum number of bodies the physics world may hold.
    pub max_bodies: usize,
    /// Chase camera mount, relative to the player body node.
    pub camera_offset: [f32; 3],
    /// Sight point, relative to the player body node.
    pub sight_offset: [f32; 3],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 60.0,
            gravity: -9.81,
            walk_speed: 5.0,
            rotation_speed: 2.0,
            capsule_half_height: 0.9,
            capsule_radius: 0.5,
            step_height: 0.35,
            pitch_speed: 0.2,
            pitch_min: 0.0,
            pitch_max: 60.0,
            max_bodies: 1024,
            camera_offset: [0.0, 3.0, 6.0],
            sight_offset: [0.0, 1.0, -10.0],
        }
    }
}

impl GameConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_step.is_finite() && self.fixed_step > 0.0) {
            return Err(invalid("fixed_step", "must be a positive number of seconds"));
        }
        if !(self.walk_speed >= 0.0) {
            return Err(invalid("walk_speed", "must not be negative"));
        }
        if !(self.capsule_half_height > 0.0) {
            return Err(invalid("capsule_half_height", "must be positive"));
        }
        if !(self.capsule_radius > 0.0) {
            return Err(invalid("capsule_radius", "must be positive"));
        }
        if self.pitch_min > self.pitch_max {
            return Err(invalid(
                "pitch_min",
                format!("{} is above pitch_max {}", self.pitch_min, self.pitch_max),
            ));
        }
        if self.max_bodies == 0 {
            return Err(invalid("max_bodies", "must allow at least one body"));
        }
        Ok(())
    }

    /// Distance from the capsule center to its bottom.
    pub fn capsule_total_half_height(&self) -> f32 {
        self.capsule_half_height + self.capsule_radius
    }

    pub fn camera_offset(&self) -> Vec3 {
        Vec3::from_array(self.camera_offset)
    }

    pub fn sight_offset(&self) -> Vec3 {
        Vec3::from_array(self.sight_offset)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
