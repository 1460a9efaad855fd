//! Camera configuration
//!
//! Static tuning for the interactive controller and the transition
//! engine, loadable from TOML:
//!
//! ```toml
//! [controller]
//! damping = 0.85
//! min_distance = 5.0
//! max_distance = 5000.0
//!
//! [transition]
//! base_duration = 0.6
//! distance_factor = 0.5
//! rotation_easing = "ease-in-out-cubic"
//! position_easing = "ease-out-cubic"
//! ```
//!
//! Missing fields fall back to their defaults.

use crate::easing::Easing;
use crate::error::{CameraError, Result};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fs;
use std::path::Path;

// =============================================================================
// Top-level config
// =============================================================================

/// Full camera configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub transition: TransitionTuning,
}

impl CameraConfig {
    /// Parse and validate a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: CameraConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every tuning value is usable
    pub fn validate(&self) -> Result<()> {
        self.controller.validate()?;
        self.transition.validate()
    }
}

// =============================================================================
// Interactive controller
// =============================================================================

/// Tuning for the damped orbit/zoom/pan controller
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ControllerConfig {
    /// Fraction of the remaining motion retained per 60 Hz frame
    /// (0 = instant, approaching 1 = very smooth)
    #[serde(default = "default_damping")]
    pub damping: f32,
    /// Disable to apply input instantly
    #[serde(default = "default_true")]
    pub enable_damping: bool,
    /// Closest zoom distance to the pivot
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    /// Farthest zoom distance from the pivot
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    /// Smallest angle from the up axis (radians)
    #[serde(default = "default_min_polar_angle")]
    pub min_polar_angle: f32,
    /// Largest angle from the up axis (radians)
    #[serde(default = "default_max_polar_angle")]
    pub max_polar_angle: f32,
    /// Rotation sensitivity (radians per pixel)
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f32,
    /// Zoom sensitivity (fraction of distance per wheel step)
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
    /// Pan sensitivity (fraction of distance per pixel)
    #[serde(default = "default_pan_speed")]
    pub pan_speed: f32,
    #[serde(default = "default_true")]
    pub rotate_enabled: bool,
    #[serde(default = "default_true")]
    pub zoom_enabled: bool,
    #[serde(default = "default_true")]
    pub pan_enabled: bool,
}

fn default_damping() -> f32 {
    0.85
}

fn default_true() -> bool {
    true
}

fn default_min_distance() -> f32 {
    1.0
}

fn default_max_distance() -> f32 {
    10_000.0
}

fn default_min_polar_angle() -> f32 {
    0.01
}

fn default_max_polar_angle() -> f32 {
    PI - 0.01
}

fn default_rotate_speed() -> f32 {
    0.005
}

fn default_zoom_speed() -> f32 {
    0.1
}

fn default_pan_speed() -> f32 {
    0.001
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            enable_damping: true,
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            min_polar_angle: default_min_polar_angle(),
            max_polar_angle: default_max_polar_angle(),
            rotate_speed: default_rotate_speed(),
            zoom_speed: default_zoom_speed(),
            pan_speed: default_pan_speed(),
            rotate_enabled: true,
            zoom_enabled: true,
            pan_enabled: true,
        }
    }
}

impl ControllerConfig {
    /// Check ranges
    pub fn validate(&self) -> Result<()> {
        ensure_finite("controller.damping", self.damping)?;
        ensure_finite("controller.min_distance", self.min_distance)?;
        ensure_finite("controller.max_distance", self.max_distance)?;
        ensure_finite("controller.min_polar_angle", self.min_polar_angle)?;
        ensure_finite("controller.max_polar_angle", self.max_polar_angle)?;
        ensure_finite("controller.rotate_speed", self.rotate_speed)?;
        ensure_finite("controller.zoom_speed", self.zoom_speed)?;
        ensure_finite("controller.pan_speed", self.pan_speed)?;

        if !(0.0..1.0).contains(&self.damping) {
            return Err(invalid(format!(
                "controller.damping must be in [0, 1), got {}",
                self.damping
            )));
        }
        if self.min_distance <= 0.0 || self.min_distance > self.max_distance {
            return Err(invalid(format!(
                "controller distance range [{}, {}] is empty or non-positive",
                self.min_distance, self.max_distance
            )));
        }
        if self.min_polar_angle < 0.0
            || self.max_polar_angle > PI
            || self.min_polar_angle > self.max_polar_angle
        {
            return Err(invalid(format!(
                "controller polar range [{}, {}] must lie within [0, pi]",
                self.min_polar_angle, self.max_polar_angle
            )));
        }
        Ok(())
    }

    /// Per-frame interpolation factor for a tick of `dt` seconds
    pub fn smoothing_factor(&self, dt: f32) -> f32 {
        if !self.enable_damping {
            return 1.0;
        }
        1.0 - self.damping.powf(dt * 60.0)
    }
}

// =============================================================================
// Transition engine
// =============================================================================

/// Tuning for transition durations and phase split
///
/// Total duration is `base_duration + distance_factor * log10(1 + distance)`
/// clamped to `[min_duration, max_duration]`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TransitionTuning {
    /// Duration at zero travel distance (seconds)
    #[serde(default = "default_base_duration")]
    pub base_duration: f32,
    /// Seconds added per decade of travel distance
    #[serde(default = "default_distance_factor")]
    pub distance_factor: f32,
    #[serde(default = "default_min_duration")]
    pub min_duration: f32,
    #[serde(default = "default_max_duration")]
    pub max_duration: f32,
    /// Smallest share of the duration given to re-aiming
    #[serde(default = "default_min_rotation_fraction")]
    pub min_rotation_fraction: f32,
    /// Largest share of the duration given to re-aiming
    #[serde(default = "default_max_rotation_fraction")]
    pub max_rotation_fraction: f32,
    /// Phases shorter than this are skipped (seconds)
    #[serde(default = "default_negligible_duration")]
    pub negligible_duration: f32,
    /// Tolerance for treating two poses as equal
    #[serde(default = "default_pose_epsilon")]
    pub pose_epsilon: f32,
    #[serde(default = "default_rotation_easing")]
    pub rotation_easing: Easing,
    #[serde(default = "default_position_easing")]
    pub position_easing: Easing,
}

fn default_base_duration() -> f32 {
    0.6
}

fn default_distance_factor() -> f32 {
    0.5
}

fn default_min_duration() -> f32 {
    0.5
}

fn default_max_duration() -> f32 {
    3.0
}

fn default_min_rotation_fraction() -> f32 {
    0.1
}

fn default_max_rotation_fraction() -> f32 {
    0.5
}

fn default_negligible_duration() -> f32 {
    0.001
}

fn default_pose_epsilon() -> f32 {
    1e-4
}

fn default_rotation_easing() -> Easing {
    Easing::EaseInOutCubic
}

fn default_position_easing() -> Easing {
    Easing::EaseOutCubic
}

impl Default for TransitionTuning {
    fn default() -> Self {
        Self {
            base_duration: default_base_duration(),
            distance_factor: default_distance_factor(),
            min_duration: default_min_duration(),
            max_duration: default_max_duration(),
            min_rotation_fraction: default_min_rotation_fraction(),
            max_rotation_fraction: default_max_rotation_fraction(),
            negligible_duration: default_negligible_duration(),
            pose_epsilon: default_pose_epsilon(),
            rotation_easing: default_rotation_easing(),
            position_easing: default_position_easing(),
        }
    }
}

impl TransitionTuning {
    /// Check ranges
    pub fn validate(&self) -> Result<()> {
        ensure_finite("transition.base_duration", self.base_duration)?;
        ensure_finite("transition.distance_factor", self.distance_factor)?;
        ensure_finite("transition.min_duration", self.min_duration)?;
        ensure_finite("transition.max_duration", self.max_duration)?;
        ensure_finite("transition.min_rotation_fraction", self.min_rotation_fraction)?;
        ensure_finite("transition.max_rotation_fraction", self.max_rotation_fraction)?;
        ensure_finite("transition.negligible_duration", self.negligible_duration)?;
        ensure_finite("transition.pose_epsilon", self.pose_epsilon)?;

        if self.distance_factor < 0.0 {
            return Err(invalid(format!(
                "transition.distance_factor must be non-negative, got {}",
                self.distance_factor
            )));
        }
        if self.min_duration < 0.0 || self.min_duration > self.max_duration {
            return Err(invalid(format!(
                "transition duration range [{}, {}] is empty or negative",
                self.min_duration, self.max_duration
            )));
        }
        if self.min_rotation_fraction < 0.0
            || self.max_rotation_fraction > 1.0
            || self.min_rotation_fraction > self.max_rotation_fraction
        {
            return Err(invalid(format!(
                "transition rotation fraction range [{}, {}] must lie within [0, 1]",
                self.min_rotation_fraction, self.max_rotation_fraction
            )));
        }
        if self.negligible_duration < 0.0 || self.pose_epsilon < 0.0 {
            return Err(invalid(
                "transition thresholds must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn ensure_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{} must be finite, got {}", name, value)))
    }
}

fn invalid(message: String) -> CameraError {
    CameraError::InvalidConfig(message)
}
