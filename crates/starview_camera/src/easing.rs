//! Easing curves for timed transitions

use serde::{Deserialize, Serialize};

/// Easing function mapping linear progress to eased progress
///
/// Every curve maps 0 to 0 and 1 to 1. Input outside [0, 1] is clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Quadratic acceleration from rest
    EaseInQuad,
    /// Quadratic deceleration to rest
    EaseOutQuad,
    /// Quadratic acceleration then deceleration
    EaseInOutQuad,
    /// Cubic acceleration from rest
    EaseInCubic,
    /// Cubic deceleration to rest
    EaseOutCubic,
    /// Cubic acceleration then deceleration
    EaseInOutCubic,
}

impl Easing {
    /// Apply the curve to a progress value
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}
