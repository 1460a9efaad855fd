//! Interpolation phases
//!
//! A [`Tween`] is one eased interpolation between two values. It holds its
//! own elapsed time and is sampled as a pure function of that time, so a
//! transition is just a pair of tweens advanced once per tick.

use crate::easing::Easing;
use glam::Vec3;

/// Values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.abs_diff_eq(*other, epsilon)
    }
}

/// One eased interpolation phase
///
/// A tween with zero duration is instant: it samples its end value at any
/// time.
#[derive(Clone, Debug)]
pub struct Tween<T: Interpolate> {
    start: T,
    end: T,
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

impl<T: Interpolate> Tween<T> {
    /// Create a tween in seconds
    pub fn new(start: T, end: T, duration: f32, easing: Easing) -> Self {
        Self {
            start,
            end,
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
        }
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// True for zero-length phases
    pub fn is_instant(&self) -> bool {
        self.duration <= 0.0
    }

    /// Move the phase clock to an absolute time (clamped at 0)
    pub fn set_elapsed(&mut self, elapsed: f32) {
        self.elapsed = elapsed.max(0.0);
    }

    /// Linear progress at an arbitrary phase time (0.0 to 1.0)
    pub fn progress_at(&self, elapsed: f32) -> f32 {
        if self.is_instant() {
            return 1.0;
        }
        (elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Linear progress at the current phase time
    pub fn progress(&self) -> f32 {
        self.progress_at(self.elapsed)
    }

    /// Eased value at an arbitrary phase time
    pub fn sample_at(&self, elapsed: f32) -> T {
        let eased = self.easing.apply(self.progress_at(elapsed));
        self.start.lerp(&self.end, eased)
    }

    /// Eased value at the current phase time
    pub fn sample(&self) -> T {
        self.sample_at(self.elapsed)
    }
}
