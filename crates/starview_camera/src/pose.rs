//! Camera pose
//!
//! A pose is a camera position plus the point it looks at. The up vector
//! is implicit and always [`WORLD_UP`].

use glam::Vec3;

/// Implicit up vector shared by every pose
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Position and look-at target of the virtual camera
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
}

impl CameraPose {
    /// Create a pose from a position and look-at target
    pub const fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Unit vector from position toward target (zero if they coincide)
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Distance between position and target
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Pose shifted rigidly by `delta`
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            position: self.position + delta,
            target: self.target + delta,
        }
    }

    /// Same position, new look-at target
    pub fn with_target(&self, target: Vec3) -> Self {
        Self {
            position: self.position,
            target,
        }
    }

    /// Angle (radians) between the current forward vector and the direction
    /// from the current position toward `new_target`.
    ///
    /// Returns 0 when either direction is undefined.
    pub fn reorientation_angle(&self, new_target: Vec3) -> f32 {
        let forward = self.forward();
        let toward = (new_target - self.position).normalize_or_zero();
        if forward == Vec3::ZERO || toward == Vec3::ZERO {
            return 0.0;
        }
        forward.dot(toward).clamp(-1.0, 1.0).acos()
    }

    /// Component-wise comparison of both vectors within `epsilon`
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && self.target.abs_diff_eq(other.target, epsilon)
    }

    /// True if every component is finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.target.is_finite()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }
}
