//! Damped orbit controls
//!
//! Orbits around a pivot point, similar to 3D modeling software. Input
//! moves a set of goal values; each update eases the current values toward
//! the goals, which gives the damped feel.
//!
//! Angles are measured three.js style: `polar` from the +Y axis and
//! `azimuth` around it, with azimuth 0 looking down -Z.

use crate::config::ControllerConfig;
use crate::pose::CameraPose;
use glam::{Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Relative gap below which a smoothed value snaps onto its goal
const SETTLE_EPSILON: f32 = 1e-5;

/// Raw input deltas for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitInput {
    /// Rotation drag (pixels)
    pub rotate: Vec2,
    /// Pan drag (pixels)
    pub pan: Vec2,
    /// Wheel steps (positive = zoom in)
    pub zoom: f32,
}

impl OrbitInput {
    /// Rotation-only input
    pub fn rotate(dx: f32, dy: f32) -> Self {
        Self {
            rotate: Vec2::new(dx, dy),
            ..Self::default()
        }
    }

    /// Pan-only input
    pub fn pan(dx: f32, dy: f32) -> Self {
        Self {
            pan: Vec2::new(dx, dy),
            ..Self::default()
        }
    }

    /// Zoom-only input
    pub fn zoom(steps: f32) -> Self {
        Self {
            zoom: steps,
            ..Self::default()
        }
    }

    /// True if the input carries no motion
    pub fn is_empty(&self) -> bool {
        self.rotate == Vec2::ZERO && self.pan == Vec2::ZERO && self.zoom == 0.0
    }
}

/// Spherical camera placement around a pivot
#[derive(Clone, Copy, Debug, PartialEq)]
struct Orbit {
    pivot: Vec3,
    radius: f32,
    azimuth: f32,
    polar: f32,
}

impl Orbit {
    fn from_pose(pose: &CameraPose, min_radius: f32) -> Self {
        let offset = pose.position - pose.target;
        let radius = offset.length();

        if radius < 1e-6 {
            return Self {
                pivot: pose.target,
                radius: min_radius,
                azimuth: 0.0,
                polar: FRAC_PI_2,
            };
        }

        Self {
            pivot: pose.target,
            radius,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azim, cos_azim) = self.azimuth.sin_cos();

        self.pivot
            + Vec3::new(
                self.radius * sin_polar * sin_azim,
                self.radius * cos_polar,
                self.radius * sin_polar * cos_azim,
            )
    }

    fn pose(&self) -> CameraPose {
        CameraPose::new(self.position(), self.pivot)
    }
}

/// Damped orbit/zoom/pan controls
///
/// # Example
///
/// ```ignore
/// let mut orbit = OrbitControls::new(&pose, ControllerConfig::default());
/// orbit.apply_input(&OrbitInput::rotate(12.0, 0.0));
/// while orbit.update(1.0 / 60.0) {
///     render(orbit.pose());
/// }
/// ```
#[derive(Clone, Debug)]
pub struct OrbitControls {
    config: ControllerConfig,
    current: Orbit,
    goal: Orbit,
    damping_suspended: bool,
}

impl OrbitControls {
    /// Create controls placed at `pose`
    pub fn new(pose: &CameraPose, config: ControllerConfig) -> Self {
        let current = Orbit::from_pose(pose, config.min_distance);
        Self {
            config,
            current,
            goal: current,
            damping_suspended: false,
        }
    }

    /// Tuning in use
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Current pose
    pub fn pose(&self) -> CameraPose {
        self.current.pose()
    }

    /// Pivot the camera orbits around
    pub fn pivot(&self) -> Vec3 {
        self.current.pivot
    }

    /// Current distance from the pivot
    pub fn distance(&self) -> f32 {
        self.current.radius
    }

    /// Snap to `pose`, dropping any pending motion
    pub fn sync_to_pose(&mut self, pose: &CameraPose) {
        self.current = Orbit::from_pose(pose, self.config.min_distance);
        self.goal = self.current;
    }

    /// Shift current and goal pivots rigidly. Produces no pending motion.
    pub fn translate(&mut self, delta: Vec3) {
        self.current.pivot += delta;
        self.goal.pivot += delta;
    }

    /// True while current values are still easing toward the goal
    pub fn has_pending_motion(&self) -> bool {
        self.current != self.goal
    }

    /// Drop pending motion where it stands
    pub fn settle(&mut self) {
        self.goal = self.current;
    }

    /// Apply goals instantly until [`restore_damping`](Self::restore_damping)
    pub fn suspend_damping(&mut self) {
        self.damping_suspended = true;
    }

    pub fn restore_damping(&mut self) {
        self.damping_suspended = false;
    }

    pub fn is_damping_suspended(&self) -> bool {
        self.damping_suspended
    }

    /// Feed raw input into the goal values
    pub fn apply_input(&mut self, input: &OrbitInput) {
        let config = &self.config;

        if config.rotate_enabled && input.rotate != Vec2::ZERO {
            self.goal.azimuth -= input.rotate.x * config.rotate_speed;
            self.goal.polar = (self.goal.polar - input.rotate.y * config.rotate_speed)
                .clamp(config.min_polar_angle, config.max_polar_angle);
        }

        if config.pan_enabled && input.pan != Vec2::ZERO {
            let (sin_azim, cos_azim) = self.goal.azimuth.sin_cos();
            let right = Vec3::new(cos_azim, 0.0, -sin_azim);
            let scale = config.pan_speed * self.goal.radius;

            self.goal.pivot -= right * input.pan.x * scale;
            self.goal.pivot += Vec3::Y * input.pan.y * scale;
        }

        if config.zoom_enabled && input.zoom != 0.0 {
            let zoomed = self.goal.radius * (1.0 - input.zoom * config.zoom_speed);
            self.goal.radius = zoomed.clamp(config.min_distance, config.max_distance);
        }
    }

    /// Ease toward the goal, returns true if the pose changed
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.has_pending_motion() {
            return false;
        }

        let t = if self.damping_suspended {
            1.0
        } else {
            self.config.smoothing_factor(dt.max(0.0))
        };
        if t <= 0.0 {
            return false;
        }

        let before = self.current;
        self.current.azimuth = approach(self.current.azimuth, self.goal.azimuth, t);
        self.current.polar = approach(self.current.polar, self.goal.polar, t);
        self.current.radius = approach(self.current.radius, self.goal.radius, t);
        self.current.pivot = Vec3::new(
            approach(self.current.pivot.x, self.goal.pivot.x, t),
            approach(self.current.pivot.y, self.goal.pivot.y, t),
            approach(self.current.pivot.z, self.goal.pivot.z, t),
        );

        self.current != before
    }
}

fn approach(current: f32, goal: f32, t: f32) -> f32 {
    let next = current + (goal - current) * t;
    if (goal - next).abs() < SETTLE_EPSILON * goal.abs().max(1.0) {
        goal
    } else {
        next
    }
}
