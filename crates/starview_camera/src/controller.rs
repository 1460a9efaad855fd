//! Interactive controller
//!
//! Wraps [`OrbitControls`] with enablement, the interaction lifecycle, and
//! the "user changed pose" signal.
//!
//! A change is reported as user-driven only when the controller is enabled
//! and no transition owns the pose. Follow deltas shift the orbit rigidly
//! through [`apply_follow_delta`](InteractiveController::apply_follow_delta)
//! and never show up as user changes.

use crate::config::ControllerConfig;
use crate::orbit::{OrbitControls, OrbitInput};
use crate::pose::CameraPose;
use glam::Vec3;
use tracing::trace;

/// Pose produced by genuine user interaction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UserChange {
    pub pose: CameraPose,
}

/// Enable-aware wrapper around the orbit primitive
#[derive(Clone, Debug)]
pub struct InteractiveController {
    orbit: OrbitControls,
    enabled: bool,
    interacting: bool,
}

impl InteractiveController {
    /// Create an enabled controller placed at `pose`
    pub fn new(pose: &CameraPose, config: ControllerConfig) -> Self {
        Self {
            orbit: OrbitControls::new(pose, config),
            enabled: true,
            interacting: false,
        }
    }

    /// Underlying orbit primitive
    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    /// Orbit pivot
    pub fn pivot(&self) -> Vec3 {
        self.orbit.pivot()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True between `begin_interaction` and `end_interaction`
    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Enable or disable input. Disabling drops pending motion and ends any
    /// interaction in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.orbit.settle();
            self.interacting = false;
        }
        trace!("InteractiveController: enabled = {}", enabled);
    }

    /// Start a drag/gesture. Returns false if input is disabled.
    pub fn begin_interaction(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.interacting = true;
        true
    }

    /// Finish a drag/gesture. Returns true if one was in progress.
    pub fn end_interaction(&mut self) -> bool {
        std::mem::replace(&mut self.interacting, false)
    }

    /// Feed raw input. Returns false if the input was dropped.
    pub fn handle_input(&mut self, input: &OrbitInput) -> bool {
        if !self.enabled || input.is_empty() {
            return false;
        }
        self.orbit.apply_input(input);
        true
    }

    /// Shift the pivot with a followed object
    pub fn apply_follow_delta(&mut self, delta: Vec3) {
        self.orbit.translate(delta);
    }

    /// Snap to a pose set by someone else
    pub fn sync_to_pose(&mut self, pose: &CameraPose) {
        self.orbit.sync_to_pose(pose);
    }

    /// Hand the pose over to a transition: disable, drop pending motion,
    /// and suspend damping.
    pub fn suspend_for_transition(&mut self) {
        self.enabled = false;
        self.interacting = false;
        self.orbit.settle();
        self.orbit.suspend_damping();
    }

    /// Take the pose back after a transition ends
    pub fn resume_after_transition(&mut self, pose: &CameraPose, enabled: bool) {
        self.orbit.sync_to_pose(pose);
        self.orbit.restore_damping();
        self.enabled = enabled;
    }

    /// Run the damping pass
    ///
    /// Returns a [`UserChange`] when the pose moved because of user input.
    pub fn update(&mut self, dt: f32, transition_active: bool) -> Option<UserChange> {
        if !self.enabled || transition_active {
            return None;
        }
        if !self.orbit.update(dt) {
            return None;
        }
        Some(UserChange {
            pose: self.orbit.pose(),
        })
    }
}
