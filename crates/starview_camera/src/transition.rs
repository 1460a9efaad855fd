//! Timed pose transitions
//!
//! A transition moves the camera from its current pose to a requested one
//! in two phases: a rotation phase that re-aims the look-at target, then a
//! position phase that moves the camera. At most one transition is active;
//! a new request replaces the running one without notifying anybody.
//!
//! # Duration policy
//!
//! Total duration grows with the distance travelled:
//!
//! ```text
//! total = clamp(base + k * log10(1 + distance), min, max)
//! ```
//!
//! When both target and position change, the rotation phase gets
//! `clamp(angle / pi, min_fraction, max_fraction)` of the total, where
//! `angle` is the reorientation needed from the current forward vector.
//! Phases shorter than the negligible threshold are skipped and their time
//! goes to the other phase.

use crate::config::TransitionTuning;
use crate::events::TransitionId;
use crate::follow::FollowRequest;
use crate::pose::CameraPose;
use crate::tween::Tween;
use glam::Vec3;
use std::f32::consts::PI;
use tracing::{debug, trace};

/// What a transition animates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Position and target
    Pose,
    /// Target only, position fixed
    TargetOnly,
}

/// Caller-supplied metadata attached to a transition request
#[derive(Clone, Debug, Default)]
pub struct TransitionOptions {
    /// Label of the object being focused, reported on completion
    pub focus: Option<String>,
    /// Object to follow once the camera arrives
    pub follow: Option<FollowRequest>,
}

impl TransitionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `label` as the focused object on completion
    pub fn focus(mut self, label: impl Into<String>) -> Self {
        self.focus = Some(label.into());
        self
    }

    /// Follow `request` once the camera arrives
    pub fn follow(mut self, request: FollowRequest) -> Self {
        self.follow = Some(request);
        self
    }
}

/// Computed timing of one transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionPlan {
    pub kind: TransitionKind,
    pub start: CameraPose,
    pub end: CameraPose,
    /// Seconds from request to arrival
    pub total_duration: f32,
    /// Seconds spent re-aiming the target
    pub rotation_duration: f32,
    /// Seconds spent moving the camera, after the rotation phase
    pub position_duration: f32,
}

impl TransitionPlan {
    /// Work out durations for a move from `start` to `end`
    pub fn compute(
        start: CameraPose,
        end: CameraPose,
        kind: TransitionKind,
        tuning: &TransitionTuning,
    ) -> Self {
        let end = match kind {
            TransitionKind::Pose => end,
            TransitionKind::TargetOnly => start.with_target(end.target),
        };

        let eps = tuning.pose_epsilon;
        let target_changed = !start.target.abs_diff_eq(end.target, eps);
        let position_changed = !start.position.abs_diff_eq(end.position, eps);

        let distance = if position_changed {
            start.position.distance(end.position)
        } else {
            start.target.distance(end.target)
        };
        let total = travel_duration(distance, tuning);

        let (rotation, position) = match (target_changed, position_changed) {
            (true, true) => {
                let fraction = rotation_fraction(start.reorientation_angle(end.target), tuning);
                let rotation = total * fraction;
                (rotation, total - rotation)
            }
            (true, false) => (total, 0.0),
            (false, true) => (0.0, total),
            (false, false) => (0.0, 0.0),
        };
        let (rotation, position) = skip_negligible(rotation, position, tuning.negligible_duration);

        Self {
            kind,
            start,
            end,
            total_duration: rotation + position,
            rotation_duration: rotation,
            position_duration: position,
        }
    }

    /// True when start and end coincide within `epsilon`
    pub fn is_degenerate(&self, epsilon: f32) -> bool {
        self.start.approx_eq(&self.end, epsilon)
    }
}

/// Total duration for a given travel distance
///
/// Non-decreasing in `distance` and always within
/// `[min_duration, max_duration]`.
pub fn travel_duration(distance: f32, tuning: &TransitionTuning) -> f32 {
    let distance = if distance.is_finite() { distance.max(0.0) } else { f32::MAX };
    let raw = tuning.base_duration + tuning.distance_factor * (1.0 + distance).log10();
    raw.clamp(tuning.min_duration, tuning.max_duration)
}

/// Share of the total given to the rotation phase for a reorientation of
/// `angle` radians
pub fn rotation_fraction(angle: f32, tuning: &TransitionTuning) -> f32 {
    let normalized = if angle.is_finite() { angle.abs() / PI } else { 1.0 };
    normalized.clamp(tuning.min_rotation_fraction, tuning.max_rotation_fraction)
}

fn skip_negligible(rotation: f32, position: f32, threshold: f32) -> (f32, f32) {
    if rotation < threshold {
        (0.0, (position + rotation).max(0.0))
    } else if position < threshold {
        (rotation + position, 0.0)
    } else {
        (rotation, position)
    }
}

/// A transition that ran to its end pose
#[derive(Clone, Debug)]
pub struct FinishedTransition {
    pub id: TransitionId,
    pub plan: TransitionPlan,
    /// Exactly `plan.end`
    pub pose: CameraPose,
    pub options: TransitionOptions,
}

/// Outcome of a transition request
#[derive(Clone, Debug)]
pub enum TransitionStart {
    /// The transition is now running
    Started {
        id: TransitionId,
        plan: TransitionPlan,
        /// Running transition that was silently replaced
        superseded: Option<TransitionId>,
    },
    /// Start and end coincide; finished without animating
    Immediate {
        finished: FinishedTransition,
        superseded: Option<TransitionId>,
    },
}

/// Result of advancing the engine by one tick
#[derive(Clone, Debug)]
pub enum TransitionStep {
    /// Nothing running
    Idle,
    /// Still running; the pose for this tick
    Running(CameraPose),
    /// Arrived this tick
    Completed(FinishedTransition),
}

#[derive(Clone, Debug)]
struct ActiveTransition {
    id: TransitionId,
    plan: TransitionPlan,
    rotation: Tween<Vec3>,
    position: Tween<Vec3>,
    elapsed: f32,
    options: TransitionOptions,
}

impl ActiveTransition {
    /// Add `dt` to the transition clock and move both phase clocks with it.
    /// The position phase starts when the rotation phase ends.
    fn tick(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.rotation.set_elapsed(self.elapsed);
        self.position.set_elapsed(self.elapsed - self.plan.rotation_duration);
    }

    fn pose(&self) -> CameraPose {
        CameraPose::new(self.position.sample(), self.rotation.sample())
    }

    fn finish(self) -> FinishedTransition {
        FinishedTransition {
            id: self.id,
            plan: self.plan,
            pose: self.plan.end,
            options: self.options,
        }
    }
}

/// Drives the single active transition
#[derive(Debug)]
pub struct TransitionEngine {
    tuning: TransitionTuning,
    active: Option<ActiveTransition>,
    next_id: u64,
}

impl TransitionEngine {
    pub fn new(tuning: TransitionTuning) -> Self {
        Self {
            tuning,
            active: None,
            next_id: 1,
        }
    }

    pub fn tuning(&self) -> &TransitionTuning {
        &self.tuning
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Id of the running transition
    pub fn active_id(&self) -> Option<TransitionId> {
        self.active.as_ref().map(|t| t.id)
    }

    /// Plan of the running transition
    pub fn active_plan(&self) -> Option<&TransitionPlan> {
        self.active.as_ref().map(|t| &t.plan)
    }

    /// Seconds elapsed in the running transition
    pub fn elapsed(&self) -> Option<f32> {
        self.active.as_ref().map(|t| t.elapsed)
    }

    /// Start a transition from `current`, replacing any running one
    pub fn start(
        &mut self,
        current: CameraPose,
        end: CameraPose,
        kind: TransitionKind,
        options: TransitionOptions,
    ) -> TransitionStart {
        let superseded = self.active.take().map(|previous| {
            debug!(
                "TransitionEngine: transition {} superseded after {:.3}s ({:.0}% travelled)",
                previous.id,
                previous.elapsed,
                previous.position.progress() * 100.0
            );
            previous.id
        });

        let id = TransitionId(self.next_id);
        self.next_id += 1;

        let plan = TransitionPlan::compute(current, end, kind, &self.tuning);

        if plan.is_degenerate(self.tuning.pose_epsilon) || plan.total_duration <= 0.0 {
            debug!("TransitionEngine: transition {} completes immediately", id);
            return TransitionStart::Immediate {
                finished: FinishedTransition {
                    id,
                    plan,
                    pose: plan.end,
                    options,
                },
                superseded,
            };
        }

        debug!(
            "TransitionEngine: transition {} ({:?}) {:.3}s = rotation {:.3}s + position {:.3}s",
            id, kind, plan.total_duration, plan.rotation_duration, plan.position_duration
        );

        self.active = Some(ActiveTransition {
            id,
            plan,
            rotation: Tween::new(
                plan.start.target,
                plan.end.target,
                plan.rotation_duration,
                self.tuning.rotation_easing,
            ),
            position: Tween::new(
                plan.start.position,
                plan.end.position,
                plan.position_duration,
                self.tuning.position_easing,
            ),
            elapsed: 0.0,
            options,
        });

        TransitionStart::Started {
            id,
            plan,
            superseded,
        }
    }

    /// Advance the running transition by `dt` seconds
    pub fn advance(&mut self, dt: f32) -> TransitionStep {
        let Some(active) = self.active.as_mut() else {
            return TransitionStep::Idle;
        };

        active.tick(dt);

        if active.elapsed >= active.plan.total_duration {
            return match self.active.take() {
                Some(done) => TransitionStep::Completed(done.finish()),
                None => TransitionStep::Idle,
            };
        }

        let pose = active.pose();
        trace!(
            "TransitionEngine: {} at {:.3}s -> {:?}",
            active.id,
            active.elapsed,
            pose
        );
        TransitionStep::Running(pose)
    }

    /// Stop the running transition where it stands
    ///
    /// Returns the id of the cancelled transition. Never produces a
    /// completion.
    pub fn cancel(&mut self) -> Option<TransitionId> {
        let cancelled = self.active.take()?;
        debug!(
            "TransitionEngine: transition {} cancelled after {:.3}s",
            cancelled.id, cancelled.elapsed
        );
        Some(cancelled.id)
    }
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self::new(TransitionTuning::default())
    }
}
