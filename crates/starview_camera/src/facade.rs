//! Camera controls facade
//!
//! [`CameraControls`] is the single entry point of the camera core. It owns
//! the authoritative pose and decides, tick by tick, which driver may write
//! it:
//!
//! 1. the follow binding applies the followed object's delta,
//! 2. an active transition overwrites the pose,
//! 3. the interactive controller applies damped user input when no
//!    transition is active,
//! 4. the synchronizer publishes the result.
//!
//! # State machine
//!
//! ```text
//!            request                      completion + follow
//!   Idle ─────────────▶ Transitioning ──────────────────────▶ Following
//!    ▲  ▲                 │      │                              │
//!    │  └── cancel ───────┘      └── completion ──▶ Idle        │
//!    │                                                          │
//!    └──── end_interaction ◀── UserControlled ◀── begin_interaction
//! ```
//!
//! Input fed without `begin_interaction` also enters `UserControlled`; the
//! state falls back once the damped motion settles.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(SharedCameraState::default());
//! let mut controls = CameraControls::new(CameraConfig::default(), store)?;
//!
//! controls.transition_to(
//!     Vec3::new(100.0, 0.0, 100.0),
//!     Vec3::ZERO,
//!     TransitionOptions::new().focus("sun"),
//! );
//!
//! loop {
//!     controls.update(frame_dt);
//! }
//! ```

use crate::config::CameraConfig;
use crate::controller::InteractiveController;
use crate::error::{CameraError, Result};
use crate::events::{CameraEvent, SubscriptionId, TransitionCompleted, TransitionId};
use crate::follow::{FollowBinding, FollowRequest, FollowStep, NodeHandle};
use crate::orbit::OrbitInput;
use crate::pose::CameraPose;
use crate::sync::{CameraState, CameraStateStore, StateSynchronizer};
use crate::transition::{
    FinishedTransition, TransitionEngine, TransitionKind, TransitionOptions, TransitionPlan,
    TransitionStart, TransitionStep,
};
use glam::Vec3;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::{debug, warn};

/// Below this a pose's position and target count as the same point
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Which driver currently owns the camera
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControlState {
    /// No driver active
    #[default]
    Idle,
    /// The user is dragging the view
    UserControlled,
    /// A transition owns the pose
    Transitioning,
    /// The camera rides along with a followed object
    Following,
}

/// Entry point of the camera core
pub struct CameraControls {
    pose: CameraPose,
    state: ControlState,
    controller: InteractiveController,
    transitions: TransitionEngine,
    follow: Option<FollowBinding>,
    sync: StateSynchronizer,
    /// Caller-requested input enablement, restored after transitions
    input_enabled: bool,
}

impl CameraControls {
    /// Create controls placed at the pose currently held by `store`
    pub fn new(config: CameraConfig, store: Arc<dyn CameraStateStore>) -> Result<Self> {
        config.validate()?;

        let pose = store.get().pose();
        if !pose.is_finite() {
            return Err(CameraError::InvalidPose(pose));
        }
        let pose = separate_look(
            pose,
            TransitionKind::Pose,
            Vec3::NEG_Z,
            config.controller.min_distance,
        );

        debug!("CameraControls: created at {:?}", pose);

        let mut sync = StateSynchronizer::new(store);
        sync.publish_pose(pose);

        Ok(Self {
            pose,
            state: ControlState::Idle,
            controller: InteractiveController::new(&pose, config.controller),
            transitions: TransitionEngine::new(config.transition),
            follow: None,
            sync,
            input_enabled: true,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Authoritative camera pose
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitions.is_active()
    }

    /// Plan of the running transition
    pub fn active_transition(&self) -> Option<&TransitionPlan> {
        self.transitions.active_plan()
    }

    /// Id of the running transition
    pub fn active_transition_id(&self) -> Option<TransitionId> {
        self.transitions.active_id()
    }

    /// True while a follow binding exists
    pub fn is_following(&self) -> bool {
        self.follow.is_some()
    }

    /// True while follow deltas are paused
    pub fn is_follow_paused(&self) -> bool {
        self.follow.as_ref().is_some_and(FollowBinding::is_paused)
    }

    /// Caller-requested input enablement
    pub fn is_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Interactive controller (disabled while a transition runs)
    pub fn controller(&self) -> &InteractiveController {
        &self.controller
    }

    /// Snapshot of the external store
    pub fn snapshot(&self) -> CameraState {
        self.sync.snapshot()
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Register an event callback
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&CameraEvent) + Send + 'static,
    {
        self.sync.events_mut().subscribe(callback)
    }

    /// Register an event channel
    pub fn events(&mut self) -> (SubscriptionId, Receiver<CameraEvent>) {
        self.sync.events_mut().channel()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.sync.events_mut().unsubscribe(id)
    }

    // ========================================================================
    // Programmatic moves
    // ========================================================================

    /// Animate position and target to a new pose
    pub fn transition_to(
        &mut self,
        position: Vec3,
        target: Vec3,
        options: TransitionOptions,
    ) -> TransitionId {
        self.start_transition(CameraPose::new(position, target), TransitionKind::Pose, options)
    }

    /// Animate only the look-at target; the position stays fixed
    pub fn transition_target_to(
        &mut self,
        target: Vec3,
        options: TransitionOptions,
    ) -> TransitionId {
        let end = self.pose.with_target(target);
        self.start_transition(end, TransitionKind::TargetOnly, options)
    }

    /// Fly to `node`'s position plus `offset`, look at the node, and follow
    /// it once the camera arrives
    ///
    /// Returns `None` if the node is gone or unplaced.
    pub fn focus_on(
        &mut self,
        node: NodeHandle,
        offset: Vec3,
        options: TransitionOptions,
    ) -> Option<TransitionId> {
        let Some(position) = node.upgrade().and_then(|n| n.world_position()) else {
            warn!("CameraControls: focus target is not available");
            return None;
        };

        let end = CameraPose::new(position + offset, position);
        let options = options.follow(FollowRequest::new(node, offset));
        Some(self.start_transition(end, TransitionKind::Pose, options))
    }

    /// Jump to a pose without animating
    ///
    /// Cancels any running transition silently. An existing follow binding
    /// is kept and reseeded at the new pose.
    pub fn move_immediate(&mut self, position: Vec3, target: Vec3) {
        if let Some(id) = self.transitions.cancel() {
            debug!("CameraControls: transition {} replaced by immediate move", id);
        }

        self.pose = separate_look(
            CameraPose::new(position, target),
            TransitionKind::Pose,
            self.look_direction(),
            self.controller.orbit().config().min_distance,
        );
        self.controller.resume_after_transition(&self.pose, self.input_enabled);

        if let Some(binding) = self.follow.as_mut() {
            binding.reseed();
        }

        self.state = self.resting_state();
        self.sync.publish_pose(self.pose);
    }

    /// Stop the running transition where it stands
    ///
    /// No completion is published and any follow request attached to the
    /// transition is dropped. Returns false if nothing was running.
    pub fn cancel_transition(&mut self) -> bool {
        let Some(id) = self.transitions.cancel() else {
            return false;
        };

        self.controller.resume_after_transition(&self.pose, self.input_enabled);
        if let Some(binding) = self.follow.as_mut() {
            binding.reseed();
        }
        self.state = self.resting_state();
        self.sync.publish_pose(self.pose);

        debug!("CameraControls: cancelled transition {} -> {:?}", id, self.state);
        true
    }

    fn start_transition(
        &mut self,
        end: CameraPose,
        kind: TransitionKind,
        options: TransitionOptions,
    ) -> TransitionId {
        if self.follow.take().is_some() {
            debug!("CameraControls: follow binding replaced by programmatic move");
        }

        let end = separate_look(
            end,
            kind,
            self.look_direction(),
            self.controller.orbit().config().min_distance,
        );
        match self.transitions.start(self.pose, end, kind, options) {
            TransitionStart::Started { id, .. } => {
                self.controller.suspend_for_transition();
                self.state = ControlState::Transitioning;
                id
            }
            TransitionStart::Immediate { finished, .. } => {
                let id = finished.id;
                self.finish_transition(finished);
                id
            }
        }
    }

    fn finish_transition(&mut self, finished: FinishedTransition) {
        let FinishedTransition { id, pose, options, .. } = finished;

        self.pose = pose;
        self.controller.resume_after_transition(&self.pose, self.input_enabled);

        // The transition's own request wins over a binding made mid-flight
        let mut binding = match options.follow {
            Some(request) => Some(FollowBinding::new(request)),
            None => self.follow.take(),
        };
        if let Some(b) = binding.as_mut() {
            b.reseed();
            if b.step() == FollowStep::Lost {
                warn!("CameraControls: follow target lost before transition {} ended", id);
                binding = None;
            }
        }
        self.follow = binding;
        self.state = self.resting_state();

        self.sync.transition_completed(TransitionCompleted {
            id,
            pose,
            focus: options.focus,
            following: self.follow.is_some(),
        });
    }

    // ========================================================================
    // Following
    // ========================================================================

    /// Start tracking `node`, replacing any existing binding
    ///
    /// The camera is not moved; from the next tick it shifts by exactly the
    /// node's displacement. Returns false if the node is not available.
    pub fn start_following(&mut self, node: NodeHandle, offset: Vec3) -> bool {
        let mut binding = FollowBinding::new(FollowRequest::new(node, offset));
        if binding.step() == FollowStep::Lost {
            warn!("CameraControls: follow target is not available");
            return false;
        }

        self.follow = Some(binding);
        if self.state == ControlState::Idle {
            self.state = ControlState::Following;
        }
        debug!("CameraControls: following (offset {:?})", offset);
        true
    }

    /// Drop the follow binding
    pub fn stop_following(&mut self) {
        if self.follow.take().is_none() {
            return;
        }
        if self.state == ControlState::Following {
            self.state = ControlState::Idle;
        }
        debug!("CameraControls: stopped following");
    }

    /// Stop applying follow deltas while the cache keeps refreshing
    pub fn pause_follow_visuals(&mut self) {
        match self.follow.as_mut() {
            Some(binding) => binding.pause(),
            None => debug!("CameraControls: pause ignored, not following"),
        }
    }

    /// Resume applying follow deltas from the object's current position
    pub fn resume_follow_visuals(&mut self) {
        match self.follow.as_mut() {
            Some(binding) => binding.resume(),
            None => debug!("CameraControls: resume ignored, not following"),
        }
    }

    // ========================================================================
    // User input
    // ========================================================================

    /// Enable or disable interactive input
    ///
    /// The setting survives transitions: a transition that ends while input
    /// is disabled leaves the controller disabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        if self.transitions.is_active() {
            return;
        }

        self.controller.set_enabled(enabled);
        if !enabled && self.state == ControlState::UserControlled {
            self.state = self.resting_state();
        }
    }

    /// The user grabbed the view
    ///
    /// Ignored while a transition runs or input is disabled. Clears the
    /// focused object; a follow binding stays bound.
    pub fn begin_interaction(&mut self) -> bool {
        if self.transitions.is_active() || !self.controller.begin_interaction() {
            return false;
        }

        self.state = ControlState::UserControlled;
        self.sync.clear_focus();
        self.sync.interaction_started(self.pose);
        true
    }

    /// The user released the view
    ///
    /// The state stays `UserControlled` until damped motion settles.
    pub fn end_interaction(&mut self) -> bool {
        if !self.controller.end_interaction() {
            return false;
        }
        self.settle_user_control();
        true
    }

    /// Feed raw orbit/zoom/pan input
    ///
    /// Input outside `begin_interaction` (a wheel zoom, say) is a gesture of
    /// its own: the camera is `UserControlled` until its motion settles.
    /// Returns false if the input was dropped.
    pub fn handle_input(&mut self, input: &OrbitInput) -> bool {
        if self.transitions.is_active() {
            return false;
        }
        self.controller.handle_input(input)
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance every driver by `dt` seconds. Call once per frame.
    pub fn update(&mut self, dt: f32) {
        if !self.transitions.is_active() {
            self.step_follow();
        }

        match self.transitions.advance(dt) {
            TransitionStep::Idle => {}
            TransitionStep::Running(pose) => self.pose = pose,
            TransitionStep::Completed(finished) => self.finish_transition(finished),
        }

        match self.controller.update(dt, self.transitions.is_active()) {
            Some(change) => {
                if self.state != ControlState::UserControlled {
                    debug!("CameraControls: user input while {:?}", self.state);
                    self.state = ControlState::UserControlled;
                }
                self.pose = change.pose;
                self.sync.user_changed(change.pose);
            }
            None => self.settle_user_control(),
        }

        self.sync.publish_pose(self.pose);
    }

    /// Leave `UserControlled` once the user let go and the view came to rest
    fn settle_user_control(&mut self) {
        if self.state != ControlState::UserControlled
            || self.controller.is_interacting()
            || self.controller.orbit().has_pending_motion()
        {
            return;
        }
        self.state = self.resting_state();
    }

    /// Current view direction, or -Z if the pose has none
    fn look_direction(&self) -> Vec3 {
        let forward = self.pose.forward();
        if forward == Vec3::ZERO {
            Vec3::NEG_Z
        } else {
            forward
        }
    }

    fn step_follow(&mut self) {
        let Some(binding) = self.follow.as_mut() else {
            return;
        };

        match binding.step() {
            FollowStep::Moved(delta) => {
                if delta != Vec3::ZERO {
                    self.pose = self.pose.translated(delta);
                    self.controller.apply_follow_delta(delta);
                }
            }
            FollowStep::Seeded | FollowStep::Paused => {}
            FollowStep::Lost => {
                warn!("CameraControls: follow target lost, clearing binding");
                self.follow = None;
                self.sync.clear_focus();
                if self.state == ControlState::Following {
                    self.state = ControlState::Idle;
                }
            }
        }
    }

    /// State to settle in when no transition runs
    fn resting_state(&self) -> ControlState {
        if self.controller.is_interacting() {
            ControlState::UserControlled
        } else if self.follow.is_some() {
            ControlState::Following
        } else {
            ControlState::Idle
        }
    }
}

/// Pull apart a pose whose position sits on its target
///
/// A full move backs the position off along `forward`; a target-only move
/// keeps the position and pushes the target ahead instead.
fn separate_look(pose: CameraPose, kind: TransitionKind, forward: Vec3, gap: f32) -> CameraPose {
    if pose.distance() >= COINCIDENT_EPSILON {
        return pose;
    }

    warn!(
        "CameraControls: position and target coincide at {:?}, separating by {}",
        pose.position, gap
    );
    match kind {
        TransitionKind::Pose => CameraPose::new(pose.target - forward * gap, pose.target),
        TransitionKind::TargetOnly => pose.with_target(pose.position + forward * gap),
    }
}

impl std::fmt::Debug for CameraControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraControls")
            .field("pose", &self.pose)
            .field("state", &self.state)
            .field("transition", &self.transitions.active_id())
            .field("follow", &self.follow)
            .field("input_enabled", &self.input_enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::{node_handle, SceneAnchor};
    use crate::sync::SharedCameraState;

    const DT: f32 = 1.0 / 60.0;

    fn controls() -> (Arc<SharedCameraState>, CameraControls) {
        let store = Arc::new(SharedCameraState::with_pose(CameraPose::new(
            Vec3::new(0.0, 0.0, 50.0),
            Vec3::ZERO,
        )));
        let controls = CameraControls::new(CameraConfig::default(), store.clone()).unwrap();
        (store, controls)
    }

    fn run(controls: &mut CameraControls, seconds: f32) {
        let ticks = (seconds / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            controls.update(DT);
        }
    }

    #[test]
    fn test_starts_idle_at_store_pose() {
        let (_store, controls) = controls();
        assert_eq!(controls.state(), ControlState::Idle);
        assert_eq!(controls.pose().position, Vec3::new(0.0, 0.0, 50.0));
        assert!(controls.controller().is_enabled());
    }

    #[test]
    fn test_rejects_non_finite_store_pose() {
        let store = Arc::new(SharedCameraState::with_pose(CameraPose::new(
            Vec3::new(f32::NAN, 0.0, 0.0),
            Vec3::ZERO,
        )));
        assert!(matches!(
            CameraControls::new(CameraConfig::default(), store),
            Err(CameraError::InvalidPose(_))
        ));
    }

    #[test]
    fn test_coincident_store_pose_is_separated() {
        let store = Arc::new(SharedCameraState::with_pose(CameraPose::new(Vec3::ONE, Vec3::ONE)));
        let controls = CameraControls::new(CameraConfig::default(), store.clone()).unwrap();

        let pose = controls.pose();
        assert_eq!(pose.target, Vec3::ONE);
        assert!(pose.distance() > 0.0);
        assert_eq!(store.get().pose(), pose);
    }

    #[test]
    fn test_transition_disables_then_restores_controller() {
        let (_store, mut controls) = controls();
        controls.transition_to(Vec3::new(10.0, 0.0, 10.0), Vec3::ZERO, TransitionOptions::new());

        assert_eq!(controls.state(), ControlState::Transitioning);
        assert!(!controls.controller().is_enabled());
        assert!(!controls.handle_input(&OrbitInput::zoom(1.0)));
        assert!(!controls.begin_interaction());

        let total = controls.active_transition().unwrap().total_duration;
        run(&mut controls, total);

        assert_eq!(controls.state(), ControlState::Idle);
        assert!(controls.controller().is_enabled());
    }

    #[test]
    fn test_target_only_keeps_position() {
        let (_store, mut controls) = controls();
        controls.transition_target_to(Vec3::new(20.0, 0.0, 0.0), TransitionOptions::new());

        let plan = *controls.active_transition().unwrap();
        assert_eq!(plan.kind, TransitionKind::TargetOnly);

        for _ in 0..10 {
            controls.update(DT);
            assert_eq!(controls.pose().position, Vec3::new(0.0, 0.0, 50.0));
        }
        run(&mut controls, plan.total_duration);
        assert_eq!(controls.pose().target, Vec3::new(20.0, 0.0, 0.0));
    }

    #[test]
    fn test_degenerate_move_completes_in_call() {
        let (store, mut controls) = controls();
        let (_id, rx) = controls.events();

        controls.transition_to(
            Vec3::new(0.0, 0.0, 50.0),
            Vec3::ZERO,
            TransitionOptions::new().focus("home"),
        );

        assert!(!controls.is_transitioning());
        assert!(matches!(rx.try_recv(), Ok(CameraEvent::TransitionCompleted(_))));
        assert_eq!(store.get().focused_object.as_deref(), Some("home"));
    }

    #[test]
    fn test_move_immediate_cancels_silently() {
        let (_store, mut controls) = controls();
        let (_id, rx) = controls.events();

        controls.transition_to(Vec3::new(10.0, 0.0, 10.0), Vec3::ZERO, TransitionOptions::new());
        controls.update(DT);
        controls.move_immediate(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE);

        assert!(!controls.is_transitioning());
        assert_eq!(controls.state(), ControlState::Idle);
        assert_eq!(controls.pose(), CameraPose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE));

        run(&mut controls, 4.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_set_enabled_survives_transition() {
        let (_store, mut controls) = controls();
        controls.set_enabled(false);

        controls.transition_to(Vec3::new(10.0, 0.0, 10.0), Vec3::ZERO, TransitionOptions::new());
        run(&mut controls, 4.0);

        assert!(!controls.controller().is_enabled());
        controls.set_enabled(true);
        assert!(controls.controller().is_enabled());
    }

    #[test]
    fn test_interaction_lifecycle() {
        let (store, mut controls) = controls();
        let mut state = store.get();
        state.focused_object = Some("venus".into());
        store.set(state);

        let (_id, rx) = controls.events();
        assert!(controls.begin_interaction());
        assert_eq!(controls.state(), ControlState::UserControlled);
        assert_eq!(store.get().focused_object, None);
        assert!(matches!(rx.try_recv(), Ok(CameraEvent::InteractionStarted { .. })));

        assert!(controls.end_interaction());
        assert_eq!(controls.state(), ControlState::Idle);
    }

    #[test]
    fn test_user_input_moves_pose() {
        let (store, mut controls) = controls();
        let before = controls.pose();

        controls.begin_interaction();
        assert!(controls.handle_input(&OrbitInput::rotate(40.0, 0.0)));
        run(&mut controls, 1.0);
        controls.end_interaction();

        assert!(!controls.pose().position.abs_diff_eq(before.position, 1e-3));
        assert_eq!(store.get().pose(), controls.pose());
    }

    #[test]
    fn test_input_without_interaction_takes_control_until_settled() {
        let (store, mut controls) = controls();
        let anchor = SceneAnchor::shared("moon", Vec3::new(5.0, 0.0, 0.0));
        controls.start_following(node_handle(&anchor), Vec3::ZERO);

        let mut state = store.get();
        state.focused_object = Some("moon".into());
        store.set(state);

        assert!(controls.handle_input(&OrbitInput::zoom(2.0)));
        controls.update(DT);

        assert_eq!(controls.state(), ControlState::UserControlled);
        assert_eq!(store.get().focused_object, None);
        assert!(controls.is_following());

        run(&mut controls, 3.0);
        assert!(!controls.controller().orbit().has_pending_motion());
        assert_eq!(controls.state(), ControlState::Following);
    }

    #[test]
    fn test_end_interaction_waits_for_motion_to_settle() {
        let (_store, mut controls) = controls();

        controls.begin_interaction();
        controls.handle_input(&OrbitInput::rotate(80.0, 0.0));
        controls.update(DT);
        controls.end_interaction();
        assert_eq!(controls.state(), ControlState::UserControlled);

        run(&mut controls, 3.0);
        assert_eq!(controls.state(), ControlState::Idle);
    }

    #[test]
    fn test_coincident_move_keeps_orbit_in_step() {
        let (_store, mut controls) = controls();
        let point = Vec3::new(4.0, 0.0, 0.0);
        let min_distance = controls.controller().orbit().config().min_distance;

        controls.move_immediate(point, point);
        let pose = controls.pose();
        assert_eq!(pose.target, point);
        assert!((pose.distance() - min_distance).abs() < 1e-4);
        assert!(controls.controller().orbit().pose().approx_eq(&pose, 1e-4));

        // First damped tick continues from where the camera is
        controls.handle_input(&OrbitInput::rotate(1.0, 0.0));
        controls.update(DT);
        let step = controls.pose().position.distance(pose.position);
        assert!(step < min_distance * 0.5, "jumped {}", step);
    }

    #[test]
    fn test_coincident_transition_lands_apart() {
        let (_store, mut controls) = controls();
        let point = Vec3::new(0.0, 0.0, 20.0);

        controls.transition_to(point, point, TransitionOptions::new());
        let plan = *controls.active_transition().unwrap();
        assert_eq!(plan.end.target, point);
        assert!(plan.end.distance() > 0.0);

        run(&mut controls, plan.total_duration);
        assert!(!controls.is_transitioning());
        assert_eq!(controls.pose(), plan.end);
        assert!(controls.controller().orbit().pose().approx_eq(&plan.end, 1e-4));
    }

    #[test]
    fn test_pause_without_binding_is_noop() {
        let (_store, mut controls) = controls();
        controls.pause_follow_visuals();
        controls.resume_follow_visuals();
        assert!(!controls.is_following());
        assert_eq!(controls.state(), ControlState::Idle);
    }

    #[test]
    fn test_follow_state_transitions() {
        let (_store, mut controls) = controls();
        let anchor = SceneAnchor::shared("comet", Vec3::new(5.0, 0.0, 0.0));

        assert!(controls.start_following(node_handle(&anchor), Vec3::new(0.0, 0.0, 10.0)));
        assert_eq!(controls.state(), ControlState::Following);

        controls.begin_interaction();
        assert_eq!(controls.state(), ControlState::UserControlled);
        assert!(controls.is_following());

        controls.end_interaction();
        assert_eq!(controls.state(), ControlState::Following);

        controls.stop_following();
        assert_eq!(controls.state(), ControlState::Idle);
    }

    #[test]
    fn test_start_following_dead_node_fails() {
        let (_store, mut controls) = controls();
        let anchor = SceneAnchor::shared("ghost", Vec3::ZERO);
        let handle = node_handle(&anchor);
        drop(anchor);

        assert!(!controls.start_following(handle, Vec3::ZERO));
        assert_eq!(controls.state(), ControlState::Idle);
    }

    #[test]
    fn test_focus_on_follows_after_arrival() {
        let (store, mut controls) = controls();
        let anchor = SceneAnchor::shared("mars", Vec3::new(200.0, 0.0, 0.0));
        let offset = Vec3::new(0.0, 5.0, 20.0);

        controls
            .focus_on(node_handle(&anchor), offset, TransitionOptions::new().focus("mars"))
            .expect("node is placed");
        run(&mut controls, 4.0);

        assert_eq!(controls.state(), ControlState::Following);
        assert_eq!(controls.pose().position, Vec3::new(200.0, 5.0, 20.0));
        assert_eq!(controls.pose().target, Vec3::new(200.0, 0.0, 0.0));
        assert_eq!(store.get().focused_object.as_deref(), Some("mars"));

        anchor.translate(Vec3::new(1.0, 0.0, 0.0));
        controls.update(DT);
        let expected = Vec3::new(201.0, 5.0, 20.0);
        assert!(controls.pose().position.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_lost_follow_target_is_cleared() {
        let (store, mut controls) = controls();
        let anchor = SceneAnchor::shared("probe", Vec3::ZERO);
        controls.start_following(node_handle(&anchor), Vec3::ZERO);

        let mut state = store.get();
        state.focused_object = Some("probe".into());
        store.set(state);

        anchor.unplace();
        controls.update(DT);

        assert!(!controls.is_following());
        assert_eq!(controls.state(), ControlState::Idle);
        assert_eq!(store.get().focused_object, None);
    }
}
