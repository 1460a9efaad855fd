//! Scripted camera scenarios
//!
//! A scenario places moving scene objects, seeds the camera pose, and
//! schedules facade calls at fixed times:
//!
//! ```toml
//! name = "comet flyby"
//! duration = 10.0
//!
//! [camera]
//! position = [0.0, 0.0, 1000.0]
//! target = [0.0, 0.0, 0.0]
//!
//! [[objects]]
//! name = "comet"
//! position = [300.0, 0.0, 0.0]
//! velocity = [-20.0, 0.0, 5.0]
//!
//! [[actions]]
//! at = 0.5
//! type = "focus"
//! object = "comet"
//! offset = [0.0, 10.0, 40.0]
//! ```

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use starview_camera::{
    node_handle, CameraConfig, CameraControls, CameraEvent, CameraPose, CameraState,
    CameraStateStore, ControlState, OrbitInput, SceneAnchor, SharedCameraState,
    TransitionOptions,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

// =============================================================================
// Scenario file
// =============================================================================

/// Scenario loaded from TOML
#[derive(Debug, Deserialize, Serialize)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,
    /// Simulated seconds
    pub duration: f32,
    #[serde(default)]
    pub camera: CameraSetup,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    #[serde(default)]
    pub actions: Vec<ScheduledAction>,
}

fn default_name() -> String {
    "untitled".to_string()
}

/// Initial camera pose
#[derive(Debug, Deserialize, Serialize)]
pub struct CameraSetup {
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraSetup {
    fn default() -> Self {
        let pose = CameraPose::default();
        Self {
            position: pose.position,
            target: pose.target,
        }
    }
}

/// Scene object moving at constant velocity
#[derive(Debug, Deserialize, Serialize)]
pub struct ObjectSpec {
    pub name: String,
    pub position: Vec3,
    #[serde(default)]
    pub velocity: Vec3,
    /// Remove the object from the scene at this time
    #[serde(default)]
    pub despawn_at: Option<f32>,
}

/// Facade call fired at a given time
#[derive(Debug, Deserialize, Serialize)]
pub struct ScheduledAction {
    /// Seconds from scenario start
    pub at: f32,
    #[serde(flatten)]
    pub action: Action,
}

/// Facade calls a scenario can make
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    TransitionTo {
        position: Vec3,
        target: Vec3,
        #[serde(default)]
        focus: Option<String>,
    },
    TransitionTargetTo {
        target: Vec3,
        #[serde(default)]
        focus: Option<String>,
    },
    MoveImmediate {
        position: Vec3,
        target: Vec3,
    },
    /// Fly to an object and follow it
    Focus {
        object: String,
        offset: Vec3,
    },
    Follow {
        object: String,
        #[serde(default)]
        offset: Vec3,
    },
    StopFollowing,
    PauseFollow,
    ResumeFollow,
    Cancel,
    SetEnabled {
        enabled: bool,
    },
    BeginInteraction,
    EndInteraction,
    /// Raw orbit input for one frame
    Orbit {
        #[serde(default)]
        rotate: Vec2,
        #[serde(default)]
        pan: Vec2,
        #[serde(default)]
        zoom: f32,
    },
}

impl Action {
    /// Object name the action refers to, if any
    fn object(&self) -> Option<&str> {
        match self {
            Action::Focus { object, .. } | Action::Follow { object, .. } => Some(object),
            _ => None,
        }
    }
}

impl Scenario {
    /// Parse and check a scenario
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut scenario: Scenario = toml::from_str(text).context("Failed to parse scenario")?;
        scenario.validate()?;
        scenario.actions.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(scenario)
    }

    /// Load a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            anyhow::bail!("Scenario duration must be positive, got {}", self.duration);
        }

        let mut names = HashSet::new();
        for object in &self.objects {
            if !names.insert(object.name.as_str()) {
                anyhow::bail!("Duplicate object '{}'", object.name);
            }
        }

        for scheduled in &self.actions {
            if !scheduled.at.is_finite() || scheduled.at < 0.0 {
                anyhow::bail!("Action time must be non-negative, got {}", scheduled.at);
            }
            if let Some(object) = scheduled.action.object() {
                if !names.contains(object) {
                    anyhow::bail!(
                        "Action at {}s refers to unknown object '{}'",
                        scheduled.at,
                        object
                    );
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Replay
// =============================================================================

/// Outcome of a replay
#[derive(Debug)]
pub struct ReplaySummary {
    pub frames: usize,
    pub completions: usize,
    pub interactions: usize,
    pub final_pose: CameraPose,
    pub final_state: ControlState,
    pub store: CameraState,
}

struct SceneObject {
    anchor: Arc<SceneAnchor>,
    velocity: Vec3,
    despawn_at: Option<f32>,
}

/// Run `scenario` at `fps` frames per second
pub fn replay(scenario: &Scenario, config: CameraConfig, fps: u32) -> Result<ReplaySummary> {
    if fps == 0 {
        anyhow::bail!("Frame rate must be positive");
    }

    let store = Arc::new(SharedCameraState::with_pose(CameraPose::new(
        scenario.camera.position,
        scenario.camera.target,
    )));
    let mut controls = CameraControls::new(config, store.clone())
        .context("Failed to create camera controls")?;
    let (_subscription, events) = controls.events();

    let objects: HashMap<&str, SceneObject> = scenario
        .objects
        .iter()
        .map(|spec| {
            let object = SceneObject {
                anchor: SceneAnchor::shared(spec.name.clone(), spec.position),
                velocity: spec.velocity,
                despawn_at: spec.despawn_at,
            };
            (spec.name.as_str(), object)
        })
        .collect();

    info!(
        "Replaying '{}' ({:.1}s at {} fps, {} objects, {} actions)",
        scenario.name,
        scenario.duration,
        fps,
        objects.len(),
        scenario.actions.len()
    );

    let dt = 1.0 / fps as f32;
    let frames = (scenario.duration * fps as f32).ceil() as usize;
    let mut pending = scenario.actions.iter().peekable();
    let mut completions = 0;
    let mut interactions = 0;

    for frame in 0..frames {
        let now = frame as f32 * dt;

        while let Some(scheduled) = pending.next_if(|a| a.at <= now) {
            apply(&mut controls, &objects, &scheduled.action, now);
        }

        for object in objects.values() {
            match object.despawn_at {
                Some(at) if at <= now => object.anchor.unplace(),
                _ => object.anchor.translate(object.velocity * dt),
            }
        }

        controls.update(dt);

        for event in events.try_iter() {
            match event {
                CameraEvent::TransitionCompleted(done) => {
                    completions += 1;
                    info!(
                        "[{:7.3}s] transition {} completed at {:?} (focus: {:?}, following: {})",
                        now + dt,
                        done.id,
                        done.pose.position,
                        done.focus,
                        done.following
                    );
                }
                CameraEvent::InteractionStarted { pose } => {
                    interactions += 1;
                    info!("[{:7.3}s] interaction started at {:?}", now + dt, pose.position);
                }
            }
        }
    }

    Ok(ReplaySummary {
        frames,
        completions,
        interactions,
        final_pose: controls.pose(),
        final_state: controls.state(),
        store: store.get(),
    })
}

fn apply(
    controls: &mut CameraControls,
    objects: &HashMap<&str, SceneObject>,
    action: &Action,
    now: f32,
) {
    debug!("[{:7.3}s] {:?}", now, action);

    match action {
        Action::TransitionTo {
            position,
            target,
            focus,
        } => {
            controls.transition_to(*position, *target, options(focus));
        }
        Action::TransitionTargetTo { target, focus } => {
            controls.transition_target_to(*target, options(focus));
        }
        Action::MoveImmediate { position, target } => controls.move_immediate(*position, *target),
        Action::Focus { object, offset } => {
            if let Some(scene) = objects.get(object.as_str()) {
                let options = TransitionOptions::new().focus(object.clone());
                if controls
                    .focus_on(node_handle(&scene.anchor), *offset, options)
                    .is_none()
                {
                    warn!("[{:7.3}s] cannot focus '{}', it is not in the scene", now, object);
                }
            }
        }
        Action::Follow { object, offset } => {
            if let Some(scene) = objects.get(object.as_str()) {
                if !controls.start_following(node_handle(&scene.anchor), *offset) {
                    warn!("[{:7.3}s] cannot follow '{}', it is not in the scene", now, object);
                }
            }
        }
        Action::StopFollowing => controls.stop_following(),
        Action::PauseFollow => controls.pause_follow_visuals(),
        Action::ResumeFollow => controls.resume_follow_visuals(),
        Action::Cancel => {
            if !controls.cancel_transition() {
                debug!("[{:7.3}s] nothing to cancel", now);
            }
        }
        Action::SetEnabled { enabled } => controls.set_enabled(*enabled),
        Action::BeginInteraction => {
            if !controls.begin_interaction() {
                debug!("[{:7.3}s] interaction refused in {:?}", now, controls.state());
            }
        }
        Action::EndInteraction => {
            controls.end_interaction();
        }
        Action::Orbit { rotate, pan, zoom } => {
            controls.handle_input(&OrbitInput {
                rotate: *rotate,
                pan: *pan,
                zoom: *zoom,
            });
        }
    }
}

fn options(focus: &Option<String>) -> TransitionOptions {
    match focus {
        Some(label) => TransitionOptions::new().focus(label.clone()),
        None => TransitionOptions::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLYBY: &str = r#"
        name = "flyby"
        duration = 6.0

        [camera]
        position = [0.0, 0.0, 1000.0]
        target = [0.0, 0.0, 0.0]

        [[objects]]
        name = "comet"
        position = [200.0, 0.0, 0.0]
        velocity = [-10.0, 0.0, 0.0]

        [[actions]]
        at = 0.0
        type = "focus"
        object = "comet"
        offset = [0.0, 10.0, 40.0]
    "#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_toml_str(FLYBY).unwrap();
        assert_eq!(scenario.name, "flyby");
        assert_eq!(scenario.objects[0].velocity, Vec3::new(-10.0, 0.0, 0.0));
        assert!(matches!(
            scenario.actions[0].action,
            Action::Focus { ref object, .. } if object == "comet"
        ));
    }

    #[test]
    fn test_actions_are_sorted() {
        let scenario = Scenario::from_toml_str(
            r#"
            duration = 1.0

            [[actions]]
            at = 0.5
            type = "cancel"

            [[actions]]
            at = 0.1
            type = "set-enabled"
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(scenario.actions[0].at, 0.1);
        assert!(matches!(scenario.actions[1].action, Action::Cancel));
    }

    #[test]
    fn test_unknown_object_rejected() {
        let err = Scenario::from_toml_str(
            r#"
            duration = 1.0

            [[actions]]
            at = 0.0
            type = "follow"
            object = "nowhere"
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        assert!(Scenario::from_toml_str("duration = 0.0").is_err());
    }

    #[test]
    fn test_replay_focus_then_follow() {
        let scenario = Scenario::from_toml_str(FLYBY).unwrap();
        let summary = replay(&scenario, CameraConfig::default(), 60).unwrap();

        assert_eq!(summary.frames, 360);
        assert_eq!(summary.completions, 1);
        assert_eq!(summary.final_state, ControlState::Following);
        assert_eq!(summary.store.focused_object.as_deref(), Some("comet"));
        assert_eq!(summary.store.position, summary.final_pose.position);
    }

    #[test]
    fn test_replay_cancel_emits_nothing() {
        let scenario = Scenario::from_toml_str(
            r#"
            duration = 4.0

            [camera]
            position = [0.0, 0.0, 500.0]
            target = [0.0, 0.0, 0.0]

            [[actions]]
            at = 0.0
            type = "transition-to"
            position = [100.0, 0.0, 100.0]
            target = [0.0, 0.0, 0.0]

            [[actions]]
            at = 0.2
            type = "cancel"
            "#,
        )
        .unwrap();

        let summary = replay(&scenario, CameraConfig::default(), 60).unwrap();
        assert_eq!(summary.completions, 0);
        assert_eq!(summary.final_state, ControlState::Idle);
    }

    #[test]
    fn test_replay_despawned_target_is_dropped() {
        let scenario = Scenario::from_toml_str(
            r#"
            duration = 2.0

            [[objects]]
            name = "meteor"
            position = [0.0, 0.0, 0.0]
            velocity = [1.0, 0.0, 0.0]
            despawn_at = 1.0

            [[actions]]
            at = 0.0
            type = "follow"
            object = "meteor"
            "#,
        )
        .unwrap();

        let summary = replay(&scenario, CameraConfig::default(), 30).unwrap();
        assert_eq!(summary.final_state, ControlState::Idle);
    }

    #[test]
    fn test_zero_fps_rejected() {
        let scenario = Scenario::from_toml_str(FLYBY).unwrap();
        assert!(replay(&scenario, CameraConfig::default(), 0).is_err());
    }
}
