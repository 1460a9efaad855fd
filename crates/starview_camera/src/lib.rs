//! Starview camera core
//!
//! Camera control state machine for an interactive 3D scene viewer:
//!
//! - **Interactive control**: damped orbit/zoom/pan that the user can grab
//!   at any time
//! - **Transitions**: timed two-phase moves (re-aim, then travel) with a
//!   distance-based duration curve
//! - **Following**: delta tracking of a moving scene object that keeps the
//!   framing while still allowing the user to orbit
//! - **Synchronization**: the authoritative pose is mirrored into an
//!   externally owned state store and completions are published to
//!   subscribers
//!
//! Everything is driven by one [`CameraControls::update`] call per frame.
//!
//! # Example
//!
//! ```ignore
//! use starview_camera::prelude::*;
//!
//! let store = Arc::new(SharedCameraState::default());
//! let mut controls = CameraControls::new(CameraConfig::default(), store.clone())?;
//! let (_sub, events) = controls.events();
//!
//! let planet = SceneAnchor::shared("saturn", Vec3::new(400.0, 0.0, 0.0));
//! controls.focus_on(
//!     node_handle(&planet),
//!     Vec3::new(0.0, 20.0, 60.0),
//!     TransitionOptions::new().focus("saturn"),
//! );
//!
//! loop {
//!     controls.update(1.0 / 60.0);
//!     for event in events.try_iter() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod config;
pub mod controller;
pub mod easing;
pub mod error;
pub mod events;
pub mod facade;
pub mod follow;
pub mod orbit;
pub mod pose;
pub mod sync;
pub mod transition;
pub mod tween;

pub use config::{CameraConfig, ControllerConfig, TransitionTuning};
pub use controller::{InteractiveController, UserChange};
pub use easing::Easing;
pub use error::{CameraError, Result};
pub use events::{CameraEvent, CameraEvents, SubscriptionId, TransitionCompleted, TransitionId};
pub use facade::{CameraControls, ControlState};
pub use follow::{
    node_handle, FollowBinding, FollowRequest, FollowStep, NodeHandle, PositionSource,
    SceneAnchor,
};
pub use orbit::{OrbitControls, OrbitInput};
pub use pose::{CameraPose, WORLD_UP};
pub use sync::{
    CameraState, CameraStateStore, SharedCameraState, StateSynchronizer, StoreSubscription,
};
pub use transition::{
    rotation_fraction, travel_duration, TransitionEngine, TransitionKind, TransitionOptions,
    TransitionPlan,
};
pub use tween::{Interpolate, Tween};

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::CameraConfig;
    pub use crate::events::CameraEvent;
    pub use crate::facade::{CameraControls, ControlState};
    pub use crate::follow::{node_handle, PositionSource, SceneAnchor};
    pub use crate::orbit::OrbitInput;
    pub use crate::pose::CameraPose;
    pub use crate::sync::{CameraStateStore, SharedCameraState};
    pub use crate::transition::TransitionOptions;
    pub use glam::Vec3;
    pub use std::sync::Arc;
}
