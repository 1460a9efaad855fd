//! State synchronization
//!
//! The authoritative camera pose lives in a store owned by the embedding
//! application. [`StateSynchronizer`] writes the pose into it whenever it
//! changes, clears the focused object when the user takes over the view,
//! and publishes completion notifications.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(SharedCameraState::new(CameraState::default()));
//! let handle = store.subscribe(|state| println!("camera at {:?}", state.position));
//! let controls = CameraControls::new(CameraConfig::default(), store.clone())?;
//! // ...
//! store.unsubscribe(handle);
//! ```

use crate::events::{CameraEvent, CameraEvents, TransitionCompleted};
use crate::pose::CameraPose;
use glam::Vec3;
use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

/// Camera snapshot held by the external store
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
    /// Label of the object the camera was sent to, if any
    pub focused_object: Option<String>,
}

impl CameraState {
    /// Snapshot of a pose with no focused object
    pub fn from_pose(pose: CameraPose) -> Self {
        Self {
            position: pose.position,
            target: pose.target,
            focused_object: None,
        }
    }

    /// Pose part of the snapshot
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position, self.target)
    }
}

/// Shared camera-state store with a get/set contract
pub trait CameraStateStore: Send + Sync {
    fn get(&self) -> CameraState;
    fn set(&self, state: CameraState);
}

new_key_type! {
    /// Handle returned by [`SharedCameraState::subscribe`]
    pub struct StoreSubscription;
}

type StoreCallback = Box<dyn Fn(&CameraState) + Send + Sync>;

/// In-memory store with change subscribers
pub struct SharedCameraState {
    state: RwLock<CameraState>,
    subscribers: RwLock<SlotMap<StoreSubscription, StoreCallback>>,
}

impl SharedCameraState {
    pub fn new(initial: CameraState) -> Self {
        Self {
            state: RwLock::new(initial),
            subscribers: RwLock::new(SlotMap::with_key()),
        }
    }

    /// Store seeded with a pose
    pub fn with_pose(pose: CameraPose) -> Self {
        Self::new(CameraState::from_pose(pose))
    }

    /// Call `callback` after every `set`
    ///
    /// Returns a handle for [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&self, callback: F) -> StoreSubscription
    where
        F: Fn(&CameraState) + Send + Sync + 'static,
    {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Box::new(callback))
    }

    /// Remove a subscriber, returns true if it was registered
    pub fn unsubscribe(&self, handle: StoreSubscription) -> bool {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(handle)
            .is_some()
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for SharedCameraState {
    fn default() -> Self {
        Self::with_pose(CameraPose::default())
    }
}

impl CameraStateStore for SharedCameraState {
    fn get(&self) -> CameraState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, state: CameraState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state.clone();

        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        for (_, callback) in subscribers.iter() {
            callback(&state);
        }
    }
}

/// Publishes the authoritative pose and camera events
pub struct StateSynchronizer {
    store: Arc<dyn CameraStateStore>,
    events: CameraEvents,
    last_published: Option<CameraPose>,
}

impl StateSynchronizer {
    pub fn new(store: Arc<dyn CameraStateStore>) -> Self {
        Self {
            store,
            events: CameraEvents::new(),
            last_published: None,
        }
    }

    /// Current store snapshot
    pub fn snapshot(&self) -> CameraState {
        self.store.get()
    }

    pub fn events_mut(&mut self) -> &mut CameraEvents {
        &mut self.events
    }

    /// Write `pose` into the store if it differs from the last write
    pub fn publish_pose(&mut self, pose: CameraPose) {
        if self.last_published == Some(pose) {
            return;
        }
        let mut state = self.store.get();
        state.position = pose.position;
        state.target = pose.target;
        self.store.set(state);
        self.last_published = Some(pose);
        trace!("StateSynchronizer: published {:?}", pose);
    }

    /// Genuine user interaction moved the camera
    pub fn user_changed(&mut self, pose: CameraPose) {
        let mut state = self.store.get();
        let had_focus = state.focused_object.take().is_some();

        state.position = pose.position;
        state.target = pose.target;
        self.store.set(state);
        self.last_published = Some(pose);

        if had_focus {
            debug!("StateSynchronizer: user interaction cleared focused object");
        }
    }

    /// Drop the focused object without touching the pose
    pub fn clear_focus(&mut self) {
        let mut state = self.store.get();
        if state.focused_object.take().is_some() {
            self.store.set(state);
        }
    }

    /// The user started dragging the view
    pub fn interaction_started(&mut self, pose: CameraPose) {
        self.events.emit(&CameraEvent::InteractionStarted { pose });
    }

    /// A transition finished naturally: record the final pose and focus,
    /// then notify subscribers.
    pub fn transition_completed(&mut self, completed: TransitionCompleted) {
        let mut state = self.store.get();
        state.position = completed.pose.position;
        state.target = completed.pose.target;
        state.focused_object = completed.focus.clone();
        self.store.set(state);
        self.last_published = Some(completed.pose);

        debug!(
            "StateSynchronizer: transition {} completed (focus: {:?}, following: {})",
            completed.id, completed.focus, completed.following
        );
        self.events.emit(&CameraEvent::TransitionCompleted(completed));
    }
}
