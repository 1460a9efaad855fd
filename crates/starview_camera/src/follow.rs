//! Object following
//!
//! A [`FollowBinding`] tracks a moving scene object through a non-owning
//! handle and yields the object's per-tick displacement. The camera adds
//! that displacement to its own position and to the orbit pivot, so the
//! framing is preserved while the user can still orbit around the object.
//!
//! The binding never owns the object. When the object goes away the next
//! step reports [`FollowStep::Lost`] and the caller drops the binding.

use glam::Vec3;
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Read-only world position query exposed by a scene node
pub trait PositionSource: Send + Sync {
    /// Current world position, or `None` if the node is no longer placed
    fn world_position(&self) -> Option<Vec3>;
}

/// Non-owning handle to a followed scene node
pub type NodeHandle = Weak<dyn PositionSource>;

/// Downgrade a shared node into a [`NodeHandle`]
pub fn node_handle<T: PositionSource + 'static>(node: &Arc<T>) -> NodeHandle {
    let weak: Weak<T> = Arc::downgrade(node);
    weak
}

/// Minimal movable scene node
///
/// Stands in for a scene-graph node wherever only a position is needed.
#[derive(Debug)]
pub struct SceneAnchor {
    name: String,
    position: RwLock<Option<Vec3>>,
}

impl SceneAnchor {
    /// Create an anchor placed at `position`
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position: RwLock::new(Some(position)),
        }
    }

    /// Create a shared anchor
    pub fn shared(name: impl Into<String>, position: Vec3) -> Arc<Self> {
        Arc::new(Self::new(name, position))
    }

    /// Anchor name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current position, if placed
    pub fn position(&self) -> Option<Vec3> {
        *self.position.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Place the anchor
    pub fn set_position(&self, position: Vec3) {
        *self.position.write().unwrap_or_else(PoisonError::into_inner) = Some(position);
    }

    /// Move the anchor by `delta` (no-op when unplaced)
    pub fn translate(&self, delta: Vec3) {
        let mut position = self.position.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(p) = position.as_mut() {
            *p += delta;
        }
    }

    /// Remove the anchor from the scene
    pub fn unplace(&self) {
        *self.position.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl PositionSource for SceneAnchor {
    fn world_position(&self) -> Option<Vec3> {
        self.position()
    }
}

/// Request to follow a node, optionally attached to a transition
#[derive(Clone)]
pub struct FollowRequest {
    /// Node to follow
    pub target: NodeHandle,
    /// Desired camera offset from the node
    pub offset: Vec3,
}

impl FollowRequest {
    /// Create a request from an existing handle
    pub fn new(target: NodeHandle, offset: Vec3) -> Self {
        Self { target, offset }
    }

    /// Create a request from a shared node
    pub fn for_node<T: PositionSource + 'static>(node: &Arc<T>, offset: Vec3) -> Self {
        Self::new(node_handle(node), offset)
    }
}

impl std::fmt::Debug for FollowRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowRequest")
            .field("alive", &(self.target.strong_count() > 0))
            .field("offset", &self.offset)
            .finish()
    }
}

/// Result of one follow step
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FollowStep {
    /// First observation since a settle point; cache seeded, no motion
    Seeded,
    /// Target moved by this delta since the previous tick
    Moved(Vec3),
    /// Paused; cache refreshed, no motion
    Paused,
    /// Target handle is dead or the node is no longer placed
    Lost,
}

/// Delta-tracking relationship between the camera and a moving node
pub struct FollowBinding {
    target: NodeHandle,
    offset: Vec3,
    previous: Option<Vec3>,
    paused: bool,
}

impl FollowBinding {
    /// Bind to a node. The first step seeds the position cache.
    pub fn new(request: FollowRequest) -> Self {
        Self {
            target: request.target,
            offset: request.offset,
            previous: None,
            paused: false,
        }
    }

    /// Desired camera offset from the node
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Last observed node position, valid after the first step
    pub fn previous_position(&self) -> Option<Vec3> {
        self.previous
    }

    /// Query the node's current position
    pub fn target_position(&self) -> Option<Vec3> {
        self.target.upgrade().and_then(|node| node.world_position())
    }

    /// True while the node can still be queried
    pub fn is_valid(&self) -> bool {
        self.target_position().is_some()
    }

    /// Whether deltas are currently suppressed
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Suppress delta application; the cache keeps refreshing
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume delta application from the current node position
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Forget the cached position so the next step seeds again
    pub fn reseed(&mut self) {
        self.previous = None;
    }

    /// Observe the node once
    pub fn step(&mut self) -> FollowStep {
        let Some(current) = self.target_position() else {
            return FollowStep::Lost;
        };

        match self.previous.replace(current) {
            None => FollowStep::Seeded,
            Some(_) if self.paused => FollowStep::Paused,
            Some(previous) => FollowStep::Moved(current - previous),
        }
    }
}

impl std::fmt::Debug for FollowBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowBinding")
            .field("alive", &(self.target.strong_count() > 0))
            .field("offset", &self.offset)
            .field("previous", &self.previous)
            .field("paused", &self.paused)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(anchor: &Arc<SceneAnchor>) -> FollowBinding {
        FollowBinding::new(FollowRequest::for_node(anchor, Vec3::new(0.0, 2.0, 8.0)))
    }

    #[test]
    fn test_first_step_seeds() {
        let anchor = SceneAnchor::shared("probe", Vec3::new(4.0, 0.0, 0.0));
        let mut binding = bind(&anchor);

        assert_eq!(binding.previous_position(), None);
        assert_eq!(binding.step(), FollowStep::Seeded);
        assert_eq!(binding.previous_position(), Some(Vec3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_reports_exact_delta() {
        let anchor = SceneAnchor::shared("probe", Vec3::ZERO);
        let mut binding = bind(&anchor);
        binding.step();

        anchor.translate(Vec3::new(1.5, -2.0, 0.25));
        assert_eq!(binding.step(), FollowStep::Moved(Vec3::new(1.5, -2.0, 0.25)));

        // No motion yields a zero delta
        assert_eq!(binding.step(), FollowStep::Moved(Vec3::ZERO));
    }

    #[test]
    fn test_pause_refreshes_cache() {
        let anchor = SceneAnchor::shared("probe", Vec3::ZERO);
        let mut binding = bind(&anchor);
        binding.step();

        binding.pause();
        for _ in 0..5 {
            anchor.translate(Vec3::X);
            assert_eq!(binding.step(), FollowStep::Paused);
        }
        assert_eq!(binding.previous_position(), Some(Vec3::new(5.0, 0.0, 0.0)));

        binding.resume();
        anchor.translate(Vec3::Z);
        assert_eq!(binding.step(), FollowStep::Moved(Vec3::Z));
    }

    #[test]
    fn test_reseed_after_settle() {
        let anchor = SceneAnchor::shared("probe", Vec3::ZERO);
        let mut binding = bind(&anchor);
        binding.step();

        anchor.translate(Vec3::new(10.0, 0.0, 0.0));
        binding.reseed();
        assert_eq!(binding.step(), FollowStep::Seeded);
    }

    #[test]
    fn test_dropped_node_is_lost() {
        let anchor = SceneAnchor::shared("probe", Vec3::ZERO);
        let mut binding = bind(&anchor);
        binding.step();

        drop(anchor);
        assert!(!binding.is_valid());
        assert_eq!(binding.step(), FollowStep::Lost);
    }

    #[test]
    fn test_unplaced_node_is_lost() {
        let anchor = SceneAnchor::shared("probe", Vec3::ZERO);
        let mut binding = bind(&anchor);

        anchor.unplace();
        assert_eq!(binding.step(), FollowStep::Lost);
    }

    #[test]
    fn test_offset_is_kept() {
        let anchor = SceneAnchor::shared("probe", Vec3::ZERO);
        let binding = bind(&anchor);
        assert_eq!(binding.offset(), Vec3::new(0.0, 2.0, 8.0));
    }
}
