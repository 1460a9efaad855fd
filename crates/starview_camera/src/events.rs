//! Camera event registry
//!
//! Observers register callbacks (or take a channel receiver) and are told
//! when a transition finishes naturally or when the user grabs the view.
//! Cancelled transitions publish nothing.

use crate::pose::CameraPose;
use slotmap::{new_key_type, SlotMap};
use std::sync::mpsc::{self, Receiver};
use tracing::debug;

new_key_type! {
    /// Handle to a registered event subscriber
    pub struct SubscriptionId;
}

/// Identifier of one transition request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(pub(crate) u64);

impl TransitionId {
    /// Raw sequence number (requests are numbered from 1)
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TransitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload of a natural transition completion
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionCompleted {
    /// Request that finished
    pub id: TransitionId,
    /// Final pose, exactly the requested end pose
    pub pose: CameraPose,
    /// Caller-supplied focus label, if any
    pub focus: Option<String>,
    /// Whether the camera is now following an object
    pub following: bool,
}

/// Events published by the camera core
#[derive(Clone, Debug, PartialEq)]
pub enum CameraEvent {
    /// A transition reached its end pose
    TransitionCompleted(TransitionCompleted),
    /// The user started a manual interaction
    InteractionStarted { pose: CameraPose },
}

/// Boxed event callback, returns false to unsubscribe itself
pub type EventCallback = Box<dyn FnMut(&CameraEvent) -> bool + Send>;

/// Observer registry for [`CameraEvent`]s
#[derive(Default)]
pub struct CameraEvents {
    subscribers: SlotMap<SubscriptionId, EventCallback>,
}

impl CameraEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback
    pub fn subscribe<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(&CameraEvent) + Send + 'static,
    {
        self.subscribe_while(move |event| {
            callback(event);
            true
        })
    }

    /// Register a callback that stays registered until it returns false
    pub fn subscribe_while<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&CameraEvent) -> bool + Send + 'static,
    {
        self.subscribers.insert(Box::new(callback))
    }

    /// Register a channel and return its receiving end
    ///
    /// The subscription is dropped on the first event after the receiver
    /// goes away.
    pub fn channel(&mut self) -> (SubscriptionId, Receiver<CameraEvent>) {
        let (tx, rx) = mpsc::channel();
        let id = self.subscribe_while(move |event| tx.send(event.clone()).is_ok());
        (id, rx)
    }

    /// Remove a subscriber, returns true if it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    /// Deliver an event to every subscriber
    pub fn emit(&mut self, event: &CameraEvent) {
        let before = self.subscribers.len();
        self.subscribers.retain(|_, callback| callback(event));

        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            debug!("CameraEvents: dropped {} closed subscriber(s)", dropped);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for CameraEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraEvents")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn completed(id: u64) -> CameraEvent {
        CameraEvent::TransitionCompleted(TransitionCompleted {
            id: TransitionId(id),
            pose: CameraPose::default(),
            focus: Some("mars".into()),
            following: false,
        })
    }

    #[test]
    fn test_subscriber_called() {
        let mut events = CameraEvents::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();

        events.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        events.emit(&completed(1));
        events.emit(&completed(2));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let mut events = CameraEvents::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();

        let id = events.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert!(events.unsubscribe(id));
        assert!(!events.unsubscribe(id));

        events.emit(&completed(1));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_channel_receives_events() {
        let mut events = CameraEvents::new();
        let (_id, rx) = events.channel();

        events.emit(&completed(7));
        match rx.try_recv().unwrap() {
            CameraEvent::TransitionCompleted(done) => {
                assert_eq!(done.id.get(), 7);
                assert_eq!(done.focus.as_deref(), Some("mars"));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_pruned() {
        let mut events = CameraEvents::new();
        let (closed, rx) = events.channel();
        let (_open, open_rx) = events.channel();
        drop(rx);
        assert_eq!(events.len(), 2);

        events.emit(&completed(1));
        assert_eq!(events.len(), 1);
        assert!(!events.unsubscribe(closed));
        assert!(open_rx.try_recv().is_ok());
    }

    #[test]
    fn test_subscribe_while_stops_after_false() {
        let mut events = CameraEvents::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();

        events.subscribe_while(move |_| count_clone.fetch_add(1, Ordering::SeqCst) < 1);

        events.emit(&completed(1));
        events.emit(&completed(2));
        events.emit(&completed(3));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(events.is_empty());
    }

    #[test]
    fn test_transition_id_display() {
        assert_eq!(TransitionId(3).to_string(), "#3");
    }
}
