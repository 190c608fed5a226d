//! Motion lifecycle events.
//!
//! Every [`Motion`](crate::Motion) reports its lifecycle to the listener in its
//! context:
//! - `Announced` once the first instance of a pair has stored its snapshot
//! - `Started` when a claimed snapshot starts animating
//! - `Settled` when every block has finished and the new snapshot is stored
//!
//! Aggregating parents (see [`VisibilityManager`](crate::VisibilityManager))
//! use these to know when all transitions below them have quiesced.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use rune_motion::{EventQueue, MotionContext};
//!
//! let queue = Arc::new(EventQueue::new());
//! let context = MotionContext::new(registry).with_listener(queue.clone());
//!
//! // ... mount motions ...
//!
//! for event in queue.drain() {
//!     if event.is_settled() {
//!         println!("{} settled", event.name());
//!     }
//! }
//! ```

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Lifecycle event of a named transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MotionEvent {
    /// No partner was waiting; the instance stored its snapshot.
    Announced {
        /// Transition name.
        name: String,
    },
    /// A partner's snapshot was claimed and the transition began.
    Started {
        /// Transition name.
        name: String,
    },
    /// All blocks completed and the fresh snapshot is stored.
    Settled {
        /// Transition name.
        name: String,
    },
}

impl MotionEvent {
    pub fn name(&self) -> &str {
        match self {
            Self::Announced { name } | Self::Started { name } | Self::Settled { name } => name,
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }

    /// True for the events after which the transition is at rest.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Announced { .. } | Self::Settled { .. })
    }
}

/// Receives motion lifecycle events.
///
/// Called synchronously from inside the coordinator; implementations should
/// return quickly and must not block.
pub trait MotionListener: Send + Sync {
    fn on_event(&self, event: &MotionEvent);
}

impl<F> MotionListener for F
where
    F: Fn(&MotionEvent) + Send + Sync,
{
    fn on_event(&self, event: &MotionEvent) {
        self(event)
    }
}

/// Listener that queues every event for later polling.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<VecDeque<MotionEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: MotionEvent) {
        self.events.lock().push_back(event);
    }

    pub fn pop(&self) -> Option<MotionEvent> {
        self.events.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Take every pending event, oldest first.
    pub fn drain(&self) -> Vec<MotionEvent> {
        self.events.lock().drain(..).collect()
    }

    /// Copies of the pending events for `name`.
    pub fn events_for(&self, name: &str) -> Vec<MotionEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.name() == name)
            .cloned()
            .collect()
    }
}

impl MotionListener for EventQueue {
    fn on_event(&self, event: &MotionEvent) {
        self.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_event_accessors() {
        let started = MotionEvent::Started {
            name: "card".to_string(),
        };
        assert_eq!(started.name(), "card");
        assert!(started.is_started());
        assert!(!started.is_settled());

        assert!(
            MotionEvent::Announced {
                name: "card".to_string()
            }
            .is_settled()
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = MotionEvent::Settled {
            name: "card".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "settled", "name": "card" }));

        let parsed: MotionEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_queue_drain_and_filter() {
        let queue = EventQueue::new();
        queue.on_event(&MotionEvent::Started { name: "a".to_string() });
        queue.on_event(&MotionEvent::Started { name: "b".to_string() });
        queue.on_event(&MotionEvent::Settled { name: "a".to_string() });

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.events_for("a").len(), 2);

        let drained = queue.drain();
        assert_eq!(drained[0].name(), "a");
        assert_eq!(drained[1].name(), "b");
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_closure_listener() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener = move |event: &MotionEvent| sink.lock().push(event.name().to_string());

        listener.on_event(&MotionEvent::Announced { name: "z".to_string() });

        assert_eq!(*seen.lock(), vec!["z".to_string()]);
    }
}
