//! Keeps a container hidden while the transitions below it are running.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use rune_motion::{MotionContext, VisibilityManager};
//!
//! let manager = Arc::new(VisibilityManager::new(false).for_name("hero"));
//! let context = MotionContext::new(registry).with_listener(manager.clone());
//!
//! // Paint the container with manager.style() on every frame.
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::events::{MotionEvent, MotionListener};
use crate::style::{MotionStyle, Visibility};

/// Listener that tracks whether a container should be shown.
///
/// Hides when a watched transition starts and shows again once every
/// running transition has settled (or announced, when there was nothing to
/// animate from). Every event is forwarded to the parent listener, if any,
/// so managers can be nested.
pub struct VisibilityManager {
    name: Option<String>,
    parent: Option<Arc<dyn MotionListener>>,
    state: Mutex<ContainerState>,
}

#[derive(Debug)]
struct ContainerState {
    visibility: Visibility,
    /// Names of watched transitions that started and have not settled yet.
    running: HashSet<String>,
}

impl VisibilityManager {
    /// Create a manager that reacts to every transition it hears about.
    ///
    /// With `is_initially_visible` false the container stays hidden until a
    /// first transition settles.
    pub fn new(is_initially_visible: bool) -> Self {
        Self {
            name: None,
            parent: None,
            state: Mutex::new(ContainerState {
                visibility: if is_initially_visible {
                    Visibility::Visible
                } else {
                    Visibility::Hidden
                },
                running: HashSet::new(),
            }),
        }
    }

    /// Only react to the transition called `name`.
    pub fn for_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent: Arc<dyn MotionListener>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn visibility(&self) -> Visibility {
        self.state.lock().visibility
    }

    /// Number of watched transitions still executing.
    pub fn running(&self) -> usize {
        self.state.lock().running.len()
    }

    pub fn is_visible(&self) -> bool {
        self.visibility() == Visibility::Visible
    }

    /// Style to apply to the managed container.
    pub fn style(&self) -> MotionStyle {
        MotionStyle {
            visibility: Some(self.visibility()),
            ..MotionStyle::default()
        }
    }

    fn watches(&self, name: &str) -> bool {
        self.name.as_deref().is_none_or(|watched| watched == name)
    }
}

impl MotionListener for VisibilityManager {
    fn on_event(&self, event: &MotionEvent) {
        if let Some(parent) = &self.parent {
            parent.on_event(event);
        }

        if !self.watches(event.name()) {
            return;
        }

        let mut state = self.state.lock();
        if event.is_started() {
            state.running.insert(event.name().to_string());
        } else {
            state.running.remove(event.name());
        }

        let next = if state.running.is_empty() {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        if state.visibility != next {
            tracing::trace!(name = %event.name(), visibility = ?next, "container visibility changed");
            state.visibility = next;
        }
    }
}
