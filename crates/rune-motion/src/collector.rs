//! Phase collection over a nested motion configuration.
//!
//! A motion boundary is described as a chain of effect and wait layers that
//! wraps a single render target. Collection walks that chain from the
//! outermost layer to the innermost and returns the phase contributions in
//! exactly that order, together with the target that terminates the chain.
//!
//! # Usage
//!
//! ```ignore
//! use rune_motion::collector::{MotionNode, MotionTarget, collect};
//! use rune_motion::effects::{Fade, Move};
//!
//! let tree = MotionNode::builder()
//!     .effect(Move::default())
//!     .wait()
//!     .effect(Fade::default())
//!     .build(MotionTarget::new(element, render));
//!
//! let collected = collect("card-1", &tree);
//! assert_eq!(collected.phases.len(), 3);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::effects::Effect;
use crate::error::MotionError;
use crate::geometry::ElementHandle;
use crate::style::RenderFn;

/// One entry of a collected phase sequence.
#[derive(Debug, Clone)]
pub enum PhaseContribution {
    /// An effect taking part in the transition.
    Effect(Arc<dyn Effect>),
    /// Sequencing marker: everything after it waits for everything before it.
    Wait,
}

impl PhaseContribution {
    pub fn is_wait(&self) -> bool {
        matches!(self, Self::Wait)
    }

    /// The effect carried by this contribution, if any.
    pub fn effect(&self) -> Option<&Arc<dyn Effect>> {
        match self {
            Self::Effect(effect) => Some(effect),
            Self::Wait => None,
        }
    }
}

/// The leaf of a motion configuration: the element being transitioned.
#[derive(Clone)]
pub struct MotionTarget {
    /// Handle used to measure the element.
    pub element: Arc<dyn ElementHandle>,
    /// Capability that paints the element's content with a computed style.
    pub render: RenderFn,
    /// Optional sub-element used by focal effects.
    pub focal: Option<Arc<dyn ElementHandle>>,
}

impl MotionTarget {
    pub fn new(element: Arc<dyn ElementHandle>, render: RenderFn) -> Self {
        Self {
            element,
            render,
            focal: None,
        }
    }

    pub fn with_focal(mut self, focal: Arc<dyn ElementHandle>) -> Self {
        self.focal = Some(focal);
        self
    }
}

impl fmt::Debug for MotionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionTarget")
            .field("element", &self.element.client_rect())
            .field("has_focal", &self.focal.is_some())
            .finish_non_exhaustive()
    }
}

/// A layer of a motion configuration.
#[derive(Debug, Clone)]
pub enum MotionNode {
    /// Contributes one effect, then continues into `child`.
    Effect {
        effect: Arc<dyn Effect>,
        child: Box<MotionNode>,
    },
    /// Contributes a wait barrier, then continues into `child`.
    Wait { child: Box<MotionNode> },
    /// Terminates the chain.
    Target(MotionTarget),
}

impl MotionNode {
    /// Wrap `child` in an effect layer.
    pub fn effect(effect: impl Effect + 'static, child: MotionNode) -> Self {
        Self::Effect {
            effect: Arc::new(effect),
            child: Box::new(child),
        }
    }

    /// Wrap `child` in a wait layer.
    pub fn wait(child: MotionNode) -> Self {
        Self::Wait {
            child: Box::new(child),
        }
    }

    pub fn builder() -> MotionTreeBuilder {
        MotionTreeBuilder::default()
    }
}

/// Builds a [`MotionNode`] chain outermost layer first.
#[derive(Debug, Default)]
pub struct MotionTreeBuilder {
    layers: Vec<PhaseContribution>,
}

impl MotionTreeBuilder {
    pub fn effect(self, effect: impl Effect + 'static) -> Self {
        self.shared_effect(Arc::new(effect))
    }

    /// Add an effect that is already shared elsewhere.
    pub fn shared_effect(mut self, effect: Arc<dyn Effect>) -> Self {
        self.layers.push(PhaseContribution::Effect(effect));
        self
    }

    pub fn wait(mut self) -> Self {
        self.layers.push(PhaseContribution::Wait);
        self
    }

    /// Close the chain around `target`.
    pub fn build(self, target: MotionTarget) -> MotionNode {
        self.layers
            .into_iter()
            .rev()
            .fold(MotionNode::Target(target), |child, layer| match layer {
                PhaseContribution::Wait => MotionNode::wait(child),
                PhaseContribution::Effect(effect) => MotionNode::Effect {
                    effect,
                    child: Box::new(child),
                },
            })
    }
}

/// Result of walking a motion configuration.
#[derive(Debug, Clone)]
pub struct Collected {
    /// Contributions in nesting order, outermost first.
    pub phases: Vec<PhaseContribution>,
    pub target: MotionTarget,
    /// Configuration errors found while collecting.
    pub diagnostics: Vec<MotionError>,
}

/// Walk `root` and gather its phase contributions.
///
/// Effects whose configuration is invalid, or that need a focal element the
/// target does not provide, stay in the sequence: the error is reported in
/// `diagnostics` here and again when the phase runs, where it only aborts
/// that one effect.
pub fn collect(name: &str, root: &MotionNode) -> Collected {
    let mut phases = Vec::new();
    let mut node = root;

    let target = loop {
        match node {
            MotionNode::Effect { effect, child } => {
                phases.push(PhaseContribution::Effect(effect.clone()));
                node = child;
            }
            MotionNode::Wait { child } => {
                phases.push(PhaseContribution::Wait);
                node = child;
            }
            MotionNode::Target(target) => break target.clone(),
        }
    };

    let mut diagnostics = Vec::new();
    for effect in phases.iter().filter_map(PhaseContribution::effect) {
        if let Err(err) = effect.validate() {
            diagnostics.push(err);
        }
        if effect.requires_focal_target() && target.focal.is_none() {
            diagnostics.push(MotionError::MissingFocalTarget {
                effect: effect.name(),
                name: name.to_string(),
            });
        }
    }

    for err in &diagnostics {
        tracing::warn!(name = %name, error = %err, "motion configuration error");
    }
    tracing::trace!(name = %name, phases = phases.len(), "collected motion phases");

    Collected {
        phases,
        target,
        diagnostics,
    }
}
