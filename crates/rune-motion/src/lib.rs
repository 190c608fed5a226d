//! Shared-element transitions for the rune scene tree.
//!
//! When an element tagged with a name unmounts in one place and an element
//! with the same name mounts somewhere else, this crate animates the first
//! turning into the second.
//!
//! This crate provides:
//! - **Geometry**: bounding-box capture, scroll re-anchoring, FLIP math and
//!   the dynamic duration heuristic
//! - **Collector**: turns a nested effect configuration into an ordered phase
//!   sequence
//! - **Registry**: session-wide store of named snapshots with delayed eviction
//! - **Coordinator**: the per-instance state machine that runs phases block
//!   by block
//! - **Effects**: built-in FLIP, fade and clip effects
//!
//! # Architecture
//!
//! ```text
//! MotionNode tree ──collect──▶ [Effect, Wait, Effect, ...]
//!                                      │
//!            Motion::unmount ◀── ElementRegistry ──▶ Motion::mount
//!                                                       │
//!                         before_animate (all) ─▶ animate (block 1) ─▶ ... ─▶ after_animate
//! ```

pub mod collector;
pub mod coordinator;
pub mod easing;
pub mod effects;
pub mod error;
pub mod events;
pub mod geometry;
pub mod plan;
pub mod registry;
pub mod style;
pub mod transform;
pub mod visibility;

pub use collector::{Collected, MotionNode, MotionTarget, MotionTreeBuilder, PhaseContribution, collect};
pub use coordinator::{
    Motion, MotionContext, MotionOutcome, Phase, PhaseFailure, TransitionReport, TransitionState,
};
pub use easing::{EasingFunction, StepPosition};
pub use effects::{
    Conceal, ConcealMove, Effect, EffectOptions, Fade, FadeMove, MotionData, MotionDuration, Move, Noop,
    PhaseFuture, Reveal, TargetData,
};
pub use error::{MotionError, Result};
pub use events::{EventQueue, MotionEvent, MotionListener};
pub use geometry::{
    BoundingBox, ElementHandle, FixedScroll, Location, Rect, ScrollOffset, ScrollSource, Size,
    capture_bounding_box, estimate_dynamic_duration, recalculate_from_scroll,
};
pub use plan::ExecutionPlan;
pub use registry::{ElementRegistry, ElementSnapshot, EvictionHandle};
pub use style::{Inset, MotionStyle, Position, RenderFn, RenderProps, TransitionDecl, Visibility};
pub use transform::{Transform2D, TransformOrigin};
pub use visibility::VisibilityManager;
