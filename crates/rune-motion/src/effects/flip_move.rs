//! FLIP moves: the origin's captured content is laid out at the origin box
//! and transformed onto the destination box.

use crate::error::Result;
use crate::geometry::{BoundingBox, flip_transform};
use crate::style::{MotionStyle, Position, TransitionDecl, Visibility};
use crate::transform::{Transform2D, TransformOrigin};

use super::{Effect, EffectOptions, MotionData, PhaseFuture, after_delay, failed, finished};

/// Moves the origin's content onto the destination, scaling to its size.
#[derive(Debug, Clone, Default)]
pub struct Move {
    options: EffectOptions,
}

impl Move {
    pub fn new(options: EffectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EffectOptions {
        &self.options
    }
}

impl Effect for Move {
    fn name(&self) -> &'static str {
        "Move"
    }

    fn validate(&self) -> Result<()> {
        self.options.validate()
    }

    fn before_animate(&self, data: &MotionData) -> PhaseFuture {
        flip_before(&self.options, data, false)
    }

    fn animate(&self, data: &MotionData) -> PhaseFuture {
        flip_animate(&self.options, data, false)
    }

    fn after_animate(&self, data: &MotionData) -> PhaseFuture {
        flip_after(data)
    }
}

/// A [`Move`] whose content fades out as it travels, leaving the destination
/// to take over.
#[derive(Debug, Clone, Default)]
pub struct FadeMove {
    options: EffectOptions,
}

impl FadeMove {
    pub fn new(options: EffectOptions) -> Self {
        Self { options }
    }
}

impl Effect for FadeMove {
    fn name(&self) -> &'static str {
        "FadeMove"
    }

    fn validate(&self) -> Result<()> {
        self.options.validate()
    }

    fn before_animate(&self, data: &MotionData) -> PhaseFuture {
        flip_before(&self.options, data, true)
    }

    fn animate(&self, data: &MotionData) -> PhaseFuture {
        flip_animate(&self.options, data, true)
    }

    fn after_animate(&self, data: &MotionData) -> PhaseFuture {
        flip_after(data)
    }
}

/// Resolved geometry and timing of one FLIP move.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FlipPlan {
    pub origin: BoundingBox,
    pub transform: Transform2D,
    pub duration_ms: f64,
    pub style_at_origin: MotionStyle,
    pub style_at_destination: MotionStyle,
}

pub(crate) fn plan(options: &EffectOptions, data: &MotionData, fade: bool) -> Result<FlipPlan> {
    let easing = options.easing()?;
    // Scroll may have changed between the origin unmounting and now.
    let origin = data.origin_box();
    let destination = data.destination_box();
    let duration_ms = options.duration.resolve(&origin, &destination)?;
    let transform = flip_transform(&origin, &destination, options.scale_x, options.scale_y);

    let mut style_at_origin = MotionStyle {
        position: Some(Position::Absolute),
        top: Some(origin.location.top),
        left: Some(origin.location.left),
        width: Some(origin.size.width),
        height: Some(origin.size.height),
        margin: Some(0.0),
        transform: Some(Transform2D::identity()),
        transform_origin: Some(TransformOrigin::top_left()),
        opacity: Some(1.0),
        z_index: Some(options.z_index),
        ..MotionStyle::default()
    }
    .with_transition(TransitionDecl::new("transform", duration_ms, easing));
    if fade {
        style_at_origin =
            style_at_origin.with_transition(TransitionDecl::new("opacity", duration_ms / 2.0, easing));
    }

    let style_at_destination = MotionStyle {
        transform: Some(transform),
        opacity: Some(if fade { 0.0 } else { 1.0 }),
        ..style_at_origin.clone()
    };

    Ok(FlipPlan {
        origin,
        transform,
        duration_ms,
        style_at_origin,
        style_at_destination,
    })
}

fn flip_before(options: &EffectOptions, data: &MotionData, fade: bool) -> PhaseFuture {
    match plan(options, data, fade) {
        Ok(plan) => {
            data.origin.paint(plan.style_at_origin);
            finished()
        }
        Err(err) => failed(err),
    }
}

fn flip_animate(options: &EffectOptions, data: &MotionData, fade: bool) -> PhaseFuture {
    match plan(options, data, fade) {
        Ok(plan) => {
            data.origin.paint(plan.style_at_destination);
            after_delay(plan.duration_ms)
        }
        Err(err) => failed(err),
    }
}

fn flip_after(data: &MotionData) -> PhaseFuture {
    data.origin.paint(MotionStyle {
        visibility: Some(Visibility::Hidden),
        ..MotionStyle::default()
    });
    finished()
}
