//! Effects that crop the origin down to its focal element.

use crate::easing::EasingFunction;
use crate::error::Result;
use crate::geometry::{BoundingBox, focal_inset, focal_offset};
use crate::style::{Inset, MotionStyle, Position, RenderProps, TransitionDecl, Visibility};
use crate::transform::{Transform2D, TransformOrigin};

use super::{Effect, EffectOptions, MotionData, PhaseFuture, after_delay, failed, finished};

/// Default length of the fade-out that ends a [`ConcealMove`].
pub const DEFAULT_FADE_OUT_MS: f64 = 100.0;

struct Resolved {
    origin: BoundingBox,
    focal: BoundingBox,
    easing: EasingFunction,
    duration_ms: f64,
}

fn resolve(options: &EffectOptions, data: &MotionData, effect: &'static str) -> Result<Resolved> {
    let focal = data.origin_focal(effect)?;
    let easing = options.easing()?;
    let origin = data.origin_box();
    let duration_ms = options.duration.resolve(&origin, &data.destination_box())?;
    Ok(Resolved {
        origin,
        focal,
        easing,
        duration_ms,
    })
}

fn clone_at(origin: &BoundingBox, z_index: i32) -> MotionStyle {
    MotionStyle {
        position: Some(Position::Absolute),
        top: Some(origin.location.top),
        left: Some(origin.location.left),
        width: Some(origin.size.width),
        height: Some(origin.size.height),
        margin: Some(0.0),
        transform_origin: Some(TransformOrigin::top_left()),
        z_index: Some(z_index),
        ..MotionStyle::default()
    }
}

fn hide_origin(data: &MotionData) {
    data.origin.paint(MotionStyle {
        visibility: Some(Visibility::Hidden),
        ..MotionStyle::default()
    });
}

/// Shrinks the origin's visible area onto its focal element, in place.
#[derive(Debug, Clone, Default)]
pub struct Conceal {
    options: EffectOptions,
}

impl Conceal {
    pub fn new(options: EffectOptions) -> Self {
        Self { options }
    }
}

impl Effect for Conceal {
    fn name(&self) -> &'static str {
        "Conceal"
    }

    fn validate(&self) -> Result<()> {
        self.options.validate()
    }

    fn requires_focal_target(&self) -> bool {
        true
    }

    fn before_animate(&self, data: &MotionData) -> PhaseFuture {
        match resolve(&self.options, data, self.name()) {
            Ok(resolved) => {
                data.origin.paint(MotionStyle {
                    clip: Some(Inset::none()),
                    ..clone_at(&resolved.origin, self.options.z_index)
                });
                finished()
            }
            Err(err) => failed(err),
        }
    }

    fn animate(&self, data: &MotionData) -> PhaseFuture {
        let resolved = match resolve(&self.options, data, self.name()) {
            Ok(resolved) => resolved,
            Err(err) => return failed(err),
        };

        // Focal geometry was captured together with the origin box, so the
        // inset is computed against the unadjusted origin.
        let inset = focal_inset(&data.origin.bounding_box, &resolved.focal);
        data.origin.paint(
            MotionStyle {
                clip: Some(inset),
                ..clone_at(&resolved.origin, self.options.z_index)
            }
            .with_transition(TransitionDecl::new(
                "clip-path",
                resolved.duration_ms,
                resolved.easing,
            )),
        );
        after_delay(resolved.duration_ms)
    }

    fn after_animate(&self, data: &MotionData) -> PhaseFuture {
        hide_origin(data);
        finished()
    }
}

/// Crops the origin to its focal element while moving that focal element
/// onto the destination, then fades the crop out.
#[derive(Debug, Clone)]
pub struct ConcealMove {
    options: EffectOptions,
    fade_out_ms: f64,
}

impl Default for ConcealMove {
    fn default() -> Self {
        Self::new(EffectOptions::default())
    }
}

impl ConcealMove {
    pub fn new(options: EffectOptions) -> Self {
        Self {
            options,
            fade_out_ms: DEFAULT_FADE_OUT_MS,
        }
    }

    /// Length of the closing fade-out, normally `settle_delay_ms` from config.
    pub fn with_fade_out(mut self, fade_out_ms: f64) -> Self {
        self.fade_out_ms = fade_out_ms;
        self
    }

    pub fn fade_out_ms(&self) -> f64 {
        self.fade_out_ms
    }

    fn props(&self, data: &MotionData, resolved: &Resolved, moved: bool, faded: bool) -> RenderProps {
        let destination = data.destination_box();
        let Resolved {
            origin,
            focal,
            easing,
            duration_ms,
        } = resolved;

        let mut style = MotionStyle {
            opacity: Some(if faded { 0.0 } else { 1.0 }),
            transform: Some(Transform2D::identity()),
            ..clone_at(origin, self.options.z_index)
        }
        .with_transition(TransitionDecl::new("transform", *duration_ms, *easing))
        .with_transition(TransitionDecl::new("width", *duration_ms, *easing))
        .with_transition(TransitionDecl::new("height", *duration_ms, *easing))
        .with_transition(TransitionDecl::new("opacity", duration_ms / 2.0, *easing));

        if !moved {
            return RenderProps::new(style);
        }

        style.width = Some(destination.size.width);
        style.height = Some(destination.size.height);
        style.transform = Some(Transform2D::translate(
            destination.location.left - origin.location.left,
            destination.location.top - origin.location.top,
        ));

        let offset = focal_offset(&data.origin.bounding_box, focal);
        RenderProps {
            style,
            content_offset: Some(Transform2D::translate(-offset.left, -offset.top)),
        }
    }
}

impl Effect for ConcealMove {
    fn name(&self) -> &'static str {
        "ConcealMove"
    }

    fn validate(&self) -> Result<()> {
        self.options.validate()
    }

    fn requires_focal_target(&self) -> bool {
        true
    }

    fn before_animate(&self, data: &MotionData) -> PhaseFuture {
        match resolve(&self.options, data, self.name()) {
            Ok(resolved) => {
                data.origin.paint(self.props(data, &resolved, false, false));
                finished()
            }
            Err(err) => failed(err),
        }
    }

    fn animate(&self, data: &MotionData) -> PhaseFuture {
        match resolve(&self.options, data, self.name()) {
            Ok(resolved) => {
                data.origin.paint(self.props(data, &resolved, true, false));
                after_delay(resolved.duration_ms)
            }
            Err(err) => failed(err),
        }
    }

    fn after_animate(&self, data: &MotionData) -> PhaseFuture {
        match resolve(&self.options, data, self.name()) {
            Ok(resolved) => {
                data.destination.paint(MotionStyle::shown());
                data.origin.paint(self.props(data, &resolved, true, true));
                after_delay(self.fade_out_ms)
            }
            Err(err) => failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::MotionDuration;
    use crate::effects::test_support::target;
    use crate::geometry::ScrollOffset;

    fn data(with_focal: bool) -> (MotionData, std::sync::Arc<parking_lot::Mutex<Vec<RenderProps>>>) {
        let focal = with_focal.then(|| BoundingBox::new(20.0, 30.0, 40.0, 40.0));
        let (origin, calls) = target(BoundingBox::new(0.0, 0.0, 200.0, 100.0), focal);
        let (destination, _) = target(BoundingBox::new(300.0, 100.0, 40.0, 40.0), None);
        (
            MotionData {
                name: "avatar".to_string(),
                origin,
                destination,
                scroll: ScrollOffset::default(),
            },
            calls,
        )
    }

    #[test]
    fn test_conceal_move_aligns_focal_with_destination() {
        let (data, calls) = data(true);
        let effect = ConcealMove::new(EffectOptions::default().with_duration(MotionDuration::Fixed(200.0)));

        let _ = effect.animate(&data);

        let calls = calls.lock();
        let props = &calls[0];
        assert_eq!(props.style.width, Some(40.0));
        assert_eq!(props.style.height, Some(40.0));
        assert_eq!(props.style.transform, Some(Transform2D::translate(100.0, 300.0)));
        assert_eq!(props.content_offset, Some(Transform2D::translate(-30.0, -20.0)));
    }

    #[test]
    fn test_conceal_clips_to_focal() {
        let (data, calls) = data(true);

        let _ = Conceal::default().animate(&data);

        let calls = calls.lock();
        assert_eq!(
            calls[0].style.clip,
            Some(Inset {
                top: 20.0,
                right: 130.0,
                bottom: 40.0,
                left: 30.0
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_conceal_move_fades_out_after() {
        let (data, calls) = data(true);
        let effect = ConcealMove::default().with_fade_out(60.0);

        let start = tokio::time::Instant::now();
        effect.after_animate(&data).await.unwrap();

        assert_eq!(start.elapsed().as_millis(), 60);
        assert_eq!(calls.lock()[0].style.opacity, Some(0.0));
    }

    #[test]
    fn test_missing_focal_fails_every_phase() {
        let (data, calls) = data(false);
        let effect = ConcealMove::default();

        assert!(futures::executor::block_on(effect.before_animate(&data)).is_err());
        assert!(futures::executor::block_on(effect.animate(&data)).is_err());
        assert!(calls.lock().is_empty());
    }
}
