//! Clip-path reveal of the destination from its focal element.

use crate::error::Result;
use crate::geometry::focal_inset;
use crate::style::{Inset, MotionStyle, TransitionDecl};

use super::{Effect, EffectOptions, MotionData, PhaseFuture, after_delay, failed, finished};

/// Grows the destination's visible area out of its focal element.
#[derive(Debug, Clone, Default)]
pub struct Reveal {
    options: EffectOptions,
}

impl Reveal {
    pub fn new(options: EffectOptions) -> Self {
        Self { options }
    }

    fn cropped(&self, data: &MotionData) -> Result<Inset> {
        let focal = data.destination_focal(self.name())?;
        Ok(focal_inset(&data.destination_box(), &focal))
    }
}

impl Effect for Reveal {
    fn name(&self) -> &'static str {
        "Reveal"
    }

    fn validate(&self) -> Result<()> {
        self.options.validate()
    }

    fn requires_focal_target(&self) -> bool {
        true
    }

    fn before_animate(&self, data: &MotionData) -> PhaseFuture {
        match self.cropped(data) {
            Ok(inset) => {
                data.destination.paint(MotionStyle {
                    clip: Some(inset),
                    ..MotionStyle::default()
                });
                finished()
            }
            Err(err) => failed(err),
        }
    }

    fn animate(&self, data: &MotionData) -> PhaseFuture {
        let resolved = self.options.easing().and_then(|easing| {
            let duration_ms = self
                .options
                .duration
                .resolve(&data.origin_box(), &data.destination_box())?;
            Ok((easing, duration_ms))
        });
        let (easing, duration_ms) = match resolved {
            Ok(resolved) => resolved,
            Err(err) => return failed(err),
        };

        data.destination.paint(
            MotionStyle {
                clip: Some(Inset::none()),
                ..MotionStyle::default()
            }
            .with_transition(TransitionDecl::new("clip-path", duration_ms, easing)),
        );
        after_delay(duration_ms)
    }
}
