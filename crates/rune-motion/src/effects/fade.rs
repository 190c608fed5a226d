//! Opacity fade of the destination.

use crate::error::Result;
use crate::style::{MotionStyle, TransitionDecl};

use super::{Effect, EffectOptions, MotionData, PhaseFuture, after_delay, failed, finished};

/// Fades the destination in from fully transparent.
#[derive(Debug, Clone, Default)]
pub struct Fade {
    options: EffectOptions,
}

impl Fade {
    pub fn new(options: EffectOptions) -> Self {
        Self { options }
    }

    fn duration_ms(&self, data: &MotionData) -> Result<f64> {
        self.options
            .duration
            .resolve(&data.origin_box(), &data.destination_box())
    }
}

impl Effect for Fade {
    fn name(&self) -> &'static str {
        "Fade"
    }

    fn validate(&self) -> Result<()> {
        self.options.validate()
    }

    fn before_animate(&self, data: &MotionData) -> PhaseFuture {
        if let Err(err) = self.options.validate() {
            return failed(err);
        }
        data.destination.paint(MotionStyle::hidden());
        finished()
    }

    fn animate(&self, data: &MotionData) -> PhaseFuture {
        let resolved = self
            .options
            .easing()
            .and_then(|easing| Ok((easing, self.duration_ms(data)?)));
        let (easing, duration_ms) = match resolved {
            Ok(resolved) => resolved,
            Err(err) => return failed(err),
        };

        data.destination.paint(
            MotionStyle::shown().with_transition(TransitionDecl::new("opacity", duration_ms, easing)),
        );
        after_delay(duration_ms)
    }
}
