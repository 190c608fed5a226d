//! Effect descriptors and the three-phase contract they implement.
//!
//! An effect is a capability set: the coordinator calls `before_animate` on
//! every effect of a transition, waits for all of them, runs `animate` block
//! by block, and finally starts `after_animate`. Each phase returns a future
//! that resolves once that phase has finished visually.
//!
//! Built-in effects:
//! - [`Move`]: FLIP translate and scale of the origin clone onto the destination
//! - [`FadeMove`]: [`Move`] that fades out while travelling
//! - [`Fade`]: destination fades in
//! - [`Reveal`]: destination clip grows out of its focal element
//! - [`Conceal`]: origin clip shrinks onto its focal element
//! - [`ConcealMove`]: origin is cropped to its focal element while travelling
//! - [`Noop`]: completes immediately

mod conceal;
mod fade;
mod flip_move;
mod reveal;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use rune_config::MotionConfig;
use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::error::{MotionError, Result};
use crate::geometry::{BoundingBox, ScrollOffset, estimate_dynamic_duration, recalculate_from_scroll};
use crate::style::{RenderFn, RenderProps};

pub use conceal::{Conceal, ConcealMove};
pub use fade::Fade;
pub use flip_move::{FadeMove, Move};
pub use reveal::Reveal;

/// Future returned by each effect phase.
pub type PhaseFuture = BoxFuture<'static, Result<()>>;

/// A pluggable motion effect.
pub trait Effect: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Check the effect's own configuration.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Whether the effect needs a focal element to compute its geometry.
    fn requires_focal_target(&self) -> bool {
        false
    }

    /// Prepare visual state. Expected to resolve quickly.
    fn before_animate(&self, data: &MotionData) -> PhaseFuture;

    /// Run the visible part of the effect.
    fn animate(&self, data: &MotionData) -> PhaseFuture;

    /// Cleanup once every block has finished.
    fn after_animate(&self, _data: &MotionData) -> PhaseFuture {
        finished()
    }
}

impl fmt::Debug for dyn Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A phase that is already complete.
pub fn finished() -> PhaseFuture {
    future::ready(Ok(())).boxed()
}

/// A phase that failed before it could start.
pub fn failed(err: MotionError) -> PhaseFuture {
    future::ready(Err(err)).boxed()
}

/// A phase that completes once `duration_ms` has elapsed.
pub fn after_delay(duration_ms: f64) -> PhaseFuture {
    let delay = Duration::from_millis(duration_ms.max(0.0).round() as u64);
    async move {
        tokio::time::sleep(delay).await;
        Ok(())
    }
    .boxed()
}

/// Geometry and render capability of one side of a transition.
#[derive(Clone)]
pub struct TargetData {
    pub bounding_box: BoundingBox,
    pub focal_bounding_box: Option<BoundingBox>,
    pub render: RenderFn,
}

impl TargetData {
    /// Paint this target through its render capability.
    pub fn paint(&self, props: impl Into<RenderProps>) {
        (self.render)(props.into());
    }
}

impl fmt::Debug for TargetData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetData")
            .field("bounding_box", &self.bounding_box)
            .field("focal_bounding_box", &self.focal_bounding_box)
            .finish_non_exhaustive()
    }
}

/// Everything an effect sees while a transition runs.
#[derive(Debug, Clone)]
pub struct MotionData {
    pub name: String,
    /// The unmounted instance whose snapshot was claimed.
    pub origin: TargetData,
    /// The instance that is mounting now.
    pub destination: TargetData,
    /// Scroll offset when the transition started executing.
    pub scroll: ScrollOffset,
}

impl MotionData {
    /// Origin box re-anchored to the current scroll position.
    pub fn origin_box(&self) -> BoundingBox {
        recalculate_from_scroll(&self.origin.bounding_box, self.scroll)
    }

    pub fn destination_box(&self) -> BoundingBox {
        self.destination.bounding_box
    }

    /// Focal box of the origin, or a configuration error naming `effect`.
    pub fn origin_focal(&self, effect: &'static str) -> Result<BoundingBox> {
        self.origin
            .focal_bounding_box
            .ok_or_else(|| MotionError::MissingFocalTarget {
                effect,
                name: self.name.clone(),
            })
    }

    /// Focal box of the destination, or a configuration error naming `effect`.
    pub fn destination_focal(&self, effect: &'static str) -> Result<BoundingBox> {
        self.destination
            .focal_bounding_box
            .ok_or_else(|| MotionError::MissingFocalTarget {
                effect,
                name: self.name.clone(),
            })
    }
}

/// How long an effect runs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "DurationRepr", into = "DurationRepr")]
pub enum MotionDuration {
    /// Derived from distance and size change, see [`estimate_dynamic_duration`].
    #[default]
    Dynamic,
    /// Fixed number of milliseconds.
    Fixed(f64),
}

impl MotionDuration {
    /// Milliseconds this duration stands for between two boxes.
    pub fn resolve(&self, origin: &BoundingBox, destination: &BoundingBox) -> Result<f64> {
        match *self {
            Self::Dynamic => Ok(estimate_dynamic_duration(origin, destination)),
            Self::Fixed(ms) if ms.is_finite() && ms >= 0.0 => Ok(ms),
            Self::Fixed(ms) => Err(MotionError::InvalidDuration(ms.to_string())),
        }
    }
}

impl FromStr for MotionDuration {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed == "dynamic" {
            return Ok(Self::Dynamic);
        }

        let millis = trimmed.strip_suffix("ms").unwrap_or(trimmed).trim();
        match millis.parse::<f64>() {
            Ok(ms) if ms.is_finite() && ms >= 0.0 => Ok(Self::Fixed(ms)),
            _ => Err(MotionError::InvalidDuration(trimmed.to_string())),
        }
    }
}

impl fmt::Display for MotionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic => f.write_str("dynamic"),
            Self::Fixed(ms) => write!(f, "{ms}ms"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DurationRepr {
    Millis(f64),
    Keyword(String),
}

impl TryFrom<DurationRepr> for MotionDuration {
    type Error = MotionError;

    fn try_from(repr: DurationRepr) -> Result<Self> {
        match repr {
            DurationRepr::Millis(ms) if ms.is_finite() && ms >= 0.0 => Ok(Self::Fixed(ms)),
            DurationRepr::Millis(ms) => Err(MotionError::InvalidDuration(ms.to_string())),
            DurationRepr::Keyword(keyword) => keyword.parse(),
        }
    }
}

impl From<MotionDuration> for DurationRepr {
    fn from(duration: MotionDuration) -> Self {
        match duration {
            MotionDuration::Dynamic => Self::Keyword("dynamic".to_string()),
            MotionDuration::Fixed(ms) => Self::Millis(ms),
        }
    }
}

/// Options shared by the built-in effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectOptions {
    pub duration: MotionDuration,
    /// CSS easing descriptor, parsed when the effect runs.
    pub timing_function: String,
    pub z_index: i32,
    /// Scale the moving element horizontally.
    pub scale_x: bool,
    /// Scale the moving element vertically.
    pub scale_y: bool,
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self {
            duration: MotionDuration::Dynamic,
            timing_function: EasingFunction::standard().to_string(),
            z_index: 0,
            scale_x: true,
            scale_y: true,
        }
    }
}

impl EffectOptions {
    /// Defaults seeded from the `[motion]` section of `rune.toml`.
    pub fn from_config(config: &MotionConfig) -> Result<Self> {
        let options = Self {
            duration: config.default_duration.parse()?,
            timing_function: config.timing_function.clone(),
            ..Self::default()
        };
        options.validate()?;
        Ok(options)
    }

    pub fn with_duration(mut self, duration: MotionDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_timing_function(mut self, timing_function: impl Into<String>) -> Self {
        self.timing_function = timing_function.into();
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_scale(mut self, scale_x: bool, scale_y: bool) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn easing(&self) -> Result<EasingFunction> {
        self.timing_function.parse()
    }

    pub fn validate(&self) -> Result<()> {
        self.easing()?;
        if let MotionDuration::Fixed(ms) = self.duration {
            if !ms.is_finite() || ms < 0.0 {
                return Err(MotionError::InvalidDuration(ms.to_string()));
            }
        }
        Ok(())
    }
}

/// Effect that does nothing; useful as a pure handoff marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl Effect for Noop {
    fn name(&self) -> &'static str {
        "Noop"
    }

    fn before_animate(&self, _data: &MotionData) -> PhaseFuture {
        finished()
    }

    fn animate(&self, _data: &MotionData) -> PhaseFuture {
        finished()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_parse() {
        assert_eq!("dynamic".parse::<MotionDuration>().unwrap(), MotionDuration::Dynamic);
        assert_eq!("300".parse::<MotionDuration>().unwrap(), MotionDuration::Fixed(300.0));
        assert_eq!("150ms".parse::<MotionDuration>().unwrap(), MotionDuration::Fixed(150.0));
        assert!(matches!(
            "-5".parse::<MotionDuration>(),
            Err(MotionError::InvalidDuration(_))
        ));
        assert!(matches!(
            "soon".parse::<MotionDuration>(),
            Err(MotionError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_duration_serde() {
        let dynamic: MotionDuration = serde_json::from_str("\"dynamic\"").unwrap();
        assert_eq!(dynamic, MotionDuration::Dynamic);

        let fixed: MotionDuration = serde_json::from_str("250").unwrap();
        assert_eq!(fixed, MotionDuration::Fixed(250.0));

        assert!(serde_json::from_str::<MotionDuration>("\"later\"").is_err());
        assert_eq!(serde_json::to_string(&MotionDuration::Dynamic).unwrap(), "\"dynamic\"");
    }

    #[test]
    fn test_duration_resolve() {
        let origin = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let destination = BoundingBox::new(200.0, 50.0, 50.0, 50.0);

        assert_eq!(
            MotionDuration::Fixed(120.0).resolve(&origin, &destination).unwrap(),
            120.0
        );
        assert_eq!(
            MotionDuration::Dynamic.resolve(&origin, &destination).unwrap(),
            estimate_dynamic_duration(&origin, &destination)
        );
        assert!(MotionDuration::Fixed(f64::NAN).resolve(&origin, &destination).is_err());
    }

    #[test]
    fn test_options_from_json() {
        let options: EffectOptions = serde_json::from_value(serde_json::json!({
            "duration": 400,
            "timing_function": "ease-in",
            "z_index": 3,
            "scale_y": false
        }))
        .unwrap();

        assert_eq!(options.duration, MotionDuration::Fixed(400.0));
        assert_eq!(options.easing().unwrap(), EasingFunction::EaseIn);
        assert_eq!(options.z_index, 3);
        assert!(options.scale_x);
        assert!(!options.scale_y);
    }

    #[test]
    fn test_options_validate() {
        assert!(EffectOptions::default().validate().is_ok());

        let bad_easing = EffectOptions::default().with_timing_function("wobbly");
        assert!(matches!(
            bad_easing.validate(),
            Err(MotionError::InvalidTimingFunction(_))
        ));

        let bad_duration = EffectOptions::default().with_duration(MotionDuration::Fixed(-1.0));
        assert!(matches!(
            bad_duration.validate(),
            Err(MotionError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_options_from_config() {
        let config = MotionConfig {
            default_duration: "180".to_string(),
            timing_function: "linear".to_string(),
            ..MotionConfig::default()
        };
        let options = EffectOptions::from_config(&config).unwrap();
        assert_eq!(options.duration, MotionDuration::Fixed(180.0));
        assert_eq!(options.easing().unwrap(), EasingFunction::Linear);

        let broken = MotionConfig {
            default_duration: "eventually".to_string(),
            ..MotionConfig::default()
        };
        assert!(EffectOptions::from_config(&broken).is_err());
    }
}
