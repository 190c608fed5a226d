//! Timing function descriptors for motion effects.
//!
//! The engine does not tween values itself; an [`EasingFunction`] is carried
//! through to the host in the `transition` declaration of a
//! [`MotionStyle`](crate::style::MotionStyle). Descriptors parse from and
//! print to CSS syntax:
//! - `linear`
//! - `ease`, `ease-in`, `ease-out`, `ease-in-out`
//! - `cubic-bezier(x1, y1, x2, y2)`
//! - `steps(n)`, `steps(n, start|end|jump-both|jump-none)`
//!
//! # Usage
//!
//! ```
//! use rune_motion::easing::EasingFunction;
//!
//! let standard: EasingFunction = "cubic-bezier(0.4, 0, 0.2, 1)".parse().unwrap();
//! assert_eq!(standard, EasingFunction::standard());
//! assert_eq!(standard.to_string(), "cubic-bezier(0.4, 0, 0.2, 1)");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Position for stepped timing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPosition {
    /// Jump at the start of each interval (CSS `jump-start` / `start`).
    Start,
    /// Jump at the end of each interval (CSS `jump-end` / `end`).
    #[default]
    End,
    /// Jump at both start and end (CSS `jump-both`).
    Both,
    /// No jump at start or end (CSS `jump-none`).
    None,
}

/// Easing function for motion timing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,

    /// CSS `ease`, equivalent to `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    #[default]
    Ease,

    /// CSS `ease-in`, equivalent to `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,

    /// CSS `ease-out`, equivalent to `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,

    /// CSS `ease-in-out`, equivalent to `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,

    /// Custom cubic bezier curve.
    /// x values must be in [0, 1], y values can be any float.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },

    /// Stepped timing with discrete jumps.
    Steps { count: u32, position: StepPosition },
}

impl EasingFunction {
    /// Curve for elements moving between two on-screen positions.
    pub fn standard() -> Self {
        Self::CubicBezier {
            x1: 0.4,
            y1: 0.0,
            x2: 0.2,
            y2: 1.0,
        }
    }

    /// Curve for elements leaving the screen.
    pub fn accelerate() -> Self {
        Self::CubicBezier {
            x1: 0.4,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
        }
    }

    /// Curve for elements entering the screen.
    pub fn decelerate() -> Self {
        Self::CubicBezier {
            x1: 0.0,
            y1: 0.0,
            x2: 0.2,
            y2: 1.0,
        }
    }

    /// Create a custom cubic bezier easing function.
    ///
    /// Fails if x1 or x2 are outside [0, 1].
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self, MotionError> {
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(MotionError::InvalidTimingFunction(format!(
                "bezier x values must be in [0, 1], got {x1} and {x2}"
            )));
        }
        Ok(Self::CubicBezier { x1, y1, x2, y2 })
    }

    /// Create a stepped easing function. Fails if `count` is 0.
    pub fn steps(count: u32, position: StepPosition) -> Result<Self, MotionError> {
        if count == 0 {
            return Err(MotionError::InvalidTimingFunction(
                "steps must be at least 1".to_string(),
            ));
        }
        Ok(Self::Steps { count, position })
    }
}

impl FromStr for EasingFunction {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || MotionError::InvalidTimingFunction(trimmed.to_string());

        match trimmed {
            "linear" => return Ok(Self::Linear),
            "ease" => return Ok(Self::Ease),
            "ease-in" => return Ok(Self::EaseIn),
            "ease-out" => return Ok(Self::EaseOut),
            "ease-in-out" => return Ok(Self::EaseInOut),
            _ => {}
        }

        let (function, args) = trimmed
            .strip_suffix(')')
            .and_then(|body| body.split_once('('))
            .ok_or_else(invalid)?;
        let args: Vec<&str> = args.split(',').map(str::trim).collect();

        match function.trim() {
            "cubic-bezier" => {
                let values = args
                    .iter()
                    .map(|arg| arg.parse::<f32>().map_err(|_| invalid()))
                    .collect::<Result<Vec<_>, _>>()?;
                match values.as_slice() {
                    [x1, y1, x2, y2] => Self::cubic_bezier(*x1, *y1, *x2, *y2),
                    _ => Err(invalid()),
                }
            }
            "steps" => {
                let (count, position) = match args.as_slice() {
                    [count] => (*count, StepPosition::End),
                    [count, position] => (*count, parse_step_position(position).ok_or_else(invalid)?),
                    _ => return Err(invalid()),
                };
                let count = count.parse::<u32>().map_err(|_| invalid())?;
                Self::steps(count, position)
            }
            _ => Err(invalid()),
        }
    }
}

fn parse_step_position(value: &str) -> Option<StepPosition> {
    match value {
        "start" | "jump-start" => Some(StepPosition::Start),
        "end" | "jump-end" => Some(StepPosition::End),
        "jump-both" => Some(StepPosition::Both),
        "jump-none" => Some(StepPosition::None),
        _ => None,
    }
}

impl fmt::Display for StepPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Self::Start => "jump-start",
            Self::End => "jump-end",
            Self::Both => "jump-both",
            Self::None => "jump-none",
        };
        f.write_str(keyword)
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Ease => f.write_str("ease"),
            Self::EaseIn => f.write_str("ease-in"),
            Self::EaseOut => f.write_str("ease-out"),
            Self::EaseInOut => f.write_str("ease-in-out"),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
            Self::Steps { count, position } => write!(f, "steps({count}, {position})"),
        }
    }
}
