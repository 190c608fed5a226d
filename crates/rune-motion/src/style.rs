//! Styles handed to the host's render capability.
//!
//! The engine only describes what an element should look like at each phase;
//! writing those values onto real visual elements is the host's job.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::transform::{Transform2D, TransformOrigin};

/// Visibility state for elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Element is visible.
    #[default]
    Visible,
    /// Element keeps its layout slot but is not painted.
    Hidden,
}

/// Positioning scheme for a rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    #[default]
    Static,
    Relative,
    /// Taken out of flow and placed at document coordinates.
    Absolute,
}

/// Clip rectangle expressed as distances from each edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Inset {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Inset {
    /// No clipping.
    pub fn none() -> Self {
        Self::default()
    }
}

/// One entry of a transition declaration, e.g. `transform 300ms ease`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDecl {
    pub property: String,
    pub duration_ms: f64,
    pub easing: EasingFunction,
}

impl TransitionDecl {
    pub fn new(property: impl Into<String>, duration_ms: f64, easing: EasingFunction) -> Self {
        Self {
            property: property.into(),
            duration_ms,
            easing,
        }
    }
}

impl fmt::Display for TransitionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}ms {}", self.property, self.duration_ms, self.easing)
    }
}

/// Inline style computed by an effect for one render call.
///
/// Unset fields leave the host's own styling untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform2D>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_origin: Option<TransformOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<Inset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionDecl>,
}

impl MotionStyle {
    /// Fully transparent.
    pub fn hidden() -> Self {
        Self {
            opacity: Some(0.0),
            ..Self::default()
        }
    }

    /// Fully opaque.
    pub fn shown() -> Self {
        Self {
            opacity: Some(1.0),
            ..Self::default()
        }
    }

    pub fn with_transition(mut self, decl: TransitionDecl) -> Self {
        self.transitions.push(decl);
        self
    }

    /// The `transition` declaration as CSS, or `None` when nothing transitions.
    pub fn transition_css(&self) -> Option<String> {
        if self.transitions.is_empty() {
            return None;
        }
        Some(
            self.transitions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Arguments passed to a render capability.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderProps {
    pub style: MotionStyle,
    /// Offset applied to the content inside the rendered element, used to keep
    /// a focal region in place while its container moves.
    pub content_offset: Option<Transform2D>,
}

impl RenderProps {
    pub fn new(style: MotionStyle) -> Self {
        Self {
            style,
            content_offset: None,
        }
    }
}

impl From<MotionStyle> for RenderProps {
    fn from(style: MotionStyle) -> Self {
        Self::new(style)
    }
}

/// Capability to paint an element's captured content with a given style.
///
/// The engine treats it as opaque and never inspects what gets painted.
pub type RenderFn = Arc<dyn Fn(RenderProps) + Send + Sync>;
