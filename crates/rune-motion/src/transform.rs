//! 2D affine transforms produced by motion effects.
//!
//! Effects never write transforms to the screen themselves; they hand a
//! [`Transform2D`] to the render capability inside a
//! [`MotionStyle`](crate::style::MotionStyle), and the host maps it onto its
//! own transform representation (the CSS `matrix(...)` form is available via
//! `Display`).
//!
//! # Usage
//!
//! ```
//! use rune_motion::transform::Transform2D;
//!
//! // Compose transforms (applied right to left like CSS)
//! let t = Transform2D::translate(50.0, 200.0).then(&Transform2D::scale(0.5, 0.5));
//! assert_eq!(t.apply_point(100.0, 100.0), (100.0, 250.0));
//! assert_eq!(t.to_string(), "matrix(0.5, 0, 0, 0.5, 50, 200)");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 2D affine transformation matrix.
///
/// Stored as a 3x2 matrix (the bottom row [0, 0, 1] is implicit):
/// ```text
/// | a  c  tx |
/// | b  d  ty |
/// | 0  0  1  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// Scale X (matrix element a)
    pub a: f64,
    /// Skew Y (matrix element b)
    pub b: f64,
    /// Skew X (matrix element c)
    pub c: f64,
    /// Scale Y (matrix element d)
    pub d: f64,
    /// Translate X (matrix element tx)
    pub tx: f64,
    /// Translate Y (matrix element ty)
    pub ty: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// Create an identity transform (no change).
    pub fn identity() -> Self {
        Self::translate(0.0, 0.0)
    }

    /// Create a translation transform.
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx,
            ty,
        }
    }

    /// Create a non-uniform scale transform.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Compose this transform with another (this * other).
    ///
    /// The resulting transform applies `other` first, then `self`.
    pub fn then(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    /// Apply this transform to a point.
    pub fn apply_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    /// Translation component.
    pub fn translation(&self) -> (f64, f64) {
        (self.tx, self.ty)
    }

    /// Scale component, assuming no rotation or skew.
    pub fn scale_factors(&self) -> (f64, f64) {
        (self.a, self.d)
    }

    /// Check if this is approximately an identity transform.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.a - 1.0).abs() < epsilon
            && self.b.abs() < epsilon
            && self.c.abs() < epsilon
            && (self.d - 1.0).abs() < epsilon
            && self.tx.abs() < epsilon
            && self.ty.abs() < epsilon
    }
}

impl fmt::Display for Transform2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matrix({}, {}, {}, {}, {}, {})",
            self.a, self.b, self.c, self.d, self.tx, self.ty
        )
    }
}

/// Point a transform is applied relative to, in pixels from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformOrigin {
    pub x: f64,
    pub y: f64,
}

impl TransformOrigin {
    /// Origin at the top-left corner, which FLIP math assumes.
    pub fn top_left() -> Self {
        Self::default()
    }
}

impl fmt::Display for TransformOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}px", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity() {
        let t = Transform2D::identity();
        assert!(t.is_identity(EPSILON));

        let (x, y) = t.apply_point(100.0, 200.0);
        assert!(approx_eq(x, 100.0));
        assert!(approx_eq(y, 200.0));
    }

    #[test]
    fn test_composition_order() {
        // Scale is applied first, then the translation.
        let t = Transform2D::translate(10.0, 20.0).then(&Transform2D::scale(2.0, 2.0));
        assert_eq!(t.apply_point(0.0, 0.0), (10.0, 20.0));

        let t2 = Transform2D::scale(2.0, 2.0).then(&Transform2D::translate(10.0, 20.0));
        assert_eq!(t2.apply_point(0.0, 0.0), (20.0, 40.0));
    }

    #[test]
    fn test_components() {
        let t = Transform2D::translate(50.0, 200.0).then(&Transform2D::scale(0.5, 0.25));
        assert_eq!(t.translation(), (50.0, 200.0));
        assert_eq!(t.scale_factors(), (0.5, 0.25));
        assert!(!t.is_identity(EPSILON));
    }

    #[test]
    fn test_css_output() {
        assert_eq!(
            Transform2D::identity().to_string(),
            "matrix(1, 0, 0, 1, 0, 0)"
        );
        assert_eq!(TransformOrigin::top_left().to_string(), "0px 0px");
    }
}
