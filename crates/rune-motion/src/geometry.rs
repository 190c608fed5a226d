//! Bounding-box capture and FLIP math.
//!
//! Boxes are captured in document coordinates: the viewport-relative rect the
//! host reports plus the scroll offset at capture time. A captured box keeps
//! that scroll offset so it can be re-anchored later with
//! [`recalculate_from_scroll`] when the page scrolled between an unmount and
//! the matching mount.
//!
//! # Usage
//!
//! ```ignore
//! use rune_motion::geometry::{capture_bounding_box, estimate_dynamic_duration, flip_transform};
//!
//! let origin = capture_bounding_box(&*old_element, &*scroll);
//! let destination = capture_bounding_box(&*new_element, &*scroll);
//! let duration_ms = estimate_dynamic_duration(&origin, &destination);
//! let transform = flip_transform(&origin, &destination, true, true);
//! ```

use serde::{Deserialize, Serialize};

use crate::style::Inset;
use crate::transform::Transform2D;

/// Duration used when origin and destination are identical.
pub const BASE_DURATION_MS: f64 = 200.0;

/// Weight of the positional distance term in [`estimate_dynamic_duration`].
const DISTANCE_WEIGHT_MS: f64 = 90.0;

/// Weight of the size-change term in [`estimate_dynamic_duration`].
const SIZE_WEIGHT_MS: f64 = 45.0;

/// Pixels that make up one unit of distance or size change.
const PIXELS_PER_UNIT: f64 = 100.0;

/// Top-left corner of a box in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub top: f64,
    pub left: f64,
}

/// Width and height of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Viewport-relative rectangle as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }
}

/// Scroll position of the document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub top: f64,
    pub left: f64,
}

impl ScrollOffset {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }
}

/// Size and document position of an element at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Document-relative position.
    pub location: Location,
    pub size: Size,
    /// Scroll offset when the box was captured.
    #[serde(default)]
    pub scroll: ScrollOffset,
}

impl BoundingBox {
    /// Create a box at a document position with no recorded scroll.
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            location: Location { top, left },
            size: Size { width, height },
            scroll: ScrollOffset::default(),
        }
    }

    /// Build a box from a viewport rect and the scroll offset it was read at.
    pub fn from_client_rect(rect: Rect, scroll: ScrollOffset) -> Self {
        Self {
            location: Location {
                top: rect.top + scroll.top,
                left: rect.left + scroll.left,
            },
            size: Size {
                width: rect.width,
                height: rect.height,
            },
            scroll,
        }
    }

    pub fn right(&self) -> f64 {
        self.location.left + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.location.top + self.size.height
    }

    /// Distance between the top-left corners of two boxes.
    pub fn distance_to(&self, other: &BoundingBox) -> f64 {
        let dx = other.location.left - self.location.left;
        let dy = other.location.top - self.location.top;
        dx.hypot(dy)
    }

    /// Magnitude of the width/height change between two boxes.
    pub fn size_delta_to(&self, other: &BoundingBox) -> f64 {
        let dw = other.size.width - self.size.width;
        let dh = other.size.height - self.size.height;
        dw.hypot(dh)
    }
}

/// A visual element the host can measure on demand.
///
/// Must be callable at any time: mount, update and just before unmount.
pub trait ElementHandle: Send + Sync {
    /// Current viewport-relative rectangle of the element.
    fn client_rect(&self) -> Rect;
}

/// Source of the current document scroll position.
pub trait ScrollSource: Send + Sync {
    fn scroll_offset(&self) -> ScrollOffset;
}

/// Scroll source that never moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedScroll(pub ScrollOffset);

impl ScrollSource for FixedScroll {
    fn scroll_offset(&self) -> ScrollOffset {
        self.0
    }
}

/// Read the current size and document position of an element.
pub fn capture_bounding_box(element: &dyn ElementHandle, scroll: &dyn ScrollSource) -> BoundingBox {
    BoundingBox::from_client_rect(element.client_rect(), scroll.scroll_offset())
}

/// Re-anchor a captured box to the current scroll position.
///
/// The element keeps the viewport position it had when captured, so any
/// scroll accrued since then moves its document position by the same delta.
pub fn recalculate_from_scroll(bounding_box: &BoundingBox, current: ScrollOffset) -> BoundingBox {
    let delta_top = current.top - bounding_box.scroll.top;
    let delta_left = current.left - bounding_box.scroll.left;

    BoundingBox {
        location: Location {
            top: bounding_box.location.top + delta_top,
            left: bounding_box.location.left + delta_left,
        },
        size: bounding_box.size,
        scroll: current,
    }
}

/// Estimate how long a motion between two boxes should take, in milliseconds.
///
/// Grows with both the travelled distance and the size change, flattening
/// out logarithmically so long trips do not drag. Identical boxes yield
/// [`BASE_DURATION_MS`].
pub fn estimate_dynamic_duration(origin: &BoundingBox, destination: &BoundingBox) -> f64 {
    let distance = origin.distance_to(destination) / PIXELS_PER_UNIT;
    let size_delta = origin.size_delta_to(destination) / PIXELS_PER_UNIT;

    BASE_DURATION_MS + DISTANCE_WEIGHT_MS * distance.ln_1p() + SIZE_WEIGHT_MS * size_delta.ln_1p()
}

/// Transform that takes a clone laid out at `origin` onto `destination`.
///
/// Assumes a top-left transform origin. Scaling can be disabled per axis;
/// an axis whose origin extent is zero is never scaled.
pub fn flip_transform(
    origin: &BoundingBox,
    destination: &BoundingBox,
    scale_x: bool,
    scale_y: bool,
) -> Transform2D {
    let translate = Transform2D::translate(
        destination.location.left - origin.location.left,
        destination.location.top - origin.location.top,
    );

    let sx = axis_scale(scale_x, origin.size.width, destination.size.width);
    let sy = axis_scale(scale_y, origin.size.height, destination.size.height);

    translate.then(&Transform2D::scale(sx, sy))
}

fn axis_scale(enabled: bool, from: f64, to: f64) -> f64 {
    if enabled && from > 0.0 { to / from } else { 1.0 }
}

/// Position of a focal box relative to the element that contains it.
pub fn focal_offset(element: &BoundingBox, focal: &BoundingBox) -> Location {
    Location {
        top: focal.location.top - element.location.top,
        left: focal.location.left - element.location.left,
    }
}

/// Clip inset that crops `element` down to `focal`.
pub fn focal_inset(element: &BoundingBox, focal: &BoundingBox) -> Inset {
    Inset {
        top: (focal.location.top - element.location.top).max(0.0),
        right: (element.right() - focal.right()).max(0.0),
        bottom: (element.bottom() - focal.bottom()).max(0.0),
        left: (focal.location.left - element.location.left).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticElement(Rect);

    impl ElementHandle for StaticElement {
        fn client_rect(&self) -> Rect {
            self.0
        }
    }

    #[test]
    fn test_capture_adds_scroll() {
        let element = StaticElement(Rect::new(10.0, 20.0, 30.0, 40.0));
        let scroll = FixedScroll(ScrollOffset::new(100.0, 5.0));

        let captured = capture_bounding_box(&element, &scroll);

        assert_eq!(captured.location, Location { top: 110.0, left: 25.0 });
        assert_eq!(captured.size, Size { width: 30.0, height: 40.0 });
        assert_eq!(captured.scroll, ScrollOffset::new(100.0, 5.0));
    }

    #[test]
    fn test_recalculate_from_scroll_applies_delta() {
        let captured =
            BoundingBox::from_client_rect(Rect::new(50.0, 50.0, 10.0, 10.0), ScrollOffset::new(0.0, 0.0));

        let moved = recalculate_from_scroll(&captured, ScrollOffset::new(300.0, 20.0));

        assert_eq!(moved.location, Location { top: 350.0, left: 70.0 });
        assert_eq!(moved.size, captured.size);
        assert_eq!(moved.scroll, ScrollOffset::new(300.0, 20.0));
    }

    #[test]
    fn test_recalculate_without_scroll_is_identity() {
        let captured =
            BoundingBox::from_client_rect(Rect::new(5.0, 6.0, 7.0, 8.0), ScrollOffset::new(40.0, 0.0));
        let same = recalculate_from_scroll(&captured, ScrollOffset::new(40.0, 0.0));
        assert_eq!(same, captured);
    }

    #[test]
    fn test_dynamic_duration_baseline() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(estimate_dynamic_duration(&a, &a), BASE_DURATION_MS);
    }

    #[test]
    fn test_dynamic_duration_deterministic() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let b = BoundingBox::new(200.0, 50.0, 50.0, 50.0);
        assert_eq!(
            estimate_dynamic_duration(&a, &b),
            estimate_dynamic_duration(&a, &b)
        );
    }

    #[test]
    fn test_dynamic_duration_monotonic_in_distance() {
        let origin = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let mut previous = estimate_dynamic_duration(&origin, &origin);
        for step in 1..50 {
            let destination = BoundingBox::new(step as f64 * 37.0, step as f64 * 11.0, 100.0, 100.0);
            let current = estimate_dynamic_duration(&origin, &destination);
            assert!(current > previous, "step {step}: {current} <= {previous}");
            assert!(current >= 0.0);
            previous = current;
        }
    }

    #[test]
    fn test_dynamic_duration_monotonic_in_size() {
        let origin = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let mut previous = estimate_dynamic_duration(&origin, &origin);
        for step in 1..50 {
            let grow = step as f64 * 13.0;
            let destination = BoundingBox::new(0.0, 0.0, 100.0 + grow, 100.0 + grow);
            let current = estimate_dynamic_duration(&origin, &destination);
            assert!(current > previous, "step {step}: {current} <= {previous}");
            previous = current;
        }
    }

    #[test]
    fn test_flip_transform_translate_and_scale() {
        let origin = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let destination = BoundingBox::new(200.0, 50.0, 50.0, 50.0);

        let transform = flip_transform(&origin, &destination, true, true);

        assert_eq!(transform.tx, 50.0);
        assert_eq!(transform.ty, 200.0);
        assert_eq!(transform.a, 0.5);
        assert_eq!(transform.d, 0.5);

        // The origin's far corner lands on the destination's far corner.
        let (x, y) = transform.apply_point(100.0, 100.0);
        assert_eq!((x, y), (100.0, 250.0));
    }

    #[test]
    fn test_flip_transform_axis_toggles() {
        let origin = BoundingBox::new(0.0, 0.0, 100.0, 0.0);
        let destination = BoundingBox::new(0.0, 0.0, 50.0, 20.0);

        let transform = flip_transform(&origin, &destination, false, true);

        assert_eq!(transform.a, 1.0);
        // Zero-height origin never scales.
        assert_eq!(transform.d, 1.0);
    }

    #[test]
    fn test_focal_inset() {
        let element = BoundingBox::new(0.0, 0.0, 200.0, 100.0);
        let focal = BoundingBox::new(10.0, 20.0, 50.0, 30.0);

        let inset = focal_inset(&element, &focal);
        assert_eq!(
            inset,
            Inset {
                top: 10.0,
                right: 130.0,
                bottom: 60.0,
                left: 20.0
            }
        );

        let offset = focal_offset(&element, &focal);
        assert_eq!(offset, Location { top: 10.0, left: 20.0 });
    }
}
