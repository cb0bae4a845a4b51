//! Page geometry: coordinate spaces and rotation.
//!
//! Three coordinate spaces meet here:
//!
//! - **Document space**: the page's own coordinates in points, origin at the
//!   bottom-left of the unrotated page, y upward. Drawing primitives want this.
//! - **Display space**: points on the page as shown after its rotation, origin
//!   top-left, y downward. [`DisplayPoint`] and [`DisplayRect`] live here.
//! - **Normalized space**: display space expressed as percentages of the
//!   displayed width and height (`0..=100`). Interactive overlays use this.
//!
//! Pixel space is display space scaled by a [`Viewport`].
//!
//! Everything here is pure arithmetic; nothing is clamped to `0..=100`. Non-finite
//! inputs are treated as zero.

mod resolve;
mod rotation;
mod viewport;

use serde::{Deserialize, Serialize};

pub use resolve::{
    display_to_document, document_rect_to_display, document_to_display,
    document_to_normalized_box, document_to_normalized_point, inches_to_points,
    normalized_to_document_box, normalized_to_document_point, normalized_to_display,
    points_to_inches, POINTS_PER_INCH,
};
pub use rotation::{compose_rotation, normalize_rotation, Rotation};
pub use viewport::{PixelPoint, Viewport};

/// Size and rotation of one page.
///
/// `width_pt` and `height_pt` describe the unrotated page box; the rotation is
/// applied when the page is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Unrotated width in points
    pub width_pt: f32,
    /// Unrotated height in points
    pub height_pt: f32,
    /// Display rotation
    #[serde(default)]
    pub rotation: Rotation,
}

impl PageGeometry {
    /// A4 portrait (595.28 x 841.89 pt).
    pub const A4: PageGeometry = PageGeometry::new(595.28, 841.89);
    /// US Letter portrait (612 x 792 pt).
    pub const LETTER: PageGeometry = PageGeometry::new(612.0, 792.0);

    /// Create an upright page.
    pub const fn new(width_pt: f32, height_pt: f32) -> Self {
        Self {
            width_pt,
            height_pt,
            rotation: Rotation::Deg0,
        }
    }

    /// Set the rotation and return self.
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Width of the page as displayed.
    pub fn displayed_width(&self) -> f32 {
        if self.rotation.is_sideways() {
            self.height_pt
        } else {
            self.width_pt
        }
    }

    /// Height of the page as displayed.
    pub fn displayed_height(&self) -> f32 {
        if self.rotation.is_sideways() {
            self.width_pt
        } else {
            self.height_pt
        }
    }

    /// Whether the page has no area.
    pub fn is_degenerate(&self) -> bool {
        !(self.width_pt > 0.0 && self.height_pt > 0.0)
    }
}

/// A point in document space (origin bottom-left, y up, points).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentPoint {
    pub x: f32,
    pub y: f32,
}

impl DocumentPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in document space. `(x, y)` is its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DocumentRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle spanning two corners in any order.
    pub fn from_corners(a: DocumentPoint, b: DocumentPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> DocumentPoint {
        DocumentPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the rectangle has zero area. Renderers draw nothing for these.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Whether the two rectangles share interior area.
    pub fn overlaps(&self, other: &DocumentRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }
}

/// A point in display space (origin top-left of the displayed page, y down, points).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub x: f32,
    pub y: f32,
}

impl DisplayPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in display space. `(x, y)` is its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A point in normalized space, in percent of the displayed page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x_pct: f32,
    pub y_pct: f32,
}

impl NormalizedPoint {
    pub fn new(x_pct: f32, y_pct: f32) -> Self {
        Self { x_pct, y_pct }
    }

    /// The center of the page.
    pub fn center() -> Self {
        Self::new(50.0, 50.0)
    }
}

/// A box in normalized space. `(x_pct, y_pct)` is its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x_pct: f32,
    pub y_pct: f32,
    pub width_pct: f32,
    pub height_pct: f32,
}

impl NormalizedBox {
    pub fn new(x_pct: f32, y_pct: f32, width_pct: f32, height_pct: f32) -> Self {
        Self {
            x_pct,
            y_pct,
            width_pct,
            height_pct,
        }
    }

    /// Center of the box.
    pub fn center(&self) -> NormalizedPoint {
        NormalizedPoint::new(
            self.x_pct + self.width_pct / 2.0,
            self.y_pct + self.height_pct / 2.0,
        )
    }

    /// Whether the box has zero area.
    pub fn is_degenerate(&self) -> bool {
        !(self.width_pct > 0.0 && self.height_pct > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displayed_size_swaps_when_sideways() {
        let geo = PageGeometry::new(612.0, 792.0);
        assert_eq!(geo.displayed_width(), 612.0);
        let geo = geo.with_rotation(Rotation::Deg90);
        assert_eq!(geo.displayed_width(), 792.0);
        assert_eq!(geo.displayed_height(), 612.0);
        // The stored box never changes.
        assert_eq!(geo.width_pt, 612.0);
    }

    #[test]
    fn test_rect_overlap() {
        let a = DocumentRect::new(0.0, 0.0, 10.0, 10.0);
        let b = DocumentRect::new(10.0, 0.0, 10.0, 10.0);
        let c = DocumentRect::new(5.0, 5.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_degenerate_checks() {
        assert!(NormalizedBox::new(10.0, 10.0, 0.0, 5.0).is_degenerate());
        assert!(DocumentRect::default().is_empty());
        assert!(PageGeometry::new(0.0, 100.0).is_degenerate());
        assert!(!PageGeometry::A4.is_degenerate());
    }
}
