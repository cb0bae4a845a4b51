//! Absolute draw instructions handed to a document toolkit.

use serde::{Deserialize, Serialize};

use super::annotation::{Color, Layer};
use super::metrics::StandardFont;
use crate::geometry::{DocumentPoint, DocumentRect};

/// What to paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DrawKind {
    Text {
        text: String,
        font: StandardFont,
        font_size_pt: f32,
        color: Color,
    },
    Image {
        resource: String,
    },
    Rect {
        color: Color,
    },
}

/// One paint operation in a page's native coordinates.
///
/// The content occupies a `width` x `height` box whose bottom-left corner is
/// `origin`, turned `rotation_deg` counter-clockwise about that corner. Text
/// starts at `origin` on its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawInstruction {
    /// Zero-based target page
    pub page_index: usize,
    pub kind: DrawKind,
    pub origin: DocumentPoint,
    pub width: f32,
    pub height: f32,
    /// Counter-clockwise rotation in document space, degrees
    pub rotation_deg: f32,
    pub opacity: f32,
    pub layer: Layer,
    /// The caller must paint the original page content again on top of
    /// this instruction
    pub restamp_original: bool,
}

impl DrawInstruction {
    /// Whether there is nothing to paint.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Axis-aligned bounds of the painted area.
    pub fn bounds(&self) -> DocumentRect {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        let corners = [
            (0.0, 0.0),
            (self.width, 0.0),
            (0.0, self.height),
            (self.width, self.height),
        ]
        .map(|(x, y)| {
            (
                self.origin.x + x * cos - y * sin,
                self.origin.y + x * sin + y * cos,
            )
        });

        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);
        DocumentRect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Center of the painted area.
    pub fn center(&self) -> DocumentPoint {
        self.bounds().center()
    }
}
