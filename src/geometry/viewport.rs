//! Rasterized pixel space.

use serde::{Deserialize, Serialize};

use super::resolve::{display_to_document, document_to_display, POINTS_PER_INCH};
use super::{DisplayPoint, DocumentPoint, NormalizedPoint, PageGeometry};

/// A point in pixel space (origin top-left of the rendered image, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

/// A page rendered at a fixed scale.
///
/// Pixel space is display space multiplied by `scale`; a scale of 1.0 renders
/// one pixel per point (72 dpi).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    geometry: PageGeometry,
    scale: f32,
}

impl Viewport {
    /// Create a viewport at the given scale.
    pub fn new(geometry: PageGeometry, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self { geometry, scale }
    }

    /// Create a viewport for rendering at `dpi` dots per inch.
    pub fn from_dpi(geometry: PageGeometry, dpi: f32) -> Self {
        Self::new(geometry, dpi / POINTS_PER_INCH)
    }

    /// Scale factor (pixels per point).
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The page this viewport renders.
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Rendered width in pixels, following the displayed orientation.
    pub fn width_px(&self) -> f32 {
        self.geometry.displayed_width() * self.scale
    }

    /// Rendered height in pixels.
    pub fn height_px(&self) -> f32 {
        self.geometry.displayed_height() * self.scale
    }

    /// Pixel position of a native document point.
    pub fn document_to_pixel(&self, p: DocumentPoint) -> PixelPoint {
        let d = document_to_display(p, &self.geometry);
        PixelPoint {
            x: d.x * self.scale,
            y: d.y * self.scale,
        }
    }

    /// Native document point under a pixel.
    pub fn pixel_to_document(&self, p: PixelPoint) -> DocumentPoint {
        display_to_document(
            DisplayPoint::new(p.x / self.scale, p.y / self.scale),
            &self.geometry,
        )
    }

    /// Pixel position of a normalized point.
    pub fn normalized_to_pixel(&self, p: NormalizedPoint) -> PixelPoint {
        PixelPoint {
            x: p.x_pct / 100.0 * self.width_px(),
            y: p.y_pct / 100.0 * self.height_px(),
        }
    }

    /// Normalized position of a pixel. Degenerate viewports map to the origin.
    pub fn pixel_to_normalized(&self, p: PixelPoint) -> NormalizedPoint {
        let (w, h) = (self.width_px(), self.height_px());
        NormalizedPoint::new(
            if w > 0.0 { p.x / w * 100.0 } else { 0.0 },
            if h > 0.0 { p.y / h * 100.0 } else { 0.0 },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rotation;

    #[test]
    fn test_viewport_size_follows_rotation() {
        let geo = PageGeometry::LETTER.with_rotation(Rotation::Deg90);
        let vp = Viewport::from_dpi(geo, 144.0);
        assert_eq!(vp.scale(), 2.0);
        assert_eq!(vp.width_px(), 792.0 * 2.0);
        assert_eq!(vp.height_px(), 612.0 * 2.0);
    }

    #[test]
    fn test_pixel_round_trip() {
        let geo = PageGeometry::new(500.0, 700.0).with_rotation(Rotation::Deg270);
        let vp = Viewport::new(geo, 1.5);
        let p = DocumentPoint::new(120.0, 45.0);
        let back = vp.pixel_to_document(vp.document_to_pixel(p));
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);
    }

    #[test]
    fn test_normalized_pixel_mapping() {
        let vp = Viewport::new(PageGeometry::new(200.0, 100.0), 2.0);
        let px = vp.normalized_to_pixel(NormalizedPoint::new(50.0, 50.0));
        assert_eq!(px, PixelPoint { x: 200.0, y: 100.0 });
        let n = vp.pixel_to_normalized(px);
        assert_eq!(n, NormalizedPoint::new(50.0, 50.0));
    }

    #[test]
    fn test_invalid_scale_falls_back() {
        let vp = Viewport::new(PageGeometry::LETTER, f32::NAN);
        assert_eq!(vp.scale(), 1.0);
    }
}
