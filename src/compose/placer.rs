//! Resolve annotations against page geometry.

use super::annotation::{Anchor, Annotation, AnnotationContent, ImageSource, Layer, TileMode};
use super::instruction::{DrawInstruction, DrawKind};
use super::metrics::{StandardFont, StandardFontMetrics, TextMeasurer};
use super::options::PlacementOptions;
use crate::geometry::{
    display_to_document, normalized_to_display, normalized_to_document_box, DisplayPoint,
    DocumentPoint, NormalizedBox, PageGeometry,
};

/// Turns normalized annotations into absolute draw instructions.
///
/// The measurer decides how wide text renders; [`StandardFontMetrics`] is
/// used unless another one is supplied.
#[derive(Debug, Clone)]
pub struct Compositor<M = StandardFontMetrics> {
    options: PlacementOptions,
    measurer: M,
}

impl Compositor<StandardFontMetrics> {
    /// Create a compositor with standard font metrics.
    pub fn new(options: PlacementOptions) -> Self {
        Self {
            options,
            measurer: StandardFontMetrics,
        }
    }
}

impl Default for Compositor<StandardFontMetrics> {
    fn default() -> Self {
        Self::new(PlacementOptions::default())
    }
}

/// Size and paint of one resolved annotation, before positioning.
struct Resolved {
    kind: DrawKind,
    width: f32,
    height: f32,
}

impl<M: TextMeasurer> Compositor<M> {
    /// Create a compositor with a custom measurer.
    pub fn with_measurer(options: PlacementOptions, measurer: M) -> Self {
        Self { options, measurer }
    }

    pub fn options(&self) -> &PlacementOptions {
        &self.options
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Place an annotation on every page. `pages[i]` is page `i`.
    pub fn place(&self, annotation: &Annotation, pages: &[PageGeometry]) -> Vec<DrawInstruction> {
        pages
            .iter()
            .enumerate()
            .flat_map(|(index, geo)| self.place_on(annotation, index, geo))
            .collect()
    }

    /// Place an annotation on one page.
    ///
    /// Mosaic tiling yields one instruction per grid cell; otherwise a single
    /// instruction centered on the anchor.
    pub fn place_on(
        &self,
        annotation: &Annotation,
        page_index: usize,
        geo: &PageGeometry,
    ) -> Vec<DrawInstruction> {
        let opacity = annotation.effective_opacity();

        if let (AnnotationContent::Fill { color }, Anchor::Box(area), TileMode::None) =
            (&annotation.content, &annotation.anchor, annotation.tile_mode)
        {
            let rect = normalized_to_document_box(*area, geo);
            return vec![DrawInstruction {
                page_index,
                kind: DrawKind::Rect { color: *color },
                origin: DocumentPoint::new(rect.x, rect.y),
                width: rect.width,
                height: rect.height,
                rotation_deg: 0.0,
                opacity,
                layer: annotation.layer,
                restamp_original: annotation.layer == Layer::Under,
            }];
        }

        let centers = match annotation.tile_mode {
            TileMode::Mosaic => self.mosaic_centers(geo),
            TileMode::None => vec![normalized_to_display(annotation.anchor.center(), geo)],
        };

        let resolved = self.resolve_content(annotation, geo);
        let rotation_deg = match annotation.content {
            AnnotationContent::Fill { .. } => page_rotation(geo),
            _ => page_rotation(geo) - finite_or_zero(annotation.rotation_deg),
        }
        .rem_euclid(360.0);

        centers
            .into_iter()
            .map(|center| {
                let mut instruction = self.centered_instruction(
                    page_index,
                    geo,
                    resolved.kind.clone(),
                    center,
                    (resolved.width, resolved.height),
                    rotation_deg,
                );
                instruction.opacity = opacity;
                instruction.layer = annotation.layer;
                instruction.restamp_original = annotation.layer == Layer::Under;
                instruction
            })
            .collect()
    }

    /// Centers of the mosaic grid cells in display space, row by row.
    fn mosaic_centers(&self, geo: &PageGeometry) -> Vec<DisplayPoint> {
        let columns = self.options.mosaic_columns.max(1);
        let rows = self.options.mosaic_rows.max(1);
        let cell_w = geo.displayed_width() / columns as f32;
        let cell_h = geo.displayed_height() / rows as f32;

        (0..rows)
            .flat_map(|row| {
                (0..columns).map(move |col| {
                    DisplayPoint::new((col as f32 + 0.5) * cell_w, (row as f32 + 0.5) * cell_h)
                })
            })
            .collect()
    }

    fn resolve_content(&self, annotation: &Annotation, geo: &PageGeometry) -> Resolved {
        let degenerate = geo.is_degenerate();
        let (kind, width, height) = match &annotation.content {
            AnnotationContent::Text {
                text,
                font,
                font_size_pt,
                color,
            } => {
                let max_width = self.options.max_text_width_fraction * geo.displayed_width();
                let (size, width) = self.fit_text(text, *font, *font_size_pt, max_width);
                let height = self.measurer.line_height(*font, size);
                (
                    DrawKind::Text {
                        text: text.clone(),
                        font: *font,
                        font_size_pt: size,
                        color: *color,
                    },
                    width,
                    height,
                )
            }
            AnnotationContent::Image { image, width_pct } => {
                let (width, height) = match (annotation.anchor, annotation.tile_mode) {
                    (Anchor::Box(area), TileMode::None) => contain(image, area, geo),
                    _ => self.image_size(image, *width_pct, geo),
                };
                (
                    DrawKind::Image {
                        resource: image.resource.clone(),
                    },
                    width,
                    height,
                )
            }
            AnnotationContent::Fill { color } => {
                let (width, height) = match annotation.anchor {
                    Anchor::Box(area) => display_size(&area, geo),
                    Anchor::Point(_) => (0.0, 0.0),
                };
                (DrawKind::Rect { color: *color }, width, height)
            }
        };

        if degenerate {
            return Resolved {
                kind,
                width: 0.0,
                height: 0.0,
            };
        }
        Resolved {
            kind,
            width: finite_or_zero(width).max(0.0),
            height: finite_or_zero(height).max(0.0),
        }
    }

    /// Shrink the font until the text fits `max_width`. Never grows it.
    fn fit_text(&self, text: &str, font: StandardFont, size: f32, max_width: f32) -> (f32, f32) {
        let size = finite_or_zero(size).max(0.0);
        let width = self.measurer.text_width(text, font, size);
        if width <= max_width || width <= 0.0 || max_width <= 0.0 {
            return (size, width);
        }

        let reduced = (size * max_width / width).floor().max(1.0).min(size);
        log::debug!(
            "Reduced font size from {} to {} to fit {:.1}pt",
            size,
            reduced,
            max_width
        );
        (reduced, self.measurer.text_width(text, font, reduced))
    }

    fn image_size(
        &self,
        image: &ImageSource,
        width_pct: Option<f32>,
        geo: &PageGeometry,
    ) -> (f32, f32) {
        let width = match width_pct {
            Some(pct) => finite_or_zero(pct) / 100.0 * geo.displayed_width(),
            None => self.options.default_image_width_pt,
        };
        let height = image.aspect_ratio().map(|a| width * a).unwrap_or(0.0);
        (width, height)
    }

    /// Build an instruction whose content box is centered on a display point.
    ///
    /// `size` is measured along the content's own axes; `rotation_deg` is
    /// counter-clockwise in document space.
    pub(crate) fn centered_instruction(
        &self,
        page_index: usize,
        geo: &PageGeometry,
        kind: DrawKind,
        center: DisplayPoint,
        size: (f32, f32),
        rotation_deg: f32,
    ) -> DrawInstruction {
        let (width, height) = size;
        let center = display_to_document(center, geo);
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        let (hw, hh) = (width / 2.0, height / 2.0);
        let origin = DocumentPoint::new(
            center.x - (hw * cos - hh * sin),
            center.y - (hw * sin + hh * cos),
        );

        DrawInstruction {
            page_index,
            kind,
            origin,
            width,
            height,
            rotation_deg,
            opacity: 1.0,
            layer: Layer::Over,
            restamp_original: false,
        }
    }
}

fn page_rotation(geo: &PageGeometry) -> f32 {
    geo.rotation.degrees() as f32
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Display-space size of a normalized box.
fn display_size(area: &NormalizedBox, geo: &PageGeometry) -> (f32, f32) {
    (
        finite_or_zero(area.width_pct) / 100.0 * geo.displayed_width(),
        finite_or_zero(area.height_pct) / 100.0 * geo.displayed_height(),
    )
}

/// Fit an image inside a box keeping its aspect ratio.
fn contain(image: &ImageSource, area: NormalizedBox, geo: &PageGeometry) -> (f32, f32) {
    let (box_w, box_h) = display_size(&area, geo);
    let Some(aspect) = image.aspect_ratio() else {
        return (0.0, 0.0);
    };
    if box_w <= 0.0 || box_h <= 0.0 {
        return (0.0, 0.0);
    }

    let height = box_w * aspect;
    if height <= box_h {
        (box_w, height)
    } else {
        (box_h / aspect, box_h)
    }
}

/// Place an annotation on every page with default options.
///
/// # Example
///
/// ```
/// use folio::compose::{place, Annotation, StandardFont, TileMode};
/// use folio::geometry::PageGeometry;
///
/// let watermark = Annotation::text("CONFIDENTIAL", StandardFont::HelveticaBold, 40.0)
///     .with_tile_mode(TileMode::Mosaic);
/// let instructions = place(&watermark, &[PageGeometry::A4, PageGeometry::LETTER]);
/// assert_eq!(instructions.len(), 24);
/// ```
pub fn place(annotation: &Annotation, pages: &[PageGeometry]) -> Vec<DrawInstruction> {
    Compositor::new(PlacementOptions::default()).place(annotation, pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Color;
    use crate::geometry::{NormalizedPoint, Rotation};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-2
    }

    fn compositor() -> Compositor {
        Compositor::default()
    }

    #[test]
    fn test_centered_text_on_upright_page() {
        let geo = PageGeometry::new(600.0, 800.0);
        let a = Annotation::text("Hi", StandardFont::Helvetica, 10.0);
        let out = compositor().place_on(&a, 0, &geo);
        assert_eq!(out.len(), 1);
        let c = out[0].center();
        assert!(approx(c.x, 300.0));
        assert!(approx(c.y, 400.0));
        assert_eq!(out[0].rotation_deg, 0.0);
    }

    #[test]
    fn test_text_shrinks_to_fit() {
        let geo = PageGeometry::new(200.0, 800.0);
        let a = Annotation::text("A very long watermark line", StandardFont::Helvetica, 40.0);
        let out = compositor().place_on(&a, 0, &geo);
        match &out[0].kind {
            DrawKind::Text { font_size_pt, .. } => {
                assert!(*font_size_pt < 40.0);
                assert_eq!(font_size_pt.fract(), 0.0);
            }
            _ => panic!("expected text"),
        }
        assert!(out[0].width <= 180.0);
    }

    #[test]
    fn test_small_text_not_grown() {
        let a = Annotation::text("x", StandardFont::Helvetica, 9.0);
        let out = compositor().place_on(&a, 0, &PageGeometry::A4);
        match &out[0].kind {
            DrawKind::Text { font_size_pt, .. } => assert_eq!(*font_size_pt, 9.0),
            _ => panic!("expected text"),
        }
    }

    #[test]
    fn test_rotation_combines_page_and_annotation() {
        let geo = PageGeometry::LETTER.with_rotation(Rotation::Deg90);
        let a = Annotation::text("Hi", StandardFont::Helvetica, 10.0).with_rotation(45.0);
        let out = compositor().place_on(&a, 0, &geo);
        assert!(approx(out[0].rotation_deg, 45.0));

        let a = a.with_rotation(135.0);
        let out = compositor().place_on(&a, 0, &geo);
        assert!(approx(out[0].rotation_deg, 315.0));
    }

    #[test]
    fn test_image_width_pct_derives_height() {
        let image = ImageSource::new("logo.png", 400.0, 100.0);
        let a = Annotation::image(image).with_width_pct(50.0);
        let out = compositor().place_on(&a, 0, &PageGeometry::new(600.0, 800.0));
        assert!(approx(out[0].width, 300.0));
        assert!(approx(out[0].height, 75.0));
    }

    #[test]
    fn test_image_default_width() {
        let a = Annotation::image(ImageSource::new("logo.png", 100.0, 50.0));
        let out = compositor().place_on(&a, 0, &PageGeometry::A4);
        assert!(approx(out[0].width, 24.0));
        assert!(approx(out[0].height, 12.0));
    }

    #[test]
    fn test_signature_contain_fit() {
        let image = ImageSource::new("sig.png", 200.0, 100.0);
        let area = NormalizedBox::new(10.0, 10.0, 50.0, 50.0);
        let a = Annotation::image(image).with_anchor(Anchor::Box(area));
        let geo = PageGeometry::new(200.0, 200.0);
        let out = compositor().place_on(&a, 0, &geo);
        // 100x100 box, 2:1 image -> 100x50, centered at display (70, 70).
        assert!(approx(out[0].width, 100.0));
        assert!(approx(out[0].height, 50.0));
        let c = out[0].center();
        assert!(approx(c.x, 70.0));
        assert!(approx(c.y, 130.0));
    }

    #[test]
    fn test_fill_box_resolves_directly() {
        let geo = PageGeometry::new(600.0, 800.0);
        let a = Annotation::fill(NormalizedBox::new(10.0, 25.0, 50.0, 10.0), Color::BLACK);
        let out = compositor().place_on(&a, 3, &geo);
        assert_eq!(out[0].page_index, 3);
        assert!(approx(out[0].origin.x, 60.0));
        assert!(approx(out[0].origin.y, 520.0));
        assert!(approx(out[0].width, 300.0));
        assert!(approx(out[0].height, 80.0));
    }

    #[test]
    fn test_zero_area_fill_is_zero_size() {
        let a = Annotation::fill(NormalizedBox::new(10.0, 10.0, 0.0, 0.0), Color::BLACK);
        let out = compositor().place_on(&a, 0, &PageGeometry::A4);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_empty());
    }

    #[test]
    fn test_mosaic_grid_cells() {
        let geo = PageGeometry::new(300.0, 400.0);
        let a = Annotation::text("x", StandardFont::Helvetica, 10.0)
            .with_tile_mode(TileMode::Mosaic);
        let out = compositor().place_on(&a, 0, &geo);
        assert_eq!(out.len(), 12);
        // First cell: display center (50, 50) -> document (50, 350).
        let c = out[0].center();
        assert!(approx(c.x, 50.0));
        assert!(approx(c.y, 350.0));
    }

    #[test]
    fn test_under_layer_sets_restamp() {
        let a = Annotation::text("x", StandardFont::Helvetica, 10.0).with_layer(Layer::Under);
        let out = compositor().place_on(&a, 0, &PageGeometry::A4);
        assert!(out[0].restamp_original);
        assert_eq!(out[0].layer, Layer::Under);
    }

    #[test]
    fn test_degenerate_page_yields_zero_size() {
        let a = Annotation::text("x", StandardFont::Helvetica, 10.0)
            .with_anchor(Anchor::Point(NormalizedPoint::new(10.0, 10.0)));
        let out = compositor().place_on(&a, 0, &PageGeometry::new(0.0, 0.0));
        assert_eq!(out.len(), 1);
        assert!(out[0].is_empty());
    }
}
