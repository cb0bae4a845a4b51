//! Mappings between document, display and normalized space.

use super::{
    DisplayPoint, DisplayRect, DocumentPoint, DocumentRect, NormalizedBox, NormalizedPoint,
    PageGeometry, Rotation,
};

/// Points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert points to inches.
pub fn points_to_inches(pt: f32) -> f32 {
    pt / POINTS_PER_INCH
}

/// Convert inches to points.
pub fn inches_to_points(inches: f32) -> f32 {
    inches * POINTS_PER_INCH
}

fn finite(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn ratio(part: f32, whole: f32) -> f32 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

/// Map a displayed point onto the page's native coordinates.
///
/// A page with `/Rotate r` is shown turned `r` degrees clockwise, so the
/// native origin lands on a different displayed corner per quadrant.
pub fn display_to_document(p: DisplayPoint, geo: &PageGeometry) -> DocumentPoint {
    let (x, y) = (finite(p.x), finite(p.y));
    let (w, h) = (geo.width_pt, geo.height_pt);
    match geo.rotation {
        Rotation::Deg0 => DocumentPoint::new(x, h - y),
        Rotation::Deg90 => DocumentPoint::new(y, x),
        Rotation::Deg180 => DocumentPoint::new(w - x, y),
        Rotation::Deg270 => DocumentPoint::new(w - y, h - x),
    }
}

/// Map a native point to where it appears on the displayed page.
pub fn document_to_display(p: DocumentPoint, geo: &PageGeometry) -> DisplayPoint {
    let (u, v) = (finite(p.x), finite(p.y));
    let (w, h) = (geo.width_pt, geo.height_pt);
    match geo.rotation {
        Rotation::Deg0 => DisplayPoint::new(u, h - v),
        Rotation::Deg90 => DisplayPoint::new(v, u),
        Rotation::Deg180 => DisplayPoint::new(w - u, v),
        Rotation::Deg270 => DisplayPoint::new(h - v, w - u),
    }
}

/// Project a normalized point into display points.
pub fn normalized_to_display(p: NormalizedPoint, geo: &PageGeometry) -> DisplayPoint {
    DisplayPoint::new(
        finite(p.x_pct) / 100.0 * geo.displayed_width(),
        finite(p.y_pct) / 100.0 * geo.displayed_height(),
    )
}

/// Map a normalized point to native document coordinates.
pub fn normalized_to_document_point(p: NormalizedPoint, geo: &PageGeometry) -> DocumentPoint {
    display_to_document(normalized_to_display(p, geo), geo)
}

/// Map a native point to normalized coordinates of the displayed page.
pub fn document_to_normalized_point(p: DocumentPoint, geo: &PageGeometry) -> NormalizedPoint {
    let d = document_to_display(p, geo);
    NormalizedPoint::new(
        ratio(d.x, geo.displayed_width()) * 100.0,
        ratio(d.y, geo.displayed_height()) * 100.0,
    )
}

/// Map a normalized box to the native rectangle that shows up in the same
/// place once the page rotation is applied.
///
/// For sideways pages the percentages scale against the swapped dimensions.
/// A zero-area box maps to a zero-area rectangle.
pub fn normalized_to_document_box(b: NormalizedBox, geo: &PageGeometry) -> DocumentRect {
    let top_left = NormalizedPoint::new(b.x_pct, b.y_pct);
    let bottom_right = NormalizedPoint::new(
        finite(b.x_pct) + finite(b.width_pct),
        finite(b.y_pct) + finite(b.height_pct),
    );
    DocumentRect::from_corners(
        normalized_to_document_point(top_left, geo),
        normalized_to_document_point(bottom_right, geo),
    )
}

/// Inverse of [`normalized_to_document_box`].
pub fn document_to_normalized_box(r: DocumentRect, geo: &PageGeometry) -> NormalizedBox {
    let d = document_rect_to_display(r, geo);
    let (dw, dh) = (geo.displayed_width(), geo.displayed_height());
    NormalizedBox::new(
        ratio(d.x, dw) * 100.0,
        ratio(d.y, dh) * 100.0,
        ratio(d.width, dw) * 100.0,
        ratio(d.height, dh) * 100.0,
    )
}

/// Where a native rectangle appears on the displayed page.
pub fn document_rect_to_display(r: DocumentRect, geo: &PageGeometry) -> DisplayRect {
    let a = document_to_display(DocumentPoint::new(r.x, r.y), geo);
    let b = document_to_display(
        DocumentPoint::new(finite(r.x) + finite(r.width), finite(r.y) + finite(r.height)),
        geo,
    );
    DisplayRect {
        x: a.x.min(b.x),
        y: a.y.min(b.y),
        width: (a.x - b.x).abs(),
        height: (a.y - b.y).abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_upright_box() {
        let geo = PageGeometry::new(600.0, 800.0);
        let rect = normalized_to_document_box(NormalizedBox::new(10.0, 25.0, 50.0, 10.0), &geo);
        assert!(approx(rect.x, 60.0));
        assert!(approx(rect.width, 300.0));
        assert!(approx(rect.height, 80.0));
        // Top edge 25% from the top of an 800pt page.
        assert!(approx(rect.top(), 600.0));
        assert!(approx(rect.y, 520.0));
    }

    #[test]
    fn test_rotated_90_uses_swapped_scale() {
        // Native 600x800, displayed 800 wide x 600 tall.
        let geo = PageGeometry::new(600.0, 800.0).with_rotation(Rotation::Deg90);
        let rect = normalized_to_document_box(NormalizedBox::new(0.0, 0.0, 50.0, 10.0), &geo);
        // Displayed 400 x 60 becomes native 60 wide x 400 tall.
        assert!(approx(rect.width, 60.0));
        assert!(approx(rect.height, 400.0));
        // Displayed top-left is the native bottom-left.
        assert!(approx(rect.x, 0.0));
        assert!(approx(rect.y, 0.0));
    }

    #[test]
    fn test_rotated_180_top_left_is_native_top_right() {
        let geo = PageGeometry::new(600.0, 800.0).with_rotation(Rotation::Deg180);
        let p = normalized_to_document_point(NormalizedPoint::new(0.0, 0.0), &geo);
        assert!(approx(p.x, 600.0));
        assert!(approx(p.y, 0.0));
    }

    #[test]
    fn test_rotated_270_corner() {
        let geo = PageGeometry::new(600.0, 800.0).with_rotation(Rotation::Deg270);
        let p = normalized_to_document_point(NormalizedPoint::new(0.0, 0.0), &geo);
        assert!(approx(p.x, 600.0));
        assert!(approx(p.y, 800.0));
    }

    #[test]
    fn test_point_round_trip_all_rotations() {
        for rotation in Rotation::ALL {
            let geo = PageGeometry::new(595.0, 842.0).with_rotation(rotation);
            let original = NormalizedPoint::new(12.5, 80.0);
            let back = document_to_normalized_point(normalized_to_document_point(original, &geo), &geo);
            assert!(approx(back.x_pct, original.x_pct), "{rotation}");
            assert!(approx(back.y_pct, original.y_pct), "{rotation}");
        }
    }

    #[test]
    fn test_zero_area_box_stays_zero() {
        let geo = PageGeometry::LETTER;
        let rect = normalized_to_document_box(NormalizedBox::new(30.0, 30.0, 0.0, 0.0), &geo);
        assert!(rect.is_empty());
        assert_eq!(rect.width, 0.0);
    }

    #[test]
    fn test_non_finite_treated_as_zero() {
        let geo = PageGeometry::LETTER;
        let p = normalized_to_document_point(NormalizedPoint::new(f32::NAN, f32::INFINITY), &geo);
        assert!(approx(p.x, 0.0));
        assert!(approx(p.y, 792.0));
    }

    #[test]
    fn test_degenerate_page_does_not_divide_by_zero() {
        let geo = PageGeometry::new(0.0, 0.0);
        let b = document_to_normalized_box(DocumentRect::new(1.0, 1.0, 2.0, 2.0), &geo);
        assert!(b.x_pct.is_finite() && b.width_pct.is_finite());
    }

    #[test]
    fn test_inch_conversion() {
        assert!(approx(points_to_inches(144.0), 2.0));
        assert!(approx(inches_to_points(0.5), 36.0));
    }
}
