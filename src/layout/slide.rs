//! Slide output for block mode.

use serde::{Deserialize, Serialize};

use super::blocks::TextBlock;
use crate::geometry::{document_rect_to_display, points_to_inches, PageGeometry};

/// Extra width added to every text box so measured text never clips.
const WIDTH_BUFFER_IN: f32 = 0.1;
const MIN_WIDTH_IN: f32 = 0.5;
const MIN_HEIGHT_IN: f32 = 0.2;

/// Slide dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideLayout {
    pub width_in: f32,
    pub height_in: f32,
}

impl SlideLayout {
    /// 16:9 widescreen.
    pub const WIDESCREEN: SlideLayout = SlideLayout {
        width_in: 10.0,
        height_in: 5.625,
    };

    /// Size the slides after the first page as displayed, falling back to 16:9
    /// when there is no usable page.
    pub fn from_pages(pages: &[PageGeometry]) -> Self {
        match pages.first() {
            Some(geo) if !geo.is_degenerate() => SlideLayout {
                width_in: points_to_inches(geo.displayed_width()),
                height_in: points_to_inches(geo.displayed_height()),
            },
            _ => Self::WIDESCREEN,
        }
    }
}

impl Default for SlideLayout {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

/// Horizontal alignment of slide text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical alignment of slide text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// A positioned text box on a slide, origin top-left, inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideTextBox {
    pub text: String,
    pub x_in: f32,
    pub y_in: f32,
    pub width_in: f32,
    pub height_in: f32,
    pub font_size_pt: f32,
    pub face: String,
    pub bold: bool,
    pub italic: bool,
    pub align: HorizontalAlign,
    pub valign: VerticalAlign,
    pub wrap: bool,
    pub auto_fit: bool,
}

impl SlideTextBox {
    /// Position a block on a slide for the page it came from.
    pub fn from_block(block: &TextBlock, geo: &PageGeometry) -> Self {
        let rect = document_rect_to_display(block.rect, geo);
        Self {
            text: block.text.clone(),
            x_in: points_to_inches(rect.x),
            y_in: points_to_inches(rect.y),
            width_in: (points_to_inches(rect.width) + WIDTH_BUFFER_IN).max(MIN_WIDTH_IN),
            height_in: points_to_inches(rect.height).max(MIN_HEIGHT_IN),
            font_size_pt: block.font_size_pt,
            face: block.face.clone(),
            bold: block.bold,
            italic: block.italic,
            align: HorizontalAlign::Left,
            valign: VerticalAlign::Top,
            wrap: block.wrap,
            auto_fit: false,
        }
    }
}

/// Convert a page's blocks into slide text boxes.
pub fn slide_boxes(blocks: &[TextBlock], geo: &PageGeometry) -> Vec<SlideTextBox> {
    blocks
        .iter()
        .map(|b| SlideTextBox::from_block(b, geo))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DocumentRect, Rotation};
    use crate::layout::FontFamily;

    fn block(rect: DocumentRect) -> TextBlock {
        TextBlock {
            text: "Hi".into(),
            rect,
            font_size_pt: 12.0,
            font_name: "Helvetica".into(),
            family: FontFamily::SansSerif,
            face: "Arial".into(),
            bold: false,
            italic: false,
            wrap: false,
        }
    }

    #[test]
    fn test_layout_from_first_page() {
        let layout = SlideLayout::from_pages(&[PageGeometry::LETTER]);
        assert!((layout.width_in - 8.5).abs() < 1e-4);
        assert!((layout.height_in - 11.0).abs() < 1e-4);

        let sideways = PageGeometry::LETTER.with_rotation(Rotation::Deg90);
        let layout = SlideLayout::from_pages(&[sideways]);
        assert!((layout.width_in - 11.0).abs() < 1e-4);
    }

    #[test]
    fn test_layout_fallback() {
        assert_eq!(SlideLayout::from_pages(&[]), SlideLayout::WIDESCREEN);
    }

    #[test]
    fn test_box_position_and_minimums() {
        // Top of the block sits 72pt below the top of a 792pt page.
        let rect = DocumentRect::new(72.0, 705.6, 7.2, 14.4);
        let b = SlideTextBox::from_block(&block(rect), &PageGeometry::LETTER);
        assert!((b.x_in - 1.0).abs() < 1e-4);
        assert!((b.y_in - 1.0).abs() < 1e-4);
        assert!((b.width_in - 0.5).abs() < 1e-4);
        assert!((b.height_in - 0.2).abs() < 1e-4);
        assert!(!b.wrap && !b.auto_fit);
        assert_eq!(b.align, HorizontalAlign::Left);
    }

    #[test]
    fn test_wide_box_gets_buffer() {
        let rect = DocumentRect::new(0.0, 0.0, 144.0, 36.0);
        let b = SlideTextBox::from_block(&block(rect), &PageGeometry::LETTER);
        assert!((b.width_in - 2.1).abs() < 1e-4);
        assert!((b.height_in - 0.5).abs() < 1e-4);
    }
}
