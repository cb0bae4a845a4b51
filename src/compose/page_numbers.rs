//! Page number stamps.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::annotation::Color;
use super::instruction::{DrawInstruction, DrawKind};
use super::metrics::{StandardFont, TextMeasurer};
use super::placer::Compositor;
use crate::geometry::{DisplayPoint, PageGeometry};
use crate::range::PageRangeSet;

/// How the number is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageNumberFormat {
    /// `3`
    Number,
    /// `Page 3`
    PageN,
    /// `3 of 10`
    #[default]
    NOfM,
    /// `Page 3 of 10`
    PageNOfM,
}

impl PageNumberFormat {
    /// Render the label for page `n` of `m`.
    pub fn render(&self, n: usize, m: usize) -> String {
        match self {
            PageNumberFormat::Number => n.to_string(),
            PageNumberFormat::PageN => format!("Page {}", n),
            PageNumberFormat::NOfM => format!("{} of {}", n, m),
            PageNumberFormat::PageNOfM => format!("Page {} of {}", n, m),
        }
    }
}

impl FromStr for PageNumberFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "n" => Ok(PageNumberFormat::Number),
            "page-n" => Ok(PageNumberFormat::PageN),
            "n-of-m" => Ok(PageNumberFormat::NOfM),
            "page-n-of-m" => Ok(PageNumberFormat::PageNOfM),
            _ => Err(format!("Unknown page number format: {}", s)),
        }
    }
}

/// Where the number sits on the displayed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageNumberPosition {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
}

impl PageNumberPosition {
    fn is_top(&self) -> bool {
        matches!(
            self,
            PageNumberPosition::TopLeft | PageNumberPosition::TopCenter | PageNumberPosition::TopRight
        )
    }
}

impl FromStr for PageNumberPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top-left" => Ok(PageNumberPosition::TopLeft),
            "top-center" => Ok(PageNumberPosition::TopCenter),
            "top-right" => Ok(PageNumberPosition::TopRight),
            "bottom-left" => Ok(PageNumberPosition::BottomLeft),
            "bottom-center" => Ok(PageNumberPosition::BottomCenter),
            "bottom-right" => Ok(PageNumberPosition::BottomRight),
            _ => Err(format!("Unknown page number position: {}", s)),
        }
    }
}

/// What `m` counts in the `n of m` formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageTotal {
    /// Every page of the document
    #[default]
    Document,
    /// Only the numbered pages, offset by the start number
    Selection,
}

impl FromStr for PageTotal {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "document" | "doc" => Ok(PageTotal::Document),
            "selection" | "range" => Ok(PageTotal::Selection),
            _ => Err(format!("Unknown page total: {}", s)),
        }
    }
}

/// Page numbering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumberOptions {
    pub format: PageNumberFormat,
    pub position: PageNumberPosition,
    /// Distance from the page edges in points
    pub margin_pt: f32,
    pub font_size_pt: f32,
    pub font: StandardFont,
    pub color: Color,
    /// Range expression selecting the numbered pages; empty numbers all
    pub range: String,
    /// Number shown on the first numbered page
    pub start_from: usize,
    pub total: PageTotal,
}

impl Default for PageNumberOptions {
    fn default() -> Self {
        Self {
            format: PageNumberFormat::default(),
            position: PageNumberPosition::default(),
            margin_pt: 20.0,
            font_size_pt: 12.0,
            font: StandardFont::Helvetica,
            color: Color::BLACK,
            range: String::new(),
            start_from: 1,
            total: PageTotal::Document,
        }
    }
}

impl PageNumberOptions {
    pub fn with_format(mut self, format: PageNumberFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_position(mut self, position: PageNumberPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    pub fn with_margin(mut self, margin_pt: f32) -> Self {
        self.margin_pt = margin_pt;
        self
    }

    /// Set the number shown on the first numbered page.
    pub fn with_start_from(mut self, start_from: usize) -> Self {
        self.start_from = start_from;
        self
    }

    pub fn with_total(mut self, total: PageTotal) -> Self {
        self.total = total;
        self
    }
}

impl<M: TextMeasurer> Compositor<M> {
    /// Number the pages selected by `options.range`.
    ///
    /// The first selected page shows `options.start_from` and each following
    /// selected page counts up by one. With [`PageTotal::Document`] the total
    /// is the document page count; with [`PageTotal::Selection`] it is the
    /// last number shown. Labels are placed upright on the displayed page.
    pub fn number_pages(
        &self,
        pages: &[PageGeometry],
        options: &PageNumberOptions,
    ) -> Vec<DrawInstruction> {
        let selected = PageRangeSet::parse(&options.range, pages.len());
        let total = match options.total {
            PageTotal::Document => pages.len(),
            PageTotal::Selection => (options.start_from + selected.len()).saturating_sub(1),
        };

        selected
            .iter()
            .enumerate()
            .filter_map(|(position, index)| {
                let geo = pages.get(index)?;
                let label = options.format.render(options.start_from + position, total);
                Some(self.number_label(index, geo, label, options))
            })
            .collect()
    }

    fn number_label(
        &self,
        page_index: usize,
        geo: &PageGeometry,
        text: String,
        options: &PageNumberOptions,
    ) -> DrawInstruction {
        let size = options.font_size_pt;
        let text_width = self.measurer().text_width(&text, options.font, size);
        let (dw, dh) = (geo.displayed_width(), geo.displayed_height());
        let margin = options.margin_pt;

        let left = match options.position {
            PageNumberPosition::TopLeft | PageNumberPosition::BottomLeft => margin,
            PageNumberPosition::TopCenter | PageNumberPosition::BottomCenter => {
                (dw - text_width) / 2.0
            }
            PageNumberPosition::TopRight | PageNumberPosition::BottomRight => {
                dw - text_width - margin
            }
        };
        // Baseline, measured from the top of the displayed page.
        let baseline = if options.position.is_top() {
            margin + size
        } else {
            dh - margin
        };

        let center = DisplayPoint::new(left + text_width / 2.0, baseline - size / 2.0);
        self.centered_instruction(
            page_index,
            geo,
            DrawKind::Text {
                text,
                font: options.font,
                font_size_pt: size,
                color: options.color,
            },
            center,
            (text_width, size),
            geo.rotation.degrees() as f32,
        )
    }
}
