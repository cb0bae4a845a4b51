//! Positioned text fragments and font-name classification.

use serde::{Deserialize, Serialize};

use crate::geometry::DocumentPoint;

/// One positioned run of text as extracted from a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// Baseline origin in document space
    pub origin: DocumentPoint,
    /// Font size in points (scale of the text transform)
    pub font_size_pt: f32,
    /// Font name as reported by the extractor (e.g., "ABCDEF+Helvetica-Bold")
    pub font_name: String,
    /// Advance width in points; 0 when the extractor did not report one
    #[serde(default)]
    pub width_pt: f32,
}

impl TextFragment {
    /// Create a fragment with unknown width.
    pub fn new(
        text: impl Into<String>,
        x: f32,
        y: f32,
        font_size_pt: f32,
        font_name: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            origin: DocumentPoint::new(x, y),
            font_size_pt,
            font_name: font_name.into(),
            width_pt: 0.0,
        }
    }

    /// Set the width and return self.
    pub fn with_width(mut self, width_pt: f32) -> Self {
        self.width_pt = width_pt;
        self
    }

    /// Width used for layout: the reported width, or half an em per
    /// character when none was reported.
    pub fn effective_width(&self) -> f32 {
        if self.width_pt > 0.0 {
            self.width_pt
        } else {
            self.font_size_pt * 0.5 * self.text.chars().count() as f32
        }
    }

    /// Left edge.
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.origin.x + self.effective_width()
    }

    /// Approximate top of the glyphs.
    pub fn top(&self) -> f32 {
        self.origin.y + self.font_size_pt
    }

    /// Whether the fragment can take part in layout: finite geometry and
    /// some visible text.
    pub fn is_usable(&self) -> bool {
        self.origin.x.is_finite()
            && self.origin.y.is_finite()
            && self.font_size_pt.is_finite()
            && self.width_pt.is_finite()
            && !self.text.trim().is_empty()
    }

    /// Classify the fragment's font name.
    pub fn style(&self) -> FontStyle {
        classify_font(&self.font_name)
    }
}

/// Output font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    Serif,
    #[default]
    SansSerif,
    Monospace,
}

/// Best-effort style guess from a font name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontStyle {
    /// Font family
    pub family: FontFamily,
    /// Concrete face name for output writers
    pub face: &'static str,
    /// Whether the name suggests a bold weight
    pub bold: bool,
    /// Whether the name suggests an italic or oblique slant
    pub italic: bool,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            family: FontFamily::SansSerif,
            face: DEFAULT_FACE,
            bold: false,
            italic: false,
        }
    }
}

const DEFAULT_FACE: &str = "Arial";

/// Keyword table, first match wins. "mono" precedes "times" so that
/// "TimesMono" style names land in the monospace family.
const FACE_KEYWORDS: &[(&str, &str, FontFamily)] = &[
    ("courier", "Courier New", FontFamily::Monospace),
    ("mono", "Courier New", FontFamily::Monospace),
    ("times", "Times New Roman", FontFamily::Serif),
    ("georgia", "Georgia", FontFamily::Serif),
    ("helvetica", "Arial", FontFamily::SansSerif),
    ("arial", "Arial", FontFamily::SansSerif),
    ("calibri", "Calibri", FontFamily::SansSerif),
    ("verdana", "Verdana", FontFamily::SansSerif),
];

const BOLD_KEYWORDS: &[&str] = &["bold", "black", "heavy"];
const ITALIC_KEYWORDS: &[&str] = &["italic", "oblique"];

/// Classify a source font name by case-insensitive substring matching.
///
/// Unknown names fall back to a regular, upright sans-serif face.
pub fn classify_font(font_name: &str) -> FontStyle {
    let lower = font_name.to_lowercase();

    let (face, family) = FACE_KEYWORDS
        .iter()
        .find(|(keyword, _, _)| lower.contains(keyword))
        .map(|(_, face, family)| (*face, *family))
        .unwrap_or((DEFAULT_FACE, FontFamily::SansSerif));

    FontStyle {
        family,
        face,
        bold: BOLD_KEYWORDS.iter().any(|k| lower.contains(k)),
        italic: ITALIC_KEYWORDS.iter().any(|k| lower.contains(k)),
    }
}
