//! Text measurement for the standard PDF fonts.

use serde::{Deserialize, Serialize};

/// The standard Type 1 fonts every PDF viewer ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StandardFont {
    #[default]
    Helvetica,
    HelveticaBold,
    TimesRoman,
    TimesBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    /// PostScript base font name.
    pub fn base_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
        }
    }

    /// Pick a regular font for a family hint ("Times-Roman", "courier", ...).
    pub fn from_family(name: &str) -> Self {
        let lower = name.to_lowercase();
        if ["times", "roman", "georgia", "serif"]
            .iter()
            .any(|k| lower.contains(k))
            && !lower.contains("sans")
        {
            StandardFont::TimesRoman
        } else if ["courier", "mono", "console"].iter().any(|k| lower.contains(k)) {
            StandardFont::Courier
        } else {
            StandardFont::Helvetica
        }
    }

    /// The bold face used for watermarks in a family.
    pub fn watermark(name: &str) -> Self {
        Self::from_family(name).bold()
    }

    /// Bold variant of this font.
    pub fn bold(self) -> Self {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaBold => StandardFont::HelveticaBold,
            StandardFont::TimesRoman | StandardFont::TimesBold => StandardFont::TimesBold,
            StandardFont::Courier | StandardFont::CourierBold => StandardFont::CourierBold,
        }
    }
}

/// Measures rendered text width. Implement this to plug in real font metrics.
pub trait TextMeasurer: Send + Sync {
    /// Advance width of `text` at `size_pt`, in points.
    fn text_width(&self, text: &str, font: StandardFont, size_pt: f32) -> f32;

    /// Height of a line of text at `size_pt`, in points.
    fn line_height(&self, _font: StandardFont, size_pt: f32) -> f32 {
        size_pt
    }
}

/// Approximate metrics for the standard fonts.
///
/// Helvetica uses its published ASCII advance widths. Other faces scale those
/// widths; Courier is fixed at 600 units. Characters outside ASCII use an
/// average width, or a full em for wide East Asian scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFontMetrics;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const AVERAGE_WIDTH: u16 = 556;
const COURIER_WIDTH: u16 = 600;

impl StandardFontMetrics {
    fn units(c: char, font: StandardFont) -> f32 {
        if matches!(font, StandardFont::Courier | StandardFont::CourierBold) {
            return COURIER_WIDTH as f32;
        }
        let base = match c as u32 {
            code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
            0x1100..=0x11FF | 0x2E80..=0x9FFF | 0xAC00..=0xD7AF | 0xF900..=0xFAFF | 0xFF00..=0xFF60 => {
                1000
            }
            _ => AVERAGE_WIDTH,
        } as f32;
        match font {
            StandardFont::HelveticaBold => base * 1.06,
            StandardFont::TimesRoman => base * 0.9,
            StandardFont::TimesBold => base * 0.95,
            _ => base,
        }
    }
}

impl TextMeasurer for StandardFontMetrics {
    fn text_width(&self, text: &str, font: StandardFont, size_pt: f32) -> f32 {
        let units: f32 = text.chars().map(|c| Self::units(c, font)).sum();
        units * size_pt / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_width() {
        let m = StandardFontMetrics;
        // "Hi" = 722 + 222 units
        let w = m.text_width("Hi", StandardFont::Helvetica, 10.0);
        assert!((w - 9.44).abs() < 1e-4);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let m = StandardFontMetrics;
        assert_eq!(
            m.text_width("iii", StandardFont::Courier, 10.0),
            m.text_width("WWW", StandardFont::Courier, 10.0)
        );
    }

    #[test]
    fn test_bold_is_wider() {
        let m = StandardFontMetrics;
        let regular = m.text_width("Draft", StandardFont::Helvetica, 12.0);
        let bold = m.text_width("Draft", StandardFont::HelveticaBold, 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_font_selection() {
        assert_eq!(StandardFont::watermark("Georgia"), StandardFont::TimesBold);
        assert_eq!(StandardFont::watermark("Lucida Console"), StandardFont::CourierBold);
        assert_eq!(StandardFont::watermark("Open Sans"), StandardFont::HelveticaBold);
        assert_eq!(StandardFont::from_family("Times-Roman"), StandardFont::TimesRoman);
        assert_eq!(StandardFont::from_family(""), StandardFont::Helvetica);
    }
}
