//! Block mode: merge neighbouring fragments into styled text blocks.

use serde::{Deserialize, Serialize};

use super::fragment::{classify_font, FontFamily, TextFragment};
use super::options::LayoutOptions;
use super::rows::{group_fragments_into_rows, TextRow};
use crate::geometry::DocumentRect;

/// A run of text rendered as one editable box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Merged text
    pub text: String,
    /// Bounding box in document space
    pub rect: DocumentRect,
    /// Output font size, clamped to the configured range
    pub font_size_pt: f32,
    /// Source font name of the first fragment
    pub font_name: String,
    /// Font family guessed from the name
    pub family: FontFamily,
    /// Concrete face name for output writers
    pub face: String,
    /// Bold weight
    pub bold: bool,
    /// Italic or oblique slant
    pub italic: bool,
    /// Output blocks never wrap
    pub wrap: bool,
}

/// Running state of the block being merged.
struct BlockBuilder {
    text: String,
    font_size: f32,
    font_name: String,
    min_x: f32,
    max_x: f32,
    max_top: f32,
}

impl BlockBuilder {
    fn start(fragment: &TextFragment) -> Self {
        Self {
            text: fragment.text.clone(),
            font_size: fragment.font_size_pt,
            font_name: fragment.font_name.clone(),
            min_x: fragment.left(),
            max_x: fragment.right(),
            max_top: fragment.top(),
        }
    }

    fn gap_to(&self, fragment: &TextFragment) -> f32 {
        fragment.left() - self.max_x
    }

    fn accepts(&self, fragment: &TextFragment, options: &LayoutOptions) -> bool {
        self.gap_to(fragment) < options.merge_gap_factor * fragment.font_size_pt
            && (self.font_size - fragment.font_size_pt).abs() < options.max_font_size_delta
    }

    fn absorb(&mut self, fragment: &TextFragment, options: &LayoutOptions) {
        let gap = self.gap_to(fragment);
        if gap > options.space_gap_factor * fragment.font_size_pt
            && needs_space(&self.text, &fragment.text)
        {
            self.text.push(' ');
        }
        self.text.push_str(&fragment.text);
        self.min_x = self.min_x.min(fragment.left());
        self.max_x = self.max_x.max(fragment.right());
        self.max_top = self.max_top.max(fragment.top());
    }

    fn finish(self, options: &LayoutOptions) -> TextBlock {
        let style = classify_font(&self.font_name);
        let height = self.font_size * options.line_height_factor;
        TextBlock {
            text: self.text,
            rect: DocumentRect::new(
                self.min_x,
                self.max_top - height,
                self.max_x - self.min_x,
                height,
            ),
            font_size_pt: options.clamp_font_size(self.font_size),
            font_name: self.font_name,
            family: style.family,
            face: style.face.to_string(),
            bold: style.bold,
            italic: style.italic,
            wrap: false,
        }
    }
}

/// Whether joining `left` and `right` needs a word space.
fn needs_space(left: &str, right: &str) -> bool {
    let last = left.chars().last();
    let first = right.chars().next();
    match (last, first) {
        (Some(a), Some(b)) => {
            !a.is_whitespace()
                && !b.is_whitespace()
                && !(is_spaceless_script_char(a) && is_spaceless_script_char(b))
        }
        _ => false,
    }
}

/// Scripts written without word spaces (Han, Hiragana, Katakana). Hangul
/// uses spaces and is not included.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x303F
        | 0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0x20000..=0x2EBEF)
}

/// Merge the fragments of one row into blocks, left to right.
pub fn blocks_from_row(row: &TextRow, options: &LayoutOptions) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<BlockBuilder> = None;

    for fragment in &row.fragments {
        match current.as_mut() {
            Some(block) if block.accepts(fragment, options) => block.absorb(fragment, options),
            _ => {
                if let Some(block) = current.take() {
                    blocks.push(block.finish(options));
                }
                current = Some(BlockBuilder::start(fragment));
            }
        }
    }

    if let Some(block) = current {
        blocks.push(block.finish(options));
    }
    blocks
}

/// Group a page's fragments into styled blocks, in reading order.
///
/// Within a row, consecutive fragments merge while the horizontal gap stays
/// below `merge_gap_factor` times the incoming font size and the sizes differ
/// by less than `max_font_size_delta`. Gaps wider than `space_gap_factor`
/// times the font size are joined with one space.
///
/// # Example
///
/// ```
/// use folio::layout::{group_into_blocks, LayoutOptions, TextFragment};
///
/// let fragments = vec![
///     TextFragment::new("Hello", 72.0, 700.0, 12.0, "Helvetica").with_width(28.0),
///     TextFragment::new("world", 105.0, 700.0, 12.0, "Helvetica").with_width(30.0),
/// ];
/// let blocks = group_into_blocks(&fragments, &LayoutOptions::default());
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].text, "Hello world");
/// ```
pub fn group_into_blocks(fragments: &[TextFragment], options: &LayoutOptions) -> Vec<TextBlock> {
    let blocks: Vec<TextBlock> = group_fragments_into_rows(fragments, options)
        .iter()
        .flat_map(|row| blocks_from_row(row, options))
        .collect();
    log::debug!("Built {} text blocks", blocks.len());
    blocks
}
