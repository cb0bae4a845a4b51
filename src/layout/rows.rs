//! Row grouping shared by table and block mode.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::fragment::TextFragment;
use super::options::LayoutOptions;

/// Smallest row tolerance in points, so zero-size fragments still group.
const MIN_ROW_TOLERANCE: f32 = 0.01;

/// Fragments sharing a baseline, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRow {
    /// Fragments in this row, sorted by x
    pub fragments: Vec<TextFragment>,
    /// Baseline of the first fragment that opened the row
    pub y: f32,
    /// Dominant font size (weighted by text length)
    pub font_size: f32,
}

impl TextRow {
    /// Cell texts in left-to-right order.
    pub fn cells(&self) -> Vec<String> {
        self.fragments.iter().map(|f| f.text.clone()).collect()
    }

    /// Leftmost x position.
    pub fn x(&self) -> f32 {
        self.fragments.first().map(|f| f.left()).unwrap_or(0.0)
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the row holds no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// A table row: plain cell strings, left to right.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableRow {
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<&TextRow> for TableRow {
    fn from(row: &TextRow) -> Self {
        Self::new(row.cells())
    }
}

/// Running state for the row being filled.
struct RowAccumulator {
    fragments: Vec<TextFragment>,
    y: f32,
    weighted_size: f32,
    total_chars: usize,
}

impl RowAccumulator {
    fn open(first: TextFragment) -> Self {
        let mut row = Self {
            fragments: Vec::new(),
            y: first.origin.y,
            weighted_size: 0.0,
            total_chars: 0,
        };
        row.push(first);
        row
    }

    fn push(&mut self, fragment: TextFragment) {
        let chars = fragment.text.chars().count();
        self.weighted_size += fragment.font_size_pt * chars as f32;
        self.total_chars += chars;
        self.fragments.push(fragment);
    }

    fn dominant_size(&self) -> f32 {
        if self.total_chars > 0 {
            self.weighted_size / self.total_chars as f32
        } else {
            self.fragments.first().map(|f| f.font_size_pt).unwrap_or(0.0)
        }
    }

    fn accepts(&self, fragment: &TextFragment, options: &LayoutOptions) -> bool {
        let tolerance =
            (self.dominant_size().abs() * options.row_tolerance_factor).max(MIN_ROW_TOLERANCE);
        (fragment.origin.y - self.y).abs() < tolerance
    }

    fn finish(mut self) -> TextRow {
        let font_size = self.dominant_size();
        self.fragments.sort_by(compare_x);
        TextRow {
            fragments: self.fragments,
            y: self.y,
            font_size,
        }
    }
}

/// Reading order: top to bottom, then left to right. Remaining fields break
/// ties so the order never depends on input order.
fn compare_reading_order(a: &TextFragment, b: &TextFragment) -> Ordering {
    b.origin
        .y
        .total_cmp(&a.origin.y)
        .then_with(|| compare_x(a, b))
}

fn compare_x(a: &TextFragment, b: &TextFragment) -> Ordering {
    a.origin
        .x
        .total_cmp(&b.origin.x)
        .then_with(|| a.font_size_pt.total_cmp(&b.font_size_pt))
        .then_with(|| a.text.cmp(&b.text))
        .then_with(|| a.width_pt.total_cmp(&b.width_pt))
        .then_with(|| a.font_name.cmp(&b.font_name))
}

/// Drop fragments that cannot take part in layout.
pub(crate) fn usable_fragments(fragments: &[TextFragment]) -> Vec<TextFragment> {
    let mut dropped = 0usize;
    let usable: Vec<TextFragment> = fragments
        .iter()
        .filter(|f| {
            let ok = f.is_usable();
            if !ok && !f.text.trim().is_empty() {
                dropped += 1;
            }
            ok
        })
        .cloned()
        .collect();

    if dropped > 0 {
        log::warn!("Dropped {} text fragments with non-finite geometry", dropped);
    }
    usable
}

/// Group fragments into rows, top to bottom.
///
/// Fragments are sorted by descending baseline then ascending x. A fragment
/// joins the open row when its baseline lies within `row_tolerance_factor`
/// times the row's dominant font size of the row's baseline; otherwise it opens
/// a new row. The result is independent of input order.
pub fn group_fragments_into_rows(
    fragments: &[TextFragment],
    options: &LayoutOptions,
) -> Vec<TextRow> {
    let mut sorted = usable_fragments(fragments);
    if sorted.is_empty() {
        return vec![];
    }
    sorted.sort_by(compare_reading_order);

    let mut rows = Vec::new();
    let mut current: Option<RowAccumulator> = None;

    for fragment in sorted {
        match current.as_mut() {
            Some(row) if row.accepts(&fragment, options) => row.push(fragment),
            _ => {
                if let Some(row) = current.take() {
                    rows.push(row.finish());
                }
                current = Some(RowAccumulator::open(fragment));
            }
        }
    }

    if let Some(row) = current {
        rows.push(row.finish());
    }

    log::debug!("Grouped {} fragments into {} rows", fragments.len(), rows.len());
    rows
}

/// Table mode: one row per baseline, one cell per fragment.
///
/// # Example
///
/// ```
/// use folio::layout::{group_into_rows, LayoutOptions, TextFragment};
///
/// let fragments = vec![
///     TextFragment::new("Qty", 300.0, 700.0, 10.0, "Helvetica"),
///     TextFragment::new("Item", 72.0, 700.0, 10.0, "Helvetica"),
///     TextFragment::new("Widget", 72.0, 686.0, 10.0, "Helvetica"),
/// ];
/// let rows = group_into_rows(&fragments, &LayoutOptions::default());
/// assert_eq!(rows[0].cells, vec!["Item", "Qty"]);
/// assert_eq!(rows[1].cells, vec!["Widget"]);
/// ```
pub fn group_into_rows(fragments: &[TextFragment], options: &LayoutOptions) -> Vec<TableRow> {
    group_fragments_into_rows(fragments, options)
        .iter()
        .map(TableRow::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, x, y, 12.0, "Helvetica")
    }

    #[test]
    fn test_rows_top_to_bottom() {
        let fragments = vec![frag("b", 10.0, 100.0), frag("a", 10.0, 700.0)];
        let rows = group_fragments_into_rows(&fragments, &LayoutOptions::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells(), vec!["a"]);
        assert_eq!(rows[1].cells(), vec!["b"]);
    }

    #[test]
    fn test_baseline_jitter_within_tolerance() {
        // 5.9pt apart at 12pt: inside half the font size.
        let fragments = vec![frag("right", 200.0, 500.0), frag("left", 10.0, 505.9)];
        let rows = group_fragments_into_rows(&fragments, &LayoutOptions::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells(), vec!["left", "right"]);
    }

    #[test]
    fn test_tolerance_boundary_starts_new_row() {
        let fragments = vec![frag("a", 10.0, 506.0), frag("b", 10.0, 500.0)];
        let rows = group_fragments_into_rows(&fragments, &LayoutOptions::default());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_whitespace_and_non_finite_dropped() {
        let fragments = vec![
            frag("  ", 10.0, 500.0),
            frag("x", f32::NAN, 500.0),
            frag("ok", 10.0, 500.0),
        ];
        let rows = group_fragments_into_rows(&fragments, &LayoutOptions::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells(), vec!["ok"]);
    }

    #[test]
    fn test_dominant_size_weighted_by_length() {
        let fragments = vec![
            TextFragment::new("aaa", 0.0, 100.0, 10.0, "F"),
            TextFragment::new("b", 50.0, 100.0, 14.0, "F"),
        ];
        let rows = group_fragments_into_rows(&fragments, &LayoutOptions::default());
        assert!((rows[0].font_size - 11.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_fragments_into_rows(&[], &LayoutOptions::default()).is_empty());
    }
}
