//! Text layout reconstruction.
//!
//! Turns the unordered fragment stream of a page into table rows
//! ([`group_into_rows`]) or styled text blocks ([`group_into_blocks`]).
//! Both share one row-grouping pass, so a fragment's row depends only on its
//! baseline and never on the order the extractor emitted it.

mod blocks;
mod fragment;
mod options;
mod rows;
mod sheet;
mod slide;

use rayon::prelude::*;

pub use blocks::{blocks_from_row, group_into_blocks, TextBlock};
pub use fragment::{classify_font, FontFamily, FontStyle, TextFragment};
pub use options::LayoutOptions;
pub use rows::{group_fragments_into_rows, group_into_rows, TableRow, TextRow};
pub use sheet::{build_sheets, PageRows, SheetMode, TableSheet, MERGED_SHEET_NAME};
pub use slide::{slide_boxes, HorizontalAlign, SlideLayout, SlideTextBox, VerticalAlign};

/// Table mode over many pages, preserving page order.
pub fn rows_for_pages(pages: &[Vec<TextFragment>], options: &LayoutOptions) -> Vec<Vec<TableRow>> {
    if options.parallel && pages.len() > 1 {
        pages
            .par_iter()
            .map(|fragments| group_into_rows(fragments, options))
            .collect()
    } else {
        pages
            .iter()
            .map(|fragments| group_into_rows(fragments, options))
            .collect()
    }
}

/// Block mode over many pages, preserving page order.
pub fn blocks_for_pages(
    pages: &[Vec<TextFragment>],
    options: &LayoutOptions,
) -> Vec<Vec<TextBlock>> {
    if options.parallel && pages.len() > 1 {
        pages
            .par_iter()
            .map(|fragments| group_into_blocks(fragments, options))
            .collect()
    } else {
        pages
            .iter()
            .map(|fragments| group_into_blocks(fragments, options))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_matches_sequential() {
        let pages: Vec<Vec<TextFragment>> = (0..8)
            .map(|p| {
                (0..20)
                    .map(|i| {
                        TextFragment::new(
                            format!("p{p}c{i}"),
                            (i % 4) as f32 * 100.0,
                            700.0 - (i / 4) as f32 * 20.0,
                            10.0,
                            "Helvetica",
                        )
                    })
                    .collect()
            })
            .collect();

        let parallel = rows_for_pages(&pages, &LayoutOptions::default());
        let sequential = rows_for_pages(&pages, &LayoutOptions::default().sequential());
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.len(), 8);
        assert_eq!(parallel[3].len(), 5);
        assert_eq!(parallel[3][0].cells[0], "p3c0");
    }
}
