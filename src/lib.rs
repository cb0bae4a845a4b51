//! # folio
//!
//! Page geometry, layout reconstruction and page assembly for PDF documents.
//!
//! The crate reconciles the coordinate spaces a document editor deals with
//! (native document points, normalized percentages of the displayed page, and
//! rasterized pixels), rebuilds table rows and styled text blocks from the
//! positioned text fragments of a page, turns watermark, redaction, signature
//! and page number annotations into absolute draw instructions, and drives
//! merge, split, organize and rotate through a pluggable document toolkit.
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{Folio, SourceInput};
//!
//! fn main() -> folio::Result<()> {
//!     let report = Folio::new().merge(&[
//!         SourceInput::from_path("cover.pdf")?,
//!         SourceInput::from_path("report.pdf")?.with_range("2-5"),
//!     ])?;
//!     std::fs::write("merged.pdf", &report.output)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Page ranges**: forgiving `1-3,5,8` expressions that never fail
//! - **Geometry**: point, percentage and pixel spaces across all four rotations
//! - **Layout**: table rows and styled blocks, exported to CSV and slide boxes
//! - **Placement**: text, image and fill annotations, mosaic tiling, page numbers
//! - **Assembly**: merge with per-source recovery, split, organize, rotate
//! - **Parallel processing**: Uses Rayon for multi-page clustering

pub mod assembly;
pub mod compose;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod range;
pub mod toolkit;

// Re-export commonly used types
pub use assembly::{
    Assembler, AssemblyOptions, MergeReport, PageRotation, PageSlot, RotateReport, RotationMode,
    SkippedSource, SourceInput, SplitMode, SplitOutput,
};
pub use compose::{Annotation, Compositor, DrawInstruction, PlacementOptions};
pub use error::{Error, Result};
pub use geometry::{normalize_rotation, PageGeometry, Rotation};
pub use layout::{group_into_blocks, group_into_rows, LayoutOptions, TextBlock, TextFragment};
pub use range::PageRangeSet;
pub use toolkit::{DocumentToolkit, MemoryToolkit};

#[cfg(feature = "lopdf-backend")]
pub use toolkit::LopdfToolkit;

/// Builder running assembly operations on real PDF files.
///
/// # Example
///
/// ```no_run
/// use folio::{Folio, SourceInput};
///
/// let split = Folio::new()
///     .with_archive_pattern("chapter-{n}.pdf")
///     .split_archive(&SourceInput::from_path("book.pdf")?.with_range("1-3"))?;
/// for part in &split.parts {
///     std::fs::write(&part.name, &part.data)?;
/// }
/// # Ok::<(), folio::Error>(())
/// ```
#[cfg(feature = "lopdf-backend")]
pub struct Folio {
    options: AssemblyOptions,
}

#[cfg(feature = "lopdf-backend")]
impl Folio {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: AssemblyOptions::default(),
        }
    }

    /// Add rotate values to the existing page rotation.
    pub fn relative_rotation(mut self) -> Self {
        self.options = self.options.relative_rotation();
        self
    }

    /// Set the size of blank pages inserted by organize.
    pub fn with_blank_page(mut self, geometry: PageGeometry) -> Self {
        self.options = self.options.with_blank_page(geometry);
        self
    }

    /// Set the part name pattern of archive splits.
    pub fn with_archive_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.options = self.options.with_archive_name_pattern(pattern);
        self
    }

    /// Set placement options for annotations.
    pub fn with_placement(mut self, placement: PlacementOptions) -> Self {
        self.options = self.options.with_placement(placement);
        self
    }

    /// Set clustering options for text extraction.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.options = self.options.with_layout(layout);
        self
    }

    /// Disable parallel clustering.
    pub fn sequential(mut self) -> Self {
        self.options.layout = self.options.layout.sequential();
        self
    }

    fn assembler(&self) -> Assembler<'static, LopdfToolkit> {
        Assembler::with_options(&LopdfToolkit, self.options.clone())
    }

    /// Merge sources into one PDF.
    pub fn merge(&self, sources: &[SourceInput]) -> Result<MergeReport> {
        self.assembler().merge(sources)
    }

    /// Extract the selected pages into one PDF.
    pub fn split(&self, source: &SourceInput) -> Result<SplitOutput> {
        self.assembler().split(source, SplitMode::Single)
    }

    /// Extract each selected page into its own PDF.
    pub fn split_archive(&self, source: &SourceInput) -> Result<SplitOutput> {
        self.assembler().split(source, SplitMode::Archive)
    }

    /// Rebuild a PDF from an explicit page order.
    pub fn organize(&self, source: &SourceInput, slots: &[PageSlot]) -> Result<Vec<u8>> {
        self.assembler().organize(source, slots)
    }

    /// Rotate the pages selected by the source range.
    pub fn rotate(&self, source: &SourceInput, degrees: i64) -> Result<RotateReport> {
        self.assembler().rotate_range(source, degrees)
    }

    /// Draw annotations onto the pages selected by the source range.
    pub fn annotate(&self, source: &SourceInput, annotations: &[Annotation]) -> Result<Vec<u8>> {
        self.assembler().annotate(source, annotations)
    }

    /// Table rows of each selected page.
    pub fn table_rows(&self, source: &SourceInput) -> Result<Vec<layout::PageRows>> {
        self.assembler().extract_rows(source)
    }

    /// Styled text blocks of each selected page.
    pub fn text_blocks(&self, source: &SourceInput) -> Result<Vec<assembly::PageBlocks>> {
        self.assembler().extract_blocks(source)
    }
}

#[cfg(feature = "lopdf-backend")]
impl Default for Folio {
    fn default() -> Self {
        Self::new()
    }
}

/// Rows of every page of a PDF file, exported as CSV sheets.
///
/// # Example
///
/// ```no_run
/// use folio::{tables_to_csv, layout::SheetMode};
///
/// for sheet in tables_to_csv("invoice.pdf", SheetMode::PerPage)? {
///     println!("{}:\n{}", sheet.0, sheet.1);
/// }
/// # Ok::<(), folio::Error>(())
/// ```
#[cfg(feature = "lopdf-backend")]
pub fn tables_to_csv<P: AsRef<std::path::Path>>(
    path: P,
    mode: layout::SheetMode,
) -> Result<Vec<(String, String)>> {
    let rows = Folio::new().table_rows(&SourceInput::from_path(path)?)?;
    layout::build_sheets(&rows, mode)
        .into_iter()
        .map(|sheet| Ok((sheet.name.clone(), sheet.to_csv_string()?)))
        .collect()
}

#[cfg(all(test, feature = "lopdf-backend"))]
mod tests {
    use super::*;

    #[test]
    fn test_builder_options() {
        let folio = Folio::new()
            .relative_rotation()
            .with_archive_pattern("p{n}.pdf")
            .sequential();
        assert_eq!(folio.options.rotation_mode, RotationMode::Relative);
        assert_eq!(folio.options.archive_part_name(3), "p3.pdf");
        assert!(!folio.options.layout.parallel);
    }

    #[test]
    fn test_merge_invalid_bytes() {
        let result = Folio::new().merge(&[SourceInput::new("bad.pdf", b"not a pdf".to_vec())]);
        assert!(matches!(result, Err(Error::AllSourcesUnavailable(_))));
    }

    #[test]
    fn test_split_empty_data() {
        let result = Folio::new().split(&SourceInput::new("empty.pdf", Vec::new()));
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }
}
