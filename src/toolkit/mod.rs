//! Document toolkit abstraction.
//!
//! The assembly pipeline never touches a document format directly. It works
//! through these traits, and a toolkit handle is passed in by the caller.
//! Two implementations ship with the crate:
//!
//! - [`MemoryToolkit`]: JSON-described documents, used for tests and dry runs
//! - [`LopdfToolkit`]: real PDF files through `lopdf` (feature `lopdf-backend`)

mod memory;

#[cfg(feature = "lopdf-backend")]
mod pdf;

pub use memory::{MemoryDocument, MemoryPage, MemoryToolkit};

#[cfg(feature = "lopdf-backend")]
pub use pdf::{LopdfOutput, LopdfSource, LopdfToolkit};

use crate::compose::DrawInstruction;
use crate::error::Result;
use crate::geometry::{PageGeometry, Rotation};
use crate::layout::TextFragment;

/// Opens and creates documents.
pub trait DocumentToolkit {
    /// A document opened for reading.
    type Source: SourceDocument;
    /// A document being written.
    type Output: OutputDocument<Source = Self::Source>;

    /// Open a document from bytes.
    ///
    /// Returns [`Error::Encrypted`](crate::Error::Encrypted) when the document
    /// is protected and the password is missing or wrong.
    fn open(&self, data: &[u8], password: Option<&str>) -> Result<Self::Source>;

    /// Start an empty output document.
    fn create(&self) -> Result<Self::Output>;

    /// Turn an opened document into an output document, keeping its pages.
    fn edit(&self, source: Self::Source) -> Result<Self::Output>;
}

/// Read access to an opened document.
pub trait SourceDocument {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Size and rotation of a page.
    fn page_geometry(&self, index: usize) -> Result<PageGeometry>;

    /// Geometry of every page, in order.
    fn page_geometries(&self) -> Result<Vec<PageGeometry>> {
        (0..self.page_count())
            .map(|i| self.page_geometry(i))
            .collect()
    }
}

/// Write access to a document under construction.
pub trait OutputDocument {
    /// The source type pages can be copied from.
    type Source;

    /// Number of pages so far.
    fn page_count(&self) -> usize;

    /// Size and rotation of a page.
    fn page_geometry(&self, index: usize) -> Result<PageGeometry>;

    /// Append copies of `indices` from `source`, in the given order.
    fn copy_pages(&mut self, source: &Self::Source, indices: &[usize]) -> Result<()>;

    /// Append an empty page; returns its index.
    fn add_blank_page(&mut self, width_pt: f32, height_pt: f32) -> Result<usize>;

    /// Set a page's display rotation.
    fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<()>;

    /// Paint one instruction onto its page.
    ///
    /// Instructions with [`DrawInstruction::restamp_original`] must end up
    /// underneath the page's existing content.
    fn draw(&mut self, instruction: &DrawInstruction) -> Result<()>;

    /// Serialize the document.
    fn save(&mut self) -> Result<Vec<u8>>;
}

/// Extracts positioned text from pages.
pub trait TextExtractor {
    /// Text fragments of one page, in content-stream order.
    fn extract_fragments(&self, index: usize) -> Result<Vec<TextFragment>>;
}
