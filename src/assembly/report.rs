//! Inputs and results of assembly operations.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::PageGeometry;
use crate::layout::TextBlock;

/// A document handed to an assembly operation.
#[derive(Debug, Clone, Default)]
pub struct SourceInput {
    /// Display name, used in reports and output names
    pub name: String,
    pub data: Vec<u8>,
    /// Page range expression; empty selects every page
    pub range: String,
    pub password: Option<String>,
}

impl SourceInput {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
            range: String::new(),
            password: None,
        }
    }

    /// Read a source from disk, named after its file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, data))
    }

    /// Select pages by range expression.
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// A batch source that could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSource {
    /// Position of the source in the batch
    pub index: usize,
    pub name: String,
    /// Readable cause
    pub reason: String,
}

impl SkippedSource {
    pub fn new(index: usize, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Pages a merge took from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedSource {
    pub index: usize,
    pub name: String,
    /// Zero-based page indices, in append order
    pub pages: Vec<usize>,
}

/// Result of a merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    #[serde(skip)]
    pub output: Vec<u8>,
    /// Total pages in the output
    pub page_count: usize,
    pub merged: Vec<MergedSource>,
    pub skipped: Vec<SkippedSource>,
}

impl MergeReport {
    /// Whether some sources were left out.
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// How split packages its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// One document with every selected page
    #[default]
    Single,
    /// One document per selected page
    Archive,
}

/// One document produced by split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitPart {
    pub name: String,
    /// Zero-based source pages in this part
    pub pages: Vec<usize>,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Result of a split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitOutput {
    pub mode: SplitMode,
    pub parts: Vec<SplitPart>,
}

/// One entry of an organize order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageSlot {
    /// A source page, turned by `rotation_delta` degrees on top of its
    /// current rotation
    Page {
        index: usize,
        #[serde(default)]
        rotation_delta: i64,
    },
    /// An empty page of the configured blank size
    Blank,
}

impl PageSlot {
    pub fn page(index: usize) -> Self {
        PageSlot::Page {
            index,
            rotation_delta: 0,
        }
    }

    pub fn rotated(index: usize, rotation_delta: i64) -> Self {
        PageSlot::Page {
            index,
            rotation_delta,
        }
    }
}

/// Rotation request for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRotation {
    /// Zero-based page index
    pub index: usize,
    pub degrees: i64,
}

impl PageRotation {
    pub fn new(index: usize, degrees: i64) -> Self {
        Self { index, degrees }
    }
}

/// Result of a rotate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateReport {
    #[serde(skip)]
    pub output: Vec<u8>,
    /// Pages whose rotation actually changed
    pub changed: Vec<usize>,
    /// Requests that left their page as it was
    pub unchanged: usize,
}

/// Page summary of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub name: String,
    pub page_count: usize,
    pub pages: Vec<PageGeometry>,
}

/// Text blocks of one page with the geometry needed to lay them out again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageBlocks {
    pub page_index: usize,
    pub geometry: PageGeometry,
    pub blocks: Vec<TextBlock>,
}
