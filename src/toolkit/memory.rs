//! JSON-backed documents for tests and dry runs.

use serde::{Deserialize, Serialize};

use super::{DocumentToolkit, OutputDocument, SourceDocument, TextExtractor};
use crate::compose::DrawInstruction;
use crate::error::{Error, Result};
use crate::geometry::{PageGeometry, Rotation};
use crate::layout::TextFragment;

/// A page of a [`MemoryDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    pub geometry: PageGeometry,
    /// Free-form tag identifying where the page came from
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub fragments: Vec<TextFragment>,
    /// Instructions painted onto the page, bottom-most first
    #[serde(default)]
    pub drawings: Vec<DrawInstruction>,
}

impl MemoryPage {
    pub fn new(geometry: PageGeometry, label: impl Into<String>) -> Self {
        Self {
            geometry,
            label: label.into(),
            fragments: Vec::new(),
            drawings: Vec::new(),
        }
    }

    pub fn with_fragments(mut self, fragments: Vec<TextFragment>) -> Self {
        self.fragments = fragments;
        self
    }
}

/// A document described as plain data.
///
/// Serialized as JSON by [`MemoryToolkit`]. A document with `password` set
/// counts as encrypted and only opens with that password.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self {
            password: None,
            pages,
        }
    }

    /// A document of `count` pages labelled `{prefix}{n}` (1-based).
    pub fn with_pages(prefix: &str, count: usize, geometry: PageGeometry) -> Self {
        Self::new(
            (1..=count)
                .map(|n| MemoryPage::new(geometry, format!("{}{}", prefix, n)))
                .collect(),
        )
    }

    /// Protect the document with a password.
    pub fn encrypted(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Page labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.label.as_str()).collect()
    }

    fn page(&self, index: usize) -> Result<&MemoryPage> {
        self.pages
            .get(index)
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut MemoryPage> {
        let count = self.pages.len();
        self.pages
            .get_mut(index)
            .ok_or(Error::PageOutOfRange(index, count))
    }
}

/// Toolkit over [`MemoryDocument`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryToolkit;

impl DocumentToolkit for MemoryToolkit {
    type Source = MemoryDocument;
    type Output = MemoryDocument;

    /// Bytes that are not JSON are [`Error::UnknownFormat`]; JSON that does
    /// not describe a document is [`Error::Corrupted`].
    fn open(&self, data: &[u8], password: Option<&str>) -> Result<MemoryDocument> {
        let value: serde_json::Value =
            serde_json::from_slice(data).map_err(|_| Error::UnknownFormat)?;
        let mut doc: MemoryDocument =
            serde_json::from_value(value).map_err(|e| Error::Corrupted(e.to_string()))?;
        if let Some(expected) = doc.password.take() {
            if password != Some(expected.as_str()) {
                return Err(Error::Encrypted);
            }
        }
        Ok(doc)
    }

    fn create(&self) -> Result<MemoryDocument> {
        Ok(MemoryDocument::default())
    }

    fn edit(&self, source: MemoryDocument) -> Result<MemoryDocument> {
        Ok(source)
    }
}

impl SourceDocument for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
        Ok(self.page(index)?.geometry)
    }
}

impl OutputDocument for MemoryDocument {
    type Source = MemoryDocument;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
        Ok(self.page(index)?.geometry)
    }

    fn copy_pages(&mut self, source: &MemoryDocument, indices: &[usize]) -> Result<()> {
        for &index in indices {
            let page = source.page(index)?.clone();
            self.pages.push(page);
        }
        Ok(())
    }

    fn add_blank_page(&mut self, width_pt: f32, height_pt: f32) -> Result<usize> {
        self.pages.push(MemoryPage::new(
            PageGeometry::new(width_pt, height_pt),
            "blank",
        ));
        Ok(self.pages.len() - 1)
    }

    fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<()> {
        self.page_mut(index)?.geometry.rotation = rotation;
        Ok(())
    }

    fn draw(&mut self, instruction: &DrawInstruction) -> Result<()> {
        let page = self.page_mut(instruction.page_index)?;
        if instruction.restamp_original {
            page.drawings.insert(0, instruction.clone());
        } else {
            page.drawings.push(instruction.clone());
        }
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>> {
        self.to_bytes()
    }
}

impl TextExtractor for MemoryDocument {
    fn extract_fragments(&self, index: usize) -> Result<Vec<TextFragment>> {
        Ok(self.page(index)?.fragments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_round_trip() {
        let doc = MemoryDocument::with_pages("a", 3, PageGeometry::A4);
        let bytes = doc.to_bytes().unwrap();
        let opened = MemoryToolkit.open(&bytes, None).unwrap();
        assert_eq!(opened.labels(), vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn test_encrypted_needs_password() {
        let bytes = MemoryDocument::with_pages("a", 1, PageGeometry::A4)
            .encrypted("secret")
            .to_bytes()
            .unwrap();
        assert!(matches!(MemoryToolkit.open(&bytes, None), Err(Error::Encrypted)));
        assert!(matches!(
            MemoryToolkit.open(&bytes, Some("wrong")),
            Err(Error::Encrypted)
        ));
        assert!(MemoryToolkit.open(&bytes, Some("secret")).is_ok());
    }

    #[test]
    fn test_garbage_is_unknown_format() {
        assert!(matches!(
            MemoryToolkit.open(b"%PDF-1.7 not json", None),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_json_without_pages_is_corrupted() {
        assert!(matches!(
            MemoryToolkit.open(br#"{"pagez": []}"#, None),
            Err(Error::Corrupted(_))
        ));
    }

    #[test]
    fn test_copy_out_of_range() {
        let source = MemoryDocument::with_pages("a", 2, PageGeometry::A4);
        let mut out = MemoryToolkit.create().unwrap();
        assert!(matches!(
            out.copy_pages(&source, &[5]),
            Err(Error::PageOutOfRange(5, 2))
        ));
    }
}
