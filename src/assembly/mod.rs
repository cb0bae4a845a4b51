//! Page assembly pipeline.
//!
//! Merge, split, organize, rotate and annotate documents through an injected
//! [`DocumentToolkit`]. Page selection goes through [`PageRangeSet`] and
//! rotation values through [`normalize_rotation`].

mod options;
mod report;

pub use options::{AssemblyOptions, RotationMode};
pub use report::{
    DocumentInfo, MergeReport, MergedSource, PageBlocks, PageRotation, PageSlot, RotateReport,
    SkippedSource, SourceInput, SplitMode, SplitOutput, SplitPart,
};

use rayon::prelude::*;

use crate::compose::{Annotation, Compositor, DrawInstruction, PageNumberOptions};
use crate::error::{Error, Result};
use crate::geometry::{normalize_rotation, Rotation};
use crate::layout::{blocks_for_pages, rows_for_pages, PageRows, TextFragment};
use crate::range::PageRangeSet;
use crate::toolkit::{DocumentToolkit, OutputDocument, SourceDocument, TextExtractor};

/// Runs assembly operations against one toolkit.
pub struct Assembler<'a, T: DocumentToolkit> {
    toolkit: &'a T,
    options: AssemblyOptions,
}

impl<'a, T: DocumentToolkit> Assembler<'a, T> {
    /// Create an assembler with default options.
    pub fn new(toolkit: &'a T) -> Self {
        Self::with_options(toolkit, AssemblyOptions::default())
    }

    pub fn with_options(toolkit: &'a T, options: AssemblyOptions) -> Self {
        Self { toolkit, options }
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    fn open(&self, source: &SourceInput) -> Result<T::Source> {
        self.toolkit
            .open(&source.data, source.password.as_deref())
    }

    fn compositor(&self) -> Compositor {
        Compositor::new(self.options.placement.clone())
    }

    /// Page count and geometry of a document.
    pub fn info(&self, source: &SourceInput) -> Result<DocumentInfo> {
        let doc = self.open(source)?;
        Ok(DocumentInfo {
            name: source.name.clone(),
            page_count: doc.page_count(),
            pages: doc.page_geometries()?,
        })
    }

    /// Concatenate the selected pages of each source, in source order.
    ///
    /// Sources that cannot be opened (see [`Error::is_source_unavailable`])
    /// are skipped and listed in the report; any other error aborts the merge.
    /// Fails with [`Error::AllSourcesUnavailable`] when every source was
    /// skipped, and with [`Error::NoPagesSelected`] when the ranges select
    /// nothing.
    pub fn merge(&self, sources: &[SourceInput]) -> Result<MergeReport> {
        let mut skipped = Vec::new();
        let mut opened = Vec::new();

        for (index, source) in sources.iter().enumerate() {
            match self.open(source) {
                Ok(doc) => {
                    let selection = PageRangeSet::parse(&source.range, doc.page_count());
                    opened.push((index, doc, selection));
                }
                Err(e) if !e.is_source_unavailable() => return Err(e),
                Err(e) => {
                    log::warn!("Skipping source {} ({}): {}", index + 1, source.name, e);
                    skipped.push(SkippedSource::new(index, &source.name, e.to_string()));
                }
            }
        }

        if opened.is_empty() && !skipped.is_empty() {
            return Err(Error::AllSourcesUnavailable(skipped));
        }

        let mut output = self.toolkit.create()?;
        let mut merged = Vec::with_capacity(opened.len());
        for (index, doc, selection) in &opened {
            output.copy_pages(doc, selection.indices())?;
            merged.push(MergedSource {
                index: *index,
                name: sources[*index].name.clone(),
                pages: selection.indices().to_vec(),
            });
        }

        let page_count = output.page_count();
        if page_count == 0 {
            return Err(Error::NoPagesSelected(
                "the page ranges of the merged sources are empty".to_string(),
            ));
        }
        log::debug!(
            "Merged {} pages from {} sources ({} skipped)",
            page_count,
            merged.len(),
            skipped.len()
        );

        Ok(MergeReport {
            output: output.save()?,
            page_count,
            merged,
            skipped,
        })
    }

    /// Extract the selected pages, as one document or one per page.
    pub fn split(&self, source: &SourceInput, mode: SplitMode) -> Result<SplitOutput> {
        let doc = self.open(source)?;
        let selection = PageRangeSet::parse(&source.range, doc.page_count());
        if selection.is_empty() {
            return Err(Error::NoPagesSelected(format!(
                "range '{}' selects no page of {}",
                source.range, source.name
            )));
        }

        let parts = match mode {
            SplitMode::Single => {
                let mut output = self.toolkit.create()?;
                output.copy_pages(&doc, selection.indices())?;
                vec![SplitPart {
                    name: format!("split-{}", source.name),
                    pages: selection.indices().to_vec(),
                    data: output.save()?,
                }]
            }
            SplitMode::Archive => selection
                .iter()
                .map(|index| {
                    let mut output = self.toolkit.create()?;
                    output.copy_pages(&doc, &[index])?;
                    Ok(SplitPart {
                        name: self.options.archive_part_name(index + 1),
                        pages: vec![index],
                        data: output.save()?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(SplitOutput { mode, parts })
    }

    /// Build a document from an explicit page order.
    ///
    /// Slots pointing past the document are skipped. Blank slots get the
    /// configured blank page size.
    pub fn organize(&self, source: &SourceInput, slots: &[PageSlot]) -> Result<Vec<u8>> {
        let doc = self.open(source)?;
        let count = doc.page_count();
        let mut output = self.toolkit.create()?;

        for (position, slot) in slots.iter().enumerate() {
            match *slot {
                PageSlot::Page {
                    index,
                    rotation_delta,
                } => {
                    if index >= count {
                        log::warn!(
                            "Organize slot {} points at page {} of a {}-page document, skipping",
                            position + 1,
                            index + 1,
                            count
                        );
                        continue;
                    }
                    output.copy_pages(&doc, &[index])?;
                    if rotation_delta != 0 {
                        let target = output.page_count() - 1;
                        let current = output.page_geometry(target)?.rotation;
                        output.set_rotation(target, current.compose(rotation_delta))?;
                    }
                }
                PageSlot::Blank => {
                    let blank = self.options.blank_page;
                    output.add_blank_page(blank.width_pt, blank.height_pt)?;
                }
            }
        }

        if output.page_count() == 0 {
            return Err(Error::NoPagesSelected(
                "the organize order contains no usable page".to_string(),
            ));
        }
        output.save()
    }

    /// Rotate individual pages.
    ///
    /// In [`RotationMode::Absolute`] a value of 0, or one that matches the
    /// page's current rotation, leaves the page untouched.
    pub fn rotate(&self, source: &SourceInput, rotations: &[PageRotation]) -> Result<RotateReport> {
        let doc = self.open(source)?;
        let count = doc.page_count();
        if let Some(bad) = rotations.iter().find(|r| r.index >= count) {
            return Err(Error::PageOutOfRange(bad.index, count));
        }

        let mut output = self.toolkit.edit(doc)?;
        let mut changed = Vec::new();
        let mut unchanged = 0;

        for request in rotations {
            let current = output.page_geometry(request.index)?.rotation;
            let target = match self.options.rotation_mode {
                RotationMode::Absolute if request.degrees == 0 => None,
                RotationMode::Absolute => Some(normalize_rotation(request.degrees)),
                RotationMode::Relative => Some(current.compose(request.degrees)),
            };

            match target {
                Some(rotation) if rotation != current => {
                    output.set_rotation(request.index, rotation)?;
                    if !changed.contains(&request.index) {
                        changed.push(request.index);
                    }
                }
                _ => unchanged += 1,
            }
        }

        Ok(RotateReport {
            output: output.save()?,
            changed,
            unchanged,
        })
    }

    /// Rotate every page selected by the source range by the same value.
    pub fn rotate_range(&self, source: &SourceInput, degrees: i64) -> Result<RotateReport> {
        let count = self.open(source)?.page_count();
        let rotations: Vec<PageRotation> = PageRangeSet::parse(&source.range, count)
            .iter()
            .map(|index| PageRotation::new(index, degrees))
            .collect();
        self.rotate(source, &rotations)
    }

    /// Draw annotations onto the pages selected by the source range.
    pub fn annotate(&self, source: &SourceInput, annotations: &[Annotation]) -> Result<Vec<u8>> {
        let compositor = self.compositor();
        self.apply_instructions(source, |output| {
            let selection = PageRangeSet::parse(&source.range, output.page_count());
            let mut instructions = Vec::new();
            for index in selection.iter() {
                let geo = output.page_geometry(index)?;
                for annotation in annotations {
                    instructions.extend(compositor.place_on(annotation, index, &geo));
                }
            }
            Ok(instructions)
        })
    }

    /// Stamp page numbers. The numbered pages come from `options.range`.
    pub fn number_pages(&self, source: &SourceInput, options: &PageNumberOptions) -> Result<Vec<u8>> {
        let compositor = self.compositor();
        self.apply_instructions(source, |output| {
            let pages = (0..output.page_count())
                .map(|i| output.page_geometry(i))
                .collect::<Result<Vec<_>>>()?;
            Ok(compositor.number_pages(&pages, options))
        })
    }

    fn apply_instructions<F>(&self, source: &SourceInput, plan: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&T::Output) -> Result<Vec<DrawInstruction>>,
    {
        let doc = self.open(source)?;
        let mut output = self.toolkit.edit(doc)?;
        let instructions = plan(&output)?;
        log::debug!(
            "Drawing {} instructions onto {}",
            instructions.len(),
            source.name
        );
        for instruction in &instructions {
            output.draw(instruction)?;
        }
        output.save()
    }
}

impl<'a, T> Assembler<'a, T>
where
    T: DocumentToolkit,
    T::Source: TextExtractor,
{
    /// Text fragments of each selected page, with the page indices.
    pub fn extract_fragments(&self, source: &SourceInput) -> Result<(Vec<usize>, Vec<Vec<TextFragment>>)> {
        let doc = self.open(source)?;
        let selection = PageRangeSet::parse(&source.range, doc.page_count());
        let fragments = selection
            .iter()
            .map(|index| doc.extract_fragments(index))
            .collect::<Result<Vec<_>>>()?;
        Ok((selection.indices().to_vec(), fragments))
    }

    /// Table rows of each selected page, tagged with the page index.
    pub fn extract_rows(&self, source: &SourceInput) -> Result<Vec<PageRows>> {
        let (indices, fragments) = self.extract_fragments(source)?;
        Ok(indices
            .into_iter()
            .zip(rows_for_pages(&fragments, &self.options.layout))
            .map(|(page_index, rows)| PageRows::new(page_index, rows))
            .collect())
    }

    /// Styled text blocks of each selected page.
    pub fn extract_blocks(&self, source: &SourceInput) -> Result<Vec<PageBlocks>> {
        let doc = self.open(source)?;
        let selection = PageRangeSet::parse(&source.range, doc.page_count());
        let mut geometries = Vec::with_capacity(selection.len());
        let mut fragments = Vec::with_capacity(selection.len());
        for index in selection.iter() {
            geometries.push(doc.page_geometry(index)?);
            fragments.push(doc.extract_fragments(index)?);
        }

        let blocks = blocks_for_pages(&fragments, &self.options.layout);
        Ok(selection
            .iter()
            .zip(geometries)
            .zip(blocks)
            .map(|((page_index, geometry), blocks)| PageBlocks {
                page_index,
                geometry,
                blocks,
            })
            .collect())
    }
}

/// Open many sources concurrently and report their page summaries.
///
/// Sources that cannot be opened come back as skipped entries instead of
/// failing the batch.
pub fn inspect_all<T>(toolkit: &T, sources: &[SourceInput]) -> Vec<std::result::Result<DocumentInfo, SkippedSource>>
where
    T: DocumentToolkit + Sync,
{
    let assembler = Assembler::new(toolkit);
    sources
        .par_iter()
        .enumerate()
        .map(|(index, source)| {
            assembler
                .info(source)
                .map_err(|e| SkippedSource::new(index, &source.name, e.to_string()))
        })
        .collect()
}

/// Current rotation of every page, for callers that want to show it.
pub fn page_rotations<D: SourceDocument>(doc: &D) -> Result<Vec<Rotation>> {
    Ok(doc
        .page_geometries()?
        .into_iter()
        .map(|g| g.rotation)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{Color, DrawKind, Layer, StandardFont, TileMode};
    use crate::geometry::{NormalizedBox, PageGeometry};
    use crate::toolkit::{MemoryDocument, MemoryToolkit};

    fn source(name: &str, pages: usize) -> SourceInput {
        let doc = MemoryDocument::with_pages(name, pages, PageGeometry::A4);
        SourceInput::new(name, doc.to_bytes().unwrap())
    }

    fn open(bytes: &[u8]) -> MemoryDocument {
        MemoryToolkit.open(bytes, None).unwrap()
    }

    #[test]
    fn test_merge_in_source_then_range_order() {
        let assembler = Assembler::new(&MemoryToolkit);
        let sources = vec![source("a", 3).with_range("3,1"), source("b", 2)];
        let report = assembler.merge(&sources).unwrap();
        assert_eq!(report.page_count, 4);
        assert_eq!(open(&report.output).labels(), vec!["a1", "a3", "b1", "b2"]);
        assert!(!report.has_skipped());
    }

    #[test]
    fn test_merge_all_skipped() {
        let assembler = Assembler::new(&MemoryToolkit);
        let sources = vec![SourceInput::new("junk", b"junk".to_vec())];
        match assembler.merge(&sources) {
            Err(Error::AllSourcesUnavailable(skipped)) => assert_eq!(skipped[0].name, "junk"),
            other => panic!("unexpected {:?}", other.map(|r| r.page_count)),
        }
    }

    /// Memory toolkit whose `open` fails with an I/O error for one payload.
    struct FlakyToolkit;

    impl DocumentToolkit for FlakyToolkit {
        type Source = MemoryDocument;
        type Output = MemoryDocument;

        fn open(&self, data: &[u8], password: Option<&str>) -> Result<MemoryDocument> {
            if data == b"io" {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone").into());
            }
            MemoryToolkit.open(data, password)
        }

        fn create(&self) -> Result<MemoryDocument> {
            MemoryToolkit.create()
        }

        fn edit(&self, source: MemoryDocument) -> Result<MemoryDocument> {
            MemoryToolkit.edit(source)
        }
    }

    #[test]
    fn test_merge_skips_corrupted_but_aborts_on_io() {
        let assembler = Assembler::new(&FlakyToolkit);
        let corrupted = SourceInput::new("broken", br#"{"pagez": 1}"#.to_vec());
        let report = assembler.merge(&[source("a", 1), corrupted]).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("Corrupted"));

        let failing = SourceInput::new("io", b"io".to_vec());
        assert!(matches!(
            assembler.merge(&[source("a", 1), failing]),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_merge_empty_ranges() {
        let assembler = Assembler::new(&MemoryToolkit);
        let sources = vec![source("a", 2).with_range("9")];
        assert!(matches!(
            assembler.merge(&sources),
            Err(Error::NoPagesSelected(_))
        ));
    }

    #[test]
    fn test_split_single_and_archive() {
        let assembler = Assembler::new(&MemoryToolkit);
        let input = source("doc", 5).with_range("2-3");

        let single = assembler.split(&input, SplitMode::Single).unwrap();
        assert_eq!(single.parts.len(), 1);
        assert_eq!(single.parts[0].name, "split-doc");
        assert_eq!(open(&single.parts[0].data).labels(), vec!["doc2", "doc3"]);

        let archive = assembler.split(&input, SplitMode::Archive).unwrap();
        let names: Vec<_> = archive.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["page-2.pdf", "page-3.pdf"]);
        assert_eq!(open(&archive.parts[1].data).labels(), vec!["doc3"]);
    }

    #[test]
    fn test_split_empty_range() {
        let assembler = Assembler::new(&MemoryToolkit);
        assert!(matches!(
            assembler.split(&source("doc", 2).with_range("x"), SplitMode::Single),
            Err(Error::NoPagesSelected(_))
        ));
    }

    #[test]
    fn test_organize_with_blanks_and_rotation() {
        let assembler = Assembler::new(&MemoryToolkit);
        let slots = vec![
            PageSlot::rotated(1, 90),
            PageSlot::Blank,
            PageSlot::page(0),
            PageSlot::page(7),
        ];
        let bytes = assembler.organize(&source("p", 2), &slots).unwrap();
        let doc = open(&bytes);
        assert_eq!(doc.labels(), vec!["p2", "blank", "p1"]);
        assert_eq!(doc.pages[0].geometry.rotation, Rotation::Deg90);
        assert_eq!(doc.pages[1].geometry, PageGeometry::A4);
    }

    #[test]
    fn test_rotate_absolute_skips_zero_and_same() {
        let assembler = Assembler::new(&MemoryToolkit);
        let rotations = vec![
            PageRotation::new(0, 0),
            PageRotation::new(1, -90),
            PageRotation::new(2, 360),
        ];
        let report = assembler.rotate(&source("p", 3), &rotations).unwrap();
        assert_eq!(report.changed, vec![1]);
        assert_eq!(report.unchanged, 2);
        let doc = open(&report.output);
        assert_eq!(doc.pages[1].geometry.rotation, Rotation::Deg270);
    }

    #[test]
    fn test_rotate_relative_composes() {
        let options = AssemblyOptions::default().relative_rotation();
        let assembler = Assembler::with_options(&MemoryToolkit, options);
        let input = source("p", 1);
        let first = assembler.rotate(&input, &[PageRotation::new(0, 90)]).unwrap();
        let again = SourceInput::new("p", first.output);
        let second = assembler.rotate(&again, &[PageRotation::new(0, 270)]).unwrap();
        assert_eq!(open(&second.output).pages[0].geometry.rotation, Rotation::Deg0);
    }

    #[test]
    fn test_rotate_out_of_range() {
        let assembler = Assembler::new(&MemoryToolkit);
        assert!(matches!(
            assembler.rotate(&source("p", 2), &[PageRotation::new(5, 90)]),
            Err(Error::PageOutOfRange(5, 2))
        ));
    }

    #[test]
    fn test_annotate_respects_range_and_layer() {
        let assembler = Assembler::new(&MemoryToolkit);
        let redaction = Annotation::fill(NormalizedBox::new(10.0, 10.0, 20.0, 5.0), Color::BLACK);
        let watermark = Annotation::text("DRAFT", StandardFont::HelveticaBold, 48.0)
            .with_tile_mode(TileMode::None)
            .with_layer(Layer::Under);
        let bytes = assembler
            .annotate(&source("p", 3).with_range("2"), &[redaction, watermark])
            .unwrap();
        let doc = open(&bytes);
        assert!(doc.pages[0].drawings.is_empty());
        assert_eq!(doc.pages[1].drawings.len(), 2);
        // The under-layer watermark sits below the redaction.
        assert!(doc.pages[1].drawings[0].restamp_original);
        assert!(matches!(doc.pages[1].drawings[1].kind, DrawKind::Rect { .. }));
    }

    #[test]
    fn test_inspect_all_reports_failures() {
        let sources = vec![source("a", 2), SourceInput::new("bad", b"??".to_vec())];
        let results = inspect_all(&MemoryToolkit, &sources);
        assert_eq!(results[0].as_ref().unwrap().page_count, 2);
        assert_eq!(results[1].as_ref().unwrap_err().index, 1);
    }
}
