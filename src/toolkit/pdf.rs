//! PDF toolkit backed by lopdf.

use std::collections::{BTreeMap, HashMap, HashSet};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::{DocumentToolkit, OutputDocument, SourceDocument, TextExtractor};
use crate::compose::{Color, DrawInstruction, DrawKind, StandardFont};
use crate::error::{Error, Result};
use crate::geometry::{PageGeometry, Rotation};
use crate::layout::TextFragment;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&str; 4] = ["MediaBox", "CropBox", "Resources", "Rotate"];

/// Guards against cyclic `/Parent` chains.
const MAX_TREE_DEPTH: usize = 64;

/// TJ adjustments beyond this (thousandths of an em) read as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Toolkit for real PDF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfToolkit;

impl DocumentToolkit for LopdfToolkit {
    type Source = LopdfSource;
    type Output = LopdfOutput;

    fn open(&self, data: &[u8], password: Option<&str>) -> Result<LopdfSource> {
        LopdfSource::load(data, password)
    }

    fn create(&self) -> Result<LopdfOutput> {
        Ok(LopdfOutput::new())
    }

    fn edit(&self, source: LopdfSource) -> Result<LopdfOutput> {
        LopdfOutput::from_document(source.doc)
    }
}

/// A PDF opened for reading.
#[derive(Debug, Clone)]
pub struct LopdfSource {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl LopdfSource {
    /// Parse a PDF from memory.
    ///
    /// Encrypted files are rejected; lopdf cannot decrypt them with a user
    /// password.
    pub fn load(data: &[u8], password: Option<&str>) -> Result<Self> {
        let header = &data[..data.len().min(1024)];
        if !header.windows(5).any(|w| w == b"%PDF-") {
            return Err(Error::UnknownFormat);
        }

        let doc = Document::load_mem(data)?;
        if doc.is_encrypted() {
            if password.is_some() {
                log::warn!("Password was provided but encrypted PDFs cannot be decrypted");
            }
            return Err(Error::Encrypted);
        }
        if let Err(e) = doc.catalog() {
            return Err(Error::Corrupted(format!("no document catalog: {}", e)));
        }

        let pages = doc.get_pages().into_values().collect();
        Ok(Self { doc, pages })
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages
            .get(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }
}

impl SourceDocument for LopdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
        Ok(page_geometry(&self.doc, self.page_id(index)?))
    }
}

impl TextExtractor for LopdfSource {
    fn extract_fragments(&self, index: usize) -> Result<Vec<TextFragment>> {
        extract_page_fragments(&self.doc, self.page_id(index)?)
    }
}

/// A PDF being assembled or edited.
#[derive(Debug)]
pub struct LopdfOutput {
    doc: Document,
    pages_id: ObjectId,
    pages: Vec<ObjectId>,
    fonts: HashMap<StandardFont, ObjectId>,
    wrapped: HashSet<ObjectId>,
}

impl LopdfOutput {
    fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            pages_id,
            pages: Vec::new(),
            fonts: HashMap::new(),
            wrapped: HashSet::new(),
        }
    }

    /// Take over an existing document. The page tree is flattened under its
    /// root node on save, so inherited attributes are copied onto each page.
    fn from_document(mut doc: Document) -> Result<Self> {
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for &page_id in &pages {
            materialize_inherited(&mut doc, page_id)?;
        }

        let root_id = doc.trailer.get(b"Root")?.as_reference()?;
        let pages_id = doc.get_dictionary(root_id)?.get(b"Pages")?.as_reference()?;
        for &page_id in &pages {
            doc.get_dictionary_mut(page_id)?.set("Parent", pages_id);
        }

        Ok(Self {
            doc,
            pages_id,
            pages,
            fonts: HashMap::new(),
            wrapped: HashSet::new(),
        })
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages
            .get(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }

    /// The page's resources as an owned dictionary, resolving references.
    fn resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        Ok(match self.doc.get_dictionary(page_id)?.get(b"Resources") {
            Ok(Object::Reference(id)) => self
                .doc
                .get_dictionary(*id)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        })
    }

    /// Register a named resource on one page. The page gets its own copy of
    /// the resource dictionary so shared dictionaries stay untouched.
    fn add_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        name: &str,
        value: Object,
    ) -> Result<()> {
        let mut resources = self.resources(page_id)?;
        let mut entries = match resources.get(category.as_bytes()) {
            Ok(Object::Reference(id)) => self
                .doc
                .get_dictionary(*id)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        entries.set(name, value);
        resources.set(category, entries);
        self.doc
            .get_dictionary_mut(page_id)?
            .set("Resources", resources);
        Ok(())
    }

    fn font_resource(&mut self, page_id: ObjectId, font: StandardFont) -> Result<String> {
        let font_id = match self.fonts.get(&font) {
            Some(id) => *id,
            None => {
                let id = self.doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.base_name(),
                    "Encoding" => "WinAnsiEncoding",
                });
                self.fonts.insert(font, id);
                id
            }
        };
        let name = format!("Folio{}", font.base_name().replace('-', ""));
        self.add_resource(page_id, "Font", &name, Object::Reference(font_id))?;
        Ok(name)
    }

    fn opacity_resource(&mut self, page_id: ObjectId, opacity: f32) -> Result<String> {
        let name = format!("FolioGS{}", (opacity * 100.0).round() as u32);
        let state = dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(opacity),
            "CA" => Object::Real(opacity),
        };
        self.add_resource(page_id, "ExtGState", &name, Object::Dictionary(state))?;
        Ok(name)
    }

    /// References to the page's content streams, in paint order.
    fn content_streams(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let contents = match self.doc.get_dictionary(page_id)?.get(b"Contents") {
            Ok(obj) => obj,
            Err(_) => return Ok(Vec::new()),
        };
        Ok(match contents {
            Object::Reference(id) => match self.doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Object::Array(items) => items.clone(),
            _ => Vec::new(),
        })
    }

    /// Add a content stream above or below the existing page content.
    fn push_content(&mut self, page_id: ObjectId, data: Vec<u8>, underneath: bool) -> Result<()> {
        let mut streams = self.content_streams(page_id)?;
        let stream_id = self.doc.add_object(Stream::new(Dictionary::new(), data));

        if underneath {
            streams.insert(0, Object::Reference(stream_id));
        } else {
            // Isolate the original content so its graphics state cannot leak
            // into what is painted after it.
            if !streams.is_empty() && self.wrapped.insert(page_id) {
                let open = self
                    .doc
                    .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
                let close = self
                    .doc
                    .add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
                streams.insert(0, Object::Reference(open));
                streams.push(Object::Reference(close));
            }
            streams.push(Object::Reference(stream_id));
        }

        self.doc
            .get_dictionary_mut(page_id)?
            .set("Contents", Object::Array(streams));
        Ok(())
    }
}

impl OutputDocument for LopdfOutput {
    type Source = LopdfSource;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
        Ok(page_geometry(&self.doc, self.page_id(index)?))
    }

    fn copy_pages(&mut self, source: &LopdfSource, indices: &[usize]) -> Result<()> {
        if indices.is_empty() {
            return Ok(());
        }
        let count = source.pages.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= count) {
            return Err(Error::PageOutOfRange(bad, count));
        }

        let mut doc = source.doc.clone();
        doc.renumber_objects_with(self.doc.max_id + 1);
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

        let mut selected = Vec::with_capacity(indices.len());
        for &index in indices {
            let page_id = *page_ids
                .get(index)
                .ok_or(Error::PageOutOfRange(index, page_ids.len()))?;
            materialize_inherited(&mut doc, page_id)?;
            selected.push(page_id);
        }

        self.doc.max_id = self.doc.max_id.max(doc.max_id);
        self.doc.objects.extend(doc.objects);

        let mut used = HashSet::new();
        for page_id in selected {
            // A page listed twice needs its own page object.
            let page_id = if used.insert(page_id) {
                page_id
            } else {
                let copy = self.doc.get_dictionary(page_id)?.clone();
                self.doc.add_object(copy)
            };
            self.doc
                .get_dictionary_mut(page_id)?
                .set("Parent", self.pages_id);
            self.pages.push(page_id);
        }
        Ok(())
    }

    fn add_blank_page(&mut self, width_pt: f32, height_pt: f32) -> Result<usize> {
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width_pt),
                Object::Real(height_pt),
            ],
            "Resources" => Dictionary::new(),
            "Contents" => content_id,
        });
        self.pages.push(page_id);
        Ok(self.pages.len() - 1)
    }

    fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<()> {
        let page_id = self.page_id(index)?;
        self.doc
            .get_dictionary_mut(page_id)?
            .set("Rotate", i64::from(rotation));
        Ok(())
    }

    fn draw(&mut self, instruction: &DrawInstruction) -> Result<()> {
        if instruction.is_empty() {
            log::debug!(
                "Skipping zero-size instruction on page {}",
                instruction.page_index + 1
            );
            return Ok(());
        }
        if let DrawKind::Image { resource } = &instruction.kind {
            return Err(Error::Unsupported(format!(
                "drawing image '{}' into a PDF",
                resource
            )));
        }

        let page_id = self.page_id(instruction.page_index)?;
        let mut ops = vec![Operation::new("q", vec![])];

        if instruction.opacity < 1.0 {
            let state = self.opacity_resource(page_id, instruction.opacity)?;
            ops.push(Operation::new("gs", vec![Object::Name(state.into_bytes())]));
        }

        let (sin, cos) = instruction.rotation_deg.to_radians().sin_cos();
        ops.push(Operation::new(
            "cm",
            vec![
                Object::Real(cos),
                Object::Real(sin),
                Object::Real(-sin),
                Object::Real(cos),
                Object::Real(instruction.origin.x),
                Object::Real(instruction.origin.y),
            ],
        ));

        match &instruction.kind {
            DrawKind::Rect { color } => {
                ops.push(fill_color(color));
                ops.push(Operation::new(
                    "re",
                    vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(instruction.width),
                        Object::Real(instruction.height),
                    ],
                ));
                ops.push(Operation::new("f", vec![]));
            }
            DrawKind::Text {
                text,
                font,
                font_size_pt,
                color,
            } => {
                let font_name = self.font_resource(page_id, *font)?;
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font_name.into_bytes()), Object::Real(*font_size_pt)],
                ));
                ops.push(fill_color(color));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            DrawKind::Image { .. } => {}
        }
        ops.push(Operation::new("Q", vec![]));

        let data = Content { operations: ops }.encode()?;
        self.push_content(page_id, data, instruction.restamp_original)
    }

    fn save(&mut self) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self.pages.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        let root = self.doc.get_dictionary_mut(self.pages_id)?;
        root.set("Kids", kids);
        root.set("Count", count);

        self.doc.prune_objects();
        self.doc.compress();

        let mut buf = Vec::new();
        self.doc.save_to(&mut buf)?;
        Ok(buf)
    }
}

fn fill_color(color: &Color) -> Operation {
    Operation::new(
        "rg",
        vec![
            Object::Real(color.r),
            Object::Real(color.g),
            Object::Real(color.b),
        ],
    )
}

/// Encode text for a WinAnsi font. Characters outside Latin-1 become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Page tree helpers
// ---------------------------------------------------------------------------

/// Look up a page attribute, walking up the page tree.
fn inherited(doc: &Document, page_id: ObjectId, key: &str) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key.as_bytes()) {
            return Some(value.clone());
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Copy inherited attributes onto the page itself.
fn materialize_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    for key in INHERITABLE {
        if doc.get_dictionary(page_id)?.has(key.as_bytes()) {
            continue;
        }
        if let Some(value) = inherited(doc, page_id, key) {
            doc.get_dictionary_mut(page_id)?.set(key, value);
        }
    }
    Ok(())
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn page_geometry(doc: &Document, page_id: ObjectId) -> PageGeometry {
    let media_box: Option<Vec<f32>> = inherited(doc, page_id, "MediaBox").and_then(|obj| {
        let array = resolve(doc, &obj).as_array().ok()?.clone();
        array
            .iter()
            .map(|v| get_number(resolve(doc, v)))
            .collect::<Option<Vec<f32>>>()
    });

    let rotation = inherited(doc, page_id, "Rotate")
        .and_then(|obj| get_number(resolve(doc, &obj)))
        .map(|deg| Rotation::from_degrees(deg as i64))
        .unwrap_or_default();

    match media_box.as_deref() {
        Some([x0, y0, x1, y1]) => PageGeometry {
            width_pt: (x1 - x0).abs(),
            height_pt: (y1 - y0).abs(),
            rotation,
        },
        _ => {
            log::warn!("Page {:?} has no usable MediaBox, assuming US Letter", page_id);
            PageGeometry::LETTER.with_rotation(rotation)
        }
    }
}

// ---------------------------------------------------------------------------
// Text extraction
// ---------------------------------------------------------------------------

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, obj) in m.iter_mut().zip(operands) {
        *slot = get_number(obj)?;
    }
    Some(m)
}

/// Advance widths of a simple font.
struct FontWidths {
    base_font: String,
    first_char: i64,
    widths: Vec<f32>,
    simple: bool,
}

impl FontWidths {
    fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let simple = !matches!(
            dict.get(b"Subtype").and_then(Object::as_name),
            Ok(b"Type0")
        );
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| get_number(resolve(doc, o)))
            .unwrap_or(0.0) as i64;
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| get_number(resolve(doc, w)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            base_font,
            first_char,
            widths,
            simple,
        }
    }

    /// Advance of a string in thousandths of an em, if the font says.
    fn advance(&self, bytes: &[u8]) -> Option<f32> {
        if !self.simple || self.widths.is_empty() {
            return None;
        }
        Some(
            bytes
                .iter()
                .map(|&b| {
                    usize::try_from(b as i64 - self.first_char)
                        .ok()
                        .and_then(|i| self.widths.get(i).copied())
                        .unwrap_or(500.0)
                })
                .sum(),
        )
    }
}

#[derive(Clone)]
struct GraphicsState {
    ctm: Matrix,
}

/// Text state while walking a content stream.
struct TextWalker<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    widths: HashMap<Vec<u8>, FontWidths>,
    stack: Vec<GraphicsState>,
    gs: GraphicsState,
    tm: Matrix,
    tlm: Matrix,
    leading: f32,
    font: Vec<u8>,
    font_size: f32,
    fragments: Vec<TextFragment>,
}

impl<'a> TextWalker<'a> {
    fn new(doc: &'a Document, page_id: ObjectId) -> Self {
        let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
        let widths = fonts
            .iter()
            .map(|(name, dict)| (name.clone(), FontWidths::from_dict(doc, dict)))
            .collect();
        Self {
            doc,
            fonts,
            widths,
            stack: Vec::new(),
            gs: GraphicsState { ctm: IDENTITY },
            tm: IDENTITY,
            tlm: IDENTITY,
            leading: 0.0,
            font: Vec::new(),
            font_size: 12.0,
            fragments: Vec::new(),
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.tlm);
        self.tm = self.tlm;
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(&self.font)
            .and_then(|f| f.get_font_encoding(self.doc).ok());
        match encoding {
            Some(enc) => Document::decode_text(&enc, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    /// Show an array of strings and spacing adjustments as one fragment.
    fn show(&mut self, items: &[Object]) {
        let mut text = String::new();
        let mut advance = 0.0f32;
        let widths = self.widths.get(&self.font);

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = self.decode(bytes);
                    let units = widths
                        .and_then(|w| w.advance(bytes))
                        .unwrap_or(decoded.chars().count() as f32 * 500.0);
                    advance += units / 1000.0 * self.font_size;
                    text.push_str(&decoded);
                }
                other => {
                    if let Some(adjust) = get_number(other) {
                        advance -= adjust / 1000.0 * self.font_size;
                        if -adjust > TJ_SPACE_THRESHOLD
                            && !text.is_empty()
                            && !text.ends_with(char::is_whitespace)
                        {
                            text.push(' ');
                        }
                    }
                }
            }
        }

        let trm = multiply(&self.tm, &self.gs.ctm);
        let vertical_scale = (trm[2] * trm[2] + trm[3] * trm[3]).sqrt();
        let horizontal_scale = (trm[0] * trm[0] + trm[1] * trm[1]).sqrt();

        if !text.trim().is_empty() {
            let font_name = widths
                .map(|w| w.base_font.clone())
                .unwrap_or_else(|| String::from_utf8_lossy(&self.font).to_string());
            self.fragments.push(
                TextFragment::new(
                    text,
                    trm[4],
                    trm[5],
                    self.font_size * vertical_scale,
                    font_name,
                )
                .with_width(advance * horizontal_scale),
            );
        }

        self.tm = multiply(&[1.0, 0.0, 0.0, 1.0, advance, 0.0], &self.tm);
    }

    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        let number = |i: usize| operands.get(i).and_then(get_number);

        match op.operator.as_str() {
            "q" => self.stack.push(self.gs.clone()),
            "Q" => {
                if let Some(gs) = self.stack.pop() {
                    self.gs = gs;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(operands) {
                    self.gs.ctm = multiply(&m, &self.gs.ctm);
                }
            }
            "BT" => {
                self.tm = IDENTITY;
                self.tlm = IDENTITY;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.font = name.clone();
                }
                self.font_size = number(1).unwrap_or(12.0);
            }
            "TL" => self.leading = number(0).unwrap_or(0.0),
            "Td" => self.move_line(number(0).unwrap_or(0.0), number(1).unwrap_or(0.0)),
            "TD" => {
                let ty = number(1).unwrap_or(0.0);
                self.leading = -ty;
                self.move_line(number(0).unwrap_or(0.0), ty);
            }
            "Tm" => {
                if let Some(m) = matrix_operands(operands) {
                    self.tm = m;
                    self.tlm = m;
                }
            }
            "T*" => self.move_line(0.0, -self.leading),
            "Tj" => {
                if let Some(s) = operands.first() {
                    self.show(std::slice::from_ref(s));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show(items);
                }
            }
            "'" => {
                self.move_line(0.0, -self.leading);
                if let Some(s) = operands.first() {
                    self.show(std::slice::from_ref(s));
                }
            }
            "\"" => {
                self.move_line(0.0, -self.leading);
                if let Some(s) = operands.get(2) {
                    self.show(std::slice::from_ref(s));
                }
            }
            _ => {}
        }
    }
}

/// Decompressed content of a page, all streams concatenated.
fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page = doc.get_dictionary(page_id)?;
    let contents = match page.get(b"Contents") {
        Ok(obj) => resolve(doc, obj),
        Err(_) => return Ok(Vec::new()),
    };

    let streams: Vec<&Object> = match contents {
        Object::Array(items) => items.iter().map(|o| resolve(doc, o)).collect(),
        other => vec![other],
    };

    let mut content = Vec::new();
    for obj in streams {
        if let Object::Stream(s) = obj {
            match s.decompressed_content() {
                Ok(data) => content.extend_from_slice(&data),
                Err(_) => content.extend_from_slice(&s.content),
            }
            content.push(b'\n');
        }
    }
    Ok(content)
}

fn extract_page_fragments(doc: &Document, page_id: ObjectId) -> Result<Vec<TextFragment>> {
    let data = page_content(doc, page_id)?;
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let content = Content::decode(&data)?;

    let mut walker = TextWalker::new(doc, page_id);
    for op in &content.operations {
        walker.apply(op);
    }
    log::debug!(
        "Extracted {} text fragments from page {:?}",
        walker.fragments.len(),
        page_id
    );
    Ok(walker.fragments)
}

/// Decode bytes when the font gives no encoding: UTF-16BE with BOM, then
/// UTF-8, then Latin-1.
fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
