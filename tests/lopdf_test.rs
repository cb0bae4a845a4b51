//! End-to-end tests against real PDFs built with lopdf.

#![cfg(feature = "lopdf-backend")]

use folio::assembly::{Assembler, PageRotation, PageSlot, SourceInput, SplitMode};
use folio::compose::{Annotation, Color, Layer, StandardFont, TileMode};
use folio::geometry::{NormalizedBox, PageGeometry, Rotation};
use folio::layout::{group_into_rows, LayoutOptions};
use folio::toolkit::{DocumentToolkit, LopdfToolkit, SourceDocument, TextExtractor};
use folio::Error;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// A PDF whose pages each hold a two-row table. Pages inherit their MediaBox
/// from the page tree; the second page is rotated.
fn table_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for n in 0..pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal("Name")]),
                Operation::new("Td", vec![150.into(), 0.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page{}", n + 1))]),
                Operation::new("Td", vec![(-150).into(), (-20).into()]),
                Operation::new("Tj", vec![Object::string_literal("Total")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if n == 1 {
            page.set("Rotate", 90);
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

#[test]
fn test_open_reads_inherited_geometry() {
    let source = LopdfToolkit.open(&table_pdf(2), None).unwrap();
    assert_eq!(source.page_count(), 2);
    let first = source.page_geometry(0).unwrap();
    assert_eq!(first, PageGeometry::LETTER);
    assert_eq!(source.page_geometry(1).unwrap().rotation, Rotation::Deg90);
}

#[test]
fn test_extracted_text_groups_into_rows() {
    let source = LopdfToolkit.open(&table_pdf(1), None).unwrap();
    let fragments = source.extract_fragments(0).unwrap();
    assert_eq!(fragments.len(), 3);
    assert_eq!(fragments[0].origin.x, 72.0);
    assert_eq!(fragments[0].origin.y, 700.0);
    assert_eq!(fragments[0].font_name, "Helvetica");

    let rows = group_into_rows(&fragments, &LayoutOptions::default());
    let cells: Vec<Vec<String>> = rows.into_iter().map(|r| r.cells).collect();
    assert_eq!(cells, vec![vec!["Name", "Page1"], vec!["Total"]]);
}

#[test]
fn test_merge_and_split_round_trip() {
    let assembler = Assembler::new(&LopdfToolkit);
    let sources = vec![
        SourceInput::new("a.pdf", table_pdf(3)).with_range("3,1"),
        SourceInput::new("broken.pdf", b"%PDF-1.4 nonsense".to_vec()),
        SourceInput::new("b.pdf", table_pdf(2)),
    ];
    let report = assembler.merge(&sources).unwrap();
    assert_eq!(report.page_count, 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "broken.pdf");

    let merged = LopdfToolkit.open(&report.output, None).unwrap();
    assert_eq!(merged.page_count(), 4);
    let texts: Vec<String> = (0..4)
        .map(|i| merged.extract_fragments(i).unwrap()[1].text.clone())
        .collect();
    // Ranges are sorted, so "3,1" appends page 1 before page 3.
    assert_eq!(texts, vec!["Page1", "Page3", "Page1", "Page2"]);
    assert_eq!(merged.page_geometry(3).unwrap().rotation, Rotation::Deg90);

    let split = assembler
        .split(&SourceInput::new("m.pdf", report.output).with_range("2-3"), SplitMode::Archive)
        .unwrap();
    assert_eq!(split.parts.len(), 2);
    let part = LopdfToolkit.open(&split.parts[1].data, None).unwrap();
    assert_eq!(part.page_count(), 1);
}

#[test]
fn test_rotate_updates_page_dictionary() {
    let report = Assembler::new(&LopdfToolkit)
        .rotate(
            &SourceInput::new("r.pdf", table_pdf(2)),
            &[PageRotation::new(0, 270), PageRotation::new(1, 90)],
        )
        .unwrap();
    assert_eq!(report.changed, vec![0]);
    let out = LopdfToolkit.open(&report.output, None).unwrap();
    assert_eq!(out.page_geometry(0).unwrap().rotation, Rotation::Deg270);
    assert_eq!(out.page_geometry(1).unwrap().rotation, Rotation::Deg90);
}

#[test]
fn test_organize_inserts_blank_a4() {
    let bytes = Assembler::new(&LopdfToolkit)
        .organize(
            &SourceInput::new("o.pdf", table_pdf(2)),
            &[PageSlot::Blank, PageSlot::rotated(1, 90)],
        )
        .unwrap();
    let out = LopdfToolkit.open(&bytes, None).unwrap();
    assert_eq!(out.page_count(), 2);
    let blank = out.page_geometry(0).unwrap();
    assert!((blank.width_pt - 595.28).abs() < 0.01);
    assert_eq!(out.page_geometry(1).unwrap().rotation, Rotation::Deg180);
}

#[test]
fn test_annotate_keeps_text_and_adds_stamp() {
    let watermark = Annotation::text("DRAFT", StandardFont::HelveticaBold, 40.0)
        .with_opacity(0.4)
        .with_tile_mode(TileMode::Mosaic)
        .with_layer(Layer::Under);
    let redaction = Annotation::fill(NormalizedBox::new(5.0, 5.0, 20.0, 5.0), Color::BLACK);

    let bytes = Assembler::new(&LopdfToolkit)
        .annotate(&SourceInput::new("w.pdf", table_pdf(2)), &[watermark, redaction])
        .unwrap();
    let out = LopdfToolkit.open(&bytes, None).unwrap();
    assert_eq!(out.page_count(), 2);

    let texts: Vec<String> = out
        .extract_fragments(0)
        .unwrap()
        .into_iter()
        .map(|f| f.text)
        .collect();
    assert_eq!(texts.iter().filter(|t| t.as_str() == "DRAFT").count(), 12);
    assert!(texts.contains(&"Total".to_string()));
}

#[test]
fn test_image_drawing_is_unsupported() {
    let stamp = Annotation::image(folio::compose::ImageSource::new("sig.png", 10.0, 10.0));
    let result =
        Assembler::new(&LopdfToolkit).annotate(&SourceInput::new("s.pdf", table_pdf(1)), &[stamp]);
    assert!(matches!(result, Err(Error::Unsupported(_))));
}

#[test]
fn test_garbage_is_not_a_pdf() {
    assert!(matches!(
        LopdfToolkit.open(b"GIF89a", None),
        Err(Error::UnknownFormat)
    ));
}

#[test]
fn test_tables_to_csv_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, table_pdf(2)).unwrap();

    let input = SourceInput::from_path(&path).unwrap();
    assert_eq!(input.name, "report.pdf");

    let sheets = folio::tables_to_csv(&path, folio::layout::SheetMode::PerPage).unwrap();
    let names: Vec<&str> = sheets.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["Page 1", "Page 2"]);
    assert!(sheets[1].1.starts_with("Name,Page2"));
}
