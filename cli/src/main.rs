//! folio CLI - PDF page assembly and annotation tool

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use folio::assembly::inspect_all;
use folio::compose::{
    Color, Layer, PageNumberFormat, PageNumberOptions, PageNumberPosition, PageTotal, StandardFont,
    TileMode,
};
use folio::geometry::NormalizedBox;
use folio::layout::{build_sheets, slide_boxes, SheetMode, SlideLayout};
use folio::{
    Annotation, Assembler, AssemblyOptions, LopdfToolkit, PageSlot, SourceInput, SplitMode,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Merge, split, rotate and annotate PDF documents", long_about = None)]
struct Cli {
    /// Password for encrypted inputs
    #[arg(long, global = true, env = "FOLIO_PASSWORD")]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show page count and page sizes
    Info {
        /// Input PDF files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Merge PDFs; append @RANGE to a file to pick pages (e.g. "a.pdf@1-3,5")
    Merge {
        /// Input PDF files
        #[arg(value_name = "FILE[@RANGE]", required = true)]
        inputs: Vec<String>,

        /// Output file
        #[arg(short, long, value_name = "FILE", default_value = "merged.pdf")]
        output: PathBuf,
    },

    /// Extract pages into a new PDF or a zip of single pages
    Split {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Write one PDF per page into a zip archive
        #[arg(long)]
        archive: bool,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rotate pages
    Rotate {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Rotation in degrees
        #[arg(short, long, allow_hyphen_values = true)]
        degrees: i64,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Add to the current rotation instead of replacing it
        #[arg(long)]
        relative: bool,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Reorder pages, e.g. "3,1,blank,2:90"
    Organize {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// New page order: page numbers, "blank", and PAGE:DEGREES to turn a page
        #[arg(long, allow_hyphen_values = true)]
        order: String,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Stamp a text watermark
    Watermark {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Watermark text
        #[arg(short, long)]
        text: String,

        /// Font family hint (Helvetica, Times, Courier)
        #[arg(long, default_value = "Helvetica")]
        font: String,

        /// Font size in points
        #[arg(long, default_value = "48")]
        font_size: f32,

        /// Color as #rrggbb or a name
        #[arg(long, default_value = "gray")]
        color: String,

        /// Opacity between 0 and 1
        #[arg(long, default_value = "0.3")]
        opacity: f32,

        /// Clockwise rotation in degrees
        #[arg(long, default_value = "45", allow_hyphen_values = true)]
        rotation: f32,

        /// Tile the watermark in a grid
        #[arg(long)]
        mosaic: bool,

        /// Place the watermark under the page content
        #[arg(long)]
        under: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Paint opaque boxes over areas given in percent of the page
    Redact {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Area as X,Y,WIDTH,HEIGHT in percent, origin top-left
        #[arg(long = "box", value_name = "X,Y,W,H", required = true)]
        boxes: Vec<String>,

        /// Fill color
        #[arg(long, default_value = "black")]
        color: String,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Add page numbers
    PageNumbers {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Label format: n, page-n, n-of-m, page-n-of-m
        #[arg(long, default_value = "n-of-m")]
        format: PageNumberFormat,

        /// Label position, e.g. bottom-center or top-right
        #[arg(long, default_value = "bottom-center")]
        position: PageNumberPosition,

        /// Distance from the page edges in points
        #[arg(long, default_value = "20")]
        margin: f32,

        /// Font size in points
        #[arg(long, default_value = "12")]
        font_size: f32,

        /// Page range to number (e.g., "3-10")
        #[arg(long)]
        pages: Option<String>,

        /// Number shown on the first numbered page
        #[arg(long, default_value = "1")]
        start_from: usize,

        /// What "of m" counts: document or selection
        #[arg(long, default_value = "document")]
        total: PageTotal,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rebuild tables from page text
    Table {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: TableFormat,

        /// Put every page into one sheet
        #[arg(long)]
        merged: bool,

        /// Output directory for CSV sheets or JSON file (stdout if not specified)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Rebuild styled text blocks from page text
    Blocks {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Emit slide text boxes in inches instead of blocks
        #[arg(long)]
        slides: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TableFormat {
    /// One CSV file per sheet
    Csv,
    /// Rows as JSON
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let password = cli.password.as_deref();

    let result = match cli.command {
        Commands::Info { inputs } => cmd_info(&inputs, password),
        Commands::Merge { inputs, output } => cmd_merge(&inputs, &output, password),
        Commands::Split {
            input,
            pages,
            archive,
            output,
        } => cmd_split(&input, pages, archive, output.as_deref(), password),
        Commands::Rotate {
            input,
            degrees,
            pages,
            relative,
            output,
        } => cmd_rotate(&input, degrees, pages, relative, output.as_deref(), password),
        Commands::Organize {
            input,
            order,
            output,
        } => cmd_organize(&input, &order, output.as_deref(), password),
        Commands::Watermark {
            input,
            text,
            font,
            font_size,
            color,
            opacity,
            rotation,
            mosaic,
            under,
            pages,
            output,
        } => {
            let annotation = Annotation::text(text, StandardFont::watermark(&font), font_size)
                .with_color(Color::parse(&color))
                .with_opacity(opacity)
                .with_rotation(rotation)
                .with_tile_mode(if mosaic { TileMode::Mosaic } else { TileMode::None })
                .with_layer(if under { Layer::Under } else { Layer::Over });
            cmd_annotate(&input, vec![annotation], pages, output.as_deref(), password)
        }
        Commands::Redact {
            input,
            boxes,
            color,
            pages,
            output,
        } => boxes
            .iter()
            .map(|b| parse_box(b).map(|area| Annotation::fill(area, Color::parse(&color))))
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
            .and_then(|annotations| {
                cmd_annotate(&input, annotations, pages, output.as_deref(), password)
            }),
        Commands::PageNumbers {
            input,
            format,
            position,
            margin,
            font_size,
            pages,
            start_from,
            total,
            output,
        } => {
            let mut options = PageNumberOptions::default()
                .with_format(format)
                .with_position(position)
                .with_margin(margin)
                .with_range(pages.unwrap_or_default())
                .with_start_from(start_from)
                .with_total(total);
            options.font_size_pt = font_size;
            cmd_page_numbers(&input, &options, output.as_deref(), password)
        }
        Commands::Table {
            input,
            pages,
            format,
            merged,
            output,
        } => cmd_table(&input, pages, format, merged, output.as_deref(), password),
        Commands::Blocks {
            input,
            pages,
            slides,
            output,
        } => cmd_blocks(&input, pages, slides, output.as_deref(), password),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load(path: &Path, pages: Option<String>, password: Option<&str>) -> folio::Result<SourceInput> {
    let mut source = SourceInput::from_path(path)?.with_range(pages.unwrap_or_default());
    if let Some(pw) = password {
        source = source.with_password(pw);
    }
    Ok(source)
}

/// `input.pdf` becomes `input-<suffix>.pdf` next to it.
fn default_output(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{}-{}.{}", stem, suffix, extension))
}

fn save(path: &Path, data: &[u8]) -> CliResult {
    fs::write(path, data)?;
    println!("{} {}", "Saved to".green(), path.display());
    Ok(())
}

fn progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {msg}") {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn cmd_info(inputs: &[PathBuf], password: Option<&str>) -> CliResult {
    let sources = inputs
        .iter()
        .map(|path| load(path, None, password))
        .collect::<folio::Result<Vec<_>>>()?;

    for result in inspect_all(&LopdfToolkit, &sources) {
        match result {
            Ok(info) => {
                println!("{}", "Document Information".cyan().bold());
                println!("{}", "─".repeat(40).dimmed());
                println!("{}: {}", "File".bold(), info.name);
                println!("{}: {}", "Pages".bold(), info.page_count);
                for (i, page) in info.pages.iter().enumerate() {
                    println!(
                        "  {} {:>4}: {:.1} x {:.1} pt, {}",
                        "├─".dimmed(),
                        i + 1,
                        page.width_pt,
                        page.height_pt,
                        page.rotation
                    );
                }
                println!();
            }
            Err(skipped) => {
                eprintln!(
                    "{} {}: {}",
                    "Skipped".yellow().bold(),
                    skipped.name,
                    skipped.reason
                );
            }
        }
    }
    Ok(())
}

/// Split `file.pdf@1-3` into path and range.
fn parse_merge_input(arg: &str) -> (PathBuf, Option<String>) {
    match arg.rsplit_once('@') {
        Some((path, range)) if !path.is_empty() => (PathBuf::from(path), Some(range.to_string())),
        _ => (PathBuf::from(arg), None),
    }
}

fn cmd_merge(inputs: &[String], output: &Path, password: Option<&str>) -> CliResult {
    let pb = progress(inputs.len() as u64 + 1);
    let mut sources = Vec::with_capacity(inputs.len());
    for arg in inputs {
        let (path, range) = parse_merge_input(arg);
        pb.set_message(format!("Reading {}", path.display()));
        sources.push(load(&path, range, password)?);
        pb.inc(1);
    }

    pb.set_message("Merging...");
    let report = Assembler::new(&LopdfToolkit).merge(&sources)?;
    pb.inc(1);
    pb.finish_with_message("Done!");

    for skipped in &report.skipped {
        eprintln!(
            "{} {}: {}",
            "Skipped".yellow().bold(),
            skipped.name,
            skipped.reason
        );
    }
    println!("{} {} pages", "Merged".green(), report.page_count);
    save(output, &report.output)
}

fn cmd_split(
    input: &Path,
    pages: Option<String>,
    archive: bool,
    output: Option<&Path>,
    password: Option<&str>,
) -> CliResult {
    let source = load(input, pages, password)?;
    let assembler = Assembler::new(&LopdfToolkit);

    if !archive {
        let split = assembler.split(&source, SplitMode::Single)?;
        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output(input, "split", "pdf"));
        for part in &split.parts {
            save(&path, &part.data)?;
        }
        return Ok(());
    }

    let split = assembler.split(&source, SplitMode::Archive)?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, "pages", "zip"));

    let pb = progress(split.parts.len() as u64);
    let mut zip = zip::ZipWriter::new(fs::File::create(&path)?);
    let options: zip::write::FileOptions<()> = zip::write::FileOptions::default();
    for part in &split.parts {
        pb.set_message(part.name.clone());
        zip.start_file(part.name.as_str(), options)?;
        zip.write_all(&part.data)?;
        pb.inc(1);
    }
    zip.finish()?;
    pb.finish_with_message("Done!");

    println!(
        "{} {} pages to {}",
        "Saved".green(),
        split.parts.len(),
        path.display()
    );
    Ok(())
}

fn cmd_rotate(
    input: &Path,
    degrees: i64,
    pages: Option<String>,
    relative: bool,
    output: Option<&Path>,
    password: Option<&str>,
) -> CliResult {
    let source = load(input, pages, password)?;
    let mut options = AssemblyOptions::default();
    if relative {
        options = options.relative_rotation();
    }

    let report = Assembler::with_options(&LopdfToolkit, options).rotate_range(&source, degrees)?;
    println!(
        "{} {} pages ({} unchanged)",
        "Rotated".green(),
        report.changed.len(),
        report.unchanged
    );
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, "rotated", "pdf"));
    save(&path, &report.output)
}

/// Parse an organize order such as `3,1,blank,2:90`.
fn parse_order(order: &str) -> Result<Vec<PageSlot>, String> {
    order
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| {
            if token.eq_ignore_ascii_case("blank") {
                return Ok(PageSlot::Blank);
            }
            let (page, delta) = match token.split_once(':') {
                Some((page, delta)) => (page, delta),
                None => (token, "0"),
            };
            let page: usize = page
                .trim()
                .parse()
                .map_err(|_| format!("Invalid page in order: {}", token))?;
            let delta: i64 = delta
                .trim()
                .parse()
                .map_err(|_| format!("Invalid rotation in order: {}", token))?;
            if page == 0 {
                return Err(format!("Page numbers start at 1: {}", token));
            }
            Ok(PageSlot::rotated(page - 1, delta))
        })
        .collect()
}

fn cmd_organize(
    input: &Path,
    order: &str,
    output: Option<&Path>,
    password: Option<&str>,
) -> CliResult {
    let slots = parse_order(order)?;
    let source = load(input, None, password)?;
    let data = Assembler::new(&LopdfToolkit).organize(&source, &slots)?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, "organized", "pdf"));
    save(&path, &data)
}

/// Parse `x,y,w,h` percentages.
fn parse_box(value: &str) -> Result<NormalizedBox, String> {
    let parts = value
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("Invalid box: {}", value))?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(NormalizedBox::new(*x, *y, *w, *h)),
        _ => Err(format!("Box needs four values X,Y,W,H: {}", value)),
    }
}

fn cmd_annotate(
    input: &Path,
    annotations: Vec<Annotation>,
    pages: Option<String>,
    output: Option<&Path>,
    password: Option<&str>,
) -> CliResult {
    let source = load(input, pages, password)?;
    let data = Assembler::new(&LopdfToolkit).annotate(&source, &annotations)?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, "annotated", "pdf"));
    save(&path, &data)
}

fn cmd_page_numbers(
    input: &Path,
    options: &PageNumberOptions,
    output: Option<&Path>,
    password: Option<&str>,
) -> CliResult {
    let source = load(input, None, password)?;
    let data = Assembler::new(&LopdfToolkit).number_pages(&source, options)?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, "numbered", "pdf"));
    save(&path, &data)
}

fn cmd_table(
    input: &Path,
    pages: Option<String>,
    format: TableFormat,
    merged: bool,
    output: Option<&Path>,
    password: Option<&str>,
) -> CliResult {
    let source = load(input, pages, password)?;
    let rows = Assembler::new(&LopdfToolkit).extract_rows(&source)?;
    let mode = if merged {
        SheetMode::Merged
    } else {
        SheetMode::PerPage
    };
    let sheets = build_sheets(&rows, mode);

    match format {
        TableFormat::Json => {
            let json = serde_json::to_string_pretty(&sheets)?;
            match output {
                Some(path) => save(path, json.as_bytes())?,
                None => println!("{}", json),
            }
        }
        TableFormat::Csv => match output {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                for sheet in &sheets {
                    let path = dir.join(format!("{}.csv", sheet.name.replace(' ', "_")));
                    sheet.write_csv(fs::File::create(&path)?)?;
                    println!("{} {}", "Saved to".green(), path.display());
                }
            }
            None => {
                for sheet in &sheets {
                    println!("{}", format!("# {}", sheet.name).cyan().bold());
                    print!("{}", sheet.to_csv_string()?);
                }
            }
        },
    }
    Ok(())
}

fn cmd_blocks(
    input: &Path,
    pages: Option<String>,
    slides: bool,
    output: Option<&Path>,
    password: Option<&str>,
) -> CliResult {
    let source = load(input, pages, password)?;
    let pages = Assembler::new(&LopdfToolkit).extract_blocks(&source)?;

    let json = if slides {
        let geometries: Vec<_> = pages.iter().map(|p| p.geometry).collect();
        let boxes: Vec<_> = pages
            .iter()
            .map(|p| slide_boxes(&p.blocks, &p.geometry))
            .collect();
        serde_json::to_string_pretty(&serde_json::json!({
            "layout": SlideLayout::from_pages(&geometries),
            "slides": boxes,
        }))?
    } else {
        serde_json::to_string_pretty(&pages)?
    };

    match output {
        Some(path) => save(path, json.as_bytes()),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn cmd_version() {
    println!("{} {}", "folio".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF page assembly and annotation tool");
    println!();
    println!("License: MIT");
}
