//! Spreadsheet output for table mode.

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::rows::TableRow;
use crate::error::Result;

/// Name of the sheet produced in merged mode.
pub const MERGED_SHEET_NAME: &str = "Merged Data";

/// How per-page rows are split across sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SheetMode {
    /// One sheet per page, named `Page N`
    #[default]
    PerPage,
    /// Every page in one sheet, pages separated by an empty row
    Merged,
}

impl std::str::FromStr for SheetMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per-page" | "pages" | "separate" => Ok(SheetMode::PerPage),
            "merged" | "merge" | "single" => Ok(SheetMode::Merged),
            _ => Err(format!("Unknown sheet mode: {}", s)),
        }
    }
}

/// Table rows of one document page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageRows {
    /// Zero-based page index in the source document
    pub page_index: usize,
    pub rows: Vec<TableRow>,
}

impl PageRows {
    pub fn new(page_index: usize, rows: Vec<TableRow>) -> Self {
        Self { page_index, rows }
    }
}

/// A named grid of rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSheet {
    pub name: String,
    pub rows: Vec<TableRow>,
}

impl TableSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Widest row, in cells.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(TableRow::len).max().unwrap_or(0)
    }

    /// Write the sheet as CSV. Rows keep their own lengths.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        for row in &self.rows {
            csv.write_record(&row.cells)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Render the sheet as a CSV string.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| crate::error::Error::Serialization(e.to_string()))
    }
}

/// Arrange per-page rows into sheets.
///
/// Per-page mode names each sheet after its 1-based document page, so a
/// selection of pages 3 and 4 yields `Page 3` and `Page 4`. Merged mode
/// appends every page to one sheet, each followed by an empty row.
pub fn build_sheets(pages: &[PageRows], mode: SheetMode) -> Vec<TableSheet> {
    match mode {
        SheetMode::PerPage => pages
            .iter()
            .map(|page| TableSheet {
                name: format!("Page {}", page.page_index + 1),
                rows: page.rows.clone(),
            })
            .collect(),
        SheetMode::Merged => {
            let mut sheet = TableSheet::new(MERGED_SHEET_NAME);
            for page in pages {
                sheet.rows.extend(page.rows.iter().cloned());
                sheet.rows.push(TableRow::default());
            }
            vec![sheet]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> TableRow {
        TableRow::new(cells.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_per_page_sheets() {
        let pages = vec![
            PageRows::new(0, vec![row(&["a", "b"])]),
            PageRows::new(1, vec![row(&["c"])]),
        ];
        let sheets = build_sheets(&pages, SheetMode::PerPage);
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Page 1");
        assert_eq!(sheets[1].name, "Page 2");
        assert_eq!(sheets[0].column_count(), 2);
    }

    #[test]
    fn test_sheet_names_follow_document_pages() {
        let pages = vec![
            PageRows::new(2, vec![row(&["cell3"])]),
            PageRows::new(3, vec![row(&["cell4"])]),
        ];
        let sheets = build_sheets(&pages, SheetMode::PerPage);
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Page 3", "Page 4"]);
    }

    #[test]
    fn test_merged_sheet_separates_pages() {
        let pages = vec![
            PageRows::new(0, vec![row(&["a"])]),
            PageRows::new(1, vec![row(&["b"]), row(&["c"])]),
        ];
        let sheets = build_sheets(&pages, SheetMode::Merged);
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, MERGED_SHEET_NAME);
        assert_eq!(sheets[0].rows.len(), 5);
        assert!(sheets[0].rows[1].is_empty());
        assert!(sheets[0].rows[4].is_empty());
    }

    #[test]
    fn test_csv_is_flexible_and_quoted() {
        let mut sheet = TableSheet::new("Page 1");
        sheet.rows = vec![row(&["Name", "Note"]), row(&["a,b"])];
        let csv = sheet.to_csv_string().unwrap();
        assert_eq!(csv, "Name,Note\n\"a,b\"\n");
    }

    #[test]
    fn test_sheet_mode_from_str() {
        assert_eq!("merged".parse::<SheetMode>().unwrap(), SheetMode::Merged);
        assert_eq!("Per-Page".parse::<SheetMode>().unwrap(), SheetMode::PerPage);
        assert!("x".parse::<SheetMode>().is_err());
    }
}
