//! Assembly options and configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::compose::PlacementOptions;
use crate::geometry::PageGeometry;
use crate::layout::LayoutOptions;

/// How rotate values are applied to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    /// The value replaces the page rotation. 0 leaves the page alone.
    #[default]
    Absolute,
    /// The value is added to the current rotation.
    Relative,
}

impl FromStr for RotationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "absolute" | "abs" => Ok(RotationMode::Absolute),
            "relative" | "rel" => Ok(RotationMode::Relative),
            _ => Err(format!("Unknown rotation mode: {}", s)),
        }
    }
}

/// Options for the assembly pipeline.
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Size of blank pages inserted by organize
    pub blank_page: PageGeometry,

    /// How rotate values are interpreted
    pub rotation_mode: RotationMode,

    /// File name of each part in archive split mode; `{n}` is the 1-based page number
    pub archive_name_pattern: String,

    /// Placement settings for annotate and page numbering
    pub placement: PlacementOptions,

    /// Clustering settings for table and block extraction
    pub layout: LayoutOptions,
}

impl AssemblyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size of inserted blank pages.
    pub fn with_blank_page(mut self, geometry: PageGeometry) -> Self {
        self.blank_page = geometry;
        self
    }

    /// Set the rotation mode.
    pub fn with_rotation_mode(mut self, mode: RotationMode) -> Self {
        self.rotation_mode = mode;
        self
    }

    /// Add rotate values to the existing rotation.
    pub fn relative_rotation(mut self) -> Self {
        self.rotation_mode = RotationMode::Relative;
        self
    }

    /// Set the archive part name pattern.
    pub fn with_archive_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.archive_name_pattern = pattern.into();
        self
    }

    pub fn with_placement(mut self, placement: PlacementOptions) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Name of the archive part holding 1-based page `n`.
    pub fn archive_part_name(&self, n: usize) -> String {
        self.archive_name_pattern.replace("{n}", &n.to_string())
    }
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            blank_page: PageGeometry::A4,
            rotation_mode: RotationMode::Absolute,
            archive_name_pattern: "page-{n}.pdf".to_string(),
            placement: PlacementOptions::default(),
            layout: LayoutOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AssemblyOptions::default();
        assert_eq!(options.blank_page, PageGeometry::A4);
        assert_eq!(options.rotation_mode, RotationMode::Absolute);
        assert_eq!(options.archive_part_name(7), "page-7.pdf");
    }

    #[test]
    fn test_builder() {
        let options = AssemblyOptions::new()
            .relative_rotation()
            .with_archive_name_pattern("part_{n}.json");
        assert_eq!(options.rotation_mode, RotationMode::Relative);
        assert_eq!(options.archive_part_name(2), "part_2.json");
    }

    #[test]
    fn test_rotation_mode_from_str() {
        assert_eq!("Relative".parse::<RotationMode>().unwrap(), RotationMode::Relative);
        assert!("sideways".parse::<RotationMode>().is_err());
    }
}
