//! Clustering options and configuration.

/// Thresholds for row grouping and block merging.
///
/// Factors are multiplied by the font size of the fragment being tested, so the
/// same options work for 8pt footnotes and 40pt titles.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Baselines closer than `factor x row font size` share a row
    pub row_tolerance_factor: f32,

    /// Horizontal gaps below `factor x font size` merge into one block
    pub merge_gap_factor: f32,

    /// Gaps above `factor x font size` get a space when merged
    pub space_gap_factor: f32,

    /// Font sizes must differ by less than this (points) to merge
    pub max_font_size_delta: f32,

    /// Smallest output font size (points)
    pub min_font_size: f32,

    /// Largest output font size (points)
    pub max_font_size: f32,

    /// Block height as a multiple of its font size
    pub line_height_factor: f32,

    /// Cluster pages in parallel
    pub parallel: bool,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row tolerance factor.
    pub fn with_row_tolerance(mut self, factor: f32) -> Self {
        self.row_tolerance_factor = factor;
        self
    }

    /// Set the merge gap factor.
    pub fn with_merge_gap(mut self, factor: f32) -> Self {
        self.merge_gap_factor = factor;
        self
    }

    /// Set the space gap factor.
    pub fn with_space_gap(mut self, factor: f32) -> Self {
        self.space_gap_factor = factor;
        self
    }

    /// Set the output font size clamp.
    pub fn with_font_clamp(mut self, min: f32, max: f32) -> Self {
        self.min_font_size = min.min(max);
        self.max_font_size = max.max(min);
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Clamp a measured font size into the output range.
    pub fn clamp_font_size(&self, size: f32) -> f32 {
        if size.is_finite() {
            size.clamp(self.min_font_size, self.max_font_size)
        } else {
            self.min_font_size
        }
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            row_tolerance_factor: 0.5,
            merge_gap_factor: 2.0,
            space_gap_factor: 0.25,
            max_font_size_delta: 2.0,
            min_font_size: 6.0,
            max_font_size: 100.0,
            line_height_factor: 1.2,
            parallel: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_options_builder() {
        let options = LayoutOptions::new()
            .with_row_tolerance(0.3)
            .with_font_clamp(100.0, 8.0)
            .sequential();

        assert_eq!(options.row_tolerance_factor, 0.3);
        assert_eq!(options.min_font_size, 8.0);
        assert_eq!(options.max_font_size, 100.0);
        assert!(!options.parallel);
    }

    #[test]
    fn test_clamp_font_size() {
        let options = LayoutOptions::default();
        assert_eq!(options.clamp_font_size(3.0), 6.0);
        assert_eq!(options.clamp_font_size(12.0), 12.0);
        assert_eq!(options.clamp_font_size(250.0), 100.0);
        assert_eq!(options.clamp_font_size(f32::NAN), 6.0);
    }
}
