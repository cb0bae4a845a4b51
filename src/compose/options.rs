//! Placement options.

/// Settings for turning annotations into draw instructions.
#[derive(Debug, Clone)]
pub struct PlacementOptions {
    /// Text wider than this fraction of the displayed page width is shrunk
    pub max_text_width_fraction: f32,

    /// Mosaic grid columns
    pub mosaic_columns: usize,

    /// Mosaic grid rows
    pub mosaic_rows: usize,

    /// Image width in points when no width percentage is given
    pub default_image_width_pt: f32,
}

impl PlacementOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum text width as a fraction of the page width.
    pub fn with_max_text_width(mut self, fraction: f32) -> Self {
        self.max_text_width_fraction = fraction;
        self
    }

    /// Set the mosaic grid.
    pub fn with_mosaic_grid(mut self, columns: usize, rows: usize) -> Self {
        self.mosaic_columns = columns.max(1);
        self.mosaic_rows = rows.max(1);
        self
    }

    /// Set the fallback image width.
    pub fn with_default_image_width(mut self, width_pt: f32) -> Self {
        self.default_image_width_pt = width_pt;
        self
    }

    /// Instructions emitted per page in mosaic mode.
    pub fn mosaic_cells(&self) -> usize {
        self.mosaic_columns * self.mosaic_rows
    }
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            max_text_width_fraction: 0.9,
            mosaic_columns: 3,
            mosaic_rows: 4,
            default_image_width_pt: 24.0,
        }
    }
}
