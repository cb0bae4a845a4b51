//! Annotation model: what to stamp and where, in normalized space.

use serde::{Deserialize, Serialize};

use super::metrics::StandardFont;
use crate::geometry::{NormalizedBox, NormalizedPoint};

/// An RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or a basic color name. Anything else is black.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::from_hex(hex).unwrap_or(Self::BLACK);
        }
        match s.to_lowercase().as_str() {
            "red" => Self::RED,
            "blue" => Self::BLUE,
            "gray" | "grey" => Self::GRAY,
            "white" => Self::WHITE,
            "yellow" => Self::YELLOW,
            _ => Self::BLACK,
        }
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Raster image metadata. Pixel data stays with the caller; instructions
/// refer to it by `resource`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Caller-defined handle (file name, resource key)
    pub resource: String,
    /// Intrinsic width in pixels
    pub width_px: f32,
    /// Intrinsic height in pixels
    pub height_px: f32,
}

impl ImageSource {
    pub fn new(resource: impl Into<String>, width_px: f32, height_px: f32) -> Self {
        Self {
            resource: resource.into(),
            width_px,
            height_px,
        }
    }

    /// Height over width, or `None` for degenerate images.
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.width_px > 0.0 && self.height_px.is_finite() && self.height_px >= 0.0 {
            Some(self.height_px / self.width_px)
        } else {
            None
        }
    }
}

/// What an annotation draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnnotationContent {
    /// A line of text (watermark, stamp, page number)
    Text {
        text: String,
        font: StandardFont,
        font_size_pt: f32,
        color: Color,
    },
    /// A raster image (logo watermark, signature)
    Image {
        image: ImageSource,
        /// Width as a percentage of the displayed page width
        width_pct: Option<f32>,
    },
    /// A solid rectangle (redaction, highlight)
    Fill { color: Color },
}

/// Where an annotation goes on the displayed page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Point(NormalizedPoint),
    Box(NormalizedBox),
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::Point(NormalizedPoint::center())
    }
}

impl Anchor {
    /// The point the annotation is centered on.
    pub fn center(&self) -> NormalizedPoint {
        match self {
            Anchor::Point(p) => *p,
            Anchor::Box(b) => b.center(),
        }
    }
}

/// Whether the annotation sits above or below the page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    #[default]
    Over,
    Under,
}

/// Repetition across the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileMode {
    #[default]
    None,
    Mosaic,
}

/// A watermark, stamp, signature or redaction mark, positioned in
/// normalized space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub content: AnnotationContent,
    #[serde(default)]
    pub anchor: Anchor,
    /// Clockwise rotation on screen, degrees
    #[serde(default)]
    pub rotation_deg: f32,
    /// Opacity in `0.0..=1.0`
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub layer: Layer,
    #[serde(default)]
    pub tile_mode: TileMode,
}

fn default_opacity() -> f32 {
    1.0
}

impl Annotation {
    fn with_content(content: AnnotationContent) -> Self {
        Self {
            content,
            anchor: Anchor::default(),
            rotation_deg: 0.0,
            opacity: 1.0,
            layer: Layer::Over,
            tile_mode: TileMode::None,
        }
    }

    /// A text annotation centered on the page.
    pub fn text(text: impl Into<String>, font: StandardFont, font_size_pt: f32) -> Self {
        Self::with_content(AnnotationContent::Text {
            text: text.into(),
            font,
            font_size_pt,
            color: Color::BLACK,
        })
    }

    /// An image annotation centered on the page.
    pub fn image(image: ImageSource) -> Self {
        Self::with_content(AnnotationContent::Image {
            image,
            width_pct: None,
        })
    }

    /// A filled rectangle covering `area`.
    pub fn fill(area: NormalizedBox, color: Color) -> Self {
        Self::with_content(AnnotationContent::Fill { color }).with_anchor(Anchor::Box(area))
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation_deg = degrees;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_tile_mode(mut self, tile_mode: TileMode) -> Self {
        self.tile_mode = tile_mode;
        self
    }

    /// Set the text color. No effect on images.
    pub fn with_color(mut self, new_color: Color) -> Self {
        match &mut self.content {
            AnnotationContent::Text { color, .. } | AnnotationContent::Fill { color } => {
                *color = new_color
            }
            AnnotationContent::Image { .. } => {}
        }
        self
    }

    /// Set the image width percentage. No effect on text or fills.
    pub fn with_width_pct(mut self, pct: f32) -> Self {
        if let AnnotationContent::Image { width_pct, .. } = &mut self.content {
            *width_pct = Some(pct);
        }
        self
    }

    /// Opacity clamped to `0.0..=1.0`; non-finite values mean fully opaque.
    pub fn effective_opacity(&self) -> f32 {
        if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}
