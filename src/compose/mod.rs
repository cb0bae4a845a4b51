//! Placement of watermarks, stamps, signatures, redactions and page numbers.
//!
//! Annotations are described in normalized space against the displayed page.
//! The [`Compositor`] resolves them per page into [`DrawInstruction`]s in the
//! page's native coordinates, ready for a document toolkit to paint.

mod annotation;
mod instruction;
mod metrics;
mod options;
mod page_numbers;
mod placer;

pub use annotation::{Anchor, Annotation, AnnotationContent, Color, ImageSource, Layer, TileMode};
pub use instruction::{DrawInstruction, DrawKind};
pub use metrics::{StandardFont, StandardFontMetrics, TextMeasurer};
pub use options::PlacementOptions;
pub use page_numbers::{PageNumberFormat, PageNumberOptions, PageNumberPosition, PageTotal};
pub use placer::{place, Compositor};
