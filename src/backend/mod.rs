//! # Rendering Backends
//!
//! The layout core talks to a backend through five operations and nothing
//! else: draw an image, draw a text block, draw a table, finish the current
//! page, and serialize the document. Two implementations ship with the crate:
//!
//! - [`PdfBackend`](crate::pdf::PdfBackend) writes a PDF file
//! - [`RecordingBackend`] keeps a log of every call, for dry runs and tests

mod recording;

pub use recording::{DrawOp, RecordingBackend};

use crate::component::{ParagraphStyle, TableBlock};
use crate::error::Result;
use crate::geometry::Rect;

pub trait Backend {
    /// Draw the image at `source` stretched to `rect`.
    fn draw_image(&mut self, rect: Rect, source: &str) -> Result<()>;

    /// Draw `text` wrapped inside `rect`, starting at its top edge. Returns
    /// the height used.
    fn draw_text(&mut self, rect: Rect, text: &str, style: &ParagraphStyle) -> Result<f64>;

    /// Draw a compiled table hanging from the top edge of `rect`. Returns
    /// the height used.
    fn draw_table(&mut self, rect: Rect, table: &TableBlock) -> Result<f64>;

    /// Close the current page of `(width, height)` points.
    fn finish_page(&mut self, page_size: (f64, f64)) -> Result<()>;

    /// Serialize every finished page.
    fn save(&mut self) -> Result<Vec<u8>>;
}
