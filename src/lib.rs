//! # Folio
//!
//! A banded report layout engine that writes PDF.
//!
//! A report is pages of horizontal rows, rows of side-by-side columns, and
//! columns of drawable components. Nothing carries coordinates: each row and
//! column derives its rectangle from its own size, its position among its
//! siblings and the page padding. Layouts that do not fit are rejected while
//! the tree is being built, not when it is drawn.
//!
//! Tables go through a style compiler that turns data plus a few flags (zebra
//! stripes, a totals line, negative highlighting, currency columns) into an
//! ordered rule list and a matrix of display strings.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    Report description, lengths in a chosen unit
//!       ↓
//!   [layout]   Document/Page/Row/Column tree, eager geometry
//!       ↓        ([geometry] does the arithmetic, [table] compiles tables)
//!   [backend]  Five drawing operations
//!       ↓
//!   [pdf]      Serialize to PDF bytes
//! ```

pub mod backend;
pub mod component;
pub mod config;
pub mod error;
pub mod geometry;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod table;
pub mod units;

pub use error::{FolioError, Result};
pub use layout::{Column, Document, Page, Row};
pub use model::{build_document, ReportSpec};
pub use units::{Length, Unit};

/// Render a report to PDF bytes.
///
/// This is the primary entry point. Builds the layout tree (failing on the
/// first layout error) and draws it with the PDF backend.
pub fn render(spec: &ReportSpec) -> Result<Vec<u8>> {
    build_document(spec)?.to_pdf()
}

/// Render a report described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>> {
    let spec: ReportSpec = serde_json::from_str(json)?;
    render(&spec)
}
