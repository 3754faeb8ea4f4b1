//! # Layout Configuration
//!
//! Page size and default paddings are an explicit value handed to
//! [`Document::new`](crate::layout::Document::new) instead of module-level
//! constants. Every page in a document shares the same size; paddings can be
//! overridden per page.

use serde::{Deserialize, Serialize};

use crate::units::Length;

/// Configuration shared by every page of a document.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub page_size: PageSize,
    pub orientation: Orientation,

    /// Default distance between the top page edge and the first row.
    pub top_padding: Length,

    /// Default distance between the left page edge and the first column.
    /// The same amount is kept free on the right.
    pub left_padding: Length,

    /// Inset between a column's top edge and its first component.
    pub frame_top_padding: Length,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            orientation: Orientation::default(),
            top_padding: Length::cm(2.0),
            left_padding: Length::cm(2.0),
            frame_top_padding: Length::pt(6.0),
        }
    }
}

impl LayoutConfig {
    /// Page (width, height) in points. Landscape puts the long side horizontal.
    pub fn page_dimensions(&self) -> (f64, f64) {
        let (w, h) = self.page_size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (w.max(h), w.min(h)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}
