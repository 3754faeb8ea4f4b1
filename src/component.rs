//! # Drawable Components
//!
//! Everything a column can host, plus the page-level logo. The variants share
//! a single capability: draw into a rectangle through a [`Backend`] and report
//! how much vertical space was used. Each variant keeps its own strongly
//! typed payload.

use serde::Serialize;

use crate::backend::Backend;
use crate::error::{FolioError, Result};
use crate::geometry::Rect;
use crate::style::{Color, StandardFont, TextAlign};
use crate::table::{compile, DataTable, TableFlags, TableStyleSpec};
use crate::units::Length;

/// A drawable item bound to one column (or, for [`Component::Logo`], to a page).
#[derive(Debug, Clone)]
pub enum Component {
    Image(Image),
    Paragraph(Paragraph),
    Spacer(Spacer),
    Table(TableBlock),
    Logo(Logo),
}

impl Component {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Component::Image(_) => "image",
            Component::Paragraph(_) => "paragraph",
            Component::Spacer(_) => "spacer",
            Component::Table(_) => "table",
            Component::Logo(_) => "logo",
        }
    }

    /// Draw into `area`, the part of a column frame not used yet, and return
    /// the height consumed. Logos ignore `area` and place themselves against
    /// the full page.
    pub fn draw(&self, area: Rect, page_size: (f64, f64), backend: &mut dyn Backend) -> Result<f64> {
        match self {
            Component::Image(image) => {
                let rect = Rect::new(area.x, area.top() - image.height, image.width, image.height);
                backend.draw_image(rect, &image.source)?;
                Ok(image.height)
            }
            Component::Paragraph(p) => backend.draw_text(area, &p.text, &p.style),
            Component::Spacer(s) => Ok(s.height),
            Component::Table(t) => backend.draw_table(area, t),
            Component::Logo(logo) => {
                backend.draw_image(logo.rect(page_size), &logo.source)?;
                Ok(0.0)
            }
        }
    }
}

impl From<Image> for Component {
    fn from(v: Image) -> Self {
        Component::Image(v)
    }
}

impl From<Paragraph> for Component {
    fn from(v: Paragraph) -> Self {
        Component::Paragraph(v)
    }
}

impl From<Spacer> for Component {
    fn from(v: Spacer) -> Self {
        Component::Spacer(v)
    }
}

impl From<TableBlock> for Component {
    fn from(v: TableBlock) -> Self {
        Component::Table(v)
    }
}

impl From<Logo> for Component {
    fn from(v: Logo) -> Self {
        Component::Logo(v)
    }
}

/// An image drawn at a fixed size, top-left aligned in its area.
#[derive(Debug, Clone)]
pub struct Image {
    /// File path, `data:image/...` URI or raw base64.
    pub source: String,
    pub width: f64,
    pub height: f64,
}

impl Image {
    pub fn new(source: impl Into<String>, width: Length, height: Length) -> Self {
        Self {
            source: source.into(),
            width: width.points(),
            height: height.points(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParagraphStyle {
    pub font: StandardFont,
    pub font_size: f64,
    /// Baseline-to-baseline distance.
    pub leading: f64,
    pub color: Color,
    pub align: TextAlign,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            font: StandardFont::Helvetica,
            font_size: 10.0,
            leading: 12.0,
            color: Color::BLACK,
            align: TextAlign::Left,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Paragraph {
    pub text: String,
    pub style: ParagraphStyle,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: ParagraphStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ParagraphStyle) -> Self {
        self.style = style;
        self
    }

    /// Height the paragraph needs when wrapped to `width`.
    pub fn height_for(&self, width: f64) -> f64 {
        wrap_text(&self.text, self.style.font, self.style.font_size, width).len() as f64
            * self.style.leading
    }
}

/// Fixed vertical gap between components.
#[derive(Debug, Clone, Copy)]
pub struct Spacer {
    pub height: f64,
}

impl Spacer {
    pub fn new(height: Length) -> Self {
        Self {
            height: height.points(),
        }
    }
}

/// A compiled table ready to draw.
#[derive(Debug, Clone)]
pub struct TableBlock {
    pub spec: TableStyleSpec,
    /// Explicit column widths in points, one per column. Set through
    /// [`TableBlock::with_column_widths`] so the count is checked.
    column_widths: Option<Vec<f64>>,
    pub font_size: f64,
    pub cell_padding: f64,
}

impl TableBlock {
    /// Compile `data` with `flags` into a drawable table.
    pub fn from_data(data: &DataTable, flags: &TableFlags) -> Result<Self> {
        Ok(Self::new(compile(data, flags)?))
    }

    pub fn new(spec: TableStyleSpec) -> Self {
        Self {
            spec,
            column_widths: None,
            font_size: 9.0,
            cell_padding: 3.0,
        }
    }

    pub fn with_column_widths(mut self, widths: Vec<Length>) -> Result<Self> {
        if widths.len() != self.spec.column_count() {
            return Err(FolioError::Configuration(format!(
                "{} column widths given for a table with {} columns",
                widths.len(),
                self.spec.column_count()
            )));
        }
        self.column_widths = Some(widths.into_iter().map(Length::points).collect());
        Ok(self)
    }

    pub fn column_widths(&self) -> Option<&[f64]> {
        self.column_widths.as_deref()
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn row_height(&self) -> f64 {
        self.font_size * 1.2 + 2.0 * self.cell_padding
    }

    pub fn height(&self) -> f64 {
        self.row_height() * self.spec.row_count() as f64
    }

    /// Resolved column widths for an area `available` points wide. One width
    /// per column of `spec`; columns share the area equally unless explicit
    /// widths matching the column count were given.
    pub fn resolve_column_widths(&self, available: f64) -> Vec<f64> {
        let cols = self.spec.column_count();
        match &self.column_widths {
            Some(widths) if widths.len() == cols => widths.clone(),
            _ => vec![available / cols.max(1) as f64; cols],
        }
    }
}

/// Corner of the page a logo is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoAnchor {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}

impl std::str::FromStr for LogoAnchor {
    type Err = FolioError;

    /// Parse `"top-left"`, `"bottom-right"` and friends.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top-left" => Ok(LogoAnchor::TopLeft),
            "top-right" => Ok(LogoAnchor::TopRight),
            "bottom-left" => Ok(LogoAnchor::BottomLeft),
            "bottom-right" => Ok(LogoAnchor::BottomRight),
            other => Err(FolioError::Configuration(format!(
                "unknown logo position '{}', expected top|bottom-left|right",
                other
            ))),
        }
    }
}

/// A page-level image pinned to a corner, independent of the row grid.
#[derive(Debug, Clone)]
pub struct Logo {
    pub source: String,
    pub width: f64,
    pub height: f64,
    pub anchor: LogoAnchor,
    /// Distance from both page edges at the anchor corner.
    pub padding: f64,
}

impl Logo {
    /// A logo in the bottom-left corner, 10pt from the edges.
    pub fn new(source: impl Into<String>, width: Length, height: Length) -> Self {
        Self {
            source: source.into(),
            width: width.points(),
            height: height.points(),
            anchor: LogoAnchor::default(),
            padding: 10.0,
        }
    }

    pub fn anchored(mut self, anchor: LogoAnchor, padding: Length) -> Self {
        self.anchor = anchor;
        self.padding = padding.points();
        self
    }

    /// Where the logo lands on a page of `(width, height)`.
    pub fn rect(&self, page_size: (f64, f64)) -> Rect {
        let (page_width, page_height) = page_size;
        let left = self.padding;
        let right = page_width - self.width - self.padding;
        let bottom = self.padding;
        let top = page_height - self.height - self.padding;
        let (x, y) = match self.anchor {
            LogoAnchor::TopLeft => (left, top),
            LogoAnchor::TopRight => (right, top),
            LogoAnchor::BottomLeft => (left, bottom),
            LogoAnchor::BottomRight => (right, bottom),
        };
        Rect::new(x, y, self.width, self.height)
    }
}

/// Greedy word wrap using approximate standard-font widths.
///
/// Explicit newlines always break. A single word wider than `width` gets a
/// line of its own rather than being split.
pub fn wrap_text(text: &str, font: StandardFont, font_size: f64, width: f64) -> Vec<String> {
    let space = font.char_width(' ', font_size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0.0;
        for word in paragraph.split_whitespace() {
            let word_width = font.measure(word, font_size);
            if !line.is_empty() && line_width + space + word_width > width {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            if !line.is_empty() {
                line.push(' ');
                line_width += space;
            }
            line.push_str(word);
            line_width += word_width;
        }
        lines.push(line);
    }

    lines
}
