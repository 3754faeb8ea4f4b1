//! # Band Layout
//!
//! A [`Document`] holds pages, a [`Page`] stacks rows from the top padding
//! line downwards, and a [`Row`] splits into columns from the left padding
//! rightwards. Nobody declares coordinates: every rectangle is derived from
//! sizes, sibling order and page padding.
//!
//! Geometry is eager. Each structural change (a row added, a row resized, a
//! column added, paddings changed) runs a layout pass over the siblings
//! involved and replaces their rectangles. A change that would not fit is
//! rejected on the spot and leaves the tree as it was, so rendering never
//! discovers a broken layout.
//!
//! Rendering is a single linear pass:
//!
//! ```text
//! for page:    background, logo
//!   for row:
//!     for column:
//!       for component: draw into the column frame
//!   finish page
//! save
//! ```

mod info;
mod row;

pub use info::{ColumnInfo, LayoutInfo, PageInfo, RowInfo};
pub use row::{Column, Row};

use std::path::Path;

use crate::backend::Backend;
use crate::component::{Component, Logo};
use crate::config::{LayoutConfig, Metadata};
use crate::error::Result;
use crate::geometry::{stack_rows, Rect};
use crate::pdf::PdfBackend;
use crate::units::Length;

/// An ordered list of pages sharing one [`LayoutConfig`].
#[derive(Debug, Clone)]
pub struct Document {
    config: LayoutConfig,
    metadata: Metadata,
    pages: Vec<Page>,
}

impl Document {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            metadata: Metadata::default(),
            pages: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn page_size(&self) -> (f64, f64) {
        self.config.page_dimensions()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    /// Append an empty page using the configured paddings. Pages are
    /// numbered from 1 in insertion order.
    pub fn add_page(&mut self, name: impl Into<String>) -> &mut Page {
        let page = Page {
            name: name.into(),
            number: self.pages.len() + 1,
            size: self.config.page_dimensions(),
            top_padding: self.config.top_padding.points(),
            left_padding: self.config.left_padding.points(),
            frame_top_padding: self.config.frame_top_padding.points(),
            rows: Vec::new(),
            logo: None,
            background: None,
        };
        self.pages.push(page);
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Draw every page through `backend` and return the serialized document.
    pub fn render(&self, backend: &mut dyn Backend) -> Result<Vec<u8>> {
        for page in &self.pages {
            page.render(backend)?;
            log::info!("page {} complete", page.number);
        }
        backend.save()
    }

    /// Render to PDF bytes.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        let mut backend = PdfBackend::new(self.metadata.clone());
        self.render(&mut backend)
    }

    /// Render to PDF and write the file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_pdf()?;
        std::fs::write(path.as_ref(), &bytes)?;
        log::info!("wrote {} bytes to {}", bytes.len(), path.as_ref().display());
        Ok(())
    }

    /// Serializable snapshot of every derived rectangle.
    pub fn layout_info(&self) -> LayoutInfo {
        LayoutInfo::from_document(self)
    }
}

/// A page: rows stacked downwards from the top padding, plus optional
/// page-level decorations.
#[derive(Debug, Clone)]
pub struct Page {
    name: String,
    number: usize,
    size: (f64, f64),
    top_padding: f64,
    left_padding: f64,
    frame_top_padding: f64,
    rows: Vec<Row>,
    logo: Option<Logo>,
    background: Option<String>,
}

impl Page {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn top_padding(&self) -> f64 {
        self.top_padding
    }

    pub fn left_padding(&self) -> f64 {
        self.left_padding
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn logo(&self) -> Option<&Logo> {
        self.logo.as_ref()
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub fn row_by_name(&self, name: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.name() == name)
    }

    pub fn row_by_name_mut(&mut self, name: &str) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.name() == name)
    }

    /// Override the document paddings for this page. Existing rows are laid
    /// out again; if they no longer fit, the paddings are left untouched.
    pub fn set_padding(&mut self, top: Length, left: Length) -> Result<()> {
        let previous = (self.top_padding, self.left_padding);
        self.top_padding = top.points();
        self.left_padding = left.points();
        if let Err(e) = self.layout() {
            (self.top_padding, self.left_padding) = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Append a row below the existing ones and lay out the whole page again.
    ///
    /// A row (or one of its columns) that does not fit is rejected and the
    /// page stays as it was.
    pub fn add_row(&mut self, mut row: Row) -> Result<&mut Row> {
        row.set_ordinal(self.rows.len() + 1);
        self.rows.push(row);
        if let Err(e) = self.layout() {
            self.rows.pop();
            return Err(e);
        }
        let last = self.rows.len() - 1;
        Ok(&mut self.rows[last])
    }

    /// Change the height of the row at `index` and move every row below it.
    pub fn resize_row(&mut self, index: usize, height: Length) -> Result<()> {
        let Some(row) = self.rows.get_mut(index) else {
            return Err(crate::error::FolioError::Configuration(format!(
                "page '{}' has no row at index {}",
                self.name, index
            )));
        };
        let previous = row.height();
        row.set_height(height.points());
        if let Err(e) = self.layout() {
            self.rows[index].set_height(previous);
            return Err(e);
        }
        Ok(())
    }

    pub fn set_logo(&mut self, logo: Logo) {
        self.logo = Some(logo);
    }

    /// Image stretched over the whole page, drawn before anything else.
    pub fn set_background(&mut self, source: impl Into<String>) {
        self.background = Some(source.into());
    }

    /// Layout pass: recompute every row band and column frame from scratch.
    /// Nothing is written unless the whole page fits.
    fn layout(&mut self) -> Result<()> {
        let (width, height) = self.size;
        let sizes: Vec<(&str, f64)> = self.rows.iter().map(|r| (r.name(), r.height())).collect();
        let bands = stack_rows(width, height, self.top_padding, self.left_padding, &sizes)?;

        let frames = self
            .rows
            .iter()
            .zip(&bands)
            .map(|(row, band)| row.column_frames(*band))
            .collect::<Result<Vec<_>>>()?;

        for ((row, band), frames) in self.rows.iter_mut().zip(bands).zip(frames) {
            row.apply(band, frames);
        }
        log::debug!("page '{}' laid out with {} rows", self.name, self.rows.len());
        Ok(())
    }

    fn render(&self, backend: &mut dyn Backend) -> Result<()> {
        let (width, height) = self.size;
        if let Some(background) = &self.background {
            backend.draw_image(Rect::new(0.0, 0.0, width, height), background)?;
        }
        if let Some(logo) = &self.logo {
            Component::Logo(logo.clone()).draw(Rect::default(), self.size, backend)?;
        }

        for row in &self.rows {
            for column in row.columns() {
                column.render(self.size, self.frame_top_padding, backend)?;
            }
        }

        backend.finish_page(self.size)
    }
}
