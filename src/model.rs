//! # Report Model
//!
//! The JSON description of a report. A report is a list of pages, each page a
//! list of rows, each row either a list of columns or a percentage split into
//! regions, and each column or region a list of components.
//!
//! Lengths (paddings, row heights, column widths, image and spacer sizes) are
//! plain numbers in the report's `unit`, centimeters unless stated otherwise.
//! Font sizes and leading are always points.
//!
//! The model carries no geometry. [`build_document`] feeds it through the
//! public tree API so that every check a hand-built layout gets also applies
//! to JSON input.

use serde::{Deserialize, Serialize};

use crate::component::{Component, Image, Logo, LogoAnchor, Paragraph, ParagraphStyle, Spacer, TableBlock};
use crate::config::{LayoutConfig, Metadata, Orientation, PageSize};
use crate::error::{FolioError, Result};
use crate::layout::{Column, Document, Row};
use crate::style::{Color, StandardFont, TextAlign};
use crate::table::{DataTable, TableFlags};
use crate::units::{Length, Unit};

/// A complete report ready for layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSpec {
    /// Unit of every length in the report.
    #[serde(default)]
    pub unit: Unit,

    #[serde(default)]
    pub page_size: PageSize,

    #[serde(default)]
    pub orientation: Orientation,

    /// Defaults to 2 cm.
    #[serde(default)]
    pub top_padding: Option<f64>,

    /// Defaults to 2 cm.
    #[serde(default)]
    pub left_padding: Option<f64>,

    /// Defaults to 6 pt.
    #[serde(default)]
    pub frame_top_padding: Option<f64>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub pages: Vec<PageSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    #[serde(default)]
    pub name: String,

    /// Overrides the report's top padding for this page.
    #[serde(default)]
    pub top_padding: Option<f64>,

    /// Overrides the report's left padding for this page.
    #[serde(default)]
    pub left_padding: Option<f64>,

    #[serde(default)]
    pub logo: Option<LogoSpec>,

    /// Image source stretched over the whole page.
    #[serde(default)]
    pub background: Option<String>,

    #[serde(default)]
    pub rows: Vec<RowSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoSpec {
    pub source: String,
    pub width: f64,
    pub height: f64,

    /// `"top-left"`, `"top-right"`, `"bottom-left"` or `"bottom-right"`.
    #[serde(default)]
    pub position: Option<String>,

    /// Distance from the page edges. Defaults to 10 pt.
    #[serde(default)]
    pub padding: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSpec {
    #[serde(default)]
    pub name: String,
    pub height: f64,

    /// Explicit columns, packed left to right.
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,

    /// Percentage split of the usable width. Cannot be combined with
    /// `columns`.
    #[serde(default)]
    pub split: Option<Vec<f64>>,

    /// Content of the split regions, in order. May be shorter than `split`.
    #[serde(default)]
    pub regions: Vec<RegionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    #[serde(default)]
    pub name: String,
    pub width: f64,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSpec {
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

/// A drawable item inside a column or region.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ComponentSpec {
    Image {
        source: String,
        width: f64,
        height: f64,
    },
    Paragraph {
        text: String,
        #[serde(default)]
        style: TextStyleSpec,
    },
    Spacer {
        height: f64,
    },
    #[serde(rename_all = "camelCase")]
    Table {
        data: DataTable,
        #[serde(default)]
        flags: TableFlags,
        #[serde(default)]
        column_widths: Option<Vec<f64>>,
        #[serde(default)]
        font_size: Option<f64>,
    },
}

/// Paragraph settings. Anything left out keeps the paragraph default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyleSpec {
    #[serde(default)]
    pub font: Option<StandardFont>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub leading: Option<f64>,
    /// Hex color such as `"#336699"`.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub align: Option<TextAlign>,
}

impl TextStyleSpec {
    fn resolve(&self) -> Result<ParagraphStyle> {
        let mut style = ParagraphStyle::default();
        if let Some(font) = self.font {
            style.font = font;
        }
        if let Some(size) = self.font_size {
            style.font_size = size;
            // Keep the default 1.2 line spacing when only the size changes.
            style.leading = size * 1.2;
        }
        if let Some(leading) = self.leading {
            style.leading = leading;
        }
        if let Some(color) = &self.color {
            style.color = Color::hex(color)?;
        }
        if let Some(align) = self.align {
            style.align = align;
        }
        Ok(style)
    }
}

impl ReportSpec {
    fn length(&self, value: f64) -> Length {
        self.unit.length(value)
    }

    /// The document-wide layout configuration this report asks for.
    pub fn layout_config(&self) -> LayoutConfig {
        let defaults = LayoutConfig::default();
        LayoutConfig {
            page_size: self.page_size,
            orientation: self.orientation,
            top_padding: self
                .top_padding
                .map_or(defaults.top_padding, |v| self.length(v)),
            left_padding: self
                .left_padding
                .map_or(defaults.left_padding, |v| self.length(v)),
            frame_top_padding: self
                .frame_top_padding
                .map_or(defaults.frame_top_padding, |v| self.length(v)),
        }
    }

    fn component(&self, spec: &ComponentSpec) -> Result<Component> {
        Ok(match spec {
            ComponentSpec::Image {
                source,
                width,
                height,
            } => Image::new(source.clone(), self.length(*width), self.length(*height)).into(),
            ComponentSpec::Paragraph { text, style } => {
                Paragraph::new(text.clone()).with_style(style.resolve()?).into()
            }
            ComponentSpec::Spacer { height } => Spacer::new(self.length(*height)).into(),
            ComponentSpec::Table {
                data,
                flags,
                column_widths,
                font_size,
            } => {
                let mut block = TableBlock::from_data(data, flags)?;
                if let Some(widths) = column_widths {
                    block = block.with_column_widths(widths.iter().map(|w| self.length(*w)).collect())?;
                }
                if let Some(size) = font_size {
                    block = block.with_font_size(*size);
                }
                block.into()
            }
        })
    }

    fn logo(&self, spec: &LogoSpec) -> Result<Logo> {
        let logo = Logo::new(spec.source.clone(), self.length(spec.width), self.length(spec.height));
        let anchor = match &spec.position {
            Some(position) => position.parse::<LogoAnchor>()?,
            None => LogoAnchor::default(),
        };
        let padding = spec.padding.map_or(Length::pt(logo.padding), |v| self.length(v));
        Ok(logo.anchored(anchor, padding))
    }

    fn row(&self, spec: &RowSpec) -> Result<Row> {
        let mut row = Row::new(spec.name.clone(), self.length(spec.height));

        if let Some(percentages) = &spec.split {
            if !spec.columns.is_empty() {
                return Err(FolioError::Configuration(format!(
                    "row '{}' declares both columns and a split",
                    spec.name
                )));
            }
            row.split(percentages)?;
            if spec.regions.len() > percentages.len() {
                return Err(FolioError::Configuration(format!(
                    "row '{}' has {} regions but only {} split percentages",
                    spec.name,
                    spec.regions.len(),
                    percentages.len()
                )));
            }
            for (i, region) in spec.regions.iter().enumerate() {
                for component in &region.components {
                    let component = self.component(component)?;
                    if let Some(target) = row.region_mut(i) {
                        target.add_component(component)?;
                    }
                }
            }
        } else {
            if !spec.regions.is_empty() {
                return Err(FolioError::Configuration(format!(
                    "row '{}' has regions but no split",
                    spec.name
                )));
            }
            for column_spec in &spec.columns {
                let column = row.add_column(Column::new(
                    column_spec.name.clone(),
                    self.length(column_spec.width),
                ))?;
                for component in &column_spec.components {
                    column.add_component(self.component(component)?)?;
                }
            }
        }

        Ok(row)
    }
}

/// Build the layout tree for `spec`. Fails on the first row, column or table
/// that does not fit or does not validate.
pub fn build_document(spec: &ReportSpec) -> Result<Document> {
    let mut document = Document::new(spec.layout_config()).with_metadata(spec.metadata.clone());

    for page_spec in &spec.pages {
        let defaults = (document.config().top_padding, document.config().left_padding);
        let page = document.add_page(page_spec.name.clone());

        if page_spec.top_padding.is_some() || page_spec.left_padding.is_some() {
            let top = page_spec.top_padding.map_or(defaults.0, |v| spec.length(v));
            let left = page_spec.left_padding.map_or(defaults.1, |v| spec.length(v));
            page.set_padding(top, left)?;
        }
        if let Some(logo) = &page_spec.logo {
            page.set_logo(spec.logo(logo)?);
        }
        if let Some(background) = &page_spec.background {
            page.set_background(background.clone());
        }
        for row_spec in &page_spec.rows {
            page.add_row(spec.row(row_spec)?)?;
        }
        log::debug!(
            "built page {} '{}' with {} rows",
            page.number(),
            page.name(),
            page.rows().len()
        );
    }

    Ok(document)
}
