//! Serializable layout metadata, for debug overlays and the `--layout` CLI
//! flag.

use serde::Serialize;

use crate::geometry::Rect;

use super::Document;

/// Complete layout metadata for all pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub pages: Vec<PageInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub name: String,
    pub number: usize,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Rect>,
    pub rows: Vec<RowInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowInfo {
    pub name: String,
    pub ordinal: usize,
    pub split: bool,
    pub band: Rect,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    pub ordinal: usize,
    pub frame: Rect,
    pub components: Vec<&'static str>,
}

impl LayoutInfo {
    pub(crate) fn from_document(document: &Document) -> Self {
        let pages = document
            .pages()
            .iter()
            .map(|page| PageInfo {
                name: page.name().to_string(),
                number: page.number(),
                width: page.size().0,
                height: page.size().1,
                logo: page.logo().map(|logo| logo.rect(page.size())),
                rows: page
                    .rows()
                    .iter()
                    .map(|row| RowInfo {
                        name: row.name().to_string(),
                        ordinal: row.ordinal(),
                        split: row.is_split(),
                        band: row.band().unwrap_or_default(),
                        columns: row
                            .columns()
                            .iter()
                            .map(|column| ColumnInfo {
                                name: column.name().to_string(),
                                ordinal: column.ordinal(),
                                frame: column.frame(),
                                components: column
                                    .components()
                                    .iter()
                                    .map(|c| c.kind_name())
                                    .collect(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        LayoutInfo { pages }
    }
}
