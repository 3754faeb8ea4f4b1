use serde::Serialize;

use crate::component::{wrap_text, ParagraphStyle, TableBlock};
use crate::error::Result;
use crate::geometry::Rect;

use super::Backend;

/// One backend call, as seen by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Image { rect: Rect, source: String },
    Text { rect: Rect, text: String, lines: usize },
    Table { rect: Rect, rows: usize, columns: usize },
    FinishPage { width: f64, height: f64 },
    Save,
}

/// A backend that draws nothing and remembers every call in order.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub ops: Vec<DrawOp>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FinishPage { .. }))
            .count()
    }
}

impl Backend for RecordingBackend {
    fn draw_image(&mut self, rect: Rect, source: &str) -> Result<()> {
        self.ops.push(DrawOp::Image {
            rect,
            source: source.to_string(),
        });
        Ok(())
    }

    fn draw_text(&mut self, rect: Rect, text: &str, style: &ParagraphStyle) -> Result<f64> {
        let lines = wrap_text(text, style.font, style.font_size, rect.width).len();
        self.ops.push(DrawOp::Text {
            rect,
            text: text.to_string(),
            lines,
        });
        Ok(lines as f64 * style.leading)
    }

    fn draw_table(&mut self, rect: Rect, table: &TableBlock) -> Result<f64> {
        self.ops.push(DrawOp::Table {
            rect,
            rows: table.spec.row_count(),
            columns: table.spec.column_count(),
        });
        Ok(table.height())
    }

    fn finish_page(&mut self, page_size: (f64, f64)) -> Result<()> {
        self.ops.push(DrawOp::FinishPage {
            width: page_size.0,
            height: page_size.1,
        });
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>> {
        self.ops.push(DrawOp::Save);
        Ok(serde_json::to_vec_pretty(&self.ops)?)
    }
}
