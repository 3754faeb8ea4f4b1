//! Sequential application of compiled style rules.
//!
//! A backend that draws a [`TableStyleSpec`] walks the rules front to back
//! and lets each one overwrite the cells it covers. [`CellStyles::resolve`]
//! does exactly that once, producing the effective style of every cell and
//! the list of horizontal rule lines.

use crate::style::{Color, StandardFont, TextAlign};

use super::{RuleKind, TableStyleSpec};

/// Effective style of one cell after all rules ran.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCell {
    pub font: StandardFont,
    pub text_color: Color,
    pub background: Option<Color>,
    pub align: TextAlign,
}

impl Default for ResolvedCell {
    fn default() -> Self {
        Self {
            font: StandardFont::Helvetica,
            text_color: Color::BLACK,
            background: None,
            align: TextAlign::Left,
        }
    }
}

/// A horizontal line on a row boundary.
///
/// `boundary` 0 is the top edge of the header; boundary `n` is the bottom
/// edge of matrix row `n - 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalRule {
    pub boundary: usize,
    pub first_col: usize,
    pub last_col: usize,
    pub weight: f64,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct CellStyles {
    /// Indexed `[row][col]`, same shape as the cell matrix.
    pub cells: Vec<Vec<ResolvedCell>>,
    pub lines: Vec<HorizontalRule>,
}

impl CellStyles {
    pub fn resolve(spec: &TableStyleSpec) -> Self {
        let rows = spec.row_count();
        let cols = spec.column_count();
        let mut cells = vec![vec![ResolvedCell::default(); cols]; rows];
        let mut lines = Vec::new();

        for rule in &spec.rules {
            let row_end = rule.end.row.min(rows.saturating_sub(1));
            let col_end = rule.end.col.min(cols.saturating_sub(1));
            if rows == 0 || cols == 0 || rule.start.row > row_end || rule.start.col > col_end {
                continue;
            }

            match &rule.kind {
                RuleKind::LineAbove { weight, color } | RuleKind::LineBelow { weight, color } => {
                    let below = matches!(rule.kind, RuleKind::LineBelow { .. });
                    for row in rule.start.row..=row_end {
                        lines.push(HorizontalRule {
                            boundary: if below { row + 1 } else { row },
                            first_col: rule.start.col,
                            last_col: col_end,
                            weight: *weight,
                            color: *color,
                        });
                    }
                }
                kind => {
                    for row in &mut cells[rule.start.row..=row_end] {
                        for cell in &mut row[rule.start.col..=col_end] {
                            match kind {
                                RuleKind::Font(f) => cell.font = *f,
                                RuleKind::TextColor(c) => cell.text_color = *c,
                                RuleKind::Background(c) => cell.background = Some(*c),
                                RuleKind::Align(a) => cell.align = *a,
                                RuleKind::LineAbove { .. } | RuleKind::LineBelow { .. } => {}
                            }
                        }
                    }
                }
            }
        }

        Self { cells, lines }
    }

    pub fn cell(&self, row: usize, col: usize) -> &ResolvedCell {
        &self.cells[row][col]
    }
}
