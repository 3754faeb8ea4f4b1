//! # Table Style Compiler
//!
//! Turns a column-labelled data table plus a handful of declarative flags
//! into two things a backend can draw directly:
//!
//! - an ordered list of [`StyleRule`]s, each covering a rectangular cell range
//! - the cell matrix as display strings, with the column labels injected as
//!   row 0
//!
//! Rule order is significant. A backend applies the rules front to back, so a
//! later rule wins over an earlier one for the cells they share. The order is:
//!
//! 1. header colors and bold font (row 0)
//! 2. header separator line
//! 3. body font and right alignment (all columns but the label column)
//! 4. zebra striping, if enabled
//! 5. totals line above the last row, if enabled
//! 6. negative-value highlight, if a column is selected
//!
//! Column formatting (step 7) rewrites the cell matrix and never adds rules.

pub mod cells;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::style::{Color, StandardFont, TextAlign};

pub use cells::{CellStyles, HorizontalRule, ResolvedCell};

/// Weight of the header separator and the totals line, in points.
pub const RULE_LINE_WEIGHT: f64 = 1.0;

/// A single value in a data table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Numeric view of the cell. Text is coerced when it parses as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Empty => None,
        }
    }

    /// The natural string form, used for columns without a format tag.
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

/// Rectangular, column-labelled data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<CellValue>>,
}

impl DataTable {
    /// Build a table, rejecting data that is not rectangular.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let table = Self { columns, rows };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(FolioError::Validation(
                "table needs at least one column".to_string(),
            ));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(FolioError::Validation(format!(
                    "table row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }
}

/// Declarative styling switches for [`compile`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFlags {
    /// Draw a line above the last row.
    #[serde(default)]
    pub totals_line: bool,

    /// Alternate body row backgrounds.
    #[serde(default)]
    pub zebra_stripe: bool,

    /// 1-based data column whose negative values turn the whole row red.
    #[serde(default)]
    pub negative_highlight_column: Option<usize>,

    /// Format tag per column, in column order. May be shorter than the
    /// column list; missing entries mean no formatting.
    #[serde(default)]
    pub column_formats: Vec<String>,
}

/// How a column's cells are rendered to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    Plain,
    /// Truncate to an integer and append the currency unit.
    Currency,
}

impl ColumnFormat {
    /// Map a format tag to a format. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "" => Some(ColumnFormat::Plain),
            "currency" | "kr" => Some(ColumnFormat::Currency),
            _ => None,
        }
    }

    fn apply(self, value: &CellValue) -> Option<String> {
        match self {
            ColumnFormat::Plain => Some(value.display()),
            ColumnFormat::Currency => value
                .as_number()
                .and_then(whole_units)
                .map(|n| format!("{} {}", n, CURRENCY_SUFFIX)),
        }
    }
}

const CURRENCY_SUFFIX: &str = "kr";

/// Truncate towards zero. `None` for NaN, infinities and values outside `i64`.
fn whole_units(n: f64) -> Option<i64> {
    let truncated = n.trunc();
    // i64::MAX is not representable as f64; 2^63 is the first value past it.
    let limit = 9_223_372_036_854_775_808.0;
    (truncated.is_finite() && truncated >= -limit && truncated < limit).then_some(truncated as i64)
}

/// A cell position in the compiled matrix. Row 0 is the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellRef {
    pub col: usize,
    pub row: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// The effect a rule has on the cells it covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RuleKind {
    Font(StandardFont),
    TextColor(Color),
    Background(Color),
    Align(TextAlign),
    LineAbove { weight: f64, color: Color },
    LineBelow { weight: f64, color: Color },
}

/// One styling instruction over the inclusive range `start..=end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleRule {
    pub kind: RuleKind,
    pub start: CellRef,
    pub end: CellRef,
}

impl StyleRule {
    fn row(kind: RuleKind, first_col: usize, last_col: usize, row: usize) -> Self {
        Self {
            kind,
            start: CellRef::new(first_col, row),
            end: CellRef::new(last_col, row),
        }
    }
}

/// Output of the compiler: ordered rules plus the display matrix.
#[derive(Debug, Clone, Serialize)]
pub struct TableStyleSpec {
    pub rules: Vec<StyleRule>,
    /// Header row followed by the data rows, all as display strings.
    pub cells: Vec<Vec<String>>,
}

impl TableStyleSpec {
    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        self.cells.first().map(|r| r.len()).unwrap_or(0)
    }
}

/// Compile a data table and its flags into rules and display strings.
pub fn compile(table: &DataTable, flags: &TableFlags) -> Result<TableStyleSpec> {
    table.validate()?;

    let column_count = table.columns.len();
    let last_col = column_count - 1;
    let body_rows = table.rows.len();

    if let Some(col) = flags.negative_highlight_column {
        if col == 0 || col > column_count {
            return Err(FolioError::Configuration(format!(
                "negative highlight column {} is outside 1..={}",
                col, column_count
            )));
        }
    }
    if flags.column_formats.len() > column_count {
        return Err(FolioError::Configuration(format!(
            "{} column formats given for {} columns",
            flags.column_formats.len(),
            column_count
        )));
    }

    let mut rules = Vec::new();

    // Header
    rules.push(StyleRule::row(RuleKind::TextColor(Color::BLACK), 0, last_col, 0));
    rules.push(StyleRule::row(RuleKind::Background(Color::WHITE), 0, last_col, 0));
    rules.push(StyleRule::row(RuleKind::Font(StandardFont::CourierBold), 0, last_col, 0));
    rules.push(StyleRule::row(
        RuleKind::LineBelow {
            weight: RULE_LINE_WEIGHT,
            color: Color::BLACK,
        },
        0,
        last_col,
        0,
    ));

    // Body
    for row in 1..=body_rows {
        rules.push(StyleRule::row(RuleKind::Font(StandardFont::Courier), 0, last_col, row));
        if column_count > 1 {
            rules.push(StyleRule::row(RuleKind::Align(TextAlign::Right), 1, last_col, row));
        }
    }

    if flags.zebra_stripe {
        for row in 1..=body_rows {
            let background = if row % 2 == 1 {
                Color::STRIPE_GRAY
            } else {
                Color::WHITE
            };
            rules.push(StyleRule::row(RuleKind::TextColor(Color::BLACK), 0, last_col, row));
            rules.push(StyleRule::row(RuleKind::Background(background), 0, last_col, row));
        }
    }

    if flags.totals_line && body_rows > 0 {
        rules.push(StyleRule::row(
            RuleKind::LineAbove {
                weight: RULE_LINE_WEIGHT,
                color: Color::BLACK,
            },
            0,
            last_col,
            body_rows,
        ));
    }

    if let Some(col) = flags.negative_highlight_column {
        for (i, row) in table.rows.iter().enumerate() {
            if row[col - 1].as_number().is_some_and(|v| v < 0.0) {
                rules.push(StyleRule::row(RuleKind::TextColor(Color::RED), 0, last_col, i + 1));
            }
        }
    }

    let cells = format_cells(table, &flags.column_formats)?;

    Ok(TableStyleSpec { rules, cells })
}

fn format_cells(table: &DataTable, tags: &[String]) -> Result<Vec<Vec<String>>> {
    let formats: Vec<ColumnFormat> = (0..table.columns.len())
        .map(|col| match tags.get(col) {
            None => ColumnFormat::Plain,
            Some(tag) => ColumnFormat::from_tag(tag).unwrap_or_else(|| {
                log::warn!(
                    "ignoring unknown format tag '{}' on column '{}'",
                    tag,
                    table.columns[col]
                );
                ColumnFormat::Plain
            }),
        })
        .collect();

    let mut cells = Vec::with_capacity(table.rows.len() + 1);
    cells.push(table.columns.clone());
    for (r, row) in table.rows.iter().enumerate() {
        let mut out = Vec::with_capacity(row.len());
        for (col, value) in row.iter().enumerate() {
            let text = formats[col].apply(value).ok_or_else(|| {
                FolioError::Validation(format!(
                    "cannot format {:?} in column '{}' row {} as a number",
                    value.display(),
                    table.columns[col],
                    r + 1
                ))
            })?;
            out.push(text);
        }
        cells.push(out);
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> DataTable {
        DataTable::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    fn sample() -> DataTable {
        table(
            &["Category", "Amount", "Budget"],
            vec![
                vec!["Food".into(), (-5.0).into(), 100.0.into()],
                vec!["Rent".into(), 10.0.into(), 900.0.into()],
                vec!["Total".into(), 5.0.into(), 1000.0.into()],
            ],
        )
    }

    fn count(spec: &TableStyleSpec, pred: impl Fn(&StyleRule) -> bool) -> usize {
        spec.rules.iter().filter(|r| pred(r)).count()
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = DataTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0.into(), 2.0.into()], vec![3.0.into()]],
        )
        .unwrap_err();
        assert!(matches!(err, FolioError::Validation(_)));

        let ragged = DataTable {
            columns: vec!["a".into()],
            rows: vec![vec![1.0.into(), 2.0.into()]],
        };
        assert!(matches!(
            compile(&ragged, &TableFlags::default()),
            Err(FolioError::Validation(_))
        ));
    }

    #[test]
    fn test_header_gets_one_bold_font_and_one_separator_for_any_flags() {
        let t = sample();
        for totals_line in [false, true] {
            for zebra_stripe in [false, true] {
                for highlight in [None, Some(2)] {
                    let flags = TableFlags {
                        totals_line,
                        zebra_stripe,
                        negative_highlight_column: highlight,
                        column_formats: vec![],
                    };
                    let spec = compile(&t, &flags).unwrap();
                    let bold = count(&spec, |r| {
                        r.start.row == 0 && matches!(r.kind, RuleKind::Font(f) if f.is_bold())
                    });
                    let separators = count(&spec, |r| {
                        r.start.row == 0 && matches!(r.kind, RuleKind::LineBelow { .. })
                    });
                    assert_eq!(bold, 1);
                    assert_eq!(separators, 1);
                }
            }
        }
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let flags = TableFlags {
            totals_line: true,
            zebra_stripe: true,
            negative_highlight_column: Some(2),
            column_formats: vec![],
        };
        let spec = compile(&sample(), &flags).unwrap();

        assert_eq!(spec.rules[0].kind, RuleKind::TextColor(Color::BLACK));
        assert_eq!(spec.rules[1].kind, RuleKind::Background(Color::WHITE));
        assert_eq!(spec.rules[2].kind, RuleKind::Font(StandardFont::CourierBold));
        assert!(matches!(spec.rules[3].kind, RuleKind::LineBelow { .. }));

        // 3 body rows x (font + align), then 3 x (text color + background)
        let body = &spec.rules[4..10];
        assert!(body.iter().step_by(2).all(|r| r.kind == RuleKind::Font(StandardFont::Courier)));
        assert!(body.iter().skip(1).step_by(2).all(|r| r.kind == RuleKind::Align(TextAlign::Right)
            && r.start.col == 1
            && r.end.col == 2));
        let zebra = &spec.rules[10..16];
        assert_eq!(zebra[1].kind, RuleKind::Background(Color::STRIPE_GRAY));
        assert_eq!(zebra[3].kind, RuleKind::Background(Color::WHITE));
        assert_eq!(zebra[5].kind, RuleKind::Background(Color::STRIPE_GRAY));

        assert!(matches!(spec.rules[16].kind, RuleKind::LineAbove { .. }));
        assert_eq!(spec.rules[16].start, CellRef::new(0, 3));
        assert_eq!(spec.rules[16].end, CellRef::new(2, 3));

        assert_eq!(spec.rules[17].kind, RuleKind::TextColor(Color::RED));
        assert_eq!(spec.rules.len(), 18);
    }

    #[test]
    fn test_no_zebra_means_no_alternating_colors() {
        let spec = compile(&sample(), &TableFlags::default()).unwrap();
        let body_backgrounds = count(&spec, |r| {
            r.start.row > 0 && matches!(r.kind, RuleKind::Background(_))
        });
        assert_eq!(body_backgrounds, 0);
    }

    #[test]
    fn test_negative_highlight_marks_only_negative_rows() {
        let t = table(
            &["Label", "Value"],
            vec![vec!["a".into(), (-5.0).into()], vec!["b".into(), 10.0.into()]],
        );
        let flags = TableFlags {
            negative_highlight_column: Some(2),
            ..Default::default()
        };
        let spec = compile(&t, &flags).unwrap();
        let red: Vec<&StyleRule> = spec
            .rules
            .iter()
            .filter(|r| r.kind == RuleKind::TextColor(Color::RED))
            .collect();
        assert_eq!(red.len(), 1);
        assert_eq!(red[0].start, CellRef::new(0, 1));
        assert_eq!(red[0].end, CellRef::new(1, 1));
    }

    #[test]
    fn test_negative_highlight_coerces_numeric_text() {
        let t = table(
            &["Label", "Value"],
            vec![vec!["a".into(), " -1.5 ".into()], vec!["b".into(), "n/a".into()]],
        );
        let flags = TableFlags {
            negative_highlight_column: Some(2),
            ..Default::default()
        };
        let spec = compile(&t, &flags).unwrap();
        assert_eq!(count(&spec, |r| r.kind == RuleKind::TextColor(Color::RED)), 1);
    }

    #[test]
    fn test_highlight_column_out_of_range() {
        for col in [0, 4] {
            let flags = TableFlags {
                negative_highlight_column: Some(col),
                ..Default::default()
            };
            assert!(matches!(
                compile(&sample(), &flags),
                Err(FolioError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_currency_format() {
        let t = table(
            &["Amount", "Note"],
            vec![vec![120.7.into(), "x".into()], vec![(-30.2).into(), "y".into()]],
        );
        let flags = TableFlags {
            column_formats: vec!["currency".into(), "".into()],
            ..Default::default()
        };
        let spec = compile(&t, &flags).unwrap();
        assert_eq!(
            spec.cells,
            vec![
                vec!["Amount".to_string(), "Note".to_string()],
                vec!["120 kr".to_string(), "x".to_string()],
                vec!["-30 kr".to_string(), "y".to_string()],
            ]
        );
    }

    #[test]
    fn test_formatting_does_not_add_rules() {
        let plain = compile(&sample(), &TableFlags::default()).unwrap();
        let formatted = compile(
            &sample(),
            &TableFlags {
                column_formats: vec!["".into(), "kr".into(), "kr".into()],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plain.rules, formatted.rules);
        assert_eq!(formatted.cells[1][1], "-5 kr");
        assert_eq!(formatted.cells[2][2], "900 kr");
    }

    #[test]
    fn test_unknown_format_tag_is_ignored() {
        let flags = TableFlags {
            column_formats: vec!["".into(), "percent".into()],
            ..Default::default()
        };
        let spec = compile(&sample(), &flags).unwrap();
        assert_eq!(spec.cells[1][1], "-5");
        assert_eq!(spec.cells[2][2], "900");
    }

    #[test]
    fn test_currency_on_text_fails_validation() {
        let flags = TableFlags {
            column_formats: vec!["currency".into()],
            ..Default::default()
        };
        assert!(matches!(
            compile(&sample(), &flags),
            Err(FolioError::Validation(_))
        ));
    }

    #[test]
    fn test_currency_rejects_non_finite_text() {
        let flags = TableFlags {
            column_formats: vec!["currency".into()],
            ..Default::default()
        };
        for text in ["NaN", "inf", "-infinity", ""] {
            let t = table(&["a"], vec![vec![text.into()]]);
            assert!(
                matches!(compile(&t, &flags), Err(FolioError::Validation(_))),
                "{text:?} should not format as currency"
            );
        }
    }

    #[test]
    fn test_currency_rejects_values_outside_i64() {
        let flags = TableFlags {
            column_formats: vec!["currency".into()],
            ..Default::default()
        };
        for value in [1e19, -1e19, f64::INFINITY, f64::NAN] {
            let t = table(&["a"], vec![vec![value.into()]]);
            assert!(matches!(compile(&t, &flags), Err(FolioError::Validation(_))));
        }
    }

    #[test]
    fn test_currency_coerces_numeric_text() {
        let flags = TableFlags {
            column_formats: vec!["kr".into()],
            ..Default::default()
        };
        let t = table(
            &["a"],
            vec![vec![" 42.9 ".into()], vec!["-0.5".into()], vec!["1e3".into()]],
        );
        let spec = compile(&t, &flags).unwrap();
        assert_eq!(spec.cells[1][0], "42 kr");
        assert_eq!(spec.cells[2][0], "0 kr");
        assert_eq!(spec.cells[3][0], "1000 kr");
        assert_eq!(whole_units(-9_223_372_036_854_775_808.0), Some(i64::MIN));
    }

    #[test]
    fn test_too_many_format_tags() {
        let flags = TableFlags {
            column_formats: vec!["".into(); 4],
            ..Default::default()
        };
        assert!(matches!(
            compile(&sample(), &flags),
            Err(FolioError::Configuration(_))
        ));
    }

    #[test]
    fn test_header_only_table() {
        let t = table(&["Only"], vec![]);
        let flags = TableFlags {
            totals_line: true,
            zebra_stripe: true,
            ..Default::default()
        };
        let spec = compile(&t, &flags).unwrap();
        assert_eq!(spec.rules.len(), 4);
        assert_eq!(spec.cells, vec![vec!["Only".to_string()]]);
    }

    #[test]
    fn test_cell_values_from_json() {
        let t: DataTable = serde_json::from_str(
            r#"{ "columns": ["a", "b", "c"], "rows": [[1.5, "text", null]] }"#,
        )
        .unwrap();
        assert_eq!(
            t.rows[0],
            vec![CellValue::Number(1.5), CellValue::Text("text".into()), CellValue::Empty]
        );
    }
}
