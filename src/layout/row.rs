//! Rows and the columns inside them.
//!
//! A row is a horizontal band with a fixed height. Its width is whatever the
//! page leaves between the paddings. A row is split into columns in one of
//! two ways, never both:
//!
//! - explicit columns, each with its own width, packed left to right
//! - a percentage split, where the row creates one region per percentage

use crate::backend::Backend;
use crate::component::Component;
use crate::error::{FolioError, Result};
use crate::geometry::{split_band, stack_columns, Rect};
use crate::units::Length;

/// A vertical slice of a row. Components share the column's frame and flow
/// top-down inside it.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    width: f64,
    ordinal: usize,
    frame: Rect,
    components: Vec<Component>,
}

impl Column {
    pub fn new(name: impl Into<String>, width: Length) -> Self {
        Self {
            name: name.into(),
            width: width.points(),
            ordinal: 0,
            frame: Rect::default(),
            components: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// 1-based position in the row. Zero until the column is attached.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The rectangle components are drawn into. Only meaningful once the
    /// owning row sits on a page.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Append a component to the draw list. Logos belong to pages and are
    /// refused here.
    pub fn add_component(&mut self, component: impl Into<Component>) -> Result<&mut Self> {
        let component = component.into();
        if let Component::Logo(_) = component {
            return Err(FolioError::Configuration(format!(
                "column '{}' cannot host a logo, attach it to the page",
                self.name
            )));
        }
        self.components.push(component);
        Ok(self)
    }

    pub(crate) fn render(
        &self,
        page_size: (f64, f64),
        top_inset: f64,
        backend: &mut dyn Backend,
    ) -> Result<()> {
        let frame = self.frame;
        let mut cursor = frame.top() - top_inset;
        for component in &self.components {
            let area = Rect::new(frame.x, frame.y, frame.width, (cursor - frame.y).max(0.0));
            let used = component.draw(area, page_size, backend)?;
            cursor -= used;
            if cursor < frame.y {
                log::warn!(
                    "{} in column '{}' runs {:.1}pt past the bottom of its frame",
                    component.kind_name(),
                    self.name,
                    frame.y - cursor
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnMode {
    Explicit,
    Split(Vec<f64>),
}

/// A horizontal band on a page.
#[derive(Debug, Clone)]
pub struct Row {
    name: String,
    height: f64,
    ordinal: usize,
    /// Set once the row is attached to a page.
    band: Option<Rect>,
    mode: ColumnMode,
    columns: Vec<Column>,
}

impl Row {
    pub fn new(name: impl Into<String>, height: Length) -> Self {
        Self {
            name: name.into(),
            height: height.points(),
            ordinal: 0,
            band: None,
            mode: ColumnMode::Explicit,
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// 1-based position on the page. Zero until the row is attached.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn band(&self) -> Option<Rect> {
        self.band
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_split(&self) -> bool {
        matches!(self.mode, ColumnMode::Split(_))
    }

    pub fn column_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_by_name_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// A region of a split row. Same as [`Row::column_mut`]; regions are
    /// columns the row created itself.
    pub fn region_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.column_mut(index)
    }

    /// Append a column to the right of the existing ones.
    ///
    /// When the row is already on a page, every column frame is recomputed
    /// and a column that does not fit is rejected, leaving the row unchanged.
    pub fn add_column(&mut self, mut column: Column) -> Result<&mut Column> {
        if self.is_split() {
            return Err(FolioError::Configuration(format!(
                "row '{}' uses a percentage split and cannot take explicit columns",
                self.name
            )));
        }
        column.ordinal = self.columns.len() + 1;
        self.columns.push(column);

        if let Some(band) = self.band {
            if let Err(e) = self.relayout(band) {
                self.columns.pop();
                return Err(e);
            }
        }

        let last = self.columns.len() - 1;
        Ok(&mut self.columns[last])
    }

    /// Divide the row into regions by percentage of the usable width. The
    /// percentages must sum to exactly 100.
    pub fn split(&mut self, percentages: &[f64]) -> Result<()> {
        if !self.columns.is_empty() {
            return Err(FolioError::Configuration(format!(
                "row '{}' already has columns and cannot be split",
                self.name
            )));
        }
        // Validates the percentages even before the row has a band.
        let probe = split_band(Rect::new(0.0, 0.0, 100.0, 0.0), percentages)?;

        self.mode = ColumnMode::Split(percentages.to_vec());
        self.columns = probe
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let mut region = Column::new(format!("{}#{}", self.name, i + 1), Length::ZERO);
                region.ordinal = i + 1;
                region
            })
            .collect();

        if let Some(band) = self.band {
            self.relayout(band)?;
        }
        Ok(())
    }

    /// Column frames for this row placed in `band`, without touching `self`.
    pub(crate) fn column_frames(&self, band: Rect) -> Result<Vec<Rect>> {
        match &self.mode {
            ColumnMode::Explicit => {
                let widths: Vec<(&str, f64)> =
                    self.columns.iter().map(|c| (c.name.as_str(), c.width)).collect();
                stack_columns(band, &widths)
            }
            ColumnMode::Split(percentages) => split_band(band, percentages),
        }
    }

    /// Store a band and column frames computed by a layout pass.
    pub(crate) fn apply(&mut self, band: Rect, frames: Vec<Rect>) {
        self.band = Some(band);
        let split = self.is_split();
        for (column, frame) in self.columns.iter_mut().zip(frames) {
            column.frame = frame;
            if split {
                column.width = frame.width;
            }
        }
    }

    pub(crate) fn set_ordinal(&mut self, ordinal: usize) {
        self.ordinal = ordinal;
    }

    pub(crate) fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    fn relayout(&mut self, band: Rect) -> Result<()> {
        let frames = self.column_frames(band)?;
        self.apply(band, frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Logo, Spacer};

    fn placed_row(band: Rect) -> Row {
        let mut row = Row::new("r", Length::pt(band.height));
        row.apply(band, vec![]);
        row
    }

    #[test]
    fn test_columns_pack_left_to_right() {
        let mut row = placed_row(Rect::new(20.0, 300.0, 460.0, 100.0));
        row.add_column(Column::new("a", Length::pt(100.0))).unwrap();
        row.add_column(Column::new("b", Length::pt(200.0))).unwrap();

        let lefts: Vec<f64> = row.columns().iter().map(|c| c.frame().x).collect();
        assert_eq!(lefts, vec![20.0, 120.0]);
        assert_eq!(row.columns()[1].ordinal(), 2);
        assert!(row.columns().iter().all(|c| c.frame().y == 300.0 && c.frame().height == 100.0));
    }

    #[test]
    fn test_overflowing_column_leaves_row_unchanged() {
        let mut row = placed_row(Rect::new(20.0, 300.0, 460.0, 100.0));
        row.add_column(Column::new("a", Length::pt(400.0))).unwrap();
        let err = row.add_column(Column::new("b", Length::pt(100.0))).unwrap_err();
        assert!(matches!(err, FolioError::Overflow { .. }));
        assert_eq!(row.columns().len(), 1);
    }

    #[test]
    fn test_detached_row_accepts_columns_without_geometry() {
        let mut row = Row::new("r", Length::pt(50.0));
        row.add_column(Column::new("wide", Length::pt(10_000.0))).unwrap();
        assert!(row.band().is_none());
        assert_eq!(row.columns()[0].ordinal(), 1);
    }

    #[test]
    fn test_split_regions() {
        let mut row = placed_row(Rect::new(36.0, 100.0, 540.0, 50.0));
        row.split(&[25.0, 75.0]).unwrap();
        assert!(row.is_split());
        assert_eq!(row.columns().len(), 2);
        assert_eq!(row.columns()[0].frame(), Rect::new(36.0, 100.0, 135.0, 50.0));
        assert_eq!(row.columns()[1].frame(), Rect::new(171.0, 100.0, 405.0, 50.0));
        assert_eq!(row.columns()[1].name(), "r#2");
        assert_eq!(row.columns()[1].width(), 405.0);
        row.region_mut(1)
            .unwrap()
            .add_component(Spacer::new(Length::pt(5.0)))
            .unwrap();
    }

    #[test]
    fn test_modes_are_exclusive() {
        let mut split = Row::new("s", Length::pt(10.0));
        split.split(&[50.0, 50.0]).unwrap();
        assert!(matches!(
            split.add_column(Column::new("c", Length::pt(1.0))),
            Err(FolioError::Configuration(_))
        ));

        let mut explicit = Row::new("e", Length::pt(10.0));
        explicit.add_column(Column::new("c", Length::pt(1.0))).unwrap();
        assert!(matches!(explicit.split(&[100.0]), Err(FolioError::Configuration(_))));
    }

    #[test]
    fn test_bad_split_is_rejected_before_attach() {
        let mut row = Row::new("r", Length::pt(10.0));
        assert!(matches!(row.split(&[30.0, 30.0]), Err(FolioError::Configuration(_))));
        assert!(!row.is_split());
        assert!(row.columns().is_empty());
    }

    #[test]
    fn test_column_refuses_logo() {
        let mut column = Column::new("c", Length::pt(10.0));
        let logo = Logo::new("logo.png", Length::pt(1.0), Length::pt(1.0));
        assert!(matches!(
            column.add_component(logo),
            Err(FolioError::Configuration(_))
        ));
        assert!(column.components().is_empty());
    }

    #[test]
    fn test_column_lookup_by_name() {
        let mut row = Row::new("r", Length::pt(10.0));
        row.add_column(Column::new("left", Length::pt(1.0))).unwrap();
        row.add_column(Column::new("right", Length::pt(1.0))).unwrap();
        assert_eq!(row.column_by_name("right").unwrap().ordinal(), 2);
        assert!(row.column_by_name("middle").is_none());
    }
}
