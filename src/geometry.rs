//! # Geometry Resolver
//!
//! Rows and columns never declare coordinates. Their rectangles are derived
//! from three things only: the declared size, the position among siblings,
//! and the page padding.
//!
//! Coordinates follow the PDF convention: the origin is the bottom-left
//! corner of the page and y grows upwards. Rows therefore stack *downwards*
//! from the top padding line, while columns stack left to right from the left
//! padding.
//!
//! Every function here is pure. The layout pass in [`crate::layout`] calls
//! [`stack_rows`] / [`stack_columns`] / [`split_band`] after each structural
//! change and replaces the stored rectangles wholesale.

use serde::Serialize;

use crate::error::{FolioError, Result};

/// Slack allowed when checking that siblings fit, so that a layout which fits
/// exactly on paper is not rejected over centimeter-to-point rounding.
const FIT_EPSILON: f64 = 1e-6;

/// An axis-aligned rectangle in page coordinates (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }
}

/// Bottom edge of the row at `index` (0-based) on a page of `page_height`.
///
/// The sum includes the row's own height, so the result is its bottom edge:
/// `page_height - top_padding - (heights[0] + ... + heights[index])`.
pub fn row_origin_y(page_height: f64, top_padding: f64, heights: &[f64], index: usize) -> f64 {
    let height_sum: f64 = heights[..=index].iter().sum();
    page_height - top_padding - height_sum
}

/// Left edge of the column at `index` (0-based) in a band starting at
/// `left_padding`.
pub fn column_origin_x(left_padding: f64, widths: &[f64], index: usize) -> f64 {
    let width_sum: f64 = widths[..=index].iter().sum();
    left_padding + width_sum - widths[index]
}

/// Resolve a percentage split into `(left_edge, width)` pairs.
///
/// The percentages must add up to exactly 100. There is no tolerance: a
/// split either tiles the band or it is rejected.
pub fn split_regions(left: f64, usable_width: f64, percentages: &[f64]) -> Result<Vec<(f64, f64)>> {
    if percentages.is_empty() {
        return Err(FolioError::Configuration(
            "frame split needs at least one percentage".to_string(),
        ));
    }
    if let Some(p) = percentages.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(FolioError::Configuration(format!(
            "frame split percentages must be positive, got {}",
            p
        )));
    }
    let total: f64 = percentages.iter().sum();
    if total != 100.0 {
        return Err(FolioError::Configuration(format!(
            "frame split percentages must sum to 100, got {}",
            total
        )));
    }

    let mut cumulative = 0.0;
    let regions = percentages
        .iter()
        .map(|p| {
            let x = left + usable_width * cumulative / 100.0;
            cumulative += p;
            (x, usable_width * p / 100.0)
        })
        .collect();
    Ok(regions)
}

/// A row height or column width must be a finite, positive number of points.
fn check_size(container: &str, name: &str, dimension: &str, size: f64) -> Result<()> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(FolioError::Configuration(format!(
            "{} '{}' has {} {}, expected a positive length",
            container, name, dimension, size
        )))
    }
}

/// Paddings may be zero but never negative or non-finite.
fn check_padding(name: &str, padding: f64) -> Result<()> {
    if padding.is_finite() && padding >= 0.0 {
        Ok(())
    } else {
        Err(FolioError::Configuration(format!(
            "{} padding {} must be a finite, non-negative length",
            name, padding
        )))
    }
}

/// Layout pass for the rows of one page.
///
/// `rows` holds `(name, height)` in top-to-bottom order. Each returned band
/// spans the usable width (`page_width - 2 * left_padding`). Fails with
/// [`FolioError::Configuration`] for a non-positive or non-finite height or
/// padding, and with [`FolioError::Overflow`] naming the first row that would
/// cross the bottom page edge.
pub fn stack_rows(
    page_width: f64,
    page_height: f64,
    top_padding: f64,
    left_padding: f64,
    rows: &[(&str, f64)],
) -> Result<Vec<Rect>> {
    check_size("Page", "page", "width", page_width)?;
    check_size("Page", "page", "height", page_height)?;
    check_padding("top", top_padding)?;
    check_padding("left", left_padding)?;
    for (name, height) in rows {
        check_size("Row", name, "height", *height)?;
    }

    let heights: Vec<f64> = rows.iter().map(|(_, h)| *h).collect();
    let usable_width = (page_width - 2.0 * left_padding).max(0.0);

    let mut bands = Vec::with_capacity(rows.len());
    for (index, (name, height)) in rows.iter().enumerate() {
        let y = row_origin_y(page_height, top_padding, &heights, index);
        if y < -FIT_EPSILON {
            let used: f64 = heights[..index].iter().sum();
            return Err(FolioError::Overflow {
                container: "Row",
                name: name.to_string(),
                required: *height,
                available: (page_height - top_padding - used).max(0.0),
            });
        }
        bands.push(Rect::new(left_padding, y, usable_width, *height));
    }

    log::debug!(
        "stacked {} rows, lowest bottom edge at {:.2}",
        bands.len(),
        bands.last().map(|b| b.y).unwrap_or(page_height - top_padding)
    );
    Ok(bands)
}

/// Layout pass for the columns of one row band.
///
/// `columns` holds `(name, width)` in left-to-right order. Every column takes
/// the full band height. A column whose right edge passes the band's right
/// edge is rejected.
pub fn stack_columns(band: Rect, columns: &[(&str, f64)]) -> Result<Vec<Rect>> {
    for (name, width) in columns {
        check_size("Column", name, "width", *width)?;
    }
    let widths: Vec<f64> = columns.iter().map(|(_, w)| *w).collect();

    let mut frames = Vec::with_capacity(columns.len());
    for (index, (name, width)) in columns.iter().enumerate() {
        let x = column_origin_x(band.x, &widths, index);
        if x + width > band.right() + FIT_EPSILON {
            return Err(FolioError::Overflow {
                container: "Column",
                name: name.to_string(),
                required: *width,
                available: (band.right() - x).max(0.0),
            });
        }
        frames.push(Rect::new(x, band.y, *width, band.height));
    }
    Ok(frames)
}

/// Layout pass for a percentage-split row: one frame per percentage.
pub fn split_band(band: Rect, percentages: &[f64]) -> Result<Vec<Rect>> {
    let regions = split_regions(band.x, band.width, percentages)?;
    Ok(regions
        .into_iter()
        .map(|(x, width)| Rect::new(x, band.y, width, band.height))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_row_bottom_edges() {
        let heights = [100.0, 150.0, 50.0];
        let bottoms: Vec<f64> = (0..3)
            .map(|i| row_origin_y(800.0, 40.0, &heights, i))
            .collect();
        assert_eq!(bottoms, vec![660.0, 510.0, 460.0]);
    }

    #[test]
    fn test_column_left_edges() {
        let widths = [100.0, 200.0];
        assert_eq!(column_origin_x(20.0, &widths, 0), 20.0);
        assert_eq!(column_origin_x(20.0, &widths, 1), 120.0);
    }

    #[test]
    fn test_stack_rows_matches_closed_form() {
        let rows = [("a", 10.0), ("b", 25.5), ("c", 7.25), ("d", 40.0)];
        let bands = stack_rows(600.0, 800.0, 30.0, 15.0, &rows).unwrap();
        let mut sum = 0.0;
        for (band, (_, h)) in bands.iter().zip(rows.iter()) {
            sum += h;
            assert!(approx(band.y, 800.0 - 30.0 - sum));
            assert!(approx(band.height, *h));
            assert!(approx(band.x, 15.0));
            assert!(approx(band.width, 570.0));
        }
    }

    #[test]
    fn test_stack_rows_is_idempotent() {
        let rows = [("a", 100.0), ("b", 150.0)];
        let first = stack_rows(500.0, 800.0, 40.0, 20.0, &rows).unwrap();
        let second = stack_rows(500.0, 800.0, 40.0, 20.0, &rows).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stack_rows_rejects_overflow() {
        let rows = [("top", 500.0), ("bottom", 300.0)];
        let err = stack_rows(500.0, 800.0, 40.0, 20.0, &rows).unwrap_err();
        match err {
            FolioError::Overflow { container, name, required, available } => {
                assert_eq!(container, "Row");
                assert_eq!(name, "bottom");
                assert_eq!(required, 300.0);
                assert_eq!(available, 260.0);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_row_filling_page_exactly_fits() {
        let rows = [("only", 760.0)];
        let bands = stack_rows(500.0, 800.0, 40.0, 20.0, &rows).unwrap();
        assert!(approx(bands[0].y, 0.0));
    }

    #[test]
    fn test_stack_rows_rejects_degenerate_heights() {
        for bad in [-200.0, 0.0, f64::NAN, f64::INFINITY] {
            let rows = [("ok", 100.0), ("bad", bad)];
            let err = stack_rows(500.0, 800.0, 40.0, 20.0, &rows).unwrap_err();
            assert!(matches!(err, FolioError::Configuration(_)), "{bad}");
        }
    }

    #[test]
    fn test_negative_height_cannot_hide_overflow() {
        let rows = [("neg", -200.0), ("tall", 900.0)];
        assert!(stack_rows(500.0, 800.0, 40.0, 20.0, &rows).is_err());
    }

    #[test]
    fn test_stack_rows_rejects_bad_padding() {
        assert!(matches!(
            stack_rows(500.0, 800.0, -1.0, 20.0, &[]),
            Err(FolioError::Configuration(_))
        ));
        assert!(matches!(
            stack_rows(500.0, 800.0, 40.0, f64::NAN, &[]),
            Err(FolioError::Configuration(_))
        ));
        assert!(stack_rows(500.0, 800.0, 0.0, 0.0, &[("a", 10.0)]).is_ok());
    }

    #[test]
    fn test_stack_columns_rejects_degenerate_widths() {
        let band = Rect::new(20.0, 300.0, 460.0, 100.0);
        for bad in [-50.0, 0.0, f64::NAN] {
            let err = stack_columns(band, &[("a", 100.0), ("b", bad)]).unwrap_err();
            assert!(matches!(err, FolioError::Configuration(_)), "{bad}");
        }
    }

    #[test]
    fn test_stack_columns() {
        let band = Rect::new(20.0, 300.0, 460.0, 100.0);
        let frames = stack_columns(band, &[("left", 100.0), ("right", 200.0)]).unwrap();
        assert_eq!(frames[0], Rect::new(20.0, 300.0, 100.0, 100.0));
        assert_eq!(frames[1], Rect::new(120.0, 300.0, 200.0, 100.0));
    }

    #[test]
    fn test_stack_columns_rejects_overflow() {
        let band = Rect::new(20.0, 300.0, 460.0, 100.0);
        let err = stack_columns(band, &[("a", 300.0), ("b", 200.0)]).unwrap_err();
        assert!(matches!(err, FolioError::Overflow { container: "Column", .. }));
    }

    #[test]
    fn test_split_tiles_usable_width() {
        let page_width = 612.0;
        let left = 36.0;
        let usable = page_width - 2.0 * left;
        for split in [vec![100.0], vec![25.0, 75.0], vec![20.0, 30.0, 50.0], vec![12.5; 8]] {
            let regions = split_regions(left, usable, &split).unwrap();
            assert!(approx(regions[0].0, left));
            for pair in regions.windows(2) {
                assert!(approx(pair[0].0 + pair[0].1, pair[1].0), "gap or overlap in {split:?}");
            }
            let (x, w) = regions.last().copied().unwrap();
            assert!(approx(x + w, page_width - left));
        }
    }

    #[test]
    fn test_split_must_sum_to_exactly_100() {
        for split in [vec![50.0, 49.0], vec![60.0, 50.0], vec![99.999, 0.001 / 2.0]] {
            let err = split_regions(0.0, 100.0, &split).unwrap_err();
            assert!(matches!(err, FolioError::Configuration(_)), "{split:?}");
        }
    }

    #[test]
    fn test_split_rejects_empty_and_non_positive() {
        assert!(split_regions(0.0, 100.0, &[]).is_err());
        assert!(split_regions(0.0, 100.0, &[110.0, -10.0]).is_err());
    }

    #[test]
    fn test_split_band_keeps_band_height() {
        let band = Rect::new(10.0, 50.0, 200.0, 80.0);
        let frames = split_band(band, &[50.0, 50.0]).unwrap();
        assert_eq!(frames[0], Rect::new(10.0, 50.0, 100.0, 80.0));
        assert_eq!(frames[1], Rect::new(110.0, 50.0, 100.0, 80.0));
    }
}
