//! # Physical Lengths
//!
//! Callers declare row heights, column widths and paddings in whatever unit
//! suits them (reports are usually sketched in centimeters). Everything is
//! converted to PDF points exactly once, when the [`Length`] is built, so the
//! layout code only ever does arithmetic in points.

use serde::{Deserialize, Serialize};

pub const POINTS_PER_INCH: f64 = 72.0;
pub const POINTS_PER_CM: f64 = POINTS_PER_INCH / 2.54;
pub const POINTS_PER_MM: f64 = POINTS_PER_CM / 10.0;

/// A length in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Length(f64);

impl Length {
    pub const ZERO: Length = Length(0.0);

    pub fn pt(v: f64) -> Self {
        Length(v)
    }

    pub fn cm(v: f64) -> Self {
        Length(v * POINTS_PER_CM)
    }

    pub fn mm(v: f64) -> Self {
        Length(v * POINTS_PER_MM)
    }

    pub fn inches(v: f64) -> Self {
        Length(v * POINTS_PER_INCH)
    }

    /// The value in points.
    pub fn points(self) -> f64 {
        self.0
    }
}

/// The unit numbers in a JSON report are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "pt")]
    Point,
    #[default]
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "in")]
    Inch,
}

impl Unit {
    pub fn length(self, value: f64) -> Length {
        match self {
            Unit::Point => Length::pt(value),
            Unit::Centimeter => Length::cm(value),
            Unit::Millimeter => Length::mm(value),
            Unit::Inch => Length::inches(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert!((Length::inches(1.0).points() - 72.0).abs() < 1e-9);
        assert!((Length::cm(2.54).points() - 72.0).abs() < 1e-9);
        assert!((Length::mm(25.4).points() - 72.0).abs() < 1e-9);
        assert_eq!(Length::pt(12.5).points(), 12.5);
    }

    #[test]
    fn test_unit_deserializes_from_short_names() {
        let unit: Unit = serde_json::from_str("\"mm\"").unwrap();
        assert_eq!(unit, Unit::Millimeter);
        assert!((unit.length(10.0).points() - Length::cm(1.0).points()).abs() < 1e-9);
        assert_eq!(Unit::default(), Unit::Centimeter);
    }
}
