//! # Visual Style Primitives
//!
//! Colors, the standard PDF fonts and text alignment. These are the only
//! style values the layout core and the table style compiler speak; a
//! backend maps them onto whatever it draws with.

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// An RGBA color with channels in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    /// Background of odd body rows in a zebra-striped table.
    pub const STRIPE_GRAY: Color = Color {
        r: 240.0 / 255.0,
        g: 240.0 / 255.0,
        b: 240.0 / 255.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#rgb` or `#rrggbb` (the `#` is optional).
    pub fn hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || FolioError::Configuration(format!("invalid hex color '{}'", hex));
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        let (r, g, b) = match digits.len() {
            3 => (
                channel(&digits[0..1].repeat(2))?,
                channel(&digits[1..2].repeat(2))?,
                channel(&digits[2..3].repeat(2))?,
            ),
            6 => (
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            ),
            _ => return Err(invalid()),
        };
        Ok(Self::rgb(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
        ))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// The standard PDF fonts the engine can reference without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StandardFont {
    #[default]
    Helvetica,
    #[serde(rename = "Helvetica-Bold")]
    HelveticaBold,
    #[serde(rename = "Times-Roman")]
    TimesRoman,
    #[serde(rename = "Times-Bold")]
    TimesBold,
    Courier,
    #[serde(rename = "Courier-Bold")]
    CourierBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Self::HelveticaBold | Self::TimesBold | Self::CourierBold)
    }

    /// Approximate advance width of `ch` at `font_size`.
    ///
    /// Courier is monospaced (600 units per em). The proportional faces use
    /// coarse glyph classes, which is close enough for greedy line breaking.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = match self {
            Self::Courier | Self::CourierBold => 600.0,
            _ => {
                let base = match ch {
                    ' ' | 'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | 'I' => 278.0,
                    'f' | 't' | 'r' | '(' | ')' | '-' => 333.0,
                    'm' | 'M' | 'W' => 833.0,
                    'w' => 722.0,
                    '0'..='9' => 556.0,
                    c if c.is_uppercase() => 667.0,
                    _ => 520.0,
                };
                match self {
                    Self::TimesRoman | Self::TimesBold => base * 0.9,
                    _ => base,
                }
            }
        };
        let weight = if self.is_bold() { 1.05 } else { 1.0 };
        units * weight / 1000.0 * font_size
    }

    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|c| self.char_width(c, font_size)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
}
