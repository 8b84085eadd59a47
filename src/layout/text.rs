use serde_json::Value;

use crate::style::AttrMap;
use crate::text_metrics;

const FALLBACK_FONT_SIZE: f32 = 16.0;
const FALLBACK_FONT_FAMILY: &str = "sans-serif";

/// The font-related subset of a text style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontHints<'a> {
    pub size: f32,
    pub family: &'a str,
}

impl<'a> FontHints<'a> {
    pub fn from_style(style: &'a AttrMap) -> Self {
        let size = style
            .get("font-size")
            .and_then(parse_font_size)
            .unwrap_or(FALLBACK_FONT_SIZE);
        let family = style
            .get("font-family")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_FONT_FAMILY);
        Self { size, family }
    }
}

fn parse_font_size(value: &Value) -> Option<f32> {
    let size: Option<f32> = match value {
        Value::Number(num) => num.as_f64().map(|v| v as f32),
        Value::String(text) => text.trim().trim_end_matches("px").trim().parse().ok(),
        _ => None,
    };
    size.filter(|size| *size > 0.0)
}

/// Width of a run of text. Implementations must be pure: the same text and
/// hints always give the same width.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font: &FontHints<'_>) -> f32;
}

/// Calibrated per-glyph table. Deterministic and independent of installed fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableMetrics;

impl TextMeasure for TableMetrics {
    fn text_width(&self, text: &str, font: &FontHints<'_>) -> f32 {
        table_text_width(text, font.size)
    }
}

/// Installed fonts first, the glyph table when the family cannot be resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMetrics;

impl TextMeasure for SystemMetrics {
    fn text_width(&self, text: &str, font: &FontHints<'_>) -> f32 {
        text_metrics::measure_text_width(text, font.size, font.family)
            .unwrap_or_else(|| table_text_width(text, font.size))
    }
}

pub(crate) fn table_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        '"' | '\'' => 0.355,
        'A' | 'B' | 'K' | 'X' => 0.650,
        'C' | 'D' => 0.730,
        'E' | 'L' => 0.577,
        'F' | 'T' => 0.587,
        'G' | 'H' | 'U' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'M' => 0.903,
        'N' | 'O' | 'Q' => 0.755,
        'P' | 'R' | 'S' | 'Y' | 'Z' => 0.630,
        'V' => 0.661,
        'W' => 0.958,
        'a' | 'z' | 'c' => 0.550,
        'b' | 'd' | 'g' | 'h' | 'p' | 'q' | 'n' | 'u' => 0.595,
        'e' | 'o' => 0.572,
        'f' => 0.340,
        'i' | 'j' | 'l' => 0.235,
        'k' | 's' | 'x' | 'v' | 'y' => 0.540,
        'm' => 0.867,
        'r' => 0.364,
        't' => 0.305,
        'w' => 0.811,
        '1' => 0.396,
        '0'..='9' => 0.605,
        '@' | '#' | '%' | '&' => 0.946,
        '\n' => 0.0,
        _ => 0.568,
    }
}
