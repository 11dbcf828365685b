use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub line_height: f64,
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: crate::element::DEFAULT_FONT_SIZE,
            line_height: crate::element::DEFAULT_LINE_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// Measures rendered text. Returns `None` when no measurement is available, in which case
/// callers fall back to [`estimate_width`].
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> Option<TextMetrics>;
}

/// Deterministic measurer based on terminal column width: each column is
/// `font_size * char_width_factor` pixels wide, so CJK and emoji count double.
#[derive(Debug, Clone)]
pub struct CharWidthTextMeasurer {
    pub char_width_factor: f64,
}

impl Default for CharWidthTextMeasurer {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
        }
    }
}

impl CharWidthTextMeasurer {
    pub fn text_lines(text: &str) -> Vec<String> {
        let t = text
            .replace("<br/>", "\n")
            .replace("<br />", "\n")
            .replace("<br>", "\n");
        t.split('\n').map(|s| s.to_string()).collect()
    }
}

impl TextMeasurer for CharWidthTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> Option<TextMetrics> {
        let lines = Self::text_lines(text);
        let font_size = style.font_size.max(1.0);
        let columns = lines.iter().map(|l| l.width()).max().unwrap_or(0);
        Some(TextMetrics {
            width: columns as f64 * font_size * self.char_width_factor,
            height: lines.len() as f64 * font_size * style.line_height,
            line_count: lines.len(),
        })
    }
}

/// Measurer that never measures; forces the character-count fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTextMeasurer;

impl TextMeasurer for NoopTextMeasurer {
    fn measure(&self, _text: &str, _style: &TextStyle) -> Option<TextMetrics> {
        None
    }
}

/// Rough width when nothing can measure: one font-size square per character.
///
/// This over-estimates proportional fonts and under-estimates wide glyphs. It exists only so
/// labels get a usable box without a measurer.
pub fn estimate_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size
}
