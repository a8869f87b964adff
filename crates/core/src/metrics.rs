use serde::{Deserialize, Serialize};

pub const FALLBACK_CHAR_WIDTH_PX: f64 = 8.0;

/// Length in UTF-16 code units.
pub fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// A blank string counts as one word.
pub fn word_count(text: &str) -> usize {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        1
    } else {
        trimmed.split_whitespace().count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: String,
    pub size_px: f64,
    pub weight: u16,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size_px: 16.0,
            weight: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderContext {
    pub font: FontDescriptor,
    pub container_width: f64,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontDescriptor) -> f64;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, &FontDescriptor) -> f64,
{
    fn measure(&self, text: &str, font: &FontDescriptor) -> f64 {
        self(text, font)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageGlyphWidth {
    pub em_ratio: f64,
}

impl Default for AverageGlyphWidth {
    fn default() -> Self {
        Self { em_ratio: 0.5 }
    }
}

impl TextMeasurer for AverageGlyphWidth {
    fn measure(&self, text: &str, font: &FontDescriptor) -> f64 {
        text_len(text) as f64 * font.size_px * self.em_ratio
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub characters: usize,
    pub words: usize,
    pub pixel_width: f64,
    pub lines: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct LengthMetrics<M = AverageGlyphWidth> {
    measurer: M,
}

impl LengthMetrics<AverageGlyphWidth> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: TextMeasurer> LengthMetrics<M> {
    pub fn with_measurer(measurer: M) -> Self {
        Self { measurer }
    }

    pub fn measure(&self, text: &str, ctx: Option<&RenderContext>) -> TextMetrics {
        let characters = text_len(text);
        let words = word_count(text);

        let Some(ctx) = ctx else {
            return TextMetrics {
                characters,
                words,
                pixel_width: characters as f64 * FALLBACK_CHAR_WIDTH_PX,
                lines: None,
            };
        };

        let pixel_width = self.measurer.measure(text, &ctx.font);
        let lines = if ctx.container_width > 0.0 {
            Some((pixel_width / ctx.container_width).ceil() as u32)
        } else {
            None
        };

        TextMetrics {
            characters,
            words,
            pixel_width,
            lines,
        }
    }
}
