use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Text measurement used for header labels and cell auto-fit.
pub trait TextMeasure {
    fn text_width(&self, text: &str) -> f32;
    fn char_width(&self, c: char) -> f32;
    fn line_height(&self) -> f32;
}

/// Fixed-advance measurement. Wide glyphs take two cells, zero-width ones none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonoMeasure {
    pub cell_width: f32,
    pub line_height: f32,
}

impl MonoMeasure {
    pub const fn new(cell_width: f32, line_height: f32) -> Self {
        Self {
            cell_width,
            line_height,
        }
    }
}

impl Default for MonoMeasure {
    fn default() -> Self {
        Self::new(7.0, 13.0)
    }
}

impl TextMeasure for MonoMeasure {
    fn text_width(&self, text: &str) -> f32 {
        text.width() as f32 * self.cell_width
    }

    fn char_width(&self, c: char) -> f32 {
        c.width().unwrap_or(0) as f32 * self.cell_width
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

/// Label text up to the first `##`, which separates the visible part from an id suffix.
pub fn visible_label(label: &str) -> &str {
    match label.find("##") {
        Some(pos) => &label[..pos],
        None => label,
    }
}
