use std::{
    borrow::Cow,
    time::Instant,
};

/// Text which does not fit into its cell.
/// The selected row scrolls back and forth, all other rows get truncated.
///
/// Widths are measured in chars, so paths with multibyte names can be sliced safely.
pub struct ScrollableText {
    baseline: Instant,

    /// The text scroll speed in characters per second
    scroll_speed: f32,

    overscroll_start: usize,
    overscroll_end: usize,

    text: String,
    char_count: usize,
}

impl ScrollableText {
    pub fn new(text: String) -> Self {
        Self {
            char_count: text.chars().count(),
            text,
            baseline: Instant::now(),

            scroll_speed: 6.0,
            overscroll_start: 5,
            overscroll_end: 5,
        }
    }

    pub fn reset_scroll(&mut self) {
        self.baseline = Instant::now();
    }

    fn char_slice(&self, offset: usize, length: usize) -> &str {
        let mut indices = self
            .text
            .char_indices()
            .map(|(index, _)| index)
            .chain([self.text.len()]);

        let start = indices.nth(offset).unwrap_or(self.text.len());
        let end = if length == 0 {
            start
        } else {
            indices.nth(length - 1).unwrap_or(self.text.len())
        };
        &self.text[start..end]
    }

    pub fn display_value(&self, max_width: usize) -> Cow<str> {
        if self.char_count <= max_width {
            return (&self.text).into();
        }

        let overflow = self.char_count - max_width;
        let sequence_length = self.overscroll_start + overflow + self.overscroll_end;

        let time_offset = self.baseline.elapsed().as_millis() as f32 / 1000.0;
        let char_offset = (time_offset * self.scroll_speed) as usize % sequence_length;
        let char_offset = if char_offset < self.overscroll_start {
            0
        } else {
            (char_offset - self.overscroll_start).min(overflow)
        };

        self.char_slice(char_offset, max_width).into()
    }

    pub fn fixed_value(&self, max_width: usize) -> Cow<str> {
        if self.char_count <= max_width {
            (&self.text).into()
        } else if max_width >= 3 {
            format!("{}...", self.char_slice(0, max_width - 3)).into()
        } else {
            "..."[0..max_width].into()
        }
    }
}
