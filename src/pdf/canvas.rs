//! Page canvas in top-left coordinates.
//!
//! Drawing calls take `y` measured downwards from the top edge of the page and
//! are translated to PDF user space when the operator is written. A vertical
//! cursor tracks where the next block goes; `ensure_space` starts a new page
//! when a block would run into the bottom margin.

use std::fmt::Write as _;

use super::metrics::{text_width, Font};
use super::writer::literal_string;
use super::{PAGE_HEIGHT, PAGE_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 36.0,
            right: 36.0,
            bottom: 48.0,
            left: 36.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Appends operators to one page's content stream.
#[derive(Debug, Default, Clone)]
struct Ops(Vec<u8>);

impl Ops {
    fn push(&mut self, op: &str) {
        self.0.extend_from_slice(op.as_bytes());
    }

    fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        self.push(&format!(
            "BT /{} {:.1} Tf {:.2} {:.2} Td ",
            font.resource(),
            size,
            x,
            PAGE_HEIGHT - y
        ));
        self.0.extend_from_slice(&literal_string(text));
        self.push(" Tj ET\n");
    }
}

pub struct Canvas {
    margins: Margins,
    pages: Vec<Vec<u8>>,
    current: Ops,
    cursor: f32,
}

impl Canvas {
    pub fn new(margins: Margins) -> Self {
        Self {
            margins,
            pages: Vec::new(),
            current: Ops::default(),
            cursor: margins.top,
        }
    }

    pub fn left(&self) -> f32 {
        self.margins.left
    }

    pub fn right(&self) -> f32 {
        PAGE_WIDTH - self.margins.right
    }

    pub fn width(&self) -> f32 {
        self.right() - self.left()
    }

    /// Lowest y a block may reach.
    pub fn bottom(&self) -> f32 {
        PAGE_HEIGHT - self.margins.bottom
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn set_cursor(&mut self, y: f32) {
        self.cursor = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor += dy;
    }

    /// Space left between the cursor and the bottom margin.
    pub fn remaining(&self) -> f32 {
        self.bottom() - self.cursor
    }

    /// Usable height of a fresh page.
    pub fn page_height(&self) -> f32 {
        self.bottom() - self.margins.top
    }

    /// 1-based number of the page being drawn.
    pub fn page_number(&self) -> usize {
        self.pages.len() + 1
    }

    pub fn new_page(&mut self) {
        let done = std::mem::take(&mut self.current);
        self.pages.push(done.0);
        self.cursor = self.margins.top;
    }

    /// Breaks the page when `height` does not fit; returns whether it did.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        if height <= self.remaining() || self.cursor <= self.margins.top {
            return false;
        }
        self.new_page();
        true
    }

    pub fn text(&mut self, x: f32, y: f32, size: f32, text: &str) {
        self.current.text(Font::Regular, size, x, y, text);
    }

    pub fn bold(&mut self, x: f32, y: f32, size: f32, text: &str) {
        self.current.text(Font::Bold, size, x, y, text);
    }

    /// Places `text` inside `[x, x + width]` with the given alignment.
    pub fn text_aligned(
        &mut self,
        font: Font,
        x: f32,
        width: f32,
        y: f32,
        size: f32,
        align: Align,
        text: &str,
    ) {
        let w = text_width(font, text, size);
        let start = match align {
            Align::Left => x,
            Align::Center => x + (width - w) / 2.0,
            Align::Right => x + width - w,
        };
        self.current.text(font, size, start, y, text);
    }

    pub fn text_right(&mut self, font: Font, right: f32, y: f32, size: f32, text: &str) {
        let w = text_width(font, text, size);
        self.current.text(font, size, right - w, y, text);
    }

    pub fn text_center(&mut self, font: Font, y: f32, size: f32, text: &str) {
        let (left, width) = (self.left(), self.width());
        self.text_aligned(font, left, width, y, size, Align::Center, text);
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32) {
        self.current.push(&format!(
            "{:.2} w {:.2} {:.2} m {:.2} {:.2} l S\n",
            width,
            x1,
            PAGE_HEIGHT - y1,
            x2,
            PAGE_HEIGHT - y2
        ));
    }

    /// Horizontal rule across the content width at `y`.
    pub fn rule(&mut self, y: f32, width: f32) {
        let (left, right) = (self.left(), self.right());
        self.line(left, y, right, y, width);
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.current.push(&format!(
            "0.5 w {:.2} {:.2} {:.2} {:.2} re S\n",
            x,
            PAGE_HEIGHT - y - h,
            w,
            h
        ));
    }

    /// Filled rectangle in a grey level between 0 (black) and 1 (white).
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, grey: f32) {
        let mut op = String::new();
        let _ = write!(
            op,
            "{:.2} g {:.2} {:.2} {:.2} {:.2} re f 0 g\n",
            grey.clamp(0.0, 1.0),
            x,
            PAGE_HEIGHT - y - h,
            w,
            h
        );
        self.current.push(&op);
    }

    /// Draws `footer(page, total)` centred under the bottom margin of every
    /// page, then returns the content streams.
    pub fn finish<F>(mut self, size: f32, footer: F) -> Vec<Vec<u8>>
    where
        F: Fn(usize, usize) -> String,
    {
        let last = std::mem::take(&mut self.current);
        self.pages.push(last.0);

        let total = self.pages.len();
        let y = PAGE_HEIGHT - self.margins.bottom / 2.0;
        let (left, width) = (self.left(), self.width());
        self.pages
            .into_iter()
            .enumerate()
            .map(|(i, content)| {
                let mut ops = Ops(content);
                let label = footer(i + 1, total);
                let w = text_width(Font::Regular, &label, size);
                ops.text(Font::Regular, size, left + (width - w) / 2.0, y, &label);
                ops.0
            })
            .collect()
    }
}

/// Splits `text` into lines no wider than `max_width`.
///
/// Existing line breaks are kept; words longer than a line are cut.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if text_width(font, &candidate, size) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if text_width(font, word, size) <= max_width {
                line = word.to_string();
                continue;
            }
            for ch in word.chars() {
                line.push(ch);
                if text_width(font, &line, size) > max_width && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(ch);
                }
            }
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_flipped_into_pdf_space() {
        let mut canvas = Canvas::new(Margins::default());
        canvas.text(36.0, 100.0, 10.0, "Hi");
        let pages = canvas.finish(8.0, |p, t| format!("Page {} of {}", p, t));
        let content = String::from_utf8(pages[0].clone()).unwrap();
        assert!(content.contains("BT /F1 10.0 Tf 36.00 741.89 Td (Hi) Tj ET"));
        assert!(content.contains("(Page 1 of 1)"));
    }

    #[test]
    fn ensure_space_breaks_pages() {
        let mut canvas = Canvas::new(Margins::default());
        canvas.advance(700.0);
        assert!(!canvas.ensure_space(50.0));
        assert!(canvas.ensure_space(100.0));
        assert_eq!(canvas.page_number(), 2);
        assert_eq!(canvas.cursor(), Margins::default().top);
        let pages = canvas.finish(8.0, |p, t| format!("Page {} of {}", p, t));
        assert_eq!(pages.len(), 2);
        assert!(String::from_utf8_lossy(&pages[0]).contains("(Page 1 of 2)"));
    }

    #[test]
    fn fresh_pages_never_break_again() {
        let mut canvas = Canvas::new(Margins::default());
        assert!(!canvas.ensure_space(10_000.0));
    }

    #[test]
    fn wrapping_respects_width_and_breaks() {
        let lines = wrap_text("Cotton knitted T-shirts, crew neck\nAssorted colours", Font::Regular, 10.0, 100.0);
        assert!(lines.len() >= 3);
        assert!(lines
            .iter()
            .all(|l| text_width(Font::Regular, l, 10.0) <= 100.0));
        assert_eq!(lines.last().map(String::as_str), Some("Assorted colours"));
    }

    #[test]
    fn long_words_are_cut() {
        let lines = wrap_text("ABCDEFGHIJKLMNOPQRSTUVWXYZ", Font::Bold, 12.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }
}
