//! Item tables that flow across pages.

use std::ops::Range;

use super::canvas::{wrap_text, Align, Canvas};
use super::metrics::Font;

const PADDING: f32 = 3.0;
/// Room kept under a page's last row for the "continued" marker.
const MARKER_HEIGHT: f32 = 12.0;

#[derive(Debug, Clone)]
pub struct Column {
    pub title: String,
    /// Share of the table width; shares are normalised when drawn.
    pub width: f32,
    pub align: Align,
}

impl Column {
    pub fn new(title: impl Into<String>, width: f32, align: Align) -> Self {
        Self {
            title: title.into(),
            width,
            align,
        }
    }
}

/// Splits rows into pages.
///
/// `heights` are row heights; every page starts with a `header` row. The first
/// page offers `first_available` points, later pages `page_available`. A row
/// never splits, and a row taller than a page gets a page of its own. When the
/// last page cannot also hold `reserve` points and has more than one row, its
/// final row moves to a fresh page so the block after the table is never
/// orphaned.
pub fn paginate(
    heights: &[f32],
    first_available: f32,
    page_available: f32,
    header: f32,
    reserve: f32,
) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut available = first_available;
    let mut used = header;

    for (i, height) in heights.iter().enumerate() {
        if used + height > available && i > start {
            pages.push(start..i);
            start = i;
            available = page_available;
            used = header;
        }
        used += height;
    }

    let last = start..heights.len();
    if used + reserve > available && last.len() > 1 {
        pages.push(start..heights.len() - 1);
        pages.push(heights.len() - 1..heights.len());
    } else {
        pages.push(last);
    }
    pages
}

pub struct Table {
    columns: Vec<Column>,
    font_size: f32,
}

impl Table {
    pub fn new(columns: Vec<Column>, font_size: f32) -> Self {
        Self { columns, font_size }
    }

    fn line_height(&self) -> f32 {
        self.font_size * 1.25
    }

    fn widths(&self, total: f32) -> Vec<f32> {
        let shares: f32 = self.columns.iter().map(|c| c.width).sum();
        self.columns
            .iter()
            .map(|c| total * c.width / shares.max(f32::EPSILON))
            .collect()
    }

    fn wrap_row(&self, row: &[String], widths: &[f32], font: Font) -> Vec<Vec<String>> {
        row.iter()
            .zip(widths)
            .map(|(cell, width)| wrap_text(cell, font, self.font_size, width - 2.0 * PADDING))
            .collect()
    }

    fn row_height(&self, cells: &[Vec<String>]) -> f32 {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        lines as f32 * self.line_height() + 2.0 * PADDING
    }

    fn draw_row(
        &self,
        canvas: &mut Canvas,
        cells: &[Vec<String>],
        widths: &[f32],
        font: Font,
        height: f32,
    ) {
        let top = canvas.cursor();
        let mut x = canvas.left();
        for ((lines, width), column) in cells.iter().zip(widths).zip(&self.columns) {
            let mut baseline = top + PADDING + self.font_size;
            for line in lines {
                canvas.text_aligned(
                    font,
                    x + PADDING,
                    width - 2.0 * PADDING,
                    baseline,
                    self.font_size,
                    column.align,
                    line,
                );
                baseline += self.line_height();
            }
            x += width;
        }
        canvas.advance(height);
    }

    fn draw_header(&self, canvas: &mut Canvas, widths: &[f32]) {
        let titles: Vec<String> = self.columns.iter().map(|c| c.title.clone()).collect();
        let cells = self.wrap_row(&titles, widths, Font::Bold);
        let height = self.row_height(&cells);
        let (left, width, top) = (canvas.left(), canvas.width(), canvas.cursor());
        canvas.fill_rect(left, top, width, height, 0.9);
        self.draw_row(canvas, &cells, widths, Font::Bold, height);
        canvas.line(left, top + height, left + width, top + height, 0.5);
    }

    /// Draws `rows` from the cursor down, breaking pages as needed, and
    /// leaves the cursor under the last row. `reserve_after` is the height of
    /// whatever must follow the table on its last page.
    pub fn draw(&self, canvas: &mut Canvas, rows: &[Vec<String>], reserve_after: f32) {
        let widths = self.widths(canvas.width());
        let titles: Vec<String> = self.columns.iter().map(|c| c.title.clone()).collect();
        let header = self.row_height(&self.wrap_row(&titles, &widths, Font::Bold));

        let wrapped: Vec<Vec<Vec<String>>> = rows
            .iter()
            .map(|row| self.wrap_row(row, &widths, Font::Regular))
            .collect();
        let heights: Vec<f32> = wrapped.iter().map(|cells| self.row_height(cells)).collect();

        canvas.ensure_space(header + heights.first().copied().unwrap_or(0.0));
        let pages = paginate(
            &heights,
            canvas.remaining() - MARKER_HEIGHT,
            canvas.page_height() - MARKER_HEIGHT,
            header,
            reserve_after,
        );

        let page_count = pages.len();
        for (index, range) in pages.into_iter().enumerate() {
            if index > 0 {
                canvas.new_page();
            }
            let top = canvas.cursor();
            self.draw_header(canvas, &widths);
            for i in range {
                self.draw_row(canvas, &wrapped[i], &widths, Font::Regular, heights[i]);
                let y = canvas.cursor();
                let (left, right) = (canvas.left(), canvas.right());
                canvas.line(left, y, right, y, 0.2);
            }
            let bottom = canvas.cursor();
            let (left, width) = (canvas.left(), canvas.width());
            canvas.rect(left, top, width, bottom - top);

            if index + 1 < page_count {
                let right = canvas.right();
                let next = canvas.page_number() + 1;
                canvas.text_right(
                    Font::Regular,
                    right,
                    bottom + MARKER_HEIGHT - 2.0,
                    self.font_size - 1.0,
                    &format!("continued on page {}", next),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::canvas::Margins;

    #[test]
    fn rows_that_fit_stay_on_one_page() {
        let pages = paginate(&[20.0; 5], 500.0, 700.0, 20.0, 100.0);
        assert_eq!(pages, vec![0..5]);
    }

    #[test]
    fn rows_flow_onto_later_pages_with_a_header_each() {
        // 100 available: header 20 leaves room for four 20pt rows
        let pages = paginate(&[20.0; 10], 100.0, 100.0, 20.0, 0.0);
        assert_eq!(pages, vec![0..4, 4..8, 8..10]);
    }

    #[test]
    fn a_row_is_never_split() {
        let pages = paginate(&[30.0, 30.0, 50.0], 120.0, 120.0, 20.0, 0.0);
        assert_eq!(pages, vec![0..2, 2..3]);
    }

    #[test]
    fn oversized_rows_get_their_own_page() {
        let pages = paginate(&[10.0, 500.0, 10.0], 100.0, 100.0, 20.0, 0.0);
        assert_eq!(pages, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn totals_reserve_pulls_the_last_row_forward() {
        let pages = paginate(&[20.0; 4], 100.0, 100.0, 20.0, 30.0);
        assert_eq!(pages, vec![0..3, 3..4]);
    }

    #[test]
    fn a_lone_last_row_is_not_moved_again() {
        let pages = paginate(&[90.0], 100.0, 100.0, 10.0, 50.0);
        assert_eq!(pages, vec![0..1]);
    }

    #[test]
    fn empty_tables_still_get_a_header_page() {
        assert_eq!(paginate(&[], 100.0, 100.0, 20.0, 0.0), vec![0..0]);
    }

    #[test]
    fn long_tables_repeat_the_header_and_mark_continuation() {
        let table = Table::new(
            vec![
                Column::new("#", 1.0, Align::Right),
                Column::new("Description", 6.0, Align::Left),
                Column::new("Amount", 2.0, Align::Right),
            ],
            9.0,
        );
        let rows: Vec<Vec<String>> = (1..=120)
            .map(|i| vec![i.to_string(), format!("Item {}", i), "10.00".to_string()])
            .collect();
        let mut canvas = Canvas::new(Margins::default());
        table.draw(&mut canvas, &rows, 80.0);
        assert!(canvas.page_number() > 1);

        let pages = canvas.finish(8.0, |p, t| format!("Page {} of {}", p, t));
        for page in &pages {
            let text = String::from_utf8_lossy(page);
            assert!(text.contains("(Description)"));
        }
        assert!(String::from_utf8_lossy(&pages[0]).contains("(continued on page 2)"));
        assert!(!String::from_utf8_lossy(pages.last().unwrap()).contains("continued on page"));
    }
}
