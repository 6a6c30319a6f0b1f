//! Half-block image rendering.
//!
//! Each terminal cell shows two vertically stacked pixels: the upper one as
//! the foreground of `▀`, the lower one as the background. The image is
//! nearest-neighbour sampled to fit `width` columns, keeping its aspect ratio.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::imaging::Image;

const UPPER_HALF: &str = "▀";

/// Rows of cells needed to show `image` at `width` columns.
pub fn rows_for(image: &Image, width: u16) -> u16 {
    if image.width() == 0 || width == 0 {
        return 0;
    }
    let pixel_rows = (image.height() as u64 * width as u64).div_ceil(image.width() as u64);
    pixel_rows.div_ceil(2).min(u16::MAX as u64) as u16
}

pub fn thumbnail_lines(image: &Image, width: u16, max_rows: u16) -> Vec<Line<'static>> {
    let rows = rows_for(image, width).min(max_rows);
    if rows == 0 {
        return Vec::new();
    }
    let pixel_rows = rows as u32 * 2;

    let sample = |col: u16, pixel_row: u32| {
        let x = col as u32 * image.width() / width as u32;
        let y = pixel_row * image.height() / pixel_rows;
        let [r, g, b] = image.rgb_at(x, y);
        Color::Rgb(r, g, b)
    };

    (0..rows)
        .map(|row| {
            let spans: Vec<Span> = (0..width)
                .map(|col| {
                    let top = sample(col, row as u32 * 2);
                    let bottom = sample(col, row as u32 * 2 + 1);
                    Span::styled(UPPER_HALF, Style::default().fg(top).bg(bottom))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_keep_aspect_ratio() {
        let wide = Image::solid(40, 20, [0, 0, 0]);
        // 20 columns → 10 pixel rows → 5 cell rows
        assert_eq!(rows_for(&wide, 20), 5);
    }

    #[test]
    fn test_lines_are_clamped_to_max_rows() {
        let tall = Image::solid(10, 100, [0, 0, 0]);
        let lines = thumbnail_lines(&tall, 10, 4);
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.spans.len() == 10));
    }

    #[test]
    fn test_cell_colours_come_from_pixels() {
        let image = Image::solid(2, 2, [10, 20, 30]);
        let lines = thumbnail_lines(&image, 2, 10);
        let style = lines[0].spans[0].style;
        assert_eq!(style.fg, Some(Color::Rgb(10, 20, 30)));
        assert_eq!(style.bg, Some(Color::Rgb(10, 20, 30)));
    }

    #[test]
    fn test_zero_width_renders_nothing() {
        assert!(thumbnail_lines(&Image::solid(2, 2, [0, 0, 0]), 0, 10).is_empty());
    }
}
