use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Style},
    widgets::{Block, Widget},
};

use crate::ui::widgets::{
    ALT_BAR_SYMBOL, BAR_SYMBOL, bar_cells, block_horizontal_margin, block_vertical_margin, color,
    style,
};

const MAX_LABEL_WIDTH: u16 = 40;
const VALUE_WIDTH: u16 = 7;

/// One row of a [`DivergingBarChart`].
#[derive(Debug, Clone, PartialEq)]
pub struct DivergingBar {
    pub label: String,
    /// Share of the left series in `[0, 1]`. `None` leaves the row empty.
    pub ratio: Option<f64>,
}

impl DivergingBar {
    pub fn new(label: impl Into<String>, ratio: Option<f64>) -> Self {
        Self {
            label: label.into(),
            ratio,
        }
    }
}

/// Horizontal bars split at `ratio`: the left series fills `[0, ratio)`, the
/// right series `[ratio, 1]`, so the two meet at the midline when both are
/// equally represented.
///
/// ```text
///       label ████████▒▒  80.0%
/// ```
#[derive(Debug)]
pub struct DivergingBarChart<'a> {
    bars: Vec<DivergingBar>,
    left: (&'a str, Color),
    right: (&'a str, Color),
    bar_width: u16,
    block: Option<Block<'a>>,
}

impl<'a> DivergingBarChart<'a> {
    pub fn new(bars: Vec<DivergingBar>) -> Self {
        Self {
            bars,
            left: ("", color::GREEN),
            right: ("", color::BLUE),
            bar_width: 40,
            block: None,
        }
    }

    pub fn left(self, name: &'a str, color: Color) -> Self {
        Self {
            left: (name, color),
            ..self
        }
    }

    pub fn right(self, name: &'a str, color: Color) -> Self {
        Self {
            right: (name, color),
            ..self
        }
    }

    pub fn bar_width(self, bar_width: u16) -> Self {
        Self { bar_width, ..self }
    }

    pub fn block(self, block: Block<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn label_width(&self) -> u16 {
        let widest = self
            .bars
            .iter()
            .map(|bar| bar.label.chars().count())
            .max()
            .unwrap_or(0);
        u16::try_from(widest).map_or(MAX_LABEL_WIDTH, |w| w.min(MAX_LABEL_WIDTH))
    }

    pub fn width(&self) -> u16 {
        self.label_width()
            + 1
            + self.bar_width
            + VALUE_WIDTH
            + block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        // header and axis rows around the bars
        let rows = u16::try_from(self.bars.len()).unwrap_or(u16::MAX);
        rows.saturating_add(2) + block_vertical_margin(self.block.as_ref())
    }

    fn label_style(&self, ratio: Option<f64>) -> Style {
        match ratio {
            Some(ratio) => style::fg(color::blend(self.left.1, self.right.1, ratio)),
            None => style::AXIS,
        }
    }
}

impl Widget for DivergingBarChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &DivergingBarChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let inner = match &self.block {
            Some(block) => {
                block.render(area, buf);
                block.inner(area)
            }
            None => area,
        };
        if inner.is_empty() {
            return;
        }

        let label_width = self.label_width();
        let bar_x = inner.x + label_width + 1;
        let bar_width = self.bar_width.min(inner.right().saturating_sub(bar_x));

        let (left_name, left_color) = self.left;
        let (right_name, right_color) = self.right;
        buf.set_stringn(
            bar_x,
            inner.y,
            left_name,
            usize::from(bar_width / 2),
            style::fg(left_color),
        );
        let right_len = u16::try_from(right_name.chars().count()).unwrap_or(bar_width);
        let right_x = (bar_x + bar_width).saturating_sub(right_len).max(bar_x + bar_width / 2);
        buf.set_stringn(
            right_x,
            inner.y,
            right_name,
            usize::from(bar_x + bar_width - right_x),
            style::fg(right_color),
        );

        for (i, bar) in self.bars.iter().enumerate() {
            let Ok(offset) = u16::try_from(i + 1) else {
                break;
            };
            let y = inner.y + offset;
            if y >= inner.bottom() {
                break;
            }

            let label_len = u16::try_from(bar.label.chars().count()).unwrap_or(label_width);
            let label_x = inner.x + label_width.saturating_sub(label_len);
            buf.set_stringn(
                label_x,
                y,
                &bar.label,
                usize::from(label_width),
                self.label_style(bar.ratio),
            );

            let Some(ratio) = bar.ratio else {
                continue;
            };
            let split = bar_cells(ratio, bar_width);
            for dx in 0..bar_width {
                let (symbol, color) = if dx < split {
                    (BAR_SYMBOL, left_color)
                } else {
                    (ALT_BAR_SYMBOL, right_color)
                };
                if let Some(cell) = buf.cell_mut((bar_x + dx, y)) {
                    cell.set_symbol(symbol).set_style(style::fg(color));
                }
            }
            buf.set_stringn(
                bar_x + bar_width,
                y,
                format!(" {:5.1}%", ratio * 100.0),
                usize::from(VALUE_WIDTH),
                style::DEFAULT,
            );
        }

        let axis_y = inner.y + u16::try_from(self.bars.len() + 1).unwrap_or(u16::MAX);
        if axis_y < inner.bottom() && bar_width >= 3 {
            buf.set_string(bar_x, axis_y, "0", style::AXIS);
            buf.set_string(bar_x + bar_width / 2 - 1, axis_y, "0.5", style::AXIS);
            buf.set_string(bar_x + bar_width - 1, axis_y, "1", style::AXIS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::print;

    fn count(line: &str, symbol: &str) -> usize {
        line.matches(symbol).count()
    }

    #[test]
    fn test_bar_lengths_follow_ratios() {
        let chart = DivergingBarChart::new(vec![
            DivergingBar::new("B", Some(0.2)),
            DivergingBar::new("A", Some(0.8)),
            DivergingBar::new("none", None),
        ])
        .left("men", color::GREEN)
        .right("women", color::BLUE)
        .bar_width(10);
        let buf = print::render(&chart, chart.width(), chart.height());
        let lines = print::buffer_lines(&buf);

        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("men"));
        assert!(lines[0].ends_with("women"));

        assert!(lines[1].starts_with("   B "));
        assert_eq!(count(&lines[1], BAR_SYMBOL), 2);
        assert_eq!(count(&lines[1], ALT_BAR_SYMBOL), 8);
        assert!(lines[1].ends_with("20.0%"));

        assert_eq!(count(&lines[2], BAR_SYMBOL), 8);
        assert_eq!(count(&lines[2], ALT_BAR_SYMBOL), 2);

        assert_eq!(lines[3], "none");
        assert!(lines[4].contains("0.5"));
    }

    #[test]
    fn test_label_color_blends_series_colors() {
        let chart = DivergingBarChart::new(vec![DivergingBar::new("x", Some(1.0))])
            .left("", Color::Rgb(10, 20, 30))
            .right("", Color::Rgb(0, 0, 0))
            .bar_width(4);
        let buf = print::render(&chart, chart.width(), chart.height());
        assert_eq!(buf[(0, 1)].fg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn test_block_adds_margins() {
        let chart = DivergingBarChart::new(vec![DivergingBar::new("a", Some(0.5))])
            .bar_width(6)
            .block(Block::bordered());
        assert_eq!(chart.height(), 1 + 2 + 2);
        assert_eq!(chart.width(), 1 + 1 + 6 + VALUE_WIDTH + 2);
        let buf = print::render(&chart, chart.width(), chart.height());
        let lines = print::buffer_lines(&buf);
        assert_eq!(count(&lines[2], BAR_SYMBOL), 3);
    }
}
