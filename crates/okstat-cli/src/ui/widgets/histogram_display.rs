use std::ops::Range;

use okstat_stats::histogram::Histogram;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    prelude::{Buffer, Rect},
    style::Color,
    text::Line,
    widgets::{Bar, BarChart, Block, Widget},
};

use crate::ui::widgets::{block_vertical_margin, style};

/// Horizontal bar chart of histogram bins, one row per bin.
///
/// Values outside the binned range are summarized on a footer line.
#[derive(Debug)]
pub struct HistogramDisplay<'a> {
    histogram: &'a Histogram,
    color: Color,
    block: Option<Block<'a>>,
}

impl<'a> HistogramDisplay<'a> {
    pub fn new(histogram: &'a Histogram) -> Self {
        Self {
            histogram,
            color: Color::Reset,
            block: None,
        }
    }

    pub fn color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    pub fn block(self, block: Block<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn footer_height(&self) -> u16 {
        u16::from(self.histogram.underflow > 0 || self.histogram.overflow > 0)
    }

    pub fn height(&self) -> u16 {
        u16::try_from(self.histogram.bins.len()).unwrap_or(u16::MAX)
            + self.footer_height()
            + block_vertical_margin(self.block.as_ref())
    }
}

fn bin_label(range: &Range<f64>) -> String {
    let unit = (range.end - range.start - 1.0).abs() < 1e-9 && range.start.fract() == 0.0;
    if unit {
        format!("{:.0}", range.start)
    } else {
        format!("{:.1}-{:.1}", range.start, range.end)
    }
}

impl Widget for HistogramDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &HistogramDisplay<'_> {
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

        let [bars_area, footer_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(self.footer_height())])
                .areas(inner);

        let chart = BarChart::new(
            self.histogram
                .bins
                .iter()
                .map(|bin| {
                    Bar::with_label(bin_label(&bin.range), bin.count)
                        .text_value(format!("{}", bin.count))
                })
                .collect::<Vec<_>>(),
        )
        .direction(Direction::Horizontal)
        .bar_style(style::fg(self.color))
        .bar_gap(0);
        Widget::render(chart, bars_area, buf);

        if !footer_area.is_empty() {
            let footer = Line::styled(
                format!(
                    "below range: {}  above range: {}",
                    self.histogram.underflow, self.histogram.overflow
                ),
                style::AXIS,
            );
            Widget::render(footer, footer_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::print;

    #[test]
    fn test_bin_label() {
        assert_eq!(bin_label(&(21.0..22.0)), "21");
        assert_eq!(bin_label(&(60.0..62.5)), "60.0-62.5");
    }

    #[test]
    fn test_one_row_per_bin() {
        let histogram = Histogram::unit_bins([20.0, 21.0, 21.0, 23.0]);
        let display = HistogramDisplay::new(&histogram);
        assert_eq!(display.height(), 4);

        let buf = print::render(&display, 30, display.height());
        let lines = print::buffer_lines(&buf);
        for (line, label) in lines.iter().zip(["20", "21", "22", "23"]) {
            assert!(line.starts_with(label), "{line:?}");
        }
    }

    #[test]
    fn test_footer_reports_out_of_range_values() {
        let histogram = Histogram::new([10.0, 20.0, 90.0, 95.0], 18.0, 22.0, 1.0);
        let display = HistogramDisplay::new(&histogram).block(Block::bordered());
        assert_eq!(display.height(), 4 + 1 + 2);

        let buf = print::render(&display, 40, display.height());
        let lines = print::buffer_lines(&buf);
        assert!(lines[5].contains("below range: 1  above range: 2"), "{lines:?}");
    }
}
