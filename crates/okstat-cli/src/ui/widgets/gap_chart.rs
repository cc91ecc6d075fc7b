use okstat_stats::quantile::QuantileGap;
use ratatui::{
    prelude::{Buffer, Rect},
    style::Color,
    widgets::{Block, Widget},
};

use crate::ui::widgets::{
    BAR_SYMBOL, bar_cells, block_horizontal_margin, block_vertical_margin, style,
};

const LABEL_WIDTH: u16 = 5;
const VALUE_WIDTH: u16 = 8;
const AXIS_SYMBOL: &str = "│";

/// Signed gap per percentile, drawn outward from a zero axis.
///
/// Negative gaps extend to the left of the axis and positive gaps to the
/// right. Bars are scaled so the largest absolute gap fills one side.
///
/// ```text
///   P5       ███│        -1.02
///  P50          │████    +1.41
/// ```
#[derive(Debug)]
pub struct GapChart<'a> {
    gaps: &'a [QuantileGap],
    color: Color,
    half_width: u16,
    max_gap: Option<f64>,
    block: Option<Block<'a>>,
}

impl<'a> GapChart<'a> {
    pub fn new(gaps: &'a [QuantileGap]) -> Self {
        Self {
            gaps,
            color: Color::Reset,
            half_width: 20,
            max_gap: None,
            block: None,
        }
    }

    pub fn color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    /// Number of cells on each side of the axis.
    pub fn half_width(self, half_width: u16) -> Self {
        Self { half_width, ..self }
    }

    /// Fixes the scale, so several charts can be compared side by side.
    pub fn max_gap(self, max_gap: f64) -> Self {
        Self {
            max_gap: Some(max_gap),
            ..self
        }
    }

    pub fn block(self, block: Block<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        LABEL_WIDTH
            + 1
            + self.half_width * 2
            + 1
            + VALUE_WIDTH
            + block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        u16::try_from(self.gaps.len()).unwrap_or(u16::MAX)
            + block_vertical_margin(self.block.as_ref())
    }

    fn scale(&self) -> f64 {
        self.max_gap.unwrap_or_else(|| {
            self.gaps
                .iter()
                .map(|gap| gap.gap.abs())
                .fold(0.0, f64::max)
        })
    }
}

impl Widget for GapChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &GapChart<'_> {
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

        let scale = self.scale();
        let axis_x = inner.x + LABEL_WIDTH + 1 + self.half_width;
        let bar_style = style::fg(self.color);

        for (y, gap) in (inner.y..inner.bottom()).zip(self.gaps) {
            buf.set_stringn(
                inner.x,
                y,
                format!("{:>w$}", format!("P{}", gap.percentile), w = usize::from(LABEL_WIDTH)),
                usize::from(LABEL_WIDTH),
                style::AXIS,
            );

            let cells = if scale > 0.0 {
                bar_cells(gap.gap.abs() / scale, self.half_width)
            } else {
                0
            };
            for i in 0..cells {
                let x = if gap.gap < 0.0 {
                    axis_x - 1 - i
                } else {
                    axis_x + 1 + i
                };
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_symbol(BAR_SYMBOL).set_style(bar_style);
                }
            }
            buf.set_string(axis_x, y, AXIS_SYMBOL, style::AXIS);
            buf.set_stringn(
                axis_x + 1 + self.half_width,
                y,
                format!(" {:+7.2}", gap.gap),
                usize::from(VALUE_WIDTH),
                style::DEFAULT,
            );
        }
    }
}
