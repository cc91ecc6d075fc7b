use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{diverging_bar_chart::*, gap_chart::*, histogram_display::*};

mod diverging_bar_chart;
mod gap_chart;
mod histogram_display;

pub mod color {
    use okstat_analysis::profile::Sex;
    use ratatui::style::Color;

    pub const GREEN: Color = Color::Rgb(0, 160, 0);
    pub const BLUE: Color = Color::Rgb(40, 90, 255);
    pub const GRAY: Color = Color::Rgb(127, 127, 127);

    /// Color of a sex in every chart.
    pub const fn sex(sex: Sex) -> Color {
        match sex {
            Sex::Male => GREEN,
            Sex::Female => BLUE,
        }
    }

    /// Linear blend between `a` (at `t = 1`) and `b` (at `t = 0`).
    ///
    /// Non-RGB colors cannot be mixed; the closer endpoint is returned.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn blend(a: Color, b: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        match (a, b) {
            (Color::Rgb(ar, ag, ab), Color::Rgb(br, bg, bb)) => {
                let mix = |x: u8, y: u8| (f64::from(x) * t + f64::from(y) * (1.0 - t)).round() as u8;
                Color::Rgb(mix(ar, br), mix(ag, bg), mix(ab, bb))
            }
            _ if t >= 0.5 => a,
            _ => b,
        }
    }
}

pub mod style {
    use ratatui::style::{Color, Style};

    use crate::ui::widgets::color;

    pub const fn fg(color: Color) -> Style {
        Style::new().fg(color)
    }

    pub const DEFAULT: Style = Style::new();
    pub const AXIS: Style = fg(color::GRAY);
}

/// Glyph of a filled bar cell.
pub const BAR_SYMBOL: &str = "█";
/// Glyph of the second series of a two-sided bar.
pub const ALT_BAR_SYMBOL: &str = "▒";

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}

/// Number of cells of a bar covering `fraction` of `width` cells.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar_cells(fraction: f64, width: u16) -> u16 {
    (fraction.clamp(0.0, 1.0) * f64::from(width)).round() as u16
}
