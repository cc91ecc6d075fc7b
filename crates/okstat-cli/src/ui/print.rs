//! Printing rendered widgets to a plain terminal
//!
//! Charts are ratatui widgets. Instead of running a full-screen terminal UI,
//! a widget is rendered once into an off-screen [`Buffer`] which is then
//! written line by line, with crossterm color commands when color is enabled.

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{self as term, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::Widget,
};

/// Renders `widget` into a `width` x `height` buffer.
pub fn render<W>(widget: W, width: u16, height: u16) -> Buffer
where
    W: Widget,
{
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    widget.render(area, &mut buf);
    buf
}

/// Width of the attached terminal, 80 columns when there is none.
pub fn terminal_width() -> u16 {
    crossterm::terminal::size().map_or(80, |(width, _)| width)
}

/// Renders `widget` and prints it to stdout.
pub fn print_widget<W>(widget: W, width: u16, height: u16, color: bool) -> io::Result<()>
where
    W: Widget,
{
    let buf = render(widget, width, height);
    let mut stdout = io::stdout().lock();
    write_buffer(&mut stdout, &buf, color)
}

pub fn write_buffer<W>(out: &mut W, buf: &Buffer, color: bool) -> io::Result<()>
where
    W: Write,
{
    let area = buf.area;
    for y in area.top()..area.bottom() {
        if color {
            for x in area.left()..area.right() {
                let cell = &buf[(x, y)];
                queue!(
                    out,
                    SetForegroundColor(to_terminal_color(cell.fg)),
                    SetBackgroundColor(to_terminal_color(cell.bg)),
                    Print(cell.symbol())
                )?;
            }
            queue!(out, ResetColor, Print("\n"))?;
        } else {
            let line = (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>();
            queue!(out, Print(line.trim_end()), Print("\n"))?;
        }
    }
    out.flush()
}

/// Plain-text rendering of a buffer, one string per line without trailing spaces.
#[cfg(test)]
pub fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
                .trim_end()
                .to_owned()
        })
        .collect()
}

fn to_terminal_color(color: Color) -> term::Color {
    match color {
        Color::Reset => term::Color::Reset,
        Color::Black => term::Color::Black,
        Color::Red => term::Color::DarkRed,
        Color::Green => term::Color::DarkGreen,
        Color::Yellow => term::Color::DarkYellow,
        Color::Blue => term::Color::DarkBlue,
        Color::Magenta => term::Color::DarkMagenta,
        Color::Cyan => term::Color::DarkCyan,
        Color::Gray => term::Color::Grey,
        Color::DarkGray => term::Color::DarkGrey,
        Color::LightRed => term::Color::Red,
        Color::LightGreen => term::Color::Green,
        Color::LightYellow => term::Color::Yellow,
        Color::LightBlue => term::Color::Blue,
        Color::LightMagenta => term::Color::Magenta,
        Color::LightCyan => term::Color::Cyan,
        Color::White => term::Color::White,
        Color::Rgb(r, g, b) => term::Color::Rgb { r, g, b },
        Color::Indexed(i) => term::Color::AnsiValue(i),
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{style::Style, text::Line};

    use super::*;

    #[test]
    fn test_write_buffer_without_color_trims_lines() {
        let buf = render(Line::raw("hello"), 10, 2);
        let mut out = Vec::new();
        write_buffer(&mut out, &buf, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hello\n\n");
    }

    #[test]
    fn test_write_buffer_with_color_emits_escape_sequences() {
        let buf = render(Line::styled("x", Style::new().fg(Color::Rgb(1, 2, 3))), 1, 1);
        let mut out = Vec::new();
        write_buffer(&mut out, &buf, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\u{1b}["), "{text:?}");
        assert!(text.contains('x'));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_color_mapping() {
        assert_eq!(to_terminal_color(Color::LightRed), term::Color::Red);
        assert_eq!(to_terminal_color(Color::Red), term::Color::DarkRed);
        assert_eq!(
            to_terminal_color(Color::Rgb(1, 2, 3)),
            term::Color::Rgb { r: 1, g: 2, b: 3 }
        );
    }
}
