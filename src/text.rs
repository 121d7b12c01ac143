use embedded_graphics_core::pixelcolor::{Rgb565, RgbColor};

use crate::font::{CHAR_ADVANCE, LINE_ADVANCE};

/// Cursor and colors used by `print`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextState {
    pub cursor_x: i16,
    pub cursor_y: i16,
    /// Left margin that `\n` returns to.
    pub margin_x: i16,
    pub foreground: Rgb565,
    /// `None` draws transparent text.
    pub background: Option<Rgb565>,
    pub size: u8,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
            margin_x: 0,
            foreground: Rgb565::WHITE,
            background: None,
            size: 1,
        }
    }
}

impl TextState {
    pub fn set_cursor(&mut self, x: i16, y: i16) {
        self.cursor_x = x;
        self.cursor_y = y;
        self.margin_x = x;
    }

    /// Scale factor with 0 treated as 1.
    pub fn scale(&self) -> u8 {
        self.size.max(1)
    }

    pub fn advance(&mut self) {
        self.cursor_x = self
            .cursor_x
            .saturating_add(CHAR_ADVANCE as i16 * self.scale() as i16);
    }

    pub fn new_line(&mut self) {
        self.cursor_x = self.margin_x;
        self.cursor_y = self
            .cursor_y
            .saturating_add(LINE_ADVANCE as i16 * self.scale() as i16);
    }
}

/// Longest `i32` in decimal: sign plus ten digits.
pub const NUMBER_BUF_LEN: usize = 11;

/// Render `n` in decimal into `buf`, returning the used tail as a `str`.
pub fn format_number(n: i32, buf: &mut [u8; NUMBER_BUF_LEN]) -> &str {
    let mut pos = buf.len();
    // unsigned_abs keeps i32::MIN representable
    let mut value = n.unsigned_abs();
    loop {
        pos -= 1;
        buf[pos] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    if n < 0 {
        pos -= 1;
        buf[pos] = b'-';
    }
    // only ASCII digits and '-' were written
    core::str::from_utf8(&buf[pos..]).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_numbers() {
        let mut buf = [0; NUMBER_BUF_LEN];
        assert_eq!(format_number(0, &mut buf), "0");
        assert_eq!(format_number(7, &mut buf), "7");
        assert_eq!(format_number(-42, &mut buf), "-42");
        assert_eq!(format_number(1_234_567_890, &mut buf), "1234567890");
        assert_eq!(format_number(i32::MAX, &mut buf), "2147483647");
        assert_eq!(format_number(i32::MIN, &mut buf), "-2147483648");
    }

    #[test]
    fn cursor_advances_by_scaled_cell() {
        let mut state = TextState::default();
        state.set_cursor(10, 20);
        state.advance();
        assert_eq!((state.cursor_x, state.cursor_y), (16, 20));

        state.size = 3;
        state.advance();
        assert_eq!(state.cursor_x, 34);
    }

    #[test]
    fn zero_size_behaves_like_one() {
        let mut state = TextState { size: 0, ..Default::default() };
        state.advance();
        assert_eq!(state.cursor_x, 6);
    }

    #[test]
    fn new_line_returns_to_margin() {
        let mut state = TextState::default();
        state.set_cursor(4, 0);
        state.size = 2;
        state.advance();
        state.advance();
        state.new_line();
        assert_eq!((state.cursor_x, state.cursor_y), (4, 16));
    }

    #[test]
    fn advance_saturates_at_the_edge() {
        let mut state = TextState::default();
        state.set_cursor(i16::MAX - 2, 0);
        state.advance();
        assert_eq!(state.cursor_x, i16::MAX);
    }
}
