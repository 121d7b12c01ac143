//! Named RGB565 colors for the panel.

use embedded_graphics_core::pixelcolor::Rgb565;

pub const BLACK: Rgb565 = Rgb565::new(0, 0, 0);
pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);
/// 0x5AEB
pub const GREY: Rgb565 = Rgb565::new(11, 23, 11);
pub const RED: Rgb565 = Rgb565::new(31, 0, 0);
pub const GREEN: Rgb565 = Rgb565::new(0, 63, 0);
pub const BLUE: Rgb565 = Rgb565::new(0, 0, 31);
pub const CYAN: Rgb565 = Rgb565::new(0, 63, 31);
pub const YELLOW: Rgb565 = Rgb565::new(31, 63, 0);
/// 0xFD20
pub const ORANGE: Rgb565 = Rgb565::new(31, 41, 0);
pub const PURPLE: Rgb565 = Rgb565::new(31, 0, 31);

/// Big-endian wire bytes for `color`.
pub fn to_bytes(color: Rgb565) -> [u8; 2] {
    use embedded_graphics_core::pixelcolor::raw::{RawData, RawU16};

    RawU16::from(color).into_inner().to_be_bytes()
}
