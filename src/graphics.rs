//! `embedded-graphics` integration. `DrawTarget` is a blocking trait, so this is
//! only available without the `async` feature.

#![cfg(not(feature = "async"))]

use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::Rgb565,
    primitives::{PointsIter, Rectangle},
};
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::{Error, ST7735, Timer};

/// `area` as `(x, y, width, height)` if it fits the driver's `i16` coordinates.
fn area_to_i16(area: &Rectangle) -> Option<(i16, i16, i16, i16)> {
    Some((
        i16::try_from(area.top_left.x).ok()?,
        i16::try_from(area.top_left.y).ok()?,
        i16::try_from(area.size.width).ok()?,
        i16::try_from(area.size.height).ok()?,
    ))
}

impl<SPI, DC, RST, E, TIMER> DrawTarget for ST7735<'_, SPI, DC, RST, TIMER>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    type Color = Rgb565;
    type Error = Error<E>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if let (Ok(x), Ok(y)) = (i16::try_from(coord.x), i16::try_from(coord.y)) {
                self.draw_pixel(x, y, color)?;
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        match area_to_i16(area) {
            Some((x, y, width, height)) => self.write_pixels(x, y, width, height, colors),
            None => self.draw_iter(
                area.points()
                    .zip(colors)
                    .map(|(point, color)| Pixel(point, color)),
            ),
        }
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        match area_to_i16(&area) {
            Some((x, y, width, height)) => self.fill_rect(x, y, width, height, color),
            None => Ok(()),
        }
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen(color)
    }
}

impl<SPI, DC, RST, E, TIMER> OriginDimensions for ST7735<'_, SPI, DC, RST, TIMER>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    fn size(&self) -> Size {
        let (width, height) = self.dimensions();
        Size::new(width as u32, height as u32)
    }
}

#[cfg(test)]
mod tests {
    use std::vec;

    use embedded_graphics_core::geometry::Point;
    use embedded_graphics_core::pixelcolor::RgbColor;

    use super::*;
    use crate::color::to_bytes;
    use crate::mock::{display, pixels};

    #[test]
    fn reports_panel_size() {
        let mut buffer = [0u8; 8];
        let (display, _bus) = display(&mut buffer);
        assert_eq!(display.size(), Size::new(160, 128));
        assert_eq!(display.bounding_box().top_left, Point::zero());
    }

    #[test]
    fn draw_iter_skips_off_panel_pixels() {
        let mut buffer = [0u8; 8];
        let (mut display, bus) = display(&mut buffer);
        display
            .draw_iter([
                Pixel(Point::new(1, 1), Rgb565::RED),
                Pixel(Point::new(-1, 1), Rgb565::RED),
                Pixel(Point::new(100_000, 1), Rgb565::RED),
            ])
            .unwrap();

        assert_eq!(bus.count(0x2C), 1);
    }

    #[test]
    fn fill_solid_clips_to_the_panel() {
        let mut buffer = [0u8; 8];
        let (mut display, bus) = display(&mut buffer);
        display
            .fill_solid(
                &Rectangle::new(Point::new(158, 126), Size::new(10, 10)),
                Rgb565::BLUE,
            )
            .unwrap();

        assert_eq!(bus.data_after(0x2A), [vec![0, 159, 0, 160]]);
        assert_eq!(bus.data_after(0x2B), [vec![0, 128, 0, 129]]);
        assert_eq!(bus.data_after(0x2C), [pixels(to_bytes(Rgb565::BLUE), 4)]);
    }

    #[test]
    fn fill_contiguous_streams_one_window() {
        let mut buffer = [0u8; 8];
        let (mut display, bus) = display(&mut buffer);
        display
            .fill_contiguous(
                &Rectangle::new(Point::new(0, 0), Size::new(2, 2)),
                [Rgb565::RED, Rgb565::GREEN, Rgb565::BLUE, Rgb565::WHITE],
            )
            .unwrap();

        assert_eq!(bus.count(0x2C), 1);
        assert_eq!(
            bus.data_after(0x2C),
            [vec![0xF8, 0x00, 0x07, 0xE0, 0x00, 0x1F, 0xFF, 0xFF]]
        );
    }

    #[test]
    fn clear_fills_the_screen() {
        let mut buffer = [0u8; 64];
        let (mut display, bus) = display(&mut buffer);
        display.clear(Rgb565::BLACK).unwrap();

        assert_eq!(bus.data_after(0x2C)[0].len(), 160 * 128 * 2);
    }
}
