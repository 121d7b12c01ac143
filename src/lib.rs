//! Driver for ST7735 TFT panels (160x128 "green tab") over SPI.
//!
//! Built on [`embedded-hal`] traits. The default `async` feature drives an
//! `embedded-hal-async` [`SpiDevice`]; with `default-features = false` the same API
//! is blocking and the driver also implements the `embedded-graphics-core`
//! `DrawTarget`.
//!
//! Chip select belongs to the `SpiDevice` implementation, which asserts it around
//! every transfer. The driver only toggles the data/command line.
//!
//! All drawing is clipped to the panel. Out-of-range coordinates are dropped
//! silently; only bus failures are reported.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal

#![no_std]

#[cfg(test)]
extern crate std;

// Must stay first so the logging macros are in scope for every module below
mod fmt;

use core::convert::Infallible;

use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

pub mod color;
pub mod font;
pub mod geometry;
mod graphics;
pub mod text;

#[cfg(test)]
mod mock;

use font::{CHAR_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use geometry::{LinePoints, MidpointCircle, Window, clip_rect, octants};
use text::{NUMBER_BUF_LEN, TextState, format_number};

// Panel size in landscape
pub const SCREEN_WIDTH: u16 = 160;
pub const SCREEN_HEIGHT: u16 = 128;
// The 160x128 glass sits inside a 162x132 controller RAM
pub const OFFSET_X: u16 = 1;
pub const OFFSET_Y: u16 = 2;

// One panel row of pixels
pub const BUF_SIZE: usize = SCREEN_WIDTH as usize * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instruction {
    /// Software Reset (01h)
    SoftwareReset = 0x01,
    /// Sleep In (10h) - Enter low-power mode
    SleepIn = 0x10,
    /// Sleep Out (11h) - Exit low-power mode
    SleepOut = 0x11,
    /// Display Inversion Off (20h)
    DisplayInversionOff = 0x20,
    /// Display Inversion On (21h)
    DisplayInversionOn = 0x21,
    /// Display Off (28h)
    DisplayOff = 0x28,
    /// Display On (29h)
    DisplayOn = 0x29,
    /// Column Address Set (2Ah)
    ColumnAddressSet = 0x2A,
    /// Row Address Set (2Bh)
    RowAddressSet = 0x2B,
    /// Memory Write (2Ch)
    MemoryWrite = 0x2C,
    /// Memory Access Control (36h) - scan direction and color order
    MemoryAccessControl = 0x36,
    /// Interface Pixel Format (3Ah)
    PixelFormatSet = 0x3A,
    /// Frame Rate Control, normal mode (B1h)
    FrameRateControl1 = 0xB1,
    /// Frame Rate Control, idle mode (B2h)
    FrameRateControl2 = 0xB2,
    /// Frame Rate Control, partial mode (B3h)
    FrameRateControl3 = 0xB3,
    /// Display Inversion Control (B4h)
    InversionControl = 0xB4,
    /// Power Control 1 (C0h) - GVDD
    PowerControl1 = 0xC0,
    /// Power Control 2 (C1h) - VGH/VGL
    PowerControl2 = 0xC1,
    /// Power Control 3 (C2h) - normal mode op-amp current
    PowerControl3 = 0xC2,
    /// Power Control 4 (C3h) - idle mode
    PowerControl4 = 0xC3,
    /// Power Control 5 (C4h) - partial mode
    PowerControl5 = 0xC4,
    /// VCOM Control 1 (C5h)
    VcomControl1 = 0xC5,
    /// Positive Gamma Correction (E0h)
    GammaPositive = 0xE0,
    /// Negative Gamma Correction (E1h)
    GammaNegative = 0xE1,
}

/// Scan direction written to MADCTL (MY, MX, MV bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    Portrait = 0xC0,
    Landscape = 0xA0,
    PortraitSwapped = 0x00,
    LandscapeSwapped = 0x60,
}

impl Orientation {
    pub fn is_landscape(self) -> bool {
        matches!(self, Orientation::Landscape | Orientation::LandscapeSwapped)
    }
}

// MADCTL color order bit, set for BGR panels
const MADCTL_BGR: u8 = 0x08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub rgb: bool,
    pub inverted: bool,
    pub orientation: Orientation,
    pub height: u16,
    pub width: u16,
    pub dx: u16,
    pub dy: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rgb: true,
            inverted: false,
            orientation: Orientation::Landscape,
            height: SCREEN_HEIGHT,
            width: SCREEN_WIDTH,
            dx: OFFSET_X,
            dy: OFFSET_Y,
        }
    }
}

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E = ()> {
    /// Communication error
    Comm(E),
    /// Pin setting error
    Pin(Infallible),
}

pub struct ST7735<'b, SPI, DC, RST, TIMER>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    spi: SPI,
    dc: DC,
    rst: RST,
    config: Config,
    buffer: &'b mut [u8],
    text: TextState,
    _timer: core::marker::PhantomData<TIMER>,
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "ST7735",),
    async(feature = "async", keep_self)
)]
impl<'b, SPI, DC, RST, E, TIMER> ST7735<'b, SPI, DC, RST, TIMER>
where
    SPI: SpiDevice<Error = E>,
    DC: OutputPin<Error = Infallible>,
    RST: OutputPin<Error = Infallible>,
    TIMER: Timer,
{
    /// `buffer` batches pixel bytes for fills and streams. Any length works, but
    /// anything under two bytes falls back to one transfer per pixel.
    pub fn new(config: Config, spi: SPI, dc: DC, rst: RST, buffer: &'b mut [u8]) -> Self {
        if buffer.len() < 2 {
            warn!("pixel buffer too small, streaming one pixel per transfer");
        }
        Self {
            spi,
            dc,
            rst,
            config,
            buffer,
            text: TextState::default(),
            _timer: core::marker::PhantomData,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drawable width and height.
    pub fn dimensions(&self) -> (u16, u16) {
        (self.config.width, self.config.height)
    }

    pub async fn init(&mut self) -> Result<(), Error<E>> {
        debug!("st7735: init");
        self.reset().await?;

        self.write_command(Instruction::SoftwareReset, &[]).await?;
        TIMER::delay_ms(150).await;
        self.write_command(Instruction::SleepOut, &[]).await?;
        TIMER::delay_ms(500).await;

        // Frame rate: normal, idle, partial (dot then line inversion)
        self.write_command(Instruction::FrameRateControl1, &[0x01, 0x2C, 0x2D])
            .await?;
        self.write_command(Instruction::FrameRateControl2, &[0x01, 0x2C, 0x2D])
            .await?;
        self.write_command(
            Instruction::FrameRateControl3,
            &[0x01, 0x2C, 0x2D, 0x01, 0x2C, 0x2D],
        )
        .await?;
        self.write_command(Instruction::InversionControl, &[0x07])
            .await?; // column inversion

        // Power sequence
        self.write_command(Instruction::PowerControl1, &[0xA2, 0x02, 0x84])
            .await?;
        self.write_command(Instruction::PowerControl2, &[0xC5]).await?;
        self.write_command(Instruction::PowerControl3, &[0x0A, 0x00])
            .await?;
        self.write_command(Instruction::PowerControl4, &[0x8A, 0x2A])
            .await?;
        self.write_command(Instruction::PowerControl5, &[0x8A, 0xEE])
            .await?;
        self.write_command(Instruction::VcomControl1, &[0x0E]).await?;

        self.set_inverted(self.config.inverted).await?;
        self.set_orientation(self.config.orientation).await?;
        self.write_command(Instruction::PixelFormatSet, &[0x05])
            .await?; // 16-bit color

        self.write_command(
            Instruction::GammaPositive,
            &[
                0x02, 0x1C, 0x07, 0x12, 0x37, 0x32, 0x29, 0x2D, 0x29, 0x25, 0x2B, 0x39, 0x00, 0x01,
                0x03, 0x10,
            ],
        )
        .await?;
        self.write_command(
            Instruction::GammaNegative,
            &[
                0x03, 0x1D, 0x07, 0x06, 0x2E, 0x2C, 0x29, 0x2D, 0x2E, 0x2E, 0x37, 0x3F, 0x00, 0x00,
                0x02, 0x10,
            ],
        )
        .await?;

        self.write_command(Instruction::DisplayOn, &[]).await?;
        TIMER::delay_ms(100).await;
        debug!("st7735: ready");
        Ok(())
    }

    pub async fn reset(&mut self) -> Result<(), Error<E>> {
        trace!("st7735: hardware reset");
        self.rst.set_high().map_err(Error::Pin)?;
        TIMER::delay_ms(5).await;
        self.rst.set_low().map_err(Error::Pin)?;
        TIMER::delay_ms(20).await;
        self.rst.set_high().map_err(Error::Pin)?;
        TIMER::delay_ms(150).await;

        Ok(())
    }

    /// Rewrite MADCTL. Width and height swap when switching between portrait
    /// and landscape.
    pub async fn set_orientation(&mut self, orientation: Orientation) -> Result<(), Error<E>> {
        let mut madctl = orientation as u8;
        if !self.config.rgb {
            madctl |= MADCTL_BGR;
        }
        self.write_command(Instruction::MemoryAccessControl, &[madctl])
            .await?;

        if orientation.is_landscape() != self.config.orientation.is_landscape() {
            core::mem::swap(&mut self.config.width, &mut self.config.height);
            core::mem::swap(&mut self.config.dx, &mut self.config.dy);
        }
        self.config.orientation = orientation;
        debug!("st7735: madctl {=u8:#x}", madctl);
        Ok(())
    }

    pub async fn set_inverted(&mut self, inverted: bool) -> Result<(), Error<E>> {
        let cmd = if inverted {
            Instruction::DisplayInversionOn
        } else {
            Instruction::DisplayInversionOff
        };
        self.write_command(cmd, &[]).await?;
        self.config.inverted = inverted;
        Ok(())
    }

    pub async fn set_display_on(&mut self, on: bool) -> Result<(), Error<E>> {
        let cmd = if on {
            Instruction::DisplayOn
        } else {
            Instruction::DisplayOff
        };
        self.write_command(cmd, &[]).await
    }

    pub async fn sleep(&mut self) -> Result<(), Error<E>> {
        self.write_command(Instruction::SleepIn, &[]).await?;
        TIMER::delay_ms(5).await;
        Ok(())
    }

    pub async fn wake(&mut self) -> Result<(), Error<E>> {
        self.write_command(Instruction::SleepOut, &[]).await?;
        TIMER::delay_ms(120).await;
        Ok(())
    }

    /// Write command with optional parameters
    async fn write_command(&mut self, cmd: Instruction, params: &[u8]) -> Result<(), Error<E>> {
        self.dc.set_low().map_err(Error::Pin)?;
        self.spi.write(&[cmd as u8]).await.map_err(Error::Comm)?;

        if !params.is_empty() {
            self.dc.set_high().map_err(Error::Pin)?;
            self.spi.write(params).await.map_err(Error::Comm)?;
        }
        Ok(())
    }

    /// Write raw pixel data to display (data mode)
    async fn write_raw_data(&mut self, data: &[u8]) -> Result<(), Error<E>> {
        self.dc.set_high().map_err(Error::Pin)?;
        self.spi.write(data).await.map_err(Error::Comm)
    }

    /// Sets the global offset of the displayed image
    pub fn set_offset(&mut self, dx: u16, dy: u16) {
        self.config.dx = dx;
        self.config.dy = dy;
    }

    /// Open the inclusive window `sx..=ex` x `sy..=ey` for writing. Coordinates
    /// are panel-relative; the RAM offset is added here. A window that cannot be
    /// addressed once offset is dropped without touching the bus.
    pub async fn set_address_window(
        &mut self,
        sx: u16,
        sy: u16,
        ex: u16,
        ey: u16,
    ) -> Result<(), Error<E>> {
        self.address_window(sx, sy, ex, ey).await.map(|_| ())
    }

    /// Returns `false` when the offset window falls outside the `u16` RAM range
    /// and nothing was sent.
    async fn address_window(
        &mut self,
        sx: u16,
        sy: u16,
        ex: u16,
        ey: u16,
    ) -> Result<bool, Error<E>> {
        let (dx, dy) = (self.config.dx, self.config.dy);
        let (sx, ex, sy, ey) = match (
            sx.checked_add(dx),
            ex.checked_add(dx),
            sy.checked_add(dy),
            ey.checked_add(dy),
        ) {
            (Some(sx), Some(ex), Some(sy), Some(ey)) => (sx, ex, sy, ey),
            _ => {
                warn!("st7735: address window out of range");
                return Ok(false);
            }
        };
        let [sx_hi, sx_lo] = sx.to_be_bytes();
        let [ex_hi, ex_lo] = ex.to_be_bytes();
        let [sy_hi, sy_lo] = sy.to_be_bytes();
        let [ey_hi, ey_lo] = ey.to_be_bytes();

        self.write_command(Instruction::ColumnAddressSet, &[sx_hi, sx_lo, ex_hi, ex_lo])
            .await?;
        self.write_command(Instruction::RowAddressSet, &[sy_hi, sy_lo, ey_hi, ey_lo])
            .await?;
        self.write_command(Instruction::MemoryWrite, &[]).await?;
        Ok(true)
    }

    async fn open_window(&mut self, window: Window) -> Result<bool, Error<E>> {
        self.address_window(window.x, window.y, window.end_x(), window.end_y())
            .await
    }

    /// Send `count` pixels of one color into the open window.
    async fn write_repeated(&mut self, color: Rgb565, count: u32) -> Result<(), Error<E>> {
        let bytes = color::to_bytes(color);
        let chunk = (self.buffer.len() / 2) as u32;
        if chunk == 0 {
            for _ in 0..count {
                self.write_raw_data(&bytes).await?;
            }
            return Ok(());
        }

        let batch = count.min(chunk) as usize;
        for px in self.buffer[..batch * 2].chunks_exact_mut(2) {
            px.copy_from_slice(&bytes);
        }

        self.dc.set_high().map_err(Error::Pin)?;
        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(batch as u32) as usize;
            self.spi
                .write(&self.buffer[..n * 2])
                .await
                .map_err(Error::Comm)?;
            remaining -= n as u32;
        }
        Ok(())
    }

    /// Send a sequence of pixels into the open window, batched through the buffer.
    async fn write_stream<I>(&mut self, colors: I) -> Result<(), Error<E>>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        let capacity = self.buffer.len() / 2 * 2;
        if capacity == 0 {
            for c in colors {
                self.write_raw_data(&color::to_bytes(c)).await?;
            }
            return Ok(());
        }

        self.dc.set_high().map_err(Error::Pin)?;
        let mut len = 0;
        for c in colors {
            self.buffer[len..len + 2].copy_from_slice(&color::to_bytes(c));
            len += 2;
            if len == capacity {
                self.spi
                    .write(&self.buffer[..len])
                    .await
                    .map_err(Error::Comm)?;
                len = 0;
            }
        }
        if len > 0 {
            self.spi
                .write(&self.buffer[..len])
                .await
                .map_err(Error::Comm)?;
        }
        Ok(())
    }

    /// Stream `colors` row-major into the `width` x `height` area at `x`, `y`.
    /// Pixels that fall off the panel are skipped, extra colors are ignored.
    pub async fn write_pixels<I>(
        &mut self,
        x: i16,
        y: i16,
        width: i16,
        height: i16,
        colors: I,
    ) -> Result<(), Error<E>>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        let (screen_width, screen_height) = self.dimensions();
        let window = match clip_rect(x, y, width, height, screen_width, screen_height) {
            Some(window) => window,
            None => return Ok(()),
        };
        if !self.open_window(window).await? {
            return Ok(());
        }

        let (x0, y0, w) = (x as i32, y as i32, width as i32);
        let visible = colors
            .into_iter()
            .take(width as usize * height as usize)
            .enumerate()
            .filter_map(move |(i, c)| {
                let i = i as i32;
                window.contains(x0 + i % w, y0 + i / w).then_some(c)
            });
        self.write_stream(visible).await
    }

    /// Fill a rectangle, clipped to the panel.
    pub async fn fill_rect(
        &mut self,
        x: i16,
        y: i16,
        width: i16,
        height: i16,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        let (screen_width, screen_height) = self.dimensions();
        let window = match clip_rect(x, y, width, height, screen_width, screen_height) {
            Some(window) => window,
            None => return Ok(()),
        };
        if !self.open_window(window).await? {
            return Ok(());
        }
        self.write_repeated(color, window.pixel_count()).await
    }

    pub async fn fill_screen(&mut self, color: Rgb565) -> Result<(), Error<E>> {
        let (width, height) = self.dimensions();
        self.fill_rect(0, 0, width as i16, height as i16, color)
            .await
    }

    /// Draw a single pixel. Off-panel pixels are ignored.
    pub async fn draw_pixel(&mut self, x: i16, y: i16, color: Rgb565) -> Result<(), Error<E>> {
        let (width, height) = self.dimensions();
        if x < 0 || y < 0 || x as u16 >= width || y as u16 >= height {
            return Ok(());
        }
        let (x, y) = (x as u16, y as u16);
        if !self.address_window(x, y, x, y).await? {
            return Ok(());
        }
        self.write_raw_data(&color::to_bytes(color)).await
    }

    pub async fn draw_fast_hline(
        &mut self,
        x: i16,
        y: i16,
        width: i16,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        self.fill_rect(x, y, width, 1, color).await
    }

    pub async fn draw_fast_vline(
        &mut self,
        x: i16,
        y: i16,
        height: i16,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        self.fill_rect(x, y, 1, height, color).await
    }

    /// Rectangle outline, one pixel wide.
    pub async fn draw_rect(
        &mut self,
        x: i16,
        y: i16,
        width: i16,
        height: i16,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        let right = x.saturating_add(width).saturating_sub(1);
        let bottom = y.saturating_add(height).saturating_sub(1);
        self.draw_fast_hline(x, y, width, color).await?;
        self.draw_fast_hline(x, bottom, width, color).await?;
        self.draw_fast_vline(x, y, height, color).await?;
        self.draw_fast_vline(right, y, height, color).await
    }

    /// Any-angle line with both endpoints included.
    pub async fn draw_line(
        &mut self,
        x0: i16,
        y0: i16,
        x1: i16,
        y1: i16,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        if y0 == y1 {
            let (start, end) = (x0.min(x1), x0.max(x1));
            let width = (end as i32 - start as i32 + 1).min(i16::MAX as i32) as i16;
            return self.draw_fast_hline(start, y0, width, color).await;
        }
        if x0 == x1 {
            let (start, end) = (y0.min(y1), y0.max(y1));
            let height = (end as i32 - start as i32 + 1).min(i16::MAX as i32) as i16;
            return self.draw_fast_vline(x0, start, height, color).await;
        }
        for (x, y) in LinePoints::new((x0, y0), (x1, y1)) {
            self.draw_pixel(x, y, color).await?;
        }
        Ok(())
    }

    /// Circle outline centred on `x0`, `y0`.
    pub async fn draw_circle(
        &mut self,
        x0: i16,
        y0: i16,
        radius: i16,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        if radius < 0 {
            return Ok(());
        }
        self.draw_pixel(x0, y0.saturating_add(radius), color).await?;
        self.draw_pixel(x0, y0.saturating_sub(radius), color).await?;
        self.draw_pixel(x0.saturating_add(radius), y0, color).await?;
        self.draw_pixel(x0.saturating_sub(radius), y0, color).await?;

        for (x, y) in MidpointCircle::new(radius) {
            for (px, py) in octants(x0, y0, x, y) {
                self.draw_pixel(px, py, color).await?;
            }
        }
        Ok(())
    }

    /// Filled disc centred on `x0`, `y0`, drawn as vertical spans.
    pub async fn fill_circle(
        &mut self,
        x0: i16,
        y0: i16,
        radius: i16,
        color: Rgb565,
    ) -> Result<(), Error<E>> {
        if radius < 0 {
            return Ok(());
        }
        let span = |half: i16| half.saturating_mul(2).saturating_add(1);
        self.draw_fast_vline(x0, y0.saturating_sub(radius), span(radius), color)
            .await?;

        for (x, y) in MidpointCircle::new(radius) {
            let columns = [
                (x0.saturating_add(x), y),
                (x0.saturating_sub(x), y),
                (x0.saturating_add(y), x),
                (x0.saturating_sub(y), x),
            ];
            for (cx, half) in columns {
                self.draw_fast_vline(cx, y0.saturating_sub(half), span(half), color)
                    .await?;
            }
        }
        Ok(())
    }

    pub fn set_cursor(&mut self, x: i16, y: i16) {
        self.text.set_cursor(x, y);
    }

    pub fn cursor(&self) -> (i16, i16) {
        (self.text.cursor_x, self.text.cursor_y)
    }

    /// Transparent text: only glyph pixels are painted.
    pub fn set_text_color(&mut self, foreground: Rgb565) {
        self.text.foreground = foreground;
        self.text.background = None;
    }

    /// Opaque text: the whole character cell is painted.
    pub fn set_text_color_with_background(&mut self, foreground: Rgb565, background: Rgb565) {
        self.text.foreground = foreground;
        self.text.background = Some(background);
    }

    pub fn set_text_size(&mut self, size: u8) {
        self.text.size = size;
    }

    pub fn text_state(&self) -> &TextState {
        &self.text
    }

    /// Draw one character with its top-left corner at `x`, `y`. With a
    /// background the spacing column to the right is painted too.
    pub async fn draw_char(
        &mut self,
        x: i16,
        y: i16,
        c: char,
        foreground: Rgb565,
        background: Option<Rgb565>,
        size: u8,
    ) -> Result<(), Error<E>> {
        let size = size.max(1);
        let glyph = font::glyph(c);
        let scale = size as i16;

        if let Some(background) = background {
            let cell_width = CHAR_ADVANCE as u16 * size as u16;
            let cell_height = GLYPH_HEIGHT as u16 * size as u16;
            let (screen_width, screen_height) = self.dimensions();
            let window = clip_rect(
                x,
                y,
                cell_width as i16,
                cell_height as i16,
                screen_width,
                screen_height,
            );
            // Whole cell on screen: one window, one stream
            if let Some(window) = window.filter(|w| w.width == cell_width && w.height == cell_height)
            {
                if !self.open_window(window).await? {
                    return Ok(());
                }
                let pixels = (0..cell_height).flat_map(move |py| {
                    (0..cell_width).map(move |px| {
                        let set = font::is_set(glyph, (px / size as u16) as u8, (py / size as u16) as u8);
                        if set { foreground } else { background }
                    })
                });
                return self.write_stream(pixels).await;
            }
        }

        for col in 0..GLYPH_WIDTH {
            let cx = x.saturating_add(col as i16 * scale);
            for row in 0..GLYPH_HEIGHT {
                let cy = y.saturating_add(row as i16 * scale);
                let color = if font::is_set(glyph, col, row) {
                    foreground
                } else if let Some(background) = background {
                    background
                } else {
                    continue;
                };
                if size == 1 {
                    self.draw_pixel(cx, cy, color).await?;
                } else {
                    self.fill_rect(cx, cy, scale, scale, color).await?;
                }
            }
        }

        if let Some(background) = background {
            let sx = x.saturating_add(GLYPH_WIDTH as i16 * scale);
            if size == 1 {
                for row in 0..GLYPH_HEIGHT {
                    self.draw_pixel(sx, y.saturating_add(row as i16), background)
                        .await?;
                }
            } else {
                self.fill_rect(sx, y, scale, GLYPH_HEIGHT as i16 * scale, background)
                    .await?;
            }
        }
        Ok(())
    }

    /// Draw `s` at the cursor with the current text colors and size, advancing
    /// the cursor per character. `\n` starts a new line at the cursor's left
    /// margin; `\r` is ignored.
    pub async fn print(&mut self, s: &str) -> Result<(), Error<E>> {
        for c in s.chars() {
            match c {
                '\n' => {
                    self.text.new_line();
                    continue;
                }
                '\r' => continue,
                _ => {}
            }
            let TextState {
                cursor_x,
                cursor_y,
                foreground,
                background,
                ..
            } = self.text;
            let size = self.text.scale();
            self.draw_char(cursor_x, cursor_y, c, foreground, background, size)
                .await?;
            self.text.advance();
        }
        Ok(())
    }

    /// Print `n` in decimal.
    pub async fn print_number(&mut self, n: i32) -> Result<(), Error<E>> {
        let mut buf = [0u8; NUMBER_BUF_LEN];
        let s = format_number(n, &mut buf);
        self.print(s).await
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Timer",),
    async(feature = "async", keep_self)
)]
/// Simplified timer trait for delay operations.
pub trait Timer {
    /// Delay for the specified number of milliseconds.
    async fn delay_ms(milliseconds: u64);
}

/// [`Timer`] backed by `embassy-time`.
#[cfg(feature = "embassy-time")]
pub struct EmbassyTimer;

#[cfg(all(feature = "embassy-time", feature = "async"))]
impl Timer for EmbassyTimer {
    async fn delay_ms(milliseconds: u64) {
        embassy_time::Timer::after_millis(milliseconds).await;
    }
}

#[cfg(all(feature = "embassy-time", not(feature = "async")))]
impl Timer for EmbassyTimer {
    fn delay_ms(milliseconds: u64) {
        embassy_time::block_for(embassy_time::Duration::from_millis(milliseconds));
    }
}
