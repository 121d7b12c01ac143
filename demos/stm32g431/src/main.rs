#![no_std]
#![no_main]

use defmt::*;
use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::spi::{Config, Spi};
use embassy_stm32::time::Hertz;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embedded_graphics_core::pixelcolor::Rgb565;

use st7735_async::color::{BLACK, BLUE, CYAN, GREEN, GREY, ORANGE, PURPLE, RED, WHITE, YELLOW};
use st7735_async::{Config as DisplayConfig, ST7735};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

// One panel row per SPI transfer
static mut DISPLAY_BUFFER: [u8; st7735_async::BUF_SIZE] = [0; st7735_async::BUF_SIZE];

static DISPLAY_SPI_BUS: StaticCell<Mutex<CriticalSectionRawMutex, Spi<'static, embassy_stm32::mode::Async>>> =
    StaticCell::new();

struct EmbassyTimer;

impl st7735_async::Timer for EmbassyTimer {
    async fn delay_ms(milliseconds: u64) {
        embassy_time::Timer::after_millis(milliseconds).await;
    }
}

type Display<'a, SPI, DC, RST> = ST7735<'a, SPI, DC, RST, EmbassyTimer>;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("ST7735 demo starting...");

    let p = embassy_stm32::init(Default::default());

    let mut spi_config = Config::default();
    spi_config.frequency = Hertz(8_000_000);

    let spi_bus = Spi::new_txonly(
        p.SPI1,
        p.PB3,      // SCK
        p.PB5,      // MOSI
        p.DMA1_CH3, // TX DMA
        spi_config,
    );
    let spi_bus = DISPLAY_SPI_BUS.init(Mutex::new(spi_bus));

    let dc = Output::new(p.PC14, Level::Low, Speed::High);
    let rst = Output::new(p.PC15, Level::Low, Speed::High);
    let cs = Output::new(p.PA15, Level::High, Speed::High);
    let spi = SpiDevice::new(spi_bus, cs);

    let buffer = unsafe { &mut *core::ptr::addr_of_mut!(DISPLAY_BUFFER) };
    let mut display = ST7735::<_, _, _, EmbassyTimer>::new(DisplayConfig::default(), spi, dc, rst, buffer);

    if let Err(_e) = display.init().await {
        error!("Display initialization failed");
        return;
    }
    info!("Display initialized");

    let mut frame: i32 = 0;
    loop {
        if let Err(_e) = draw_shapes(&mut display).await {
            error!("Drawing shapes failed");
        }
        embassy_time::Timer::after_secs(2).await;

        if let Err(_e) = draw_text(&mut display, frame).await {
            error!("Drawing text failed");
        }
        embassy_time::Timer::after_secs(2).await;

        frame = frame.wrapping_add(1);
    }
}

async fn draw_shapes<SPI, DC, RST>(
    display: &mut Display<'_, SPI, DC, RST>,
) -> Result<(), st7735_async::Error<SPI::Error>>
where
    SPI: embedded_hal_async::spi::SpiDevice,
    DC: embedded_hal::digital::OutputPin<Error = core::convert::Infallible>,
    RST: embedded_hal::digital::OutputPin<Error = core::convert::Infallible>,
{
    display.fill_screen(BLACK).await?;

    // Corner markers, partly off screen to show clipping
    display.fill_rect(-10, -10, 30, 30, RED).await?;
    display.fill_rect(140, -10, 30, 30, GREEN).await?;
    display.fill_rect(-10, 108, 30, 30, BLUE).await?;
    display.fill_rect(140, 108, 30, 30, YELLOW).await?;

    display.draw_rect(30, 20, 100, 88, WHITE).await?;
    display.draw_line(30, 20, 129, 107, CYAN).await?;
    display.draw_line(129, 20, 30, 107, CYAN).await?;

    display.draw_circle(80, 64, 40, ORANGE).await?;
    display.fill_circle(80, 64, 12, PURPLE).await?;

    // Horizontal gradient through the pixel stream
    display
        .write_pixels(0, 124, 160, 4, (0..160 * 4).map(|i| Rgb565::new((i % 160 / 5) as u8, 0, 31 - (i % 160 / 5) as u8)))
        .await
}

async fn draw_text<SPI, DC, RST>(
    display: &mut Display<'_, SPI, DC, RST>,
    frame: i32,
) -> Result<(), st7735_async::Error<SPI::Error>>
where
    SPI: embedded_hal_async::spi::SpiDevice,
    DC: embedded_hal::digital::OutputPin<Error = core::convert::Infallible>,
    RST: embedded_hal::digital::OutputPin<Error = core::convert::Infallible>,
{
    display.fill_screen(BLACK).await?;

    display.set_cursor(4, 4);
    display.set_text_size(2);
    display.set_text_color_with_background(WHITE, BLUE);
    display.print("ST7735\n").await?;

    display.set_text_size(1);
    display.set_text_color(GREY);
    display.print("160x128 green tab\n5x7 font, sizes 1-3\n").await?;

    display.set_text_size(3);
    display.set_text_color_with_background(YELLOW, BLACK);
    display.set_cursor(4, 60);
    display.print_number(frame).await?;

    display.set_text_size(1);
    display.set_text_color(RED);
    display.set_cursor(4, 110);
    display.print("negative: ").await?;
    display.print_number(-frame).await
}
