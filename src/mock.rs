//! Recording bus and pin doubles for the unit tests.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::spi::{ErrorType, Operation};

use crate::Timer;

/// One bus transfer as seen by the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    Command(u8),
    /// Consecutive data writes are merged, so chunking does not show up here.
    Data(Vec<u8>),
}

#[derive(Debug, Default)]
pub struct Bus {
    pub dc: Cell<bool>,
    pub transfers: RefCell<Vec<Transfer>>,
    pub rst_levels: RefCell<Vec<bool>>,
}

impl Bus {
    fn record(&self, bytes: &[u8]) {
        let mut transfers = self.transfers.borrow_mut();
        if !self.dc.get() {
            transfers.extend(bytes.iter().map(|&b| Transfer::Command(b)));
            return;
        }
        match transfers.last_mut() {
            Some(Transfer::Data(data)) => data.extend_from_slice(bytes),
            _ => transfers.push(Transfer::Data(bytes.to_vec())),
        }
    }

    pub fn clear(&self) {
        self.transfers.borrow_mut().clear();
    }

    pub fn commands(&self) -> Vec<u8> {
        self.transfers
            .borrow()
            .iter()
            .filter_map(|t| match t {
                Transfer::Command(c) => Some(*c),
                Transfer::Data(_) => None,
            })
            .collect()
    }

    /// Parameter/pixel bytes that followed each occurrence of `cmd`.
    pub fn data_after(&self, cmd: u8) -> Vec<Vec<u8>> {
        let transfers = self.transfers.borrow();
        let mut out = Vec::new();
        for (i, t) in transfers.iter().enumerate() {
            if *t != Transfer::Command(cmd) {
                continue;
            }
            match transfers.get(i + 1) {
                Some(Transfer::Data(data)) => out.push(data.clone()),
                _ => out.push(Vec::new()),
            }
        }
        out
    }

    pub fn count(&self, cmd: u8) -> usize {
        self.commands().iter().filter(|&&c| c == cmd).count()
    }
}

pub struct MockSpi(pub Rc<Bus>);

impl ErrorType for MockSpi {
    type Error = Infallible;
}

#[cfg(feature = "async")]
impl embedded_hal_async::spi::SpiDevice for MockSpi {
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                self.0.record(bytes);
            }
        }
        Ok(())
    }
}

#[cfg(not(feature = "async"))]
impl embedded_hal::spi::SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                self.0.record(bytes);
            }
        }
        Ok(())
    }
}

pub struct DcPin(pub Rc<Bus>);

impl PinErrorType for DcPin {
    type Error = Infallible;
}

impl OutputPin for DcPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.dc.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.dc.set(true);
        Ok(())
    }
}

pub struct RstPin(pub Rc<Bus>);

impl PinErrorType for RstPin {
    type Error = Infallible;
}

impl OutputPin for RstPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.rst_levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.rst_levels.borrow_mut().push(true);
        Ok(())
    }
}

pub struct NoDelay;

#[cfg(feature = "async")]
impl Timer for NoDelay {
    async fn delay_ms(_milliseconds: u64) {}
}

#[cfg(not(feature = "async"))]
impl Timer for NoDelay {
    fn delay_ms(_milliseconds: u64) {}
}

pub type TestDisplay<'b> = crate::ST7735<'b, MockSpi, DcPin, RstPin, NoDelay>;

/// A display with the default 160x128 config wired to a fresh recording bus.
pub fn display(buffer: &mut [u8]) -> (TestDisplay<'_>, Rc<Bus>) {
    display_with(crate::Config::default(), buffer)
}

pub fn display_with(config: crate::Config, buffer: &mut [u8]) -> (TestDisplay<'_>, Rc<Bus>) {
    let bus = Rc::new(Bus::default());
    let display = crate::ST7735::new(
        config,
        MockSpi(bus.clone()),
        DcPin(bus.clone()),
        RstPin(bus.clone()),
        buffer,
    );
    (display, bus)
}

/// `n` copies of a pixel's wire bytes.
pub fn pixels(bytes: [u8; 2], n: usize) -> Vec<u8> {
    bytes.iter().copied().cycle().take(n * 2).collect()
}
