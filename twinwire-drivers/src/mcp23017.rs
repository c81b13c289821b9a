//! MCP23017 GPIO expander pins
//!
//! Lets a bit-banged bus run on expander pins, e.g. to reach a second set
//! of devices behind an MCP23017 that is itself on a hardware I2C bus.
//!
//! # Line model
//!
//! - Release: pull-up on, direction input
//! - Drive low: output latch low, direction output
//! - Read: bit of the port's GPIO register
//!
//! The output latch is only ever written low, so switching direction is
//! all it takes to toggle a line. Expander access failures cannot be
//! reported through the pin capability; they are logged and latched in
//! the expander ([`Mcp23017::take_error`]).

use core::cell::RefCell;

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use twinwire_core::config::BusConfig;
use twinwire_core::registry::RegistryError;
use twinwire_core::wire::GpioBus;
use twinwire_hal::OpenDrainPin;

/// MCP23017 register addresses (IOCON.BANK = 0, port A; port B is +1)
pub mod reg {
    /// I/O direction (1 = input)
    pub const IODIR: u8 = 0x00;
    /// Pull-up enable
    pub const GPPU: u8 = 0x0C;
    /// Port value
    pub const GPIO: u8 = 0x12;
    /// Output latch
    pub const OLAT: u8 = 0x14;
}

/// Default address with A0..A2 tied low
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// Number of expander pins
pub const PIN_COUNT: u8 = 16;

/// Errors when creating expander pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number outside 0..=15
    InvalidPin(u8),
}

impl From<PinError> for RegistryError {
    fn from(e: PinError) -> Self {
        match e {
            PinError::InvalidPin(pin) => RegistryError::PinUnavailable(pin),
        }
    }
}

/// Register offset and bit mask for a pin
fn locate(pin: u8) -> (u8, u8) {
    (pin / 8, 1 << (pin % 8))
}

/// MCP23017 expander with cached direction, pull-up and latch state
pub struct Mcp23017<I2C> {
    i2c: I2C,
    address: u8,
    iodir: [u8; 2],
    gppu: [u8; 2],
    olat: [u8; 2],
    last_error: Option<ErrorKind>,
}

impl<I2C: I2c> Mcp23017<I2C> {
    /// Create a driver for the expander at `address`
    ///
    /// The cache starts at the power-on state (all inputs, no pull-ups,
    /// latches low).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            iodir: [0xFF; 2],
            gppu: [0x00; 2],
            olat: [0x00; 2],
            last_error: None,
        }
    }

    /// Push the cached state to the chip
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        for port in 0..2u8 {
            let p = port as usize;
            self.write_reg(reg::IODIR + port, self.iodir[p])?;
            self.write_reg(reg::GPPU + port, self.gppu[p])?;
            self.write_reg(reg::OLAT + port, self.olat[p])?;
        }
        Ok(())
    }

    /// Give the I2C bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Last access failure since the previous call, if any
    pub fn take_error(&mut self) -> Option<ErrorKind> {
        self.last_error.take()
    }

    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    fn read_reg(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut value = [0u8; 1];
        self.i2c.write_read(self.address, &[register], &mut value)?;
        Ok(value[0])
    }

    fn record(&mut self, e: I2C::Error) {
        let kind = e.kind();
        warn!("MCP23017 at {:#x} access failed: {:?}", self.address, kind);
        self.last_error = Some(kind);
    }

    /// Update one cached register bit, writing through only on change
    fn update(&mut self, base: u8, pin: u8, set: bool) {
        let (port, mask) = locate(pin);
        let cache = match base {
            reg::IODIR => &mut self.iodir,
            reg::GPPU => &mut self.gppu,
            _ => &mut self.olat,
        };
        let old = cache[port as usize];
        let new = if set { old | mask } else { old & !mask };
        if new == old {
            return;
        }
        cache[port as usize] = new;
        if let Err(e) = self.write_reg(base + port, new) {
            self.record(e);
        }
    }

    fn release_pin(&mut self, pin: u8) {
        self.update(reg::GPPU, pin, true);
        self.update(reg::IODIR, pin, true);
    }

    fn drive_low(&mut self, pin: u8) {
        self.update(reg::OLAT, pin, false);
        self.update(reg::IODIR, pin, false);
    }

    fn read_pin(&mut self, pin: u8) -> bool {
        let (port, mask) = locate(pin);
        match self.read_reg(reg::GPIO + port) {
            Ok(value) => value & mask != 0,
            Err(e) => {
                self.record(e);
                // An unreadable line is treated as released
                true
            }
        }
    }
}

/// One expander pin usable as a bus line
pub struct Mcp23017Pin<'a, I2C> {
    expander: &'a RefCell<Mcp23017<I2C>>,
    pin: u8,
}

impl<'a, I2C: I2c> Mcp23017Pin<'a, I2C> {
    /// Pin `pin` (0..=15; 0-7 are port A, 8-15 port B)
    pub fn new(expander: &'a RefCell<Mcp23017<I2C>>, pin: u8) -> Result<Self, PinError> {
        if pin >= PIN_COUNT {
            return Err(PinError::InvalidPin(pin));
        }
        Ok(Self { expander, pin })
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl<I2C: I2c> OpenDrainPin for Mcp23017Pin<'_, I2C> {
    fn release(&mut self) {
        self.expander.borrow_mut().release_pin(self.pin);
    }

    fn set_low(&mut self) {
        self.expander.borrow_mut().drive_low(self.pin);
    }

    fn is_high(&mut self) -> bool {
        self.expander.borrow_mut().read_pin(self.pin)
    }
}

/// Bus built from two expander pins
pub type Mcp23017Bus<'a, I2C> = GpioBus<Mcp23017Pin<'a, I2C>, Mcp23017Pin<'a, I2C>>;

/// Registry constructor for the `"mcp23017"` driver key
pub fn build_bus<'a, I2C: I2c>(
    expander: &mut &'a RefCell<Mcp23017<I2C>>,
    config: &BusConfig,
) -> Result<Mcp23017Bus<'a, I2C>, RegistryError> {
    let sda = Mcp23017Pin::new(*expander, config.sda.pin)?;
    let scl = Mcp23017Pin::new(*expander, config.scl.pin)?;
    debug!("MCP23017 bus on pins {} and {}", sda.pin(), scl.pin());
    Ok(GpioBus::new(sda, scl))
}
