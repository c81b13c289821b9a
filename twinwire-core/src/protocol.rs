//! Bit-level I2C protocol engine
//!
//! Every bit is written out as an explicit sequence of line states. The
//! order of data and clock transitions *is* the protocol, so nothing here
//! is folded into a waveform generator, and repeated writes of an
//! unchanged level are settling time, not dead code.
//!
//! ```text
//!        start          bit            stop
//! SDA  ‾‾‾\______   __X=====X__    ______/‾‾‾
//! SCL  ‾‾‾‾‾‾\___   ____/‾‾\___    ___/‾‾‾‾‾‾
//! ```

use embedded_hal::delay::DelayNs;
use heapless::String;
use twinwire_hal::I2cConfig;

use crate::wire::TwoWire;

/// Capacity of the recorded NACK message
pub const MAX_ERROR_LEN: usize = 64;

const NACK_PREFIX: &str = "I2C NACK: ";

/// Protocol engine driving a [`TwoWire`] bus
///
/// Owns the bus and the delay source for its whole lifetime. The only
/// mutable state besides them is the transaction error, which is set by a
/// NACK checked with a description and cleared by any other acknowledge
/// check.
pub struct Protocol<W, D> {
    wire: W,
    delay: D,
    /// Wait after each line write (0 = untimed)
    half_period_ns: u32,
    clock_stretching: bool,
    error: Option<String<MAX_ERROR_LEN>>,
}

impl<W: TwoWire, D: DelayNs> Protocol<W, D> {
    /// Create an untimed engine without clock stretching
    pub fn new(wire: W, delay: D) -> Self {
        Self::with_config(wire, delay, I2cConfig::UNTIMED)
    }

    /// Create an engine with bus timing
    pub fn with_config(wire: W, delay: D, config: I2cConfig) -> Self {
        Self {
            wire,
            delay,
            half_period_ns: config.half_period_ns(),
            clock_stretching: config.clock_stretching,
            error: None,
        }
    }

    /// Give the bus and delay back
    pub fn release(self) -> (W, D) {
        (self.wire, self.delay)
    }

    /// One line transition plus its timing
    fn line(&mut self, sda: bool, scl: bool) {
        self.wire.write(sda, scl);
        if scl && self.clock_stretching {
            self.wire.wait_for_clock_release();
        }
        if self.half_period_ns > 0 {
            self.delay.delay_ns(self.half_period_ns);
        }
    }

    /// Start condition: SDA falls while SCL is high
    pub fn start(&mut self) {
        self.line(true, true);
        self.line(false, true);
        self.line(false, false);
    }

    /// Stop condition: SDA rises while SCL is high
    pub fn stop(&mut self) {
        self.line(false, false);
        self.line(false, true);
        self.line(true, true);
    }

    /// Clock one byte out, MSB first
    pub fn send(&mut self, value: u8) {
        let mut mask = 0x80u8;
        while mask != 0 {
            let bit = value & mask != 0;
            self.line(bit, false);
            self.line(bit, true);
            self.line(bit, false);
            mask >>= 1;
        }
    }

    /// Clock one byte in, MSB first
    pub fn read(&mut self) -> u8 {
        let mut mask = 0x80u8;
        let mut value = 0u8;
        while mask != 0 {
            self.line(true, true);
            if self.wire.read() {
                value |= mask;
            }
            self.line(true, false);
            mask >>= 1;
        }
        value
    }

    /// Check the peripheral's acknowledge bit
    ///
    /// Returns `true` when the peripheral pulled SDA low. A NACK with a
    /// `description` is recorded as `"I2C NACK: <description>"`; any other
    /// outcome clears the recorded error.
    pub fn ack(&mut self, description: Option<&str>) -> bool {
        self.line(true, false);
        self.line(true, true);
        let sda = self.wire.read();
        self.line(true, false);

        match description {
            Some(description) if sda => {
                warn!("I2C NACK: {}", description);
                self.store_error(NACK_PREFIX, description);
            }
            _ => self.error = None,
        }

        !sda
    }

    /// Acknowledge a received byte (more bytes wanted)
    pub fn send_ack(&mut self) {
        self.line(false, false);
        self.line(false, true);
        self.line(false, false);
    }

    /// Refuse further bytes from the peripheral
    pub fn send_nack(&mut self) {
        self.line(true, false);
        self.line(true, true);
        self.line(true, false);
        self.line(false, false);
    }

    /// Block for `ms` milliseconds on the engine's delay source
    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Message recorded by the last failed acknowledge, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the last acknowledge check recorded a failure
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Forget any recorded failure
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Record a failure detected without touching the bus
    pub fn record_error(&mut self, message: &str) {
        warn!("I2C error: {}", message);
        self.store_error("", message);
    }

    fn store_error(&mut self, prefix: &str, description: &str) {
        let mut message = String::new();
        let _ = message.push_str(prefix);
        // Overlong descriptions are truncated at a char boundary
        for c in description.chars() {
            if message.push(c).is_err() {
                break;
            }
        }
        self.error = Some(message);
    }
}
