//! Register transactions and bus discovery
//!
//! Register operations follow a lenient error policy: a missing
//! acknowledge is recorded in the protocol's error state and the sequence
//! carries on to its STOP, so the bus is always left idle. Callers that
//! need validation check [`I2cMaster::error`] afterwards.

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use twinwire_hal::I2cConfig;

use crate::config::BusConfig;
use crate::error::Error;
use crate::protocol::Protocol;
use crate::wire::TwoWire;

/// Direction bit for a write transfer
pub const WRITE: u8 = 0;

/// Direction bit for a read transfer
pub const READ: u8 = 1;

/// Width of the window probed by one scan
pub const SCAN_SPAN: u8 = 0x10;

/// Maximum responders one scan can report
pub const MAX_SCAN_RESULTS: usize = (SCAN_SPAN / 2) as usize;

/// Default wait between the pointer write and the data read, in ms
pub const DEFAULT_SETTLE_MS: u32 = 100;

/// Description recorded when a register write is not acknowledged
pub const WRITE_ERROR: &str = "I2C target register access denied !";

/// Description recorded when a register read is not acknowledged
pub const READ_ERROR: &str = "cannot read I2C target register !";

/// Description recorded when an address does not fit in 7 bits
pub const ADDRESS_ERROR: &str = "I2C address exceeds 7 bits !";

/// Highest 7-bit address
pub const MAX_ADDRESS: u8 = 0x7F;

/// Addresses that answered a scan
pub type AddressList = Vec<u8, MAX_SCAN_RESULTS>;

/// Put a 7-bit address and direction bit on the wire
pub const fn wire_address(address: u8, direction: u8) -> u8 {
    (address << 1) | direction
}

/// Bit-banged I2C master
///
/// Owns the protocol engine (and through it the pins). All operations
/// run to completion; none can be interrupted part-way.
pub struct I2cMaster<W, D> {
    pub(crate) protocol: Protocol<W, D>,
    settle_ms: u32,
    /// A transfer ended without STOP; the next START is a repeated start
    pub(crate) bus_held: bool,
}

impl<W: TwoWire, D: DelayNs> I2cMaster<W, D> {
    /// Create an untimed master with the default settle delay
    pub fn new(wire: W, delay: D) -> Self {
        Self::from_protocol(Protocol::new(wire, delay), DEFAULT_SETTLE_MS)
    }

    /// Create a master with timing and settle delay from a bus config
    pub fn with_config(wire: W, delay: D, config: &BusConfig) -> Self {
        Self::from_protocol(
            Protocol::with_config(wire, delay, config.i2c_config()),
            config.settle_ms,
        )
    }

    /// Create a master with explicit timing
    pub fn with_timing(wire: W, delay: D, timing: I2cConfig, settle_ms: u32) -> Self {
        Self::from_protocol(Protocol::with_config(wire, delay, timing), settle_ms)
    }

    /// Wrap an existing protocol engine
    pub fn from_protocol(protocol: Protocol<W, D>, settle_ms: u32) -> Self {
        Self {
            protocol,
            settle_ms,
            bus_held: false,
        }
    }

    /// Give the protocol engine back
    pub fn release(self) -> Protocol<W, D> {
        self.protocol
    }

    /// Access the protocol engine for hand-rolled sequences
    pub fn protocol(&mut self) -> &mut Protocol<W, D> {
        &mut self.protocol
    }

    /// Message recorded by the last failed acknowledge, if any
    pub fn error(&self) -> Option<&str> {
        self.protocol.error()
    }

    /// Whether the last acknowledge check recorded a failure
    pub fn has_error(&self) -> bool {
        self.protocol.has_error()
    }

    /// Probe a window of 8-bit wire addresses
    ///
    /// Candidates are `start_address`, `start_address + 2`, ... up to
    /// `start_address + 0x0E`; stepping by two skips the direction bit, so
    /// the values are write-form wire addresses (`address << 1`) and are
    /// returned as such. Each candidate gets a full
    /// start/address/ack/read/NACK/stop sequence. Fails with
    /// [`Error::NoDeviceFound`] only after the whole window stayed silent.
    pub fn scan(&mut self, start_address: u8) -> Result<AddressList, Error> {
        let mut addresses = AddressList::new();

        for offset in (0..SCAN_SPAN).step_by(2) {
            let candidate = start_address.wrapping_add(offset);
            self.protocol.start();
            self.protocol.send(candidate);
            if self.protocol.ack(None) {
                debug!("scan: device at {:#x}", candidate);
                // Window holds at most MAX_SCAN_RESULTS candidates
                let _ = addresses.push(candidate);
            }
            self.protocol.read();
            self.protocol.send_nack();
            self.protocol.stop();
        }

        if addresses.is_empty() {
            warn!("scan: no I2C component found from {:#x}", start_address);
            return Err(Error::NoDeviceFound);
        }
        Ok(addresses)
    }

    /// Check whether a 7-bit address acknowledges
    pub fn probe(&mut self, address: u8) -> bool {
        if !self.check_address(address) {
            return false;
        }
        self.protocol.start();
        self.protocol.send(wire_address(address, WRITE));
        let present = self.protocol.ack(None);
        self.protocol.stop();
        self.bus_held = false;
        present
    }

    /// Write one register
    ///
    /// Sends address, register, value and a trailing zero byte, each
    /// followed by an acknowledge check. The trailing zero is a framing
    /// convention of the peripheral family this layer was built for, not
    /// an I2C requirement.
    pub fn write_register(&mut self, address: u8, register: u8, value: u8) {
        self.write_register_with_error(address, register, value, WRITE_ERROR);
    }

    /// [`write_register`](Self::write_register) with a custom NACK description
    pub fn write_register_with_error(
        &mut self,
        address: u8,
        register: u8,
        value: u8,
        description: &str,
    ) {
        if !self.check_address(address) {
            return;
        }
        trace!("write_register {:#x}[{:#x}] = {:#x}", address, register, value);
        self.protocol.start();
        for byte in [wire_address(address, WRITE), register, value, 0] {
            self.protocol.send(byte);
            self.protocol.ack(Some(description));
        }
        self.protocol.stop();
        self.bus_held = false;
    }

    /// Read one register
    pub fn read_register(&mut self, address: u8, register: u8) -> u8 {
        self.read_register_with_error(address, register, READ_ERROR)
    }

    /// [`read_register`](Self::read_register) with a custom NACK description
    pub fn read_register_with_error(&mut self, address: u8, register: u8, description: &str) -> u8 {
        if !self.check_address(address) {
            return 0;
        }
        self.select_register(address, register, description);

        self.protocol.start();
        self.protocol.send(wire_address(address, READ));
        self.protocol.ack(Some(description));
        let data = self.protocol.read();
        self.protocol.send_nack();
        self.protocol.stop();
        self.bus_held = false;

        trace!("read_register {:#x}[{:#x}] -> {:#x}", address, register, data);
        data
    }

    /// Read two consecutive bytes starting at a register
    ///
    /// The first byte is acknowledged, the second is not.
    pub fn read_register_word(&mut self, address: u8, register: u8) -> (u8, u8) {
        self.read_register_word_with_error(address, register, READ_ERROR)
    }

    /// [`read_register_word`](Self::read_register_word) with a custom NACK description
    pub fn read_register_word_with_error(
        &mut self,
        address: u8,
        register: u8,
        description: &str,
    ) -> (u8, u8) {
        if !self.check_address(address) {
            return (0, 0);
        }
        self.select_register(address, register, description);

        self.protocol.start();
        self.protocol.send(wire_address(address, READ));
        self.protocol.ack(Some(description));
        let first = self.protocol.read();
        self.protocol.send_ack();
        let second = self.protocol.read();
        self.protocol.send_nack();
        self.protocol.stop();
        self.bus_held = false;

        (first, second)
    }

    /// Refuse addresses that would alias another device once shifted
    ///
    /// Nothing is put on the bus; the failure goes to the error state.
    fn check_address(&mut self, address: u8) -> bool {
        if address > MAX_ADDRESS {
            self.protocol.record_error(ADDRESS_ERROR);
            return false;
        }
        true
    }

    /// Write phase of a register read, then let the peripheral prepare data
    fn select_register(&mut self, address: u8, register: u8, description: &str) {
        self.protocol.start();
        self.protocol.send(wire_address(address, WRITE));
        self.protocol.ack(Some(description));
        self.protocol.send(register);
        self.protocol.ack(Some(description));
        self.protocol.stop();
        self.bus_held = false;

        self.protocol.delay_ms(self.settle_ms);
    }
}
