//! CircuitPython-style bus wrapper
//!
//! Mirrors the shape of CircuitPython's `busio.I2C` so code ported from
//! there maps one-to-one: lock the bus, scan, then `writeto` /
//! `readfrom_into` / `writeto_then_readfrom`. The lock is advisory
//! bookkeeping only; the wrapper is still single-owner.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::Operation;
use heapless::Vec;

use crate::error::Error;
use crate::registers::I2cMaster;
use crate::wire::TwoWire;

/// Lowest non-reserved 7-bit address
pub const FIRST_ADDRESS: u8 = 0x08;

/// Highest non-reserved 7-bit address
pub const LAST_ADDRESS: u8 = 0x77;

/// Addresses a full scan can report
pub const MAX_DEVICES: usize = (LAST_ADDRESS - FIRST_ADDRESS + 1) as usize;

/// CircuitPython-style I2C object
pub struct I2c<W, D> {
    master: I2cMaster<W, D>,
    locked: bool,
}

impl<W: TwoWire, D: DelayNs> I2c<W, D> {
    pub fn new(master: I2cMaster<W, D>) -> Self {
        Self {
            master,
            locked: false,
        }
    }

    /// Release the wrapper and return the master
    pub fn deinit(self) -> I2cMaster<W, D> {
        self.master
    }

    /// Take the lock; `false` if it is already held
    pub fn try_lock(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    fn check_lock(&self) -> Result<(), Error> {
        if self.locked {
            Ok(())
        } else {
            Err(Error::NotLocked)
        }
    }

    /// 7-bit addresses in `0x08..=0x77` that acknowledge a write probe
    pub fn scan(&mut self) -> Result<Vec<u8, MAX_DEVICES>, Error> {
        self.check_lock()?;
        let mut found = Vec::new();
        for address in FIRST_ADDRESS..=LAST_ADDRESS {
            if self.master.probe(address) {
                let _ = found.push(address);
            }
        }
        Ok(found)
    }

    /// Read `buffer.len()` bytes from a device
    pub fn readfrom_into(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.check_lock()?;
        self.master
            .run(address, &mut [Operation::Read(buffer)], true)
    }

    /// Write bytes to a device
    ///
    /// With `stop == false` the bus is held and the next transfer starts
    /// with a repeated start.
    pub fn writeto(&mut self, address: u8, buffer: &[u8], stop: bool) -> Result<(), Error> {
        self.check_lock()?;
        self.master
            .run(address, &mut [Operation::Write(buffer)], stop)
    }

    /// Write then read in one transaction (repeated start, no STOP between)
    pub fn writeto_then_readfrom(
        &mut self,
        address: u8,
        buffer_out: &[u8],
        buffer_in: &mut [u8],
    ) -> Result<(), Error> {
        self.check_lock()?;
        self.master.run(
            address,
            &mut [Operation::Write(buffer_out), Operation::Read(buffer_in)],
            true,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Event, Line, SimBus, SimDelay, SimDevice, SimPin};
    use crate::wire::GpioBus;

    fn busio(sim: &SimBus) -> I2c<GpioBus<SimPin<'_>, SimPin<'_>>, SimDelay<'_>> {
        let bus = GpioBus::new(sim.pin(Line::Sda), sim.pin(Line::Scl));
        I2c::new(I2cMaster::new(bus, SimDelay::new(sim)))
    }

    #[test]
    fn test_lock() {
        let sim = SimBus::new();
        let mut i2c = busio(&sim);

        assert_eq!(i2c.scan(), Err(Error::NotLocked));
        assert!(i2c.try_lock());
        assert!(!i2c.try_lock());
        i2c.unlock();
        assert!(i2c.try_lock());
    }

    #[test]
    fn test_scan_reports_seven_bit_addresses() {
        let sim = SimBus::with_device(SimDevice::new(0x3C));
        let mut i2c = busio(&sim);
        assert!(i2c.try_lock());

        let found = i2c.scan().unwrap();
        assert_eq!(found.as_slice(), &[0x3C]);
    }

    #[test]
    fn test_scan_empty_bus_is_not_an_error() {
        let sim = SimBus::new();
        let mut i2c = busio(&sim);
        assert!(i2c.try_lock());
        assert!(i2c.scan().unwrap().is_empty());
    }

    #[test]
    fn test_writeto_then_readfrom() {
        let sim = SimBus::with_device(
            SimDevice::new(0x44)
                .with_register(0x7E, 0x54)
                .with_register(0x7F, 0x49),
        );
        let mut i2c = busio(&sim);
        assert!(i2c.try_lock());

        let mut id = [0u8; 2];
        i2c.writeto_then_readfrom(0x44, &[0x7E], &mut id).unwrap();
        assert_eq!(id, [0x54, 0x49]);
    }

    #[test]
    fn test_writeto_without_stop_then_readfrom_into() {
        let sim = SimBus::with_device(SimDevice::new(0x44).with_register(0x05, 0x99));
        let mut i2c = busio(&sim);
        assert!(i2c.try_lock());

        i2c.writeto(0x44, &[0x05], false).unwrap();
        let mut value = [0u8; 1];
        i2c.readfrom_into(0x44, &mut value).unwrap();

        assert_eq!(value, [0x99]);
        let framing: heapless::Vec<Event, 4> = sim
            .events()
            .iter()
            .copied()
            .filter(|event| matches!(event, Event::Start | Event::Stop))
            .collect();
        assert_eq!(
            framing.as_slice(),
            &[Event::Start, Event::Start, Event::Stop]
        );
    }

    #[test]
    fn test_deinit_returns_master() {
        let sim = SimBus::with_device(SimDevice::new(0x44));
        let i2c = busio(&sim);
        let mut master = i2c.deinit();
        assert!(master.probe(0x44));
    }

    #[test]
    fn test_readfrom_into_empty_buffer_leaves_bus_idle() {
        let sim = SimBus::with_device(SimDevice::new(0x44));
        let mut i2c = busio(&sim);
        assert!(i2c.try_lock());

        assert_eq!(i2c.readfrom_into(0x44, &mut []), Err(Error::EmptyRead));
        assert!(sim.events().is_empty());
        assert!(sim.sda_level() && sim.scl_level());
    }
}
