//! Two-wire line model
//!
//! Combines a data pin and a clock pin into the three logical operations
//! the protocol engine is written against. Lines are open-drain: `true`
//! releases a line to the pull-up, `false` drives it low.

use twinwire_hal::OpenDrainPin;

/// Logical SDA/SCL pair
///
/// Each `write` is one electrical transition. The engine relies on the
/// data line being updated before the clock line within a single call.
pub trait TwoWire {
    /// Set both lines (`true` = released, `false` = driven low)
    fn write(&mut self, sda: bool, scl: bool);

    /// Sample the data line
    fn read(&mut self) -> bool;

    /// Busy-wait until a peripheral stops stretching the clock
    ///
    /// There is no timeout: a clock line stuck low blocks forever.
    fn wait_for_clock_release(&mut self);
}

impl<W: TwoWire + ?Sized> TwoWire for &mut W {
    fn write(&mut self, sda: bool, scl: bool) {
        (**self).write(sda, scl);
    }

    fn read(&mut self) -> bool {
        (**self).read()
    }

    fn wait_for_clock_release(&mut self) {
        (**self).wait_for_clock_release();
    }
}

/// I2C bus on two GPIO pins
pub struct GpioBus<SDA, SCL> {
    sda: SDA,
    scl: SCL,
}

impl<SDA: OpenDrainPin, SCL: OpenDrainPin> GpioBus<SDA, SCL> {
    /// Create a bus from a data pin and a clock pin
    ///
    /// Both lines are released so the bus starts idle.
    pub fn new(sda: SDA, scl: SCL) -> Self {
        let mut bus = Self { sda, scl };
        bus.write(true, true);
        bus
    }

    /// Give the pins back
    pub fn release(self) -> (SDA, SCL) {
        (self.sda, self.scl)
    }
}

impl<SDA: OpenDrainPin, SCL: OpenDrainPin> TwoWire for GpioBus<SDA, SCL> {
    fn write(&mut self, sda: bool, scl: bool) {
        self.sda.set_level(sda);
        self.scl.set_level(scl);
    }

    fn read(&mut self) -> bool {
        self.sda.release();
        self.sda.is_high()
    }

    fn wait_for_clock_release(&mut self) {
        while !self.scl.is_high() {}
    }
}
