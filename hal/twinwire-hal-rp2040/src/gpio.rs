//! Open-drain lines on RP2040 GPIO
//!
//! The RP2040 has no open-drain output mode, so a line is emulated with a
//! `Flex` pin: released means input (the pull-up or an external resistor
//! takes the line high), driven means output with the level latched low.

use embassy_rp::gpio::{Flex, Pull};
use embassy_time::Delay;
use twinwire_core::config::{BusConfig, PinConfig};
use twinwire_core::registry::RegistryError;
use twinwire_core::wire::GpioBus;
use twinwire_core::I2cMaster;
use twinwire_hal::OpenDrainPin;

use crate::pins::PinBank;

/// GPIO pin used as an open-drain bus line
pub struct FlexPin<'d> {
    pin: Flex<'d>,
}

impl<'d> FlexPin<'d> {
    /// Wrap a flex pin, starting released
    pub fn new(mut pin: Flex<'d>, pull_up: bool) -> Self {
        pin.set_pull(if pull_up { Pull::Up } else { Pull::None });
        pin.set_low();
        pin.set_as_input();
        Self { pin }
    }
}

impl OpenDrainPin for FlexPin<'_> {
    fn release(&mut self) {
        self.pin.set_as_input();
    }

    fn set_low(&mut self) {
        // Latch low before the driver is enabled
        self.pin.set_low();
        self.pin.set_as_output();
    }

    fn is_high(&mut self) -> bool {
        self.pin.is_high()
    }
}

/// Bus on two RP2040 GPIO pins
pub type FlexBus = GpioBus<FlexPin<'static>, FlexPin<'static>>;

/// Registry constructor for the `"gpio"` driver key
///
/// Both pins are checked before either is taken, so a failed build leaves
/// the bank untouched.
pub fn build_bus(bank: &mut PinBank, config: &BusConfig) -> Result<FlexBus, RegistryError> {
    for pin in [config.sda.pin, config.scl.pin] {
        if !bank.is_available(pin) {
            #[cfg(feature = "defmt")]
            defmt::warn!("GPIO{} unavailable", pin);
            return Err(RegistryError::PinUnavailable(pin));
        }
    }
    let sda = line(bank, &config.sda)?;
    let scl = line(bank, &config.scl)?;
    Ok(GpioBus::new(sda, scl))
}

fn line(bank: &mut PinBank, config: &PinConfig) -> Result<FlexPin<'static>, RegistryError> {
    let pin = bank
        .take(config.pin)
        .map_err(|_| RegistryError::PinUnavailable(config.pin))?;
    Ok(FlexPin::new(Flex::new(pin), config.pull_up))
}

/// Register-level master on a GPIO bus, timed with the embassy delay
pub fn master(bus: FlexBus, config: &BusConfig) -> I2cMaster<FlexBus, Delay> {
    I2cMaster::with_config(bus, Delay, config)
}
