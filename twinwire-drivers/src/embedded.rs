//! embedded-hal pin adapter
//!
//! Wraps a pin already configured as an open-drain output: setting it high
//! lets the line float up to the pull-up, setting it low drives it, and
//! its input path reads the actual line level.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use twinwire_hal::OpenDrainPin;

/// Open-drain embedded-hal pin
///
/// Pin operations on the bus cannot fail, so only pins with an
/// [`Infallible`] error type are accepted.
pub struct EhPin<P> {
    pin: P,
}

impl<P> EhPin<P>
where
    P: InputPin + OutputPin + ErrorType<Error = Infallible>,
{
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give the pin back
    pub fn into_inner(self) -> P {
        self.pin
    }
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

impl<P> OpenDrainPin for EhPin<P>
where
    P: InputPin + OutputPin + ErrorType<Error = Infallible>,
{
    fn release(&mut self) {
        infallible(self.pin.set_high());
    }

    fn set_low(&mut self) {
        infallible(self.pin.set_low());
    }

    fn is_high(&mut self) -> bool {
        infallible(self.pin.is_high())
    }
}
