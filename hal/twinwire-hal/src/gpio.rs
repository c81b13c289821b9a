//! GPIO pin abstractions
//!
//! I2C lines are open-drain: a pin is either actively pulled low or
//! released so the bus pull-up brings it high. Nothing in this crate ever
//! drives a line high.

/// Open-drain capable pin
///
/// Implementations handle the chip-specific mechanics (switching the pin
/// between output-low and pulled-up input, expander register writes, ...).
/// All three required methods must be provided; there are no defaults.
pub trait OpenDrainPin {
    /// Release the line (high-impedance input with pull-up)
    fn release(&mut self);

    /// Actively drive the line low
    fn set_low(&mut self);

    /// Sample the current logic level of the line
    ///
    /// Takes `&mut self` because some adapters (expanders) must perform a
    /// bus transaction to read.
    fn is_high(&mut self) -> bool;

    /// Sample the line and report whether it is low
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }

    /// Release the line when `high`, drive it low otherwise
    fn set_level(&mut self, high: bool) {
        if high {
            self.release();
        } else {
            self.set_low();
        }
    }
}

impl<P: OpenDrainPin + ?Sized> OpenDrainPin for &mut P {
    fn release(&mut self) {
        (**self).release();
    }

    fn set_low(&mut self) {
        (**self).set_low();
    }

    fn is_high(&mut self) -> bool {
        (**self).is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pin with an external pull-down that can be toggled
    struct MockPin {
        released: bool,
        held_low_externally: bool,
    }

    impl OpenDrainPin for MockPin {
        fn release(&mut self) {
            self.released = true;
        }

        fn set_low(&mut self) {
            self.released = false;
        }

        fn is_high(&mut self) -> bool {
            self.released && !self.held_low_externally
        }
    }

    #[test]
    fn test_set_level() {
        let mut pin = MockPin {
            released: false,
            held_low_externally: false,
        };

        pin.set_level(true);
        assert!(pin.is_high());

        pin.set_level(false);
        assert!(pin.is_low());
    }

    #[test]
    fn test_released_line_pulled_low_by_peer() {
        let mut pin = MockPin {
            released: true,
            held_low_externally: true,
        };
        assert!(pin.is_low());
    }

    #[test]
    fn test_mut_ref_forwarding() {
        let mut pin = MockPin {
            released: false,
            held_low_externally: false,
        };
        fn release_line<P: OpenDrainPin>(mut pin: P) {
            pin.release();
        }

        release_line(&mut pin);
        assert!(pin.released);
    }
}
