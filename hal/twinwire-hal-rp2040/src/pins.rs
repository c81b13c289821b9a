//! Dynamic pin allocation for config-driven bus setup
//!
//! Bus pins come from `bus.toml` as numbers, so the firmware cannot name
//! `p.PIN_n` fields directly. The bank holds every GPIO and hands them
//! out by number, each at most once.

use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;

/// Number of user GPIOs on the RP2040
pub const PIN_COUNT: u8 = 30;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
}

/// Build a [`PinBank`] from embassy peripherals
///
/// Moves `PIN_0` through `PIN_29` out of `p`; the other peripherals stay
/// usable.
///
/// ```ignore
/// let p = embassy_rp::init(Default::default());
/// let mut bank = pin_bank!(p);
/// let sda = bank.take(4)?;
/// ```
#[macro_export]
macro_rules! pin_bank {
    ($p:expr) => {
        $crate::pins::PinBank::new([
            $p.PIN_0.into(), $p.PIN_1.into(), $p.PIN_2.into(), $p.PIN_3.into(),
            $p.PIN_4.into(), $p.PIN_5.into(), $p.PIN_6.into(), $p.PIN_7.into(),
            $p.PIN_8.into(), $p.PIN_9.into(), $p.PIN_10.into(), $p.PIN_11.into(),
            $p.PIN_12.into(), $p.PIN_13.into(), $p.PIN_14.into(), $p.PIN_15.into(),
            $p.PIN_16.into(), $p.PIN_17.into(), $p.PIN_18.into(), $p.PIN_19.into(),
            $p.PIN_20.into(), $p.PIN_21.into(), $p.PIN_22.into(), $p.PIN_23.into(),
            $p.PIN_24.into(), $p.PIN_25.into(), $p.PIN_26.into(), $p.PIN_27.into(),
            $p.PIN_28.into(), $p.PIN_29.into(),
        ])
    };
}

/// Pin bank that holds all GPIO pins and allows taking them by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; PIN_COUNT as usize],
}

impl PinBank {
    /// Create a bank from all 30 GPIOs, indexed by pin number
    pub fn new(pins: [Peri<'static, AnyPin>; PIN_COUNT as usize]) -> Self {
        Self {
            pins: pins.map(Some),
        }
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if pin_num >= PIN_COUNT {
            return Err(PinError::InvalidPin);
        }
        self.pins[pin_num as usize]
            .take()
            .ok_or(PinError::AlreadyTaken)
    }

    /// Check if a pin is available
    pub fn is_available(&self, pin_num: u8) -> bool {
        pin_num < PIN_COUNT && self.pins[pin_num as usize].is_some()
    }
}
