//! Hardware configuration types
//!
//! These types describe which pins carry the bus, which pin driver
//! provides them, and how the bus is timed.

use heapless::String;
use twinwire_hal::I2cConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::registers::DEFAULT_SETTLE_MS;

/// Maximum length of a driver key
pub const MAX_DRIVER_NAME_LEN: usize = 16;

/// Driver key used when none is configured
pub const DEFAULT_DRIVER: &str = "gpio";

/// Pin configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PinConfig {
    /// Pin number within the driver (GPIO number, expander pin, ...)
    pub pin: u8,
    /// Enable the internal pull-up when the line is released
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            pull_up: false,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self { pin, pull_up: true }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Driver key is empty
    MissingDriver,
    /// Driver key longer than [`MAX_DRIVER_NAME_LEN`]
    DriverNameTooLong,
    /// SDA and SCL are the same pin
    SharedPin,
}

/// Bit-banged bus configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    /// Registry key of the pin driver (e.g. "gpio", "mcp23017")
    pub driver: String<MAX_DRIVER_NAME_LEN>,
    /// Data line
    pub sda: PinConfig,
    /// Clock line
    pub scl: PinConfig,
    /// Clock frequency in Hz (0 = untimed)
    pub frequency: u32,
    /// Wait for peripherals that stretch the clock
    pub clock_stretching: bool,
    /// Delay between the register-pointer write and the data read, in ms
    pub settle_ms: u32,
    /// First wire address of the scan window
    pub scan_start: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        let mut driver = String::new();
        // DEFAULT_DRIVER fits MAX_DRIVER_NAME_LEN
        let _ = driver.push_str(DEFAULT_DRIVER);
        Self {
            driver,
            sda: PinConfig::with_pullup(0),
            scl: PinConfig::with_pullup(1),
            frequency: I2cConfig::STANDARD.frequency,
            clock_stretching: false,
            settle_ms: DEFAULT_SETTLE_MS,
            scan_start: 0x00,
        }
    }
}

impl BusConfig {
    /// Create a config for a driver and pin pair, other fields default
    pub fn new(driver: &str, sda: PinConfig, scl: PinConfig) -> Result<Self, ConfigError> {
        let mut name = String::new();
        name.push_str(driver)
            .map_err(|_| ConfigError::DriverNameTooLong)?;
        let config = Self {
            driver: name,
            sda,
            scl,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the config is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.is_empty() {
            return Err(ConfigError::MissingDriver);
        }
        if self.sda.pin == self.scl.pin {
            return Err(ConfigError::SharedPin);
        }
        Ok(())
    }

    /// Timing part of the config
    pub fn i2c_config(&self) -> I2cConfig {
        I2cConfig {
            frequency: self.frequency,
            clock_stretching: self.clock_stretching,
        }
    }
}
