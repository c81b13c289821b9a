//! I2C bus abstractions
//!
//! Provides the byte-level master trait and bus timing configuration.

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

/// I2C timing configuration
///
/// A bit-banged bus has no clock generator; the frequency only sets how
/// long the master waits after each line transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz, 0 = as fast as the pins toggle
    pub frequency: u32,
    /// Wait for the peripheral to release SCL after raising it
    pub clock_stretching: bool,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        clock_stretching: false,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        frequency: 400_000,
        clock_stretching: false,
    };

    /// No inter-transition delay
    pub const UNTIMED: Self = Self {
        frequency: 0,
        clock_stretching: false,
    };

    /// Enable clock stretching support
    pub const fn with_clock_stretching(mut self) -> Self {
        self.clock_stretching = true;
        self
    }

    /// Delay between line transitions, in nanoseconds
    ///
    /// Each clock period is two transitions, so this is half the period.
    /// Returns 0 for an untimed bus.
    pub const fn half_period_ns(&self) -> u32 {
        if self.frequency == 0 {
            return 0;
        }
        500_000_000 / self.frequency
    }
}
