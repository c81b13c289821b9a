//! RP2040 support for the bit-banged I2C master
//!
//! - Open-drain emulation on embassy-rp `Flex` pins
//! - Dynamic pin allocation for config-driven bus setup
//! - Registry constructor for the `"gpio"` driver key

#![no_std]

pub mod gpio;
pub mod pins;

pub use gpio::{build_bus, FlexBus, FlexPin};
pub use pins::{PinBank, PinError};
