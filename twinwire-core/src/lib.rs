//! Bit-banged I2C master core
//!
//! This crate contains everything that does not depend on a particular
//! chip, layered strictly top-down:
//!
//! - Register transactions and scanning ([`registers`])
//! - The bit-level protocol engine ([`protocol`])
//! - The two-wire line model over open-drain pins ([`wire`])
//!
//! plus the surfaces built on them: strict transfers implementing
//! `embedded_hal::i2c::I2c` ([`transfer`]), a CircuitPython-style wrapper
//! ([`busio`]), bus configuration ([`config`]) and the pin driver
//! registry used at startup ([`registry`]).
//!
//! ```text
//! registers ──▶ protocol ──▶ wire ──▶ OpenDrainPin (twinwire-hal)
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

// Must stay first so the logging macros are visible to later modules
mod fmt;

pub mod busio;
pub mod config;
pub mod error;
pub mod protocol;
pub mod registers;
pub mod registry;
pub mod transfer;
pub mod wire;

#[cfg(test)]
pub(crate) mod sim;

pub use config::{BusConfig, ConfigError, PinConfig};
pub use error::{Error, NackSource};
pub use protocol::Protocol;
pub use registers::{AddressList, I2cMaster};
pub use registry::{Constructor, DriverRegistry, RegistryError};
pub use wire::{GpioBus, TwoWire};
