//! Pin driver adapters
//!
//! This crate provides [`twinwire_hal::OpenDrainPin`] implementations for
//! hardware the bus can be bit-banged on:
//!
//! - Any embedded-hal 1.0 open-drain pin ([`embedded`])
//! - MCP23017 16-bit I2C GPIO expander pins ([`mcp23017`])

#![no_std]
#![deny(unsafe_code)]

// Must stay first so the logging macros are visible to later modules
mod fmt;

pub mod embedded;
pub mod mcp23017;

pub use embedded::EhPin;
pub use mcp23017::{Mcp23017, Mcp23017Pin, PinError};
