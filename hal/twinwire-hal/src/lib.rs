//! Twinwire Hardware Abstraction Layer
//!
//! This crate defines the capability traits the bit-banged I2C master is
//! built on. Chip-specific crates (RP2040 `Flex` pins, GPIO expanders,
//! embedded-hal pins) implement them; the protocol core only ever talks
//! to these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  twinwire-core (registers, protocol)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  twinwire-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ twinwire-hal- │       │   twinwire-   │
//! │    rp2040     │       │    drivers    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OpenDrainPin`] - Released / driven-low / sampled line
//! - [`i2c::I2cBus`] - Byte-level I2C master operations

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use gpio::OpenDrainPin;
pub use i2c::{I2cBus, I2cConfig};
