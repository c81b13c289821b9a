//! Configuration types
//!
//! Board-agnostic bus wiring description, used at startup to pick a pin
//! driver and build the master.

pub mod hardware;

pub use hardware::*;
