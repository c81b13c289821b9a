//! Pin driver registry
//!
//! Maps the `driver` key of a [`BusConfig`] to a constructor. Used once at
//! startup to turn configuration into a bus; nothing in the protocol path
//! looks at it.
//!
//! The context `C` is whatever the constructors need to get at hardware
//! (a pin bank, an expander handle, ...).

use heapless::Vec;

use crate::config::{BusConfig, ConfigError};

/// Errors from registering or building a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// No room for another driver
    RegistryFull,
    /// A driver with this key is already registered
    DuplicateDriver,
    /// No driver registered under the configured key
    UnknownDriver,
    /// The config failed validation
    InvalidConfig(ConfigError),
    /// A configured pin does not exist or is already in use
    PinUnavailable(u8),
}

impl From<ConfigError> for RegistryError {
    fn from(e: ConfigError) -> Self {
        RegistryError::InvalidConfig(e)
    }
}

/// Builds a bus from a config and a hardware context
pub type Constructor<C, T> = fn(&mut C, &BusConfig) -> Result<T, RegistryError>;

/// Name-keyed table of bus constructors
pub struct DriverRegistry<C, T, const N: usize> {
    entries: Vec<(&'static str, Constructor<C, T>), N>,
}

impl<C, T, const N: usize> Default for DriverRegistry<C, T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T, const N: usize> DriverRegistry<C, T, N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a constructor under `key`
    pub fn register(
        &mut self,
        key: &'static str,
        constructor: Constructor<C, T>,
    ) -> Result<(), RegistryError> {
        if self.lookup(key).is_some() {
            return Err(RegistryError::DuplicateDriver);
        }
        self.entries
            .push((key, constructor))
            .map_err(|_| RegistryError::RegistryFull)
    }

    /// Find the constructor registered under `key`
    pub fn lookup(&self, key: &str) -> Option<Constructor<C, T>> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, constructor)| *constructor)
    }

    /// Registered keys, in registration order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Validate `config` and build the bus with the driver it names
    pub fn build(&self, context: &mut C, config: &BusConfig) -> Result<T, RegistryError> {
        config.validate()?;
        let constructor = self.lookup(config.driver.as_str()).ok_or_else(|| {
            warn!("no pin driver registered as {}", config.driver.as_str());
            RegistryError::UnknownDriver
        })?;
        info!(
            "building {} bus on sda={} scl={}",
            config.driver.as_str(),
            config.sda.pin,
            config.scl.pin
        );
        constructor(context, config)
    }
}
