//! Error types for strict transfers and bus discovery

use core::fmt;

/// Which byte of a transfer was not acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NackSource {
    /// The address byte (no device answered)
    Address,
    /// A data byte after the address was accepted
    Data,
}

/// Errors reported by the I2C master
///
/// Register transactions never return these for a missing acknowledge;
/// they record it in the protocol's error state instead. Only scans and
/// the strict transfer APIs fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Peripheral did not acknowledge
    Nack(NackSource),
    /// A scan finished without a single responder
    NoDeviceFound,
    /// Address does not fit in 7 bits
    InvalidAddress(u8),
    /// Bus wrapper used without holding its lock
    NotLocked,
    /// A read phase asked for zero bytes, so no byte could be NACKed
    EmptyRead,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Nack(NackSource::Address) => f.write_str("address not acknowledged"),
            Error::Nack(NackSource::Data) => f.write_str("data not acknowledged"),
            Error::NoDeviceFound => f.write_str("no I2C component found"),
            Error::InvalidAddress(address) => write!(f, "invalid 7-bit address {:#04x}", address),
            Error::NotLocked => f.write_str("bus is not locked"),
            Error::EmptyRead => f.write_str("read of zero bytes"),
        }
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

        match self {
            Error::Nack(NackSource::Address) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            Error::Nack(NackSource::Data) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Error::NoDeviceFound => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Error::InvalidAddress(_) | Error::NotLocked | Error::EmptyRead => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{Error as _, ErrorKind, NoAcknowledgeSource};

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            Error::Nack(NackSource::Address).kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(
            Error::Nack(NackSource::Data).kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
        );
        assert_eq!(Error::NotLocked.kind(), ErrorKind::Other);
        assert_eq!(Error::EmptyRead.kind(), ErrorKind::Other);
    }
}
