//! Strict multi-byte transfers
//!
//! Unlike register transactions, any missing acknowledge aborts the
//! transfer with a STOP and an [`Error::Nack`]. These back the
//! [`twinwire_hal::I2cBus`] and `embedded_hal::i2c::I2c` implementations,
//! so drivers written against either trait run on the bit-banged bus.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use twinwire_hal::I2cBus;

use crate::error::{Error, NackSource};
use crate::registers::{wire_address, I2cMaster, MAX_ADDRESS, READ, WRITE};
use crate::wire::TwoWire;

const ADDRESS_NACK: &str = "address not acknowledged";
const DATA_NACK: &str = "data not acknowledged";

impl<W: TwoWire, D: DelayNs> I2cMaster<W, D> {
    /// Write bytes to a device
    pub fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        self.run(address, &mut [Operation::Write(bytes)], true)
    }

    /// Read bytes from a device, NACKing the last one
    pub fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.run(address, &mut [Operation::Read(buf)], true)
    }

    /// Write then read with a repeated start in between
    pub fn write_read(&mut self, address: u8, bytes: &[u8], buf: &mut [u8]) -> Result<(), Error> {
        self.run(
            address,
            &mut [Operation::Write(bytes), Operation::Read(buf)],
            true,
        )
    }

    /// Execute a run of operations as one transaction
    ///
    /// A START (or repeated START) plus address byte is issued whenever
    /// the direction changes. Read runs ACK every byte except the last one
    /// before a direction change or the end. With `stop == false` the bus
    /// is kept and the next transaction begins with a repeated start.
    /// A read run totalling zero bytes is refused with
    /// [`Error::EmptyRead`] before anything touches the bus.
    pub(crate) fn run(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
        stop: bool,
    ) -> Result<(), Error> {
        if address > MAX_ADDRESS {
            return Err(Error::InvalidAddress(address));
        }
        if operations.is_empty() {
            return Ok(());
        }

        check_read_runs(operations)?;

        let mut reading = None;
        for i in 0..operations.len() {
            let more_in_run = read_bytes_follow(operations, i);
            let is_read = matches!(operations[i], Operation::Read(_));

            if reading != Some(is_read) {
                if self.bus_held || reading.is_some() {
                    trace!("repeated start to {:#x}", address);
                }
                self.protocol.start();
                let direction = if is_read { READ } else { WRITE };
                self.protocol.send(wire_address(address, direction));
                if !self.protocol.ack(Some(ADDRESS_NACK)) {
                    return Err(self.abort(NackSource::Address));
                }
                reading = Some(is_read);
            }

            match &mut operations[i] {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        self.protocol.send(byte);
                        if !self.protocol.ack(Some(DATA_NACK)) {
                            return Err(self.abort(NackSource::Data));
                        }
                    }
                }
                Operation::Read(buf) => {
                    let len = buf.len();
                    for (n, slot) in buf.iter_mut().enumerate() {
                        *slot = self.protocol.read();
                        if n + 1 < len || more_in_run {
                            self.protocol.send_ack();
                        } else {
                            self.protocol.send_nack();
                        }
                    }
                }
            }
        }

        if stop {
            self.protocol.stop();
            self.bus_held = false;
        } else {
            self.bus_held = true;
        }
        Ok(())
    }

    fn abort(&mut self, source: NackSource) -> Error {
        debug!("transfer aborted: {:?}", source);
        self.protocol.stop();
        self.bus_held = false;
        Error::Nack(source)
    }
}

/// Whether the read run containing `index` continues with more bytes
///
/// Decides between ACK and NACK after the last byte of `operations[index]`.
fn read_bytes_follow(operations: &[Operation<'_>], index: usize) -> bool {
    operations[index + 1..]
        .iter()
        .map_while(|op| match op {
            Operation::Read(buf) => Some(buf.len()),
            Operation::Write(_) => None,
        })
        .any(|len| len > 0)
}

/// Reject read runs with no bytes at all
///
/// A peripheral addressed for reading drives SDA until it is NACKed, and
/// only a received byte can be NACKed.
fn check_read_runs(operations: &[Operation<'_>]) -> Result<(), Error> {
    let mut in_run = false;
    let mut run_len = 0;
    for op in operations {
        match op {
            Operation::Read(buf) => {
                in_run = true;
                run_len += buf.len();
            }
            Operation::Write(_) => {
                if in_run && run_len == 0 {
                    return Err(Error::EmptyRead);
                }
                in_run = false;
                run_len = 0;
            }
        }
    }
    if in_run && run_len == 0 {
        return Err(Error::EmptyRead);
    }
    Ok(())
}

impl<W: TwoWire, D: DelayNs> I2cBus for I2cMaster<W, D> {
    type Error = Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        I2cMaster::write(self, address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        I2cMaster::read(self, address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        I2cMaster::write_read(self, address, write_data, read_buf)
    }
}

impl<W: TwoWire, D: DelayNs> ErrorType for I2cMaster<W, D> {
    type Error = Error;
}

impl<W: TwoWire, D: DelayNs> I2c<SevenBitAddress> for I2cMaster<W, D> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(address, operations, true)
    }
}
