//! `embedded-hal` I2C bus implementation.
//!
//! Lets driver crates written against [`embedded_hal::i2c::I2c`] run over an
//! MCP2221 attached to the host. The engine cannot interleave arbitrary bus
//! operations: a transaction is mapped onto at most one write (all write
//! operations concatenated, held open with no Stop when reads follow) and one
//! read (all read operations fetched in one go behind a Repeated Start).
//! Transactions with a write after a read cannot be expressed and are
//! rejected.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress};

use crate::driver::Mcp2221;
use crate::error::Error;
use crate::i2c::I2cMode;
use crate::transport::Transport;

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::I2cTargetNotResponding => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)
            }
            _ => ErrorKind::Other,
        }
    }
}

impl<T: Transport> ErrorType for Mcp2221<T> {
    type Error = Error;
}

impl<T: Transport> I2c<SevenBitAddress> for Mcp2221<T> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut write_data = Vec::new();
        let mut has_write = false;
        let mut read_total = 0usize;
        for op in operations.iter() {
            match op {
                Operation::Write(data) => {
                    if read_total > 0 {
                        return Err(Error::InvalidParameter(
                            "write after read not supported in an I2C transaction",
                        ));
                    }
                    has_write = true;
                    write_data.extend_from_slice(data);
                }
                Operation::Read(buffer) => read_total += buffer.len(),
            }
        }

        let read_back = match (has_write, read_total) {
            (false, 0) => return Ok(()),
            (true, 0) => {
                self.i2c_write(address, &write_data, I2cMode::Start)?;
                return Ok(());
            }
            (false, n) => self.i2c_read(address, n, I2cMode::Start)?,
            (true, n) => {
                self.i2c_write(address, &write_data, I2cMode::NoStop)?;
                self.i2c_read(address, n, I2cMode::RepeatedStart)?
            }
        };

        let mut cursor = 0;
        for op in operations.iter_mut() {
            if let Operation::Read(buffer) = op {
                buffer.copy_from_slice(&read_back[cursor..cursor + buffer.len()]);
                cursor += buffer.len();
            }
        }
        Ok(())
    }
}
