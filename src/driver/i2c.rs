//! I2C transfers and bus management.

use std::thread::sleep;
use std::time::Duration;

use crate::codec::{I2C_ENGINE_BUSY, opcode};
use crate::error::Error;
use crate::i2c::{
    I2cCancelTransferResponse, I2cMode, I2cSetSpeedResponse, divisor_for_speed,
    speed_from_divisor,
};
use crate::transport::Transport;

use super::Mcp2221;

/// Attempts made against a busy I2C engine before giving up.
const MAX_BUSY_RETRIES: usize = 20;

/// Pause between attempts against a busy engine.
const BUSY_RETRY_DELAY: Duration = Duration::from_millis(2);

/// Data bytes carried by one I2C transfer frame.
const CHUNK_SIZE: usize = 60;

/// Engine status byte marking a read-data fetch that found no data because
/// the target never responded.
const READ_NO_DATA: u8 = 0x41;

/// Read-length byte marking an error signalled by the target.
const READ_TARGET_ERROR: u8 = 0x7F;

impl<T: Transport> Mcp2221<T> {
    /// Change the I2C bus speed.
    ///
    /// The engine may refuse while a transfer is in progress, reported as
    /// [`I2cSetSpeedResponse::SpeedNotSet`].
    pub fn i2c_set_speed(&mut self, speed_hz: u32) -> Result<I2cSetSpeedResponse, Error> {
        let divisor = divisor_for_speed(speed_hz)?;
        let response =
            self.command(opcode::STATUS_SET_PARAMETERS, &[0x00, 0x00, 0x20, divisor])?;
        I2cSetSpeedResponse::try_from(response[3])
    }

    /// Currently configured I2C bus speed, in Hz.
    pub fn i2c_speed(&mut self) -> Result<u32, Error> {
        Ok(speed_from_divisor(self.status()?.i2c.bus_speed_divider))
    }

    /// Ask the engine to abandon the transfer in progress, if any.
    ///
    /// Useful to recover the bus after a failed transfer left the engine
    /// mid-transaction.
    pub fn i2c_cancel_transfer(&mut self) -> Result<I2cCancelTransferResponse, Error> {
        let response = self.command(opcode::STATUS_SET_PARAMETERS, &[0x00, 0x10])?;
        I2cCancelTransferResponse::try_from(response[2])
    }

    /// Write bytes to a target device.
    ///
    /// `address` is the 7-bit target address. Transfers longer than one
    /// frame are split into 60-byte chunks, each carrying the full transfer
    /// length so the engine frames them as one bus transaction. A busy
    /// engine is retried a bounded number of times per chunk.
    pub fn i2c_write(&mut self, address: u8, data: &[u8], mode: I2cMode) -> Result<(), Error> {
        check_transfer_parameters(address, data.len())?;
        let code = mode.write_opcode();
        let length = data.len() as u16;
        let header = [length as u8, (length >> 8) as u8, address << 1];
        if data.is_empty() {
            // Zero-length write: a single frame carrying only the address.
            return self.command_retrying_busy(code, &header);
        }
        for chunk in data.chunks(CHUNK_SIZE) {
            let mut payload = Vec::with_capacity(3 + chunk.len());
            payload.extend_from_slice(&header);
            payload.extend_from_slice(chunk);
            self.command_retrying_busy(code, &payload)?;
        }
        Ok(())
    }

    /// Read bytes from a target device.
    ///
    /// `address` is the 7-bit target address. [`I2cMode::NoStop`] is not
    /// available for reads; the engine has no such command. Data is
    /// collected frame by frame until `length` bytes have arrived.
    pub fn i2c_read(&mut self, address: u8, length: usize, mode: I2cMode) -> Result<Vec<u8>, Error> {
        check_transfer_parameters(address, length)?;
        let code = mode
            .read_opcode()
            .ok_or(Error::InvalidParameter("no-stop mode not available for reads"))?;
        let header = [length as u8, (length >> 8) as u8, (address << 1) | 0x01];

        let mut result = Vec::with_capacity(length);
        while result.len() < length {
            self.command_retrying_busy(code, &header)?;
            let response = match self.command(opcode::I2C_GET_DATA, &[]) {
                Ok(frame) => frame,
                Err(Error::CommandFailed(READ_NO_DATA)) => {
                    return Err(Error::I2cTargetNotResponding);
                }
                Err(e) => return Err(e),
            };
            if response[3] == READ_TARGET_ERROR {
                return Err(Error::I2cTargetError);
            }
            let chunk_len = response[3] as usize;
            let chunk = response
                .get(4..4 + chunk_len)
                .ok_or(Error::UnexpectedDeviceData("I2C read chunk length"))?;
            result.extend_from_slice(chunk);
        }
        Ok(result)
    }

    /// Length requested for the transfer currently in progress.
    pub fn i2c_requested_transfer_length(&mut self) -> Result<u16, Error> {
        Ok(self.status()?.i2c.requested_transfer_length)
    }

    /// Bytes already moved for the transfer currently in progress.
    pub fn i2c_transferred_length(&mut self) -> Result<u16, Error> {
        Ok(self.status()?.i2c.transferred_length)
    }

    /// Fill level of the engine's internal data buffer.
    pub fn i2c_internal_buffer_counter(&mut self) -> Result<u8, Error> {
        Ok(self.status()?.i2c.internal_buffer_counter)
    }

    /// Address used by the transfer currently in progress.
    pub fn i2c_target_address(&mut self) -> Result<u16, Error> {
        Ok(self.status()?.i2c.target_address)
    }

    /// Whether the SCL line currently reads high.
    pub fn i2c_scl_state(&mut self) -> Result<bool, Error> {
        Ok(self.status()?.i2c.scl_high)
    }

    /// Whether the SDA line currently reads high.
    pub fn i2c_sda_state(&mut self) -> Result<bool, Error> {
        Ok(self.status()?.i2c.sda_high)
    }

    /// Raw value of the engine's pending-read register.
    pub fn i2c_pending_read_value(&mut self) -> Result<u8, Error> {
        Ok(self.status()?.i2c.pending_read_value)
    }

    /// Execute a command, retrying while the engine reports itself busy.
    fn command_retrying_busy(&mut self, code: u8, payload: &[u8]) -> Result<(), Error> {
        for _ in 0..MAX_BUSY_RETRIES {
            match self.command(code, payload) {
                Ok(_) => return Ok(()),
                Err(Error::CommandFailed(I2C_ENGINE_BUSY)) => sleep(BUSY_RETRY_DELAY),
                Err(e) => return Err(e),
            }
        }
        Err(Error::I2cEngineBusy)
    }
}

fn check_transfer_parameters(address: u8, length: usize) -> Result<(), Error> {
    if address > 0x7F {
        return Err(Error::InvalidParameter("I2C address exceeds 7 bits"));
    }
    if length > 0xFFFF {
        return Err(Error::InvalidParameter("I2C transfer exceeds 65535 bytes"));
    }
    Ok(())
}
