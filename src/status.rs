//! Parsed view of the Status/Set Parameters response.
//!
//! The status response is the chip's general-purpose telemetry frame: one
//! exchange reports the I2C engine's state, the interrupt flag, the firmware
//! revision and the latest conversion of all three ADC channels.

use crate::codec::FRAME_SIZE;
use crate::error::Error;

/// Snapshot of the chip's run-time state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// State of the I2C engine.
    pub i2c: I2cEngineStatus,
    /// Whether the edge-detection interrupt flag is set.
    pub interrupt_detected: bool,
    /// Firmware revision, as four ASCII characters (for example `"A6L6"`).
    pub firmware_version: String,
    /// Most recent conversion of ADC channels 1 to 3, as 10-bit values.
    pub adc_values: [u16; 3],
}

/// State of the I2C engine as reported in the status frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I2cEngineStatus {
    /// Length requested for the transfer currently in progress.
    pub requested_transfer_length: u16,
    /// Bytes already moved for the transfer currently in progress.
    pub transferred_length: u16,
    /// Fill level of the engine's internal data buffer.
    pub internal_buffer_counter: u8,
    /// Current baud divider byte; see [`Mcp2221::i2c_speed`] for the
    /// conversion to Hz.
    ///
    /// [`Mcp2221::i2c_speed`]: crate::Mcp2221::i2c_speed
    pub bus_speed_divider: u8,
    /// Address used by the transfer currently in progress.
    pub target_address: u16,
    /// Whether the SCL line currently reads high.
    pub scl_high: bool,
    /// Whether the SDA line currently reads high.
    pub sda_high: bool,
    /// Raw value of the engine's pending-read register.
    pub pending_read_value: u8,
}

impl Status {
    /// Interpret a successful status response frame.
    pub(crate) fn from_frame(frame: &[u8; FRAME_SIZE]) -> Result<Self, Error> {
        let adc = |offset: usize| u16::from_le_bytes([frame[offset], frame[offset + 1]]);
        Ok(Self {
            i2c: I2cEngineStatus {
                requested_transfer_length: u16::from_le_bytes([frame[9], frame[10]]),
                transferred_length: u16::from_le_bytes([frame[11], frame[12]]),
                internal_buffer_counter: frame[13],
                bus_speed_divider: frame[14],
                target_address: u16::from_le_bytes([frame[16], frame[17]]),
                scl_high: frame[22] != 0,
                sda_high: frame[23] != 0,
                pending_read_value: frame[25],
            },
            interrupt_detected: frame[24] != 0,
            firmware_version: String::from_utf8_lossy(&frame[46..50]).into_owned(),
            adc_values: [adc(50), adc(52), adc(54)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adc_channels_are_little_endian_words() {
        let mut frame = [0u8; FRAME_SIZE];
        frame[50] = 0x02;
        frame[52] = 0x1F;
        frame[54] = 0xFF;
        frame[55] = 0x03;
        let status = Status::from_frame(&frame).unwrap();
        assert_eq!(status.adc_values, [2, 31, 1023]);
    }

    #[test]
    fn firmware_version_is_read_as_ascii() {
        let mut frame = [0u8; FRAME_SIZE];
        frame[46..50].copy_from_slice(b"A6L6");
        let status = Status::from_frame(&frame).unwrap();
        assert_eq!(status.firmware_version, "A6L6");
    }

    #[test]
    fn i2c_engine_fields_are_unpacked() {
        let mut frame = [0u8; FRAME_SIZE];
        frame[9] = 0x10;
        frame[10] = 0x01;
        frame[11] = 0x08;
        frame[13] = 5;
        frame[14] = 117;
        frame[16] = 0x90;
        frame[22] = 1;
        frame[23] = 0;
        frame[24] = 1;
        frame[25] = 0x7F;
        let status = Status::from_frame(&frame).unwrap();
        assert_eq!(status.i2c.requested_transfer_length, 0x0110);
        assert_eq!(status.i2c.transferred_length, 8);
        assert_eq!(status.i2c.internal_buffer_counter, 5);
        assert_eq!(status.i2c.bus_speed_divider, 117);
        assert_eq!(status.i2c.target_address, 0x90);
        assert!(status.i2c.scl_high);
        assert!(!status.i2c.sda_high);
        assert!(status.interrupt_detected);
        assert_eq!(status.i2c.pending_read_value, 0x7F);
    }

    #[test]
    fn line_states_treat_any_nonzero_byte_as_high() {
        let mut frame = [0u8; FRAME_SIZE];
        frame[22] = 2;
        frame[23] = 0xFF;
        frame[24] = 0x80;
        let status = Status::from_frame(&frame).unwrap();
        assert!(status.i2c.scl_high);
        assert!(status.i2c.sda_high);
        assert!(status.interrupt_detected);
    }
}
