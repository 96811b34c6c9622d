//! Fixed-size command/response frame codec.
//!
//! Every exchange with the MCP2221 is one 64-byte command report followed by
//! one 64-byte response report. Byte 0 of a command is the command code; the
//! rest is command-specific payload, zero-padded. Byte 0 of a response echoes
//! the command code and byte 1 is a status code (0 for success). The functions
//! here are pure transforms; the session layer owns the transport exchange.

use crate::error::Error;

/// Size of a command or response report, in bytes.
pub(crate) const FRAME_SIZE: usize = 64;

/// Maximum payload that fits after the command code byte.
pub(crate) const MAX_PAYLOAD: usize = FRAME_SIZE - 1;

/// Status byte value indicating a successfully executed command.
pub(crate) const COMMAND_SUCCESS: u8 = 0x00;

/// Status byte signalling the I2C engine could not accept the request yet.
pub(crate) const I2C_ENGINE_BUSY: u8 = 0x01;

/// Command codes understood by the MCP2221.
///
/// See chapter 3 of the datasheet. Flash access takes a sub-code in byte 1
/// selecting the register block.
pub(crate) mod opcode {
    pub const STATUS_SET_PARAMETERS: u8 = 0x10;
    pub const I2C_GET_DATA: u8 = 0x40;
    pub const SET_GPIO_VALUES: u8 = 0x50;
    pub const GET_GPIO_VALUES: u8 = 0x51;
    pub const SET_SRAM_SETTINGS: u8 = 0x60;
    pub const GET_SRAM_SETTINGS: u8 = 0x61;
    pub const RESET_CHIP: u8 = 0x70;
    pub const I2C_WRITE_DATA: u8 = 0x90;
    pub const I2C_READ_DATA: u8 = 0x91;
    pub const I2C_WRITE_REPEATED_START: u8 = 0x92;
    pub const I2C_READ_REPEATED_START: u8 = 0x93;
    pub const I2C_WRITE_NO_STOP: u8 = 0x94;
    pub const READ_FLASH_DATA: u8 = 0xB0;
    pub const WRITE_FLASH_DATA: u8 = 0xB1;
    pub const SEND_FLASH_ACCESS_PASSWORD: u8 = 0xB2;
}

/// Build a zero-padded 64-byte command frame.
///
/// The command code lands at byte 0, the payload from byte 1. Payloads longer
/// than 63 bytes are rejected before anything is sent.
pub(crate) fn build_command(code: u8, payload: &[u8]) -> Result<[u8; FRAME_SIZE], Error> {
    if payload.len() > MAX_PAYLOAD {
        return Err(Error::InvalidParameter("command payload exceeds 63 bytes"));
    }
    let mut frame = [0u8; FRAME_SIZE];
    frame[0] = code;
    frame[1..1 + payload.len()].copy_from_slice(payload);
    Ok(frame)
}

/// Validate a raw response against the command code that produced it.
///
/// A response is only handed to the caller for interpretation if it is a full
/// frame, echoes the command code, and carries the success status. Anything
/// else is a protocol failure, not a parsed result.
pub(crate) fn parse_response(raw: &[u8], sent_code: u8) -> Result<[u8; FRAME_SIZE], Error> {
    if raw.is_empty() {
        return Err(Error::EmptyResponse);
    }
    if raw.len() != FRAME_SIZE {
        return Err(Error::UnexpectedDeviceData("short response frame"));
    }
    if raw[0] != sent_code {
        return Err(Error::CommandCodeMismatch {
            sent: sent_code,
            received: raw[0],
        });
    }
    if raw[1] != COMMAND_SUCCESS {
        return Err(Error::CommandFailed(raw[1]));
    }
    let mut frame = [0u8; FRAME_SIZE];
    frame.copy_from_slice(raw);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_frame_is_zero_padded_with_code_at_offset_zero() {
        let frame = build_command(opcode::READ_FLASH_DATA, &[0x01]).unwrap();
        assert_eq!(frame[0], 0xB0);
        assert_eq!(frame[1], 0x01);
        assert!(frame[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let payload = [0u8; 64];
        assert!(matches!(
            build_command(0x10, &payload),
            Err(Error::InvalidParameter(_))
        ));
        assert!(build_command(0x10, &payload[..63]).is_ok());
    }

    #[test]
    fn empty_response_is_a_distinct_failure() {
        assert!(matches!(parse_response(&[], 0x10), Err(Error::EmptyResponse)));
    }

    #[test]
    fn mismatched_echo_is_rejected() {
        let mut raw = [0u8; 64];
        raw[0] = 0x11;
        match parse_response(&raw, 0x10) {
            Err(Error::CommandCodeMismatch { sent, received }) => {
                assert_eq!(sent, 0x10);
                assert_eq!(received, 0x11);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn nonzero_status_is_command_failed() {
        let mut raw = [0u8; 64];
        raw[0] = 0x10;
        raw[1] = 0x41;
        assert!(matches!(
            parse_response(&raw, 0x10),
            Err(Error::CommandFailed(0x41))
        ));
    }

    #[test]
    fn successful_response_is_returned_whole() {
        let mut raw = [0u8; 64];
        raw[0] = 0x10;
        raw[24] = 0x01;
        let frame = parse_response(&raw, 0x10).unwrap();
        assert_eq!(frame[24], 0x01);
    }
}
