//! I2C transfer framing and bus-speed arithmetic.

use crate::codec::opcode;
use crate::error::Error;

/// How an I2C transfer is framed on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cMode {
    /// Issue a Start condition and finish with a Stop.
    Start,
    /// Issue a Repeated Start (the bus must already be held) and finish with
    /// a Stop.
    RepeatedStart,
    /// Issue a Start but hold the bus afterwards, without a Stop.
    ///
    /// Only valid for writes; the engine has no read command without a Stop.
    NoStop,
}

impl I2cMode {
    /// Command code for a write transfer in this mode.
    pub(crate) fn write_opcode(self) -> u8 {
        match self {
            I2cMode::Start => opcode::I2C_WRITE_DATA,
            I2cMode::RepeatedStart => opcode::I2C_WRITE_REPEATED_START,
            I2cMode::NoStop => opcode::I2C_WRITE_NO_STOP,
        }
    }

    /// Command code for a read transfer in this mode, if one exists.
    pub(crate) fn read_opcode(self) -> Option<u8> {
        match self {
            I2cMode::Start => Some(opcode::I2C_READ_DATA),
            I2cMode::RepeatedStart => Some(opcode::I2C_READ_REPEATED_START),
            I2cMode::NoStop => None,
        }
    }
}

/// Internal clock feeding the I2C engine's baud divider.
const I2C_CLOCK_HZ: u32 = 12_000_000;

/// Slowest representable bus speed (divider byte 255).
pub const I2C_SPEED_MIN_HZ: u32 = 46_333;

/// Fastest bus speed accepted by the driver.
pub const I2C_SPEED_MAX_HZ: u32 = 4_000_000;

/// Divider byte producing the requested bus speed.
///
/// Speeds outside [`I2C_SPEED_MIN_HZ`]..=[`I2C_SPEED_MAX_HZ`] do not fit in
/// the divider byte and are rejected.
pub(crate) fn divisor_for_speed(speed_hz: u32) -> Result<u8, Error> {
    if !(I2C_SPEED_MIN_HZ..=I2C_SPEED_MAX_HZ).contains(&speed_hz) {
        return Err(Error::InvalidParameter("I2C bus speed out of range"));
    }
    Ok((I2C_CLOCK_HZ / speed_hz - 3) as u8)
}

/// Bus speed in Hz corresponding to a divider byte.
pub(crate) fn speed_from_divisor(divisor: u8) -> u32 {
    I2C_CLOCK_HZ / (u32::from(divisor) + 3)
}

/// Engine response to a transfer-cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cCancelTransferResponse {
    /// No transfer was in progress; nothing to cancel.
    NoOp,
    /// A transfer was in progress and has been marked for cancellation.
    MarkedForCancellation,
    /// The engine was already idle.
    InIdleMode,
}

impl TryFrom<u8> for I2cCancelTransferResponse {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::NoOp),
            0x10 => Ok(Self::MarkedForCancellation),
            0x11 => Ok(Self::InIdleMode),
            _ => Err(Error::UnexpectedDeviceData("I2C cancel transfer response")),
        }
    }
}

/// Engine response to a bus-speed change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cSetSpeedResponse {
    /// The speed field was not marked for update.
    NoOp,
    /// The new speed was accepted.
    SpeedConsidered,
    /// The engine refused the change, typically because a transfer is in
    /// progress.
    SpeedNotSet,
}

impl TryFrom<u8> for I2cSetSpeedResponse {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::NoOp),
            0x20 => Ok(Self::SpeedConsidered),
            0x21 => Ok(Self::SpeedNotSet),
            _ => Err(Error::UnexpectedDeviceData("I2C set speed response")),
        }
    }
}
