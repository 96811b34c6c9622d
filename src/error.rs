/// Problems encountered while talking to the MCP2221.
///
/// The variants fall into a few families, which matter because callers should
/// react differently to each:
///
/// - Connectivity failures ([`NotConnected`], [`Hid`]) are fatal to the
///   operation in flight but recoverable by closing and reopening the session.
/// - Protocol failures ([`EmptyResponse`], [`CommandCodeMismatch`],
///   [`CommandFailed`], [`UnexpectedDeviceData`]) indicate the device replied
///   with something other than a well-formed success response. They are never
///   retried automatically, except where the protocol itself defines polling
///   (the I2C engine's busy status).
/// - [`InvalidParameter`] is raised before any frame is built or sent; a
///   request that fails validation never reaches the device.
/// - The `I2c`-prefixed variants map the I2C engine's documented failure
///   codes.
///
/// [`NotConnected`]: Error::NotConnected
/// [`Hid`]: Error::Hid
/// [`EmptyResponse`]: Error::EmptyResponse
/// [`CommandCodeMismatch`]: Error::CommandCodeMismatch
/// [`CommandFailed`]: Error::CommandFailed
/// [`UnexpectedDeviceData`]: Error::UnexpectedDeviceData
/// [`InvalidParameter`]: Error::InvalidParameter
#[derive(Debug)]
pub enum Error {
    /// An operation was attempted while no device is open in this session.
    NotConnected,
    /// The underlying USB HID transport failed.
    Hid(hidapi::HidError),
    /// The transport returned no bytes where a 64-byte response was expected.
    EmptyResponse,
    /// The command code echoed by the device differs from the code sent.
    CommandCodeMismatch {
        /// Command code written to the device.
        sent: u8,
        /// Command code echoed back in byte 0 of the response.
        received: u8,
    },
    /// The device reported a nonzero status byte for the command.
    ///
    /// The enclosed value is the status code returned in place of the success
    /// code (0). Its meaning is command-specific.
    CommandFailed(u8),
    /// A response field held a bit pattern outside the documented value set.
    ///
    /// The enclosed string names the field. This is a protocol-class failure:
    /// unrecognised codes are rejected rather than passed through as raw
    /// values.
    UnexpectedDeviceData(&'static str),
    /// A parameter was rejected by validation, before any frame was built.
    InvalidParameter(&'static str),
    /// The I2C engine stayed busy after the driver's retries were exhausted.
    I2cEngineBusy,
    /// The I2C engine could not supply read data; the target did not respond.
    I2cTargetNotResponding,
    /// The I2C target signalled an error during the transfer.
    I2cTargetError,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotConnected => write!(f, "device not connected"),
            Error::Hid(e) => write!(f, "HID transport error: {e}"),
            Error::EmptyResponse => write!(f, "empty response from device"),
            Error::CommandCodeMismatch { sent, received } => write!(
                f,
                "response command code {received:#04x} does not match sent code {sent:#04x}"
            ),
            Error::CommandFailed(code) => write!(f, "command failed with code {code}"),
            Error::UnexpectedDeviceData(what) => {
                write!(f, "unexpected value from device: {what}")
            }
            Error::InvalidParameter(what) => write!(f, "invalid parameter: {what}"),
            Error::I2cEngineBusy => write!(f, "I2C engine busy, retries exhausted"),
            Error::I2cTargetNotResponding => write!(f, "I2C target did not respond"),
            Error::I2cTargetError => write!(f, "I2C target signalled an error"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Hid(e) => Some(e),
            _ => None,
        }
    }
}

#[doc(hidden)]
impl From<hidapi::HidError> for Error {
    fn from(value: hidapi::HidError) -> Self {
        Self::Hid(value)
    }
}
