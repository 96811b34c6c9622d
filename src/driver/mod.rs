//! Device session and command execution.

mod analog;
mod chip;
mod gpio;
mod i2c;
mod interrupt;
mod registers;
mod usb;

use crate::codec::{self, FRAME_SIZE, opcode};
use crate::error::Error;
use crate::memory::{MemoryTarget, SramBlock};
use crate::status::Status;
use crate::transport::{DeviceDescriptor, HidTransport, Transport};

/// Maximum length of the flash access password, in bytes.
const PASSWORD_MAX_LEN: usize = 8;

/// An MCP2221 device session.
///
/// A session is created closed, bound to a device with [`open`] (or in one
/// step with [`from_descriptor`]), used for any number of operations, and
/// released with [`close`]. Operations on a closed session fail with
/// [`Error::NotConnected`]. Closing is idempotent, and [`reset`] closes the
/// session implicitly because the chip drops off the bus to re-enumerate.
///
/// The type is generic over its [`Transport`] so the protocol engine can be
/// driven without hardware; production code uses the default
/// [`HidTransport`].
///
/// # Memory targets
///
/// Settings that exist in both SRAM and flash are accessed through methods
/// taking an `Option<MemoryTarget>`. Passing `None` uses the session's
/// default target, which starts as [`MemoryTarget::Sram`] and can be changed
/// with [`set_default_memory_target`].
///
/// [`open`]: Mcp2221::open
/// [`from_descriptor`]: Mcp2221::from_descriptor
/// [`close`]: Mcp2221::close
/// [`reset`]: Mcp2221::reset
/// [`set_default_memory_target`]: Mcp2221::set_default_memory_target
#[derive(Debug)]
pub struct Mcp2221<T: Transport = HidTransport> {
    transport: Option<T>,
    password: Vec<u8>,
    memory_target: MemoryTarget,
}

impl Mcp2221<HidTransport> {
    /// Open the device named by the descriptor and bind it to this session.
    ///
    /// On success the session is open and the GP pins have been settled into
    /// a consistent analog state (see [`attach`]). On failure the session
    /// remains closed.
    ///
    /// [`attach`]: Mcp2221::attach
    pub fn open(&mut self, descriptor: &DeviceDescriptor) -> Result<(), Error> {
        let transport = HidTransport::open(descriptor)?;
        self.attach(transport)
    }

    /// Create a session and open the device named by the descriptor.
    pub fn from_descriptor(descriptor: &DeviceDescriptor) -> Result<Self, Error> {
        let mut session = Self::new();
        session.open(descriptor)?;
        Ok(session)
    }
}

impl<T: Transport> Default for Mcp2221<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Mcp2221<T> {
    /// Create a closed session with an empty flash access password.
    pub fn new() -> Self {
        Self {
            transport: None,
            password: Vec::new(),
            memory_target: MemoryTarget::default(),
        }
    }

    /// Create a closed session carrying a flash access password.
    ///
    /// The password is cached for the lifetime of the session and appended to
    /// every flash chip-settings write, as the chip requires when password
    /// protection is active. Passwords longer than eight bytes are rejected.
    pub fn with_password(password: &str) -> Result<Self, Error> {
        let mut session = Self::new();
        session.set_cached_password(password)?;
        Ok(session)
    }

    /// Bind an already-constructed transport to this session.
    ///
    /// Fails if a device is already open. After binding, the GP pins are
    /// cycled between analog and digital modes so the ADC reports defined
    /// values; some pin configurations otherwise leave it reading garbage
    /// until the next mode change. If that settling exchange fails, the
    /// transport is dropped and the session stays closed.
    pub fn attach(&mut self, transport: T) -> Result<(), Error> {
        if self.is_open() {
            return Err(Error::InvalidParameter(
                "a device is already open in this session",
            ));
        }
        self.transport = Some(transport);
        if let Err(e) = self.sanitize_pin_state() {
            self.transport = None;
            return Err(e);
        }
        Ok(())
    }

    /// Whether a device is currently bound to this session.
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Release the device. Safe to call on a closed session.
    pub fn close(&mut self) {
        self.transport = None;
    }

    /// The register space used when a dual-space accessor is called with
    /// `None`.
    pub fn default_memory_target(&self) -> MemoryTarget {
        self.memory_target
    }

    /// Change the register space used when a dual-space accessor is called
    /// with `None`.
    pub fn set_default_memory_target(&mut self, target: MemoryTarget) {
        self.memory_target = target;
    }

    pub(crate) fn resolve_target(&self, explicit: Option<MemoryTarget>) -> MemoryTarget {
        MemoryTarget::resolve(explicit, self.memory_target)
    }

    pub(crate) fn cached_password(&self) -> &[u8] {
        &self.password
    }

    pub(crate) fn set_cached_password(&mut self, password: &str) -> Result<(), Error> {
        if password.len() > PASSWORD_MAX_LEN {
            return Err(Error::InvalidParameter(
                "flash access password exceeds 8 bytes",
            ));
        }
        self.password = password.as_bytes().to_vec();
        Ok(())
    }

    /// Execute one command round-trip: build, send, receive, validate.
    pub(crate) fn command(&mut self, code: u8, payload: &[u8]) -> Result<[u8; FRAME_SIZE], Error> {
        let frame = codec::build_command(code, payload)?;
        self.transfer_frame(&frame)
    }

    /// Exchange a hand-built frame with the device.
    pub(crate) fn transfer_frame(&mut self, frame: &[u8; FRAME_SIZE]) -> Result<[u8; FRAME_SIZE], Error> {
        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        transport.send_raw(frame)?;
        let raw = transport.recv_raw()?;
        codec::parse_response(&raw, frame[0])
    }

    /// Cycle GP pins between GPIO-input and ADC modes, restoring the original
    /// configuration afterwards. The ADC returns undefined values in some pin
    /// configurations until its inputs have been toggled this way.
    fn sanitize_pin_state(&mut self) -> Result<(), Error> {
        let pins = self.read_sram_block(SramBlock::GpSettings)?;
        if pins.len() < 4 {
            return Err(Error::UnexpectedDeviceData("GP settings block too short"));
        }
        let mut swapped = [pins[0], 0, 0, 0];
        for n in 1..4 {
            let function = pins[n] & 0x03;
            if function == 0 && pins[n] & 0x08 != 0 {
                // GPIO input: park on the ADC function.
                swapped[n] |= 0x02;
            } else if function == 2 {
                // ADC: park on GPIO input.
                swapped[n] |= 0x08;
            } else {
                swapped[n] = pins[n];
            }
        }
        for state in [&swapped[..], &pins[..4]] {
            let mut payload = [0u8; 11];
            payload[6] = 0x80;
            payload[7..11].copy_from_slice(state);
            self.command(opcode::SET_SRAM_SETTINGS, &payload)?;
        }
        Ok(())
    }

    /// Reset the chip, forcing it to re-enumerate on USB.
    ///
    /// The device drops off the bus immediately, so no response is read and a
    /// transport failure while sending the command is expected and ignored.
    /// The session is closed; re-open it once the device has re-enumerated.
    pub fn reset(&mut self) -> Result<(), Error> {
        let frame = codec::build_command(opcode::RESET_CHIP, &[0xAB, 0xCD, 0xEF])?;
        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        match transport.send_raw(&frame) {
            Ok(()) | Err(Error::Hid(_)) => {}
            Err(e) => return Err(e),
        }
        self.close();
        Ok(())
    }

    /// Read the chip's run-time status frame.
    pub fn status(&mut self) -> Result<Status, Error> {
        let frame = self.command(opcode::STATUS_SET_PARAMETERS, &[])?;
        Status::from_frame(&frame)
    }

    /// Read the firmware revision, as four ASCII characters.
    pub fn firmware_version(&mut self) -> Result<String, Error> {
        Ok(self.status()?.firmware_version)
    }
}
