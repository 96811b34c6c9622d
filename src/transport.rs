//! The USB HID transport seam.
//!
//! The protocol engine never touches `hidapi` directly; it talks through the
//! [`Transport`] trait, which carries exactly one contract: write a 64-byte
//! report, then block-read the 64-byte response. [`HidTransport`] is the
//! production implementation. Tests drive the engine through a scripted
//! transport instead.

use hidapi::{HidApi, HidDevice};

use crate::codec::FRAME_SIZE;
use crate::error::Error;

/// USB vendor ID assigned to Microchip (1240).
pub const MICROCHIP_VID: u16 = 0x04D8;

/// Default USB product ID of the MCP2221 and MCP2221A (221).
pub const MCP2221_PID: u16 = 0x00DD;

/// Blocking, half-duplex exchange of 64-byte HID reports.
///
/// Exactly one request may be in flight at a time: callers write a frame with
/// [`send_raw`] and then collect the response with [`recv_raw`]. I/O failures
/// surface as [`Error::Hid`], which the session treats as a connectivity
/// failure.
///
/// [`send_raw`]: Transport::send_raw
/// [`recv_raw`]: Transport::recv_raw
pub trait Transport {
    /// Write one 64-byte command report to the device.
    fn send_raw(&mut self, frame: &[u8; FRAME_SIZE]) -> Result<(), Error>;

    /// Block until the device produces a response report.
    ///
    /// Returns the raw bytes read, which may be empty if the device produced
    /// nothing; the frame codec turns that into [`Error::EmptyResponse`].
    fn recv_raw(&mut self) -> Result<Vec<u8>, Error>;
}

/// Identity of one attached HID device, as reported by the host.
///
/// Obtained from [`find_devices`] and consumed by [`Mcp2221::open`] or
/// [`Mcp2221::from_descriptor`].
///
/// [`Mcp2221::open`]: crate::Mcp2221::open
/// [`Mcp2221::from_descriptor`]: crate::Mcp2221::from_descriptor
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    /// Platform-specific device path used to open the device.
    pub path: std::ffi::CString,
    /// USB vendor ID.
    pub vendor_id: u16,
    /// USB product ID.
    pub product_id: u16,
    /// USB serial number string, if the device reports one.
    pub serial_number: Option<String>,
}

/// List attached HID devices matching the default MCP2221 vendor/product IDs.
pub fn find_devices() -> Result<Vec<DeviceDescriptor>, Error> {
    find_devices_with_ids(MICROCHIP_VID, MCP2221_PID)
}

/// List attached HID devices matching the given vendor and product IDs.
///
/// Use this instead of [`find_devices`] if the USB VID or PID stored in the
/// chip's flash has been changed.
pub fn find_devices_with_ids(
    vendor_id: u16,
    product_id: u16,
) -> Result<Vec<DeviceDescriptor>, Error> {
    let api = HidApi::new()?;
    Ok(api
        .device_list()
        .filter(|info| info.vendor_id() == vendor_id && info.product_id() == product_id)
        .map(|info| DeviceDescriptor {
            path: info.path().to_owned(),
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            serial_number: info.serial_number().map(str::to_owned),
        })
        .collect())
}

/// [`Transport`] implementation over a `hidapi` device handle.
pub struct HidTransport {
    device: HidDevice,
}

impl HidTransport {
    /// Open the HID device named by the descriptor.
    pub fn open(descriptor: &DeviceDescriptor) -> Result<Self, Error> {
        let api = HidApi::new()?;
        let device = api.open_path(&descriptor.path)?;
        Ok(Self { device })
    }
}

impl Transport for HidTransport {
    fn send_raw(&mut self, frame: &[u8; FRAME_SIZE]) -> Result<(), Error> {
        // hidapi expects the report ID in byte 0; the MCP2221 uses the
        // default report, so a zero byte is prefixed to every frame.
        let mut report = [0u8; FRAME_SIZE + 1];
        report[1..].copy_from_slice(frame);
        log::debug!("=> {:02x?}", frame);
        let written = self.device.write(&report)?;
        if written != report.len() {
            return Err(Error::UnexpectedDeviceData("short HID report write"));
        }
        Ok(())
    }

    fn recv_raw(&mut self) -> Result<Vec<u8>, Error> {
        let mut buf = [0u8; FRAME_SIZE];
        let read = self.device.read(&mut buf)?;
        log::debug!("<= {:02x?}", &buf[..read]);
        Ok(buf[..read].to_vec())
    }
}

impl std::fmt::Debug for HidTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidTransport").finish_non_exhaustive()
    }
}
