//! USB identity: VID/PID, power attributes, string descriptors.
//!
//! All of these live in flash only; they describe how the chip enumerates at
//! the next power-up.

use crate::codec::opcode;
use crate::error::Error;
use crate::memory::FlashBlock;
use crate::transport::Transport;

use super::Mcp2221;

/// Longest descriptor string the chip stores, in UTF-16 code units.
const DESCRIPTOR_MAX_CHARS: usize = 30;

impl<T: Transport> Mcp2221<T> {
    /// USB vendor ID the chip enumerates with.
    pub fn usb_vendor_id(&mut self) -> Result<u16, Error> {
        let image = self.read_flash_block(FlashBlock::ChipSettings)?;
        chip_word(&image, 4)
    }

    /// Set the USB vendor ID the chip enumerates with.
    pub fn set_usb_vendor_id(&mut self, vendor_id: u16) -> Result<(), Error> {
        let mut image = self.read_flash_block(FlashBlock::ChipSettings)?;
        set_chip_word(&mut image, 4, vendor_id)?;
        self.write_flash_block(FlashBlock::ChipSettings, &image)
    }

    /// USB product ID the chip enumerates with.
    pub fn usb_product_id(&mut self) -> Result<u16, Error> {
        let image = self.read_flash_block(FlashBlock::ChipSettings)?;
        chip_word(&image, 6)
    }

    /// Set the USB product ID the chip enumerates with.
    pub fn set_usb_product_id(&mut self, product_id: u16) -> Result<(), Error> {
        let mut image = self.read_flash_block(FlashBlock::ChipSettings)?;
        set_chip_word(&mut image, 6, product_id)?;
        self.write_flash_block(FlashBlock::ChipSettings, &image)
    }

    /// Whether the chip reports itself as self-powered during enumeration.
    pub fn usb_self_powered(&mut self) -> Result<bool, Error> {
        Ok(self.read_flash_bits(FlashBlock::ChipSettings, 8, &[6])?[0])
    }

    /// Set the self-powered attribute reported during enumeration.
    pub fn set_usb_self_powered(&mut self, value: bool) -> Result<(), Error> {
        self.write_flash_bits(FlashBlock::ChipSettings, 8, &[6], &[value])
    }

    /// Whether the chip advertises USB remote wake-up.
    pub fn usb_remote_wakeup(&mut self) -> Result<bool, Error> {
        Ok(self.read_flash_bits(FlashBlock::ChipSettings, 8, &[5])?[0])
    }

    /// Set the remote wake-up attribute reported during enumeration.
    pub fn set_usb_remote_wakeup(&mut self, value: bool) -> Result<(), Error> {
        self.write_flash_bits(FlashBlock::ChipSettings, 8, &[5], &[value])
    }

    /// Current the chip requests from the host during enumeration, in mA.
    pub fn usb_current_ma(&mut self) -> Result<u16, Error> {
        let image = self.read_flash_block(FlashBlock::ChipSettings)?;
        let raw = image
            .get(9)
            .copied()
            .ok_or(Error::UnexpectedDeviceData("chip settings block too short"))?;
        Ok(u16::from(raw) * 2)
    }

    /// Set the current requested from the host during enumeration, in mA.
    ///
    /// The chip stores the value in 2 mA units; odd values round down.
    pub fn set_usb_current_ma(&mut self, milliamps: u16) -> Result<(), Error> {
        if milliamps > 510 {
            return Err(Error::InvalidParameter("USB current exceeds 510 mA"));
        }
        let mut image = self.read_flash_block(FlashBlock::ChipSettings)?;
        let slot = image
            .get_mut(9)
            .ok_or(Error::UnexpectedDeviceData("chip settings block too short"))?;
        *slot = (milliamps / 2) as u8;
        self.write_flash_block(FlashBlock::ChipSettings, &image)
    }

    /// USB manufacturer descriptor string.
    pub fn usb_manufacturer_descriptor(&mut self) -> Result<String, Error> {
        self.read_descriptor(FlashBlock::UsbManufacturerDescriptor)
    }

    /// Set the USB manufacturer descriptor string.
    pub fn set_usb_manufacturer_descriptor(&mut self, value: &str) -> Result<(), Error> {
        self.write_descriptor(FlashBlock::UsbManufacturerDescriptor, value)
    }

    /// USB product descriptor string.
    pub fn usb_product_descriptor(&mut self) -> Result<String, Error> {
        self.read_descriptor(FlashBlock::UsbProductDescriptor)
    }

    /// Set the USB product descriptor string.
    pub fn set_usb_product_descriptor(&mut self, value: &str) -> Result<(), Error> {
        self.write_descriptor(FlashBlock::UsbProductDescriptor, value)
    }

    /// USB serial number descriptor string.
    pub fn usb_serial_number_descriptor(&mut self) -> Result<String, Error> {
        self.read_descriptor(FlashBlock::UsbSerialNumberDescriptor)
    }

    /// Set the USB serial number descriptor string.
    pub fn set_usb_serial_number_descriptor(&mut self, value: &str) -> Result<(), Error> {
        self.write_descriptor(FlashBlock::UsbSerialNumberDescriptor, value)
    }

    /// The factory serial number, stored as ASCII.
    pub fn factory_serial_number(&mut self) -> Result<String, Error> {
        let data = self.read_flash_block(FlashBlock::FactorySerialNumber)?;
        String::from_utf8(data)
            .map_err(|_| Error::UnexpectedDeviceData("factory serial number encoding"))
    }

    /// Overwrite the factory serial number.
    pub fn set_factory_serial_number(&mut self, value: &str) -> Result<(), Error> {
        if value.len() > 60 {
            return Err(Error::InvalidParameter("serial number exceeds 60 bytes"));
        }
        let mut payload = vec![
            FlashBlock::FactorySerialNumber.code(),
            value.len() as u8,
            0x03,
        ];
        payload.extend_from_slice(value.as_bytes());
        self.command(opcode::WRITE_FLASH_DATA, &payload)?;
        Ok(())
    }

    /// Read and decode one UTF-16 string descriptor block.
    ///
    /// The block's length field counts the string bytes plus the two-byte
    /// descriptor header, so for strings shorter than the maximum the read
    /// overshoots by two bytes which must be dropped before decoding.
    fn read_descriptor(&mut self, block: FlashBlock) -> Result<String, Error> {
        let mut data = self.read_flash_block(block)?;
        if data.len() < 60 {
            data.truncate(data.len().saturating_sub(2));
        }
        if data.len() % 2 != 0 {
            return Err(Error::UnexpectedDeviceData("descriptor length not even"));
        }
        let units: Vec<u16> = data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units)
            .map_err(|_| Error::UnexpectedDeviceData("descriptor string encoding"))
    }

    /// Encode and write one UTF-16 string descriptor block.
    fn write_descriptor(&mut self, block: FlashBlock, value: &str) -> Result<(), Error> {
        let units: Vec<u16> = value.encode_utf16().collect();
        if units.len() > DESCRIPTOR_MAX_CHARS {
            return Err(Error::InvalidParameter("descriptor exceeds 30 characters"));
        }
        // Length field counts the string bytes plus the two-byte USB string
        // descriptor header; 0x03 is the string descriptor type.
        let mut payload = vec![block.code(), (units.len() * 2 + 2) as u8, 0x03];
        for unit in units {
            payload.extend_from_slice(&unit.to_le_bytes());
        }
        self.command(opcode::WRITE_FLASH_DATA, &payload)?;
        Ok(())
    }
}

fn chip_word(image: &[u8], offset: usize) -> Result<u16, Error> {
    match image.get(offset..offset + 2) {
        Some([lo, hi]) => Ok(u16::from_le_bytes([*lo, *hi])),
        _ => Err(Error::UnexpectedDeviceData("chip settings block too short")),
    }
}

fn set_chip_word(image: &mut [u8], offset: usize, value: u16) -> Result<(), Error> {
    let slot = image
        .get_mut(offset..offset + 2)
        .ok_or(Error::UnexpectedDeviceData("chip settings block too short"))?;
    slot.copy_from_slice(&value.to_le_bytes());
    Ok(())
}
