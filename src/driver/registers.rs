//! Register block reads and writes over both memory spaces.
//!
//! Flash is addressed block-at-a-time through the flash read/write commands
//! and their sub-code byte. SRAM reads return all blocks in one response, and
//! SRAM writes go through the Set SRAM Settings command, which rewrites the
//! run-time GPIO state as a side effect and therefore has to reconstruct it.

use bit_field::BitField;

use crate::codec::opcode;
use crate::error::Error;
use crate::memory::{self, FlashBlock, MemoryTarget, SramBlock};
use crate::transport::Transport;

use super::Mcp2221;

impl<T: Transport> Mcp2221<T> {
    /// Read one flash register block.
    ///
    /// The response carries the block length in byte 2 and the block content
    /// from byte 4.
    pub(crate) fn read_flash_block(&mut self, block: FlashBlock) -> Result<Vec<u8>, Error> {
        let response = self.command(opcode::READ_FLASH_DATA, &[block.code()])?;
        let len = response[2] as usize;
        response
            .get(4..4 + len)
            .map(<[u8]>::to_vec)
            .ok_or(Error::UnexpectedDeviceData("flash block length"))
    }

    /// Read one SRAM register block.
    ///
    /// The Get SRAM Settings response carries the chip-settings block from
    /// byte 4 (length in byte 2) followed by the GP block (length in byte 3).
    pub(crate) fn read_sram_block(&mut self, block: SramBlock) -> Result<Vec<u8>, Error> {
        let response = self.command(opcode::GET_SRAM_SETTINGS, &[])?;
        let chip_len = response[2] as usize;
        let (start, len) = match block {
            SramBlock::ChipSettings => (4, chip_len),
            SramBlock::GpSettings => (4 + chip_len, response[3] as usize),
        };
        response
            .get(start..start + len)
            .map(<[u8]>::to_vec)
            .ok_or(Error::UnexpectedDeviceData("SRAM block length"))
    }

    /// Read named bits of a chip-settings register byte from either space.
    ///
    /// The two spaces use the same chip-settings layout for the fields
    /// exposed through this path; fields whose SRAM encoding differs have
    /// dedicated accessors instead.
    pub(crate) fn read_chip_settings_bits(
        &mut self,
        mem: Option<MemoryTarget>,
        byte: usize,
        bits: &[u8],
    ) -> Result<Vec<bool>, Error> {
        let image = match self.resolve_target(mem) {
            MemoryTarget::Sram => self.read_sram_block(SramBlock::ChipSettings)?,
            MemoryTarget::Flash => self.read_flash_block(FlashBlock::ChipSettings)?,
        };
        memory::read_bits(&image, byte, bits)
    }

    /// Read named bits of a GP-settings register byte from either space.
    pub(crate) fn read_gp_settings_bits(
        &mut self,
        mem: Option<MemoryTarget>,
        byte: usize,
        bits: &[u8],
    ) -> Result<Vec<bool>, Error> {
        let image = match self.resolve_target(mem) {
            MemoryTarget::Sram => self.read_sram_block(SramBlock::GpSettings)?,
            MemoryTarget::Flash => self.read_flash_block(FlashBlock::GpSettings)?,
        };
        memory::read_bits(&image, byte, bits)
    }

    /// Read named bits of a flash register byte.
    pub(crate) fn read_flash_bits(
        &mut self,
        block: FlashBlock,
        byte: usize,
        bits: &[u8],
    ) -> Result<Vec<bool>, Error> {
        let image = self.read_flash_block(block)?;
        memory::read_bits(&image, byte, bits)
    }

    /// Write a whole flash register block.
    ///
    /// Chip-settings writes always carry the cached flash access password as
    /// trailing bytes; the chip ignores them when protection is off and
    /// requires them when it is on.
    pub(crate) fn write_flash_block(&mut self, block: FlashBlock, image: &[u8]) -> Result<(), Error> {
        let mut payload = Vec::with_capacity(1 + image.len() + 8);
        payload.push(block.code());
        payload.extend_from_slice(image);
        if block == FlashBlock::ChipSettings {
            payload.extend_from_slice(self.cached_password());
        }
        self.command(opcode::WRITE_FLASH_DATA, &payload)?;
        Ok(())
    }

    /// Read-modify-write named bits of a flash register byte.
    pub(crate) fn write_flash_bits(
        &mut self,
        block: FlashBlock,
        byte: usize,
        bits: &[u8],
        values: &[bool],
    ) -> Result<(), Error> {
        memory::check_register_access(byte, bits)?;
        let mut image = self.read_flash_block(block)?;
        let target = image
            .get_mut(byte)
            .ok_or(Error::UnexpectedDeviceData("flash block too short"))?;
        for (&bit, &value) in bits.iter().zip(values) {
            target.set_bit(bit as usize, value);
        }
        self.write_flash_block(block, &image)
    }

    /// Write one byte of an SRAM register block.
    ///
    /// The Set SRAM Settings command applies the whole GP area in one go, so
    /// a single-byte write must first reconstruct the current state of all
    /// four pins or the others would be reset. For pins in GPIO mode the
    /// live value and direction come from the Get GPIO Values command,
    /// because pins driven through Set GPIO Values do not read back through
    /// SRAM; pins on an alternate function keep their SRAM byte as-is.
    pub(crate) fn write_sram_byte(
        &mut self,
        block: SramBlock,
        byte: usize,
        value: u8,
    ) -> Result<(), Error> {
        let runtime = self.command(opcode::GET_GPIO_VALUES, &[])?;
        let gp_sram = self.read_sram_block(SramBlock::GpSettings)?;
        if gp_sram.len() < 4 {
            return Err(Error::UnexpectedDeviceData("GP settings block too short"));
        }

        let mut frame = [0u8; crate::codec::FRAME_SIZE];
        frame[0] = opcode::SET_SRAM_SETTINGS;
        for n in 0..4 {
            let pin_value = runtime[2 + 2 * n];
            let pin_direction = runtime[3 + 2 * n];
            frame[8 + n] = if pin_value <= 1 {
                (pin_value << 4) | (pin_direction << 3)
            } else {
                gp_sram[n]
            };
        }

        let index = match block {
            SramBlock::ChipSettings => 2 + byte,
            SramBlock::GpSettings => {
                frame[7] = 0x80;
                8 + byte
            }
        };
        if index >= crate::codec::FRAME_SIZE {
            return Err(Error::InvalidParameter("register byte index out of range"));
        }
        frame[index] = value;
        self.transfer_frame(&frame)?;
        Ok(())
    }
}
