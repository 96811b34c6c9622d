//! Register images and per-memory-space addressing.
//!
//! The chip keeps logically identical settings in two physically distinct
//! register spaces: volatile SRAM (takes effect immediately, lost on reset)
//! and persistent flash (takes effect at power-up). The two spaces have their
//! own block subcodes, their own response layouts, and in several cases place
//! the *same* logical setting at different byte/bit positions. Nothing in this
//! module assumes the encodings coincide; each accessor in the driver spells
//! out both.

use bit_field::BitField;

use crate::error::Error;

/// Which register space a dual-space setting targets.
///
/// Accessors for settings that exist in both spaces take an
/// `Option<MemoryTarget>`: `None` defers to the session's default target
/// (initially [`Sram`]). Write-only "direct" operations such as power-up
/// values are tied to one space by nature and take no override.
///
/// [`Sram`]: MemoryTarget::Sram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryTarget {
    /// Volatile run-time settings.
    #[default]
    Sram,
    /// Persistent power-up settings.
    Flash,
}

impl MemoryTarget {
    /// Resolve a per-call override against a session default.
    pub(crate) fn resolve(explicit: Option<MemoryTarget>, default: MemoryTarget) -> MemoryTarget {
        explicit.unwrap_or(default)
    }
}

/// Flash register blocks, addressed by the sub-code byte of the flash
/// read/write commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlashBlock {
    ChipSettings,
    GpSettings,
    UsbManufacturerDescriptor,
    UsbProductDescriptor,
    UsbSerialNumberDescriptor,
    FactorySerialNumber,
}

impl FlashBlock {
    pub(crate) fn code(self) -> u8 {
        match self {
            FlashBlock::ChipSettings => 0x00,
            FlashBlock::GpSettings => 0x01,
            FlashBlock::UsbManufacturerDescriptor => 0x02,
            FlashBlock::UsbProductDescriptor => 0x03,
            FlashBlock::UsbSerialNumberDescriptor => 0x04,
            FlashBlock::FactorySerialNumber => 0x05,
        }
    }
}

/// SRAM register blocks.
///
/// SRAM has no sub-code on the wire: the Get SRAM Settings response carries
/// the chip-settings block followed immediately by the GP block, and the
/// split is recovered from the embedded length fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SramBlock {
    ChipSettings,
    GpSettings,
}

/// Highest addressable byte index within a register image.
const MAX_REGISTER_BYTE: usize = 8;

/// Check a byte index and a set of bit indices against the register bounds.
///
/// Out-of-range access is a programming error reported immediately, never
/// silently clamped.
pub(crate) fn check_register_access(byte: usize, bits: &[u8]) -> Result<(), Error> {
    if byte > MAX_REGISTER_BYTE {
        return Err(Error::InvalidParameter("register byte index out of range"));
    }
    if bits.iter().any(|&bit| bit > 7) {
        return Err(Error::InvalidParameter("register bit index out of range"));
    }
    Ok(())
}

/// Extract named bits from one byte of a register image, LSB numbering.
pub(crate) fn read_bits(image: &[u8], byte: usize, bits: &[u8]) -> Result<Vec<bool>, Error> {
    check_register_access(byte, bits)?;
    let value = *image
        .get(byte)
        .ok_or(Error::UnexpectedDeviceData("register image too short"))?;
    Ok(bits.iter().map(|&bit| value.get_bit(bit as usize)).collect())
}

/// Pack a little-endian bit list (LSB first) into a byte value.
pub(crate) fn bits_to_byte(bits: &[bool]) -> u8 {
    bits.iter()
        .enumerate()
        .fold(0u8, |acc, (n, &bit)| acc | ((bit as u8) << n))
}

/// Unpack the low `length` bits of a value into a bit list, LSB first.
pub(crate) fn byte_to_bits(value: u8, length: usize) -> Vec<bool> {
    (0..length).map(|n| value.get_bit(n)).collect()
}
