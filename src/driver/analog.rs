//! ADC reads and DAC output.

use crate::error::Error;
use crate::memory::{FlashBlock, SramBlock, bits_to_byte, byte_to_bits};
use crate::transport::Transport;

use super::Mcp2221;

impl<T: Transport> Mcp2221<T> {
    /// Read the latest 10-bit conversion of an ADC channel (0 to 2).
    ///
    /// Channel `n` samples pin GP`n+1`, which must have its ADC function
    /// selected for the reading to be meaningful.
    pub fn adc_read(&mut self, channel: u8) -> Result<u16, Error> {
        if channel > 2 {
            return Err(Error::InvalidParameter("ADC channel out of range, must be 0-2"));
        }
        Ok(self.status()?.adc_values[channel as usize])
    }

    /// Set the 5-bit DAC output value.
    ///
    /// The value appears on whichever pins have a DAC function selected;
    /// both DAC outputs carry the same value. Only the low five bits are
    /// used.
    pub fn dac_write(&mut self, value: u8) -> Result<(), Error> {
        self.write_sram_byte(SramBlock::ChipSettings, 2, (value & 0x1F) | 0x80)
    }

    /// Read the DAC's power-up value from flash.
    pub fn dac_powerup_value(&mut self) -> Result<u8, Error> {
        let bits = self.read_flash_bits(FlashBlock::ChipSettings, 2, &[0, 1, 2, 3, 4])?;
        Ok(bits_to_byte(&bits))
    }

    /// Set the DAC's power-up value in flash.
    pub fn set_dac_powerup_value(&mut self, value: u8) -> Result<(), Error> {
        if value > 0x1F {
            return Err(Error::InvalidParameter("DAC value exceeds 5 bits"));
        }
        self.write_flash_bits(
            FlashBlock::ChipSettings,
            2,
            &[0, 1, 2, 3, 4],
            &byte_to_bits(value, 5),
        )
    }
}
