//! Edge-detection interrupt configuration.
//!
//! GP1 can watch for edges when its interrupt-detection function is
//! selected; the chip latches a flag that is read through the status frame
//! and cleared through SRAM.

use crate::error::Error;
use crate::memory::{FlashBlock, MemoryTarget, SramBlock};
use crate::transport::Transport;

use super::Mcp2221;

impl<T: Transport> Mcp2221<T> {
    /// Whether falling edges on GP1 set the interrupt flag.
    pub fn interrupt_on_falling_edge(&mut self, mem: Option<MemoryTarget>) -> Result<bool, Error> {
        Ok(self.read_chip_settings_bits(mem, 3, &[6])?[0])
    }

    /// Enable or disable interrupt detection on falling edges.
    pub fn set_interrupt_on_falling_edge(
        &mut self,
        enabled: bool,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        match self.resolve_target(mem) {
            MemoryTarget::Sram => {
                // Bit 7 arms the update, bit 4 selects the falling-edge
                // field, bit 3 carries the new state.
                let value = if enabled { 0b1001_1000 } else { 0b1001_0000 };
                self.write_sram_byte(SramBlock::ChipSettings, 4, value)
            }
            MemoryTarget::Flash => {
                self.write_flash_bits(FlashBlock::ChipSettings, 3, &[6], &[enabled])
            }
        }
    }

    /// Whether rising edges on GP1 set the interrupt flag.
    pub fn interrupt_on_rising_edge(&mut self, mem: Option<MemoryTarget>) -> Result<bool, Error> {
        Ok(self.read_chip_settings_bits(mem, 3, &[5])?[0])
    }

    /// Enable or disable interrupt detection on rising edges.
    pub fn set_interrupt_on_rising_edge(
        &mut self,
        enabled: bool,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        match self.resolve_target(mem) {
            MemoryTarget::Sram => {
                // Bit 2 selects the rising-edge field, bit 1 carries the new
                // state.
                let value = if enabled { 0b1000_0110 } else { 0b1000_0100 };
                self.write_sram_byte(SramBlock::ChipSettings, 4, value)
            }
            MemoryTarget::Flash => {
                self.write_flash_bits(FlashBlock::ChipSettings, 3, &[5], &[enabled])
            }
        }
    }

    /// Whether an edge has been detected since the flag was last cleared.
    pub fn interrupt_flag(&mut self) -> Result<bool, Error> {
        Ok(self.status()?.interrupt_detected)
    }

    /// Clear the latched interrupt flag.
    pub fn clear_interrupt_flag(&mut self) -> Result<(), Error> {
        self.write_sram_byte(SramBlock::ChipSettings, 4, 0b1000_0001)
    }
}
