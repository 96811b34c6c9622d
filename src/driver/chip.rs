//! Chip-level settings: dedicated-pin logic levels, clock output, voltage
//! references, security.
//!
//! Flash chip settings and SRAM chip settings share a layout for reads, but
//! SRAM writes use write-enable encodings of their own: each writable field
//! has a byte where bit 7 arms the update and neighbouring bits must carry
//! the current value of the fields sharing the byte, read back first so they
//! survive the write.

use crate::codec::opcode;
use crate::error::Error;
use crate::memory::{FlashBlock, MemoryTarget, SramBlock, bits_to_byte, byte_to_bits};
use crate::settings::{
    ClockDutyCycle, ClockFrequency, ReferenceSource, ReferenceVoltage, SecurityOption,
};
use crate::transport::Transport;

use super::Mcp2221;

impl<T: Transport> Mcp2221<T> {
    fn sram_chip_byte(&mut self, byte: usize) -> Result<u8, Error> {
        let image = self.read_sram_block(SramBlock::ChipSettings)?;
        image
            .get(byte)
            .copied()
            .ok_or(Error::UnexpectedDeviceData("chip settings block too short"))
    }

    /// Whether the chip enumerates its USB serial number over CDC.
    ///
    /// Stored in flash only.
    pub fn cdc_serial_number_enumeration(&mut self) -> Result<bool, Error> {
        Ok(self.read_flash_bits(FlashBlock::ChipSettings, 0, &[7])?[0])
    }

    /// Enable or disable CDC enumeration of the USB serial number.
    pub fn set_cdc_serial_number_enumeration(&mut self, enabled: bool) -> Result<(), Error> {
        self.write_flash_bits(FlashBlock::ChipSettings, 0, &[7], &[enabled])
    }

    /// Idle level of the UART RX LED signal, when no transfer is ongoing.
    pub fn led_idle_uart_rx_level(&mut self) -> Result<bool, Error> {
        Ok(self.read_flash_bits(FlashBlock::ChipSettings, 0, &[6])?[0])
    }

    /// Set the idle level of the UART RX LED signal.
    pub fn set_led_idle_uart_rx_level(&mut self, level: bool) -> Result<(), Error> {
        self.write_flash_bits(FlashBlock::ChipSettings, 0, &[6], &[level])
    }

    /// Idle level of the UART TX LED signal, when no transfer is ongoing.
    pub fn led_idle_uart_tx_level(&mut self) -> Result<bool, Error> {
        Ok(self.read_flash_bits(FlashBlock::ChipSettings, 0, &[5])?[0])
    }

    /// Set the idle level of the UART TX LED signal.
    pub fn set_led_idle_uart_tx_level(&mut self, level: bool) -> Result<(), Error> {
        self.write_flash_bits(FlashBlock::ChipSettings, 0, &[5], &[level])
    }

    /// Idle level of the I2C activity LED signal.
    pub fn led_idle_i2c_level(&mut self) -> Result<bool, Error> {
        Ok(self.read_flash_bits(FlashBlock::ChipSettings, 0, &[4])?[0])
    }

    /// Set the idle level of the I2C activity LED signal.
    pub fn set_led_idle_i2c_level(&mut self, level: bool) -> Result<(), Error> {
        self.write_flash_bits(FlashBlock::ChipSettings, 0, &[4], &[level])
    }

    /// Level of the suspend-state signal while the chip is not suspended.
    pub fn suspend_mode_logic_level(&mut self) -> Result<bool, Error> {
        Ok(self.read_flash_bits(FlashBlock::ChipSettings, 0, &[3])?[0])
    }

    /// Set the level of the suspend-state signal.
    pub fn set_suspend_mode_logic_level(&mut self, level: bool) -> Result<(), Error> {
        self.write_flash_bits(FlashBlock::ChipSettings, 0, &[3], &[level])
    }

    /// Level of the USB-configured signal once enumeration completes.
    pub fn usb_configured_logic_level(&mut self) -> Result<bool, Error> {
        Ok(self.read_flash_bits(FlashBlock::ChipSettings, 0, &[2])?[0])
    }

    /// Set the level of the USB-configured signal.
    pub fn set_usb_configured_logic_level(&mut self, level: bool) -> Result<(), Error> {
        self.write_flash_bits(FlashBlock::ChipSettings, 0, &[2], &[level])
    }

    /// The chip's flash protection state.
    pub fn security_option(&mut self) -> Result<SecurityOption, Error> {
        let bits = self.read_flash_bits(FlashBlock::ChipSettings, 0, &[0, 1])?;
        SecurityOption::try_from(bits_to_byte(&bits))
    }

    /// Change the chip's flash protection state.
    ///
    /// Selecting [`SecurityOption::PermanentlyLocked`] is irreversible: the
    /// chip's flash settings can never be written again.
    pub fn set_security_option(&mut self, option: SecurityOption) -> Result<(), Error> {
        self.write_flash_bits(
            FlashBlock::ChipSettings,
            0,
            &[0, 1],
            &byte_to_bits(option.into(), 2),
        )
    }

    /// Frequency of the clock output available on GP1.
    pub fn clock_output_frequency(
        &mut self,
        mem: Option<MemoryTarget>,
    ) -> Result<ClockFrequency, Error> {
        let bits = self.read_chip_settings_bits(mem, 1, &[0, 1, 2])?;
        ClockFrequency::try_from(bits_to_byte(&bits))
    }

    /// Set the frequency of the clock output available on GP1.
    pub fn set_clock_output_frequency(
        &mut self,
        frequency: ClockFrequency,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        match self.resolve_target(mem) {
            MemoryTarget::Sram => {
                // Keep the duty-cycle bits sharing the write-enable byte.
                let init = self.sram_chip_byte(1)? & 0b0001_1000;
                self.write_sram_byte(
                    SramBlock::ChipSettings,
                    0,
                    u8::from(frequency) | 0x80 | init,
                )
            }
            MemoryTarget::Flash => self.write_flash_bits(
                FlashBlock::ChipSettings,
                1,
                &[0, 1, 2],
                &byte_to_bits(frequency.into(), 3),
            ),
        }
    }

    /// Duty cycle of the clock output available on GP1.
    pub fn clock_output_duty_cycle(
        &mut self,
        mem: Option<MemoryTarget>,
    ) -> Result<ClockDutyCycle, Error> {
        let bits = self.read_chip_settings_bits(mem, 1, &[3, 4])?;
        ClockDutyCycle::try_from(bits_to_byte(&bits))
    }

    /// Set the duty cycle of the clock output available on GP1.
    pub fn set_clock_output_duty_cycle(
        &mut self,
        duty_cycle: ClockDutyCycle,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        match self.resolve_target(mem) {
            MemoryTarget::Sram => {
                // Keep the frequency bits sharing the write-enable byte.
                let init = self.sram_chip_byte(1)? & 0b0000_0111;
                self.write_sram_byte(
                    SramBlock::ChipSettings,
                    0,
                    (u8::from(duty_cycle) << 3) | 0x80 | init,
                )
            }
            MemoryTarget::Flash => self.write_flash_bits(
                FlashBlock::ChipSettings,
                1,
                &[3, 4],
                &byte_to_bits(duty_cycle.into(), 2),
            ),
        }
    }

    /// Internal reference level used by the DAC.
    pub fn dac_reference_voltage(
        &mut self,
        mem: Option<MemoryTarget>,
    ) -> Result<ReferenceVoltage, Error> {
        let bits = self.read_chip_settings_bits(mem, 2, &[6, 7])?;
        ReferenceVoltage::try_from(bits_to_byte(&bits))
    }

    /// Set the internal reference level used by the DAC.
    pub fn set_dac_reference_voltage(
        &mut self,
        voltage: ReferenceVoltage,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        match self.resolve_target(mem) {
            MemoryTarget::Sram => {
                // Keep the source bit sharing the write-enable byte.
                let init = (self.sram_chip_byte(2)? >> 5) & 0b001;
                self.write_sram_byte(
                    SramBlock::ChipSettings,
                    1,
                    (u8::from(voltage) << 1) | 0x80 | init,
                )
            }
            MemoryTarget::Flash => self.write_flash_bits(
                FlashBlock::ChipSettings,
                2,
                &[6, 7],
                &byte_to_bits(voltage.into(), 2),
            ),
        }
    }

    /// Whether the DAC uses VDD or the internal reference.
    pub fn dac_reference_source(
        &mut self,
        mem: Option<MemoryTarget>,
    ) -> Result<ReferenceSource, Error> {
        let bits = self.read_chip_settings_bits(mem, 2, &[5])?;
        ReferenceSource::try_from(bits[0] as u8)
    }

    /// Select whether the DAC uses VDD or the internal reference.
    pub fn set_dac_reference_source(
        &mut self,
        source: ReferenceSource,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        match self.resolve_target(mem) {
            MemoryTarget::Sram => {
                // Keep the level bits sharing the write-enable byte.
                let init = (self.sram_chip_byte(2)? >> 5) & 0b110;
                self.write_sram_byte(
                    SramBlock::ChipSettings,
                    1,
                    u8::from(source) | 0x80 | init,
                )
            }
            MemoryTarget::Flash => self.write_flash_bits(
                FlashBlock::ChipSettings,
                2,
                &[5],
                &[source == ReferenceSource::Internal],
            ),
        }
    }

    /// Internal reference level used by the ADC.
    pub fn adc_reference_voltage(
        &mut self,
        mem: Option<MemoryTarget>,
    ) -> Result<ReferenceVoltage, Error> {
        let bits = self.read_chip_settings_bits(mem, 3, &[3, 4])?;
        ReferenceVoltage::try_from(bits_to_byte(&bits))
    }

    /// Set the internal reference level used by the ADC.
    pub fn set_adc_reference_voltage(
        &mut self,
        voltage: ReferenceVoltage,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        match self.resolve_target(mem) {
            MemoryTarget::Sram => {
                // Keep the source bit sharing the write-enable byte.
                let init = (self.sram_chip_byte(3)? >> 2) & 0b001;
                self.write_sram_byte(
                    SramBlock::ChipSettings,
                    3,
                    (u8::from(voltage) << 1) | 0x80 | init,
                )
            }
            MemoryTarget::Flash => self.write_flash_bits(
                FlashBlock::ChipSettings,
                3,
                &[3, 4],
                &byte_to_bits(voltage.into(), 2),
            ),
        }
    }

    /// Whether the ADC uses VDD or the internal reference.
    pub fn adc_reference_source(
        &mut self,
        mem: Option<MemoryTarget>,
    ) -> Result<ReferenceSource, Error> {
        let bits = self.read_chip_settings_bits(mem, 3, &[2])?;
        ReferenceSource::try_from(bits[0] as u8)
    }

    /// Select whether the ADC uses VDD or the internal reference.
    pub fn set_adc_reference_source(
        &mut self,
        source: ReferenceSource,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        match self.resolve_target(mem) {
            MemoryTarget::Sram => {
                // Keep the level bits sharing the write-enable byte.
                let init = (self.sram_chip_byte(3)? >> 2) & 0b110;
                self.write_sram_byte(
                    SramBlock::ChipSettings,
                    3,
                    u8::from(source) | 0x80 | init,
                )
            }
            MemoryTarget::Flash => self.write_flash_bits(
                FlashBlock::ChipSettings,
                3,
                &[2],
                &[source == ReferenceSource::Internal],
            ),
        }
    }

    /// Write a new flash access password.
    ///
    /// To make the chip enforce it, also set the security option to
    /// [`SecurityOption::PasswordProtected`]. The password is cached in the
    /// session and appended to subsequent flash chip-settings writes.
    pub fn set_flash_access_password(&mut self, password: &str) -> Result<(), Error> {
        self.set_cached_password(password)?;
        let image = self.read_flash_block(FlashBlock::ChipSettings)?;
        self.write_flash_block(FlashBlock::ChipSettings, &image)
    }

    /// Present the flash access password to the chip, unlocking flash writes
    /// for the rest of this USB session.
    ///
    /// The password is also cached so later flash chip-settings writes carry
    /// it.
    pub fn unlock(&mut self, password: &str) -> Result<(), Error> {
        let mut payload = vec![0x00];
        payload.extend_from_slice(password.as_bytes());
        self.set_cached_password(password)?;
        self.command(opcode::SEND_FLASH_ACCESS_PASSWORD, &payload)?;
        Ok(())
    }
}
