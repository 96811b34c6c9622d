//! GPIO: run-time pin values and directions, power-up defaults, and pin
//! function multiplexing.

use crate::codec::{FRAME_SIZE, opcode};
use crate::error::Error;
use crate::gpio::{
    Gp0Function, Gp1Function, Gp2Function, Gp3Function, GpioDirection, check_pin_index,
};
use crate::memory::{FlashBlock, MemoryTarget, SramBlock, bits_to_byte, byte_to_bits};
use crate::transport::Transport;

use super::Mcp2221;

/// Sentinel reported for a pin's value or direction when the pin is not in
/// GPIO mode.
const NOT_GPIO_VALUE: u8 = 0xEE;
const NOT_GPIO_DIRECTION: u8 = 0xEF;

impl<T: Transport> Mcp2221<T> {
    /// Read the current direction of a pin.
    ///
    /// Returns `None` (and logs a warning) if the pin is not in GPIO mode.
    pub fn gpio_read_direction(&mut self, pin: u8) -> Result<Option<GpioDirection>, Error> {
        check_pin_index(pin)?;
        let response = self.command(opcode::GET_GPIO_VALUES, &[])?;
        let raw = response[3 + 2 * pin as usize];
        if raw == NOT_GPIO_DIRECTION {
            log::warn!("pin GP{pin} is not in GPIO mode, direction unavailable");
            return Ok(None);
        }
        GpioDirection::try_from(raw).map(Some)
    }

    /// Set the direction of a pin for this session.
    ///
    /// Affects only the run-time state; the pin must already be in GPIO mode
    /// for the change to be visible.
    pub fn gpio_write_direction(&mut self, pin: u8, direction: GpioDirection) -> Result<(), Error> {
        check_pin_index(pin)?;
        let mut frame = [0u8; FRAME_SIZE];
        frame[0] = opcode::SET_GPIO_VALUES;
        // Four bytes per pin: alter-value flag, value, alter-direction flag,
        // direction.
        let base = 2 + 4 * pin as usize;
        frame[base + 2] = 0x01;
        frame[base + 3] = direction.into();
        self.transfer_frame(&frame)?;
        Ok(())
    }

    /// Read the current logic level of a pin.
    ///
    /// Returns `None` (and logs a warning) if the pin is not in GPIO mode.
    pub fn gpio_read_value(&mut self, pin: u8) -> Result<Option<bool>, Error> {
        check_pin_index(pin)?;
        let response = self.command(opcode::GET_GPIO_VALUES, &[])?;
        let raw = response[2 + 2 * pin as usize];
        match raw {
            0 => Ok(Some(false)),
            1 => Ok(Some(true)),
            NOT_GPIO_VALUE => {
                log::warn!("pin GP{pin} is not in GPIO mode, value unavailable");
                Ok(None)
            }
            _ => Err(Error::UnexpectedDeviceData("GPIO pin value")),
        }
    }

    /// Drive a pin's output level for this session.
    ///
    /// The pin must be in GPIO mode and set as an output for the level to
    /// appear on the pin.
    pub fn gpio_write_value(&mut self, pin: u8, value: bool) -> Result<(), Error> {
        check_pin_index(pin)?;
        let mut frame = [0u8; FRAME_SIZE];
        frame[0] = opcode::SET_GPIO_VALUES;
        let base = 2 + 4 * pin as usize;
        frame[base] = 0x01;
        frame[base + 1] = value.into();
        self.transfer_frame(&frame)?;
        Ok(())
    }

    /// Read a pin's power-up output level from flash.
    pub fn gpio_powerup_value(&mut self, pin: u8) -> Result<bool, Error> {
        check_pin_index(pin)?;
        Ok(self.read_flash_bits(FlashBlock::GpSettings, pin as usize, &[4])?[0])
    }

    /// Set a pin's power-up output level in flash.
    pub fn set_gpio_powerup_value(&mut self, pin: u8, value: bool) -> Result<(), Error> {
        check_pin_index(pin)?;
        self.write_flash_bits(FlashBlock::GpSettings, pin as usize, &[4], &[value])
    }

    /// Read a pin's power-up direction from flash.
    pub fn gpio_powerup_direction(&mut self, pin: u8) -> Result<GpioDirection, Error> {
        check_pin_index(pin)?;
        let bit = self.read_flash_bits(FlashBlock::GpSettings, pin as usize, &[3])?[0];
        GpioDirection::try_from(u8::from(bit))
    }

    /// Set a pin's power-up direction in flash.
    ///
    /// A power-up direction only has meaning for a pin that powers up in GPIO
    /// mode, so this also forces the pin's power-up function to GPIO.
    pub fn set_gpio_powerup_direction(
        &mut self,
        pin: u8,
        direction: GpioDirection,
    ) -> Result<(), Error> {
        check_pin_index(pin)?;
        self.write_gpio_function_raw(pin, 0, Some(MemoryTarget::Flash))?;
        self.write_flash_bits(
            FlashBlock::GpSettings,
            pin as usize,
            &[3],
            &[direction == GpioDirection::Input],
        )
    }

    /// Pin function of GP0.
    pub fn gp0_function(&mut self, mem: Option<MemoryTarget>) -> Result<Gp0Function, Error> {
        Gp0Function::try_from(self.read_gpio_function_raw(0, mem)?)
    }

    /// Select the pin function of GP0.
    pub fn set_gp0_function(
        &mut self,
        function: Gp0Function,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        self.write_gpio_function_raw(0, function.into(), mem)
    }

    /// Pin function of GP1.
    pub fn gp1_function(&mut self, mem: Option<MemoryTarget>) -> Result<Gp1Function, Error> {
        Gp1Function::try_from(self.read_gpio_function_raw(1, mem)?)
    }

    /// Select the pin function of GP1.
    pub fn set_gp1_function(
        &mut self,
        function: Gp1Function,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        self.write_gpio_function_raw(1, function.into(), mem)
    }

    /// Pin function of GP2.
    pub fn gp2_function(&mut self, mem: Option<MemoryTarget>) -> Result<Gp2Function, Error> {
        Gp2Function::try_from(self.read_gpio_function_raw(2, mem)?)
    }

    /// Select the pin function of GP2.
    pub fn set_gp2_function(
        &mut self,
        function: Gp2Function,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        self.write_gpio_function_raw(2, function.into(), mem)
    }

    /// Pin function of GP3.
    pub fn gp3_function(&mut self, mem: Option<MemoryTarget>) -> Result<Gp3Function, Error> {
        Gp3Function::try_from(self.read_gpio_function_raw(3, mem)?)
    }

    /// Select the pin function of GP3.
    pub fn set_gp3_function(
        &mut self,
        function: Gp3Function,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        self.write_gpio_function_raw(3, function.into(), mem)
    }

    fn read_gpio_function_raw(
        &mut self,
        pin: u8,
        mem: Option<MemoryTarget>,
    ) -> Result<u8, Error> {
        check_pin_index(pin)?;
        let bits = self.read_gp_settings_bits(mem, pin as usize, &[0, 1, 2])?;
        Ok(bits_to_byte(&bits))
    }

    fn write_gpio_function_raw(
        &mut self,
        pin: u8,
        function: u8,
        mem: Option<MemoryTarget>,
    ) -> Result<(), Error> {
        check_pin_index(pin)?;
        match self.resolve_target(mem) {
            MemoryTarget::Sram => {
                // Changing any pin function through SRAM clears the ADC and
                // DAC reference selection, so snapshot those registers first
                // and rewrite them afterwards.
                let sram = self.command(opcode::GET_SRAM_SETTINGS, &[])?;
                let (dac_byte, adc_byte) = (sram[6], sram[7]);

                // The live value and direction of a GPIO-mode pin are only
                // visible through Get GPIO Values; fold them into the new
                // byte so they survive the rewrite.
                let runtime = self.command(opcode::GET_GPIO_VALUES, &[])?;
                let pin_value = runtime[2 + 2 * pin as usize];
                let pin_direction = runtime[3 + 2 * pin as usize];
                let mut value = function;
                if pin_value <= 1 {
                    value |= (pin_value << 4) | (pin_direction << 3);
                }
                self.write_sram_byte(SramBlock::GpSettings, pin as usize, value)?;

                let dac_vref = 0x80 | (dac_byte >> 5);
                let adc_vref = 0x80 | ((adc_byte >> 2) & 0x07);
                self.command(opcode::SET_SRAM_SETTINGS, &[0, 0, dac_vref, 0, adc_vref])?;
                Ok(())
            }
            MemoryTarget::Flash => self.write_flash_bits(
                FlashBlock::GpSettings,
                pin as usize,
                &[0, 1, 2],
                &byte_to_bits(function, 3),
            ),
        }
    }
}
