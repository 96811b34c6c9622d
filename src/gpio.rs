//! GPIO pin types.
//!
//! The four GP pins are individually multiplexed: each can operate as a
//! general-purpose input or output, or be dedicated to one of a small set of
//! pin-specific functions. The function sets differ per pin, so each pin has
//! its own enum rather than one shared type with unrepresentable states.

use crate::error::Error;

/// Direction of a pin operating in GPIO mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioDirection {
    /// The chip drives the pin.
    Output,
    /// The chip samples the pin.
    Input,
}

impl From<GpioDirection> for u8 {
    fn from(value: GpioDirection) -> Self {
        match value {
            GpioDirection::Output => 0,
            GpioDirection::Input => 1,
        }
    }
}

impl TryFrom<u8> for GpioDirection {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Output),
            1 => Ok(Self::Input),
            _ => Err(Error::UnexpectedDeviceData("GPIO direction")),
        }
    }
}

/// Function selection for pin GP0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gp0Function {
    /// General-purpose input or output.
    Gpio,
    /// Drives low while the USB host has the device suspended.
    UsbSuspendState,
    /// Pulses on UART receive activity.
    UartRxLed,
}

impl From<Gp0Function> for u8 {
    fn from(value: Gp0Function) -> Self {
        match value {
            Gp0Function::Gpio => 0,
            Gp0Function::UsbSuspendState => 1,
            Gp0Function::UartRxLed => 2,
        }
    }
}

impl TryFrom<u8> for Gp0Function {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Gpio),
            1 => Ok(Self::UsbSuspendState),
            2 => Ok(Self::UartRxLed),
            _ => Err(Error::UnexpectedDeviceData("GP0 function")),
        }
    }
}

/// Function selection for pin GP1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gp1Function {
    /// General-purpose input or output.
    Gpio,
    /// Outputs the divided reference clock.
    ClockOutput,
    /// ADC channel 1 input.
    Adc1,
    /// Pulses on UART transmit activity.
    UartTxLed,
    /// Edge detection input for the interrupt flag.
    InterruptDetection,
}

impl From<Gp1Function> for u8 {
    fn from(value: Gp1Function) -> Self {
        match value {
            Gp1Function::Gpio => 0,
            Gp1Function::ClockOutput => 1,
            Gp1Function::Adc1 => 2,
            Gp1Function::UartTxLed => 3,
            Gp1Function::InterruptDetection => 4,
        }
    }
}

impl TryFrom<u8> for Gp1Function {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Gpio),
            1 => Ok(Self::ClockOutput),
            2 => Ok(Self::Adc1),
            3 => Ok(Self::UartTxLed),
            4 => Ok(Self::InterruptDetection),
            _ => Err(Error::UnexpectedDeviceData("GP1 function")),
        }
    }
}

/// Function selection for pin GP2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gp2Function {
    /// General-purpose input or output.
    Gpio,
    /// Reflects whether USB enumeration has completed.
    UsbConfigured,
    /// ADC channel 2 input.
    Adc2,
    /// DAC output 1.
    Dac1,
}

impl From<Gp2Function> for u8 {
    fn from(value: Gp2Function) -> Self {
        match value {
            Gp2Function::Gpio => 0,
            Gp2Function::UsbConfigured => 1,
            Gp2Function::Adc2 => 2,
            Gp2Function::Dac1 => 3,
        }
    }
}

impl TryFrom<u8> for Gp2Function {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Gpio),
            1 => Ok(Self::UsbConfigured),
            2 => Ok(Self::Adc2),
            3 => Ok(Self::Dac1),
            _ => Err(Error::UnexpectedDeviceData("GP2 function")),
        }
    }
}

/// Function selection for pin GP3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gp3Function {
    /// General-purpose input or output.
    Gpio,
    /// Pulses on I2C bus activity.
    I2cLed,
    /// ADC channel 3 input.
    Adc3,
    /// DAC output 2 (carries the same value as DAC output 1).
    Dac2,
}

impl From<Gp3Function> for u8 {
    fn from(value: Gp3Function) -> Self {
        match value {
            Gp3Function::Gpio => 0,
            Gp3Function::I2cLed => 1,
            Gp3Function::Adc3 => 2,
            Gp3Function::Dac2 => 3,
        }
    }
}

impl TryFrom<u8> for Gp3Function {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Gpio),
            1 => Ok(Self::I2cLed),
            2 => Ok(Self::Adc3),
            3 => Ok(Self::Dac2),
            _ => Err(Error::UnexpectedDeviceData("GP3 function")),
        }
    }
}

/// Reject pin indices beyond GP3.
pub(crate) fn check_pin_index(pin: u8) -> Result<(), Error> {
    if pin > 3 {
        return Err(Error::InvalidParameter("pin index out of range, must be 0-3"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_index_bounds() {
        assert!(check_pin_index(3).is_ok());
        assert!(check_pin_index(4).is_err());
    }

    #[test]
    fn reserved_function_codes_are_rejected() {
        assert!(Gp0Function::try_from(3).is_err());
        assert!(Gp1Function::try_from(5).is_err());
        assert!(Gp2Function::try_from(4).is_err());
        assert!(Gp3Function::try_from(4).is_err());
    }
}
