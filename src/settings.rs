//! Typed values for chip-level settings.
//!
//! Each enum maps a documented register field onto a closed set of values.
//! Conversion to the wire encoding is infallible (`From<T> for u8`); the
//! reverse direction is fallible because the register could, in principle,
//! hold a pattern outside the documented set, which is reported as
//! [`Error::UnexpectedDeviceData`] rather than smuggled through as a raw
//! number.

use crate::error::Error;

/// Frequency of the clock-output signal available on pin GP1.
///
/// The chip divides its internal 48 MHz clock; 24 MHz is the fastest
/// available output and 375 kHz the slowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockFrequency {
    /// 24 MHz.
    MHz24,
    /// 12 MHz (the power-on default).
    MHz12,
    /// 6 MHz.
    MHz6,
    /// 3 MHz.
    MHz3,
    /// 1.5 MHz.
    MHz1_5,
    /// 750 kHz.
    KHz750,
    /// 375 kHz.
    KHz375,
}

impl From<ClockFrequency> for u8 {
    fn from(value: ClockFrequency) -> Self {
        match value {
            ClockFrequency::MHz24 => 0b001,
            ClockFrequency::MHz12 => 0b010,
            ClockFrequency::MHz6 => 0b011,
            ClockFrequency::MHz3 => 0b100,
            ClockFrequency::MHz1_5 => 0b101,
            ClockFrequency::KHz750 => 0b110,
            ClockFrequency::KHz375 => 0b111,
        }
    }
}

impl TryFrom<u8> for ClockFrequency {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b001 => Ok(Self::MHz24),
            0b010 => Ok(Self::MHz12),
            0b011 => Ok(Self::MHz6),
            0b100 => Ok(Self::MHz3),
            0b101 => Ok(Self::MHz1_5),
            0b110 => Ok(Self::KHz750),
            0b111 => Ok(Self::KHz375),
            _ => Err(Error::UnexpectedDeviceData("clock output frequency")),
        }
    }
}

/// Duty cycle of the clock-output signal on pin GP1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDutyCycle {
    /// Always low.
    Percent0,
    /// High for a quarter of each period.
    Percent25,
    /// High for half of each period (the power-on default).
    Percent50,
    /// High for three quarters of each period.
    Percent75,
}

impl From<ClockDutyCycle> for u8 {
    fn from(value: ClockDutyCycle) -> Self {
        match value {
            ClockDutyCycle::Percent0 => 0b00,
            ClockDutyCycle::Percent25 => 0b01,
            ClockDutyCycle::Percent50 => 0b10,
            ClockDutyCycle::Percent75 => 0b11,
        }
    }
}

impl TryFrom<u8> for ClockDutyCycle {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b00 => Ok(Self::Percent0),
            0b01 => Ok(Self::Percent25),
            0b10 => Ok(Self::Percent50),
            0b11 => Ok(Self::Percent75),
            _ => Err(Error::UnexpectedDeviceData("clock output duty cycle")),
        }
    }
}

/// Flash protection state of the chip.
///
/// Note that permanently locked chips cannot be unlocked, and their flash
/// settings can never be changed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityOption {
    /// Flash may be written freely.
    Unsecured,
    /// Flash writes require the access password to have been supplied.
    PasswordProtected,
    /// Flash writes are permanently disabled.
    PermanentlyLocked,
}

impl From<SecurityOption> for u8 {
    fn from(value: SecurityOption) -> Self {
        match value {
            SecurityOption::Unsecured => 0b00,
            SecurityOption::PasswordProtected => 0b01,
            SecurityOption::PermanentlyLocked => 0b10,
        }
    }
}

impl TryFrom<u8> for SecurityOption {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b00 => Ok(Self::Unsecured),
            0b01 => Ok(Self::PasswordProtected),
            // Both 0b10 and 0b11 read back as locked.
            0b10 | 0b11 => Ok(Self::PermanentlyLocked),
            _ => Err(Error::UnexpectedDeviceData("chip security option")),
        }
    }
}

/// Internal reference voltage level shared by the ADC and DAC references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceVoltage {
    /// Internal reference disabled.
    Off,
    /// 1.024 V.
    V1_024,
    /// 2.048 V.
    V2_048,
    /// 4.096 V (only usable when VDD is above 4.096 V).
    V4_096,
}

impl From<ReferenceVoltage> for u8 {
    fn from(value: ReferenceVoltage) -> Self {
        match value {
            ReferenceVoltage::Off => 0b00,
            ReferenceVoltage::V1_024 => 0b01,
            ReferenceVoltage::V2_048 => 0b10,
            ReferenceVoltage::V4_096 => 0b11,
        }
    }
}

impl TryFrom<u8> for ReferenceVoltage {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b00 => Ok(Self::Off),
            0b01 => Ok(Self::V1_024),
            0b10 => Ok(Self::V2_048),
            0b11 => Ok(Self::V4_096),
            _ => Err(Error::UnexpectedDeviceData("reference voltage level")),
        }
    }
}

/// Source of the voltage reference used by the ADC or DAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    /// The supply voltage VDD.
    Vdd,
    /// The internal reference (see [`ReferenceVoltage`]).
    Internal,
}

impl From<ReferenceSource> for u8 {
    fn from(value: ReferenceSource) -> Self {
        match value {
            ReferenceSource::Vdd => 0,
            ReferenceSource::Internal => 1,
        }
    }
}

impl TryFrom<u8> for ReferenceSource {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Vdd),
            1 => Ok(Self::Internal),
            _ => Err(Error::UnexpectedDeviceData("reference voltage source")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_frequency_rejects_reserved_zero() {
        assert!(ClockFrequency::try_from(0).is_err());
        assert!(ClockFrequency::try_from(8).is_err());
        assert_eq!(ClockFrequency::try_from(0b010).unwrap(), ClockFrequency::MHz12);
    }

    #[test]
    fn security_option_reads_both_locked_patterns() {
        assert_eq!(
            SecurityOption::try_from(0b10).unwrap(),
            SecurityOption::PermanentlyLocked
        );
        assert_eq!(
            SecurityOption::try_from(0b11).unwrap(),
            SecurityOption::PermanentlyLocked
        );
        // The canonical write encoding is 0b10.
        assert_eq!(u8::from(SecurityOption::PermanentlyLocked), 0b10);
    }

    #[test]
    fn reference_voltage_round_trips() {
        for v in [
            ReferenceVoltage::Off,
            ReferenceVoltage::V1_024,
            ReferenceVoltage::V2_048,
            ReferenceVoltage::V4_096,
        ] {
            assert_eq!(ReferenceVoltage::try_from(u8::from(v)).unwrap(), v);
        }
    }
}
