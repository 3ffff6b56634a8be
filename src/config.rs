//! Session configuration types.
//!
//! Each parameter is a closed enumeration; a value outside the allowed set is
//! unrepresentable, and members the host driver layer cannot express (mark and
//! space parity, 1.5 or zero stop bits) are rejected before any OS call is
//! made rather than deferred to the driver.

use crate::error::SessionError;
use serde::{Deserialize, Serialize};

/// Configuration tuple applied when opening a session.
///
/// Defaults to 115200 baud, 8 data bits, no parity, one stop bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub baud_rate: BaudRate,

    #[serde(default)]
    pub data_bits: DataBits,

    #[serde(default)]
    pub parity: Parity,

    #[serde(default)]
    pub stop_bits: StopBits,
}

impl SessionConfig {
    /// Check that every field can be expressed by the host driver layer.
    ///
    /// Fails with [`SessionError::UnsupportedConfig`] for mark/space parity
    /// and for 1.5 or zero stop bits.
    pub fn ensure_supported(&self) -> Result<(), SessionError> {
        serialport::Parity::try_from(self.parity)?;
        serialport::StopBits::try_from(self.stop_bits)?;
        Ok(())
    }
}

/// Allowed baud rates.
///
/// Serialized as the numeric bit rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum BaudRate {
    #[default]
    B115200,
    B57600,
    B56000,
    B38400,
    B19200,
    B9600,
    B4800,
    B2400,
}

impl BaudRate {
    /// The bit rate in bits per second.
    pub const fn value(self) -> u32 {
        match self {
            BaudRate::B115200 => 115_200,
            BaudRate::B57600 => 57_600,
            BaudRate::B56000 => 56_000,
            BaudRate::B38400 => 38_400,
            BaudRate::B19200 => 19_200,
            BaudRate::B9600 => 9_600,
            BaudRate::B4800 => 4_800,
            BaudRate::B2400 => 2_400,
        }
    }
}

impl From<BaudRate> for u32 {
    fn from(baud: BaudRate) -> Self {
        baud.value()
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = SessionError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            115_200 => Ok(BaudRate::B115200),
            57_600 => Ok(BaudRate::B57600),
            56_000 => Ok(BaudRate::B56000),
            38_400 => Ok(BaudRate::B38400),
            19_200 => Ok(BaudRate::B19200),
            9_600 => Ok(BaudRate::B9600),
            4_800 => Ok(BaudRate::B4800),
            2_400 => Ok(BaudRate::B2400),
            _ => Err(SessionError::InvalidArgument(
                "baud rate outside the allowed set",
            )),
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataBits {
    #[default]
    Eight,
    Seven,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Eight => serialport::DataBits::Eight,
            DataBits::Seven => serialport::DataBits::Seven,
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    #[default]
    None,
    Even,
    Mark,
    Odd,
    Space,
}

impl TryFrom<Parity> for serialport::Parity {
    type Error = SessionError;

    fn try_from(parity: Parity) -> Result<Self, Self::Error> {
        match parity {
            Parity::None => Ok(serialport::Parity::None),
            Parity::Even => Ok(serialport::Parity::Even),
            Parity::Odd => Ok(serialport::Parity::Odd),
            Parity::Mark => Err(SessionError::unsupported(
                "mark parity is not supported by the host driver",
            )),
            Parity::Space => Err(SessionError::unsupported(
                "space parity is not supported by the host driver",
            )),
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBits {
    #[default]
    One,
    OnePointFive,
    Two,
    None,
}

impl TryFrom<StopBits> for serialport::StopBits {
    type Error = SessionError;

    fn try_from(bits: StopBits) -> Result<Self, Self::Error> {
        match bits {
            StopBits::One => Ok(serialport::StopBits::One),
            StopBits::Two => Ok(serialport::StopBits::Two),
            StopBits::OnePointFive => Err(SessionError::unsupported(
                "1.5 stop bits are not supported by the host driver",
            )),
            StopBits::None => Err(SessionError::unsupported(
                "at least one stop bit is required by the host driver",
            )),
        }
    }
}
