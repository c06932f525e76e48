use crate::OneWireCrc;
use core::{fmt, num::ParseIntError, str::FromStr};

/// 64-bit ROM code burned into every 1-Wire device.
///
/// | Bit | Description |
/// |-----|-------------|
/// | 0-7 | Family code (e.g., 0x28 for DS18B20) |
/// | 8-55 | Serial number |
/// | 56-63 | CRC-8 of the lower seven bytes |
///
/// The bus master moves ROM codes as two 32-bit halves; [`RomCode::from_halves`] and
/// [`RomCode::lo`]/[`RomCode::hi`] convert between the two forms. The canonical textual
/// form, used as a registry key, is the uppercase hexadecimal value without leading zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RomCode(u64);

impl RomCode {
    /// Wraps a raw 64-bit ROM code.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Joins the two halves delivered by the peripheral.
    pub const fn from_halves(lo: u32, hi: u32) -> Self {
        Self(((hi as u64) << 32) | lo as u64)
    }

    /// Raw 64-bit value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Low 32 bits, written to the low write-data register.
    pub const fn lo(&self) -> u32 {
        self.0 as u32
    }

    /// High 32 bits, written to the high write-data register.
    pub const fn hi(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Family code.
    pub const fn family(&self) -> u8 {
        self.0 as u8
    }

    /// CRC byte.
    pub const fn crc(&self) -> u8 {
        (self.0 >> 56) as u8
    }

    /// Whether the CRC byte matches the other seven bytes.
    pub fn crc_valid(&self) -> bool {
        OneWireCrc::validate(&self.0.to_le_bytes())
    }
}

impl From<u64> for RomCode {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<RomCode> for u64 {
    fn from(rom: RomCode) -> Self {
        rom.0
    }
}

impl fmt::Display for RomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl fmt::UpperHex for RomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

/// Error returned when a string is not a hexadecimal ROM code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRomCodeError(ParseIntError);

impl fmt::Display for ParseRomCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid ROM code: {}", self.0)
    }
}

impl FromStr for RomCode {
    type Err = ParseRomCodeError;

    /// Parses the canonical form. A `0x` prefix and lowercase digits are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(ParseRomCodeError)
    }
}
