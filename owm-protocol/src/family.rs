use crate::consts;

/// ROM-level commands understood by every device of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomCommands {
    /// Search ROM.
    pub search_rom: u8,
    /// Read ROM.
    pub read_rom: u8,
    /// Match ROM.
    pub match_rom: u8,
    /// Skip ROM.
    pub skip_rom: u8,
    /// Alarm search.
    pub alarm_search: u8,
}

impl RomCommands {
    /// The standard 1-Wire ROM command set.
    pub const STANDARD: Self = Self {
        search_rom: consts::SEARCH_ROM,
        read_rom: consts::READ_ROM,
        match_rom: consts::MATCH_ROM,
        skip_rom: consts::SKIP_ROM,
        alarm_search: consts::ALARM_SEARCH,
    };
}

/// Function-level commands of a temperature sensor family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionCommands {
    /// Convert T.
    pub convert_temp: u8,
    /// Write scratchpad.
    pub scratch_write: u8,
    /// Read scratchpad.
    pub scratch_read: u8,
    /// Copy scratchpad.
    pub scratch_copy: u8,
    /// Recall alarm trigger values.
    pub recall_alarm: u8,
    /// Read power supply.
    pub power_read: u8,
}

impl FunctionCommands {
    /// Function commands shared by the DS18x20 thermometers.
    pub const DS18X20: Self = Self {
        convert_temp: consts::CONVERT_TEMP,
        scratch_write: consts::SCRATCH_WRITE,
        scratch_read: consts::SCRATCH_READ,
        scratch_copy: consts::SCRATCH_COPY,
        recall_alarm: consts::RECALL_ALARM,
        power_read: consts::POWER_READ,
    };
}

/// Static description of one device family.
///
/// A bus master is built with one of these so the timing and sizes used by the
/// conversion and scratchpad primitives match the devices on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyConfig {
    /// Family code, the low byte of every ROM code of this family.
    pub family_code: u8,
    /// Time a temperature conversion takes, in microseconds.
    pub conversion_time_us: u32,
    /// EEPROM write time, in microseconds.
    pub eeprom_write_time_us: u32,
    /// Number of bits read back by a scratchpad read.
    pub scratchpad_bits: u32,
    /// Number of bits in a ROM code transmitted by Match ROM.
    pub rom_bits: u32,
    /// ROM command table.
    pub rom_commands: RomCommands,
    /// Function command table.
    pub function_commands: FunctionCommands,
}

impl FamilyConfig {
    /// DS18B20 programmable resolution thermometer at 12-bit resolution.
    pub const DS18B20: Self = Self {
        family_code: 0x28,
        conversion_time_us: 750_000,
        eeprom_write_time_us: 10_000,
        scratchpad_bits: 72,
        rom_bits: 64,
        rom_commands: RomCommands::STANDARD,
        function_commands: FunctionCommands::DS18X20,
    };

    /// Same family with a different conversion time, e.g. for a lower resolution.
    pub const fn with_conversion_time_us(mut self, us: u32) -> Self {
        self.conversion_time_us = us;
        self
    }
}

impl Default for FamilyConfig {
    fn default() -> Self {
        Self::DS18B20
    }
}
