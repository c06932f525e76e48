//! Register map, command bytes and bit masks of the `ow_master` peripheral.
//!
//! All offsets are relative to the peripheral base. The physical base address is
//! never computed here; it belongs to whoever implements
//! [`RegisterInterface`](crate::RegisterInterface).

/// Control register. Receives the [`CTRL_*`](CTRL_RESET_PULSE) patterns.
pub const REG_CONTROL: u32 = 0x000;
/// Number of bits to clock in with read timeslots.
pub const REG_READ_SIZE: u32 = 0x004;
/// Number of bits to clock out from the write-data registers.
pub const REG_WRITE_SIZE: u32 = 0x008;
/// ROM or function command byte to put on the bus.
pub const REG_COMMAND: u32 = 0x00c;
/// CRC read register.
pub const REG_CRC_READ: u32 = 0x010;
/// CRC count register.
pub const REG_CRC_COUNT: u32 = 0x014;
/// CRC write register.
pub const REG_CRC_WRITE: u32 = 0x018;
/// Low 32 bits of outgoing data.
pub const REG_WRITE_DATA_LO: u32 = 0x01c;
/// High 32 bits of outgoing data.
pub const REG_WRITE_DATA_HI: u32 = 0x020;
/// Status register, see the `STATUS_*` masks.
pub const REG_STATUS: u32 = 0x040;
/// Incoming data, lowest word. Holds the temperature bytes after a scratchpad read.
pub const REG_READ_DATA_0: u32 = 0x044;
/// Incoming data, second word.
pub const REG_READ_DATA_1: u32 = 0x048;
/// Incoming data, third word.
pub const REG_READ_DATA_2: u32 = 0x04c;
/// Incoming data, highest word.
pub const REG_READ_DATA_3: u32 = 0x050;
/// Number of ROM codes found by the last search.
pub const REG_DISCOVERED_COUNT: u32 = 0x054;
/// Start of the discovered ROM table.
///
/// Slot `n` occupies [`ROM_TABLE_STRIDE`] bytes at `REG_ROM_TABLE + n * ROM_TABLE_STRIDE`:
/// the low half first, the high half 4 bytes later.
pub const REG_ROM_TABLE: u32 = 0x400;
/// Byte distance between two slots of the ROM table.
pub const ROM_TABLE_STRIDE: u32 = 8;

/// Offset of the low half of ROM table slot `slot`.
pub const fn rom_table_lo(slot: u32) -> u32 {
    REG_ROM_TABLE + slot * ROM_TABLE_STRIDE
}

/// Offset of the high half of ROM table slot `slot`.
pub const fn rom_table_hi(slot: u32) -> u32 {
    rom_table_lo(slot) + 4
}

/// Search ROM: enumerate all devices.
pub const SEARCH_ROM: u8 = 0xf0;
/// Read ROM: single-device buses only.
pub const READ_ROM: u8 = 0x33;
/// Match ROM: address one device by its 64-bit ROM code.
pub const MATCH_ROM: u8 = 0x55;
/// Skip ROM: address every device at once.
pub const SKIP_ROM: u8 = 0xcc;
/// Alarm search: enumerate devices with their alarm flag set.
pub const ALARM_SEARCH: u8 = 0xec;

/// Start a temperature conversion.
pub const CONVERT_TEMP: u8 = 0x44;
/// Write alarm trigger and configuration bytes to the scratchpad.
pub const SCRATCH_WRITE: u8 = 0x4e;
/// Read the scratchpad.
pub const SCRATCH_READ: u8 = 0xbe;
/// Copy the scratchpad to EEPROM.
pub const SCRATCH_COPY: u8 = 0x48;
/// Recall alarm trigger values from EEPROM.
pub const RECALL_ALARM: u8 = 0xb8;
/// Ask whether any device runs on parasitic power.
pub const POWER_READ: u8 = 0xb4;

/// Put the command register on the bus (used to start a search).
pub const CTRL_SERIALIZE: u32 = 0x0000_0001;
/// Drive the bus low for a reset pulse.
pub const CTRL_RESET_PULSE: u32 = 0x0001_0000;
/// Execute the command with the strong pull-up held afterwards.
pub const CTRL_EXEC_WITH_PULLUP: u32 = 0x08;
/// Execute the command and clock out the write-data registers.
pub const CTRL_EXEC_WITHOUT_PULLUP: u32 = 0x18;
/// Execute the command and generate read timeslots.
pub const CTRL_READ_TIMESLOTS: u32 = 0x28;

/// Control bit: search ROM / alarm.
pub const CONTROL_SEARCH: u32 = 0x0000_0001;
/// Control bit: append CRC.
pub const CONTROL_APPEND_CRC: u32 = 0x0000_0004;
/// Control bit: command enable.
pub const CONTROL_COMMAND_ENABLE: u32 = 0x0000_0008;
/// Control bit: block write enable.
pub const CONTROL_WRITE_ENABLE: u32 = 0x0000_0010;
/// Control bit: block read enable.
pub const CONTROL_READ_ENABLE: u32 = 0x0000_0020;

/// Search finished.
pub const STATUS_SEARCH_DONE: u32 = 0x0000_0001;
/// 1-Wire interrupt.
pub const STATUS_INTERRUPT: u32 = 0x0000_0004;
/// Command finished. After a conversion this is the only bit expected.
pub const STATUS_COMMAND_DONE: u32 = 0x0000_0008;
/// Block write finished.
pub const STATUS_WRITE_DONE: u32 = 0x0000_0010;
/// Block read finished.
pub const STATUS_READ_DONE: u32 = 0x0000_0020;
/// Reset pulse finished.
pub const STATUS_RESET_DONE: u32 = 0x0000_0040;
/// Presence pulse seen after the last reset.
pub const STATUS_PRESENCE: u32 = 0x0000_0080;
/// CRC mismatch.
pub const STATUS_CRC_ERROR: u32 = 0x0000_0100;
/// No device answered the search.
pub const STATUS_SEARCH_ERROR: u32 = 0x0000_0200;
/// More devices answered than the ROM table can hold.
pub const STATUS_SEARCH_MEMORY_ERROR: u32 = 0x0000_0400;
/// Peripheral busy (read only).
pub const STATUS_BUSY: u32 = 0x8000_0000;
