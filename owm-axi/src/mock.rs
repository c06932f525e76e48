//! Simulated `ow_master` peripheral for tests.
//!
//! [`SimPeripheral`] implements [`RegisterInterface`] and reacts to control-register
//! writes the way the real peripheral does at the logical level: reset pulses, Match ROM,
//! Convert T, scratchpad reads and searches set the matching done bits, and a search fills
//! the ROM table and the discovered-count register. Individual steps can be made to fail
//! and every write is recorded for inspection.

use alloc::{collections::BTreeMap, vec::Vec};
use core::convert::Infallible;
use owm_protocol::{OneWireCrc, RegisterInterface, RomCode, consts::*};

/// Alarm trigger bytes placed above the temperature in the first read-data word.
pub const SIM_ALARM_BYTES: u32 = 0x4b46;

/// A device attached to the simulated bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDevice {
    /// ROM code the device answers to.
    pub rom: RomCode,
    /// Raw 16-bit temperature returned by a scratchpad read.
    pub raw_temp: u16,
    /// Whether the device answers an alarm search.
    pub alarmed: bool,
}

impl SimDevice {
    /// A device with the given ROM code.
    pub fn new(rom: RomCode, raw_temp: u16) -> Self {
        Self {
            rom,
            raw_temp,
            alarmed: false,
        }
    }

    /// A DS18B20 (family 0x28) with the given 48-bit serial number and a valid CRC.
    pub fn ds18b20(serial: u64, raw_temp: u16) -> Self {
        let mut bytes = (((serial & 0xffff_ffff_ffff) << 8) | 0x28).to_le_bytes();
        bytes[7] = OneWireCrc::checksum(&bytes[..7]);
        Self::new(RomCode::new(u64::from_le_bytes(bytes)), raw_temp)
    }

    /// Marks the device as answering alarm searches.
    pub fn alarmed(mut self) -> Self {
        self.alarmed = true;
        self
    }
}

/// Simulated register bank of an `ow_master` peripheral.
#[derive(Debug)]
pub struct SimPeripheral {
    /// Devices on the bus, in the order a search reports them.
    pub devices: Vec<SimDevice>,
    /// Devices answer reset pulses with a presence pulse.
    pub presence: bool,
    /// Devices acknowledge Match ROM.
    pub acknowledge: bool,
    /// Conversions complete.
    pub convert_ok: bool,
    /// Scratchpad reads complete.
    pub read_ok: bool,
    /// The search done bit is eventually set.
    pub search_completes: bool,
    /// Force the search-error bit.
    pub search_error: bool,
    /// Force the search-memory-error bit.
    pub search_memory_error: bool,
    /// Status reads that return nothing before a done bit appears.
    pub latency: u32,
    /// Reset pulses that succeed before every later one goes unanswered.
    pub fail_reset_after: Option<usize>,
    /// Match ROM commands that are acknowledged before every later one is not.
    pub fail_match_after: Option<usize>,
    registers: BTreeMap<u32, u32>,
    writes: Vec<(u32, u32)>,
    status: u32,
    pending: u32,
    countdown: u32,
    status_reads: usize,
    resets: usize,
    matches: usize,
    selected: Option<usize>,
}

impl Default for SimPeripheral {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SimPeripheral {
    /// A well-behaved bus with the given devices.
    pub fn new(devices: Vec<SimDevice>) -> Self {
        Self {
            devices,
            presence: true,
            acknowledge: true,
            convert_ok: true,
            read_ok: true,
            search_completes: true,
            search_error: false,
            search_memory_error: false,
            latency: 0,
            fail_reset_after: None,
            fail_match_after: None,
            registers: BTreeMap::new(),
            writes: Vec::new(),
            status: 0,
            pending: 0,
            countdown: 0,
            status_reads: 0,
            resets: 0,
            matches: 0,
            selected: None,
        }
    }

    /// Every register write so far, oldest first.
    pub fn writes(&self) -> &[(u32, u32)] {
        &self.writes
    }

    /// Values written to the control register, oldest first.
    pub fn control_writes(&self) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(offset, _)| *offset == REG_CONTROL)
            .map(|&(_, value)| value)
            .collect()
    }

    /// Number of status register reads so far.
    pub fn status_reads(&self) -> usize {
        self.status_reads
    }

    /// Forgets recorded writes and status reads.
    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.status_reads = 0;
    }

    /// Sets the raw temperature reported by the device with `rom`.
    pub fn set_raw_temp(&mut self, rom: RomCode, raw_temp: u16) {
        if let Some(dev) = self.devices.iter_mut().find(|d| d.rom == rom) {
            dev.raw_temp = raw_temp;
        }
    }

    fn register(&self, offset: u32) -> u32 {
        self.registers.get(&offset).copied().unwrap_or(0)
    }

    /// Clears the status register and shows `bits` once `latency` status reads have passed.
    fn schedule(&mut self, bits: u32) {
        self.status = 0;
        self.pending = bits;
        self.countdown = self.latency;
    }

    fn never(&mut self) {
        self.status = 0;
        self.pending = 0;
        self.countdown = 0;
    }

    fn execute(&mut self, control: u32) {
        let command = self.register(REG_COMMAND) as u8;
        match control {
            CTRL_RESET_PULSE => {
                self.selected = None;
                let answered = self.fail_reset_after.is_none_or(|n| self.resets < n);
                self.resets += 1;
                if answered && self.presence && !self.devices.is_empty() {
                    self.schedule(STATUS_RESET_DONE | STATUS_PRESENCE);
                } else {
                    self.never();
                }
            }
            CTRL_EXEC_WITHOUT_PULLUP if command == MATCH_ROM => {
                let rom = RomCode::from_halves(
                    self.register(REG_WRITE_DATA_LO),
                    self.register(REG_WRITE_DATA_HI),
                );
                self.selected = self.devices.iter().position(|d| d.rom == rom);
                let answered = self.fail_match_after.is_none_or(|n| self.matches < n);
                self.matches += 1;
                if answered && self.acknowledge && self.selected.is_some() {
                    self.schedule(STATUS_WRITE_DONE);
                } else {
                    self.never();
                }
            }
            CTRL_EXEC_WITH_PULLUP if command == CONVERT_TEMP => {
                if self.convert_ok && self.selected.is_some() {
                    self.status = STATUS_COMMAND_DONE;
                    self.pending = STATUS_COMMAND_DONE;
                    self.countdown = 0;
                } else {
                    self.never();
                }
            }
            CTRL_READ_TIMESLOTS if command == SCRATCH_READ => match self.selected {
                Some(idx) if self.read_ok => {
                    let raw = self.devices[idx].raw_temp as u32;
                    self.registers
                        .insert(REG_READ_DATA_0, (SIM_ALARM_BYTES << 16) | raw);
                    self.registers.insert(REG_READ_DATA_1, 0x1000_ff7f);
                    self.registers.insert(REG_READ_DATA_2, 0x0000_0010);
                    self.schedule(STATUS_READ_DONE);
                }
                _ => self.never(),
            },
            CTRL_SERIALIZE if command == SEARCH_ROM || command == ALARM_SEARCH => {
                self.search(command == ALARM_SEARCH)
            }
            _ => self.never(),
        }
    }

    fn search(&mut self, alarmed_only: bool) {
        let found: Vec<RomCode> = self
            .devices
            .iter()
            .filter(|d| !alarmed_only || d.alarmed)
            .map(|d| d.rom)
            .collect();
        if self.search_error || found.is_empty() {
            self.schedule(STATUS_SEARCH_DONE | STATUS_SEARCH_ERROR);
            return;
        }
        if self.search_memory_error {
            self.schedule(STATUS_SEARCH_DONE | STATUS_SEARCH_MEMORY_ERROR);
            return;
        }
        self.registers
            .insert(REG_DISCOVERED_COUNT, found.len() as u32);
        for (slot, rom) in found.iter().enumerate() {
            self.registers.insert(rom_table_lo(slot as u32), rom.lo());
            self.registers.insert(rom_table_hi(slot as u32), rom.hi());
        }
        if self.search_completes {
            self.schedule(STATUS_SEARCH_DONE);
        } else {
            self.never();
        }
    }
}

impl RegisterInterface for SimPeripheral {
    type Error = Infallible;

    fn read(&mut self, offset: u32) -> Result<u32, Self::Error> {
        if offset != REG_STATUS {
            return Ok(self.register(offset));
        }
        self.status_reads += 1;
        if self.countdown == 0 {
            self.status = self.pending;
        } else {
            self.countdown -= 1;
        }
        Ok(self.status)
    }

    fn write(&mut self, offset: u32, value: u32) -> Result<(), Self::Error> {
        self.writes.push((offset, value));
        self.registers.insert(offset, value);
        if offset == REG_CONTROL {
            self.execute(value);
        }
        Ok(())
    }
}
