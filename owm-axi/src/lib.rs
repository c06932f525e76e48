#![no_std]
#![deny(missing_docs)]

/*! # owm-axi
 *
 * Driver for the `ow_master` 1-Wire bus master, a memory-mapped peripheral that
 * generates reset pulses, timeslots and CRCs on its own. The driver turns register
 * writes and status polls into the logical bus operations (reset, Match ROM, Convert T,
 * Read Scratchpad, Search ROM) and owns the table of ROM codes found by the last search.
 */

extern crate alloc;

pub use owm_protocol::{
    Cancel, FamilyConfig, Never, OneWireError, OneWireResult, RegisterInterface, RomCode,
    SearchKind,
};
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod onewire;
mod registers;
mod search;

pub use registers::{Register, StatusRegister};
pub use search::RomSearch;

use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;

/// ROM table slots reserved up front. The table grows when a search finds more.
pub const ROM_TABLE_SLOTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BusPhase {
    /// Nothing may be addressed until a reset pulse completes.
    NeedsReset,
    /// Presence pulse seen, a ROM command may follow.
    Reset,
    /// One device selected by Match ROM, a function command may follow.
    Addressed,
}

/// An `ow_master` 1-Wire bus master.
///
/// Takes ownership of a register backend (implementing [`RegisterInterface`]), a timer
/// implementing the [`DelayNs`] trait and a [`Cancel`] hook.
///
/// Each method issues one complete logical operation; the peripheral's registers are
/// shared mutable state, so callers that share a bus must serialize whole operations
/// (or whole sequences of them) behind one lock.
pub struct OwMaster<R, D, C = Never> {
    pub(crate) regs: R,
    pub(crate) delay: D,
    pub(crate) cancel: C,
    pub(crate) family: FamilyConfig,
    pub(crate) retries: u8,
    pub(crate) search_retries: u8,
    pub(crate) poll_interval_us: u32,
    pub(crate) phase: BusPhase,
    pub(crate) rom_table: Vec<u32>,
    pub(crate) num_roms: usize,
    pub(crate) search_in_progress: bool,
}

/// Builder for creating an [`OwMaster`] instance with custom configuration.
pub struct OwMasterBuilder<C = Never> {
    pub(crate) retries: u8,
    pub(crate) search_retries: u8,
    pub(crate) poll_interval_us: u32,
    pub(crate) family: FamilyConfig,
    pub(crate) cancel: C,
}

impl Default for OwMasterBuilder {
    fn default() -> Self {
        OwMasterBuilder {
            retries: 20,
            search_retries: 30,
            poll_interval_us: 5_000,
            family: FamilyConfig::DS18B20,
            cancel: Never,
        }
    }
}

impl<C> OwMasterBuilder<C> {
    /// Sets how many times the status register is re-polled before a
    /// reset, Match ROM or scratchpad read times out.
    ///
    /// The status register is always read once before the first retry, so an
    /// operation that never completes reads it `retries + 1` times.
    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the re-poll budget of a search. Enumeration takes longer than the
    /// other operations, so this is normally larger than [`with_retries`](Self::with_retries).
    pub fn with_search_retries(mut self, retries: u8) -> Self {
        self.search_retries = retries;
        self
    }

    /// Sets the sleep between two polls of the status register.
    pub fn with_poll_interval_us(mut self, us: u32) -> Self {
        self.poll_interval_us = us;
        self
    }

    /// Sets the device family whose timing and command tables the bus uses.
    pub fn with_family(mut self, family: FamilyConfig) -> Self {
        self.family = family;
        self
    }

    /// Installs a cancel hook consulted while waiting on the peripheral.
    pub fn with_cancel<C2: Cancel>(self, cancel: C2) -> OwMasterBuilder<C2> {
        OwMasterBuilder {
            retries: self.retries,
            search_retries: self.search_retries,
            poll_interval_us: self.poll_interval_us,
            family: self.family,
            cancel,
        }
    }

    /// Builds a new [`OwMaster`].
    ///
    /// No register is touched; the first bus operation must be a reset pulse or a search.
    pub fn build<R: RegisterInterface, D: DelayNs>(self, regs: R, delay: D) -> OwMaster<R, D, C>
    where
        C: Cancel,
    {
        OwMaster {
            regs,
            delay,
            cancel: self.cancel,
            family: self.family,
            retries: self.retries,
            search_retries: self.search_retries,
            poll_interval_us: self.poll_interval_us,
            phase: BusPhase::NeedsReset,
            rom_table: Vec::with_capacity(ROM_TABLE_SLOTS * 2),
            num_roms: 0,
            search_in_progress: false,
        }
    }
}

impl<R: RegisterInterface, D: DelayNs> OwMaster<R, D> {
    /// Creates a bus master with the default configuration.
    pub fn new(regs: R, delay: D) -> Self {
        OwMasterBuilder::default().build(regs, delay)
    }
}

impl<R, D, C> OwMaster<R, D, C> {
    /// Whether a reset pulse has completed since construction or the last failed operation.
    ///
    /// While this is `false` only [`reset_pulse`](Self::reset_pulse) and
    /// [`search`](Self::search) are accepted.
    pub fn is_initialized(&self) -> bool {
        self.phase != BusPhase::NeedsReset
    }

    /// Whether a [`RomSearch`] is still reading discovered ROM codes.
    pub fn search_in_progress(&self) -> bool {
        self.search_in_progress
    }

    /// Number of ROM codes in the table, as of the last search.
    pub fn num_roms(&self) -> usize {
        self.num_roms
    }

    /// ROM code stored at discovery slot `slot` by the last search.
    pub fn rom_at(&self, slot: usize) -> Option<RomCode> {
        if slot >= self.num_roms {
            return None;
        }
        Some(RomCode::from_halves(
            self.rom_table[slot * 2],
            self.rom_table[slot * 2 + 1],
        ))
    }

    /// Iterates the ROM codes of the last search in slot order.
    pub fn rom_codes(&self) -> impl Iterator<Item = RomCode> + '_ {
        self.rom_table[..self.num_roms * 2]
            .chunks_exact(2)
            .map(|pair| RomCode::from_halves(pair[0], pair[1]))
    }

    /// Device family the bus was configured for.
    pub fn family(&self) -> &FamilyConfig {
        &self.family
    }

    /// Mutable access to the cancel hook, e.g. to arm a deadline for the next sequence.
    pub fn cancel_mut(&mut self) -> &mut C {
        &mut self.cancel
    }

    /// Consumes the bus master, returning the register backend and the timer.
    pub fn release(self) -> (R, D) {
        (self.regs, self.delay)
    }
}
