use crate::{BusPhase, OwMaster, onewire::Polled};
use core::iter::FusedIterator;
use embedded_hal::delay::DelayNs;
use owm_protocol::{
    Cancel, OneWireError, OneWireResult, RegisterInterface, RomCode, SearchKind, consts::*,
};

/// ROM table slots that fit in the 64 KiB register window above [`REG_ROM_TABLE`].
pub(crate) const MAX_ROM_SLOTS: u32 = (0x1_0000 - REG_ROM_TABLE) / ROM_TABLE_STRIDE;

impl<R: RegisterInterface, D: DelayNs, C: Cancel> OwMaster<R, D, C> {
    /// Runs a search on the bus and returns the discovered ROM codes.
    ///
    /// The peripheral performs the whole [1-Wire search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html)
    /// by itself and stores every ROM code it finds in its ROM table. This method starts
    /// the search, waits for it to finish and hands back a [`RomSearch`] that reads the
    /// table one slot at a time. The ROM table of this bus master is rebuilt as the
    /// [`RomSearch`] is consumed.
    ///
    /// A search resets every device, so a reset pulse is needed before the next ROM command.
    ///
    /// # Errors
    /// - [`OneWireError::SearchProtocol`] if no device responded.
    /// - [`OneWireError::SearchMemory`] if more devices responded than the peripheral can store.
    ///
    /// Both error bits are checked after the wait whether or not the done bit was seen.
    pub fn search(&mut self, kind: SearchKind) -> OneWireResult<RomSearch<'_, R, D, C>, R::Error> {
        self.assert_idle();
        self.phase = BusPhase::NeedsReset;
        self.search_in_progress = true;
        match self.start_search(kind) {
            Ok(count) => {
                self.num_roms = 0;
                self.rom_table.clear();
                self.rom_table.reserve(count as usize * 2);
                Ok(RomSearch {
                    bus: self,
                    slot: 0,
                    count,
                })
            }
            Err(e) => {
                self.search_in_progress = false;
                Err(e)
            }
        }
    }

    fn start_search(&mut self, kind: SearchKind) -> OneWireResult<u32, R::Error> {
        let cmd = match kind {
            SearchKind::Normal => self.family.rom_commands.search_rom,
            SearchKind::Alarmed => self.family.rom_commands.alarm_search,
        };
        self.regs.write(REG_COMMAND, cmd as u32)?;
        self.regs.write(REG_CONTROL, CTRL_SERIALIZE)?;
        let status = match self.poll_status(STATUS_SEARCH_DONE, self.search_retries)? {
            Polled::Done(status) => status,
            Polled::TimedOut(status) => {
                log::warn!(
                    "search done bit not seen after {} polls, status {:#x}",
                    self.search_retries,
                    status.into_bits()
                );
                status
            }
        };
        if status.search_error() {
            log::warn!("Search incomplete: no device responded");
            return Err(OneWireError::SearchProtocol);
        }
        if status.search_memory_error() {
            log::warn!("Search memory error: not enough peripheral memory for the devices found");
            return Err(OneWireError::SearchMemory);
        }
        let count = self.regs.read(REG_DISCOVERED_COUNT)?;
        if count > MAX_ROM_SLOTS {
            log::warn!("discovered count {count} exceeds the ROM table window");
            return Err(OneWireError::SearchMemory);
        }
        log::debug!("{count} ROM codes found");
        Ok(count)
    }
}

/// The ROM codes found by one call to [`OwMaster::search`].
///
/// A finite, single-pass sequence: every call to [`next`](Iterator::next) reads one
/// slot of the peripheral's ROM table and records it in the bus master. The search
/// stays in progress, and the bus master stays borrowed, until the sequence is
/// exhausted or dropped.
pub struct RomSearch<'a, R, D, C> {
    bus: &'a mut OwMaster<R, D, C>,
    slot: u32,
    count: u32,
}

impl<R, D, C> RomSearch<'_, R, D, C> {
    /// Number of devices the peripheral reported.
    pub fn discovered(&self) -> u32 {
        self.count
    }

    fn finish(&mut self) {
        self.slot = self.count;
        self.bus.search_in_progress = false;
    }
}

impl<R: RegisterInterface, D, C> Iterator for RomSearch<'_, R, D, C> {
    type Item = OneWireResult<RomCode, R::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.slot >= self.count {
            self.finish();
            return None;
        }
        let slot = self.slot;
        let regs = &mut self.bus.regs;
        let halves = regs
            .read(rom_table_lo(slot))
            .and_then(|lo| Ok((lo, regs.read(rom_table_hi(slot))?)));
        let (lo, hi) = match halves {
            Ok(halves) => halves,
            Err(e) => {
                self.finish();
                return Some(Err(OneWireError::Other(e)));
            }
        };
        self.bus.rom_table.push(lo);
        self.bus.rom_table.push(hi);
        self.bus.num_roms += 1;
        let rom = RomCode::from_halves(lo, hi);
        log::info!("ROM {} ID: {rom}", self.slot);
        if !rom.crc_valid() {
            log::warn!("ROM {rom} fails its CRC check");
        }
        self.slot += 1;
        Some(Ok(rom))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count.saturating_sub(self.slot) as usize;
        (left, Some(left))
    }
}

impl<R: RegisterInterface, D, C> ExactSizeIterator for RomSearch<'_, R, D, C> {}

impl<R: RegisterInterface, D, C> FusedIterator for RomSearch<'_, R, D, C> {}

impl<R, D, C> Drop for RomSearch<'_, R, D, C> {
    fn drop(&mut self) {
        self.bus.search_in_progress = false;
    }
}
