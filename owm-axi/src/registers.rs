use bitfield_struct::bitfield;
use owm_protocol::{RegisterInterface, consts::REG_STATUS};

/// A register of the `ow_master` peripheral that can be loaded as a whole.
pub trait Register: Sized {
    /// Offset of the register relative to the peripheral base.
    const OFFSET: u32;

    /// Read the register value from the peripheral.
    fn load<R: RegisterInterface>(regs: &mut R) -> Result<Self, R::Error>;
}

/// Status register of the `ow_master` peripheral.
///
/// Done bits are set by the peripheral when the matching operation finishes and
/// cleared when the next command is started. The error bits describe the last search.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct StatusRegister {
    /// A search has finished.
    pub search_done: bool,
    #[bits(1)]
    __: u8,
    /// 1-Wire interrupt seen on the bus.
    pub interrupt: bool,
    /// The last command has been executed.
    pub command_done: bool,
    /// The block write from the write-data registers has finished.
    pub write_done: bool,
    /// The block read into the read-data registers has finished.
    pub read_done: bool,
    /// The reset pulse has finished.
    pub reset_done: bool,
    /// A presence pulse followed the last reset.
    pub presence: bool,
    /// CRC mismatch on the last transfer.
    pub crc_error: bool,
    /// No device responded to the last search.
    pub search_error: bool,
    /// The last search found more devices than the ROM table holds.
    pub search_memory_error: bool,
    #[bits(20)]
    __: u32,
    /// The peripheral is busy.
    pub busy: bool,
}

impl StatusRegister {
    /// Whether every bit of `mask` is set.
    pub fn contains(&self, mask: u32) -> bool {
        self.into_bits() & mask == mask
    }
}

impl Register for StatusRegister {
    const OFFSET: u32 = REG_STATUS;

    fn load<R: RegisterInterface>(regs: &mut R) -> Result<Self, R::Error> {
        regs.read(Self::OFFSET).map(Self::from_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::StatusRegister;
    use owm_protocol::consts::*;

    #[test]
    fn bits_line_up_with_masks() {
        let s = StatusRegister::from_bits(STATUS_SEARCH_DONE);
        assert!(s.search_done());
        assert!(StatusRegister::from_bits(STATUS_INTERRUPT).interrupt());
        assert!(StatusRegister::from_bits(STATUS_COMMAND_DONE).command_done());
        assert!(StatusRegister::from_bits(STATUS_WRITE_DONE).write_done());
        assert!(StatusRegister::from_bits(STATUS_READ_DONE).read_done());
        assert!(StatusRegister::from_bits(STATUS_RESET_DONE).reset_done());
        assert!(StatusRegister::from_bits(STATUS_PRESENCE).presence());
        assert!(StatusRegister::from_bits(STATUS_CRC_ERROR).crc_error());
        assert!(StatusRegister::from_bits(STATUS_SEARCH_ERROR).search_error());
        assert!(StatusRegister::from_bits(STATUS_SEARCH_MEMORY_ERROR).search_memory_error());
        assert!(StatusRegister::from_bits(STATUS_BUSY).busy());
    }

    #[test]
    fn contains_requires_all_bits() {
        let s = StatusRegister::from_bits(STATUS_RESET_DONE | STATUS_PRESENCE);
        assert!(s.contains(STATUS_RESET_DONE));
        assert!(s.contains(STATUS_RESET_DONE | STATUS_PRESENCE));
        assert!(!s.contains(STATUS_RESET_DONE | STATUS_CRC_ERROR));
    }
}
