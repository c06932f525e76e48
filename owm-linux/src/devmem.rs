use memmap2::{MmapMut, MmapOptions};
use owm_protocol::RegisterInterface;
use std::{fs::OpenOptions, io};

/// `ow_master` register bank reached through `/dev/mem`.
///
/// The window `base..base + range` is mapped once. Every access is a single volatile
/// 32-bit load or store, so the bus sees one word-sized transaction per register.
pub struct DevMem {
    map: MmapMut,
    range: u32,
}

impl DevMem {
    pub fn open(path: &str, base: u64, range: u32) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        // SAFETY: the mapping is owned by `DevMem` and only touched through
        // aligned, range-checked volatile accesses.
        let map = unsafe {
            MmapOptions::new()
                .offset(base)
                .len(range as usize)
                .map_mut(&file)?
        };
        log::debug!("{path} mapped, registers at {base:#x}..{:#x}", base + range as u64);
        Ok(Self { map, range })
    }

    fn register(&mut self, offset: u32) -> io::Result<*mut u32> {
        let index = word_offset(self.range, offset)?;
        // SAFETY: `word_offset` keeps the word inside the mapping.
        Ok(unsafe { self.map.as_mut_ptr().add(index).cast::<u32>() })
    }
}

/// Byte offset of a 32-bit register inside a window of `range` bytes.
fn word_offset(range: u32, offset: u32) -> io::Result<usize> {
    match offset.checked_add(4) {
        Some(end) if end <= range && offset % 4 == 0 => Ok(offset as usize),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("register offset {offset:#x} outside {range:#x} byte window"),
        )),
    }
}

impl RegisterInterface for DevMem {
    type Error = io::Error;

    fn read(&mut self, offset: u32) -> Result<u32, Self::Error> {
        let reg = self.register(offset)?;
        // SAFETY: aligned and in bounds, see `register`.
        Ok(unsafe { core::ptr::read_volatile(reg) })
    }

    fn write(&mut self, offset: u32, value: u32) -> Result<(), Self::Error> {
        let reg = self.register(offset)?;
        // SAFETY: aligned and in bounds, see `register`.
        unsafe { core::ptr::write_volatile(reg, value) };
        Ok(())
    }
}
