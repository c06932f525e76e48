use crate::{BusPhase, OwMaster, Register, StatusRegister};
use embedded_hal::delay::DelayNs;
use owm_protocol::{Cancel, OneWireError, OneWireResult, RegisterInterface, RomCode, consts::*};

/// Outcome of a bounded wait on the status register.
pub(crate) enum Polled {
    /// The awaited bits were seen.
    Done(StatusRegister),
    /// The retry budget ran out; carries the last status read.
    TimedOut(StatusRegister),
}

impl<R: RegisterInterface, D: DelayNs, C: Cancel> OwMaster<R, D, C> {
    /// Reads the status register.
    pub fn status(&mut self) -> OneWireResult<StatusRegister, R::Error> {
        Ok(StatusRegister::load(&mut self.regs)?)
    }

    /// Reads the four read-data registers, lowest word first.
    ///
    /// After [`read_scratchpad`](Self::read_scratchpad) the temperature sits in the
    /// low 16 bits of the first word.
    pub fn read_data(&mut self) -> OneWireResult<[u32; 4], R::Error> {
        Ok([
            self.regs.read(REG_READ_DATA_0)?,
            self.regs.read(REG_READ_DATA_1)?,
            self.regs.read(REG_READ_DATA_2)?,
            self.regs.read(REG_READ_DATA_3)?,
        ])
    }

    /// Reads the lowest read-data register only.
    pub fn read_data_lo(&mut self) -> OneWireResult<u32, R::Error> {
        Ok(self.regs.read(REG_READ_DATA_0)?)
    }

    /// Sends a reset pulse and waits for the peripheral to report it done.
    ///
    /// Every device on the bus answers with a presence pulse. This must precede any ROM
    /// command; only a search may be started without it.
    ///
    /// # Errors
    /// [`OneWireError::NoPresencePulse`] if the reset-done bit does not show up within the
    /// retry budget, which means nothing is wired to the bus.
    pub fn reset_pulse(&mut self) -> OneWireResult<(), R::Error> {
        self.assert_idle();
        self.phase = BusPhase::NeedsReset;
        self.regs.write(REG_CONTROL, CTRL_RESET_PULSE)?;
        match self.poll_status(STATUS_RESET_DONE, self.retries)? {
            Polled::Done(status) => {
                log::debug!("reset done, status {:#x}", status.into_bits());
                self.phase = BusPhase::Reset;
                Ok(())
            }
            Polled::TimedOut(_) => {
                log::warn!("No presence pulse detected, no devices on the bus");
                Err(OneWireError::NoPresencePulse)
            }
        }
    }

    /// Addresses one device with Match ROM.
    ///
    /// Only the device whose ROM code matches listens to the next function command;
    /// all others wait for the next reset pulse.
    ///
    /// # Errors
    /// - [`OneWireError::BusUninitialized`] if no reset pulse preceded this call.
    /// - [`OneWireError::NotAcknowledged`] if the write-done bit does not show up within the
    ///   retry budget. The sequence is broken at that point and must restart with a reset.
    pub fn match_rom(&mut self, rom: RomCode) -> OneWireResult<(), R::Error> {
        self.assert_idle();
        if self.phase != BusPhase::Reset {
            return Err(OneWireError::BusUninitialized);
        }
        self.phase = BusPhase::NeedsReset;
        self.regs
            .write(REG_COMMAND, self.family.rom_commands.match_rom as u32)?;
        self.regs.write(REG_WRITE_SIZE, self.family.rom_bits)?;
        self.regs.write(REG_WRITE_DATA_LO, rom.lo())?;
        self.regs.write(REG_WRITE_DATA_HI, rom.hi())?;
        self.regs.write(REG_CONTROL, CTRL_EXEC_WITHOUT_PULLUP)?;
        match self.poll_status(STATUS_WRITE_DONE, self.retries)? {
            Polled::Done(_) => {
                self.phase = BusPhase::Addressed;
                Ok(())
            }
            Polled::TimedOut(_) => {
                log::warn!("ROM {rom} not matched");
                Err(OneWireError::NotAcknowledged)
            }
        }
    }

    /// Starts a temperature conversion on the addressed device and waits for it.
    ///
    /// The strong pull-up is held during the conversion so parasitically powered devices
    /// keep working. Devices do not signal completion, so this sleeps for the family's
    /// conversion time and then samples the status register once.
    ///
    /// # Errors
    /// - [`OneWireError::BusUninitialized`] if no device was addressed.
    /// - [`OneWireError::ConversionIncomplete`] if the status register does not read
    ///   exactly command-done after the wait.
    /// - [`OneWireError::Cancelled`] if the cancel hook fires around the wait.
    pub fn convert_temperature(&mut self) -> OneWireResult<(), R::Error> {
        self.assert_idle();
        if self.phase != BusPhase::Addressed {
            return Err(OneWireError::BusUninitialized);
        }
        self.phase = BusPhase::NeedsReset;
        self.regs
            .write(REG_COMMAND, self.family.function_commands.convert_temp as u32)?;
        self.regs.write(REG_CONTROL, CTRL_EXEC_WITH_PULLUP)?;
        if self.cancel.cancelled() {
            return Err(OneWireError::Cancelled);
        }
        self.delay.delay_us(self.family.conversion_time_us);
        if self.cancel.cancelled() {
            return Err(OneWireError::Cancelled);
        }
        let status = self.status()?.into_bits();
        if status == STATUS_COMMAND_DONE {
            Ok(())
        } else {
            log::warn!("temperature conversion incomplete, status {status:#x}");
            Err(OneWireError::ConversionIncomplete(status))
        }
    }

    /// Reads the scratchpad of the addressed device into the read-data registers.
    ///
    /// # Errors
    /// - [`OneWireError::BusUninitialized`] if no device was addressed.
    /// - [`OneWireError::ReadTimeout`] if the read-done bit does not show up within the
    ///   retry budget.
    pub fn read_scratchpad(&mut self) -> OneWireResult<(), R::Error> {
        self.assert_idle();
        if self.phase != BusPhase::Addressed {
            return Err(OneWireError::BusUninitialized);
        }
        self.phase = BusPhase::NeedsReset;
        self.regs
            .write(REG_COMMAND, self.family.function_commands.scratch_read as u32)?;
        self.regs.write(REG_READ_SIZE, self.family.scratchpad_bits)?;
        self.regs.write(REG_CONTROL, CTRL_READ_TIMESLOTS)?;
        match self.poll_status(STATUS_READ_DONE, self.retries)? {
            Polled::Done(_) => Ok(()),
            Polled::TimedOut(_) => {
                log::warn!("scratchpad read error");
                Err(OneWireError::ReadTimeout)
            }
        }
    }

    /// Polls the status register until all bits of `mask` are set.
    ///
    /// The first read happens immediately; after that the register is re-read at most
    /// `retries` times with the poll interval slept in between. A timeout therefore costs
    /// `retries + 1` status reads, 21 with the default budget of 20.
    pub(crate) fn poll_status(&mut self, mask: u32, retries: u8) -> OneWireResult<Polled, R::Error> {
        let mut status = self.status()?;
        let mut tries = 0;
        while !status.contains(mask) {
            if tries >= retries {
                return Ok(Polled::TimedOut(status));
            }
            if self.cancel.cancelled() {
                return Err(OneWireError::Cancelled);
            }
            self.delay.delay_us(self.poll_interval_us);
            status = self.status()?;
            tries += 1;
        }
        Ok(Polled::Done(status))
    }

    /// Interleaving another operation with a search that is still reading out its
    /// ROM table is a programming error.
    pub(crate) fn assert_idle(&self) {
        assert!(
            !self.search_in_progress,
            "1-Wire bus operation attempted while a search is in progress"
        );
    }
}
