use owm_axi::{Cancel, OwMaster};
use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Instant,
};

/// A [`Cancel`] hook that fires once an armed instant has passed.
///
/// Disarmed, it never fires.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn arm(&mut self, instant: Instant) {
        self.0 = Some(instant);
    }

    pub fn disarm(&mut self) {
        self.0 = None;
    }

    pub fn instant(&self) -> Option<Instant> {
        self.0
    }
}

impl Cancel for Deadline {
    fn cancelled(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }
}

/// Bus master shared by every collaborator of one session.
pub type DeadlineBus<R, D> = OwMaster<R, D, Deadline>;

/// Exclusive access to one bus master.
///
/// Whole logical sequences (a full sensor read, a whole search) run under one
/// [`lock`](Self::lock), so nothing interleaves with them.
pub struct SharedBus<R, D> {
    bus: Mutex<DeadlineBus<R, D>>,
}

impl<R, D> SharedBus<R, D> {
    pub fn new(bus: DeadlineBus<R, D>) -> Self {
        Self {
            bus: Mutex::new(bus),
        }
    }

    /// Takes the bus. A holder that panicked leaves the bus usable: every sequence
    /// starts with a reset pulse.
    pub fn lock(&self) -> MutexGuard<'_, DeadlineBus<R, D>> {
        self.bus.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn into_inner(self) -> DeadlineBus<R, D> {
        self.bus.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R, D> From<DeadlineBus<R, D>> for SharedBus<R, D> {
    fn from(bus: DeadlineBus<R, D>) -> Self {
        Self::new(bus)
    }
}
