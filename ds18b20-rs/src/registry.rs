use crate::{Location, ReadError, Sensor, SharedBus};
use embedded_hal::delay::DelayNs;
use owm_axi::{OwMaster, RegisterInterface, RomCode, SearchKind};
use std::collections::{BTreeMap, HashMap};

/// Every sensor seen on the bus during this session.
///
/// Sensors are keyed by the canonical form of their ROM code (upper-case hexadecimal)
/// and kept in discovery order. A second index groups them by [`Location`].
/// Entries are never removed.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    sensors: Vec<Sensor>,
    by_key: HashMap<String, usize>,
    by_location: BTreeMap<Location, Vec<usize>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    fn index_of(&self, rom: RomCode) -> Option<usize> {
        self.by_key.get(&rom.to_string()).copied()
    }

    pub fn lookup(&self, rom: RomCode) -> Option<&Sensor> {
        self.index_of(rom).map(|idx| &self.sensors[idx])
    }

    pub fn lookup_mut(&mut self, rom: RomCode) -> Option<&mut Sensor> {
        self.index_of(rom).map(|idx| &mut self.sensors[idx])
    }

    /// Looks a sensor up by the textual form of its ROM code, in any case, `0x` optional.
    pub fn lookup_key(&self, key: &str) -> Option<&Sensor> {
        self.lookup(key.parse().ok()?)
    }

    /// Returns the sensor for `rom`, creating it with default thresholds at
    /// [`Location::None`] if it was never seen. A known sensor is returned unchanged.
    pub fn register_if_new(&mut self, rom: RomCode, slot: Option<usize>) -> &mut Sensor {
        let idx = match self.index_of(rom) {
            Some(idx) => idx,
            None => {
                let idx = self.sensors.len();
                self.sensors.push(Sensor::new(rom, slot));
                self.by_key.insert(rom.to_string(), idx);
                self.by_location.entry(Location::None).or_default().push(idx);
                log::info!("new sensor {rom} at slot {slot:?}");
                idx
            }
        };
        &mut self.sensors[idx]
    }

    /// Sensors in discovery order.
    pub fn all_sensors(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.iter()
    }

    pub fn all_sensors_mut(&mut self) -> impl Iterator<Item = &mut Sensor> {
        self.sensors.iter_mut()
    }

    /// Sensors assigned to `location`, in discovery order.
    pub fn sensors_for_location(&self, location: Location) -> impl Iterator<Item = &Sensor> {
        self.by_location
            .get(&location)
            .into_iter()
            .flatten()
            .map(|&idx| &self.sensors[idx])
    }

    /// Resolves a slot of the bus's current ROM table to a registered sensor.
    pub fn lookup_slot<R, D, C>(
        &self,
        bus: &OwMaster<R, D, C>,
        slot: usize,
    ) -> Result<&Sensor, ReadError> {
        bus.rom_at(slot)
            .and_then(|rom| self.lookup(rom))
            .ok_or(ReadError::SensorNotFound(slot))
    }

    /// Runs one search with the bus held and registers every ROM code it yields.
    ///
    /// Returns the ROM codes the search reported, known or new, in slot order. A failed
    /// search registers nothing new past the failure.
    pub fn discover<R: RegisterInterface, D: DelayNs>(
        &mut self,
        bus: &SharedBus<R, D>,
        kind: SearchKind,
    ) -> Result<Vec<RomCode>, ReadError> {
        let mut bus = bus.lock();
        let search = bus.search(kind)?;
        let mut seen = Vec::with_capacity(search.len());
        for (slot, rom) in search.enumerate() {
            let rom = rom?;
            self.register_if_new(rom, Some(slot));
            seen.push(rom);
        }
        log::debug!("{kind:?} search: {} devices, {} registered", seen.len(), self.len());
        Ok(seen)
    }

    /// Moves a sensor to `location`. Returns its previous location, or `None` if the
    /// ROM code is unknown.
    pub fn assign_location(&mut self, rom: RomCode, location: Location) -> Option<Location> {
        let idx = self.index_of(rom)?;
        let previous = self.sensors[idx].location();
        if previous == location {
            return Some(previous);
        }
        if let Some(list) = self.by_location.get_mut(&previous) {
            list.retain(|&i| i != idx);
        }
        let list = self.by_location.entry(location).or_default();
        let at = list.partition_point(|&i| i < idx);
        list.insert(at, idx);
        self.sensors[idx].set_location(location);
        Some(previous)
    }

    /// Sets the target of every sensor at `location`. Returns how many were changed.
    pub fn set_location_target(&mut self, location: Location, celsius: f64) -> usize {
        self.for_location_mut(location, |s| s.set_target(celsius))
    }

    /// Sets the flux of every sensor at `location`. Returns how many were changed.
    pub fn set_location_flux(&mut self, location: Location, celsius: f64) -> usize {
        self.for_location_mut(location, |s| s.set_flux(celsius))
    }

    fn for_location_mut(&mut self, location: Location, mut f: impl FnMut(&mut Sensor)) -> usize {
        let Some(list) = self.by_location.get(&location) else {
            return 0;
        };
        for &idx in list {
            f(&mut self.sensors[idx]);
        }
        list.len()
    }

    /// Mean of the last readings at `location`, 0.0 if nothing is there.
    pub fn average_for_location(&self, location: Location) -> f64 {
        let (sum, count) = self
            .sensors_for_location(location)
            .fold((0.0, 0usize), |(sum, n), s| (sum + s.last_read_temp_c(), n + 1));
        if count == 0 { 0.0 } else { sum / count as f64 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom(n: u64) -> RomCode {
        RomCode::new(0x5e00_0016_6400_0028 | (n << 8))
    }

    #[test]
    fn register_is_idempotent() {
        let mut reg = DeviceRegistry::new();
        reg.register_if_new(rom(1), Some(0)).set_target(40.0);
        let again = reg.register_if_new(rom(1), Some(4));
        assert_eq!(again.target_temp_c(), 40.0);
        assert_eq!(again.bus_slot_index(), Some(0));
        assert_eq!(reg.len(), 1);
        assert!(reg.lookup(rom(2)).is_none());
    }

    #[test]
    fn lookup_by_canonical_key() {
        let mut reg = DeviceRegistry::new();
        reg.register_if_new(RomCode::new(0x5e00_0016_6401_ff28), None);
        assert!(reg.lookup_key("5E0000166401FF28").is_some());
        assert!(reg.lookup_key("0x5e0000166401ff28").is_some());
        assert!(reg.lookup_key("5E0000166401FF29").is_none());
        assert!(reg.lookup_key("garbage").is_none());
    }

    #[test]
    fn location_index_follows_assignment() {
        let mut reg = DeviceRegistry::new();
        for n in 0..4 {
            reg.register_if_new(rom(n), Some(n as usize));
        }
        assert_eq!(reg.sensors_for_location(Location::None).count(), 4);
        assert_eq!(reg.assign_location(rom(2), Location::Hlt), Some(Location::None));
        assert_eq!(reg.assign_location(rom(0), Location::Hlt), Some(Location::None));
        assert_eq!(reg.assign_location(rom(9), Location::Hlt), None);

        let hlt: Vec<RomCode> = reg
            .sensors_for_location(Location::Hlt)
            .map(Sensor::rom_code)
            .collect();
        assert_eq!(hlt, vec![rom(0), rom(2)]);
        assert_eq!(reg.sensors_for_location(Location::None).count(), 2);
        assert_eq!(reg.sensors_for_location(Location::Bk).count(), 0);
        assert_eq!(reg.lookup(rom(2)).map(Sensor::location), Some(Location::Hlt));
    }

    #[test]
    fn location_wide_settings_and_average() {
        let mut reg = DeviceRegistry::new();
        for n in 0..3 {
            reg.register_if_new(rom(n), None);
            reg.assign_location(rom(n), Location::Mlt);
        }
        reg.register_if_new(rom(7), None);
        assert_eq!(reg.set_location_target(Location::Mlt, 66.0), 3);
        assert_eq!(reg.set_location_flux(Location::Mlt, 0.5), 3);
        assert_eq!(reg.set_location_target(Location::Bk, 99.0), 0);
        for s in reg.sensors_for_location(Location::Mlt) {
            assert_eq!((s.alarm_lo_c(), s.alarm_hi_c()), (65.5, 66.5));
        }
        assert_eq!(reg.lookup(rom(7)).map(Sensor::target_temp_c), Some(crate::DEFAULT_TARGET_C));

        for (n, temp) in [(0, 64.0), (1, 66.0), (2, 68.0)] {
            if let Some(s) = reg.lookup_mut(rom(n)) {
                s.last_read_temp_c = temp;
            }
        }
        assert_eq!(reg.average_for_location(Location::Mlt), 66.0);
        assert_eq!(reg.average_for_location(Location::Hlt), 0.0);
    }
}
