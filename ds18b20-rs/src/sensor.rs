use crate::{
    Location,
    convert::{celsius_from_fahr, clamp_celsius, fahr_from_celsius},
};
use owm_protocol::RomCode;

/// Target temperature of a newly discovered sensor, in °C (170 °F).
pub const DEFAULT_TARGET_C: f64 = 76.667;
/// Allowed deviation from the target of a newly discovered sensor, in °C.
pub const DEFAULT_FLUX_C: f64 = 1.5;

/// A DS18B20 seen on the bus, with its control thresholds.
///
/// Invariant: `alarm_lo <= target <= alarm_hi`, all three within
/// [`MIN_CELSIUS`](crate::convert::MIN_CELSIUS)..=[`MAX_CELSIUS`](crate::convert::MAX_CELSIUS).
/// The bounds are recomputed whenever the target or the flux changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    rom_code: RomCode,
    bus_slot_index: Option<usize>,
    location: Location,
    /// Last successful reading, in °C.
    pub(crate) last_read_temp_c: f64,
    target_temp_c: f64,
    flux_c: f64,
    alarm_lo_c: f64,
    alarm_hi_c: f64,
}

impl Sensor {
    /// A sensor with the default target and flux, at [`Location::None`].
    pub fn new(rom_code: RomCode, bus_slot_index: Option<usize>) -> Self {
        let mut sensor = Self {
            rom_code,
            bus_slot_index,
            location: Location::None,
            last_read_temp_c: 0.0,
            target_temp_c: DEFAULT_TARGET_C,
            flux_c: DEFAULT_FLUX_C,
            alarm_lo_c: 0.0,
            alarm_hi_c: 0.0,
        };
        sensor.update_alarms();
        sensor
    }

    pub fn rom_code(&self) -> RomCode {
        self.rom_code
    }

    /// Slot of the search that first reported this sensor. Not stable across searches.
    pub fn bus_slot_index(&self) -> Option<usize> {
        self.bus_slot_index
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn last_read_temp_c(&self) -> f64 {
        self.last_read_temp_c
    }

    pub fn last_read_temp_f(&self) -> f64 {
        fahr_from_celsius(self.last_read_temp_c)
    }

    pub fn target_temp_c(&self) -> f64 {
        self.target_temp_c
    }

    pub fn flux_c(&self) -> f64 {
        self.flux_c
    }

    pub fn alarm_lo_c(&self) -> f64 {
        self.alarm_lo_c
    }

    pub fn alarm_hi_c(&self) -> f64 {
        self.alarm_hi_c
    }

    /// Sets the target, clamped to the device range, and recomputes the alarm bounds.
    /// NaN is ignored.
    pub fn set_target(&mut self, celsius: f64) {
        if celsius.is_nan() {
            log::warn!("{}: ignoring NaN target", self.rom_code);
            return;
        }
        self.target_temp_c = clamp_celsius(celsius);
        self.update_alarms();
    }

    /// Sets the target from a temperature in °F.
    pub fn set_target_fahrenheit(&mut self, fahrenheit: f64) {
        self.set_target(celsius_from_fahr(fahrenheit));
    }

    /// Sets the allowed deviation from the target and recomputes the alarm bounds.
    /// A negative flux counts as its magnitude. NaN is ignored.
    pub fn set_flux(&mut self, celsius: f64) {
        if celsius.is_nan() {
            log::warn!("{}: ignoring NaN flux", self.rom_code);
            return;
        }
        self.flux_c = celsius.abs();
        self.update_alarms();
    }

    fn update_alarms(&mut self) {
        self.alarm_lo_c = clamp_celsius(self.target_temp_c - self.flux_c);
        self.alarm_hi_c = clamp_celsius(self.target_temp_c + self.flux_c);
    }

    /// Multi-line summary: serial, last reading and target window in both units.
    pub fn details(&self) -> String {
        format!(
            "  Serial ID {}\n   Most Recent Temp was [{:.3}°C / {:.3}°F]\n   Target Temp set to [({:.3}±{:.3})°C / ({:.3}±{:.3})°F]\n",
            self.rom_code,
            self.last_read_temp_c,
            self.last_read_temp_f(),
            self.target_temp_c,
            self.flux_c,
            fahr_from_celsius(self.target_temp_c),
            self.flux_c * 9.0 / 5.0,
        )
    }
}
