use crate::Sensor;

/// Disable sentinel: a target at or below this, in °C, means the sensor drives no heat source.
pub const DEFAULT_DISABLE_AT_OR_BELOW: f64 = 1.0;

/// Where a sensor's last reading sits relative to its alarm window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmSignal {
    /// Below the low bound: the heat source for the location should turn on.
    BelowRange,
    /// Within the window, bounds included.
    WithinRange,
    /// Above the high bound: the heat source for the location should turn off.
    AboveRange,
    /// No active control for this sensor.
    Disabled,
}

/// What to do with the heat source of a sensor's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatAction {
    On,
    Off,
}

impl AlarmSignal {
    pub fn heat_action(self) -> Option<HeatAction> {
        match self {
            AlarmSignal::BelowRange => Some(HeatAction::On),
            AlarmSignal::AboveRange => Some(HeatAction::Off),
            AlarmSignal::WithinRange | AlarmSignal::Disabled => None,
        }
    }
}

/// Compares sensors' last readings against their alarm windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlarmEvaluator {
    /// Targets at or below this, in °C, disable evaluation.
    pub disable_at_or_below: f64,
}

impl Default for AlarmEvaluator {
    fn default() -> Self {
        Self {
            disable_at_or_below: DEFAULT_DISABLE_AT_OR_BELOW,
        }
    }
}

impl AlarmEvaluator {
    pub fn new(disable_at_or_below: f64) -> Self {
        Self {
            disable_at_or_below,
        }
    }

    pub fn evaluate(&self, sensor: &Sensor) -> AlarmSignal {
        if sensor.target_temp_c() <= self.disable_at_or_below {
            return AlarmSignal::Disabled;
        }
        let temp = sensor.last_read_temp_c();
        let signal = if temp < sensor.alarm_lo_c() {
            AlarmSignal::BelowRange
        } else if temp > sensor.alarm_hi_c() {
            AlarmSignal::AboveRange
        } else {
            AlarmSignal::WithinRange
        };
        match signal {
            AlarmSignal::BelowRange => log::warn!(
                "{} at {}: {temp}°C below {}°C",
                sensor.rom_code(),
                sensor.location(),
                sensor.alarm_lo_c()
            ),
            AlarmSignal::AboveRange => log::warn!(
                "{} at {}: {temp}°C above {}°C",
                sensor.rom_code(),
                sensor.location(),
                sensor.alarm_hi_c()
            ),
            _ => {}
        }
        signal
    }
}
