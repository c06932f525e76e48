use core::{fmt, str::FromStr};

/// Place in the brewing plant a sensor is mounted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Location {
    /// Hot liquor tank.
    Hlt,
    /// Mash lauter tun.
    Mlt,
    /// Boil kettle.
    Bk,
    /// Heat exchanger, water side inlet.
    HeatExIn,
    /// Heat exchanger, wort side outlet.
    HeatExOut,
    /// Water pump.
    WaterPump,
    /// Wort pump.
    WortPump,
    /// Not assigned yet.
    #[default]
    None,
}

/// Plant component a [`Location`] belongs to. Both heat exchanger ports share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Hot liquor tank.
    Hlt,
    /// Mash lauter tun.
    Mlt,
    /// Boil kettle.
    Bk,
    /// Heat exchanger.
    HeatExchanger,
    /// Water pump.
    WaterPump,
    /// Wort pump.
    WortPump,
    /// No component.
    None,
}

impl Location {
    /// Every location, in display order.
    pub const ALL: [Location; 8] = [
        Location::Hlt,
        Location::Mlt,
        Location::Bk,
        Location::HeatExIn,
        Location::HeatExOut,
        Location::WaterPump,
        Location::WortPump,
        Location::None,
    ];

    /// Short upper-case name, also accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Location::Hlt => "HLT",
            Location::Mlt => "MLT",
            Location::Bk => "BK",
            Location::HeatExIn => "HEATEXIN",
            Location::HeatExOut => "HEATEXOUT",
            Location::WaterPump => "WATERPUMP",
            Location::WortPump => "WORTPUMP",
            Location::None => "NONE",
        }
    }

    /// Human readable name.
    pub const fn full_name(self) -> &'static str {
        match self {
            Location::Hlt => "Hot Liquor Tank (HLT)",
            Location::Mlt => "Mash Lauter Tun (MLT)",
            Location::Bk => "Boiling Kettle (BK)",
            Location::HeatExIn => "Heat Exchanger-Water Input (HEATEXIN)",
            Location::HeatExOut => "Heat Exchanger-Wort Output (HEATEXOUT)",
            Location::WaterPump => "Water Pump (WATERPUMP)",
            Location::WortPump => "Wort Pump (WORTPUMP)",
            Location::None => "Unmapped (NONE)",
        }
    }

    /// The plant component this location is part of.
    pub const fn component(self) -> Component {
        match self {
            Location::Hlt => Component::Hlt,
            Location::Mlt => Component::Mlt,
            Location::Bk => Component::Bk,
            Location::HeatExIn | Location::HeatExOut => Component::HeatExchanger,
            Location::WaterPump => Component::WaterPump,
            Location::WortPump => Component::WortPump,
            Location::None => Component::None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no [`Location`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown location {0:?}")]
pub struct ParseLocationError(String);

impl FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Location::ALL
            .into_iter()
            .find(|loc| loc.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLocationError(s.to_owned()))
    }
}
