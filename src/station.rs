//! The fixed universe of the tower network: towers, instrumented heights, instrument tables and
//! the variables each table records.

use crate::TowersError;
use serde::Serialize;
use std::{convert::TryFrom, fmt::Display, str::FromStr};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// A measurement tower.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tower {
    #[strum(serialize = "hamilton")]
    Hamilton = 0,
    #[strum(serialize = "story")]
    Story = 1,
}

impl Tower {
    /// The value stored in the `tower` column of every data table.
    pub fn index(self) -> i64 {
        self as i64
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn from_index(index: i64) -> Option<Self> {
        Tower::iter().find(|tower| tower.index() == index)
    }
}

impl Display for Tower {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.pad(self.name())
    }
}

/// Accepts either the canonical name or the ordinal.
impl FromStr for Tower {
    type Err = TowersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        Tower::iter()
            .find(|tower| tower.name() == s)
            .or_else(|| s.parse::<i64>().ok().and_then(Tower::from_index))
            .ok_or(TowersError::UnknownTower(s))
    }
}

/// Instrumented levels on each tower, in meters above ground. Declared top down, which is the
/// order they are displayed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, Serialize)]
#[serde(into = "u32")]
pub enum Height {
    M120,
    M80,
    M40,
    M20,
    M10,
    M5,
}

impl Height {
    pub fn meters(self) -> u32 {
        use Height::*;

        match self {
            M120 => 120,
            M80 => 80,
            M40 => 40,
            M20 => 20,
            M10 => 10,
            M5 => 5,
        }
    }
}

impl From<Height> for u32 {
    fn from(height: Height) -> u32 {
        height.meters()
    }
}

impl TryFrom<u32> for Height {
    type Error = TowersError;

    fn try_from(meters: u32) -> Result<Self, Self::Error> {
        Height::iter()
            .find(|height| height.meters() == meters)
            .ok_or(TowersError::UnknownHeight(meters))
    }
}

impl Display for Height {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.pad(&format!("{}m", self.meters()))
    }
}

/// The instrument families, each logged to its own table.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TableCategory {
    #[strum(serialize = "sonic")]
    Sonic,
    #[strum(serialize = "monitor")]
    Monitor,
    #[strum(serialize = "analog")]
    Analog,
}

impl TableCategory {
    pub(crate) const NUM_VARIANTS: usize = 3;

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub(crate) fn table_name(self) -> &'static str {
        match self {
            TableCategory::Sonic => "data_sonic",
            TableCategory::Monitor => "data_monitor",
            TableCategory::Analog => "data_analog",
        }
    }

    pub(crate) fn into_index(self) -> usize {
        self as usize
    }

    /// Variables this table records at every height, in display order.
    pub fn variables(self) -> &'static [LogicalVariable] {
        use LogicalVariable::*;

        match self {
            TableCategory::Sonic => &[Ux, Uy, Uz, Ts, Diag],
            TableCategory::Monitor => &[BoardTemp, BoardHumidity, InclinePitch, InclineRoll],
            TableCategory::Analog => &[Ws, WindDir, AirTc, Rh],
        }
    }
}

impl Display for TableCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.pad(self.name())
    }
}

/// A measured quantity, independent of which sensor and column hold it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalVariable {
    #[strum(serialize = "ux")]
    Ux,
    #[strum(serialize = "uy")]
    Uy,
    #[strum(serialize = "uz")]
    Uz,
    #[strum(serialize = "ts")]
    Ts,
    #[strum(serialize = "diag")]
    Diag,
    #[strum(serialize = "boardtemp")]
    BoardTemp,
    #[strum(serialize = "boardhumidity")]
    BoardHumidity,
    #[strum(serialize = "inclinepitch")]
    InclinePitch,
    #[strum(serialize = "inclineroll")]
    InclineRoll,
    #[strum(serialize = "ws")]
    Ws,
    #[strum(serialize = "winddir")]
    WindDir,
    #[strum(serialize = "airtc")]
    AirTc,
    #[strum(serialize = "rh")]
    Rh,
}

impl LogicalVariable {
    /// The prefix of every column holding this variable.
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn table(self) -> TableCategory {
        TableCategory::iter()
            .find(|table| table.variables().contains(&self))
            .unwrap_or_else(|| unreachable!("{:?} is not assigned to a table", self))
    }

    /// Parse a variable name, failing on anything outside the recorded set.
    pub fn parse(name: &str) -> Result<Self, TowersError> {
        let lower = name.trim().to_lowercase();
        LogicalVariable::from_str(&lower).map_err(|_| TowersError::UnknownVariable(lower))
    }
}

impl Display for LogicalVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.pad(self.name())
    }
}
