//! Map a logical variable at a height onto the column(s) that actually hold its data.
//!
//! The wiring on the towers is not uniform. Cup anemometers and vanes are mounted in pairs on
//! booms pointing south (`_s`) and north west (`_nw`), and the north west cups at 10, 40 and
//! 120 meters are heated (`_nwht`). The top level carries two temperature/humidity probes.
use crate::{
    station::{Height, LogicalVariable, TableCategory},
    TowersError,
};
use serde::Serialize;
use std::{convert::TryFrom, fmt::Display};

/// A column in one of the data tables.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChannelId {
    pub table: TableCategory,
    pub name: String,
}

impl ChannelId {
    pub fn new<S: Into<String>>(table: TableCategory, name: S) -> Self {
        ChannelId {
            table,
            name: name.into(),
        }
    }

    /// Column names are placed directly in SQL text, so only allow what the loggers produce.
    pub(crate) fn validated_name(&self) -> Result<&str, TowersError> {
        let ok = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if ok {
            Ok(&self.name)
        } else {
            Err(TowersError::InvalidChannel(self.name.clone()))
        }
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}.{}", self.table.table_name(), self.name)
    }
}

/// How the columns for a variable are named at a given height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wiring {
    /// `{var}_{h}m`
    Single,
    /// `{var}_{h}m_s` and `{var}_{h}m_nw{suffix}`
    Booms { nw_suffix: &'static str },
    /// `{var}_{h}m_1` and `{var}_{h}m_2`
    DualProbe,
}

/// Heights with a heated north west cup anemometer.
const HEATED_CUP_HEIGHTS: [Height; 3] = [Height::M10, Height::M40, Height::M120];

fn wiring(variable: LogicalVariable, height: Height) -> Wiring {
    use LogicalVariable::*;

    match (variable, height) {
        (Ws, h) if HEATED_CUP_HEIGHTS.contains(&h) => Wiring::Booms { nw_suffix: "ht" },
        (Ws, _) => Wiring::Booms { nw_suffix: "" },
        (WindDir, _) => Wiring::Booms { nw_suffix: "" },
        (AirTc, Height::M120) | (Rh, Height::M120) => Wiring::DualProbe,
        _ => Wiring::Single,
    }
}

/// Resolve a variable at a height into one or two channels, in display order.
pub fn resolve(variable: LogicalVariable, height: Height) -> Vec<ChannelId> {
    let table = variable.table();
    let base = format!("{}_{}m", variable.name(), height.meters());

    match wiring(variable, height) {
        Wiring::Single => vec![ChannelId::new(table, base)],
        Wiring::Booms { nw_suffix } => vec![
            ChannelId::new(table, format!("{}_s", base)),
            ChannelId::new(table, format!("{}_nw{}", base, nw_suffix)),
        ],
        Wiring::DualProbe => vec![
            ChannelId::new(table, format!("{}_1", base)),
            ChannelId::new(table, format!("{}_2", base)),
        ],
    }
}

/// Resolve from user supplied names. Anything outside the instrumented set is an error.
pub fn resolve_names(variable: &str, height: u32) -> Result<Vec<ChannelId>, TowersError> {
    let variable = LogicalVariable::parse(variable)?;
    let height = Height::try_from(height)?;

    Ok(resolve(variable, height))
}

/// Every channel the snapshot covers for a table, top level first.
pub fn table_channels(table: TableCategory) -> impl Iterator<Item = ChannelId> {
    use strum::IntoEnumIterator;

    Height::iter().flat_map(move |height| {
        table
            .variables()
            .iter()
            .flat_map(move |&var| resolve(var, height))
    })
}
