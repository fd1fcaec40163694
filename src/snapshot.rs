//! Pivot the latest records of each tower into a grid of heights, channels and towers.

use crate::{
    channel::{resolve, ChannelId},
    record::RecordSet,
    station::{Height, LogicalVariable, TableCategory, Tower},
};
use chrono::NaiveDateTime;
use itertools::iproduct;
use serde::Serialize;
use std::fmt::Display;
use strum::IntoEnumIterator;

/// Rendered in place of a reading that is absent.
pub const MISSING: &str = "M";

/// A single entry in the grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Cell {
    Value(f64),
    Missing,
}

impl Cell {
    /// The loggers write NAN and INF for failed readings, treat them as missing.
    pub fn from_reading(reading: Option<f64>) -> Self {
        match reading {
            Some(val) if val.is_finite() => Cell::Value(val),
            _ => Cell::Missing,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Cell::Value(val) => f.pad(&format!("{:.2}", val)),
            Cell::Missing => f.pad(MISSING),
        }
    }
}

/// One channel with a cell for every tower, in tower order.
#[derive(Clone, Debug, Serialize)]
pub struct MatrixRow {
    pub variable: LogicalVariable,
    pub channel: ChannelId,
    pub cells: Vec<Cell>,
}

/// All the rows for one level, ordered by table, then variable, then channel.
#[derive(Clone, Debug, Serialize)]
pub struct HeightGroup {
    pub height: Height,
    pub rows: Vec<MatrixRow>,
}

/// The valid time of the record each tower/table pair contributed, if any.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SourceTime {
    pub tower: Tower,
    pub table: TableCategory,
    pub valid: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SnapshotMatrix {
    pub towers: Vec<Tower>,
    pub groups: Vec<HeightGroup>,
    pub sources: Vec<SourceTime>,
}

impl SnapshotMatrix {
    /// Look up a single cell by channel name and tower.
    pub fn cell(&self, channel: &str, tower: Tower) -> Option<Cell> {
        let col = self.towers.iter().position(|&t| t == tower)?;

        self.groups
            .iter()
            .flat_map(|group| group.rows.iter())
            .find(|row| row.channel.name == channel)
            .map(|row| row.cells[col])
    }

    pub fn num_rows(&self) -> usize {
        self.groups.iter().map(|group| group.rows.len()).sum()
    }
}

/// Build the snapshot from whatever records were found. Pairs without a record render as missing
/// for every one of their channels.
pub fn build_matrix(records: &RecordSet) -> SnapshotMatrix {
    let towers: Vec<Tower> = Tower::iter().collect();

    let groups: Vec<HeightGroup> = Height::iter()
        .map(|height| {
            let rows = TableCategory::iter()
                .flat_map(|table| table.variables().iter())
                .flat_map(|&variable| {
                    resolve(variable, height)
                        .into_iter()
                        .map(move |channel| (variable, channel))
                })
                .map(|(variable, channel)| {
                    let cells = towers
                        .iter()
                        .map(|&tower| {
                            let reading = records
                                .get(&(tower, channel.table))
                                .and_then(|record| record.value(&channel.name));
                            Cell::from_reading(reading)
                        })
                        .collect();

                    MatrixRow {
                        variable,
                        channel,
                        cells,
                    }
                })
                .collect();

            HeightGroup { height, rows }
        })
        .collect();

    let sources = iproduct!(Tower::iter(), TableCategory::iter())
        .map(|(tower, table)| SourceTime {
            tower,
            table,
            valid: records.get(&(tower, table)).map(|record| record.valid),
        })
        .collect();

    SnapshotMatrix {
        towers,
        groups,
        sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use chrono::NaiveDate;

    fn valid() -> NaiveDateTime {
        NaiveDate::from_ymd(2017, 5, 1).and_hms(1, 30, 0)
    }

    fn sample_records() -> RecordSet {
        let mut records = RecordSet::new();
        records.insert(
            (Tower::Hamilton, TableCategory::Analog),
            Record::new(valid())
                .with_value("ws_40m_s", Some(7.0))
                .with_value("ws_40m_nwht", Some(6.987))
                .with_value("airtc_120m_1", Some(-3.14159))
                .with_value("airtc_120m_2", None)
                .with_value("rh_5m", Some(std::f64::NAN)),
        );
        records.insert(
            (Tower::Story, TableCategory::Analog),
            Record::new(valid()).with_value("ws_40m_s", Some(1234.5)),
        );
        records.insert(
            (Tower::Story, TableCategory::Sonic),
            Record::new(valid()).with_value("ux_80m", Some(0.004)),
        );
        records
    }

    #[test]
    fn test_cells_format_with_two_decimals() {
        assert_eq!(Cell::Value(7.0).to_string(), "7.00");
        assert_eq!(Cell::Value(-3.14159).to_string(), "-3.14");
        assert_eq!(Cell::Value(1234.5).to_string(), "1234.50");
        assert_eq!(Cell::Value(0.004).to_string(), "0.00");
        assert_eq!(Cell::Missing.to_string(), "M");
        assert_eq!(Cell::from_reading(Some(std::f64::NAN)), Cell::Missing);
        assert_eq!(Cell::from_reading(None), Cell::Missing);
    }

    #[test]
    fn test_values_land_in_their_cells() {
        let matrix = build_matrix(&sample_records());

        let text = |channel: &str, tower: Tower| matrix.cell(channel, tower).unwrap().to_string();
        assert_eq!(text("ws_40m_s", Tower::Hamilton), "7.00");
        assert_eq!(text("ws_40m_nwht", Tower::Hamilton), "6.99");
        assert_eq!(text("ws_40m_s", Tower::Story), "1234.50");
        assert_eq!(text("airtc_120m_1", Tower::Hamilton), "-3.14");
        assert_eq!(text("airtc_120m_2", Tower::Hamilton), "M");
        assert_eq!(text("rh_5m", Tower::Hamilton), "M");
        assert_eq!(text("ux_80m", Tower::Story), "0.00");
    }

    #[test]
    fn test_missing_record_only_affects_its_tower() {
        let matrix = build_matrix(&sample_records());

        // Hamilton has no sonic record at all.
        for group in &matrix.groups {
            for row in group.rows.iter().filter(|r| r.channel.table == TableCategory::Sonic) {
                assert_eq!(row.cells[0], Cell::Missing, "{}", row.channel);
            }
        }
        assert_eq!(matrix.cell("ux_80m", Tower::Story), Some(Cell::Value(0.004)));
    }

    #[test]
    fn test_empty_records_give_a_complete_matrix() {
        let matrix = build_matrix(&RecordSet::new());

        // 5 sonic + 4 monitor + 6 analog channels per level, 2 extra analog at the top.
        assert_eq!(matrix.num_rows(), 6 * 15 + 2);
        assert!(matrix
            .groups
            .iter()
            .flat_map(|g| g.rows.iter())
            .all(|row| row.cells == vec![Cell::Missing, Cell::Missing]));
        assert!(matrix.sources.iter().all(|s| s.valid.is_none()));
    }

    #[test]
    fn test_rows_follow_height_table_variable_channel_order() {
        let matrix = build_matrix(&RecordSet::new());

        let heights: Vec<u32> = matrix.groups.iter().map(|g| g.height.meters()).collect();
        assert_eq!(heights, vec![120, 80, 40, 20, 10, 5]);

        let top: Vec<&str> = matrix.groups[0]
            .rows
            .iter()
            .map(|r| r.channel.name.as_str())
            .collect();
        assert_eq!(
            top,
            vec![
                "ux_120m",
                "uy_120m",
                "uz_120m",
                "ts_120m",
                "diag_120m",
                "boardtemp_120m",
                "boardhumidity_120m",
                "inclinepitch_120m",
                "inclineroll_120m",
                "ws_120m_s",
                "ws_120m_nwht",
                "winddir_120m_s",
                "winddir_120m_nw",
                "airtc_120m_1",
                "airtc_120m_2",
                "rh_120m_1",
                "rh_120m_2",
            ]
        );
    }

    #[test]
    fn test_sources_report_record_times() {
        let matrix = build_matrix(&sample_records());

        let found: Vec<(Tower, TableCategory)> = matrix
            .sources
            .iter()
            .filter(|s| s.valid == Some(valid()))
            .map(|s| (s.tower, s.table))
            .collect();
        assert_eq!(
            found,
            vec![
                (Tower::Hamilton, TableCategory::Analog),
                (Tower::Story, TableCategory::Sonic),
                (Tower::Story, TableCategory::Analog),
            ]
        );
    }
}
