use super::TowersDb;
use crate::{
    record::{Record, RecordSet},
    station::{TableCategory, Tower},
    TowersError,
};
use chrono::{Duration, NaiveDateTime};
use itertools::iproduct;
use rusqlite::{params, Statement};
use std::error::Error;
use strum::IntoEnumIterator;

/// How far back to look for the most recent record.
pub const LOOKBACK_HOURS: i64 = 6;

/// Creates and caches one statement per table for finding the most recent record of a tower.
pub struct LatestRecordInterface<'a, 'b: 'a> {
    towers_db: &'b TowersDb,
    statements: [Option<Statement<'a>>; TableCategory::NUM_VARIANTS],
}

impl<'a, 'b> LatestRecordInterface<'a, 'b> {
    pub fn initialize(towers_db: &'b TowersDb) -> Self {
        Self {
            towers_db,
            statements: [None, None, None],
        }
    }

    fn get_statement(
        &mut self,
        table: TableCategory,
        tower: Tower,
    ) -> Result<&mut Statement<'a>, TowersError> {
        let opt = &mut self.statements[table.into_index()];

        let statement = match opt.take() {
            Some(statement) => statement,
            None => self
                .towers_db
                .conn
                .prepare(&format!(
                    include_str!("../sql/latest_record.sql"),
                    table.table_name()
                ))
                .map_err(|err| {
                    TowersError::query(format!("latest {} record for {}", table, tower), err)
                })?,
        };

        Ok(opt.get_or_insert(statement))
    }

    /// The most recent record of `table` for `tower` within `LOOKBACK_HOURS` of `now`, or `None`
    /// if the tower has not reported in that window.
    pub fn latest_record(
        &mut self,
        table: TableCategory,
        tower: Tower,
        now: NaiveDateTime,
    ) -> Result<Option<Record>, Box<dyn Error>> {
        let since = now - Duration::hours(LOOKBACK_HOURS);
        let context = || format!("latest {} record for {} since {}", table, tower, since);

        let statement = self.get_statement(table, tower)?;
        let columns: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut rows = statement
            .query(params![tower.index(), since])
            .map_err(|err| TowersError::query(context(), err))?;

        let row = match rows.next().map_err(|err| TowersError::query(context(), err))? {
            Some(row) => row,
            None => {
                tracing::debug!("no {} record for {} since {}", table, tower, since);
                return Ok(None);
            }
        };

        let valid_idx = columns
            .iter()
            .position(|name| name == "valid")
            .ok_or_else(|| TowersError::InvalidChannel(format!("{}.valid", table.table_name())))?;
        let valid: NaiveDateTime = row
            .get(valid_idx)
            .map_err(|err| TowersError::query(context(), err))?;

        let mut record = Record::new(valid);
        for (idx, name) in columns.into_iter().enumerate() {
            if name == "tower" || name == "valid" {
                continue;
            }

            let value: Option<f64> = row
                .get(idx)
                .map_err(|err| TowersError::query(format!("{} ({})", context(), name), err))?;
            record.insert(name, value);
        }

        tracing::debug!(
            "{} record for {} valid at {} with {} channels",
            table,
            tower,
            valid,
            record.num_channels()
        );

        Ok(Some(record))
    }

    /// Fetch the latest record of every table for every tower.
    pub fn latest_records(&mut self, now: NaiveDateTime) -> Result<RecordSet, Box<dyn Error>> {
        let mut records = RecordSet::new();

        for (tower, table) in iproduct!(Tower::iter(), TableCategory::iter()) {
            if let Some(record) = self.latest_record(table, tower, now)? {
                records.insert((tower, table), record);
            }
        }

        tracing::info!(
            "found {} of {} latest records",
            records.len(),
            Tower::iter().count() * TableCategory::NUM_VARIANTS
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd(2018, 6, 1).and_hms(18, 0, 0)
    }

    #[test]
    fn test_most_recent_record_is_returned() {
        let db = TowersDb::in_memory();
        for (mins, val) in &[(-30, 1.0), (-5, 2.0), (-60, 3.0)] {
            db.insert(
                TableCategory::Monitor,
                Tower::Story,
                now() + Duration::minutes(*mins),
                &[("boardtemp_5m", Some(*val))],
            );
        }

        let mut query = LatestRecordInterface::initialize(&db);
        let record = query
            .latest_record(TableCategory::Monitor, Tower::Story, now())
            .unwrap()
            .unwrap();

        assert_eq!(record.valid, now() - Duration::minutes(5));
        assert_eq!(record.value("boardtemp_5m"), Some(2.0));
        assert_eq!(record.value("boardtemp_10m"), None);
        assert_eq!(record.value("tower"), None);
    }

    #[test]
    fn test_records_older_than_the_window_are_absent() {
        let db = TowersDb::in_memory();
        db.insert(
            TableCategory::Sonic,
            Tower::Hamilton,
            now() - Duration::hours(LOOKBACK_HOURS) - Duration::seconds(1),
            &[("ux_5m", Some(1.0))],
        );
        db.insert(
            TableCategory::Sonic,
            Tower::Story,
            now() - Duration::hours(LOOKBACK_HOURS) + Duration::seconds(1),
            &[("ux_5m", Some(1.0))],
        );

        let mut query = LatestRecordInterface::initialize(&db);
        assert!(query
            .latest_record(TableCategory::Sonic, Tower::Hamilton, now())
            .unwrap()
            .is_none());
        assert!(query
            .latest_record(TableCategory::Sonic, Tower::Story, now())
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_latest_records_skips_silent_towers() {
        let db = TowersDb::in_memory();
        db.insert(
            TableCategory::Analog,
            Tower::Hamilton,
            now() - Duration::minutes(1),
            &[("ws_5m_s", Some(4.25))],
        );

        let mut query = LatestRecordInterface::initialize(&db);
        let records = query.latest_records(now()).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[&(Tower::Hamilton, TableCategory::Analog)];
        assert_eq!(record.value("ws_5m_s"), Some(4.25));
    }

    #[test]
    fn test_integer_columns_read_as_floats() {
        let db = TowersDb::in_memory();
        db.conn
            .execute(
                "INSERT INTO data_sonic (tower, valid, diag_10m) VALUES (?1, ?2, 64)",
                params![Tower::Story.index(), now() - Duration::minutes(1)],
            )
            .unwrap();

        let mut query = LatestRecordInterface::initialize(&db);
        let record = query
            .latest_record(TableCategory::Sonic, Tower::Story, now())
            .unwrap()
            .unwrap();
        assert_eq!(record.value("diag_10m"), Some(64.0));
    }

    #[test]
    fn test_space_separated_times_are_inside_the_window() {
        let db = TowersDb::in_memory();
        db.conn
            .execute(
                "INSERT INTO data_monitor (tower, valid, boardtemp_5m) VALUES (1, '2018-06-01 17:55:00', 2.0)",
                params![],
            )
            .unwrap();

        let mut query = LatestRecordInterface::initialize(&db);
        let record = query
            .latest_record(TableCategory::Monitor, Tower::Story, now())
            .unwrap()
            .unwrap();

        assert_eq!(record.valid, now() - Duration::minutes(5));
        assert_eq!(record.value("boardtemp_5m"), Some(2.0));
    }

    #[test]
    fn test_mixed_time_formats_order_chronologically() {
        let db = TowersDb::in_memory();
        // Written with a 'T' separator, older than the row below.
        db.insert(
            TableCategory::Analog,
            Tower::Hamilton,
            now() - Duration::minutes(10),
            &[("ws_5m_s", Some(1.0))],
        );
        db.conn
            .execute(
                "INSERT INTO data_analog (tower, valid, ws_5m_s) VALUES (0, '2018-06-01 17:58:30', 3.0)",
                params![],
            )
            .unwrap();

        let mut query = LatestRecordInterface::initialize(&db);
        let record = query
            .latest_record(TableCategory::Analog, Tower::Hamilton, now())
            .unwrap()
            .unwrap();

        assert_eq!(record.valid, NaiveDate::from_ymd(2018, 6, 1).and_hms(17, 58, 30));
        assert_eq!(record.value("ws_5m_s"), Some(3.0));
    }

    #[test]
    fn test_prepare_failure_names_table_and_tower() {
        let db = TowersDb::in_memory();
        db.conn.execute_batch("DROP TABLE data_sonic").unwrap();

        let mut query = LatestRecordInterface::initialize(&db);
        let err = query
            .latest_record(TableCategory::Sonic, Tower::Story, now())
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("sonic"), "{}", msg);
        assert!(msg.contains("story"), "{}", msg);
        assert!(err.source().is_some());
    }
}
