use crate::{
    channel::ChannelId,
    record::Sample,
    station::Tower,
    TowersError,
};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OpenFlags};
use std::{error::Error, path::Path};

mod latest;

pub use latest::{LatestRecordInterface, LOOKBACK_HOURS};

/// A read only handle on the tower data store. The connection is closed when this is dropped.
///
/// Stored `valid` times may separate date and time with either `T` or a space, so queries
/// compare them through `julianday`.
pub struct TowersDb {
    conn: Connection,
}

impl TowersDb {
    pub fn open(path: &Path) -> Result<Self, Box<dyn Error>> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| TowersError::query(format!("opening {}", path.display()), err))?;

        tracing::debug!("opened tower data store at {}", path.display());

        Ok(TowersDb { conn })
    }

    /// All non-null readings of a channel after `since`, oldest first.
    pub fn samples_since(
        &self,
        tower: Tower,
        channel: &ChannelId,
        since: NaiveDateTime,
    ) -> Result<Vec<Sample>, Box<dyn Error>> {
        let context = || format!("samples of {} at {} since {}", channel, tower, since);

        let mut statement = self
            .conn
            .prepare_cached(&format!(
                include_str!("sql/channel_samples.sql"),
                channel.table.table_name(),
                channel.validated_name()?
            ))
            .map_err(|err| TowersError::query(context(), err))?;

        let data: Vec<(NaiveDateTime, f64)> = statement
            .query_map(params![tower.index(), since], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .and_then(|rows| rows.collect())
            .map_err(|err| TowersError::query(context(), err))?;

        let total = data.len();
        let samples: Vec<Sample> = data
            .into_iter()
            .filter(|(_valid, value)| value.is_finite())
            .map(|(valid, value)| Sample { valid, value })
            .collect();

        if samples.len() < total {
            tracing::warn!(
                "dropped {} non-finite readings of {} at {}",
                total - samples.len(),
                channel,
                tower
            );
        }
        tracing::debug!("{} samples of {} at {}", samples.len(), channel, tower);

        Ok(samples)
    }
}

#[cfg(test)]
impl TowersDb {
    /// An empty, writable store with every table and channel column.
    pub(crate) fn in_memory() -> Self {
        use crate::{channel::table_channels, station::TableCategory};
        use strum::IntoEnumIterator;

        let conn = Connection::open_in_memory().unwrap();

        for table in TableCategory::iter() {
            let columns: Vec<String> = table_channels(table)
                .map(|c| format!(", {} REAL", c.name))
                .collect();
            conn.execute_batch(&format!(
                include_str!("sql/create_table.sql"),
                table.table_name(),
                columns.concat()
            ))
            .unwrap();
        }

        TowersDb { conn }
    }

    pub(crate) fn insert(
        &self,
        table: crate::station::TableCategory,
        tower: Tower,
        valid: NaiveDateTime,
        values: &[(&str, Option<f64>)],
    ) {
        use rusqlite::types::ToSql;

        let columns: String = values.iter().map(|(name, _)| format!(", {}", name)).collect();
        let placeholders: String = (0..values.len()).map(|i| format!(", ?{}", i + 3)).collect();
        let sql = format!(
            "INSERT INTO {} (tower, valid{}) VALUES (?1, ?2{})",
            table.table_name(),
            columns,
            placeholders
        );

        let tower_idx = tower.index();
        let mut args: Vec<&dyn ToSql> = vec![&tower_idx as &dyn ToSql, &valid as &dyn ToSql];
        args.extend(values.iter().map(|(_, val)| val as &dyn ToSql));

        self.conn.execute(&sql, args).unwrap();
    }
}
