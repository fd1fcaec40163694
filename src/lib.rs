//! towerstat
//!
//! Summaries of the tall tower network: the latest reading of every instrument on every tower,
//! and per-minute gust statistics from the raw 1 Hz cup anemometer data.
//!

//
// Public API
//
pub use crate::{
    aggregate::{
        channel_trend, gust_report, gust_statistics, minute_means, rolling_means, GustRow,
        MinuteMean, GUST_WINDOW_PRECEDING, MAX_GUST_ROWS,
    },
    channel::{resolve, resolve_names, table_channels, ChannelId},
    config::Config,
    error::TowersError,
    record::{Record, RecordSet, Sample},
    snapshot::{build_matrix, Cell, HeightGroup, MatrixRow, SnapshotMatrix, SourceTime, MISSING},
    station::{Height, LogicalVariable, TableCategory, Tower},
    towers_db::{LatestRecordInterface, TowersDb, LOOKBACK_HOURS},
};

//
// Private implementation.
//
mod aggregate;
mod channel;
mod config;
mod error;
mod record;
mod snapshot;
mod station;
mod towers_db;
