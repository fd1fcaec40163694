//! Per-minute statistics over the raw 1 Hz readings of a channel.

use crate::{
    channel::ChannelId,
    record::Sample,
    station::Tower,
    towers_db::TowersDb,
};
use chrono::{NaiveDateTime, Timelike};
use itertools::Itertools;
use serde::Serialize;
use std::error::Error;

/// At most four hours of one minute buckets are reported.
pub const MAX_GUST_ROWS: usize = 240;

/// Readings before the current one that are averaged into its gust value.
///
/// This is a stand-in for a 3 second average: the window slides across minute boundaries and
/// is never reset, so it is not a true per-minute gust.
pub const GUST_WINDOW_PRECEDING: usize = 3;

/// Statistics of one minute of readings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GustRow {
    /// Start of the minute.
    pub minute: NaiveDateTime,
    pub mean: f64,
    /// Sample standard deviation, undefined for a single reading.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    /// Largest rolling window mean that ended in this minute.
    pub max_gust: f64,
    pub count: usize,
}

/// Mean of one minute of readings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MinuteMean {
    pub minute: NaiveDateTime,
    pub mean: f64,
    pub count: usize,
}

fn minute_of(valid: NaiveDateTime) -> NaiveDateTime {
    valid.date().and_hms(valid.hour(), valid.minute(), 0)
}

/// Trailing mean of every reading and up to `GUST_WINDOW_PRECEDING` readings before it.
pub fn rolling_means(samples: &[Sample]) -> Vec<f64> {
    (0..samples.len())
        .map(|i| {
            let window = &samples[i.saturating_sub(GUST_WINDOW_PRECEDING)..=i];
            window.iter().map(|s| s.value).sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Bucket the samples by minute and summarize each bucket. Samples must be in ascending time
/// order, as returned by `TowersDb::samples_since`.
pub fn gust_statistics(samples: &[Sample]) -> Vec<GustRow> {
    debug_assert!(samples.windows(2).all(|pair| pair[0].valid <= pair[1].valid));

    let gusts = rolling_means(samples);

    let buckets = samples
        .iter()
        .zip(gusts.iter())
        .group_by(|(sample, _gust)| minute_of(sample.valid));

    let mut rows = Vec::with_capacity(MAX_GUST_ROWS.min(samples.len()));
    for (minute, bucket) in &buckets {
        if rows.len() == MAX_GUST_ROWS {
            break;
        }

        let (values, window_means): (Vec<f64>, Vec<f64>) =
            bucket.map(|(sample, gust)| (sample.value, *gust)).unzip();

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std_dev = if count > 1 {
            let sum_sq: f64 = values.iter().map(|val| (val - mean).powi(2)).sum();
            Some((sum_sq / (count - 1) as f64).sqrt())
        } else {
            None
        };

        rows.push(GustRow {
            minute,
            mean,
            std_dev,
            min: values.iter().copied().fold(std::f64::INFINITY, f64::min),
            max: values.iter().copied().fold(std::f64::NEG_INFINITY, f64::max),
            max_gust: window_means
                .iter()
                .copied()
                .fold(std::f64::NEG_INFINITY, f64::max),
            count,
        });
    }

    rows
}

/// One minute averages of a channel, ascending.
pub fn minute_means(samples: &[Sample]) -> Vec<MinuteMean> {
    let buckets = samples.iter().group_by(|sample| minute_of(sample.valid));

    let mut means = vec![];
    for (minute, bucket) in &buckets {
        let (sum, count) = bucket.fold((0.0, 0), |(sum, count), s| (sum + s.value, count + 1));
        means.push(MinuteMean {
            minute,
            mean: sum / count as f64,
            count,
        });
    }

    means
}

/// Gust statistics for a channel on a tower from the readings after `since`.
pub fn gust_report(
    towers_db: &TowersDb,
    tower: Tower,
    channel: &ChannelId,
    since: NaiveDateTime,
) -> Result<Vec<GustRow>, Box<dyn Error>> {
    let samples = towers_db.samples_since(tower, channel, since)?;
    let rows = gust_statistics(&samples);

    tracing::info!(
        "{} gust rows for {} at {} from {} samples",
        rows.len(),
        channel,
        tower,
        samples.len()
    );

    Ok(rows)
}

/// One minute means of several channels on a tower from the readings after `since`.
pub fn channel_trend(
    towers_db: &TowersDb,
    tower: Tower,
    channels: &[ChannelId],
    since: NaiveDateTime,
) -> Result<Vec<(ChannelId, Vec<MinuteMean>)>, Box<dyn Error>> {
    channels
        .iter()
        .map(|channel| {
            let samples = towers_db.samples_since(tower, channel, since)?;
            Ok((channel.clone(), minute_means(&samples)))
        })
        .collect()
}
