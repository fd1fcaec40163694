use crate::station::{TableCategory, Tower};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// One row from a data table: the valid time and every channel column in it.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub valid: NaiveDateTime,
    values: HashMap<String, Option<f64>>,
}

impl Record {
    pub fn new(valid: NaiveDateTime) -> Self {
        Record {
            valid,
            values: HashMap::new(),
        }
    }

    pub fn with_value<S: Into<String>>(mut self, channel: S, value: Option<f64>) -> Self {
        self.values.insert(channel.into(), value);
        self
    }

    pub(crate) fn insert(&mut self, channel: String, value: Option<f64>) {
        self.values.insert(channel, value);
    }

    /// The reading for a channel, if the column exists and is not null.
    pub fn value(&self, channel: &str) -> Option<f64> {
        self.values.get(channel).copied().flatten()
    }

    pub fn num_channels(&self) -> usize {
        self.values.len()
    }
}

/// The latest records for a request. Pairs without a record in the look back window are simply
/// not present.
pub type RecordSet = HashMap<(Tower, TableCategory), Record>;

/// A single reading of one channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub valid: NaiveDateTime,
    pub value: f64,
}
