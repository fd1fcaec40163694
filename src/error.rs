use std::{error::Error, fmt::Display};

/// Errors raised by towerstat.
#[derive(Debug)]
pub enum TowersError {
    /// Not one of the towers in the network.
    UnknownTower(String),
    /// Not one of the instrumented heights.
    UnknownHeight(u32),
    /// Not a variable recorded by any of the instrument tables.
    UnknownVariable(String),
    /// A column name that cannot be placed into a query.
    InvalidChannel(String),
    /// The store failed while running a query.
    Query {
        context: String,
        source: rusqlite::Error,
    },
    /// Bad or unreadable settings.
    Config(String),
}

impl Display for TowersError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use TowersError::*;

        match self {
            UnknownTower(name) => write!(f, "unknown tower: {}", name),
            UnknownHeight(height) => write!(f, "no instruments at height {}m", height),
            UnknownVariable(name) => write!(f, "unknown variable: {}", name),
            InvalidChannel(name) => write!(f, "invalid channel identifier: {}", name),
            Query { context, .. } => write!(f, "query failed for {}", context),
            Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl Error for TowersError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TowersError::Query { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl TowersError {
    /// Wrap a store error with a description of what was being queried.
    pub fn query<S: Into<String>>(context: S, source: rusqlite::Error) -> Self {
        TowersError::Query {
            context: context.into(),
            source,
        }
    }
}
