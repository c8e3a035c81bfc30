use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FetchError;

/// Telemetry fields of one successful fetch, keyed by the SolaX field name.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Serialize, derive_more::Deref, derive_more::From)]
pub struct Snapshot(Map<String, Value>);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Uninitialized,

    Ok,

    Error(String),
}

impl Display for FetchStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("pending"),
            Self::Ok => f.write_str("OK"),
            Self::Error(message) => f.write_str(message),
        }
    }
}

/// Everything a reader may look at, published as one unit.
///
/// A reader always sees the snapshot together with the status of the same
/// refresh cycle.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct Observation {
    pub snapshot: Arc<Snapshot>,
    pub status: FetchStatus,

    /// Time of the last successful fetch.
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl Observation {
    pub const fn succeeded(snapshot: Arc<Snapshot>, at: DateTime<Utc>) -> Self {
        Self { snapshot, status: FetchStatus::Ok, last_updated_at: Some(at) }
    }

    /// Keep the previous data, only the status changes.
    pub fn failed(&self, error: &FetchError) -> Self {
        Self {
            snapshot: Arc::clone(&self.snapshot),
            status: FetchStatus::Error(error.to_string()),
            last_updated_at: self.last_updated_at,
        }
    }
}
