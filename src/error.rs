use std::time::Duration;

use thiserror::Error;

/// Invalid startup configuration: the bridge refuses to start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("the SolaX Cloud token must not be empty")]
    EmptyToken,

    #[error("the device serial number must not be empty")]
    EmptySerialNumber,

    #[error("the polling interval must be positive")]
    ZeroPollingInterval,
}

/// Failed refresh.
///
/// None of these are fatal: the coordinator records them into the status and
/// keeps serving the last good snapshot until the next tick.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    /// The vendor answered with `success = false`.
    ///
    /// Displayed as the bare vendor message, so that the status entity shows
    /// exactly what SolaX said.
    #[error("{0}")]
    ApiRejected(String),

    #[error("unexpected response: {0}")]
    Parse(String),
}
