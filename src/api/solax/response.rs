use serde::Deserialize;
use serde_json::Value;

use crate::{error::FetchError, telemetry::Snapshot};

/// Realtime info response envelope.
///
/// A missing `success` counts as a rejection, same as an explicit `false`.
#[derive(Debug, Deserialize)]
pub struct Response {
    #[serde(default)]
    success: bool,

    #[serde(default)]
    result: Option<Value>,

    #[serde(default)]
    exception: Option<String>,
}

impl Response {
    pub fn from_slice(body: &[u8]) -> Result<Self, FetchError> {
        serde_json::from_slice(body)
            .map_err(|error| FetchError::Parse(format!("malformed response JSON: {error}")))
    }
}

impl From<Response> for Result<Snapshot, FetchError> {
    fn from(response: Response) -> Self {
        if !response.success {
            let message = response
                .exception
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_owned());
            return Err(FetchError::ApiRejected(message));
        }
        match response.result {
            Some(Value::Object(fields)) => Ok(Snapshot::from(fields)),
            Some(other) => Err(FetchError::Parse(format!("`result` is not an object: {other}"))),
            None => Err(FetchError::Parse("`result` is missing".to_owned())),
        }
    }
}
