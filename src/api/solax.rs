//! [SolaX Cloud](https://global.solaxcloud.com) realtime info client (API v2).

mod response;

use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue, header::CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::Serialize;

use self::response::Response;
use crate::{error::FetchError, prelude::*, telemetry::Snapshot};

pub const DEFAULT_ENDPOINT_URL: &str =
    "https://global.solaxcloud.com/api/v2/dataAccess/realtimeInfo/get";

/// The cloud is known to be picky about unknown agents.
const USER_AGENT: &str = "Mozilla/5.0";

/// Documented as `tokenId`, header names are case-insensitive.
const TOKEN_HEADER: HeaderName = HeaderName::from_static("tokenid");

pub struct Api {
    client: Client,
    endpoint_url: Url,
    timeout: Duration,
}

impl Api {
    pub fn try_new(token: &str, endpoint_url: Url, timeout: Duration) -> Result<Self> {
        let mut token = HeaderValue::from_str(token).context("the token is not a valid header")?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(TOKEN_HEADER, token);
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, endpoint_url, timeout })
    }

    #[instrument(skip_all, fields(serial_number = serial_number))]
    pub async fn get_realtime_info(&self, serial_number: &str) -> Result<Snapshot, FetchError> {
        #[derive(Serialize)]
        struct GetRealtimeInfoRequest<'a> {
            #[serde(rename = "wifiSn")]
            serial_number: &'a str,
        }

        debug!("fetching…");
        let body = self
            .client
            .post(self.endpoint_url.clone())
            .json(&GetRealtimeInfoRequest { serial_number })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| self.classify(error))?
            .bytes()
            .await
            .map_err(|error| self.classify(error))?;
        trace!(body = %String::from_utf8_lossy(&body), "received");
        Response::from_slice(&body)?.into()
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(format!("{:#}", anyhow::Error::from(error)))
        }
    }
}
