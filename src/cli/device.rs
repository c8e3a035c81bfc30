use std::{sync::Arc, time::Duration};

use clap::Parser;
use reqwest::Url;

use crate::{
    api::solax::{self, DEFAULT_ENDPOINT_URL},
    coordinator::Coordinator,
    credentials::Credentials,
    prelude::*,
};

#[derive(Parser)]
pub struct DeviceArgs {
    /// SolaX Cloud API token («tokenId»).
    #[clap(long = "token", env = "SOLAX_TOKEN_ID", hide_env_values = true)]
    pub token: String,

    /// Wi-Fi dongle serial number, also called «registration number».
    #[clap(long, alias = "wifi-sn", env = "SOLAX_WIFI_SN")]
    pub serial_number: String,

    #[clap(long, env = "SOLAX_ENDPOINT_URL", default_value = DEFAULT_ENDPOINT_URL)]
    pub endpoint_url: Url,

    /// Deadline for a single refresh.
    #[clap(long, env = "SOLAX_FETCH_TIMEOUT", default_value = "10s")]
    pub fetch_timeout: humantime::Duration,
}

impl DeviceArgs {
    pub fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials::try_new(self.token.as_str(), self.serial_number.as_str())?)
    }

    pub fn api(&self, credentials: &Credentials) -> Result<solax::Api> {
        solax::Api::try_new(credentials.token(), self.endpoint_url.clone(), self.fetch_timeout())
    }

    #[instrument(skip_all)]
    pub fn coordinator(&self) -> Result<Arc<Coordinator>> {
        let credentials = self.credentials()?;
        info!(serial_number = credentials.serial_number(), endpoint_url = %self.endpoint_url, "configured");
        let coordinator = Coordinator::builder()
            .fetcher(self.api(&credentials)?)
            .serial_number(credentials.serial_number())
            .timeout(self.fetch_timeout())
            .build();
        Ok(Arc::new(coordinator))
    }

    fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[derive(Parser)]
    struct TestArgs {
        #[clap(flatten)]
        device: DeviceArgs,
    }

    #[test]
    fn defaults_ok() -> Result {
        let args = TestArgs::try_parse_from(["test", "--token", "abc", "--serial-number", "XYZ123"])?;
        assert_eq!(args.device.endpoint_url.as_str(), DEFAULT_ENDPOINT_URL);
        assert_eq!(args.device.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(args.device.credentials()?.serial_number(), "XYZ123");
        Ok(())
    }

    #[test]
    fn empty_serial_number_refused() -> Result {
        let args = TestArgs::try_parse_from(["test", "--token", "abc", "--serial-number", ""])?;
        let error = args.device.coordinator().err().context("must fail")?;
        assert_eq!(error.downcast_ref::<ConfigError>(), Some(&ConfigError::EmptySerialNumber));
        Ok(())
    }
}
