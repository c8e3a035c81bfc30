use std::fmt::{Debug, Formatter};

use crate::error::ConfigError;

/// SolaX Cloud token and the Wi-Fi dongle serial number it is used for.
#[derive(Clone)]
pub struct Credentials {
    token: String,
    serial_number: String,
}

impl Credentials {
    /// Both values are trimmed and must remain non-empty.
    pub fn try_new(
        token: impl Into<String>,
        serial_number: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let token = token.into().trim().to_owned();
        if token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        let serial_number = serial_number.into().trim().to_owned();
        if serial_number.is_empty() {
            return Err(ConfigError::EmptySerialNumber);
        }
        Ok(Self { token, serial_number })
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("serial_number", &self.serial_number)
            .finish()
    }
}
