use std::env;
use std::time::Duration;

use crate::soap::SoapConfig;
use crate::soap::client::DEFAULT_CONTENT_TYPE;

pub const DEFAULT_API_URL: &str = "https://ns1.hosttech.eu/public/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
/// Header entry the API sets to `true` when the credentials were accepted.
pub const AUTH_ACKNOWLEDGEMENT: &str = "authenticateResponse";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    pub content_type: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        Config {
            api_url: lookup("HOSTTECH_API_URL").unwrap_or(defaults.api_url),
            timeout: lookup("HOSTTECH_TIMEOUT")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            content_type: lookup("HOSTTECH_CONTENT_TYPE").unwrap_or(defaults.content_type),
        }
    }

    /// The API URL doubles as the SOAP namespace.
    pub fn soap_config(&self) -> SoapConfig {
        let mut soap = SoapConfig::new(self.api_url.as_str());
        soap.content_type = self.content_type.clone();
        soap.auth_acknowledgement = Some(AUTH_ACKNOWLEDGEMENT.to_string());
        soap
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: String::from(DEFAULT_API_URL),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            content_type: String::from(DEFAULT_CONTENT_TYPE),
        }
    }
}
