//! SMS gateway configuration.

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ConfigError;

/// Twilio-style gateway settings. When disabled, or when credentials are
/// incomplete, the engine falls back to the demo channel.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Master switch for real SMS delivery.
    pub enabled: bool,
    pub account_sid: Option<String>,
    /// Never logged; `SecretString` redacts it from Debug output.
    pub auth_token: Option<SecretString>,
    /// E.164 sender number.
    pub from_number: Option<String>,
    pub base_url: String,
    pub send_timeout_secs: u64,
    /// Total send tries per message, including the first.
    pub max_attempts: u32,
    /// Pause between retries of a transient failure.
    pub retry_delay_ms: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            account_sid: None,
            auth_token: None,
            from_number: None,
            base_url: "https://api.twilio.com".to_string(),
            send_timeout_secs: 10,
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl SmsConfig {
    /// True when every credential needed for real delivery is present.
    pub fn has_credentials(&self) -> bool {
        self.account_sid.is_some() && self.auth_token.is_some() && self.from_number.is_some()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "sms.max_attempts",
                "must be at least 1",
            ));
        }
        if self.send_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "sms.send_timeout_secs",
                "must be at least 1",
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("sms.base_url", "must not be empty"));
        }
        Ok(())
    }
}
