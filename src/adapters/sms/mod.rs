//! Outbound SMS adapters: the real Twilio-style gateway and the demo
//! fallback.

mod demo;
mod twilio;

pub use demo::DemoChannel;
pub use twilio::TwilioChannel;

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{FeatureFlags, SmsConfig};
use crate::domain::foundation::DomainError;
use crate::ports::OutboundChannel;

/// Selects the delivery channel from configuration.
///
/// Falls back to the demo channel when SMS is disabled, demo delivery is
/// forced, or gateway credentials are incomplete. Missing credentials are
/// never an error at startup; the engine runs, it just doesn't touch the
/// real gateway.
pub fn build_channel(
    sms: &SmsConfig,
    features: &FeatureFlags,
) -> Result<Arc<dyn OutboundChannel>, DomainError> {
    let (sid, token, from) = match (&sms.account_sid, &sms.auth_token, &sms.from_number) {
        (Some(sid), Some(token), Some(from))
            if sms.enabled && !features.force_demo_delivery =>
        {
            (sid, token, from)
        }
        _ => {
            info!(
                enabled = sms.enabled,
                forced = features.force_demo_delivery,
                credentials = sms.has_credentials(),
                "using demo delivery channel"
            );
            return Ok(Arc::new(DemoChannel::new()));
        }
    };

    let channel = TwilioChannel::new(
        sid.clone(),
        token.clone(),
        from.clone(),
        sms.base_url.clone(),
        Duration::from_secs(sms.send_timeout_secs),
    )?;
    info!(from_number = %from, "using SMS gateway delivery channel");
    Ok(Arc::new(channel))
}

/// Normalizes a destination number to E.164, assuming the default region
/// for bare 10-digit numbers.
pub(crate) fn normalize_number(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if cleaned.starts_with('+') {
        return cleaned;
    }
    if cleaned.len() == 10 {
        return format!("+91{cleaned}");
    }
    if cleaned.len() == 12 && cleaned.starts_with("91") {
        return format!("+{cleaned}");
    }
    format!("+{cleaned}")
}
