//! Twilio REST gateway adapter.
//!
//! Failure classification drives the dispatcher's retry behavior: rate
//! limits, gateway 5xx, and network timeouts are transient; every other API
//! rejection is permanent and carries the gateway error code.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::delivery::{DeliveryStatus, StatusUpdate};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ChannelError, DispatchReceipt, OutboundChannel};

use super::normalize_number;

pub struct TwilioChannel {
    http: reqwest::Client,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    status: String,
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

impl TwilioChannel {
    pub fn new(
        account_sid: String,
        auth_token: SecretString,
        from_number: String,
        base_url: String,
        send_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(send_timeout)
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to build SMS HTTP client: {e}"),
                )
            })?;
        Ok(Self {
            http,
            account_sid,
            auth_token,
            from_number,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }

    fn message_url(&self, external_id: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages/{}.json",
            self.base_url, self.account_sid, external_id
        )
    }
}

#[async_trait]
impl OutboundChannel for TwilioChannel {
    async fn send(&self, to: &str, body: &str) -> Result<DispatchReceipt, ChannelError> {
        let destination = normalize_number(to);
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[
                ("To", destination.as_str()),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if status.is_success() {
            let resource: MessageResource = response
                .json()
                .await
                .map_err(|e| ChannelError::Transient(format!("malformed gateway response: {e}")))?;
            debug!(sid = %resource.sid, status = %resource.status, "SMS accepted by gateway");
            return Ok(DispatchReceipt {
                status: map_status(&resource.status),
                external_id: resource.sid,
            });
        }

        let api_error = response.json::<ApiErrorBody>().await.ok();
        let err = classify_http_failure(status, api_error);
        warn!(to = %destination, %status, error = %err, "SMS send failed");
        Err(err)
    }

    async fn fetch_status(&self, external_id: &str) -> Result<StatusUpdate, ChannelError> {
        let response = self
            .http
            .get(self.message_url(external_id))
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if status.is_success() {
            let resource: MessageResource = response
                .json()
                .await
                .map_err(|e| ChannelError::Transient(format!("malformed gateway response: {e}")))?;
            return Ok(StatusUpdate {
                status: map_status(&resource.status),
                error_code: resource.error_code.map(|c| c.to_string()),
            });
        }

        let api_error = response.json::<ApiErrorBody>().await.ok();
        Err(classify_http_failure(status, api_error))
    }

    fn channel_name(&self) -> &'static str {
        "sms"
    }
}

fn classify_request_error(err: reqwest::Error) -> ChannelError {
    // Timeouts, connection resets, and DNS failures are all worth a retry.
    ChannelError::Transient(err.to_string())
}

fn classify_http_failure(status: StatusCode, body: Option<ApiErrorBody>) -> ChannelError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return ChannelError::Transient(format!("gateway returned {status}"));
    }
    let (code, message) = match body {
        Some(body) => (
            body.code
                .map(|c| c.to_string())
                .unwrap_or_else(|| status.as_u16().to_string()),
            body.message
                .unwrap_or_else(|| "gateway rejected the message".to_string()),
        ),
        None => (
            status.as_u16().to_string(),
            "gateway rejected the message".to_string(),
        ),
    };
    ChannelError::Permanent { code, message }
}

/// Maps gateway status strings onto the delivery lifecycle.
fn map_status(raw: &str) -> DeliveryStatus {
    match raw {
        "queued" | "accepted" | "scheduled" => DeliveryStatus::Queued,
        "sending" | "sent" => DeliveryStatus::Sent,
        "delivered" | "read" => DeliveryStatus::Delivered,
        "undelivered" => DeliveryStatus::Undelivered,
        "failed" | "canceled" => DeliveryStatus::Failed,
        _ => DeliveryStatus::Sent,
    }
}
