//! Exotel SMS delivery.
//!
//! Sends messages through the Exotel REST API: an HTTP basic-auth POST of
//! form fields `{From, To, Body}` to the account's `Sms/send.json`
//! endpoint. Anything other than a 200 response counts as a failed
//! delivery and is logged, never propagated.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::sink::NotificationSink;

/// Timeout for a single SMS API request.
const SMS_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn default_base_url() -> String {
    "https://api.exotel.com".to_string()
}

/// Credentials and endpoint settings for the Exotel SMS API.
#[derive(Clone, Deserialize)]
pub struct SmsConfig {
    /// Exotel account SID (part of the endpoint path).
    pub account_sid: String,
    /// API key, used as the basic-auth username.
    pub api_key: String,
    /// API token, used as the basic-auth password.
    #[serde(alias = "token")]
    pub api_token: String,
    /// Registered sender ID placed in the `From` field.
    pub sender_id: String,
    /// API base URL; overridable for regional endpoints and tests.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsConfig")
            .field("account_sid", &self.account_sid)
            .field("api_key", &self.api_key)
            .field("api_token", &"[REDACTED]")
            .field("sender_id", &self.sender_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Errors that can occur while constructing the SMS client.
#[derive(Debug, thiserror::Error)]
pub enum SmsInitError {
    /// The underlying HTTP client could not be built.
    #[error("failed to build SMS HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// SMS notification sink backed by the Exotel API.
#[derive(Debug, Clone)]
pub struct SmsClient {
    http: reqwest::Client,
    config: SmsConfig,
}

impl SmsClient {
    /// Creates an SMS client with a bounded request timeout.
    pub fn new(config: SmsConfig) -> Result<Self, SmsInitError> {
        let http = reqwest::Client::builder()
            .timeout(SMS_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/Accounts/{}/Sms/send.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl NotificationSink for SmsClient {
    async fn send(&self, phone: &str, message: &str) -> bool {
        let response = self
            .http
            .post(self.endpoint())
            .basic_auth(&self.config.api_key, Some(&self.config.api_token))
            .form(&[
                ("From", self.config.sender_id.as_str()),
                ("To", phone),
                ("Body", message),
            ])
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(%phone, "SMS sent");
                true
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!(%phone, %status, body, "SMS delivery failed");
                false
            }
            Err(e) => {
                tracing::warn!(%phone, error = %e, "SMS request failed");
                false
            }
        }
    }
}
