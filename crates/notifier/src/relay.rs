//! HTTP relay transport.
//!
//! The push provider and SMS gateway sit behind a relay service; this
//! transport posts one JSON request per send to `{base}/push` or `{base}/sms`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use booking_common::config::AppConfig;
use booking_common::error::AppError;
use booking_common::types::{Job, JobData};

use crate::transport::{NotificationTransport, TransportError};

/// Relay endpoint configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub base_url: String,
    /// Optional Bearer token for the relay
    pub token: Option<String>,
    pub timeout: Duration,
}

impl RelayConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.notify_relay_url.trim_end_matches('/').to_string(),
            token: config.notify_relay_token.clone(),
            timeout: Duration::from_millis(config.notify_timeout_ms),
        }
    }
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    job_id: i64,
    filter: &'a str,
    data: &'a JobData,
}

#[derive(Debug, Serialize)]
struct SmsRequest {
    job_id: i64,
    translator_id: i64,
}

/// `reqwest`-backed [`NotificationTransport`].
pub struct HttpRelayTransport {
    client: reqwest::Client,
    config: RelayConfig,
}

impl HttpRelayTransport {
    pub fn new(config: RelayConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build relay client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), TransportError> {
        let url = format!("{}/{}", self.config.base_url, path);

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Relay accepted notification");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::new(format!(
            "relay returned {}: {}",
            status.as_u16(),
            body
        )))
    }
}

#[async_trait]
impl NotificationTransport for HttpRelayTransport {
    async fn send_push_to_translator(
        &self,
        job: &Job,
        data: &JobData,
        filter: &str,
    ) -> Result<(), TransportError> {
        let body = PushRequest {
            job_id: job.id,
            filter,
            data,
        };
        self.post("push", &body).await
    }

    async fn send_sms_to_translator(&self, job: &Job) -> Result<(), TransportError> {
        let translator_id = job.translator_id.ok_or_else(|| {
            TransportError::new(format!("job {} has no assigned translator", job.id))
        })?;

        let body = SmsRequest {
            job_id: job.id,
            translator_id,
        };
        self.post("sms", &body).await
    }
}
