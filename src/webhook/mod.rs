pub mod reply;

use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::Client as HttpClient;
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use crate::models::webhook::WebhookPayload;

pub use reply::{ parse_reply, ReplyItem, ReplyPolicy, WebhookReply };

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid webhook url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook reply is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The single outbound call the widget makes. One POST per payload, the
/// decoded JSON body back; no retries.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post(&self, payload: &WebhookPayload) -> Result<JsonValue, WebhookError>;

    fn endpoint(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct HttpWebhookClient {
    http: HttpClient,
    url: Url,
}

impl HttpWebhookClient {
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, WebhookError> {
        let parsed = Url::parse(url).map_err(|source| WebhookError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let mut builder = HttpClient::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            http: builder.build()?,
            url: parsed,
        })
    }
}

#[async_trait]
impl WebhookTransport for HttpWebhookClient {
    async fn post(&self, payload: &WebhookPayload) -> Result<JsonValue, WebhookError> {
        let resp = self.http.post(self.url.clone()).json(payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            // Non-2xx bodies are parsed like any other reply.
            warn!("Webhook answered with status {}", status);
        }
        let body = resp.text().await?;
        debug!("Webhook raw reply: {}", body);
        Ok(serde_json::from_str(&body)?)
    }

    fn endpoint(&self) -> String {
        self.url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_urls() {
        let err = HttpWebhookClient::new("/webhook/meuportfolio", None).unwrap_err();
        assert!(matches!(err, WebhookError::InvalidUrl { .. }));
        assert!(err.to_string().contains("/webhook/meuportfolio"));
    }

    #[test]
    fn keeps_the_configured_endpoint() {
        let client = HttpWebhookClient::new(
            "https://webhook.example.com/webhook/chat",
            Some(Duration::from_secs(5))
        ).unwrap();
        assert_eq!(client.endpoint(), "https://webhook.example.com/webhook/chat");
    }
}
