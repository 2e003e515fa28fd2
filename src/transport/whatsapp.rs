//! Outbound text messages through the WhatsApp Cloud API

use crate::runtime::{DeliveryError, ReplySender};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize, PartialEq, Eq)]
struct SendTextRequest<'a> {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct TextBody<'a> {
    body: &'a str,
}

impl<'a> SendTextRequest<'a> {
    fn new(to: &'a str, text: &'a str) -> Self {
        Self {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to,
            kind: "text",
            text: TextBody { body: text.trim() },
        }
    }
}

/// Cloud API reply sender
pub struct WhatsAppSender {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl WhatsAppSender {
    pub fn new(
        api_base: &str,
        phone_id: &str,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: messages_endpoint(api_base, phone_id),
            access_token: access_token.into(),
        })
    }
}

fn messages_endpoint(api_base: &str, phone_id: &str) -> String {
    format!("{}/{phone_id}/messages", api_base.trim_end_matches('/'))
}

#[async_trait]
impl ReplySender for WhatsAppSender {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&SendTextRequest::new(recipient, text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Logs replies instead of sending them; used when no credentials are set
pub struct LogOnlySender;

#[async_trait]
impl ReplySender for LogOnlySender {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), DeliveryError> {
        tracing::info!(
            recipient = %recipient,
            text = %text.trim(),
            "Reply (not sent, WhatsApp not configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_matches_cloud_api_shape() {
        let request = SendTextRequest::new("5550001", "\n¡Hola!  ");
        let body = serde_json::to_value(request).unwrap();
        assert_eq!(
            body,
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "5550001",
                "type": "text",
                "text": { "body": "¡Hola!" }
            })
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        assert_eq!(
            messages_endpoint("https://graph.facebook.com/v18.0/", "123"),
            "https://graph.facebook.com/v18.0/123/messages"
        );
    }

    #[tokio::test]
    async fn unreachable_api_is_a_delivery_error() {
        let sender = WhatsAppSender::new(
            "http://127.0.0.1:9",
            "123",
            "token",
            Duration::from_millis(500),
        )
        .unwrap();

        let err = sender.send("5550001", "hola").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Http(_)));
    }

    #[tokio::test]
    async fn log_only_sender_always_succeeds() {
        LogOnlySender.send("5550001", "hola").await.unwrap();
    }
}
