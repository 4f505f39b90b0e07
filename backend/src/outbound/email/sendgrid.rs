//! Reqwest-backed SendGrid v3 transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use zeroize::Zeroizing;

use super::{EmailTransport, EmailTransportError};
use crate::domain::EmailMessage;

/// Public SendGrid send endpoint.
pub const DEFAULT_SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
    categories: [&'static str; 1],
}

fn request_body<'a>(sender: &'a str, message: &'a EmailMessage) -> SendRequest<'a> {
    SendRequest {
        personalizations: [Personalization {
            to: [Address {
                email: message.to.as_ref(),
            }],
        }],
        from: Address { email: sender },
        subject: &message.subject,
        content: [Content {
            content_type: "text/plain",
            value: &message.body,
        }],
        categories: [message.kind.template()],
    }
}

/// Posts messages to a SendGrid-compatible endpoint.
pub struct SendGridTransport {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    sender: String,
}

impl SendGridTransport {
    /// Build a transport with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: Zeroizing<String>,
        sender: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            sender: sender.into(),
        })
    }
}

#[async_trait]
impl EmailTransport for SendGridTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailTransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&request_body(&self.sender, message))
            .send()
            .await
            .map_err(|err| EmailTransportError::transport(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EmailTransportError {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    EmailTransportError::rejected(status.as_u16(), preview)
}
