//! Outbound email: a fire-and-forget queue in front of a delivery transport.
//!
//! [`QueuedMailer`] implements the domain `Mailer` port. Requests hand it a
//! message and move on; a background task performs a single delivery
//! attempt per message through an [`EmailTransport`] and logs the outcome.

mod queued;
mod sendgrid;

use async_trait::async_trait;
use tracing::info;

use crate::domain::EmailMessage;
use crate::domain::ports::define_port_error;

pub use queued::{DEFAULT_MAIL_QUEUE_CAPACITY, QueuedMailer};
pub use sendgrid::{DEFAULT_SENDGRID_ENDPOINT, SendGridTransport};

define_port_error! {
    /// Delivery failures reported by a transport.
    pub enum EmailTransportError {
        /// The provider could not be reached or timed out.
        Transport { message: String } => "mail transport failed: {message}",
        /// The provider answered with a non-success status.
        Rejected { status: u16, message: String } => "mail provider rejected message ({status}): {message}",
    }
}

/// Performs one delivery attempt for a rendered message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailTransportError>;
}

/// Transport that only logs. Used when no provider key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTransport;

#[async_trait]
impl EmailTransport for LoggingTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailTransportError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            template = message.kind.template(),
            "email delivery skipped; no provider configured"
        );
        Ok(())
    }
}
