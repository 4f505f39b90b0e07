//! Port for best-effort outbound email.
//!
//! `dispatch` hands a message off and returns immediately. Delivery happens
//! outside the request, is attempted once, and its outcome is only logged.
//! There is no error type because callers must never react to delivery.

use std::sync::{Arc, Mutex};

use crate::domain::EmailMessage;

#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync {
    /// Queue a message for delivery.
    fn dispatch(&self, message: EmailMessage);
}

/// Mailer that records every message in memory.
#[derive(Debug, Default, Clone)]
pub struct FixtureMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl FixtureMailer {
    /// Messages dispatched so far, oldest first.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Mailer for FixtureMailer {
    fn dispatch(&self, message: EmailMessage) {
        if let Ok(mut guard) = self.sent.lock() {
            guard.push(message);
        }
    }
}
