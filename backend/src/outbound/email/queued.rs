//! Channel-backed `Mailer` that delivers on a background task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{EmailTransport, EmailTransportError};
use crate::domain::ports::Mailer;
use crate::domain::{EmailMessage, TraceId};

struct Envelope {
    message: EmailMessage,
    trace_id: Option<TraceId>,
}

/// Messages held while the transport is busy.
pub const DEFAULT_MAIL_QUEUE_CAPACITY: usize = 256;

/// Bounded queue in front of an [`EmailTransport`].
///
/// Cloning shares the queue. The worker stops once every clone is dropped
/// and the backlog is drained. A full queue drops new messages with a
/// warning; `dispatch` never waits.
#[derive(Clone)]
pub struct QueuedMailer {
    sender: mpsc::Sender<Envelope>,
}

impl QueuedMailer {
    /// Start the delivery worker on the current Tokio runtime.
    pub fn spawn(transport: Arc<dyn EmailTransport>) -> (Self, JoinHandle<()>) {
        Self::with_capacity(transport, DEFAULT_MAIL_QUEUE_CAPACITY)
    }

    /// Start the worker with room for `capacity` pending messages (at
    /// least one).
    pub fn with_capacity(
        transport: Arc<dyn EmailTransport>,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(transport, receiver));
        (Self { sender }, worker)
    }
}

impl Mailer for QueuedMailer {
    fn dispatch(&self, message: EmailMessage) {
        let envelope = Envelope {
            message,
            trace_id: TraceId::current(),
        };
        match self.sender.try_send(envelope) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(rejected)) => warn!(
                to = %rejected.message.to,
                subject = %rejected.message.subject,
                "mail queue full; message dropped"
            ),
            Err(mpsc::error::TrySendError::Closed(rejected)) => error!(
                to = %rejected.message.to,
                subject = %rejected.message.subject,
                "mail queue closed; message dropped"
            ),
        }
    }
}

async fn run_worker(
    transport: Arc<dyn EmailTransport>,
    mut receiver: mpsc::Receiver<Envelope>,
) {
    while let Some(Envelope { message, trace_id }) = receiver.recv().await {
        TraceId::scope_optional(trace_id, deliver(transport.as_ref(), message, trace_id)).await;
    }
    debug!("mail queue drained");
}

async fn deliver(transport: &dyn EmailTransport, message: EmailMessage, trace_id: Option<TraceId>) {
    let trace = trace_id.map(|id| id.to_string()).unwrap_or_default();
    match transport.send(&message).await {
        Ok(()) => info!(
            to = %message.to,
            subject = %message.subject,
            trace_id = %trace,
            "email delivered"
        ),
        Err(err @ EmailTransportError::Rejected { .. }) => warn!(
            to = %message.to,
            subject = %message.subject,
            trace_id = %trace,
            error = %err,
            "email rejected by provider"
        ),
        Err(err) => error!(
            to = %message.to,
            subject = %message.subject,
            trace_id = %trace,
            error = %err,
            "email delivery failed"
        ),
    }
}
