//! Fire-and-forget email notifications.
//!
//! Callers enqueue a [`Notification`] and return immediately; a background
//! task hands each one to the configured [`MailTransport`]. There is no
//! delivery guarantee: a full queue, a stopped worker or a transport error
//! is logged and the notification is dropped. Nothing is retried.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use uuid::Uuid;

const DEFAULT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    PasswordReset {
        to: String,
        reset_url: String,
    },
    OrderStatusUpdate {
        to: String,
        order_id: Uuid,
        subject: String,
        body: String,
    },
    Verification {
        to: String,
        verify_url: String,
    },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::PasswordReset { to, .. }
            | Notification::OrderStatusUpdate { to, .. }
            | Notification::Verification { to, .. } => to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::PasswordReset { .. } => "password_reset",
            Notification::OrderStatusUpdate { .. } => "order_status_update",
            Notification::Verification { .. } => "verification",
        }
    }
}

#[derive(Debug, Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), MailError>;
}

/// Demo transport: writes the message to the log instead of sending it.
#[derive(Debug, Default, Clone)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn deliver(&self, notification: &Notification) -> Result<(), MailError> {
        match notification {
            Notification::PasswordReset { to, reset_url } => {
                tracing::info!(to = %to, link = %reset_url, "[MOCK EMAIL] Password Reset Request");
            }
            Notification::OrderStatusUpdate {
                to,
                order_id,
                subject,
                body,
            } => {
                tracing::info!(
                    to = %to,
                    subject = %format!("{subject} (Order #ORD-{order_id})"),
                    message = %body,
                    "[MOCK EMAIL] Order Status Update"
                );
            }
            Notification::Verification { to, verify_url } => {
                tracing::info!(to = %to, link = %verify_url, "[MOCK EMAIL] Verification Email");
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
}

impl Notifier {
    /// Starts the delivery worker on the current tokio runtime.
    pub fn spawn(transport: Arc<dyn MailTransport>) -> (Self, JoinHandle<()>) {
        Self::spawn_with_capacity(transport, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn spawn_with_capacity(
        transport: Arc<dyn MailTransport>,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Notification>(capacity.max(1));
        let handle = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                if let Err(err) = transport.deliver(&notification).await {
                    tracing::warn!(
                        kind = notification.kind(),
                        to = %notification.recipient(),
                        error = %err,
                        "notification delivery failed"
                    );
                }
            }
            tracing::debug!("notification worker stopped");
        });
        (Self { tx }, handle)
    }

    pub fn send_password_reset(&self, to: &str, reset_url: &str) {
        self.dispatch(Notification::PasswordReset {
            to: to.to_string(),
            reset_url: reset_url.to_string(),
        });
    }

    pub fn send_order_status_update(&self, to: &str, order_id: Uuid, subject: &str, body: &str) {
        self.dispatch(Notification::OrderStatusUpdate {
            to: to.to_string(),
            order_id,
            subject: subject.to_string(),
            body: body.to_string(),
        });
    }

    pub fn send_verification(&self, to: &str, verify_url: &str) {
        self.dispatch(Notification::Verification {
            to: to.to_string(),
            verify_url: verify_url.to_string(),
        });
    }

    fn dispatch(&self, notification: Notification) {
        if let Err(err) = self.tx.try_send(notification) {
            let dropped = match &err {
                mpsc::error::TrySendError::Full(n) | mpsc::error::TrySendError::Closed(n) => n,
            };
            tracing::warn!(
                kind = dropped.kind(),
                to = %dropped.recipient(),
                error = %err,
                "notification dropped"
            );
        }
    }
}
