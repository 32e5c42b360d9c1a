//! Best-effort notification delivery.
//!
//! Notifications ride the engine's event hooks, so they run after the settlement transaction has committed and
//! their failure can never affect an order. Delivery goes through a transactional mail API over HTTP; transient
//! failures are retried a bounded number of times with exponential backoff, and a terminal failure is logged and
//! dropped.

use std::{pin::Pin, sync::Arc};

use futures::Future;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Serialize;
use storefront_engine::{
    events::{EventHooks, LowStockEvent, OrderSettledEvent},
    helpers::retry_with_backoff,
};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Clone, Serialize)]
pub struct MailMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Could not initialize mail client: {0}")]
    Initialization(String),
    #[error("The mail API could not be reached. {0}")]
    Unavailable(String),
    #[error("The mail API refused the message. Error {status}. {message}")]
    Rejected { status: u16, message: String },
}

/// Anything that can deliver a [`MailMessage`].
#[allow(async_fn_in_trait)]
pub trait Notifier: Clone {
    async fn send(&self, message: MailMessage) -> Result<(), MailerError>;
}

#[derive(Clone)]
pub struct MailApiClient {
    config: MailConfig,
    client: Arc<Client>,
}

impl MailApiClient {
    pub fn new(config: MailConfig) -> Result<Self, MailerError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| MailerError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client =
            Client::builder().default_headers(headers).build().map_err(|e| MailerError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }
}

impl Notifier for MailApiClient {
    async fn send(&self, message: MailMessage) -> Result<(), MailerError> {
        #[derive(Serialize)]
        struct SendMailRequest<'a> {
            from: &'a str,
            to: &'a str,
            subject: &'a str,
            body: &'a str,
        }
        let payload = SendMailRequest {
            from: &self.config.sender,
            to: &message.recipient,
            subject: &message.subject,
            body: &message.body,
        };
        let response = self
            .client
            .post(&self.config.api_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailerError::Unavailable(e.to_string()))?;
        if response.status().is_success() {
            debug!("📧️ Sent '{}' to {}", message.subject, message.recipient);
            Ok(())
        } else if response.status().is_server_error() {
            Err(MailerError::Unavailable(format!("Mail API answered {}", response.status())))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(MailerError::Rejected { status, message })
        }
    }
}

/// Delivers a message with the configured retry budget. A terminal failure is reported in the log and swallowed;
/// notification delivery is never allowed to propagate an error to its caller.
pub async fn send_with_retries<N: Notifier>(notifier: &N, message: MailMessage, config: &MailConfig) {
    let subject = message.subject.clone();
    let recipient = message.recipient.clone();
    let result = retry_with_backoff(
        config.max_attempts,
        config.retry_delay,
        "📧️ Mail delivery",
        || notifier.send(message.clone()),
        |e| matches!(e, MailerError::Unavailable(_)),
    )
    .await;
    if let Err(e) = result {
        error!("📧️ Giving up on '{subject}' to {recipient} after {} attempt(s). {e}", config.max_attempts);
    }
}

/// Builds the engine event hooks that turn settlement events into notifications.
pub fn build_event_hooks(mailer: MailApiClient, config: MailConfig) -> EventHooks {
    let mut hooks = EventHooks::default();
    let m = mailer.clone();
    let order_config = config.clone();
    hooks.on_order_settled(move |ev: OrderSettledEvent| {
        let mailer = m.clone();
        let config = order_config.clone();
        Box::pin(async move {
            let message = MailMessage {
                recipient: ev.customer_email.clone(),
                subject: "Order Confirmation".to_string(),
                body: format!(
                    "Thank you for your payment! Your order {} has been confirmed.",
                    ev.order.order_id
                ),
            };
            send_with_retries(&mailer, message, &config).await;
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks.on_low_stock(move |ev: LowStockEvent| {
        let mailer = mailer.clone();
        let config = config.clone();
        Box::pin(async move {
            let message = MailMessage {
                recipient: config.admin_email.clone(),
                subject: format!("Low Stock Alert: {}", ev.product.name),
                body: format!(
                    "Only {} units left for '{}'. Please restock soon.",
                    ev.product.stock_quantity, ev.product.name
                ),
            };
            send_with_retries(&mailer, message, &config).await;
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}

#[cfg(test)]
mod test {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;

    #[derive(Clone)]
    struct FlakyNotifier {
        calls: Arc<AtomicUsize>,
        fail_first: usize,
        terminal: bool,
    }

    impl Notifier for FlakyNotifier {
        async fn send(&self, _message: MailMessage) -> Result<(), MailerError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.terminal {
                return Err(MailerError::Rejected { status: 400, message: "bad address".to_string() });
            }
            if n < self.fail_first {
                Err(MailerError::Unavailable("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn test_config(max_attempts: usize) -> MailConfig {
        MailConfig { max_attempts, retry_delay: Duration::from_millis(1), ..MailConfig::default() }
    }

    fn message() -> MailMessage {
        MailMessage { recipient: "a@b.c".to_string(), subject: "s".to_string(), body: "b".to_string() }
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let notifier = FlakyNotifier { calls: calls.clone(), fail_first: 2, terminal: false };
        send_with_retries(&notifier, message(), &test_config(3)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rejections_are_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let notifier = FlakyNotifier { calls: calls.clone(), fail_first: 0, terminal: true };
        send_with_retries(&notifier, message(), &test_config(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_is_swallowed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let notifier = FlakyNotifier { calls: calls.clone(), fail_first: 10, terminal: false };
        // Must not panic or propagate anything.
        send_with_retries(&notifier, message(), &test_config(2)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
