//! Chat delivery for monitoring alarm notifications.
//!
//! This crate provides:
//! - `Notifier` trait for the outbound chat channel
//! - Webhook notifier posting `{"text": ...}` payloads
//! - Minijinja rendering of the message text
//! - `AlarmRelay`, which turns one notification envelope into one delivery

pub mod relay;
pub mod templating;
pub mod traits;
pub mod webhook;

pub use relay::{AlarmRelay, InvocationResult};
pub use templating::MessageRenderer;
pub use traits::{ChatMessage, DeliveryReceipt, Notifier, NotifyError};
pub use webhook::WebhookNotifier;
