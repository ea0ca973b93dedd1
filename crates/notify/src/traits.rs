//! Notifier trait definition and shared error types.

/// Errors that can occur during message rendering or delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Chat webhook payload: `{"text": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub text: String,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Outcome of a delivery the endpoint answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// HTTP status returned by the endpoint, successful or not.
    pub status: u16,
}

impl DeliveryReceipt {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for chat delivery channels.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message through this channel.
    async fn send(&self, message: &ChatMessage) -> Result<DeliveryReceipt, NotifyError>;

    /// Test connectivity with a sample message.
    async fn test(&self) -> Result<DeliveryReceipt, NotifyError> {
        let message = ChatMessage::new("[TEST] alarm-relay connectivity check");
        self.send(&message).await
    }

    /// Human-readable name for this channel (e.g., "webhook").
    fn channel_name(&self) -> &str;
}
