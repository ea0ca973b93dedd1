//! One alarm notification in, one chat message out.
//!
//! Reason-level problems (no reading, unconvertible reading) become text
//! in the message. Everything else (bad envelope, missing fields, render
//! or delivery failure) becomes a failed [`InvocationResult`].

use alarm_relay_core::{format_reason, AlarmEvent, RelayError};

use crate::templating::{MessageRenderer, TemplateContext};
use crate::traits::{ChatMessage, Notifier, NotifyError};

/// Body returned when the webhook accepted the request.
pub const DELIVERED_BODY: &str = "Message sent to Slack";
/// Status returned for any top-level failure.
pub const FAILURE_STATUS: u16 = 500;

/// Failures that abort an invocation.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error(transparent)]
    Event(#[from] RelayError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Status code and body reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        self.status_code < 400
    }
}

/// Formats alarm notifications and delivers them through a [`Notifier`].
pub struct AlarmRelay {
    notifier: Box<dyn Notifier>,
    renderer: MessageRenderer,
    instance_dimension: String,
}

impl AlarmRelay {
    pub fn new(
        notifier: Box<dyn Notifier>,
        renderer: MessageRenderer,
        instance_dimension: impl Into<String>,
    ) -> Self {
        Self {
            notifier,
            renderer,
            instance_dimension: instance_dimension.into(),
        }
    }

    /// Build the chat message for an alarm without sending it.
    pub fn compose(&self, event: &AlarmEvent) -> Result<ChatMessage, NotifyError> {
        tracing::debug!(reason = event.reason_text(), "formatting reason");
        let reason = format_reason(event.metric_name(), event.reason_text(), event.trigger.threshold);
        let ctx = TemplateContext::new(event, &self.instance_dimension, reason);
        Ok(ChatMessage::new(self.renderer.render(&ctx)?))
    }

    /// Decode a raw envelope and build its chat message.
    pub fn compose_envelope(&self, envelope: &str) -> Result<ChatMessage, InvocationError> {
        let event = AlarmEvent::from_envelope_json(envelope)?;
        Ok(self.compose(&event)?)
    }

    /// Handle one raw envelope end to end.
    pub async fn handle(&self, envelope: &str) -> InvocationResult {
        match self.try_handle(envelope).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "alarm notification failed");
                InvocationResult {
                    status_code: FAILURE_STATUS,
                    body: e.to_string(),
                }
            }
        }
    }

    async fn try_handle(&self, envelope: &str) -> Result<InvocationResult, InvocationError> {
        let event = AlarmEvent::from_envelope_json(envelope)?;
        let message = self.compose(&event)?;

        let receipt = self.notifier.send(&message).await?;
        tracing::info!(
            alarm = %event.display_name(&self.instance_dimension),
            channel = self.notifier.channel_name(),
            status = receipt.status,
            "alarm notification delivered"
        );

        Ok(InvocationResult {
            status_code: receipt.status,
            body: DELIVERED_BODY.to_string(),
        })
    }
}
