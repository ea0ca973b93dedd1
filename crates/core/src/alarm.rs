//! Alarm notification payloads.
//!
//! The inbound envelope is a pub/sub delivery holding one record whose
//! `Message` is itself a JSON-encoded alarm state change.

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Reason used when the payload carries no `NewStateReason`.
pub const DEFAULT_REASON: &str = "No reason provided.";
/// Metric name used when the trigger carries no `MetricName`.
pub const DEFAULT_METRIC_NAME: &str = "Unknown Metric";
/// Instance label used when no matching dimension is present.
pub const UNKNOWN_INSTANCE: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    #[serde(rename = "Records")]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    #[serde(rename = "Sns")]
    pub sns: TopicMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicMessage {
    /// JSON-encoded [`AlarmEvent`].
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlarmEvent {
    pub alarm_name: String,
    #[serde(default)]
    pub alarm_description: Option<String>,
    #[serde(default)]
    pub new_state_value: Option<String>,
    #[serde(default)]
    pub old_state_value: Option<String>,
    #[serde(default)]
    pub new_state_reason: Option<String>,
    #[serde(default)]
    pub state_change_time: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Trigger {
    #[serde(default)]
    pub metric_name: Option<String>,
    pub threshold: f64,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

/// Name/value tag identifying the monitored resource. Lowercase keys on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl NotificationEnvelope {
    /// Decode the envelope and the alarm payload of its first record.
    pub fn first_alarm(&self) -> Result<AlarmEvent, RelayError> {
        let record = self.records.first().ok_or(RelayError::EmptyEnvelope)?;
        AlarmEvent::from_json(&record.sns.message)
    }
}

impl AlarmEvent {
    pub fn from_json(payload: &str) -> Result<Self, RelayError> {
        serde_json::from_str(payload).map_err(|e| RelayError::Payload(e.to_string()))
    }

    /// Parse a raw envelope and return the alarm carried by its first record.
    pub fn from_envelope_json(envelope: &str) -> Result<Self, RelayError> {
        let envelope: NotificationEnvelope = serde_json::from_str(envelope)?;
        envelope.first_alarm()
    }

    /// Alarm name with the `" <dimension>="` suffix removed.
    pub fn display_name(&self, instance_dimension: &str) -> &str {
        let marker = format!(" {instance_dimension}=");
        match self.alarm_name.find(&marker) {
            Some(idx) => &self.alarm_name[..idx],
            None => &self.alarm_name,
        }
    }

    pub fn reason_text(&self) -> &str {
        self.new_state_reason.as_deref().unwrap_or(DEFAULT_REASON)
    }

    pub fn metric_name(&self) -> &str {
        self.trigger.metric_name.as_deref().unwrap_or(DEFAULT_METRIC_NAME)
    }

    /// Value of the last dimension named `name`.
    pub fn dimension_value(&self, name: &str) -> Option<&str> {
        self.trigger
            .dimensions
            .iter()
            .rev()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    pub fn instance(&self, instance_dimension: &str) -> &str {
        self.dimension_value(instance_dimension).unwrap_or(UNKNOWN_INSTANCE)
    }
}
