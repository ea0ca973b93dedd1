//! Chat webhook notifier.
//!
//! Posts `{"text": ...}` as JSON to an incoming-webhook URL and reports
//! the status code the endpoint answered with.

use std::time::Duration;

use alarm_relay_core::config::WebhookConfig;

use crate::traits::{ChatMessage, DeliveryReceipt, Notifier, NotifyError};

/// Delivers chat messages as JSON over HTTP POST.
///
/// Environment variable references (`${VAR_NAME}`) in the URL are
/// resolved at construction time. A notifier without a URL can be
/// built; every send on it fails with [`NotifyError::Config`].
#[derive(Debug)]
pub struct WebhookNotifier {
    /// Target URL (env vars already resolved).
    url: Option<String>,
    /// Shared HTTP client (connection pooling, request timeout).
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a new webhook notifier.
    ///
    /// Missing env vars referenced from `url` produce a
    /// [`NotifyError::Config`] error.
    pub fn new(url: Option<String>, timeout: Option<Duration>) -> Result<Self, NotifyError> {
        let resolved_url = url.as_deref().map(resolve_env_vars).transpose()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            url: resolved_url,
            client: builder.build()?,
        })
    }

    /// Construct a [`WebhookNotifier`] from the webhook config section.
    pub fn from_config(config: &WebhookConfig) -> Result<Self, NotifyError> {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        Self::new(config.url.clone(), timeout)
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &ChatMessage) -> Result<DeliveryReceipt, NotifyError> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| NotifyError::Config("webhook URL is not configured".to_string()))?;

        let response = self.client.post(url).json(message).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(%status, body = %body_text, "webhook returned non-2xx status");
        } else {
            tracing::debug!(%status, "webhook message delivered");
        }

        Ok(DeliveryReceipt {
            status: status.as_u16(),
        })
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}

/// Resolve `${VAR_NAME}` patterns in a string using `std::env::var`.
///
/// Returns an error if a referenced variable is not set.
fn resolve_env_vars(input: &str) -> Result<String, NotifyError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                var_name.push(c);
            }
            if !closed {
                return Err(NotifyError::Config(
                    "unclosed env var reference in webhook URL".to_string(),
                ));
            }
            let value = std::env::var(&var_name).map_err(|_| {
                NotifyError::Config(format!("env var not found: {var_name}"))
            })?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}
