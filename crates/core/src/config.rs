use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Dimension that names the monitored instance when none is configured.
pub const DEFAULT_INSTANCE_DIMENSION: &str = "DBInstanceIdentifier";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub webhook: WebhookConfig,
    pub message: MessageConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `RELAY_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("RELAY_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            webhook: WebhookConfig::from_env_profiled(p),
            message: MessageConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  webhook:  url={}, timeout={}s",
            self.webhook.redacted_url(),
            self.webhook.timeout_secs
        );
        if !self.webhook.is_configured() {
            tracing::warn!("SLACK_WEBHOOK_URL is not set; deliveries will fail");
        }
        tracing::info!(
            "  message:  template={}, instance_dimension={}",
            self.message
                .template_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string()),
            self.message.instance_dimension
        );
    }
}

// ── Webhook ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Absent URL is not rejected here; delivery fails instead.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl WebhookConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_opt(p, "SLACK_WEBHOOK_URL"),
            timeout_secs: profiled_env_u64(p, "WEBHOOK_TIMEOUT_SECS", 10),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Scheme and host only; webhook paths carry the secret token.
    pub fn redacted_url(&self) -> String {
        match self.url.as_deref() {
            None => "(none)".to_string(),
            Some(url) => {
                let (scheme, rest) = url.split_once("://").unwrap_or(("", url));
                let host = rest.split('/').next().unwrap_or(rest);
                if scheme.is_empty() {
                    format!("{host}/***")
                } else {
                    format!("{scheme}://{host}/***")
                }
            }
        }
    }
}

// ── Message ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    pub template_path: Option<PathBuf>,
    pub instance_dimension: String,
}

impl MessageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            template_path: profiled_env_opt(p, "MESSAGE_TEMPLATE_PATH").map(PathBuf::from),
            instance_dimension: profiled_env_or(p, "INSTANCE_DIMENSION", DEFAULT_INSTANCE_DIMENSION),
        }
    }
}
