//! Minijinja template rendering for chat messages.
//!
//! The built-in template reproduces the classic alert layout; a custom
//! template can be loaded from a file and is validated up front.
//!
//! Templates are arbitrary strings (not pre-registered), so a fresh
//! [`minijinja::Environment`] is created per render call.

use std::path::Path;

use alarm_relay_core::AlarmEvent;

use crate::traits::NotifyError;

/// Layout used when no custom template is configured.
pub const DEFAULT_TEMPLATE: &str = "⚠️ *RDS Alert Triggered!* ⚠️\n\
*Alarm:* `{{ alarm.name }}`\n\
*DB Instance:* `{{ instance }}`\n\
*Reason:* `{{ reason }}`";

/// Context data available to message templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TemplateContext {
    pub alarm: AlarmContext,
    /// Monitored instance identifier, `"Unknown"` when absent.
    pub instance: String,
    /// Formatted reason line (comparison sentence or placeholder).
    pub reason: String,
}

/// Alarm fields exposed to templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AlarmContext {
    /// Alarm name with the instance suffix stripped.
    pub name: String,
    /// Alarm name as received.
    pub raw_name: String,
    /// New state (e.g. `"ALARM"`, `"OK"`).
    pub state: Option<String>,
    pub previous_state: Option<String>,
    pub region: Option<String>,
    pub description: Option<String>,
    pub changed_at: Option<String>,
    pub metric: String,
    pub threshold: f64,
}

impl TemplateContext {
    pub fn new(event: &AlarmEvent, instance_dimension: &str, reason: String) -> Self {
        Self {
            alarm: AlarmContext {
                name: event.display_name(instance_dimension).to_string(),
                raw_name: event.alarm_name.clone(),
                state: event.new_state_value.clone(),
                previous_state: event.old_state_value.clone(),
                region: event.region.clone(),
                description: event.alarm_description.clone(),
                changed_at: event.state_change_time.clone(),
                metric: event.metric_name().to_string(),
                threshold: event.trigger.threshold,
            },
            instance: event.instance(instance_dimension).to_string(),
            reason,
        }
    }
}

/// Renders chat message text from a single template.
#[derive(Debug, Clone)]
pub struct MessageRenderer {
    template: String,
}

impl MessageRenderer {
    /// Renderer using [`DEFAULT_TEMPLATE`].
    pub fn new() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Renderer for a custom template.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the template has syntax errors.
    pub fn with_template(template: impl Into<String>) -> Result<Self, NotifyError> {
        let template = template.into();
        validate(&template)?;
        Ok(Self { template })
    }

    /// Load and validate a custom template file.
    pub fn from_file(path: &Path) -> Result<Self, NotifyError> {
        let template = std::fs::read_to_string(path).map_err(|e| {
            NotifyError::Config(format!("failed to read template {}: {e}", path.display()))
        })?;
        Self::with_template(template)
    }

    /// Render the message text for `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if rendering fails (e.g. a filter
    /// applied to a value of the wrong type).
    pub fn render(&self, ctx: &TemplateContext) -> Result<String, NotifyError> {
        let env = build_env();
        env.render_str(&self.template, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }
}

impl Default for MessageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a configured minijinja environment with custom filters and globals.
fn build_env() -> minijinja::Environment<'static> {
    let mut env = minijinja::Environment::new();

    // `lower` and `upper` are built-in with the "builtins" feature,
    // but we register explicit versions to guarantee availability.
    env.add_filter("lower", lower_filter);
    env.add_filter("upper", upper_filter);

    env.add_function("env", env_function);

    env
}

/// Check that a template string parses, without evaluating it.
fn validate(template_str: &str) -> Result<(), NotifyError> {
    let env = build_env();
    env.template_from_str(template_str)
        .map_err(|e| NotifyError::Template(e.to_string()))?;
    Ok(())
}

fn lower_filter(value: String) -> String {
    value.to_lowercase()
}

fn upper_filter(value: String) -> String {
    value.to_uppercase()
}

/// Global function: read an environment variable by name.
///
/// Returns an empty string (and logs a warning) when the variable is unset.
fn env_function(name: String) -> String {
    match std::env::var(&name) {
        Ok(val) => val,
        Err(_) => {
            tracing::warn!(var = %name, "Environment variable not found, returning empty string");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> AlarmEvent {
        AlarmEvent::from_json(
            &serde_json::json!({
                "AlarmName": "LowMemory DBInstanceIdentifier=orders-db",
                "NewStateValue": "ALARM",
                "OldStateValue": "OK",
                "Region": "US East (N. Virginia)",
                "NewStateReason": "[5.36870912E+8 (18/10/26 09:00:00)]",
                "Trigger": {
                    "MetricName": "FreeableMemory",
                    "Threshold": 1073741824.0,
                    "Dimensions": [{ "name": "DBInstanceIdentifier", "value": "orders-db" }]
                }
            })
            .to_string(),
        )
        .unwrap()
    }

    fn sample_context() -> TemplateContext {
        TemplateContext::new(
            &sample_event(),
            "DBInstanceIdentifier",
            "Current value 0.50 GB < threshold value 1.00 GB".to_string(),
        )
    }

    #[test]
    fn context_from_event() {
        let ctx = sample_context();
        assert_eq!(ctx.alarm.name, "LowMemory");
        assert_eq!(ctx.alarm.raw_name, "LowMemory DBInstanceIdentifier=orders-db");
        assert_eq!(ctx.alarm.metric, "FreeableMemory");
        assert_eq!(ctx.instance, "orders-db");
    }

    #[test]
    fn render_default_layout() {
        let text = MessageRenderer::new().render(&sample_context()).unwrap();
        assert_eq!(
            text,
            "⚠️ *RDS Alert Triggered!* ⚠️\n\
             *Alarm:* `LowMemory`\n\
             *DB Instance:* `orders-db`\n\
             *Reason:* `Current value 0.50 GB < threshold value 1.00 GB`"
        );
    }

    #[test]
    fn render_custom_template() {
        let renderer = MessageRenderer::with_template(
            "[{{ alarm.state }}<-{{ alarm.previous_state }}] {{ alarm.name | upper }} on {{ instance }} ({{ alarm.region }})",
        )
        .unwrap();
        let text = renderer.render(&sample_context()).unwrap();
        assert_eq!(text, "[ALARM<-OK] LOWMEMORY on orders-db (US East (N. Virginia))");
    }

    #[test]
    fn render_missing_optional_field() {
        let renderer = MessageRenderer::with_template("desc={{ alarm.description }}").unwrap();
        let text = renderer.render(&sample_context()).unwrap();
        assert_eq!(text, "desc=none");
    }

    #[test]
    fn render_env_function() {
        std::env::set_var("RELAY_TEMPLATE_TEST_ENV", "staging");
        let renderer = MessageRenderer::with_template("[{{ env('RELAY_TEMPLATE_TEST_ENV') }}] {{ alarm.name }}").unwrap();
        let text = renderer.render(&sample_context()).unwrap();
        assert_eq!(text, "[staging] LowMemory");
        std::env::remove_var("RELAY_TEMPLATE_TEST_ENV");
    }

    #[test]
    fn render_env_missing_returns_empty() {
        let renderer = MessageRenderer::with_template("[{{ env('DEFINITELY_NOT_SET_XYZ') }}]").unwrap();
        assert_eq!(renderer.render(&sample_context()).unwrap(), "[]");
    }

    #[test]
    fn invalid_template_rejected_at_construction() {
        match MessageRenderer::with_template("{{ unclosed").unwrap_err() {
            NotifyError::Template(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Template error, got: {:?}", other),
        }
    }

    #[test]
    fn missing_template_file() {
        let result = MessageRenderer::from_file(Path::new("/definitely/not/here.j2"));
        assert!(matches!(result, Err(NotifyError::Config(_))));
    }
}
