//! alarm-relay — posts a monitoring alarm notification to a chat webhook.
//!
//! Reads one notification envelope (`{"Records":[{"Sns":{"Message":...}}]}`)
//! from a file or stdin, delivers the formatted message, and prints the
//! invocation result (`{"statusCode":...,"body":...}`) to stdout.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use alarm_relay_core::config::{self, Config};
use alarm_relay_notify::{AlarmRelay, MessageRenderer, Notifier, WebhookNotifier};

// ── CLI ─────────────────────────────────────────────────────────────

/// Relay a monitoring alarm notification to a chat webhook.
#[derive(Parser, Debug)]
#[command(name = "alarm-relay", version, about)]
struct Cli {
    /// Path to the notification envelope JSON ("-" reads stdin).
    #[arg(long, default_value = "-")]
    event: String,

    /// Config profile; keys are looked up as {PROFILE}_{KEY} first.
    #[arg(long, env = "RELAY_PROFILE")]
    profile: Option<String>,

    /// Webhook URL override (otherwise SLACK_WEBHOOK_URL from config).
    #[arg(long)]
    webhook_url: Option<String>,

    /// Message template file override (minijinja).
    #[arg(long)]
    template: Option<PathBuf>,

    /// Dimension naming the monitored instance.
    #[arg(long)]
    instance_dimension: Option<String>,

    /// Print the composed message instead of sending it.
    #[arg(long)]
    dry_run: bool,

    /// Send a connectivity test message and exit.
    #[arg(long, conflicts_with = "dry_run")]
    test: bool,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // stdout carries the result JSON only.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    config::load_dotenv();
    let cli = Cli::parse();

    let mut config = match cli.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    if let Some(url) = cli.webhook_url.clone() {
        config.webhook.url = Some(url);
    }
    if let Some(path) = cli.template.clone() {
        config.message.template_path = Some(path);
    }
    if let Some(dimension) = cli.instance_dimension.clone() {
        config.message.instance_dimension = dimension;
    }
    config.log_summary();

    let notifier = WebhookNotifier::from_config(&config.webhook)
        .context("failed to build webhook notifier")?;

    if cli.test {
        let receipt = notifier.test().await.context("test message failed")?;
        info!(status = receipt.status, "test message sent");
        return Ok(exit_for(receipt.is_success()));
    }

    let renderer = match config.message.template_path.as_deref() {
        Some(path) => MessageRenderer::from_file(path)
            .with_context(|| format!("failed to load template '{}'", path.display()))?,
        None => MessageRenderer::new(),
    };

    let envelope = read_event(&cli.event)
        .with_context(|| format!("failed to read event '{}'", cli.event))?;

    let relay = AlarmRelay::new(
        Box::new(notifier),
        renderer,
        config.message.instance_dimension.clone(),
    );

    if cli.dry_run {
        let message = relay
            .compose_envelope(&envelope)
            .context("failed to compose message")?;
        println!("{}", serde_json::to_string_pretty(&message)?);
        return Ok(ExitCode::SUCCESS);
    }

    let result = relay.handle(&envelope).await;
    println!("{}", serde_json::to_string(&result)?);
    Ok(exit_for(result.is_success()))
}

fn read_event(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
    }
}

fn exit_for(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
