//! Intake command handler.
//!
//! Feeds one notification through event intake and prints the generation
//! request resource it would create.

use super::output::{write_output, OutputFormat, OutputTarget};
use crate::config::TriggerMode;
use crate::intake::{Delivery, NotificationConsumer, NotificationHandler};
use crate::orchestrator::{InMemoryRequestStore, RequestStore};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Inputs of the `intake` subcommand.
#[derive(Debug, Clone)]
pub struct IntakeCommandConfig {
    /// Transport `type` property of the message
    pub message_type: String,
    /// Message body (JSON)
    pub payload: PathBuf,
    pub trigger: TriggerMode,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

/// Run the intake command. Returns the process exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_intake(config: IntakeCommandConfig) -> Result<i32> {
    let payload = std::fs::read_to_string(&config.payload)
        .with_context(|| format!("failed to read {}", config.payload.display()))?;

    let store = Arc::new(InMemoryRequestStore::new());
    let consumer = NotificationConsumer::new(NotificationHandler::new(config.trigger), store.clone());

    if let Delivery::Nack(reason) = consumer.process(Some(config.message_type.as_str()), &payload) {
        eprintln!("Message rejected: {reason}");
        return Ok(1);
    }

    let created = store.list().context("failed to list created requests")?;
    if created.is_empty() {
        if !config.quiet {
            eprintln!("No generation request created");
        }
        return Ok(0);
    }

    let target = OutputTarget::from_option(config.output);
    for resource in &created {
        write_output(&config.format.render(resource)?, &target, config.quiet)?;
    }
    Ok(0)
}
