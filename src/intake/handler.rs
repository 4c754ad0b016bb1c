//! Turns qualifying notifications into new-request commands.

use super::notification::{Notification, ProgressStatus};
use crate::config::TriggerMode;
use crate::model::{
    DeliverableConfig, GenerationRequest, GenerationType, OperationConfig, ProductConfig,
    RequestConfig,
};
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static INVALID_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9-]+").expect("static regex"));

/// Prefix of generated request names.
pub const REQUEST_NAME_PREFIX: &str = "sbom-request";

/// Request to create a new generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequestCommand {
    pub request: GenerationRequest,
}

/// Generated, non content-addressed request name.
///
/// Redelivered notifications produce distinct names and therefore
/// distinct requests.
#[must_use]
pub fn generate_request_name(correlation_id: &str) -> String {
    let id = INVALID_NAME_CHARS
        .replace_all(&correlation_id.to_lowercase(), "-")
        .trim_matches('-')
        .to_string();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{REQUEST_NAME_PREFIX}-{id}-{}", &suffix[..8])
}

fn generate_request_id() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_uppercase()
}

/// Filters notifications according to the trigger mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationHandler {
    trigger: TriggerMode,
}

impl NotificationHandler {
    #[must_use]
    pub const fn new(trigger: TriggerMode) -> Self {
        Self { trigger }
    }

    /// Emit a create command for a finished upstream activity, or nothing.
    #[must_use]
    pub fn handle(&self, notification: &Notification) -> Option<NewRequestCommand> {
        let Some(correlation_id) = notification.correlation_id() else {
            tracing::warn!("Received notification without a correlation id, ignoring");
            return None;
        };

        let (accepted, kind) = match notification {
            Notification::Build(_) => (self.trigger.accepts_builds(), GenerationType::Build),
            Notification::DeliverableAnalysis(_) => {
                (self.trigger.accepts_operations(), GenerationType::Operation)
            }
        };
        if !accepted {
            tracing::warn!(
                "Trigger mode is {}, skipping generation for {} '{}'",
                self.trigger,
                kind,
                correlation_id
            );
            return None;
        }

        if !is_finished_successfully(notification) {
            tracing::debug!(
                "Notification for {} '{}' is not a finished success, ignoring",
                kind,
                correlation_id
            );
            return None;
        }

        let name = generate_request_name(correlation_id);
        let mut request = GenerationRequest::new(&name, generate_request_id(), kind, correlation_id);
        if let Notification::DeliverableAnalysis(analysis) = notification {
            request.set_config(RequestConfig::Operation(OperationConfig {
                operation_id: correlation_id.to_string(),
                product: ProductConfig::default(),
                deliverables: analysis
                    .deliverables_urls
                    .iter()
                    .zip(0u32..)
                    .map(|(url, index)| DeliverableConfig {
                        index,
                        url: url.clone(),
                        pom: None,
                    })
                    .collect(),
            }));
        }

        tracing::info!(
            "Triggering automated generation for {} '{}' as '{}'",
            kind,
            correlation_id,
            name
        );
        Some(NewRequestCommand { request })
    }
}

fn is_finished_successfully(notification: &Notification) -> bool {
    match notification {
        Notification::Build(change) => change.build.as_ref().is_some_and(|b| {
            b.progress == Some(ProgressStatus::Finished)
                && b.status.is_some_and(|s| s.is_successful())
        }),
        Notification::DeliverableAnalysis(change) => {
            change.status == Some(ProgressStatus::Finished)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_name_shape() {
        let name = generate_request_name("AX5T_JMY");
        assert!(name.starts_with("sbom-request-ax5t-jmy-"));
        assert_eq!(name.len(), "sbom-request-ax5t-jmy-".len() + 8);
        assert_ne!(name, generate_request_name("AX5T_JMY"));
    }
}
