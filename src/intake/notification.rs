//! Inbound lifecycle notifications.

use serde::{Deserialize, Serialize};

/// Transport `type` property of a build state change.
pub const BUILD_STATE_CHANGE: &str = "BuildStateChange";
/// Transport `type` property of a deliverable analysis state change.
pub const DELIVERABLE_ANALYSIS_STATE_CHANGE: &str = "DeliverableAnalysisStateChange";

/// Progress of the upstream activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    Pending,
    InProgress,
    Finished,
    #[serde(other)]
    Unknown,
}

/// Build outcome carried by a build notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    Success,
    NoRebuildRequired,
    Failed,
    Cancelled,
    SystemError,
    #[serde(other)]
    Unknown,
}

impl BuildStatus {
    /// Whether the build produced usable artifacts.
    #[must_use]
    pub const fn is_successful(self) -> bool {
        matches!(self, Self::Success | Self::NoRebuildRequired)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "buildProgress")]
    pub progress: Option<ProgressStatus>,
    #[serde(default, alias = "buildStatus")]
    pub status: Option<BuildStatus>,
}

/// A build changed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStateChange {
    #[serde(default)]
    pub old_status: Option<String>,
    #[serde(default)]
    pub new_status: Option<String>,
    #[serde(default)]
    pub build: Option<BuildRef>,
}

/// A deliverable analysis operation changed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverableAnalysisStateChange {
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub status: Option<ProgressStatus>,
    #[serde(default)]
    pub deliverables_urls: Vec<String>,
}

/// A decoded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Build(BuildStateChange),
    DeliverableAnalysis(DeliverableAnalysisStateChange),
}

impl Notification {
    /// Decode a payload according to its transport `type` property.
    ///
    /// `Ok(None)` means the type is not one this system consumes.
    pub fn decode(message_type: Option<&str>, payload: &str) -> serde_json::Result<Option<Self>> {
        match message_type {
            Some(BUILD_STATE_CHANGE) => serde_json::from_str(payload).map(|b| Some(Self::Build(b))),
            Some(DELIVERABLE_ANALYSIS_STATE_CHANGE) => {
                serde_json::from_str(payload).map(|d| Some(Self::DeliverableAnalysis(d)))
            }
            _ => Ok(None),
        }
    }

    /// Build id or operation id, if the message carries a non-empty one.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        let id = match self {
            Self::Build(b) => b.build.as_ref().and_then(|b| b.id.as_deref()),
            Self::DeliverableAnalysis(d) => d.operation_id.as_deref(),
        };
        id.map(str::trim).filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_build() {
        let payload = r#"{"oldStatus":"BUILDING","newStatus":"SUCCESS",
            "build":{"id":"AX5TJMYHQAIAE","progress":"FINISHED","status":"SUCCESS"}}"#;
        let n = Notification::decode(Some(BUILD_STATE_CHANGE), payload).unwrap().unwrap();
        assert_eq!(n.correlation_id(), Some("AX5TJMYHQAIAE"));
    }

    #[test]
    fn test_decode_unknown_status() {
        let payload = r#"{"operationId":"A1","status":"SOMETHING_NEW"}"#;
        let n = Notification::decode(Some(DELIVERABLE_ANALYSIS_STATE_CHANGE), payload)
            .unwrap()
            .unwrap();
        match n {
            Notification::DeliverableAnalysis(d) => {
                assert_eq!(d.status, Some(ProgressStatus::Unknown));
            }
            Notification::Build(_) => panic!("wrong kind"),
        }
    }

    #[test]
    fn test_unknown_type_is_none() {
        assert!(Notification::decode(Some("Other"), "not json").unwrap().is_none());
        assert!(Notification::decode(None, "{}").unwrap().is_none());
    }
}
