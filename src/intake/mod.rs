//! Event intake.
//!
//! Filters upstream lifecycle notifications and emits commands that create
//! new generation requests. Intake never talks to the orchestrator; a new
//! request is picked up by the next reconcile tick.

mod consumer;
mod handler;
mod notification;

pub use consumer::{Delivery, IntakeMetrics, NotificationConsumer, RequestSink};
pub use handler::{generate_request_name, NewRequestCommand, NotificationHandler, REQUEST_NAME_PREFIX};
pub use notification::{
    BuildRef, BuildStateChange, BuildStatus, DeliverableAnalysisStateChange, Notification,
    ProgressStatus, BUILD_STATE_CHANGE, DELIVERABLE_ANALYSIS_STATE_CHANGE,
};
