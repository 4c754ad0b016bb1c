//! Default values for sbomgen configuration.

/// Service account job runs execute as.
pub const DEFAULT_SERVICE_ACCOUNT: &str = "sbomer-sa";

/// Fixed execution ceiling applied to every job run.
pub const DEFAULT_JOB_TIMEOUT: &str = "6h";

/// Persistent volume claim holding generated BOMs.
pub const DEFAULT_WORKSPACE_CLAIM: &str = "sbomer-sboms";

/// Workspace binding name inside job runs.
pub const DEFAULT_WORKSPACE_NAME: &str = "data";

/// Task executed for each deliverable of an operation.
pub const DEFAULT_OPERATION_GENERATE_TASK: &str = "sbomer-operation-generate";

/// Task executed for each product of a build.
pub const DEFAULT_BUILD_GENERATE_TASK: &str = "sbomer-generate";

/// Mount point of the shared workspace.
pub const DEFAULT_OUTPUT_ROOT: &str = "/data";

/// File stem suffix of reconciled BOMs.
pub const DEFAULT_ENHANCED_SUFFIX: &str = "-enhanced";
