//! Shared string constants used across slices.

/// Service name reported by system endpoints.
pub const SERVICE_NAME: &str = "filehub";

/// OpenAPI tag for system endpoints.
pub const SYSTEM_TAG: &str = "system";
/// OpenAPI tag for directory and file endpoints.
pub const FILES_TAG: &str = "files";
/// OpenAPI tag for resumable upload endpoints.
pub const UPLOADS_TAG: &str = "uploads";
/// OpenAPI tag for share endpoints.
pub const SHARES_TAG: &str = "shares";

/// Hidden scratch subdirectory that holds in-flight upload chunks.
pub const SCRATCH_DIR: &str = ".upload-temp";
