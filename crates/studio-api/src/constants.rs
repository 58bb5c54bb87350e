//! API constants

/// Header naming the caller an upload is attributed to.
pub const ACTING_USER_HEADER: &str = "x-user-email";

/// Request id header, propagated when supplied by the client.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Allowance on top of the file size limit for multipart boundaries, part headers and
/// other form fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Deadline for each dependency probe in `/health`.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 1;
