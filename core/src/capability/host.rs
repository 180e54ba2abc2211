// Host capability API
//
// Implemented by platform code (Android activity, iOS delegate, or a test
// double). Queries must be fast local lookups; the two request methods are
// fire-and-forget and must not block until the user answers.

use super::permission::PermissionRequirement;
use thiserror::Error;

/// Correlation token pairing a remediation prompt with its eventual result.
pub type RequestCode = i32;

/// Failure of the host's own service layer.
///
/// Missing hardware or denied permissions are never reported this way; they
/// are ordinary values in `CapabilityState`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Host service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Host query failed: {0}")]
    Query(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait CapabilityHost: Send + Sync {
    /// Whether the device exposes Bluetooth hardware at all.
    fn adapter_present(&self) -> Result<bool, HostError>;

    /// Whether the adapter is powered on. Only asked when one is present.
    fn adapter_enabled(&self) -> Result<bool, HostError>;

    /// Ask the user to turn the adapter on.
    fn request_enable(&self, request_code: RequestCode);

    fn permission_granted(&self, permission: PermissionRequirement) -> Result<bool, HostError>;

    /// Ask the user for every permission in `permissions` in a single prompt.
    fn request_permissions(&self, permissions: &[PermissionRequirement], request_code: RequestCode);
}
