//! Bluetooth capability gating
//!
//! - `permission`: the runtime permission model and its platform identifiers
//! - `host`: trait the platform implements to answer queries and show prompts
//! - `gate`: the single-pass readiness check run at startup
//! - `remediation`: routing of prompt results back to interested callers

pub mod gate;
pub mod host;
pub mod permission;
pub mod remediation;
pub mod state;

pub use gate::{CapabilityError, CapabilityGate, GateConfig, DEFAULT_REQUEST_CODE};
pub use host::{CapabilityHost, HostError, RequestCode};
pub use permission::{PermissionParseError, PermissionRequirement, PermissionSet};
pub use remediation::{
    PendingRemediation, RemediationBroker, RemediationError, RemediationKind, RemediationOutcome,
};
pub use state::{CapabilityState, CapabilityVerdict};
