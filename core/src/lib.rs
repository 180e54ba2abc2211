// PeekBlock Core — device readiness and scan fixtures
//
// Shared by the mobile bindings (capability gate) and the desktop CLI
// (mock scan service). The two halves do not depend on each other.

pub mod capability;
pub mod scan;

pub use capability::{
    CapabilityError, CapabilityGate, CapabilityHost, CapabilityState, CapabilityVerdict,
    GateConfig, HostError, PendingRemediation, PermissionParseError, PermissionRequirement,
    PermissionSet, RemediationBroker, RemediationError, RemediationKind, RemediationOutcome, RequestCode,
};
pub use scan::{FixtureError, ScanFixture, ScanResultEntry};

