// peekblock-mobile — Native mobile bindings for iOS and Android
//
// Exposes the Bluetooth capability gate through UniFFI. Platform code
// implements `HostBridge` (adapter lookups, permission checks, prompts) and
// forwards its activity / permission result callbacks to `BluetoothGate`.
//
// Log output goes through `tracing`; the library never installs a
// subscriber. Host apps that want Rust logs register one themselves (for
// example a logcat or os_log layer) before creating the gate.

use peekblock_core::{
    CapabilityGate, CapabilityHost, CapabilityState, CapabilityVerdict, GateConfig, HostError,
    PendingRemediation, PermissionRequirement, PermissionSet, RemediationBroker,
    RemediationKind, RemediationOutcome, RequestCode,
};
use std::sync::Arc;

uniffi::setup_scaffolding!();

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MobileError {
    #[error("Host service unavailable: {reason}")]
    HostUnavailable { reason: String },
    #[error("Host query failed: {reason}")]
    HostQuery { reason: String },
    #[error("Unknown permission identifier: {identifier}")]
    UnknownPermission { identifier: String },
    #[error("Unexpected host callback failure: {reason}")]
    Callback { reason: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for MobileError {
    fn from(err: uniffi::UnexpectedUniFFICallbackError) -> Self {
        MobileError::Callback { reason: err.reason }
    }
}

impl From<HostError> for MobileError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::ServiceUnavailable(reason) => MobileError::HostUnavailable { reason },
            HostError::Query(reason) => MobileError::HostQuery { reason },
        }
    }
}

impl From<peekblock_core::CapabilityError> for MobileError {
    fn from(err: peekblock_core::CapabilityError) -> Self {
        match err {
            peekblock_core::CapabilityError::Host(e) => e.into(),
        }
    }
}

impl From<peekblock_core::PermissionParseError> for MobileError {
    fn from(err: peekblock_core::PermissionParseError) -> Self {
        MobileError::UnknownPermission { identifier: err.0 }
    }
}

// ============================================================================
// HOST BRIDGE (implemented by Kotlin / Swift)
// ============================================================================

/// Platform side of the capability check.
///
/// Permission arguments are platform identifier strings such as
/// `android.permission.BLUETOOTH_SCAN`. The two `request_*` methods must
/// return immediately; results come back via `BluetoothGate::on_*_result`.
#[uniffi::export(with_foreign)]
pub trait HostBridge: Send + Sync {
    fn adapter_present(&self) -> Result<bool, MobileError>;
    fn adapter_enabled(&self) -> Result<bool, MobileError>;
    fn request_enable(&self, request_code: i32);
    fn permission_granted(&self, permission: String) -> Result<bool, MobileError>;
    fn request_permissions(&self, permissions: Vec<String>, request_code: i32);
}

struct ForeignHost {
    bridge: Arc<dyn HostBridge>,
}

fn host_error(err: MobileError) -> HostError {
    match err {
        MobileError::HostUnavailable { reason } => HostError::ServiceUnavailable(reason),
        other => HostError::Query(other.to_string()),
    }
}

impl CapabilityHost for ForeignHost {
    fn adapter_present(&self) -> Result<bool, HostError> {
        self.bridge.adapter_present().map_err(host_error)
    }

    fn adapter_enabled(&self) -> Result<bool, HostError> {
        self.bridge.adapter_enabled().map_err(host_error)
    }

    fn request_enable(&self, request_code: RequestCode) {
        self.bridge.request_enable(request_code);
    }

    fn permission_granted(&self, permission: PermissionRequirement) -> Result<bool, HostError> {
        self.bridge
            .permission_granted(permission.identifier().to_string())
            .map_err(host_error)
    }

    fn request_permissions(&self, permissions: &[PermissionRequirement], request_code: RequestCode) {
        let identifiers = permissions
            .iter()
            .map(|p| p.identifier().to_string())
            .collect();
        self.bridge.request_permissions(identifiers, request_code);
    }
}

// ============================================================================
// DATA TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum Readiness {
    Unsupported,
    NeedsRemediation,
    Ready,
}

impl From<CapabilityVerdict> for Readiness {
    fn from(verdict: CapabilityVerdict) -> Self {
        match verdict {
            CapabilityVerdict::Unsupported => Readiness::Unsupported,
            CapabilityVerdict::NeedsRemediation => Readiness::NeedsRemediation,
            CapabilityVerdict::Ready => Readiness::Ready,
        }
    }
}

/// Result of one `BluetoothGate::evaluate` call, as seen before any prompt
/// was answered.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct CapabilityReport {
    pub adapter_present: bool,
    pub adapter_enabled: bool,
    pub missing_permissions: Vec<String>,
    pub readiness: Readiness,
}

impl From<CapabilityState> for CapabilityReport {
    fn from(state: CapabilityState) -> Self {
        Self {
            adapter_present: state.adapter_present,
            adapter_enabled: state.adapter_enabled,
            missing_permissions: state.missing_permissions.identifiers(),
            readiness: state.verdict().into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct GateOptions {
    /// Platform identifiers, checked and requested in this order
    pub permissions: Vec<String>,
    pub enable_request_code: i32,
    pub permission_request_code: i32,
}

impl From<GateConfig> for GateOptions {
    fn from(config: GateConfig) -> Self {
        Self {
            permissions: config.permissions.identifiers(),
            enable_request_code: config.enable_request_code,
            permission_request_code: config.permission_request_code,
        }
    }
}

impl TryFrom<GateOptions> for GateConfig {
    type Error = MobileError;

    fn try_from(options: GateOptions) -> Result<Self, Self::Error> {
        Ok(GateConfig {
            permissions: PermissionSet::from_identifiers(&options.permissions)?,
            enable_request_code: options.enable_request_code,
            permission_request_code: options.permission_request_code,
        })
    }
}

/// Options matching the scanner app: five Bluetooth/location permissions and
/// request code 1 for both prompts.
#[uniffi::export]
pub fn default_gate_options() -> GateOptions {
    GateConfig::default().into()
}

// ============================================================================
// GATE OBJECT
// ============================================================================

#[derive(uniffi::Object)]
pub struct BluetoothGate {
    gate: CapabilityGate,
    broker: Arc<RemediationBroker>,
}

#[uniffi::export]
impl BluetoothGate {
    #[uniffi::constructor]
    pub fn new(host: Arc<dyn HostBridge>) -> Arc<Self> {
        Arc::new(Self::build(host, GateConfig::default()))
    }

    #[uniffi::constructor]
    pub fn with_options(
        host: Arc<dyn HostBridge>,
        options: GateOptions,
    ) -> Result<Arc<Self>, MobileError> {
        let config = GateConfig::try_from(options)?;
        Ok(Arc::new(Self::build(host, config)))
    }

    /// Run the readiness check. Call once from `onCreate`.
    pub fn evaluate(&self) -> Result<CapabilityReport, MobileError> {
        let state = self.gate.evaluate()?;
        Ok(state.into())
    }

    pub fn options(&self) -> GateOptions {
        self.gate.config().clone().into()
    }

    /// Forward the result of the "enable Bluetooth" activity.
    ///
    /// Returns the number of Rust-side waiters that were completed.
    pub fn on_enable_result(&self, request_code: i32, granted: bool) -> u32 {
        self.broker.deliver(
            RemediationKind::EnableAdapter,
            request_code,
            RemediationOutcome { granted },
        ) as u32
    }

    /// Forward `onRequestPermissionsResult`. `grants[i]` answers
    /// `permissions[i]`; an empty list means the dialog was dismissed.
    pub fn on_permissions_result(
        &self,
        request_code: i32,
        permissions: Vec<String>,
        grants: Vec<bool>,
    ) -> u32 {
        tracing::debug!(
            "Permission result (code {}): {:?} -> {:?}",
            request_code,
            permissions,
            grants
        );
        self.broker.deliver(
            RemediationKind::RequestPermissions,
            request_code,
            RemediationOutcome::from_grants(&grants),
        ) as u32
    }

    /// Drop all outstanding prompts, e.g. when the activity is destroyed.
    pub fn reset(&self) {
        self.broker.abandon_all();
    }
}

impl BluetoothGate {
    fn build(host: Arc<dyn HostBridge>, config: GateConfig) -> Self {
        let broker = Arc::new(RemediationBroker::new());
        let host: Arc<dyn CapabilityHost> = Arc::new(ForeignHost { bridge: host });
        let gate = CapabilityGate::with_config(host, config).with_broker(broker.clone());
        Self { gate, broker }
    }

    /// Await the next result for a prompt from Rust code.
    pub fn subscribe(&self, kind: RemediationKind, request_code: RequestCode) -> PendingRemediation {
        self.broker.subscribe(kind, request_code)
    }
}
