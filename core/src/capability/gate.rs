//! Bluetooth capability gate
//!
//! Run once at application start. Reads adapter and permission state from the
//! host, fires at most one "enable adapter" and one "request permissions"
//! prompt, and reports what it saw. It never waits for the prompts to be
//! answered: answers come back through the host's own result callback and are
//! routed by the optional [`RemediationBroker`].

use super::host::{CapabilityHost, HostError, RequestCode};
use super::permission::PermissionSet;
use super::remediation::{RemediationBroker, RemediationKind};
use super::state::CapabilityState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Request code used by the scanner app for both prompts.
pub const DEFAULT_REQUEST_CODE: RequestCode = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The host's service layer could not be reached. Not remediable by the
    /// user; callers should abort startup.
    #[error("Host capability service failed: {0}")]
    Host(#[from] HostError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Permissions checked on every evaluation, in request order.
    pub permissions: PermissionSet,
    pub enable_request_code: RequestCode,
    pub permission_request_code: RequestCode,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            permissions: PermissionSet::bluetooth_scan_defaults(),
            enable_request_code: DEFAULT_REQUEST_CODE,
            permission_request_code: DEFAULT_REQUEST_CODE,
        }
    }
}

pub struct CapabilityGate {
    host: Arc<dyn CapabilityHost>,
    config: GateConfig,
    broker: Option<Arc<RemediationBroker>>,
}

impl CapabilityGate {
    pub fn new(host: Arc<dyn CapabilityHost>) -> Self {
        Self::with_config(host, GateConfig::default())
    }

    pub fn with_config(host: Arc<dyn CapabilityHost>, config: GateConfig) -> Self {
        Self {
            host,
            config,
            broker: None,
        }
    }

    /// Record issued prompts in `broker` so their results can be awaited.
    pub fn with_broker(mut self, broker: Arc<RemediationBroker>) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn evaluate(&self) -> Result<CapabilityState, CapabilityError> {
        let adapter_present = self.host.adapter_present()?;
        tracing::debug!("Bluetooth adapter present: {}", adapter_present);

        if !adapter_present {
            tracing::info!("No Bluetooth adapter on this device; scanning unsupported");
            return Ok(CapabilityState::unsupported());
        }

        let adapter_enabled = self.host.adapter_enabled()?;
        tracing::debug!("Bluetooth adapter enabled: {}", adapter_enabled);

        if !adapter_enabled {
            let code = self.config.enable_request_code;
            tracing::info!("Bluetooth adapter disabled; requesting enable (code {})", code);
            self.record(RemediationKind::EnableAdapter, code);
            self.host.request_enable(code);
        }

        let mut missing = PermissionSet::empty();
        for permission in &self.config.permissions {
            if !self.host.permission_granted(permission)? {
                missing.insert(permission);
            }
        }

        if !missing.is_empty() {
            let code = self.config.permission_request_code;
            tracing::info!(
                "Requesting {} missing permission(s) (code {}): {:?}",
                missing.len(),
                code,
                missing.identifiers()
            );
            self.record(RemediationKind::RequestPermissions, code);
            self.host.request_permissions(missing.as_slice(), code);
        }

        Ok(CapabilityState {
            adapter_present,
            adapter_enabled,
            missing_permissions: missing,
        })
    }

    fn record(&self, kind: RemediationKind, code: RequestCode) {
        if let Some(broker) = &self.broker {
            broker.issued(kind, code);
        }
    }
}
