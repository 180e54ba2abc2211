use super::permission::PermissionSet;
use serde::{Deserialize, Serialize};

/// Snapshot of the host's Bluetooth readiness, taken by a single
/// `CapabilityGate::evaluate` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityState {
    pub adapter_present: bool,
    /// Always false when `adapter_present` is false.
    pub adapter_enabled: bool,
    pub missing_permissions: PermissionSet,
}

/// Coarse reading of a [`CapabilityState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityVerdict {
    /// No Bluetooth hardware; nothing the user can do.
    Unsupported,
    /// Adapter off or permissions missing; prompts may have been issued.
    NeedsRemediation,
    Ready,
}

impl CapabilityState {
    pub fn unsupported() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.verdict() == CapabilityVerdict::Ready
    }

    pub fn verdict(&self) -> CapabilityVerdict {
        if !self.adapter_present {
            CapabilityVerdict::Unsupported
        } else if !self.adapter_enabled || !self.missing_permissions.is_empty() {
            CapabilityVerdict::NeedsRemediation
        } else {
            CapabilityVerdict::Ready
        }
    }
}

impl std::fmt::Display for CapabilityVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "Unsupported"),
            Self::NeedsRemediation => write!(f, "NeedsRemediation"),
            Self::Ready => write!(f, "Ready"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::PermissionRequirement;

    #[test]
    fn test_verdicts() {
        assert_eq!(
            CapabilityState::unsupported().verdict(),
            CapabilityVerdict::Unsupported
        );

        let mut state = CapabilityState {
            adapter_present: true,
            adapter_enabled: true,
            missing_permissions: PermissionSet::empty(),
        };
        assert!(state.is_ready());

        state
            .missing_permissions
            .insert(PermissionRequirement::BluetoothScan);
        assert_eq!(state.verdict(), CapabilityVerdict::NeedsRemediation);
    }
}
