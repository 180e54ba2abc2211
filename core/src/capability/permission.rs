//! Runtime permission model
//!
//! The identifiers are the platform's own permission strings and must match
//! them byte for byte; the host compares them against its grant table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A runtime permission the operating system requires before Bluetooth
/// operations are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PermissionRequirement {
    /// Discover nearby devices (API 31+)
    BluetoothScan,
    /// Connect to paired devices (API 31+)
    BluetoothConnect,
    /// Legacy Bluetooth access (API <= 30)
    Bluetooth,
    /// Legacy Bluetooth admin (API <= 30)
    BluetoothAdmin,
    AccessCoarseLocation,
    AccessFineLocation,
}

impl PermissionRequirement {
    pub const ALL: [PermissionRequirement; 6] = [
        Self::BluetoothScan,
        Self::BluetoothConnect,
        Self::Bluetooth,
        Self::BluetoothAdmin,
        Self::AccessCoarseLocation,
        Self::AccessFineLocation,
    ];

    /// Platform identifier string for this permission.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::BluetoothScan => "android.permission.BLUETOOTH_SCAN",
            Self::BluetoothConnect => "android.permission.BLUETOOTH_CONNECT",
            Self::Bluetooth => "android.permission.BLUETOOTH",
            Self::BluetoothAdmin => "android.permission.BLUETOOTH_ADMIN",
            Self::AccessCoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
            Self::AccessFineLocation => "android.permission.ACCESS_FINE_LOCATION",
        }
    }
}

impl fmt::Display for PermissionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown permission identifier: {0}")]
pub struct PermissionParseError(pub String);

impl FromStr for PermissionRequirement {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.identifier() == s)
            .ok_or_else(|| PermissionParseError(s.to_string()))
    }
}

/// Ordered, duplicate-free collection of permission requirements.
///
/// Order is preserved so that the host sees the permissions in the same order
/// on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    items: Vec<PermissionRequirement>,
}

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The set the scanner application requires at startup.
    pub fn bluetooth_scan_defaults() -> Self {
        [
            PermissionRequirement::Bluetooth,
            PermissionRequirement::BluetoothAdmin,
            PermissionRequirement::BluetoothScan,
            PermissionRequirement::BluetoothConnect,
            PermissionRequirement::AccessFineLocation,
        ]
        .into_iter()
        .collect()
    }

    /// Inserts `permission` at the end; returns false if it was already present.
    pub fn insert(&mut self, permission: PermissionRequirement) -> bool {
        if self.items.contains(&permission) {
            return false;
        }
        self.items.push(permission);
        true
    }

    pub fn contains(&self, permission: PermissionRequirement) -> bool {
        self.items.contains(&permission)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PermissionRequirement> + '_ {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[PermissionRequirement] {
        &self.items
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.iter().map(|p| p.identifier().to_string()).collect()
    }

    /// Parse a list of platform identifier strings.
    pub fn from_identifiers<I, S>(identifiers: I) -> Result<Self, PermissionParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        identifiers
            .into_iter()
            .map(|s| s.as_ref().parse::<PermissionRequirement>())
            .collect()
    }
}

impl FromIterator<PermissionRequirement> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = PermissionRequirement>>(iter: T) -> Self {
        let mut set = Self::empty();
        for permission in iter {
            set.insert(permission);
        }
        set
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = PermissionRequirement;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, PermissionRequirement>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter().copied()
    }
}
