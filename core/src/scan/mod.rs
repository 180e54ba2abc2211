// Simulated scan results
//
// Stand-ins for the hits a scanning peripheral would report. The wire shape
// (`mac` + `rssi`) mirrors the peripheral's payload and must not change.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanResultEntry {
    /// Hardware address, free-form (not checked for MAC syntax)
    pub mac: String,
    /// Signal strength, dBm by convention
    pub rssi: i32,
}

impl ScanResultEntry {
    pub fn new(mac: impl Into<String>, rssi: i32) -> Self {
        Self {
            mac: mac.into(),
            rssi,
        }
    }
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse fixture file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable, ordered list of scan results served by the mock service.
///
/// Cheap to clone; every clone shares the same entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFixture {
    entries: Arc<[ScanResultEntry]>,
}

impl Default for ScanFixture {
    fn default() -> Self {
        Self::new(vec![
            ScanResultEntry::new("00:1A:2B:3C:4D:5E", -45),
            ScanResultEntry::new("11:22:33:44:55:66", -60),
            ScanResultEntry::new("77:88:99:AA:BB:CC", -30),
        ])
    }
}

impl ScanFixture {
    pub fn new(entries: Vec<ScanResultEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// Load a fixture from a JSON array of `{"mac": .., "rssi": ..}` objects.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let entries: Vec<ScanResultEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[ScanResultEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_fixture_wire_format() {
        let json = ScanFixture::default().to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"mac":"00:1A:2B:3C:4D:5E","rssi":-45},{"mac":"11:22:33:44:55:66","rssi":-60},{"mac":"77:88:99:AA:BB:CC","rssi":-30}]"#
        );
    }

    #[test]
    fn test_clones_share_entries() {
        let fixture = ScanFixture::default();
        let clone = fixture.clone();
        assert!(std::ptr::eq(fixture.entries(), clone.entries()));
    }

    #[test]
    fn test_addresses_are_not_validated() {
        let fixture = ScanFixture::from_json(r#"[{"mac":"not-a-mac","rssi":12}]"#).unwrap();
        assert_eq!(fixture.entries(), &[ScanResultEntry::new("not-a-mac", 12)]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"mac":"AA:BB","rssi":-70}},{{"mac":"CC:DD","rssi":-80}}]"#).unwrap();

        let fixture = ScanFixture::from_json_file(file.path()).unwrap();
        assert_eq!(fixture.len(), 2);
        assert_eq!(fixture.entries()[1].rssi, -80);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"address":"AA:BB"}}]"#).unwrap();

        assert!(matches!(
            ScanFixture::from_json_file(file.path()),
            Err(FixtureError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            ScanFixture::from_json_file("/nonexistent/fixture.json"),
            Err(FixtureError::Io(_))
        ));
    }
}
