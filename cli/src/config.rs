// Configuration management for the PeekBlock CLI
//
// Cross-platform config stored in:
// - macOS: ~/Library/Application Support/peekblock/config.json
// - Linux: ~/.config/peekblock/config.json
// - Windows: %APPDATA%\peekblock\config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Environment override for the scan server port
pub const SCAN_PORT_ENV: &str = "PEEKBLOCK_SCAN_PORT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port for the mock scan service
    pub scan_port: u16,

    /// Address both servers bind to
    pub bind_address: String,

    /// Port for the WebSocket echo server
    pub echo_port: u16,

    /// JSON file replacing the built-in scan results
    pub fixture_path: Option<String>,

    /// Directory for daily-rolling log files
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_port: 3000,
            bind_address: "0.0.0.0".to_string(),
            echo_port: 81,
            fixture_path: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// Get the config directory path (cross-platform)
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("peekblock");

        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir)
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
            let config: Config =
                serde_json::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Set a config value (not persisted until `save`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "scan_port" => {
                self.scan_port = value.parse().context("Invalid port number")?;
            }
            "echo_port" => {
                self.echo_port = value.parse().context("Invalid port number")?;
            }
            "bind_address" => {
                value
                    .parse::<IpAddr>()
                    .context("Invalid IP address")?;
                self.bind_address = value.to_string();
            }
            "fixture_path" => {
                self.fixture_path = optional(value);
            }
            "log_dir" => {
                self.log_dir = optional(value);
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "scan_port" => Some(self.scan_port.to_string()),
            "echo_port" => Some(self.echo_port.to_string()),
            "bind_address" => Some(self.bind_address.clone()),
            "fixture_path" => self.fixture_path.clone(),
            "log_dir" => self.log_dir.clone(),
            _ => None,
        }
    }

    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            ("scan_port".to_string(), self.scan_port.to_string()),
            ("echo_port".to_string(), self.echo_port.to_string()),
            ("bind_address".to_string(), self.bind_address.clone()),
            (
                "fixture_path".to_string(),
                self.fixture_path
                    .clone()
                    .unwrap_or_else(|| "(built-in)".to_string()),
            ),
            (
                "log_dir".to_string(),
                self.log_dir.clone().unwrap_or_else(|| "(stdout only)".to_string()),
            ),
        ]
    }

    /// Socket address for `port` on the configured bind address
    pub fn socket_addr(&self, bind: Option<&str>, port: u16) -> Result<SocketAddr> {
        let ip: IpAddr = bind
            .unwrap_or(&self.bind_address)
            .parse()
            .context("Invalid bind address")?;
        Ok(SocketAddr::new(ip, port))
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Resolve a listen port: command-line flag, then environment, then config.
pub fn pick_port(flag: Option<u16>, env_value: Option<&str>, configured: u16) -> Result<u16> {
    if let Some(port) = flag {
        return Ok(port);
    }
    match env_value {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid port in {}: {:?}", SCAN_PORT_ENV, raw)),
        _ => Ok(configured),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scan_port, 3000);
        assert_eq!(config.echo_port, 81);
        assert!(config.fixture_path.is_none());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_set_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::load_from(&path).unwrap();
        config.set("scan_port", "3100").unwrap();
        config.set("fixture_path", "/tmp/fixture.json").unwrap();
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.scan_port, 3100);
        assert_eq!(reloaded.get("fixture_path").as_deref(), Some("/tmp/fixture.json"));

        config.set("fixture_path", "").unwrap();
        assert!(config.fixture_path.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"scan_port": 4000}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.scan_port, 4000);
        assert_eq!(config.echo_port, 81);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("scan_port", "seventy").is_err());
        assert!(config.set("bind_address", "not-an-ip").is_err());
        assert!(config.set("max_peers", "5").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_pick_port_precedence() {
        assert_eq!(pick_port(Some(8080), Some("9000"), 3000).unwrap(), 8080);
        assert_eq!(pick_port(None, Some("9000"), 3000).unwrap(), 9000);
        assert_eq!(pick_port(None, Some(""), 3000).unwrap(), 3000);
        assert_eq!(pick_port(None, None, 3000).unwrap(), 3000);
        assert!(pick_port(None, Some("abc"), 3000).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::default();
        assert_eq!(
            config.socket_addr(None, 3000).unwrap(),
            "0.0.0.0:3000".parse().unwrap()
        );
        assert_eq!(
            config.socket_addr(Some("127.0.0.1"), 81).unwrap(),
            "127.0.0.1:81".parse().unwrap()
        );
    }
}
