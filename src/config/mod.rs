//! Configuration management for tamalink
//!
//! Layered TOML configuration: compiled-in defaults, optionally overridden
//! by a config file, then by `TAMALINK_*` environment variables. Every
//! section has serde defaults so a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::selection::SelectionMode;
use crate::ssid::{self, SsidMode};

/// Default location of the config file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/tamalink/config.toml";

/// Default state directory for the cycle cursor and exclusion record
const DEFAULT_STATE_DIR: &str = "/var/lib/tamalink";

// ============================================================================
// Sections
// ============================================================================

/// Network and radio settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Physical wireless interface to piggyback on
    pub interface: String,

    /// Virtual AP interface created on top of it
    pub ap_interface: String,

    /// Gateway address handed to clients
    pub gateway: String,

    /// DHCP lease range, `start,end` form as dnsmasq expects
    pub dhcp_range: String,

    /// 2.4 GHz channel; `None` auto-detects from the station link
    pub channel: Option<u32>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interface: "wlan0".to_string(),
            ap_interface: "tama0".to_string(),
            gateway: "192.168.4.1".to_string(),
            dhcp_range: "192.168.4.10,192.168.4.100".to_string(),
            channel: None,
        }
    }
}

/// Broadcast name settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SsidConfig {
    /// How the SSID is chosen
    pub mode: SsidMode,

    /// Default network name for normal mode
    pub name: String,

    /// User-supplied name for custom mode
    pub custom: String,

    /// Index into the active special SSID pool for special mode
    pub special_index: usize,
}

impl Default for SsidConfig {
    fn default() -> Self {
        Self {
            mode: SsidMode::Normal,
            name: "TamaLink".to_string(),
            custom: String::new(),
            special_index: 0,
        }
    }
}

/// WPA2 security settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Fixed WPA2 passphrase; empty broadcasts an open network
    pub password: String,

    /// Rotate a deterministic passphrase daily instead of the fixed one
    pub daily_password: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            password: String::new(),
            daily_password: false,
        }
    }
}

/// Character selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Selection mode
    pub mode: SelectionMode,

    /// Catalog index for fixed mode
    pub fixed_character_index: usize,

    /// Mix special SSIDs into rotation alongside MAC characters
    pub include_special_ssids: bool,

    /// Honor the user's exclusion list in rotation modes
    pub respect_exclusions: bool,

    /// Limit seasonal characters to their season
    pub seasonal_filter: bool,

    /// Backing file for the cycle cursor
    pub cycle_file: PathBuf,

    /// Backing file for the exclusion record
    pub exclusions_file: PathBuf,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            mode: SelectionMode::DailyRandom,
            fixed_character_index: 0,
            include_special_ssids: true,
            respect_exclusions: true,
            seasonal_filter: false,
            cycle_file: PathBuf::from(DEFAULT_STATE_DIR).join("cycle.txt"),
            exclusions_file: PathBuf::from(DEFAULT_STATE_DIR).join("exclusions.json"),
        }
    }
}

/// Web control panel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Serve the control API at all
    pub enabled: bool,

    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

// ============================================================================
// Config
// ============================================================================

/// Complete tamalink configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub ssid: SsidConfig,
    pub security: SecurityConfig,
    pub selection: SelectionConfig,
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;

        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from the given file if it exists, otherwise start from defaults
    ///
    /// Environment overrides and validation apply either way.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `TAMALINK_*` environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(interface) = std::env::var("TAMALINK_INTERFACE") {
            self.network.interface = interface;
        }
        if let Ok(ssid_name) = std::env::var("TAMALINK_SSID") {
            self.ssid.name = ssid_name;
        }
        if let Ok(password) = std::env::var("TAMALINK_PASSWORD") {
            self.security.password = password;
        }
        if let Ok(mode) = std::env::var("TAMALINK_MODE") {
            if let Some(mode) = SelectionMode::from_id(&mode) {
                self.selection.mode = mode;
            } else {
                tracing::warn!(value = %mode, "Ignoring invalid TAMALINK_MODE");
            }
        }
        if let Ok(port) = std::env::var("TAMALINK_WEB_PORT") {
            if let Ok(port) = port.parse() {
                self.web.port = port;
            } else {
                tracing::warn!(value = %port, "Ignoring invalid TAMALINK_WEB_PORT");
            }
        }
    }

    /// Validate settings that can only be caught at load time
    pub fn validate(&self) -> Result<()> {
        if self.network.interface.is_empty() {
            return Err(Error::config("network.interface must not be empty"));
        }
        if self.network.ap_interface == self.network.interface {
            return Err(Error::config(
                "network.ap_interface must differ from network.interface",
            ));
        }
        if let Some(channel) = self.network.channel {
            if !(1..=14).contains(&channel) {
                return Err(Error::config(format!(
                    "network.channel {channel} outside 2.4 GHz range 1-14"
                )));
            }
        }

        if !ssid::is_valid_ssid(&self.ssid.name) {
            return Err(Error::config(format!(
                "ssid.name {:?} must be 1-32 printable characters",
                self.ssid.name
            )));
        }
        if self.ssid.mode == SsidMode::Custom && !ssid::is_valid_ssid(&self.ssid.custom) {
            return Err(Error::config(format!(
                "ssid.custom {:?} must be 1-32 printable characters",
                self.ssid.custom
            )));
        }

        // WPA2-PSK passphrases are 8-63 characters; empty means open network
        if !self.security.password.is_empty()
            && !(8..=63).contains(&self.security.password.len())
        {
            return Err(Error::config(
                "security.password must be 8-63 characters, or empty for an open network",
            ));
        }

        if self.web.enabled && self.web.port == 0 {
            return Err(Error::config("web.port must be nonzero"));
        }

        Ok(())
    }

    /// Serialize the effective configuration back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(format!("serialize: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [selection]
            mode = "cycle"

            [web]
            port = 9000
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.selection.mode, SelectionMode::Cycle);
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.network.interface, "wlan0");
        assert!(config.selection.include_special_ssids);
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(Config::from_file("/no/such/config.toml").is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let config = Config::load_or_default("/no/such/config.toml").unwrap();
        assert_eq!(config.ssid.name, "TamaLink");
    }

    #[test]
    fn test_short_password_rejected() {
        let mut config = Config::default();
        config.security.password = "short".to_string();
        assert!(config.validate().is_err());

        config.security.password = "longenough".to_string();
        assert!(config.validate().is_ok());

        config.security.password.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_channel_rejected() {
        let mut config = Config::default();
        config.network.channel = Some(15);
        assert!(config.validate().is_err());

        config.network.channel = Some(6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_ssid_validated_only_in_custom_mode() {
        let mut config = Config::default();
        config.ssid.custom = String::new();
        assert!(config.validate().is_ok());

        config.ssid.mode = SsidMode::Custom;
        assert!(config.validate().is_err());

        config.ssid.custom = "MyNetwork".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ap_interface_must_differ() {
        let mut config = Config::default();
        config.network.ap_interface = config.network.interface.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.web.port, config.web.port);
        assert_eq!(parsed.selection.mode, config.selection.mode);
    }
}
