//! SSID resolution
//!
//! Decides the network name the access point broadcasts. Most characters are
//! MAC-addressed and broadcast the configured default SSID; special event
//! characters instead require an exact network name, which this module
//! resolves from the catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::{Catalog, SpecialSsid};
use crate::config::SsidConfig;

/// How the broadcast SSID is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SsidMode {
    /// Broadcast the configured default network name
    #[default]
    Normal,

    /// Broadcast a special event SSID picked by index
    Special,

    /// Broadcast a user-supplied string
    Custom,
}

impl SsidMode {
    /// Get mode ID as string
    pub fn id(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Special => "special",
            Self::Custom => "custom",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "normal" | "default" => Some(Self::Normal),
            "special" => Some(Self::Special),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for SsidMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for SsidMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| format!("unknown ssid mode: {s}"))
    }
}

/// Resolve the SSID to broadcast under the configured mode
///
/// Special mode clamps the configured index into the active pool and falls
/// back to the default name when no specials are active. Custom mode falls
/// back to the default name when the custom string is empty.
pub fn resolve_ssid(config: &SsidConfig, catalog: &Catalog) -> String {
    match config.mode {
        SsidMode::Normal => config.name.clone(),
        SsidMode::Special => {
            let active = catalog.active_special_ssids();
            if active.is_empty() {
                return config.name.clone();
            }
            let slot = config.special_index.min(active.len() - 1);
            active[slot].1.ssid.clone()
        }
        SsidMode::Custom => {
            if config.custom.is_empty() {
                config.name.clone()
            } else {
                config.custom.clone()
            }
        }
    }
}

/// Find a special entry by its exact SSID string (case-sensitive)
pub fn special_by_ssid<'a>(catalog: &'a Catalog, ssid: &str) -> Option<&'a SpecialSsid> {
    catalog.special_ssids().iter().find(|s| s.ssid == ssid)
}

/// Find a special entry by the character it unlocks (case-insensitive)
pub fn special_by_character<'a>(catalog: &'a Catalog, name: &str) -> Option<&'a SpecialSsid> {
    catalog
        .special_ssids()
        .iter()
        .find(|s| s.character_name.eq_ignore_ascii_case(name))
}

/// Check whether a string is broadcastable as an SSID
///
/// 1-32 bytes of printable ASCII. The 802.11 spec allows arbitrary octets
/// but hostapd config files and the paired devices do not.
pub fn is_valid_ssid(ssid: &str) -> bool {
    !ssid.is_empty()
        && ssid.len() <= 32
        && ssid.chars().all(|c| c.is_ascii_graphic() || c == ' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_toml(
            r#"
            [[characters]]
            byte1 = 0x00
            byte2 = 0x00
            name = "Alpha"

            [[special_ssids]]
            ssid = "EventOne"
            character_name = "Onechi"

            [[special_ssids]]
            ssid = "EventGone"
            character_name = "Gonetchi"
            active = false

            [[special_ssids]]
            ssid = "EventTwo"
            character_name = "Twotchi"
        "#,
        )
        .unwrap()
    }

    fn ssid_config(mode: SsidMode) -> SsidConfig {
        SsidConfig {
            mode,
            ..SsidConfig::default()
        }
    }

    #[test]
    fn test_normal_mode_uses_default_name() {
        let cfg = ssid_config(SsidMode::Normal);
        assert_eq!(resolve_ssid(&cfg, &catalog()), cfg.name);
    }

    #[test]
    fn test_special_mode_indexes_active_pool() {
        let mut cfg = ssid_config(SsidMode::Special);

        cfg.special_index = 0;
        assert_eq!(resolve_ssid(&cfg, &catalog()), "EventOne");

        // Index 1 of the ACTIVE pool skips the inactive entry
        cfg.special_index = 1;
        assert_eq!(resolve_ssid(&cfg, &catalog()), "EventTwo");
    }

    #[test]
    fn test_special_mode_clamps_index() {
        let mut cfg = ssid_config(SsidMode::Special);
        cfg.special_index = 500;
        assert_eq!(resolve_ssid(&cfg, &catalog()), "EventTwo");
    }

    #[test]
    fn test_custom_mode() {
        let mut cfg = ssid_config(SsidMode::Custom);
        cfg.custom = "MyNetwork".to_string();
        assert_eq!(resolve_ssid(&cfg, &catalog()), "MyNetwork");

        cfg.custom.clear();
        assert_eq!(resolve_ssid(&cfg, &catalog()), cfg.name);
    }

    #[test]
    fn test_special_lookups() {
        let catalog = catalog();
        assert_eq!(
            special_by_ssid(&catalog, "EventOne").unwrap().character_name,
            "Onechi"
        );
        assert!(special_by_ssid(&catalog, "eventone").is_none());
        assert_eq!(
            special_by_character(&catalog, "TWOTCHI").unwrap().ssid,
            "EventTwo"
        );
    }

    #[test]
    fn test_ssid_validity() {
        assert!(is_valid_ssid("Tamagotchi WiFi"));
        assert!(is_valid_ssid("x"));
        assert!(!is_valid_ssid(""));
        assert!(!is_valid_ssid(&"a".repeat(33)));
        assert!(!is_valid_ssid("bad\nssid"));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(SsidMode::from_id("SPECIAL"), Some(SsidMode::Special));
        assert_eq!(SsidMode::from_id("default"), Some(SsidMode::Normal));
        assert_eq!(SsidMode::from_id("nope"), None);
    }
}
