//! Character catalog for tamalink
//!
//! Holds the two immutable, ordered pools the selection engine draws from:
//! MAC-addressed characters and special event SSIDs. Both are loaded once at
//! startup from the embedded `data/characters.toml` file and never mutated.
//!
//! Positions in these pools are load-bearing: the exclusion store and the
//! cycle cursor both address entries by index, so reordering the data file
//! shifts rotation output.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Embedded catalog data, compiled into the binary
const CATALOG_TOML: &str = include_str!("../../data/characters.toml");

// ============================================================================
// Season
// ============================================================================

/// Seasonal availability tag for characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Get all seasons
    pub fn all() -> Vec<Self> {
        vec![Self::Spring, Self::Summer, Self::Fall, Self::Winter]
    }

    /// Map a calendar month (1-12) to its season
    ///
    /// Spring = Mar-May, Summer = Jun-Aug, Fall = Sep-Nov, Winter = Dec-Feb.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Fall,
            _ => Self::Winter,
        }
    }

    /// Get the season for a specific date
    pub fn on(date: NaiveDate) -> Self {
        Self::from_month(date.month())
    }

    /// Get season ID as string
    pub fn id(&self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Fall => "fall",
            Self::Winter => "winter",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "spring" => Some(Self::Spring),
            "summer" => Some(Self::Summer),
            "fall" | "autumn" => Some(Self::Fall),
            "winter" => Some(Self::Winter),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

// ============================================================================
// Catalog Entries
// ============================================================================

/// A MAC-addressed character
///
/// The byte pair `(byte1, byte2)` forms the last two octets of the broadcast
/// MAC address and uniquely identifies the character within the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// First character byte
    pub byte1: u8,

    /// Second character byte
    pub byte2: u8,

    /// Display name
    pub name: String,

    /// Optional season restriction; `None` means available year-round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
}

impl Character {
    /// Check whether this character is discoverable on the given date
    ///
    /// Untagged characters are always available; tagged characters only
    /// during their season.
    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        match self.season {
            None => true,
            Some(season) => season == Season::on(date),
        }
    }
}

/// A special SSID-based event character
///
/// These characters are unlocked by broadcasting an exact network name
/// rather than by MAC address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSsid {
    /// The exact SSID string to broadcast
    pub ssid: String,

    /// Name of the character this SSID unlocks
    pub character_name: String,

    /// Provenance notes (event, region, dates)
    #[serde(default)]
    pub notes: String,

    /// Whether this SSID still works; inactive entries are listable but
    /// excluded from rotation and default lookups
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

// ============================================================================
// Catalog
// ============================================================================

/// Raw shape of the embedded data file
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    characters: Vec<Character>,
    #[serde(default)]
    special_ssids: Vec<SpecialSsid>,
}

/// The immutable character catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    characters: Vec<Character>,
    special_ssids: Vec<SpecialSsid>,
}

impl Catalog {
    /// Load the embedded catalog
    ///
    /// Validation failures here are load-time faults: a malformed data file
    /// must never reach the selection engine.
    pub fn load() -> Result<Self> {
        Self::from_toml(CATALOG_TOML)
    }

    /// Parse and validate a catalog from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        let catalog = Self {
            characters: file.characters,
            special_ssids: file.special_ssids,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate catalog invariants: unique byte pairs, unique SSID strings,
    /// non-empty names, SSID length bounds
    fn validate(&self) -> Result<()> {
        let mut seen_pairs = std::collections::HashSet::new();
        for ch in &self.characters {
            if ch.name.trim().is_empty() {
                return Err(Error::catalog(format!(
                    "character ({:#04x}, {:#04x}) has an empty name",
                    ch.byte1, ch.byte2
                )));
            }
            if !seen_pairs.insert((ch.byte1, ch.byte2)) {
                return Err(Error::catalog(format!(
                    "duplicate byte pair ({:#04x}, {:#04x})",
                    ch.byte1, ch.byte2
                )));
            }
        }

        let mut seen_ssids = std::collections::HashSet::new();
        for special in &self.special_ssids {
            if special.ssid.is_empty() || special.ssid.len() > 32 {
                return Err(Error::catalog(format!(
                    "special SSID {:?} must be 1-32 characters",
                    special.ssid
                )));
            }
            if !seen_ssids.insert(special.ssid.as_str()) {
                return Err(Error::catalog(format!(
                    "duplicate special SSID {:?}",
                    special.ssid
                )));
            }
        }

        Ok(())
    }

    /// All characters, in catalog order
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// All special SSIDs, in catalog order (including inactive ones)
    pub fn special_ssids(&self) -> &[SpecialSsid] {
        &self.special_ssids
    }

    /// Find a character by name (case-insensitive, first match)
    pub fn character_by_name(&self, name: &str) -> Option<&Character> {
        self.characters
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Find a character by its byte pair
    pub fn character_by_bytes(&self, byte1: u8, byte2: u8) -> Option<&Character> {
        self.characters
            .iter()
            .find(|c| c.byte1 == byte1 && c.byte2 == byte2)
    }

    /// All characters tagged with the given season (case-insensitive)
    ///
    /// Untagged characters are not part of any season's list.
    pub fn characters_for_season(&self, season: &str) -> Vec<&Character> {
        match Season::from_id(season) {
            Some(season) => self
                .characters
                .iter()
                .filter(|c| c.season == Some(season))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Active special SSIDs with their original catalog positions
    pub fn active_special_ssids(&self) -> Vec<(usize, &SpecialSsid)> {
        self.special_ssids
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .collect()
    }
}
