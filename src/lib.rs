//! tamalink - Tamagotchi Uni character access point
//!
//! Impersonates the WiFi access points that unlock location-exclusive
//! Tamagotchi Uni characters. Characters are encoded in the BSSID (prefix
//! `02:7a:6d:a0` plus a per-character byte pair); a handful of event
//! characters are instead unlocked by broadcasting an exact network name.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`catalog`] - The immutable character and special SSID pools
//! - [`selection`] - Mode-driven character selection and the cycle cursor
//! - [`exclusions`] - Persistent user opt-outs from rotation
//! - [`mac`] - The character MAC address scheme
//! - [`ssid`] - Broadcast name resolution
//! - [`config`] - Layered TOML configuration
//! - [`hotspot`] - hostapd/dnsmasq orchestration (Linux, root)
//! - [`web`] - REST control panel
//!
//! # Example
//!
//! ```no_run
//! use tamalink::catalog::Catalog;
//! use tamalink::config::Config;
//! use tamalink::exclusions::ExclusionStore;
//! use tamalink::selection::{self, CycleCursor};
//!
//! fn main() -> tamalink::error::Result<()> {
//!     let config = Config::default();
//!     let catalog = Catalog::load()?;
//!     let exclusions = ExclusionStore::load(&config.selection.exclusions_file);
//!     let cursor = CycleCursor::new(&config.selection.cycle_file);
//!
//!     let today = chrono::Local::now().date_naive();
//!     let pick = selection::select_combined(
//!         &config.selection, &catalog, &exclusions, &cursor, today,
//!     );
//!     println!("today: {:?}", pick.name());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod exclusions;
pub mod hotspot;
pub mod mac;
pub mod selection;
pub mod ssid;
pub mod web;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{Catalog, Character, Season, SpecialSsid};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::exclusions::ExclusionStore;
    pub use crate::selection::{CycleCursor, SelectionMode, SelectionResult};
    pub use crate::ssid::SsidMode;
}
