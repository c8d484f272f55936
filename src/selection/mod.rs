//! Character selection engine
//!
//! The heart of tamalink: a deterministic, mode-driven algorithm that picks
//! which character to impersonate. Five modes are supported:
//!
//! - `daily_random`: same random character all day, reseeded at midnight
//! - `random`: new random character on every call
//! - `cycle`: walk the pool in order via the persisted [`CycleCursor`]
//! - `fixed`: always the configured catalog index
//! - `disabled`: no selection at all
//!
//! When special SSIDs are included in rotation, [`select_combined`] unions
//! both pools into one index space: filtered characters occupy the low
//! indices in catalog order, active non-excluded specials the high indices.
//! That ordering is a contract — the cycle cursor and the daily seed both
//! address raw positions in it.
//!
//! All functions here are pure over their inputs except for the cursor
//! advance in cycle mode and the reads of the exclusion store; both are
//! caller-owned values (no globals), so tests and concurrent hosts can
//! isolate instances.

mod cursor;

pub use cursor::CycleCursor;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::{Catalog, Character, SpecialSsid};
use crate::config::SelectionConfig;
use crate::exclusions::ExclusionStore;

/// Seed offset for the daily password generator
///
/// Keeps the password RNG stream uncorrelated with character selection,
/// which shares the same day number. The value spells the TAMA signature
/// bytes also used in the MAC prefix.
const PASSWORD_SEED_OFFSET: i64 = 0x7A6DA0;

/// Length of generated daily WPA2 passwords
const DAILY_PASSWORD_LEN: usize = 16;

// ============================================================================
// Selection Mode
// ============================================================================

/// How the broadcast character (and thus the MAC address) is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Different random character each day, stable within the day
    #[default]
    DailyRandom,

    /// New random character each call
    Random,

    /// Walk the pool in order, one step per call
    Cycle,

    /// Always the configured character index
    Fixed,

    /// No character selection; the interface keeps its default MAC
    Disabled,
}

impl SelectionMode {
    /// Get mode ID as string
    pub fn id(&self) -> &'static str {
        match self {
            Self::DailyRandom => "daily_random",
            Self::Random => "random",
            Self::Cycle => "cycle",
            Self::Fixed => "fixed",
            Self::Disabled => "disabled",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "daily_random" | "daily-random" | "daily" => Some(Self::DailyRandom),
            "random" => Some(Self::Random),
            "cycle" => Some(Self::Cycle),
            "fixed" => Some(Self::Fixed),
            "disabled" | "off" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| format!("unknown selection mode: {s}"))
    }
}

// ============================================================================
// Selection Result
// ============================================================================

/// Outcome of a combined selection: a MAC character, a special SSID, or
/// nothing (disabled mode / empty pools)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionResult<'a> {
    /// Selected MAC-based character, if any
    pub character: Option<&'a Character>,

    /// Selected special SSID, if any
    pub special_ssid: Option<&'a SpecialSsid>,
}

impl<'a> SelectionResult<'a> {
    /// Empty result (nothing selected)
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_character(character: Option<&'a Character>) -> Self {
        Self {
            character,
            special_ssid: None,
        }
    }

    fn from_special(special: &'a SpecialSsid) -> Self {
        Self {
            character: None,
            special_ssid: Some(special),
        }
    }

    /// Display name of the selected character, whichever branch is populated
    pub fn name(&self) -> Option<&str> {
        if let Some(special) = self.special_ssid {
            return Some(&special.character_name);
        }
        self.character.map(|c| c.name.as_str())
    }

    /// True when the selection is an SSID-triggered character
    pub fn is_special_ssid(&self) -> bool {
        self.special_ssid.is_some()
    }

    /// The SSID to broadcast, only for special selections
    ///
    /// For MAC selections the caller keeps its configured default SSID.
    pub fn ssid(&self) -> Option<&str> {
        self.special_ssid.map(|s| s.ssid.as_str())
    }
}

// ============================================================================
// Daily Seed
// ============================================================================

/// Deterministic day number used to seed daily selection
///
/// The exact formula `year*366 + month*31 + day` is a contract: the daily
/// password generator derives from the same number (with an offset), and the
/// value must be distinct for every calendar date.
pub fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 366 + i64::from(date.month()) * 31 + i64::from(date.day())
}

fn daily_rng(date: NaiveDate) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(day_number(date) as u64)
}

/// Seconds remaining until the next midnight, for countdown display
pub fn seconds_until_midnight(now: NaiveDateTime) -> i64 {
    let next_midnight = (now.date() + chrono::Days::new(1)).and_time(NaiveTime::MIN);
    (next_midnight - now).num_seconds()
}

// ============================================================================
// Pool Filtering
// ============================================================================

/// Characters eligible for rotation, with their catalog positions
///
/// Seasonal filtering (when enabled) narrows the pool first; exclusion
/// filtering follows. If exclusions would empty the pool entirely the
/// seasonal pool is used unfiltered — selection must always succeed while
/// any candidate exists.
fn available_characters<'a>(
    config: &SelectionConfig,
    catalog: &'a Catalog,
    exclusions: &ExclusionStore,
    date: NaiveDate,
) -> Vec<&'a Character> {
    let seasonal: Vec<(usize, &Character)> = catalog
        .characters()
        .iter()
        .enumerate()
        .filter(|(_, c)| !config.seasonal_filter || c.is_available_on(date))
        .collect();

    if !config.respect_exclusions {
        return seasonal.into_iter().map(|(_, c)| c).collect();
    }

    let filtered: Vec<&Character> = seasonal
        .iter()
        .filter(|(i, _)| !exclusions.is_excluded(*i))
        .map(|(_, c)| *c)
        .collect();

    if filtered.is_empty() {
        seasonal.into_iter().map(|(_, c)| c).collect()
    } else {
        filtered
    }
}

/// Active special SSIDs eligible for rotation, in catalog order
///
/// Inactive entries are always skipped; excluded entries are skipped when
/// exclusions apply. No fallback here — specials are optional entirely.
fn available_special_ssids<'a>(
    config: &SelectionConfig,
    catalog: &'a Catalog,
    exclusions: &ExclusionStore,
) -> Vec<&'a SpecialSsid> {
    catalog
        .active_special_ssids()
        .into_iter()
        .filter(|(i, _)| !config.respect_exclusions || !exclusions.is_ssid_excluded(*i))
        .map(|(_, s)| s)
        .collect()
}

// ============================================================================
// Selection
// ============================================================================

/// Select a character from the catalog pool according to the configured mode
///
/// Fixed mode bypasses both the seasonal and exclusion filters: the user's
/// explicit choice always wins, clamped into the raw pool. Rotation modes
/// draw from the filtered pool. Returns `None` for disabled mode or an
/// empty pool.
pub fn select_character<'a>(
    config: &SelectionConfig,
    catalog: &'a Catalog,
    exclusions: &ExclusionStore,
    cursor: &CycleCursor,
    date: NaiveDate,
) -> Option<&'a Character> {
    let pool = catalog.characters();
    if pool.is_empty() || config.mode == SelectionMode::Disabled {
        return None;
    }

    if config.mode == SelectionMode::Fixed {
        let index = config.fixed_character_index.min(pool.len() - 1);
        return Some(&pool[index]);
    }

    let available = available_characters(config, catalog, exclusions, date);
    if available.is_empty() {
        return None;
    }

    match config.mode {
        SelectionMode::DailyRandom => {
            let mut rng = daily_rng(date);
            available.choose(&mut rng).copied()
        }
        SelectionMode::Random => available.choose(&mut rand::thread_rng()).copied(),
        SelectionMode::Cycle => {
            let index = cursor.next_index(available.len());
            Some(available[index])
        }
        SelectionMode::Fixed | SelectionMode::Disabled => unreachable!(),
    }
}

/// Select from the combined pool of catalog characters and special SSIDs
///
/// The union index space places the filtered characters first (catalog
/// order) and the eligible specials after them; the mode-appropriate
/// strategy then picks one raw position in `[0, total)`. Fixed mode never
/// reaches the special half — it delegates to [`select_character`].
pub fn select_combined<'a>(
    config: &SelectionConfig,
    catalog: &'a Catalog,
    exclusions: &ExclusionStore,
    cursor: &CycleCursor,
    date: NaiveDate,
) -> SelectionResult<'a> {
    if config.mode == SelectionMode::Disabled {
        return SelectionResult::empty();
    }

    if config.mode == SelectionMode::Fixed {
        let character = select_character(config, catalog, exclusions, cursor, date);
        return SelectionResult::from_character(character);
    }

    let characters = available_characters(config, catalog, exclusions, date);
    let specials = if config.include_special_ssids {
        available_special_ssids(config, catalog, exclusions)
    } else {
        Vec::new()
    };

    let total = characters.len() + specials.len();
    if total == 0 {
        return SelectionResult::empty();
    }

    let selected_index = match config.mode {
        SelectionMode::DailyRandom => daily_rng(date).gen_range(0..total),
        SelectionMode::Random => rand::thread_rng().gen_range(0..total),
        SelectionMode::Cycle => cursor.next_index(total),
        SelectionMode::Fixed | SelectionMode::Disabled => unreachable!(),
    };

    if selected_index < characters.len() {
        SelectionResult::from_character(Some(characters[selected_index]))
    } else {
        SelectionResult::from_special(specials[selected_index - characters.len()])
    }
}

/// Like [`select_combined`], but cycle mode peeks instead of advancing
///
/// Status displays poll this; only an actual broadcast start may step the
/// rotation. Non-cycle modes have no cursor to advance and delegate.
pub fn peek_combined<'a>(
    config: &SelectionConfig,
    catalog: &'a Catalog,
    exclusions: &ExclusionStore,
    cursor: &CycleCursor,
    date: NaiveDate,
) -> SelectionResult<'a> {
    if config.mode != SelectionMode::Cycle {
        return select_combined(config, catalog, exclusions, cursor, date);
    }

    let characters = available_characters(config, catalog, exclusions, date);
    let specials = if config.include_special_ssids {
        available_special_ssids(config, catalog, exclusions)
    } else {
        Vec::new()
    };

    let total = characters.len() + specials.len();
    if total == 0 {
        return SelectionResult::empty();
    }

    let selected_index = cursor.peek(total);
    if selected_index < characters.len() {
        SelectionResult::from_character(Some(characters[selected_index]))
    } else {
        SelectionResult::from_special(specials[selected_index - characters.len()])
    }
}

// ============================================================================
// Cycle Previews
// ============================================================================

/// The character the next cycle-mode selection would return, without
/// advancing the cursor
///
/// Previews walk the raw catalog pool; only `None` outside cycle mode.
pub fn next_character<'a>(
    config: &SelectionConfig,
    catalog: &'a Catalog,
    cursor: &CycleCursor,
) -> Option<&'a Character> {
    if config.mode != SelectionMode::Cycle || catalog.characters().is_empty() {
        return None;
    }
    let index = cursor.peek(catalog.characters().len());
    Some(&catalog.characters()[index])
}

/// The next `count` characters in cycle order, without advancing the cursor
pub fn upcoming_characters<'a>(
    config: &SelectionConfig,
    catalog: &'a Catalog,
    cursor: &CycleCursor,
    count: usize,
) -> Vec<&'a Character> {
    if config.mode != SelectionMode::Cycle || catalog.characters().is_empty() {
        return Vec::new();
    }
    cursor
        .upcoming(catalog.characters().len(), count)
        .into_iter()
        .map(|i| &catalog.characters()[i])
        .collect()
}

// ============================================================================
// Daily Password
// ============================================================================

/// Generate the WPA2 password for a given day
///
/// Deterministic within a calendar day, changing at midnight like daily
/// character selection. Reseeded with an offset so the two streams never
/// correlate. Alphanumeric only for WPA2 compatibility.
pub fn generate_daily_password(date: NaiveDate) -> String {
    let seed = (day_number(date) + PASSWORD_SEED_OFFSET) as u64;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..DAILY_PASSWORD_LEN)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionConfig;
    use tempfile::TempDir;

    fn toml_catalog() -> Catalog {
        Catalog::from_toml(
            r#"
            [[characters]]
            byte1 = 0x00
            byte2 = 0x00
            name = "Alpha"

            [[characters]]
            byte1 = 0x00
            byte2 = 0x10
            name = "Beta"

            [[characters]]
            byte1 = 0x00
            byte2 = 0x20
            name = "Gamma"
            season = "winter"

            [[special_ssids]]
            ssid = "EventOne"
            character_name = "Eventchi"
            notes = "test"

            [[special_ssids]]
            ssid = "EventTwo"
            character_name = "Duotchi"
            notes = "test"
            active = false
        "#,
        )
        .unwrap()
    }

    struct Fixture {
        catalog: Catalog,
        exclusions: ExclusionStore,
        cursor: CycleCursor,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        Fixture {
            catalog: toml_catalog(),
            exclusions: ExclusionStore::load(dir.path().join("exclusions.json")),
            cursor: CycleCursor::new(dir.path().join("cycle.txt")),
            _dir: dir,
        }
    }

    fn config(mode: SelectionMode) -> SelectionConfig {
        SelectionConfig {
            mode,
            ..SelectionConfig::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_number_formula() {
        let d = date(2024, 6, 15);
        assert_eq!(day_number(d), 2024 * 366 + 6 * 31 + 15);
    }

    #[test]
    fn test_day_number_changes_at_year_rollover() {
        assert_ne!(day_number(date(2024, 12, 31)), day_number(date(2025, 1, 1)));
    }

    #[test]
    fn test_disabled_selects_nothing() {
        let f = fixture();
        let cfg = config(SelectionMode::Disabled);
        let result = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, date(2025, 1, 1));
        assert!(result.is_none());
        assert_eq!(
            select_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, date(2025, 1, 1)),
            SelectionResult::empty()
        );
    }

    #[test]
    fn test_daily_random_is_deterministic() {
        let f = fixture();
        let cfg = config(SelectionMode::DailyRandom);
        let d = date(2025, 3, 14);

        let first = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, d).unwrap();
        let second = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, d).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_mode_clamps_index() {
        let f = fixture();
        let mut cfg = config(SelectionMode::Fixed);

        cfg.fixed_character_index = 0;
        let first = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, date(2025, 1, 1));
        assert_eq!(first.unwrap().name, "Alpha");

        cfg.fixed_character_index = 99_999;
        let last = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, date(2025, 1, 1));
        assert_eq!(last.unwrap().name, "Gamma");
    }

    #[test]
    fn test_fixed_mode_ignores_exclusions() {
        let mut f = fixture();
        f.exclusions.exclude(1);

        let mut cfg = config(SelectionMode::Fixed);
        cfg.fixed_character_index = 1;

        let result = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, date(2025, 1, 1));
        assert_eq!(result.unwrap().name, "Beta");
    }

    #[test]
    fn test_cycle_visits_pool_in_order_then_wraps() {
        let f = fixture();
        let cfg = config(SelectionMode::Cycle);
        let d = date(2025, 1, 1);

        let names: Vec<String> = (0..4)
            .map(|_| {
                select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, d)
                    .unwrap()
                    .name
                    .clone()
            })
            .collect();

        assert_eq!(names, vec!["Alpha", "Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn test_cycle_skips_excluded() {
        let mut f = fixture();
        f.exclusions.exclude(1);
        let cfg = config(SelectionMode::Cycle);
        let d = date(2025, 1, 1);

        let first = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, d).unwrap();
        let second = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, d).unwrap();
        assert_eq!(first.name, "Alpha");
        assert_eq!(second.name, "Gamma");
    }

    #[test]
    fn test_all_excluded_falls_back_to_full_pool() {
        let mut f = fixture();
        for i in 0..f.catalog.characters().len() {
            f.exclusions.exclude(i);
        }
        let cfg = config(SelectionMode::Random);

        let result = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, date(2025, 1, 1));
        assert!(result.is_some());
    }

    #[test]
    fn test_seasonal_filter_narrows_pool() {
        let f = fixture();
        let mut cfg = config(SelectionMode::Random);
        cfg.seasonal_filter = true;

        // July: the winter-only Gamma must never be picked
        let july = date(2025, 7, 10);
        for _ in 0..20 {
            let pick = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, july).unwrap();
            assert_ne!(pick.name, "Gamma");
        }
    }

    #[test]
    fn test_seasonal_filter_ignored_in_fixed_mode() {
        let f = fixture();
        let mut cfg = config(SelectionMode::Fixed);
        cfg.seasonal_filter = true;
        cfg.fixed_character_index = 2;

        let pick = select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, date(2025, 7, 10));
        assert_eq!(pick.unwrap().name, "Gamma");
    }

    #[test]
    fn test_combined_cycle_ordering() {
        // 3 characters + 1 active special = pool of 4; inactive EventTwo skipped
        let f = fixture();
        let cfg = config(SelectionMode::Cycle);
        let d = date(2025, 1, 1);

        let names: Vec<String> = (0..5)
            .map(|_| {
                select_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d)
                    .name()
                    .unwrap()
                    .to_string()
            })
            .collect();

        assert_eq!(names, vec!["Alpha", "Beta", "Gamma", "Eventchi", "Alpha"]);
    }

    #[test]
    fn test_combined_cycle_full_ordering_two_specials() {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::from_toml(
            r#"
            [[characters]]
            byte1 = 0x00
            byte2 = 0x00
            name = "Alpha"

            [[characters]]
            byte1 = 0x00
            byte2 = 0x10
            name = "Beta"

            [[characters]]
            byte1 = 0x00
            byte2 = 0x20
            name = "Gamma"

            [[special_ssids]]
            ssid = "EventOne"
            character_name = "Onechi"

            [[special_ssids]]
            ssid = "EventTwo"
            character_name = "Twotchi"
        "#,
        )
        .unwrap();
        let exclusions = ExclusionStore::load(dir.path().join("ex.json"));
        let cursor = CycleCursor::new(dir.path().join("cy.txt"));
        let cfg = config(SelectionMode::Cycle);
        let d = date(2025, 1, 1);

        let names: Vec<String> = (0..6)
            .map(|_| {
                select_combined(&cfg, &catalog, &exclusions, &cursor, d)
                    .name()
                    .unwrap()
                    .to_string()
            })
            .collect();

        assert_eq!(
            names,
            vec!["Alpha", "Beta", "Gamma", "Onechi", "Twotchi", "Alpha"]
        );
    }

    #[test]
    fn test_combined_cycle_pool_size_excludes_inactive() {
        // Two characters, one active special, one inactive: the cycle pool
        // has three slots, not four
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::from_toml(
            r#"
            [[characters]]
            byte1 = 0x00
            byte2 = 0x00
            name = "A"

            [[characters]]
            byte1 = 0x00
            byte2 = 0x10
            name = "B"

            [[special_ssids]]
            ssid = "EventX"
            character_name = "X"

            [[special_ssids]]
            ssid = "EventY"
            character_name = "Y"
            active = false
        "#,
        )
        .unwrap();
        let exclusions = ExclusionStore::load(dir.path().join("ex.json"));
        let cursor = CycleCursor::new(dir.path().join("cy.txt"));
        let cfg = config(SelectionMode::Cycle);
        let d = date(2025, 1, 1);

        let names: Vec<String> = (0..4)
            .map(|_| {
                select_combined(&cfg, &catalog, &exclusions, &cursor, d)
                    .name()
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(names, vec!["A", "B", "X", "A"]);
    }

    #[test]
    fn test_combined_special_result_carries_ssid() {
        let f = fixture();
        let cfg = config(SelectionMode::Cycle);
        let d = date(2025, 1, 1);

        for _ in 0..3 {
            select_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d);
        }
        let special = select_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d);
        assert!(special.is_special_ssid());
        assert_eq!(special.ssid(), Some("EventOne"));
        assert_eq!(special.name(), Some("Eventchi"));
    }

    #[test]
    fn test_combined_without_specials() {
        let f = fixture();
        let mut cfg = config(SelectionMode::Cycle);
        cfg.include_special_ssids = false;
        let d = date(2025, 1, 1);

        let names: Vec<String> = (0..4)
            .map(|_| {
                select_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d)
                    .name()
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn test_combined_excluded_special_skipped() {
        let mut f = fixture();
        f.exclusions.exclude_ssid(0);
        let cfg = config(SelectionMode::Cycle);
        let d = date(2025, 1, 1);

        // Pool shrinks to the 3 characters only
        let names: Vec<String> = (0..4)
            .map(|_| {
                select_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d)
                    .name()
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn test_combined_daily_is_deterministic() {
        let f = fixture();
        let cfg = config(SelectionMode::DailyRandom);
        let d = date(2025, 5, 20);

        let first = select_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d);
        let second = select_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d);
        assert_eq!(first.name(), second.name());
        assert_eq!(first.is_special_ssid(), second.is_special_ssid());
    }

    #[test]
    fn test_peek_combined_does_not_advance() {
        let f = fixture();
        let cfg = config(SelectionMode::Cycle);
        let d = date(2025, 1, 1);

        assert_eq!(
            peek_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d).name(),
            Some("Alpha")
        );
        assert_eq!(
            peek_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d).name(),
            Some("Alpha")
        );
        assert_eq!(
            select_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d).name(),
            Some("Alpha")
        );
        assert_eq!(
            peek_combined(&cfg, &f.catalog, &f.exclusions, &f.cursor, d).name(),
            Some("Beta")
        );
    }

    #[test]
    fn test_next_character_preview_does_not_advance() {
        let f = fixture();
        let cfg = config(SelectionMode::Cycle);

        let preview = next_character(&cfg, &f.catalog, &f.cursor).unwrap();
        assert_eq!(preview.name, "Alpha");

        let selected =
            select_character(&cfg, &f.catalog, &f.exclusions, &f.cursor, date(2025, 1, 1));
        assert_eq!(selected.unwrap().name, "Alpha");
    }

    #[test]
    fn test_upcoming_characters() {
        let f = fixture();
        let cfg = config(SelectionMode::Cycle);

        let upcoming: Vec<&str> = upcoming_characters(&cfg, &f.catalog, &f.cursor, 4)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(upcoming, vec!["Alpha", "Beta", "Gamma", "Alpha"]);

        let off_mode = config(SelectionMode::Random);
        assert!(upcoming_characters(&off_mode, &f.catalog, &f.cursor, 4).is_empty());
    }

    #[test]
    fn test_daily_password_stable_within_day() {
        let d = date(2025, 8, 26);
        assert_eq!(generate_daily_password(d), generate_daily_password(d));
        assert_ne!(
            generate_daily_password(d),
            generate_daily_password(date(2025, 8, 27))
        );
    }

    #[test]
    fn test_daily_password_shape() {
        let password = generate_daily_password(date(2025, 8, 26));
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_seconds_until_midnight() {
        let now = date(2025, 8, 26).and_hms_opt(23, 59, 0).unwrap();
        assert_eq!(seconds_until_midnight(now), 60);

        let midnight = date(2025, 8, 26).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(seconds_until_midnight(midnight), 86_400);
    }

    #[test]
    fn test_selection_mode_parsing() {
        assert_eq!(
            SelectionMode::from_id("DAILY_RANDOM"),
            Some(SelectionMode::DailyRandom)
        );
        assert_eq!(SelectionMode::from_id("cycle"), Some(SelectionMode::Cycle));
        assert_eq!(SelectionMode::from_id("bogus"), None);
        assert_eq!("fixed".parse::<SelectionMode>(), Ok(SelectionMode::Fixed));
    }
}
