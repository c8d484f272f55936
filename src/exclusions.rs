//! Character exclusion store
//!
//! Tracks which catalog positions the user has opted out of rotation, one set
//! per pool (MAC characters and special SSIDs). State is persisted to a small
//! JSON record after every mutation.
//!
//! Persistence is best-effort in both directions: a missing or corrupt record
//! loads as empty, and a failed write is logged and ignored so an exclusion
//! toggle never fails the caller's request. The store holds no lock of its
//! own; concurrent hosts wrap it in a mutex (the web layer does).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// On-disk shape of the exclusion record
#[derive(Debug, Default, Serialize, Deserialize)]
struct ExclusionRecord {
    #[serde(default)]
    excluded_indices: Vec<usize>,

    #[serde(default)]
    excluded_ssid_indices: Vec<usize>,
}

/// Persistent store of excluded catalog positions
#[derive(Debug)]
pub struct ExclusionStore {
    path: PathBuf,
    characters: HashSet<usize>,
    ssids: HashSet<usize>,
}

impl ExclusionStore {
    /// Open the store backed by the given file
    ///
    /// Never fails: an absent or unreadable record starts both pools empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (characters, ssids) = match Self::read_record(&path) {
            Some(record) => (
                record.excluded_indices.into_iter().collect(),
                record.excluded_ssid_indices.into_iter().collect(),
            ),
            None => (HashSet::new(), HashSet::new()),
        };

        Self {
            path,
            characters,
            ssids,
        }
    }

    fn read_record(path: &Path) -> Option<ExclusionRecord> {
        if !path.exists() {
            return None;
        }
        let file = File::open(path).ok()?;
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Exclusion record malformed, starting empty");
                None
            }
        }
    }

    /// Persist the current state; failures are swallowed
    fn save(&self) {
        let mut excluded_indices: Vec<usize> = self.characters.iter().copied().collect();
        excluded_indices.sort_unstable();
        let mut excluded_ssid_indices: Vec<usize> = self.ssids.iter().copied().collect();
        excluded_ssid_indices.sort_unstable();

        let record = ExclusionRecord {
            excluded_indices,
            excluded_ssid_indices,
        };

        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = File::create(&self.path)?;
            serde_json::to_writer_pretty(BufWriter::new(file), &record)
                .map_err(std::io::Error::other)
        })();

        if let Err(e) = result {
            tracing::debug!(path = %self.path.display(), error = %e, "Failed to persist exclusions, keeping in-memory state");
        }
    }

    // ------------------------------------------------------------------
    // Character pool
    // ------------------------------------------------------------------

    /// Check if a character index is excluded
    pub fn is_excluded(&self, index: usize) -> bool {
        self.characters.contains(&index)
    }

    /// Exclude a character by index (idempotent)
    pub fn exclude(&mut self, index: usize) {
        self.characters.insert(index);
        self.save();
    }

    /// Re-include a previously excluded character (idempotent)
    pub fn include(&mut self, index: usize) {
        self.characters.remove(&index);
        self.save();
    }

    /// Flip exclusion state; returns the new excluded state
    pub fn toggle(&mut self, index: usize) -> bool {
        let now_excluded = if self.characters.contains(&index) {
            self.characters.remove(&index);
            false
        } else {
            self.characters.insert(index);
            true
        };
        self.save();
        now_excluded
    }

    /// Copy of the excluded character indices
    pub fn excluded(&self) -> HashSet<usize> {
        self.characters.clone()
    }

    /// Number of excluded characters
    pub fn count(&self) -> usize {
        self.characters.len()
    }

    /// Replace the character pool wholesale
    pub fn replace(&mut self, indices: HashSet<usize>) {
        self.characters = indices;
        self.save();
    }

    /// Clear the character pool
    pub fn clear(&mut self) {
        self.characters.clear();
        self.save();
    }

    // ------------------------------------------------------------------
    // Special SSID pool
    // ------------------------------------------------------------------

    /// Check if a special SSID index is excluded
    pub fn is_ssid_excluded(&self, index: usize) -> bool {
        self.ssids.contains(&index)
    }

    /// Exclude a special SSID by index (idempotent)
    pub fn exclude_ssid(&mut self, index: usize) {
        self.ssids.insert(index);
        self.save();
    }

    /// Re-include a previously excluded special SSID (idempotent)
    pub fn include_ssid(&mut self, index: usize) {
        self.ssids.remove(&index);
        self.save();
    }

    /// Flip exclusion state for a special SSID; returns the new state
    pub fn toggle_ssid(&mut self, index: usize) -> bool {
        let now_excluded = if self.ssids.contains(&index) {
            self.ssids.remove(&index);
            false
        } else {
            self.ssids.insert(index);
            true
        };
        self.save();
        now_excluded
    }

    /// Copy of the excluded special SSID indices
    pub fn excluded_ssids(&self) -> HashSet<usize> {
        self.ssids.clone()
    }

    /// Number of excluded special SSIDs
    pub fn ssid_count(&self) -> usize {
        self.ssids.len()
    }

    /// Replace the special SSID pool wholesale
    pub fn replace_ssids(&mut self, indices: HashSet<usize>) {
        self.ssids = indices;
        self.save();
    }

    /// Clear the special SSID pool
    pub fn clear_ssids(&mut self) {
        self.ssids.clear();
        self.save();
    }

    /// Clear both pools at once
    pub fn clear_all(&mut self) {
        self.characters.clear();
        self.ssids.clear();
        self.save();
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ExclusionStore {
        ExclusionStore::load(dir.path().join("exclusions.json"))
    }

    #[test]
    fn test_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.count(), 0);
        assert_eq!(store.ssid_count(), 0);
        assert!(!store.is_excluded(0));
    }

    #[test]
    fn test_exclude_include_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.exclude(3);
        assert!(store.is_excluded(3));
        store.include(3);
        assert!(!store.is_excluded(3));
    }

    #[test]
    fn test_toggle_returns_new_state() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        assert!(store.toggle(5));
        assert!(store.is_excluded(5));
        assert!(!store.toggle(5));
        assert!(!store.is_excluded(5));
    }

    #[test]
    fn test_exclude_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.exclude(2);
        store.exclude(2);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_pools_are_independent() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.exclude(1);
        store.exclude_ssid(1);
        store.include(1);

        assert!(!store.is_excluded(1));
        assert!(store.is_ssid_excluded(1));
    }

    #[test]
    fn test_excluded_returns_copy() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.exclude(7);
        let mut copy = store.excluded();
        copy.insert(99);

        assert!(!store.is_excluded(99));
    }

    #[test]
    fn test_persists_across_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exclusions.json");

        {
            let mut store = ExclusionStore::load(&path);
            store.exclude(4);
            store.exclude_ssid(2);
        }

        let reloaded = ExclusionStore::load(&path);
        assert!(reloaded.is_excluded(4));
        assert!(reloaded.is_ssid_excluded(2));
    }

    #[test]
    fn test_corrupt_record_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exclusions.json");
        fs::write(&path, "{not json at all").unwrap();

        let store = ExclusionStore::load(&path);
        assert_eq!(store.count(), 0);
        assert_eq!(store.ssid_count(), 0);
    }

    #[test]
    fn test_unwritable_path_keeps_memory_state() {
        let mut store = ExclusionStore::load("/proc/no-such-dir/exclusions.json");
        store.exclude(1);
        assert!(store.is_excluded(1));
    }

    #[test]
    fn test_replace_and_clear_all() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.replace([1, 2, 3].into_iter().collect());
        store.replace_ssids([0].into_iter().collect());
        assert_eq!(store.count(), 3);
        assert_eq!(store.ssid_count(), 1);

        store.clear_all();
        assert_eq!(store.count(), 0);
        assert_eq!(store.ssid_count(), 0);
    }
}
