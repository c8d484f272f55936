//! Persisted round-robin cursor for cycle mode
//!
//! A single integer stored as text in a file. Reading advances the cursor;
//! `peek`/`upcoming` inspect it without advancing (for previews). Missing or
//! garbled files read as 0, and write failures are swallowed so cycle mode
//! keeps working even when the backing directory is unwritable.

use std::fs;
use std::path::{Path, PathBuf};

/// File-backed cycle position
#[derive(Debug, Clone)]
pub struct CycleCursor {
    path: PathBuf,
}

impl CycleCursor {
    /// Create a cursor backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_raw(&self) -> usize {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| text.trim().parse::<usize>().ok())
            .unwrap_or(0)
    }

    /// Current position reduced into the pool, then advance for next time
    ///
    /// Callers must not pass `pool_size == 0`; the selection engine guards
    /// empty pools before consulting the cursor. A stored value beyond the
    /// pool wraps rather than erroring, so the cursor survives pool-size
    /// changes from exclusion edits.
    pub fn next_index(&self, pool_size: usize) -> usize {
        debug_assert!(pool_size > 0, "cycle cursor consulted with empty pool");

        let current = self.read_raw() % pool_size;
        let next = (current + 1) % pool_size;

        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.path, next.to_string())
        })();

        if let Err(e) = result {
            tracing::debug!(path = %self.path.display(), error = %e, "Failed to persist cycle position");
        }

        current
    }

    /// Current position without advancing
    pub fn peek(&self, pool_size: usize) -> usize {
        debug_assert!(pool_size > 0, "cycle cursor consulted with empty pool");
        self.read_raw() % pool_size
    }

    /// The next `count` positions without advancing
    pub fn upcoming(&self, pool_size: usize, count: usize) -> Vec<usize> {
        let start = self.peek(pool_size);
        (0..count).map(|i| (start + i) % pool_size).collect()
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

    fn cursor_in(dir: &TempDir) -> CycleCursor {
        CycleCursor::new(dir.path().join("cycle.txt"))
    }

    #[test]
    fn test_missing_file_starts_at_zero() {
        let dir = TempDir::new().unwrap();
        let cursor = cursor_in(&dir);
        assert_eq!(cursor.next_index(10), 0);
    }

    #[test]
    fn test_advances_and_wraps() {
        let dir = TempDir::new().unwrap();
        let cursor = cursor_in(&dir);

        for expected in 0..3 {
            assert_eq!(cursor.next_index(3), expected);
        }
        assert_eq!(cursor.next_index(3), 0);
    }

    #[test]
    fn test_garbage_file_reads_as_zero() {
        let dir = TempDir::new().unwrap();
        let cursor = cursor_in(&dir);
        fs::write(cursor.path(), "not a number").unwrap();
        assert_eq!(cursor.next_index(5), 0);
    }

    #[test]
    fn test_stored_value_beyond_pool_wraps() {
        let dir = TempDir::new().unwrap();
        let cursor = cursor_in(&dir);
        fs::write(cursor.path(), "7").unwrap();
        assert_eq!(cursor.next_index(3), 1);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let dir = TempDir::new().unwrap();
        let cursor = cursor_in(&dir);
        fs::write(cursor.path(), "2").unwrap();

        assert_eq!(cursor.peek(5), 2);
        assert_eq!(cursor.peek(5), 2);
        assert_eq!(cursor.next_index(5), 2);
        assert_eq!(cursor.peek(5), 3);
    }

    #[test]
    fn test_upcoming_wraps_over_pool() {
        let dir = TempDir::new().unwrap();
        let cursor = cursor_in(&dir);
        fs::write(cursor.path(), "2").unwrap();

        assert_eq!(cursor.upcoming(4, 5), vec![2, 3, 0, 1, 2]);
    }

    #[test]
    fn test_unwritable_path_still_returns_index() {
        let cursor = CycleCursor::new("/proc/no-such-dir/cycle.txt");
        assert_eq!(cursor.next_index(4), 0);
    }

    #[test]
    fn test_survives_pool_shrink() {
        let dir = TempDir::new().unwrap();
        let cursor = cursor_in(&dir);

        // Walk a large pool, then shrink it; cursor must wrap, not panic
        for _ in 0..7 {
            cursor.next_index(10);
        }
        let index = cursor.next_index(3);
        assert!(index < 3);
    }
}
