//! Persistent reverse-geocode cache stored as a flat JSON object.
//!
//! Keys are `"{lat},{lon}"` with both coordinates rounded to five decimals
//! (about one metre). Values are either a place name or `null`, the
//! "outside region" verdict. An absent key means "never looked up".
//!
//! The cache is best-effort: a missing or corrupt file loads as empty and
//! never blocks a pipeline run. It grows monotonically and the whole
//! object is rewritten on every save.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use fire_monitor_region::paths;

use crate::GeocodeError;

/// Cached lookups: coordinate key -> place name, or `None` when the
/// coordinate is outside the region.
pub type CacheEntries = BTreeMap<String, Option<String>>;

/// Builds the cache key for a coordinate.
#[must_use]
pub fn cache_key(lat: f64, lon: f64) -> String {
    format!("{lat:.5},{lon:.5}")
}

/// Reads cache entries from disk.
///
/// Returns an empty map if the file is missing or cannot be parsed.
#[must_use]
pub fn load_entries(path: &Path) -> CacheEntries {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to read geocode cache {}: {e}", path.display());
            }
            return CacheEntries::new();
        }
    };

    match serde_json::from_str(&text) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!(
                "Geocode cache {} is corrupt ({e}), starting empty",
                path.display()
            );
            CacheEntries::new()
        }
    }
}

/// Writes all cache entries to disk, creating parent directories.
///
/// Place names are written verbatim (no `\u` escaping) so the file stays
/// readable. The file is replaced via a sibling temp file so a crash
/// mid-write never leaves a truncated cache.
///
/// # Errors
///
/// Returns [`GeocodeError`] if serialization or any file operation fails.
pub fn save_entries(path: &Path, entries: &CacheEntries) -> Result<(), GeocodeError> {
    paths::ensure_parent(path)?;

    let json = serde_json::to_string_pretty(entries)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;

    Ok(())
}

/// In-memory view of the cache file with write-back on [`Self::save`].
#[derive(Debug, Default)]
pub struct GeocodeCache {
    path: Option<PathBuf>,
    entries: CacheEntries,
    dirty: bool,
}

impl GeocodeCache {
    /// Loads the cache backed by `path` (empty if unreadable).
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        log::info!(
            "Loaded {} geocode cache entries from {}",
            entries.len(),
            path.display()
        );
        Self {
            path: Some(path),
            entries,
            dirty: false,
        }
    }

    /// A cache with no backing file; [`Self::save`] is a no-op.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Looks up a key.
    ///
    /// `None` means not yet resolved; `Some(None)` means resolved as
    /// outside the region.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries.get(key).map(Option::as_deref)
    }

    /// Records a resolution.
    pub fn insert(&mut self, key: String, name: Option<String>) {
        self.entries.insert(key, name);
        self.dirty = true;
    }

    /// Number of resolved keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries.
    #[must_use]
    pub const fn entries(&self) -> &CacheEntries {
        &self.entries
    }

    /// Whether entries were added since the last load or save.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the full cache back to its file if anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the file cannot be written.
    pub fn save(&mut self) -> Result<(), GeocodeError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        save_entries(path, &self.entries)?;
        self.dirty = false;
        log::info!(
            "Saved {} geocode cache entries to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fire_monitor_cache_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("processed").join("geocode_cache.json")
    }

    #[test]
    fn key_rounds_to_five_decimals() {
        assert_eq!(cache_key(30.123_456_7, 79.000_001), "30.12346,79.00000");
        assert_eq!(cache_key(29.5, -0.25), "29.50000,-0.25000");
    }

    #[test]
    fn round_trips_names_and_outside_markers() {
        let path = temp_path("round_trip");
        let mut entries = CacheEntries::new();
        entries.insert("30.06675,79.01930".to_string(), Some("Chamoli".to_string()));
        entries.insert("28.60000,77.60000".to_string(), None);

        save_entries(&path, &entries).unwrap();
        assert_eq!(load_entries(&path), entries);

        let _ = std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }

    #[test]
    fn writes_null_for_outside_marker() {
        let path = temp_path("null_marker");
        let mut entries = CacheEntries::new();
        entries.insert("28.60000,77.60000".to_string(), None);

        save_entries(&path, &entries).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["28.60000,77.60000"].is_null());

        let _ = std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }

    #[test]
    fn preserves_non_ascii_names_verbatim() {
        let path = temp_path("non_ascii");
        let mut entries = CacheEntries::new();
        entries.insert("30.31650,78.03220".to_string(), Some("देहरादून".to_string()));

        save_entries(&path, &entries).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("देहरादून"));
        assert!(!text.contains("\\u"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }

    #[test]
    fn missing_file_loads_empty() {
        let path = temp_path("missing");
        assert!(load_entries(&path).is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let path = temp_path("corrupt");
        paths::ensure_parent(&path).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert!(load_entries(&path).is_empty());

        let _ = std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }

    #[test]
    fn cache_distinguishes_unresolved_from_outside() {
        let mut cache = GeocodeCache::in_memory();
        cache.insert("a".to_string(), None);
        cache.insert("b".to_string(), Some("Almora".to_string()));

        assert_eq!(cache.get("a"), Some(None));
        assert_eq!(cache.get("b"), Some(Some("Almora")));
        assert_eq!(cache.get("c"), None);
    }

    #[test]
    fn save_persists_and_reload_sees_entries() {
        let path = temp_path("reload");
        let mut cache = GeocodeCache::load(&path);
        assert!(cache.is_empty());

        cache.insert("30.00000,79.00000".to_string(), Some("Pauri".to_string()));
        assert!(cache.is_dirty());
        cache.save().unwrap();
        assert!(!cache.is_dirty());

        let reloaded = GeocodeCache::load(&path);
        assert_eq!(reloaded.get("30.00000,79.00000"), Some(Some("Pauri")));

        let _ = std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }

    #[test]
    fn in_memory_save_is_noop() {
        let mut cache = GeocodeCache::in_memory();
        cache.insert("k".to_string(), None);
        cache.save().unwrap();
    }
}
