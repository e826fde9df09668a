#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the fire monitor data directory.
//!
//! All paths are relative to the project root's `data/` directory unless
//! `FIRE_MONITOR_DATA_DIR` points somewhere else.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "FIRE_MONITOR_DATA_DIR";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the data directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV).map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the persisted reverse-geocode cache path.
#[must_use]
pub fn geocode_cache_path() -> PathBuf {
    data_dir().join("processed").join("geocode_cache.json")
}

/// Returns the boundary GeoJSON path for a region.
#[must_use]
pub fn boundary_path(region_id: &str) -> PathBuf {
    data_dir()
        .join("boundary")
        .join(format!("{region_id}_boundary.geojson"))
}

/// Returns the published snapshot path.
#[must_use]
pub fn snapshot_path() -> PathBuf {
    data_dir().join("generated").join("active_fires.json")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Ensures the parent directory of a file path exists.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_parent(file: &Path) -> std::io::Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_path_uses_region_id() {
        let path = boundary_path("uttarakhand");
        assert!(path.ends_with("boundary/uttarakhand_boundary.geojson"));
    }

    #[test]
    fn ensure_parent_creates_nested_dirs() {
        let root = std::env::temp_dir().join("fire_monitor_paths_test");
        let _ = std::fs::remove_dir_all(&root);

        let file = root.join("a").join("b").join("file.json");
        ensure_parent(&file).unwrap();
        assert!(root.join("a").join("b").is_dir());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn ensure_parent_accepts_bare_file_name() {
        ensure_parent(Path::new("file.json")).unwrap();
    }
}
