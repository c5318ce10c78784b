//! Container packaging interface.
//!
//! The pipeline's on-disk contract with the external tiles-to-container tool
//! is the `{z}/{x}/{y}.{ext}` tree plus a `metadata.json` at the tile-dir
//! root holding only the non-empty metadata fields, serialized with sorted
//! keys. Building the actual archive is owned by an external tool behind the
//! [`ContainerPackager`] trait; this module only enforces the shared
//! contract: the metadata file, and the rule that an archive path must not
//! already exist.

use serde::{Serialize, Serializer};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Name of the metadata file written at the tile-directory root.
pub const METADATA_FILE: &str = "metadata.json";

/// Errors from metadata writing and archive packaging.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The archive destination already exists; never overwritten.
    #[error("output archive already exists: {}", .0.display())]
    ArchiveExists(PathBuf),

    /// Writing the metadata file failed.
    #[error("failed to write metadata: {0}")]
    Io(#[from] io::Error),

    /// Serializing the metadata failed.
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The external packaging tool failed.
    #[error("packaging failed: {0}")]
    Packaging(String),
}

/// Metadata record for a packaged tile set.
///
/// The zoom bounds serialize as strings and the four descriptive fields are
/// omitted when empty, matching what container consumers expect to find in
/// `metadata.json`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContainerMetadata {
    pub name: String,
    pub format: String,
    /// Bounding box as `"west, south, east, north"`
    pub bounds: String,
    #[serde(serialize_with = "as_string")]
    pub minzoom: u8,
    #[serde(serialize_with = "as_string")]
    pub maxzoom: u8,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub attribution: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub layer_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

fn as_string<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

impl ContainerMetadata {
    pub fn new(
        name: impl Into<String>,
        format: impl Into<String>,
        bounds: impl Into<String>,
        minzoom: u8,
        maxzoom: u8,
    ) -> Self {
        Self {
            name: name.into(),
            format: format.into(),
            bounds: bounds.into(),
            minzoom,
            maxzoom,
            attribution: String::new(),
            description: String::new(),
            layer_type: String::new(),
            version: String::new(),
        }
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = attribution.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_layer_type(mut self, layer_type: impl Into<String>) -> Self {
        self.layer_type = layer_type.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Serialize to a JSON string with sorted keys.
    pub fn to_json(&self) -> Result<String, ContainerError> {
        // Round-trip through a Value: serde_json's default map is ordered
        // by key, which gives the sorted-keys guarantee independent of
        // field declaration order.
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Write `metadata.json` at the tile-directory root.
    pub fn write(&self, tile_dir: &Path) -> Result<PathBuf, ContainerError> {
        let path = tile_dir.join(METADATA_FILE);
        fs::write(&path, self.to_json()?)?;
        info!("wrote {}", path.display());
        Ok(path)
    }
}

/// The external tiles-to-container capability.
///
/// Implementations wrap a concrete archive builder (an MBTiles importer or
/// similar). They must refuse to overwrite an existing archive; use
/// [`ensure_archive_absent`] before doing any work.
pub trait ContainerPackager {
    /// Package `tile_dir` into a single archive at `archive_path`.
    fn package(
        &self,
        tile_dir: &Path,
        archive_path: &Path,
        metadata: &ContainerMetadata,
    ) -> Result<(), ContainerError>;
}

/// Fail if the archive destination already exists.
pub fn ensure_archive_absent(archive_path: &Path) -> Result<(), ContainerError> {
    if archive_path.exists() {
        return Err(ContainerError::ArchiveExists(archive_path.to_path_buf()));
    }
    Ok(())
}

/// Packager that validates the destination and logs the import parameters
/// without building an archive. Used until a real archive builder is wired
/// in; the tile tree plus `metadata.json` is the complete input the external
/// importer needs.
#[derive(Debug, Clone)]
pub struct NoopPackager {
    scheme: String,
    compression: bool,
}

impl NoopPackager {
    pub fn new(scheme: impl Into<String>, compression: bool) -> Self {
        Self {
            scheme: scheme.into(),
            compression,
        }
    }
}

impl ContainerPackager for NoopPackager {
    fn package(
        &self,
        tile_dir: &Path,
        archive_path: &Path,
        metadata: &ContainerMetadata,
    ) -> Result<(), ContainerError> {
        ensure_archive_absent(archive_path)?;
        info!(
            "tile tree {} ready to import into {} (format: {}, scheme: {}, compression: {})",
            tile_dir.display(),
            archive_path.display(),
            metadata.format,
            self.scheme,
            if self.compression { "on" } else { "off" }
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> ContainerMetadata {
        ContainerMetadata::new("basemap", "png", "-180, -85.05112878, 180, 85.05112878", 1, 5)
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let json = sample().to_json().unwrap();
        assert!(!json.contains("attribution"));
        assert!(!json.contains("description"));
        assert!(!json.contains("\"type\""));
        assert!(!json.contains("version"));
    }

    #[test]
    fn test_non_empty_fields_are_kept() {
        let json = sample()
            .with_attribution("© Example")
            .with_layer_type("baselayer")
            .to_json()
            .unwrap();
        assert!(json.contains("\"attribution\": \"© Example\""));
        assert!(json.contains("\"type\": \"baselayer\""));
    }

    #[test]
    fn test_zoom_bounds_serialize_as_strings() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"minzoom\": \"1\""));
        assert!(json.contains("\"maxzoom\": \"5\""));
    }

    #[test]
    fn test_keys_are_sorted() {
        let json = sample()
            .with_attribution("a")
            .with_description("d")
            .with_layer_type("t")
            .with_version("1.0")
            .to_json()
            .unwrap();

        let keys: Vec<&str> = json
            .lines()
            .filter_map(|line| {
                let trimmed = line.trim_start();
                trimmed.starts_with('"').then(|| {
                    let end = trimmed[1..].find('"').unwrap() + 1;
                    &trimmed[1..end]
                })
            })
            .collect();

        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted, "metadata keys must come out sorted");
        assert_eq!(keys.len(), 9);
    }

    #[test]
    fn test_write_creates_metadata_file() {
        let dir = tempdir().unwrap();
        let path = sample().write(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(METADATA_FILE));

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["name"], "basemap");
        assert_eq!(parsed["format"], "png");
    }

    /// Packager that records what it was asked to package.
    struct RecordingPackager {
        calls: std::cell::RefCell<Vec<(PathBuf, PathBuf, String)>>,
    }

    impl RecordingPackager {
        fn new() -> Self {
            Self {
                calls: std::cell::RefCell::new(Vec::new()),
            }
        }
    }

    impl ContainerPackager for RecordingPackager {
        fn package(
            &self,
            tile_dir: &Path,
            archive_path: &Path,
            metadata: &ContainerMetadata,
        ) -> Result<(), ContainerError> {
            ensure_archive_absent(archive_path)?;
            self.calls.borrow_mut().push((
                tile_dir.to_path_buf(),
                archive_path.to_path_buf(),
                metadata.format.clone(),
            ));
            Ok(())
        }
    }

    #[test]
    fn test_packager_receives_tree_archive_and_metadata() {
        let dir = tempdir().unwrap();
        let tile_dir = dir.path().join("tiles");
        let archive = dir.path().join("out.mbtiles");

        let packager = RecordingPackager::new();
        packager.package(&tile_dir, &archive, &sample()).unwrap();

        let calls = packager.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, tile_dir);
        assert_eq!(calls[0].1, archive);
        assert_eq!(calls[0].2, "png");
    }

    #[test]
    fn test_packager_refuses_existing_archive() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("out.mbtiles");
        fs::write(&archive, b"existing").unwrap();

        let packager = RecordingPackager::new();
        let err = packager
            .package(&dir.path().join("tiles"), &archive, &sample())
            .unwrap_err();
        assert!(matches!(err, ContainerError::ArchiveExists(_)));
        assert!(packager.calls.borrow().is_empty());
    }

    #[test]
    fn test_noop_packager_validates_destination() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("out.mbtiles");
        let packager = NoopPackager::new("tms", true);

        assert!(packager
            .package(&dir.path().join("tiles"), &archive, &sample())
            .is_ok());

        fs::write(&archive, b"existing").unwrap();
        let err = packager
            .package(&dir.path().join("tiles"), &archive, &sample())
            .unwrap_err();
        assert!(matches!(err, ContainerError::ArchiveExists(_)));
    }

    #[test]
    fn test_ensure_archive_absent() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("out.mbtiles");
        assert!(ensure_archive_absent(&archive).is_ok());

        fs::write(&archive, b"existing").unwrap();
        let err = ensure_archive_absent(&archive).unwrap_err();
        assert!(matches!(err, ContainerError::ArchiveExists(_)));
        assert!(err.to_string().contains("out.mbtiles"));
    }
}
