//! The manifest document: a flat JSON object from logical asset keys to public URLs.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{AssetsError, AssetsResult};

/// Mapping of logical asset keys (`admin/index.js`) to public URLs
/// (`/assets/admin/index-YMWJCFAK.js`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
  entries: BTreeMap<String, String>,
}

impl Manifest {
  /// Create an empty manifest.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a key. A key can only be recorded once.
  pub fn insert(&mut self, key: String, url: String) -> AssetsResult<()> {
    if let Some(first) = self.entries.get(&key) {
      return Err(AssetsError::DuplicateManifestKey {
        first: first.clone(),
        second: url,
        key,
      });
    }
    self.entries.insert(key, url);
    Ok(())
  }

  /// Public URL for a logical key.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }

  /// Iterate over `(key, url)` pairs in key order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(key, url)| (key.as_str(), url.as_str()))
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when the manifest has no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Render the manifest as pretty printed JSON.
  pub fn to_json_pretty(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }

  /// Load a manifest written by a previous build.
  pub fn load(path: &Path) -> AssetsResult<Self> {
    let content = fs::read_to_string(path).map_err(|err| AssetsError::io(path, err))?;
    serde_json::from_str(&content).map_err(|source| AssetsError::Json {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Write the manifest, replacing any previous document.
  ///
  /// The document is written to a temporary file in the destination directory and renamed
  /// into place, so readers never observe a partially written manifest.
  pub fn write(&self, path: &Path) -> AssetsResult<()> {
    let json = self.to_json_pretty().map_err(|source| AssetsError::Json {
      path: path.to_path_buf(),
      source,
    })?;

    let dir = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    let mut file = temp_file_in(dir).map_err(|err| AssetsError::io(dir, err))?;
    if let Ok(existing) = fs::metadata(path) {
      file
        .as_file()
        .set_permissions(existing.permissions())
        .map_err(|err| AssetsError::io(file.path(), err))?;
    }
    file
      .write_all(json.as_bytes())
      .and_then(|()| file.write_all(b"\n"))
      .map_err(|err| AssetsError::io(file.path(), err))?;
    file
      .persist(path)
      .map_err(|err| AssetsError::io(path, err.error))?;

    Ok(())
  }
}

/// Temporary manifest in `dir`. New manifests are created world readable (subject to the
/// umask) instead of the owner-only mode temp files default to.
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
  use std::os::unix::fs::PermissionsExt;

  tempfile::Builder::new()
    .permissions(fs::Permissions::from_mode(0o644))
    .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
  NamedTempFile::new_in(dir)
}
