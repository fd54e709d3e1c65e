//! Entry point sets: validation of host supplied entries and discovery on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::asset_paths::{AssetRoots, relative_slash_path, split_extension};
use crate::error::{AssetsError, AssetsResult};
use crate::selection::EntryInclusion;

/// Source extensions treated as entry points during discovery.
pub const DEFAULT_ENTRY_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "ts", "tsx"];

const SKIPPED_DIRS: &[&str] = &["node_modules"];

/// A bundling root: its logical name and the absolute path of its source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
  /// Logical name without extension, e.g. `admin/index`.
  pub name: String,
  /// Absolute path to the source file.
  pub source: PathBuf,
}

/// Validated set of entry points, keyed by logical name.
///
/// Construction rejects empty and duplicate logical names, so a set that exists is always
/// safe to hand to a bundler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPoints {
  entries: BTreeMap<String, PathBuf>,
}

impl EntryPoints {
  /// Create an empty set.
  pub fn new() -> Self {
    Self::default()
  }

  /// Validate an explicit mapping of logical names to source paths.
  ///
  /// Relative sources are resolved against `base_dir`. Names are separator-normalised and
  /// trimmed of surrounding slashes.
  pub fn from_named<I, N, P>(base_dir: &Path, named: I) -> AssetsResult<Self>
  where
    I: IntoIterator<Item = (N, P)>,
    N: AsRef<str>,
    P: AsRef<Path>,
  {
    let mut entries = Self::new();
    for (name, source) in named {
      let source = base_dir.join(source.as_ref());
      let name = name.as_ref().replace('\\', "/").trim_matches('/').to_string();
      entries.insert(name, source)?;
    }
    Ok(entries)
  }

  /// Derive logical names for a list of source files using the asset roots.
  pub fn from_sources<I, P>(roots: &AssetRoots, base_dir: &Path, sources: I) -> AssetsResult<Self>
  where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
  {
    let mut entries = Self::new();
    for source in sources {
      let source = base_dir.join(source.as_ref());
      let name = roots.logical_name(base_dir, &source)?;
      entries.insert(name, source)?;
    }
    Ok(entries)
  }

  /// Add an entry point, rejecting empty and duplicate names.
  pub fn insert(&mut self, name: String, source: PathBuf) -> AssetsResult<()> {
    if name.is_empty() {
      return Err(AssetsError::EmptyLogicalName {
        source_path: source,
      });
    }

    if let Some(first) = self.entries.get(&name) {
      return Err(AssetsError::DuplicateLogicalName {
        name,
        first: first.clone(),
        second: source,
      });
    }

    self.entries.insert(name, source);
    Ok(())
  }

  /// Keep only the entries accepted by `selection`.
  pub fn retain<S: EntryInclusion>(&mut self, selection: &S) {
    self.entries.retain(|name, source| {
      let keep = selection.is_included(name);
      if !keep {
        debug!(entry = %name, source = %source.display(), "entry point excluded by selection");
      }
      keep
    });
  }

  /// Look up the source path of an entry by logical name.
  pub fn source(&self, name: &str) -> Option<&Path> {
    self.entries.get(name).map(PathBuf::as_path)
  }

  /// Iterate over the entries in logical name order.
  pub fn iter(&self) -> impl Iterator<Item = EntryPoint> + '_ {
    self.entries.iter().map(|(name, source)| EntryPoint {
      name: name.clone(),
      source: source.clone(),
    })
  }

  /// Logical names in sorted order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(String::as_str)
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when the set has no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Settings for discovering entry points below a project directory.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions<'a> {
  /// Recognised asset roots.
  pub roots: &'a AssetRoots,
  /// File extensions accepted as entry points.
  pub extensions: &'a [String],
  /// Directories that are never descended into, typically the public output directory.
  pub skip_dirs: &'a [PathBuf],
}

/// Find entry points below `base_dir`.
///
/// A file is an entry point when its base-relative path starts with a recognised asset root,
/// it sits directly inside that root and its extension is accepted. Hidden directories and
/// dependency folders are skipped.
pub fn discover_entry_points<S: EntryInclusion>(
  base_dir: &Path,
  options: &DiscoveryOptions<'_>,
  selection: &S,
) -> AssetsResult<EntryPoints> {
  let mut sources = Vec::new();
  collect_candidates(base_dir, base_dir, options, &mut sources)?;
  sources.sort();

  let mut entries = EntryPoints::from_sources(options.roots, base_dir, &sources)?;
  entries.retain(selection);

  debug!(count = entries.len(), base_dir = %base_dir.display(), "discovered entry points");
  Ok(entries)
}

fn collect_candidates(
  base_dir: &Path,
  dir: &Path,
  options: &DiscoveryOptions<'_>,
  sources: &mut Vec<PathBuf>,
) -> AssetsResult<()> {
  let entries = fs::read_dir(dir).map_err(|err| AssetsError::io(dir, err))?;

  for entry in entries {
    let entry = entry.map_err(|err| AssetsError::io(dir, err))?;
    let path = entry.path();
    let file_name = entry.file_name();
    let name = file_name.to_string_lossy();
    if name.starts_with('.') {
      continue;
    }

    let file_type = entry
      .file_type()
      .map_err(|err| AssetsError::io(&path, err))?;

    if file_type.is_dir() {
      if SKIPPED_DIRS.contains(&&*name) || options.skip_dirs.iter().any(|skip| skip == &path)
      {
        continue;
      }
      collect_candidates(base_dir, &path, options, sources)?;
    } else if file_type.is_file() && is_entry_candidate(base_dir, &path, options) {
      sources.push(path);
    }
  }

  Ok(())
}

fn is_entry_candidate(base_dir: &Path, path: &Path, options: &DiscoveryOptions<'_>) -> bool {
  let Some(relative) = relative_slash_path(base_dir, path) else {
    return false;
  };
  let Some(root) = options.roots.match_root(&relative) else {
    return false;
  };
  if root.remainder.contains('/') {
    return false;
  }

  match split_extension(root.remainder) {
    (_, Some(ext)) => options
      .extensions
      .iter()
      .any(|accepted| accepted.eq_ignore_ascii_case(ext)),
    (_, None) => false,
  }
}
