//! Filesystem layout and build context shared by the builder and the CLI.

use std::path::{Path, PathBuf};

use crate::asset_paths::{AssetRoots, EntryNames};
use crate::entries::{DEFAULT_ENTRY_EXTENSIONS, EntryPoints};
use crate::selection::EntrySelection;

/// Public directory relative to the project root.
pub const DEFAULT_PUBLIC_DIR: &str = "public";
/// Subdirectory of the public directory receiving bundled files.
pub const DEFAULT_ASSETS_DIR: &str = "assets";
/// Manifest file name, written at the root of the public directory.
pub const DEFAULT_MANIFEST_FILE: &str = "assets.json";

/// Resolved locations for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
  /// Absolute project root. Every relative path is resolved against it.
  pub base_dir: PathBuf,
  /// Absolute public directory.
  pub public_dir: PathBuf,
  /// Name of the bundled assets directory inside the public directory.
  pub assets_dir_name: String,
  /// Name of the manifest file inside the public directory.
  pub manifest_file: String,
}

impl ProjectLayout {
  /// Layout with the default `public/assets` and `public/assets.json` locations.
  pub fn new(base_dir: impl Into<PathBuf>) -> Self {
    let base_dir = base_dir.into();
    Self {
      public_dir: base_dir.join(DEFAULT_PUBLIC_DIR),
      base_dir,
      assets_dir_name: DEFAULT_ASSETS_DIR.into(),
      manifest_file: DEFAULT_MANIFEST_FILE.into(),
    }
  }

  /// Override the public directory; relative values resolve against the project root.
  pub fn with_public_dir(mut self, public_dir: impl AsRef<Path>) -> Self {
    self.public_dir = self.base_dir.join(public_dir);
    self
  }

  /// Directory receiving bundled files, e.g. `<root>/public/assets`.
  pub fn assets_dir(&self) -> PathBuf {
    self.public_dir.join(&self.assets_dir_name)
  }

  /// Location of the manifest, sibling of the assets directory.
  pub fn manifest_path(&self) -> PathBuf {
    self.public_dir.join(&self.manifest_file)
  }
}

/// How the entry points of a build are obtained.
#[derive(Debug, Clone)]
pub enum EntrySource {
  /// Entry points supplied by the host.
  Explicit(EntryPoints),
  /// Entry points discovered below the project root.
  Discover {
    /// Accepted source extensions.
    extensions: Vec<String>,
    /// Scope filter applied to discovered entries.
    selection: EntrySelection,
  },
}

impl Default for EntrySource {
  fn default() -> Self {
    Self::Discover {
      extensions: DEFAULT_ENTRY_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
      selection: EntrySelection::default(),
    }
  }
}

/// Everything the builder needs apart from the bundler itself.
#[derive(Debug, Clone)]
pub struct BuildContext {
  /// Resolved project locations.
  pub layout: ProjectLayout,
  /// Recognised asset roots.
  pub roots: AssetRoots,
  /// Output naming template shared with the bundler.
  pub entry_names: EntryNames,
  /// Where entry points come from.
  pub entries: EntrySource,
}

impl BuildContext {
  /// Context with default roots, naming and discovery for a project root.
  pub fn new(base_dir: impl Into<PathBuf>) -> Self {
    Self {
      layout: ProjectLayout::new(base_dir),
      roots: AssetRoots::default(),
      entry_names: EntryNames::default(),
      entries: EntrySource::default(),
    }
  }
}
