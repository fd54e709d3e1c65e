//! Project configuration loader describing asset roots, output layout and esbuild options.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::asset_paths::{
  APP_JAVASCRIPTS_ROOT, AssetRoots, DEFAULT_ENTRY_NAMES, EntryNames, SLICE_JAVASCRIPTS_ROOT,
};
use crate::bundler::EsbuildOptions;
use crate::entries::{DEFAULT_ENTRY_EXTENSIONS, EntryPoints};
use crate::error::{AssetsError, AssetsResult};
use crate::project::{
  BuildContext, DEFAULT_ASSETS_DIR, DEFAULT_MANIFEST_FILE, DEFAULT_PUBLIC_DIR, EntrySource,
  ProjectLayout,
};
use crate::selection::EntrySelection;

/// Configuration file names searched for in the project root, in order.
pub const CONFIG_FILES: &[&str] = &["assets.config.json", "assets.config.yml", "assets.config.yaml"];

/// Discoverable project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetsConfig {
  /// Public directory relative to the project root.
  pub public_dir: String,
  /// Bundled assets directory inside the public directory.
  pub assets_dir: String,
  /// Manifest file name inside the public directory.
  pub manifest_file: String,
  /// Asset root patterns, tried in order.
  pub asset_roots: Vec<String>,
  /// Output naming template handed to esbuild.
  pub entry_names: String,
  /// Source extensions considered during discovery.
  pub entry_extensions: Vec<String>,
  /// Explicit entry points (logical name to source path). Disables discovery when set.
  pub entry_points: BTreeMap<String, String>,
  /// Logical scopes to include during discovery.
  pub include: Vec<String>,
  /// Logical scopes to exclude during discovery.
  pub exclude: Vec<String>,
  /// Options forwarded to esbuild.
  pub esbuild: EsbuildOptions,
}

impl Default for AssetsConfig {
  fn default() -> Self {
    Self {
      public_dir: DEFAULT_PUBLIC_DIR.into(),
      assets_dir: DEFAULT_ASSETS_DIR.into(),
      manifest_file: DEFAULT_MANIFEST_FILE.into(),
      asset_roots: vec![APP_JAVASCRIPTS_ROOT.into(), SLICE_JAVASCRIPTS_ROOT.into()],
      entry_names: DEFAULT_ENTRY_NAMES.into(),
      entry_extensions: DEFAULT_ENTRY_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
      entry_points: BTreeMap::new(),
      include: Vec::new(),
      exclude: Vec::new(),
      esbuild: EsbuildOptions::default(),
    }
  }
}

impl AssetsConfig {
  /// Load configuration from the project root.
  ///
  /// When no configuration file exists the defaults are used. A file that exists but fails
  /// to parse is an error.
  pub fn discover(project_dir: &Path) -> AssetsResult<Self> {
    match CONFIG_FILES
      .iter()
      .map(|name| project_dir.join(name))
      .find(|candidate| candidate.is_file())
    {
      Some(path) => Self::from_path(&path),
      None => {
        debug!(project_dir = %project_dir.display(), "no assets config found, using defaults");
        Ok(Self::default())
      }
    }
  }

  /// Read configuration from a specific JSON or YAML file.
  pub fn from_path(path: &Path) -> AssetsResult<Self> {
    let content = fs::read_to_string(path).map_err(|err| AssetsError::io(path, err))?;
    let is_yaml = path
      .extension()
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));

    let config = if is_yaml {
      serde_yaml::from_str(&content).map_err(|source| AssetsError::Yaml {
        path: path.to_path_buf(),
        source,
      })?
    } else {
      serde_json::from_str(&content).map_err(|source| AssetsError::Json {
        path: path.to_path_buf(),
        source,
      })?
    };

    debug!(path = %path.display(), "loaded assets config");
    Ok(config)
  }

  /// Resolve the configuration into a build context for `project_dir`.
  pub fn to_context(&self, project_dir: &Path) -> AssetsResult<BuildContext> {
    let mut layout = ProjectLayout::new(project_dir).with_public_dir(&self.public_dir);
    layout.assets_dir_name = self.assets_dir.clone();
    layout.manifest_file = self.manifest_file.clone();

    let roots = AssetRoots::new(&self.asset_roots)?;
    let entry_names = EntryNames::parse(&self.entry_names)?;

    let entries = if self.entry_points.is_empty() {
      EntrySource::Discover {
        extensions: self.entry_extensions.clone(),
        selection: EntrySelection::new(self.include.clone(), self.exclude.clone()),
      }
    } else {
      EntrySource::Explicit(EntryPoints::from_named(project_dir, &self.entry_points)?)
    };

    Ok(BuildContext {
      layout,
      roots,
      entry_names,
      entries,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn defaults_when_no_config_exists() {
    let dir = tempdir().unwrap();
    let config = AssetsConfig::discover(dir.path()).unwrap();
    assert_eq!(config, AssetsConfig::default());

    let context = config.to_context(dir.path()).unwrap();
    assert_eq!(context.layout.manifest_path(), dir.path().join("public/assets.json"));
    assert!(matches!(context.entries, EntrySource::Discover { .. }));
  }

  #[test]
  fn reads_json_config() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join("assets.config.json"),
      r#"{
        "publicDir": "dist",
        "entryNames": "[dir]/[name]",
        "include": ["admin"],
        "esbuild": { "minify": false, "target": "es2020" }
      }"#,
    )
    .unwrap();

    let config = AssetsConfig::discover(dir.path()).unwrap();
    assert_eq!(config.public_dir, "dist");
    assert_eq!(config.assets_dir, "assets");
    assert!(!config.esbuild.minify);
    assert!(config.esbuild.sourcemap);
    assert_eq!(config.esbuild.target.as_deref(), Some("es2020"));

    let context = config.to_context(dir.path()).unwrap();
    assert_eq!(context.layout.assets_dir(), dir.path().join("dist/assets"));
    assert_eq!(context.entry_names.template(), "[dir]/[name]");
  }

  #[test]
  fn reads_yaml_config_with_explicit_entries() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join("assets.config.yml"),
      "entryPoints:\n  index: app/assets/javascripts/index.js\n  admin/index: slices/admin/assets/javascripts/index.js\n",
    )
    .unwrap();

    let config = AssetsConfig::discover(dir.path()).unwrap();
    let context = config.to_context(dir.path()).unwrap();
    match context.entries {
      EntrySource::Explicit(entries) => {
        assert_eq!(entries.names().collect::<Vec<_>>(), vec!["admin/index", "index"]);
      }
      other => panic!("expected explicit entries, got {other:?}"),
    }
  }

  #[test]
  fn invalid_config_is_an_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("assets.config.json"), "{ \"publicDir\": 3 }").unwrap();
    assert!(matches!(
      AssetsConfig::discover(dir.path()),
      Err(AssetsError::Json { .. })
    ));
  }

  #[test]
  fn invalid_root_patterns_surface_as_configuration_errors() {
    let config = AssetsConfig {
      asset_roots: vec!["slices/(".into()],
      ..AssetsConfig::default()
    };
    let err = config.to_context(Path::new("/srv/bookshelf")).unwrap_err();
    assert!(err.is_configuration_error());
  }
}
