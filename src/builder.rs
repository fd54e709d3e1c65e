//! Build orchestrator: resolve entry points, run the bundler, write the manifest.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::bundler::{BundleRequest, Bundler};
use crate::entries::{DiscoveryOptions, EntryPoints, discover_entry_points};
use crate::error::{AssetsError, AssetsResult};
use crate::manifest::{Manifest, correlate};
use crate::project::{BuildContext, EntrySource};

/// Artifacts of a completed build.
#[derive(Debug, Clone)]
pub struct BuildArtifacts {
  /// Entry points that were bundled.
  pub entries: EntryPoints,
  /// The manifest that was written.
  pub manifest: Manifest,
  /// Where the manifest was written.
  pub manifest_path: PathBuf,
}

/// Runs a single build for a [`BuildContext`].
///
/// A build is two phases: entry points are resolved and validated without touching the
/// output directory, then the bundler runs once for the whole batch and its report is
/// correlated into a fresh manifest.
pub struct AssetsBuilder<'a> {
  context: &'a BuildContext,
}

impl<'a> AssetsBuilder<'a> {
  /// Create a builder for the provided build context.
  pub fn new(context: &'a BuildContext) -> Self {
    Self { context }
  }

  /// Resolve and validate the entry points without bundling.
  pub fn plan(&self) -> AssetsResult<EntryPoints> {
    match &self.context.entries {
      EntrySource::Explicit(entries) => Ok(entries.clone()),
      EntrySource::Discover {
        extensions,
        selection,
      } => {
        let skip_dirs = [self.context.layout.public_dir.clone()];
        let options = DiscoveryOptions {
          roots: &self.context.roots,
          extensions,
          skip_dirs: &skip_dirs,
        };
        discover_entry_points(&self.context.layout.base_dir, &options, selection)
      }
    }
  }

  /// Bundle every entry point and write the manifest.
  pub fn build<B: Bundler + ?Sized>(&self, bundler: &B) -> AssetsResult<BuildArtifacts> {
    let layout = &self.context.layout;
    let entries = self.plan()?;
    let manifest_path = layout.manifest_path();

    if entries.is_empty() {
      warn!(base_dir = %layout.base_dir.display(), "no entry points found, writing empty manifest");
      fs::create_dir_all(&layout.public_dir)
        .map_err(|err| AssetsError::io(&layout.public_dir, err))?;
      let manifest = Manifest::new();
      manifest.write(&manifest_path)?;
      return Ok(BuildArtifacts {
        entries,
        manifest,
        manifest_path,
      });
    }

    let assets_dir = layout.assets_dir();
    fs::create_dir_all(&assets_dir).map_err(|err| AssetsError::io(&assets_dir, err))?;

    let request = BundleRequest {
      base_dir: &layout.base_dir,
      out_dir: &assets_dir,
      entries: &entries,
      entry_names: &self.context.entry_names,
    };
    let report = bundler.bundle(&request).map_err(AssetsError::Bundler)?;

    let manifest = correlate(layout, &self.context.entry_names, &entries, &report)?;
    manifest.write(&manifest_path)?;

    info!(
      entries = entries.len(),
      outputs = report.len(),
      manifest = %manifest_path.display(),
      "asset manifest written"
    );

    Ok(BuildArtifacts {
      entries,
      manifest,
      manifest_path,
    })
  }
}
