//! The seam between manifest generation and the external bundler.
//!
//! A [`Bundler`] receives the whole entry point set in one batch and reports back every file
//! it wrote. The report is plain data, so manifest correlation can be exercised with
//! synthetic reports in tests.

use std::path::{Path, PathBuf};

use crate::asset_paths::EntryNames;
use crate::entries::EntryPoints;

mod esbuild;

pub use esbuild::{EsbuildBundler, EsbuildOptions, parse_metafile};

/// Everything a bundler needs to process one batch of entry points.
#[derive(Debug, Clone, Copy)]
pub struct BundleRequest<'a> {
  /// Directory relative paths are resolved against. Also the bundler's working directory.
  pub base_dir: &'a Path,
  /// Directory bundled files are written into.
  pub out_dir: &'a Path,
  /// Entry points to bundle.
  pub entries: &'a EntryPoints,
  /// Output naming template.
  pub entry_names: &'a EntryNames,
}

/// External bundler processing a batch of entry points.
pub trait Bundler {
  /// Bundle every entry in `request` and report the files written.
  fn bundle(&self, request: &BundleRequest<'_>) -> anyhow::Result<BuildReport>;
}

impl<B: Bundler + ?Sized> Bundler for &B {
  fn bundle(&self, request: &BundleRequest<'_>) -> anyhow::Result<BuildReport> {
    (**self).bundle(request)
  }
}

/// A file written by the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
  /// Output path. Relative paths are relative to the request's base directory.
  pub path: PathBuf,
  /// Source of the entry point this output was produced for, when the bundler reports it.
  pub entry_point: Option<PathBuf>,
}

impl OutputFile {
  /// Output produced for a known entry point.
  pub fn for_entry(path: impl Into<PathBuf>, entry_point: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      entry_point: Some(entry_point.into()),
    }
  }

  /// Output with no entry point association, such as a shared chunk.
  ///
  /// Correlation only keys these by name when no output in the report is attributed.
  pub fn unattributed(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      entry_point: None,
    }
  }

  /// Returns `true` for source map outputs.
  pub fn is_source_map(&self) -> bool {
    self
      .path
      .extension()
      .is_some_and(|ext| ext.eq_ignore_ascii_case("map"))
  }
}

/// Outputs written by one bundler invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
  outputs: Vec<OutputFile>,
}

impl BuildReport {
  /// Create an empty report.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record an output file.
  pub fn push(&mut self, output: OutputFile) {
    self.outputs.push(output);
  }

  /// Outputs in the order they were reported.
  pub fn outputs(&self) -> &[OutputFile] {
    &self.outputs
  }

  /// Number of outputs.
  pub fn len(&self) -> usize {
    self.outputs.len()
  }

  /// Returns `true` when nothing was written.
  pub fn is_empty(&self) -> bool {
    self.outputs.is_empty()
  }
}

impl FromIterator<OutputFile> for BuildReport {
  fn from_iter<T: IntoIterator<Item = OutputFile>>(iter: T) -> Self {
    Self {
      outputs: iter.into_iter().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detects_source_maps() {
    assert!(OutputFile::unattributed("public/assets/index-ABC.js.map").is_source_map());
    assert!(!OutputFile::unattributed("public/assets/index-ABC.js").is_source_map());
  }

  #[test]
  fn collects_outputs_in_order() {
    let report: BuildReport = [
      OutputFile::for_entry("public/assets/index-ABC.js", "app/assets/javascripts/index.js"),
      OutputFile::unattributed("public/assets/chunk-XYZ.js"),
    ]
    .into_iter()
    .collect();

    assert_eq!(report.len(), 2);
    assert_eq!(
      report.outputs()[1].path,
      PathBuf::from("public/assets/chunk-XYZ.js")
    );
  }
}
