//! Drive the esbuild CLI and read back its metafile.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use tracing::{debug, info};

use super::{BuildReport, BundleRequest, Bundler, OutputFile};

/// Options forwarded to esbuild.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EsbuildOptions {
  /// Explicit esbuild executable. Falls back to `node_modules/.bin/esbuild`, then `PATH`.
  pub executable: Option<PathBuf>,
  /// Minify bundled output.
  pub minify: bool,
  /// Emit external source maps next to each output.
  pub sourcemap: bool,
  /// Language target, e.g. `es2020`.
  pub target: Option<String>,
  /// Output format (`iife`, `cjs`, `esm`).
  pub format: Option<String>,
  /// Loaders keyed by file extension including the dot, e.g. `.png` => `file`.
  pub loaders: BTreeMap<String, String>,
  /// Additional raw arguments appended to the command line.
  pub extra_args: Vec<String>,
}

impl Default for EsbuildOptions {
  fn default() -> Self {
    Self {
      executable: None,
      minify: true,
      sourcemap: true,
      target: None,
      format: None,
      loaders: BTreeMap::new(),
      extra_args: Vec::new(),
    }
  }
}

/// [`Bundler`] backed by the esbuild executable.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
  executable: PathBuf,
  options: EsbuildOptions,
}

impl EsbuildBundler {
  /// Use a specific esbuild executable.
  pub fn with_executable(executable: impl Into<PathBuf>, options: EsbuildOptions) -> Self {
    Self {
      executable: executable.into(),
      options,
    }
  }

  /// Locate esbuild for a project rooted at `base_dir`.
  pub fn locate(base_dir: &Path, options: EsbuildOptions) -> Result<Self> {
    if let Some(executable) = options.executable.clone() {
      return Ok(Self::with_executable(base_dir.join(executable), options));
    }

    let local = base_dir.join("node_modules").join(".bin").join("esbuild");
    if local.is_file() {
      return Ok(Self::with_executable(local, options));
    }

    let executable = which::which("esbuild")
      .context("esbuild not found in node_modules/.bin or on PATH")?;
    Ok(Self::with_executable(executable, options))
  }

  /// Executable that will be invoked.
  pub fn executable(&self) -> &Path {
    &self.executable
  }

  /// Command line arguments for a request, excluding the executable.
  pub fn command_args(&self, request: &BundleRequest<'_>, metafile: &Path) -> Vec<String> {
    let mut args: Vec<String> = request
      .entries
      .iter()
      .map(|entry| format!("{}={}", entry.name, entry.source.display()))
      .collect();

    args.push("--bundle".into());
    args.push(format!("--outdir={}", request.out_dir.display()));
    args.push(format!("--entry-names={}", request.entry_names.template()));
    args.push(format!("--metafile={}", metafile.display()));
    args.push("--log-level=error".into());

    if self.options.minify {
      args.push("--minify".into());
    }
    if self.options.sourcemap {
      args.push("--sourcemap".into());
    }
    if let Some(target) = &self.options.target {
      args.push(format!("--target={target}"));
    }
    if let Some(format) = &self.options.format {
      args.push(format!("--format={format}"));
    }
    for (extension, loader) in &self.options.loaders {
      args.push(format!("--loader:{extension}={loader}"));
    }
    args.extend(self.options.extra_args.iter().cloned());

    args
  }
}

impl Bundler for EsbuildBundler {
  fn bundle(&self, request: &BundleRequest<'_>) -> Result<BuildReport> {
    let metafile = tempfile::Builder::new()
      .prefix("esbuild-meta-")
      .suffix(".json")
      .tempfile()
      .context("failed to create esbuild metafile")?;
    let args = self.command_args(request, metafile.path());

    info!(
      executable = %self.executable.display(),
      entries = request.entries.len(),
      out_dir = %request.out_dir.display(),
      "running esbuild"
    );
    debug!(?args, "esbuild arguments");

    let output = Command::new(&self.executable)
      .args(&args)
      .current_dir(request.base_dir)
      .output()
      .with_context(|| format!("failed to execute {}", self.executable.display()))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      bail!("esbuild exited with {}: {}", output.status, stderr.trim());
    }

    let content = fs::read_to_string(metafile.path())
      .with_context(|| format!("failed to read {}", metafile.path().display()))?;
    let report = parse_metafile(&content)?;
    debug!(outputs = report.len(), "esbuild metafile parsed");
    Ok(report)
  }
}

#[derive(Debug, Default, Deserialize)]
struct Metafile {
  #[serde(default)]
  outputs: BTreeMap<String, MetafileOutput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetafileOutput {
  #[serde(default)]
  entry_point: Option<String>,
  #[serde(default)]
  css_bundle: Option<String>,
}

/// Convert an esbuild metafile into a [`BuildReport`].
///
/// Paths in the metafile are relative to esbuild's working directory, which is the request's
/// base directory. Outputs without an entry point (shared chunks) and source maps are left
/// out. A CSS bundle emitted alongside a JavaScript entry is attributed to the same entry.
pub fn parse_metafile(content: &str) -> Result<BuildReport> {
  let metafile: Metafile =
    serde_json::from_str(content).map_err(|err| anyhow!("failed to parse esbuild metafile: {err}"))?;

  let mut seen = BTreeSet::new();
  let mut report = BuildReport::new();

  for (path, output) in &metafile.outputs {
    let Some(entry_point) = output.entry_point.as_deref() else {
      continue;
    };
    let candidates = std::iter::once(path.as_str()).chain(output.css_bundle.as_deref());
    for candidate in candidates {
      let file = OutputFile::for_entry(candidate, entry_point);
      if file.is_source_map() || !seen.insert(candidate.to_string()) {
        continue;
      }
      report.push(file);
    }
  }

  Ok(report)
}
