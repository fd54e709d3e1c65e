//! Error types shared by the entry point, manifest and build modules.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type AssetsResult<T> = Result<T, AssetsError>;

/// Failures raised while preparing entry points or emitting the manifest.
#[derive(Debug, Error)]
pub enum AssetsError {
  /// An entry point was declared with an empty logical name.
  #[error("entry point for {source_path} has an empty logical name")]
  EmptyLogicalName {
    /// Source file the empty name was derived from or declared for.
    source_path: PathBuf,
  },

  /// Two entry points resolved to the same logical name.
  #[error("logical name '{name}' is declared by both {first} and {second}")]
  DuplicateLogicalName {
    /// Logical name shared by both entry points.
    name: String,
    /// Source of the entry point registered first.
    first: PathBuf,
    /// Source of the conflicting entry point.
    second: PathBuf,
  },

  /// The source path does not live under any recognised asset root.
  #[error("{path} is not inside a recognised asset root")]
  UnrecognisedSource {
    /// Offending source path.
    path: PathBuf,
  },

  /// An asset root pattern failed to compile.
  #[error("invalid asset root pattern '{pattern}': {source}")]
  InvalidRootPattern {
    /// Pattern as written in the configuration.
    pattern: String,
    /// Regex compilation error.
    source: regex::Error,
  },

  /// The output naming template cannot be used to recover entry names.
  #[error("invalid entry names template '{template}': {reason}")]
  InvalidEntryNames {
    /// Template as written in the configuration.
    template: String,
    /// Why the template was rejected.
    reason: String,
  },

  /// The external bundler reported a failure.
  #[error("bundler failed")]
  Bundler(#[source] anyhow::Error),

  /// A declared entry point has no output in the build report.
  #[error("bundler produced no output for entry point '{name}'")]
  MissingOutput {
    /// Logical name of the entry point.
    name: String,
  },

  /// Two outputs resolved to the same manifest key.
  #[error("manifest key '{key}' maps to both {first} and {second}")]
  DuplicateManifestKey {
    /// Manifest key that collided.
    key: String,
    /// URL recorded first.
    first: String,
    /// URL of the conflicting output.
    second: String,
  },

  /// A reported output does not live under the public directory.
  #[error("output {path} is outside the public directory {public_dir}")]
  OutputOutsidePublicDir {
    /// Output path reported by the bundler.
    path: PathBuf,
    /// Configured public directory.
    public_dir: PathBuf,
  },

  /// File system failure.
  #[error("failed to access {path}: {source}")]
  Io {
    /// Path involved in the failed operation.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// JSON (de)serialisation failure.
  #[error("invalid JSON in {path}: {source}")]
  Json {
    /// Path of the document.
    path: PathBuf,
    /// Underlying serde error.
    source: serde_json::Error,
  },

  /// YAML configuration failed to parse.
  #[error("invalid YAML in {path}: {source}")]
  Yaml {
    /// Path of the document.
    path: PathBuf,
    /// Underlying serde error.
    source: serde_yaml::Error,
  },
}

impl AssetsError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }

  /// Returns `true` for errors caused by the entry point configuration rather than
  /// by the bundler or the file system.
  pub fn is_configuration_error(&self) -> bool {
    matches!(
      self,
      Self::EmptyLogicalName { .. }
        | Self::DuplicateLogicalName { .. }
        | Self::UnrecognisedSource { .. }
        | Self::InvalidRootPattern { .. }
        | Self::InvalidEntryNames { .. }
    )
  }
}
