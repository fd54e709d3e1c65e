#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod bundler;
pub mod config;
pub mod entries;
pub mod error;
pub mod manifest;
pub mod project;
pub mod selection;

pub use builder::{AssetsBuilder, BuildArtifacts};
pub use bundler::{BuildReport, BundleRequest, Bundler, EsbuildBundler, OutputFile};
pub use config::AssetsConfig;
pub use entries::{EntryPoint, EntryPoints};
pub use error::{AssetsError, AssetsResult};
pub use manifest::Manifest;
pub use project::{BuildContext, EntrySource, ProjectLayout};
pub use selection::{EntryInclusion, EntrySelection};
