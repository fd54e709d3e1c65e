//! Helpers for deriving logical asset names from source and output paths.
//!
//! Everything in this module is pure string and path manipulation against an explicit base
//! directory, so entry point naming can be tested without invoking a bundler. Source paths
//! are mapped through the configured asset roots; output paths are mapped back through the
//! entry naming template the bundler was given.

mod entry_names;
mod normalize;
mod roots;

pub use entry_names::{DEFAULT_ENTRY_NAMES, EntryNames, OutputName};
pub use normalize::{normalize_separators, relative_slash_path, split_extension};
pub use roots::{APP_JAVASCRIPTS_ROOT, AssetRoots, RootMatch, SLICE_GROUP, SLICE_JAVASCRIPTS_ROOT};
