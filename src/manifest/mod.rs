//! Manifest generation split into the document model and output correlation.

mod correlation;
mod document;

pub use correlation::correlate;
pub use document::Manifest;
