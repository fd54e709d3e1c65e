//! Correlate bundler outputs with the declared entry points.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use super::Manifest;
use crate::asset_paths::{EntryNames, relative_slash_path};
use crate::bundler::BuildReport;
use crate::entries::EntryPoints;
use crate::error::{AssetsError, AssetsResult};
use crate::project::ProjectLayout;

/// Build the manifest for a completed bundler run.
///
/// Each output is parsed with the entry naming template to recover the entry's declared
/// directory and base name. Outputs that name a declared entry (and, when the bundler
/// reports it, were produced from that entry's source) become manifest entries keyed by
/// `<logical name>.<output extension>`. Source maps and shared chunks are skipped. When any
/// output in the report names its entry point, outputs without one are treated as
/// unrelated files (copied assets, chunks) even if their names look like an entry's. Every
/// declared entry must produce at least one output.
pub fn correlate(
  layout: &ProjectLayout,
  entry_names: &EntryNames,
  entries: &EntryPoints,
  report: &BuildReport,
) -> AssetsResult<Manifest> {
  let assets_dir = layout.assets_dir();
  let mut manifest = Manifest::new();
  let mut produced = BTreeSet::new();
  let attributed = report
    .outputs()
    .iter()
    .any(|output| output.entry_point.is_some());

  for output in report.outputs() {
    if output.is_source_map() {
      continue;
    }

    let path = layout.base_dir.join(&output.path);
    let public_relative = relative_slash_path(&layout.public_dir, &path).ok_or_else(|| {
      AssetsError::OutputOutsidePublicDir {
        path: path.clone(),
        public_dir: layout.public_dir.clone(),
      }
    })?;

    let Some(output_name) = relative_slash_path(&assets_dir, &path)
      .and_then(|relative| entry_names.parse_output(&relative))
    else {
      debug!(output = %public_relative, "output does not match entry naming, skipping");
      continue;
    };

    let Some(source) = entries.source(&output_name.logical) else {
      debug!(output = %public_relative, "output belongs to no declared entry, skipping");
      continue;
    };

    match &output.entry_point {
      Some(entry_point) if !same_source(&layout.base_dir, entry_point, source) => {
        debug!(
          output = %public_relative,
          entry_point = %entry_point.display(),
          "output was produced from a different source, skipping"
        );
        continue;
      }
      None if attributed => {
        debug!(output = %public_relative, "unattributed output in an attributed report, skipping");
        continue;
      }
      _ => {}
    }

    manifest.insert(
      format!("{}.{}", output_name.logical, output_name.ext),
      format!("/{public_relative}"),
    )?;
    produced.insert(output_name.logical);
  }

  if let Some(missing) = entries.names().find(|name| !produced.contains(*name)) {
    return Err(AssetsError::MissingOutput {
      name: missing.to_string(),
    });
  }

  Ok(manifest)
}

fn same_source(base_dir: &Path, reported: &Path, declared: &Path) -> bool {
  match (
    relative_slash_path(base_dir, reported),
    relative_slash_path(base_dir, declared),
  ) {
    (Some(reported), Some(declared)) => reported == declared,
    _ => base_dir.join(reported) == base_dir.join(declared),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::asset_paths::AssetRoots;
  use crate::bundler::OutputFile;

  const BASE: &str = "/srv/bookshelf";

  fn layout() -> ProjectLayout {
    ProjectLayout::new(BASE)
  }

  fn entries() -> EntryPoints {
    EntryPoints::from_sources(&AssetRoots::default(), Path::new(BASE), [
      "app/assets/javascripts/index.js",
      "slices/admin/assets/javascripts/index.js",
      "slices/metrics/assets/javascripts/app.ts",
    ])
    .unwrap()
  }

  fn report() -> BuildReport {
    [
      OutputFile::for_entry("public/assets/index-A3EJVGR4.js", "app/assets/javascripts/index.js"),
      OutputFile::for_entry(
        "public/assets/index-A3EJVGR4.js.map",
        "app/assets/javascripts/index.js",
      ),
      OutputFile::for_entry(
        "public/assets/admin/index-YMWJCFAK.js",
        "slices/admin/assets/javascripts/index.js",
      ),
      OutputFile::for_entry(
        "/srv/bookshelf/public/assets/metrics/app-62A4ZWTV.js",
        "/srv/bookshelf/slices/metrics/assets/javascripts/app.ts",
      ),
      OutputFile::unattributed("public/assets/chunk-KD3N2LZE.js"),
    ]
    .into_iter()
    .collect()
  }

  #[test]
  fn maps_each_entry_to_its_hashed_url() {
    let manifest = correlate(&layout(), &EntryNames::default(), &entries(), &report()).unwrap();

    assert_eq!(manifest.len(), 3);
    assert_eq!(manifest.get("index.js"), Some("/assets/index-A3EJVGR4.js"));
    assert_eq!(
      manifest.get("admin/index.js"),
      Some("/assets/admin/index-YMWJCFAK.js")
    );
    assert_eq!(
      manifest.get("metrics/app.js"),
      Some("/assets/metrics/app-62A4ZWTV.js")
    );
  }

  #[test]
  fn values_are_public_urls_under_assets() {
    let manifest = correlate(&layout(), &EntryNames::default(), &entries(), &report()).unwrap();
    assert!(manifest.iter().all(|(_, url)| url.starts_with("/assets/")));
  }

  #[test]
  fn records_css_bundles_next_to_scripts() {
    let mut report = report();
    report.push(OutputFile::for_entry(
      "public/assets/admin/index-OQWK3JXN.css",
      "slices/admin/assets/javascripts/index.js",
    ));

    let manifest = correlate(&layout(), &EntryNames::default(), &entries(), &report).unwrap();
    assert_eq!(
      manifest.get("admin/index.css"),
      Some("/assets/admin/index-OQWK3JXN.css")
    );
  }

  #[test]
  fn ignores_outputs_from_other_sources() {
    let mut report = report();
    report.push(OutputFile::for_entry(
      "public/assets/admin/index-ZZZZZZZZ.js",
      "slices/admin/assets/javascripts/legacy/index.js",
    ));

    let manifest = correlate(&layout(), &EntryNames::default(), &entries(), &report).unwrap();
    assert_eq!(
      manifest.get("admin/index.js"),
      Some("/assets/admin/index-YMWJCFAK.js")
    );
  }

  #[test]
  fn fails_when_an_entry_has_no_output() {
    let report: BuildReport = report()
      .outputs()
      .iter()
      .filter(|output| !output.path.to_string_lossy().contains("metrics"))
      .cloned()
      .collect();

    let err = correlate(&layout(), &EntryNames::default(), &entries(), &report).unwrap_err();
    match err {
      AssetsError::MissingOutput { name } => assert_eq!(name, "metrics/app"),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn fails_for_outputs_outside_public_dir() {
    let mut report = report();
    report.push(OutputFile::unattributed("tmp/index-A3EJVGR4.js"));

    let err = correlate(&layout(), &EntryNames::default(), &entries(), &report).unwrap_err();
    assert!(matches!(err, AssetsError::OutputOutsidePublicDir { .. }));
  }

  #[test]
  fn fails_when_two_outputs_claim_one_key() {
    let mut report = report();
    report.push(OutputFile::for_entry(
      "public/assets/index-BBBBBBBB.js",
      "app/assets/javascripts/index.js",
    ));

    let err = correlate(&layout(), &EntryNames::default(), &entries(), &report).unwrap_err();
    assert!(matches!(err, AssetsError::DuplicateManifestKey { .. }));
  }

  #[test]
  fn skips_unattributed_lookalikes_when_outputs_are_attributed() {
    let mut report = report();
    report.push(OutputFile::unattributed("public/assets/index-Q7N2BX4M.png"));
    report.push(OutputFile::unattributed("public/assets/admin/index-HH31KL0P.js"));

    let manifest = correlate(&layout(), &EntryNames::default(), &entries(), &report).unwrap();
    assert_eq!(manifest.len(), 3);
    assert_eq!(manifest.get("index.png"), None);
    assert_eq!(
      manifest.get("admin/index.js"),
      Some("/assets/admin/index-YMWJCFAK.js")
    );
  }

  #[test]
  fn supports_unhashed_output_names() {
    let entry_names = EntryNames::parse("[dir]/[name]").unwrap();
    let report: BuildReport = [
      OutputFile::unattributed("public/assets/index.js"),
      OutputFile::unattributed("public/assets/admin/index.js"),
      OutputFile::unattributed("public/assets/metrics/app.js"),
    ]
    .into_iter()
    .collect();

    let manifest = correlate(&layout(), &entry_names, &entries(), &report).unwrap();
    assert_eq!(manifest.get("metrics/app.js"), Some("/assets/metrics/app.js"));
  }
}
