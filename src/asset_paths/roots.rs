use std::path::Path;

use regex::Regex;

use super::normalize::{normalize_separators, relative_slash_path, split_extension};
use crate::error::{AssetsError, AssetsResult};

/// Asset root of the application itself.
pub const APP_JAVASCRIPTS_ROOT: &str = "app/assets/javascripts/";

/// Asset root of every slice. The `slice` group becomes the first segment of the logical name.
pub const SLICE_JAVASCRIPTS_ROOT: &str = "slices/(?P<slice>[^/]+)/assets/javascripts/";

/// Name of the capture group carrying the slice name in a root pattern.
pub const SLICE_GROUP: &str = "slice";

/// Ordered set of recognised asset root prefixes.
///
/// Each pattern is a regular expression anchored at the start of a base-relative,
/// `/`-separated source path. The first matching pattern wins. When a pattern captures a
/// `slice` group the slice name replaces the matched prefix, so
/// `slices/admin/assets/javascripts/index.js` becomes `admin/index.js`.
#[derive(Debug, Clone)]
pub struct AssetRoots {
  roots: Vec<AssetRoot>,
}

#[derive(Debug, Clone)]
struct AssetRoot {
  pattern: String,
  regex: Regex,
}

/// Result of matching a source path against the asset roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootMatch<'a> {
  /// Pattern that matched, as configured.
  pub pattern: &'a str,
  /// Slice captured by the pattern, if any.
  pub slice: Option<&'a str>,
  /// Path remaining after the matched prefix.
  pub remainder: &'a str,
}

impl Default for AssetRoots {
  fn default() -> Self {
    Self::new([APP_JAVASCRIPTS_ROOT, SLICE_JAVASCRIPTS_ROOT])
      .expect("default asset root patterns are valid")
  }
}

impl AssetRoots {
  /// Compile a set of root patterns.
  pub fn new<I, S>(patterns: I) -> AssetsResult<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let roots = patterns
      .into_iter()
      .map(|pattern| {
        let pattern = pattern.as_ref().to_string();
        Regex::new(&format!("^(?:{pattern})"))
          .map(|regex| AssetRoot {
            pattern: pattern.clone(),
            regex,
          })
          .map_err(|source| AssetsError::InvalidRootPattern { pattern, source })
      })
      .collect::<AssetsResult<Vec<_>>>()?;

    Ok(Self { roots })
  }

  /// Patterns in match order.
  pub fn patterns(&self) -> impl Iterator<Item = &str> {
    self.roots.iter().map(|root| root.pattern.as_str())
  }

  /// Match a base-relative path against the configured roots.
  pub fn match_root<'a>(&'a self, relative_path: &'a str) -> Option<RootMatch<'a>> {
    self.roots.iter().find_map(|root| {
      let captures = root.regex.captures(relative_path)?;
      let matched = captures.get(0)?;
      let slice = captures
        .name(SLICE_GROUP)
        .map(|group| group.as_str())
        .filter(|slice| !slice.is_empty());

      Some(RootMatch {
        pattern: &root.pattern,
        slice,
        remainder: relative_path[matched.end()..].trim_start_matches('/'),
      })
    })
  }

  /// Remove the recognised root prefix from a base-relative path.
  ///
  /// Paths that do not start with a recognised root are returned unchanged, which makes the
  /// operation idempotent on already-normalised keys.
  pub fn strip(&self, relative_path: &str) -> String {
    let normalized = normalize_separators(relative_path);
    match self.match_root(&normalized) {
      Some(RootMatch {
        slice: Some(slice),
        remainder,
        ..
      }) => format!("{slice}/{remainder}"),
      Some(RootMatch { remainder, .. }) => remainder.to_string(),
      None => normalized,
    }
  }

  /// Derive the logical name of an entry point from its source path.
  ///
  /// `source` is resolved against `base_dir` when relative. The result has its root prefix
  /// removed and its extension dropped: `slices/metrics/assets/javascripts/app.ts` yields
  /// `metrics/app`.
  pub fn logical_name(&self, base_dir: &Path, source: &Path) -> AssetsResult<String> {
    let unrecognised = || AssetsError::UnrecognisedSource {
      path: source.to_path_buf(),
    };

    let relative = relative_slash_path(base_dir, source).ok_or_else(unrecognised)?;
    let root = self.match_root(&relative).ok_or_else(unrecognised)?;

    let (stem, _) = split_extension(root.remainder);
    let name = match root.slice {
      Some(slice) if !stem.is_empty() => format!("{slice}/{stem}"),
      _ => stem.to_string(),
    };

    if name.is_empty() {
      return Err(AssetsError::EmptyLogicalName {
        source_path: source.to_path_buf(),
      });
    }

    Ok(name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BASE: &str = "/srv/bookshelf";

  fn logical(roots: &AssetRoots, source: &str) -> AssetsResult<String> {
    roots.logical_name(Path::new(BASE), Path::new(source))
  }

  #[test]
  fn strips_app_root_without_slice_prefix() {
    let roots = AssetRoots::default();
    assert_eq!(
      logical(&roots, "/srv/bookshelf/app/assets/javascripts/index.js").unwrap(),
      "index"
    );
    assert_eq!(
      logical(&roots, "/srv/bookshelf/app/assets/javascripts/pages/home.tsx").unwrap(),
      "pages/home"
    );
  }

  #[test]
  fn replaces_slice_root_with_slice_name() {
    let roots = AssetRoots::default();
    assert_eq!(
      logical(&roots, "/srv/bookshelf/slices/admin/assets/javascripts/index.js").unwrap(),
      "admin/index"
    );
    assert_eq!(
      logical(&roots, "slices/metrics/assets/javascripts/app.ts").unwrap(),
      "metrics/app"
    );
  }

  #[test]
  fn rejects_sources_outside_roots() {
    let roots = AssetRoots::default();
    let err = logical(&roots, "/srv/bookshelf/lib/tasks/seed.js").unwrap_err();
    assert!(matches!(err, AssetsError::UnrecognisedSource { .. }));

    let err = logical(&roots, "/elsewhere/app/assets/javascripts/index.js").unwrap_err();
    assert!(matches!(err, AssetsError::UnrecognisedSource { .. }));
  }

  #[test]
  fn rejects_sources_that_leave_an_empty_name() {
    let roots = AssetRoots::new(["app/assets/javascripts"]).unwrap();
    let err = logical(&roots, "/srv/bookshelf/app/assets/javascripts").unwrap_err();
    assert!(matches!(err, AssetsError::EmptyLogicalName { .. }));
  }

  #[test]
  fn strip_is_idempotent() {
    let roots = AssetRoots::default();
    let once = roots.strip("slices/admin/assets/javascripts/index.js");
    assert_eq!(once, "admin/index.js");
    assert_eq!(roots.strip(&once), once);

    let once = roots.strip("app/assets/javascripts/index.js");
    assert_eq!(once, "index.js");
    assert_eq!(roots.strip(&once), once);
  }

  #[test]
  fn strip_normalises_separators() {
    let roots = AssetRoots::default();
    assert_eq!(
      roots.strip("slices\\metrics\\assets\\javascripts\\charts\\app.ts"),
      "metrics/charts/app.ts"
    );
  }

  #[test]
  fn custom_roots_are_matched_in_order() {
    let roots = AssetRoots::new([
      "app/assets/js/",
      "slices/(?P<slice>[^/]+)/assets/js/",
      "vendor/(?P<slice>[^/]+)/",
    ])
    .unwrap();

    assert_eq!(logical(&roots, "vendor/charts/index.js").unwrap(), "charts/index");
    assert_eq!(logical(&roots, "app/assets/js/app.js").unwrap(), "app");
    assert!(logical(&roots, "app/assets/javascripts/app.js").is_err());
    assert_eq!(roots.patterns().count(), 3);
  }

  #[test]
  fn reports_invalid_patterns() {
    let err = AssetRoots::new(["slices/(?P<slice>[^/]+/"]).unwrap_err();
    assert!(matches!(err, AssetsError::InvalidRootPattern { .. }));
  }
}
