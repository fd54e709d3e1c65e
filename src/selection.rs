//! Filters deciding which entry points take part in a build.

use std::collections::BTreeSet;

/// Trait describing selection filters for entry points.
pub trait EntryInclusion {
  /// Returns `true` when the entry point with this logical name should be bundled.
  fn is_included(&self, logical_name: &str) -> bool;
}

/// Include every entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl EntryInclusion for IncludeAll {
  fn is_included(&self, _logical_name: &str) -> bool {
    true
  }
}

/// Scope-based selection of entry points.
///
/// Rules are logical scopes: `admin` selects every entry of the admin slice while
/// `admin/index` selects a single entry. Exclusions take precedence over inclusions and an
/// empty include list selects everything.
#[derive(Debug, Clone, Default)]
pub struct EntrySelection {
  include: Option<BTreeSet<String>>,
  exclude: BTreeSet<String>,
}

impl EntrySelection {
  /// Build a selection from raw include and exclude rules.
  pub fn new(
    include: impl IntoIterator<Item = String>,
    exclude: impl IntoIterator<Item = String>,
  ) -> Self {
    let include = normalise_scopes(include);
    Self {
      include: (!include.is_empty()).then_some(include),
      exclude: normalise_scopes(exclude),
    }
  }

  /// Returns true when no filtering rules are active.
  pub fn is_unfiltered(&self) -> bool {
    self.include.is_none() && self.exclude.is_empty()
  }
}

impl EntryInclusion for EntrySelection {
  fn is_included(&self, logical_name: &str) -> bool {
    if self
      .exclude
      .iter()
      .any(|scope| scope_matches(scope, logical_name))
    {
      return false;
    }

    self.include.as_ref().is_none_or(|include| {
      include
        .iter()
        .any(|scope| scope_matches(scope, logical_name))
    })
  }
}

fn normalise_scopes(values: impl IntoIterator<Item = String>) -> BTreeSet<String> {
  values
    .into_iter()
    .map(|value| value.trim().replace('\\', "/").trim_matches('/').to_string())
    .filter(|value| !value.is_empty())
    .collect()
}

fn scope_matches(scope: &str, logical_name: &str) -> bool {
  logical_name == scope
    || logical_name
      .strip_prefix(scope)
      .is_some_and(|suffix| suffix.starts_with('/'))
}
