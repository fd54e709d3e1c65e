use std::path::{Component, Path, PathBuf};

/// Convert native directory separators into forward slashes.
///
/// Manifest keys and URLs always use `/` so the manifest reads the same regardless of the
/// platform the build ran on.
pub fn normalize_separators(path: &str) -> String {
  path.replace('\\', "/")
}

/// Render `path` relative to `base` as a `/`-separated string.
///
/// Returns `None` when `path` is not located under `base`. Relative inputs are interpreted
/// relative to `base` rather than the process working directory.
pub fn relative_slash_path(base: &Path, path: &Path) -> Option<String> {
  let absolute = if path.is_absolute() {
    lexical_clean(path)
  } else {
    lexical_clean(&base.join(path))
  };
  let relative = absolute.strip_prefix(lexical_clean(base)).ok()?;

  Some(normalize_separators(&relative.to_string_lossy()))
}

/// Split a `/`-separated path into its stem and extension.
///
/// Dot files such as `.eslintrc` are treated as having no extension.
pub fn split_extension(path: &str) -> (&str, Option<&str>) {
  let file_start = path.rfind('/').map_or(0, |index| index + 1);
  match path[file_start..].rfind('.') {
    Some(0) | None => (path, None),
    Some(dot) => {
      let dot = file_start + dot;
      (&path[..dot], Some(&path[dot + 1..]))
    }
  }
}

fn lexical_clean(path: &Path) -> PathBuf {
  let mut cleaned = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        cleaned.pop();
      }
      other => cleaned.push(other.as_os_str()),
    }
  }
  cleaned
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalises_backslashes_from_windows_inputs() {
    assert_eq!(
      normalize_separators("slices\\admin\\assets\\javascripts\\index.js"),
      "slices/admin/assets/javascripts/index.js"
    );
  }

  #[test]
  fn relativises_against_explicit_base() {
    let base = Path::new("/srv/app");
    assert_eq!(
      relative_slash_path(base, Path::new("/srv/app/slices/admin/index.js")).as_deref(),
      Some("slices/admin/index.js")
    );
    assert_eq!(
      relative_slash_path(base, Path::new("app/assets/./javascripts/index.js")).as_deref(),
      Some("app/assets/javascripts/index.js")
    );
  }

  #[test]
  fn rejects_paths_outside_base() {
    let base = Path::new("/srv/app");
    assert_eq!(relative_slash_path(base, Path::new("/srv/other/index.js")), None);
    assert_eq!(relative_slash_path(base, Path::new("../other/index.js")), None);
  }

  #[test]
  fn splits_extensions_from_file_names_only() {
    assert_eq!(split_extension("admin/index.js"), ("admin/index", Some("js")));
    assert_eq!(split_extension("v1.2/app"), ("v1.2/app", None));
    assert_eq!(split_extension("app.min.js"), ("app.min", Some("js")));
    assert_eq!(split_extension("config/.env"), ("config/.env", None));
  }
}
