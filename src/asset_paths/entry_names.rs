use regex::Regex;

use crate::error::{AssetsError, AssetsResult};

/// Default output naming template handed to the bundler.
pub const DEFAULT_ENTRY_NAMES: &str = "[dir]/[name]-[hash]";

/// Output naming template, shared between the bundler invocation and manifest correlation.
///
/// The template uses esbuild's placeholders (`[dir]`, `[name]`, `[hash]`, `[ext]`). Parsing
/// an output path with the template recovers the entry's declared directory and base name,
/// discarding the injected hash.
#[derive(Debug, Clone)]
pub struct EntryNames {
  template: String,
  regex: Regex,
}

/// Entry name recovered from an output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
  /// Declared logical name of the entry, `dir/name` or `name`.
  pub logical: String,
  /// Extension of the written output, without the leading dot.
  pub ext: String,
}

impl Default for EntryNames {
  fn default() -> Self {
    Self::parse(DEFAULT_ENTRY_NAMES).expect("default entry names template is valid")
  }
}

impl EntryNames {
  /// Compile a naming template.
  pub fn parse(template: &str) -> AssetsResult<Self> {
    let invalid = |reason: &str| AssetsError::InvalidEntryNames {
      template: template.to_string(),
      reason: reason.to_string(),
    };

    let mut pattern = String::from("^");
    let mut seen: Vec<&str> = Vec::new();
    let mut rest = template;

    while !rest.is_empty() {
      let Some(open) = rest.find('[') else {
        pattern.push_str(&regex::escape(rest));
        break;
      };

      pattern.push_str(&regex::escape(&rest[..open]));
      let close = rest[open..]
        .find(']')
        .map(|offset| open + offset)
        .ok_or_else(|| invalid("unterminated placeholder"))?;
      let placeholder = &rest[open + 1..close];
      rest = &rest[close + 1..];

      if seen.contains(&placeholder) {
        return Err(invalid("placeholders may only appear once"));
      }

      match placeholder {
        "dir" => {
          // An empty [dir] collapses the following separator in bundler output.
          if let Some(after) = rest.strip_prefix('/') {
            pattern.push_str("(?:(?P<dir>.+)/)?");
            rest = after;
          } else {
            pattern.push_str("(?P<dir>.*)");
          }
        }
        "name" => pattern.push_str("(?P<name>[^/]+?)"),
        "hash" => pattern.push_str("(?P<hash>[A-Za-z0-9]+)"),
        "ext" => pattern.push_str("(?P<ext>[^./]+)"),
        _ => return Err(invalid("unknown placeholder")),
      }
      seen.push(placeholder);
    }

    if !seen.contains(&"name") {
      return Err(invalid("template must contain [name]"));
    }
    if !seen.contains(&"ext") {
      pattern.push_str(r"\.(?P<ext>[^./]+)");
    }
    pattern.push('$');

    let regex = Regex::new(&pattern).map_err(|err| invalid(&err.to_string()))?;
    Ok(Self {
      template: template.to_string(),
      regex,
    })
  }

  /// Template as passed to the bundler.
  pub fn template(&self) -> &str {
    &self.template
  }

  /// Recover the entry name from an output path relative to the assets output directory.
  pub fn parse_output(&self, relative_output: &str) -> Option<OutputName> {
    let captures = self.regex.captures(relative_output.trim_start_matches("./"))?;
    let name = captures.name("name")?.as_str();
    let ext = captures.name("ext")?.as_str().to_string();

    let logical = match captures.name("dir").map(|dir| dir.as_str().trim_matches('/')) {
      Some(dir) if !dir.is_empty() => format!("{dir}/{name}"),
      _ => name.to_string(),
    };

    Some(OutputName { logical, ext })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn output(logical: &str, ext: &str) -> Option<OutputName> {
    Some(OutputName {
      logical: logical.into(),
      ext: ext.into(),
    })
  }

  #[test]
  fn strips_hash_from_default_template() {
    let names = EntryNames::default();
    assert_eq!(names.parse_output("index-A3EJVGR4.js"), output("index", "js"));
    assert_eq!(
      names.parse_output("admin/index-YMWJCFAK.js"),
      output("admin/index", "js")
    );
    assert_eq!(
      names.parse_output("metrics/charts/app-62A4ZWTV.css"),
      output("metrics/charts/app", "css")
    );
  }

  #[test]
  fn keeps_dashes_inside_names() {
    let names = EntryNames::default();
    assert_eq!(
      names.parse_output("admin/date-picker-Q2W3E4R5.js"),
      output("admin/date-picker", "js")
    );
  }

  #[test]
  fn rejects_outputs_without_hash() {
    let names = EntryNames::default();
    assert_eq!(names.parse_output("chunk.js"), None);
  }

  #[test]
  fn supports_templates_without_hash() {
    let names = EntryNames::parse("[dir]/[name]").unwrap();
    assert_eq!(names.parse_output("admin/index.js"), output("admin/index", "js"));
    assert_eq!(names.parse_output("index.js"), output("index", "js"));
  }

  #[test]
  fn supports_fixed_prefixes() {
    let names = EntryNames::parse("entries/[dir]/[name].[hash]").unwrap();
    assert_eq!(
      names.parse_output("entries/admin/index.ABC123.js"),
      output("admin/index", "js")
    );
    assert_eq!(names.parse_output("admin/index.ABC123.js"), None);
  }

  #[test]
  fn rejects_invalid_templates() {
    assert!(EntryNames::parse("[dir]/[hash]").is_err());
    assert!(EntryNames::parse("[name]-[name]").is_err());
    assert!(EntryNames::parse("[name]-[hash").is_err());
    assert!(EntryNames::parse("[name]-[checksum]").is_err());
  }
}
