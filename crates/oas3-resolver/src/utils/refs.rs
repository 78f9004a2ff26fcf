use std::fmt;

use oas3::spec::{ObjectOrReference, ObjectSchema};
use percent_encoding::percent_decode_str;

const SCHEMAS_SECTION: [&str; 2] = ["components", "schemas"];
const PARAMETERS_SECTION: [&str; 2] = ["components", "parameters"];

/// A parsed in-document `$ref` target.
///
/// Segments are stored unescaped: JSON pointer escapes (`~1` for `/`, `~0` for `~`) and
/// percent-encoding are decoded on parse and re-applied on display, so two spellings of
/// the same pointer compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferencePath {
  segments: Vec<String>,
}

impl ReferencePath {
  /// Parses a `$ref` string. Returns `None` for references into other documents.
  pub fn parse(ref_path: &str) -> Option<Self> {
    let pointer = ref_path.strip_prefix('#')?;
    let pointer = pointer.strip_prefix('/').unwrap_or(pointer);
    if pointer.is_empty() {
      return None;
    }

    let segments = pointer
      .split('/')
      .map(|segment| {
        percent_decode_str(segment)
          .decode_utf8_lossy()
          .replace("~1", "/")
          .replace("~0", "~")
      })
      .collect();

    Some(Self { segments })
  }

  /// Parses a discriminator mapping target, which may also be a bare component name.
  pub fn parse_mapping_target(target: &str) -> Option<Self> {
    if target.starts_with('#') {
      Self::parse(target)
    } else if target.contains('/') || target.is_empty() {
      None
    } else {
      Some(Self::for_schema(target))
    }
  }

  pub fn for_schema(name: &str) -> Self {
    Self::in_section(SCHEMAS_SECTION, name)
  }

  pub fn for_parameter(name: &str) -> Self {
    Self::in_section(PARAMETERS_SECTION, name)
  }

  fn in_section(section: [&str; 2], name: &str) -> Self {
    Self {
      segments: section.iter().map(ToString::to_string).chain([name.to_string()]).collect(),
    }
  }

  /// The last pointer segment, i.e. the component name for component references.
  pub fn name(&self) -> &str {
    self.segments.last().map_or("", String::as_str)
  }

  pub fn is_schema(&self) -> bool {
    self.segments.len() == 3 && self.segments[..2] == SCHEMAS_SECTION
  }

  pub fn is_parameter(&self) -> bool {
    self.segments.len() == 3 && self.segments[..2] == PARAMETERS_SECTION
  }
}

impl fmt::Display for ReferencePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("#")?;
    for segment in &self.segments {
      write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
    }
    Ok(())
  }
}

/// Extracts the reference target from an [`ObjectOrReference`] variant.
///
/// Returns [`None`] for inline schemas and for references into other documents.
pub fn reference_of(obj_ref: &ObjectOrReference<ObjectSchema>) -> Option<ReferencePath> {
  match obj_ref {
    ObjectOrReference::Ref { ref_path, .. } => ReferencePath::parse(ref_path),
    ObjectOrReference::Object(_) => None,
  }
}
