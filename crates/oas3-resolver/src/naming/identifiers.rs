use std::{
  char::{ToLowercase, ToUppercase},
  collections::{BTreeSet, HashSet},
  iter::Peekable,
  sync::LazyLock,
};

use any_ascii::any_ascii;
use inflections::Inflect;
use regex::Regex;

/// Words that cannot be used verbatim as a generated field identifier.
pub(crate) static RESERVED_IDENTIFIERS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super",
    "trait", "true", "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "try", "yield",
  ]
  .into_iter()
  .collect()
});

static INVALID_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());
static MULTI_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

/// Transliterates to ASCII, replaces invalid characters with underscores, collapses
/// consecutive underscores, and trims any leading or trailing underscores.
pub fn sanitize(input: &str) -> String {
  if input.is_empty() {
    return String::new();
  }

  let ascii = any_ascii(input);
  let replaced = INVALID_CHARS_RE.replace_all(&ascii, "_");
  let collapsed = MULTI_UNDERSCORE_RE.replace_all(&replaced, "_");

  collapsed.trim_matches('_').to_string()
}

/// Converts a schema-local name into the identifier carried by a property (`snake_case`).
///
/// # Rules:
/// 1. A leading `-` is stripped and `negative_` is prepended to the result.
/// 2. The base string is sanitized and converted to `snake_case`.
/// 3. Reserved words get a trailing underscore.
/// 4. A leading digit is prefixed with `_`.
/// 5. An empty result becomes `_`.
pub fn to_field_ident(name: &str) -> String {
  let (has_leading_minus, name_without_minus) = match name.strip_prefix('-') {
    Some(stripped) => (true, stripped),
    None => (false, name),
  };

  let mut ident = sanitize(name_without_minus).to_snake_case();

  if ident.is_empty() {
    return "_".to_string();
  }

  if has_leading_minus {
    ident = format!("negative_{ident}");
  }

  if RESERVED_IDENTIFIERS.contains(ident.as_str()) {
    return format!("{ident}_");
  }

  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, '_');
  }

  ident
}

/// Converts a schema name or title into a class name (`PascalCase`).
///
/// # Rules:
/// 1. A leading `-` is stripped and `Negative` is prepended to the result.
/// 2. Input that already mixes upper and lower case without separators keeps its capitalization.
/// 3. Otherwise words are split on separators and camelCase boundaries and capitalized.
/// 4. A leading digit is prefixed with `T`.
/// 5. An empty result becomes `Unnamed`.
pub fn to_class_name(name: &str) -> String {
  let (has_leading_minus, name_without_minus) = match name.strip_prefix('-') {
    Some(stripped) => (true, stripped),
    None => (false, name),
  };

  let has_separators = name_without_minus.contains(['-', '_', '.', ' ', '/']);
  let has_upper = name_without_minus.chars().any(|c| c.is_ascii_uppercase());
  let has_lower = name_without_minus.chars().any(|c| c.is_ascii_lowercase());
  let appears_mixed_case = !has_separators && has_upper && has_lower;

  let ascii = any_ascii(name_without_minus);
  let mut ident: String = if appears_mixed_case {
    let cleaned: String = ascii.chars().filter(char::is_ascii_alphanumeric).collect();
    let mut chars = cleaned.chars();
    match chars.next() {
      None => String::new(),
      Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
  } else {
    ascii
      .chars()
      .capitalize_words_with_boundaries()
      .filter(char::is_ascii_alphanumeric)
      .collect()
  };

  if ident.is_empty() {
    return "Unnamed".to_string();
  }

  if has_leading_minus {
    ident = format!("Negative{ident}");
  }

  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, 'T');
  }

  ident
}

/// Module-like grouping tag for a class (`snake_case` of the class name).
pub fn to_module_name(class_name: &str) -> String {
  let module = sanitize(class_name).to_snake_case();
  if module.is_empty() { "_".to_string() } else { module }
}

/// Key for a string enum member: upper-cased and sanitized.
pub fn to_enum_key(value: &str) -> String {
  sanitize(&value.to_uppercase())
}

/// Appends an incrementing suffix, starting at 2, until the name is not in `used_names`.
pub fn ensure_unique(base_name: &str, used_names: &BTreeSet<String>) -> String {
  if !used_names.contains(base_name) {
    return base_name.to_string();
  }
  let mut i = 2;
  loop {
    let new_name = format!("{base_name}{i}");
    if !used_names.contains(&new_name) {
      return new_name;
    }
    i += 1;
  }
}

/// An extension trait for char iterators to add word capitalization.
pub trait CapitalizeWordsExt: Iterator<Item = char> {
  fn capitalize_words_with_boundaries(self) -> CapitalizeWordsWithBoundaries<Self>
  where
    Self: Sized;
}

impl<I> CapitalizeWordsExt for I
where
  I: Iterator<Item = char>,
{
  fn capitalize_words_with_boundaries(self) -> CapitalizeWordsWithBoundaries<Self>
  where
    Self: Sized,
  {
    CapitalizeWordsWithBoundaries {
      iter: self.peekable(),
      capitalize_next: true,
      prev_was_lower: false,
      pending_upper: None,
      pending_lower: None,
    }
  }
}

pub struct CapitalizeWordsWithBoundaries<I>
where
  I: Iterator<Item = char>,
{
  iter: Peekable<I>,
  capitalize_next: bool,
  prev_was_lower: bool,
  pending_upper: Option<ToUppercase>,
  pending_lower: Option<ToLowercase>,
}

impl<I> Iterator for CapitalizeWordsWithBoundaries<I>
where
  I: Iterator<Item = char>,
{
  type Item = char;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if let Some(upper_iter) = self.pending_upper.as_mut() {
      if let Some(c) = upper_iter.next() {
        return Some(c);
      }
      self.pending_upper = None;
    }

    if let Some(lower_iter) = self.pending_lower.as_mut() {
      if let Some(c) = lower_iter.next() {
        return Some(c);
      }
      self.pending_lower = None;
    }

    let c = self.iter.next()?;

    if !c.is_ascii_alphanumeric() {
      self.capitalize_next = self.iter.peek().is_some_and(char::is_ascii_alphanumeric);
      self.prev_was_lower = false;
      return Some(c);
    }

    let is_lower = c.is_ascii_lowercase();
    let is_upper = c.is_ascii_uppercase();

    let should_capitalize = self.capitalize_next
      || (self.prev_was_lower && is_upper)
      || (is_upper && self.iter.peek().is_some_and(char::is_ascii_lowercase));

    self.prev_was_lower = is_lower;
    self.capitalize_next = false;

    let mut converted = if should_capitalize {
      CaseShift::Upper(c.to_uppercase())
    } else {
      CaseShift::Lower(c.to_lowercase())
    };
    let first = converted.next();
    match converted {
      CaseShift::Upper(rest) => self.pending_upper = Some(rest),
      CaseShift::Lower(rest) => self.pending_lower = Some(rest),
    }
    first
  }
}

enum CaseShift {
  Upper(ToUppercase),
  Lower(ToLowercase),
}

impl CaseShift {
  fn next(&mut self) -> Option<char> {
    match self {
      Self::Upper(iter) => iter.next(),
      Self::Lower(iter) => iter.next(),
    }
  }
}
