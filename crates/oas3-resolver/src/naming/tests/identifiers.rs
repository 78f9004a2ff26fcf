use std::collections::BTreeSet;

use crate::naming::identifiers::{
  ensure_unique, sanitize, to_class_name, to_enum_key, to_field_ident, to_module_name,
};

#[test]
fn test_sanitize() {
  assert_eq!(sanitize("foo-bar baz"), "foo_bar_baz");
  assert_eq!(sanitize("__leading__trailing__"), "leading_trailing");
  assert_eq!(sanitize("a..b"), "a_b");
  assert_eq!(sanitize(""), "");
}

#[test]
fn test_field_idents() {
  assert_eq!(to_field_ident("foo-bar"), "foo_bar");
  assert_eq!(to_field_ident("match"), "match_");
  assert_eq!(to_field_ident("self"), "self_");
  assert_eq!(to_field_ident("type"), "type_");
  assert_eq!(to_field_ident("123name"), "_123name");
  assert_eq!(to_field_ident(""), "_");
  assert_eq!(to_field_ident("  "), "_");
}

#[test]
fn test_field_idents_negative_prefix() {
  assert_eq!(to_field_ident("-created-date"), "negative_created_date");
  assert_eq!(to_field_ident("-id"), "negative_id");
  assert_eq!(to_field_ident("-"), "_");
}

#[test]
fn test_class_names() {
  assert_eq!(to_class_name("oAuth"), "OAuth");
  assert_eq!(to_class_name("-INF"), "NegativeInf");
  assert_eq!(to_class_name("123Response"), "T123Response");
  assert_eq!(to_class_name(""), "Unnamed");
  assert_eq!(to_class_name("  "), "Unnamed");
}

#[test]
fn test_class_names_preserve_pascal_case() {
  assert_eq!(to_class_name("XMLHttpRequest"), "XMLHttpRequest");
  assert_eq!(to_class_name("PetOwner"), "PetOwner");
  assert_eq!(to_class_name("xmlHttpRequest"), "XmlHttpRequest");
  assert_eq!(to_class_name("beta_ResponseMCP"), "BetaResponseMcp");
  assert_eq!(to_class_name("pet owner"), "PetOwner");
}

#[test]
fn test_class_names_normalize_separated_uppercase() {
  assert_eq!(to_class_name("NOT_FORCED"), "NotForced");
  assert_eq!(to_class_name("PDF_FILE"), "PdfFile");
  assert_eq!(to_class_name("ADD"), "Add");
}

#[test]
fn test_module_names() {
  assert_eq!(to_module_name("PetOwner"), "pet_owner");
  assert_eq!(to_module_name("Pet"), "pet");
}

#[test]
fn test_enum_keys() {
  assert_eq!(to_enum_key("available"), "AVAILABLE");
  assert_eq!(to_enum_key("in-stock"), "IN_STOCK");
  assert_eq!(to_enum_key("a b"), "A_B");
}

#[test]
fn test_ensure_unique_starts_at_two() {
  let used = BTreeSet::from(["Pet".to_string(), "Pet2".to_string()]);
  assert_eq!(ensure_unique("Owner", &used), "Owner");
  assert_eq!(ensure_unique("Pet", &used), "Pet3");
}
