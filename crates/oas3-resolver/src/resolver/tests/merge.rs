use serde_json::json;

use super::support::{build, names};
use crate::{
  resolver::{
    ModelProperty, Property, PropertyKind, PropertyMeta, ReferenceProperty, Schemas, Value, merge_properties,
  },
  utils::ReferencePath,
};

fn model_named(name: &str, class_of: &Property) -> Property {
  Property::Model(ModelProperty {
    meta: PropertyMeta::new(name, false),
    class: class_of.class().expect("model property").clone(),
  })
}

#[test]
fn test_merge_with_itself_is_identity() {
  let mut schemas = Schemas::default();
  let properties = [
    build("s", json!({ "type": "string", "default": "x" }), &mut schemas, "Owner"),
    build("d", json!({ "type": "string", "format": "date" }), &mut schemas, "Owner"),
    build("i", json!({ "type": "integer", "default": 1 }), &mut schemas, "Owner"),
    build("f", json!({ "type": "number" }), &mut schemas, "Owner"),
    build("b", json!({ "type": "boolean" }), &mut schemas, "Owner"),
    build("a", json!({}), &mut schemas, "Owner"),
    build("c", json!({ "const": 3 }), &mut schemas, "Owner"),
    build("l", json!({ "type": "array", "items": { "type": "string" } }), &mut schemas, "Owner"),
    build("u", json!({ "anyOf": [{ "type": "string" }, { "type": "integer" }] }), &mut schemas, "Owner"),
    build("e", json!({ "enum": ["x", "y"] }), &mut schemas, "Owner"),
    build("m", json!({ "type": "object", "properties": { "k": { "type": "string" } } }), &mut schemas, "Owner"),
  ];

  for property in &properties {
    let before = schemas.models().count();
    let merged = merge_properties(property, property, &mut schemas).expect("self merge");
    assert_eq!(&merged, property, "merging {} with itself", property.kind());
    assert_eq!(schemas.models().count(), before);
  }
}

#[test]
fn test_int_and_float_defaults() {
  let mut schemas = Schemas::default();
  let int = build("n", json!({ "type": "integer" }), &mut schemas, "Owner");
  let float = build("n", json!({ "type": "number", "default": 2 }), &mut schemas, "Owner");

  let merged = merge_properties(&int, &float, &mut schemas).expect("int and float merge");
  assert_eq!(merged.kind(), PropertyKind::Int);
  assert_eq!(merged.default(), Some(&Value::Int(2)));

  let fractional = build("n", json!({ "type": "number", "default": 2.5 }), &mut schemas, "Owner");
  let err = merge_properties(&int, &fractional, &mut schemas).unwrap_err();
  assert!(err.detail.contains("default value"), "{}", err.detail);
}

#[test]
fn test_later_attributes_win() {
  let mut schemas = Schemas::default();
  let first = build(
    "name",
    json!({ "type": "string", "description": "first", "default": "a", "maxLength": 5 }),
    &mut schemas,
    "Owner",
  );
  let mut second = build(
    "name",
    json!({ "type": "string", "description": "second", "pattern": "^a" }),
    &mut schemas,
    "Owner",
  );
  second.meta_mut().required = false;

  let Property::String(merged) = merge_properties(&first, &second, &mut schemas).expect("strings merge") else {
    panic!("expected a string");
  };
  assert_eq!(merged.meta.description.as_deref(), Some("second"));
  assert_eq!(merged.default, Some(Value::String("a".to_string())), "earlier default kept when later has none");
  assert_eq!(merged.max_length, Some(5));
  assert_eq!(merged.pattern.as_deref(), Some("^a"));
  assert!(merged.meta.required, "required is the OR of both sides");
}

#[test]
fn test_string_refines_to_specific_kinds() {
  let mut schemas = Schemas::default();
  let string = build("when", json!({ "type": "string" }), &mut schemas, "Owner");
  let date = build("when", json!({ "type": "string", "format": "date-time" }), &mut schemas, "Owner");
  let any = build("when", json!({ "description": "anything" }), &mut schemas, "Owner");

  assert_eq!(
    merge_properties(&string, &date, &mut schemas).unwrap().kind(),
    PropertyKind::DateTime
  );
  assert_eq!(merge_properties(&date, &string, &mut schemas).unwrap().kind(), PropertyKind::DateTime);
  assert_eq!(merge_properties(&any, &string, &mut schemas).unwrap().kind(), PropertyKind::String);
}

#[test]
fn test_enums_narrow() {
  let mut schemas = Schemas::default();
  let wide = build("status", json!({ "enum": ["a", "b", "c"] }), &mut schemas, "Wide");
  let narrow = build("status", json!({ "enum": ["a", "b"], "default": "b" }), &mut schemas, "Narrow");
  let string = build("status", json!({ "type": "string" }), &mut schemas, "Owner");
  let int = build("status", json!({ "type": "integer" }), &mut schemas, "Owner");

  let merged = merge_properties(&wide, &narrow, &mut schemas).expect("subset merges");
  assert_eq!(merged.class().map(|c| c.name.as_str()), Some("NarrowStatus"));
  assert_eq!(merged.default(), Some(&Value::EnumMember("B".to_string())));

  let merged = merge_properties(&string, &wide, &mut schemas).expect("enum refines string");
  assert_eq!(merged.class().map(|c| c.name.as_str()), Some("WideStatus"));

  let err = merge_properties(&wide, &int, &mut schemas).unwrap_err();
  assert!(err.detail.contains("are incompatible"), "{}", err.detail);

  let other = build("status", json!({ "enum": ["a", "z"] }), &mut schemas, "Other");
  let err = merge_properties(&wide, &other, &mut schemas).unwrap_err();
  assert!(err.detail.contains("incompatible values"), "{}", err.detail);
}

#[test]
fn test_incompatible_kinds() {
  let mut schemas = Schemas::default();
  let int = build("flag", json!({ "type": "integer" }), &mut schemas, "Owner");
  let boolean = build("flag", json!({ "type": "boolean" }), &mut schemas, "Owner");

  let err = merge_properties(&int, &boolean, &mut schemas).unwrap_err();
  assert_eq!(err.detail, "Property flag can't be merged: int and boolean are incompatible");
}

#[test]
fn test_lists_merge_items() {
  let mut schemas = Schemas::default();
  let strings = build("tags", json!({ "type": "array", "items": { "type": "string" } }), &mut schemas, "Owner");
  let uuids = build(
    "tags",
    json!({ "type": "array", "items": { "type": "string", "format": "uuid" } }),
    &mut schemas,
    "Owner",
  );
  let ints = build("tags", json!({ "type": "array", "items": { "type": "integer" } }), &mut schemas, "Owner");

  let merged = merge_properties(&strings, &uuids, &mut schemas);
  assert!(merged.is_err(), "uuid does not refine a plain string");

  let err = merge_properties(&uuids, &ints, &mut schemas).unwrap_err();
  assert!(err.detail.starts_with("invalid data in items of array tags"), "{}", err.detail);
}

#[test]
fn test_models_merge_into_new_class() {
  let mut schemas = Schemas::default();
  let a = build(
    "A",
    json!({ "type": "object", "required": ["x"], "properties": { "x": { "type": "string" }, "z": { "type": "integer" } } }),
    &mut schemas,
    "",
  );
  let b = build(
    "B",
    json!({ "type": "object", "properties": { "x": { "type": "string" }, "y": { "type": "boolean" } } }),
    &mut schemas,
    "",
  );
  let superset = build(
    "C",
    json!({
      "type": "object",
      "required": ["x"],
      "properties": { "x": { "type": "string" }, "z": { "type": "integer" }, "y": { "type": "boolean" } }
    }),
    &mut schemas,
    "",
  );

  let merged = merge_properties(&model_named("pet", &a), &model_named("pet", &b), &mut schemas).expect("models merge");
  let class = merged.class().expect("merged class").clone();
  assert_eq!(class.name, "Pet");
  let definition = schemas.model(&class).expect("synthesized model registered");
  assert_eq!(names(&definition.required_properties), vec!["x"]);
  assert_eq!(names(&definition.optional_properties), vec!["z", "y"]);

  let merged = merge_properties(&model_named("pet", &a), &model_named("pet", &superset), &mut schemas)
    .expect("superset merge");
  assert_eq!(merged.class().map(|c| c.name.as_str()), Some("C"), "existing class reused");
}

#[test]
fn test_failed_merge_leaves_registry_untouched() {
  let mut schemas = Schemas::default();
  let a = build("A", json!({ "type": "object", "properties": { "x": { "type": "string" } } }), &mut schemas, "");
  let b = build("B", json!({ "type": "object", "properties": { "x": { "type": "integer" } } }), &mut schemas, "");
  let before = schemas.models().count();

  let err = merge_properties(&model_named("pet", &a), &model_named("pet", &b), &mut schemas).unwrap_err();
  assert!(err.detail.contains("Property x can't be merged"), "{}", err.detail);
  assert_eq!(schemas.models().count(), before);
}

#[test]
fn test_pending_reference_cannot_merge() {
  let mut schemas = Schemas::default();
  let int = build("n", json!({ "type": "integer" }), &mut schemas, "Owner");
  let pending = Property::Reference(ReferenceProperty {
    meta: PropertyMeta::new("n", false),
    target: ReferencePath::for_schema("Later"),
    parent_name: "Owner".to_string(),
  });

  let err = merge_properties(&int, &pending, &mut schemas).unwrap_err();
  assert!(err.detail.contains("has not been processed yet"), "{}", err.detail);
  assert!(err.data.is_some());
}
