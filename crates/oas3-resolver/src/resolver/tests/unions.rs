use serde_json::json;

use super::support::{build, conflicting_discriminators, reference, resolve, try_build};
use crate::resolver::{ClassRef, Property, PropertyKind, Schemas, Value};

fn pet_models() -> serde_json::Value {
  json!({
    "Cat": {
      "type": "object",
      "required": ["petType"],
      "properties": { "petType": { "type": "string" }, "lives": { "type": "integer" } }
    },
    "Dog": {
      "type": "object",
      "required": ["petType"],
      "properties": { "petType": { "type": "string" }, "bark": { "type": "boolean" } }
    },
  })
}

#[test]
fn test_nested_unions_flatten() {
  let outcome = resolve(json!({
    "X": { "type": "object", "properties": { "x": { "type": "string" } } },
    "Y": { "type": "object", "properties": { "y": { "type": "string" } } },
    "Z": { "type": "object", "properties": { "z": { "type": "string" } } },
    "U": {
      "oneOf": [
        { "oneOf": [{ "$ref": "#/components/schemas/X" }, { "$ref": "#/components/schemas/Y" }] },
        { "$ref": "#/components/schemas/Z" }
      ]
    },
  }));

  let Property::Union(union) = reference(&outcome.schemas, "U") else {
    panic!("U should be a union");
  };
  let classes: Vec<_> = union.inner.iter().filter_map(|p| p.class()).map(|c| c.name.as_str()).collect();
  assert_eq!(classes, vec!["X", "Y", "Z"]);
  assert!(!union.meta.nullable);
}

#[test]
fn test_type_list_becomes_nullable_union() {
  let mut schemas = Schemas::default();
  let property = build("nickname", json!({ "type": ["string", "null"] }), &mut schemas, "Pet");

  let Property::Union(union) = &property else {
    panic!("expected a union, got {property:?}");
  };
  assert!(union.meta.nullable);
  assert_eq!(union.inner[0].kind(), PropertyKind::String);
  assert_eq!(union.inner[0].name(), "nickname_type_0");
  assert_eq!(union.inner[1].kind(), PropertyKind::None);
  assert_eq!(property.type_string(), "string | null");
}

#[test]
fn test_single_member_collapses() {
  let mut schemas = Schemas::default();
  let property = build(
    "age",
    json!({ "anyOf": [{ "type": "integer", "description": "inner" }], "description": "outer", "default": 3 }),
    &mut schemas,
    "Pet",
  );

  assert_eq!(property.kind(), PropertyKind::Int);
  assert_eq!(property.name(), "age");
  assert_eq!(property.meta().description.as_deref(), Some("outer"));
  assert_eq!(property.default(), Some(&Value::Int(3)));
}

#[test]
fn test_union_default_uses_first_matching_member() {
  let mut schemas = Schemas::default();
  let property = build(
    "id",
    json!({ "anyOf": [{ "type": "integer" }, { "type": "string" }], "default": "abc" }),
    &mut schemas,
    "Pet",
  );
  assert_eq!(property.default(), Some(&Value::String("abc".to_string())));

  let err = try_build(
    "id",
    json!({ "anyOf": [{ "type": "integer" }, { "type": "boolean" }], "default": "abc" }),
    &mut schemas,
    "Pet",
  )
  .unwrap_err();
  assert!(err.detail.contains("does not match any member of the union"), "{}", err.detail);
}

#[test]
fn test_union_default_skips_list_and_model_members() {
  let mut schemas = Schemas::default();
  let property = build(
    "limit",
    json!({ "anyOf": [{ "type": "array", "items": { "type": "string" } }, { "type": "integer" }], "default": 5 }),
    &mut schemas,
    "Query",
  );
  assert_eq!(property.default(), Some(&Value::Int(5)));

  let err = try_build(
    "limit",
    json!({ "anyOf": [{ "type": "array", "items": { "type": "string" } }, { "type": "integer" }], "default": "abc" }),
    &mut schemas,
    "Query",
  )
  .unwrap_err();
  assert!(err.detail.contains("does not match any member of the union"), "{}", err.detail);

  let property = build(
    "flag",
    json!({
      "anyOf": [{ "type": "object", "properties": { "on": { "type": "boolean" } } }, { "type": "boolean" }],
      "default": true
    }),
    &mut schemas,
    "Query",
  );
  assert_eq!(property.default(), Some(&Value::Bool(true)));
}

#[test]
fn test_model_rejects_default() {
  let mut schemas = Schemas::default();
  let err = try_build(
    "settings",
    json!({ "anyOf": [{ "type": "object", "properties": { "on": { "type": "boolean" } } }], "default": { "on": true } }),
    &mut schemas,
    "Query",
  )
  .unwrap_err();
  assert!(err.detail.contains("Invalid default value for property settings"), "{}", err.detail);
}

#[test]
fn test_discriminator_maps_tags_to_models() {
  let mut components = pet_models();
  components["Pet"] = json!({
    "oneOf": [{ "$ref": "#/components/schemas/Cat" }, { "$ref": "#/components/schemas/Dog" }],
    "discriminator": {
      "propertyName": "petType",
      "mapping": { "cat": "#/components/schemas/Cat", "dog": "Dog" }
    }
  });
  let outcome = resolve(components);

  let Property::Union(union) = reference(&outcome.schemas, "Pet") else {
    panic!("Pet should be a union");
  };
  let [discriminator] = union.discriminators.as_slice() else {
    panic!("expected one discriminator");
  };
  assert_eq!(discriminator.property_name, "petType");
  let targets: Vec<_> = discriminator
    .mapping
    .iter()
    .map(|(tag, target)| (tag.as_str(), target.class().map(|c| c.name.clone())))
    .collect();
  assert_eq!(
    targets,
    vec![("cat", Some("Cat".to_string())), ("dog", Some("Dog".to_string()))]
  );
}

#[test]
fn test_discriminator_before_its_models_resolves() {
  let mut components = serde_json::Map::new();
  components.insert(
    "Pet".to_string(),
    json!({
      "oneOf": [{ "$ref": "#/components/schemas/Cat" }, { "$ref": "#/components/schemas/Dog" }],
      "discriminator": { "propertyName": "petType" }
    }),
  );
  if let serde_json::Value::Object(models) = pet_models() {
    components.extend(models);
  }
  let outcome = resolve(serde_json::Value::Object(components));

  assert!(outcome.schemas.errors().is_empty(), "{:?}", outcome.schemas.errors());
  let pet = reference(&outcome.schemas, "Pet");
  assert!(!pet.has_pending());
  let Property::Union(union) = pet else {
    panic!("Pet should be a union");
  };
  assert!(
    union.discriminators[0]
      .mapping
      .values()
      .all(|target| matches!(target, ClassRef::Resolved { .. }))
  );
  assert_eq!(union.discriminators[0].mapping.keys().collect::<Vec<_>>(), vec!["Cat", "Dog"]);
}

#[test]
fn test_discriminator_rejects_inline_members() {
  let mut components = pet_models();
  components["Pet"] = json!({
    "oneOf": [{ "$ref": "#/components/schemas/Cat" }, { "type": "object", "properties": {} }],
    "discriminator": { "propertyName": "petType" }
  });
  let outcome = resolve(components);

  let errors = outcome.schemas.errors();
  assert_eq!(errors.len(), 1);
  assert!(errors[0].detail.contains("may only contain references to models"));
  assert!(outcome.schemas.reference(&crate::utils::ReferencePath::for_schema("Pet")).is_none());
}

#[test]
fn test_discriminator_target_must_be_a_model() {
  let mut components = pet_models();
  components["Name"] = json!({ "type": "string" });
  components["Pet"] = json!({
    "oneOf": [{ "$ref": "#/components/schemas/Cat" }],
    "discriminator": { "propertyName": "petType", "mapping": { "name": "#/components/schemas/Name" } }
  });
  let outcome = resolve(components);

  let errors = outcome.schemas.errors();
  assert_eq!(errors.len(), 1);
  assert!(errors[0].detail.contains("must be a model, found string"), "{}", errors[0].detail);
}

#[test]
fn test_flattened_discriminators_conflict() {
  let mut components = pet_models();
  for (name, schema) in conflicting_discriminators() {
    components[name] = schema;
  }
  let outcome = resolve(components);
  let schemas = &outcome.schemas;

  assert!(schemas.reference(&crate::utils::ReferencePath::for_schema("U")).is_none());
  assert!(schemas.reference(&crate::utils::ReferencePath::for_schema("V")).is_some());
  assert!(schemas.reference(&crate::utils::ReferencePath::for_schema("W")).is_some());

  let errors = schemas.errors();
  assert_eq!(errors.len(), 1, "{errors:?}");
  assert!(
    errors[0]
      .detail
      .contains("Conflicting discriminator mappings for petType=a: #/components/schemas/Cat and #/components/schemas/Dog"),
    "{}",
    errors[0].detail
  );
  assert_eq!(errors[0].header.as_deref(), Some("Unable to parse schema U"));
}
