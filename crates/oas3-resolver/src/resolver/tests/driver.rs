use serde_json::json;

use super::support::{conflicting_discriminators, document, model, reference, resolve};
use crate::{
  resolver::{Property, PropertyKind, ResolverConfig, Schemas, build_schemas},
  utils::ReferencePath,
};

fn object_with_ref(property: &str, target: &str) -> serde_json::Value {
  json!({
    "type": "object",
    "properties": { property: { "$ref": format!("#/components/schemas/{target}") } }
  })
}

#[test]
fn test_forward_reference_cycle_converges() {
  let outcome = resolve(json!({
    "A": object_with_ref("b", "B"),
    "B": object_with_ref("c", "C"),
    "C": object_with_ref("a", "A"),
  }));
  let schemas = &outcome.schemas;

  assert!(schemas.errors().is_empty(), "{:?}", schemas.errors());
  assert!(outcome.passes <= 3, "took {} passes", outcome.passes);
  assert!(schemas.references().all(|(_, property)| !property.has_pending()));
  assert!(
    schemas
      .models()
      .flat_map(|model| model.owned_properties())
      .all(|property| !property.has_pending())
  );

  let b = model(schemas, "A").property("b").expect("A.b");
  assert_eq!(b.class().map(|c| c.name.as_str()), Some("B"));
  assert_eq!(schemas.cycles().len(), 1);
  assert_eq!(schemas.cycles()[0].len(), 3);
}

#[test]
fn test_missing_reference_prunes_dependents() {
  let outcome = resolve(json!({
    "X": object_with_ref("m", "Missing"),
    "Y": object_with_ref("x", "X"),
    "Z": { "type": "object", "properties": { "ok": { "type": "string" } } },
  }));
  let schemas = &outcome.schemas;

  assert!(schemas.reference(&ReferencePath::for_schema("X")).is_none());
  assert!(schemas.reference(&ReferencePath::for_schema("Y")).is_none());
  assert!(schemas.reference(&ReferencePath::for_schema("Z")).is_some());
  assert_eq!(schemas.models().map(|m| m.class.name.as_str()).collect::<Vec<_>>(), vec!["Z"]);

  let details: Vec<_> = schemas.errors().iter().map(|e| e.detail.as_str()).collect();
  assert_eq!(details.len(), 2, "{details:?}");
  assert!(details[0].contains("Could not find reference in parsed models or enums: #/components/schemas/Missing"));
  assert!(details[1].contains("depends on X"));
  assert_eq!(
    schemas.errors()[1].header.as_deref(),
    Some("Unable to resolve schema Y")
  );
}

#[test]
fn test_reference_schemas_resolve_in_passes() {
  let outcome = resolve(json!({
    "Outer": { "$ref": "#/components/schemas/Inner" },
    "Inner": { "$ref": "#/components/schemas/Pet", "description": "A pet alias" },
    "Pet": { "type": "object", "properties": { "name": { "type": "string" } } },
    "Ghost": { "$ref": "#/components/schemas/Nowhere" },
    "Remote": { "$ref": "other.json#/components/schemas/Pet" },
  }));
  let schemas = &outcome.schemas;

  assert_eq!(outcome.passes, 1);
  assert_eq!(outcome.reference_passes, 3, "the last pass finds nothing left to resolve");

  let inner = reference(schemas, "Inner");
  assert_eq!(inner.name(), "Inner");
  assert_eq!(inner.class().map(|c| c.name.as_str()), Some("Pet"));
  assert_eq!(inner.meta().description.as_deref(), Some("A pet alias"));
  let outer = reference(schemas, "Outer");
  assert_eq!(outer.class().map(|c| c.name.as_str()), Some("Pet"));

  let headers: Vec<_> = schemas.errors().iter().filter_map(|e| e.header.as_deref()).collect();
  assert_eq!(headers, vec!["Unable to parse schema Remote", "Unable to parse schema Ghost"]);
  assert!(schemas.errors()[0].detail.contains("Remote references"));
}

#[test]
fn test_only_last_pass_errors_are_kept() {
  let outcome = resolve(json!({
    "Child": { "allOf": [{ "$ref": "#/components/schemas/Parent" }] , "properties": { "a": { "type": "string" } } },
    "Parent": { "type": "object", "properties": { "b": { "type": "string" } } },
  }));
  assert!(outcome.schemas.errors().is_empty(), "{:?}", outcome.schemas.errors());
  assert_eq!(model(&outcome.schemas, "Child").properties().count(), 2);
}

#[test]
fn test_existing_registry_is_extended() {
  let config = ResolverConfig::default();
  let first = build_schemas(
    &document(json!({ "Base": { "type": "object", "properties": { "id": { "type": "integer" } } } })),
    Schemas::default(),
    &config,
  )
  .expect("first document");

  let second = build_schemas(
    &document(json!({ "Other": { "type": "string", "enum": ["on", "off"] } })),
    first.schemas,
    &config,
  )
  .expect("second document");

  let schemas = second.schemas;
  assert_eq!(schemas.models().count(), 1);
  assert_eq!(schemas.enums().count(), 1);
  let other = reference(&schemas, "Other");
  assert_eq!(other.kind(), PropertyKind::Enum);
  assert!(matches!(reference(&schemas, "Base"), Property::Model(_)));
}

#[test]
fn test_discriminator_conflict_found_after_forward_references() {
  let [v, w, u] = conflicting_discriminators();
  let mut components = serde_json::Map::new();
  for (name, schema) in [u, v, w] {
    components.insert(name.to_string(), schema);
  }
  for name in ["Cat", "Dog"] {
    components.insert(
      name.to_string(),
      json!({ "type": "object", "properties": { "petType": { "type": "string" } } }),
    );
  }
  let outcome = resolve(serde_json::Value::Object(components));
  let schemas = &outcome.schemas;

  assert!(schemas.reference(&ReferencePath::for_schema("U")).is_none());
  assert!(schemas.reference(&ReferencePath::for_schema("V")).is_some());
  assert!(schemas.reference(&ReferencePath::for_schema("W")).is_some());

  let errors = schemas.errors();
  assert_eq!(errors.len(), 1, "{errors:?}");
  assert!(
    errors[0]
      .detail
      .contains("Conflicting discriminator mappings for petType=a: #/components/schemas/Cat and #/components/schemas/Dog"),
    "{}",
    errors[0].detail
  );
  assert_eq!(errors[0].header.as_deref(), Some("Unable to resolve schema U"));
}
