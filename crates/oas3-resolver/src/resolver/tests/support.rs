use oas3::spec::{ObjectOrReference, ObjectSchema};
use serde_json::json;

use crate::resolver::{
  BuildOutcome, ModelDef, Property, PropertyError, ResolverConfig, Schemas, build_schemas, document::Document,
  property_from_data,
};

pub(super) fn schema(value: serde_json::Value) -> ObjectOrReference<ObjectSchema> {
  serde_json::from_value(value).expect("test schema should deserialize")
}

/// Builds a property for `name` with the default configuration and asserts it succeeds.
pub(super) fn build(name: &str, value: serde_json::Value, schemas: &mut Schemas, parent_name: &str) -> Property {
  try_build(name, value, schemas, parent_name).expect("property should build")
}

pub(super) fn try_build(
  name: &str,
  value: serde_json::Value,
  schemas: &mut Schemas,
  parent_name: &str,
) -> Result<Property, PropertyError> {
  property_from_data(name, true, &schema(value), schemas, parent_name, &ResolverConfig::default())
}

/// A minimal OpenAPI document holding `schemas` as its components (declaration order is kept).
pub(super) fn document(schemas: serde_json::Value) -> Document {
  document_with(json!({ "schemas": schemas }), json!({}))
}

pub(super) fn document_with(components: serde_json::Value, paths: serde_json::Value) -> Document {
  Document::from_json_value(json!({
    "openapi": "3.1.0",
    "info": { "title": "Test", "version": "1.0.0" },
    "paths": paths,
    "components": components,
  }))
  .expect("test document should parse")
}

pub(super) fn resolve(schemas: serde_json::Value) -> BuildOutcome {
  build_schemas(&document(schemas), Schemas::default(), &ResolverConfig::default()).expect("no fatal errors")
}

pub(super) fn model<'a>(schemas: &'a Schemas, name: &str) -> &'a ModelDef {
  schemas
    .models()
    .find(|model| model.class.name == name)
    .unwrap_or_else(|| panic!("model {name} should be registered"))
}

pub(super) fn names<'a>(properties: impl IntoIterator<Item = &'a Property>) -> Vec<&'a str> {
  properties.into_iter().map(Property::name).collect()
}

pub(super) fn reference(schemas: &Schemas, name: &str) -> Property {
  schemas
    .reference(&crate::utils::ReferencePath::for_schema(name))
    .cloned()
    .unwrap_or_else(|| panic!("schema {name} should be resolved"))
}

/// `U` splices `V` and `W`, which send the same tag to different models.
pub(super) fn conflicting_discriminators() -> [(&'static str, serde_json::Value); 3] {
  let tagged = |target: &str| {
    json!({
      "oneOf": [{ "$ref": format!("#/components/schemas/{target}") }],
      "discriminator": { "propertyName": "petType", "mapping": { "a": format!("#/components/schemas/{target}") } }
    })
  };
  [
    ("V", tagged("Cat")),
    ("W", tagged("Dog")),
    (
      "U",
      json!({ "oneOf": [{ "$ref": "#/components/schemas/V" }, { "$ref": "#/components/schemas/W" }] }),
    ),
  ]
}
