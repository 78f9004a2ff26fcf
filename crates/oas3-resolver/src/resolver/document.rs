use oas3::spec::{ObjectOrReference, ObjectSchema, Parameter};

use super::errors::ResolveError;
use crate::utils::ReferencePath;

/// A parsed OpenAPI document plus the declaration order of its reusable components.
///
/// `oas3` keeps components in sorted maps; class-name suffixes and dedup messages depend on the
/// order schemas are visited in, so the order is read from the raw JSON when it is available.
#[derive(Debug, Clone)]
pub struct Document {
  spec: oas3::Spec,
  schema_order: Vec<String>,
  parameter_order: Vec<String>,
}

impl Document {
  /// Wraps an already parsed spec; components are visited alphabetically.
  pub fn from_spec(spec: oas3::Spec) -> Self {
    let (schema_order, parameter_order) = spec.components.as_ref().map_or_else(Default::default, |components| {
      (
        components.schemas.keys().cloned().collect(),
        components.parameters.keys().cloned().collect(),
      )
    });
    Self {
      spec,
      schema_order,
      parameter_order,
    }
  }

  pub fn from_json_value(value: serde_json::Value) -> Result<Self, ResolveError> {
    let keys = |pointer: &str| -> Vec<String> {
      value
        .pointer(pointer)
        .and_then(serde_json::Value::as_object)
        .map(|section| section.keys().cloned().collect())
        .unwrap_or_default()
    };
    let schema_order = keys("/components/schemas");
    let parameter_order = keys("/components/parameters");

    let spec = serde_json::from_value(value)?;
    Ok(Self {
      spec,
      schema_order,
      parameter_order,
    })
  }

  pub fn from_json_str(json: &str) -> Result<Self, ResolveError> {
    Self::from_json_value(serde_json::from_str(json)?)
  }

  pub fn spec(&self) -> &oas3::Spec {
    &self.spec
  }

  /// Top-level schemas in declaration order.
  pub fn schema_entries(&self) -> Vec<(ReferencePath, &ObjectOrReference<ObjectSchema>)> {
    let Some(components) = self.spec.components.as_ref() else {
      return vec![];
    };
    ordered(&self.schema_order, components.schemas.iter())
      .into_iter()
      .map(|(name, schema)| (ReferencePath::for_schema(name), schema))
      .collect()
  }

  /// Reusable parameters in declaration order.
  pub fn parameter_entries(&self) -> Vec<(ReferencePath, &ObjectOrReference<Parameter>)> {
    let Some(components) = self.spec.components.as_ref() else {
      return vec![];
    };
    ordered(&self.parameter_order, components.parameters.iter())
      .into_iter()
      .map(|(name, parameter)| (ReferencePath::for_parameter(name), parameter))
      .collect()
  }
}

/// Yields `entries` in `order`, followed by any entry `order` does not mention.
fn ordered<'a, T>(order: &[String], entries: impl Iterator<Item = (&'a String, &'a T)>) -> Vec<(&'a String, &'a T)> {
  let mut sorted: Vec<_> = entries.collect();
  sorted.sort_by_key(|(name, _)| order.iter().position(|o| o == *name).unwrap_or(usize::MAX));
  sorted
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_json_keeps_declaration_order() {
    let document = Document::from_json_value(json!({
      "openapi": "3.1.0",
      "info": { "title": "Order", "version": "1" },
      "paths": {},
      "components": {
        "schemas": { "b": { "type": "string" }, "a": { "type": "string" } },
        "parameters": {
          "z": { "name": "z", "in": "query", "schema": { "type": "string" } },
          "y": { "name": "y", "in": "query", "schema": { "type": "string" } }
        }
      }
    }))
    .unwrap();

    let schemas: Vec<_> = document.schema_entries().into_iter().map(|(p, _)| p.to_string()).collect();
    assert_eq!(schemas, vec!["#/components/schemas/b", "#/components/schemas/a"]);
    let parameters: Vec<_> = document
      .parameter_entries()
      .into_iter()
      .map(|(p, _)| p.name().to_string())
      .collect();
    assert_eq!(parameters, vec!["z", "y"]);
  }

  #[test]
  fn test_missing_components() {
    let document = Document::from_json_str(r#"{"openapi":"3.1.0","info":{"title":"t","version":"1"}}"#).unwrap();
    assert!(document.schema_entries().is_empty());
    assert!(document.parameter_entries().is_empty());
  }
}
