//! Reconciles two definitions of the same property, as produced by `allOf` compositions.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_json::json;

use super::{
  class::Class,
  config::ResolverConfig,
  errors::PropertyError,
  property::{EnumLiteral, EnumProperty, EnumValueKind, ModelProperty, Property, PropertyKind, reference::substitute},
  schemas::{AdditionalProperties, ModelDef, Schemas},
  value::{Value, ValueError},
};
use crate::{
  naming::{ensure_unique, to_class_name},
  utils::ReferencePath,
};

/// Where a merge happens: new model classes are parented under `parent_name` at `location`.
#[derive(Debug, Clone)]
pub(crate) struct MergeScope<'a> {
  pub(crate) config: &'a ResolverConfig,
  pub(crate) parent_name: &'a str,
  pub(crate) location: String,
  pub(crate) root: Option<&'a ReferencePath>,
}

impl MergeScope<'_> {
  fn child<'b>(&'b self, parent_name: &'b str, suffix: &str) -> MergeScope<'b> {
    MergeScope {
      config: self.config,
      parent_name,
      location: format!("{}/{suffix}", self.location),
      root: self.root,
    }
  }
}

/// Merges two definitions of one property into a single compatible property.
///
/// Attributes of `p2` win over those of `p1` where both are set. Model merges that produce a new
/// shape register a synthesized model in `schemas`; on error `schemas` is left unchanged.
///
/// # Errors
/// When the two definitions cannot describe the same value.
pub fn merge_properties(p1: &Property, p2: &Property, schemas: &mut Schemas) -> Result<Property, PropertyError> {
  let config = ResolverConfig::default();
  let scope = MergeScope {
    config: &config,
    parent_name: "",
    location: format!("#/merged/{}", p1.name()),
    root: None,
  };

  let snapshot = schemas.clone();
  let result = merge_properties_scoped(p1, p2, &scope, schemas);
  if result.is_err() {
    *schemas = snapshot;
  }
  result
}

pub(crate) fn merge_properties_scoped(
  p1: &Property,
  p2: &Property,
  scope: &MergeScope<'_>,
  schemas: &mut Schemas,
) -> Result<Property, PropertyError> {
  let p1 = resolve_operand(p1, schemas);
  let p2 = resolve_operand(p2, schemas);

  if p1 == p2 {
    return Ok(p1);
  }

  let merged = match (&p1, &p2) {
    (Property::Reference(pending), _) | (_, Property::Reference(pending)) => {
      return Err(
        PropertyError::new(format!(
          "Property {} refers to {}, which has not been processed yet",
          p1.name(),
          pending.target
        ))
        .with_data(Some(json!({ "$ref": pending.target.to_string() }))),
      );
    }
    (Property::Any(_), other) | (other, Property::Any(_)) => other.clone(),
    (Property::Enum(e1), Property::Enum(e2)) => Property::Enum(narrower_enum(e1, e2)?),
    (Property::Enum(e), other) | (other, Property::Enum(e)) => {
      if !scalar_matches(e.value_kind, other.kind()) {
        return Err(incompatible(&p1, &p2));
      }
      Property::Enum(e.clone())
    }
    (Property::String(s1), Property::String(s2)) => {
      let mut merged = s1.clone();
      merged.max_length = s2.max_length.or(s1.max_length);
      merged.pattern = s2.pattern.clone().or_else(|| s1.pattern.clone());
      Property::String(merged)
    }
    (Property::Const(c1), Property::Const(c2)) if c1.value == c2.value => p1.clone(),
    (Property::Union(u1), Property::Union(u2)) if u1.inner == u2.inner && u1.discriminators == u2.discriminators => {
      p1.clone()
    }
    (Property::List(l1), Property::List(l2)) => {
      let inner = merge_properties_scoped(&l1.inner, &l2.inner, &scope.child(scope.parent_name, "items"), schemas)
        .map_err(|e| e.wrap(format!("invalid data in items of array {}", p1.name())))?;
      let mut merged = l1.clone();
      merged.inner = Box::new(inner);
      Property::List(merged)
    }
    (Property::Model(m1), Property::Model(m2)) => merge_models(m1, m2, scope, schemas)?,
    (Property::Int(_), Property::Float(_)) => p1.clone(),
    (Property::Float(_), Property::Int(_)) => p2.clone(),
    (Property::String(_), specific @ (Property::Date(_) | Property::DateTime(_) | Property::File(_)))
    | (specific @ (Property::Date(_) | Property::DateTime(_) | Property::File(_)), Property::String(_)) => {
      specific.clone()
    }
    (a, b) if a.kind() == b.kind() && is_plain_scalar(a.kind()) => p1.clone(),
    _ => return Err(incompatible(&p1, &p2)),
  };

  merge_common(merged, &p1, &p2)
}

/// Copies a pending operand's target in when it has been built since.
fn resolve_operand(property: &Property, schemas: &Schemas) -> Property {
  if let Property::Reference(pending) = property
    && let Some(target) = schemas.reference(&pending.target)
    && !target.has_pending()
  {
    return substitute(&pending.meta, target);
  }
  property.clone()
}

fn is_plain_scalar(kind: PropertyKind) -> bool {
  matches!(
    kind,
    PropertyKind::None
      | PropertyKind::Date
      | PropertyKind::DateTime
      | PropertyKind::File
      | PropertyKind::Uuid
      | PropertyKind::Float
      | PropertyKind::Int
      | PropertyKind::Boolean
  )
}

fn scalar_matches(value_kind: EnumValueKind, kind: PropertyKind) -> bool {
  matches!(
    (value_kind, kind),
    (EnumValueKind::String, PropertyKind::String) | (EnumValueKind::Int, PropertyKind::Int)
  )
}

fn incompatible(p1: &Property, p2: &Property) -> PropertyError {
  PropertyError::new(format!(
    "Property {} can't be merged: {} and {} are incompatible",
    p1.name(),
    p1.kind(),
    p2.kind()
  ))
}

/// The enum whose values are a subset of the other's.
fn narrower_enum(e1: &EnumProperty, e2: &EnumProperty) -> Result<EnumProperty, PropertyError> {
  let subset = |a: &EnumProperty, b: &EnumProperty| a.values.iter().all(|(key, value)| b.values.get(key) == Some(value));
  if subset(e1, e2) {
    Ok(e1.clone())
  } else if subset(e2, e1) {
    Ok(e2.clone())
  } else {
    Err(PropertyError::new(format!(
      "Property {} can't be merged: enums {} and {} have incompatible values",
      e1.meta.name, e1.class, e2.class
    )))
  }
}

/// Applies the shared attribute policy to `merged`: later description, example and default win,
/// and `required` is the OR of both sides.
fn merge_common(mut merged: Property, p1: &Property, p2: &Property) -> Result<Property, PropertyError> {
  let default = match (p2.default(), p1.default()) {
    (Some(value), _) => carry_default(&merged, p2, value),
    (None, Some(value)) => carry_default(&merged, p1, value),
    (None, None) => Ok(None),
  }
  .map_err(|e| PropertyError::invalid_default(p1.name(), &e))?;

  let meta = merged.meta_mut();
  meta.description = p2.meta().description.clone().or_else(|| p1.meta().description.clone());
  meta.example = p2.meta().example.clone().or_else(|| p1.meta().example.clone());
  meta.required = p1.is_required() || p2.is_required();
  merged.set_default(default);
  Ok(merged)
}

/// Re-validates a default taken from `source` for the merged property.
fn carry_default(merged: &Property, source: &Property, value: &Value) -> Result<Option<Value>, ValueError> {
  if merged.kind() == source.kind() && !matches!(merged, Property::Enum(_)) {
    return Ok(Some(value.clone()));
  }

  let raw = match (value, source) {
    (Value::EnumMember(key), Property::Enum(source_enum)) => {
      if let Property::Enum(target) = merged
        && target.values.contains_key(key)
      {
        return Ok(Some(value.clone()));
      }
      match source_enum.values.get(key) {
        Some(EnumLiteral::String(s)) => json!(s),
        Some(EnumLiteral::Int(i)) => json!(i),
        None => json!(key),
      }
    }
    _ => value_json(value),
  };
  merged.convert_default(&raw)
}

/// JSON spelling of a converted literal.
fn value_json(value: &Value) -> serde_json::Value {
  match value {
    Value::Null => serde_json::Value::Null,
    Value::Bool(b) => json!(b),
    Value::Int(i) => json!(i),
    Value::Float(x) => serde_json::Number::from_f64(*x).map_or(serde_json::Value::Null, serde_json::Value::Number),
    Value::String(s) | Value::EnumMember(s) => json!(s),
    Value::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
    Value::DateTime(dt) => json!(dt.to_rfc3339()),
    Value::Uuid(u) => json!(u.to_string()),
    Value::Json(raw) => raw.clone(),
  }
}

/// Merges two models property by property, reusing either class when the result matches it.
fn merge_models(
  m1: &ModelProperty,
  m2: &ModelProperty,
  scope: &MergeScope<'_>,
  schemas: &mut Schemas,
) -> Result<Property, PropertyError> {
  if m1.class == m2.class {
    return Ok(Property::Model(m1.clone()));
  }

  let (Some(d1), Some(d2)) = (schemas.models.get(&m1.class).cloned(), schemas.models.get(&m2.class).cloned()) else {
    return Err(PropertyError::new(format!(
      "Property {} can't be merged: model {} or {} has not been processed yet",
      m1.meta.name, m1.class, m2.class
    )));
  };

  let nested_parent = if scope.parent_name.is_empty() {
    to_class_name(&m1.meta.name)
  } else {
    format!("{}{}", to_class_name(scope.parent_name), to_class_name(&m1.meta.name))
  };
  let mut properties: IndexMap<String, Property> =
    d1.properties().map(|p| (p.name().to_string(), p.clone())).collect();
  for property in d2.properties() {
    let name = property.name().to_string();
    let merged = match properties.get(&name) {
      Some(existing) => {
        let child = scope.child(&nested_parent, &format!("properties/{name}"));
        merge_properties_scoped(existing, property, &child, schemas)?
      }
      None => property.clone(),
    };
    properties.insert(name, merged);
  }

  let additional_properties = match (&d1.additional_properties, &d2.additional_properties) {
    (a, AdditionalProperties::Freeform) => a.clone(),
    (AdditionalProperties::Freeform, b) => b.clone(),
    (a, b) if a == b => a.clone(),
    _ => {
      return Err(PropertyError::new(format!(
        "Property {} can't be merged: models {} and {} disagree on additional properties",
        m1.meta.name, m1.class, m2.class
      )));
    }
  };

  let matches = |definition: &ModelDef| {
    definition.properties().count() == properties.len()
      && definition.properties().all(|p| properties.get(p.name()) == Some(p))
      && definition.additional_properties == additional_properties
  };
  if matches(&d1) {
    return Ok(Property::Model(m1.clone()));
  }
  if matches(&d2) {
    return Ok(Property::Model(ModelProperty {
      meta: m1.meta.clone(),
      class: m2.class.clone(),
    }));
  }

  let class = synthesized_class(&m1.meta.name, scope, schemas);
  let (required_properties, optional_properties) = properties
    .into_values()
    .partition::<Vec<_>, _>(|p| p.is_required() && !p.is_nullable());
  schemas.add_model(
    ModelDef {
      class: class.clone(),
      location: scope.location.clone(),
      description: d2.description.clone().or_else(|| d1.description.clone()),
      required_properties,
      optional_properties,
      additional_properties,
    },
    scope.root,
  );

  Ok(Property::Model(ModelProperty {
    meta: m1.meta.clone(),
    class,
  }))
}

/// Class for a model manufactured by a merge, suffixed away from any other registered type.
fn synthesized_class(name: &str, scope: &MergeScope<'_>, schemas: &Schemas) -> Class {
  let class = schemas.class_for(scope.config, &scope.location, name, scope.parent_name, None);
  if schemas.class_owner(&class) == Some(scope.location.as_str()) {
    return class;
  }

  let used: BTreeSet<String> = schemas
    .models
    .keys()
    .chain(schemas.enums.keys())
    .map(|c| c.name.clone())
    .chain(schemas.class_locations.values().map(|c| c.name.clone()))
    .collect();
  let name = ensure_unique(&class.name, &used);
  if name == class.name { class } else { Class::new(name) }
}
