use indexmap::IndexMap;
use oas3::spec::ObjectSchema;

use super::{EnumLiteral, EnumProperty, EnumValueKind, Property, ScalarProperty, UnionProperty};
use crate::{
  naming::to_enum_key,
  resolver::{
    builder::{PropertyBuilder, Site},
    errors::PropertyError,
    schemas::Schemas,
  },
};

/// Generates a member key for every literal, in order.
///
/// Integers become `VALUE_<n>` (`VALUE_NEGATIVE_<n>` below zero), strings starting with a letter
/// become their upper-cased identifier, and anything else falls back to `VALUE_<index>`.
///
/// # Errors
/// Two literals producing the same key abort the whole document.
pub fn values_from_list(values: &[EnumLiteral]) -> Result<IndexMap<String, EnumLiteral>, PropertyError> {
  let mut output = IndexMap::with_capacity(values.len());

  for (index, value) in values.iter().enumerate() {
    let key = match value {
      EnumLiteral::Int(i) if *i < 0 => format!("VALUE_NEGATIVE_{}", i.unsigned_abs()),
      EnumLiteral::Int(i) => format!("VALUE_{i}"),
      EnumLiteral::String(s) if s.chars().next().is_some_and(char::is_alphabetic) => {
        let key = to_enum_key(s);
        if key.is_empty() { format!("VALUE_{index}") } else { key }
      }
      EnumLiteral::String(_) => format!("VALUE_{index}"),
    };

    if output.contains_key(&key) {
      return Err(PropertyError::new(format!("Duplicate key {key} in enum")).fatal());
    }
    output.insert(key, value.clone());
  }

  Ok(output)
}

impl PropertyBuilder<'_> {
  /// Builds an `enum` schema, reusing an identical enum already registered under the same class.
  pub(crate) fn build_enum(
    &self,
    schema: &ObjectSchema,
    site: &Site,
    schemas: &mut Schemas,
  ) -> Result<Property, PropertyError> {
    let mut literals = Vec::with_capacity(schema.enum_values.len());
    let mut has_null = false;
    for raw in &schema.enum_values {
      if raw.is_null() {
        has_null = true;
        continue;
      }
      let literal = EnumLiteral::from_json(raw)
        .ok_or_else(|| PropertyError::new(format!("Unsupported enum value {raw} in {}", site.name)))?;
      literals.push(literal);
    }

    let mut meta = Self::meta(site, schema);

    if literals.is_empty() {
      meta.nullable = true;
      return Ok(Property::None(ScalarProperty { meta, default: None }));
    }

    let value_kind = literals[0].kind();
    if literals.iter().any(|literal| literal.kind() != value_kind) {
      return Err(PropertyError::new(format!(
        "Enum {} mixes string and integer values",
        site.name
      )));
    }

    let values = values_from_list(&literals)?;
    let class = self.enum_class(schema, site, &values, schemas)?;

    let mut definition = EnumProperty {
      meta: meta.clone(),
      default: None,
      class: class.clone(),
      values,
      value_kind,
    };
    if let Some(raw) = schema.default.as_ref()
      && !raw.is_null()
    {
      let default = Property::Enum(definition.clone())
        .convert_default(raw)
        .map_err(|e| PropertyError::invalid_default(&site.name, &e))?;
      definition.default = default;
    }

    schemas.add_enum(&site.location, definition.clone(), self.root.as_ref());

    if !has_null {
      return Ok(Property::Enum(definition));
    }

    let null_member = Property::None(ScalarProperty {
      meta: super::PropertyMeta {
        nullable: true,
        ..super::PropertyMeta::new(&format!("{}_type_1", site.name), site.required)
      },
      default: None,
    });
    let mut enum_member = definition;
    enum_member.meta.renamed(&format!("{}_type_0", site.name), site.required);

    meta.nullable = true;
    Ok(Property::Union(UnionProperty {
      default: enum_member.default.clone(),
      meta,
      inner: vec![Property::Enum(enum_member), null_member],
      discriminators: vec![],
    }))
  }

  /// Picks the class for an enum, deduplicating against registered enums.
  fn enum_class(
    &self,
    schema: &ObjectSchema,
    site: &Site,
    values: &IndexMap<String, EnumLiteral>,
    schemas: &Schemas,
  ) -> Result<crate::resolver::class::Class, PropertyError> {
    let title = schema.title.as_deref();
    let candidate = Schemas::candidate_class(self.config, &site.name, &site.parent_name, title);

    if let Some(existing) = schemas.enum_def(&candidate)
      && existing.values == *values
    {
      return Ok(candidate);
    }

    let class = schemas.class_for(self.config, &site.location, &site.name, &site.parent_name, title);
    if let Some(existing) = schemas.enum_def(&class) {
      if existing.values == *values {
        return Ok(class);
      }
      return Err(PropertyError::new(format!(
        "Found conflicting enums named {class} with incompatible values."
      )));
    }
    if schemas.model(&class).is_some() {
      return Err(PropertyError::new(format!(
        "Attempted to generate duplicate models with name {class}"
      )));
    }

    Ok(class)
  }
}
