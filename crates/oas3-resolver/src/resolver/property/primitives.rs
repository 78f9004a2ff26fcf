use oas3::spec::ObjectSchema;

use super::{ConstProperty, Property, PropertyKind, ScalarProperty, StringProperty};
use crate::resolver::{
  builder::{PropertyBuilder, Site},
  errors::PropertyError,
  value::{self, Value},
};

impl PropertyBuilder<'_> {
  /// Builds a leaf property of `kind`, validating its default.
  pub(crate) fn build_scalar(
    &self,
    kind: PropertyKind,
    schema: &ObjectSchema,
    site: &Site,
  ) -> Result<Property, PropertyError> {
    let mut meta = Self::meta(site, schema);
    if kind == PropertyKind::None {
      meta.nullable = true;
    }

    let default = match schema.default.as_ref() {
      Some(raw) => value::convert(kind, raw).map_err(|e| PropertyError::invalid_default(&site.name, &e))?,
      None => None,
    };

    if kind == PropertyKind::String {
      return Ok(Property::String(StringProperty {
        meta,
        default,
        max_length: schema.max_length,
        pattern: schema.pattern.clone(),
      }));
    }

    Property::scalar(kind, ScalarProperty { meta, default })
      .ok_or_else(|| PropertyError::new(format!("{kind} is not a scalar property kind")))
  }

  /// Builds a property fixed to the schema's `const` literal.
  pub(crate) fn build_const(&self, schema: &ObjectSchema, site: &Site) -> Result<Property, PropertyError> {
    let Some(raw) = schema.const_value.as_ref() else {
      return Err(PropertyError::new(format!("Schema {} has no const value", site.name)));
    };

    let value = Value::from_literal(raw);
    if !value.is_scalar() {
      return Err(PropertyError::new(format!(
        "Const value of {} must be a scalar, found {raw}",
        site.name
      )));
    }

    let default = match schema.default.as_ref().map(Value::from_literal) {
      None | Some(Value::Null) => None,
      Some(default) if default == value => Some(default),
      Some(default) => {
        return Err(PropertyError::new(format!(
          "Invalid default value for property {}: {default} does not match const {value}",
          site.name
        )));
      }
    };

    let mut meta = Self::meta(site, schema);
    meta.nullable = value == Value::Null;

    Ok(Property::Const(ConstProperty { meta, value, default }))
  }
}
