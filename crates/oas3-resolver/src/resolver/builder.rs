use oas3::spec::{ObjectOrReference, ObjectSchema, SchemaType};

use super::{
  config::ResolverConfig,
  errors::PropertyError,
  property::{Property, PropertyKind, PropertyMeta},
  schemas::Schemas,
};
use crate::utils::{ReferencePath, SchemaExt};

/// Where a schema node sits: its local name, whether its parent requires it, the class name of
/// the enclosing schema and its location in the document.
#[derive(Debug, Clone)]
pub(crate) struct Site {
  pub(crate) name: String,
  pub(crate) required: bool,
  pub(crate) parent_name: String,
  pub(crate) location: String,
}

impl Site {
  pub(crate) fn top_level(path: &ReferencePath) -> Self {
    Self {
      name: path.name().to_string(),
      required: true,
      parent_name: String::new(),
      location: path.to_string(),
    }
  }

  pub(crate) fn new(name: &str, required: bool, parent_name: &str, location: String) -> Self {
    Self {
      name: name.to_string(),
      required,
      parent_name: parent_name.to_string(),
      location,
    }
  }

  pub(crate) fn is_top_level(&self) -> bool {
    self.parent_name.is_empty()
  }

  /// A child node at `location_suffix` below this one, keeping this node's parent.
  pub(crate) fn sibling_child(&self, name: String, required: bool, location_suffix: &str) -> Self {
    Self {
      name,
      required,
      parent_name: self.parent_name.clone(),
      location: format!("{}/{location_suffix}", self.location),
    }
  }

  /// A child node owned by the class `parent_name`.
  pub(crate) fn owned_child(&self, name: &str, required: bool, parent_name: &str, location_suffix: &str) -> Self {
    Self {
      name: name.to_string(),
      required,
      parent_name: parent_name.to_string(),
      location: format!("{}/{location_suffix}", self.location),
    }
  }
}

/// Turns schema nodes into [`Property`] values against a [`Schemas`] registry.
///
/// `root` names the top-level schema being built so every class created on the way can be pruned
/// with it. With `allow_pending`, a `$ref` to a schema that has not been built yet becomes a
/// pending [`Property::Reference`] instead of an error.
#[derive(Debug, Clone)]
pub(crate) struct PropertyBuilder<'a> {
  pub(crate) config: &'a ResolverConfig,
  pub(crate) root: Option<ReferencePath>,
  pub(crate) allow_pending: bool,
}

impl<'a> PropertyBuilder<'a> {
  pub(crate) fn new(config: &'a ResolverConfig) -> Self {
    Self {
      config,
      root: None,
      allow_pending: false,
    }
  }

  #[must_use]
  pub(crate) fn rooted(mut self, root: ReferencePath) -> Self {
    self.root = Some(root);
    self
  }

  #[must_use]
  pub(crate) fn allowing_pending(mut self) -> Self {
    self.allow_pending = true;
    self
  }

  pub(crate) fn build(
    &self,
    data: &ObjectOrReference<ObjectSchema>,
    site: &Site,
    schemas: &mut Schemas,
  ) -> Result<Property, PropertyError> {
    match data {
      ObjectOrReference::Ref {
        ref_path, description, ..
      } => self.build_reference(ref_path, description.as_deref(), site, schemas),
      ObjectOrReference::Object(schema) => self.build_schema(schema, site, schemas),
    }
  }

  pub(crate) fn build_schema(
    &self,
    schema: &ObjectSchema,
    site: &Site,
    schemas: &mut Schemas,
  ) -> Result<Property, PropertyError> {
    if let Some(ObjectOrReference::Ref { ref_path, .. }) = schema.single_all_of_ref() {
      return self.build_reference(ref_path, schema.description.as_deref(), site, schemas);
    }

    if !schema.enum_values.is_empty() {
      return self.build_enum(schema, site, schemas);
    }

    if schema.const_value.is_some() {
      return self.build_const(schema, site);
    }

    if schema.has_union() || schema.has_type_list() {
      return self.build_union(schema, site, schemas);
    }

    let kind = match schema.single_type() {
      Some(SchemaType::String) => string_kind(schema.format.as_deref()),
      Some(SchemaType::Number) => PropertyKind::Float,
      Some(SchemaType::Integer) => PropertyKind::Int,
      Some(SchemaType::Boolean) => PropertyKind::Boolean,
      Some(SchemaType::Null) => PropertyKind::None,
      Some(SchemaType::Array) => return self.build_list(schema, site, schemas),
      Some(SchemaType::Object) => return self.build_model(schema, site, schemas),
      None if schema.is_model_like() => return self.build_model(schema, site, schemas),
      None if schema.items.is_some() => return self.build_list(schema, site, schemas),
      None => PropertyKind::Any,
    };

    self.build_scalar(kind, schema, site)
  }

  /// Shared attributes for the property built at `site`.
  pub(crate) fn meta(site: &Site, schema: &ObjectSchema) -> PropertyMeta {
    PropertyMeta {
      description: schema.description.clone(),
      example: schema.example.clone(),
      ..PropertyMeta::new(&site.name, site.required)
    }
  }
}

/// Property kind for a `type: string` schema with the given `format`.
pub(crate) fn string_kind(format: Option<&str>) -> PropertyKind {
  match format {
    Some("date") => PropertyKind::Date,
    Some("date-time") => PropertyKind::DateTime,
    Some("binary") => PropertyKind::File,
    Some("uuid") => PropertyKind::Uuid,
    _ => PropertyKind::String,
  }
}

/// JSON of a schema node, attached to errors about it.
pub(crate) fn schema_data(data: &ObjectOrReference<ObjectSchema>) -> Option<serde_json::Value> {
  match data {
    ObjectOrReference::Ref { ref_path, .. } => Some(serde_json::json!({ "$ref": ref_path })),
    ObjectOrReference::Object(schema) => serde_json::to_value(schema).ok(),
  }
}

/// Builds the property for one schema node.
///
/// `parent_name` is the class name of the enclosing schema, or empty for a top-level schema.
/// On error `schemas` is left exactly as it was.
pub fn property_from_data(
  name: &str,
  required: bool,
  data: &ObjectOrReference<ObjectSchema>,
  schemas: &mut Schemas,
  parent_name: &str,
  config: &ResolverConfig,
) -> Result<Property, PropertyError> {
  let (site, builder) = if parent_name.is_empty() {
    let path = ReferencePath::for_schema(name);
    let site = Site {
      required,
      ..Site::top_level(&path)
    };
    (site, PropertyBuilder::new(config).rooted(path))
  } else {
    let location = format!("#/inline/{parent_name}/properties/{name}");
    (Site::new(name, required, parent_name, location), PropertyBuilder::new(config))
  };

  let snapshot = schemas.clone();
  let result = builder.build(data, &site, schemas);
  if result.is_err() {
    *schemas = snapshot;
  }
  result
}
