use std::{collections::BTreeSet, sync::Arc};

use indexmap::IndexMap;
use oas3::spec::{ObjectOrReference, ObjectSchema, Schema};
use serde_json::json;

use super::{ModelProperty, Property};
use crate::{
  resolver::{
    builder::{PropertyBuilder, Site},
    class::Class,
    errors::PropertyError,
    merge::{MergeScope, merge_properties_scoped},
    schemas::{AdditionalProperties, ModelDef, Schemas},
  },
  utils::ReferencePath,
};

/// Properties collected from a model node and its `allOf` members.
#[derive(Debug, Default)]
struct ModelParts {
  properties: IndexMap<String, Property>,
  required: BTreeSet<String>,
  additional: Option<AdditionalProperties>,
}

impl PropertyBuilder<'_> {
  /// Builds an object schema into a model registered under its class.
  pub(crate) fn build_model(
    &self,
    schema: &ObjectSchema,
    site: &Site,
    schemas: &mut Schemas,
  ) -> Result<Property, PropertyError> {
    let class = schemas.class_for(
      self.config,
      &site.location,
      &site.name,
      &site.parent_name,
      schema.title.as_deref(),
    );
    if schemas.enum_def(&class).is_some() {
      return Err(duplicate(&class));
    }

    let mut parts = ModelParts::default();
    self.collect(schema, site, &class, schemas, &mut parts)?;

    let mut required_properties = Vec::new();
    let mut optional_properties = Vec::new();
    for (name, mut property) in parts.properties {
      let required = property.is_required() || parts.required.contains(&name);
      property.meta_mut().required = required;
      if required && !property.is_nullable() {
        required_properties.push(property);
      } else {
        optional_properties.push(property);
      }
    }

    let definition = ModelDef {
      class: class.clone(),
      location: site.location.clone(),
      description: schema.description.clone(),
      required_properties,
      optional_properties,
      additional_properties: parts.additional.unwrap_or(AdditionalProperties::Freeform),
    };

    match (schemas.model(&class), schemas.class_owner(&class)) {
      (Some(existing), Some(owner)) if owner != site.location => {
        if !existing.same_shape(&definition) {
          return Err(duplicate(&class));
        }
        schemas.register_class(&site.location, &class, self.root.as_ref());
      }
      _ => schemas.add_model(definition, self.root.as_ref()),
    }

    Ok(Property::Model(ModelProperty {
      meta: Self::meta(site, schema),
      class,
    }))
  }

  /// Gathers the properties of `schema` into `parts`: `allOf` members first, then its own.
  fn collect(
    &self,
    schema: &ObjectSchema,
    site: &Site,
    class: &Class,
    schemas: &mut Schemas,
    parts: &mut ModelParts,
  ) -> Result<(), PropertyError> {
    for (index, member) in schema.all_of.iter().enumerate() {
      match member {
        ObjectOrReference::Ref { ref_path, .. } => {
          let definition = referenced_model(ref_path, schemas)?;
          for property in definition.properties() {
            if property.is_required() {
              parts.required.insert(property.name().to_string());
            }
            self.add_property(property.clone(), site, class, schemas, parts)?;
          }
          if parts.additional.is_none()
            && !matches!(definition.additional_properties, AdditionalProperties::Freeform)
          {
            parts.additional = Some(definition.additional_properties.clone());
          }
        }
        ObjectOrReference::Object(inline) => {
          let member_site = site.sibling_child(site.name.clone(), site.required, &format!("allOf/{index}"));
          self.collect(inline, &member_site, class, schemas, parts)?;
        }
      }
    }

    for (name, data) in &schema.properties {
      let required = schema.required.contains(name);
      let property_site = site.owned_child(name, required, &class.name, &format!("properties/{name}"));
      let property = self.build(data, &property_site, schemas)?;
      if required {
        parts.required.insert(name.clone());
      }
      self.add_property(property, site, class, schemas, parts)?;
    }

    if let Some(additional) = self.additional_properties(schema, site, class, schemas)? {
      parts.additional = Some(additional);
    }

    Ok(())
  }

  /// Adds `property`, merging it with an earlier property of the same name.
  fn add_property(
    &self,
    property: Property,
    site: &Site,
    class: &Class,
    schemas: &mut Schemas,
    parts: &mut ModelParts,
  ) -> Result<(), PropertyError> {
    let name = property.name().to_string();
    let merged = match parts.properties.get(&name) {
      Some(existing) => {
        let scope = MergeScope {
          config: self.config,
          parent_name: &class.name,
          location: format!("{}/properties/{name}", site.location),
          root: self.root.as_ref(),
        };
        merge_properties_scoped(existing, &property, &scope, schemas)
          .map_err(|e| e.wrap(format!("Unable to merge property {name} of {class}")))?
      }
      None => property,
    };
    parts.properties.insert(name, merged);
    Ok(())
  }

  /// Reads `additionalProperties` of this node; `None` when the node does not declare it.
  fn additional_properties(
    &self,
    schema: &ObjectSchema,
    site: &Site,
    class: &Class,
    schemas: &mut Schemas,
  ) -> Result<Option<AdditionalProperties>, PropertyError> {
    let additional = match schema.additional_properties.as_ref() {
      None => return Ok(None),
      Some(Schema::Boolean(allowed)) if allowed.0 => AdditionalProperties::Freeform,
      Some(Schema::Boolean(_)) => AdditionalProperties::Disallowed,
      Some(Schema::Object(data)) => {
        let additional_site = site.owned_child("additional_property", true, &class.name, "additionalProperties");
        let property = self.build(data, &additional_site, schemas)?;
        AdditionalProperties::Typed(Box::new(property))
      }
    };
    Ok(Some(additional))
  }
}

/// Definition of the model an `allOf` member points at.
fn referenced_model(ref_path: &str, schemas: &Schemas) -> Result<Arc<ModelDef>, PropertyError> {
  let Some(path) = ReferencePath::parse(ref_path) else {
    return Err(PropertyError::new(format!(
      "Remote references such as {ref_path} are not supported yet."
    )));
  };

  match schemas.reference(&path) {
    Some(Property::Model(model)) => schemas
      .models
      .get(&model.class)
      .cloned()
      .ok_or_else(|| not_processed(&path)),
    Some(other) if !other.has_pending() => Err(PropertyError::new(format!(
      "Unable to process allOf reference {path}: {} is not a model",
      other.kind()
    ))),
    _ => Err(not_processed(&path)),
  }
}

fn not_processed(path: &ReferencePath) -> PropertyError {
  PropertyError::new(format!("Reference {path} in allOf has not been processed yet"))
    .with_data(Some(json!({ "$ref": path.to_string() })))
}

fn duplicate(class: &Class) -> PropertyError {
  PropertyError::new(format!("Attempted to generate duplicate models with name {class}"))
}
