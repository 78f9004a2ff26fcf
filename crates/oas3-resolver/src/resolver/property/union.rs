use std::collections::BTreeMap;

use indexmap::IndexMap;
use oas3::spec::{ObjectOrReference, ObjectSchema, SchemaTypeSet};

use super::{ClassRef, Discriminator, Property, UnionProperty};
use crate::{
  resolver::{
    builder::{PropertyBuilder, Site},
    errors::PropertyError,
    schemas::Schemas,
  },
  utils::{ReferencePath, SchemaExt, reference_of},
};

impl PropertyBuilder<'_> {
  /// Builds an `anyOf`/`oneOf`/type-list schema into a flattened union.
  ///
  /// A union that flattens to a single member collapses into that member.
  pub(crate) fn build_union(
    &self,
    schema: &ObjectSchema,
    site: &Site,
    schemas: &mut Schemas,
  ) -> Result<Property, PropertyError> {
    let mut members = Vec::new();

    for (index, (keyword, position, member)) in schema.union_members().enumerate() {
      let member_site = site.sibling_child(
        format!("{}_type_{index}", site.name),
        site.required,
        &format!("{keyword}/{position}"),
      );
      members.push(self.build(member, &member_site, schemas)?);
    }

    if schema.has_type_list() {
      let offset = members.len();
      for (position, schema_type) in schema.type_list().into_iter().enumerate() {
        let single = ObjectSchema {
          schema_type: Some(SchemaTypeSet::Single(schema_type)),
          any_of: vec![],
          one_of: vec![],
          discriminator: None,
          default: None,
          description: None,
          ..schema.clone()
        };
        let member_site = site.sibling_child(
          format!("{}_type_{}", site.name, offset + position),
          site.required,
          &format!("type/{position}"),
        );
        members.push(self.build_schema(&single, &member_site, schemas)?);
      }
    }

    let mut discriminators = match &schema.discriminator {
      Some(discriminator) => vec![self.build_discriminator(schema, discriminator, schemas)?],
      None => vec![],
    };

    let inner = flatten_members(members, &mut discriminators);
    check_discriminators(&discriminators)?;

    let mut meta = Self::meta(site, schema);

    if let [single] = inner.as_slice()
      && discriminators.is_empty()
    {
      let mut property = single.clone();
      let collapsed = property.meta_mut();
      collapsed.renamed(&meta.name, meta.required);
      if meta.description.is_some() {
        collapsed.description = meta.description.take();
      }
      if let Some(raw) = schema.default.as_ref() {
        let default = property
          .convert_default(raw)
          .map_err(|e| PropertyError::invalid_default(&site.name, &e))?;
        property.set_default(default);
      }
      return Ok(property);
    }

    meta.nullable = inner.iter().any(|p| matches!(p, Property::None(_)));

    let default = match schema.default.as_ref() {
      Some(raw) if !raw.is_null() => Some(
        inner
          .iter()
          .find_map(|member| member.convert_default(raw).ok().flatten())
          .ok_or_else(|| {
            PropertyError::new(format!(
              "Invalid default value for property {}: {raw} does not match any member of the union",
              site.name
            ))
          })?,
      ),
      _ => None,
    };

    Ok(Property::Union(UnionProperty {
      meta,
      default,
      inner,
      discriminators,
    }))
  }

  /// Maps every tag of a `discriminator` to the model it selects.
  fn build_discriminator(
    &self,
    schema: &ObjectSchema,
    discriminator: &oas3::spec::Discriminator,
    schemas: &Schemas,
  ) -> Result<Discriminator, PropertyError> {
    let inline_member = schema.union_members().find(|(_, _, member)| match member {
      ObjectOrReference::Object(inline) => !inline.is_null(),
      ObjectOrReference::Ref { .. } => false,
    });
    if let Some((keyword, position, _)) = inline_member {
      return Err(PropertyError::new(format!(
        "Discriminated unions may only contain references to models, found an inline schema at {keyword}/{position}"
      )));
    }

    let explicit = discriminator.mapping.as_ref().filter(|mapping| !mapping.is_empty());
    let targets: Vec<(String, ReferencePath)> = match explicit {
      Some(mapping) => mapping
        .iter()
        .map(|(tag, target)| {
          ReferencePath::parse_mapping_target(target)
            .map(|path| (tag.clone(), path))
            .ok_or_else(|| PropertyError::new(format!("Invalid discriminator mapping target {target} for {tag}")))
        })
        .collect::<Result<_, _>>()?,
      None => schema
        .union_members()
        .filter_map(|(_, _, member)| reference_of(member))
        .map(|path| (path.name().to_string(), path))
        .collect(),
    };

    let mut mapping = IndexMap::new();
    for (tag, path) in targets {
      let target = match schemas.reference(&path) {
        Some(Property::Model(model)) => ClassRef::Resolved {
          reference: path,
          class: model.class.clone(),
        },
        Some(other) if !other.has_pending() => {
          return Err(PropertyError::new(format!(
            "Discriminator mapping target {path} must be a model, found {}",
            other.kind()
          )));
        }
        _ if self.allow_pending => ClassRef::Pending(path),
        _ => return Err(super::reference::unresolved(&path)),
      };
      mapping.insert(tag, target);
    }

    Ok(Discriminator {
      property_name: discriminator.property_name.clone(),
      mapping,
    })
  }
}

/// Splices nested unions into `members`, carrying their discriminators along.
pub(crate) fn flatten_members(members: Vec<Property>, discriminators: &mut Vec<Discriminator>) -> Vec<Property> {
  let mut flat = Vec::with_capacity(members.len());
  for member in members {
    match member {
      Property::Union(nested) => {
        discriminators.extend(nested.discriminators);
        flat.extend(nested.inner);
      }
      other => flat.push(other),
    }
  }
  flat
}

/// Rejects two discriminators that send the same tag of the same property to different schemas.
pub(crate) fn check_discriminators(discriminators: &[Discriminator]) -> Result<(), PropertyError> {
  let mut seen: BTreeMap<(&str, &str), &ReferencePath> = BTreeMap::new();
  for discriminator in discriminators {
    for (tag, target) in &discriminator.mapping {
      let key = (discriminator.property_name.as_str(), tag.as_str());
      match seen.get(&key) {
        Some(existing) if *existing != target.reference() => {
          return Err(PropertyError::new(format!(
            "Conflicting discriminator mappings for {}={tag}: {existing} and {}",
            discriminator.property_name,
            target.reference()
          )));
        }
        Some(_) => {}
        None => {
          seen.insert(key, target.reference());
        }
      }
    }
  }
  Ok(())
}
