use std::{
  collections::{BTreeMap, HashMap},
  sync::Arc,
};

use serde_json::json;
use tracing::debug;

use super::{
  ClassRef, Property, PropertyMeta, ReferenceProperty,
  union::{check_discriminators, flatten_members},
};
use crate::{
  resolver::{
    builder::{PropertyBuilder, Site},
    errors::PropertyError,
    schemas::Schemas,
  },
  utils::ReferencePath,
};

impl PropertyBuilder<'_> {
  /// Resolves a `$ref` against the registry.
  ///
  /// A built target is copied under this site's name; `description` (a sibling of the `$ref`)
  /// overrides the target's own. Unbuilt targets become pending references when allowed.
  pub(crate) fn build_reference(
    &self,
    ref_path: &str,
    description: Option<&str>,
    site: &Site,
    schemas: &mut Schemas,
  ) -> Result<Property, PropertyError> {
    let Some(target) = ReferencePath::parse(ref_path) else {
      return Err(PropertyError::new(format!(
        "Remote references such as {ref_path} are not supported yet."
      )));
    };

    let mut meta = PropertyMeta::new(&site.name, site.required);
    meta.description = description.map(str::to_string);

    if let Some(existing) = schemas.reference(&target)
      && !existing.has_pending()
    {
      return Ok(substitute(&meta, existing));
    }

    if self.allow_pending {
      return Ok(Property::Reference(ReferenceProperty {
        meta,
        target,
        parent_name: site.parent_name.clone(),
      }));
    }

    Err(unresolved(&target))
  }
}

pub(crate) fn unresolved(target: &ReferencePath) -> PropertyError {
  PropertyError::new(format!("Could not find reference in parsed models or enums: {target}"))
    .with_data(Some(json!({ "$ref": target.to_string() })))
}

/// Copies `target` into the slot described by `slot`.
pub(crate) fn substitute(slot: &PropertyMeta, target: &Property) -> Property {
  let mut property = target.clone();
  let meta = property.meta_mut();
  meta.renamed(&slot.name, slot.required);
  if slot.description.is_some() {
    meta.description.clone_from(&slot.description);
  }
  if slot.example.is_some() {
    meta.example.clone_from(&slot.example);
  }
  property
}

/// Replaces the pending slots of `property` whose targets are in `complete`.
fn resolve_in(property: &mut Property, complete: &HashMap<ReferencePath, Property>) -> usize {
  match property {
    Property::Reference(token) => {
      let Some(target) = complete.get(&token.target) else {
        return 0;
      };
      let replacement = substitute(&token.meta, target);
      *property = replacement;
      1
    }
    Property::List(list) => resolve_in(&mut list.inner, complete),
    Property::Union(union) => {
      let mut resolved: usize = union.inner.iter_mut().map(|inner| resolve_in(inner, complete)).sum();

      for target in union.discriminators.iter_mut().flat_map(|d| d.mapping.values_mut()) {
        if let ClassRef::Pending(reference) = target
          && let Some(Property::Model(model)) = complete.get(&*reference)
        {
          let replacement = ClassRef::Resolved {
            reference: reference.clone(),
            class: model.class.clone(),
          };
          *target = replacement;
          resolved += 1;
        }
      }

      if resolved > 0 {
        let members = std::mem::take(&mut union.inner);
        union.inner = flatten_members(members, &mut union.discriminators);
        union.meta.nullable = union.inner.iter().any(|p| matches!(p, Property::None(_)));
      }
      resolved
    }
    _ => 0,
  }
}

/// First discriminator conflict inside `property`.
///
/// Unions spliced in by the sweep bring their discriminators along, so the check made at build
/// time has to be repeated once everything is resolved.
fn first_conflict(property: &Property) -> Option<PropertyError> {
  match property {
    Property::List(list) => first_conflict(&list.inner),
    Property::Union(union) => check_discriminators(&union.discriminators)
      .err()
      .or_else(|| union.inner.iter().find_map(first_conflict)),
    _ => None,
  }
}

/// First unresolved target inside `property`.
fn first_pending(property: &Property) -> Option<ReferencePath> {
  match property {
    Property::Reference(token) => Some(token.target.clone()),
    Property::List(list) => first_pending(&list.inner),
    Property::Union(union) => union.inner.iter().find_map(first_pending).or_else(|| {
      union
        .discriminators
        .iter()
        .flat_map(|d| d.mapping.values())
        .find_map(|target| match target {
          ClassRef::Pending(reference) => Some(reference.clone()),
          ClassRef::Resolved { .. } => None,
        })
    }),
    _ => None,
  }
}

impl Schemas {
  /// Replaces every pending slot whose target has been built, repeating until nothing changes.
  ///
  /// A target that itself still holds pending slots is not copied. Returns the number of slots
  /// replaced.
  pub(crate) fn resolve_pending(&mut self) -> usize {
    let mut total = 0;
    loop {
      let complete: HashMap<ReferencePath, Property> = self
        .by_reference
        .iter()
        .filter(|(_, property)| !property.has_pending())
        .map(|(path, property)| (path.clone(), property.clone()))
        .collect();

      let mut resolved = 0;
      for property in self.by_reference.values_mut() {
        resolved += resolve_in(property, &complete);
      }
      for model in self.models.values_mut() {
        if !model.owned_properties().any(Property::has_pending) {
          continue;
        }
        let model = Arc::make_mut(model);
        for property in model.owned_properties_mut() {
          resolved += resolve_in(property, &complete);
        }
        model.normalize_partition();
      }

      if resolved == 0 {
        break;
      }
      total += resolved;
    }

    if total > 0 {
      debug!(resolved = total, "resolved pending references");
    }
    total
  }

  /// Resolves what it can, then reports every slot that is still pending or whose spliced
  /// discriminators conflict, and prunes the top-level schemas that own them.
  pub(crate) fn finalize_pending(&mut self) {
    self.resolve_pending();

    let mut failed: BTreeMap<ReferencePath, PropertyError> = BTreeMap::new();
    for (path, property) in &self.by_reference {
      if let Some(error) = self.unresolvable(property) {
        failed.insert(path.clone(), error);
      }
    }
    for (class, model) in &self.models {
      let Some(error) = model.owned_properties().find_map(|property| self.unresolvable(property)) else {
        continue;
      };
      for root in self.roots.get(class).into_iter().flatten() {
        failed.entry(root.clone()).or_insert_with(|| error.clone());
      }
    }

    let roots = failed.keys().cloned().collect();
    for (root, error) in failed {
      self
        .errors
        .push(error.with_header(format!("Unable to resolve schema {}", root.name())));
    }

    self.prune_roots(roots);
  }

  fn unresolvable(&self, property: &Property) -> Option<PropertyError> {
    let Some(missing) = first_pending(property) else {
      return first_conflict(property);
    };
    Some(match self.by_reference.get(&missing) {
      Some(target) if !target.has_pending() => PropertyError::new(format!(
        "Discriminator mapping target {missing} must be a model, found {}",
        target.kind()
      )),
      _ => unresolved(&missing),
    })
  }
}
