use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use indexmap::IndexMap;
use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};
use strum::Display;
use tracing::warn;

use super::{
  class::Class,
  config::ResolverConfig,
  errors::PropertyError,
  property::{EnumProperty, Property},
};
use crate::{
  naming::{ensure_unique, to_class_name},
  utils::ReferencePath,
};

#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
  Disallowed,
  Freeform,
  Typed(Box<Property>),
}

/// A resolved object schema, owned by the registry and referenced elsewhere by its [`Class`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDef {
  pub class: Class,
  /// Schema location the class was first derived from.
  pub location: String,
  pub description: Option<String>,
  pub required_properties: Vec<Property>,
  pub optional_properties: Vec<Property>,
  pub additional_properties: AdditionalProperties,
}

impl ModelDef {
  /// Declared properties, required first.
  pub fn properties(&self) -> impl Iterator<Item = &Property> {
    self.required_properties.iter().chain(&self.optional_properties)
  }

  /// Declared properties plus the typed additional property, if any.
  pub fn owned_properties(&self) -> impl Iterator<Item = &Property> {
    let additional = match &self.additional_properties {
      AdditionalProperties::Typed(property) => Some(property.as_ref()),
      AdditionalProperties::Disallowed | AdditionalProperties::Freeform => None,
    };
    self.properties().chain(additional)
  }

  pub(crate) fn owned_properties_mut(&mut self) -> impl Iterator<Item = &mut Property> {
    let additional = match &mut self.additional_properties {
      AdditionalProperties::Typed(property) => Some(property.as_mut()),
      AdditionalProperties::Disallowed | AdditionalProperties::Freeform => None,
    };
    self
      .required_properties
      .iter_mut()
      .chain(self.optional_properties.iter_mut())
      .chain(additional)
  }

  pub fn property(&self, name: &str) -> Option<&Property> {
    self.properties().find(|p| p.name() == name)
  }

  /// Two definitions of one class are interchangeable when their properties match.
  pub fn same_shape(&self, other: &Self) -> bool {
    self.required_properties == other.required_properties
      && self.optional_properties == other.optional_properties
      && self.additional_properties == other.additional_properties
  }

  /// Moves required properties that turned out nullable into the optional list.
  pub(crate) fn normalize_partition(&mut self) {
    if !self.required_properties.iter().any(Property::is_nullable) {
      return;
    }
    let (required, demoted): (Vec<_>, Vec<_>) = std::mem::take(&mut self.required_properties)
      .into_iter()
      .partition(|p| !p.is_nullable());
    self.required_properties = required;
    self.optional_properties.extend(demoted);
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ParameterLocation {
  Path,
  Query,
  Header,
  Cookie,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDef {
  pub name: String,
  pub location: ParameterLocation,
  pub required: bool,
  pub property: Property,
}

/// Registry of everything resolved for one document.
///
/// The registry is a plain value: builders take it by `&mut`, and the driver snapshots it with
/// `clone` before each attempt (model definitions are shared through `Arc`).
#[derive(Debug, Clone, Default)]
pub struct Schemas {
  pub(crate) models: IndexMap<Class, Arc<ModelDef>>,
  pub(crate) enums: IndexMap<Class, EnumProperty>,
  pub(crate) by_reference: IndexMap<ReferencePath, Property>,
  pub(crate) parameters: IndexMap<ReferencePath, ParameterDef>,
  /// Schema location to the class derived for it.
  pub(crate) class_locations: BTreeMap<String, Class>,
  /// Top-level schemas each class was created for.
  pub(crate) roots: BTreeMap<Class, BTreeSet<ReferencePath>>,
  pub(crate) errors: Vec<PropertyError>,
}

impl Schemas {
  pub fn models(&self) -> impl Iterator<Item = &ModelDef> {
    self.models.values().map(|model| &**model)
  }

  pub fn model(&self, class: &Class) -> Option<&ModelDef> {
    self.models.get(class).map(|model| &**model)
  }

  pub fn enums(&self) -> impl Iterator<Item = &EnumProperty> {
    self.enums.values()
  }

  pub fn enum_def(&self, class: &Class) -> Option<&EnumProperty> {
    self.enums.get(class)
  }

  /// Successfully built top-level schemas, keyed by their reference path.
  pub fn references(&self) -> impl Iterator<Item = (&ReferencePath, &Property)> {
    self.by_reference.iter()
  }

  pub fn reference(&self, path: &ReferencePath) -> Option<&Property> {
    self.by_reference.get(path)
  }

  pub fn parameters(&self) -> impl Iterator<Item = (&ReferencePath, &ParameterDef)> {
    self.parameters.iter()
  }

  pub fn parameter(&self, path: &ReferencePath) -> Option<&ParameterDef> {
    self.parameters.get(path)
  }

  pub fn errors(&self) -> &[PropertyError] {
    &self.errors
  }

  pub fn roots_of(&self, class: &Class) -> Option<&BTreeSet<ReferencePath>> {
    self.roots.get(class)
  }

  /// Class name a schema would get before collision handling.
  pub(crate) fn candidate_class(
    config: &ResolverConfig,
    local_name: &str,
    parent_name: &str,
    title: Option<&str>,
  ) -> Class {
    let base = title.unwrap_or(local_name);
    let name = if parent_name.is_empty() || (title.is_some() && !config.use_path_prefixes_for_title_model_names) {
      to_class_name(base)
    } else {
      format!("{}{}", to_class_name(parent_name), to_class_name(base))
    };

    match config.class_overrides.get(&name) {
      Some(replacement) => {
        let class_name = replacement.class_name.clone().unwrap_or(name);
        match &replacement.module_name {
          Some(module_name) => Class::with_module(class_name, module_name.clone()),
          None => Class::new(class_name),
        }
      }
      None => Class::new(name),
    }
  }

  /// Derives the class for the schema at `location`.
  ///
  /// A location that already owns a class gets it back. Nested candidates that collide with a
  /// class owned by another location get a numeric suffix; top-level candidates are returned as-is
  /// and their collisions are judged by the caller.
  pub fn class_for(
    &self,
    config: &ResolverConfig,
    location: &str,
    local_name: &str,
    parent_name: &str,
    title: Option<&str>,
  ) -> Class {
    if let Some(class) = self.class_locations.get(location) {
      return class.clone();
    }

    let candidate = Self::candidate_class(config, local_name, parent_name, title);
    if parent_name.is_empty() {
      return candidate;
    }

    let used: BTreeSet<String> = self.class_locations.values().map(|c| c.name.clone()).collect();
    let name = ensure_unique(&candidate.name, &used);
    if name == candidate.name {
      candidate
    } else {
      Class::new(name)
    }
  }

  /// Location that owns `class`, if any.
  pub(crate) fn class_owner(&self, class: &Class) -> Option<&str> {
    self
      .class_locations
      .iter()
      .find_map(|(location, owned)| (owned == class).then_some(location.as_str()))
  }

  pub(crate) fn register_class(&mut self, location: &str, class: &Class, root: Option<&ReferencePath>) {
    self.class_locations.insert(location.to_string(), class.clone());
    let roots = self.roots.entry(class.clone()).or_default();
    if let Some(root) = root {
      roots.insert(root.clone());
    }
  }

  pub(crate) fn add_model(&mut self, model: ModelDef, root: Option<&ReferencePath>) {
    let location = model.location.clone();
    let class = model.class.clone();
    self.register_class(&location, &class, root);
    self.models.insert(class, Arc::new(model));
  }

  pub(crate) fn add_enum(&mut self, location: &str, definition: EnumProperty, root: Option<&ReferencePath>) {
    let class = definition.class.clone();
    self.register_class(location, &class, root);
    self.enums.entry(class).or_insert(definition);
  }

  /// Model dependency edges, from each model to the models its properties name.
  fn model_dependencies(&self) -> BTreeMap<Class, BTreeSet<Class>> {
    self
      .models
      .iter()
      .map(|(class, model)| {
        let deps = model
          .owned_properties()
          .flat_map(Property::direct_classes)
          .filter(|dep| self.models.contains_key(dep))
          .collect();
        (class.clone(), deps)
      })
      .collect()
  }

  /// Strongly-connected groups of models, including self-referencing models.
  pub fn cycles(&self) -> Vec<Vec<Class>> {
    let dependencies = self.model_dependencies();
    let mut graph = DiGraphMap::<&str, ()>::new();
    for (node, deps) in &dependencies {
      graph.add_node(node.name.as_str());
      for dep in deps {
        graph.add_edge(node.name.as_str(), dep.name.as_str(), ());
      }
    }

    let mut cycles: Vec<Vec<Class>> = kosaraju_scc(&graph)
      .into_iter()
      .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
      .map(|scc| {
        let mut members: Vec<Class> = scc
          .into_iter()
          .filter_map(|name| self.models.get_key_value(&Class::new(name)).map(|(class, _)| class.clone()))
          .collect();
        members.sort();
        members
      })
      .collect();
    cycles.sort();
    cycles
  }

  pub fn is_cyclic(&self, class: &Class) -> bool {
    self.cycles().iter().any(|cycle| cycle.contains(class))
  }

  /// Removes the given top-level schemas and everything that only existed for them, then keeps
  /// removing schemas that still point at a removed class.
  pub(crate) fn prune_roots(&mut self, failed: BTreeSet<ReferencePath>) {
    let mut failed = failed;
    while !failed.is_empty() {
      for root in &failed {
        warn!(schema = %root, "pruning unresolved schema");
        self.by_reference.shift_remove(root);
      }

      let mut removed = BTreeSet::new();
      for (class, roots) in &mut self.roots {
        let before = roots.len();
        roots.retain(|root| !failed.contains(root));
        if before > 0 && roots.is_empty() {
          removed.insert(class.clone());
        }
      }
      if removed.is_empty() {
        break;
      }

      for class in &removed {
        self.roots.remove(class);
        self.models.shift_remove(class);
        self.enums.shift_remove(class);
      }
      self.class_locations.retain(|_, class| !removed.contains(class));

      failed = self.dangling_roots(&removed);
    }
  }

  /// Top-level schemas that still name one of `removed`, with an error recorded for each.
  fn dangling_roots(&mut self, removed: &BTreeSet<Class>) -> BTreeSet<ReferencePath> {
    let mut dangling: BTreeMap<ReferencePath, Class> = BTreeMap::new();

    for (path, property) in &self.by_reference {
      if let Some(class) = property.direct_classes().intersection(removed).next() {
        dangling.insert(path.clone(), class.clone());
      }
    }
    for (class, model) in &self.models {
      let Some(missing) = model
        .owned_properties()
        .find_map(|p| p.direct_classes().intersection(removed).next().cloned())
      else {
        continue;
      };
      for root in self.roots.get(class).into_iter().flatten() {
        dangling.entry(root.clone()).or_insert_with(|| missing.clone());
      }
    }

    for (path, class) in &dangling {
      self.errors.push(
        PropertyError::new(format!("{path} depends on {class}, which could not be resolved"))
          .with_header(format!("Unable to resolve schema {}", path.name())),
      );
    }
    dangling.into_keys().collect()
  }
}
