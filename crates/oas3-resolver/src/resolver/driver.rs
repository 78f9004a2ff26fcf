//! Fixpoint driver over the top-level schemas of a document.
//!
//! Every pass attempts each schema that has not been built yet, in declaration order. A schema
//! that points at something unbuilt either becomes a pending reference (plain `$ref` slots) or
//! fails this pass and is retried (`allOf` members, which need the referenced model's
//! properties). Passes repeat while at least one schema succeeds; the errors of the last pass
//! are the ones reported.

use oas3::spec::{ObjectOrReference, ObjectSchema};
use tracing::{debug, trace, warn};

use super::{
  builder::{PropertyBuilder, Site, schema_data},
  config::ResolverConfig,
  document::Document,
  errors::{PropertyError, ResolveError},
  property::{
    PropertyMeta,
    reference::{substitute, unresolved},
  },
  schemas::Schemas,
};
use crate::utils::ReferencePath;

/// Result of [`build_schemas`].
#[derive(Debug, Clone)]
pub struct BuildOutcome {
  pub schemas: Schemas,
  /// Passes over non-reference schemas.
  pub passes: usize,
  /// Passes over top-level schemas that are bare `$ref`s.
  pub reference_passes: usize,
}

type Entry<'a> = (ReferencePath, &'a ObjectOrReference<ObjectSchema>);

/// Builds every top-level schema of `document` into `schemas`.
///
/// Schemas that cannot be built are left out and described in `schemas.errors()`.
///
/// # Errors
/// Only document-fatal problems (such as duplicate enum keys) abort the run.
pub fn build_schemas(
  document: &Document,
  schemas: Schemas,
  config: &ResolverConfig,
) -> Result<BuildOutcome, ResolveError> {
  let mut schemas = schemas;
  let (aliases, mut remaining): (Vec<Entry<'_>>, Vec<Entry<'_>>) = document
    .schema_entries()
    .into_iter()
    .partition(|(_, data)| matches!(data, ObjectOrReference::Ref { .. }));

  let mut passes = 0;
  let mut errors = Vec::new();
  while !remaining.is_empty() {
    passes += 1;
    errors.clear();
    let attempted = remaining.len();

    let mut retry = Vec::new();
    for (path, data) in remaining {
      match attempt(&path, data, &schemas, config) {
        Ok(updated) => {
          trace!(schema = %path, "schema built");
          schemas = updated;
        }
        Err(error) if error.is_fatal() => {
          warn!(schema = %path, error = %error, "aborting on fatal schema error");
          return Err(ResolveError::Fatal(error));
        }
        Err(error) => {
          trace!(schema = %path, error = %error, "schema deferred");
          errors.push(error);
          retry.push((path, data));
        }
      }
    }

    debug!(pass = passes, remaining = retry.len(), "schema pass complete");
    let stalled = retry.len() == attempted || retry.is_empty();
    remaining = retry;
    if stalled {
      break;
    }
    schemas.resolve_pending();
  }
  schemas.resolve_pending();

  let (reference_passes, alias_errors) = build_aliases(aliases, &mut schemas);

  schemas.errors.extend(errors);
  schemas.errors.extend(alias_errors);
  schemas.finalize_pending();

  debug!(
    passes,
    reference_passes,
    models = schemas.models.len(),
    enums = schemas.enums.len(),
    errors = schemas.errors.len(),
    "schemas resolved"
  );

  Ok(BuildOutcome {
    schemas,
    passes,
    reference_passes,
  })
}

/// Builds one top-level schema against a copy of the registry, returning the updated copy.
fn attempt(
  path: &ReferencePath,
  data: &ObjectOrReference<ObjectSchema>,
  schemas: &Schemas,
  config: &ResolverConfig,
) -> Result<Schemas, PropertyError> {
  let mut candidate = schemas.clone();
  let builder = PropertyBuilder::new(config).rooted(path.clone()).allowing_pending();

  let property = builder
    .build(data, &Site::top_level(path), &mut candidate)
    .map_err(|e| {
      e.with_header(format!("Unable to parse schema {}", path.name()))
        .with_data(schema_data(data))
    })?;

  candidate.by_reference.insert(path.clone(), property);
  Ok(candidate)
}

/// Resolves top-level schemas that are nothing but a `$ref`, repeating while any succeeds.
fn build_aliases(aliases: Vec<Entry<'_>>, schemas: &mut Schemas) -> (usize, Vec<PropertyError>) {
  let mut passes = 0;
  let mut errors = Vec::new();
  let mut remaining = Vec::new();

  for (path, data) in aliases {
    let ObjectOrReference::Ref {
      ref_path, description, ..
    } = data
    else {
      continue;
    };
    match ReferencePath::parse(ref_path) {
      Some(target) => remaining.push((path, target, description.clone())),
      None => errors.push(
        PropertyError::new(format!("Remote references such as {ref_path} are not supported yet."))
          .with_header(format!("Unable to parse schema {}", path.name()))
          .with_data(schema_data(data)),
      ),
    }
  }

  while !remaining.is_empty() {
    passes += 1;
    let before = remaining.len();

    let mut retry = Vec::new();
    for (path, target, description) in remaining {
      let resolved = schemas
        .reference(&target)
        .filter(|property| !property.has_pending())
        .map(|property| {
          let mut slot = PropertyMeta::new(path.name(), true);
          slot.description.clone_from(&description);
          substitute(&slot, property)
        });
      match resolved {
        Some(property) => {
          trace!(schema = %path, target = %target, "reference schema resolved");
          schemas.by_reference.insert(path, property);
        }
        None => retry.push((path, target, description)),
      }
    }

    debug!(pass = passes, remaining = retry.len(), "reference pass complete");
    let stalled = retry.len() == before;
    remaining = retry;
    if stalled {
      break;
    }
    schemas.resolve_pending();
  }

  errors.extend(remaining.into_iter().map(|(path, target, _)| {
    unresolved(&target).with_header(format!("Unable to parse schema {}", path.name()))
  }));

  (passes, errors)
}
