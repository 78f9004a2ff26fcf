//! Resolution of reusable parameters and of the parameters, request body and responses of every
//! operation. These run after the schema fixpoint, so every `$ref` must already be resolvable.

use indexmap::IndexMap;
use oas3::spec::{ObjectOrReference, ObjectSchema, Operation, Parameter, ParameterIn};
use tracing::{debug, warn};

use super::{
  builder::{PropertyBuilder, Site, schema_data},
  config::ResolverConfig,
  document::Document,
  errors::PropertyError,
  property::Property,
  schemas::{ParameterDef, ParameterLocation, Schemas},
};
use crate::{
  naming::{compute_stable_id, to_class_name},
  utils::ReferencePath,
};

const BODY_NAME: &str = "body";

/// Resolved inputs and outputs of one operation.
#[derive(Debug, Clone)]
pub struct OperationProperties {
  pub id: String,
  pub method: String,
  pub path: String,
  pub parameters: Vec<ParameterDef>,
  pub request_body: Option<Property>,
  /// Status code to the response body property; `None` for responses without a schema.
  pub responses: IndexMap<String, Option<Property>>,
  pub errors: Vec<PropertyError>,
}

impl From<&ParameterIn> for ParameterLocation {
  fn from(location: &ParameterIn) -> Self {
    match location {
      ParameterIn::Path => Self::Path,
      ParameterIn::Query => Self::Query,
      ParameterIn::Header => Self::Header,
      ParameterIn::Cookie => Self::Cookie,
    }
  }
}

/// Builds `components.parameters` into `schemas`; failures are recorded in `schemas.errors()`.
pub fn build_parameters(document: &Document, schemas: &mut Schemas, config: &ResolverConfig) {
  for (path, data) in document.parameter_entries() {
    let result = data
      .resolve(document.spec())
      .map_err(|e| PropertyError::new(format!("Unable to resolve parameter {path}: {e}")))
      .and_then(|parameter| {
        let location = path.to_string();
        isolated(schemas, |schemas| {
          build_parameter(&parameter, "", &location, Some(&path), schemas, config)
        })
      });

    match result {
      Ok(definition) => {
        schemas.parameters.insert(path, definition);
      }
      Err(error) => {
        warn!(parameter = %path, error = %error, "skipping parameter");
        schemas
          .errors
          .push(error.with_header(format!("Unable to parse parameter {}", path.name())));
      }
    }
  }
}

/// Resolves every operation of `document` against the finished registry.
pub fn build_operations(
  document: &Document,
  schemas: &mut Schemas,
  config: &ResolverConfig,
) -> Vec<OperationProperties> {
  let spec = document.spec();
  let mut operations = Vec::new();

  for (path, method, operation) in spec.operations() {
    let id = compute_stable_id(method.as_str(), path.as_str(), operation.operation_id.as_deref());
    let parent_name = to_class_name(&id);
    let location = format!("#/operations/{id}");

    let mut resolved = OperationProperties {
      id: id.clone(),
      method: method.as_str().to_string(),
      path: path.clone(),
      parameters: vec![],
      request_body: None,
      responses: IndexMap::new(),
      errors: vec![],
    };

    for data in path_item_parameters(document, &path).chain(operation.parameters.iter()) {
      match operation_parameter(document, data, &parent_name, &location, schemas, config) {
        Ok(parameter) => {
          resolved
            .parameters
            .retain(|existing| !(existing.location == parameter.location && existing.name == parameter.name));
          resolved.parameters.push(parameter);
        }
        Err(error) => resolved.errors.push(error),
      }
    }

    match request_body(document, operation, &parent_name, &location, schemas, config) {
      Ok(body) => resolved.request_body = body,
      Err(error) => resolved.errors.push(error.wrap("Unable to parse request body")),
    }

    for (status, response) in operation.responses.iter().flatten() {
      let result = response
        .resolve(spec)
        .map_err(|e| PropertyError::new(format!("Unable to resolve response {status}: {e}")))
        .and_then(|response| match first_schema(response.content.values().map(|m| m.schema.as_ref())) {
          Some(data) => {
            let name = format!("response_{status}");
            let site = Site::new(&name, true, &parent_name, format!("{location}/responses/{status}"));
            isolated(schemas, |schemas| PropertyBuilder::new(config).build(data, &site, schemas)).map(Some)
          }
          None => Ok(None),
        });

      match result {
        Ok(property) => {
          resolved.responses.insert(status.clone(), property);
        }
        Err(error) => resolved
          .errors
          .push(error.wrap(format!("Unable to parse response {status}"))),
      }
    }

    for error in &mut resolved.errors {
      if error.header.is_none() {
        error.header = Some(format!("Unable to parse operation {id}"));
      }
    }
    debug!(operation = %id, errors = resolved.errors.len(), "operation resolved");
    operations.push(resolved);
  }

  operations
}

/// Runs `build` against `schemas`, restoring it when the build fails.
fn isolated<T>(
  schemas: &mut Schemas,
  build: impl FnOnce(&mut Schemas) -> Result<T, PropertyError>,
) -> Result<T, PropertyError> {
  let snapshot = schemas.clone();
  let result = build(schemas);
  if result.is_err() {
    *schemas = snapshot;
  }
  result
}

fn path_item_parameters<'a>(
  document: &'a Document,
  path: &str,
) -> impl Iterator<Item = &'a ObjectOrReference<Parameter>> {
  document
    .spec()
    .paths
    .as_ref()
    .and_then(|paths| paths.get(path))
    .into_iter()
    .flat_map(|item| item.parameters.iter())
}

fn build_parameter(
  parameter: &Parameter,
  parent_name: &str,
  location: &str,
  root: Option<&ReferencePath>,
  schemas: &mut Schemas,
  config: &ResolverConfig,
) -> Result<ParameterDef, PropertyError> {
  let Some(data) = parameter.schema.as_ref() else {
    return Err(PropertyError::new(format!("Parameter {} has no schema", parameter.name)));
  };

  let location_kind = ParameterLocation::from(&parameter.location);
  let required = location_kind == ParameterLocation::Path || parameter.required.unwrap_or(false);

  let mut builder = PropertyBuilder::new(config);
  if let Some(root) = root {
    builder = builder.rooted(root.clone());
  }
  let site = Site::new(&parameter.name, required, parent_name, location.to_string());
  let mut property = builder
    .build(data, &site, schemas)
    .map_err(|e| e.with_data(schema_data(data)))?;
  if property.meta().description.is_none() {
    property.meta_mut().description.clone_from(&parameter.description);
  }

  Ok(ParameterDef {
    name: parameter.name.clone(),
    location: location_kind,
    required,
    property,
  })
}

fn operation_parameter(
  document: &Document,
  data: &ObjectOrReference<Parameter>,
  parent_name: &str,
  location: &str,
  schemas: &mut Schemas,
  config: &ResolverConfig,
) -> Result<ParameterDef, PropertyError> {
  if let ObjectOrReference::Ref { ref_path, .. } = data {
    let reused = ReferencePath::parse(ref_path).and_then(|path| schemas.parameter(&path).cloned());
    return reused.ok_or_else(|| {
      PropertyError::new(format!("Could not find reference in parsed parameters: {ref_path}"))
    });
  }

  let parameter = data
    .resolve(document.spec())
    .map_err(|e| PropertyError::new(format!("Unable to resolve parameter: {e}")))?;
  let location = format!("{location}/parameters/{}/{}", ParameterLocation::from(&parameter.location), parameter.name);
  isolated(schemas, |schemas| {
    build_parameter(&parameter, parent_name, &location, None, schemas, config)
  })
  .map_err(|e| e.wrap(format!("Unable to parse parameter {}", parameter.name)))
}

fn request_body(
  document: &Document,
  operation: &Operation,
  parent_name: &str,
  location: &str,
  schemas: &mut Schemas,
  config: &ResolverConfig,
) -> Result<Option<Property>, PropertyError> {
  let Some(body) = operation.request_body.as_ref() else {
    return Ok(None);
  };
  let body = body
    .resolve(document.spec())
    .map_err(|e| PropertyError::new(format!("Unable to resolve request body: {e}")))?;

  let Some(data) = first_schema(body.content.values().map(|m| m.schema.as_ref())) else {
    return Ok(None);
  };

  let required = body.required.unwrap_or(false);
  let site = Site::new(BODY_NAME, required, parent_name, format!("{location}/requestBody"));
  let mut property = isolated(schemas, |schemas| PropertyBuilder::new(config).build(data, &site, schemas))?;
  if property.meta().description.is_none() {
    property.meta_mut().description.clone_from(&body.description);
  }
  Ok(Some(property))
}

/// Schema of the first media type that declares one.
fn first_schema<'a>(
  mut schemas: impl Iterator<Item = Option<&'a ObjectOrReference<ObjectSchema>>>,
) -> Option<&'a ObjectOrReference<ObjectSchema>> {
  schemas.find_map(|schema| schema)
}
