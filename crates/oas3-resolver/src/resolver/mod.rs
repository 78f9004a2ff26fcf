pub(crate) mod builder;
pub mod class;
pub mod config;
pub mod document;
pub mod driver;
pub mod errors;
pub mod merge;
pub mod metrics;
pub mod operations;
pub mod orchestrator;
pub mod property;
pub mod schemas;
pub mod value;

pub use builder::property_from_data;
pub use class::Class;
pub use config::{ClassOverride, ResolverConfig};
pub use document::Document;
pub use driver::{BuildOutcome, build_schemas};
pub use errors::{ErrorLevel, PropertyError, ResolveError};
pub use merge::merge_properties;
pub use metrics::{ResolutionStats, ResolutionWarning};
pub use operations::{OperationProperties, build_operations, build_parameters};
pub use orchestrator::{Orchestrator, Resolution};
pub use property::{
  ClassRef, ConstProperty, Discriminator, EnumLiteral, EnumProperty, EnumValueKind, ListProperty, ModelProperty,
  Property, PropertyKind, PropertyMeta, ReferenceProperty, ScalarProperty, StringProperty, UnionProperty,
  enums::values_from_list,
};
pub use schemas::{AdditionalProperties, ModelDef, ParameterDef, ParameterLocation, Schemas};
pub use value::{Value, ValueError};

#[cfg(test)]
mod tests;
