//! Runs the whole resolution pipeline for one document.
//!
//! ## Usage
//!
//! ```no_run
//! use oas3_resolver::resolver::{Document, Orchestrator, ResolverConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let json = std::fs::read_to_string("openapi.json")?;
//! let document = Document::from_json_str(&json)?;
//!
//! let resolution = Orchestrator::new(document, ResolverConfig::default()).resolve()?;
//! println!(
//!   "Resolved {} models with {} warnings",
//!   resolution.stats.models_resolved,
//!   resolution.stats.warnings.len()
//! );
//! # Ok(())
//! # }
//! ```

use tracing::info;

use super::{
  config::ResolverConfig,
  document::Document,
  driver::build_schemas,
  errors::ResolveError,
  metrics::ResolutionStats,
  operations::{OperationProperties, build_operations, build_parameters},
  schemas::Schemas,
};

/// Resolves a [`Document`]: schemas to a fixpoint, then reusable parameters, then operations.
pub struct Orchestrator {
  document: Document,
  config: ResolverConfig,
}

/// Everything resolved for one document.
#[derive(Debug, Clone)]
pub struct Resolution {
  pub schemas: Schemas,
  pub operations: Vec<OperationProperties>,
  pub stats: ResolutionStats,
}

impl Orchestrator {
  pub fn new(document: Document, config: ResolverConfig) -> Self {
    Self { document, config }
  }

  pub fn document(&self) -> &Document {
    &self.document
  }

  /// # Errors
  /// Only when the document contains a fatal problem; recoverable problems are reported through
  /// `schemas.errors()`, the operations' `errors` and the statistics' warnings.
  pub fn resolve(&self) -> Result<Resolution, ResolveError> {
    let outcome = build_schemas(&self.document, Schemas::default(), &self.config)?;
    let mut schemas = outcome.schemas;

    build_parameters(&self.document, &mut schemas, &self.config);
    let operations = build_operations(&self.document, &mut schemas, &self.config);

    let mut stats = ResolutionStats::default();
    stats.record_passes(outcome.passes, outcome.reference_passes);
    stats.record_models(schemas.models.len());
    stats.record_enums(schemas.enums.len());
    stats.record_parameters(schemas.parameters.len());
    stats.record_cycles(&schemas.cycles());
    stats.record_schema_errors(schemas.errors());
    stats.record_operations(&operations);

    info!(
      models = stats.models_resolved,
      enums = stats.enums_resolved,
      operations = stats.operations_resolved,
      warnings = stats.warnings.len(),
      "document resolved"
    );

    Ok(Resolution {
      schemas,
      operations,
      stats,
    })
  }
}
