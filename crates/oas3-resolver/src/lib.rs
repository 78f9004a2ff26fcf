//! Resolves the schema graph of an OpenAPI 3.1 document into a typed, de-duplicated, cycle-safe
//! property model.
//!
//! The entry point is [`resolver::Orchestrator`]; [`resolver::build_schemas`] runs the schema
//! fixpoint on its own.

pub mod naming;
pub mod resolver;
pub mod utils;
