pub mod refs;
pub(crate) mod schema_ext;
pub mod spec;

pub use refs::{ReferencePath, reference_of};
pub(crate) use schema_ext::SchemaExt;
