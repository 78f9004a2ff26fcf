pub mod identifiers;
pub mod operations;

pub use identifiers::{ensure_unique, sanitize, to_class_name, to_enum_key, to_field_ident, to_module_name};
pub use operations::compute_stable_id;

#[cfg(test)]
mod tests;
