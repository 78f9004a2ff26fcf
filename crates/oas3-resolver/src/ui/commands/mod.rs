mod check;
mod list;

pub use check::{CheckConfig, check_document};
pub use list::{list_enums, list_models, list_operations};
