use std::collections::BTreeMap;

/// Replacement identity for a generated class, keyed by the class name it would otherwise get.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassOverride {
  pub class_name: Option<String>,
  pub module_name: Option<String>,
}

#[derive(Debug, Clone, bon::Builder)]
pub struct ResolverConfig {
  #[builder(default)]
  pub class_overrides: BTreeMap<String, ClassOverride>,
  /// Prefix titled nested schemas with their parent's class name.
  #[builder(default = true)]
  pub use_path_prefixes_for_title_model_names: bool,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}
