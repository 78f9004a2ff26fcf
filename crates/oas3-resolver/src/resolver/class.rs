use std::{
  cmp::Ordering,
  fmt,
  hash::{Hash, Hasher},
};

use crate::naming::to_module_name;

/// Identity of a generated type: a class name plus the module-like grouping it lives in.
///
/// Equality, ordering and hashing consider the name only.
#[derive(Debug, Clone)]
pub struct Class {
  pub name: String,
  pub module_name: String,
}

impl Class {
  pub fn new(name: impl Into<String>) -> Self {
    let name = name.into();
    let module_name = to_module_name(&name);
    Self { name, module_name }
  }

  pub fn with_module(name: impl Into<String>, module_name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      module_name: module_name.into(),
    }
  }
}

impl PartialEq for Class {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
  }
}

impl Eq for Class {}

impl Hash for Class {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
  }
}

impl PartialOrd for Class {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Class {
  fn cmp(&self, other: &Self) -> Ordering {
    self.name.cmp(&other.name)
  }
}

impl fmt::Display for Class {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_identity_ignores_module() {
    let a = Class::new("PetOwner");
    let b = Class::with_module("PetOwner", "owners");
    assert_eq!(a.module_name, "pet_owner");
    assert_eq!(a, b);
    assert!(Class::new("A") < Class::new("B"));
  }
}
