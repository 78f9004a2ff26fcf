use serde::Serialize;
use strum::Display;

use super::{
  class::Class,
  errors::{ErrorLevel, PropertyError},
  operations::OperationProperties,
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResolutionStats {
  pub passes: usize,
  pub reference_passes: usize,
  pub models_resolved: usize,
  pub enums_resolved: usize,
  pub parameters_resolved: usize,
  pub operations_resolved: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub warnings: Vec<ResolutionWarning>,
}

impl ResolutionStats {
  pub fn record_passes(&mut self, passes: usize, reference_passes: usize) {
    self.passes += passes;
    self.reference_passes += reference_passes;
  }

  pub fn record_models(&mut self, count: usize) {
    self.models_resolved += count;
  }

  pub fn record_enums(&mut self, count: usize) {
    self.enums_resolved += count;
  }

  pub fn record_parameters(&mut self, count: usize) {
    self.parameters_resolved += count;
  }

  pub fn record_cycle(&mut self, cycle: &[Class]) {
    self.cycles_detected += 1;
    self.cycle_details.push(cycle.iter().map(ToString::to_string).collect());
  }

  pub fn record_cycles(&mut self, cycles: &[Vec<Class>]) {
    for cycle in cycles {
      self.record_cycle(cycle);
    }
  }

  pub fn record_operation(&mut self, operation: &OperationProperties) {
    self.operations_resolved += 1;
    for error in &operation.errors {
      self.record_warning(ResolutionWarning::OperationFailed {
        operation_id: operation.id.clone(),
        error: error.detail.clone(),
      });
    }
  }

  pub fn record_operations(&mut self, operations: &[OperationProperties]) {
    for operation in operations {
      self.record_operation(operation);
    }
  }

  pub fn record_schema_errors(&mut self, errors: &[PropertyError]) {
    for error in errors {
      self.record_warning(ResolutionWarning::SchemaFailed {
        header: error.header.clone().unwrap_or_else(|| "Unable to parse schema".to_string()),
        level: error.level,
        error: error.detail.clone(),
      });
    }
  }

  pub fn record_warning(&mut self, warning: ResolutionWarning) {
    self.warnings.push(warning);
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionWarning {
  #[strum(to_string = "{level} {header}: {error}")]
  SchemaFailed {
    header: String,
    #[serde(serialize_with = "serialize_level")]
    level: ErrorLevel,
    error: String,
  },
  #[strum(to_string = "[{operation_id}] {error}")]
  OperationFailed { operation_id: String, error: String },
}

impl ResolutionWarning {
  pub fn is_error(&self) -> bool {
    matches!(
      self,
      Self::SchemaFailed {
        level: ErrorLevel::Error,
        ..
      }
    )
  }
}

fn serialize_level<S: serde::Serializer>(level: &ErrorLevel, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.collect_str(level)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_warning_display() {
    let warning = ResolutionWarning::SchemaFailed {
      header: "Unable to parse schema Pet".to_string(),
      level: ErrorLevel::Warning,
      error: "boom".to_string(),
    };
    assert_eq!(warning.to_string(), "WARNING Unable to parse schema Pet: boom");
    assert!(!warning.is_error());

    let warning = ResolutionWarning::OperationFailed {
      operation_id: "list_pets".to_string(),
      error: "boom".to_string(),
    };
    assert_eq!(warning.to_string(), "[list_pets] boom");
  }

  #[test]
  fn test_record_cycles() {
    let mut stats = ResolutionStats::default();
    stats.record_cycles(&[vec![Class::new("A"), Class::new("B")], vec![Class::new("Node")]]);
    assert_eq!(stats.cycles_detected, 2);
    assert_eq!(stats.cycle_details[0], vec!["A", "B"]);
  }

  #[test]
  fn test_stats_serialize() {
    let mut stats = ResolutionStats::default();
    stats.record_schema_errors(&[PropertyError::new("bad").with_header("Unable to parse schema X").fatal()]);
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["warnings"][0]["kind"], "schema_failed");
    assert_eq!(json["warnings"][0]["level"], "ERROR");
  }
}
