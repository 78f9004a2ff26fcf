use strum::Display;
use thiserror::Error;

use super::value::ValueError;

/// Severity of a [`PropertyError`].
///
/// Warnings skip the offending schema and let its siblings continue; errors abort the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ErrorLevel {
  #[default]
  #[strum(to_string = "WARNING")]
  Warning,
  #[strum(to_string = "ERROR")]
  Error,
}

/// The only error that crosses builder boundaries.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{detail}")]
pub struct PropertyError {
  pub detail: String,
  pub header: Option<String>,
  pub data: Option<serde_json::Value>,
  pub level: ErrorLevel,
}

impl PropertyError {
  pub fn new(detail: impl Into<String>) -> Self {
    Self {
      detail: detail.into(),
      header: None,
      data: None,
      level: ErrorLevel::Warning,
    }
  }

  /// A default literal that cannot be converted for the property `name`.
  pub(crate) fn invalid_default(name: &str, source: &ValueError) -> Self {
    Self::new(format!("Invalid default value for property {name}: {source}"))
  }

  #[must_use]
  pub fn fatal(mut self) -> Self {
    self.level = ErrorLevel::Error;
    self
  }

  #[must_use]
  pub fn with_header(mut self, header: impl Into<String>) -> Self {
    self.header = Some(header.into());
    self
  }

  /// Attaches the offending node unless one is already attached.
  #[must_use]
  pub fn with_data(mut self, data: Option<serde_json::Value>) -> Self {
    if self.data.is_none() {
      self.data = data;
    }
    self
  }

  /// Prefixes the detail with context from an enclosing builder.
  #[must_use]
  pub fn wrap(mut self, context: impl AsRef<str>) -> Self {
    self.detail = format!("{}: {}", context.as_ref(), self.detail);
    self
  }

  pub fn is_fatal(&self) -> bool {
    self.level == ErrorLevel::Error
  }
}

/// Failure of a whole resolution run.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("{} - {}", .0.level, .0.detail)]
  Fatal(PropertyError),
  #[error("Failed to parse OpenAPI document: {0}")]
  Parse(#[from] serde_json::Error),
}
