use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use thiserror::Error;
use uuid::Uuid;

use super::property::PropertyKind;

/// A default or constant literal, validated for the kind of property that carries it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  String(String),
  Date(NaiveDate),
  DateTime(DateTime<FixedOffset>),
  Uuid(Uuid),
  /// The key of an enum member.
  EnumMember(String),
  /// Structured literal kept verbatim (defaults of `any`, lists and models).
  Json(serde_json::Value),
}

impl Value {
  /// Reads a JSON scalar without a target kind; arrays and objects stay [`Value::Json`].
  pub fn from_literal(raw: &serde_json::Value) -> Self {
    match raw {
      serde_json::Value::Null => Self::Null,
      serde_json::Value::Bool(b) => Self::Bool(*b),
      serde_json::Value::Number(n) => n
        .as_i64()
        .map(Self::Int)
        .or_else(|| n.as_f64().map(Self::Float))
        .unwrap_or_else(|| Self::Json(raw.clone())),
      serde_json::Value::String(s) => Self::String(s.clone()),
      serde_json::Value::Array(_) | serde_json::Value::Object(_) => Self::Json(raw.clone()),
    }
  }

  pub fn is_scalar(&self) -> bool {
    !matches!(self, Self::Json(_))
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Null => f.write_str("null"),
      Self::Bool(b) => write!(f, "{b}"),
      Self::Int(i) => write!(f, "{i}"),
      Self::Float(x) => write!(f, "{x:?}"),
      Self::String(s) => write!(f, "{s:?}"),
      Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
      Self::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
      Self::Uuid(u) => write!(f, "{u}"),
      Self::EnumMember(key) => write!(f, "{key}"),
      Self::Json(json) => write!(f, "{json}"),
    }
  }
}

/// Local conversion failure; callers turn it into a `PropertyError` naming the property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
  #[error("expected {expected}, found {found}")]
  TypeMismatch { expected: PropertyKind, found: String },
  #[error("{value} is not a valid {kind}")]
  Invalid { kind: PropertyKind, value: String },
  #[error("{kind} properties cannot have a default")]
  Unsupported { kind: PropertyKind },
}

fn mismatch(expected: PropertyKind, raw: &serde_json::Value) -> ValueError {
  ValueError::TypeMismatch {
    expected,
    found: raw.to_string(),
  }
}

fn invalid(kind: PropertyKind, raw: impl ToString) -> ValueError {
  ValueError::Invalid {
    kind,
    value: raw.to_string(),
  }
}

/// Converts a raw JSON literal into the default of a scalar property of `kind`.
///
/// `null` always converts to "no default".
pub fn convert(kind: PropertyKind, raw: &serde_json::Value) -> Result<Option<Value>, ValueError> {
  use serde_json::Value as Json;

  if raw.is_null() {
    return Ok(None);
  }

  let value = match (kind, raw) {
    (PropertyKind::Any, _) => Value::Json(raw.clone()),
    (PropertyKind::String, Json::String(s)) => Value::String(s.clone()),
    (PropertyKind::String, Json::Number(n)) => Value::String(n.to_string()),
    (PropertyKind::String, Json::Bool(b)) => Value::String(b.to_string()),
    (PropertyKind::Int, Json::Number(n)) => {
      if let Some(i) = n.as_i64() {
        Value::Int(i)
      } else {
        let float = n.as_f64().ok_or_else(|| invalid(kind, n))?;
        integral(float).map(Value::Int).ok_or_else(|| invalid(kind, n))?
      }
    }
    (PropertyKind::Int, Json::String(s)) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| invalid(kind, s))?,
    (PropertyKind::Float, Json::Number(n)) => n.as_f64().map(Value::Float).ok_or_else(|| invalid(kind, n))?,
    (PropertyKind::Float, Json::String(s)) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| invalid(kind, s))?,
    (PropertyKind::Boolean, Json::Bool(b)) => Value::Bool(*b),
    (PropertyKind::Boolean, Json::String(s)) => match s.to_ascii_lowercase().as_str() {
      "true" => Value::Bool(true),
      "false" => Value::Bool(false),
      _ => return Err(invalid(kind, s)),
    },
    (PropertyKind::Date, Json::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .map(Value::Date)
      .map_err(|_| invalid(kind, s))?,
    (PropertyKind::DateTime, Json::String(s)) => DateTime::parse_from_rfc3339(s)
      .map(Value::DateTime)
      .map_err(|_| invalid(kind, s))?,
    (PropertyKind::Uuid, Json::String(s)) => Uuid::parse_str(s).map(Value::Uuid).map_err(|_| invalid(kind, s))?,
    (PropertyKind::None | PropertyKind::File, _) => return Err(mismatch(kind, raw)),
    (
      PropertyKind::String
      | PropertyKind::Int
      | PropertyKind::Float
      | PropertyKind::Boolean
      | PropertyKind::Date
      | PropertyKind::DateTime
      | PropertyKind::Uuid,
      _,
    ) => return Err(mismatch(kind, raw)),
    (
      PropertyKind::Const
      | PropertyKind::List
      | PropertyKind::Union
      | PropertyKind::Enum
      | PropertyKind::Model
      | PropertyKind::Reference,
      _,
    ) => return Err(ValueError::Unsupported { kind }),
  };

  Ok(Some(value))
}

/// Returns the integer equivalent of `value` when it has no fractional part.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn integral(value: f64) -> Option<i64> {
  (value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15).then_some(value as i64)
}
