//! The resolved property tree.
//!
//! Every schema node becomes one [`Property`]. Models and enums are referenced by [`Class`]
//! handles; their definitions live in the [`Schemas`] registry, which is what lets a cyclic
//! schema graph be represented without infinite structures.

pub mod enums;
mod list;
mod model;
mod primitives;
pub(crate) mod reference;
mod union;

use std::{collections::BTreeSet, fmt};

use indexmap::IndexMap;
use itertools::Itertools;
use strum::Display;

use super::{
  Schemas,
  class::Class,
  value::{self, Value, ValueError},
};
use crate::{naming::to_field_ident, utils::ReferencePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PropertyKind {
  None,
  Any,
  String,
  Date,
  DateTime,
  File,
  Uuid,
  Float,
  Int,
  Boolean,
  Const,
  List,
  Union,
  Enum,
  Model,
  Reference,
}

/// Attributes shared by every property kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMeta {
  /// Schema-local key.
  pub name: String,
  pub required: bool,
  pub nullable: bool,
  /// Generated `snake_case` identifier.
  pub ident: String,
  pub description: Option<String>,
  pub example: Option<serde_json::Value>,
}

impl PropertyMeta {
  pub fn new(name: &str, required: bool) -> Self {
    Self {
      name: name.to_string(),
      required,
      nullable: false,
      ident: to_field_ident(name),
      description: None,
      example: None,
    }
  }

  pub(crate) fn renamed(&mut self, name: &str, required: bool) {
    self.name = name.to_string();
    self.ident = to_field_ident(name);
    self.required = required;
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarProperty {
  pub meta: PropertyMeta,
  pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringProperty {
  pub meta: PropertyMeta,
  pub default: Option<Value>,
  pub max_length: Option<u64>,
  pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstProperty {
  pub meta: PropertyMeta,
  pub value: Value,
  pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListProperty {
  pub meta: PropertyMeta,
  pub inner: Box<Property>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionProperty {
  pub meta: PropertyMeta,
  pub default: Option<Value>,
  pub inner: Vec<Property>,
  pub discriminators: Vec<Discriminator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumProperty {
  pub meta: PropertyMeta,
  pub default: Option<Value>,
  pub class: Class,
  pub values: IndexMap<String, EnumLiteral>,
  pub value_kind: EnumValueKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelProperty {
  pub meta: PropertyMeta,
  pub class: Class,
}

/// A `$ref` whose target had not been built when the referencing schema was.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceProperty {
  pub meta: PropertyMeta,
  pub target: ReferencePath,
  pub parent_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnumLiteral {
  String(String),
  Int(i64),
}

impl EnumLiteral {
  pub fn kind(&self) -> EnumValueKind {
    match self {
      Self::String(_) => EnumValueKind::String,
      Self::Int(_) => EnumValueKind::Int,
    }
  }

  /// Reads an enum literal; floats with a fractional part, booleans and structures are not enum values.
  pub fn from_json(raw: &serde_json::Value) -> Option<Self> {
    match raw {
      serde_json::Value::String(s) => Some(Self::String(s.clone())),
      serde_json::Value::Number(n) => n
        .as_i64()
        .or_else(|| n.as_f64().and_then(super::value::integral))
        .map(Self::Int),
      _ => None,
    }
  }
}

impl fmt::Display for EnumLiteral {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::String(s) => write!(f, "{s:?}"),
      Self::Int(i) => write!(f, "{i}"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EnumValueKind {
  String,
  Int,
}

/// Target of a discriminator mapping entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassRef {
  Pending(ReferencePath),
  Resolved { reference: ReferencePath, class: Class },
}

impl ClassRef {
  pub fn reference(&self) -> &ReferencePath {
    match self {
      Self::Pending(reference) | Self::Resolved { reference, .. } => reference,
    }
  }

  pub fn class(&self) -> Option<&Class> {
    match self {
      Self::Pending(_) => None,
      Self::Resolved { class, .. } => Some(class),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
  pub property_name: String,
  /// Tag value to target model.
  pub mapping: IndexMap<String, ClassRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
  None(ScalarProperty),
  Any(ScalarProperty),
  String(StringProperty),
  Date(ScalarProperty),
  DateTime(ScalarProperty),
  File(ScalarProperty),
  Uuid(ScalarProperty),
  Float(ScalarProperty),
  Int(ScalarProperty),
  Boolean(ScalarProperty),
  Const(ConstProperty),
  List(ListProperty),
  Union(UnionProperty),
  Enum(EnumProperty),
  Model(ModelProperty),
  Reference(ReferenceProperty),
}

impl Property {
  /// Wraps a scalar payload in the variant for `kind`. Returns `None` for non-scalar kinds.
  pub fn scalar(kind: PropertyKind, scalar: ScalarProperty) -> Option<Self> {
    let property = match kind {
      PropertyKind::None => Self::None(scalar),
      PropertyKind::Any => Self::Any(scalar),
      PropertyKind::Date => Self::Date(scalar),
      PropertyKind::DateTime => Self::DateTime(scalar),
      PropertyKind::File => Self::File(scalar),
      PropertyKind::Uuid => Self::Uuid(scalar),
      PropertyKind::Float => Self::Float(scalar),
      PropertyKind::Int => Self::Int(scalar),
      PropertyKind::Boolean => Self::Boolean(scalar),
      PropertyKind::String => Self::String(StringProperty {
        meta: scalar.meta,
        default: scalar.default,
        max_length: None,
        pattern: None,
      }),
      PropertyKind::Const
      | PropertyKind::List
      | PropertyKind::Union
      | PropertyKind::Enum
      | PropertyKind::Model
      | PropertyKind::Reference => return None,
    };
    Some(property)
  }

  pub fn kind(&self) -> PropertyKind {
    match self {
      Self::None(_) => PropertyKind::None,
      Self::Any(_) => PropertyKind::Any,
      Self::String(_) => PropertyKind::String,
      Self::Date(_) => PropertyKind::Date,
      Self::DateTime(_) => PropertyKind::DateTime,
      Self::File(_) => PropertyKind::File,
      Self::Uuid(_) => PropertyKind::Uuid,
      Self::Float(_) => PropertyKind::Float,
      Self::Int(_) => PropertyKind::Int,
      Self::Boolean(_) => PropertyKind::Boolean,
      Self::Const(_) => PropertyKind::Const,
      Self::List(_) => PropertyKind::List,
      Self::Union(_) => PropertyKind::Union,
      Self::Enum(_) => PropertyKind::Enum,
      Self::Model(_) => PropertyKind::Model,
      Self::Reference(_) => PropertyKind::Reference,
    }
  }

  pub fn meta(&self) -> &PropertyMeta {
    match self {
      Self::None(p)
      | Self::Any(p)
      | Self::Date(p)
      | Self::DateTime(p)
      | Self::File(p)
      | Self::Uuid(p)
      | Self::Float(p)
      | Self::Int(p)
      | Self::Boolean(p) => &p.meta,
      Self::String(p) => &p.meta,
      Self::Const(p) => &p.meta,
      Self::List(p) => &p.meta,
      Self::Union(p) => &p.meta,
      Self::Enum(p) => &p.meta,
      Self::Model(p) => &p.meta,
      Self::Reference(p) => &p.meta,
    }
  }

  pub fn meta_mut(&mut self) -> &mut PropertyMeta {
    match self {
      Self::None(p)
      | Self::Any(p)
      | Self::Date(p)
      | Self::DateTime(p)
      | Self::File(p)
      | Self::Uuid(p)
      | Self::Float(p)
      | Self::Int(p)
      | Self::Boolean(p) => &mut p.meta,
      Self::String(p) => &mut p.meta,
      Self::Const(p) => &mut p.meta,
      Self::List(p) => &mut p.meta,
      Self::Union(p) => &mut p.meta,
      Self::Enum(p) => &mut p.meta,
      Self::Model(p) => &mut p.meta,
      Self::Reference(p) => &mut p.meta,
    }
  }

  pub fn name(&self) -> &str {
    &self.meta().name
  }

  pub fn is_required(&self) -> bool {
    self.meta().required
  }

  pub fn is_nullable(&self) -> bool {
    self.meta().nullable
  }

  pub fn default(&self) -> Option<&Value> {
    match self {
      Self::None(p)
      | Self::Any(p)
      | Self::Date(p)
      | Self::DateTime(p)
      | Self::File(p)
      | Self::Uuid(p)
      | Self::Float(p)
      | Self::Int(p)
      | Self::Boolean(p) => p.default.as_ref(),
      Self::String(p) => p.default.as_ref(),
      Self::Const(p) => p.default.as_ref(),
      Self::Union(p) => p.default.as_ref(),
      Self::Enum(p) => p.default.as_ref(),
      Self::List(_) | Self::Model(_) | Self::Reference(_) => None,
    }
  }

  /// Replaces the default of kinds that carry one; a no-op for the others.
  pub(crate) fn set_default(&mut self, default: Option<Value>) {
    match self {
      Self::None(p)
      | Self::Any(p)
      | Self::Date(p)
      | Self::DateTime(p)
      | Self::File(p)
      | Self::Uuid(p)
      | Self::Float(p)
      | Self::Int(p)
      | Self::Boolean(p) => p.default = default,
      Self::String(p) => p.default = default,
      Self::Const(p) => p.default = default,
      Self::Union(p) => p.default = default,
      Self::Enum(p) => p.default = default,
      Self::List(_) | Self::Model(_) | Self::Reference(_) => {}
    }
  }

  /// Converts a raw default literal for this property.
  ///
  /// Enum defaults become the key of the matching member. Lists drop their default and models
  /// accept none, so a union takes the first member that converts to a value.
  pub fn convert_default(&self, raw: &serde_json::Value) -> Result<Option<Value>, ValueError> {
    if raw.is_null() {
      return Ok(None);
    }

    match self {
      Self::Enum(p) => {
        let literal = EnumLiteral::from_json(raw);
        p.values
          .iter()
          .find_map(|(key, value)| (Some(value) == literal.as_ref()).then(|| Value::EnumMember(key.clone())))
          .map(Some)
          .ok_or_else(|| ValueError::Invalid {
            kind: PropertyKind::Enum,
            value: raw.to_string(),
          })
      }
      Self::Const(p) => {
        if Value::from_literal(raw) == p.value {
          Ok(Some(p.value.clone()))
        } else {
          Err(ValueError::Invalid {
            kind: PropertyKind::Const,
            value: raw.to_string(),
          })
        }
      }
      Self::Union(p) => p
        .inner
        .iter()
        .find_map(|member| member.convert_default(raw).ok().flatten())
        .map(Some)
        .ok_or_else(|| ValueError::Invalid {
          kind: PropertyKind::Union,
          value: raw.to_string(),
        }),
      Self::List(_) => Ok(None),
      Self::Model(_) => Err(ValueError::Unsupported {
        kind: PropertyKind::Model,
      }),
      Self::Reference(_) => Err(ValueError::Unsupported {
        kind: PropertyKind::Reference,
      }),
      _ => value::convert(self.kind(), raw),
    }
  }

  /// Class handle of a model or enum property.
  pub fn class(&self) -> Option<&Class> {
    match self {
      Self::Model(p) => Some(&p.class),
      Self::Enum(p) => Some(&p.class),
      _ => None,
    }
  }

  /// True while this property, or anything it owns, still holds an unresolved reference.
  pub fn has_pending(&self) -> bool {
    match self {
      Self::Reference(_) => true,
      Self::List(list) => list.inner.has_pending(),
      Self::Union(union) => {
        union.inner.iter().any(Self::has_pending)
          || union
            .discriminators
            .iter()
            .flat_map(|d| d.mapping.values())
            .any(|target| matches!(target, ClassRef::Pending(_)))
      }
      _ => false,
    }
  }

  /// Classes named directly by this property, without following model definitions.
  pub fn direct_classes(&self) -> BTreeSet<Class> {
    let mut classes = BTreeSet::new();
    self.collect_direct_classes(&mut classes);
    classes
  }

  fn collect_direct_classes(&self, classes: &mut BTreeSet<Class>) {
    match self {
      Self::Model(p) => {
        classes.insert(p.class.clone());
      }
      Self::Enum(p) => {
        classes.insert(p.class.clone());
      }
      Self::List(p) => p.inner.collect_direct_classes(classes),
      Self::Union(p) => {
        for inner in &p.inner {
          inner.collect_direct_classes(classes);
        }
        classes.extend(
          p.discriminators
            .iter()
            .flat_map(|d| d.mapping.values())
            .filter_map(ClassRef::class)
            .cloned(),
        );
      }
      _ => {}
    }
  }

  /// Every class reachable from this property, following model definitions in `schemas`.
  ///
  /// # Panics
  /// When a pending reference is reached; callers must only read fully resolved trees.
  pub fn referenced_classes(&self, schemas: &Schemas) -> BTreeSet<Class> {
    assert!(!self.has_pending(), "pending reference read in property {}", self.name());

    let mut seen = BTreeSet::new();
    let mut stack: Vec<Class> = self.direct_classes().into_iter().collect();
    while let Some(class) = stack.pop() {
      if !seen.insert(class.clone()) {
        continue;
      }
      if let Some(model) = schemas.model(&class) {
        for property in model.owned_properties() {
          assert!(!property.has_pending(), "pending reference read in model {class}");
          stack.extend(property.direct_classes().into_iter().filter(|c| !seen.contains(c)));
        }
      }
    }
    seen
  }

  /// Emitter-neutral type expression, e.g. `list[Pet] | null`.
  ///
  /// # Panics
  /// When a pending reference is reached.
  pub fn type_string(&self) -> String {
    let base = match self {
      Self::None(_) => "null".to_string(),
      Self::Any(_) => "any".to_string(),
      Self::String(_) => "string".to_string(),
      Self::Date(_) => "date".to_string(),
      Self::DateTime(_) => "date-time".to_string(),
      Self::File(_) => "file".to_string(),
      Self::Uuid(_) => "uuid".to_string(),
      Self::Float(_) => "number".to_string(),
      Self::Int(_) => "integer".to_string(),
      Self::Boolean(_) => "boolean".to_string(),
      Self::Const(p) => format!("const({})", p.value),
      Self::List(p) => format!("list[{}]", p.inner.type_string()),
      Self::Union(p) => p.inner.iter().map(Self::type_string).unique().join(" | "),
      Self::Enum(p) => p.class.name.clone(),
      Self::Model(p) => p.class.name.clone(),
      Self::Reference(p) => panic!("pending reference to {} read before resolution", p.target),
    };

    if self.is_nullable() && !matches!(self, Self::Union(_) | Self::None(_)) {
      format!("{base} | null")
    } else {
      base
    }
  }
}
