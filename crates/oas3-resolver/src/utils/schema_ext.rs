use oas3::spec::{ObjectOrReference, ObjectSchema, SchemaType, SchemaTypeSet};

/// Extension methods for `ObjectSchema` to query its type properties conveniently.
pub(crate) trait SchemaExt {
  /// All declared types, in declaration order.
  fn type_list(&self) -> Vec<SchemaType>;

  /// Returns the single `SchemaType` if exactly one is defined, None otherwise.
  fn single_type(&self) -> Option<SchemaType>;

  /// Returns true if the schema is explicitly null type.
  fn is_null(&self) -> bool;

  /// Returns true if the schema declares more than one type.
  fn has_type_list(&self) -> bool;

  /// Returns true if the schema has inline oneOf or anyOf variants.
  fn has_union(&self) -> bool;

  /// Yields `anyOf` members followed by `oneOf` members, tagged with their keyword and position.
  fn union_members(&self) -> impl Iterator<Item = (&'static str, usize, &ObjectOrReference<ObjectSchema>)>;

  /// Returns true if the schema carries object structure (properties, allOf or additionalProperties).
  fn is_model_like(&self) -> bool;

  /// Returns the lone `$ref` of a schema that is nothing but `allOf: [{$ref}]`.
  fn single_all_of_ref(&self) -> Option<&ObjectOrReference<ObjectSchema>>;
}

impl SchemaExt for ObjectSchema {
  fn type_list(&self) -> Vec<SchemaType> {
    match &self.schema_type {
      Some(SchemaTypeSet::Single(t)) => vec![*t],
      Some(SchemaTypeSet::Multiple(types)) => types.clone(),
      None => vec![],
    }
  }

  fn single_type(&self) -> Option<SchemaType> {
    match self.type_list().as_slice() {
      [t] => Some(*t),
      _ => None,
    }
  }

  fn is_null(&self) -> bool {
    self.single_type() == Some(SchemaType::Null)
  }

  fn has_type_list(&self) -> bool {
    self.type_list().len() > 1
  }

  fn has_union(&self) -> bool {
    !self.any_of.is_empty() || !self.one_of.is_empty()
  }

  fn union_members(&self) -> impl Iterator<Item = (&'static str, usize, &ObjectOrReference<ObjectSchema>)> {
    let any_of = self.any_of.iter().enumerate().map(|(i, member)| ("anyOf", i, member));
    let one_of = self.one_of.iter().enumerate().map(|(i, member)| ("oneOf", i, member));
    any_of.chain(one_of)
  }

  fn is_model_like(&self) -> bool {
    !self.properties.is_empty() || !self.all_of.is_empty() || self.additional_properties.is_some()
  }

  fn single_all_of_ref(&self) -> Option<&ObjectOrReference<ObjectSchema>> {
    let [member @ ObjectOrReference::Ref { .. }] = self.all_of.as_slice() else {
      return None;
    };
    let object_or_untyped = matches!(self.single_type(), None | Some(SchemaType::Object)) && !self.has_type_list();
    let bare = self.properties.is_empty()
      && self.additional_properties.is_none()
      && !self.has_union()
      && self.enum_values.is_empty()
      && self.const_value.is_none()
      && self.discriminator.is_none();
    (object_or_untyped && bare).then_some(member)
  }
}
