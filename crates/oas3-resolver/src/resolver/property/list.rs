use oas3::spec::{ObjectSchema, Schema};

use super::{ListProperty, Property, PropertyMeta, ScalarProperty};
use crate::resolver::{
  builder::{PropertyBuilder, Site},
  errors::PropertyError,
  schemas::Schemas,
};

impl PropertyBuilder<'_> {
  /// Builds an array property; the item is always required and any default is dropped.
  pub(crate) fn build_list(
    &self,
    schema: &ObjectSchema,
    site: &Site,
    schemas: &mut Schemas,
  ) -> Result<Property, PropertyError> {
    let item_name = format!("{}_item", site.name);

    let inner = match schema.items.as_deref() {
      None => {
        return Err(PropertyError::new(format!("Array {} has no items schema", site.name)));
      }
      Some(Schema::Boolean(allowed)) if !allowed.0 => {
        return Err(PropertyError::new(format!("Array {} does not allow any items", site.name)));
      }
      Some(Schema::Boolean(_)) => Property::Any(ScalarProperty {
        meta: PropertyMeta::new(&item_name, true),
        default: None,
      }),
      Some(Schema::Object(items)) => {
        let item_site = site.sibling_child(item_name, true, "items");
        self
          .build(items, &item_site, schemas)
          .map_err(|e| e.wrap(format!("invalid data in items of array {}", site.name)))?
      }
    };

    Ok(Property::List(ListProperty {
      meta: Self::meta(site, schema),
      inner: Box::new(inner),
    }))
  }
}
