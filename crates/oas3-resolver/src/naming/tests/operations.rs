use crate::naming::operations::{compute_stable_id, generate_operation_id};

#[test]
fn test_generated_ids_replace_templates() {
  assert_eq!(generate_operation_id("GET", "/pets/{petId}"), "get_pets_by_id");
  assert_eq!(generate_operation_id("post", "/store/order"), "post_store_order");
  assert_eq!(generate_operation_id("DELETE", "/"), "delete");
}

#[test]
fn test_stable_id_prefers_operation_id() {
  assert_eq!(compute_stable_id("get", "/pets", Some("listPets")), "list_pets");
  assert_eq!(compute_stable_id("get", "/pets/{id}/toys", None), "get_pets_by_id_toys");
}
