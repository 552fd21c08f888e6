//! Identifier generation for pipeline entities
//!
//! All generated identifiers use UUID v7 for time-sortable ordering, so
//! chronological queries over archived events stay cheap. Client-chosen
//! identifiers (`command_id`, `account_id`) are opaque strings and pass
//! through untouched.

use uuid::Uuid;

/// Generate a fresh order identifier.
pub fn new_order_id() -> String {
    Uuid::now_v7().to_string()
}

/// Generate a fresh execution-report identifier.
pub fn new_exec_id() -> String {
    Uuid::now_v7().to_string()
}

/// Generate a fresh order-event identifier.
pub fn new_event_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(new_order_id(), new_order_id());
        assert_ne!(new_exec_id(), new_exec_id());
        assert_ne!(new_event_id(), new_event_id());
    }

    #[test]
    fn test_ids_are_uuids() {
        assert!(Uuid::parse_str(&new_order_id()).is_ok());
        assert!(Uuid::parse_str(&new_event_id()).is_ok());
    }

    #[test]
    fn test_ids_carry_version_7() {
        let id = Uuid::parse_str(&new_exec_id()).unwrap();
        assert_eq!(id.get_version_num(), 7);
    }
}
