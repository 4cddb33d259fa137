//! URL route segment to entity key mapping.

use common::EntityKind;

/// Map a URL route segment (e.g. `"it-staffs"`) to the singular entity
/// key the authorization gate works with (e.g. `"it_staff"`). Unrecognized
/// segments pass through unchanged so downstream checks can reject them by
/// name.
pub fn convert_route_to_entity(route: &str) -> String {
    match EntityKind::from_route(route) {
        Some(kind) => kind.key().to_string(),
        None => route.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_routes_map_to_entity_keys() {
        assert_eq!(convert_route_to_entity("it-staffs"), "it_staff");
        assert_eq!(convert_route_to_entity("schools"), "school");
        assert_eq!(convert_route_to_entity("students"), "student");
        assert_eq!(convert_route_to_entity("teachers"), "teacher");
        assert_eq!(convert_route_to_entity("users"), "user");
    }

    #[test]
    fn unknown_routes_pass_through() {
        assert_eq!(convert_route_to_entity("invoices"), "invoices");
        assert_eq!(convert_route_to_entity(""), "");
        // Singular forms are not routes and fall through unchanged.
        assert_eq!(convert_route_to_entity("student"), "student");
    }

    #[test]
    fn mapping_is_stable_under_repetition() {
        for kind in EntityKind::ALL {
            let key = convert_route_to_entity(kind.route());
            assert_eq!(convert_route_to_entity(&key), key);
        }
    }
}
