use serde::{Deserialize, Serialize};
use std::fmt;

/// The five entity types the application administers.
///
/// Each entity has a singular internal key (used by the authorization gate
/// and the API layer) and a plural, hyphenated route segment (used in URLs
/// and the REST surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    School,
    Student,
    Teacher,
    ItStaff,
    User,
}

impl EntityKind {
    /// All entity kinds, in display order.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::School,
        EntityKind::Student,
        EntityKind::Teacher,
        EntityKind::ItStaff,
        EntityKind::User,
    ];

    /// The singular internal entity key, e.g. `"it_staff"`.
    pub fn key(&self) -> &'static str {
        match self {
            EntityKind::School => "school",
            EntityKind::Student => "student",
            EntityKind::Teacher => "teacher",
            EntityKind::ItStaff => "it_staff",
            EntityKind::User => "user",
        }
    }

    /// The plural hyphenated URL route segment, e.g. `"it-staffs"`.
    pub fn route(&self) -> &'static str {
        match self {
            EntityKind::School => "schools",
            EntityKind::Student => "students",
            EntityKind::Teacher => "teachers",
            EntityKind::ItStaff => "it-staffs",
            EntityKind::User => "users",
        }
    }

    /// Look up an entity kind by its route segment.
    pub fn from_route(route: &str) -> Option<EntityKind> {
        EntityKind::ALL.iter().copied().find(|k| k.route() == route)
    }

    /// Look up an entity kind by its singular key.
    pub fn from_key(key: &str) -> Option<EntityKind> {
        EntityKind::ALL.iter().copied().find(|k| k.key() == key)
    }

    /// The path of the entity's list view, e.g. `"/students"`.
    pub fn list_path(&self) -> String {
        format!("/{}", self.route())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_and_keys_pair_up() {
        assert_eq!(EntityKind::from_route("it-staffs"), Some(EntityKind::ItStaff));
        assert_eq!(EntityKind::ItStaff.key(), "it_staff");
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_route(kind.route()), Some(kind));
            assert_eq!(EntityKind::from_key(kind.key()), Some(kind));
        }
    }

    #[test]
    fn unknown_route_is_not_an_entity() {
        assert_eq!(EntityKind::from_route("invoices"), None);
        assert_eq!(EntityKind::from_route("student"), None);
    }
}
