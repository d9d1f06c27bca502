use std::fmt::Display;

use uuid::Uuid;

/// Returns the cache key for an entity addressed by one of its fields.
///
/// Keys have the form `<entity>:<field>:<value>`.
pub fn entity_key(entity: &str, field: &str, value: impl Display) -> String {
    format!("{}:{}:{}", entity, field, value)
}

/// Returns the cache key for an entity addressed by its ID.
pub fn id_key(entity: &str, id: Uuid) -> String {
    entity_key(entity, "id", id)
}

/// Returns the cache key for a user addressed by ID.
pub fn user_id_key(user_id: Uuid) -> String {
    id_key("user", user_id)
}

/// Returns the cache key for a user addressed by email.
pub fn user_email_key(email: &str) -> String {
    entity_key("user", "email", email)
}
