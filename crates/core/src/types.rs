/// All entity identifiers are opaque strings (UUID v4, generated server-side).
pub type Id = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh opaque identifier.
pub fn new_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
