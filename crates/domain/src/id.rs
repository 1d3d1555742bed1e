//! ID generation utilities.

use uuid::Uuid;

/// Generates a new random request identifier (UUID v4).
///
/// Used as the correlation id of every query request. A fresh id is
/// generated per resolution attempt and never reused.
#[must_use]
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
