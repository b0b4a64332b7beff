use crate::types::DbId;

/// Failures raised by validation and lookups. The engine itself never
/// fails; malformed monetary data is normalized instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Rejected input: bad enum value, pairing rule, cycle, formula.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate of something that must be unique, such as a `line_code`.
    #[error("Conflict: {0}")]
    Conflict(String),
}
