//! AccessorError for row field resolution

/// Error produced while resolving an accessor against a row.
///
/// The view pipeline never propagates this: a failing accessor reads as "no
/// value" for that row. Derivation accessors return it to say why.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccessorError {
    /// The requested field does not exist in the row.
    #[error("Field '{field}' not found in row")]
    Missing { field: String },

    /// The field exists but has a different type than requested.
    #[error("Field '{field}' type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A derivation function could not produce a value.
    #[error("Derivation failed: {0}")]
    Derive(String),
}

impl AccessorError {
    /// Creates a new missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    /// Creates a new type mismatch error.
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Creates a new derivation error.
    pub fn derive(message: impl Into<String>) -> Self {
        Self::Derive(message.into())
    }
}
