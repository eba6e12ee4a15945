//! Directory error taxonomy
//!
//! Four categories with distinct handling at the service boundary:
//! connection failures are fatal to the calling operation and never
//! auto-retried; not-found means a name failed to resolve to a directory
//! object (a missing resource, not a protocol failure); mutation errors
//! carry the server's diagnostic text verbatim; decode errors surface only
//! from strict single-entity decoding, while bulk paths downgrade them to
//! logged warnings.

use thiserror::Error;

/// The kind of directory object a lookup was asked to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    User,
    Computer,
    Group,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ObjectKind::User => "user",
            ObjectKind::Computer => "computer",
            ObjectKind::Group => "group",
        };
        write!(f, "{s}")
    }
}

/// A single attribute failed to decode into its typed form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to decode attribute '{attribute}': {reason}")]
pub struct DecodeError {
    /// The attribute that failed.
    pub attribute: String,
    /// What went wrong.
    pub reason: String,
}

impl DecodeError {
    /// A required attribute was absent from the entry.
    pub fn missing(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            reason: "required attribute is missing".to_string(),
        }
    }

    /// The attribute was present but malformed.
    pub fn invalid(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Session establishment or authentication failed.
    #[error("directory connection failed: {0}")]
    Connection(String),

    /// A name did not resolve to a directory object.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What kind of object was looked up.
        kind: ObjectKind,
        /// The name that failed to resolve.
        name: String,
    },

    /// A protocol add/modify/delete/rename reported failure.
    ///
    /// The string is the server's own diagnostic text, passed through
    /// verbatim so operators see what the directory actually said.
    #[error("directory mutation failed: {0}")]
    Mutation(String),

    /// Strict decoding of a single entity failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl DirectoryError {
    /// Convenience constructor for a not-found condition.
    pub fn not_found(kind: ObjectKind, name: impl Into<String>) -> Self {
        DirectoryError::NotFound {
            kind,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = DirectoryError::not_found(ObjectKind::Group, "Engineers");
        assert_eq!(err.to_string(), "group not found: Engineers");
    }

    #[test]
    fn test_mutation_carries_server_text() {
        let err = DirectoryError::Mutation("entryAlreadyExists (68)".to_string());
        assert!(err.to_string().contains("entryAlreadyExists"));
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::invalid("pwdLastSet", "not an integer");
        assert_eq!(
            err.to_string(),
            "failed to decode attribute 'pwdLastSet': not an integer"
        );
    }

    #[test]
    fn test_decode_error_into_directory_error() {
        let err: DirectoryError = DecodeError::missing("sAMAccountName").into();
        assert!(matches!(err, DirectoryError::Decode(_)));
    }
}
