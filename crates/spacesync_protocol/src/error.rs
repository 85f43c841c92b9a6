//! Error types for protocol decoding.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while interpreting protocol payloads.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The mutation name is not in the registered set.
    #[error("unknown mutation: {name}")]
    UnknownMutation {
        /// The unrecognized mutation name.
        name: String,
    },

    /// The mutation arguments do not match the kind's expected shape.
    #[error("invalid arguments for mutation {name}: {message}")]
    InvalidArgs {
        /// The mutation kind whose arguments failed validation.
        name: String,
        /// Description of the decoding failure.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProtocolError::UnknownMutation {
            name: "renameMessage".into(),
        };
        assert_eq!(err.to_string(), "unknown mutation: renameMessage");

        let err = ProtocolError::InvalidArgs {
            name: "createMessage".into(),
            message: "missing field `content`".into(),
        };
        assert!(err.to_string().contains("createMessage"));
        assert!(err.to_string().contains("content"));
    }
}
