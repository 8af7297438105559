use thiserror::Error;

/// Main error type for definition decoding, building, and validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DefinitionError {
    /// JSON serialization/deserialization errors
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// I/O errors (file reading, etc.)
    #[error("IO error: {0}")]
    Io(String),

    /// StartAt names a state that does not exist, or is missing entirely
    #[error("Invalid StartAt value: {0}")]
    InvalidStartAt(String),

    /// A transition targets a state name that does not exist
    #[error("Unknown state name: {0}")]
    UnknownStateName(String),

    /// A state carries a Type tag this library does not recognize
    #[error("Unknown state type: {0}")]
    UnknownStateType(String),

    /// A non-terminal state has neither Next nor End
    #[error("Next state is blank for state: {0}")]
    BlankNext(String),

    /// Two states were placed under the same name
    #[error("Duplicate state name: {0}")]
    DuplicateStateName(String),

    /// Malformed intrinsic format expression
    #[error("Format expression error: {0}")]
    Format(String),
}

impl DefinitionError {
    /// Convert from std::io::Error
    pub fn from_io(err: std::io::Error) -> Self {
        DefinitionError::Io(err.to_string())
    }

    /// Convert from serde_json::Error
    pub fn from_serde(err: serde_json::Error) -> Self {
        DefinitionError::Deserialization(err.to_string())
    }
}

/// Type alias for Result with DefinitionError
pub type Result<T> = std::result::Result<T, DefinitionError>;
