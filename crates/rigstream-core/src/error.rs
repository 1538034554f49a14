//! Error types for rigstream

use thiserror::Error;

/// Coarse classification of an error, used by callers to decide whether
/// to retry, fall back to cached data, or surface the failure to a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed frame or socket failure. Non-fatal, drives reconnect.
    Protocol,
    /// Record text could not be decoded. Non-fatal, previous frame reused.
    Decode,
    /// Setup file unreadable or not an expression set. Reported to the caller.
    Schema,
    /// A store mutation would break control/value alignment. Rejected.
    Invariant,
}

/// Core rigstream errors
#[derive(Error, Debug)]
pub enum RigError {
    // Protocol errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Frame body too large: {len} > {max}")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection lost")]
    ConnectionLost,

    // Decode errors
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Unbalanced delimiters in: {0}")]
    UnbalancedDelimiters(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Invalid boolean: {0}")]
    InvalidBool(String),

    #[error("Invalid value arity: {0} components")]
    InvalidArity(usize),

    // Schema errors
    #[error("Bad expression set definition: expected application {expected:?}, found {found:?}")]
    ApplicationMismatch { expected: String, found: String },

    #[error("Bad file content: {0}")]
    BadSetupContent(String),

    #[error("Setup file error: {0}")]
    SetupIo(String),

    // Invariant errors
    #[error("Expression not found: {0}")]
    ExpressionNotFound(String),

    #[error("Invalid control identifier: {0:?}")]
    InvalidControl(String),

    #[error("Control count mismatch in expression {expression:?}: {controls} controls, {values} values")]
    ControlCountMismatch {
        expression: String,
        controls: usize,
        values: usize,
    },
}

impl RigError {
    /// Taxonomy bucket for this error
    pub fn class(&self) -> ErrorClass {
        match self {
            RigError::InvalidWireFormat(_)
            | RigError::BufferTooShort { .. }
            | RigError::FrameTooLarge { .. }
            | RigError::TransportError(_)
            | RigError::ConnectionFailed(_)
            | RigError::ConnectionLost => ErrorClass::Protocol,

            RigError::MalformedRecord(_)
            | RigError::UnbalancedDelimiters(_)
            | RigError::InvalidNumber(_)
            | RigError::InvalidBool(_)
            | RigError::InvalidArity(_) => ErrorClass::Decode,

            RigError::ApplicationMismatch { .. }
            | RigError::BadSetupContent(_)
            | RigError::SetupIo(_) => ErrorClass::Schema,

            RigError::ExpressionNotFound(_)
            | RigError::InvalidControl(_)
            | RigError::ControlCountMismatch { .. } => ErrorClass::Invariant,
        }
    }

    /// Whether the stream can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self.class(), ErrorClass::Protocol | ErrorClass::Decode)
    }
}

/// Result type for rigstream operations
pub type RigResult<T> = Result<T, RigError>;
