use std::time::Duration;

/// Errors returned by this crate.
///
/// Errors raised by the server are passed through as [`Error::Status`]. The remaining variants are
/// raised locally; use [`Error::class()`] to decide whether an operation may be reissued.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("spanner client error: {0}")]
    Client(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("codec error: {0}")]
    Codec(String),

    #[error("transport error: {0}")]
    TransportError(#[from] tonic::transport::Error),

    #[error("unexpected gRPC status: {0}")]
    Status(#[from] tonic::Status),

    #[error("no response received within {0:?}")]
    Timeout(Duration),

    /// The transaction was not started by its first statement and must be restarted with an explicit begin.
    #[error("failed to begin transaction inline, retry with an explicit begin transaction")]
    InlineBeginTransactionFailed,

    /// A DML statement succeeded but its result set carries no statistics.
    #[error("statement did not return result statistics, is it a query? {sql:?}")]
    MissingResultStatistics { sql: String },

    #[error("transaction protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("invalid transaction state: {0}")]
    InvalidState(String),
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        Error::Config(value.to_string())
    }
}

/// Coarse classification of an [`Error`] for retry policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The operation may succeed if reissued.
    Transient,
    /// Reissuing the same operation will fail the same way.
    Permanent,
    Other,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Status(status) => match status.code() {
                tonic::Code::Unavailable
                | tonic::Code::Aborted
                | tonic::Code::ResourceExhausted
                | tonic::Code::DeadlineExceeded => ErrorClass::Transient,
                tonic::Code::InvalidArgument
                | tonic::Code::NotFound
                | tonic::Code::AlreadyExists
                | tonic::Code::PermissionDenied
                | tonic::Code::Unauthenticated
                | tonic::Code::FailedPrecondition
                | tonic::Code::OutOfRange
                | tonic::Code::Unimplemented => ErrorClass::Permanent,
                _ => ErrorClass::Other,
            },
            Error::Timeout(_) | Error::TransportError(_) => ErrorClass::Transient,
            Error::InlineBeginTransactionFailed => ErrorClass::Transient,
            Error::MissingResultStatistics { .. }
            | Error::ProtocolViolation(_)
            | Error::InvalidState(_)
            | Error::Codec(_)
            | Error::Config(_) => ErrorClass::Permanent,
            Error::Client(_) => ErrorClass::Other,
        }
    }

    /// Returns true when the operation should be reissued in a transaction started with an explicit begin.
    pub fn is_inline_begin_failure(&self) -> bool {
        matches!(self, Error::InlineBeginTransactionFailed)
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}
