//! Result and error types for engine-internal failures.

/// The result type for fallible internal operations.
///
/// `Err` signals a broken engine invariant (a bug in Kairos), never a problem
/// with the caller's graph or constraints. Data problems are reported through
/// the diagnostics sink and the operation still returns `Ok`.
pub type KairosResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the timing engine.
#[derive(Debug, thiserror::Error)]
#[error("internal timing engine error: {message}")]
pub struct InternalError {
    /// What went wrong.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
