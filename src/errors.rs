use thiserror::Error; // Import the `Error` derive macro from the `thiserror` crate

// Errors surfaced by the templater. Placeholder-level failures never reach the
// caller of `parse`; only configuration problems do.
#[derive(Debug, Error)]
pub enum EvalError {
    // Opener/closer pair that cannot be used for matching
    #[error("delimiter error: {0}")]
    Delimiter(String),

    // Malformed condition or option text
    #[error("parse error: {0}")]
    Parse(String),

    // Raised by a function body; the dispatcher catches it
    #[error("runtime error: {0}")]
    Runtime(String),
}

// Type alias for results that use `EvalError` as the error type
pub type Result<T> = std::result::Result<T, EvalError>;
