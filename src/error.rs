use thiserror::Error;

use crate::expression::ExpressionError;

/// Error types for the errprop-rs library.
#[derive(Error, Debug)]
pub enum ErrpropError {
    /// The auxiliary uncertainty name of a variable is itself a variable of the expression.
    #[error(
        "cannot propagate uncertainty with both a variable named '{variable}' and a variable named '{auxiliary}'"
    )]
    NameCollision { variable: String, auxiliary: String },

    /// Error raised while parsing, differentiating or evaluating an expression.
    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// A result that was required to be numeric still contains free symbols.
    #[error("Unresolved symbols: {}", symbols.join(", "))]
    Unresolved { symbols: Vec<String> },

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for errprop-rs operations.
pub type Result<T> = std::result::Result<T, ErrpropError>;

/// Extensions for converting from other error types.
impl From<String> for ErrpropError {
    fn from(s: String) -> Self {
        ErrpropError::Other(s)
    }
}

impl From<&str> for ErrpropError {
    fn from(s: &str) -> Self {
        ErrpropError::Other(s.to_string())
    }
}
