use thiserror::Error;

use crate::interval::WindowError;

/// Errors raised by task construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("task title must not be empty")]
    EmptyTitle,

    #[error(transparent)]
    Window(#[from] WindowError),
}

/// Error raised when an event priority weight falls outside `[0, 25]`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeightError {
    #[error("priority weight {value} is outside the allowed range 0..=25")]
    OutOfRange { value: f64 },
}
