use thiserror::Error;

use crate::interval::TimeInterval;
use crate::Id;

/// Errors raised by time-tree operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("task {title:?} is not temporal and cannot be indexed by time")]
    NotTemporal { title: String },

    #[error("no node with key {key} in the tree")]
    KeyNotFound { key: TimeInterval },

    #[error("event {event} is not present under its candidate keys")]
    EventNotFound { event: Id },

    #[error("event index {index} out of range for a node holding {len} events")]
    IndexOutOfRange { index: usize, len: usize },
}
