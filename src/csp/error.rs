use thiserror::Error;

use crate::Id;

/// Errors raised while building or solving the scheduling CSP.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CspError {
    #[error("event {0} is already a variable of this problem")]
    DuplicateEvent(Id),

    #[error("event {0} is not a variable of this problem")]
    UnknownEvent(Id),

    #[error("schedule is infeasible: the domain of event {0} became empty")]
    EmptyDomain(Id),

    #[error("schedule is infeasible: backtracking exhausted every assignment")]
    Exhausted,
}
