use thiserror::Error;

use crate::csp::CspError;
use crate::model::WeightError;
use crate::tree::TreeError;
use crate::Id;

/// Errors surfaced by the calendar API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalendarError {
    #[error(transparent)]
    Weight(#[from] WeightError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Infeasible(#[from] CspError),

    #[error("no event with id {0}")]
    EventNotFound(Id),

    #[error("no event titled {0:?}")]
    TitleNotFound(String),
}
