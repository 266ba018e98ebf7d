use thiserror::Error;

use crate::ElementId;

// -----------------------------------------------------------------------------
// ElementError

/// Failure of a naming operation on an [`ElementManager`](crate::ElementManager).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ElementError {
    #[error("an element named `{0}` already exists")]
    NameTaken(String),

    #[error("element names must not be empty")]
    EmptyName,

    #[error("unknown element {0:?}")]
    Unknown(ElementId),
}
