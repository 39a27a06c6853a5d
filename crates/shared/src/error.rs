use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input rejected before anything is dispatched to the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("search query must not be empty")]
    EmptyQuery,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("malformed email address: {0}")]
    InvalidEmail(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// Optional JSON body attached to non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
