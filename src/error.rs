//! Error types for session definitions.

use thiserror::Error;

/// A session definition that breaks the aggregation preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("Session definition has no id")]
    EmptySessionId,

    #[error("Duplicate card id in session definition: {0}")]
    DuplicateCardId(String),

    #[error("Duplicate category id in session definition: {0}")]
    DuplicateCategoryId(String),
}
