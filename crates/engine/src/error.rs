//! Engine error types.

use swimhub_core::ParamsError;
use swimhub_storage::StorageError;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors from evaluating a milestone.
///
/// Both variants are recoverable per milestone during a reconciliation
/// pass; they fail only the one milestone they belong to.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// An evidence or milestone storage call failed
    #[error("storage error: {0}")]
    Evidence(#[from] StorageError),

    /// Stored params do not decode against their declared kind
    #[error(transparent)]
    Params(#[from] ParamsError),
}
