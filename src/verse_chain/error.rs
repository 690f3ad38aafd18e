use rusqlite::ErrorCode;
use thiserror::Error;

/// Failure of a verse-chain operation. Every variant carries the name of the
/// operation that raised it.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("{op}: storage unavailable: {source}")]
    StorageUnavailable {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{op}: reference not found: {what}")]
    ReferenceNotFound { op: &'static str, what: String },

    #[error("{op}: invariant violation: {detail}")]
    InvariantViolation { op: &'static str, detail: String },
}

pub type ChainResult<T> = Result<T, ChainError>;

impl ChainError {
    pub fn op(&self) -> &'static str {
        match self {
            ChainError::StorageUnavailable { op, .. }
            | ChainError::ReferenceNotFound { op, .. }
            | ChainError::InvariantViolation { op, .. } => op,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChainError::StorageUnavailable { .. } => "storage_unavailable",
            ChainError::ReferenceNotFound { .. } => "reference_not_found",
            ChainError::InvariantViolation { .. } => "invariant_violation",
        }
    }

    pub(crate) fn not_found(op: &'static str, what: impl Into<String>) -> Self {
        ChainError::ReferenceNotFound {
            op,
            what: what.into(),
        }
    }

    pub(crate) fn violation(op: &'static str, detail: impl Into<String>) -> Self {
        ChainError::InvariantViolation {
            op,
            detail: detail.into(),
        }
    }

    /// Any constraint failure maps to `InvariantViolation`: foreign keys on
    /// `next` and the song anchor, NOT NULL, UNIQUE and trigger aborts alike.
    /// The statement would have left the data inconsistent. Everything else
    /// is infrastructure.
    pub(crate) fn from_sqlite(op: &'static str, source: rusqlite::Error) -> Self {
        match &source {
            rusqlite::Error::SqliteFailure(err, msg)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                ChainError::InvariantViolation {
                    op,
                    detail: msg.clone().unwrap_or_else(|| err.to_string()),
                }
            }
            _ => ChainError::StorageUnavailable { op, source },
        }
    }
}

pub(crate) trait InOp<T> {
    fn in_op(self, op: &'static str) -> ChainResult<T>;
}

impl<T> InOp<T> for rusqlite::Result<T> {
    fn in_op(self, op: &'static str) -> ChainResult<T> {
        self.map_err(|e| ChainError::from_sqlite(op, e))
    }
}
