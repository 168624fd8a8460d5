//! Graph store seam
//!
//! A store hands out transactions; executing a query moves the transaction
//! into the returned cursor, so the cursor is the only owner of the unit of
//! work. Implementations must release the transaction exactly once: on
//! [`RowCursor::close`], or on drop when the cursor is abandoned.

use crate::node::Row;
use crate::query::Query;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("missing parameter: ${0}")]
    MissingParameter(String),

    #[error("invalid parameter ${name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait::async_trait]
pub trait GraphStore: Send + Sync {
    /// Open a read transaction.
    async fn begin(&self) -> StoreResult<Box<dyn Transaction>>;

    /// Currently open transactions, if the store tracks them.
    fn open_transactions(&self) -> Option<usize> {
        None
    }
}

#[async_trait::async_trait]
pub trait Transaction: Send {
    /// Run `query`, handing the transaction over to the cursor.
    /// On error the transaction is released before this returns.
    async fn execute(self: Box<Self>, query: Query) -> StoreResult<Box<dyn RowCursor>>;
}

/// Forward-only, single-pass row cursor that owns its transaction.
#[async_trait::async_trait]
pub trait RowCursor: Send {
    /// Fetch the next row, or `None` when exhausted.
    async fn next_row(&mut self) -> StoreResult<Option<Row>>;

    /// Commit and release the transaction.
    async fn close(self: Box<Self>) -> StoreResult<()>;
}
