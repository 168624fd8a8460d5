//! Query executor - opens the scoped transaction and binds the identifier

use crate::catalog::QueryTemplate;
use crate::projection::EntityProjection;
use crate::validate::ValidatedValue;
use rglookup_core::{Error, Result};
use rglookup_graph::{GraphStore, Query, RowCursor};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

pub struct QueryExecutor {
    store: Arc<dyn GraphStore>,
    query_timeout: Duration,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn GraphStore>, query_timeout: Duration) -> Self {
        Self {
            store,
            query_timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Open a transaction and start `template` with `value` bound as its parameter.
    ///
    /// The returned cursor owns the transaction. If the store fails or the
    /// deadline passes, whatever transaction was opened is dropped, and so
    /// released, before the error is returned.
    pub async fn execute(&self, template: &QueryTemplate, value: ValidatedValue) -> Result<LookupCursor> {
        let query = Query::new(template.pattern).param(template.parameter_name, value.into_inner());

        let started = timeout(self.query_timeout, async {
            let tx = self.store.begin().await?;
            tx.execute(query).await
        })
        .await;

        match started {
            Ok(Ok(rows)) => {
                debug!(entity = %template.entity, "query started");
                Ok(LookupCursor {
                    rows,
                    template: *template,
                    fetch_timeout: self.query_timeout,
                    rows_read: 0,
                })
            }
            Ok(Err(e)) => {
                warn!(entity = %template.entity, "query failed: {}", e);
                Err(Error::QueryExecution(e.to_string()))
            }
            Err(_) => Err(Error::timeout("query", self.query_timeout)),
        }
    }
}

/// Lazily projects store rows. Dropping it releases the transaction.
pub struct LookupCursor {
    rows: Box<dyn RowCursor>,
    template: QueryTemplate,
    fetch_timeout: Duration,
    rows_read: usize,
}

impl LookupCursor {
    /// Fetch and project the next row.
    pub async fn next(&mut self) -> Result<Option<EntityProjection>> {
        let row = match timeout(self.fetch_timeout, self.rows.next_row()).await {
            Ok(Ok(Some(row))) => row,
            Ok(Ok(None)) => return Ok(None),
            Ok(Err(e)) => return Err(Error::QueryExecution(e.to_string())),
            Err(_) => return Err(Error::timeout("row fetch", self.fetch_timeout)),
        };
        self.rows_read += 1;

        let node = row.take(self.template.column).ok_or_else(|| {
            Error::QueryExecution(format!("row has no column `{}`", self.template.column))
        })?;
        EntityProjection::from_node(&node, self.template.identifier_field()).map(Some)
    }

    /// Commit and release the transaction.
    pub async fn close(self) -> Result<()> {
        debug!(entity = %self.template.entity, rows = self.rows_read, "closing cursor");
        self.rows
            .close()
            .await
            .map_err(|e| Error::QueryExecution(e.to_string()))
    }
}
