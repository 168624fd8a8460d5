//! Lookup service - runs one request through validate, resolve, execute
//!
//! `prepare` stops before any byte is written, so every failure it reports can
//! still become a clean error response. The returned [`PreparedLookup`] owns
//! the open transaction and is consumed by one of the streaming drivers.

use crate::catalog::{QueryCatalog, QueryTemplate};
use crate::executor::{LookupCursor, QueryExecutor};
use crate::serializer;
use crate::validate::IdentifierValidator;
use bytes::Bytes;
use futures::Stream;
use rglookup_core::{Error, LimitsConfig, LookupRequest, Result};
use rglookup_graph::GraphStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tracing::{debug, info, info_span, Instrument};

pub struct LookupService {
    catalog: Arc<QueryCatalog>,
    validator: IdentifierValidator,
    executor: QueryExecutor,
    write_timeout: Duration,
}

impl LookupService {
    pub fn new(store: Arc<dyn GraphStore>, catalog: Arc<QueryCatalog>, limits: &LimitsConfig) -> Self {
        Self {
            catalog,
            validator: IdentifierValidator::new(limits.max_identifier_len),
            executor: QueryExecutor::new(store, limits.query_timeout()),
            write_timeout: limits.write_timeout(),
        }
    }

    pub fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        self.executor.store()
    }

    /// Validate, resolve and start the query. No transaction is opened unless
    /// the identifier is valid and the catalog has a template for the pair.
    pub async fn prepare(&self, request: &LookupRequest) -> Result<PreparedLookup> {
        let span = info_span!(
            "lookup",
            id = %request.id,
            entity = %request.entity,
            identifier = %request.identifier
        );
        async {
            debug!("validating");
            let value = self.validator.validate(request.identifier, &request.raw_value)?;

            debug!("resolving");
            let template = self
                .catalog
                .resolve(request.entity, request.identifier)
                .ok_or_else(|| {
                    Error::not_found_kind(request.entity.label(), request.identifier.property())
                })?;

            debug!("executing");
            let cursor = self.executor.execute(template, value).await?;
            info!(field = template.result_field, "streaming");
            Ok::<_, Error>(PreparedLookup {
                template: *template,
                cursor,
                write_timeout: self.write_timeout,
            })
        }
        .instrument(span)
        .await
    }

    /// Prepare and write the whole response into `sink`.
    pub async fn lookup<W>(&self, request: &LookupRequest, sink: &mut W) -> Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        self.prepare(request).await?.write_to(sink).await
    }
}

/// A started lookup holding its transaction, ready to stream.
pub struct PreparedLookup {
    template: QueryTemplate,
    cursor: LookupCursor,
    write_timeout: Duration,
}

impl PreparedLookup {
    pub fn field(&self) -> &'static str {
        self.template.result_field
    }

    pub async fn write_to<W>(self, sink: &mut W) -> Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        serializer::serialize(self.template.result_field, self.cursor, sink, self.write_timeout).await
    }

    /// Chunked HTTP body. Must be called inside a tokio runtime.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
        serializer::body_stream(self.template.result_field, self.cursor, self.write_timeout)
    }
}
