//! rglookup - read-only identifier lookup gateway over a research graph
//!
//! Re-exports the pieces needed to embed the gateway or run lookups in-process.

pub use rglookup_core::{
    EntityKind, Error, IdentifierKind, LimitsConfig, LookupConfig, LookupRequest, Result,
};
pub use rglookup_gateway::{router, start_gateway, AppState};
pub use rglookup_graph::{GraphStore, MemoryGraph};
pub use rglookup_pipeline::{LookupService, PreparedLookup, QueryCatalog};
