//! rglookup pipeline - identifier validation, query catalog, execution and streaming serialization
//!
//! A lookup runs validate -> resolve -> execute -> stream. The cursor returned
//! by execution owns the store transaction; serialization drains it one row at
//! a time and releases it once the closing bracket has been written.

pub mod catalog;
pub mod executor;
pub mod projection;
pub mod serializer;
pub mod service;
pub mod validate;

pub use catalog::{MatchMode, QueryCatalog, QueryTemplate};
pub use executor::{LookupCursor, QueryExecutor};
pub use projection::EntityProjection;
pub use serializer::{body_stream, serialize, JsonArrayEncoder};
pub use service::{LookupService, PreparedLookup};
pub use validate::{validate, IdentifierValidator, ValidatedValue};
