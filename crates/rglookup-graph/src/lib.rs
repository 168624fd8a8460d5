//! rglookup graph - the graph store seam and an in-memory reference store
//!
//! The lookup pipeline talks to a store only through [`GraphStore`],
//! [`Transaction`] and [`RowCursor`]. [`MemoryGraph`] implements them over a
//! label-indexed, snapshot-isolated node set.

pub mod memory;
pub mod node;
pub mod query;
pub mod store;
pub mod value;

pub use memory::{MemoryGraph, TxStats};
pub use node::{Node, NodeId, Row};
pub use query::{CompareOp, Matcher, Pattern, Query};
pub use store::{GraphStore, RowCursor, StoreError, StoreResult, Transaction};
pub use value::Value;
