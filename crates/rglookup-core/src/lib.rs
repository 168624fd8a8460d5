//! rglookup core - lookup types, configuration, error taxonomy and wire payloads

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub use config::*;
pub use error::{Error, Result};
pub use protocol::*;
pub use types::*;
