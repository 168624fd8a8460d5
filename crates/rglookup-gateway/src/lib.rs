//! rglookup gateway - HTTP surface for identifier lookups

pub mod error;
pub mod server;

pub use error::ApiError;
pub use server::{router, start_gateway, AppState};
