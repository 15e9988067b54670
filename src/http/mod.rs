//! HTTP protocol layer module
//!
//! Media types, basic auth and response finalization. Nothing in here knows
//! how an outcome was resolved.

pub mod auth;
pub mod mime;
pub mod response;

// Re-export commonly used functions
pub use response::{build_401_response, finalize};
