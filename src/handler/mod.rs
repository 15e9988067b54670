//! Request handler module
//!
//! Responsible for turning a located request into exactly one outcome:
//! candidate lookup, the resolution cascade and static transmission.

pub mod candidates;
pub mod cascade;
pub mod context;
mod outcome;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use context::{Inbound, RequestContext};
pub use outcome::{ErrorDetails, Outcome};
pub use router::{handle_request, respond};
