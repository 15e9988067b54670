//! Routing module
//!
//! Provides project-level routing:
//! - Single-project and multi-tenant project location
//! - The private-path predicate shared by the locator and the cascade

mod ignore;
mod locator;

pub use ignore::should_ignore;
pub use locator::{project_entries, Location, ProjectLocator, ProjectPath};
