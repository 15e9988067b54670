//! siteserve
//!
//! Development server for static sites: maps each request to a compiled
//! page, a static file, a custom error page or a redirect, for a single
//! project or a directory of projects.

pub mod compiler;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod pages;
pub mod routing;
pub mod server;
