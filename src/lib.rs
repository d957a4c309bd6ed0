//! Development server for a single-page WebAssembly application.
//!
//! Every request path is classified by an ordered list of rewrite rules:
//! asset files are served (possibly re-rooted to their basename), and
//! everything else falls back to the application shell so the client-side
//! router can take over.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::DevServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Resolution, Resolver};
