//! Rewriting web proxy library.
//!
//! Fetches a target page on behalf of a client and re-serves it from the
//! proxy's own origin, rewriting embedded references so navigation keeps
//! flowing back through the proxy.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod security;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
