//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, static fallback)
//!     → request.rs (request ID, `url` parameter)
//!     → proxy.rs (validate → fetch → dispatch)
//!     → response.rs (rewrite or stream, filter headers)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::{dispatch, BodyKind};
pub use server::{AppState, HttpServer};
