//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream response:
//!     → headers.rs (drop CSP / framing blockers / cookies, strip hop-by-hop)
//!     → Pass to dispatcher
//! ```
//!
//! # Design Decisions
//! - Target validation lives with URL handling (`rewrite::url`); it runs
//!   before any network call
//! - Authentication is left to whatever sits in front of the proxy

pub mod headers;

pub use headers::{filter_response_headers, strip_hop_by_hop};
