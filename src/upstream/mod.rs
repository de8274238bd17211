//! Upstream fetch subsystem.
//!
//! # Data Flow
//! ```text
//! validated target URL + client headers
//!     → policy.rs (allow-listed headers, defaults filled in)
//!     → fetcher.rs (GET, redirects followed, transport errors collapsed)
//!     → response.rs (status, headers, final URL, Html | Raw body)
//! ```

pub mod fetcher;
pub mod policy;
pub mod response;

pub use fetcher::Fetcher;
pub use policy::ForwardHeaderPolicy;
pub use response::{is_html, ByteStream, UpstreamBody, UpstreamParts, UpstreamResponse};
