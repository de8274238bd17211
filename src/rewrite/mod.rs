//! Reference rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! client `url` parameter
//!     → url.rs (validate_target: http(s) only)
//!
//! fetched HTML + RewriteContext (final URL, proxy prefix)
//!     → html.rs (lol_html selectors per attribute)
//!         → url.rs (resolve, proxy_url)
//!         → srcset.rs (candidate lists)
//!         → refresh.rs (meta refresh directives)
//!     → rewritten markup with provenance banner
//! ```

pub mod html;
pub mod refresh;
pub mod srcset;
pub mod url;

pub use self::html::{rewrite_html, RewriteOptions};
pub use self::url::{proxy_url, resolve, validate_target, RewriteContext};
