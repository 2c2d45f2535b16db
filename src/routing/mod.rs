//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     http.controllers  → table.rs    → RouteMap    (key → Arc<dyn Controller>)
//!     customization hook (runs once, may add/remove/replace entries)
//!     http.redirects    → redirect.rs → RedirectMap (key → Redirect)
//!
//! Incoming Request:
//!     path → route_key() → exact lookup in RedirectMap, then RouteMap
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Keys never begin with `/`
//! - Exact key lookup only; no patterns or prefixes

pub mod redirect;
pub mod table;

pub use redirect::{build_redirects, Redirect, RedirectMap};
pub use table::{build_routes, RouteMap};

/// Lookup key for a request path: the path without its leading separators.
pub fn normalize_key(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Lookup key for `path` under the mount `context`, or `None` when the path is outside it.
pub fn route_key<'a>(context: &str, path: &'a str) -> Option<&'a str> {
    let context = context.trim_end_matches('/');
    let rest = path.strip_prefix(context)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    Some(normalize_key(rest))
}
