//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the engine. It
//! handles:
//! - Reading request headers as tainted values (`HeaderSource`)
//! - Snapshotting the request attributes the engine needs (`RequestAdapter`)
//! - Running the engine once per request (`expose_request`)
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: This module contains no framework-specific code.
//!    It defines interfaces that framework-specific code can implement.
//!
//! 2. **Taint at Boundary**: Every header value is wrapped in `Tainted<T>` when read.
//!
//! 3. **Explicit Context**: No global state. The rewritten origin lands in the
//!    per-request environment passed to `expose_request`.
//!
//! # Example Flow
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//! let adapter = RequestAdapter::from(&http_req);
//! let mut ctx = RequestContext::new(adapter.request_id())
//!     .with_server_var(ServerStore::Input, HTTP_HOST, adapter.current_host());
//!
//! expose_request(&adapter, &config, &classifier, &mut ctx);
//!
//! // Redirects and links now use the public origin
//! let location = ctx.base_url();
//! ```

mod adapter;
mod extract;
mod middleware;

pub use adapter::RequestAdapter;
pub use extract::HeaderSource;
pub use middleware::expose_request;
