//! Trusted-proxy origin resolution for applications behind a tunnel.
//!
//! When an application on a private network is reached through a tunneling
//! agent, every request arrives addressed to the private host. This crate
//! decides whether the forwarded-origin headers the agent adds can be
//! trusted and, if so, rewrites the application's notion of its own origin
//! so generated links and redirects point at the public address.
//!
//! - **Trust is explicit**: a [`TrustGate`] returns a [`TrustVerdict`], never a partial answer
//! - **Headers are tainted**: values enter as [`Tainted<T>`] and are only read by the extractor
//! - **No globals**: the public origin lives in a per-request [`RequestContext`]
//!
//! # Core Types
//!
//! - [`ExposeConfig`]: Options for the trust checks and the rewrite
//! - [`PrivateNetworkClassifier`]: Decides whether a hostname resolves to a private address
//! - [`TrustGate`]: Runs the trust checks and extracts the [`OriginTriple`]
//! - [`OriginRewriter`]: Applies a trusted origin through [`OriginEnvironment`]
//! - [`web::expose_request`]: Runs the whole engine for one request
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use origin_gate::{
//!     ExposeConfig, OriginEnvironment, OriginRewriter, PrivateNetworkClassifier,
//!     RequestContext, ServerStore, StaticResolver, TrustGate,
//! };
//!
//! let config = ExposeConfig::default();
//! let classifier = PrivateNetworkClassifier::new(
//!     StaticResolver::new().with_host("server.internal", "10.1.2.3".parse().unwrap()),
//! );
//!
//! let mut headers = HashMap::new();
//! headers.insert("X-Exposed-By".to_string(), "Expose abc123".to_string());
//! headers.insert("X-Forwarded-Host".to_string(), "public.example.com".to_string());
//! headers.insert("X-Forwarded-Proto".to_string(), "https".to_string());
//!
//! let verdict = TrustGate::new(&config, &classifier).evaluate(&headers, "server.internal");
//! let origin = verdict.origin().expect("tunnel request is trusted");
//!
//! let mut ctx = RequestContext::new("req-1")
//!     .with_server_var(ServerStore::Input, "HTTP_HOST", "server.internal");
//! OriginRewriter::new(config.overwrite_mode).apply(origin, &mut ctx);
//!
//! assert_eq!(ctx.live_site(), Some("https://public.example.com"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cidr;
pub mod environment;
pub mod forwarded;
pub mod network;
pub mod web;

mod config;
mod context;
mod error;
mod gate;
mod logging;
mod origin;
mod rewrite;
mod tainted;
mod uri;

pub use config::{load_config, ConfigError, ExposeConfig};
pub use context::{RequestContext, HTTP_HOST, REMOTE_ADDR, REQUEST_SCHEME, SERVER_NAME};
pub use environment::{OriginEnvironment, OverwriteMode, ServerStore};
pub use error::{CacheUnavailable, Error, Rejection, RejectionKind};
pub use gate::{TrustGate, TrustVerdict, MARKER_PREFIX, X_EXPOSED_BY};
pub use logging::OriginLog;
pub use network::{PrivateNetworkClassifier, Resolver, StaticResolver, SystemResolver};
pub use origin::{OriginTriple, Scheme};
pub use rewrite::{OriginRewriter, RewriteReport};
pub use tainted::Tainted;
pub use uri::UriCache;
