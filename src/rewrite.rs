//! Application of a trusted origin to the host environment.
//!
//! # Steps
//!
//! ```text
//! 1. REQUEST_SCHEME, SERVER_NAME, HTTP_HOST   → every store, per OverwriteMode
//! 2. live site                                → scheme://host[:port], request-scoped
//! 3. derived-URL memo (current/base/root)     → reset, all at once
//! ```
//!
//! All three steps run on every call, even when an earlier one was a no-op.
//! Applying the same origin twice leaves the same state as applying it once.
//!
//! Steps 2 and 3 may touch state the host shares between requests; see
//! [`environment`](crate::environment) for the synchronization contract.

use std::net::IpAddr;

use crate::context::{HTTP_HOST, REMOTE_ADDR, REQUEST_SCHEME, SERVER_NAME};
use crate::environment::{OriginEnvironment, OverwriteMode, ServerStore};
use crate::logging::OriginLog;
use crate::origin::OriginTriple;

/// What a rewrite was able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteReport {
    /// Whether the derived-URL cache was invalidated.
    ///
    /// `false` means URLs memoized before the rewrite may still expose the
    /// old origin, so the rewrite cannot be considered complete.
    pub cache_reset: bool,
}

impl RewriteReport {
    /// Returns `true` if every step fully took effect.
    pub fn is_complete(&self) -> bool {
        self.cache_reset
    }
}

/// Rewrites the host environment to a trusted public origin.
///
/// # Examples
///
/// ```
/// use origin_gate::{OriginEnvironment, OriginRewriter, OriginTriple, OverwriteMode, RequestContext, Scheme, ServerStore};
///
/// let mut ctx = RequestContext::new("req-1")
///     .with_server_var(ServerStore::Input, "HTTP_HOST", "localhost:8000");
/// assert_eq!(ctx.root_url(), "http://localhost:8000");
///
/// let origin = OriginTriple::new(Scheme::Https, "public.example.com", None).unwrap();
/// let report = OriginRewriter::new(OverwriteMode::OnlyOverwritePresent).apply(&origin, &mut ctx);
///
/// assert!(report.is_complete());
/// assert_eq!(ctx.root_url(), "https://public.example.com");
/// assert_eq!(ctx.server_var(ServerStore::Input, "HTTP_HOST"), Some("public.example.com"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OriginRewriter<'a> {
    mode: OverwriteMode,
    log: OriginLog<'a>,
}

impl<'a> OriginRewriter<'a> {
    /// Creates a rewriter with the given overwrite mode.
    pub fn new(mode: OverwriteMode) -> Self {
        Self {
            mode,
            log: OriginLog::new("-"),
        }
    }

    /// Tags log events with `request_id`.
    pub fn with_request_id(mut self, request_id: &'a str) -> Self {
        self.log = OriginLog::new(request_id);
        self
    }

    /// Returns the overwrite mode.
    pub fn mode(&self) -> OverwriteMode {
        self.mode
    }

    /// Applies `origin` to `env`.
    ///
    /// Never fails. If the host cannot invalidate its derived-URL cache a
    /// warning is logged and the report says the rewrite is incomplete.
    pub fn apply<E: OriginEnvironment + ?Sized>(&self, origin: &OriginTriple, env: &mut E) -> RewriteReport {
        self.set_server_var(env, REQUEST_SCHEME, origin.scheme().as_str());
        self.set_server_var(env, SERVER_NAME, origin.host());
        self.set_server_var(env, HTTP_HOST, origin.host());

        env.set_live_site(origin.base_url());

        let cache_reset = match env.reset_derived_origin_cache() {
            Ok(()) => true,
            Err(err) => {
                self.log.warn(format_args!(
                    "origin rewrite to {} incomplete: {}",
                    origin, err
                ));
                false
            }
        };

        self.log
            .debug(format_args!("applied forwarded origin {}", origin));

        RewriteReport { cache_reset }
    }

    /// Replaces the client address with `ip` under the same overwrite rules.
    pub fn apply_client_ip<E: OriginEnvironment + ?Sized>(&self, ip: IpAddr, env: &mut E) {
        self.set_server_var(env, REMOTE_ADDR, &ip.to_string());
        self.log.debug(format_args!("client address set to {}", ip));
    }

    /// Writes one server variable: always into the input table, and into
    /// each process mirror only as the overwrite mode allows.
    fn set_server_var<E: OriginEnvironment + ?Sized>(&self, env: &mut E, key: &str, value: &str) {
        for store in ServerStore::ALL {
            let write = match (store.is_mirror(), self.mode) {
                (false, _) | (true, OverwriteMode::AlwaysSet) => true,
                (true, OverwriteMode::OnlyOverwritePresent) => env.server_var(store, key).is_some(),
            };
            if write {
                env.set_server_var(store, key, value);
            }
        }
    }
}
