//! Request hook running the whole engine once per request.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework-specific code builds RequestAdapter
//!   ↓
//! expose_request()
//!   ├─ TrustGate::evaluate()       untrusted → return, nothing touched
//!   └─ OriginRewriter::apply()     trusted   → environment rewritten
//!   ↓
//! Application code reads URLs from the environment
//! ```
//!
//! Run it before application code reads or memoizes anything origin-derived.

use crate::config::ExposeConfig;
use crate::environment::OriginEnvironment;
use crate::forwarded;
use crate::gate::{TrustGate, TrustVerdict};
use crate::logging::OriginLog;
use crate::network::{PrivateNetworkClassifier, Resolver};
use crate::rewrite::OriginRewriter;

use super::RequestAdapter;

/// Evaluates the request's forwarded origin and, if trusted, applies it.
///
/// Returns the verdict. An untrusted verdict leaves `env` exactly as it was.
/// Nothing here can abort the request.
///
/// # Examples
///
/// ```
/// use origin_gate::web::{expose_request, RequestAdapter};
/// use origin_gate::{ExposeConfig, PrivateNetworkClassifier, RequestContext, ServerStore, StaticResolver};
///
/// let mut adapter = RequestAdapter::new("req-1".to_string());
/// adapter.set_current_host("server.internal");
/// adapter.add_header("X-Exposed-By".to_string(), "Expose abc123".to_string());
/// adapter.add_header("X-Forwarded-Host".to_string(), "public.example.com".to_string());
/// adapter.add_header("X-Forwarded-Proto".to_string(), "https".to_string());
///
/// let classifier = PrivateNetworkClassifier::new(
///     StaticResolver::new().with_host("server.internal", "10.1.2.3".parse().unwrap()),
/// );
/// let mut ctx = RequestContext::new("req-1")
///     .with_server_var(ServerStore::Input, "HTTP_HOST", "server.internal");
///
/// let verdict = expose_request(&adapter, &ExposeConfig::default(), &classifier, &mut ctx);
///
/// assert!(verdict.is_trusted());
/// assert_eq!(ctx.root_url(), "https://public.example.com");
/// ```
pub fn expose_request<R, E>(
    adapter: &RequestAdapter,
    config: &ExposeConfig,
    classifier: &PrivateNetworkClassifier<R>,
    env: &mut E,
) -> TrustVerdict
where
    R: Resolver,
    E: OriginEnvironment + ?Sized,
{
    let log = OriginLog::new(adapter.request_id());
    let verdict = TrustGate::new(config, classifier).evaluate(adapter, adapter.current_host());

    match &verdict {
        TrustVerdict::Untrusted(rejection) => {
            log.debug(format_args!(
                "forwarded origin not trusted for {}://{}: {}",
                adapter.current_scheme(),
                adapter.current_host(),
                rejection
            ));
        }
        TrustVerdict::Trusted(origin) => {
            let rewriter =
                OriginRewriter::new(config.overwrite_mode).with_request_id(adapter.request_id());
            let report = rewriter.apply(origin, env);

            if config.override_client_ip {
                if let Some(ip) = forwarded::client_ip(adapter) {
                    rewriter.apply_client_ip(ip, env);
                }
            }

            log.info(format_args!(
                "public origin {} replaces {}://{} (complete: {})",
                origin,
                adapter.current_scheme(),
                adapter.current_host(),
                report.is_complete()
            ));
        }
    }

    verdict
}
