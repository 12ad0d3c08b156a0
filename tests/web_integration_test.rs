//! Integration tests for the request hook.
//!
//! These tests demonstrate the complete flow from a framework request
//! snapshot through trust evaluation to the rewritten request context.

use origin_gate::web::{expose_request, HeaderSource, RequestAdapter};
use origin_gate::{
    ExposeConfig, OriginEnvironment, OverwriteMode, PrivateNetworkClassifier, RejectionKind,
    RequestContext, Scheme, ServerStore, StaticResolver, HTTP_HOST, REMOTE_ADDR, REQUEST_SCHEME,
    SERVER_NAME,
};

fn classifier() -> PrivateNetworkClassifier<StaticResolver> {
    PrivateNetworkClassifier::new(
        StaticResolver::new()
            .with_host("server.internal", "10.1.2.3".parse().unwrap())
            .with_host("www.example.com", "93.184.216.34".parse().unwrap()),
    )
}

/// A request the tunneling agent forwarded to `server.internal:8000`.
fn tunneled_request(request_id: &str) -> RequestAdapter {
    let mut adapter = RequestAdapter::new(request_id.to_string());
    adapter.set_current_host("server.internal");
    adapter.set_current_scheme(Scheme::Http);
    adapter.add_header("X-Exposed-By".to_string(), "Expose abc123".to_string());
    adapter.add_header("X-Forwarded-Host".to_string(), "public.example.com".to_string());
    adapter.add_header("X-Forwarded-Proto".to_string(), "https".to_string());
    adapter.add_header("X-Forwarded-Port".to_string(), "8443".to_string());
    adapter.add_header("X-Forwarded-For".to_string(), "203.0.113.7, 10.0.0.2".to_string());
    adapter
}

fn local_context(request_id: &str) -> RequestContext {
    RequestContext::new(request_id)
        .with_server_var(ServerStore::Input, REQUEST_SCHEME, "http")
        .with_server_var(ServerStore::Input, HTTP_HOST, "server.internal:8000")
        .with_server_var(ServerStore::Input, REMOTE_ADDR, "10.0.0.2")
        .with_server_var(ServerStore::Server, HTTP_HOST, "server.internal:8000")
        .with_server_var(ServerStore::Server, REMOTE_ADDR, "10.0.0.2")
        .with_configured_live_site("http://server.internal:8000")
        .with_base_path("/site")
        .with_request_path("/site/index.php?view=article&id=1")
}

#[test]
fn tunneled_request_full_flow() {
    let adapter = tunneled_request("req-web-001");
    let mut ctx = local_context("req-web-001");

    // Something read the URL before the hook ran
    assert_eq!(
        ctx.current_url(),
        "http://server.internal:8000/site/index.php?view=article&id=1"
    );

    let verdict = expose_request(&adapter, &ExposeConfig::default(), &classifier(), &mut ctx);
    assert!(verdict.is_trusted());

    // Generated URLs use the public origin
    assert_eq!(ctx.root_url(), "https://public.example.com:8443");
    assert_eq!(ctx.base_url(), "https://public.example.com:8443/site/");
    assert_eq!(
        ctx.current_url(),
        "https://public.example.com:8443/site/index.php?view=article&id=1"
    );

    // Server variables carry the bare public host
    assert_eq!(ctx.server_var(ServerStore::Input, REQUEST_SCHEME), Some("https"));
    assert_eq!(ctx.server_var(ServerStore::Input, HTTP_HOST), Some("public.example.com"));
    assert_eq!(ctx.server_var(ServerStore::Input, SERVER_NAME), Some("public.example.com"));
    assert_eq!(ctx.server_var(ServerStore::Server, HTTP_HOST), Some("public.example.com"));

    // Client address is the left-most forwarded entry
    assert_eq!(ctx.server_var(ServerStore::Input, REMOTE_ADDR), Some("203.0.113.7"));
    assert_eq!(ctx.server_var(ServerStore::Server, REMOTE_ADDR), Some("203.0.113.7"));

    // Keys absent from the mirrors stay absent
    assert_eq!(ctx.server_var(ServerStore::Server, REQUEST_SCHEME), None);
    assert_eq!(ctx.server_var(ServerStore::Env, HTTP_HOST), None);

    // Persisted configuration is untouched
    assert_eq!(ctx.configured_live_site(), Some("http://server.internal:8000"));
}

#[test]
fn always_set_mode_populates_every_store() {
    let adapter = tunneled_request("req-web-002");
    let mut ctx = local_context("req-web-002");
    let config = ExposeConfig {
        overwrite_mode: OverwriteMode::AlwaysSet,
        ..ExposeConfig::default()
    };

    expose_request(&adapter, &config, &classifier(), &mut ctx);

    for store in ServerStore::ALL {
        assert_eq!(ctx.server_var(store, REQUEST_SCHEME), Some("https"), "{}", store);
        assert_eq!(ctx.server_var(store, REMOTE_ADDR), Some("203.0.113.7"), "{}", store);
    }
}

#[test]
fn hook_is_idempotent() {
    let adapter = tunneled_request("req-web-003");
    let config = ExposeConfig::default();

    let mut once = local_context("req-web-003");
    expose_request(&adapter, &config, &classifier(), &mut once);

    let mut twice = local_context("req-web-003");
    expose_request(&adapter, &config, &classifier(), &mut twice);
    expose_request(&adapter, &config, &classifier(), &mut twice);

    for store in ServerStore::ALL {
        for key in [REQUEST_SCHEME, SERVER_NAME, HTTP_HOST, REMOTE_ADDR] {
            assert_eq!(once.server_var(store, key), twice.server_var(store, key));
        }
    }
    assert_eq!(once.live_site(), twice.live_site());
    assert_eq!(once.current_url(), twice.current_url());
    assert_eq!(once.base_url(), twice.base_url());
}

#[test]
fn direct_request_is_left_untouched() {
    // Same private host, but nothing marks it as tunneled
    let mut adapter = RequestAdapter::new("req-web-004".to_string());
    adapter.set_current_host("server.internal");
    adapter.add_header("X-Forwarded-Host".to_string(), "attacker.example".to_string());

    let mut ctx = local_context("req-web-004");
    let verdict = expose_request(&adapter, &ExposeConfig::default(), &classifier(), &mut ctx);

    assert_eq!(
        verdict.rejection().map(|r| r.kind),
        Some(RejectionKind::MissingMarker)
    );
    assert_eq!(ctx.live_site(), Some("http://server.internal:8000"));
    assert_eq!(ctx.root_url(), "http://server.internal:8000");
    assert_eq!(ctx.server_var(ServerStore::Input, HTTP_HOST), Some("server.internal:8000"));
    assert_eq!(ctx.server_var(ServerStore::Input, REMOTE_ADDR), Some("10.0.0.2"));
}

#[test]
fn public_deployment_ignores_forwarded_headers() {
    let mut adapter = tunneled_request("req-web-005");
    adapter.set_current_host("www.example.com");

    let mut ctx = local_context("req-web-005");
    let verdict = expose_request(&adapter, &ExposeConfig::default(), &classifier(), &mut ctx);

    assert_eq!(
        verdict.rejection().map(|r| r.kind),
        Some(RejectionKind::NotInternal)
    );
    assert_eq!(ctx.server_var(ServerStore::Input, HTTP_HOST), Some("server.internal:8000"));
}

#[test]
fn pinned_domain_must_match_current_host() {
    let adapter = tunneled_request("req-web-006");
    let config = ExposeConfig {
        domain: "dev.local".to_string(),
        ..ExposeConfig::default()
    };

    let mut ctx = local_context("req-web-006");
    let verdict = expose_request(&adapter, &config, &classifier(), &mut ctx);

    assert_eq!(
        verdict.rejection().map(|r| r.kind),
        Some(RejectionKind::DomainMismatch)
    );
}

#[test]
fn adapter_headers_are_case_insensitive() {
    let mut adapter = RequestAdapter::new("req-web-007".to_string());
    adapter.add_header("x-forwarded-host".to_string(), "public.example.com".to_string());

    assert!(adapter.header("X-Forwarded-Host").is_some());
    assert!(adapter.header("X-FORWARDED-HOST").is_some());
    assert!(adapter.header("X-Forwarded-Proto").is_none());
}
