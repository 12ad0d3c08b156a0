use std::collections::HashMap;

use origin_gate::{
    ExposeConfig, OriginEnvironment, OriginRewriter, OriginTriple, OverwriteMode,
    PrivateNetworkClassifier, RejectionKind, RequestContext, Scheme, ServerStore, StaticResolver,
    Tainted, TrustGate, TrustVerdict, HTTP_HOST, REQUEST_SCHEME, SERVER_NAME,
};

fn tunnel_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("X-Exposed-By".to_string(), "Expose abc123".to_string());
    headers.insert("X-Forwarded-Host".to_string(), "public.example.com".to_string());
    headers.insert("X-Forwarded-Proto".to_string(), "https".to_string());
    headers
}

fn classifier() -> PrivateNetworkClassifier<StaticResolver> {
    PrivateNetworkClassifier::new(
        StaticResolver::new()
            .with_host("server.internal", "10.1.2.3".parse().unwrap())
            .with_host("v6.internal", "fd00::1".parse().unwrap())
            .with_host("www.example.com", "93.184.216.34".parse().unwrap()),
    )
}

fn evaluate(config: &ExposeConfig, headers: &HashMap<String, String>, host: &str) -> TrustVerdict {
    let c = classifier();
    TrustGate::new(config, &c).evaluate(headers, host)
}

#[test]
fn marked_request_without_network_check_is_trusted() {
    let config = ExposeConfig {
        strict: true,
        domain: String::new(),
        only_internal: false,
        ..ExposeConfig::default()
    };

    let verdict = evaluate(&config, &tunnel_headers(), "localhost");

    assert_eq!(
        verdict,
        TrustVerdict::Trusted(OriginTriple::new(Scheme::Https, "public.example.com", None).unwrap())
    );
}

#[test]
fn private_ipv4_host_is_trusted() {
    let config = ExposeConfig {
        only_internal: true,
        ..ExposeConfig::default()
    };

    let verdict = evaluate(&config, &tunnel_headers(), "server.internal");

    assert!(verdict.is_trusted());
}

#[test]
fn private_ipv6_host_is_trusted() {
    let verdict = evaluate(&ExposeConfig::default(), &tunnel_headers(), "v6.internal");
    assert!(verdict.is_trusted());
}

#[test]
fn unknown_protocol_is_clamped_to_http() {
    let mut headers = tunnel_headers();
    headers.insert("X-Forwarded-Proto".to_string(), "ftp".to_string());

    let verdict = evaluate(&ExposeConfig::default(), &headers, "server.internal");

    assert_eq!(verdict.origin().map(OriginTriple::scheme), Some(Scheme::Http));
}

#[test]
fn out_of_range_port_is_dropped() {
    let mut headers = tunnel_headers();
    headers.insert("X-Forwarded-Port".to_string(), "99999".to_string());

    let verdict = evaluate(&ExposeConfig::default(), &headers, "server.internal");

    let origin = verdict.origin().expect("request should be trusted");
    assert_eq!(origin.port(), None);
    assert_eq!(origin.base_url(), "https://public.example.com");
}

#[test]
fn default_port_is_not_rendered() {
    let mut headers = tunnel_headers();
    headers.insert("X-Forwarded-Port".to_string(), "443".to_string());

    let verdict = evaluate(&ExposeConfig::default(), &headers, "server.internal");

    assert_eq!(
        verdict.origin(),
        OriginTriple::new(Scheme::Https, "public.example.com", None).as_ref()
    );
}

#[test]
fn public_host_is_rejected() {
    let verdict = evaluate(&ExposeConfig::default(), &tunnel_headers(), "www.example.com");
    assert_eq!(
        verdict.rejection().map(|r| r.kind),
        Some(RejectionKind::NotInternal)
    );
}

#[test]
fn unresolvable_host_is_rejected() {
    let verdict = evaluate(&ExposeConfig::default(), &tunnel_headers(), "nowhere.invalid");
    assert_eq!(
        verdict.rejection().map(|r| r.kind),
        Some(RejectionKind::NotInternal)
    );
}

#[test]
fn trusted_origin_flows_into_generated_urls() {
    let verdict = evaluate(&ExposeConfig::default(), &tunnel_headers(), "server.internal");
    let origin = verdict.origin().expect("request should be trusted");

    let mut ctx = RequestContext::new("req-int-001")
        .with_server_var(ServerStore::Input, REQUEST_SCHEME, "http")
        .with_server_var(ServerStore::Input, HTTP_HOST, "server.internal")
        .with_server_var(ServerStore::Server, SERVER_NAME, "server.internal")
        .with_configured_live_site("http://server.internal")
        .with_request_path("/index.php/blog");

    // A URL computed before the rewrite is memoized.
    assert_eq!(ctx.current_url(), "http://server.internal/index.php/blog");

    let report = OriginRewriter::new(OverwriteMode::OnlyOverwritePresent).apply(origin, &mut ctx);

    assert!(report.is_complete());
    assert_eq!(ctx.current_url(), "https://public.example.com/index.php/blog");
    assert_eq!(ctx.base_url(), "https://public.example.com/");
    assert_eq!(ctx.server_var(ServerStore::Server, SERVER_NAME), Some("public.example.com"));
    assert_eq!(ctx.server_var(ServerStore::Server, HTTP_HOST), None);
    assert_eq!(ctx.configured_live_site(), Some("http://server.internal"));
}

#[test]
fn rewriting_twice_matches_rewriting_once() {
    let origin = OriginTriple::new(Scheme::Https, "public.example.com", Some(8443)).unwrap();
    let rewriter = OriginRewriter::new(OverwriteMode::AlwaysSet);
    let base = RequestContext::new("req-int-002")
        .with_server_var(ServerStore::Input, HTTP_HOST, "server.internal");

    let mut once = base.clone();
    rewriter.apply(&origin, &mut once);

    let mut twice = base;
    rewriter.apply(&origin, &mut twice);
    rewriter.apply(&origin, &mut twice);

    for store in ServerStore::ALL {
        for key in [REQUEST_SCHEME, SERVER_NAME, HTTP_HOST] {
            assert_eq!(once.server_var(store, key), twice.server_var(store, key));
        }
    }
    assert_eq!(once.live_site(), twice.live_site());
    assert_eq!(once.root_url(), twice.root_url());
    assert_eq!(once.current_url(), twice.current_url());
}

#[test]
fn tainted_headers_have_no_implicit_conversion() {
    let host = Tainted::new("evil.example.com".to_string());

    let debug_out = format!("{:?}", host);
    assert!(debug_out.contains("Tainted"));

    // Uncommenting this would fail to compile:
    // let _s: String = host;
}
