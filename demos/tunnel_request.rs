//! Tunnel request demonstration.
//!
//! This example shows how a host application wires origin-gate into its
//! request handling:
//! 1. Load the configuration
//! 2. Snapshot the request into a `RequestAdapter`
//! 3. Run `expose_request` before anything reads the request URL
//! 4. Generate links from the rewritten `RequestContext`
//!
//! Run with: `RUST_LOG=origin_gate=debug cargo run --example tunnel_request`

use origin_gate::web::{expose_request, RequestAdapter};
use origin_gate::{
    ExposeConfig, OriginEnvironment, PrivateNetworkClassifier, RequestContext, ServerStore,
    StaticResolver, HTTP_HOST, REMOTE_ADDR, REQUEST_SCHEME,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG: &str = r#"
strict = true
domain = ""
only_internal = true
override_client_ip = true
overwrite_mode = "only_overwrite_present"
"#;

/// Simulates the framework handing a request to the application
fn incoming_request(request_id: &str, tunneled: bool) -> (RequestAdapter, RequestContext) {
    let mut adapter = RequestAdapter::new(request_id.to_string());
    adapter.set_current_host("server.internal");

    if tunneled {
        adapter.add_header("X-Exposed-By".to_string(), "Expose 6f1c2a".to_string());
        adapter.add_header("X-Forwarded-Host".to_string(), "demo.sharedwithexpose.com".to_string());
        adapter.add_header("X-Forwarded-Proto".to_string(), "https".to_string());
        adapter.add_header("X-Forwarded-Port".to_string(), "443".to_string());
        adapter.add_header("X-Forwarded-For".to_string(), "198.51.100.23".to_string());
    }

    let ctx = RequestContext::new(request_id)
        .with_server_var(ServerStore::Input, REQUEST_SCHEME, "http")
        .with_server_var(ServerStore::Input, HTTP_HOST, "server.internal:8080")
        .with_server_var(ServerStore::Input, REMOTE_ADDR, "127.0.0.1")
        .with_server_var(ServerStore::Server, HTTP_HOST, "server.internal:8080")
        .with_request_path("/index.php/contact");

    (adapter, ctx)
}

fn print_context(ctx: &RequestContext) {
    println!("   current URL: {}", ctx.current_url());
    println!("   base URL:    {}", ctx.base_url());
    println!(
        "   HTTP_HOST:   {}",
        ctx.server_var(ServerStore::Input, HTTP_HOST).unwrap_or("-")
    );
    println!(
        "   REMOTE_ADDR: {}",
        ctx.server_var(ServerStore::Input, REMOTE_ADDR).unwrap_or("-")
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "origin_gate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Tunnel Request Example ===\n");

    let config = ExposeConfig::from_toml_str(CONFIG)?;
    let classifier = PrivateNetworkClassifier::new(
        StaticResolver::new().with_host("server.internal", "10.1.2.3".parse()?),
    );

    for (request_id, tunneled) in [("req-direct-001", false), ("req-tunnel-002", true)] {
        println!("--- {} ---", request_id);
        let (adapter, mut ctx) = incoming_request(request_id, tunneled);

        let verdict = expose_request(&adapter, &config, &classifier, &mut ctx);
        match verdict.rejection() {
            Some(rejection) => println!("✗ Left untouched: {}", rejection),
            None => println!("✓ Trusted forwarded origin"),
        }
        print_context(&ctx);
        println!();
    }

    Ok(())
}
