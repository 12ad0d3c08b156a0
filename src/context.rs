use std::collections::HashMap;

use url::Url;

use crate::environment::{OriginEnvironment, ServerStore};
use crate::error::CacheUnavailable;
use crate::uri::UriCache;

/// Server variable holding the request scheme.
pub const REQUEST_SCHEME: &str = "REQUEST_SCHEME";
/// Server variable holding the server hostname.
pub const SERVER_NAME: &str = "SERVER_NAME";
/// Server variable holding the `Host` header.
pub const HTTP_HOST: &str = "HTTP_HOST";
/// Server variable holding the client address.
pub const REMOTE_ADDR: &str = "REMOTE_ADDR";

/// Root used when neither a live site nor the server variables yield a URL.
const FALLBACK_ROOT: &str = "http://localhost";

/// Per-request view of every origin-derived value.
///
/// `RequestContext` is the engine's reference host environment. Instead of
/// overriding a process-wide "live site" setting, the public base URL for
/// this request lives here, and every URL this context generates consults
/// it first. Nothing in a `RequestContext` is shared with other requests.
///
/// It holds:
/// - three server-variable tables (see [`ServerStore`])
/// - the persisted base URL from configuration, which is never modified
/// - a request-scoped base URL override, set by the origin rewriter
/// - a [`UriCache`] memoizing the `current`, `base`, and `root` URLs
///
/// # URL derivation
///
/// ```text
/// root    = live site (override, else persisted)      | REQUEST_SCHEME://HTTP_HOST
/// base    = root + base path + "/"
/// current = origin of root + request path
/// ```
///
/// The query and fragment of a live site are ignored. An unparsable live
/// site falls back to the server variables.
///
/// # Examples
///
/// ```
/// use origin_gate::{OriginEnvironment, RequestContext, ServerStore};
///
/// let mut ctx = RequestContext::new("req-1")
///     .with_server_var(ServerStore::Input, "HTTP_HOST", "localhost:8000")
///     .with_request_path("/blog?page=2");
///
/// assert_eq!(ctx.current_url(), "http://localhost:8000/blog?page=2");
///
/// ctx.set_live_site("https://public.example.com".to_string());
/// ctx.reset_derived_origin_cache().unwrap();
/// assert_eq!(ctx.current_url(), "https://public.example.com/blog?page=2");
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    stores: HashMap<ServerStore, HashMap<String, String>>,
    configured_live_site: Option<String>,
    live_site_override: Option<String>,
    request_path: String,
    base_path: String,
    uri_cache: UriCache,
}

// ============================================================================
// Construction
// ============================================================================

impl RequestContext {
    /// Creates an empty context for one request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            stores: HashMap::new(),
            configured_live_site: None,
            live_site_override: None,
            request_path: "/".to_string(),
            base_path: String::new(),
            uri_cache: UriCache::new(),
        }
    }

    /// Seeds a server variable.
    pub fn with_server_var(
        mut self,
        store: ServerStore,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.stores
            .entry(store)
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Sets the base URL persisted in the application's configuration.
    pub fn with_configured_live_site(mut self, url: impl Into<String>) -> Self {
        self.configured_live_site = Some(url.into());
        self
    }

    /// Sets the path and query of the request (e.g. `/index.php?id=1`).
    ///
    /// Leading slashes collapse to one, so the path can never name another host.
    pub fn with_request_path(mut self, path: impl Into<String>) -> Self {
        self.request_path = format!("/{}", path.into().trim_start_matches('/'));
        self
    }

    /// Sets the path the application is installed under (e.g. `/site`).
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = path.into().trim_matches('/').to_string();
        self
    }
}

// ============================================================================
// Accessors and derived URLs
// ============================================================================

impl RequestContext {
    /// Returns the request ID for this context.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the persisted base URL, unaffected by any rewrite.
    pub fn configured_live_site(&self) -> Option<&str> {
        self.configured_live_site.as_deref()
    }

    /// Returns the memo of derived URLs.
    pub fn uri_cache(&self) -> &UriCache {
        &self.uri_cache
    }

    /// Returns the absolute root URL of the application, without a trailing slash.
    pub fn root_url(&self) -> &str {
        self.uri_cache.root(|| match self.root() {
            Some(root) => root.as_str().trim_end_matches('/').to_string(),
            None => FALLBACK_ROOT.to_string(),
        })
    }

    /// Returns the absolute base URL (root plus install path, with a trailing slash).
    pub fn base_url(&self) -> &str {
        self.uri_cache.base(|| {
            let Some(mut url) = self.root() else {
                return format!("{}/", FALLBACK_ROOT);
            };

            let mut path = url.path().trim_end_matches('/').to_string();
            if !self.base_path.is_empty() {
                path.push('/');
                path.push_str(&self.base_path);
            }
            path.push('/');
            url.set_path(&path);
            url.into()
        })
    }

    /// Returns the absolute URL of the current request.
    pub fn current_url(&self) -> &str {
        self.uri_cache.current(|| {
            self.root()
                .and_then(|root| root.join(&self.request_path).ok())
                .map(String::from)
                .unwrap_or_else(|| format!("{}{}", FALLBACK_ROOT, self.request_path))
        })
    }

    /// Resolves the root URL from the live site, else the server variables.
    fn root(&self) -> Option<Url> {
        if let Some(live_site) = self.live_site() {
            match parse_root(live_site) {
                Some(url) => return Some(url),
                None => tracing::debug!(live_site, "ignoring unparsable live site"),
            }
        }

        let scheme = self
            .server_var(ServerStore::Input, REQUEST_SCHEME)
            .unwrap_or("http");
        let host = self
            .server_var(ServerStore::Input, HTTP_HOST)
            .or_else(|| self.server_var(ServerStore::Input, SERVER_NAME))
            .unwrap_or("localhost");
        parse_root(&format!("{}://{}", scheme, host))
    }
}

/// Parses an absolute root URL, dropping its query and fragment.
fn parse_root(text: &str) -> Option<Url> {
    let mut url = Url::parse(text).ok()?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}

impl OriginEnvironment for RequestContext {
    fn server_var(&self, store: ServerStore, key: &str) -> Option<&str> {
        self.stores.get(&store)?.get(key).map(String::as_str)
    }

    fn set_server_var(&mut self, store: ServerStore, key: &str, value: &str) {
        self.stores
            .entry(store)
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    fn set_live_site(&mut self, base_url: String) {
        self.live_site_override = Some(base_url);
    }

    fn live_site(&self) -> Option<&str> {
        self.live_site_override
            .as_deref()
            .or(self.configured_live_site.as_deref())
    }

    fn reset_derived_origin_cache(&mut self) -> Result<(), CacheUnavailable> {
        self.uri_cache.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_ctx() -> RequestContext {
        RequestContext::new("req-ctx")
            .with_server_var(ServerStore::Input, REQUEST_SCHEME, "http")
            .with_server_var(ServerStore::Input, HTTP_HOST, "localhost:8000")
            .with_request_path("/index.php?option=com_content")
    }

    #[test]
    fn urls_derive_from_server_vars() {
        let ctx = local_ctx();
        assert_eq!(ctx.root_url(), "http://localhost:8000");
        assert_eq!(ctx.base_url(), "http://localhost:8000/");
        assert_eq!(
            ctx.current_url(),
            "http://localhost:8000/index.php?option=com_content"
        );
    }

    #[test]
    fn server_name_is_fallback_host() {
        let ctx = RequestContext::new("req")
            .with_server_var(ServerStore::Input, SERVER_NAME, "intranet");
        assert_eq!(ctx.root_url(), "http://intranet");
    }

    #[test]
    fn base_path_is_appended() {
        let ctx = local_ctx().with_base_path("/site/");
        assert_eq!(ctx.base_url(), "http://localhost:8000/site/");
    }

    #[test]
    fn configured_live_site_wins_over_server_vars() {
        let ctx = local_ctx().with_configured_live_site("https://www.example.com/");
        assert_eq!(ctx.root_url(), "https://www.example.com");
    }

    #[test]
    fn current_url_uses_origin_of_live_site() {
        let mut ctx = local_ctx().with_request_path("/sub/page");
        ctx.set_live_site("https://public.example.com/sub".to_string());
        assert_eq!(ctx.current_url(), "https://public.example.com/sub/page");
    }

    #[test]
    fn override_leaves_persisted_value_alone() {
        let mut ctx = local_ctx().with_configured_live_site("http://localhost:8000");
        ctx.set_live_site("https://public.example.com".to_string());

        assert_eq!(ctx.live_site(), Some("https://public.example.com"));
        assert_eq!(ctx.configured_live_site(), Some("http://localhost:8000"));
    }

    #[test]
    fn memo_survives_until_reset() {
        let mut ctx = local_ctx();
        assert_eq!(ctx.root_url(), "http://localhost:8000");

        ctx.set_live_site("https://public.example.com".to_string());
        // Still memoized: this is exactly what a rewrite must invalidate.
        assert_eq!(ctx.root_url(), "http://localhost:8000");

        ctx.reset_derived_origin_cache().unwrap();
        assert_eq!(ctx.root_url(), "https://public.example.com");
        assert_eq!(ctx.base_url(), "https://public.example.com/");
    }

    #[test]
    fn server_vars_are_per_store() {
        let mut ctx = RequestContext::new("req");
        ctx.set_server_var(ServerStore::Env, HTTP_HOST, "a");

        assert_eq!(ctx.server_var(ServerStore::Env, HTTP_HOST), Some("a"));
        assert_eq!(ctx.server_var(ServerStore::Server, HTTP_HOST), None);
        assert_eq!(ctx.server_var(ServerStore::Input, HTTP_HOST), None);
    }

    #[test]
    fn live_site_query_is_not_part_of_the_origin() {
        let mut ctx = local_ctx().with_request_path("/page");
        ctx.set_live_site("http://h?x=1#top".to_string());

        assert_eq!(ctx.root_url(), "http://h");
        assert_eq!(ctx.base_url(), "http://h/");
        assert_eq!(ctx.current_url(), "http://h/page");
    }

    #[test]
    fn unparsable_live_site_falls_back_to_server_vars() {
        let ctx = local_ctx().with_configured_live_site("not a url");
        assert_eq!(ctx.root_url(), "http://localhost:8000");
    }

    #[test]
    fn request_path_cannot_switch_host() {
        let ctx = local_ctx().with_request_path("//evil.example/x");
        assert_eq!(ctx.current_url(), "http://localhost:8000/evil.example/x");
    }
}
