//! Request adapter for mapping HTTP requests to engine inputs.

use std::collections::HashMap;

use crate::origin::Scheme;
use crate::Tainted;

use super::HeaderSource;

/// Owned snapshot of the request attributes the engine reads.
///
/// `RequestAdapter` is the primary integration point between web frameworks
/// and the engine. It holds:
/// - the request id, used to correlate log events
/// - the request headers (stored with lowercase names)
/// - the current apparent host and scheme, as the framework already
///   determined them before the engine runs
///
/// # Design Notes
///
/// This type intentionally contains simple, owned data to avoid coupling
/// to any specific framework's request types. Framework-specific code
/// should implement `From<FrameworkRequest>` for `RequestAdapter`.
///
/// # Examples
///
/// ```
/// use origin_gate::web::{HeaderSource, RequestAdapter};
///
/// let mut adapter = RequestAdapter::new("req-12345".to_string());
/// adapter.set_current_host("server.internal");
/// adapter.add_header("X-Forwarded-Host".to_string(), "public.example.com".to_string());
///
/// assert_eq!(adapter.current_host(), "server.internal");
/// assert!(adapter.header("x-forwarded-host").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    /// Unique request identifier (required)
    request_id: String,
    /// Request headers keyed by lowercase name (all tainted on read)
    headers: HashMap<String, String>,
    /// Host the framework believes it is serving
    current_host: String,
    /// Scheme the framework believes it is serving
    current_scheme: Scheme,
}

impl RequestAdapter {
    /// Creates a new request adapter with the given request ID.
    ///
    /// The current host starts empty and the current scheme as `http`.
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            headers: HashMap::new(),
            current_host: String::new(),
            current_scheme: Scheme::Http,
        }
    }

    /// Adds a header. A later header with the same name replaces the earlier one.
    pub fn add_header(&mut self, key: String, value: String) {
        self.headers.insert(key.to_ascii_lowercase(), value);
    }

    /// Sets the current apparent host.
    pub fn set_current_host(&mut self, host: impl Into<String>) {
        self.current_host = host.into();
    }

    /// Sets the current apparent scheme.
    pub fn set_current_scheme(&mut self, scheme: Scheme) {
        self.current_scheme = scheme;
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the current apparent host.
    pub fn current_host(&self) -> &str {
        &self.current_host
    }

    /// Returns the current apparent scheme.
    pub fn current_scheme(&self) -> Scheme {
        self.current_scheme
    }

    /// Returns the number of stored headers.
    pub fn headers_count(&self) -> usize {
        self.headers.len()
    }
}

impl HeaderSource for RequestAdapter {
    fn header(&self, name: &str) -> Option<Tainted<String>> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| Tainted::new(v.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_adapter_new() {
        let adapter = RequestAdapter::new("req-test".to_string());
        assert_eq!(adapter.request_id(), "req-test");
        assert_eq!(adapter.current_host(), "");
        assert_eq!(adapter.current_scheme(), Scheme::Http);
        assert_eq!(adapter.headers_count(), 0);
    }

    #[test]
    fn request_adapter_add_header() {
        let mut adapter = RequestAdapter::new("req-1".to_string());
        adapter.add_header("X-Forwarded-Proto".to_string(), "https".to_string());

        assert!(adapter.header("x-forwarded-proto").is_some());
        assert!(adapter.header("X-FORWARDED-PROTO").is_some());
        assert!(adapter.header("X-Forwarded-Port").is_none());
    }

    #[test]
    fn repeated_header_replaces_earlier_value() {
        let mut adapter = RequestAdapter::new("req-1".to_string());
        adapter.add_header("X-Forwarded-Host".to_string(), "first".to_string());
        adapter.add_header("x-forwarded-host".to_string(), "second".to_string());

        assert_eq!(adapter.headers_count(), 1);
        let value = adapter.header("X-Forwarded-Host").unwrap().into_inner();
        assert_eq!(value, "second");
    }

    #[test]
    fn current_origin_is_settable() {
        let mut adapter = RequestAdapter::new("req-1".to_string());
        adapter.set_current_host("localhost");
        adapter.set_current_scheme(Scheme::Https);

        assert_eq!(adapter.current_host(), "localhost");
        assert_eq!(adapter.current_scheme(), Scheme::Https);
    }
}
