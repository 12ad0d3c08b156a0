//! Memoized URLs derived from the request origin.

use std::cell::OnceCell;

/// Per-request memo of the `current`, `base`, and `root` URLs.
///
/// Each URL is computed on first read and reused afterwards. Because a memo
/// computed before an origin rewrite would leak the old origin, [`reset`]
/// clears all three together; there is no way to clear them one at a time.
///
/// [`reset`]: UriCache::reset
///
/// # Examples
///
/// ```
/// use origin_gate::UriCache;
///
/// let mut cache = UriCache::new();
/// assert_eq!(cache.root(|| "http://localhost".to_string()), "http://localhost");
/// // Memoized: the closure is not called again.
/// assert_eq!(cache.root(|| "https://other".to_string()), "http://localhost");
///
/// cache.reset();
/// assert_eq!(cache.root(|| "https://other".to_string()), "https://other");
/// ```
#[derive(Debug, Clone, Default)]
pub struct UriCache {
    current: OnceCell<String>,
    base: OnceCell<String>,
    root: OnceCell<String>,
}

impl UriCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized current URL, computing it if needed.
    pub fn current(&self, compute: impl FnOnce() -> String) -> &str {
        self.current.get_or_init(compute)
    }

    /// Returns the memoized base URL, computing it if needed.
    pub fn base(&self, compute: impl FnOnce() -> String) -> &str {
        self.base.get_or_init(compute)
    }

    /// Returns the memoized root URL, computing it if needed.
    pub fn root(&self, compute: impl FnOnce() -> String) -> &str {
        self.root.get_or_init(compute)
    }

    /// Returns `true` if nothing has been memoized.
    pub fn is_empty(&self) -> bool {
        self.current.get().is_none() && self.base.get().is_none() && self.root.get().is_none()
    }

    /// Drops every memoized URL.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
