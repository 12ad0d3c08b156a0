use std::fmt;

use url::Url;

/// URL scheme of a public origin.
///
/// Only `http` and `https` exist; anything else a proxy forwards is clamped
/// to [`Scheme::Http`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    /// Plain HTTP, default port 80.
    #[default]
    Http,
    /// HTTP over TLS, default port 443.
    Https,
}

impl Scheme {
    /// Clamps a forwarded protocol value.
    ///
    /// Only the exact strings `http` and `https` are recognized (surrounding
    /// whitespace ignored). Any other value, including different casing,
    /// becomes `Http`.
    ///
    /// # Examples
    ///
    /// ```
    /// use origin_gate::Scheme;
    ///
    /// assert_eq!(Scheme::from_forwarded("https"), Scheme::Https);
    /// assert_eq!(Scheme::from_forwarded("ftp"), Scheme::Http);
    /// ```
    pub fn from_forwarded(value: &str) -> Self {
        match value.trim() {
            "https" => Scheme::Https,
            _ => Scheme::Http,
        }
    }

    /// Returns the port implied when none is given.
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    /// Returns the lowercase scheme name.
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical `(scheme, host, port)` of a request's public origin.
///
/// A port equal to the scheme's default is stored as `None`, so two origins
/// that differ only by an explicit versus implicit default port are equal.
/// The host is never empty and must be a bare URL host: no path, query,
/// fragment, or credentials.
///
/// # Examples
///
/// ```
/// use origin_gate::{OriginTriple, Scheme};
///
/// let explicit = OriginTriple::new(Scheme::Https, "public.example.com", Some(443)).unwrap();
/// let implicit = OriginTriple::new(Scheme::Https, "public.example.com", None).unwrap();
/// assert_eq!(explicit, implicit);
/// assert_eq!(explicit.base_url(), "https://public.example.com");
///
/// let custom = OriginTriple::new(Scheme::Http, "tunnel.example.com", Some(8080)).unwrap();
/// assert_eq!(custom.base_url(), "http://tunnel.example.com:8080");
///
/// assert!(OriginTriple::new(Scheme::Https, "", None).is_none());
/// assert!(OriginTriple::new(Scheme::Https, "evil.example/login?next=", None).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OriginTriple {
    scheme: Scheme,
    host: String,
    port: Option<u16>,
    url: Url,
}

impl OriginTriple {
    /// Creates a canonical origin, dropping a default port and port `0`.
    ///
    /// Returns `None` if `host` is blank or is not a bare URL host.
    pub fn new(scheme: Scheme, host: impl Into<String>, port: Option<u16>) -> Option<Self> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            return None;
        }

        let mut url = Url::parse(&format!("{}://{}", scheme, host)).ok()?;
        let bare = !host.contains('/')
            && url.path() == "/"
            && url.query().is_none()
            && url.fragment().is_none()
            && url.username().is_empty()
            && url.password().is_none();
        if !bare {
            return None;
        }

        let port = port.filter(|&p| p != 0 && p != scheme.default_port());
        if port.is_some() {
            url.set_port(port).ok()?;
        }

        Some(Self {
            scheme,
            host,
            port,
            url,
        })
    }

    /// Returns the scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Returns the host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the non-default port, if any.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the port that will actually be used.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    /// Returns the origin as a URL with an empty path.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Renders `scheme://host[:port]` with no trailing slash.
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

impl fmt::Display for OriginTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}
