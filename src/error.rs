use std::fmt;

use crate::config::ConfigError;

/// Errors that can occur in the origin-resolution crate.
///
/// Malformed request input is never an error: it resolves to an untrusted
/// verdict or an absent value. Only configuration loading and the host's
/// cache-invalidation hook can fail.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded
    Config(ConfigError),
    /// The host cannot invalidate its derived-URL cache
    CacheUnavailable(CacheUnavailable),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::CacheUnavailable(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::CacheUnavailable(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<CacheUnavailable> for Error {
    fn from(e: CacheUnavailable) -> Self {
        Error::CacheUnavailable(e)
    }
}

/// Returned by a host environment that cannot reset its derived-URL cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheUnavailable {
    /// Why the cache could not be reset
    pub reason: String,
}

impl CacheUnavailable {
    /// Creates a new cache-unavailable error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CacheUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "derived origin cache unavailable: {}", self.reason)
    }
}

impl std::error::Error for CacheUnavailable {}

/// Why a forwarded origin was not trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The gate that failed
    pub kind: RejectionKind,
    /// Human-readable message explaining the rejection
    pub message: String,
}

impl Rejection {
    /// Creates a new rejection.
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Rejection {}

/// The gate that rejected a forwarded origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Strict mode is on and the tunnel marker header is missing or wrong
    MissingMarker,
    /// The current host is not the configured local domain
    DomainMismatch,
    /// The current host does not resolve to a private network address
    NotInternal,
    /// No usable `X-Forwarded-Host` header
    MissingForwardedHost,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionKind::MissingMarker => write!(f, "Missing tunnel marker"),
            RejectionKind::DomainMismatch => write!(f, "Domain mismatch"),
            RejectionKind::NotInternal => write!(f, "Host not internal"),
            RejectionKind::MissingForwardedHost => write!(f, "Missing forwarded host"),
        }
    }
}
