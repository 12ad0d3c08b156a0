use crate::{
    config::ExposeConfig,
    error::{Rejection, RejectionKind},
    forwarded,
    network::{PrivateNetworkClassifier, Resolver},
    origin::OriginTriple,
    web::HeaderSource,
};

/// Header the tunneling agent sets on every request it forwards.
pub const X_EXPOSED_BY: &str = "X-Exposed-By";

/// Required prefix of the [`X_EXPOSED_BY`] value.
pub const MARKER_PREFIX: &str = "Expose ";

/// Outcome of evaluating a request's forwarded origin.
///
/// There is no partial trust: a verdict either carries the origin to apply
/// or the reason nothing should be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustVerdict {
    /// Every configured check passed.
    Trusted(OriginTriple),
    /// A check failed; the request must be processed as if untouched.
    Untrusted(Rejection),
}

impl TrustVerdict {
    /// Returns `true` for a trusted verdict.
    pub fn is_trusted(&self) -> bool {
        matches!(self, TrustVerdict::Trusted(_))
    }

    /// Returns the origin to apply, if trusted.
    pub fn origin(&self) -> Option<&OriginTriple> {
        match self {
            TrustVerdict::Trusted(origin) => Some(origin),
            TrustVerdict::Untrusted(_) => None,
        }
    }

    /// Returns the rejection, if untrusted.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            TrustVerdict::Trusted(_) => None,
            TrustVerdict::Untrusted(rejection) => Some(rejection),
        }
    }
}

/// The trust gate.
///
/// `TrustGate` runs the configured checks in a fixed order and stops at the
/// first failure:
///
/// 1. `strict`: the `X-Exposed-By` header must start with `"Expose "`
/// 2. `domain`: when non-empty, the current host must equal it exactly
/// 3. `only_internal`: the current host must resolve to a private address
/// 4. the forwarded origin must be extractable
///
/// A disabled check is skipped, not counted as passed.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use origin_gate::{ExposeConfig, OriginTriple, PrivateNetworkClassifier, Scheme, StaticResolver, TrustGate};
///
/// let config = ExposeConfig { only_internal: false, ..ExposeConfig::default() };
/// let classifier = PrivateNetworkClassifier::new(StaticResolver::new());
///
/// let mut headers = HashMap::new();
/// headers.insert("X-Exposed-By".to_string(), "Expose abc123".to_string());
/// headers.insert("X-Forwarded-Host".to_string(), "public.example.com".to_string());
/// headers.insert("X-Forwarded-Proto".to_string(), "https".to_string());
///
/// let verdict = TrustGate::new(&config, &classifier).evaluate(&headers, "localhost");
/// assert_eq!(
///     verdict.origin(),
///     OriginTriple::new(Scheme::Https, "public.example.com", None).as_ref()
/// );
/// ```
pub struct TrustGate<'a, R> {
    config: &'a ExposeConfig,
    classifier: &'a PrivateNetworkClassifier<R>,
}

impl<'a, R: Resolver> TrustGate<'a, R> {
    /// Creates a gate for one evaluation.
    pub fn new(config: &'a ExposeConfig, classifier: &'a PrivateNetworkClassifier<R>) -> Self {
        Self { config, classifier }
    }

    /// Evaluates the forwarded origin of a request.
    ///
    /// `current_host` is the host the framework determined before the engine
    /// ran. The only I/O is name resolution when `only_internal` is set.
    pub fn evaluate<H: HeaderSource + ?Sized>(&self, headers: &H, current_host: &str) -> TrustVerdict {
        match self.validate_all(headers, current_host) {
            Ok(origin) => TrustVerdict::Trusted(origin),
            Err(rejection) => TrustVerdict::Untrusted(rejection),
        }
    }

    /// Runs every enabled check, returning the origin or the first failure.
    fn validate_all<H: HeaderSource + ?Sized>(
        &self,
        headers: &H,
        current_host: &str,
    ) -> Result<OriginTriple, Rejection> {
        if self.config.strict {
            self.check_marker(headers)?;
        }

        if let Some(domain) = self.config.local_domain() {
            self.check_domain(domain, current_host)?;
        }

        if self.config.only_internal {
            self.check_internal(current_host)?;
        }

        forwarded::extract(headers).ok_or_else(|| {
            Rejection::new(
                RejectionKind::MissingForwardedHost,
                "X-Forwarded-Host header missing or empty",
            )
        })
    }

    fn check_marker<H: HeaderSource + ?Sized>(&self, headers: &H) -> Result<(), Rejection> {
        let marked = headers
            .header(X_EXPOSED_BY)
            .map(|value| value.into_inner().starts_with(MARKER_PREFIX))
            .unwrap_or(false);

        if marked {
            Ok(())
        } else {
            Err(Rejection::new(
                RejectionKind::MissingMarker,
                "X-Exposed-By header missing or not an Expose marker",
            ))
        }
    }

    fn check_domain(&self, domain: &str, current_host: &str) -> Result<(), Rejection> {
        if current_host == domain {
            Ok(())
        } else {
            Err(Rejection::new(
                RejectionKind::DomainMismatch,
                format!("current host '{}' is not '{}'", current_host, domain),
            ))
        }
    }

    fn check_internal(&self, current_host: &str) -> Result<(), Rejection> {
        if self.classifier.is_private(current_host) {
            Ok(())
        } else {
            Err(Rejection::new(
                RejectionKind::NotInternal,
                format!("current host '{}' does not resolve to a private network", current_host),
            ))
        }
    }
}
