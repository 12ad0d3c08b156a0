//! Extraction of the forwarded origin from proxy headers.
//!
//! The tunneling agent describes the public origin with three headers:
//!
//! | Header              | Meaning          | Missing / invalid      |
//! |---------------------|------------------|------------------------|
//! | `X-Forwarded-Host`  | public host      | no origin at all       |
//! | `X-Forwarded-Proto` | `http`/`https`   | `http`                 |
//! | `X-Forwarded-Port`  | `1..=65535`      | no explicit port       |
//!
//! `X-Forwarded-For` optionally carries the client address; only its
//! left-most entry is interpreted.

use std::net::IpAddr;

use crate::origin::{OriginTriple, Scheme};
use crate::web::HeaderSource;

/// Header carrying the public host.
pub const X_FORWARDED_HOST: &str = "X-Forwarded-Host";
/// Header carrying the public scheme.
pub const X_FORWARDED_PROTO: &str = "X-Forwarded-Proto";
/// Header carrying the public port.
pub const X_FORWARDED_PORT: &str = "X-Forwarded-Port";
/// Header carrying the client address chain.
pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";

/// Reads and canonicalizes the forwarded origin.
///
/// Returns `None` when `X-Forwarded-Host` is absent, blank, or not a bare
/// host, whatever the other headers say. Malformed protocol and port values fall back to their
/// defaults instead of failing.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use origin_gate::{forwarded, OriginTriple, Scheme};
///
/// let mut headers = HashMap::new();
/// headers.insert("X-Forwarded-Host".to_string(), "public.example.com".to_string());
/// headers.insert("X-Forwarded-Proto".to_string(), "https".to_string());
/// headers.insert("X-Forwarded-Port".to_string(), "443".to_string());
///
/// assert_eq!(
///     forwarded::extract(&headers),
///     OriginTriple::new(Scheme::Https, "public.example.com", None)
/// );
/// ```
pub fn extract<H: HeaderSource + ?Sized>(headers: &H) -> Option<OriginTriple> {
    let host = headers.header(X_FORWARDED_HOST)?.into_inner();

    let scheme = headers
        .header(X_FORWARDED_PROTO)
        .map(|proto| Scheme::from_forwarded(&proto.into_inner()))
        .unwrap_or_default();

    let port = headers
        .header(X_FORWARDED_PORT)
        .and_then(|port| parse_port(&port.into_inner()));

    OriginTriple::new(scheme, host, port)
}

/// Returns the client address from the left-most `X-Forwarded-For` entry.
///
/// Returns `None` if the header is missing or that entry is not an address.
pub fn client_ip<H: HeaderSource + ?Sized>(headers: &H) -> Option<IpAddr> {
    let chain = headers.header(X_FORWARDED_FOR)?.into_inner();
    let first = chain.split(',').next()?.trim();
    first.parse().ok()
}

/// Reads the first integer anywhere in a port header, optionally signed
/// with `-` (`"8080abc"` and `"abc8080"` both read as 8080), and keeps it
/// only when it is a valid TCP port.
fn parse_port(raw: &str) -> Option<u16> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    if raw[..start].ends_with('-') {
        return None;
    }

    let digits = &raw[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];

    // Anything too long for u32 is far outside the port range anyway.
    let value = digits.parse::<u32>().ok()?;
    match value {
        1..=65535 => u16::try_from(value).ok(),
        _ => None,
    }
}
