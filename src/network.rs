//! Private-network classification of hostnames.
//!
//! A hostname is "internal" when its IPv4 (A) or IPv6 (AAAA) address falls
//! in a loopback or private range. Name resolution goes through the
//! [`Resolver`] trait so hosts can plug in their own resolver and tests can
//! run without DNS.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::cidr::IpList;

/// IPv4 loopback and RFC 1918 ranges.
pub const INTERNAL_IPV4_RANGES: [&str; 4] =
    ["127.0.0.0/8", "10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"];

/// IPv6 loopback and unique-local ranges.
pub const INTERNAL_IPV6_RANGES: [&str; 2] = ["::1/128", "fc00::/7"];

/// Forward name resolution, one address per family.
///
/// Implementations return `None` when the family has no answer, including
/// when the lookup fails or times out. Resolution failure is never an error.
pub trait Resolver {
    /// Returns the first IPv4 address `host` resolves to.
    fn lookup_ipv4(&self, host: &str) -> Option<Ipv4Addr>;

    /// Returns the first IPv6 address `host` resolves to.
    fn lookup_ipv6(&self, host: &str) -> Option<Ipv6Addr>;
}

/// Resolver backed by the operating system's name service.
///
/// Without a timeout a slow lookup blocks the caller. With a timeout the
/// lookup runs on a helper thread and an expired lookup counts as "no
/// answer", so the host is classified as not private.
#[derive(Debug, Clone, Default)]
pub struct SystemResolver {
    timeout: Option<Duration>,
}

impl SystemResolver {
    /// Creates a resolver with no lookup timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds every lookup by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn resolve(&self, host: &str) -> Vec<IpAddr> {
        let Some(timeout) = self.timeout else {
            return resolve_blocking(host);
        };

        let (tx, rx) = mpsc::channel();
        let owned = host.to_string();
        thread::spawn(move || {
            let _ = tx.send(resolve_blocking(&owned));
        });

        match rx.recv_timeout(timeout) {
            Ok(addrs) => addrs,
            Err(_) => {
                tracing::debug!(host, ?timeout, "name lookup timed out");
                Vec::new()
            }
        }
    }
}

fn resolve_blocking(host: &str) -> Vec<IpAddr> {
    match (host, 0).to_socket_addrs() {
        Ok(addrs) => addrs.map(|addr| addr.ip()).collect(),
        Err(err) => {
            tracing::debug!(host, error = %err, "name lookup failed");
            Vec::new()
        }
    }
}

impl Resolver for SystemResolver {
    fn lookup_ipv4(&self, host: &str) -> Option<Ipv4Addr> {
        self.resolve(host).into_iter().find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
    }

    fn lookup_ipv6(&self, host: &str) -> Option<Ipv6Addr> {
        self.resolve(host).into_iter().find_map(|ip| match ip {
            IpAddr::V6(v6) => Some(v6),
            IpAddr::V4(_) => None,
        })
    }
}

/// Resolver answering from a fixed table.
///
/// Useful for tests, demos, and hosts that pin their own name mappings.
///
/// # Examples
///
/// ```
/// use origin_gate::network::{Resolver, StaticResolver};
///
/// let resolver = StaticResolver::new().with_host("server.internal", "10.1.2.3".parse().unwrap());
/// assert_eq!(resolver.lookup_ipv4("server.internal"), Some("10.1.2.3".parse().unwrap()));
/// assert_eq!(resolver.lookup_ipv6("server.internal"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an address for `host`. A host may have one address per family.
    pub fn with_host(mut self, host: impl Into<String>, addr: IpAddr) -> Self {
        self.hosts.entry(host.into()).or_default().push(addr);
        self
    }
}

impl Resolver for StaticResolver {
    fn lookup_ipv4(&self, host: &str) -> Option<Ipv4Addr> {
        self.hosts.get(host)?.iter().find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(*v4),
            IpAddr::V6(_) => None,
        })
    }

    fn lookup_ipv6(&self, host: &str) -> Option<Ipv6Addr> {
        self.hosts.get(host)?.iter().find_map(|ip| match ip {
            IpAddr::V6(v6) => Some(*v6),
            IpAddr::V4(_) => None,
        })
    }
}

/// Decides whether a hostname resolves into a private network.
#[derive(Debug, Clone)]
pub struct PrivateNetworkClassifier<R = SystemResolver> {
    resolver: R,
    ipv4_ranges: IpList,
    ipv6_ranges: IpList,
}

impl PrivateNetworkClassifier<SystemResolver> {
    /// Creates a classifier using the operating system's resolver.
    pub fn system() -> Self {
        Self::new(SystemResolver::new())
    }
}

impl<R: Resolver> PrivateNetworkClassifier<R> {
    /// Creates a classifier using `resolver` and the fixed internal ranges.
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            ipv4_ranges: IpList::parse(INTERNAL_IPV4_RANGES),
            ipv6_ranges: IpList::parse(INTERNAL_IPV6_RANGES),
        }
    }

    /// Returns the underlying resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Returns `true` if `hostname`'s IPv4 or IPv6 address is internal.
    ///
    /// An answer identical to the queried text is treated as "no answer" in
    /// both families: resolvers that fail echo the query back, and an AAAA
    /// query for a literal returns nothing, so a literal address used as the
    /// hostname never counts as resolved. The IPv6 family is checked
    /// independently of the IPv4 outcome.
    pub fn is_private(&self, hostname: &str) -> bool {
        let hostname = hostname.trim();
        if hostname.is_empty() {
            return false;
        }

        let ipv4 = self
            .resolver
            .lookup_ipv4(hostname)
            .filter(|addr| addr.to_string() != hostname);

        if let Some(addr) = ipv4 {
            if self.ipv4_ranges.contains(IpAddr::V4(addr)) {
                return true;
            }
        }

        let literal_ipv6 = hostname.parse::<Ipv6Addr>().ok();
        let ipv6 = self
            .resolver
            .lookup_ipv6(hostname)
            .filter(|addr| Some(*addr) != literal_ipv6);

        if let Some(addr) = ipv6 {
            if self.ipv6_ranges.contains(IpAddr::V6(addr)) {
                return true;
            }
        }

        false
    }
}
