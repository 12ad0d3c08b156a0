//! Address-range membership testing.
//!
//! Prefix entries become [`IpNet`] networks; membership is `IpNet::contains`.
//! Supported entry forms are:
//!
//! - `addr/prefix` (IPv4 or IPv6), where the network part may be a truncated
//!   IPv4 address such as `10.0.0/24`; missing octets are zero-padded
//! - `addr/dotted-netmask` (IPv4 only), e.g. `192.168.1.0/255.255.255.0`
//! - `from-to` inclusive ranges of a single family
//! - a single address
//!
//! Nothing in this module returns an error. Unparsable entries are skipped,
//! unparsable or unspecified (`0.0.0.0`) query addresses are members of
//! nothing, and an entry never matches an address of the other family.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::IpNet;

/// A network expressed as a network address and a prefix length.
///
/// The prefix length is always within the width of the address family
/// (`0..=32` for IPv4, `0..=128` for IPv6).
///
/// # Examples
///
/// ```
/// use origin_gate::cidr::Cidr;
///
/// let net = Cidr::parse("10.0.0.0/8").unwrap();
/// assert!(net.contains("10.200.1.1".parse().unwrap()));
/// assert!(!net.contains("11.0.0.1".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    net: IpNet,
}

impl Cidr {
    /// Creates a network from an address and a prefix length.
    ///
    /// Returns `None` if the prefix length exceeds the family width.
    pub fn new(network: IpAddr, prefix_len: u8) -> Option<Self> {
        IpNet::new(network, prefix_len).ok().map(|net| Self { net })
    }

    /// Parses `addr/prefix` or `addr/dotted-netmask`.
    ///
    /// Dotted netmasks are converted with the legacy formula
    /// `32 - log2(~mask + 1)`, truncated toward zero. The formula is applied
    /// even when the mask is not a contiguous run of one bits; such masks
    /// are accepted and reported with a warning.
    pub fn parse(text: &str) -> Option<Self> {
        let (addr, len) = text.trim().split_once('/')?;
        let addr = addr.trim();
        let len = len.trim();

        if addr.contains(':') {
            let network = IpAddr::V6(addr.parse::<Ipv6Addr>().ok()?);
            let prefix_len = len.parse::<u8>().ok()?;
            return Self::new(network, prefix_len);
        }

        let network = IpAddr::V4(parse_partial_ipv4(addr)?);
        let prefix_len = if len.contains('.') {
            let mask = len.parse::<Ipv4Addr>().ok()?;
            netmask_to_prefix_len(mask)
        } else {
            len.parse::<u8>().ok()?
        };

        Self::new(network, prefix_len)
    }

    /// Returns the network address.
    pub fn network(&self) -> IpAddr {
        self.net.addr()
    }

    /// Returns the prefix length.
    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// Returns the underlying network.
    pub fn as_ipnet(&self) -> &IpNet {
        &self.net
    }

    /// Returns `true` if `ip` falls inside this network.
    ///
    /// Addresses of the other family never match.
    pub fn contains(&self, ip: IpAddr) -> bool {
        matches(ip, self)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}

/// One entry of an address list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpRange {
    /// A network in prefix form.
    Cidr(Cidr),
    /// An inclusive range between two addresses of the same family.
    Range {
        /// Lowest address of the range.
        from: IpAddr,
        /// Highest address of the range.
        to: IpAddr,
    },
    /// Exactly one address.
    Single(IpAddr),
}

impl IpRange {
    /// Parses one list entry, returning `None` if it is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use origin_gate::cidr::IpRange;
    ///
    /// assert!(IpRange::parse("172.16.0.0/12").is_some());
    /// assert!(IpRange::parse("10.0.0.1-10.0.0.9").is_some());
    /// assert!(IpRange::parse("::1").is_some());
    /// assert!(IpRange::parse("not-an-ip").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if text.contains('/') {
            return Cidr::parse(text).map(IpRange::Cidr);
        }

        if let Some((from, to)) = text.split_once('-') {
            let from = from.trim().parse::<IpAddr>().ok()?;
            let to = to.trim().parse::<IpAddr>().ok()?;
            if from.is_ipv4() != to.is_ipv4() {
                return None;
            }
            return Some(IpRange::Range { from, to });
        }

        text.parse::<IpAddr>().ok().map(IpRange::Single)
    }

    /// Returns `true` if `ip` is covered by this entry.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match self {
            IpRange::Cidr(cidr) => matches(ip, cidr),
            IpRange::Range { from, to } => match (ip, from, to) {
                (IpAddr::V4(ip), IpAddr::V4(from), IpAddr::V4(to)) => (*from..=*to).contains(&ip),
                (IpAddr::V6(ip), IpAddr::V6(from), IpAddr::V6(to)) => (*from..=*to).contains(&ip),
                _ => false,
            },
            IpRange::Single(single) => *single == ip,
        }
    }
}

/// A parsed list of address ranges.
///
/// Malformed entries are dropped at construction time so that membership
/// tests never have to deal with them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpList {
    ranges: Vec<IpRange>,
}

impl IpList {
    /// Parses every entry, skipping the ones that are malformed.
    pub fn parse<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ranges = entries
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref();
                let parsed = IpRange::parse(entry);
                if parsed.is_none() {
                    tracing::debug!(entry, "skipping malformed address range");
                }
                parsed
            })
            .collect();
        Self { ranges }
    }

    /// Returns the number of usable entries.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns `true` if the list has no usable entries.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns `true` if any entry covers `ip`.
    ///
    /// The unspecified IPv4 address `0.0.0.0` is never a member.
    pub fn contains(&self, ip: IpAddr) -> bool {
        if ip == IpAddr::V4(Ipv4Addr::UNSPECIFIED) {
            return false;
        }
        self.ranges.iter().any(|range| range.contains(ip))
    }
}

/// Returns `true` if the top `prefix_len` bits of `ip` equal those of the
/// network address.
///
/// An address of the other family never matches.
pub fn matches(ip: IpAddr, cidr: &Cidr) -> bool {
    cidr.net.contains(&ip)
}

/// Text-level membership test.
///
/// Parses `ip` and every entry of `ranges`; returns `false` for an empty list,
/// an unparsable address, or `0.0.0.0`, without ever failing.
///
/// # Examples
///
/// ```
/// use origin_gate::cidr::is_in_list;
///
/// assert!(is_in_list("192.168.1.20", &["192.168.0.0/16"]));
/// assert!(is_in_list("192.168.1.20", &["192.168.1.0/255.255.255.0"]));
/// assert!(!is_in_list("garbage", &["192.168.0.0/16"]));
/// assert!(!is_in_list("0.0.0.0", &["0.0.0.0/0"]));
/// ```
pub fn is_in_list<S: AsRef<str>>(ip: &str, ranges: &[S]) -> bool {
    let Ok(ip) = ip.trim().parse::<IpAddr>() else {
        return false;
    };
    IpList::parse(ranges).contains(ip)
}

/// Converts a dotted IPv4 netmask into a prefix length.
///
/// Uses `32 - log2(~mask + 1)` truncated toward zero, which yields the usual
/// answer for contiguous masks. Non-contiguous masks still produce a value in
/// `0..=32`, but it does not describe the mask; a warning is logged.
pub fn netmask_to_prefix_len(mask: Ipv4Addr) -> u8 {
    let bits = u32::from(mask);
    if bits.leading_ones() + bits.trailing_zeros() != 32 {
        tracing::warn!(
            netmask = %mask,
            "non-contiguous netmask; prefix length derived with the legacy formula"
        );
    }

    let inverted = u64::from(!bits) + 1;
    let prefix = 32.0 - (inverted as f64).log2();
    prefix.clamp(0.0, 32.0) as u8
}

/// Parses one to four dotted octets, zero-padding the missing ones.
fn parse_partial_ipv4(text: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut count = 0;

    for part in text.split('.') {
        if count == 4 || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        octets[count] = part.parse().ok()?;
        count += 1;
    }

    if count == 0 {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}
