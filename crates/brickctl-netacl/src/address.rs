//! Access-list token classification
//!
//! A token is one colon-free piece of an access list: an IPv4 host, an IPv4
//! network in CIDR form, or a symbolic host name. Numeric entries carry a
//! leading `@` in canonical form; names never do.

use std::fmt::{self, Display, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::OnceLock;

use ipnetwork::{IpNetworkError, Ipv4Network};
use regex::Regex;

use crate::error::NetAclError;

/// Prefix marking numeric entries in the wire form.
pub const NUMERIC_PREFIX: char = '@';

/// Strict dotted quad, each octet 0-255.
const IPV4_PATTERN: &str =
    r"^(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)(\.(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)){3}$";

fn looks_like_ipv4(token: &str) -> bool {
    static IPV4_RE: OnceLock<Option<Regex>> = OnceLock::new();
    IPV4_RE
        .get_or_init(|| Regex::new(IPV4_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(token))
}

/// A single classified access-list entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AddressEntry {
    /// A single host; never loopback
    Host(Ipv4Addr),
    /// A network with no host bits set beyond its prefix
    Network(Ipv4Network),
    /// A host name or FQDN, taken verbatim
    Name(String),
}

impl AddressEntry {
    /// Classify one token.
    ///
    /// # Errors
    /// Returns `InvalidAddressSpecification` for a malformed or loose network
    /// literal, a malformed or loopback host, a digits-and-dots token that is
    /// not a dotted quad, or a name containing `,`, `=` or whitespace.
    pub fn parse(token: &str) -> Result<Self, NetAclError> {
        if token.contains('/') {
            let literal = token.strip_prefix(NUMERIC_PREFIX).unwrap_or(token);
            return parse_network(literal).map(AddressEntry::Network);
        }

        if let Some(literal) = token.strip_prefix(NUMERIC_PREFIX) {
            return parse_host(literal).map(AddressEntry::Host);
        }
        if looks_like_ipv4(token) {
            return parse_host(token).map(AddressEntry::Host);
        }
        if token.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(NetAclError::address(format!(
                "{token} does not appear to be an IPv4 address"
            )));
        }

        if token.chars().any(|c| c == ',' || c == '=' || c.is_whitespace()) {
            return Err(NetAclError::address(format!("Invalid host name {token}")));
        }
        Ok(AddressEntry::Name(token.to_string()))
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, AddressEntry::Name(_))
    }
}

fn parse_network(literal: &str) -> Result<Ipv4Network, NetAclError> {
    let malformed =
        || NetAclError::address(format!("{literal} does not appear to be an IPv4 network"));

    let (addr, prefix) = literal.split_once('/').ok_or_else(malformed)?;
    let addr: Ipv4Addr = addr.parse().map_err(|_| malformed())?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| NetAclError::address(format!("'{prefix}' is not a valid netmask")))?;

    let network = Ipv4Network::new(addr, prefix).map_err(|err| match err {
        IpNetworkError::InvalidPrefix => {
            NetAclError::address(format!("'{prefix}' is not a valid netmask"))
        }
        _ => malformed(),
    })?;

    if network.ip() != network.network() {
        return Err(NetAclError::address(format!("{literal} has host bits set")));
    }
    Ok(network)
}

fn parse_host(literal: &str) -> Result<Ipv4Addr, NetAclError> {
    let addr: Ipv4Addr = literal.parse().map_err(|_| {
        NetAclError::address(format!("{literal} does not appear to be an IPv4 address"))
    })?;
    if addr.is_loopback() {
        return Err(NetAclError::address(format!(
            "Local address {literal} not allowed"
        )));
    }
    Ok(addr)
}

impl Display for AddressEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AddressEntry::Host(addr) => write!(f, "{NUMERIC_PREFIX}{addr}"),
            AddressEntry::Network(net) => write!(f, "{NUMERIC_PREFIX}{net}"),
            AddressEntry::Name(name) => f.write_str(name),
        }
    }
}

impl FromStr for AddressEntry {
    type Err = NetAclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
