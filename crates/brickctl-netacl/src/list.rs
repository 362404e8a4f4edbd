//! Access lists
//!
//! An [`AddressList`] holds the classified entries of one access class
//! (read-only, read/write, denied or root), partitioned into hosts, networks
//! and names in first-seen order. Duplicates are kept as given.

use std::fmt::{self, Display, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnetwork::Ipv4Network;

use crate::address::AddressEntry;
use crate::error::NetAclError;

/// Separator between tokens in the wire form.
pub const TOKEN_SEPARATOR: char = ':';

/// Classified entries of one access class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressList {
    hosts: Vec<Ipv4Addr>,
    nets: Vec<Ipv4Network>,
    others: Vec<String>,
}

impl AddressList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a colon-separated list such as
    /// `10.0.0.0/8:@192.168.1.5:foobar.example.com`.
    ///
    /// Empty tokens are skipped. The first token that fails classification
    /// fails the whole list.
    ///
    /// # Errors
    /// Returns the classifier's `InvalidAddressSpecification`.
    pub fn parse(list: &str) -> Result<Self, NetAclError> {
        Self::from_tokens(list.split(TOKEN_SEPARATOR))
    }

    /// Build from individual tokens, as supplied by a list-typed parameter.
    ///
    /// # Errors
    /// Returns the classifier's `InvalidAddressSpecification`.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, NetAclError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for token in tokens {
            let token = token.as_ref();
            if token.is_empty() {
                continue;
            }
            list.push(AddressEntry::parse(token)?);
        }
        Ok(list)
    }

    pub fn push(&mut self, entry: AddressEntry) {
        match entry {
            AddressEntry::Host(addr) => self.hosts.push(addr),
            AddressEntry::Network(net) => self.nets.push(net),
            AddressEntry::Name(name) => self.others.push(name),
        }
    }

    #[must_use]
    pub fn hosts(&self) -> &[Ipv4Addr] {
        &self.hosts
    }

    #[must_use]
    pub fn nets(&self) -> &[Ipv4Network] {
        &self.nets
    }

    /// Symbolic names
    #[must_use]
    pub fn others(&self) -> &[String] {
        &self.others
    }

    /// Number of numeric entries (hosts and networks). Names are not
    /// counted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len() + self.nets.len()
    }

    /// True when the list has no numeric entries. See [`len`](Self::len).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the list has any entry at all, names included. A share
    /// clause is emitted only for lists with entries.
    #[must_use]
    pub fn has_entries(&self) -> bool {
        !self.is_empty() || !self.others.is_empty()
    }

    /// Entries in wire order: networks, hosts, then names.
    pub fn entries(&self) -> impl Iterator<Item = AddressEntry> + '_ {
        self.nets
            .iter()
            .copied()
            .map(AddressEntry::Network)
            .chain(self.hosts.iter().copied().map(AddressEntry::Host))
            .chain(self.others.iter().cloned().map(AddressEntry::Name))
    }
}

impl Display for AddressList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries().enumerate() {
            if i > 0 {
                write!(f, "{TOKEN_SEPARATOR}")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl FromStr for AddressList {
    type Err = NetAclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_preserves_order() {
        let list = AddressList::parse(
            "10.100.10.0/24:10.2.0.0/16:192.168.100.1:192.168.100.5:alpha.beta.com:beta.gamma.epsilon",
        )
        .unwrap();

        assert_eq!(
            list.hosts(),
            &[Ipv4Addr::new(192, 168, 100, 1), Ipv4Addr::new(192, 168, 100, 5)]
        );
        assert_eq!(
            list.nets(),
            &[
                "10.100.10.0/24".parse::<Ipv4Network>().unwrap(),
                "10.2.0.0/16".parse::<Ipv4Network>().unwrap()
            ]
        );
        assert_eq!(list.others(), &["alpha.beta.com", "beta.gamma.epsilon"]);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_from_tokens_matches_parse() {
        let tokens = vec![
            "10.100.10.0/24",
            "10.2.0.0/16",
            "192.168.100.1",
            "192.168.100.5",
            "alpha.beta.gamma",
        ];
        let from_tokens = AddressList::from_tokens(&tokens).unwrap();
        let parsed = AddressList::parse(&tokens.join(":")).unwrap();
        assert_eq!(from_tokens, parsed);
    }

    #[test]
    fn test_serializes_nets_then_hosts_then_names() {
        let list =
            AddressList::parse("10.0.0.0/8:1.2.3.4:10.1.0.0/16:12.13.14.0/24:foobar.alpha.com")
                .unwrap();
        assert_eq!(
            list.to_string(),
            "@10.0.0.0/8:@10.1.0.0/16:@12.13.14.0/24:@1.2.3.4:foobar.alpha.com"
        );
    }

    #[test]
    fn test_round_trip() {
        for input in [
            "@10.0.0.0/8:@10.1.0.0/16:@192.168.1.5:foobar.example.com",
            "12.13.15.3:5.6.0.0/24",
            "alpha.beta.com",
            "@5.6.7.8:@5.6.7.8",
        ] {
            let list = AddressList::parse(input).unwrap();
            let again = AddressList::parse(&list.to_string()).unwrap();
            assert_eq!(list, again, "{input}");
        }
    }

    #[test]
    fn test_empty_tokens_skipped_and_duplicates_kept() {
        let list = AddressList::parse("::1.2.3.4::1.2.3.4:").unwrap();
        assert_eq!(list.hosts().len(), 2);
        assert_eq!(list.to_string(), "@1.2.3.4:@1.2.3.4");
    }

    #[test]
    fn test_empty_and_names_only() {
        let empty = AddressList::parse("").unwrap();
        assert!(empty.is_empty());
        assert!(!empty.has_entries());
        assert_eq!(empty.to_string(), "");

        let names = AddressList::parse("alpha.beta.com").unwrap();
        assert_eq!(names.len(), 0);
        assert!(names.has_entries());
    }

    #[test]
    fn test_fails_fast() {
        let err = AddressList::parse("1.2.3.4:127.0.0.1:10.1.2.0/16").unwrap_err();
        assert_eq!(err.to_string(), "Local address 127.0.0.1 not allowed");
    }
}
