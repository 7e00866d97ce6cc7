use std::cmp::Ordering;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::CoreError;

/// IPv4 address of a group member.
///
/// Ordered by the big-endian 32-bit value of its octets, so `2.0.0.1`
/// sorts before `10.0.0.1` even though the strings sort the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerAddress(Ipv4Addr);

impl PeerAddress {
    /// Wrap an IPv4 address
    #[must_use]
    pub const fn new(ip: Ipv4Addr) -> Self {
        Self(ip)
    }

    /// The underlying IPv4 address
    #[must_use]
    pub const fn ip(self) -> Ipv4Addr {
        self.0
    }

    /// Numeric value used for ordering
    #[must_use]
    pub fn to_bits(self) -> u32 {
        u32::from(self.0)
    }
}

impl Ord for PeerAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bits().cmp(&other.to_bits())
    }
}

impl PartialOrd for PeerAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Ipv4Addr> for PeerAddress {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip)
    }
}

impl FromStr for PeerAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Ipv4Addr>()
            .map(Self)
            .map_err(|_| CoreError::InvalidAddress(s.to_string()))
    }
}

/// One resolution snapshot of the group: sorted ascending, no duplicates.
///
/// Built fresh every cycle and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupView {
    peers: Vec<PeerAddress>,
}

impl GroupView {
    /// Normalize raw resolver output into a view
    pub fn from_addresses<I, A>(addresses: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<PeerAddress>,
    {
        let mut peers: Vec<PeerAddress> = addresses.into_iter().map(Into::into).collect();
        peers.sort_unstable();
        peers.dedup();
        Self { peers }
    }

    /// Members in ascending order
    #[must_use]
    pub fn peers(&self) -> &[PeerAddress] {
        &self.peers
    }

    /// Number of distinct members
    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// True when the lookup produced no IPv4 members
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Index of `peer` in the ordered view
    #[must_use]
    pub fn position(&self, peer: PeerAddress) -> Option<usize> {
        self.peers.binary_search(&peer).ok()
    }

    /// True when `peer` is a member
    #[must_use]
    pub fn contains(&self, peer: PeerAddress) -> bool {
        self.position(peer).is_some()
    }
}

impl FromIterator<PeerAddress> for GroupView {
    fn from_iter<T: IntoIterator<Item = PeerAddress>>(iter: T) -> Self {
        Self::from_addresses(iter)
    }
}

impl fmt::Display for GroupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, peer) in self.peers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{peer}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(addrs: &[&str]) -> GroupView {
        addrs.iter().map(|a| a.parse::<PeerAddress>().unwrap()).collect()
    }

    #[test]
    fn test_numeric_not_lexicographic_order() {
        let group = view(&["10.0.0.1", "2.0.0.1"]);
        assert_eq!(group.to_string(), "[2.0.0.1, 10.0.0.1]");
    }

    #[test]
    fn test_extremes_order() {
        let group = view(&["255.255.255.255", "0.0.0.0", "127.0.0.1"]);
        let first = group.peers()[0];
        let last = group.peers()[group.len() - 1];
        assert_eq!(first.to_bits(), 0);
        assert_eq!(last.to_bits(), u32::MAX);
    }

    #[test]
    fn test_dedup() {
        let group = view(&["10.0.0.2", "10.0.0.1", "10.0.0.2", "10.0.0.1"]);
        assert_eq!(group.len(), 2);
        assert_eq!(group.position("10.0.0.2".parse().unwrap()), Some(1));
    }

    #[test]
    fn test_position_and_contains() {
        let group = view(&["172.18.0.4", "172.18.0.2", "172.18.0.3"]);
        assert_eq!(group.position("172.18.0.2".parse().unwrap()), Some(0));
        assert_eq!(group.position("172.18.0.4".parse().unwrap()), Some(2));
        assert!(!group.contains("172.18.0.9".parse().unwrap()));
    }

    #[test]
    fn test_empty_view() {
        let group = GroupView::from_addresses(Vec::<Ipv4Addr>::new());
        assert!(group.is_empty());
        assert_eq!(group.to_string(), "[]");
    }

    #[test]
    fn test_invalid_address() {
        let err = "10.0.0".parse::<PeerAddress>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidAddress(ref s) if s == "10.0.0"));
        assert!("::1".parse::<PeerAddress>().is_err());
    }
}
