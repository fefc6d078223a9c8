use crate::core::address_family::AddressFamily;
use crate::core::errors::{Error, Result};
use ipnetwork::IpNetwork;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/*-------------------------------------------------------------------------------------------------
  Network
-------------------------------------------------------------------------------------------------*/

/// An immutable IPv4 or IPv6 network.
///
/// The base address is always the canonical first address for the prefix length (all host bits
/// set to `0`); parsing `10.0.50.7/24` yields `10.0.50.0/24`. Addresses are handled as `u128`
/// integers for both families so the allocation arithmetic is shared.
///
/// ```
/// use subnetplan::Network;
///
/// let parent: Network = "10.0.50.0/24".parse()?;
/// let child: Network = "10.0.50.32/27".parse()?;
///
/// assert!(parent.contains(&child));
/// assert_eq!(parent.size(), 256);
/// # Ok::<(), subnetplan::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Network {
    family: AddressFamily,
    first: u128,
    prefix_len: u8,
}

impl Network {
    /// Create the network of `prefix_len` that contains `address`.
    pub fn new(address: IpAddr, prefix_len: u8) -> Result<Self> {
        let family = AddressFamily::of_addr(&address);
        if prefix_len > family.width() {
            return Err(Error::invalid_network(
                format!("{address}/{prefix_len}"),
                format!("prefix length must be 0-{} for {family}", family.width()),
            ));
        }
        Ok(Self::from_bits(family, addr_to_bits(address), prefix_len))
    }

    /// Build a network from a raw address integer, clearing the host bits.
    pub(crate) fn from_bits(family: AddressFamily, bits: u128, prefix_len: u8) -> Self {
        let host_mask = AddressFamily::host_mask(u32::from(family.width() - prefix_len));
        Self {
            family,
            first: bits & !host_mask,
            prefix_len,
        }
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn is_ipv4(&self) -> bool {
        self.family.is_ipv4()
    }

    pub fn is_ipv6(&self) -> bool {
        self.family.is_ipv6()
    }

    /// Number of host bits (address width minus prefix length).
    pub fn host_bits(&self) -> u32 {
        u32::from(self.family.width() - self.prefix_len)
    }

    /// First address of the network as an integer.
    pub fn first(&self) -> u128 {
        self.first
    }

    /// Last address of the network as an integer.
    pub fn last(&self) -> u128 {
        self.first | AddressFamily::host_mask(self.host_bits())
    }

    /// Number of addresses in the network. An IPv6 `/0` holds 2^128 addresses, one more than
    /// a `u128` can represent; its size saturates at `u128::MAX`.
    pub fn size(&self) -> u128 {
        AddressFamily::host_mask(self.host_bits()).saturating_add(1)
    }

    /// The network (first) address.
    pub fn network_address(&self) -> IpAddr {
        self.address(self.first)
    }

    /// The last address in the network (the broadcast address for IPv4).
    pub fn last_address(&self) -> IpAddr {
        self.address(self.last())
    }

    /// The `n`-th address of the network, counting the network address as `0`.
    pub fn nth(&self, n: u128) -> Option<IpAddr> {
        if n > self.last() - self.first {
            return None;
        }
        Some(self.address(self.first + n))
    }

    pub(crate) fn address(&self, bits: u128) -> IpAddr {
        match self.family {
            AddressFamily::IPv4 => IpAddr::V4(Ipv4Addr::from(bits as u32)),
            AddressFamily::IPv6 => IpAddr::V6(Ipv6Addr::from(bits)),
        }
    }

    /*-------------------------------------------------------------------------
      Containment
    -------------------------------------------------------------------------*/

    /// True when `other` lies entirely inside this network.
    pub fn contains(&self, other: &Network) -> bool {
        self.family == other.family && self.first <= other.first && other.last() <= self.last()
    }

    /// True when either network contains the other.
    ///
    /// Networks carved on prefix boundaries are either nested or disjoint, so containment in
    /// either direction is the complete overlap test.
    pub fn overlaps(&self, other: &Network) -> bool {
        self.contains(other) || other.contains(self)
    }

    /// True when `address` is inside this network.
    pub fn contains_address(&self, address: IpAddr) -> bool {
        AddressFamily::of_addr(&address) == self.family && {
            let bits = addr_to_bits(address);
            self.first <= bits && bits <= self.last()
        }
    }

    /*-------------------------------------------------------------------------
      Subnets
    -------------------------------------------------------------------------*/

    /// Lazily enumerate the child subnets of `prefix_len` in ascending address order.
    ///
    /// The iterator is empty when `prefix_len` is shorter than this network's own prefix
    /// length; it fails when `prefix_len` is out of range for the address family.
    ///
    /// ```
    /// use subnetplan::Network;
    ///
    /// let parent: Network = "10.0.50.0/24".parse()?;
    /// let subnets: Vec<String> = parent.subnets(26)?.map(|s| s.to_string()).collect();
    ///
    /// assert_eq!(
    ///     subnets,
    ///     ["10.0.50.0/26", "10.0.50.64/26", "10.0.50.128/26", "10.0.50.192/26"]
    /// );
    /// # Ok::<(), subnetplan::Error>(())
    /// ```
    pub fn subnets(&self, prefix_len: u8) -> Result<Subnets> {
        if prefix_len > self.family.width() {
            return Err(Error::invalid_network(
                format!("{self} -> /{prefix_len}"),
                format!(
                    "prefix length must be 0-{} for {}",
                    self.family.width(),
                    self.family
                ),
            ));
        }
        Ok(Subnets::new(self, prefix_len))
    }
}

/*--------------------------------------------------------------------------------------
  Network Ordering
--------------------------------------------------------------------------------------*/

// Order by family, then first address, then last address.
impl Ord for Network {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.family, self.first, self.last()).cmp(&(other.family, other.first, other.last()))
    }
}

impl PartialOrd for Network {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/*--------------------------------------------------------------------------------------
  Conversions
--------------------------------------------------------------------------------------*/

impl From<IpNetwork> for Network {
    fn from(value: IpNetwork) -> Self {
        Self::from_bits(
            AddressFamily::of_network(&value),
            addr_to_bits(value.ip()),
            value.prefix(),
        )
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<IpNetwork>()
            .map(Network::from)
            .map_err(|error| Error::invalid_network(s, error))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network_address(), self.prefix_len)
    }
}

impl Serialize for Network {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

pub(crate) fn addr_to_bits(address: IpAddr) -> u128 {
    match address {
        IpAddr::V4(ipv4) => u128::from(u32::from(ipv4)),
        IpAddr::V6(ipv6) => u128::from(ipv6),
    }
}

/*-------------------------------------------------------------------------------------------------
  Subnets Iterator
-------------------------------------------------------------------------------------------------*/

/// Lazy, double-ended iterator over the equally sized child subnets of a [Network].
///
/// Subnets are generated on demand from the parent's address range, so enumerating the
/// `/128`s of an IPv6 `/64` costs nothing until the iterator is advanced.
#[derive(Clone, Debug)]
pub struct Subnets {
    family: AddressFamily,
    prefix_len: u8,
    host_mask: u128,
    front: u128,
    back: u128,
    exhausted: bool,
}

impl Subnets {
    fn new(parent: &Network, prefix_len: u8) -> Self {
        let family = parent.family();
        let host_mask = AddressFamily::host_mask(u32::from(family.width() - prefix_len));
        Self {
            family,
            prefix_len,
            host_mask,
            front: parent.first(),
            back: parent.last() & !host_mask,
            exhausted: prefix_len < parent.prefix_len(),
        }
    }

    fn subnet(&self, first: u128) -> Network {
        Network {
            family: self.family,
            first,
            prefix_len: self.prefix_len,
        }
    }
}

impl Iterator for Subnets {
    type Item = Network;

    fn next(&mut self) -> Option<Network> {
        if self.exhausted {
            return None;
        }
        let current = self.front;
        if current == self.back {
            self.exhausted = true;
        } else {
            self.front = current + self.host_mask + 1;
        }
        Some(self.subnet(current))
    }
}

impl DoubleEndedIterator for Subnets {
    fn next_back(&mut self) -> Option<Network> {
        if self.exhausted {
            return None;
        }
        let current = self.back;
        if current == self.front {
            self.exhausted = true;
        } else {
            self.back = current - self.host_mask - 1;
        }
        Some(self.subnet(current))
    }
}

impl std::iter::FusedIterator for Subnets {}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
