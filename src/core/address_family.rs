use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;

/*-------------------------------------------------------------------------------------------------
  Address Family
-------------------------------------------------------------------------------------------------*/

/// IP address family (IPv4 or IPv6) of a network or a prefix-length request.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AddressFamily {
    IPv4,
    IPv6,
}

impl AddressFamily {
    pub fn is_ipv4(&self) -> bool {
        match self {
            AddressFamily::IPv4 => true,
            AddressFamily::IPv6 => false,
        }
    }

    pub fn is_ipv6(&self) -> bool {
        match self {
            AddressFamily::IPv4 => false,
            AddressFamily::IPv6 => true,
        }
    }

    /// The IP version number, `4` or `6`.
    pub fn version(&self) -> u8 {
        match self {
            AddressFamily::IPv4 => 4,
            AddressFamily::IPv6 => 6,
        }
    }

    /// Number of bits in an address of this family; also the longest valid prefix length.
    pub fn width(&self) -> u8 {
        match self {
            AddressFamily::IPv4 => 32,
            AddressFamily::IPv6 => 128,
        }
    }

    /// Convert a number of host bits into the equivalent prefix length.
    ///
    /// Returns `None` when the block would be larger than the whole address space.
    pub fn prefix_from_bits(&self, host_bits: u32) -> Option<u8> {
        u32::from(self.width())
            .checked_sub(host_bits)
            .map(|prefix_len| prefix_len as u8)
    }

    /// Classify a signed prefix-length request: magnitudes up to 32 are IPv4,
    /// anything larger is IPv6.
    pub fn of_request(size: i32) -> Self {
        if size.unsigned_abs() <= 32 {
            AddressFamily::IPv4
        } else {
            AddressFamily::IPv6
        }
    }

    pub(crate) fn of_network(network: &IpNetwork) -> Self {
        match network {
            IpNetwork::V4(_) => AddressFamily::IPv4,
            IpNetwork::V6(_) => AddressFamily::IPv6,
        }
    }

    pub(crate) fn of_addr(address: &IpAddr) -> Self {
        match address {
            IpAddr::V4(_) => AddressFamily::IPv4,
            IpAddr::V6(_) => AddressFamily::IPv6,
        }
    }

    /// Bit mask covering `host_bits` low-order bits.
    pub(crate) fn host_mask(host_bits: u32) -> u128 {
        u128::MAX.checked_shr(128 - host_bits).unwrap_or(0)
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::IPv4 => write!(f, "IPv4"),
            AddressFamily::IPv6 => write!(f, "IPv6"),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    /*----------------------------------------------------------------------------------
      AddressFamily
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_address_family_is_ipv4() {
        let ipv4 = AddressFamily::IPv4;
        assert!(ipv4.is_ipv4());
        assert!(!ipv4.is_ipv6());
        assert_eq!(ipv4.width(), 32);
        assert_eq!(ipv4.version(), 4);
    }

    #[test]
    fn test_address_family_is_ipv6() {
        let ipv6 = AddressFamily::IPv6;
        assert!(!ipv6.is_ipv4());
        assert!(ipv6.is_ipv6());
        assert_eq!(ipv6.width(), 128);
        assert_eq!(ipv6.version(), 6);
    }

    #[test]
    fn test_prefix_from_bits() {
        assert_eq!(AddressFamily::IPv4.prefix_from_bits(7), Some(25));
        assert_eq!(AddressFamily::IPv6.prefix_from_bits(64), Some(64));
        assert_eq!(AddressFamily::IPv4.prefix_from_bits(33), None);
    }

    #[test]
    fn test_of_request() {
        assert_eq!(AddressFamily::of_request(24), AddressFamily::IPv4);
        assert_eq!(AddressFamily::of_request(-32), AddressFamily::IPv4);
        assert_eq!(AddressFamily::of_request(33), AddressFamily::IPv6);
        assert_eq!(AddressFamily::of_request(-64), AddressFamily::IPv6);
    }

    #[test]
    fn test_host_mask() {
        assert_eq!(AddressFamily::host_mask(0), 0);
        assert_eq!(AddressFamily::host_mask(8), 0xff);
        assert_eq!(AddressFamily::host_mask(128), u128::MAX);
    }
}
