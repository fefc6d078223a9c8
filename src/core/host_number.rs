use crate::core::address_family::AddressFamily;
use crate::core::errors::{Error, Result};
use crate::core::network::{addr_to_bits, Network};
use std::net::IpAddr;

/// Offset of `address` from the first address of `network`.
///
/// Without a network the address is assumed to be in its `/24` (IPv4) or `/64` (IPv6).
///
/// ```
/// use subnetplan::host_number;
///
/// assert_eq!(host_number("10.0.50.77".parse()?, None)?, 77);
/// assert_eq!(host_number("10.0.50.77".parse()?, Some(&"10.0.48.0/22".parse()?))?, 589);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn host_number(address: IpAddr, network: Option<&Network>) -> Result<u128> {
    let network = match network {
        Some(network) => *network,
        None => Network::new(address, default_prefix_len(AddressFamily::of_addr(&address)))?,
    };

    if !network.contains_address(address) {
        return Err(Error::AddressNotInNetwork { address, network });
    }

    Ok(addr_to_bits(address) - network.first())
}

fn default_prefix_len(family: AddressFamily) -> u8 {
    match family {
        AddressFamily::IPv4 => 24,
        AddressFamily::IPv6 => 64,
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn addr(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_ipv4_network() {
        assert_eq!(host_number(addr("172.27.3.10"), None).unwrap(), 10);
    }

    #[test]
    fn test_default_ipv6_network() {
        assert_eq!(host_number(addr("fd00:172:27::1:5"), None).unwrap(), 0x1_0005);
    }

    #[test]
    fn test_explicit_network() {
        let network: Network = "172.27.0.0/16".parse().unwrap();
        assert_eq!(host_number(addr("172.27.3.10"), Some(&network)).unwrap(), 778);
    }

    #[test]
    fn test_address_not_in_network() {
        let network: Network = "172.27.0.0/16".parse().unwrap();
        let error = host_number(addr("10.0.50.1"), Some(&network)).unwrap_err();
        assert_eq!(
            error.to_string(),
            "address '10.0.50.1' is not in network '172.27.0.0/16'"
        );
    }

    #[test]
    fn test_family_mismatch_is_not_in_network() {
        let network: Network = "fd00:172:27::/64".parse().unwrap();
        let result = host_number(addr("10.0.50.1"), Some(&network));
        assert!(matches!(result, Err(Error::AddressNotInNetwork { .. })));
    }
}
