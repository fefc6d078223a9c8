use crate::core::address_family::AddressFamily;
use crate::core::errors::{Error, Result};
use crate::core::network::Network;
use log::{debug, trace};
use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/*-------------------------------------------------------------------------------------------------
  Simple Interface
-------------------------------------------------------------------------------------------------*/

/// _**Simple interface**_ that returns the `host`-th address of `networks` as if the networks
/// were one contiguous range.
///
/// IPv4 and IPv6 networks are walked independently. When both families produce an address
/// the result is a list (IPv4 first); a single address is returned as
/// [ConcatResult::Single] unless `want_list` is set. An explicit `prefix_len` forces
/// [HostFormat::Address] output with that prefix length.
///
/// ```
/// use subnetplan::{ipaddr_concat, HostFormat};
///
/// let networks = ["10.0.50.0/28", "10.0.50.128/25"];
///
/// let host = ipaddr_concat(&networks, 16, HostFormat::Host, None, false)?;
/// assert_eq!(host.to_string(), "10.0.50.128");
///
/// let address = ipaddr_concat(&networks, 15, HostFormat::Address, None, false)?;
/// assert_eq!(address.to_string(), "10.0.50.15/28");
/// # Ok::<(), subnetplan::Error>(())
/// ```
pub fn ipaddr_concat<I>(
    networks: I,
    host: u128,
    format: HostFormat,
    prefix_len: Option<u8>,
    want_list: bool,
) -> Result<ConcatResult>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let networks = networks
        .into_iter()
        .map(|network| network.as_ref().parse())
        .collect::<Result<Vec<Network>>>()?;

    let (ipv4, ipv6): (Vec<Network>, Vec<Network>) =
        networks.into_iter().partition(Network::is_ipv4);

    if !ipv4.is_empty() && !ipv6.is_empty() && prefix_len.is_some_and(|len| len > 0) {
        return Err(Error::MixedFamily);
    }

    let format = match prefix_len {
        Some(_) => HostFormat::Address,
        None => format,
    };

    let mut found = Vec::with_capacity(2);
    for networks in [ipv4, ipv6] {
        if networks.is_empty() {
            continue;
        }
        let range = ConcatenatedRange::new(networks)?;
        found.extend(range.host_string(host, format, prefix_len)?);
    }

    match found.len() {
        0 => Err(Error::NoAddressFound),
        1 if !want_list => Ok(ConcatResult::Single(found.remove(0))),
        _ => Ok(ConcatResult::List(found)),
    }
}

/*-------------------------------------------------------------------------------------------------
  Host Format
-------------------------------------------------------------------------------------------------*/

/// Output shape of a concatenated host lookup.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HostFormat {
    /// The bare address, e.g. `10.0.50.15`.
    #[default]
    Host,
    /// The address with a prefix length, e.g. `10.0.50.15/28`.
    Address,
}

impl FromStr for HostFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "host" => Ok(HostFormat::Host),
            "address" => Ok(HostFormat::Address),
            other => Err(Error::config(format!(
                "unknown host format '{other}', expected 'host' or 'address'"
            ))),
        }
    }
}

impl fmt::Display for HostFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostFormat::Host => write!(f, "host"),
            HostFormat::Address => write!(f, "address"),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Concat Result
-------------------------------------------------------------------------------------------------*/

/// One address, or one address per address family.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConcatResult {
    Single(String),
    List(Vec<String>),
}

impl ConcatResult {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ConcatResult::Single(value) => vec![value],
            ConcatResult::List(values) => values,
        }
    }
}

impl fmt::Display for ConcatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcatResult::Single(value) => write!(f, "{value}"),
            ConcatResult::List(values) => write!(f, "{}", values.join(", ")),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Concatenated Range
-------------------------------------------------------------------------------------------------*/

/// Networks of one address family, sorted by address and indexed as a single range.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConcatenatedRange {
    family: AddressFamily,
    networks: Vec<Network>,
}

impl ConcatenatedRange {
    /// Build a range from networks of one address family.
    ///
    /// Fails with [Error::SpanTooWide] when more than one network is given and the smallest
    /// block covering them all would be a `/0`.
    pub fn new(mut networks: Vec<Network>) -> Result<Self> {
        let family = match networks.first() {
            Some(network) => network.family(),
            None => return Err(Error::config("at least one network is required")),
        };
        if networks.iter().any(|network| network.family() != family) {
            return Err(Error::config(
                "a concatenated range cannot mix IPv4 and IPv6 networks",
            ));
        }

        networks.sort();

        if networks.len() > 1 {
            let lowest = networks.iter().map(Network::first).min().unwrap_or_default();
            let highest = networks.iter().map(Network::last).max().unwrap_or_default();
            let top_bit = 1u128 << (family.width() - 1);
            if (lowest ^ highest) & top_bit != 0 {
                return Err(Error::SpanTooWide);
            }
        }

        trace!("Concatenated {} {family} network(s)", networks.len());
        Ok(Self { family, networks })
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// Total number of addresses in the range, saturating at `u128::MAX`.
    pub fn size(&self) -> u128 {
        self.networks
            .iter()
            .fold(0u128, |total, network| total.saturating_add(network.size()))
    }

    /// The `index`-th address of the range and the network it falls in.
    pub fn nth_host(&self, index: u128) -> Option<(IpAddr, &Network)> {
        let mut remaining = index;
        for network in &self.networks {
            // `last - first` is one less than the size, so `::/0` does not overflow
            let span = network.last() - network.first();
            if remaining <= span {
                return network.nth(remaining).map(|address| (address, network));
            }
            remaining -= span + 1;
        }
        debug!("Host {index} is beyond the {} {} addresses", self.size(), self.family);
        None
    }

    /// Format the `index`-th address; `prefix_len` overrides the hit network's prefix length
    /// in [HostFormat::Address] output.
    pub fn host_string(
        &self,
        index: u128,
        format: HostFormat,
        prefix_len: Option<u8>,
    ) -> Result<Option<String>> {
        if let Some(prefix_len) = prefix_len.filter(|len| *len > self.family.width()) {
            return Err(Error::config(format!(
                "prefix length {prefix_len} is out of range for {}",
                self.family
            )));
        }

        Ok(self.nth_host(index).map(|(address, network)| match format {
            HostFormat::Host => address.to_string(),
            HostFormat::Address => {
                let prefix_len = prefix_len
                    .filter(|len| *len > 0)
                    .unwrap_or(network.prefix_len());
                format!("{address}/{prefix_len}")
            }
        }))
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
