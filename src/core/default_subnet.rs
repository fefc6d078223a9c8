use crate::core::address_family::AddressFamily;
use crate::core::errors::{Error, Result};
use crate::core::network::Network;
use crate::core::subnet_map::NamedSubnets;
use log::{debug, warn};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/*-------------------------------------------------------------------------------------------------
  Simple Interface
-------------------------------------------------------------------------------------------------*/

/// _**Simple interface**_ that lays out the default `switches`, `hosts`, `vips` and `clients`
/// groups in every network definition.
///
/// ```
/// use subnetplan::NetworkDefinitions;
///
/// let definitions: NetworkDefinitions =
///     serde_json::from_str(r#"{"ceph": {"cidr": "10.0.23.0/24", "vlan": 23}}"#)?;
/// let layout = subnetplan::default_subnet(&definitions)?;
///
/// assert_eq!(
///     serde_json::to_string(&layout)?,
///     concat!(
///         r#"{"ceph":{"switches":["10.0.23.0/28"],"hosts":["10.0.23.16/28"],"#,
///         r#""vips":["10.0.23.32/27"],"clients":["10.0.23.64/26","10.0.23.128/25"]}}"#
///     )
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn default_subnet(definitions: &NetworkDefinitions) -> Result<DefaultSubnets> {
    DefaultLayout::new().layout(definitions)
}

/*-------------------------------------------------------------------------------------------------
  Network Definitions
-------------------------------------------------------------------------------------------------*/

/// The parent networks of one named network. Other fields of the definition, like a VLAN id,
/// are ignored.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct NetworkDefinition {
    #[serde(default, rename = "cidr")]
    pub ipv4: Option<Network>,

    #[serde(default, rename = "cidr6")]
    pub ipv6: Option<Network>,
}

impl NetworkDefinition {
    pub fn new(ipv4: Option<Network>, ipv6: Option<Network>) -> Self {
        Self { ipv4, ipv6 }
    }
}

/// Named network definitions, kept in insertion order.
///
/// Deserializes from a JSON object of names to objects with optional `cidr` and `cidr6` keys.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NetworkDefinitions {
    entries: Vec<(String, NetworkDefinition)>,
}

impl NetworkDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the definition for `name`. An existing name keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, definition: NetworkDefinition) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = definition,
            None => self.entries.push((name, definition)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NetworkDefinition)> {
        self.entries
            .iter()
            .map(|(name, definition)| (name.as_str(), definition))
    }
}

impl<N: Into<String>> FromIterator<(N, NetworkDefinition)> for NetworkDefinitions {
    fn from_iter<I: IntoIterator<Item = (N, NetworkDefinition)>>(iter: I) -> Self {
        let mut definitions = NetworkDefinitions::new();
        for (name, definition) in iter {
            definitions.insert(name, definition);
        }
        definitions
    }
}

impl<'de> Deserialize<'de> for NetworkDefinitions {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NetworkDefinitionsVisitor;

        impl<'de> Visitor<'de> for NetworkDefinitionsVisitor {
            type Value = NetworkDefinitions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of network names to network definitions")
            }

            fn visit_map<A>(
                self,
                mut access: A,
            ) -> std::result::Result<NetworkDefinitions, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut definitions = NetworkDefinitions::new();
                while let Some((name, definition)) =
                    access.next_entry::<String, NetworkDefinition>()?
                {
                    definitions.insert(name, definition);
                }
                Ok(definitions)
            }
        }

        deserializer.deserialize_map(NetworkDefinitionsVisitor)
    }
}

/*-------------------------------------------------------------------------------------------------
  Default Layout
-------------------------------------------------------------------------------------------------*/

/// Networks that get no `clients` group.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum NoClients {
    /// Every network gets a `clients` group.
    #[default]
    Nowhere,
    /// No network gets a `clients` group.
    Everywhere,
    /// The named networks get no `clients` group.
    In(BTreeSet<String>),
}

impl NoClients {
    fn applies_to(&self, name: &str) -> bool {
        match self {
            NoClients::Nowhere => false,
            NoClients::Everywhere => true,
            NoClients::In(names) => names.contains(name),
        }
    }
}

/// Options for laying out the default subnet groups.
///
/// An IPv4 network must be a `/24` or larger. It is split into `switches` (the first `/28`),
/// `hosts` (the second `/28`), `vips` (the second `/27`) and `clients` (the second `/26` and
/// the second `/25`). An IPv6 network must be a `/64` and is split into four `/80`s in the same
/// group order. Networks of other sizes are skipped with a warning.
///
/// ```
/// use subnetplan::{DefaultLayout, NetworkDefinition, NetworkDefinitions};
///
/// let definitions: NetworkDefinitions = [
///     ("ceph", NetworkDefinition::new(Some("10.0.23.0/24".parse()?), None)),
///     ("mgmt", NetworkDefinition::new(Some("10.0.24.0/24".parse()?), None)),
/// ]
/// .into_iter()
/// .collect();
/// let layout = DefaultLayout::new()
///     .no_clients_in(["ceph"])
///     .skip_nets(["mgmt"])
///     .layout(&definitions)?;
///
/// assert_eq!(layout.len(), 1);
/// assert_eq!(layout.get("ceph").unwrap().get("clients"), None);
/// # Ok::<(), subnetplan::Error>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DefaultLayout {
    no_clients: NoClients,
    skip_nets: BTreeSet<String>,
}

impl DefaultLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_clients(mut self, no_clients: NoClients) -> Self {
        self.no_clients = no_clients;
        self
    }

    /// Leave out the `clients` group of the named networks.
    pub fn no_clients_in<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_clients(NoClients::In(names.into_iter().map(Into::into).collect()))
    }

    /// Leave the named networks out of the layout.
    pub fn skip_nets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_nets = names.into_iter().map(Into::into).collect();
        self
    }

    /// Lay out every definition that is not skipped, in definition order. For each group the
    /// IPv4 subnets precede the IPv6 subnets.
    pub fn layout(&self, definitions: &NetworkDefinitions) -> Result<DefaultSubnets> {
        let mut default_subnets = DefaultSubnets::default();

        for (name, definition) in definitions.iter() {
            if self.skip_nets.contains(name) {
                debug!("Skipping network '{name}'");
                continue;
            }
            let clients = !self.no_clients.applies_to(name);

            let mut groups = NamedSubnets::default();
            if let Some(network) = &definition.ipv4 {
                for (group, subnets) in split_ipv4(network, clients)? {
                    groups.extend_group(group, subnets);
                }
            }
            if let Some(network) = &definition.ipv6 {
                for (group, subnets) in split_ipv6(network, clients)? {
                    groups.extend_group(group, subnets);
                }
            }
            default_subnets.entries.push((name.to_string(), groups));
        }

        Ok(default_subnets)
    }
}

type Groups = Vec<(&'static str, Vec<Network>)>;

fn split_ipv4(network: &Network, clients: bool) -> Result<Groups> {
    if !network.is_ipv4() {
        warn!("default_subnet: '{network}' is not an {} network", AddressFamily::IPv4);
        return Ok(Groups::new());
    }
    if network.prefix_len() > 24 {
        warn!("default_subnet: '{network}' too small");
        return Ok(Groups::new());
    }

    let mut groups = vec![
        ("switches", vec![nth_subnet(network, 28, 0)?]),
        ("hosts", vec![nth_subnet(network, 28, 1)?]),
        ("vips", vec![nth_subnet(network, 27, 1)?]),
    ];
    if clients {
        groups.push((
            "clients",
            vec![nth_subnet(network, 26, 1)?, nth_subnet(network, 25, 1)?],
        ));
    }
    Ok(groups)
}

fn split_ipv6(network: &Network, clients: bool) -> Result<Groups> {
    if !network.is_ipv6() {
        warn!("default_subnet: '{network}' is not an {} network", AddressFamily::IPv6);
        return Ok(Groups::new());
    }
    if network.prefix_len() != 64 {
        warn!("default_subnet: '{network}' must be of size /64");
        return Ok(Groups::new());
    }

    let mut subnets = network.subnets(80)?;
    let mut groups = Groups::new();
    for group in ["switches", "hosts", "vips", "clients"] {
        if group == "clients" && !clients {
            break;
        }
        let subnet = subnets.next().ok_or(Error::NetworkTooSmall(*network))?;
        groups.push((group, vec![subnet]));
    }
    Ok(groups)
}

fn nth_subnet(network: &Network, prefix_len: u8, n: usize) -> Result<Network> {
    network
        .subnets(prefix_len)?
        .nth(n)
        .ok_or(Error::NetworkTooSmall(*network))
}

/*-------------------------------------------------------------------------------------------------
  Default Subnets
-------------------------------------------------------------------------------------------------*/

/// Subnet groups per network name, in definition order. Serializes as a map of network names
/// to maps of group names to lists of CIDR strings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DefaultSubnets {
    entries: Vec<(String, NamedSubnets)>,
}

impl DefaultSubnets {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&NamedSubnets> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, groups)| groups)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamedSubnets)> {
        self.entries
            .iter()
            .map(|(name, groups)| (name.as_str(), groups))
    }

    /// Reorder the groups of every network by address, see [NamedSubnets::sort_by_address].
    pub fn sort_by_address(&mut self) {
        for (_, groups) in &mut self.entries {
            groups.sort_by_address();
        }
    }
}

impl Serialize for DefaultSubnets {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, groups) in &self.entries {
            map.serialize_entry(name, groups)?;
        }
        map.end()
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
