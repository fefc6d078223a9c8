use crate::core::address_family::AddressFamily;
use crate::core::allocator::{next_of_size, PrefixRequest};
use crate::core::errors::{Error, Result};
use crate::core::network::Network;
use crate::core::placement::PlacementSet;
use crate::core::planner::Start;
use log::{debug, trace};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/*-------------------------------------------------------------------------------------------------
  Simple Interface
-------------------------------------------------------------------------------------------------*/

/// _**Simple interface**_ that allocates the prefix lengths of every named group in
/// `subnet_map` out of an optional IPv4 parent and an optional IPv6 parent.
///
/// ```
/// use subnetplan::SubnetMap;
///
/// let subnet_map: SubnetMap = serde_json::from_str(r#"{"svc": [24, 64], "pod": [24, 64]}"#)?;
/// let subnets =
///     subnetplan::subnets_from_map(Some("172.27.0.0/16"), Some("fd00:172:27::/56"), &subnet_map)?;
///
/// assert_eq!(
///     serde_json::to_string(&subnets)?,
///     r#"{"svc":["172.27.0.0/24","fd00:172:27::/64"],"pod":["172.27.1.0/24","fd00:172:27:1::/64"]}"#
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn subnets_from_map(
    ipv4_network: Option<&str>,
    ipv6_network: Option<&str>,
    subnet_map: &SubnetMap,
) -> Result<NamedSubnets> {
    let mut builder = MapPlanBuilder::new();
    if let Some(network) = ipv4_network {
        builder = builder.ipv4(FamilyOptions::new(network.parse()?));
    }
    if let Some(network) = ipv6_network {
        builder = builder.ipv6(FamilyOptions::new(network.parse()?));
    }
    builder.build()?.allocate(subnet_map)
}

/*-------------------------------------------------------------------------------------------------
  One Or Many
-------------------------------------------------------------------------------------------------*/

/// A single value or a list of values; normalized to a list with [OneOrMany::into_vec].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl From<i32> for OneOrMany<i32> {
    fn from(value: i32) -> Self {
        OneOrMany::One(value)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        OneOrMany::Many(values)
    }
}

impl<T, const N: usize> From<[T; N]> for OneOrMany<T> {
    fn from(values: [T; N]) -> Self {
        OneOrMany::Many(values.into())
    }
}

/*-------------------------------------------------------------------------------------------------
  Subnet Map
-------------------------------------------------------------------------------------------------*/

/// Named groups of signed prefix-length requests, kept in insertion order.
///
/// Requests of magnitude 32 or less are IPv4 requests; larger magnitudes are IPv6 requests.
/// Deserializes from a JSON object whose values are a prefix length or a list of them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SubnetMap {
    entries: Vec<(String, Vec<i32>)>,
}

impl SubnetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requests for `name`. An existing name keeps its position.
    pub fn insert<N, S>(&mut self, name: N, sizes: S)
    where
        N: Into<String>,
        S: Into<OneOrMany<i32>>,
    {
        let name = name.into();
        let sizes = sizes.into().into_vec();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing_sizes)) => *existing_sizes = sizes,
            None => self.entries.push((name, sizes)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[i32])> {
        self.entries
            .iter()
            .map(|(name, sizes)| (name.as_str(), sizes.as_slice()))
    }

    /// The requests in `sizes` that belong to `family`.
    fn family_sizes(&self, sizes: &[i32], family: AddressFamily) -> Vec<i32> {
        sizes
            .iter()
            .copied()
            .filter(|size| AddressFamily::of_request(*size) == family)
            .collect()
    }

    /// The request size shared by every `family` request in the map, if there is exactly one.
    fn uniform_size(&self, family: AddressFamily) -> Option<i32> {
        let sizes: BTreeSet<i32> = self
            .entries
            .iter()
            .flat_map(|(_, sizes)| self.family_sizes(sizes, family))
            .collect();
        match sizes.len() {
            1 => sizes.into_iter().next(),
            _ => None,
        }
    }
}

impl<N, S> FromIterator<(N, S)> for SubnetMap
where
    N: Into<String>,
    S: Into<OneOrMany<i32>>,
{
    fn from_iter<I: IntoIterator<Item = (N, S)>>(iter: I) -> Self {
        let mut subnet_map = SubnetMap::new();
        for (name, sizes) in iter {
            subnet_map.insert(name, sizes);
        }
        subnet_map
    }
}

impl<'de> Deserialize<'de> for SubnetMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SubnetMapVisitor;

        impl<'de> Visitor<'de> for SubnetMapVisitor {
            type Value = SubnetMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of subnet names to one or more prefix lengths")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<SubnetMap, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut subnet_map = SubnetMap::new();
                while let Some((name, sizes)) = access.next_entry::<String, OneOrMany<i32>>()? {
                    subnet_map.insert(name, sizes);
                }
                Ok(subnet_map)
            }
        }

        deserializer.deserialize_map(SubnetMapVisitor)
    }
}

/*-------------------------------------------------------------------------------------------------
  Family Options
-------------------------------------------------------------------------------------------------*/

/// Parent network and allocation options for one address family of a [SubnetMap].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FamilyOptions {
    network: Network,
    size: Option<i32>,
    start: u128,
    prefix_skip: u128,
}

impl FamilyOptions {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            size: None,
            start: 0,
            prefix_skip: 0,
        }
    }

    /// Default request size for names with no requests of this family. Also sets the block
    /// size used by [FamilyOptions::prefix_skip].
    pub fn size(mut self, size: i32) -> Self {
        self.size = Some(size);
        self
    }

    /// Offset, in addresses from the start of the network, that subnets must start after.
    /// Takes precedence over [FamilyOptions::prefix_skip].
    pub fn start(mut self, start: u128) -> Self {
        self.start = start;
        self
    }

    /// Start allocating after `prefix_skip - 1` blocks of the family's request size.
    pub fn prefix_skip(mut self, prefix_skip: u128) -> Self {
        self.prefix_skip = prefix_skip;
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Allocate this family's requests for every name, in map order.
    fn allocate(&self, subnet_map: &SubnetMap) -> Result<Vec<Vec<Network>>> {
        let family = self.network.family();
        let mut default_size = self.size;

        let start = if self.start > 0 {
            Start::Offset(self.start)
        } else if self.prefix_skip > 0 {
            if default_size.is_none() {
                default_size = subnet_map.uniform_size(family);
            }
            let size = default_size.ok_or_else(|| {
                Error::config(format!(
                    "v{0}_size is required if subnets are different sizes when using v{0}_prefix_skip",
                    family.version()
                ))
            })?;
            Start::SkipBlocks {
                blocks: self.prefix_skip,
                prefix_len: PrefixRequest::try_from(size)?.prefix_len(),
            }
        } else {
            Start::Beginning
        };
        let start = start.resolve(&self.network)?;

        let mut placed = PlacementSet::new();
        let mut allocated = Vec::with_capacity(subnet_map.len());

        for (name, sizes) in subnet_map.iter() {
            let mut sizes = subnet_map.family_sizes(sizes, family);
            if sizes.is_empty() {
                trace!("No {family} requests for '{name}'; default size {default_size:?}");
                sizes.extend(default_size);
            }

            let mut subnets = Vec::with_capacity(sizes.len());
            for size in sizes {
                let subnet = PrefixRequest::try_from(size)
                    .and_then(|request| next_of_size(&self.network, &placed, request, start))
                    .map_err(|error| error.context(format!("subnet '{name}'")))?;
                placed.insert(subnet);
                subnets.push(subnet);
            }
            allocated.push(subnets);
        }

        debug!(
            "Allocated {} {family} subnet(s) in {}",
            placed.len(),
            self.network
        );
        Ok(allocated)
    }
}

/*-------------------------------------------------------------------------------------------------
  Map Plan Builder
-------------------------------------------------------------------------------------------------*/

/// Builder for a [MapPlan]; each address family is planned only when its parent network is
/// given.
///
/// ```
/// use subnetplan::{FamilyOptions, MapPlanBuilder, SubnetMap};
///
/// let subnet_map: SubnetMap = ["svc", "pod"]
///     .into_iter()
///     .map(|name| (name, Vec::<i32>::new()))
///     .collect();
/// let subnets = MapPlanBuilder::new()
///     .ipv4(FamilyOptions::new("172.27.0.0/16".parse()?).size(24))
///     .build()?
///     .allocate(&subnet_map)?;
///
/// assert_eq!(subnets.get("pod").unwrap()[0].to_string(), "172.27.1.0/24");
/// # Ok::<(), subnetplan::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct MapPlanBuilder {
    ipv4: Option<FamilyOptions>,
    ipv6: Option<FamilyOptions>,
}

impl MapPlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan IPv4 requests inside the options' network.
    pub fn ipv4(mut self, options: FamilyOptions) -> Self {
        self.ipv4 = Some(options);
        self
    }

    /// Plan IPv6 requests inside the options' network.
    pub fn ipv6(mut self, options: FamilyOptions) -> Self {
        self.ipv6 = Some(options);
        self
    }

    /// Validate that each parent network belongs to the family it was given for.
    pub fn build(self) -> Result<MapPlan> {
        let checks = [
            (&self.ipv4, AddressFamily::IPv4),
            (&self.ipv6, AddressFamily::IPv6),
        ];
        for (options, family) in checks {
            if let Some(options) = options {
                if options.network.family() != family {
                    return Err(Error::config(format!(
                        "'{}' is not an {family} network",
                        options.network
                    )));
                }
            }
        }
        Ok(MapPlan {
            ipv4: self.ipv4,
            ipv6: self.ipv6,
        })
    }
}

/// A validated plan for allocating a [SubnetMap] in dual-stack parent networks.
#[derive(Clone, Debug)]
pub struct MapPlan {
    ipv4: Option<FamilyOptions>,
    ipv6: Option<FamilyOptions>,
}

impl MapPlan {
    /// Allocate every name's requests. Each family is allocated independently in its own
    /// parent network; for each name the IPv4 subnets precede the IPv6 subnets.
    pub fn allocate(&self, subnet_map: &SubnetMap) -> Result<NamedSubnets> {
        let per_family = [&self.ipv4, &self.ipv6]
            .into_iter()
            .flatten()
            .map(|options| options.allocate(subnet_map))
            .collect::<Result<Vec<_>>>()?;

        let mut named_subnets = NamedSubnets::default();
        for (index, name) in subnet_map.names().enumerate() {
            let subnets = per_family
                .iter()
                .flat_map(|family| family[index].iter().copied())
                .collect();
            named_subnets.entries.push((name.to_string(), subnets));
        }
        Ok(named_subnets)
    }
}

/*-------------------------------------------------------------------------------------------------
  Named Subnets
-------------------------------------------------------------------------------------------------*/

/// Allocated subnets per name, in the order the names appeared in the [SubnetMap].
/// Serializes as a map of names to lists of CIDR strings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NamedSubnets {
    entries: Vec<(String, Vec<Network>)>,
}

impl NamedSubnets {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&[Network]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, subnets)| subnets.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Network])> {
        self.entries
            .iter()
            .map(|(name, subnets)| (name.as_str(), subnets.as_slice()))
    }

    /// Reorder the names by the lowest first address among their subnets. Names with equal
    /// lowest addresses keep their relative order; names without subnets move to the end.
    ///
    /// ```
    /// use subnetplan::SubnetMap;
    ///
    /// let subnet_map: SubnetMap = serde_json::from_str(r#"{"svc": -26, "pod": 26}"#)?;
    /// let mut subnets = subnetplan::subnets_from_map(Some("10.0.50.0/24"), None, &subnet_map)?;
    /// subnets.sort_by_address();
    ///
    /// assert_eq!(subnets.iter().map(|(name, _)| name).collect::<Vec<_>>(), ["pod", "svc"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn sort_by_address(&mut self) {
        self.entries.sort_by_key(|(_, subnets)| {
            let lowest = subnets.iter().map(Network::first).min();
            (lowest.is_none(), lowest)
        });
    }

    /// Append `subnets` to the group `name`, adding the group if it is new.
    pub(crate) fn extend_group(&mut self, name: &str, subnets: impl IntoIterator<Item = Network>) {
        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing_subnets)) => existing_subnets.extend(subnets),
            None => self.entries.push((name.to_string(), subnets.into_iter().collect())),
        }
    }
}

impl Serialize for NamedSubnets {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, subnets) in &self.entries {
            map.serialize_entry(name, subnets)?;
        }
        map.end()
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn net(s: &str) -> Network {
        s.parse().unwrap()
    }

    fn subnet_map(json: &str) -> SubnetMap {
        serde_json::from_str(json).unwrap()
    }

    fn plan(ipv4: Option<FamilyOptions>, ipv6: Option<FamilyOptions>) -> MapPlan {
        let mut builder = MapPlanBuilder::new();
        if let Some(options) = ipv4 {
            builder = builder.ipv4(options);
        }
        if let Some(options) = ipv6 {
            builder = builder.ipv6(options);
        }
        builder.build().unwrap()
    }

    fn strings(named_subnets: &NamedSubnets) -> Vec<(String, Vec<String>)> {
        named_subnets
            .iter()
            .map(|(name, subnets)| {
                (
                    name.to_string(),
                    subnets.iter().map(Network::to_string).collect(),
                )
            })
            .collect()
    }

    fn expected(entries: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        entries
            .iter()
            .map(|(name, subnets)| {
                (
                    name.to_string(),
                    subnets.iter().map(|subnet| subnet.to_string()).collect(),
                )
            })
            .collect()
    }

    /*----------------------------------------------------------------------------------
      SubnetMap
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_subnet_map_keeps_document_order() {
        let map = subnet_map(r#"{"svc": 27, "pod": [26, 64], "test": []}"#);
        assert_eq!(map.names().collect::<Vec<_>>(), ["svc", "pod", "test"]);
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            [
                ("svc", &[27][..]),
                ("pod", &[26, 64][..]),
                ("test", &[][..])
            ]
        );
    }

    #[test]
    fn test_subnet_map_insert_replaces_in_place() {
        let mut map = SubnetMap::new();
        map.insert("svc", 24);
        map.insert("pod", [24, 64]);
        map.insert("svc", vec![25]);
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            [("svc", &[25][..]), ("pod", &[24, 64][..])]
        );
    }

    #[test]
    fn test_uniform_size() {
        let map = subnet_map(r#"{"svc": [24, 64], "pod": [24, 80]}"#);
        assert_eq!(map.uniform_size(AddressFamily::IPv4), Some(24));
        assert_eq!(map.uniform_size(AddressFamily::IPv6), None);
    }

    #[test]
    fn test_one_or_many() {
        assert_eq!(OneOrMany::One(24).into_vec(), vec![24]);
        assert_eq!(OneOrMany::Many(vec![24, 64]).into_vec(), vec![24, 64]);
        let parsed: OneOrMany<i32> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(parsed, OneOrMany::Many(vec![1, 2]));
    }

    /*----------------------------------------------------------------------------------
      IPv4 Only
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_v4_only_auto() {
        let map = subnet_map(r#"{"svc": [], "pod": [], "test": []}"#);
        let result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16")).size(24)),
            None,
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.0.0/24"]),
                ("pod", &["172.27.1.0/24"]),
                ("test", &["172.27.2.0/24"]),
            ])
        );
    }

    #[test]
    fn test_v4_only_start() {
        let map = subnet_map(r#"{"svc": 18, "pod": 18, "test": 18}"#);
        let result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16")).start(31)),
            None,
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.64.0/18"]),
                ("pod", &["172.27.128.0/18"]),
                ("test", &["172.27.192.0/18"]),
            ])
        );
    }

    #[test]
    fn test_v4_only_skip_derives_size_from_map() {
        let map = subnet_map(r#"{"svc": 24, "pod": 24, "test": 24}"#);
        let result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16")).prefix_skip(2)),
            None,
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.2.0/24"]),
                ("pod", &["172.27.3.0/24"]),
                ("test", &["172.27.4.0/24"]),
            ])
        );
    }

    #[test]
    fn test_v4_skip_with_mixed_sizes_requires_size() {
        let map = subnet_map(r#"{"svc": 24, "pod": 25}"#);
        let error = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16")).prefix_skip(2)),
            None,
        )
        .allocate(&map)
        .unwrap_err();
        assert_eq!(
            error.to_string(),
            "v4_size is required if subnets are different sizes when using v4_prefix_skip"
        );
    }

    #[test]
    fn test_v4_only() {
        let map = subnet_map(r#"{"svc": 18, "pod": 18, "test": 18}"#);
        let result = plan(Some(FamilyOptions::new(net("172.27.0.0/16"))), None)
            .allocate(&map)
            .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.0.0/18"]),
                ("pod", &["172.27.64.0/18"]),
                ("test", &["172.27.128.0/18"]),
            ])
        );
    }

    #[test]
    fn test_v4_only_mixed() {
        let map = subnet_map(r#"{"svc": 27, "pod": 26, "test": 30, "test2": 25}"#);
        let result = plan(Some(FamilyOptions::new(net("172.27.0.0/16"))), None)
            .allocate(&map)
            .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.0.0/27"]),
                ("pod", &["172.27.0.64/26"]),
                ("test", &["172.27.0.32/30"]),
                ("test2", &["172.27.0.128/25"]),
            ])
        );
    }

    #[test]
    fn test_v4_only_mixed_multiple() {
        let map = subnet_map(
            r#"{"svc": [27, 27, 28], "pod": 26, "test": [30, 29], "test2": [27, 25]}"#,
        );
        let result = plan(Some(FamilyOptions::new(net("172.27.0.0/16"))), None)
            .allocate(&map)
            .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.0.0/27", "172.27.0.32/27", "172.27.0.64/28"]),
                ("pod", &["172.27.0.128/26"]),
                ("test", &["172.27.0.80/30", "172.27.0.88/29"]),
                ("test2", &["172.27.0.96/27", "172.27.1.0/25"]),
            ])
        );
    }

    /*----------------------------------------------------------------------------------
      IPv6 Only
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_v6_only_auto() {
        let map = subnet_map(r#"{"svc": [], "pod": [], "test": []}"#);
        let result = plan(
            None,
            Some(FamilyOptions::new(net("fd00:172:27::/56")).size(80)),
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["fd00:172:27::/80"]),
                ("pod", &["fd00:172:27:0:1::/80"]),
                ("test", &["fd00:172:27:0:2::/80"]),
            ])
        );
    }

    #[test]
    fn test_v6_only() {
        let map = subnet_map(r#"{"svc": 64, "pod": 64, "test": 64}"#);
        let result = plan(None, Some(FamilyOptions::new(net("fd00:172:27::/56"))))
            .allocate(&map)
            .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["fd00:172:27::/64"]),
                ("pod", &["fd00:172:27:1::/64"]),
                ("test", &["fd00:172:27:2::/64"]),
            ])
        );
    }

    #[test]
    fn test_v6_only_skip() {
        let map = subnet_map(r#"{"svc": 64, "pod": 64, "test": 64}"#);
        let result = plan(
            None,
            Some(FamilyOptions::new(net("fd00:172:27::/56")).prefix_skip(2)),
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["fd00:172:27:2::/64"]),
                ("pod", &["fd00:172:27:3::/64"]),
                ("test", &["fd00:172:27:4::/64"]),
            ])
        );
    }

    #[test]
    fn test_v6_only_start() {
        let map = subnet_map(r#"{"svc": 114, "pod": 114, "test": 114}"#);
        let result = plan(
            None,
            Some(FamilyOptions::new(net("fd00:172:27::/112")).start(31)),
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["fd00:172:27::4000/114"]),
                ("pod", &["fd00:172:27::8000/114"]),
                ("test", &["fd00:172:27::c000/114"]),
            ])
        );
    }

    #[test]
    fn test_v6_only_mixed() {
        let map = subnet_map(r#"{"svc": [64, 64], "pod": [64, 77, 80], "test": [64, 65, 70]}"#);
        let result = plan(None, Some(FamilyOptions::new(net("fd00:172:27::/56"))))
            .allocate(&map)
            .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["fd00:172:27::/64", "fd00:172:27:1::/64"]),
                (
                    "pod",
                    &[
                        "fd00:172:27:2::/64",
                        "fd00:172:27:3::/77",
                        "fd00:172:27:3:8::/80"
                    ]
                ),
                (
                    "test",
                    &[
                        "fd00:172:27:4::/64",
                        "fd00:172:27:3:8000::/65",
                        "fd00:172:27:3:400::/70"
                    ]
                ),
            ])
        );
    }

    /*----------------------------------------------------------------------------------
      Dual Stack
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_dual_stack_auto() {
        let map = subnet_map(r#"{"svc": [], "pod": [], "test": []}"#);
        let result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16")).size(27)),
            Some(FamilyOptions::new(net("fd00:172:27::/56")).size(88)),
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.0.0/27", "fd00:172:27::/88"]),
                ("pod", &["172.27.0.32/27", "fd00:172:27::100:0:0/88"]),
                ("test", &["172.27.0.64/27", "fd00:172:27::200:0:0/88"]),
            ])
        );
    }

    #[test]
    fn test_dual_stack() {
        let map = subnet_map(r#"{"svc": [18, 114], "pod": [18, 114], "test": [18, 114]}"#);
        let result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16"))),
            Some(FamilyOptions::new(net("fd00:172:27::/112"))),
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.0.0/18", "fd00:172:27::/114"]),
                ("pod", &["172.27.64.0/18", "fd00:172:27::4000/114"]),
                ("test", &["172.27.128.0/18", "fd00:172:27::8000/114"]),
            ])
        );
    }

    #[test]
    fn test_dual_stack_start() {
        let map = subnet_map(r#"{"svc": [18, 114], "pod": [18, 114], "test": [18, 114]}"#);
        let result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16")).start(31)),
            Some(FamilyOptions::new(net("fd00:172:27::/112")).start(31)),
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.64.0/18", "fd00:172:27::4000/114"]),
                ("pod", &["172.27.128.0/18", "fd00:172:27::8000/114"]),
                ("test", &["172.27.192.0/18", "fd00:172:27::c000/114"]),
            ])
        );
    }

    #[test]
    fn test_dual_stack_mixed() {
        let map = subnet_map(
            r#"{"svc": [27, 80], "pod": [26, 64], "test": [30, 96], "test2": [25, 60]}"#,
        );
        let result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16"))),
            Some(FamilyOptions::new(net("fd00:172:27::/56"))),
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.0.0/27", "fd00:172:27::/80"]),
                ("pod", &["172.27.0.64/26", "fd00:172:27:1::/64"]),
                ("test", &["172.27.0.32/30", "fd00:172:27:0:1::/96"]),
                ("test2", &["172.27.0.128/25", "fd00:172:27:10::/60"]),
            ])
        );
    }

    #[test]
    fn test_dual_stack_skip() {
        let map = subnet_map(r#"{"svc": [24, 64], "pod": [24, 64], "test": [24, 64]}"#);
        let result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16")).prefix_skip(2)),
            Some(FamilyOptions::new(net("fd00:172:27::/56")).prefix_skip(2)),
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.2.0/24", "fd00:172:27:2::/64"]),
                ("pod", &["172.27.3.0/24", "fd00:172:27:3::/64"]),
                ("test", &["172.27.4.0/24", "fd00:172:27:4::/64"]),
            ])
        );
    }

    #[test]
    fn test_dual_stack_mixed_multiple() {
        let map = subnet_map(
            r#"{
                "svc": [27, 29, 80],
                "pod": 64,
                "test": [30, 96, 100],
                "test2": [25, 27, 28, 60, 64, 78]
            }"#,
        );
        let result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16"))),
            Some(FamilyOptions::new(net("fd00:172:27::/56"))),
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.0.0/27", "172.27.0.32/29", "fd00:172:27::/80"]),
                ("pod", &["fd00:172:27:1::/64"]),
                (
                    "test",
                    &[
                        "172.27.0.40/30",
                        "fd00:172:27:0:1::/96",
                        "fd00:172:27:0:1:1::/100"
                    ]
                ),
                (
                    "test2",
                    &[
                        "172.27.0.128/25",
                        "172.27.0.64/27",
                        "172.27.0.48/28",
                        "fd00:172:27:10::/60",
                        "fd00:172:27:2::/64",
                        "fd00:172:27:0:4::/78"
                    ]
                ),
            ])
        );
    }

    #[test]
    fn test_dual_stack_default_size() {
        let map = subnet_map(r#"{"svc": 18, "pod": 18, "test": 18}"#);
        let result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/16"))),
            Some(FamilyOptions::new(net("fd00:172:27::/112")).size(114)),
        )
        .allocate(&map)
        .unwrap();
        assert_eq!(
            strings(&result),
            expected(&[
                ("svc", &["172.27.0.0/18", "fd00:172:27::/114"]),
                ("pod", &["172.27.64.0/18", "fd00:172:27::4000/114"]),
                ("test", &["172.27.128.0/18", "fd00:172:27::8000/114"]),
            ])
        );
    }

    #[test]
    fn test_requests_without_parent_network_are_ignored() {
        let map = subnet_map(r#"{"svc": [24, 64]}"#);
        let result = plan(Some(FamilyOptions::new(net("172.27.0.0/16"))), None)
            .allocate(&map)
            .unwrap();
        assert_eq!(strings(&result), expected(&[("svc", &["172.27.0.0/24"])]));
    }

    /*----------------------------------------------------------------------------------
      Errors
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_too_small_names_the_subnet_group() {
        let map = subnet_map(r#"{"svc": 25, "pod": 25, "test": 25}"#);
        let error = plan(Some(FamilyOptions::new(net("172.27.0.0/24"))), None)
            .allocate(&map)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "subnet 'test': '172.27.0.0/24' is too small"
        );
        assert!(matches!(error.root_cause(), Error::NetworkTooSmall(_)));
    }

    #[test]
    fn test_family_mismatch_is_rejected() {
        let result = MapPlanBuilder::new()
            .ipv4(FamilyOptions::new(net("fd00:172:27::/56")))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    /*----------------------------------------------------------------------------------
      Serialization
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_named_subnets_serialize_in_map_order() {
        let map = subnet_map(r#"{"zeta": 24, "alpha": 24}"#);
        let result = subnets_from_map(Some("172.27.0.0/16"), None, &map).unwrap();
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"zeta":["172.27.0.0/24"],"alpha":["172.27.1.0/24"]}"#
        );
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("alpha").unwrap()[0], net("172.27.1.0/24"));
        assert_eq!(result.get("missing"), None);
    }

    /*----------------------------------------------------------------------------------
      Sorting
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_sort_by_address() {
        let map = subnet_map(r#"{"svc": [-27, 80], "pod": [26, -64], "test": 30}"#);
        let mut result = plan(
            Some(FamilyOptions::new(net("172.27.0.0/24"))),
            Some(FamilyOptions::new(net("fd00:172:27::/56"))),
        )
        .allocate(&map)
        .unwrap();
        result.sort_by_address();
        assert_eq!(
            strings(&result),
            expected(&[
                ("pod", &["172.27.0.0/26", "fd00:172:27:ff::/64"]),
                ("test", &["172.27.0.64/30"]),
                ("svc", &["172.27.0.224/27", "fd00:172:27::/80"]),
            ])
        );
    }

    #[test]
    fn test_sort_by_address_is_stable_and_moves_empty_groups_last() {
        let mut named_subnets = NamedSubnets::default();
        named_subnets.extend_group("empty", []);
        named_subnets.extend_group("b", [net("10.0.0.0/25")]);
        named_subnets.extend_group("a", [net("10.0.0.0/24")]);
        named_subnets.extend_group("b", [net("fd00::/64")]);
        named_subnets.sort_by_address();
        assert_eq!(
            strings(&named_subnets),
            expected(&[
                ("b", &["10.0.0.0/25", "fd00::/64"]),
                ("a", &["10.0.0.0/24"]),
                ("empty", &[]),
            ])
        );
    }
}
