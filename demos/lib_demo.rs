use subnetplan::{
    DefaultLayout, FamilyOptions, HostFormat, MapPlanBuilder, Network, NetworkDefinition,
    NetworkDefinitions, PlanBuilder, Result, SubnetMap,
};

fn main() -> Result<()> {
    // Carve subnets out of a parent network
    let subnets = subnetplan::cidrsubnets("10.0.50.0/24", [27, 27, 28, -26])?;
    println!("{:?}", subnets);

    // Allocate and fill the remaining space with the largest subnets that fit
    let parent: Network = "10.0.50.0/24".parse()?;
    let filled = PlanBuilder::new()
        .prefixes([27, 28])
        .fill(true)
        .build()?
        .allocate(&parent)?;
    for subnet in &filled {
        println!("{subnet}");
    }

    // Plan named groups of dual-stack subnets
    let subnet_map: SubnetMap = serde_json::from_str(r#"{"svc": [24, 64], "pod": [22, 64], "lb": []}"#)
        .map_err(|error| subnetplan::Error::Config(error.to_string()))?;
    let mut named_subnets = MapPlanBuilder::new()
        .ipv4(FamilyOptions::new("172.27.0.0/16".parse()?).size(26))
        .ipv6(FamilyOptions::new("fd00:172:27::/56".parse()?).size(64))
        .build()?
        .allocate(&subnet_map)?;
    named_subnets.sort_by_address();
    for (name, subnets) in named_subnets.iter() {
        println!("{name}: {:?}", subnets);
    }

    // Lay out the default switches, hosts, vips and clients groups of a network
    let definitions: NetworkDefinitions = [(
        "ceph",
        NetworkDefinition::new(Some("10.0.23.0/24".parse()?), Some("fd00:23::/64".parse()?)),
    )]
    .into_iter()
    .collect();
    let layout = DefaultLayout::new().no_clients_in(["mgmt"]).layout(&definitions)?;
    for (network, groups) in layout.iter() {
        for (group, subnets) in groups.iter() {
            println!("{network} {group}: {:?}", subnets);
        }
    }

    // Index hosts across several networks as one range
    let host = subnetplan::ipaddr_concat(
        ["10.0.50.0/28", "10.0.50.128/25"],
        16,
        HostFormat::Address,
        None,
        false,
    )?;
    println!("{host}");

    // Find the host number of an address
    let number = subnetplan::host_number("10.0.50.77".parse().unwrap(), Some(&parent))?;
    println!("{number}");

    Ok(())
}
