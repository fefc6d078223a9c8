use log::info;
use subnetplan::{DefaultSubnets, NamedSubnets, Network};

/*-------------------------------------------------------------------------------------------------
  Logging Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Subnets
--------------------------------------------------------------------------------------*/

pub fn subnets(parent: &Network, subnets: &[Network]) {
    let count_subnets = subnets.len();
    let allocated = subnets
        .iter()
        .fold(0u128, |total, subnet| total.saturating_add(subnet.size()));
    let parent_size = parent.size();

    info!("Allocated {count_subnets} subnet(s) in {parent}");
    info!("Subnets cover {allocated} of {parent_size} address(es)");
}

/*--------------------------------------------------------------------------------------
  Named Subnets
--------------------------------------------------------------------------------------*/

pub fn named_subnets(named_subnets: &NamedSubnets) {
    let count_names = named_subnets.len();
    let count_subnets: usize = named_subnets
        .iter()
        .map(|(_, subnets)| subnets.len())
        .sum();
    info!("Allocated {count_subnets} subnet(s) for {count_names} name(s)");

    for (name, subnets) in named_subnets.iter() {
        if subnets.is_empty() {
            info!("No subnets requested for '{name}'");
        }
    }
}

/*--------------------------------------------------------------------------------------
  Default Subnets
--------------------------------------------------------------------------------------*/

pub fn default_subnets(default_subnets: &DefaultSubnets) {
    info!("Laid out {} network(s)", default_subnets.len());

    for (name, groups) in default_subnets.iter() {
        if groups.is_empty() {
            info!("No subnets laid out for '{name}'");
        }
    }
}
