use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::*;
use serde::Serialize;
use subnetplan::{ConcatResult, DefaultSubnets, Error, NamedSubnets, Network, Result};

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Subnets
--------------------------------------------------------------------------------------*/

pub fn subnets_in_cidr_format(subnets: &[Network]) {
    for subnet in subnets {
        println!("{subnet}");
    }
}

pub fn subnet_table(parent: &Network, subnets: &[Network]) {
    let mut table = new_table(["Subnet", "First Address", "Last Address", "Addresses"]);

    for subnet in subnets {
        table.add_row(vec![
            Cell::new(subnet).add_attribute(Attribute::Bold),
            Cell::new(subnet.network_address()),
            Cell::new(subnet.last_address()),
            Cell::new(subnet.size()),
        ]);
    }

    // Right-align the Subnet and Addresses columns
    right_align(&mut table, 0);
    right_align(&mut table, 3);

    println!("{table}");

    let allocated: u128 = subnets
        .iter()
        .fold(0u128, |total, subnet| total.saturating_add(subnet.size()));

    let mut summary_table = Table::new();
    summary_table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);

    summary_table.add_row(vec![Cell::new(subnets.len()), Cell::new("Subnets")]);
    summary_table.add_row(vec![
        Cell::new(allocated),
        Cell::new(format!("of {} addresses in {parent}", parent.size())),
    ]);
    right_align(&mut summary_table, 0);

    println!("{summary_table}");
}

/*--------------------------------------------------------------------------------------
  Named Subnets
--------------------------------------------------------------------------------------*/

pub fn named_subnets_in_cidr_format(named_subnets: &NamedSubnets) {
    for (name, subnets) in named_subnets.iter() {
        for subnet in subnets {
            println!("{name} {subnet}");
        }
    }
}

pub fn named_subnet_table(named_subnets: &NamedSubnets) {
    let mut table = new_table(["Name", "Subnet", "First Address", "Last Address"]);

    for (name, subnets) in named_subnets.iter() {
        for subnet in subnets {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(subnet).add_attribute(Attribute::Bold),
                Cell::new(subnet.network_address()),
                Cell::new(subnet.last_address()),
            ]);
        }
    }
    right_align(&mut table, 1);

    println!("{table}");
}

/*--------------------------------------------------------------------------------------
  Default Subnets
--------------------------------------------------------------------------------------*/

pub fn default_subnets_in_cidr_format(default_subnets: &DefaultSubnets) {
    for (network, groups) in default_subnets.iter() {
        for (group, subnets) in groups.iter() {
            for subnet in subnets {
                println!("{network} {group} {subnet}");
            }
        }
    }
}

pub fn default_subnet_table(default_subnets: &DefaultSubnets) {
    let mut table = new_table(["Network", "Group", "Subnet", "First Address", "Last Address"]);

    for (network, groups) in default_subnets.iter() {
        for (group, subnets) in groups.iter() {
            for subnet in subnets {
                table.add_row(vec![
                    Cell::new(network),
                    Cell::new(group),
                    Cell::new(subnet).add_attribute(Attribute::Bold),
                    Cell::new(subnet.network_address()),
                    Cell::new(subnet.last_address()),
                ]);
            }
        }
    }
    right_align(&mut table, 2);

    println!("{table}");
}

/*--------------------------------------------------------------------------------------
  Concatenated Host
--------------------------------------------------------------------------------------*/

pub fn hosts_in_cidr_format(result: ConcatResult) {
    for host in result.into_vec() {
        println!("{host}");
    }
}

pub fn host_table(host: u128, result: ConcatResult) {
    let mut table = new_table(["Host", "Address"]);
    for address in result.into_vec() {
        table.add_row(vec![Cell::new(host), Cell::new(address).add_attribute(Attribute::Bold)]);
    }
    right_align(&mut table, 0);

    println!("{table}");
}

/*--------------------------------------------------------------------------------------
  JSON
--------------------------------------------------------------------------------------*/

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(Error::Serialize)?;
    println!("{json}");
    Ok(())
}

/*--------------------------------------------------------------------------------------
  Helper Functions
--------------------------------------------------------------------------------------*/

fn new_table<const COLUMNS: usize>(header: [&str; COLUMNS]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(header.map(|title| {
        Cell::new(title)
            .add_attribute(Attribute::Bold)
            .fg(Color::Green)
    }));

    table
}

fn right_align(table: &mut Table, index: usize) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(CellAlignment::Right);
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use test_log::test;

    #[test]
    fn test_json_reports_serialize_errors() {
        let unserializable = BTreeMap::from([((1, 2), 3)]);
        let result = json(&unserializable);
        assert!(matches!(result, Err(Error::Serialize(_))));
    }

    #[test]
    fn test_json_writes_named_subnets() {
        assert!(json(&NamedSubnets::default()).is_ok());
    }
}
