use crate::cli::args::{ConcatArgs, HostNumArgs, LayoutArgs, MapArgs, SubnetsArgs};
use crate::cli::{self, Args, Command, OutputFormat};
use log::debug;
use subnetplan::{
    DefaultLayout, Error, FamilyOptions, MapPlanBuilder, Network, NetworkDefinitions, NoClients,
    PlanBuilder, Result, SubnetMap,
};

/*-------------------------------------------------------------------------------------------------
  Core functions
-------------------------------------------------------------------------------------------------*/

/// Run the selected subcommand and write its output.
pub fn run(args: &Args) -> Result<()> {
    let output_format = cli::utils::output_format(args.output);
    debug!("Output format: {output_format:?}");

    match &args.command {
        Command::Subnets(subnets_args) => subnets(subnets_args, output_format),
        Command::Map(map_args) => map(map_args, output_format),
        Command::Layout(layout_args) => layout(layout_args, output_format),
        Command::Concat(concat_args) => concat(concat_args, output_format),
        Command::HostNum(host_num_args) => host_num(host_num_args, output_format),
    }
}

/*--------------------------------------------------------------------------------------
  Subnets
--------------------------------------------------------------------------------------*/

fn subnets(args: &SubnetsArgs, output_format: OutputFormat) -> Result<()> {
    let mut builder = PlanBuilder::new()
        .prefixes(args.prefixes.iter().copied())
        .fill(args.fill)
        .fill_only_end(!args.fill_all_gaps)
        .start(args.start)
        .num_prefixes(args.num_prefixes)
        .prefix_skip(args.prefix_skip);
    if let Some(prefix_size) = args.prefix_size {
        builder = builder.prefix_size(prefix_size);
    }

    let subnets = builder.build()?.allocate(&args.network)?;
    cli::log::subnets(&args.network, &subnets);

    match output_format {
        OutputFormat::Cidr => cli::output::subnets_in_cidr_format(&subnets),
        OutputFormat::Table => cli::output::subnet_table(&args.network, &subnets),
        OutputFormat::Json => cli::output::json(&subnets)?,
    }
    Ok(())
}

/*--------------------------------------------------------------------------------------
  Map
--------------------------------------------------------------------------------------*/

fn map(args: &MapArgs, output_format: OutputFormat) -> Result<()> {
    let subnet_map: SubnetMap = serde_json::from_str(&args.subnet_map)
        .map_err(|error| Error::Config(format!("invalid subnet map: {error}")))?;

    let mut builder = MapPlanBuilder::new();
    if let Some(network) = args.ipv4_network {
        builder = builder.ipv4(family_options(
            network,
            args.v4_size,
            args.v4_start,
            args.v4_prefix_skip,
        ));
    }
    if let Some(network) = args.ipv6_network {
        builder = builder.ipv6(family_options(
            network,
            args.v6_size,
            args.v6_start,
            args.v6_prefix_skip,
        ));
    }

    let mut named_subnets = builder.build()?.allocate(&subnet_map)?;
    if args.sort {
        named_subnets.sort_by_address();
    }
    cli::log::named_subnets(&named_subnets);

    match output_format {
        OutputFormat::Cidr => cli::output::named_subnets_in_cidr_format(&named_subnets),
        OutputFormat::Table => cli::output::named_subnet_table(&named_subnets),
        OutputFormat::Json => cli::output::json(&named_subnets)?,
    }
    Ok(())
}

fn family_options(
    network: Network,
    size: Option<i32>,
    start: u128,
    prefix_skip: u128,
) -> FamilyOptions {
    let options = FamilyOptions::new(network)
        .start(start)
        .prefix_skip(prefix_skip);
    match size {
        Some(size) => options.size(size),
        None => options,
    }
}

/*--------------------------------------------------------------------------------------
  Layout
--------------------------------------------------------------------------------------*/

fn layout(args: &LayoutArgs, output_format: OutputFormat) -> Result<()> {
    let definitions: NetworkDefinitions = serde_json::from_str(&args.network_defs)
        .map_err(|error| Error::Config(format!("invalid network definitions: {error}")))?;

    let no_clients = if args.no_clients {
        NoClients::Everywhere
    } else {
        NoClients::In(args.no_clients_in.iter().cloned().collect())
    };
    let mut default_subnets = DefaultLayout::new()
        .no_clients(no_clients)
        .skip_nets(args.skip_nets.iter().cloned())
        .layout(&definitions)?;
    if args.sort {
        default_subnets.sort_by_address();
    }
    cli::log::default_subnets(&default_subnets);

    match output_format {
        OutputFormat::Cidr => cli::output::default_subnets_in_cidr_format(&default_subnets),
        OutputFormat::Table => cli::output::default_subnet_table(&default_subnets),
        OutputFormat::Json => cli::output::json(&default_subnets)?,
    }
    Ok(())
}

/*--------------------------------------------------------------------------------------
  Concat
--------------------------------------------------------------------------------------*/

fn concat(args: &ConcatArgs, output_format: OutputFormat) -> Result<()> {
    let result = subnetplan::ipaddr_concat(
        &args.networks,
        args.host,
        args.format,
        args.prefix_len,
        args.list,
    )?;

    match output_format {
        OutputFormat::Cidr => cli::output::hosts_in_cidr_format(result),
        OutputFormat::Table => cli::output::host_table(args.host, result),
        OutputFormat::Json => cli::output::json(&result)?,
    }
    Ok(())
}

/*--------------------------------------------------------------------------------------
  Host Number
--------------------------------------------------------------------------------------*/

fn host_num(args: &HostNumArgs, output_format: OutputFormat) -> Result<()> {
    let host_number = subnetplan::host_number(args.address, args.network.as_ref())?;

    match output_format {
        OutputFormat::Json => cli::output::json(&host_number)?,
        OutputFormat::Cidr | OutputFormat::Table => println!("{host_number}"),
    }
    Ok(())
}
