use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::str::FromStr;
use subnetplan::{HostFormat, Network};

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan subnets in IPv4 and IPv6 networks.", long_about = None)]
pub struct Args {
    /// Output format [env: SUBNETPLAN_OUTPUT] [default: cidr]
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    #[command(subcommand)]
    pub command: Command,
}

/*--------------------------------------------------------------------------------------
  Subcommands
--------------------------------------------------------------------------------------*/

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Carve subnets of the requested prefix lengths out of a network
    Subnets(SubnetsArgs),

    /// Plan named groups of subnets in IPv4 and IPv6 networks
    Map(MapArgs),

    /// Lay out the default switches, hosts, vips and clients subnets of each network
    Layout(LayoutArgs),

    /// Find the n-th host across networks joined into one range
    Concat(ConcatArgs),

    /// Find the host number of an address in its network
    HostNum(HostNumArgs),
}

/*-----------------------------------------------------------------------------
  Subnets
-----------------------------------------------------------------------------*/

#[derive(clap::Args, Debug)]
pub struct SubnetsArgs {
    /// Parent network in CIDR notation
    pub network: Network,

    /// Prefix lengths to allocate, in order; negative lengths take the last free subnet
    #[arg(allow_negative_numbers = true)]
    pub prefixes: Vec<i32>,

    /// Fill the unused space with the largest subnets that fit
    #[arg(long)]
    pub fill: bool,

    /// Also fill gaps skipped over by the requested prefixes
    #[arg(long, requires = "fill")]
    pub fill_all_gaps: bool,

    /// Only allocate subnets that start after this many addresses
    #[arg(long, default_value_t = 0)]
    pub start: u128,

    /// Allocate this many subnets of --prefix-size
    #[arg(long, default_value_t = 0)]
    pub num_prefixes: usize,

    /// Prefix length used by --num-prefixes and --prefix-skip
    #[arg(long, allow_negative_numbers = true)]
    pub prefix_size: Option<i32>,

    /// Start allocating at this block of --prefix-size (1 is the first block)
    #[arg(long, default_value_t = 0)]
    pub prefix_skip: u128,
}

/*-----------------------------------------------------------------------------
  Map
-----------------------------------------------------------------------------*/

#[derive(clap::Args, Debug)]
pub struct MapArgs {
    /// JSON object of names to one or more prefix lengths, e.g. '{"svc": [24, 64], "pod": 22}'
    pub subnet_map: String,

    /// IPv4 parent network
    #[arg(long = "cidr")]
    pub ipv4_network: Option<Network>,

    /// IPv6 parent network
    #[arg(long = "cidr6")]
    pub ipv6_network: Option<Network>,

    /// IPv4 prefix length for names without IPv4 requests
    #[arg(long, allow_negative_numbers = true)]
    pub v4_size: Option<i32>,

    /// IPv6 prefix length for names without IPv6 requests
    #[arg(long, allow_negative_numbers = true)]
    pub v6_size: Option<i32>,

    /// Only allocate IPv4 subnets that start after this many addresses
    #[arg(long, default_value_t = 0)]
    pub v4_start: u128,

    /// Only allocate IPv6 subnets that start after this many addresses
    #[arg(long, default_value_t = 0)]
    pub v6_start: u128,

    /// Start allocating IPv4 subnets at this block of --v4-size
    #[arg(long, default_value_t = 0)]
    pub v4_prefix_skip: u128,

    /// Start allocating IPv6 subnets at this block of --v6-size
    #[arg(long, default_value_t = 0)]
    pub v6_prefix_skip: u128,

    /// Order the names by their lowest subnet address
    #[arg(long)]
    pub sort: bool,
}

/*-----------------------------------------------------------------------------
  Layout
-----------------------------------------------------------------------------*/

#[derive(clap::Args, Debug)]
pub struct LayoutArgs {
    /// JSON object of network names to definitions, e.g. '{"ceph": {"cidr": "10.0.23.0/24"}}'
    pub network_defs: String,

    /// Leave out the clients subnets of every network
    #[arg(long, conflicts_with = "no_clients_in")]
    pub no_clients: bool,

    /// Leave out the clients subnets of these networks
    #[arg(long, value_delimiter = ',')]
    pub no_clients_in: Vec<String>,

    /// Leave these networks out of the layout
    #[arg(long, value_delimiter = ',')]
    pub skip_nets: Vec<String>,

    /// Order each network's groups by their lowest subnet address
    #[arg(long)]
    pub sort: bool,
}

/*-----------------------------------------------------------------------------
  Concat
-----------------------------------------------------------------------------*/

#[derive(clap::Args, Debug)]
pub struct ConcatArgs {
    /// Host index, counting from 0 at the first address of the lowest network
    pub host: u128,

    /// Networks to join, in any order
    #[arg(required = true)]
    pub networks: Vec<String>,

    /// Address format: host or address
    #[arg(short, long, default_value = "host")]
    pub format: HostFormat,

    /// Prefix length to append to the address (implies --format address)
    #[arg(short, long)]
    pub prefix_len: Option<u8>,

    /// Always return a list, even for a single address
    #[arg(long)]
    pub list: bool,
}

/*-----------------------------------------------------------------------------
  Host Number
-----------------------------------------------------------------------------*/

#[derive(clap::Args, Debug)]
pub struct HostNumArgs {
    /// IPv4 or IPv6 address
    pub address: IpAddr,

    /// Network containing the address [default: the address's /24 or /64]
    pub network: Option<Network>,
}

/*--------------------------------------------------------------------------------------
  Output Format
--------------------------------------------------------------------------------------*/

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// One result per line
    #[default]
    Cidr,
    /// Table with address details
    Table,
    /// JSON document
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <OutputFormat as ValueEnum>::from_str(s.trim(), true)
    }
}
