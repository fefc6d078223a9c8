//! Deterministic subnet planning for IPv4 and IPv6 networks.
//!
//! `subnetplan` carves child subnets out of a parent network from a list of requested prefix
//! lengths, optionally fills the space left over with the largest blocks that fit, plans named
//! groups of subnets across dual-stack parent networks, lays out a default set of groups per
//! network, and indexes hosts across several networks as if they were one contiguous range.
//!
//! ```
//! let subnets = subnetplan::cidrsubnets("10.0.50.0/24", [27, 28])?;
//! assert_eq!(subnets, ["10.0.50.0/27", "10.0.50.32/28"]);
//! # Ok::<(), subnetplan::Error>(())
//! ```
//!
//! Allocation is deterministic: the same inputs always produce the same subnets, and any
//! request that cannot be satisfied fails the whole plan.

mod core;

/*-------------------------------------------------------------------------------------------------
  Primary Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::planner::{cidrsubnets, Fill, Plan, PlanBuilder, Start};

pub use crate::core::subnet_map::{
    subnets_from_map, FamilyOptions, MapPlan, MapPlanBuilder, NamedSubnets, OneOrMany, SubnetMap,
};

pub use crate::core::default_subnet::{
    default_subnet, DefaultLayout, DefaultSubnets, NetworkDefinition, NetworkDefinitions, NoClients,
};

pub use crate::core::concat::{ipaddr_concat, ConcatResult, ConcatenatedRange, HostFormat};

pub use crate::core::host_number::host_number;

/*--------------------------------------------------------------------------------------
  Building Blocks
--------------------------------------------------------------------------------------*/

pub use crate::core::address_family::AddressFamily;
pub use crate::core::allocator::{next_of_size, PrefixRequest};
pub use crate::core::gap_filler::fill_remaining;
pub use crate::core::network::{Network, Subnets};
pub use crate::core::placement::PlacementSet;

/*--------------------------------------------------------------------------------------
  Errors and Results
--------------------------------------------------------------------------------------*/

pub use crate::core::errors::{Error, Result};

/*--------------------------------------------------------------------------------------
  Re-exports
--------------------------------------------------------------------------------------*/

pub use ipnetwork;
