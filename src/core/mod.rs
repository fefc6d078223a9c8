/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod address_family;
pub mod allocator;
pub mod concat;
pub mod default_subnet;
pub mod errors;
pub mod gap_filler;
pub mod host_number;
pub mod network;
pub mod placement;
pub mod planner;
pub mod subnet_map;
