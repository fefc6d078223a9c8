use crate::core::allocator::{next_of_size, PrefixRequest};
use crate::core::errors::{Error, Result};
use crate::core::gap_filler::fill_remaining;
use crate::core::network::Network;
use crate::core::placement::PlacementSet;
use log::debug;

/*-------------------------------------------------------------------------------------------------
  Simple Interface
-------------------------------------------------------------------------------------------------*/

/// _**Simple interface**_ that carves the requested prefix lengths out of `parent`, in order,
/// and returns the allocated subnets as CIDR strings. Negative prefix lengths take the last
/// free subnet of that size instead of the first.
///
/// ```
/// let subnets = subnetplan::cidrsubnets("10.0.50.0/24", [27, 27, 27])?;
/// assert_eq!(subnets, ["10.0.50.0/27", "10.0.50.32/27", "10.0.50.64/27"]);
/// # Ok::<(), subnetplan::Error>(())
/// ```
pub fn cidrsubnets<I>(parent: &str, prefixes: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = i32>,
{
    let parent: Network = parent.parse()?;
    let subnets = PlanBuilder::new().prefixes(prefixes).build()?.allocate(&parent)?;
    Ok(subnets.iter().map(Network::to_string).collect())
}

/*-------------------------------------------------------------------------------------------------
  Plan Builder
-------------------------------------------------------------------------------------------------*/

/// Builder used to construct a [Plan] with the desired allocation parameters. By default no
/// prefixes are requested, nothing is filled, and allocation starts at the beginning of the
/// parent network.
///
/// ```rust
/// # fn main() -> subnetplan::Result<()> {
/// let parent: subnetplan::Network = "10.0.50.0/24".parse()?;
/// let subnets = subnetplan::PlanBuilder::new()
///     .num_prefixes(3)
///     .prefix_size(27)
///     .prefix_skip(3)
///     .build()?
///     .allocate(&parent)?;
///
/// assert_eq!(subnets[0].to_string(), "10.0.50.96/27");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PlanBuilder {
    prefixes: Vec<i32>,
    fill: bool,
    fill_only_end: bool,
    start: u128,
    num_prefixes: usize,
    prefix_size: Option<i32>,
    prefix_skip: u128,
}

/*--------------------------------------------------------------------------------------
  Plan Builder Implementation
--------------------------------------------------------------------------------------*/

impl Default for PlanBuilder {
    fn default() -> Self {
        Self {
            prefixes: Vec::new(),
            fill: false,
            fill_only_end: true,
            start: 0,
            num_prefixes: 0,
            prefix_size: None,
            prefix_skip: 0,
        }
    }
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    /// Explicit list of signed prefix lengths, allocated in order. Mutually exclusive with
    /// [PlanBuilder::num_prefixes].
    pub fn prefixes<I>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        self.prefixes = prefixes.into_iter().collect();
        self
    }

    /// Fill the address space left over after the requested prefixes; defaults to `false`.
    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    /// Only fill the gaps after the last requested prefix, leaving the gaps skipped by the
    /// requested prefixes untouched; defaults to `true`. Has no effect unless
    /// [PlanBuilder::fill] is set.
    pub fn fill_only_end(mut self, fill_only_end: bool) -> Self {
        self.fill_only_end = fill_only_end;
        self
    }

    /// Offset, in addresses from the first address of the parent network, that allocated
    /// subnets must start after. Mutually exclusive with [PlanBuilder::prefix_skip].
    ///
    /// An offset of `0` means no start constraint, so the first subnet of the parent network
    /// can still be allocated.
    pub fn start(mut self, start: u128) -> Self {
        self.start = start;
        self
    }

    /// Request this many prefixes of [PlanBuilder::prefix_size].
    pub fn num_prefixes(mut self, num_prefixes: usize) -> Self {
        self.num_prefixes = num_prefixes;
        self
    }

    /// Prefix length used by [PlanBuilder::num_prefixes] and [PlanBuilder::prefix_skip].
    pub fn prefix_size(mut self, prefix_size: i32) -> Self {
        self.prefix_size = Some(prefix_size);
        self
    }

    /// Start allocating after `prefix_skip - 1` blocks of [PlanBuilder::prefix_size] from the
    /// start of the parent network.
    pub fn prefix_skip(mut self, prefix_skip: u128) -> Self {
        self.prefix_skip = prefix_skip;
        self
    }

    /*-------------------------------------------------------------------------
      Build
    -------------------------------------------------------------------------*/

    /// Validate the parameters and build the [Plan].
    pub fn build(self) -> Result<Plan> {
        if !self.prefixes.is_empty() && self.num_prefixes > 0 {
            return Err(Error::config(
                "prefixes and num_prefixes are mutually exclusive",
            ));
        }
        if self.prefix_skip > 0 && self.prefix_size.is_none() {
            return Err(Error::config("prefix_size is required for prefix_skip"));
        }
        if self.prefix_skip > 0 && self.start > 0 {
            return Err(Error::config(
                "prefix_skip and start are mutually exclusive",
            ));
        }

        let requests: Vec<PrefixRequest> = match (self.num_prefixes, self.prefix_size) {
            (0, _) => self
                .prefixes
                .into_iter()
                .map(PrefixRequest::try_from)
                .collect::<Result<_>>()?,
            (count, Some(prefix_size)) => vec![PrefixRequest::try_from(prefix_size)?; count],
            (_, None) => {
                return Err(Error::config(
                    "prefix_size is required when using num_prefixes",
                ))
            }
        };

        let start = match (self.start, self.prefix_skip, self.prefix_size) {
            (0, 0, _) => Start::Beginning,
            (offset, 0, _) => Start::Offset(offset),
            (_, blocks, Some(prefix_size)) => Start::SkipBlocks {
                blocks,
                prefix_len: PrefixRequest::try_from(prefix_size)?.prefix_len(),
            },
            (_, _, None) => return Err(Error::config("prefix_size is required for prefix_skip")),
        };

        let fill = match (self.fill, self.fill_only_end) {
            (false, _) => Fill::Nothing,
            (true, false) => Fill::Everything,
            (true, true) => Fill::AfterRequests,
        };

        Ok(Plan {
            requests,
            start,
            fill,
        })
    }
}

/*-------------------------------------------------------------------------------------------------
  Plan
-------------------------------------------------------------------------------------------------*/

/// Where allocation begins inside the parent network.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Start {
    /// Any free subnet is eligible.
    Beginning,

    /// Subnets must start after `parent.first + offset`.
    Offset(u128),

    /// Subnets must start after `blocks - 1` blocks of `/prefix_len` from the parent's start.
    SkipBlocks { blocks: u128, prefix_len: u8 },
}

impl Start {
    /// Resolve to an absolute address integer inside `parent`.
    pub fn resolve(&self, parent: &Network) -> Result<Option<u128>> {
        let offset = match *self {
            Start::Beginning => return Ok(None),
            Start::Offset(offset) => Some(offset),
            Start::SkipBlocks { blocks, prefix_len } => parent
                .family()
                .width()
                .checked_sub(prefix_len)
                .and_then(|host_bits| 1u128.checked_shl(u32::from(host_bits)))
                .and_then(|block_size| block_size.checked_mul(blocks.saturating_sub(1))),
        };
        offset
            .and_then(|offset| parent.first().checked_add(offset))
            .map(Some)
            .ok_or_else(|| Error::config(format!("start of {self:?} is outside of {parent}")))
    }
}

/// What gap filling happens once the requested prefixes are placed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fill {
    Nothing,
    Everything,
    AfterRequests,
}

/// A validated allocation plan: an ordered list of prefix requests, where allocation starts,
/// and whether the remaining space is filled.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Plan {
    requests: Vec<PrefixRequest>,
    start: Start,
    fill: Fill,
}

impl Plan {
    pub fn requests(&self) -> &[PrefixRequest] {
        &self.requests
    }

    pub fn start(&self) -> Start {
        self.start
    }

    pub fn fill(&self) -> Fill {
        self.fill
    }

    /// Allocate every request inside `parent`, in request order, then fill the remaining space
    /// when the plan asks for it.
    ///
    /// The result lists the requested subnets in request order. With filling, the whole result
    /// is ordered by address instead. Any allocation failure aborts the plan.
    pub fn allocate(&self, parent: &Network) -> Result<Vec<Network>> {
        let start = self.start.resolve(parent)?;
        let mut placed = PlacementSet::new();

        for request in &self.requests {
            let subnet = next_of_size(parent, &placed, *request, start)?;
            placed.insert(subnet);
        }
        debug!(
            "Allocated {} requested subnet(s) in {parent}",
            placed.len()
        );

        let fill_start = match self.fill {
            Fill::Nothing => return Ok(placed.into_vec()),
            Fill::Everything => None,
            Fill::AfterRequests => placed.last_placed().map(Network::last),
        };

        Ok(fill_remaining(parent, placed, fill_start)?.into_vec())
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
