use crate::core::errors::{Error, Result};
use crate::core::network::Network;
use crate::core::placement::PlacementSet;
use log::debug;
use std::fmt;

/*-------------------------------------------------------------------------------------------------
  Prefix Request
-------------------------------------------------------------------------------------------------*/

/// A request for one subnet of a given prefix length.
///
/// Requests are usually written as signed prefix lengths: `27` asks for the first free `/27`,
/// `-27` for the last free `/27` in the parent network.
///
/// ```
/// use subnetplan::PrefixRequest;
///
/// let request = PrefixRequest::try_from(-27)?;
/// assert_eq!(request.prefix_len(), 27);
/// assert!(request.from_end());
/// # Ok::<(), subnetplan::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PrefixRequest {
    prefix_len: u8,
    from_end: bool,
}

impl PrefixRequest {
    /// Request the first free subnet of `prefix_len`.
    pub fn first(prefix_len: u8) -> Self {
        Self {
            prefix_len,
            from_end: false,
        }
    }

    /// Request the last free subnet of `prefix_len`.
    pub fn last(prefix_len: u8) -> Self {
        Self {
            prefix_len,
            from_end: true,
        }
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn from_end(&self) -> bool {
        self.from_end
    }
}

impl TryFrom<i32> for PrefixRequest {
    type Error = Error;

    fn try_from(size: i32) -> Result<Self> {
        let prefix_len = u8::try_from(size.unsigned_abs())
            .ok()
            .filter(|prefix_len| *prefix_len <= 128)
            .ok_or_else(|| Error::config(format!("invalid prefix size: {size}")))?;
        Ok(Self {
            prefix_len,
            from_end: size < 0,
        })
    }
}

impl fmt::Display for PrefixRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from_end {
            write!(f, "-{}", self.prefix_len)
        } else {
            write!(f, "{}", self.prefix_len)
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Subnet Allocator
-------------------------------------------------------------------------------------------------*/

/// Find the next free subnet of the requested size inside `parent`.
///
/// A candidate is eligible when it overlaps nothing in `placed` and, when `start` is given,
/// its first address is strictly greater than `start` (an absolute address integer). Forward
/// requests stop at the first eligible candidate; from-end requests return the last one,
/// walking the candidates from the top of the parent network down.
///
/// `placed` is not modified; callers insert the returned subnet before requesting the next.
///
/// Fails with [Error::NetworkTooSmall] when no candidate is eligible.
///
/// ```
/// use subnetplan::{next_of_size, Network, PlacementSet, PrefixRequest};
///
/// let parent: Network = "10.0.50.0/24".parse()?;
/// let mut placed = PlacementSet::new();
///
/// let first = next_of_size(&parent, &placed, PrefixRequest::first(26), None)?;
/// placed.insert(first);
/// let last = next_of_size(&parent, &placed, PrefixRequest::last(26), None)?;
///
/// assert_eq!(first.to_string(), "10.0.50.0/26");
/// assert_eq!(last.to_string(), "10.0.50.192/26");
/// # Ok::<(), subnetplan::Error>(())
/// ```
pub fn next_of_size(
    parent: &Network,
    placed: &PlacementSet,
    request: PrefixRequest,
    start: Option<u128>,
) -> Result<Network> {
    let mut candidates = parent.subnets(request.prefix_len())?;
    let eligible = |candidate: &Network| {
        !placed.overlaps(candidate) && start.map_or(true, |start| candidate.first() > start)
    };

    let found = if request.from_end() {
        candidates.rfind(eligible)
    } else {
        candidates.find(eligible)
    };

    match found {
        Some(subnet) => {
            debug!("Allocated {subnet} for request {request} in {parent}");
            Ok(subnet)
        }
        None => {
            debug!("No free subnet for request {request} in {parent}");
            Err(Error::NetworkTooSmall(*parent))
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
