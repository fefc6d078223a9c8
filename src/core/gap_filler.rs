use crate::core::allocator::{next_of_size, PrefixRequest};
use crate::core::errors::{Error, Result};
use crate::core::network::Network;
use crate::core::placement::PlacementSet;
use log::{debug, trace};

/*-------------------------------------------------------------------------------------------------
  Gap Filler
-------------------------------------------------------------------------------------------------*/

/// Fill the unused address space of `parent` with the largest blocks that fit.
///
/// Each pass sorts the placed subnets by address and looks for one gap: first the gap between
/// the last placed subnet and the end of the parent, then, only when there is no end gap, the
/// gaps between adjacent subnets in address order. The size of the gap picks the prefix length
/// (the largest power of two not above the gap) and one subnet of that size is allocated after
/// `start`. Passes repeat until no gap is found, so the returned set is sorted by address.
///
/// When `start` is given, internal gaps that end before `start` are left alone.
///
/// An empty placement set returns the whole parent network.
///
/// ```
/// use subnetplan::{fill_remaining, Network, PlacementSet};
///
/// let parent: Network = "10.0.50.0/24".parse()?;
/// let placed: PlacementSet = vec!["10.0.50.0/25".parse::<Network>()?].into();
///
/// let filled = fill_remaining(&parent, placed, None)?;
/// assert_eq!(filled.as_slice()[1].to_string(), "10.0.50.128/25");
/// # Ok::<(), subnetplan::Error>(())
/// ```
pub fn fill_remaining(
    parent: &Network,
    mut placed: PlacementSet,
    start: Option<u128>,
) -> Result<PlacementSet> {
    if placed.is_empty() {
        return Ok(PlacementSet::from(vec![*parent]));
    }

    // Every pass places one block; a gap never needs more than two blocks per host bit.
    let max_passes = (placed.len() + 1) * 2 * (usize::from(parent.family().width()) + 1);

    for pass in 0..max_passes {
        placed.sort();
        let Some(prefix_len) = find_gap(parent, &placed, start) else {
            debug!("Filled {parent} after {pass} pass(es)");
            return Ok(placed);
        };
        let subnet = next_of_size(parent, &placed, PrefixRequest::first(prefix_len), start)?;
        debug!("Filled gap in {parent} with {subnet}");
        placed.insert(subnet);
    }

    Err(Error::FillDidNotConverge {
        network: *parent,
        passes: max_passes,
    })
}

/// Prefix length of the next gap to fill, or `None` when there is no fillable gap.
///
/// `placed` must be sorted by address and non-empty.
fn find_gap(parent: &Network, placed: &PlacementSet, start: Option<u128>) -> Option<u8> {
    let last = placed.last_placed()?;

    let end_gap = parent.last().abs_diff(last.last());
    if end_gap > 1 {
        trace!("End gap of {end_gap} address(es) after {last}");
        return gap_prefix_len(parent, end_gap);
    }

    placed
        .as_slice()
        .windows(2)
        .filter(|pair| start.map_or(true, |start| pair[0].last() >= start))
        .find_map(|pair| {
            let gap = pair[0].last().abs_diff(pair[1].first());
            (gap > 1).then(|| {
                trace!("Gap of {gap} address(es) between {} and {}", pair[0], pair[1]);
                gap
            })
        })
        .and_then(|gap| gap_prefix_len(parent, gap))
}

/// Prefix length whose block size is the largest power of two not above `gap`.
fn gap_prefix_len(parent: &Network, gap: u128) -> Option<u8> {
    parent
        .family()
        .prefix_from_bits(gap.ilog2())
        .filter(|prefix_len| *prefix_len > 0)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
