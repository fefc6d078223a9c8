use crate::core::network::Network;

/*-------------------------------------------------------------------------------------------------
  Placement Set
-------------------------------------------------------------------------------------------------*/

/// The subnets already allocated inside one parent network during a planning run.
///
/// The set only grows: subnets are pushed in allocation order and never removed. Allocation
/// order is preserved because it is the order results are reported in.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PlacementSet {
    placed: Vec<Network>,
}

impl PlacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Network> {
        self.placed.iter()
    }

    pub fn as_slice(&self) -> &[Network] {
        &self.placed
    }

    /// The most recently placed subnet.
    pub fn last_placed(&self) -> Option<&Network> {
        self.placed.last()
    }

    pub fn insert(&mut self, network: Network) {
        self.placed.push(network);
    }

    /// True when `candidate` overlaps any placed subnet.
    pub fn overlaps(&self, candidate: &Network) -> bool {
        self.placed.iter().any(|placed| placed.overlaps(candidate))
    }

    /// Reorder the placed subnets by address.
    pub fn sort(&mut self) {
        self.placed.sort();
    }

    pub fn into_vec(self) -> Vec<Network> {
        self.placed
    }
}

impl From<Vec<Network>> for PlacementSet {
    fn from(placed: Vec<Network>) -> Self {
        Self { placed }
    }
}

impl FromIterator<Network> for PlacementSet {
    fn from_iter<I: IntoIterator<Item = Network>>(iter: I) -> Self {
        Self {
            placed: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PlacementSet {
    type Item = &'a Network;
    type IntoIter = std::slice::Iter<'a, Network>;

    fn into_iter(self) -> Self::IntoIter {
        self.placed.iter()
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
