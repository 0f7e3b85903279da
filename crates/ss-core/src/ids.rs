use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable identifier for a node of the hydrodynamic mesh.
///
/// - `u32` keeps the dense per-node tables small
/// - `NonZero` enables `Option<NodeId>` to be pointer-optimized
///
/// ADCIRC numbers mesh nodes from 1; internally we index from 0 and
/// convert at the file boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Create a NodeId from a 0-based row index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        // index+1 must be nonzero
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Create a NodeId from the 1-based numbering used in mesh files.
    pub fn from_one_based(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// Recover the 0-based row index.
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// The 1-based node number as written in mesh and output files.
    pub fn one_based(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.one_based())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.one_based())
    }
}

/// 0-based year of the synthetic storm record, `0 <= year < year_num`.
pub type Year = u32;

/// Identifier of one simulated storm scenario (one solver run).
pub type RunId = String;

/// Identifier of the synthetic cyclone track behind a run.
pub type TrackId = String;
