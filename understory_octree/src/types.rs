// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the octree: node identifiers and child masks.

/// Identifier for a node in the tree (generational).
///
/// Identifiers of destroyed nodes become stale; a recycled slot receives a
/// higher generation, so stale identifiers never alias a newer node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Which of a node's eight octant children are present.
    ///
    /// Bit `i` is set exactly when child `i` exists; see
    /// [`Region::octant`](crate::Region::octant) for the octant numbering.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ChildMask: u8 {
        /// Octant 0 (minimum corner).
        const OCTANT_0 = 0b0000_0001;
        /// Octant 1 (upper x).
        const OCTANT_1 = 0b0000_0010;
        /// Octant 2 (upper y).
        const OCTANT_2 = 0b0000_0100;
        /// Octant 3 (upper x and y).
        const OCTANT_3 = 0b0000_1000;
        /// Octant 4 (upper z).
        const OCTANT_4 = 0b0001_0000;
        /// Octant 5 (upper x and z).
        const OCTANT_5 = 0b0010_0000;
        /// Octant 6 (upper y and z).
        const OCTANT_6 = 0b0100_0000;
        /// Octant 7 (maximum corner).
        const OCTANT_7 = 0b1000_0000;
    }
}

impl ChildMask {
    /// The mask with only the bit for `index` set.
    #[inline]
    pub fn octant(index: usize) -> Self {
        debug_assert!(index < 8, "octant index out of range: {index}");
        Self::from_bits_retain(1_u8 << index)
    }

    /// Whether the child at `index` is marked present.
    #[inline]
    pub fn has(self, index: usize) -> bool {
        self.contains(Self::octant(index))
    }

    /// Octant indices of present children, ascending.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..8).filter(move |&index| self.has(index))
    }
}
