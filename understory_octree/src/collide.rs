// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchical broad phase.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use tracing::trace;

use crate::entity::{NarrowPhase, Simulation};
use crate::tree::Octree;
use crate::types::NodeId;

impl<H: Copy + Eq + Hash + Debug> Octree<H> {
    /// Enumerate candidate pairs and return the collisions `narrow` confirms.
    ///
    /// Every entity is tested against the entities of its own node and of all
    /// strict ancestors, each unordered pair exactly once. The ancestor entity
    /// is passed first. Entities in disjoint sibling subtrees are never
    /// paired.
    #[tracing::instrument(skip_all, name = "octree::collisions")]
    pub fn collisions<S, N>(&self, sim: &S, narrow: &mut N) -> Vec<N::Record>
    where
        S: Simulation<Handle = H>,
        N: NarrowPhase<S>,
    {
        let mut records = Vec::new();
        let mut ancestors = Vec::new();
        self.collide_node(sim, narrow, self.root(), 0, &mut ancestors, &mut records);
        records
    }

    fn collide_node<S, N>(
        &self,
        sim: &S,
        narrow: &mut N,
        id: NodeId,
        depth: usize,
        ancestors: &mut Vec<H>,
        records: &mut Vec<N::Record>,
    ) where
        S: Simulation<Handle = H>,
        N: NarrowPhase<S>,
    {
        let node = self.node(id);
        let entities = node.entities.as_slice();
        let found = records.len();

        for &a in ancestors.iter() {
            for &b in entities {
                if a != b {
                    records.extend(narrow.test(sim, a, b, id));
                }
            }
        }
        for (i, &a) in entities.iter().enumerate() {
            for &b in &entities[i + 1..] {
                if a != b {
                    records.extend(narrow.test(sim, a, b, id));
                }
            }
        }
        trace!(
            node = ?id,
            depth,
            entities = entities.len(),
            ancestors = ancestors.len(),
            found = records.len() - found,
            "broad phase"
        );

        let mark = ancestors.len();
        ancestors.extend_from_slice(entities);
        for child in node.child_ids() {
            self.collide_node(sim, narrow, child, depth + 1, ancestors, records);
        }
        ancestors.truncate(mark);
    }
}
