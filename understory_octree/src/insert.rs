// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental insertion along a single root-to-leaf path.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use tracing::{debug, trace};

use crate::build::{fit_root_region, resolve_live, volume_of};
use crate::entity::{Bounded, Simulation};
use crate::error::OctreeError;
use crate::region::Containment;
use crate::tree::Octree;
use crate::types::NodeId;

impl<H: Copy + Eq + Hash + Debug> Octree<H> {
    /// Insert one entity.
    ///
    /// Before the first build the entity is queued instead; see
    /// [`Octree::enqueue`]. Once built, only the path from the root to the
    /// receiving node is touched, unless the entity escapes the root region
    /// or is degenerate, in which case the affected subtree is rebuilt.
    ///
    /// # Errors
    ///
    /// Fails if the entity (or, during a rebuild, any live entity of the
    /// rebuilt subtree) lacks a bounding volume, or if the handle is unknown.
    /// The tree is unchanged on error, unless a rebuild had already moved
    /// entities; no entity is dropped in that case.
    pub fn insert<S: Simulation<Handle = H>>(
        &mut self,
        sim: &S,
        handle: H,
    ) -> Result<(), OctreeError<H>> {
        if !self.built {
            self.enqueue(handle);
            return Ok(());
        }
        self.place(sim, self.root(), handle)
    }

    /// Place `handle` in the subtree rooted at `start`.
    pub(crate) fn place<S: Simulation<Handle = H>>(
        &mut self,
        sim: &S,
        start: NodeId,
        handle: H,
    ) -> Result<(), OctreeError<H>> {
        let volume = volume_of(sim, handle)?;
        let degenerate = sim.entity(handle).is_some_and(Bounded::is_degenerate);
        let root = self.root();
        let max_entities = self.config.max_entities_per_node;
        let min_size = self.config.min_node_size;

        let mut id = start;
        loop {
            let node = self.node(id);
            let region = node.region;
            let escapes = region.contains(&volume) != Containment::Contains;
            if escapes && id == root {
                return self.rebuild_subtree(sim, id, Some(handle));
            }

            let is_leaf = !node.has_children() && node.entities.len() <= max_entities;
            if is_leaf || region.is_within_min_size(min_size) {
                trace!(?handle, node = ?id, "appended");
                self.node_mut(id).entities.push(handle);
                return Ok(());
            }
            if degenerate || escapes {
                return self.rebuild_subtree(sim, id, Some(handle));
            }

            let target = (0..8).find(|&octant| {
                let child_region = match node.children[octant] {
                    Some(child) => self.node(child).region,
                    None => region.octant(octant),
                };
                child_region.contains(&volume) == Containment::Contains
            });
            let Some(octant) = target else {
                // Straddles a split plane.
                self.node_mut(id).entities.push(handle);
                return Ok(());
            };
            let existing = node.children[octant];
            match existing {
                Some(child) => id = child,
                None => {
                    let child = self.create_child(id, octant, region.octant(octant));
                    self.node_mut(child).entities.push(handle);
                    trace!(?handle, node = ?child, octant, "seeded new child");
                    return Ok(());
                }
            }
        }
    }

    /// Collect every entity below `id` (plus `extra`), drop the descendants,
    /// and subdivide again.
    ///
    /// At the root the region grows to cover all collected entities. Below
    /// the root the region is fixed, so entities that have moved out of it
    /// are placed again from their nearest containing ancestor. Dead or
    /// unknown entities are discarded.
    pub(crate) fn rebuild_subtree<S: Simulation<Handle = H>>(
        &mut self,
        sim: &S,
        id: NodeId,
        extra: Option<H>,
    ) -> Result<(), OctreeError<H>> {
        let mut handles = self.subtree_entities(id);
        handles.extend(extra);
        let mut entries = resolve_live(sim, handles)?;

        let mut region = self.node(id).region;
        let mut escaped = Vec::new();
        if id == self.root() {
            region = fit_root_region(region, &entries);
        } else {
            (entries, escaped) = entries
                .into_iter()
                .partition(|(_, volume)| region.contains(volume) == Containment::Contains);
        }
        self.clear_children(id);
        let node = self.node_mut(id);
        node.region = region;
        node.entities.clear();
        let entity_count = entries.len();
        self.subdivide(id, entries);
        debug!(
            node = ?id,
            entities = entity_count,
            escaped = escaped.len(),
            "subtree rebuilt"
        );

        for (handle, volume) in escaped {
            // An earlier placement may have rebuilt the root and replaced `id`.
            let target = if self.is_alive(id) {
                self.containing_ancestor(id, &volume)
            } else {
                self.root()
            };
            trace!(?handle, from = ?id, to = ?target, "re-homed after rebuild");
            if let Err(err) = self.place(sim, target, handle) {
                self.readmit(id, handle);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Put back an entity whose placement failed, at `id` or, if a rebuild
    /// replaced that node, at the root.
    pub(crate) fn readmit(&mut self, id: NodeId, handle: H) {
        let home = if self.is_alive(id) { id } else { self.root() };
        self.node_mut(home).entities.push(handle);
    }
}
