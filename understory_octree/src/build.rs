// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot builder: recursive subdivision of a flat entity list.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use tracing::debug;

use crate::entity::{Bounded, Simulation};
use crate::error::OctreeError;
use crate::region::{BoundingVolume, Containment, Region};
use crate::tree::{EntityList, Octree};
use crate::types::NodeId;

/// An entity handle paired with its resolved bounding volume.
pub(crate) type Entry<H> = (H, BoundingVolume);

/// Tight axis-aligned box around the bounding volumes of `handles`.
///
/// Returns [`Region::ZERO`] when `handles` is empty.
///
/// # Errors
///
/// Fails if a handle cannot be resolved or its entity has no bounding volume.
pub fn enclosing_box<S: Simulation>(
    sim: &S,
    handles: &[S::Handle],
) -> Result<Region, OctreeError<S::Handle>> {
    let entries = resolve_all(sim, handles.iter().copied())?;
    Ok(bounds_of(&entries).unwrap_or(Region::ZERO))
}

/// Look up the bounding volume of one entity.
pub(crate) fn volume_of<S: Simulation>(
    sim: &S,
    handle: S::Handle,
) -> Result<BoundingVolume, OctreeError<S::Handle>> {
    sim.entity(handle)
        .ok_or(OctreeError::UnknownEntity(handle))?
        .bounding_volume()
        .ok_or(OctreeError::MissingBoundingVolume(handle))
}

pub(crate) fn resolve_all<S: Simulation>(
    sim: &S,
    handles: impl IntoIterator<Item = S::Handle>,
) -> Result<Vec<Entry<S::Handle>>, OctreeError<S::Handle>> {
    handles
        .into_iter()
        .map(|handle| volume_of(sim, handle).map(|volume| (handle, volume)))
        .collect()
}

/// Like [`resolve_all`], but silently drops handles that are unknown or dead.
pub(crate) fn resolve_live<S: Simulation>(
    sim: &S,
    handles: impl IntoIterator<Item = S::Handle>,
) -> Result<Vec<Entry<S::Handle>>, OctreeError<S::Handle>> {
    let mut out = Vec::new();
    for handle in handles {
        let Some(entity) = sim.entity(handle) else {
            continue;
        };
        if !entity.is_alive() {
            continue;
        }
        let volume = entity
            .bounding_volume()
            .ok_or(OctreeError::MissingBoundingVolume(handle))?;
        out.push((handle, volume));
    }
    Ok(out)
}

fn bounds_of<H>(entries: &[Entry<H>]) -> Option<Region> {
    entries
        .iter()
        .map(|(_, volume)| volume.aabb())
        .reduce(|a, b| a.union(&b))
}

/// The region a root must cover to hold `entries`.
///
/// A zero-volume region is replaced by the enclosing cube of the entities; a
/// region that does not cover every entity grows to the enclosing cube of
/// the union. Otherwise the region is returned unchanged.
pub(crate) fn fit_root_region<H>(region: Region, entries: &[Entry<H>]) -> Region {
    let Some(bounds) = bounds_of(entries) else {
        return region;
    };
    if region.is_zero_volume() {
        bounds.enclosing_cube()
    } else if region.contains_region(&bounds) {
        region
    } else {
        region.union(&bounds).enclosing_cube()
    }
}

impl<H: Copy + Eq + Hash + Debug> Octree<H> {
    /// Subdivide the initial entity set into a tree.
    ///
    /// Entities queued with [`Octree::enqueue`] are appended to the root list
    /// in arrival order first. If the root region has zero volume, it is
    /// replaced by the enclosing cube of the entities. Calling `build` on a
    /// built tree does nothing.
    ///
    /// # Errors
    ///
    /// Fails if any entity cannot be resolved or lacks a bounding volume. The
    /// tree is left untouched, including the pending queue.
    pub fn build<S: Simulation<Handle = H>>(&mut self, sim: &S) -> Result<(), OctreeError<H>> {
        if self.built {
            return Ok(());
        }
        let root = self.root();
        let handles = self
            .node(root)
            .entities
            .iter()
            .chain(self.pending.iter())
            .copied()
            .collect::<Vec<_>>();
        let entries = resolve_all(sim, handles)?;

        let region = fit_root_region(self.node(root).region, &entries);
        self.pending.clear();
        let node = self.node_mut(root);
        node.region = region;
        node.entities.clear();
        let entity_count = entries.len();
        self.subdivide(root, entries);
        self.built = true;
        debug!(
            nodes = self.node_count(),
            entities = entity_count,
            "octree built"
        );
        Ok(())
    }

    /// Distribute `entries` below `id`, which must be childless.
    ///
    /// Each entity goes to the first octant that fully contains it; entities
    /// straddling an octant boundary stay at `id`. Only octants that receive
    /// entities get a child node.
    pub(crate) fn subdivide(&mut self, id: NodeId, entries: Vec<Entry<H>>) {
        let region = self.node(id).region;
        if entries.len() <= self.config.max_entities_per_node
            || region.is_within_min_size(self.config.min_node_size)
        {
            self.node_mut(id)
                .entities
                .extend(entries.into_iter().map(|(handle, _)| handle));
            return;
        }

        let octants = region.subdivide();
        let mut buckets: [Vec<Entry<H>>; 8] = Default::default();
        let mut straddling = EntityList::new();
        for (handle, volume) in entries {
            match octants
                .iter()
                .position(|octant| octant.contains(&volume) == Containment::Contains)
            {
                Some(index) => buckets[index].push((handle, volume)),
                None => straddling.push(handle),
            }
        }
        self.node_mut(id).entities.extend(straddling);

        for (index, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let child = self.create_child(id, index, octants[index]);
            self.subdivide(child, bucket);
        }
    }
}
