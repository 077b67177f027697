// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tick driver: advance, migrate, prune, then run the broad phase.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;
use core::time::Duration;

use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::build::volume_of;
use crate::entity::{Bounded, NarrowPhase, Simulation};
use crate::error::OctreeError;
use crate::region::Containment;
use crate::tree::Octree;
use crate::types::NodeId;

/// What one call to [`Octree::update`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// This tick performed the one-shot build and nothing else.
    pub built: bool,
    /// Entities the simulation reported as moved.
    pub moved: usize,
    /// Moved entities re-homed to an ancestor's subtree.
    pub migrated: usize,
    /// Dead entities dropped from the tree.
    pub removed: usize,
    /// Nodes destroyed by lifespan pruning.
    pub pruned: usize,
    /// Collisions confirmed by the narrow phase and dispatched for response.
    pub collisions: usize,
}

/// Per-tick state threaded through the node recursion.
struct Tick<H> {
    elapsed: Duration,
    /// Entities already advanced this tick.
    advanced: HashSet<H>,
    /// Entities the simulation reported as moved that are still held.
    moved: HashSet<H>,
    summary: TickSummary,
}

impl<H: Copy + Eq + Hash + Debug> Octree<H> {
    /// Run one simulation step.
    ///
    /// On an unbuilt tree this only performs the build. Otherwise pending
    /// entities are inserted and the tree is walked twice. The first walk,
    /// from the root down, refreshes the countdown of every childless node
    /// and asks `sim` to advance each node's entities, dropping dead ones. The
    /// second walk, from the leaves up, re-homes moved entities that left
    /// their node's region and destroys children whose countdown reached zero.
    ///
    /// Finally the broad phase runs from the root, each confirmed collision
    /// is handed to [`NarrowPhase::respond`], and [`Simulation::finalize_tick`]
    /// is called.
    ///
    /// # Errors
    ///
    /// Fails if a pending or moved entity lacks a bounding volume. The
    /// offending entity stays where it was and the remaining steps of the tick
    /// are skipped.
    #[tracing::instrument(skip_all, name = "octree::update")]
    pub fn update<S, N>(
        &mut self,
        sim: &mut S,
        narrow: &mut N,
        elapsed: Duration,
    ) -> Result<TickSummary, OctreeError<H>>
    where
        S: Simulation<Handle = H>,
        N: NarrowPhase<S>,
    {
        if !self.built {
            self.build(&*sim)?;
            return Ok(TickSummary {
                built: true,
                ..TickSummary::default()
            });
        }

        while let Some(&handle) = self.pending.front() {
            self.insert(&*sim, handle)?;
            self.pending.pop_front();
        }

        let mut tick = Tick {
            elapsed,
            advanced: HashSet::new(),
            moved: HashSet::new(),
            summary: TickSummary::default(),
        };
        self.advance_node(sim, self.root(), &mut tick);
        self.settle_node(&*sim, self.root(), &mut tick)?;

        let records = self.collisions(&*sim, narrow);
        tick.summary.collisions = records.len();
        for record in records {
            narrow.respond(sim, record, elapsed);
        }
        sim.finalize_tick(elapsed);

        debug!(summary = ?tick.summary, "tick complete");
        Ok(tick.summary)
    }

    /// First pass, top-down: advance entities and drop the dead.
    ///
    /// The tree shape does not change here, so every held entity is seen.
    fn advance_node<S: Simulation<Handle = H>>(
        &mut self,
        sim: &mut S,
        id: NodeId,
        tick: &mut Tick<H>,
    ) {
        let config = self.config;
        let node = self.node_mut(id);
        if !node.has_children() {
            node.lifespan = config.next_lifespan(node.entities.is_empty(), node.lifespan);
        }

        let owned: Vec<H> = node
            .entities
            .iter()
            .copied()
            .filter(|&handle| tick.advanced.insert(handle))
            .collect();
        let moved = if owned.is_empty() {
            Vec::new()
        } else {
            sim.advance(&owned, tick.elapsed)
        };
        tick.summary.moved += moved.len();

        let node = self.node_mut(id);
        let before = node.entities.len();
        node.entities
            .retain(|handle| sim.entity(*handle).is_some_and(Bounded::is_alive));
        tick.summary.removed += before - node.entities.len();
        tick.moved
            .extend(moved.into_iter().filter(|handle| node.entities.contains(handle)));

        for child in self.node(id).child_ids() {
            self.advance_node(sim, child, tick);
        }
    }

    /// Second pass, bottom-up: re-home moved entities, then prune children.
    fn settle_node<S: Simulation<Handle = H>>(
        &mut self,
        sim: &S,
        id: NodeId,
        tick: &mut Tick<H>,
    ) -> Result<(), OctreeError<H>> {
        for child in self.node(id).child_ids() {
            if self.is_alive(child) {
                self.settle_node(sim, child, tick)?;
            }
            // A rebuild further up may have replaced this node.
            if !self.is_alive(id) {
                return Ok(());
            }
        }

        let moved: Vec<H> = self
            .node(id)
            .entities
            .iter()
            .copied()
            .filter(|handle| tick.moved.contains(handle))
            .collect();
        for handle in moved {
            if !self.is_alive(id) {
                return Ok(());
            }
            if !self.node(id).entities.contains(&handle) {
                continue;
            }
            let volume = volume_of(sim, handle)?;
            if self.node(id).region.contains(&volume) == Containment::Contains {
                continue;
            }
            let target = self.containing_ancestor(id, &volume);
            self.take_entity(id, handle);
            if let Err(err) = self.place(sim, target, handle) {
                self.readmit(id, handle);
                return Err(err);
            }
            tick.summary.migrated += 1;
            trace!(?handle, from = ?id, to = ?target, "migrated");
        }

        if !self.is_alive(id) {
            return Ok(());
        }
        for octant in self.node(id).active.indices() {
            let Some(child) = self.node(id).children[octant] else {
                continue;
            };
            let c = self.node(child);
            if c.lifespan == Some(0) && !c.has_children() && c.entities.is_empty() {
                self.destroy_child(id, octant);
                tick.summary.pruned += 1;
                debug!(node = ?child, parent = ?id, octant, "pruned");
            }
        }
        Ok(())
    }
}
