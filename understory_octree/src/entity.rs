// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits: the tree indexes entities it does not own.
//!
//! The tree stores only entity handles. Geometry, motion, and liveness come
//! from a [`Simulation`]; exact collision tests and their responses come from
//! a [`NarrowPhase`]; debug output goes to a [`RenderBatch`].

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;
use core::time::Duration;

use glam::Vec3;

use crate::region::{BoundingVolume, Region};
use crate::types::NodeId;

/// Anything with a bounding volume, a size, and a lifetime can be indexed.
pub trait Bounded {
    /// Volume used for containment and overlap tests.
    ///
    /// Returning `None` for an entity that reaches the tree is an error; see
    /// [`OctreeError::MissingBoundingVolume`](crate::OctreeError::MissingBoundingVolume).
    fn bounding_volume(&self) -> Option<BoundingVolume>;

    /// Half extents of the entity. Zero means the entity is point-like.
    fn half_size(&self) -> Vec3;

    /// Whether the entity still participates in the simulation.
    fn is_alive(&self) -> bool;

    /// Whether the entity has no size.
    fn is_degenerate(&self) -> bool {
        self.half_size() == Vec3::ZERO
    }
}

/// The owner of entity state and motion.
pub trait Simulation {
    /// Handle stored in tree nodes.
    type Handle: Copy + Eq + Hash + Debug;
    /// Entity type resolved from a handle.
    type Entity: Bounded;

    /// Resolve a handle. Unknown handles are treated as dead.
    fn entity(&self, handle: Self::Handle) -> Option<&Self::Entity>;

    /// Advance `entities` by `elapsed` and return the ones whose position changed.
    fn advance(&mut self, entities: &[Self::Handle], elapsed: Duration) -> Vec<Self::Handle>;

    /// Called once per tick after collision responses have been dispatched.
    fn finalize_tick(&mut self, elapsed: Duration);

    /// Draw entity visuals.
    ///
    /// The default implementation draws nothing.
    fn draw<R: RenderBatch>(&self, batch: &mut R) {
        let _ = batch;
    }
}

/// Exact collision testing and response for broad-phase candidates.
pub trait NarrowPhase<S: Simulation> {
    /// Record describing a confirmed collision.
    type Record;

    /// Test a candidate pair found at `node`. Return a record if they collide.
    fn test(
        &mut self,
        sim: &S,
        a: S::Handle,
        b: S::Handle,
        node: NodeId,
    ) -> Option<Self::Record>;

    /// React to a confirmed collision.
    fn respond(&mut self, sim: &mut S, record: Self::Record, elapsed: Duration);
}

/// Sink for debug wireframes.
pub trait RenderBatch {
    /// Draw the outline of a region.
    fn draw_region(&mut self, region: Region);
}
