// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_octree --heading-base-level=0

//! Understory Octree: a dynamic octree with hierarchical broad-phase collision.
//!
//! Understory Octree indexes a changing set of bounded 3D entities for real-time simulations.
//!
//! - Builds a tree of nested cubic regions from an initial entity set, once.
//! - Keeps every entity at the smallest node whose region fully contains it, re-homing entities as they move.
//! - Retires empty branches after a lifespan countdown, with hysteresis against thrashing near boundaries.
//! - Emits candidate colliding pairs every tick without comparing every entity with every other.
//!
//! ## Collaborators
//!
//! The tree stores entity handles only. Everything else comes from the caller:
//! - [`Simulation`]: resolves handles to [`Bounded`] entities, advances them, and finalizes ticks.
//! - [`NarrowPhase`]: exact tests for broad-phase candidates, and responses to confirmed collisions.
//! - [`RenderBatch`]: receives node wireframes when debug drawing is on.
//!
//! ## Broad phase, not a full collision check
//!
//! An entity is paired with the entities of its own node and of every ancestor.
//! Entities in disjoint sibling branches are never paired, even if their volumes touch
//! across a split plane. Migration keeps each entity in the smallest correctly-containing
//! node along its path, which bounds what this approximation can miss.
//!
//! ## API overview
//!
//! - [`Octree`]: node arena, build state, pending queue, and accessors.
//! - [`Region`] and [`BoundingVolume`]: axis-aligned boxes and the volumes tested against them.
//! - [`NodeId`]: generational handle of a node.
//! - [`ChildMask`]: which of a node's eight octants have children.
//! - [`OctreeConfig`]: subdivision thresholds and lifespan tuning.
//!
//! Key operations:
//! - [`Octree::build`] subdivides the initial entity set; [`Octree::update`] calls it on the first tick.
//! - [`Octree::insert`] places one entity along a single root-to-leaf path.
//! - [`Octree::update`] advances, migrates, prunes, and runs the broad phase, returning a [`TickSummary`].
//! - [`Octree::collisions`] runs the broad phase on its own.
//! - [`Octree::draw`] delegates entity visuals and optionally adds node wireframes.
//! - [`Octree::take_changes`] drains the nodes created and destroyed since the last call.
//! - [`enclosing_box`] computes the tight bounds of a set of entities.
//!
//! ## Example
//!
//! ```rust
//! use core::time::Duration;
//! use glam::Vec3;
//! use understory_octree::{
//!     Bounded, BoundingVolume, NarrowPhase, NodeId, Octree, OctreeConfig, Region, Simulation,
//! };
//!
//! struct Ball {
//!     center: Vec3,
//!     radius: f32,
//! }
//!
//! impl Bounded for Ball {
//!     fn bounding_volume(&self) -> Option<BoundingVolume> {
//!         Some(BoundingVolume::sphere(self.center, self.radius))
//!     }
//!     fn half_size(&self) -> Vec3 {
//!         Vec3::splat(self.radius)
//!     }
//!     fn is_alive(&self) -> bool {
//!         true
//!     }
//! }
//!
//! struct World(Vec<Ball>);
//!
//! impl Simulation for World {
//!     type Handle = usize;
//!     type Entity = Ball;
//!     fn entity(&self, handle: usize) -> Option<&Ball> {
//!         self.0.get(handle)
//!     }
//!     fn advance(&mut self, _: &[usize], _: Duration) -> Vec<usize> {
//!         Vec::new()
//!     }
//!     fn finalize_tick(&mut self, _: Duration) {}
//! }
//!
//! struct Overlaps;
//!
//! impl NarrowPhase<World> for Overlaps {
//!     type Record = (usize, usize);
//!     fn test(&mut self, sim: &World, a: usize, b: usize, _: NodeId) -> Option<(usize, usize)> {
//!         let va = sim.0[a].bounding_volume()?;
//!         let vb = sim.0[b].bounding_volume()?;
//!         va.intersects(&vb).then_some((a, b))
//!     }
//!     fn respond(&mut self, _: &mut World, _: (usize, usize), _: Duration) {}
//! }
//!
//! let mut world = World(vec![
//!     Ball { center: Vec3::splat(4.0), radius: 1.0 },
//!     Ball { center: Vec3::splat(3.5), radius: 0.5 },
//!     Ball { center: Vec3::splat(7.0), radius: 0.5 },
//! ]);
//! let mut tree = Octree::with_entities(Region::ZERO, 0..3, OctreeConfig::default());
//!
//! // The first tick builds the tree.
//! let built = tree.update(&mut world, &mut Overlaps, Duration::from_millis(16)).unwrap();
//! assert!(built.built);
//!
//! let tick = tree.update(&mut world, &mut Overlaps, Duration::from_millis(16)).unwrap();
//! assert_eq!(tick.collisions, 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod build;
mod changes;
mod collide;
mod config;
mod draw;
mod entity;
mod error;
mod insert;
mod region;
mod tree;
mod types;
mod update;
mod util;

#[cfg(test)]
mod testing;

pub use build::enclosing_box;
pub use changes::Changes;
pub use config::OctreeConfig;
pub use entity::{Bounded, NarrowPhase, RenderBatch, Simulation};
pub use error::OctreeError;
pub use region::{BoundingVolume, Containment, Region};
pub use tree::Octree;
pub use types::{ChildMask, NodeId};
pub use update::TickSummary;
