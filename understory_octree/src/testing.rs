// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles shared by the unit tests.

use alloc::vec::Vec;
use core::time::Duration;

use glam::Vec3;
use hashbrown::HashSet;

use crate::entity::{Bounded, NarrowPhase, RenderBatch, Simulation};
use crate::region::{BoundingVolume, Containment, Region};
use crate::tree::Octree;
use crate::types::NodeId;

#[derive(Clone, Debug)]
pub(crate) struct Body {
    pub(crate) position: Vec3,
    pub(crate) radius: f32,
    pub(crate) velocity: Vec3,
    pub(crate) alive: bool,
    pub(crate) has_volume: bool,
}

impl Bounded for Body {
    fn bounding_volume(&self) -> Option<BoundingVolume> {
        self.has_volume
            .then(|| BoundingVolume::sphere(self.position, self.radius))
    }

    fn half_size(&self) -> Vec3 {
        Vec3::splat(self.radius)
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}

/// Spheres moving at constant velocity. Handles are indices.
#[derive(Debug, Default)]
pub(crate) struct TestWorld {
    pub(crate) bodies: Vec<Body>,
    /// Every handle passed to `advance`, in call order.
    pub(crate) advance_log: Vec<u32>,
    pub(crate) finalized: usize,
}

impl TestWorld {
    fn spawn(&mut self, body: Body) -> u32 {
        self.bodies.push(body);
        u32::try_from(self.bodies.len() - 1).unwrap()
    }

    pub(crate) fn sphere(&mut self, center: Vec3, radius: f32) -> u32 {
        self.spawn(Body {
            position: center,
            radius,
            velocity: Vec3::ZERO,
            alive: true,
            has_volume: true,
        })
    }

    /// A degenerate entity.
    pub(crate) fn point(&mut self, at: Vec3) -> u32 {
        self.sphere(at, 0.0)
    }

    pub(crate) fn without_volume(&mut self, at: Vec3) -> u32 {
        let handle = self.sphere(at, 0.5);
        self.bodies[handle as usize].has_volume = false;
        handle
    }

    pub(crate) fn set_velocity(&mut self, handle: u32, velocity: Vec3) {
        self.bodies[handle as usize].velocity = velocity;
    }

    pub(crate) fn kill(&mut self, handle: u32) {
        self.bodies[handle as usize].alive = false;
    }

    pub(crate) fn position(&self, handle: u32) -> Vec3 {
        self.bodies[handle as usize].position
    }

    pub(crate) fn volume(&self, handle: u32) -> BoundingVolume {
        self.bodies[handle as usize].bounding_volume().unwrap()
    }
}

impl Simulation for TestWorld {
    type Handle = u32;
    type Entity = Body;

    fn entity(&self, handle: u32) -> Option<&Body> {
        self.bodies.get(handle as usize)
    }

    fn advance(&mut self, entities: &[u32], elapsed: Duration) -> Vec<u32> {
        self.advance_log.extend_from_slice(entities);
        let dt = elapsed.as_secs_f32();
        entities
            .iter()
            .copied()
            .filter(|&handle| {
                let body = &mut self.bodies[handle as usize];
                if body.velocity == Vec3::ZERO {
                    return false;
                }
                body.position += body.velocity * dt;
                true
            })
            .collect()
    }

    fn finalize_tick(&mut self, _elapsed: Duration) {
        self.finalized += 1;
    }

    fn draw<R: RenderBatch>(&self, batch: &mut R) {
        for body in self.bodies.iter().filter(|b| b.alive) {
            if let Some(volume) = body.bounding_volume() {
                batch.draw_region(volume.aabb());
            }
        }
    }
}

/// Records every candidate pair.
///
/// By default a pair collides when the bounding volumes overlap.
#[derive(Debug, Default)]
pub(crate) struct PairRecorder {
    pub(crate) tested: Vec<(u32, u32, NodeId)>,
    pub(crate) responded: Vec<(u32, u32)>,
    accept_all: bool,
}

impl PairRecorder {
    pub(crate) fn accept_all() -> Self {
        Self {
            accept_all: true,
            ..Self::default()
        }
    }
}

impl NarrowPhase<TestWorld> for PairRecorder {
    type Record = (u32, u32);

    fn test(&mut self, sim: &TestWorld, a: u32, b: u32, node: NodeId) -> Option<(u32, u32)> {
        self.tested.push((a, b, node));
        (self.accept_all || sim.volume(a).intersects(&sim.volume(b))).then_some((a, b))
    }

    fn respond(&mut self, _sim: &mut TestWorld, record: (u32, u32), _elapsed: Duration) {
        self.responded.push(record);
    }
}

#[derive(Debug, Default)]
pub(crate) struct Wireframes(pub(crate) Vec<Region>);

impl RenderBatch for Wireframes {
    fn draw_region(&mut self, region: Region) {
        self.0.push(region);
    }
}

/// Check the structural invariants of a tree at rest.
pub(crate) fn assert_invariants(tree: &Octree<u32>, world: &TestWorld) {
    let mut seen = HashSet::new();
    for id in tree.depth_first() {
        let node = tree.node(id);
        for octant in 0..8 {
            assert_eq!(
                node.active.has(octant),
                node.children[octant].is_some(),
                "mask bit {octant} disagrees with child slot"
            );
            if let Some(child) = node.children[octant] {
                let c = tree.node(child);
                assert_eq!(c.parent, Some(id), "broken parent link");
                assert_eq!(c.region, node.region.octant(octant), "child region mismatch");
            }
        }
        for &handle in &node.entities {
            assert!(seen.insert(handle), "entity {handle} held twice");
            assert_eq!(
                node.region.contains(&world.volume(handle)),
                Containment::Contains,
                "entity {handle} escapes node {id:?}"
            );
        }
    }
    assert_eq!(seen.len(), tree.entity_count(), "entity held by a detached node");
}
