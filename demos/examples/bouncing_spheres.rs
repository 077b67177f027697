// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bouncing spheres: an octree driving the broad phase of a tiny simulation.
//!
//! This example shows how to:
//! - implement `Simulation`, `NarrowPhase`, and `RenderBatch` for your own world,
//! - let the first `update` build the tree from an unknown initial region,
//! - poll node churn with `take_changes`, and
//! - spawn entities mid-run and retire them with the alive flag.
//!
//! Run:
//! - `cargo run -p understory_demos --example bouncing_spheres`
//! - `RUST_LOG=understory_octree=trace cargo run -p understory_demos --example bouncing_spheres`

use std::time::Duration;

use glam::Vec3;
use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_octree::{
    Bounded, BoundingVolume, NarrowPhase, NodeId, Octree, OctreeConfig, Region, RenderBatch,
    Simulation,
};

const ARENA: f32 = 32.0;
const TICK: Duration = Duration::from_millis(50);

#[derive(Clone, Debug)]
struct Ball {
    position: Vec3,
    velocity: Vec3,
    radius: f32,
    /// Remaining ticks before the ball is retired, if mortal.
    ttl: Option<u32>,
}

impl Bounded for Ball {
    fn bounding_volume(&self) -> Option<BoundingVolume> {
        Some(BoundingVolume::sphere(self.position, self.radius))
    }

    fn half_size(&self) -> Vec3 {
        Vec3::splat(self.radius)
    }

    fn is_alive(&self) -> bool {
        self.ttl != Some(0)
    }
}

/// Balls bouncing off the walls of a cube.
#[derive(Debug, Default)]
struct Arena {
    balls: Vec<Ball>,
    ticks: u64,
}

impl Arena {
    fn spawn(&mut self, position: Vec3, velocity: Vec3, radius: f32, ttl: Option<u32>) -> usize {
        self.balls.push(Ball {
            position,
            velocity,
            radius,
            ttl,
        });
        self.balls.len() - 1
    }
}

impl Simulation for Arena {
    type Handle = usize;
    type Entity = Ball;

    fn entity(&self, handle: usize) -> Option<&Ball> {
        self.balls.get(handle)
    }

    fn advance(&mut self, entities: &[usize], elapsed: Duration) -> Vec<usize> {
        let dt = elapsed.as_secs_f32();
        let mut moved = Vec::new();
        for &handle in entities {
            let ball = &mut self.balls[handle];
            if let Some(ttl) = ball.ttl.as_mut() {
                *ttl = ttl.saturating_sub(1);
            }
            if ball.velocity == Vec3::ZERO {
                continue;
            }
            ball.position += ball.velocity * dt;
            // Reflect off the walls.
            let lo = Vec3::splat(ball.radius);
            let hi = Vec3::splat(ARENA - ball.radius);
            let hit_lo = ball.position.cmplt(lo);
            let hit_hi = ball.position.cmpgt(hi);
            ball.velocity = Vec3::select(hit_lo | hit_hi, -ball.velocity, ball.velocity);
            ball.position = ball.position.clamp(lo, hi);
            moved.push(handle);
        }
        moved
    }

    fn finalize_tick(&mut self, _elapsed: Duration) {
        self.ticks += 1;
    }

    fn draw<R: RenderBatch>(&self, batch: &mut R) {
        for ball in self.balls.iter().filter(|b| b.is_alive()) {
            batch.draw_region(ball.bounding_volume().map_or(Region::ZERO, |v| v.aabb()));
        }
    }
}

/// Confirms overlapping spheres and swaps their velocities.
#[derive(Debug, Default)]
struct Bounce {
    contacts: usize,
}

impl NarrowPhase<Arena> for Bounce {
    type Record = (usize, usize);

    fn test(&mut self, sim: &Arena, a: usize, b: usize, _node: NodeId) -> Option<(usize, usize)> {
        let va = sim.balls[a].bounding_volume()?;
        let vb = sim.balls[b].bounding_volume()?;
        va.intersects(&vb).then_some((a, b))
    }

    fn respond(&mut self, sim: &mut Arena, (a, b): (usize, usize), _elapsed: Duration) {
        let va = sim.balls[a].velocity;
        sim.balls[a].velocity = sim.balls[b].velocity;
        sim.balls[b].velocity = va;
        self.contacts += 1;
    }
}

/// Counts what would be drawn.
#[derive(Debug, Default)]
struct CountingBatch {
    regions: usize,
}

impl RenderBatch for CountingBatch {
    fn draw_region(&mut self, _region: Region) {
        self.regions += 1;
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut arena = Arena::default();
    let mut handles = Vec::new();
    for i in 0..24_u8 {
        let f = f32::from(i);
        let position = Vec3::new(
            2.0 + (f * 7.3) % (ARENA - 4.0),
            2.0 + (f * 3.1) % (ARENA - 4.0),
            2.0 + (f * 5.7) % (ARENA - 4.0),
        );
        let velocity = Vec3::new((f * 1.3).sin(), (f * 0.7).cos(), (f * 2.1).sin()) * 6.0;
        handles.push(arena.spawn(position, velocity, 0.5 + (f % 3.0) * 0.25, None));
    }

    let config = OctreeConfig::default()
        .with_max_entities_per_node(2)
        .with_min_node_size(2.0);
    let mut tree = Octree::with_entities(Region::ZERO, handles, config);
    tree.set_debug_draw(true);
    let mut bounce = Bounce::default();

    for tick in 0..120 {
        if tick == 40 {
            // Short-lived visitors dropped in mid-run.
            for i in 0..4_u8 {
                let f = f32::from(i);
                let handle = arena.spawn(
                    Vec3::new(8.0 + f * 4.0, 16.0, 16.0),
                    Vec3::new(0.0, 4.0, -4.0),
                    0.75,
                    Some(30),
                );
                tree.insert(&arena, handle)
                    .expect("spawned balls always have a bounding volume");
            }
        }

        let summary = tree
            .update(&mut arena, &mut bounce, TICK)
            .expect("every ball has a bounding volume");
        let changes = tree.take_changes();
        if tick % 20 == 0 || summary.removed > 0 {
            let mut batch = CountingBatch::default();
            tree.draw(&arena, &mut batch);
            info!(
                tick,
                nodes = tree.node_count(),
                entities = tree.entity_count(),
                created = changes.created.len(),
                destroyed = changes.destroyed.len(),
                moved = summary.moved,
                migrated = summary.migrated,
                removed = summary.removed,
                pruned = summary.pruned,
                collisions = summary.collisions,
                drawn = batch.regions,
                "tick"
            );
        }
    }

    info!(
        contacts = bounce.contacts,
        ticks = arena.ticks,
        root = ?tree.region(tree.root()),
        "done"
    );
}
