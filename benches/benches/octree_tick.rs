// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::Duration;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec3;
use understory_octree::{
    Bounded, BoundingVolume, NarrowPhase, NodeId, Octree, OctreeConfig, Region, Simulation,
};

const WORLD: f32 = 256.0;
const TICK: Duration = Duration::from_millis(16);

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }
    fn next_vec3(&mut self, scale: f32) -> Vec3 {
        Vec3::new(self.next_f32(), self.next_f32(), self.next_f32()) * scale
    }
}

#[derive(Clone)]
struct Particle {
    position: Vec3,
    velocity: Vec3,
    radius: f32,
}

impl Bounded for Particle {
    fn bounding_volume(&self) -> Option<BoundingVolume> {
        Some(BoundingVolume::sphere(self.position, self.radius))
    }
    fn half_size(&self) -> Vec3 {
        Vec3::splat(self.radius)
    }
    fn is_alive(&self) -> bool {
        true
    }
}

/// Particles drifting inside a cube, wrapping at the walls.
#[derive(Clone)]
struct Swarm(Vec<Particle>);

impl Swarm {
    fn random(count: usize, speed: f32, seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let particles = (0..count)
            .map(|_| Particle {
                position: rng.next_vec3(WORLD - 2.0) + Vec3::ONE,
                velocity: (rng.next_vec3(2.0) - Vec3::ONE) * speed,
                radius: 0.25 + rng.next_f32() * 0.75,
            })
            .collect();
        Self(particles)
    }
}

impl Simulation for Swarm {
    type Handle = u32;
    type Entity = Particle;

    fn entity(&self, handle: u32) -> Option<&Particle> {
        self.0.get(handle as usize)
    }

    fn advance(&mut self, entities: &[u32], elapsed: Duration) -> Vec<u32> {
        let dt = elapsed.as_secs_f32();
        for &handle in entities {
            let p = &mut self.0[handle as usize];
            p.position = (p.position + p.velocity * dt).rem_euclid(Vec3::splat(WORLD));
        }
        entities.to_vec()
    }

    fn finalize_tick(&mut self, _elapsed: Duration) {}
}

struct Overlaps;

impl NarrowPhase<Swarm> for Overlaps {
    type Record = (u32, u32);

    fn test(&mut self, sim: &Swarm, a: u32, b: u32, _node: NodeId) -> Option<(u32, u32)> {
        let va = sim.0[a as usize].bounding_volume()?;
        let vb = sim.0[b as usize].bounding_volume()?;
        va.intersects(&vb).then_some((a, b))
    }

    fn respond(&mut self, _sim: &mut Swarm, _record: (u32, u32), _elapsed: Duration) {}
}

fn world_region() -> Region {
    Region::new(Vec3::ZERO, Vec3::splat(WORLD))
}

fn built_tree(swarm: &Swarm) -> Octree<u32> {
    let count = swarm.0.len() as u32;
    let mut tree = Octree::with_entities(world_region(), 0..count, OctreeConfig::default());
    tree.build(swarm).unwrap();
    tree
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[1_000usize, 10_000] {
        let swarm = Swarm::random(n, 0.0, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("build_n{}", n), |b| {
            b.iter(|| black_box(built_tree(&swarm).node_count()))
        });
        group.bench_function(format!("build_unknown_bounds_n{}", n), |b| {
            b.iter(|| {
                let mut tree =
                    Octree::with_entities(Region::ZERO, 0..n as u32, OctreeConfig::default());
                tree.build(&swarm).unwrap();
                black_box(tree.node_count())
            })
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    for &n in &[1_000usize, 10_000] {
        let swarm = Swarm::random(n, 8.0, 0xFACE_FEED_CAFE_BABE);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("tick_n{}", n), |b| {
            b.iter_batched(
                || (built_tree(&swarm), swarm.clone()),
                |(mut tree, mut swarm)| {
                    let summary = tree.update(&mut swarm, &mut Overlaps, TICK).unwrap();
                    black_box(summary)
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("ten_ticks_n{}", n), |b| {
            b.iter_batched(
                || (built_tree(&swarm), swarm.clone()),
                |(mut tree, mut swarm)| {
                    for _ in 0..10 {
                        black_box(tree.update(&mut swarm, &mut Overlaps, TICK).unwrap());
                    }
                    black_box(tree.node_count())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_broad_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("broad_phase");
    for &n in &[1_000usize, 10_000] {
        let swarm = Swarm::random(n, 0.0, 0xC1A5_7E55_9999_ABCD);
        let tree = built_tree(&swarm);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("collisions_n{}", n), |b| {
            b.iter(|| black_box(tree.collisions(&swarm, &mut Overlaps).len()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_update, bench_broad_phase);
criterion_main!(benches);
