// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning knobs for subdivision and node retirement.

/// Configuration for an [`Octree`](crate::Octree).
///
/// Each tree carries its own configuration; there is no process-wide state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeConfig {
    /// A node holding at most this many entities is not subdivided.
    pub max_entities_per_node: usize,
    /// A node whose extent along every axis is at most this size is never subdivided.
    pub min_node_size: f32,
    /// Countdown, in ticks, assigned to a childless node on its first empty tick.
    pub max_lifespan: u32,
    /// Upper bound for the countdown when an occupied node refills it.
    pub lifespan_cap: u32,
}

impl OctreeConfig {
    /// Set [`max_entities_per_node`](Self::max_entities_per_node).
    pub fn with_max_entities_per_node(mut self, n: usize) -> Self {
        self.max_entities_per_node = n;
        self
    }

    /// Set [`min_node_size`](Self::min_node_size).
    pub fn with_min_node_size(mut self, size: f32) -> Self {
        debug_assert!(size > 0.0, "min_node_size must be strictly positive");
        self.min_node_size = size;
        self
    }

    /// Set [`max_lifespan`](Self::max_lifespan).
    pub fn with_max_lifespan(mut self, ticks: u32) -> Self {
        self.max_lifespan = ticks;
        self
    }

    /// Set [`lifespan_cap`](Self::lifespan_cap).
    pub fn with_lifespan_cap(mut self, ticks: u32) -> Self {
        self.lifespan_cap = ticks;
        self
    }

    /// The countdown after one tick of a childless node, given its occupancy.
    ///
    /// An empty node starts at [`max_lifespan`](Self::max_lifespan) and then
    /// counts down. An occupied node with a running countdown doubles it (up
    /// to the cap) and still consumes the tick.
    pub(crate) fn next_lifespan(&self, empty: bool, current: Option<u32>) -> Option<u32> {
        match (empty, current) {
            (true, None) => Some(self.max_lifespan),
            (true, Some(ticks)) => Some(ticks.saturating_sub(1)),
            (false, Some(ticks)) => Some(
                ticks
                    .max(1)
                    .saturating_mul(2)
                    .min(self.lifespan_cap)
                    .saturating_sub(1),
            ),
            (false, None) => None,
        }
    }
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_entities_per_node: 1,
            min_node_size: 1.0,
            max_lifespan: 8,
            lifespan_cap: 64,
        }
    }
}
