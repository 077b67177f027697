// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debug rendering.

use core::fmt::Debug;
use core::hash::Hash;

use crate::entity::{RenderBatch, Simulation};
use crate::tree::Octree;

impl<H: Copy + Eq + Hash + Debug> Octree<H> {
    /// Draw entity visuals through `sim`, then node wireframes if debug
    /// drawing is enabled.
    ///
    /// Wireframes are emitted for every live node in depth-first pre-order.
    pub fn draw<S, R>(&self, sim: &S, batch: &mut R)
    where
        S: Simulation<Handle = H>,
        R: RenderBatch,
    {
        sim.draw(batch);
        if self.debug_draw {
            for id in self.depth_first() {
                batch.draw_region(self.node(id).region);
            }
        }
    }

    /// Enable or disable node wireframes.
    pub fn set_debug_draw(&mut self, enabled: bool) {
        self.debug_draw = enabled;
    }

    /// Flip node wireframes and return the new state.
    pub fn toggle_debug_draw(&mut self) -> bool {
        self.debug_draw = !self.debug_draw;
        self.debug_draw
    }

    /// Whether node wireframes are drawn.
    pub fn debug_draw(&self) -> bool {
        self.debug_draw
    }
}
