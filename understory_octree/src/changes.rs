// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural change summary polled from the tree.

use alloc::vec::Vec;

use crate::types::NodeId;

/// Nodes created and destroyed since the last [`crate::Octree::take_changes`].
///
/// Both lists are in the order the changes happened. A node created and
/// destroyed within the same window appears in both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Changes {
    /// Nodes that came into existence.
    pub created: Vec<NodeId>,
    /// Nodes that were destroyed.
    pub destroyed: Vec<NodeId>,
}

impl Changes {
    /// Returns true if no node was created or destroyed.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.destroyed.is_empty()
    }
}
