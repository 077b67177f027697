// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: node arena, structure, and accessors.

use alloc::collections::VecDeque;
use alloc::{vec, vec::Vec};
use core::fmt::Debug;
use core::hash::Hash;

use smallvec::SmallVec;

use crate::changes::Changes;
use crate::config::OctreeConfig;
use crate::region::{BoundingVolume, Containment, Region};
use crate::types::{ChildMask, NodeId};

/// Entity handles held directly by one node.
pub(crate) type EntityList<H> = SmallVec<[H; 4]>;

/// Present children of one node, in octant order.
pub(crate) type ChildList = SmallVec<[NodeId; 8]>;

/// Dynamic octree over externally owned entities.
///
/// Nodes live in an arena and are addressed by generational [`NodeId`]s.
/// Each node owns its children and its entity list; the parent link is a
/// plain identifier used only for upward walks.
///
/// A tree starts unbuilt. The first [`Octree::update`] (or an explicit
/// [`Octree::build`]) subdivides the initial entity set once; afterwards the
/// tree is only mutated incrementally by insertion, migration, and pruning.
///
/// ## Example
///
/// ```rust
/// use glam::Vec3;
/// use understory_octree::{Octree, OctreeConfig, Region};
///
/// let tree: Octree<u32> = Octree::new(
///     Region::new(Vec3::ZERO, Vec3::splat(8.0)),
///     OctreeConfig::default(),
/// );
/// assert!(!tree.is_built());
/// assert_eq!(tree.node_count(), 1);
/// assert!(tree.entities(tree.root()).is_empty());
/// ```
pub struct Octree<H> {
    /// slots
    nodes: Vec<Option<Node<H>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
    pub(crate) config: OctreeConfig,
    pub(crate) built: bool,
    pub(crate) pending: VecDeque<H>,
    pub(crate) changes: Changes,
    pub(crate) debug_draw: bool,
}

impl<H> Debug for Octree<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let entities: usize = self.nodes.iter().flatten().map(|n| n.entities.len()).sum();
        f.debug_struct("Octree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("entities", &entities)
            .field("pending", &self.pending.len())
            .field("built", &self.built)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<H> {
    generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: [Option<NodeId>; 8],
    pub(crate) active: ChildMask,
    pub(crate) region: Region,
    pub(crate) entities: EntityList<H>,
    /// `None` until the node first sits empty without children.
    pub(crate) lifespan: Option<u32>,
}

impl<H> Node<H> {
    fn new(generation: u32, parent: Option<NodeId>, region: Region) -> Self {
        Self {
            generation,
            parent,
            children: [None; 8],
            active: ChildMask::empty(),
            region,
            entities: SmallVec::new(),
            lifespan: None,
        }
    }

    pub(crate) fn has_children(&self) -> bool {
        !self.active.is_empty()
    }

    pub(crate) fn child_ids(&self) -> ChildList {
        self.active
            .indices()
            .filter_map(|octant| self.children[octant])
            .collect()
    }
}

impl<H: Copy + Eq + Hash + Debug> Octree<H> {
    /// Create an unbuilt tree with an empty root covering `region`.
    ///
    /// Pass [`Region::ZERO`] when the bounds are unknown; the build then
    /// derives a power-of-two cube from the entities.
    pub fn new(region: Region, config: OctreeConfig) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
            config,
            built: false,
            pending: VecDeque::new(),
            changes: Changes::default(),
            debug_draw: false,
        };
        tree.root = tree.alloc(None, region);
        tree
    }

    /// Create an unbuilt tree whose root holds `entities`.
    pub fn with_entities(
        region: Region,
        entities: impl IntoIterator<Item = H>,
        config: OctreeConfig,
    ) -> Self {
        let mut tree = Self::new(region, config);
        let root = tree.root;
        tree.node_mut(root).entities.extend(entities);
        tree
    }

    /// The root node. It lives as long as the tree.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The configuration this tree was created with.
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Whether the one-shot build has happened.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Queue an entity for insertion on the next [`Octree::update`].
    ///
    /// Queued entities are drained in arrival order: into the root list
    /// before the first build, or one by one through incremental insertion
    /// once the tree is built.
    pub fn enqueue(&mut self, handle: H) {
        self.pending.push_back(handle);
    }

    /// Entities waiting in the insertion queue, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = H> + '_ {
        self.pending.iter().copied()
    }

    /// Drain nodes created and destroyed since the previous call.
    pub fn take_changes(&mut self) -> Changes {
        core::mem::take(&mut self.changes)
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Region covered by a live node.
    pub fn region(&self, id: NodeId) -> Option<Region> {
        self.node_opt(id).map(|n| n.region)
    }

    /// Entities held directly by a node, or an empty slice if `id` is stale.
    pub fn entities(&self, id: NodeId) -> &[H] {
        self.node_opt(id).map_or(&[], |n| n.entities.as_slice())
    }

    /// The child occupying `octant`, if present.
    pub fn child(&self, id: NodeId, octant: usize) -> Option<NodeId> {
        self.node_opt(id)?.children.get(octant).copied().flatten()
    }

    /// Mask of present children, empty if `id` is stale.
    pub fn active_children(&self, id: NodeId) -> ChildMask {
        self.node_opt(id).map_or(ChildMask::empty(), |n| n.active)
    }

    /// Present children of a node in octant order.
    pub fn children_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node_opt(id)
            .map(Node::child_ids)
            .unwrap_or_default()
            .into_iter()
    }

    /// Returns the parent of a node if live, or `None` for the root or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id)?.parent
    }

    /// Remaining countdown of a node, or `None` if the countdown has not
    /// started or `id` is stale.
    pub fn lifespan(&self, id: NodeId) -> Option<u32> {
        self.node_opt(id)?.lifespan
    }

    /// Number of edges between a live node and the root.
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        let mut current = self.node_opt(id)?.parent;
        let mut depth = 0;
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).parent;
        }
        Some(depth)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Number of entities held by all nodes (excluding the pending queue).
    pub fn entity_count(&self) -> usize {
        self.nodes.iter().flatten().map(|n| n.entities.len()).sum()
    }

    /// The node currently holding `handle`, if any.
    ///
    /// This scans the tree; it is meant for diagnostics and tests.
    pub fn node_of(&self, handle: H) -> Option<NodeId> {
        self.depth_first()
            .find(|&id| self.node(id).entities.contains(&handle))
    }

    /// Live nodes in depth-first pre-order, children in octant order.
    pub fn depth_first(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        core::iter::from_fn(move || {
            let id = stack.pop()?;
            // Reversed so that octant 0 is popped first.
            stack.extend(self.node(id).child_ids().into_iter().rev());
            Some(id)
        })
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node<H> {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<H> {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node<H>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Allocate a detached node and report it as created.
    pub(crate) fn alloc(&mut self, parent: Option<NodeId>, region: Region) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, parent, region));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, parent, region)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        self.changes.created.push(id);
        id
    }

    /// Allocate a child of `parent` in `octant` and mark it present.
    pub(crate) fn create_child(&mut self, parent: NodeId, octant: usize, region: Region) -> NodeId {
        debug_assert!(
            self.node(parent).children[octant].is_none(),
            "octant {octant} is already occupied"
        );
        let child = self.alloc(Some(parent), region);
        let p = self.node_mut(parent);
        p.children[octant] = Some(child);
        p.active |= ChildMask::octant(octant);
        child
    }

    /// Unlink the child in `octant` and free its whole subtree.
    pub(crate) fn destroy_child(&mut self, parent: NodeId, octant: usize) {
        let p = self.node_mut(parent);
        let Some(child) = p.children[octant].take() else {
            return;
        };
        p.active.remove(ChildMask::octant(octant));
        self.free_subtree(child);
    }

    /// Free every descendant of `id`, keeping `id` itself as a childless node.
    pub(crate) fn clear_children(&mut self, id: NodeId) {
        for octant in self.node(id).active.indices() {
            self.destroy_child(id, octant);
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = self.nodes[id.idx()].take().expect("dangling NodeId");
            stack.extend(node.child_ids());
            self.free_list.push(id.idx());
            self.changes.destroyed.push(id);
        }
    }

    /// Every entity in the subtree rooted at `id`, in pre-order.
    pub(crate) fn subtree_entities(&self, id: NodeId) -> Vec<H> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            out.extend_from_slice(&node.entities);
            stack.extend(node.child_ids().into_iter().rev());
        }
        out
    }

    /// Nearest strict ancestor of `id` whose region fully contains `volume`,
    /// falling back to the root.
    pub(crate) fn containing_ancestor(&self, id: NodeId, volume: &BoundingVolume) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            current = parent;
            if self.node(current).region.contains(volume) == Containment::Contains {
                break;
            }
        }
        current
    }

    /// Remove the first occurrence of `handle` from a node, keeping order.
    pub(crate) fn take_entity(&mut self, id: NodeId, handle: H) -> bool {
        let entities = &mut self.node_mut(id).entities;
        match entities.iter().position(|&h| h == handle) {
            Some(pos) => {
                entities.remove(pos);
                true
            }
            None => false,
        }
    }
}
