// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while resolving entity geometry.

use core::fmt::Debug;

use thiserror::Error;

/// Errors that abort a build, insertion, or update.
///
/// Operations resolve every bounding volume they need before restructuring
/// the tree, so an error leaves the tree as it was before the call.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum OctreeError<H: Debug> {
    /// Every entity placed in the tree must expose a bounding volume.
    #[error("entity {0:?} has no bounding volume")]
    MissingBoundingVolume(H),

    /// The simulation could not resolve a handle held by the tree.
    #[error("entity {0:?} is unknown to the simulation")]
    UnknownEntity(H),
}
