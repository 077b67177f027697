// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use glam::Vec3;

use crate::util::pow2_ceil;

/// Result of testing a [`BoundingVolume`] against a [`Region`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Containment {
    /// The volume lies entirely outside the region.
    Disjoint,
    /// The volume overlaps the region but crosses at least one of its faces.
    Intersects,
    /// The volume lies entirely inside the region.
    Contains,
}

/// Axis-aligned box in 3D.
///
/// Faces are considered part of the region: a volume touching a face from the
/// inside is still contained, and two regions sharing a face overlap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Region {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Region {
    /// The empty region at the origin, used when initial bounds are unknown.
    pub const ZERO: Self = Self::new(Vec3::ZERO, Vec3::ZERO);

    /// Create a region from min/max corners.
    #[inline(always)]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a region from its center and half extents.
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Size along each axis.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Geometric center.
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.extent() * 0.5 + self.min
    }

    /// Return true if the region has no extent along any axis.
    #[inline]
    pub fn is_zero_volume(&self) -> bool {
        self.extent().cmple(Vec3::ZERO).all()
    }

    /// Return true if every axis extent is at most `min_size`.
    ///
    /// Regions this small are never subdivided further.
    #[inline]
    pub fn is_within_min_size(&self, min_size: f32) -> bool {
        self.extent().cmple(Vec3::splat(min_size)).all()
    }

    /// Whether this region contains the point.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    /// Whether `other` lies entirely inside this region.
    #[inline]
    pub fn contains_region(&self, other: &Self) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    /// Determines whether this region overlaps with another in any way.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// The smallest region enclosing both regions.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Classify a bounding volume against this region.
    pub fn contains(&self, volume: &BoundingVolume) -> Containment {
        match *volume {
            BoundingVolume::Box(other) => {
                if self.contains_region(&other) {
                    Containment::Contains
                } else if self.intersects(&other) {
                    Containment::Intersects
                } else {
                    Containment::Disjoint
                }
            }
            BoundingVolume::Sphere { center, radius } => {
                if self.contains_region(&volume.aabb()) {
                    return Containment::Contains;
                }
                let closest = center.clamp(self.min, self.max);
                if (closest - center).length_squared() <= radius * radius {
                    Containment::Intersects
                } else {
                    Containment::Disjoint
                }
            }
        }
    }

    /// One of the eight octants produced by splitting this region at its center.
    ///
    /// Bit 0 of `index` selects the upper half along x, bit 1 along y, and
    /// bit 2 along z, so octant 0 shares the minimum corner and octant 7 the
    /// maximum corner.
    pub fn octant(&self, index: usize) -> Self {
        debug_assert!(index < 8, "octant index out of range: {index}");
        let center = self.center();
        let mut min = self.min;
        let mut max = center;
        if index & 0b001 != 0 {
            min.x = center.x;
            max.x = self.max.x;
        }
        if index & 0b010 != 0 {
            min.y = center.y;
            max.y = self.max.y;
        }
        if index & 0b100 != 0 {
            min.z = center.z;
            max.z = self.max.z;
        }
        Self::new(min, max)
    }

    /// All eight octants, indexed as in [`Region::octant`].
    ///
    /// The octants exactly partition this region.
    pub fn subdivide(&self) -> [Self; 8] {
        core::array::from_fn(|index| self.octant(index))
    }

    /// The cube anchored at this region's minimum corner whose edge is the
    /// smallest power of two (at least 1) covering the largest extent.
    ///
    /// Halving a power-of-two edge keeps subdivision centers exact, and the
    /// unit floor keeps degenerate boxes from recursing without bound.
    pub fn enclosing_cube(&self) -> Self {
        let edge = pow2_ceil(self.extent().max_element());
        Self::new(self.min, self.min + Vec3::splat(edge))
    }
}

/// The volume an entity occupies, used for containment and overlap tests.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BoundingVolume {
    /// A sphere.
    Sphere {
        /// Center of the sphere.
        center: Vec3,
        /// Radius of the sphere.
        radius: f32,
    },
    /// An axis-aligned box.
    Box(Region),
}

impl BoundingVolume {
    /// Create a sphere volume.
    #[inline]
    pub const fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    /// Create a box volume collapsed onto a single point.
    #[inline]
    pub const fn point(at: Vec3) -> Self {
        Self::Box(Region::new(at, at))
    }

    /// Tight axis-aligned bounds of the volume.
    #[inline]
    pub fn aabb(&self) -> Region {
        match *self {
            Self::Sphere { center, radius } => {
                Region::from_center_half_extents(center, Vec3::splat(radius))
            }
            Self::Box(region) => region,
        }
    }

    /// Center of the volume.
    #[inline]
    pub fn center(&self) -> Vec3 {
        match *self {
            Self::Sphere { center, .. } => center,
            Self::Box(region) => region.center(),
        }
    }

    /// The same volume moved by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        match *self {
            Self::Sphere { center, radius } => Self::Sphere {
                center: center + offset,
                radius,
            },
            Self::Box(region) => Self::Box(Region::new(region.min + offset, region.max + offset)),
        }
    }

    /// Whether two volumes overlap. Touching volumes overlap.
    pub fn intersects(&self, other: &Self) -> bool {
        match (*self, *other) {
            (
                Self::Sphere {
                    center: a,
                    radius: ra,
                },
                Self::Sphere {
                    center: b,
                    radius: rb,
                },
            ) => (a - b).length_squared() <= (ra + rb) * (ra + rb),
            (Self::Box(a), Self::Box(b)) => a.intersects(&b),
            (Self::Box(region), sphere) | (sphere, Self::Box(region)) => {
                region.contains(&sphere) != Containment::Disjoint
            }
        }
    }
}
