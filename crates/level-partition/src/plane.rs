//! Plane representation and point/edge tests.

use nalgebra::{Point3, Vector3, Vector4};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::PLANE_EPSILON;
use crate::error::{BuildError, Result};

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Positive side of the normal.
    Front,
    /// Negative side of the normal.
    Back,
    /// Within epsilon of the plane.
    OnPlane,
}

/// Classification of a polygon relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No vertex behind the plane, at least one in front.
    Front,
    /// No vertex in front of the plane, at least one behind.
    Back,
    /// Vertices on both sides.
    Spanning,
    /// Every vertex on the plane, polygon facing the same way as the plane.
    CoplanarFront,
    /// Every vertex on the plane, polygon facing away from the plane.
    CoplanarBack,
}

impl Classification {
    /// Classifies a polygon from its per-vertex sides.
    ///
    /// Coplanar polygons are told apart by the dot product of `face_normal`
    /// and the plane normal: non-negative is front.
    pub fn from_sides(
        sides: impl IntoIterator<Item = PlaneSide>,
        face_normal: &Vector3<f32>,
        plane: &Plane,
    ) -> Self {
        let mut front = 0usize;
        let mut back = 0usize;

        for side in sides {
            match side {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::OnPlane => {}
            }
        }

        match (front, back) {
            (0, 0) if plane.faces_same_direction(face_normal) => Classification::CoplanarFront,
            (0, 0) => Classification::CoplanarBack,
            (_, 0) => Classification::Front,
            (0, _) => Classification::Back,
            _ => Classification::Spanning,
        }
    }

    #[inline]
    pub fn is_coplanar(self) -> bool {
        matches!(
            self,
            Classification::CoplanarFront | Classification::CoplanarBack
        )
    }
}

/// A plane in 3D space stored as `(nx, ny, nz, d)` with a unit normal.
///
/// The signed distance of a point `p` is `dot(p, n) + d`. For collision trees
/// the positive side is empty space; for BSP trees it is the side drawn first.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    normal: Vector3<f32>,
    d: f32,
}

impl Plane {
    /// Creates a new plane from a normal vector and distance term.
    /// Both are scaled so the normal has unit length.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn new(normal: Vector3<f32>, d: f32) -> Self {
        let norm = normal.norm();
        assert!(norm > f32::EPSILON, "Plane normal cannot be zero");
        Self {
            normal: normal / norm,
            d: d / norm,
        }
    }

    /// Creates a plane through `point` with the given normal.
    /// The normal will be normalized automatically.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        let norm = normal.norm();
        assert!(norm > f32::EPSILON, "Plane normal cannot be zero");
        let unit_normal = normal / norm;
        Self {
            normal: unit_normal,
            d: -unit_normal.dot(&point.coords),
        }
    }

    /// Creates a plane from three non-collinear points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    ///
    /// # Panics
    /// Panics if the points are collinear (or nearly so).
    pub fn from_three_points(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let normal = (b - a).cross(&(c - a));
        Self::from_point_and_normal(a, normal)
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the `d` term of the plane equation.
    #[inline]
    pub fn d(&self) -> f32 {
        self.d
    }

    /// Returns the plane packed as `(nx, ny, nz, d)`, the layout written to files.
    #[inline]
    pub fn to_vector4(&self) -> Vector4<f32> {
        Vector4::new(self.normal.x, self.normal.y, self.normal.z, self.d)
    }

    /// Computes the signed distance from a point to the plane.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f32>) -> f32 {
        point.coords.dot(&self.normal) + self.d
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default `PLANE_EPSILON` tolerance.
    #[inline]
    pub fn classify_point(&self, point: &Point3<f32>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: &Point3<f32>, epsilon: f32) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Returns `true` if `normal` does not point away from the plane normal.
    #[inline]
    pub fn faces_same_direction(&self, normal: &Vector3<f32>) -> bool {
        normal.dot(&self.normal) >= 0.0
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    /// Intersects the segment `start -> end` with the plane.
    ///
    /// Returns the intersection point and its parameter `t` along the segment,
    /// where `t = -distance(start) / dot(end - start, normal)`.
    ///
    /// Fails with [`BuildError::DegenerateEdgeIntersection`] when `t` falls
    /// outside `[0, 1]` (including the parallel case), meaning the plane does
    /// not actually cross this edge.
    pub fn edge_intersection(
        &self,
        start: &Point3<f32>,
        end: &Point3<f32>,
    ) -> Result<(Point3<f32>, f32)> {
        let direction = end - start;
        let t = -self.signed_distance(start) / direction.dot(&self.normal);

        if !(0.0..=1.0).contains(&t) {
            return Err(BuildError::DegenerateEdgeIntersection {
                t,
                start: *start,
                end: *end,
            });
        }

        Ok((start + direction * t, t))
    }
}
