//! Collision triangles and fan triangulation.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};
use crate::polygon::PlanarPolygon;
use crate::vertex::SplitVertex;

/// A collision leaf triangle: three positions and one face normal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionTriangle {
    vertices: [Point3<f32>; 3],
    normal: Vector3<f32>,
}

impl CollisionTriangle {
    pub fn new(vertices: [Point3<f32>; 3], normal: Vector3<f32>) -> Self {
        Self { vertices, normal }
    }

    /// Returns the three vertices of the triangle.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>; 3] {
        &self.vertices
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Computes the centroid (center of mass) of the triangle.
    pub fn centroid(&self) -> Point3<f32> {
        let [a, b, c] = &self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// Fan-triangulates a planar polygon, giving every triangle the polygon's normal.
    pub fn fan<P: PlanarPolygon>(polygon: &P) -> impl Iterator<Item = CollisionTriangle> + '_ {
        let vertices = polygon.vertices();
        let normal = polygon.normal();
        let apex = vertices[0].position();
        vertices.windows(2).skip(1).map(move |edge| {
            CollisionTriangle::new([apex, edge[0].position(), edge[1].position()], normal)
        })
    }
}

/// Fan-triangulates a convex polygon around its first vertex.
///
/// Fails with [`BuildError::DegeneratePolygon`] if any two vertices lie within
/// `weld_epsilon` of each other.
pub fn fan_triangulate_checked(
    positions: &[Point3<f32>],
    weld_epsilon: f32,
) -> Result<Vec<[Point3<f32>; 3]>> {
    for (first, a) in positions.iter().enumerate() {
        for (offset, b) in positions[first + 1..].iter().enumerate() {
            if (a - b).norm() <= weld_epsilon {
                return Err(BuildError::DegeneratePolygon {
                    first,
                    second: first + 1 + offset,
                    position: *a,
                });
            }
        }
    }

    Ok(positions
        .windows(2)
        .skip(1)
        .map(|edge| [positions[0], edge[0], edge[1]])
        .collect())
}
