//! Polygon variants fed to the tree builders.
//!
//! All three variants share one splitting algorithm through
//! [`PlanarPolygon`]: the splitter only needs vertex positions, a face
//! normal, a way to rebuild a fragment from new vertices, and the `used` flag.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::plane::{Classification, Plane};
use crate::triangle::fan_triangulate_checked;
use crate::vertex::{SplitVertex, TreeVertex};

/// A planar, consistently wound polygon with at least 3 vertices.
pub trait PlanarPolygon: Clone {
    type Vertex: SplitVertex;

    fn vertices(&self) -> &[Self::Vertex];

    /// Unit face normal.
    fn normal(&self) -> Vector3<f32>;

    /// Builds a fragment of this polygon from a new vertex list, keeping every
    /// other attribute (normal, ids, `used`).
    fn with_vertices(&self, vertices: Vec<Self::Vertex>) -> Self;

    /// Whether this polygon's plane has already served as a splitter.
    fn is_used(&self) -> bool;

    fn set_used(&mut self, used: bool);

    #[inline]
    fn len(&self) -> usize {
        self.vertices().len()
    }

    /// The supporting plane: through the first vertex, along the face normal.
    ///
    /// # Panics
    /// Panics if the face normal has zero length.
    fn plane(&self) -> Plane {
        Plane::from_point_and_normal(self.vertices()[0].position(), self.normal())
    }

    /// Classifies this polygon relative to a plane.
    fn classify(&self, plane: &Plane, epsilon: f32) -> Classification {
        Classification::from_sides(
            self.vertices()
                .iter()
                .map(|v| plane.classify_point_with_epsilon(&v.position(), epsilon)),
            &self.normal(),
            plane,
        )
    }

    /// Computes the centroid (average of the vertices) of the polygon.
    fn centroid(&self) -> Point3<f32> {
        let sum: Vector3<f32> = self.vertices().iter().map(|v| v.position().coords).sum();
        Point3::from(sum / self.len() as f32)
    }

    fn area(&self) -> f32 {
        newell_normal(self.vertices()).norm() * 0.5
    }
}

/// Face normal from the first three vertices (right-hand rule), normalized.
/// Returns a zero vector when they are collinear.
pub fn face_normal<V: SplitVertex>(vertices: &[V]) -> Vector3<f32> {
    if vertices.len() < 3 {
        return Vector3::zeros();
    }
    let a = vertices[0].position();
    let normal = (vertices[1].position() - a).cross(&(vertices[2].position() - a));
    normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
}

/// Newell's polygon normal. Its length is twice the polygon area.
pub fn newell_normal<V: SplitVertex>(vertices: &[V]) -> Vector3<f32> {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let current = vertices[i].position();
            let next = vertices[(i + 1) % n].position();
            current.coords.cross(&next.coords)
        })
        .sum()
}

/// World geometry polygon used for octrees and BSP trees.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreePolygon {
    vertices: Vec<TreeVertex>,
    normal: Vector3<f32>,
    material_id: u32,
    /// Id of the unsplit convex polygon this fragment came from. Keeps
    /// lightmap UV indexing stable across splits.
    convex_id: u32,
    draw_flags: u32,
    used: bool,
}

impl TreePolygon {
    /// Creates a polygon with an explicit face normal.
    ///
    /// # Panics (debug builds only)
    /// Panics if fewer than 3 vertices are provided.
    pub fn new(
        vertices: Vec<TreeVertex>,
        normal: Vector3<f32>,
        material_id: u32,
        convex_id: u32,
        draw_flags: u32,
    ) -> Self {
        debug_assert!(
            vertices.len() >= 3,
            "Polygon must have at least 3 vertices"
        );
        Self {
            vertices,
            normal,
            material_id,
            convex_id,
            draw_flags,
            used: false,
        }
    }

    /// Creates a polygon whose face normal follows the vertex winding.
    pub fn from_vertices(
        vertices: Vec<TreeVertex>,
        material_id: u32,
        convex_id: u32,
        draw_flags: u32,
    ) -> Self {
        let normal = face_normal(&vertices);
        Self::new(vertices, normal, material_id, convex_id, draw_flags)
    }

    #[inline]
    pub fn material_id(&self) -> u32 {
        self.material_id
    }

    #[inline]
    pub fn convex_id(&self) -> u32 {
        self.convex_id
    }

    #[inline]
    pub fn draw_flags(&self) -> u32 {
        self.draw_flags
    }
}

impl PlanarPolygon for TreePolygon {
    type Vertex = TreeVertex;

    #[inline]
    fn vertices(&self) -> &[TreeVertex] {
        &self.vertices
    }

    #[inline]
    fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    fn with_vertices(&self, vertices: Vec<TreeVertex>) -> Self {
        Self {
            vertices,
            normal: self.normal,
            material_id: self.material_id,
            convex_id: self.convex_id,
            draw_flags: self.draw_flags,
            used: self.used,
        }
    }

    #[inline]
    fn is_used(&self) -> bool {
        self.used
    }

    #[inline]
    fn set_used(&mut self, used: bool) {
        self.used = used;
    }
}

/// Collision geometry: positions only.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HullPolygon {
    vertices: Vec<Point3<f32>>,
    normal: Vector3<f32>,
    used: bool,
}

impl HullPolygon {
    /// Creates a hull polygon whose normal follows the vertex winding.
    pub fn new(vertices: Vec<Point3<f32>>) -> Self {
        let normal = face_normal(&vertices);
        Self::with_normal(vertices, normal)
    }

    pub fn with_normal(vertices: Vec<Point3<f32>>, normal: Vector3<f32>) -> Self {
        debug_assert!(
            vertices.len() >= 3,
            "Polygon must have at least 3 vertices"
        );
        Self {
            vertices,
            normal,
            used: false,
        }
    }

    /// Fan-triangulates a convex polygon into hull triangles.
    ///
    /// Fails with [`BuildError::DegeneratePolygon`](crate::BuildError::DegeneratePolygon)
    /// if any two vertices coincide within `weld_epsilon`.
    pub fn triangulate(positions: &[Point3<f32>], weld_epsilon: f32) -> Result<Vec<HullPolygon>> {
        Ok(fan_triangulate_checked(positions, weld_epsilon)?
            .into_iter()
            .map(|[a, b, c]| HullPolygon::new(vec![a, b, c]))
            .collect())
    }
}

impl PlanarPolygon for HullPolygon {
    type Vertex = Point3<f32>;

    #[inline]
    fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    #[inline]
    fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    fn with_vertices(&self, vertices: Vec<Point3<f32>>) -> Self {
        Self {
            vertices,
            normal: self.normal,
            used: self.used,
        }
    }

    #[inline]
    fn is_used(&self) -> bool {
        self.used
    }

    #[inline]
    fn set_used(&mut self, used: bool) {
        self.used = used;
    }
}

impl From<&TreePolygon> for HullPolygon {
    fn from(polygon: &TreePolygon) -> Self {
        Self::with_normal(
            polygon.vertices().iter().map(|v| v.position).collect(),
            polygon.normal(),
        )
    }
}

/// One face of the closed cage bounding a collision cell. Normals face outward.
///
/// Cage faces are never splitter candidates, so the `used` flag is always false.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundaryPolygon {
    vertices: Vec<Point3<f32>>,
    normal: Vector3<f32>,
}

impl BoundaryPolygon {
    pub fn new(vertices: Vec<Point3<f32>>) -> Self {
        let normal = face_normal(&vertices);
        Self::with_normal(vertices, normal)
    }

    pub fn with_normal(vertices: Vec<Point3<f32>>, normal: Vector3<f32>) -> Self {
        debug_assert!(
            vertices.len() >= 3,
            "Polygon must have at least 3 vertices"
        );
        Self { vertices, normal }
    }

    /// The same face wound the other way.
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Self {
            vertices,
            normal: -self.normal,
        }
    }
}

impl PlanarPolygon for BoundaryPolygon {
    type Vertex = Point3<f32>;

    #[inline]
    fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    #[inline]
    fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    fn with_vertices(&self, vertices: Vec<Point3<f32>>) -> Self {
        Self {
            vertices,
            normal: self.normal,
        }
    }

    #[inline]
    fn is_used(&self) -> bool {
        false
    }

    #[inline]
    fn set_used(&mut self, _used: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_quad(z: f32) -> TreePolygon {
        let up = Vector3::new(0.0, 0.0, 1.0);
        TreePolygon::from_vertices(
            vec![
                TreeVertex::at(Point3::new(0.0, 0.0, z), up),
                TreeVertex::at(Point3::new(2.0, 0.0, z), up),
                TreeVertex::at(Point3::new(2.0, 2.0, z), up),
                TreeVertex::at(Point3::new(0.0, 2.0, z), up),
            ],
            3,
            7,
            0x10,
        )
    }

    #[test]
    fn normal_follows_winding() {
        let quad = make_quad(0.0);
        assert_relative_eq!(quad.normal(), Vector3::new(0.0, 0.0, 1.0));

        let hull = HullPolygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]);
        assert_relative_eq!(hull.normal(), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn plane_passes_through_polygon() {
        let quad = make_quad(3.0);
        let plane = quad.plane();
        for v in quad.vertices() {
            assert_relative_eq!(plane.signed_distance(&v.position), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn area_and_centroid() {
        let quad = make_quad(0.0);
        assert_relative_eq!(quad.area(), 4.0);
        assert_relative_eq!(quad.centroid(), Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn classify_against_planes() {
        let quad = make_quad(0.0);
        let eps = crate::config::PLANE_EPSILON;

        let above = Plane::new(Vector3::new(0.0, 0.0, 1.0), -1.0);
        assert_eq!(quad.classify(&above, eps), Classification::Back);

        let below = Plane::new(Vector3::new(0.0, 0.0, 1.0), 1.0);
        assert_eq!(quad.classify(&below, eps), Classification::Front);

        let through = Plane::new(Vector3::new(1.0, 0.0, 0.0), -1.0);
        assert_eq!(quad.classify(&through, eps), Classification::Spanning);

        let same = Plane::new(Vector3::new(0.0, 0.0, 1.0), 0.0);
        assert_eq!(quad.classify(&same, eps), Classification::CoplanarFront);
        assert_eq!(quad.classify(&same.flipped(), eps), Classification::CoplanarBack);
    }

    #[test]
    fn fragments_keep_attributes() {
        let mut quad = make_quad(0.0);
        quad.set_used(true);
        let fragment = quad.with_vertices(quad.vertices()[..3].to_vec());
        assert_eq!(fragment.len(), 3);
        assert_eq!(fragment.material_id(), 3);
        assert_eq!(fragment.convex_id(), 7);
        assert_eq!(fragment.draw_flags(), 0x10);
        assert!(fragment.is_used());
    }

    #[test]
    fn hull_from_tree_polygon() {
        let quad = make_quad(1.0);
        let hull = HullPolygon::from(&quad);
        assert_eq!(hull.len(), 4);
        assert!(!hull.is_used());
        assert_eq!(hull.vertices()[2], Point3::new(2.0, 2.0, 1.0));
    }

    #[test]
    fn boundary_reversed_flips_normal() {
        let face = BoundaryPolygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let reversed = face.reversed();
        assert_relative_eq!(reversed.normal(), -face.normal());
        assert_relative_eq!(face_normal(reversed.vertices()), reversed.normal());
    }
}
