//! Axis-aligned bounding boxes.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::polygon::{BoundaryPolygon, PlanarPolygon};
use crate::vertex::SplitVertex;

/// Axis-aligned bounding box stored as `(min, max)` corners.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    #[inline]
    pub const fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// A zero-sized box at `point`.
    #[inline]
    pub fn from_point(point: Point3<f32>) -> Self {
        Self::new(point, point)
    }

    /// Tight bounds around a set of points, or `None` when the set is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut points = points.into_iter();
        let mut bounds = Self::from_point(points.next()?);
        for point in points {
            bounds.extend(&point);
        }
        Some(bounds)
    }

    /// Tight bounds around every vertex of every polygon.
    pub fn from_polygons<P: PlanarPolygon>(polygons: &[P]) -> Option<Self> {
        Self::from_points(
            polygons
                .iter()
                .flat_map(|polygon| polygon.vertices().iter().map(SplitVertex::position)),
        )
    }

    /// Grows the box to include `point`.
    pub fn extend(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    #[inline]
    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z). Ties pick the lower index.
    pub fn longest_axis(&self) -> usize {
        let extent = self.extent();
        let mut axis = 0;
        for candidate in 1..3 {
            if extent[candidate] > extent[axis] {
                axis = candidate;
            }
        }
        axis
    }

    /// Returns `true` if `point` lies inside the box, allowing `tolerance` slack.
    pub fn contains(&self, point: &Point3<f32>, tolerance: f32) -> bool {
        (0..3).all(|axis| {
            point[axis] >= self.min[axis] - tolerance && point[axis] <= self.max[axis] + tolerance
        })
    }

    /// The 6 faces of the box as quads with outward facing normals.
    pub fn faces(&self) -> Vec<BoundaryPolygon> {
        let (lo, hi) = (self.min, self.max);
        let corners = [
            Point3::new(lo.x, lo.y, lo.z), // 0: left-bottom-back
            Point3::new(hi.x, lo.y, lo.z), // 1: right-bottom-back
            Point3::new(hi.x, hi.y, lo.z), // 2: right-top-back
            Point3::new(lo.x, hi.y, lo.z), // 3: left-top-back
            Point3::new(lo.x, lo.y, hi.z), // 4: left-bottom-front
            Point3::new(hi.x, lo.y, hi.z), // 5: right-bottom-front
            Point3::new(hi.x, hi.y, hi.z), // 6: right-top-front
            Point3::new(lo.x, hi.y, hi.z), // 7: left-top-front
        ];

        // Counter-clockwise when viewed from outside.
        let faces: [([usize; 4], Vector3<f32>); 6] = [
            ([4, 5, 6, 7], Vector3::z()),
            ([1, 0, 3, 2], -Vector3::z()),
            ([0, 4, 7, 3], -Vector3::x()),
            ([5, 1, 2, 6], Vector3::x()),
            ([7, 6, 2, 3], Vector3::y()),
            ([0, 1, 5, 4], -Vector3::y()),
        ];

        faces
            .iter()
            .map(|(indices, normal)| {
                BoundaryPolygon::with_normal(indices.iter().map(|&i| corners[i]).collect(), *normal)
            })
            .collect()
    }
}
