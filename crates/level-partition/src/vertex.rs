//! Vertex types carried through polygon splitting.

use nalgebra::{Point3, Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-vertex access used by the shared splitting code.
///
/// Splitting only needs the position to classify a vertex and a way to build
/// the vertex that sits at parameter `t` along an edge. Any other attributes
/// are carried along by [`interpolate`](SplitVertex::interpolate).
pub trait SplitVertex: Clone {
    fn position(&self) -> Point3<f32>;

    /// Returns the vertex at `t` along the edge `self -> other`.
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl SplitVertex for Point3<f32> {
    #[inline]
    fn position(&self) -> Point3<f32> {
        *self
    }

    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }
}

/// A render vertex: position, normal and two UV channels (diffuse and lightmap).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeVertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub uv1: Vector2<f32>,
    pub uv2: Vector2<f32>,
}

impl TreeVertex {
    pub fn new(
        position: Point3<f32>,
        normal: Vector3<f32>,
        uv1: Vector2<f32>,
        uv2: Vector2<f32>,
    ) -> Self {
        Self {
            position,
            normal,
            uv1,
            uv2,
        }
    }

    /// A vertex with zeroed UV channels.
    pub fn at(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self::new(position, normal, Vector2::zeros(), Vector2::zeros())
    }
}

impl SplitVertex for TreeVertex {
    #[inline]
    fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Linearly interpolates every channel. The normal is not renormalized.
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position + (other.position - self.position) * t,
            normal: self.normal + (other.normal - self.normal) * t,
            uv1: self.uv1 + (other.uv1 - self.uv1) * t,
            uv2: self.uv2 + (other.uv2 - self.uv2) * t,
        }
    }
}
