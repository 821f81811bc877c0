//! Collision tree node.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::plane::Plane;
use crate::triangle::CollisionTriangle;

/// A node of a collision tree.
///
/// Forks carry a plane whose positive side is empty space. Leaves carry no
/// plane and are either solid (an enclosed cell, its cage triangles kept
/// for reference) or open (triangles that could not be separated any further).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionNode {
    plane: Option<Plane>,
    solid: bool,
    positive: Option<Box<CollisionNode>>,
    negative: Option<Box<CollisionNode>>,
    triangles: Vec<CollisionTriangle>,
}

impl CollisionNode {
    pub fn leaf(triangles: Vec<CollisionTriangle>, solid: bool) -> Self {
        Self {
            plane: None,
            solid,
            positive: None,
            negative: None,
            triangles,
        }
    }

    /// Forks are never solid and hold no triangles.
    pub fn fork(
        plane: Plane,
        positive: Option<CollisionNode>,
        negative: Option<CollisionNode>,
    ) -> Self {
        Self {
            plane: Some(plane),
            solid: false,
            positive: positive.map(Box::new),
            negative: negative.map(Box::new),
            triangles: Vec::new(),
        }
    }

    #[inline]
    pub fn plane(&self) -> Option<&Plane> {
        self.plane.as_ref()
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.solid
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.plane.is_none()
    }

    #[inline]
    pub fn positive(&self) -> Option<&CollisionNode> {
        self.positive.as_deref()
    }

    #[inline]
    pub fn negative(&self) -> Option<&CollisionNode> {
        self.negative.as_deref()
    }

    #[inline]
    pub fn triangles(&self) -> &[CollisionTriangle] {
        &self.triangles
    }

    fn children(&self) -> impl Iterator<Item = &CollisionNode> {
        self.positive().into_iter().chain(self.negative())
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().map(CollisionNode::node_count).sum::<usize>()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() + self.children().map(CollisionNode::triangle_count).sum::<usize>()
    }

    pub fn solid_leaf_count(&self) -> usize {
        usize::from(self.is_leaf() && self.solid)
            + self.children().map(CollisionNode::solid_leaf_count).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self.children().map(CollisionNode::depth).max().unwrap_or(0)
    }

    /// Whether `point` ends up in a solid leaf. Points exactly on a plane go
    /// to the negative side; a missing child is empty space.
    pub fn contains_solid(&self, point: &Point3<f32>) -> bool {
        let mut node = self;
        loop {
            let Some(plane) = node.plane() else {
                return node.solid;
            };
            let next = if plane.signed_distance(point) > 0.0 {
                node.positive()
            } else {
                node.negative()
            };
            match next {
                Some(child) => node = child,
                None => return false,
            }
        }
    }
}
