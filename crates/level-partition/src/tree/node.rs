//! Octree / BSP tree node.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::plane::Plane;
use crate::polygon::{PlanarPolygon, TreePolygon};

/// A node of an octree or BSP tree.
///
/// A node with a splitting plane is a fork and carries no polygons; its
/// children hold the polygons on the positive and negative side of the
/// plane. A node without a plane is a leaf. Either child may be missing when
/// no polygons ended up on that side.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeNode {
    /// Tight bounds of every polygon in this subtree.
    bounds: Bounds,
    plane: Option<Plane>,
    positive: Option<Box<TreeNode>>,
    negative: Option<Box<TreeNode>>,
    polygons: Vec<TreePolygon>,
}

impl TreeNode {
    /// Creates a leaf holding `polygons`.
    pub fn leaf(bounds: Bounds, polygons: Vec<TreePolygon>) -> Self {
        Self {
            bounds,
            plane: None,
            positive: None,
            negative: None,
            polygons,
        }
    }

    /// Creates a fork over two optional subtrees.
    pub fn fork(
        bounds: Bounds,
        plane: Plane,
        positive: Option<TreeNode>,
        negative: Option<TreeNode>,
    ) -> Self {
        Self {
            bounds,
            plane: Some(plane),
            positive: positive.map(Box::new),
            negative: negative.map(Box::new),
            polygons: Vec::new(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// The splitting plane, `None` for leaves.
    #[inline]
    pub fn plane(&self) -> Option<&Plane> {
        self.plane.as_ref()
    }

    /// Subtree on the positive side of the plane.
    #[inline]
    pub fn positive(&self) -> Option<&TreeNode> {
        self.positive.as_deref()
    }

    /// Subtree on the negative side of the plane.
    #[inline]
    pub fn negative(&self) -> Option<&TreeNode> {
        self.negative.as_deref()
    }

    /// Leaf polygons. Always empty for forks.
    #[inline]
    pub fn polygons(&self) -> &[TreePolygon] {
        &self.polygons
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.plane.is_none()
    }

    fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.positive().into_iter().chain(self.negative())
    }

    /// Number of nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children().map(TreeNode::node_count).sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children().map(TreeNode::leaf_count).sum()
        }
    }

    /// Returns the total number of polygons in this subtree.
    pub fn polygon_count(&self) -> usize {
        self.polygons.len() + self.children().map(TreeNode::polygon_count).sum::<usize>()
    }

    /// Sum of leaf polygon vertex counts.
    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().map(|p| p.len()).sum::<usize>()
            + self.children().map(TreeNode::vertex_count).sum::<usize>()
    }

    /// Triangles produced by fan-triangulating every leaf polygon.
    pub fn triangle_count(&self) -> usize {
        self.polygons
            .iter()
            .map(|p| p.len().saturating_sub(2))
            .sum::<usize>()
            + self.children().map(TreeNode::triangle_count).sum::<usize>()
    }

    /// Index count of the fan triangulation, three per triangle.
    pub fn index_count(&self) -> usize {
        self.triangle_count() * 3
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        1 + self.children().map(TreeNode::depth).max().unwrap_or(0)
    }
}
