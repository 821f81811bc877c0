//! Octree / BSP tree container.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::plane::{Plane, PlaneSide};
use crate::polygon::TreePolygon;

use super::build::TreeBuilder;
use super::node::TreeNode;
use super::visitor::LeafVisitor;

/// Pre-order sequence of splitting planes, `None` marking a leaf.
///
/// Recorded from a finished tree with [`PolygonTree::split_planes`] and fed
/// back through [`TreeBuilder::replay`] so a later pass over the same input
/// reproduces the same topology.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitPlanes {
    planes: Vec<Option<Plane>>,
}

impl SplitPlanes {
    pub fn new(planes: Vec<Option<Plane>>) -> Self {
        Self { planes }
    }

    #[inline]
    pub fn as_slice(&self) -> &[Option<Plane>] {
        &self.planes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Option<Plane>> {
        self.planes.iter()
    }
}

impl From<Vec<Option<Plane>>> for SplitPlanes {
    fn from(planes: Vec<Option<Plane>>) -> Self {
        Self::new(planes)
    }
}

/// An octree or BSP tree over world polygons.
///
/// # Construction
///
/// ```ignore
/// use level_partition::{BuildConfig, Bounds, PolygonTree};
///
/// let config = BuildConfig::default();
/// let bounds = Bounds::from_polygons(&polygons).unwrap();
/// let octree = PolygonTree::octree(polygons.clone(), bounds, &config)?;
/// let bsp = PolygonTree::bsp(polygons, bounds, &config)?;
/// ```
///
/// Use [`TreeBuilder`] directly for progress reporting, plane replay or an
/// explicit octree depth limit.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonTree {
    root: Option<TreeNode>,
}

impl PolygonTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn from_root(root: Option<TreeNode>) -> Self {
        Self { root }
    }

    /// Builds an octree with the depth limit derived from `bounds`.
    pub fn octree(polygons: Vec<TreePolygon>, bounds: Bounds, config: &BuildConfig) -> Result<Self> {
        TreeBuilder::new(config).octree(polygons, bounds)
    }

    /// Builds a BSP tree.
    pub fn bsp(polygons: Vec<TreePolygon>, bounds: Bounds, config: &BuildConfig) -> Result<Self> {
        TreeBuilder::new(config).bsp(polygons, bounds)
    }

    /// Returns `true` if the tree contains no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[inline]
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::node_count)
    }

    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::leaf_count)
    }

    pub fn polygon_count(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::polygon_count)
    }

    pub fn vertex_count(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::vertex_count)
    }

    pub fn triangle_count(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::triangle_count)
    }

    pub fn index_count(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::index_count)
    }

    /// Returns the maximum depth of the tree (0 for empty tree).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::depth)
    }

    /// Records the splitting planes in pre-order: node, positive subtree,
    /// negative subtree.
    pub fn split_planes(&self) -> SplitPlanes {
        let mut planes = Vec::with_capacity(self.node_count());
        if let Some(root) = &self.root {
            record_planes(root, &mut planes);
        }
        SplitPlanes::new(planes)
    }

    /// Traverses the leaves front-to-back relative to the given viewpoint.
    ///
    /// At each fork the subtree on the eye's side is visited first; an eye
    /// on the plane counts as positive.
    pub fn traverse_front_to_back<V: LeafVisitor>(&self, eye: Point3<f32>, visitor: &mut V) {
        if let Some(root) = &self.root {
            traverse_node(root, &eye, true, visitor);
        }
    }

    /// Traverses the leaves back-to-front relative to the given viewpoint,
    /// the painter's algorithm order.
    pub fn traverse_back_to_front<V: LeafVisitor>(&self, eye: Point3<f32>, visitor: &mut V) {
        if let Some(root) = &self.root {
            traverse_node(root, &eye, false, visitor);
        }
    }

    /// Collects all leaf polygons in depth-first order.
    pub fn collect_polygons(&self) -> Vec<TreePolygon> {
        let mut result = Vec::with_capacity(self.polygon_count());
        collect_polygons_recursive(self.root.as_ref(), &mut result);
        result
    }
}

fn record_planes(node: &TreeNode, planes: &mut Vec<Option<Plane>>) {
    planes.push(node.plane().copied());
    if let Some(positive) = node.positive() {
        record_planes(positive, planes);
    }
    if let Some(negative) = node.negative() {
        record_planes(negative, planes);
    }
}

fn traverse_node<V: LeafVisitor>(
    node: &TreeNode,
    eye: &Point3<f32>,
    near_first: bool,
    visitor: &mut V,
) {
    let Some(plane) = node.plane() else {
        if !node.polygons().is_empty() {
            visitor.visit(node.polygons());
        }
        return;
    };

    let eye_positive = !matches!(plane.classify_point(eye), PlaneSide::Back);
    let (first, second) = if eye_positive == near_first {
        (node.positive(), node.negative())
    } else {
        (node.negative(), node.positive())
    };

    if let Some(first) = first {
        traverse_node(first, eye, near_first, visitor);
    }
    if let Some(second) = second {
        traverse_node(second, eye, near_first, visitor);
    }
}

fn collect_polygons_recursive(node: Option<&TreeNode>, result: &mut Vec<TreePolygon>) {
    if let Some(n) = node {
        result.extend(n.polygons().iter().cloned());
        collect_polygons_recursive(n.positive(), result);
        collect_polygons_recursive(n.negative(), result);
    }
}
