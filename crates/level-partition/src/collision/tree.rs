//! Collision tree container and serialization walk.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::polygon::HullPolygon;
use crate::tree::{ChildSide, TreeBuilder};
use crate::triangle::CollisionTriangle;

use super::node::CollisionNode;

/// A solid/empty classified tree for collision queries.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionTree {
    root: Option<CollisionNode>,
}

impl CollisionTree {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn from_root(root: Option<CollisionNode>) -> Self {
        Self { root }
    }

    /// Builds a collision tree, see [`TreeBuilder::collision`].
    pub fn build(polygons: &[HullPolygon], bounds: Bounds, config: &BuildConfig) -> Result<Self> {
        TreeBuilder::new(config).collision(polygons, bounds)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[inline]
    pub fn root(&self) -> Option<&CollisionNode> {
        self.root.as_ref()
    }

    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, CollisionNode::node_count)
    }

    pub fn triangle_count(&self) -> usize {
        self.root.as_ref().map_or(0, CollisionNode::triangle_count)
    }

    pub fn solid_leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, CollisionNode::solid_leaf_count)
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, CollisionNode::depth)
    }

    /// Whether `point` lies in solid space. An empty tree has none.
    pub fn is_solid(&self, point: &Point3<f32>) -> bool {
        self.root
            .as_ref()
            .is_some_and(|root| root.contains_solid(point))
    }
}

/// Depth-first serialization walk over a [`CollisionNode`] hierarchy.
///
/// Same order as [`TreeVisitor`](crate::tree::TreeVisitor): node, positive
/// flag, positive subtree, negative flag, negative subtree, leaf triangles.
pub trait CollisionVisitor {
    fn node(&mut self, node: &CollisionNode);

    fn child(&mut self, side: ChildSide, present: bool);

    fn triangles(&mut self, triangles: &[CollisionTriangle]);
}

pub fn walk_collision<V: CollisionVisitor>(node: &CollisionNode, visitor: &mut V) {
    visitor.node(node);

    visitor.child(ChildSide::Positive, node.positive().is_some());
    if let Some(positive) = node.positive() {
        walk_collision(positive, visitor);
    }

    visitor.child(ChildSide::Negative, node.negative().is_some());
    if let Some(negative) = node.negative() {
        walk_collision(negative, visitor);
    }

    visitor.triangles(node.triangles());
}
