//! Visitors over finished trees.
//!
//! Two kinds of walk are offered:
//!
//! - [`LeafVisitor`] receives leaf polygon groups in draw order, see
//!   [`PolygonTree::traverse_front_to_back`](super::PolygonTree::traverse_front_to_back).
//! - [`TreeVisitor`] receives every node in the depth-first order used by the
//!   binary tree formats: node, positive flag, positive subtree, negative
//!   flag, negative subtree, leaf polygons. Files written independently from
//!   the same tree line up only if this order never changes.

use nalgebra::Vector4;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::plane::Plane;
use crate::polygon::{PlanarPolygon, TreePolygon};
use crate::vertex::TreeVertex;

use super::node::TreeNode;

/// Visitor for processing polygons during draw-order traversal.
pub trait LeafVisitor {
    /// Called once per non-empty leaf with that leaf's polygons.
    fn visit(&mut self, polygons: &[TreePolygon]);
}

/// A simple visitor that collects all visited polygons.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<TreePolygon>,
}

impl CollectingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_polygons(self) -> Vec<TreePolygon> {
        self.collected
    }

    pub fn polygons(&self) -> &[TreePolygon] {
        &self.collected
    }
}

impl LeafVisitor for CollectingVisitor {
    fn visit(&mut self, polygons: &[TreePolygon]) {
        self.collected.extend(polygons.iter().cloned());
    }
}

/// A visitor that calls a closure for each polygon group.
pub struct FnVisitor<F>
where
    F: FnMut(&[TreePolygon]),
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(&[TreePolygon]),
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> LeafVisitor for FnVisitor<F>
where
    F: FnMut(&[TreePolygon]),
{
    fn visit(&mut self, polygons: &[TreePolygon]) {
        (self.func)(polygons);
    }
}

/// Which child of a fork a callback refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSide {
    Positive,
    Negative,
}

/// Depth-first serialization walk over a [`TreeNode`] hierarchy.
pub trait TreeVisitor {
    /// Entering a node, before any of its children.
    fn node(&mut self, node: &TreeNode);

    /// Whether the node just entered has a child on `side`. For the positive
    /// side this comes right after [`node`](Self::node); for the negative
    /// side it comes after the whole positive subtree.
    fn child(&mut self, side: ChildSide, present: bool);

    /// Leaf polygons of the node, after both subtrees. Called for forks too,
    /// with an empty slice.
    fn polygons(&mut self, polygons: &[TreePolygon]);
}

/// Walks `node` and its descendants in serialization order.
pub fn walk_tree<V: TreeVisitor>(node: &TreeNode, visitor: &mut V) {
    visitor.node(node);

    visitor.child(ChildSide::Positive, node.positive().is_some());
    if let Some(positive) = node.positive() {
        walk_tree(positive, visitor);
    }

    visitor.child(ChildSide::Negative, node.negative().is_some());
    if let Some(negative) = node.negative() {
        walk_tree(negative, visitor);
    }

    visitor.polygons(node.polygons());
}

/// Per-node record of a [`FlattenedTree`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlatNode {
    pub bounds: Bounds,
    /// `(nx, ny, nz, d)`, `None` for leaves.
    pub plane: Option<Vector4<f32>>,
    pub has_positive: bool,
    pub has_negative: bool,
    /// Range into [`FlattenedTree::polygons`].
    pub first_polygon: usize,
    pub polygon_count: usize,
}

/// Per-polygon record of a [`FlattenedTree`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlatPolygon {
    pub material_id: u32,
    pub convex_id: u32,
    pub draw_flags: u32,
    /// Range into [`FlattenedTree::vertices`].
    pub first_vertex: usize,
    pub vertex_count: usize,
}

/// A tree flattened into the arrays a binary writer emits.
///
/// Nodes are stored in pre-order. Polygons and vertices follow the order in
/// which [`walk_tree`] reaches them. `indices` holds the fan triangulation of
/// every polygon, as indices into `vertices`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlattenedTree {
    pub nodes: Vec<FlatNode>,
    pub polygons: Vec<FlatPolygon>,
    pub vertices: Vec<TreeVertex>,
    pub indices: Vec<u32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    open: Vec<usize>,
}

impl FlattenedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens a whole tree.
    pub fn from_root(root: &TreeNode) -> Self {
        let mut flat = Self::new();
        walk_tree(root, &mut flat);
        flat
    }
}

impl TreeVisitor for FlattenedTree {
    fn node(&mut self, node: &TreeNode) {
        self.open.push(self.nodes.len());
        self.nodes.push(FlatNode {
            bounds: *node.bounds(),
            plane: node.plane().map(Plane::to_vector4),
            has_positive: node.positive().is_some(),
            has_negative: node.negative().is_some(),
            first_polygon: 0,
            polygon_count: 0,
        });
    }

    fn child(&mut self, _side: ChildSide, _present: bool) {}

    fn polygons(&mut self, polygons: &[TreePolygon]) {
        let Some(index) = self.open.pop() else {
            return;
        };

        let first_polygon = self.polygons.len();
        for polygon in polygons {
            let first_vertex = self.vertices.len();
            let base = first_vertex as u32;
            for i in 1..polygon.len().saturating_sub(1) as u32 {
                self.indices.extend([base, base + i, base + i + 1]);
            }
            self.vertices.extend_from_slice(polygon.vertices());
            self.polygons.push(FlatPolygon {
                material_id: polygon.material_id(),
                convex_id: polygon.convex_id(),
                draw_flags: polygon.draw_flags(),
                first_vertex,
                vertex_count: polygon.len(),
            });
        }

        let record = &mut self.nodes[index];
        record.first_polygon = first_polygon;
        record.polygon_count = polygons.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn make_polygon(z: f32, sides: usize, id: u32) -> TreePolygon {
        let up = Vector3::new(0.0, 0.0, 1.0);
        let vertices = (0..sides)
            .map(|i| {
                let angle = i as f32 / sides as f32 * std::f32::consts::TAU;
                TreeVertex::at(Point3::new(angle.cos(), angle.sin(), z), up)
            })
            .collect();
        TreePolygon::from_vertices(vertices, id, id, 0)
    }

    fn leaf_of(polygons: Vec<TreePolygon>) -> TreeNode {
        let bounds = Bounds::from_polygons(&polygons).unwrap();
        TreeNode::leaf(bounds, polygons)
    }

    fn sample_tree() -> TreeNode {
        let plane = Plane::new(Vector3::new(0.0, 0.0, 1.0), 0.0);
        let bounds = Bounds::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let positive = leaf_of(vec![make_polygon(1.0, 3, 1), make_polygon(0.5, 4, 2)]);
        let negative = leaf_of(vec![make_polygon(-1.0, 5, 3)]);
        TreeNode::fork(bounds, plane, Some(positive), Some(negative))
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TreeVisitor for Recorder {
        fn node(&mut self, node: &TreeNode) {
            self.events
                .push(if node.is_leaf() { "leaf" } else { "fork" }.to_string());
        }

        fn child(&mut self, side: ChildSide, present: bool) {
            self.events.push(format!("{side:?}={present}"));
        }

        fn polygons(&mut self, polygons: &[TreePolygon]) {
            self.events.push(format!("polygons {}", polygons.len()));
        }
    }

    #[test]
    fn collecting_visitor_collects() {
        let mut visitor = CollectingVisitor::new();
        let first = make_polygon(0.0, 3, 1);
        let second = make_polygon(1.0, 3, 2);

        visitor.visit(&[first.clone()]);
        visitor.visit(&[second.clone()]);

        let collected = visitor.into_polygons();
        assert_eq!(collected, vec![first, second]);
    }

    #[test]
    fn fn_visitor_calls_closure() {
        let mut count = 0;
        {
            let mut visitor = FnVisitor::new(|polys: &[TreePolygon]| {
                count += polys.len();
            });
            let poly = make_polygon(0.0, 3, 0);
            visitor.visit(&[poly.clone(), poly]);
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn walk_order_is_serialization_order() {
        let mut recorder = Recorder::default();
        walk_tree(&sample_tree(), &mut recorder);
        assert_eq!(
            recorder.events,
            vec![
                "fork",
                "Positive=true",
                "leaf",
                "Positive=false",
                "Negative=false",
                "polygons 2",
                "Negative=true",
                "leaf",
                "Positive=false",
                "Negative=false",
                "polygons 1",
                "polygons 0",
            ]
        );
    }

    #[test]
    fn flattened_tree_records() {
        let root = sample_tree();
        let flat = FlattenedTree::from_root(&root);

        assert_eq!(flat.nodes.len(), root.node_count());
        assert_eq!(flat.polygons.len(), root.polygon_count());
        assert_eq!(flat.vertices.len(), root.vertex_count());
        assert_eq!(flat.indices.len(), root.index_count());

        let fork = &flat.nodes[0];
        assert_eq!(fork.plane, Some(Vector4::new(0.0, 0.0, 1.0, 0.0)));
        assert!(fork.has_positive && fork.has_negative);
        assert_eq!(fork.polygon_count, 0);

        assert_eq!(flat.nodes[1].first_polygon, 0);
        assert_eq!(flat.nodes[1].polygon_count, 2);
        assert_eq!(flat.nodes[2].first_polygon, 2);
        assert_eq!(flat.nodes[2].polygon_count, 1);

        let ids: Vec<u32> = flat.polygons.iter().map(|p| p.convex_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(flat.polygons[1].first_vertex, 3);
        assert_eq!(flat.polygons[2].first_vertex, 7);

        // Fan of the quad starts at its first vertex.
        assert_eq!(&flat.indices[3..9], &[3, 4, 5, 3, 5, 6]);
        assert!(flat.indices.iter().all(|&i| (i as usize) < flat.vertices.len()));
    }
}
