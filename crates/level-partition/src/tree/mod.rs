//! Octrees and BSP trees over world polygons.
//!
//! Both trees share one recursive builder and differ only in how a node's
//! splitting plane is chosen:
//!
//! - the octree splits the longest axis of the node's bounds at its midpoint
//!   ([`MidpointSelector`]), bounded by [`calc_depth_limit`];
//! - the BSP tree takes planes from the polygons themselves
//!   ([`BalancedSelector`]) until every polygon has served as a splitter.
//!
//! # Example
//!
//! ```ignore
//! use level_partition::tree::{CollectingVisitor, FlattenedTree, TreeBuilder};
//!
//! let tree = TreeBuilder::new(&config).bsp(polygons, bounds)?;
//!
//! // Painter's order for a viewer at `eye`
//! let mut visitor = CollectingVisitor::new();
//! tree.traverse_back_to_front(eye, &mut visitor);
//!
//! // Arrays for a binary writer
//! let flat = FlattenedTree::from_root(tree.root().unwrap());
//! ```

mod build;
mod node;
mod selector;
#[allow(clippy::module_inception)]
mod tree;
mod visitor;

pub use build::TreeBuilder;
pub use node::TreeNode;
pub use selector::{
    calc_depth_limit, BalancedSelector, MidpointSelector, PlaneSelector, Split, SplitCounts,
};
pub use tree::{PolygonTree, SplitPlanes};
pub use visitor::{
    walk_tree, ChildSide, CollectingVisitor, FlatNode, FlatPolygon, FlattenedTree, FnVisitor,
    LeafVisitor, TreeVisitor,
};
