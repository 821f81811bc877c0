//! Solid/empty collision trees.
//!
//! Built from a closed triangle hull. Planes come from the hull triangles
//! (the same balance heuristic as BSP trees, restricted to splits that leave
//! something on both sides), while a boundary cage tracks the convex cell
//! each node covers. Cells emptied of triangles are solid.

mod bevel;
mod build;
mod cage;
mod node;
mod tree;

pub use bevel::{bevel_planes, edge_bevels, vertex_bevels};
pub use cage::{partition_polygon, split_cage};
pub use node::CollisionNode;
pub use tree::{walk_collision, CollisionTree, CollisionVisitor};
