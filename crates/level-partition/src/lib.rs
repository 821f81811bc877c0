//! Spatial partition trees for level geometry export.
//!
//! Three trees are built from world polygons:
//!
//! - [`tree`]: axis-aligned octrees for culling and BSP trees for draw order,
//!   both holding [`TreePolygon`]s at their leaves;
//! - [`collision`]: solid/empty trees over a closed triangle hull, with bevel
//!   planes at sharp edges and corners.
//!
//! All builders are single pass and return read-only trees. Malformed input
//! geometry surfaces as a [`BuildError`].

pub mod bounds;
pub mod collision;
pub mod config;
pub mod cuttable;
pub mod error;
pub mod plane;
pub mod polygon;
pub mod progress;
pub mod tree;
pub mod triangle;
pub mod vertex;

pub use bounds::Bounds;
pub use collision::{CollisionNode, CollisionTree, CollisionVisitor};
pub use config::{
    BuildConfig, BEVEL_ANGLE_DEGREES, MAX_LEAF_POLYGONS, MAX_OCTREE_DEPTH, MIN_NODE_SIZE,
    PLANE_EPSILON, WELD_EPSILON,
};
pub use cuttable::{partition_polygons, Cuttable};
pub use error::{BuildError, Result};
pub use plane::{Classification, Plane, PlaneSide};
pub use polygon::{BoundaryPolygon, HullPolygon, PlanarPolygon, TreePolygon};
pub use progress::{NoProgress, ProgressSink, TreeKind};
pub use tree::{PolygonTree, SplitPlanes, TreeBuilder, TreeNode};
pub use triangle::CollisionTriangle;
pub use vertex::{SplitVertex, TreeVertex};
