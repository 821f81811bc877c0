//! Tunable constants for tree construction.
//!
//! The defaults match the values the runtime engine's content was built with.
//! Changing them changes the produced trees, so files written with different
//! settings will not match up with each other.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Points within this distance of a plane are considered "on" the plane.
pub const PLANE_EPSILON: f32 = 1e-5;

/// An octree node holding this many polygons or fewer becomes a leaf.
pub const MAX_LEAF_POLYGONS: usize = 200;

/// Octree halving stops once the longest remaining extent drops below this size.
pub const MIN_NODE_SIZE: f32 = 1.5;

/// Hard cap on octree depth, regardless of bounding box size.
pub const MAX_OCTREE_DEPTH: usize = 10;

/// Adjacent boundary faces meeting at a sharper angle than this get an edge bevel.
pub const BEVEL_ANGLE_DEGREES: f32 = 110.0;

/// Distance under which two positions are treated as the same vertex.
pub const WELD_EPSILON: f32 = 1e-4;

/// Settings shared by the octree, BSP and collision builders.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BuildConfig {
    /// Plane classification tolerance.
    pub epsilon: f32,
    /// Octree leaf cutoff.
    pub max_leaf_polygons: usize,
    /// Minimum octree node extent used by the depth limit calculation.
    pub min_node_size: f32,
    /// Maximum octree depth.
    pub max_octree_depth: usize,
    /// Dihedral angle above which an edge bevel plane is synthesized.
    pub bevel_angle_degrees: f32,
    /// Vertex matching tolerance for cage edges, cap points and triangulation.
    pub weld_epsilon: f32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            epsilon: PLANE_EPSILON,
            max_leaf_polygons: MAX_LEAF_POLYGONS,
            min_node_size: MIN_NODE_SIZE,
            max_octree_depth: MAX_OCTREE_DEPTH,
            bevel_angle_degrees: BEVEL_ANGLE_DEGREES,
            weld_epsilon: WELD_EPSILON,
        }
    }
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_leaf_polygons(mut self, count: usize) -> Self {
        self.max_leaf_polygons = count;
        self
    }

    /// Sets the octree node size and depth limits.
    pub fn with_octree_limits(mut self, min_node_size: f32, max_depth: usize) -> Self {
        self.min_node_size = min_node_size;
        self.max_octree_depth = max_depth;
        self
    }

    pub fn with_bevel_angle(mut self, degrees: f32) -> Self {
        self.bevel_angle_degrees = degrees;
        self
    }

    pub fn with_weld_epsilon(mut self, epsilon: f32) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    /// Cosine of the bevel angle. Face normal pairs whose dot product falls
    /// below this value form a sharp edge.
    #[inline]
    pub fn bevel_cos(&self) -> f32 {
        self.bevel_angle_degrees.to_radians().cos()
    }
}
