//! Recursive construction of octrees and BSP trees.

use std::slice;

use tracing::{debug, trace, warn};

use crate::bounds::Bounds;
use crate::config::BuildConfig;
use crate::cuttable::partition_polygons;
use crate::error::Result;
use crate::plane::Plane;
use crate::polygon::{PlanarPolygon, TreePolygon};
use crate::progress::{ProgressSink, TreeKind};

use super::node::TreeNode;
use super::selector::{calc_depth_limit, BalancedSelector, MidpointSelector, PlaneSelector};
use super::tree::{PolygonTree, SplitPlanes};

/// Configures and runs a single tree build.
///
/// ```ignore
/// let planes = first_pass.split_planes();
/// let tree = TreeBuilder::new(&config)
///     .with_progress(&mut |kind, nodes| println!("{} {nodes}", kind.name()))
///     .replay(&planes)
///     .bsp(polygons, bounds)?;
/// ```
pub struct TreeBuilder<'a> {
    pub(crate) config: &'a BuildConfig,
    pub(crate) progress: Option<&'a mut dyn ProgressSink>,
    replay: Option<&'a SplitPlanes>,
    depth_limit: Option<usize>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self {
            config,
            progress: None,
            replay: None,
            depth_limit: None,
        }
    }

    /// Reports every produced node to `sink`.
    pub fn with_progress(mut self, sink: &'a mut dyn ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Reuses planes recorded by [`PolygonTree::split_planes`] instead of
    /// selecting new ones. Once the sequence runs out, selection resumes.
    pub fn replay(mut self, planes: &'a SplitPlanes) -> Self {
        self.replay = Some(planes);
        self
    }

    /// Overrides the octree depth limit otherwise derived from the root bounds.
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = Some(depth_limit);
        self
    }

    /// Builds an axis-aligned octree.
    ///
    /// Nodes split at the midpoint of their longest axis until they reach the
    /// depth limit or hold at most `max_leaf_polygons` polygons.
    pub fn octree(self, polygons: Vec<TreePolygon>, bounds: Bounds) -> Result<PolygonTree> {
        let depth_limit = self
            .depth_limit
            .unwrap_or_else(|| calc_depth_limit(&bounds, self.config));
        let selector = MidpointSelector {
            depth_limit,
            max_leaf_polygons: self.config.max_leaf_polygons,
        };
        debug!(depth_limit, polygons = polygons.len(), "building octree");
        self.run(TreeKind::Octree, selector, polygons, bounds)
    }

    /// Builds a BSP tree whose planes come from the polygons themselves.
    ///
    /// Recursion ends at nodes where every polygon has already served as a
    /// splitter.
    pub fn bsp(self, polygons: Vec<TreePolygon>, bounds: Bounds) -> Result<PolygonTree> {
        let selector = BalancedSelector::new(self.config.epsilon);
        debug!(polygons = polygons.len(), "building bsp tree");
        self.run(TreeKind::Bsp, selector, polygons, bounds)
    }

    fn run<S: PlaneSelector>(
        self,
        kind: TreeKind,
        selector: S,
        polygons: Vec<TreePolygon>,
        bounds: Bounds,
    ) -> Result<PolygonTree> {
        if polygons.is_empty() {
            return Ok(PolygonTree::new());
        }

        let mut build = NodeBuild {
            kind,
            selector,
            epsilon: self.config.epsilon,
            replay: self.replay.map(SplitPlanes::iter),
            progress: self.progress,
            nodes: 0,
        };
        let root = build.node(polygons, bounds, 0)?;
        let tree = PolygonTree::from_root(Some(root));

        debug!(
            kind = kind.name(),
            nodes = tree.node_count(),
            leaves = tree.leaf_count(),
            polygons = tree.polygon_count(),
            vertices = tree.vertex_count(),
            depth = tree.depth(),
            "finished tree"
        );
        Ok(tree)
    }
}

/// State threaded through one recursive build.
struct NodeBuild<'a, S> {
    kind: TreeKind,
    selector: S,
    epsilon: f32,
    replay: Option<slice::Iter<'a, Option<Plane>>>,
    progress: Option<&'a mut dyn ProgressSink>,
    nodes: usize,
}

impl<S: PlaneSelector> NodeBuild<'_, S> {
    fn node(
        &mut self,
        mut polygons: Vec<TreePolygon>,
        bounds: Bounds,
        depth: usize,
    ) -> Result<TreeNode> {
        let node = match self.next_plane(&mut polygons, &bounds, depth) {
            None => TreeNode::leaf(bounds, polygons),
            Some(plane) => {
                let (front, back) = partition_polygons(&polygons, &plane, self.epsilon)?;
                let positive = self.child(front, depth + 1)?;
                let negative = self.child(back, depth + 1)?;
                TreeNode::fork(bounds, plane, positive, negative)
            }
        };

        self.nodes += 1;
        trace!(
            depth,
            leaf = node.is_leaf(),
            polygons = node.polygons().len(),
            "node built"
        );
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.node_built(self.kind, self.nodes);
        }

        Ok(node)
    }

    /// Builds a child from one side of a split; an empty side has no node.
    fn child(&mut self, polygons: Vec<TreePolygon>, depth: usize) -> Result<Option<TreeNode>> {
        match Bounds::from_polygons(&polygons) {
            Some(bounds) => Ok(Some(self.node(polygons, bounds, depth)?)),
            None => Ok(None),
        }
    }

    fn next_plane(
        &mut self,
        polygons: &mut [TreePolygon],
        bounds: &Bounds,
        depth: usize,
    ) -> Option<Plane> {
        if let Some(replay) = self.replay.as_mut() {
            match replay.next() {
                Some(planned) => return *planned,
                None => {
                    warn!(
                        kind = self.kind.name(),
                        nodes = self.nodes,
                        "replayed split planes exhausted, selecting new planes"
                    );
                    self.replay = None;
                }
            }
        }

        let split = self.selector.select(polygons, bounds, depth)?;
        if let Some(source) = split.source {
            polygons[source].set_used(true);
        }
        Some(split.plane)
    }
}
