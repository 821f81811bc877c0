//! Collision tree construction.
//!
//! Two lists travel down the recursion together: the hull triangles still to
//! be separated, and the boundary cage of the current cell. A cell whose
//! triangles are all gone lies inside the solid and becomes a solid leaf,
//! trimmed by bevel planes.

use tracing::{debug, trace};

use crate::bounds::Bounds;
use crate::config::BuildConfig;
use crate::cuttable::partition_polygons;
use crate::error::Result;
use crate::polygon::{BoundaryPolygon, HullPolygon, PlanarPolygon};
use crate::progress::{ProgressSink, TreeKind};
use crate::tree::{BalancedSelector, PlaneSelector, TreeBuilder};
use crate::triangle::CollisionTriangle;

use super::bevel::bevel_planes;
use super::cage::split_cage;
use super::node::CollisionNode;
use super::tree::CollisionTree;

impl TreeBuilder<'_> {
    /// Builds a collision tree from closed, outward facing hull polygons.
    ///
    /// Every polygon is fan-triangulated first, failing with
    /// [`BuildError::DegeneratePolygon`](crate::BuildError::DegeneratePolygon)
    /// when two of its vertices coincide. The root cell is `bounds`.
    /// Plane replay and the octree depth limit do not apply here.
    pub fn collision(self, polygons: &[HullPolygon], bounds: Bounds) -> Result<CollisionTree> {
        let mut hull = Vec::with_capacity(polygons.len());
        for polygon in polygons {
            hull.extend(HullPolygon::triangulate(
                polygon.vertices(),
                self.config.weld_epsilon,
            )?);
        }

        if hull.is_empty() {
            return Ok(CollisionTree::new());
        }
        debug!(triangles = hull.len(), "building collision tree");

        let mut build = CollisionBuild {
            config: self.config,
            progress: self.progress,
            nodes: 0,
        };
        let root = build.node(hull, bounds.faces(), 0)?;
        let tree = CollisionTree::from_root(root);

        debug!(
            nodes = tree.node_count(),
            triangles = tree.triangle_count(),
            solid_leaves = tree.solid_leaf_count(),
            depth = tree.depth(),
            "finished collision tree"
        );
        Ok(tree)
    }
}

struct CollisionBuild<'a> {
    config: &'a BuildConfig,
    progress: Option<&'a mut dyn ProgressSink>,
    nodes: usize,
}

impl CollisionBuild<'_> {
    fn node(
        &mut self,
        mut hull: Vec<HullPolygon>,
        cage: Vec<BoundaryPolygon>,
        depth: usize,
    ) -> Result<Option<CollisionNode>> {
        if hull.is_empty() {
            if cage.is_empty() {
                return Ok(None);
            }
            return Ok(Some(self.solid(&cage, depth)));
        }

        let selector = BalancedSelector::checked(self.config.epsilon, &cage);
        let split = Bounds::from_polygons(&cage)
            .or_else(|| Bounds::from_polygons(&hull))
            .and_then(|cell| selector.select(&hull, &cell, depth));

        let node = match split {
            None => {
                let triangles = hull.iter().flat_map(|p| CollisionTriangle::fan(p)).collect();
                CollisionNode::leaf(triangles, false)
            }
            Some(split) => {
                if let Some(source) = split.source {
                    hull[source].set_used(true);
                }
                let (front, back) = partition_polygons(&hull, &split.plane, self.config.epsilon)?;
                let (front_cage, back_cage) = split_cage(&cage, &split.plane, self.config)?;

                let positive = self.node(front, front_cage, depth + 1)?;
                let negative = self.node(back, back_cage, depth + 1)?;
                CollisionNode::fork(split.plane, positive, negative)
            }
        };

        self.produced(&node, depth);
        Ok(Some(node))
    }

    /// Solid leaf over the cage, wrapped in one fork per bevel plane with the
    /// positive side left empty.
    fn solid(&mut self, cage: &[BoundaryPolygon], depth: usize) -> CollisionNode {
        let triangles = cage.iter().flat_map(|f| CollisionTriangle::fan(f)).collect();
        let mut node = CollisionNode::leaf(triangles, true);
        self.produced(&node, depth);

        for plane in bevel_planes(cage, self.config) {
            node = CollisionNode::fork(plane, None, Some(node));
            self.produced(&node, depth);
        }
        node
    }

    fn produced(&mut self, node: &CollisionNode, depth: usize) {
        self.nodes += 1;
        trace!(
            depth,
            leaf = node.is_leaf(),
            solid = node.is_solid(),
            triangles = node.triangles().len(),
            "collision node built"
        );
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.node_built(TreeKind::Collision, self.nodes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use nalgebra::{Point3, Vector3};

    fn unit_bounds() -> Bounds {
        Bounds::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }

    fn make_box() -> Vec<HullPolygon> {
        unit_bounds()
            .faces()
            .iter()
            .map(|face| HullPolygon::with_normal(face.vertices().to_vec(), face.normal()))
            .collect()
    }

    /// Triangular prism with a sharp ridge along z at (0, 3), extruded over z in [0, 1].
    fn make_prism() -> Vec<HullPolygon> {
        let a = |z: f32| Point3::new(-1.0, 0.0, z);
        let b = |z: f32| Point3::new(1.0, 0.0, z);
        let c = |z: f32| Point3::new(0.0, 3.0, z);
        vec![
            HullPolygon::new(vec![a(0.0), c(0.0), b(0.0)]),
            HullPolygon::new(vec![a(1.0), b(1.0), c(1.0)]),
            HullPolygon::new(vec![a(0.0), b(0.0), b(1.0), a(1.0)]),
            HullPolygon::new(vec![b(0.0), c(0.0), c(1.0), b(1.0)]),
            HullPolygon::new(vec![c(0.0), a(0.0), a(1.0), c(1.0)]),
        ]
    }

    fn prism_bounds() -> Bounds {
        Bounds::new(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 3.0, 1.0))
    }

    fn solid_triangles<'t>(node: &'t CollisionNode, out: &mut Vec<&'t CollisionTriangle>) {
        if node.is_leaf() && node.is_solid() {
            out.extend(node.triangles());
        }
        for child in node.positive().into_iter().chain(node.negative()) {
            solid_triangles(child, out);
        }
    }

    /// Every directed edge has a reversed twin somewhere in the set.
    fn assert_watertight(triangles: &[&CollisionTriangle]) {
        let edges: Vec<(Point3<f32>, Point3<f32>)> = triangles
            .iter()
            .flat_map(|t| {
                let [a, b, c] = *t.vertices();
                [(a, b), (b, c), (c, a)]
            })
            .collect();
        for (a, b) in &edges {
            let twin = edges
                .iter()
                .any(|(c, d)| (c - b).norm() < 1e-4 && (d - a).norm() < 1e-4);
            assert!(twin, "open edge {a} -> {b}");
        }
    }

    #[test]
    fn empty_input_gives_empty_tree() {
        let config = BuildConfig::default();
        let tree = CollisionTree::build(&[], unit_bounds(), &config).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let config = BuildConfig::default();
        let polygon = HullPolygon::with_normal(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Vector3::z(),
        );
        let err = CollisionTree::build(&[polygon], unit_bounds(), &config).unwrap_err();
        assert!(matches!(
            err,
            BuildError::DegeneratePolygon {
                first: 1,
                second: 2,
                ..
            }
        ));
    }

    #[test]
    fn box_becomes_watertight_solid() {
        let config = BuildConfig::default();
        let tree = CollisionTree::build(&make_box(), unit_bounds(), &config).unwrap();

        assert_eq!(tree.solid_leaf_count(), 1);
        let mut triangles = Vec::new();
        solid_triangles(tree.root().unwrap(), &mut triangles);
        assert_eq!(triangles.len(), 12);
        assert_watertight(&triangles);
    }

    #[test]
    fn box_point_queries() {
        let config = BuildConfig::default();
        let tree = CollisionTree::build(&make_box(), unit_bounds(), &config).unwrap();

        assert!(tree.is_solid(&Point3::origin()));
        assert!(tree.is_solid(&Point3::new(0.9, -0.9, 0.5)));
        assert!(!tree.is_solid(&Point3::new(0.0, 0.0, 5.0)));
        assert!(!tree.is_solid(&Point3::new(-3.0, 0.2, 0.0)));
        assert!(!tree.is_solid(&Point3::new(1.5, 1.5, 1.5)));
    }

    #[test]
    fn prism_is_solid_and_beveled() {
        let config = BuildConfig::default();
        let tree = CollisionTree::build(&make_prism(), prism_bounds(), &config).unwrap();

        assert!(tree.solid_leaf_count() >= 1);
        assert!(tree.is_solid(&Point3::new(0.0, 1.0, 0.5)));
        assert!(!tree.is_solid(&Point3::new(0.0, 3.5, 0.5)));
        assert!(!tree.is_solid(&Point3::new(-0.9, 2.5, 0.5)));

        let mut triangles = Vec::new();
        solid_triangles(tree.root().unwrap(), &mut triangles);
        assert_watertight(&triangles);
    }

    #[test]
    fn progress_counts_collision_nodes() {
        let config = BuildConfig::default();
        let mut last = 0;
        let mut sink = |kind: TreeKind, nodes: usize| {
            assert_eq!(kind, TreeKind::Collision);
            last = nodes;
        };
        let tree = TreeBuilder::new(&config)
            .with_progress(&mut sink)
            .collision(&make_box(), unit_bounds())
            .unwrap();
        assert_eq!(last, tree.node_count());
    }
}
