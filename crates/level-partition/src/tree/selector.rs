//! Plane selection strategies for tree construction.
//!
//! The octree splits along the longest bounding box axis; BSP and collision
//! trees pick among the polygons' own planes with a balance heuristic.

use nalgebra::Vector3;

use crate::bounds::Bounds;
use crate::config::BuildConfig;
use crate::plane::{Classification, Plane};
use crate::polygon::{BoundaryPolygon, PlanarPolygon};

/// A chosen splitting plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub plane: Plane,
    /// Index of the polygon the plane was taken from, if any. The builder marks
    /// that polygon as used.
    pub source: Option<usize>,
}

/// Strategy for choosing the splitting plane of a node.
///
/// Returning `None` ends the recursion and the node becomes a leaf.
/// Implementations must not mutate anything; marking the winner is left to
/// the builder.
pub trait PlaneSelector {
    fn select<P: PlanarPolygon>(&self, polygons: &[P], bounds: &Bounds, depth: usize)
    -> Option<Split>;
}

/// How a candidate plane would distribute the other polygons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCounts {
    pub front: usize,
    pub back: usize,
    pub spanning: usize,
    pub coplanar_front: usize,
    pub coplanar_back: usize,
}

impl SplitCounts {
    pub fn tally(&mut self, classification: Classification) {
        match classification {
            Classification::Front => self.front += 1,
            Classification::Back => self.back += 1,
            Classification::Spanning => self.spanning += 1,
            Classification::CoplanarFront => self.coplanar_front += 1,
            Classification::CoplanarBack => self.coplanar_back += 1,
        }
    }

    /// Lower is better: balance first, then few cuts, then few coplanar ties.
    pub fn cost(&self) -> f32 {
        (self.front as f32 - self.back as f32).abs()
            + self.spanning as f32 / 2.0
            + (self.coplanar_front + self.coplanar_back) as f32 / 10.0
    }
}

/// Picks the unused polygon plane with the lowest [`SplitCounts::cost`].
///
/// Ties keep the earliest candidate. In checked mode a candidate is rejected
/// when either side of the split would end up empty. The sides hold the
/// candidate itself (always in front), the other polygons, and the faces of
/// the boundary cage passed to [`checked`](Self::checked). Cage faces
/// coplanar with the candidate are not counted, since cage partitioning
/// discards them.
#[derive(Debug, Clone, Copy)]
pub struct BalancedSelector<'a> {
    epsilon: f32,
    check_counts: bool,
    cage: &'a [BoundaryPolygon],
}

impl BalancedSelector<'static> {
    /// Unchecked selection, as used for BSP trees.
    pub fn new(epsilon: f32) -> Self {
        Self {
            epsilon,
            check_counts: false,
            cage: &[],
        }
    }
}

impl<'a> BalancedSelector<'a> {
    /// Checked selection against the current boundary cage, as used for collision trees.
    pub fn checked(epsilon: f32, cage: &'a [BoundaryPolygon]) -> Self {
        Self {
            epsilon,
            check_counts: true,
            cage,
        }
    }

    fn separates(&self, plane: &Plane, counts: &SplitCounts) -> bool {
        let mut front_side = 1 + counts.front + counts.spanning + counts.coplanar_front;
        let mut back_side = counts.back + counts.spanning + counts.coplanar_back;

        for face in self.cage {
            match face.classify(plane, self.epsilon) {
                Classification::Front => front_side += 1,
                Classification::Back => back_side += 1,
                Classification::Spanning => {
                    front_side += 1;
                    back_side += 1;
                }
                Classification::CoplanarFront | Classification::CoplanarBack => {}
            }
        }

        front_side > 0 && back_side > 0
    }
}

impl PlaneSelector for BalancedSelector<'_> {
    fn select<P: PlanarPolygon>(
        &self,
        polygons: &[P],
        _bounds: &Bounds,
        _depth: usize,
    ) -> Option<Split> {
        let mut best: Option<(f32, Split)> = None;

        for (index, candidate) in polygons.iter().enumerate() {
            if candidate.is_used() || candidate.normal().norm() <= f32::EPSILON {
                continue;
            }

            let plane = candidate.plane();
            let mut counts = SplitCounts::default();
            for (other_index, other) in polygons.iter().enumerate() {
                if other_index != index {
                    counts.tally(other.classify(&plane, self.epsilon));
                }
            }

            if self.check_counts && !self.separates(&plane, &counts) {
                continue;
            }

            let cost = counts.cost();
            if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
                best = Some((
                    cost,
                    Split {
                        plane,
                        source: Some(index),
                    },
                ));
            }
        }

        best.map(|(_, split)| split)
    }
}

/// Octree split: halves the longest bounding box axis at its midpoint.
///
/// The plane normal is the negative axis, so the positive side is the lower
/// half. Stops at `depth_limit` or once a node holds `max_leaf_polygons` or fewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidpointSelector {
    pub depth_limit: usize,
    pub max_leaf_polygons: usize,
}

impl PlaneSelector for MidpointSelector {
    fn select<P: PlanarPolygon>(
        &self,
        polygons: &[P],
        bounds: &Bounds,
        depth: usize,
    ) -> Option<Split> {
        if depth >= self.depth_limit || polygons.len() <= self.max_leaf_polygons {
            return None;
        }

        let mut normal = Vector3::zeros();
        normal[bounds.longest_axis()] = -1.0;

        Some(Split {
            plane: Plane::from_point_and_normal(bounds.center(), normal),
            source: None,
        })
    }
}

/// Octree depth limit for a root bounding box.
///
/// Repeatedly halves the longest remaining extent until it is smaller than
/// `min_node_size`, capped at `max_octree_depth` halvings.
pub fn calc_depth_limit(bounds: &Bounds, config: &BuildConfig) -> usize {
    let mut extent = bounds.extent();
    let mut depth = 0;

    while depth < config.max_octree_depth {
        let axis = extent.imax();
        if extent[axis] < config.min_node_size {
            break;
        }
        extent[axis] *= 0.5;
        depth += 1;
    }

    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLANE_EPSILON;
    use crate::polygon::HullPolygon;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn make_triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> HullPolygon {
        HullPolygon::new(vec![
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], b[1], b[2]),
            Point3::new(c[0], c[1], c[2]),
        ])
    }

    /// Triangle facing +x at the given x.
    fn wall(x: f32) -> HullPolygon {
        make_triangle([x, 0.0, 0.0], [x, 1.0, 0.0], [x, 0.0, 1.0])
    }

    fn unit_bounds() -> Bounds {
        Bounds::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn cost_formula() {
        let counts = SplitCounts {
            front: 5,
            back: 2,
            spanning: 3,
            coplanar_front: 1,
            coplanar_back: 1,
        };
        assert_relative_eq!(counts.cost(), 3.0 + 1.5 + 0.2);
    }

    #[test]
    fn balanced_picks_middle_wall() {
        let polygons = vec![wall(0.0), wall(1.0), wall(2.0), wall(3.0), wall(4.0)];
        let split = BalancedSelector::new(PLANE_EPSILON)
            .select(&polygons, &unit_bounds(), 0)
            .unwrap();
        assert_eq!(split.source, Some(2));
        assert_relative_eq!(split.plane.normal(), Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(split.plane.d(), -2.0);
    }

    #[test]
    fn ties_keep_first_candidate() {
        let polygons = vec![wall(0.0), wall(1.0)];
        let split = BalancedSelector::new(PLANE_EPSILON)
            .select(&polygons, &unit_bounds(), 0)
            .unwrap();
        assert_eq!(split.source, Some(0));
    }

    #[test]
    fn used_polygons_are_skipped() {
        let mut polygons = vec![wall(0.0), wall(1.0), wall(2.0)];
        polygons[1].set_used(true);
        let split = BalancedSelector::new(PLANE_EPSILON)
            .select(&polygons, &unit_bounds(), 0)
            .unwrap();
        assert_ne!(split.source, Some(1));

        for polygon in &mut polygons {
            polygon.set_used(true);
        }
        assert!(
            BalancedSelector::new(PLANE_EPSILON)
                .select(&polygons, &unit_bounds(), 0)
                .is_none()
        );
    }

    #[test]
    fn selection_does_not_mark_winner() {
        let polygons = vec![wall(0.0), wall(1.0), wall(2.0)];
        BalancedSelector::new(PLANE_EPSILON).select(&polygons, &unit_bounds(), 0);
        assert!(polygons.iter().all(|p| !p.is_used()));
    }

    #[test]
    fn checked_rejects_empty_back_side() {
        // Two coplanar triangles and no cage: nothing lands behind the plane.
        let polygons = vec![
            make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            make_triangle([1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let bounds = unit_bounds();
        assert!(
            BalancedSelector::checked(PLANE_EPSILON, &[])
                .select(&polygons, &bounds, 0)
                .is_none()
        );
        assert!(
            BalancedSelector::new(PLANE_EPSILON)
                .select(&polygons, &bounds, 0)
                .is_some()
        );

        // A cage extending below z = 0 gives the back side something to hold.
        let cage = Bounds::new(Point3::new(0.0, 0.0, -1.0), Point3::new(1.0, 1.0, 0.0)).faces();
        let split = BalancedSelector::checked(PLANE_EPSILON, &cage)
            .select(&polygons, &bounds, 0)
            .unwrap();
        assert_eq!(split.source, Some(0));
    }

    #[test]
    fn midpoint_splits_longest_axis() {
        let selector = MidpointSelector {
            depth_limit: 4,
            max_leaf_polygons: 1,
        };
        let bounds = Bounds::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 8.0, 4.0));
        let polygons = vec![wall(0.0), wall(1.0)];

        let split = selector.select(&polygons, &bounds, 0).unwrap();
        assert_eq!(split.source, None);
        assert_relative_eq!(split.plane.normal(), Vector3::new(0.0, -1.0, 0.0));
        // Lower half is the positive side.
        assert!(split.plane.signed_distance(&Point3::new(1.0, 1.0, 1.0)) > 0.0);
        assert_relative_eq!(split.plane.signed_distance(&Point3::new(0.0, 4.0, 0.0)), 0.0);
    }

    #[test]
    fn midpoint_respects_limits() {
        let bounds = unit_bounds();
        let polygons = vec![wall(0.0), wall(1.0)];

        let shallow = MidpointSelector {
            depth_limit: 0,
            max_leaf_polygons: 0,
        };
        assert!(shallow.select(&polygons, &bounds, 0).is_none());

        let roomy = MidpointSelector {
            depth_limit: 5,
            max_leaf_polygons: 2,
        };
        assert!(roomy.select(&polygons, &bounds, 0).is_none());
    }

    #[test]
    fn depth_limit_is_capped() {
        let config = BuildConfig::default();
        let huge = Bounds::new(Point3::new(-1e4, -1e4, -1e4), Point3::new(1e4, 1e4, 1e4));
        assert_eq!(calc_depth_limit(&huge, &config), 10);

        let tiny = Bounds::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(calc_depth_limit(&tiny, &config), 0);

        let cube = Bounds::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(calc_depth_limit(&cube, &config), 3);
    }

    #[test]
    fn depth_limit_is_monotonic() {
        let config = BuildConfig::default();
        let mut previous = 0;
        for step in 1..400 {
            let size = step as f32 * 0.25;
            let bounds = Bounds::new(Point3::new(0.0, 0.0, 0.0), Point3::new(size, 2.0, 1.0));
            let limit = calc_depth_limit(&bounds, &config);
            assert!(limit <= 10);
            assert!(limit >= previous, "size {size}: {limit} < {previous}");
            previous = limit;
        }
    }
}
