//! Boundary cage splitting.
//!
//! The cage is the closed set of outward facing polygons bounding the cell a
//! collision node covers. Splitting a cell by a plane splits its cage and
//! closes both halves with a cap polygon where the plane cuts through the cell.

use std::f32::consts::TAU;

use nalgebra::{Point3, Vector3};

use crate::config::BuildConfig;
use crate::cuttable::Cuttable;
use crate::error::Result;
use crate::plane::Plane;
use crate::polygon::{newell_normal, BoundaryPolygon, PlanarPolygon};

/// The polygon where `plane` cuts through the cell bounded by `cage`.
///
/// Collects every point where a cage edge crosses the plane together with
/// every cage vertex lying on it, merges points closer than the weld
/// tolerance and orders them counter-clockwise around the plane normal. The
/// result faces along the plane normal, i.e. outward for the negative half.
///
/// Returns `None` when fewer than 3 distinct points remain or they enclose
/// no area, meaning the plane misses the cell or only grazes it.
pub fn partition_polygon(
    cage: &[BoundaryPolygon],
    plane: &Plane,
    config: &BuildConfig,
) -> Result<Option<BoundaryPolygon>> {
    let mut points: Vec<Point3<f32>> = Vec::new();

    for face in cage {
        let vertices = face.vertices();
        for (i, start) in vertices.iter().enumerate() {
            let end = &vertices[(i + 1) % vertices.len()];
            let start_distance = plane.signed_distance(start);
            let end_distance = plane.signed_distance(end);

            if start_distance.abs() <= config.epsilon {
                push_unique(&mut points, *start, config.weld_epsilon);
            }

            let crosses = (start_distance > config.epsilon && end_distance < -config.epsilon)
                || (start_distance < -config.epsilon && end_distance > config.epsilon);
            if crosses {
                let (point, _) = plane.edge_intersection(start, end)?;
                push_unique(&mut points, point, config.weld_epsilon);
            }
        }
    }

    if points.len() < 3 {
        return Ok(None);
    }

    let sorted = sort_by_angle(points, &plane.normal());
    let area = newell_normal(&sorted).norm() * 0.5;
    if area <= config.weld_epsilon * config.weld_epsilon {
        return Ok(None);
    }

    Ok(Some(BoundaryPolygon::with_normal(sorted, plane.normal())))
}

fn push_unique(points: &mut Vec<Point3<f32>>, point: Point3<f32>, weld_epsilon: f32) {
    if !points.iter().any(|p| (p - point).norm() <= weld_epsilon) {
        points.push(point);
    }
}

/// Orders coplanar points counter-clockwise around `normal`, starting from the
/// first point.
fn sort_by_angle(points: Vec<Point3<f32>>, normal: &Vector3<f32>) -> Vec<Point3<f32>> {
    let sum: Vector3<f32> = points.iter().map(|p| p.coords).sum();
    let center = Point3::from(sum / points.len() as f32);
    let reference = points[0] - center;

    let mut keyed: Vec<(f32, Point3<f32>)> = points
        .into_iter()
        .map(|point| {
            let offset = point - center;
            let angle = normal
                .dot(&reference.cross(&offset))
                .atan2(reference.dot(&offset));
            (if angle < 0.0 { angle + TAU } else { angle }, point)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, point)| point).collect()
}

/// Splits a cage by `plane` into the cages of its positive and negative halves.
///
/// Faces straddling the plane are cut, faces lying in it are dropped, and
/// each non-empty half is closed with the [`partition_polygon`] cap, wound
/// outward for that half.
pub fn split_cage(
    cage: &[BoundaryPolygon],
    plane: &Plane,
    config: &BuildConfig,
) -> Result<(Vec<BoundaryPolygon>, Vec<BoundaryPolygon>)> {
    let cap = partition_polygon(cage, plane, config)?;

    let mut front = Vec::new();
    let mut back = Vec::new();
    for face in cage {
        if face.classify(plane, config.epsilon).is_coplanar() {
            continue;
        }
        let (front_part, back_part) = face.clone().cut(plane, config.epsilon)?;
        front.extend(front_part);
        back.extend(back_part);
    }

    if let Some(cap) = cap {
        if !front.is_empty() {
            front.push(cap.reversed());
        }
        if !back.is_empty() {
            back.push(cap);
        }
    }

    Ok((front, back))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Bounds;
    use approx::assert_relative_eq;

    fn unit_cage() -> Vec<BoundaryPolygon> {
        Bounds::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)).faces()
    }

    /// Every edge of a closed cage is used once in each direction.
    fn assert_closed(cage: &[BoundaryPolygon]) {
        let edges: Vec<(Point3<f32>, Point3<f32>)> = cage
            .iter()
            .flat_map(|face| {
                let v = face.vertices();
                (0..v.len()).map(move |i| (v[i], v[(i + 1) % v.len()]))
            })
            .collect();
        for (a, b) in &edges {
            let twins = edges
                .iter()
                .filter(|(c, d)| (c - b).norm() < 1e-4 && (d - a).norm() < 1e-4)
                .count();
            assert!(twins >= 1, "open edge {a} -> {b}");
        }
    }

    #[test]
    fn cap_through_cube_center() {
        let config = BuildConfig::default();
        let plane = Plane::new(Vector3::z(), 0.0);
        let cap = partition_polygon(&unit_cage(), &plane, &config)
            .unwrap()
            .unwrap();

        assert_eq!(cap.len(), 4);
        assert_relative_eq!(cap.area(), 4.0, epsilon = 1e-5);
        assert_relative_eq!(newell_normal(cap.vertices()).normalize(), Vector3::z(), epsilon = 1e-5);
        for v in cap.vertices() {
            assert_relative_eq!(v.z, 0.0);
        }
    }

    #[test]
    fn cap_on_face_uses_face_vertices() {
        let config = BuildConfig::default();
        let plane = Plane::new(Vector3::x(), -1.0);
        let cap = partition_polygon(&unit_cage(), &plane, &config)
            .unwrap()
            .unwrap();
        assert_eq!(cap.len(), 4);
        assert_relative_eq!(cap.area(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn diagonal_cap_is_hexagon() {
        let config = BuildConfig::default();
        let plane = Plane::new(Vector3::new(1.0, 1.0, 1.0).normalize(), 0.0);
        let cap = partition_polygon(&unit_cage(), &plane, &config)
            .unwrap()
            .unwrap();
        assert_eq!(cap.len(), 6);
        assert_relative_eq!(
            newell_normal(cap.vertices()).normalize(),
            plane.normal(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn plane_missing_cage_has_no_cap() {
        let config = BuildConfig::default();
        let plane = Plane::new(Vector3::z(), -5.0);
        assert!(partition_polygon(&unit_cage(), &plane, &config).unwrap().is_none());

        // Touching a single corner only.
        let corner = Plane::new(Vector3::new(1.0, 1.0, 1.0).normalize(), -(3.0f32).sqrt());
        assert!(partition_polygon(&unit_cage(), &corner, &config).unwrap().is_none());
    }

    #[test]
    fn split_gives_two_closed_cages() {
        let config = BuildConfig::default();
        let plane = Plane::new(Vector3::new(1.0, 2.0, 0.5).normalize(), 0.3);
        let (front, back) = split_cage(&unit_cage(), &plane, &config).unwrap();

        assert!(!front.is_empty() && !back.is_empty());
        assert_closed(&front);
        assert_closed(&back);

        // Caps face outward from their half.
        let front_cap = front.last().unwrap();
        let back_cap = back.last().unwrap();
        assert_relative_eq!(front_cap.normal(), -plane.normal());
        assert_relative_eq!(back_cap.normal(), plane.normal());
    }

    #[test]
    fn split_on_face_drops_coplanar_face() {
        let config = BuildConfig::default();
        let plane = Plane::new(Vector3::z(), -1.0);
        let (front, back) = split_cage(&unit_cage(), &plane, &config).unwrap();

        assert!(front.is_empty());
        assert_eq!(back.len(), 6);
        assert_closed(&back);
        assert_relative_eq!(back.last().unwrap().normal(), Vector3::z());
    }
}
