//! Bevel planes for solid collision cells.
//!
//! A point query against a tree of face planes can wrongly report solid space
//! just outside a sharp edge or corner, where the face planes extend far past
//! the actual surface. Bevel planes clip those regions off.

use nalgebra::{Point3, Vector3};
use tracing::warn;

use crate::config::BuildConfig;
use crate::plane::Plane;
use crate::polygon::{BoundaryPolygon, PlanarPolygon};

/// Bevel planes for the cell bounded by `cage`, edge bevels first.
pub fn bevel_planes(cage: &[BoundaryPolygon], config: &BuildConfig) -> Vec<Plane> {
    let mut planes = edge_bevels(cage, config);
    planes.extend(vertex_bevels(cage, config));
    planes
}

/// One plane per edge shared by two faces meeting at a dihedral sharper than
/// the bevel angle, through the edge and halfway between the face normals.
pub fn edge_bevels(cage: &[BoundaryPolygon], config: &BuildConfig) -> Vec<Plane> {
    let cos_limit = config.bevel_cos();
    let mut planes = Vec::new();

    for (i, first) in cage.iter().enumerate() {
        for second in &cage[i + 1..] {
            if first.normal().dot(&second.normal()) >= cos_limit {
                continue;
            }
            let Some(edge_point) = shared_edge(first, second, config.weld_epsilon) else {
                continue;
            };

            match (first.normal() + second.normal()).try_normalize(f32::EPSILON) {
                Some(normal) => planes.push(Plane::from_point_and_normal(edge_point, normal)),
                None => warn!(
                    point = %edge_point,
                    "skipping edge bevel between opposing faces"
                ),
            }
        }
    }

    planes
}

/// First vertex of an edge `a -> b` of `first` that `second` also has, in
/// either direction.
fn shared_edge(
    first: &BoundaryPolygon,
    second: &BoundaryPolygon,
    weld_epsilon: f32,
) -> Option<Point3<f32>> {
    let near = |p: &Point3<f32>, q: &Point3<f32>| (p - q).norm() <= weld_epsilon;
    let theirs = edges(second.vertices()).collect::<Vec<_>>();

    edges(first.vertices())
        .find(|(a, b)| {
            theirs
                .iter()
                .any(|(c, d)| (near(a, d) && near(b, c)) || (near(a, c) && near(b, d)))
        })
        .map(|(a, _)| *a)
}

fn edges(vertices: &[Point3<f32>]) -> impl Iterator<Item = (&Point3<f32>, &Point3<f32>)> {
    let n = vertices.len();
    (0..n).map(move |i| (&vertices[i], &vertices[(i + 1) % n]))
}

/// One plane per cage vertex whose surrounding faces include a pair with
/// opposing normals, along the corner-angle weighted normal average.
pub fn vertex_bevels(cage: &[BoundaryPolygon], config: &BuildConfig) -> Vec<Plane> {
    let mut corners: Vec<Point3<f32>> = Vec::new();
    for face in cage {
        for vertex in face.vertices() {
            if !corners.iter().any(|c| (c - vertex).norm() <= config.weld_epsilon) {
                corners.push(*vertex);
            }
        }
    }

    let mut planes = Vec::new();
    for corner in corners {
        let mut normals: Vec<Vector3<f32>> = Vec::new();
        let mut weighted = Vector3::zeros();

        for face in cage {
            let Some(angle) = corner_angle(face.vertices(), &corner, config.weld_epsilon) else {
                continue;
            };
            normals.push(face.normal());
            weighted += face.normal() * angle;
        }

        let convex = normals
            .iter()
            .enumerate()
            .all(|(i, a)| normals[i + 1..].iter().all(|b| a.dot(b) >= 0.0));
        if convex {
            continue;
        }

        match weighted.try_normalize(f32::EPSILON) {
            Some(normal) => planes.push(Plane::from_point_and_normal(corner, normal)),
            None => warn!(point = %corner, "skipping degenerate vertex bevel"),
        }
    }

    planes
}

/// Interior angle of the polygon at `corner`, if `corner` is one of its vertices.
fn corner_angle(vertices: &[Point3<f32>], corner: &Point3<f32>, weld_epsilon: f32) -> Option<f32> {
    let n = vertices.len();
    let index = vertices
        .iter()
        .position(|v| (v - corner).norm() <= weld_epsilon)?;

    let previous = (vertices[(index + n - 1) % n] - vertices[index]).try_normalize(f32::EPSILON)?;
    let next = (vertices[(index + 1) % n] - vertices[index]).try_normalize(f32::EPSILON)?;
    Some(previous.dot(&next).clamp(-1.0, 1.0).acos())
}
