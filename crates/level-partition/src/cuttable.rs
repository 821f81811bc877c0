//! Polygon cutting/splitting operations shared by all tree builders.

use crate::error::Result;
use crate::plane::{Classification, Plane, PlaneSide};
use crate::polygon::PlanarPolygon;
use crate::vertex::SplitVertex;

/// Trait for geometry that can be cut by a plane.
pub trait Cuttable: Sized {
    /// Cuts the geometry by a plane.
    ///
    /// Returns `(front, back)`. By classification:
    ///
    /// - **Front** / **CoplanarFront**: `(Some(self), None)`
    /// - **Back** / **CoplanarBack**: `(None, Some(self))`
    /// - **Spanning**: `(Some(front_part), Some(back_part))`
    ///
    /// A coplanar polygon is returned with its `used` flag set, since its plane
    /// has now served as a splitter.
    fn cut(self, plane: &Plane, epsilon: f32) -> Result<(Option<Self>, Option<Self>)>;
}

impl<P: PlanarPolygon> Cuttable for P {
    fn cut(mut self, plane: &Plane, epsilon: f32) -> Result<(Option<Self>, Option<Self>)> {
        match self.classify(plane, epsilon) {
            Classification::Front => Ok((Some(self), None)),
            Classification::Back => Ok((None, Some(self))),
            Classification::CoplanarFront => {
                self.set_used(true);
                Ok((Some(self), None))
            }
            Classification::CoplanarBack => {
                self.set_used(true);
                Ok((None, Some(self)))
            }
            Classification::Spanning => {
                let (front, back) = split_polygon(&self, plane, epsilon)?;
                Ok((Some(front), Some(back)))
            }
        }
    }
}

/// Splits a spanning polygon into front and back parts.
///
/// Walks the polygon edges (Sutherland-Hodgman style) and builds two vertex
/// lists. Vertices on the plane go to both lists; an edge whose endpoints lie
/// strictly on opposite sides adds its interpolated crossing vertex to both.
fn split_polygon<P: PlanarPolygon>(polygon: &P, plane: &Plane, epsilon: f32) -> Result<(P, P)> {
    let vertices = polygon.vertices();
    let n = vertices.len();

    let mut front_verts = Vec::with_capacity(n + 1);
    let mut back_verts = Vec::with_capacity(n + 1);

    let sides: Vec<PlaneSide> = vertices
        .iter()
        .map(|v| plane.classify_point_with_epsilon(&v.position(), epsilon))
        .collect();

    for i in 0..n {
        let current = &vertices[i];
        let current_side = sides[i];
        let next_idx = (i + 1) % n;
        let next = &vertices[next_idx];
        let next_side = sides[next_idx];

        match current_side {
            PlaneSide::Front => front_verts.push(current.clone()),
            PlaneSide::Back => back_verts.push(current.clone()),
            PlaneSide::OnPlane => {
                front_verts.push(current.clone());
                back_verts.push(current.clone());
            }
        }

        let crosses = matches!(
            (current_side, next_side),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );

        if crosses {
            let (_, t) = plane.edge_intersection(&current.position(), &next.position())?;
            let crossing = current.interpolate(next, t);
            front_verts.push(crossing.clone());
            back_verts.push(crossing);
        }
    }

    debug_assert!(
        front_verts.len() >= 3 && back_verts.len() >= 3,
        "Split produced a degenerate fragment"
    );

    Ok((
        polygon.with_vertices(front_verts),
        polygon.with_vertices(back_verts),
    ))
}

/// Cuts every polygon in `polygons` by `plane`, collecting front and back parts.
///
/// The input slice is left untouched; fragments are fresh copies.
pub fn partition_polygons<P: PlanarPolygon>(
    polygons: &[P],
    plane: &Plane,
    epsilon: f32,
) -> Result<(Vec<P>, Vec<P>)> {
    let mut front_list = Vec::new();
    let mut back_list = Vec::new();

    for polygon in polygons {
        let (front, back) = polygon.clone().cut(plane, epsilon)?;
        front_list.extend(front);
        back_list.extend(back);
    }

    Ok((front_list, back_list))
}
