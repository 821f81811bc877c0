//! Errors raised while building trees.
//!
//! Both variants mean the input geometry is malformed. Nothing is retried. The
//! caller has to clean the geometry (remove zero-length edges and collapsed
//! vertices) and build again.

use nalgebra::Point3;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// An edge classified as crossing a plane has its intersection parameter
    /// outside `[0, 1]`. This points at precision loss upstream.
    #[error("degenerate edge intersection: t={t} for edge {start} -> {end}")]
    DegenerateEdgeIntersection {
        t: f32,
        start: Point3<f32>,
        end: Point3<f32>,
    },
    /// Two vertices of a polygon coincide, so it cannot be fan-triangulated.
    #[error("degenerate polygon: vertices {first} and {second} coincide at {position}")]
    DegeneratePolygon {
        first: usize,
        second: usize,
        position: Point3<f32>,
    },
}

pub type Result<T> = std::result::Result<T, BuildError>;
