//! Progress reporting during tree construction.
//!
//! Reporting is best effort: sinks are told how many nodes a build has produced
//! so far, nothing more, and have no influence on the result.

/// Which builder is reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    Octree,
    Bsp,
    Collision,
}

impl TreeKind {
    pub fn name(self) -> &'static str {
        match self {
            TreeKind::Octree => "octree",
            TreeKind::Bsp => "bsp",
            TreeKind::Collision => "collision",
        }
    }
}

/// Receives a callback after each tree node is produced.
pub trait ProgressSink {
    fn node_built(&mut self, kind: TreeKind, nodes_so_far: usize);
}

/// Discards all progress events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    #[inline]
    fn node_built(&mut self, _kind: TreeKind, _nodes_so_far: usize) {}
}

impl<F> ProgressSink for F
where
    F: FnMut(TreeKind, usize),
{
    fn node_built(&mut self, kind: TreeKind, nodes_so_far: usize) {
        (self)(kind, nodes_so_far)
    }
}
