/// Quadrant ordering: decides which cell of a cube appears first and is
/// removed last.
///
/// Each cube sorts its eight quadrant centers exactly once, at construction.
/// The sort is stable, so exact ties keep their construction order and the
/// result is deterministic.

use glam::Vec3;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CellOrder {
    /// Squared distance from the origin. Used by corner and edge cubes.
    Radial,
    /// Squared distance from the plane through the origin with this normal.
    /// Used by panel cubes; a panel is wide enough that a radial sort would
    /// pick outer quadrants near its rim first.
    Planar(Vec3),
}

impl CellOrder {
    pub fn key(self, p: Vec3) -> f32 {
        match self {
            CellOrder::Radial => p.length_squared(),
            CellOrder::Planar(normal) => (normal * p.dot(normal)).length_squared(),
        }
    }

    pub fn sort(self, points: &mut [Vec3]) {
        points.sort_by(|a, b| self.key(*a).total_cmp(&self.key(*b)));
    }
}
