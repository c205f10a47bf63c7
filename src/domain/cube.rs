/// Cube: the building block of troopers and panels.
///
/// A cube of a given size and center is split into 8 quadrant cells.
/// It shows 0 (nothing), 1-7 individual cells, or at 8 a single merged
/// solid. Which quadrant is cell #1, #2, ... is fixed by one sort at
/// construction (see `ordering`).

use glam::Vec3;

use super::cells::{BoxCore, CellBox};
use super::ordering::CellOrder;
use super::part::{self, PartId, Scene, CELL};

pub const CUBE_CELLS: u32 = 8;

/// Half-extent of one cell relative to the cube size (0.25 would touch).
const CELL_SCALE: f32 = 0.20;
/// Fraction of the cube size given up so merged neighbours keep a seam.
const MERGE_GAP: f32 = 0.15;

pub struct Cube {
    part: PartId,
    /// Live renderables, oldest first. Holds the one solid when merged.
    cells: Vec<PartId>,
    /// Quadrant centers in fill order.
    centers: [Vec3; 8],
    core: BoxCore,
}

impl Cube {
    /// Create an empty cube under `parent`. Call `edge_sort` or `panel_sort`
    /// before use to fix the fill order and starting cells.
    pub fn new(scene: &mut dyn Scene, parent: PartId, center: Vec3, size: f32) -> Self {
        let part = scene.add_part(parent);
        let q = size * 0.25;
        let centers = [
            center + Vec3::new(-q, -q, -q),
            center + Vec3::new(-q, -q, q),
            center + Vec3::new(-q, q, -q),
            center + Vec3::new(-q, q, q),
            center + Vec3::new(q, -q, -q),
            center + Vec3::new(q, -q, q),
            center + Vec3::new(q, q, -q),
            center + Vec3::new(q, q, q),
        ];
        Cube {
            part,
            cells: Vec::with_capacity(CUBE_CELLS as usize),
            centers,
            core: BoxCore::new(CUBE_CELLS, center, size),
        }
    }

    /// Order quadrants by distance from the trooper center, then show
    /// `start` cells. Used for corner and edge cubes.
    pub fn edge_sort(&mut self, scene: &mut dyn Scene, start: u32) {
        CellOrder::Radial.sort(&mut self.centers);
        self.reset(scene, start);
    }

    /// Order quadrants by distance from the plane with the panel's normal,
    /// then show `start` cells. Used for cubes owned by a panel.
    pub fn panel_sort(&mut self, scene: &mut dyn Scene, normal: Vec3, start: u32) {
        CellOrder::Planar(normal).sort(&mut self.centers);
        self.reset(scene, start);
    }

    pub fn part(&self) -> PartId {
        self.part
    }

    pub fn centers(&self) -> &[Vec3; 8] {
        &self.centers
    }

    pub fn cells(&self) -> &[PartId] {
        &self.cells
    }

    pub fn center(&self) -> Vec3 {
        self.core.center
    }
}

impl CellBox for Cube {
    fn core(&self) -> &BoxCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BoxCore {
        &mut self.core
    }

    fn grow(&mut self, scene: &mut dyn Scene) {
        let at = self.centers[self.core.count as usize - 1];
        let scale = Vec3::splat(self.core.size * CELL_SCALE);
        self.cells.push(part::spawn(scene, self.part, CELL, at, scale));
    }

    fn shrink(&mut self, scene: &mut dyn Scene) {
        if let Some(cell) = self.cells.pop() {
            scene.rem_part(cell);
        }
    }

    fn merge(&mut self, scene: &mut dyn Scene) {
        self.trash(scene);
        let size = self.core.size;
        let scale = Vec3::splat((size - size * MERGE_GAP) * 0.5);
        self.cells.push(part::spawn(scene, self.part, CELL, self.core.center, scale));
    }

    fn trash(&mut self, scene: &mut dyn Scene) {
        while let Some(cell) = self.cells.pop() {
            scene.rem_part(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::SceneGraph;
    use approx::assert_relative_eq;

    fn corner_cube(scene: &mut SceneGraph, start: u32) -> Cube {
        let root = scene.root();
        let mut c = Cube::new(scene, root, Vec3::splat(-0.25), 0.5);
        c.edge_sort(scene, start);
        c
    }

    #[test]
    fn edge_sort_fills_from_the_inside() {
        let mut scene = SceneGraph::new();
        let c = corner_cube(&mut scene, 1);
        assert_eq!(c.count(), 1);
        assert_eq!(c.cells().len(), 1);
        // The quadrant closest to the origin comes first, the outermost last.
        assert_eq!(c.centers()[0], Vec3::splat(-0.125));
        assert_eq!(c.centers()[7], Vec3::splat(-0.375));
        assert_eq!(scene.location(c.cells()[0]), Vec3::splat(-0.125));
    }

    #[test]
    fn cells_track_count_below_max() {
        let mut scene = SceneGraph::new();
        let mut c = corner_cube(&mut scene, 0);
        for n in 1..CUBE_CELLS {
            assert!(c.attach(&mut scene));
            assert_eq!(c.count(), n);
            assert_eq!(c.cells().len(), n as usize);
            for (i, cell) in c.cells().iter().enumerate() {
                assert_eq!(scene.location(*cell), c.centers()[i]);
            }
        }
    }

    #[test]
    fn cell_scale_leaves_a_gap() {
        let mut scene = SceneGraph::new();
        let c = corner_cube(&mut scene, 2);
        assert_relative_eq!(scene.scale(c.cells()[1]).x, 0.5 * 0.20);
    }

    #[test]
    fn full_cube_is_one_solid() {
        let mut scene = SceneGraph::new();
        let c = corner_cube(&mut scene, 8);
        assert_eq!(c.count(), 8);
        assert_eq!(c.cells().len(), 1);
        let solid = c.cells()[0];
        assert_eq!(scene.location(solid), Vec3::splat(-0.25));
        assert_relative_eq!(scene.scale(solid).y, (0.5 - 0.5 * 0.15) * 0.5);
    }

    #[test]
    fn detach_from_full_rebuilds_seven() {
        let mut scene = SceneGraph::new();
        let mut c = corner_cube(&mut scene, 8);
        let solid = c.cells()[0];

        assert!(c.detach(&mut scene));
        assert_eq!(c.count(), 7);
        assert_eq!(c.cells().len(), 7);
        assert!(!scene.contains(solid));
        for (i, cell) in c.cells().iter().enumerate() {
            assert_eq!(scene.location(*cell), c.centers()[i]);
        }
    }

    #[test]
    fn attach_then_detach_restores_membership() {
        let mut scene = SceneGraph::new();
        let mut c = corner_cube(&mut scene, 3);
        let before: Vec<PartId> = c.cells().to_vec();

        assert!(c.attach(&mut scene));
        let added = *c.cells().last().unwrap();
        assert!(c.detach(&mut scene));

        assert_eq!(c.count(), 3);
        assert_eq!(c.cells(), &before[..]);
        assert!(!scene.contains(added));
    }

    #[test]
    fn reset_round_trips_any_state() {
        let mut scene = SceneGraph::new();
        let mut c = corner_cube(&mut scene, 8);
        for n in [0, 5, 8, 12, 3] {
            c.reset(&mut scene, n);
            assert_eq!(c.count(), n.min(CUBE_CELLS));
            let expected = if c.is_full() { 1 } else { c.count() as usize };
            assert_eq!(c.cells().len(), expected);
        }
    }

    #[test]
    fn trash_removes_visuals_but_keeps_count() {
        let mut scene = SceneGraph::new();
        let mut c = corner_cube(&mut scene, 4);
        let nodes = scene.len();
        c.trash(&mut scene);
        assert_eq!(c.count(), 4);
        assert!(c.cells().is_empty());
        assert_eq!(scene.len(), nodes - 4);
        c.trash(&mut scene);
        assert_eq!(scene.len(), nodes - 4);
    }
}
