/// Panel: the cubes covering the middle of one trooper face.
///
/// A level-L trooper face has (L-1)^2 side cubes. The panel owns them, spreads
/// new cells across them round-robin so the face grows evenly, and swaps
/// them for one flat slab when every cell is present.

use glam::Vec3;
use tracing::error;

use super::cells::{BoxCore, CellBox};
use super::cube::{Cube, CUBE_CELLS};
use super::part::{self, Axis, PartId, Scene, SLAB};

/// Cells each side cube shows when the panel is built.
pub const PANEL_START_CELLS: u32 = 4;

pub struct Panel {
    part: PartId,
    level: u32,
    axis: Axis,
    slab: Option<PartId>,
    cubes: Vec<Cube>,
    /// Times the fill or drain scan found no eligible cube.
    faults: u32,
    core: BoxCore,
}

impl Panel {
    /// Create an empty panel centered `offset` along `axis` (negative for
    /// the far face). Cubes are added with `add_cube`.
    pub fn new(scene: &mut dyn Scene, parent: PartId, axis: Axis, offset: f32, level: u32) -> Self {
        let part = scene.add_part(parent);
        let side = level.saturating_sub(1);
        Panel {
            part,
            level,
            axis,
            slab: None,
            cubes: Vec::with_capacity((side * side) as usize),
            faults: 0,
            core: BoxCore::new(side * side * CUBE_CELLS, axis.unit() * offset, 0.0),
        }
    }

    /// Add one of this panel's side cubes. Construction only.
    pub fn add_cube(&mut self, scene: &mut dyn Scene, center: Vec3, size: f32) {
        self.core.size = size;
        let mut cube = Cube::new(scene, self.part, center, size);
        cube.panel_sort(scene, self.axis.unit(), PANEL_START_CELLS);
        self.core.count += PANEL_START_CELLS;
        self.cubes.push(cube);
    }

    pub fn part(&self) -> PartId {
        self.part
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    pub fn slab(&self) -> Option<PartId> {
        self.slab
    }

    pub fn faults(&self) -> u32 {
        self.faults
    }

    fn fault(&mut self, what: &str) {
        self.faults += 1;
        error!(count = self.core.count, max = self.core.max, "panel {what}: no eligible cube");
    }
}

impl CellBox for Panel {
    fn core(&self) -> &BoxCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BoxCore {
        &mut self.core
    }

    /// Give the cell to the emptiest cube, first cube winning ties.
    fn grow(&mut self, scene: &mut dyn Scene) {
        let cube_max = self.cubes.first().map_or(0, |c| c.max());
        for fill in 0..cube_max {
            if let Some(cube) = self.cubes.iter_mut().find(|c| c.count() <= fill) {
                cube.attach(scene);
                return;
            }
        }
        self.fault("grow");
    }

    fn shrink(&mut self, scene: &mut dyn Scene) {
        for cube in &mut self.cubes {
            if cube.detach(scene) {
                return;
            }
        }
        self.fault("shrink");
    }

    fn merge(&mut self, scene: &mut dyn Scene) {
        self.trash(scene);
        let half = self.core.size * 0.5;
        let span = self.level.saturating_sub(1) as f32 * half;
        let mut scale = Vec3::splat(span);
        scale[self.axis.index()] = half;
        self.slab = Some(part::spawn(scene, self.part, SLAB, self.core.center, scale));
    }

    fn trash(&mut self, scene: &mut dyn Scene) {
        if let Some(slab) = self.slab.take() {
            scene.rem_part(slab);
        }
        for cube in &mut self.cubes {
            cube.reset(scene, 0);
        }
    }
}
