/// Shared cell bookkeeping for cubes and panels.
///
/// Every change to a box's cell count goes through `attach`, `detach` and
/// `reset` below. The concrete box only supplies the visual hooks (grow one
/// cell, shrink one cell, merge into a solid, trash everything), so the
/// merged/unmerged visuals can never drift from the count.
///
/// ```text
///   attach:  count+1 == max  -> merge()      else grow()
///   detach:  count   == max  -> reset(max-1) else shrink(), count-1
///   reset:   trash(), count = 0, attach() n times
/// ```

use glam::Vec3;

use super::part::Scene;

/// Count, capacity and placement common to every box.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxCore {
    pub count: u32,
    pub max: u32,
    pub center: Vec3,
    /// Edge length of one cube in this box.
    pub size: f32,
}

impl BoxCore {
    pub fn new(max: u32, center: Vec3, size: f32) -> Self {
        BoxCore { count: 0, max, center, size }
    }
}

pub trait CellBox {
    fn core(&self) -> &BoxCore;
    fn core_mut(&mut self) -> &mut BoxCore;

    /// Show the cell for the count that was just incremented.
    fn grow(&mut self, scene: &mut dyn Scene);
    /// Remove the most recently shown cell. Runs before the count drops.
    fn shrink(&mut self, scene: &mut dyn Scene);
    /// Replace everything with the single full representation.
    fn merge(&mut self, scene: &mut dyn Scene);
    /// Destroy every visual. The count is left alone.
    fn trash(&mut self, scene: &mut dyn Scene);

    fn count(&self) -> u32 {
        self.core().count
    }

    fn max(&self) -> u32 {
        self.core().max
    }

    fn is_full(&self) -> bool {
        self.core().count == self.core().max
    }

    /// Add one cell. Returns false if the box was already full.
    fn attach(&mut self, scene: &mut dyn Scene) -> bool {
        let core = self.core_mut();
        if core.count >= core.max {
            return false;
        }
        core.count += 1;
        if core.count == core.max {
            self.merge(scene);
        } else {
            self.grow(scene);
        }
        true
    }

    /// Remove one cell. Returns false if the box was already empty.
    fn detach(&mut self, scene: &mut dyn Scene) -> bool {
        let BoxCore { count, max, .. } = *self.core();
        if count == 0 || count > max {
            return false;
        }
        if count == max {
            // Break the merged form apart into max-1 individual cells.
            self.reset(scene, max - 1);
        } else {
            self.shrink(scene);
            self.core_mut().count -= 1;
        }
        true
    }

    /// Rebuild from scratch so that the box holds `cells` cells (clamped).
    fn reset(&mut self, scene: &mut dyn Scene, cells: u32) {
        self.trash(scene);
        self.core_mut().count = 0;
        let target = cells.min(self.core().max);
        for _ in 0..target {
            self.attach(scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::SceneGraph;

    /// Hook recorder: grows/shrinks a plain counter of visible pieces.
    struct Probe {
        core: BoxCore,
        pieces: u32,
        merged: bool,
        log: Vec<&'static str>,
    }

    impl Probe {
        fn new(max: u32) -> Self {
            Probe { core: BoxCore::new(max, Vec3::ZERO, 1.0), pieces: 0, merged: false, log: vec![] }
        }
    }

    impl CellBox for Probe {
        fn core(&self) -> &BoxCore { &self.core }
        fn core_mut(&mut self) -> &mut BoxCore { &mut self.core }
        fn grow(&mut self, _scene: &mut dyn Scene) {
            self.pieces += 1;
            self.log.push("grow");
        }
        fn shrink(&mut self, _scene: &mut dyn Scene) {
            self.pieces -= 1;
            self.log.push("shrink");
        }
        fn merge(&mut self, scene: &mut dyn Scene) {
            self.trash(scene);
            self.merged = true;
            self.log.push("merge");
        }
        fn trash(&mut self, _scene: &mut dyn Scene) {
            self.pieces = 0;
            self.merged = false;
            self.log.push("trash");
        }
    }

    #[test]
    fn attach_merges_on_the_last_cell() {
        let mut scene = SceneGraph::new();
        let mut b = Probe::new(3);
        assert!(b.attach(&mut scene));
        assert!(b.attach(&mut scene));
        assert_eq!(b.pieces, 2);
        assert!(b.attach(&mut scene));
        assert!(b.merged);
        assert_eq!(b.count(), 3);
        assert!(!b.attach(&mut scene));
        assert_eq!(b.count(), 3);
    }

    #[test]
    fn detach_from_full_rebuilds_individual_cells() {
        let mut scene = SceneGraph::new();
        let mut b = Probe::new(4);
        b.reset(&mut scene, 4);
        assert!(b.merged);
        b.log.clear();

        assert!(b.detach(&mut scene));
        assert_eq!(b.count(), 3);
        assert!(!b.merged);
        assert_eq!(b.pieces, 3);
        assert_eq!(b.log, vec!["trash", "grow", "grow", "grow"]);
    }

    #[test]
    fn detach_on_empty_is_refused() {
        let mut scene = SceneGraph::new();
        let mut b = Probe::new(4);
        assert!(!b.detach(&mut scene));
        assert_eq!(b.count(), 0);
        assert!(b.log.is_empty());
    }

    #[test]
    fn reset_clamps_to_capacity() {
        let mut scene = SceneGraph::new();
        let mut b = Probe::new(5);
        b.reset(&mut scene, 2);
        assert_eq!(b.count(), 2);
        b.reset(&mut scene, 99);
        assert_eq!(b.count(), 5);
        b.reset(&mut scene, 0);
        assert_eq!(b.count(), 0);
        assert_eq!(b.pieces, 0);
    }

    #[test]
    fn zero_capacity_box_never_changes() {
        let mut scene = SceneGraph::new();
        let mut b = Probe::new(0);
        assert!(!b.attach(&mut scene));
        assert!(!b.detach(&mut scene));
        b.reset(&mut scene, 3);
        assert_eq!(b.count(), 0);
    }
}
