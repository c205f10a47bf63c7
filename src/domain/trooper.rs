/// Trooper: the player's body, an L+1 by L+1 by L+1 cube of cubes.
///
///   level 0: 1x1x1 : a single cube, no panels
///   level 1: 2x2x2 :  8 corner cubes, 6 empty panels, no center
///   level 2: 3x3x3 : 20 corner/edge cubes, 6 panels of 1x1 cubes, 1x1x1 center
///   level 3: 4x4x4 : 32 corner/edge cubes, 6 panels of 2x2 cubes, 2x2x2 center
///
/// Health grows with the cube of the level, so drawing every cell would blow
/// up the node count. Full cubes collapse to one solid, full panels to one
/// slab, and a fully healed trooper to one body. The interior is never
/// health, only a single decorative block.
///
/// The trooper occupies a unit cube centered at the origin of its part.

use std::rc::Rc;

use glam::Vec3;
use tracing::debug;

use crate::config::EnergyConfig;
use super::cells::CellBox;
use super::cube::Cube;
use super::energy::{Energy, EnergyLevels};
use super::monitor::{EnergyMonitor, HealthMonitor, Monitors};
use super::panel::Panel;
use super::part::{self, Audio, Axis, PartId, Scene, Sound, CORE, SLAB};

/// Cells a corner cube starts with.
const CORNER_CELLS: u32 = 1;
/// Cells an edge cube starts with.
const EDGE_CELLS: u32 = 2;

/// One of the trooper's boxes, in the order cells are handed out.
pub enum Bit {
    Cube(Cube),
    Panel(Panel),
}

impl Bit {
    pub fn cells(&self) -> &dyn CellBox {
        match self {
            Bit::Cube(c) => c,
            Bit::Panel(p) => p,
        }
    }

    pub fn cells_mut(&mut self) -> &mut dyn CellBox {
        match self {
            Bit::Cube(c) => c,
            Bit::Panel(p) => p,
        }
    }

    /// Group part the box keeps its cells under.
    pub fn part(&self) -> PartId {
        match self {
            Bit::Cube(c) => c.part(),
            Bit::Panel(p) => p.part(),
        }
    }
}

/// Current cell count, the count a level starts with, and the most cells
/// the level allows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Health {
    pub current: u32,
    pub mid: u32,
    pub max: u32,
}

pub struct Trooper {
    part: PartId,
    level: u32,
    /// Single body shown at full health.
    neo: Option<PartId>,
    /// Panels first (+x, -x, +y, -y, +z, -z), then corner and edge cubes.
    bits: Vec<Bit>,
    /// Cell count of each bit at construction, for level restarts.
    starts: Vec<u32>,
    center: Option<PartId>,
    energy: Energy,
    health_monitors: Monitors<dyn HealthMonitor>,
    energy_monitors: Monitors<dyn EnergyMonitor>,
}

impl Trooper {
    /// Build a trooper at the starting size for `level` under `part`.
    pub fn new(scene: &mut dyn Scene, part: PartId, level: u32, energy: &EnergyConfig) -> Self {
        let mut tr = Trooper {
            part,
            level,
            neo: None,
            bits: Vec::new(),
            starts: Vec::new(),
            center: None,
            energy: Energy::new(energy),
            health_monitors: Monitors::default(),
            energy_monitors: Monitors::default(),
        };

        if level == 0 {
            let mut cube = Cube::new(scene, part, Vec3::ZERO, 1.0);
            cube.edge_sort(scene, CORNER_CELLS);
            tr.bits.push(Bit::Cube(cube));
        } else {
            tr.build(scene);
            tr.add_center(scene);
        }

        // Easier to remember the starting sizes than to recompute them.
        tr.starts = tr.bits.iter().map(|b| b.cells().count()).collect();
        let h = tr.health();
        debug!(level, boxes = tr.bits.len(), health = h.current, max = h.max, "trooper built");
        tr
    }

    fn build(&mut self, scene: &mut dyn Scene) {
        let lvl = self.level;
        let cube_size = 1.0 / (lvl + 1) as f32;
        let offset = cube_size * 0.5;
        let panel_at = lvl as f32 * offset;

        for axis in Axis::ALL {
            for sign in [1.0, -1.0] {
                let panel = Panel::new(scene, self.part, axis, sign * panel_at, lvl);
                self.bits.push(Bit::Panel(panel));
            }
        }

        let on_shell = |c: u32| c == 0 || c == lvl;
        let coord = |c: u32| (2 * c as i32 - lvl as i32) as f32 * offset;

        for cx in 0..=lvl {
            for cy in 0..=lvl {
                for cz in 0..=lvl {
                    let idx = [cx, cy, cz];
                    let shell = idx.map(on_shell);
                    let at = Vec3::new(coord(cx), coord(cy), coord(cz));
                    let start = match shell.iter().filter(|s| **s).count() {
                        3 => CORNER_CELLS,
                        2 => EDGE_CELLS,
                        1 => {
                            // Side cubes belong to the panel of their face.
                            let axis = shell.iter().position(|s| *s).unwrap_or(0);
                            let face = axis * 2 + usize::from(idx[axis] == 0);
                            if let Bit::Panel(p) = &mut self.bits[face] {
                                p.add_cube(scene, at, cube_size);
                            }
                            continue;
                        }
                        _ => continue, // interior: covered by the center block
                    };
                    let mut cube = Cube::new(scene, self.part, at, cube_size);
                    cube.edge_sort(scene, start);
                    self.bits.push(Bit::Cube(cube));
                }
            }
        }
    }

    /// The interior is one block the size of the previous level, with a gap.
    fn add_center(&mut self, scene: &mut dyn Scene) {
        if self.level == 0 {
            return;
        }
        let cube_size = 1.0 / (self.level + 1) as f32;
        let scale = (self.level - 1) as f32 * cube_size * 0.45;
        self.center = Some(part::spawn(scene, self.part, CORE, Vec3::ZERO, Vec3::splat(scale)));
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn part(&self) -> PartId {
        self.part
    }

    pub fn boxes(&self) -> &[Bit] {
        &self.bits
    }

    pub fn body(&self) -> Option<PartId> {
        self.neo
    }

    pub fn center(&self) -> Option<PartId> {
        self.center
    }

    pub fn full_health(&self) -> bool {
        self.neo.is_some()
    }

    pub fn health(&self) -> Health {
        let current = self.bits.iter().map(|b| b.cells().count()).sum();
        let l = i64::from(self.level);
        let (l0, l1, l2) = ((l - 1) * 2, l * 2, (l + 1) * 2);
        let min = l0.pow(3);
        Health {
            current,
            mid: (l1.pow(3) - min) as u32,
            max: (l2.pow(3) - min) as u32,
        }
    }

    // ── Transform ──

    pub fn set_scale(&self, scene: &mut dyn Scene, scale: f32) {
        scene.set_scale(self.part, Vec3::splat(scale));
    }

    pub fn loc(&self, scene: &dyn Scene) -> Vec3 {
        scene.location(self.part)
    }

    pub fn set_loc(&self, scene: &mut dyn Scene, at: Vec3) {
        scene.set_location(self.part, at);
    }

    // ── Cells ──

    /// Add a cell to the first box with room. Panels fill before edges.
    pub fn attach(&mut self, scene: &mut dyn Scene) -> bool {
        if !self.attach_first(scene) {
            return false;
        }
        let h = self.health();
        if h.current == h.max && self.neo.is_none() {
            self.merge(scene);
        }
        self.health_changed(h);
        true
    }

    /// Remove one cell. A fully healed body breaks apart first.
    pub fn detach(&mut self, scene: &mut dyn Scene) -> bool {
        let detached = if self.neo.is_some() {
            self.demerge(scene);
            true
        } else {
            self.detach_first(scene)
        };
        if detached {
            self.health_changed(self.health());
        }
        detached
    }

    /// Lose up to `loss` cells at once, e.g. after a collision.
    pub fn detach_cores(&mut self, scene: &mut dyn Scene, loss: u32) {
        if loss == 0 {
            return;
        }
        let loss = loss.min(self.health().current);
        for _ in 0..loss {
            if self.neo.is_some() {
                self.demerge(scene);
                continue;
            }
            self.detach_first(scene);
        }
        self.health_changed(self.health());
    }

    /// Back to the level's starting cells.
    pub fn reset(&mut self, scene: &mut dyn Scene) {
        self.trash(scene);
        self.add_center(scene);
        for (bit, &start) in self.bits.iter_mut().zip(&self.starts) {
            bit.cells_mut().reset(scene, start);
        }
        self.health_changed(self.health());
    }

    /// Destroy every cell and body the trooper shows. Counts and the
    /// boxes' group parts are kept so the trooper can be rebuilt.
    pub fn trash(&mut self, scene: &mut dyn Scene) {
        for bit in &mut self.bits {
            bit.cells_mut().trash(scene);
        }
        if let Some(center) = self.center.take() {
            scene.rem_part(center);
        }
        if let Some(neo) = self.neo.take() {
            scene.rem_part(neo);
        }
    }

    /// Remove everything the trooper added to the scene, group parts
    /// included. The trooper's own part belongs to the caller.
    pub fn discard(mut self, scene: &mut dyn Scene) {
        self.trash(scene);
        for bit in &self.bits {
            scene.rem_part(bit.part());
        }
        debug!(level = self.level, "trooper discarded");
    }

    fn attach_first(&mut self, scene: &mut dyn Scene) -> bool {
        for bit in &mut self.bits {
            if bit.cells_mut().attach(scene) {
                return true;
            }
        }
        false
    }

    fn detach_first(&mut self, scene: &mut dyn Scene) -> bool {
        for bit in &mut self.bits {
            if bit.cells_mut().detach(scene) {
                return true;
            }
        }
        false
    }

    /// Collapse everything into one body. Only at full health.
    fn merge(&mut self, scene: &mut dyn Scene) {
        self.trash(scene);
        self.neo = Some(part::spawn(scene, self.part, SLAB, Vec3::ZERO, Vec3::splat(0.5)));
        self.add_center(scene);
        debug!(level = self.level, "trooper merged");
    }

    /// Break the body apart into full boxes, minus the cell that was lost.
    fn demerge(&mut self, scene: &mut dyn Scene) {
        self.trash(scene);
        self.add_center(scene);
        for bit in &mut self.bits {
            let cells = bit.cells_mut();
            let max = cells.max();
            cells.reset(scene, max);
        }
        self.detach_first(scene);
        debug!(level = self.level, "trooper demerged");
    }

    // ── Energy ──

    pub fn energy(&self) -> EnergyLevels {
        self.energy.levels()
    }

    pub fn is_cloaked(&self) -> bool {
        self.energy.is_cloaked()
    }

    /// Reward cloak energy after something happened in game.
    pub fn add_cloak_energy(&mut self) {
        self.energy.add_cloak();
        self.energy_changed();
    }

    /// Turn the cloak on (needs energy) or off.
    pub fn cloak(&mut self, on: bool, scene: &dyn Scene, audio: &mut dyn Audio) {
        if !self.energy.set_cloaked(on) {
            return;
        }
        let sound = if on { Sound::Cloak } else { Sound::Decloak };
        self.play(sound, scene, audio);
    }

    /// Spend the full teleport charge. Fails unless fully charged.
    pub fn teleport(&mut self, scene: &dyn Scene, audio: &mut dyn Audio) -> bool {
        if !self.energy.spend_teleport() {
            return false;
        }
        self.play(Sound::Teleport, scene, audio);
        self.energy_changed();
        true
    }

    /// Called every update tick: refill teleport, burn cloak.
    pub fn update_energy(&mut self, scene: &dyn Scene, audio: &mut dyn Audio) {
        let tick = self.energy.tick();
        if tick.depleted {
            self.play(Sound::Decloak, scene, audio);
        }
        if tick.changed {
            self.energy_changed();
        }
    }

    /// Refill both counters at the start of a level.
    pub fn reset_energy(&mut self) {
        self.energy.reset();
        self.energy_changed();
    }

    fn play(&self, sound: Sound, scene: &dyn Scene, audio: &mut dyn Audio) {
        let at = self.loc(scene);
        audio.set_listener(at);
        audio.play_at(sound, at);
    }

    // ── Monitors ──

    pub fn monitor_health(&mut self, id: &str, monitor: Rc<dyn HealthMonitor>) {
        self.health_monitors.monitor(id, monitor);
    }

    pub fn ignore_health(&mut self, id: &str) {
        self.health_monitors.ignore(id);
    }

    pub fn monitor_energy(&mut self, id: &str, monitor: Rc<dyn EnergyMonitor>) {
        self.energy_monitors.monitor(id, monitor);
    }

    pub fn ignore_energy(&mut self, id: &str) {
        self.energy_monitors.ignore(id);
    }

    fn health_changed(&self, h: Health) {
        for m in self.health_monitors.iter() {
            m.health_updated(h.current, h.mid, h.max);
        }
    }

    fn energy_changed(&self) {
        let e = self.energy();
        for m in self.energy_monitors.iter() {
            m.energy_updated(e.teleport, e.teleport_max, e.cloak, e.cloak_max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::SceneGraph;
    use std::cell::RefCell;

    fn trooper(scene: &mut SceneGraph, level: u32) -> Trooper {
        let root = scene.root();
        let part = scene.add_part(root);
        Trooper::new(scene, part, level, &EnergyConfig::default())
    }

    fn fill(tr: &mut Trooper, scene: &mut SceneGraph) -> u32 {
        let mut n = 0;
        while tr.attach(scene) {
            n += 1;
        }
        n
    }

    /// Box-level renderable accounting, valid whenever the body is not merged.
    fn check_boxes(tr: &Trooper) {
        for bit in tr.boxes() {
            let c = bit.cells();
            assert!(c.count() <= c.max());
            match bit {
                Bit::Cube(cube) => {
                    let expected = if cube.is_full() { 1 } else { cube.count() as usize };
                    assert_eq!(cube.cells().len(), expected);
                }
                Bit::Panel(p) => {
                    assert_eq!(p.faults(), 0);
                    assert_eq!(p.slab().is_some(), p.is_full() && p.max() > 0);
                    if p.slab().is_none() {
                        let sum: u32 = p.cubes().iter().map(|c| c.count()).sum();
                        assert_eq!(sum, p.count());
                    }
                }
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        health: RefCell<Vec<(u32, u32, u32)>>,
        energy: RefCell<Vec<(u32, u32, u32, u32)>>,
    }

    impl HealthMonitor for Recorder {
        fn health_updated(&self, health: u32, mid: u32, max: u32) {
            self.health.borrow_mut().push((health, mid, max));
        }
    }

    impl EnergyMonitor for Recorder {
        fn energy_updated(&self, teleport: u32, teleport_max: u32, cloak: u32, cloak_max: u32) {
            self.energy.borrow_mut().push((teleport, teleport_max, cloak, cloak_max));
        }
    }

    #[derive(Default)]
    struct Speaker {
        listener: Option<Vec3>,
        played: Vec<(Sound, Vec3)>,
    }

    impl Audio for Speaker {
        fn set_listener(&mut self, at: Vec3) {
            self.listener = Some(at);
        }
        fn play_at(&mut self, sound: Sound, at: Vec3) {
            self.played.push((sound, at));
        }
    }

    #[test]
    fn health_formula_per_level() {
        let mut scene = SceneGraph::new();
        let expected = [(0, 1, 8, 16), (1, 8, 8, 64), (2, 56, 56, 208), (3, 152, 152, 448), (4, 296, 296, 784)];
        for (level, current, mid, max) in expected {
            let tr = trooper(&mut scene, level);
            assert_eq!(tr.health(), Health { current, mid, max }, "level {level}");
        }
    }

    #[test]
    fn box_capacity_matches_max_health() {
        let mut scene = SceneGraph::new();
        for level in 1..=4 {
            let tr = trooper(&mut scene, level);
            let capacity: u32 = tr.boxes().iter().map(|b| b.cells().max()).sum();
            assert_eq!(capacity, tr.health().max, "level {level}");
        }
    }

    #[test]
    fn level_two_layout() {
        let mut scene = SceneGraph::new();
        let tr = trooper(&mut scene, 2);
        assert_eq!(tr.boxes().len(), 6 + 20);
        for (i, bit) in tr.boxes()[..6].iter().enumerate() {
            let Bit::Panel(p) = bit else { panic!("bit {i} is not a panel") };
            assert_eq!(p.cubes().len(), 1);
            assert_eq!(p.count(), 4);
        }
        let corners = tr.boxes()[6..].iter().filter(|b| b.cells().count() == 1).count();
        let edges = tr.boxes()[6..].iter().filter(|b| b.cells().count() == 2).count();
        assert_eq!((corners, edges), (8, 12));
        assert!(tr.center().is_some());
        check_boxes(&tr);
    }

    #[test]
    fn panels_face_their_axis() {
        let mut scene = SceneGraph::new();
        let tr = trooper(&mut scene, 3);
        let faces = [Axis::X, Axis::X, Axis::Y, Axis::Y, Axis::Z, Axis::Z];
        for (bit, axis) in tr.boxes()[..6].iter().zip(faces) {
            let Bit::Panel(p) = bit else { panic!("not a panel") };
            assert_eq!(p.axis(), axis);
            let i = axis.index();
            let face = p.core().center[i];
            assert!(p.cubes().iter().all(|c| c.center()[i] == face));
        }
    }

    #[test]
    fn level_zero_is_one_cube() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 0);
        assert_eq!(tr.boxes().len(), 1);
        assert!(tr.center().is_none());
        assert_eq!(fill(&mut tr, &mut scene), 7);
        // The cube is merged, but 8 of 16 is not full health.
        assert!(!tr.full_health());
        let Bit::Cube(c) = &tr.boxes()[0] else { panic!("not a cube") };
        assert_eq!(c.cells().len(), 1);
    }

    #[test]
    fn attach_fills_panels_first() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 2);
        assert!(tr.attach(&mut scene));
        assert_eq!(tr.boxes()[0].cells().count(), 5);
        for _ in 0..3 {
            tr.attach(&mut scene);
        }
        let Bit::Panel(p) = &tr.boxes()[0] else { panic!("not a panel") };
        assert!(p.slab().is_some());
        tr.attach(&mut scene);
        assert_eq!(tr.boxes()[1].cells().count(), 5);
        check_boxes(&tr);
    }

    #[test]
    fn full_health_merges_once() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 1);
        assert_eq!(fill(&mut tr, &mut scene), 56);
        assert!(tr.full_health());
        assert_eq!(tr.health().current, 64);
        let body = tr.body().unwrap();
        assert_eq!(scene.scale(body), Vec3::splat(0.5));

        // Only the body is visible; the boxes gave up their visuals.
        let blocks: Vec<PartId> = scene.blocks().map(|b| b.part).collect();
        assert_eq!(blocks.len(), 2); // body + (empty) center
        assert!(blocks.contains(&body));

        assert!(!tr.attach(&mut scene));
        assert_eq!(tr.body(), Some(body));
    }

    #[test]
    fn detach_breaks_merged_body() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 2);
        fill(&mut tr, &mut scene);
        let body = tr.body().unwrap();

        assert!(tr.detach(&mut scene));
        assert!(!tr.full_health());
        assert!(!scene.contains(body));
        assert_eq!(tr.health().current, 207);
        assert_eq!(tr.boxes()[0].cells().count(), 7);
        assert!(tr.boxes()[1..].iter().all(|b| b.cells().is_full()));
        check_boxes(&tr);
    }

    #[test]
    fn level_one_demerge_skips_empty_panels() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 1);
        fill(&mut tr, &mut scene);
        tr.detach(&mut scene);
        assert_eq!(tr.health().current, 63);
        assert_eq!(tr.boxes()[6].cells().count(), 7);
        check_boxes(&tr);
    }

    #[test]
    fn detach_cores_demerges_then_drains() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 2);
        fill(&mut tr, &mut scene);
        let rec = Rc::new(Recorder::default());
        tr.monitor_health("x", rec.clone());

        tr.detach_cores(&mut scene, 3);
        assert_eq!(tr.health().current, 205);
        assert_eq!(tr.boxes()[0].cells().count(), 5);
        assert_eq!(rec.health.borrow().as_slice(), &[(205, 56, 208)]);

        tr.detach_cores(&mut scene, 0);
        assert_eq!(rec.health.borrow().len(), 1);

        tr.detach_cores(&mut scene, 10_000);
        assert_eq!(tr.health().current, 0);
        check_boxes(&tr);
        assert!(!tr.detach(&mut scene));
    }

    #[test]
    fn reset_restores_level_start() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 3);
        let start: Vec<u32> = tr.boxes().iter().map(|b| b.cells().count()).collect();
        for _ in 0..40 {
            tr.attach(&mut scene);
        }
        tr.detach_cores(&mut scene, 100);
        tr.reset(&mut scene);

        let now: Vec<u32> = tr.boxes().iter().map(|b| b.cells().count()).collect();
        assert_eq!(now, start);
        assert_eq!(tr.health().current, tr.health().mid);
        assert!(tr.center().is_some());
        check_boxes(&tr);
    }

    #[test]
    fn visuals_track_counts_through_churn() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 3);
        for round in 0..12u32 {
            for _ in 0..(round * 7 % 23) {
                tr.attach(&mut scene);
                check_boxes(&tr);
            }
            for _ in 0..(round * 5 % 17) {
                tr.detach(&mut scene);
                check_boxes(&tr);
            }
        }
    }

    #[test]
    fn trash_leaves_no_blocks() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 2);
        assert!(scene.blocks().count() > 0);
        tr.trash(&mut scene);
        assert_eq!(scene.blocks().count(), 0);
        assert_eq!(tr.health().current, 56);
        tr.trash(&mut scene);
        assert_eq!(scene.blocks().count(), 0);
    }

    #[test]
    fn discard_removes_group_parts() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let part = scene.add_part(root);
        let tr = Trooper::new(&mut scene, part, 3, &EnergyConfig::default());
        let groups: Vec<PartId> = tr.boxes().iter().map(|b| b.part()).collect();
        assert!(groups.iter().all(|g| scene.contains(*g)));

        tr.discard(&mut scene);
        assert!(groups.iter().all(|g| !scene.contains(*g)));
        assert!(scene.children(part).is_empty());
        assert!(scene.contains(part));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn transform_goes_to_the_trooper_part() {
        let mut scene = SceneGraph::new();
        let tr = trooper(&mut scene, 1);
        tr.set_scale(&mut scene, 200.0);
        tr.set_loc(&mut scene, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(scene.scale(tr.part()), Vec3::splat(200.0));
        assert_eq!(tr.loc(&scene), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(tr.level(), 1);
    }

    #[test]
    fn health_monitor_delivery() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 2);
        let rec = Rc::new(Recorder::default());
        tr.monitor_health("x", rec.clone());

        tr.attach(&mut scene);
        assert_eq!(rec.health.borrow().as_slice(), &[(57, 56, 208)]);

        tr.ignore_health("x");
        tr.attach(&mut scene);
        assert_eq!(rec.health.borrow().len(), 1);
    }

    #[test]
    fn teleport_needs_a_full_charge() {
        let mut scene = SceneGraph::new();
        let mut tr = trooper(&mut scene, 1);
        tr.set_loc(&mut scene, Vec3::new(3.0, 0.0, -2.0));
        let rec = Rc::new(Recorder::default());
        tr.monitor_energy("hud", rec.clone());
        let mut audio = Speaker::default();

        assert!(tr.teleport(&scene, &mut audio));
        assert_eq!(tr.energy().teleport, 0);
        assert_eq!(audio.played, vec![(Sound::Teleport, Vec3::new(3.0, 0.0, -2.0))]);
        assert_eq!(audio.listener, Some(Vec3::new(3.0, 0.0, -2.0)));
        assert_eq!(rec.energy.borrow().as_slice(), &[(0, 1000, 1000, 1000)]);

        assert!(!tr.teleport(&scene, &mut audio));
        assert_eq!(tr.energy().teleport, 0);
        assert_eq!(audio.played.len(), 1);

        tr.update_energy(&scene, &mut audio);
        assert_eq!(tr.energy().teleport, 1);
        assert_eq!(rec.energy.borrow().len(), 2);
    }

    #[test]
    fn cloak_runs_out_and_decloaks() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let part = scene.add_part(root);
        let cfg = EnergyConfig { cloak_max: 8, ..EnergyConfig::default() };
        let mut tr = Trooper::new(&mut scene, part, 1, &cfg);
        let rec = Rc::new(Recorder::default());
        tr.monitor_energy("hud", rec.clone());
        let mut audio = Speaker::default();

        tr.cloak(true, &scene, &mut audio);
        assert!(tr.is_cloaked());
        assert!(rec.energy.borrow().is_empty());
        tr.update_energy(&scene, &mut audio);
        assert_eq!(tr.energy().cloak, 4);
        tr.update_energy(&scene, &mut audio);
        assert_eq!(tr.energy().cloak, 0);
        assert!(!tr.is_cloaked());
        let sounds: Vec<Sound> = audio.played.iter().map(|p| p.0).collect();
        assert_eq!(sounds, vec![Sound::Cloak, Sound::Decloak]);
        assert_eq!(rec.energy.borrow().as_slice(), &[(1000, 1000, 4, 8), (1000, 1000, 0, 8)]);

        tr.cloak(true, &scene, &mut audio);
        assert!(!tr.is_cloaked());
        assert_eq!(audio.played.len(), 2);
        assert_eq!(rec.energy.borrow().len(), 2);

        tr.add_cloak_energy();
        assert_eq!(tr.energy().cloak, 8);
        assert_eq!(rec.energy.borrow().len(), 3);
        assert_eq!(rec.energy.borrow()[2], (1000, 1000, 8, 8));

        assert!(tr.teleport(&scene, &mut audio));
        tr.reset_energy();
        assert_eq!(rec.energy.borrow().len(), 5);
        assert_eq!(rec.energy.borrow()[4], (1000, 1000, 8, 8));
    }
}
