/// Demo: a single trooper spinning in an otherwise empty scene.
///
/// The trooper hangs off a holder part tilted 15 degrees about x and z.
/// Every tick the holder spins about its y axis, energy is updated, and on
/// a level-dependent cadence a cell regenerates. Bigger troopers regenerate
/// faster so every level fills in a similar time.
///
/// ## Actions
///
/// Input layers translate keys and buttons into `Action`s; `apply` is the
/// only place the demo reacts to them.

use std::rc::Rc;

use glam::Vec3;
use tracing::{debug, info};

use crate::config::{DemoConfig, EnergyConfig, GameConfig};
use crate::domain::energy::EnergyLevels;
use crate::domain::monitor::{EnergyMonitor, HealthMonitor};
use crate::domain::part::{Audio, Axis, PartId, Scene};
use crate::domain::trooper::Trooper;
use crate::sim::scene::SceneGraph;
use crate::ui::hud::Hud;

pub const MAX_LEVEL: u32 = 4;

/// Holder alpha while cloaked.
const CLOAK_ALPHA: f32 = 0.3;

/// Where a teleport can land, visited in turn.
const TELEPORT_SPOTS: [Vec3; 4] = [
    Vec3::new(0.6, 0.0, 0.0),
    Vec3::new(0.0, 0.4, 0.0),
    Vec3::new(-0.6, 0.0, 0.0),
    Vec3::ZERO,
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Attach,
    Detach,
    Damage,
    Charge,
    Cloak,
    Teleport,
    Reset,
    Level(u32),
    NextLevel,
    PrevLevel,
    Pause,
    Quit,
}

pub struct Demo {
    pub scene: SceneGraph,
    holder: PartId,
    trooper: Trooper,
    hud: Rc<Hud>,
    cfg: DemoConfig,
    energy: EnergyConfig,
    pub tick: u64,
    pub paused: bool,
    pub quit: bool,
    pub message: String,
    teleports: usize,
}

impl Demo {
    pub fn new(config: &GameConfig) -> Self {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let holder = scene.add_part(root);
        let level = config.demo.start_level.min(MAX_LEVEL);
        let trooper = Trooper::new(&mut scene, holder, level, &config.energy);
        let mut demo = Demo {
            scene,
            holder,
            trooper,
            hud: Rc::new(Hud::default()),
            cfg: config.demo.clone(),
            energy: config.energy.clone(),
            tick: 0,
            paused: false,
            quit: false,
            message: String::new(),
            teleports: 0,
        };
        demo.mount();
        demo
    }

    pub fn trooper(&self) -> &Trooper {
        &self.trooper
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn level(&self) -> u32 {
        self.trooper.level()
    }

    /// Replace the trooper with a fresh one for `level`.
    pub fn show_level(&mut self, level: u32) {
        let level = level.min(MAX_LEVEL);
        let root = self.scene.root();
        let holder = self.scene.add_part(root);
        let fresh = Trooper::new(&mut self.scene, holder, level, &self.energy);
        std::mem::replace(&mut self.trooper, fresh).discard(&mut self.scene);
        self.scene.rem_part(std::mem::replace(&mut self.holder, holder));

        self.teleports = 0;
        self.mount();
        self.message = format!("Level {level}");
        info!(level, "showing level");
    }

    /// Tilt the new holder and hook the HUD up to the new trooper.
    fn mount(&mut self) {
        self.scene.rotate(self.holder, Axis::X, self.cfg.tilt);
        self.scene.rotate(self.holder, Axis::Z, self.cfg.tilt);

        let health: Rc<dyn HealthMonitor> = self.hud.clone();
        let energy: Rc<dyn EnergyMonitor> = self.hud.clone();
        self.trooper.monitor_health("hud", health);
        self.trooper.monitor_energy("hud", energy);

        // Monitors only hear about changes; seed the current values.
        let h = self.trooper.health();
        self.hud.health_updated(h.current, h.mid, h.max);
        let EnergyLevels { teleport, teleport_max, cloak, cloak_max } = self.trooper.energy();
        self.hud.energy_updated(teleport, teleport_max, cloak, cloak_max);
    }

    /// Ticks between regenerated cells at the current level.
    pub fn regen_every(&self) -> u64 {
        let level = self.trooper.level();
        u64::from((self.cfg.regen_ticks / (2 * level + 1)).max(1))
    }

    /// Advance one fixed tick.
    pub fn step(&mut self, audio: &mut dyn Audio) {
        if self.paused {
            return;
        }
        self.tick += 1;

        if self.cfg.regen_ticks > 0 && self.tick % self.regen_every() == 0 {
            self.trooper.attach(&mut self.scene);
        }
        self.trooper.update_energy(&self.scene, audio);

        let dt = self.cfg.tick_rate_ms as f32 / 1000.0;
        self.scene.rotate(self.holder, Axis::Y, dt * self.cfg.spin_speed);
        let alpha = if self.trooper.is_cloaked() { CLOAK_ALPHA } else { 1.0 };
        self.scene.set_alpha(self.holder, alpha);
    }

    pub fn apply(&mut self, action: Action, audio: &mut dyn Audio) {
        debug!(?action, "demo action");
        match action {
            Action::Attach => {
                if !self.trooper.attach(&mut self.scene) {
                    self.message = "Full health".into();
                }
            }
            Action::Detach => {
                if !self.trooper.detach(&mut self.scene) {
                    self.message = "No cells left".into();
                }
            }
            Action::Damage => {
                self.trooper.detach_cores(&mut self.scene, self.cfg.damage);
                self.message = format!("Hit! -{}", self.cfg.damage);
            }
            Action::Charge => self.trooper.add_cloak_energy(),
            Action::Cloak => {
                let on = !self.trooper.is_cloaked();
                self.trooper.cloak(on, &self.scene, audio);
                if on && !self.trooper.is_cloaked() {
                    self.message = "Cloak energy empty".into();
                }
            }
            Action::Teleport => {
                if self.trooper.teleport(&self.scene, audio) {
                    let spot = TELEPORT_SPOTS[self.teleports % TELEPORT_SPOTS.len()];
                    self.teleports += 1;
                    self.trooper.set_loc(&mut self.scene, spot);
                    self.message = "Teleported".into();
                } else {
                    self.message = "Teleport charging".into();
                }
            }
            Action::Reset => {
                self.trooper.reset(&mut self.scene);
                self.trooper.reset_energy();
                self.message = "Reset".into();
            }
            Action::Level(n) => self.show_level(n),
            Action::NextLevel => self.show_level((self.level() + 1).min(MAX_LEVEL)),
            Action::PrevLevel => self.show_level(self.level().saturating_sub(1)),
            Action::Pause => self.paused = !self.paused,
            Action::Quit => self.quit = true,
        }
    }
}
