/// Cloak and teleport energy.
///
/// Two independent counters:
///   - teleport refills by a small step every tick and can only be spent
///     all at once, when full.
///   - cloak drains every tick while cloaked and is topped up by game
///     events. The cloak drops automatically when it runs dry.
///
/// Both counters saturate instead of failing.

use crate::config::EnergyConfig;

/// Snapshot reported to energy monitors.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EnergyLevels {
    pub teleport: u32,
    pub teleport_max: u32,
    pub cloak: u32,
    pub cloak_max: u32,
}

/// What one update tick did.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EnergyTick {
    pub changed: bool,
    /// The cloak was on and just ran out.
    pub depleted: bool,
}

#[derive(Clone, Debug)]
pub struct Energy {
    cfg: EnergyConfig,
    cloak: u32,
    teleport: u32,
    cloaked: bool,
}

impl Energy {
    /// Both counters start full.
    pub fn new(cfg: &EnergyConfig) -> Self {
        let mut e = Energy { cfg: cfg.clone(), cloak: 0, teleport: 0, cloaked: false };
        e.reset();
        e
    }

    /// Start-of-level refill.
    pub fn reset(&mut self) {
        self.teleport = self.cfg.teleport_max;
        self.cloak = self.cfg.cloak_max;
    }

    pub fn levels(&self) -> EnergyLevels {
        EnergyLevels {
            teleport: self.teleport,
            teleport_max: self.cfg.teleport_max,
            cloak: self.cloak.min(self.cfg.cloak_max),
            cloak_max: self.cfg.cloak_max,
        }
    }

    pub fn is_cloaked(&self) -> bool {
        self.cloaked
    }

    /// Try to switch the cloak on or off. Turning it on needs some energy.
    /// Returns whether the cloak state was applied.
    pub fn set_cloaked(&mut self, on: bool) -> bool {
        if on && self.cloak == 0 {
            return false;
        }
        self.cloaked = on;
        true
    }

    /// Reward from a game event.
    pub fn add_cloak(&mut self) {
        self.cloak = self.cloak.saturating_add(self.cfg.cloak_gain).min(self.cfg.cloak_max);
    }

    /// Spend a full teleport charge. Fails, leaving the counter alone,
    /// unless the charge is full.
    pub fn spend_teleport(&mut self) -> bool {
        if self.teleport < self.cfg.teleport_max {
            return false;
        }
        self.teleport = 0;
        true
    }

    pub fn tick(&mut self) -> EnergyTick {
        let mut tick = EnergyTick::default();

        if self.teleport < self.cfg.teleport_max {
            self.teleport = self.teleport.saturating_add(self.cfg.teleport_regen).min(self.cfg.teleport_max);
            tick.changed = true;
        }

        if self.cloaked {
            tick.changed = true;
            self.cloak = self.cloak.saturating_sub(self.cfg.cloak_drain);
            if self.cloak == 0 {
                self.cloaked = false;
                tick.depleted = true;
            }
        }
        tick
    }
}
