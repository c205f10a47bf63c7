/// HUD: the health and energy readouts under the trooper.
///
/// Registered with the trooper as both a health and an energy monitor.
/// The renderer only ever reads the last reported values; it never asks the
/// trooper directly.

use std::cell::Cell;

use crate::domain::energy::EnergyLevels;
use crate::domain::monitor::{EnergyMonitor, HealthMonitor};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct HealthReading {
    pub health: u32,
    pub mid: u32,
    pub max: u32,
}

#[derive(Default)]
pub struct Hud {
    health: Cell<HealthReading>,
    energy: Cell<EnergyLevels>,
}

impl Hud {
    pub fn health(&self) -> HealthReading {
        self.health.get()
    }

    pub fn energy(&self) -> EnergyLevels {
        self.energy.get()
    }
}

impl HealthMonitor for Hud {
    fn health_updated(&self, health: u32, mid: u32, max: u32) {
        self.health.set(HealthReading { health, mid, max });
    }
}

impl EnergyMonitor for Hud {
    fn energy_updated(&self, teleport: u32, teleport_max: u32, cloak: u32, cloak_max: u32) {
        self.energy.set(EnergyLevels { teleport, teleport_max, cloak, cloak_max });
    }
}

/// Fixed-width text gauge, e.g. `[#####.....]`.
/// A `mark` position (the level's starting health) is drawn as `|` when it
/// falls on an empty slot.
pub fn bar(value: u32, max: u32, width: usize, mark: Option<u32>) -> String {
    let filled = if max == 0 { 0 } else { (value.min(max) as usize * width) / max as usize };
    let mark_at = match mark {
        Some(m) if max > 0 => Some(((m.min(max) as usize * width) / max as usize).min(width.saturating_sub(1))),
        _ => None,
    };
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        let c = if i < filled {
            '#'
        } else if Some(i) == mark_at {
            '|'
        } else {
            '.'
        };
        s.push(c);
    }
    s.push(']');
    s
}
