/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing, unreadable or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

// ── Public Config Struct ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub energy: EnergyConfig,
    pub demo: DemoConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnergyConfig {
    pub cloak_max: u32,
    pub teleport_max: u32,
    pub cloak_gain: u32,   // per add_cloak_energy()
    pub cloak_drain: u32,  // per tick while cloaked
    pub teleport_regen: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DemoConfig {
    pub tick_rate_ms: u64,
    pub start_level: u32,
    pub spin_speed: f32, // degrees per second
    pub tilt: f32,       // degrees, applied once about x and z
    pub regen_ticks: u32,
    pub damage: u32,     // cells lost per hit
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    pub attach: Vec<String>,
    pub detach: Vec<String>,
    pub damage: Vec<String>,
    pub cloak: Vec<String>,
    pub teleport: Vec<String>,
    pub reset: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    energy: TomlEnergy,
    #[serde(default)]
    demo: TomlDemo,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlEnergy {
    #[serde(default = "default_energy_max")]
    cloak_max: u32,
    #[serde(default = "default_energy_max")]
    teleport_max: u32,
    #[serde(default = "default_cloak_gain")]
    cloak_gain: u32,
    #[serde(default = "default_cloak_drain")]
    cloak_drain: u32,
    #[serde(default = "default_teleport_regen")]
    teleport_regen: u32,
}

#[derive(Deserialize, Debug)]
struct TomlDemo {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    start_level: u32,
    #[serde(default = "default_spin_speed")]
    spin_speed: f32,
    #[serde(default = "default_tilt")]
    tilt: f32,
    #[serde(default = "default_regen_ticks")]
    regen_ticks: u32,
    #[serde(default = "default_damage")]
    damage: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_attach")]
    attach: Vec<String>,
    #[serde(default = "default_detach")]
    detach: Vec<String>,
    #[serde(default = "default_damage_buttons")]
    damage: Vec<String>,
    #[serde(default = "default_cloak")]
    cloak: Vec<String>,
    #[serde(default = "default_teleport")]
    teleport: Vec<String>,
    #[serde(default = "default_reset")]
    reset: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_energy_max() -> u32 { 1000 }
fn default_cloak_gain() -> u32 { 100 }
fn default_cloak_drain() -> u32 { 4 }
fn default_teleport_regen() -> u32 { 1 }   // full charge after 1000 ticks

fn default_tick_rate() -> u64 { 50 }
fn default_spin_speed() -> f32 { 25.0 }
fn default_tilt() -> f32 { 15.0 }
fn default_regen_ticks() -> u32 { 20 }      // divided by 2L+1 per level
fn default_damage() -> u32 { 5 }

fn default_attach() -> Vec<String> { vec!["A".into()] }
fn default_detach() -> Vec<String> { vec!["B".into()] }
fn default_damage_buttons() -> Vec<String> { vec!["R1".into()] }
fn default_cloak() -> Vec<String> { vec!["X".into()] }
fn default_teleport() -> Vec<String> { vec!["Y".into()] }
fn default_reset() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlEnergy {
    fn default() -> Self {
        TomlEnergy {
            cloak_max: default_energy_max(),
            teleport_max: default_energy_max(),
            cloak_gain: default_cloak_gain(),
            cloak_drain: default_cloak_drain(),
            teleport_regen: default_teleport_regen(),
        }
    }
}

impl Default for TomlDemo {
    fn default() -> Self {
        TomlDemo {
            tick_rate_ms: default_tick_rate(),
            start_level: 0,
            spin_speed: default_spin_speed(),
            tilt: default_tilt(),
            regen_ticks: default_regen_ticks(),
            damage: default_damage(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            attach: default_attach(),
            detach: default_detach(),
            damage: default_damage_buttons(),
            cloak: default_cloak(),
            teleport: default_teleport(),
            reset: default_reset(),
            quit: default_quit(),
        }
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        TomlEnergy::default().into()
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        TomlDemo::default().into()
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        TomlGamepad::default().into()
    }
}

impl From<TomlEnergy> for EnergyConfig {
    fn from(t: TomlEnergy) -> Self {
        EnergyConfig {
            cloak_max: t.cloak_max,
            teleport_max: t.teleport_max,
            cloak_gain: t.cloak_gain,
            cloak_drain: t.cloak_drain,
            teleport_regen: t.teleport_regen,
        }
    }
}

impl From<TomlDemo> for DemoConfig {
    fn from(t: TomlDemo) -> Self {
        DemoConfig {
            tick_rate_ms: t.tick_rate_ms.max(1),
            start_level: t.start_level,
            spin_speed: t.spin_speed,
            tilt: t.tilt,
            regen_ticks: t.regen_ticks,
            damage: t.damage,
        }
    }
}

impl From<TomlGamepad> for GamepadConfig {
    fn from(t: TomlGamepad) -> Self {
        GamepadConfig {
            attach: t.attach,
            detach: t.detach,
            damage: t.damage,
            cloak: t.cloak,
            teleport: t.teleport,
            reset: t.reset,
            quit: t.quit,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file, bad file or missing keys fall back to defaults.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match Self::read(&path) {
                Ok(cfg) => {
                    info!(path = %path.display(), "config loaded");
                    return cfg;
                }
                Err(e) => {
                    warn!("{e}; using default settings");
                    return GameConfig::default();
                }
            }
        }
        GameConfig::default()
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let t: TomlConfig = toml::from_str(text)?;
        Ok(GameConfig {
            energy: t.energy.into(),
            demo: t.demo.into(),
            gamepad: t.gamepad.into(),
        })
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}
