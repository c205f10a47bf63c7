/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad up / down       ->  Attach / Detach (held)
///   D-pad left / right    ->  Previous / next level
///   Left stick x          ->  Previous / next level
///   A / B                 ->  Attach / Detach
///   R1                    ->  Damage
///   X / Y                 ->  Cloak / Teleport
///   Start                 ->  Reset
///   Select                ->  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::sim::demo::Action;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
    Up,
    Down,
    Left,
    Right,
}

const BTN_COUNT: usize = 14;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            "UP" | "DPADUP" => Some(Btn::Up),
            "DOWN" | "DPADDOWN" => Some(Btn::Down),
            "LEFT" | "DPADLEFT" => Some(Btn::Left),
            "RIGHT" | "DPADRIGHT" => Some(Btn::Right),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            Button::DPadUp    => Some(Btn::Up),
            Button::DPadDown  => Some(Btn::Down),
            Button::DPadLeft  => Some(Btn::Left),
            Button::DPadRight => Some(Btn::Right),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    attach: Vec<Btn>,
    detach: Vec<Btn>,
    damage: Vec<Btn>,
    cloak: Vec<Btn>,
    teleport: Vec<Btn>,
    reset: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            attach:   vec![Btn::A],
            detach:   vec![Btn::B],
            damage:   vec![Btn::R1],
            cloak:    vec![Btn::X],
            teleport: vec![Btn::Y],
            reset:    vec![Btn::Start],
            quit:     vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],

    // Stick, reduced to a digital left/right for level stepping.
    stick_left: BtnState,
    stick_right: BtnState,
    stick_x: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    tracing::warn!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            stick_left: BtnState::default(),
            stick_right: BtnState::default(),
            stick_x: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Lists with no known names keep
    /// their defaults.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn apply(slot: &mut Vec<Btn>, names: &[String]) {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if !parsed.is_empty() {
                *slot = parsed;
            }
        }
        let map = &mut self.action_map;
        apply(&mut map.attach, &cfg.attach);
        apply(&mut map.detach, &cfg.detach);
        apply(&mut map.damage, &cfg.damage);
        apply(&mut map.cloak, &cfg.cloak);
        apply(&mut map.teleport, &cfg.teleport);
        apply(&mut map.reset, &cfg.reset);
        apply(&mut map.quit, &cfg.quit);
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    if let Some(b) = Btn::from_gilrs(btn) {
                        self.press(b);
                    }
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    if let Some(b) = Btn::from_gilrs(btn) {
                        self.buttons[btn_index(b)].held = false;
                    }
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    self.connected = true;
                    self.stick_x = value;
                }
                EventType::Connected => {
                    self.connected = true;
                    tracing::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                    tracing::info!("gamepad disconnected");
                }
                _ => {}
            }
        }

        let prev_left = self.stick_left.held;
        let prev_right = self.stick_right.held;
        self.stick_left.held = self.stick_x < -STICK_DEADZONE;
        self.stick_right.held = self.stick_x > STICK_DEADZONE;
        if self.stick_left.held && !prev_left { self.stick_left.just_pressed = true; }
        if self.stick_right.held && !prev_right { self.stick_right.just_pressed = true; }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn press(&mut self, btn: Btn) {
        let state = &mut self.buttons[btn_index(btn)];
        state.held = true;
        state.just_pressed = true;
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    fn held(&self, btn: Btn) -> bool {
        self.buttons[btn_index(btn)].held
    }

    /// Actions for this frame.
    pub fn actions(&self) -> Vec<Action> {
        let map = &self.action_map;
        let mut out = Vec::new();
        if self.any_just_pressed(&map.quit) {
            out.push(Action::Quit);
            return out;
        }
        if self.held(Btn::Up) || self.any_just_pressed(&map.attach) {
            out.push(Action::Attach);
        }
        if self.held(Btn::Down) || self.any_just_pressed(&map.detach) {
            out.push(Action::Detach);
        }
        let edges = [
            (&map.damage, Action::Damage),
            (&map.cloak, Action::Cloak),
            (&map.teleport, Action::Teleport),
            (&map.reset, Action::Reset),
        ];
        for (btns, action) in edges {
            if self.any_just_pressed(btns) {
                out.push(action);
            }
        }
        if self.any_just_pressed(&[Btn::Left]) || self.stick_left.just_pressed {
            out.push(Action::PrevLevel);
        }
        if self.any_just_pressed(&[Btn::Right]) || self.stick_right.just_pressed {
            out.push(Action::NextLevel);
        }
        out
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        self.stick_left.just_pressed = false;
        self.stick_right.just_pressed = false;
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons { *b = BtnState::default(); }
        self.stick_left = BtnState::default();
        self.stick_right = BtnState::default();
        self.stick_x = 0.0;
    }
}
