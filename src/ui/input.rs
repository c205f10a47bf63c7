/// Keyboard state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Repeating attach/detach while `+`/`-` is held
///   - Edge-triggered one-shot actions (cloak, teleport, level keys)
///
/// Release events are honored when `Renderer::init` managed to enable
/// crossterm's keyboard enhancement. Other terminals fall back to
/// timeout-based release detection.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::demo::Action;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier handling.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }

    /// Actions for this frame. Held `+`/`-` repeat every frame.
    pub fn actions(&self) -> Vec<Action> {
        let mut out = Vec::new();
        if self.ctrl_c_pressed() {
            out.push(Action::Quit);
            return out;
        }
        if self.is_held(KeyCode::Char('+')) || self.is_held(KeyCode::Char('=')) {
            out.push(Action::Attach);
        }
        if self.is_held(KeyCode::Char('-')) {
            out.push(Action::Detach);
        }
        for code in &self.fresh_presses {
            if let Some(action) = key_action(*code) {
                out.push(action);
            }
        }
        out
    }
}

/// One-shot key bindings.
fn key_action(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char(c @ '0'..='4') => Action::Level(c as u32 - '0' as u32),
        KeyCode::Right | KeyCode::Char(']') => Action::NextLevel,
        KeyCode::Left | KeyCode::Char('[') => Action::PrevLevel,
        KeyCode::Char('d') | KeyCode::Char('D') => Action::Damage,
        KeyCode::Char('e') | KeyCode::Char('E') => Action::Charge,
        KeyCode::Char('c') | KeyCode::Char('C') => Action::Cloak,
        KeyCode::Char('t') | KeyCode::Char('T') => Action::Teleport,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Reset,
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => Action::Pause,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digit_keys_pick_levels() {
        assert_eq!(key_action(KeyCode::Char('3')), Some(Action::Level(3)));
        assert_eq!(key_action(KeyCode::Char('5')), None);
        assert_eq!(key_action(KeyCode::Esc), Some(Action::Quit));
    }

    #[test]
    fn repeat_press_is_not_fresh() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.record(press(KeyCode::Char('t')), now);
        input.record(press(KeyCode::Char('t')), now);
        assert_eq!(input.actions(), vec![Action::Teleport]);
    }

    #[test]
    fn held_plus_attaches() {
        let mut input = InputState::new();
        input.record(press(KeyCode::Char('+')), Instant::now());
        assert_eq!(input.actions(), vec![Action::Attach]);
    }

    #[test]
    fn ctrl_c_quits_before_anything_else() {
        let mut input = InputState::new();
        input.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert_eq!(input.actions(), vec![Action::Quit]);
    }

    #[test]
    fn release_honored_only_when_enabled() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.record(press(KeyCode::Char('-')), now);
        let mut release = press(KeyCode::Char('-'));
        release.kind = KeyEventKind::Release;
        input.record(release, now);
        assert!(input.is_held(KeyCode::Char('-')));

        input.honor_release = true;
        input.record(release, now);
        assert!(!input.is_held(KeyCode::Char('-')));
    }
}
