use std::collections::{HashMap, HashSet};

use glam::Vec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Function(u8),
}

impl KeyCode {
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(Self::Character(ch.to_ascii_uppercase()));
            }
            if ch.is_ascii_digit() {
                return Some(Self::Digit(ch as u8 - b'0'));
            }
        }
        if let Some(function) = name.strip_prefix('F').or_else(|| name.strip_prefix('f')) {
            if let Ok(index) = function.parse::<u8>() {
                if (1..=25).contains(&index) {
                    return Some(Self::Function(index));
                }
            }
        }
        None
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Space" => Space,
        "Enter" | "Return" => Enter,
        "Tab" => Tab,
        "Left" => Left,
        "Right" => Right,
        "Up" => Up,
        "Down" => Down,
        "Escape" | "Esc" => Escape,
        "Backspace" => Backspace,
        "LeftShift" | "LShift" | "Shift" => LeftShift,
        "RightShift" | "RShift" => RightShift,
        "LeftCtrl" | "LControl" => LeftCtrl,
        "RightCtrl" | "RControl" => RightCtrl,
        "LeftAlt" | "LAlt" => LeftAlt,
        "RightAlt" | "RAlt" => RightAlt,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

/// Friendly names for the non-character keys the game binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// A key or mouse button an action can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputName {
    Key(KeyCode),
    Mouse(MouseButton),
}

impl InputName {
    /// Parses `"W"`, `"Space"`, `"F3"` or `"Mouse1"` style names.
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(button) = parse_mouse_button(name) {
            return Some(Self::Mouse(button));
        }
        KeyCode::from_name(name).map(Self::Key)
    }
}

fn parse_mouse_button(name: &str) -> Option<MouseButton> {
    let prefix = name.get(..5)?;
    if !prefix.eq_ignore_ascii_case("mouse") {
        return None;
    }
    let suffix = &name[5..];
    if suffix.is_empty() {
        return Some(MouseButton::LEFT);
    }
    let index = suffix.parse::<u8>().ok()?;
    Some(MouseButton::new(index.saturating_sub(1)))
}

/// Thread-safe input snapshot shared between the window and the game loop.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
    mouse_buttons: RwLock<HashSet<MouseButton>>,
    mouse_position: RwLock<Vec2>,
    mouse_delta: RwLock<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&self, key: KeyCode) {
        self.keys.write().insert(key);
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    pub fn set_mouse_button_down(&self, button: MouseButton) {
        self.mouse_buttons.write().insert(button);
    }

    pub fn set_mouse_button_up(&self, button: MouseButton) {
        self.mouse_buttons.write().remove(&button);
    }

    pub fn set_mouse_position(&self, position: Vec2) {
        *self.mouse_position.write() = position;
    }

    /// Accumulates relative motion reported while the pointer is locked.
    pub fn add_mouse_delta(&self, delta: Vec2) {
        *self.mouse_delta.write() += delta;
    }

    /// Returns the motion accumulated since the last call and clears it.
    pub fn take_mouse_delta(&self) -> Vec2 {
        std::mem::take(&mut *self.mouse_delta.write())
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.read().contains(&key)
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.read().contains(&button)
    }

    pub fn is_down(&self, input: InputName) -> bool {
        match input {
            InputName::Key(key) => self.is_key_down(key),
            InputName::Mouse(button) => self.is_mouse_button_down(button),
        }
    }

    pub fn is_key_down_by_name(&self, name: &str) -> bool {
        InputName::parse(name).is_some_and(|input| self.is_down(input))
    }

    pub fn mouse_position(&self) -> Vec2 {
        *self.mouse_position.read()
    }

    /// Releases every key and button, e.g. when the window loses focus.
    pub fn clear(&self) {
        self.keys.write().clear();
        self.mouse_buttons.write().clear();
        *self.mouse_delta.write() = Vec2::ZERO;
    }
}

/// Game-level actions produced from raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Jump,
    Sprint,
    Shoot,
    Start,
    LookLeft,
    LookRight,
    LookUp,
    LookDown,
}

impl Action {
    pub const ALL: [Action; 12] = [
        Action::MoveForward,
        Action::MoveBack,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Sprint,
        Action::Shoot,
        Action::Start,
        Action::LookLeft,
        Action::LookRight,
        Action::LookUp,
        Action::LookDown,
    ];

    /// Tag used for the action in level `<controls>` blocks.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let action = match tag {
            "forward" => Action::MoveForward,
            "back" => Action::MoveBack,
            "left" => Action::MoveLeft,
            "right" => Action::MoveRight,
            "jump" => Action::Jump,
            "sprint" => Action::Sprint,
            "shoot" => Action::Shoot,
            "start" => Action::Start,
            "look_left" => Action::LookLeft,
            "look_right" => Action::LookRight,
            "look_up" => Action::LookUp,
            "look_down" => Action::LookDown,
            _ => return None,
        };
        Some(action)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown key or button name {0:?}")]
    UnknownName(String),
    #[error("unknown action <{0}>")]
    UnknownAction(String),
}

/// Maps each action to the keys and buttons that trigger it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bindings {
    map: HashMap<Action, Vec<InputName>>,
}

impl Default for Bindings {
    fn default() -> Self {
        let defaults: [(Action, &[&str]); 12] = [
            (Action::MoveForward, &["W"]),
            (Action::MoveBack, &["S"]),
            (Action::MoveLeft, &["A"]),
            (Action::MoveRight, &["D"]),
            (Action::Jump, &["Space"]),
            (Action::Sprint, &["LeftShift"]),
            (Action::Shoot, &["Mouse1", "F"]),
            (Action::Start, &["Enter"]),
            (Action::LookLeft, &["Q", "Left"]),
            (Action::LookRight, &["E", "Right"]),
            (Action::LookUp, &["Up"]),
            (Action::LookDown, &["Down"]),
        ];
        let map = defaults
            .into_iter()
            .map(|(action, names)| {
                let inputs = names.iter().filter_map(|name| InputName::parse(name)).collect();
                (action, inputs)
            })
            .collect();
        Self { map }
    }
}

impl Bindings {
    /// Replaces the inputs bound to `action` with a whitespace separated list of names.
    pub fn rebind(&mut self, action: Action, names: &str) -> Result<(), InputError> {
        let inputs = names
            .split_whitespace()
            .map(|name| InputName::parse(name).ok_or_else(|| InputError::UnknownName(name.into())))
            .collect::<Result<Vec<_>, _>>()?;
        self.map.insert(action, inputs);
        Ok(())
    }

    /// Like [`Bindings::rebind`] but looks the action up by its level tag.
    pub fn rebind_tag(&mut self, tag: &str, names: &str) -> Result<(), InputError> {
        let action = Action::from_tag(tag).ok_or_else(|| InputError::UnknownAction(tag.into()))?;
        self.rebind(action, names)
    }

    pub fn inputs(&self, action: Action) -> &[InputName] {
        self.map.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_active(&self, input: &InputState, action: Action) -> bool {
        self.inputs(action).iter().any(|name| input.is_down(*name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_character_keys() {
        assert_eq!(
            KeyCode::from_name("Space"),
            Some(KeyCode::Named(NamedKey::Space))
        );
        assert_eq!(KeyCode::from_name("a"), Some(KeyCode::Character('A')));
        assert_eq!(KeyCode::from_name("F12"), Some(KeyCode::Function(12)));
        assert_eq!(KeyCode::from_name("F"), Some(KeyCode::Character('F')));
        assert_eq!(KeyCode::from_name("Banana"), None);
    }

    #[test]
    fn mouse_names_are_supported() {
        assert_eq!(
            InputName::parse("Mouse1"),
            Some(InputName::Mouse(MouseButton::LEFT))
        );
        assert_eq!(
            InputName::parse("mouse3"),
            Some(InputName::Mouse(MouseButton::new(2)))
        );
    }

    #[test]
    fn input_state_tracks_keys() {
        let state = InputState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Space));
        assert!(state.is_key_down_by_name("Space"));
        state.set_key_up(KeyCode::Named(NamedKey::Space));
        assert!(!state.is_key_down_by_name("Space"));
    }

    #[test]
    fn mouse_delta_is_consumed() {
        let state = InputState::new();
        state.add_mouse_delta(Vec2::new(3.0, -1.0));
        state.add_mouse_delta(Vec2::new(1.0, 1.0));
        assert_eq!(state.take_mouse_delta(), Vec2::new(4.0, 0.0));
        assert_eq!(state.take_mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn default_bindings_cover_every_action() {
        let bindings = Bindings::default();
        for action in Action::ALL {
            assert!(!bindings.inputs(action).is_empty(), "{action:?}");
        }
        let state = InputState::new();
        state.set_mouse_button_down(MouseButton::LEFT);
        assert!(bindings.is_active(&state, Action::Shoot));
        assert!(!bindings.is_active(&state, Action::Jump));
    }

    #[test]
    fn rebind_rejects_unknown_names() {
        let mut bindings = Bindings::default();
        bindings.rebind_tag("jump", "J Mouse2").unwrap();
        assert_eq!(bindings.inputs(Action::Jump).len(), 2);
        assert_eq!(
            bindings.rebind_tag("jump", "Banana"),
            Err(InputError::UnknownName("Banana".into()))
        );
        assert_eq!(
            bindings.rebind_tag("dance", "J"),
            Err(InputError::UnknownAction("dance".into()))
        );
    }
}
