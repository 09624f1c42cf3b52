//! Keyboard input state

use std::collections::HashSet;
use std::fmt;

/// Key code using the GLFW numbering scripts are written against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const SPACE: KeyCode = KeyCode(32);
    pub const APOSTROPHE: KeyCode = KeyCode(39);
    pub const COMMA: KeyCode = KeyCode(44);
    pub const MINUS: KeyCode = KeyCode(45);
    pub const PERIOD: KeyCode = KeyCode(46);
    pub const SLASH: KeyCode = KeyCode(47);

    pub const D0: KeyCode = KeyCode(48);
    pub const D1: KeyCode = KeyCode(49);
    pub const D2: KeyCode = KeyCode(50);
    pub const D3: KeyCode = KeyCode(51);
    pub const D4: KeyCode = KeyCode(52);
    pub const D5: KeyCode = KeyCode(53);
    pub const D6: KeyCode = KeyCode(54);
    pub const D7: KeyCode = KeyCode(55);
    pub const D8: KeyCode = KeyCode(56);
    pub const D9: KeyCode = KeyCode(57);

    pub const A: KeyCode = KeyCode(65);
    pub const B: KeyCode = KeyCode(66);
    pub const C: KeyCode = KeyCode(67);
    pub const D: KeyCode = KeyCode(68);
    pub const E: KeyCode = KeyCode(69);
    pub const F: KeyCode = KeyCode(70);
    pub const G: KeyCode = KeyCode(71);
    pub const H: KeyCode = KeyCode(72);
    pub const I: KeyCode = KeyCode(73);
    pub const J: KeyCode = KeyCode(74);
    pub const K: KeyCode = KeyCode(75);
    pub const L: KeyCode = KeyCode(76);
    pub const M: KeyCode = KeyCode(77);
    pub const N: KeyCode = KeyCode(78);
    pub const O: KeyCode = KeyCode(79);
    pub const P: KeyCode = KeyCode(80);
    pub const Q: KeyCode = KeyCode(81);
    pub const R: KeyCode = KeyCode(82);
    pub const S: KeyCode = KeyCode(83);
    pub const T: KeyCode = KeyCode(84);
    pub const U: KeyCode = KeyCode(85);
    pub const V: KeyCode = KeyCode(86);
    pub const W: KeyCode = KeyCode(87);
    pub const X: KeyCode = KeyCode(88);
    pub const Y: KeyCode = KeyCode(89);
    pub const Z: KeyCode = KeyCode(90);

    pub const ESCAPE: KeyCode = KeyCode(256);
    pub const ENTER: KeyCode = KeyCode(257);
    pub const TAB: KeyCode = KeyCode(258);
    pub const BACKSPACE: KeyCode = KeyCode(259);
    pub const INSERT: KeyCode = KeyCode(260);
    pub const DELETE: KeyCode = KeyCode(261);
    pub const RIGHT: KeyCode = KeyCode(262);
    pub const LEFT: KeyCode = KeyCode(263);
    pub const DOWN: KeyCode = KeyCode(264);
    pub const UP: KeyCode = KeyCode(265);

    pub const F1: KeyCode = KeyCode(290);
    pub const F12: KeyCode = KeyCode(301);

    pub const LEFT_SHIFT: KeyCode = KeyCode(340);
    pub const LEFT_CONTROL: KeyCode = KeyCode(341);
    pub const LEFT_ALT: KeyCode = KeyCode(342);
    pub const RIGHT_SHIFT: KeyCode = KeyCode(344);
    pub const RIGHT_CONTROL: KeyCode = KeyCode(345);
    pub const RIGHT_ALT: KeyCode = KeyCode(346);
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything that can answer "is this key held right now".
pub trait InputSource {
    fn is_key_pressed(&self, key: KeyCode) -> bool;
}

/// Key state fed by the windowing layer (or by tests).
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl InputSource for KeyboardState {
    fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut keyboard = KeyboardState::new();
        keyboard.press(KeyCode::W);
        keyboard.press(KeyCode::SPACE);
        assert!(keyboard.is_key_pressed(KeyCode::W));
        assert!(!keyboard.is_key_pressed(KeyCode::S));

        keyboard.release(KeyCode::W);
        assert!(!keyboard.is_key_pressed(KeyCode::W));
        assert!(keyboard.is_key_pressed(KeyCode::SPACE));

        keyboard.clear();
        assert!(!keyboard.is_key_pressed(KeyCode::SPACE));
    }

    #[test]
    fn glfw_numbering() {
        assert_eq!(KeyCode::A.0, 65);
        assert_eq!(KeyCode::Z.0, 90);
        assert_eq!(KeyCode::ESCAPE.0, 256);
        assert_eq!(KeyCode::UP.0, 265);
    }
}
