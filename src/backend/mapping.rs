//! Static translation tables from native codes to canonical values
//!
//! [`sdl`] covers the event-driven backend (SDL2 keycodes and game controller
//! indices), [`glfw`] the poll-and-diff backend (GLFW key, mouse and gamepad
//! indices). Lookups return `None` for codes without a canonical counterpart.

use crate::event::{ControllerAxis, DpadState};

/// Maps a trigger from the native `[-1, 1]` range onto `[0, 1]`
pub fn renormalize_trigger(raw: f32) -> f32 {
    (raw + 1.0) / 2.0
}

/// Applies trigger renormalization when `axis` is a trigger
pub fn axis_value(axis: ControllerAxis, raw: f32) -> f32 {
    if axis.is_trigger() {
        renormalize_trigger(raw)
    } else {
        raw
    }
}

/// Hat position `(x, y)` with `x` right-positive and `y` up-positive
pub fn hat_to_dpad(hat: (i8, i8)) -> Option<DpadState> {
    match hat {
        (0, 0) => Some(DpadState::Neutral),
        (0, 1) => Some(DpadState::Up),
        (0, -1) => Some(DpadState::Down),
        (-1, 0) => Some(DpadState::Left),
        (1, 0) => Some(DpadState::Right),
        (-1, 1) => Some(DpadState::UpLeft),
        (1, 1) => Some(DpadState::UpRight),
        (-1, -1) => Some(DpadState::DownLeft),
        (1, -1) => Some(DpadState::DownRight),
        _ => None,
    }
}

/// Direction of a single d-pad button expressed as a hat offset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DpadDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Held d-pad directions folded into one hat position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DpadButtons {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl DpadButtons {
    pub fn set(&mut self, direction: DpadDirection, pressed: bool) {
        match direction {
            DpadDirection::Up => self.up = pressed,
            DpadDirection::Down => self.down = pressed,
            DpadDirection::Left => self.left = pressed,
            DpadDirection::Right => self.right = pressed,
        }
    }

    /// Opposite directions cancel out
    pub fn hat(&self) -> (i8, i8) {
        let x = i8::from(self.right) - i8::from(self.left);
        let y = i8::from(self.up) - i8::from(self.down);
        (x, y)
    }
}

pub mod sdl {
    use super::DpadDirection;
    use crate::event::{ControllerAxis, ControllerButton, Key, MouseButton};

    pub const SDLK_BACKSPACE: i32 = 8;
    pub const SDLK_TAB: i32 = 9;
    pub const SDLK_RETURN: i32 = 13;
    pub const SDLK_ESCAPE: i32 = 27;
    pub const SDLK_SPACE: i32 = 32;
    pub const SDLK_A: i32 = 97;
    pub const SDLK_Z: i32 = 122;
    pub const SDLK_RIGHT: i32 = 0x4000_004F;
    pub const SDLK_LEFT: i32 = 0x4000_0050;
    pub const SDLK_DOWN: i32 = 0x4000_0051;
    pub const SDLK_UP: i32 = 0x4000_0052;
    pub const SDLK_LCTRL: i32 = 0x4000_00E0;
    pub const SDLK_LSHIFT: i32 = 0x4000_00E1;
    pub const SDLK_LALT: i32 = 0x4000_00E2;
    pub const SDLK_RCTRL: i32 = 0x4000_00E4;
    pub const SDLK_RSHIFT: i32 = 0x4000_00E5;
    pub const SDLK_RALT: i32 = 0x4000_00E6;

    pub const BUTTON_LEFT: u8 = 1;
    pub const BUTTON_MIDDLE: u8 = 2;
    pub const BUTTON_RIGHT: u8 = 3;
    pub const BUTTON_X1: u8 = 4;
    pub const BUTTON_X2: u8 = 5;

    pub const CONTROLLER_BUTTON_A: u8 = 0;
    pub const CONTROLLER_BUTTON_B: u8 = 1;
    pub const CONTROLLER_BUTTON_X: u8 = 2;
    pub const CONTROLLER_BUTTON_Y: u8 = 3;
    pub const CONTROLLER_BUTTON_BACK: u8 = 4;
    pub const CONTROLLER_BUTTON_GUIDE: u8 = 5;
    pub const CONTROLLER_BUTTON_START: u8 = 6;
    pub const CONTROLLER_BUTTON_LEFTSTICK: u8 = 7;
    pub const CONTROLLER_BUTTON_RIGHTSTICK: u8 = 8;
    pub const CONTROLLER_BUTTON_LEFTSHOULDER: u8 = 9;
    pub const CONTROLLER_BUTTON_RIGHTSHOULDER: u8 = 10;
    pub const CONTROLLER_BUTTON_DPAD_UP: u8 = 11;
    pub const CONTROLLER_BUTTON_DPAD_DOWN: u8 = 12;
    pub const CONTROLLER_BUTTON_DPAD_LEFT: u8 = 13;
    pub const CONTROLLER_BUTTON_DPAD_RIGHT: u8 = 14;

    pub const CONTROLLER_AXIS_LEFTX: u8 = 0;
    pub const CONTROLLER_AXIS_LEFTY: u8 = 1;
    pub const CONTROLLER_AXIS_RIGHTX: u8 = 2;
    pub const CONTROLLER_AXIS_RIGHTY: u8 = 3;
    pub const CONTROLLER_AXIS_TRIGGERLEFT: u8 = 4;
    pub const CONTROLLER_AXIS_TRIGGERRIGHT: u8 = 5;

    pub fn key(code: i32) -> Option<Key> {
        if (SDLK_A..=SDLK_Z).contains(&code) {
            let index = (code - SDLK_A) as usize;
            return Key::ALL.get(index).copied();
        }
        match code {
            SDLK_SPACE => Some(Key::Space),
            SDLK_RETURN => Some(Key::Enter),
            SDLK_LSHIFT | SDLK_RSHIFT => Some(Key::Shift),
            SDLK_LCTRL | SDLK_RCTRL => Some(Key::Ctrl),
            SDLK_LALT | SDLK_RALT => Some(Key::Alt),
            SDLK_ESCAPE => Some(Key::Esc),
            SDLK_TAB => Some(Key::Tab),
            SDLK_BACKSPACE => Some(Key::Backspace),
            SDLK_UP => Some(Key::Up),
            SDLK_DOWN => Some(Key::Down),
            SDLK_LEFT => Some(Key::Left),
            SDLK_RIGHT => Some(Key::Right),
            _ => None,
        }
    }

    pub fn mouse_button(button: u8) -> Option<MouseButton> {
        match button {
            BUTTON_LEFT => Some(MouseButton::Left),
            BUTTON_MIDDLE => Some(MouseButton::Middle),
            BUTTON_RIGHT => Some(MouseButton::Right),
            BUTTON_X1 => Some(MouseButton::Button4),
            BUTTON_X2 => Some(MouseButton::Button5),
            _ => None,
        }
    }

    pub fn controller_button(button: u8) -> Option<ControllerButton> {
        match button {
            CONTROLLER_BUTTON_A => Some(ControllerButton::A),
            CONTROLLER_BUTTON_B => Some(ControllerButton::B),
            CONTROLLER_BUTTON_X => Some(ControllerButton::X),
            CONTROLLER_BUTTON_Y => Some(ControllerButton::Y),
            CONTROLLER_BUTTON_LEFTSHOULDER => Some(ControllerButton::LB),
            CONTROLLER_BUTTON_RIGHTSHOULDER => Some(ControllerButton::RB),
            CONTROLLER_BUTTON_BACK => Some(ControllerButton::Select),
            CONTROLLER_BUTTON_START => Some(ControllerButton::Start),
            CONTROLLER_BUTTON_LEFTSTICK => Some(ControllerButton::LStick),
            CONTROLLER_BUTTON_RIGHTSTICK => Some(ControllerButton::RStick),
            _ => None,
        }
    }

    /// D-pad buttons are folded into the composite hat by the backend
    pub fn dpad_direction(button: u8) -> Option<DpadDirection> {
        match button {
            CONTROLLER_BUTTON_DPAD_UP => Some(DpadDirection::Up),
            CONTROLLER_BUTTON_DPAD_DOWN => Some(DpadDirection::Down),
            CONTROLLER_BUTTON_DPAD_LEFT => Some(DpadDirection::Left),
            CONTROLLER_BUTTON_DPAD_RIGHT => Some(DpadDirection::Right),
            _ => None,
        }
    }

    pub fn controller_axis(axis: u8) -> Option<ControllerAxis> {
        match axis {
            CONTROLLER_AXIS_LEFTX => Some(ControllerAxis::LeftStickX),
            CONTROLLER_AXIS_LEFTY => Some(ControllerAxis::LeftStickY),
            CONTROLLER_AXIS_RIGHTX => Some(ControllerAxis::RightStickX),
            CONTROLLER_AXIS_RIGHTY => Some(ControllerAxis::RightStickY),
            CONTROLLER_AXIS_TRIGGERLEFT => Some(ControllerAxis::LeftTrigger),
            CONTROLLER_AXIS_TRIGGERRIGHT => Some(ControllerAxis::RightTrigger),
            _ => None,
        }
    }
}

pub mod glfw {
    use crate::event::{ControllerAxis, ControllerButton, Key, MouseButton};

    pub const RELEASE: i32 = 0;
    pub const PRESS: i32 = 1;
    pub const REPEAT: i32 = 2;

    pub const KEY_SPACE: i32 = 32;
    pub const KEY_A: i32 = 65;
    pub const KEY_Z: i32 = 90;
    pub const KEY_ESCAPE: i32 = 256;
    pub const KEY_ENTER: i32 = 257;
    pub const KEY_TAB: i32 = 258;
    pub const KEY_BACKSPACE: i32 = 259;
    pub const KEY_RIGHT: i32 = 262;
    pub const KEY_LEFT: i32 = 263;
    pub const KEY_DOWN: i32 = 264;
    pub const KEY_UP: i32 = 265;
    pub const KEY_LEFT_SHIFT: i32 = 340;
    pub const KEY_LEFT_CONTROL: i32 = 341;
    pub const KEY_LEFT_ALT: i32 = 342;
    pub const KEY_RIGHT_SHIFT: i32 = 344;
    pub const KEY_RIGHT_CONTROL: i32 = 345;
    pub const KEY_RIGHT_ALT: i32 = 346;

    pub const MOUSE_BUTTON_LEFT: i32 = 0;
    pub const MOUSE_BUTTON_RIGHT: i32 = 1;
    pub const MOUSE_BUTTON_MIDDLE: i32 = 2;
    pub const MOUSE_BUTTON_4: i32 = 3;
    pub const MOUSE_BUTTON_5: i32 = 4;

    pub const GAMEPAD_BUTTON_A: usize = 0;
    pub const GAMEPAD_BUTTON_B: usize = 1;
    pub const GAMEPAD_BUTTON_X: usize = 2;
    pub const GAMEPAD_BUTTON_Y: usize = 3;
    pub const GAMEPAD_BUTTON_LEFT_BUMPER: usize = 4;
    pub const GAMEPAD_BUTTON_RIGHT_BUMPER: usize = 5;
    pub const GAMEPAD_BUTTON_BACK: usize = 6;
    pub const GAMEPAD_BUTTON_START: usize = 7;
    pub const GAMEPAD_BUTTON_GUIDE: usize = 8;
    pub const GAMEPAD_BUTTON_LEFT_THUMB: usize = 9;
    pub const GAMEPAD_BUTTON_RIGHT_THUMB: usize = 10;

    pub const GAMEPAD_AXIS_LEFT_X: usize = 0;
    pub const GAMEPAD_AXIS_LEFT_Y: usize = 1;
    pub const GAMEPAD_AXIS_RIGHT_X: usize = 2;
    pub const GAMEPAD_AXIS_RIGHT_Y: usize = 3;
    pub const GAMEPAD_AXIS_LEFT_TRIGGER: usize = 4;
    pub const GAMEPAD_AXIS_RIGHT_TRIGGER: usize = 5;

    pub const HAT_CENTERED: u8 = 0;
    pub const HAT_UP: u8 = 1;
    pub const HAT_RIGHT: u8 = 2;
    pub const HAT_DOWN: u8 = 4;
    pub const HAT_LEFT: u8 = 8;

    pub fn key(code: i32) -> Option<Key> {
        if (KEY_A..=KEY_Z).contains(&code) {
            let index = (code - KEY_A) as usize;
            return Key::ALL.get(index).copied();
        }
        match code {
            KEY_SPACE => Some(Key::Space),
            KEY_ENTER => Some(Key::Enter),
            KEY_LEFT_SHIFT | KEY_RIGHT_SHIFT => Some(Key::Shift),
            KEY_LEFT_CONTROL | KEY_RIGHT_CONTROL => Some(Key::Ctrl),
            KEY_LEFT_ALT | KEY_RIGHT_ALT => Some(Key::Alt),
            KEY_ESCAPE => Some(Key::Esc),
            KEY_TAB => Some(Key::Tab),
            KEY_BACKSPACE => Some(Key::Backspace),
            KEY_UP => Some(Key::Up),
            KEY_DOWN => Some(Key::Down),
            KEY_LEFT => Some(Key::Left),
            KEY_RIGHT => Some(Key::Right),
            _ => None,
        }
    }

    pub fn mouse_button(button: i32) -> Option<MouseButton> {
        match button {
            MOUSE_BUTTON_LEFT => Some(MouseButton::Left),
            MOUSE_BUTTON_RIGHT => Some(MouseButton::Right),
            MOUSE_BUTTON_MIDDLE => Some(MouseButton::Middle),
            MOUSE_BUTTON_4 => Some(MouseButton::Button4),
            MOUSE_BUTTON_5 => Some(MouseButton::Button5),
            _ => None,
        }
    }

    /// D-pad indices are not mapped; the d-pad arrives through the hat array
    pub fn gamepad_button(index: usize) -> Option<ControllerButton> {
        match index {
            GAMEPAD_BUTTON_A => Some(ControllerButton::A),
            GAMEPAD_BUTTON_B => Some(ControllerButton::B),
            GAMEPAD_BUTTON_X => Some(ControllerButton::X),
            GAMEPAD_BUTTON_Y => Some(ControllerButton::Y),
            GAMEPAD_BUTTON_LEFT_BUMPER => Some(ControllerButton::LB),
            GAMEPAD_BUTTON_RIGHT_BUMPER => Some(ControllerButton::RB),
            GAMEPAD_BUTTON_BACK => Some(ControllerButton::Select),
            GAMEPAD_BUTTON_START => Some(ControllerButton::Start),
            GAMEPAD_BUTTON_LEFT_THUMB => Some(ControllerButton::LStick),
            GAMEPAD_BUTTON_RIGHT_THUMB => Some(ControllerButton::RStick),
            _ => None,
        }
    }

    pub fn gamepad_axis(index: usize) -> Option<ControllerAxis> {
        match index {
            GAMEPAD_AXIS_LEFT_X => Some(ControllerAxis::LeftStickX),
            GAMEPAD_AXIS_LEFT_Y => Some(ControllerAxis::LeftStickY),
            GAMEPAD_AXIS_RIGHT_X => Some(ControllerAxis::RightStickX),
            GAMEPAD_AXIS_RIGHT_Y => Some(ControllerAxis::RightStickY),
            GAMEPAD_AXIS_LEFT_TRIGGER => Some(ControllerAxis::LeftTrigger),
            GAMEPAD_AXIS_RIGHT_TRIGGER => Some(ControllerAxis::RightTrigger),
            _ => None,
        }
    }

    /// Converts a GLFW hat bitmask into an `(x, y)` hat position
    pub fn hat_position(mask: u8) -> (i8, i8) {
        let x = i8::from(mask & HAT_RIGHT != 0) - i8::from(mask & HAT_LEFT != 0);
        let y = i8::from(mask & HAT_UP != 0) - i8::from(mask & HAT_DOWN != 0);
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ControllerButton, Key, MouseButton};

    #[test]
    fn test_trigger_renormalization() {
        assert_eq!(renormalize_trigger(-1.0), 0.0);
        assert_eq!(renormalize_trigger(1.0), 1.0);
        assert_eq!(renormalize_trigger(0.0), 0.5);
        assert_eq!(axis_value(ControllerAxis::LeftStickX, -1.0), -1.0);
        assert_eq!(axis_value(ControllerAxis::RightTrigger, -1.0), 0.0);
    }

    #[test]
    fn test_hat_table() {
        assert_eq!(hat_to_dpad((1, 1)), Some(DpadState::UpRight));
        assert_eq!(hat_to_dpad((0, 0)), Some(DpadState::Neutral));
        assert_eq!(hat_to_dpad((-1, -1)), Some(DpadState::DownLeft));
        assert_eq!(hat_to_dpad((2, 0)), None);
    }

    #[test]
    fn test_dpad_buttons_fold_into_hat() {
        let mut buttons = DpadButtons::default();
        buttons.set(DpadDirection::Up, true);
        buttons.set(DpadDirection::Right, true);
        assert_eq!(buttons.hat(), (1, 1));
        buttons.set(DpadDirection::Left, true);
        assert_eq!(buttons.hat(), (0, 1));
        buttons.set(DpadDirection::Up, false);
        buttons.set(DpadDirection::Left, false);
        buttons.set(DpadDirection::Right, false);
        assert_eq!(buttons.hat(), (0, 0));
    }

    #[test]
    fn test_sdl_tables() {
        assert_eq!(sdl::key(sdl::SDLK_A), Some(Key::A));
        assert_eq!(sdl::key(sdl::SDLK_Z), Some(Key::Z));
        assert_eq!(sdl::key(sdl::SDLK_RSHIFT), Some(Key::Shift));
        assert_eq!(sdl::key(0x4000_003A), None);
        assert_eq!(sdl::mouse_button(3), Some(MouseButton::Right));
        assert_eq!(sdl::controller_button(sdl::CONTROLLER_BUTTON_BACK), Some(ControllerButton::Select));
        assert_eq!(sdl::controller_button(sdl::CONTROLLER_BUTTON_GUIDE), None);
        assert_eq!(sdl::controller_button(sdl::CONTROLLER_BUTTON_DPAD_UP), None);
        assert_eq!(
            sdl::dpad_direction(sdl::CONTROLLER_BUTTON_DPAD_LEFT),
            Some(DpadDirection::Left)
        );
    }

    #[test]
    fn test_glfw_tables() {
        assert_eq!(glfw::key(glfw::KEY_A + 22), Some(Key::W));
        assert_eq!(glfw::key(glfw::KEY_ESCAPE), Some(Key::Esc));
        assert_eq!(glfw::key(290), None);
        assert_eq!(glfw::mouse_button(0), Some(MouseButton::Left));
        assert_eq!(glfw::gamepad_button(glfw::GAMEPAD_BUTTON_GUIDE), None);
        assert_eq!(glfw::gamepad_axis(4), Some(ControllerAxis::LeftTrigger));
        assert_eq!(glfw::hat_position(glfw::HAT_UP | glfw::HAT_RIGHT), (1, 1));
        assert_eq!(glfw::hat_position(glfw::HAT_CENTERED), (0, 0));
        assert_eq!(glfw::hat_position(glfw::HAT_DOWN | glfw::HAT_LEFT), (-1, -1));
    }
}
