//! Canonical event model shared by every backend
//!
//! Backends translate their native notifications into [`Event`] values built
//! from the closed enums in this module. An event carries an [`EventType`] tag
//! plus the single payload group that belongs to that type; every other field
//! stays `None`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device id assigned to a controller by the active backend
pub type ControllerId = u32;

// Declares a closed enum together with its display names and the full member list.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )*
        }

        impl $name {
            /// Every member in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Display name used by the string form of the active-state snapshot
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum! {
    /// Kind of a canonical event
    pub enum EventType {
        WindowMove => "WINDOW_MOVE",
        WindowResize => "WINDOW_RESIZE",
        /// Pointer entered or left the window
        WindowAccess => "WINDOW_ACCESS",
        /// Window gained or lost input focus
        WindowActivation => "WINDOW_ACTIVATION",
        Quit => "QUIT",

        KeyDown => "KEY_DOWN",
        KeyUp => "KEY_UP",

        MouseMove => "MOUSE_MOVE",
        MouseDown => "MOUSE_DOWN",
        MouseUp => "MOUSE_UP",
        MouseWheel => "MOUSE_WHEEL",

        ControllerAdded => "CONTROLLER_ADDED",
        ControllerRemoved => "CONTROLLER_REMOVED",
        ControllerButtonDown => "CONTROLLER_BUTTON_DOWN",
        ControllerButtonUp => "CONTROLLER_BUTTON_UP",
        ControllerAxisMove => "CONTROLLER_AXIS_MOVE",
    }
}

named_enum! {
    pub enum Key {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        E => "E",
        F => "F",
        G => "G",
        H => "H",
        I => "I",
        J => "J",
        K => "K",
        L => "L",
        M => "M",
        N => "N",
        O => "O",
        P => "P",
        Q => "Q",
        R => "R",
        S => "S",
        T => "T",
        U => "U",
        V => "V",
        W => "W",
        X => "X",
        Y => "Y",
        Z => "Z",
        Space => "SPACE",
        Enter => "ENTER",
        Shift => "SHIFT",
        Ctrl => "CTRL",
        Alt => "ALT",
        Esc => "ESC",
        Tab => "TAB",
        Backspace => "BACKSPACE",
        Up => "UP",
        Down => "DOWN",
        Left => "LEFT",
        Right => "RIGHT",
    }
}

named_enum! {
    pub enum MouseButton {
        Left => "LEFT",
        Right => "RIGHT",
        Middle => "MIDDLE",
        Button4 => "BUTTON4",
        Button5 => "BUTTON5",
    }
}

named_enum! {
    /// Digital controller inputs, named after the Xbox wireless controller layout
    pub enum ControllerButton {
        A => "A",
        B => "B",
        X => "X",
        Y => "Y",
        /// Left bumper
        LB => "LB",
        /// Right bumper
        RB => "RB",
        /// Left trigger pulled as a digital button. Not tracked by [`crate::Controller`].
        LT => "LT",
        /// Right trigger pulled as a digital button. Not tracked by [`crate::Controller`].
        RT => "RT",
        Start => "START",
        Select => "SELECT",
        /// Left stick click
        LStick => "LSTICK",
        /// Right stick click
        RStick => "RSTICK",
        /// Composite directional pad; the direction travels in [`Event::dpad`]
        Dpad => "DPAD",
    }
}

named_enum! {
    pub enum ControllerAxis {
        LeftStickX => "LEFT_STICK_X",
        LeftStickY => "LEFT_STICK_Y",
        RightStickX => "RIGHT_STICK_X",
        RightStickY => "RIGHT_STICK_Y",
        /// `0.0` released to `1.0` fully pulled
        LeftTrigger => "LEFT_TRIGGER",
        /// `0.0` released to `1.0` fully pulled
        RightTrigger => "RIGHT_TRIGGER",
    }
}

named_enum! {
    /// Nine-way d-pad position
    pub enum DpadState {
        Neutral => "NEUTRAL",
        Up => "UP",
        Down => "DOWN",
        Left => "LEFT",
        Right => "RIGHT",
        UpLeft => "UP_LEFT",
        UpRight => "UP_RIGHT",
        DownLeft => "DOWN_LEFT",
        DownRight => "DOWN_RIGHT",
    }
}

impl Default for DpadState {
    fn default() -> Self {
        DpadState::Neutral
    }
}

impl DpadState {
    pub fn is_neutral(self) -> bool {
        self == DpadState::Neutral
    }
}

impl ControllerAxis {
    /// Triggers report `[0, 1]`, sticks report `[-1, 1]`
    pub fn is_trigger(self) -> bool {
        matches!(self, ControllerAxis::LeftTrigger | ControllerAxis::RightTrigger)
    }
}

/// A canonical input or window event
///
/// Built through the per-type constructors so that only the payload group of
/// `kind` is populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventType,

    pub key: Option<Key>,

    pub mouse_position: Option<(f64, f64)>,
    pub mouse_button: Option<MouseButton>,
    /// Whole scroll steps `(x, y)`
    pub mouse_scroll: Option<(i32, i32)>,
    /// Fractional scroll offsets `(x, y)` for high-resolution wheels and touchpads
    pub mouse_scroll_precise: Option<(f32, f32)>,

    pub controller_id: Option<ControllerId>,
    pub controller_button: Option<ControllerButton>,
    pub axis: Option<ControllerAxis>,
    pub axis_value: Option<f32>,
    pub dpad: Option<DpadState>,

    pub window_position: Option<(i32, i32)>,
    pub window_size: Option<(u32, u32)>,
    pub is_accessed: Option<bool>,
    pub is_active: Option<bool>,
}

impl Event {
    fn bare(kind: EventType) -> Self {
        Self {
            kind,
            key: None,
            mouse_position: None,
            mouse_button: None,
            mouse_scroll: None,
            mouse_scroll_precise: None,
            controller_id: None,
            controller_button: None,
            axis: None,
            axis_value: None,
            dpad: None,
            window_position: None,
            window_size: None,
            is_accessed: None,
            is_active: None,
        }
    }

    pub fn quit() -> Self {
        Self::bare(EventType::Quit)
    }

    pub fn window_move(x: i32, y: i32) -> Self {
        Self {
            window_position: Some((x, y)),
            ..Self::bare(EventType::WindowMove)
        }
    }

    pub fn window_resize(width: u32, height: u32) -> Self {
        Self {
            window_size: Some((width, height)),
            ..Self::bare(EventType::WindowResize)
        }
    }

    pub fn window_access(accessed: bool) -> Self {
        Self {
            is_accessed: Some(accessed),
            ..Self::bare(EventType::WindowAccess)
        }
    }

    pub fn window_activation(active: bool) -> Self {
        Self {
            is_active: Some(active),
            ..Self::bare(EventType::WindowActivation)
        }
    }

    pub fn key_down(key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::bare(EventType::KeyDown)
        }
    }

    pub fn key_up(key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::bare(EventType::KeyUp)
        }
    }

    pub fn mouse_move(position: (f64, f64)) -> Self {
        Self {
            mouse_position: Some(position),
            ..Self::bare(EventType::MouseMove)
        }
    }

    pub fn mouse_down(button: MouseButton, position: (f64, f64)) -> Self {
        Self {
            mouse_button: Some(button),
            mouse_position: Some(position),
            ..Self::bare(EventType::MouseDown)
        }
    }

    pub fn mouse_up(button: MouseButton, position: (f64, f64)) -> Self {
        Self {
            mouse_button: Some(button),
            mouse_position: Some(position),
            ..Self::bare(EventType::MouseUp)
        }
    }

    pub fn mouse_wheel(scroll: (i32, i32), precise: (f32, f32)) -> Self {
        Self {
            mouse_scroll: Some(scroll),
            mouse_scroll_precise: Some(precise),
            ..Self::bare(EventType::MouseWheel)
        }
    }

    pub fn controller_added(id: ControllerId) -> Self {
        Self {
            controller_id: Some(id),
            ..Self::bare(EventType::ControllerAdded)
        }
    }

    pub fn controller_removed(id: ControllerId) -> Self {
        Self {
            controller_id: Some(id),
            ..Self::bare(EventType::ControllerRemoved)
        }
    }

    pub fn controller_button_down(id: ControllerId, button: ControllerButton) -> Self {
        Self {
            controller_id: Some(id),
            controller_button: Some(button),
            ..Self::bare(EventType::ControllerButtonDown)
        }
    }

    pub fn controller_button_up(id: ControllerId, button: ControllerButton) -> Self {
        Self {
            controller_id: Some(id),
            controller_button: Some(button),
            ..Self::bare(EventType::ControllerButtonUp)
        }
    }

    /// Composite d-pad event: BUTTON_DOWN for any direction, BUTTON_UP once it returns to neutral
    pub fn controller_dpad(id: ControllerId, state: DpadState) -> Self {
        let kind = if state.is_neutral() {
            EventType::ControllerButtonUp
        } else {
            EventType::ControllerButtonDown
        };
        Self {
            controller_id: Some(id),
            controller_button: Some(ControllerButton::Dpad),
            dpad: Some(state),
            ..Self::bare(kind)
        }
    }

    pub fn controller_axis_move(id: ControllerId, axis: ControllerAxis, value: f32) -> Self {
        Self {
            controller_id: Some(id),
            axis: Some(axis),
            axis_value: Some(value),
            ..Self::bare(EventType::ControllerAxisMove)
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut details: Vec<String> = Vec::new();
        if let Some(key) = self.key {
            details.push(format!("key:{key}"));
        }
        if let Some((x, y)) = self.mouse_position {
            details.push(format!("mouse_position:({x}, {y})"));
        }
        if let Some(button) = self.mouse_button {
            details.push(format!("mouse_button:{button}"));
        }
        if let Some((x, y)) = self.mouse_scroll {
            details.push(format!("mouse_scroll:({x}, {y})"));
        }
        if let Some((x, y)) = self.mouse_scroll_precise {
            details.push(format!("mouse_scroll_precise:({x:.3}, {y:.3})"));
        }
        if let Some(id) = self.controller_id {
            details.push(format!("controller_id:{id}"));
        }
        if let Some(button) = self.controller_button {
            details.push(format!("controller_button:{button}"));
        }
        if let Some(axis) = self.axis {
            details.push(format!("axis:{axis}"));
        }
        if let Some(value) = self.axis_value {
            details.push(format!("axis_value:{value:.4}"));
        }
        if let Some(dpad) = self.dpad {
            details.push(format!("dpad:{dpad}"));
        }
        if let Some((x, y)) = self.window_position {
            details.push(format!("window_position:({x}, {y})"));
        }
        if let Some((w, h)) = self.window_size {
            details.push(format!("window_size:({w}, {h})"));
        }
        if let Some(accessed) = self.is_accessed {
            details.push(format!("is_accessed:{accessed}"));
        }
        if let Some(active) = self.is_active {
            details.push(format!("is_active:{active}"));
        }
        write!(f, "{} ({})", self.kind, details.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_only_carries_key() {
        let event = Event::key_down(Key::W);
        assert_eq!(event.kind, EventType::KeyDown);
        assert_eq!(event.key, Some(Key::W));
        assert!(event.mouse_position.is_none());
        assert!(event.controller_id.is_none());
        assert!(event.window_size.is_none());
    }

    #[test]
    fn test_dpad_event_direction_selects_type() {
        let down = Event::controller_dpad(2, DpadState::UpRight);
        assert_eq!(down.kind, EventType::ControllerButtonDown);
        assert_eq!(down.controller_button, Some(ControllerButton::Dpad));
        assert_eq!(down.dpad, Some(DpadState::UpRight));

        let up = Event::controller_dpad(2, DpadState::Neutral);
        assert_eq!(up.kind, EventType::ControllerButtonUp);
        assert_eq!(up.dpad, Some(DpadState::Neutral));
    }

    #[test]
    fn test_names() {
        assert_eq!(Key::Space.name(), "SPACE");
        assert_eq!(ControllerAxis::LeftStickX.to_string(), "LEFT_STICK_X");
        assert_eq!(DpadState::DownLeft.name(), "DOWN_LEFT");
        assert_eq!(Key::ALL.len(), 38);
        assert_eq!(ControllerButton::ALL.len(), 13);
    }

    #[test]
    fn test_display_lists_payload() {
        let event = Event::controller_axis_move(1, ControllerAxis::RightTrigger, 0.5);
        assert_eq!(
            event.to_string(),
            "CONTROLLER_AXIS_MOVE (controller_id:1, axis:RIGHT_TRIGGER, axis_value:0.5000)"
        );
        assert_eq!(Event::quit().to_string(), "QUIT ()");
    }
}
