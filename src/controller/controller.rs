//! Per-device controller state
//!
//! A [`Controller`] holds the digital buttons, the composite d-pad and the analog
//! axes of one attached gamepad. It applies whatever it is told; filtering of
//! redundant axis updates happens in [`crate::InputState`] before values get here.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::event::{ControllerAxis, ControllerButton, DpadState};

/// Default deadzone used when reporting active analog inputs
pub const DEFAULT_ACTIVE_PRECISION: f32 = 0.1;

const BUTTON_SLOTS: usize = 11;
const AXIS_SLOTS: usize = 6;

// Dense index of every button a controller tracks. LT/RT only exist as axes.
fn button_slot(button: ControllerButton) -> Option<usize> {
    match button {
        ControllerButton::A => Some(0),
        ControllerButton::B => Some(1),
        ControllerButton::X => Some(2),
        ControllerButton::Y => Some(3),
        ControllerButton::LB => Some(4),
        ControllerButton::RB => Some(5),
        ControllerButton::Start => Some(6),
        ControllerButton::Select => Some(7),
        ControllerButton::LStick => Some(8),
        ControllerButton::RStick => Some(9),
        ControllerButton::Dpad => Some(10),
        ControllerButton::LT | ControllerButton::RT => None,
    }
}

fn axis_slot(axis: ControllerAxis) -> usize {
    match axis {
        ControllerAxis::LeftStickX => 0,
        ControllerAxis::LeftStickY => 1,
        ControllerAxis::RightStickX => 2,
        ControllerAxis::RightStickY => 3,
        ControllerAxis::LeftTrigger => 4,
        ControllerAxis::RightTrigger => 5,
    }
}

/// One entry of [`Controller::get_active`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum ActiveInput {
    Button(ControllerButton),
    Axis(ControllerAxis, f32),
}

impl ActiveInput {
    pub fn name(&self) -> &'static str {
        match self {
            ActiveInput::Button(button) => button.name(),
            ActiveInput::Axis(axis, _) => axis.name(),
        }
    }
}

impl fmt::Display for ActiveInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State of a single attached controller
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Controller {
    buttons: [bool; BUTTON_SLOTS],
    axes: [f32; AXIS_SLOTS],
    dpad: DpadState,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pressed state of `button`, `None` for buttons a controller does not track
    pub fn get_button(&self, button: ControllerButton) -> Option<bool> {
        button_slot(button).map(|slot| self.buttons[slot])
    }

    pub fn get_axis(&self, axis: ControllerAxis) -> Option<f32> {
        Some(self.axes[axis_slot(axis)])
    }

    pub fn dpad(&self) -> DpadState {
        self.dpad
    }

    /// Sets a button; a d-pad press may carry its direction, which is stored alongside
    pub fn update_button(
        &mut self,
        button: ControllerButton,
        pressed: bool,
        dpad_state: Option<DpadState>,
    ) {
        let Some(slot) = button_slot(button) else {
            debug!("Controller does not track button {:?}, ignoring", button);
            return;
        };
        self.buttons[slot] = pressed;

        if button == ControllerButton::Dpad {
            if let Some(state) = dpad_state {
                self.dpad = state;
            }
        }
    }

    pub fn update_axis(&mut self, axis: ControllerAxis, value: f32) {
        self.axes[axis_slot(axis)] = value;
    }

    /// Pressed buttons plus every axis whose magnitude exceeds `precision`
    ///
    /// Triggers count when their value is above `precision`; sticks when
    /// `|value|` is.
    pub fn get_active(&self, precision: f32) -> Vec<ActiveInput> {
        let mut active = Vec::new();

        for &button in ControllerButton::ALL {
            if self.get_button(button) == Some(true) {
                active.push(ActiveInput::Button(button));
            }
        }

        for &axis in ControllerAxis::ALL {
            let value = self.axes[axis_slot(axis)];
            let engaged = if axis.is_trigger() {
                value > precision
            } else {
                value.abs() > precision
            };
            if engaged {
                active.push(ActiveInput::Axis(axis, value));
            }
        }

        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_controller_is_idle() {
        let controller = Controller::new();
        assert_eq!(controller.get_button(ControllerButton::A), Some(false));
        assert_eq!(controller.get_axis(ControllerAxis::LeftStickX), Some(0.0));
        assert_eq!(controller.dpad(), DpadState::Neutral);
        assert!(controller.get_active(DEFAULT_ACTIVE_PRECISION).is_empty());
    }

    #[test]
    fn test_untracked_button_is_absent() {
        let mut controller = Controller::new();
        controller.update_button(ControllerButton::LT, true, None);
        assert_eq!(controller.get_button(ControllerButton::LT), None);
        assert!(controller.get_active(0.1).is_empty());
    }

    #[test]
    fn test_dpad_update_sets_both_facets() {
        let mut controller = Controller::new();
        controller.update_button(ControllerButton::Dpad, true, Some(DpadState::DownLeft));
        assert_eq!(controller.get_button(ControllerButton::Dpad), Some(true));
        assert_eq!(controller.dpad(), DpadState::DownLeft);

        controller.update_button(ControllerButton::Dpad, false, Some(DpadState::Neutral));
        assert_eq!(controller.get_button(ControllerButton::Dpad), Some(false));
        assert_eq!(controller.dpad(), DpadState::Neutral);
    }

    #[test]
    fn test_dpad_state_ignored_for_other_buttons() {
        let mut controller = Controller::new();
        controller.update_button(ControllerButton::A, true, Some(DpadState::Up));
        assert_eq!(controller.dpad(), DpadState::Neutral);
    }

    #[test]
    fn test_stick_deadzone() {
        let mut controller = Controller::new();
        controller.update_axis(ControllerAxis::LeftStickX, 0.05);
        assert!(controller.get_active(0.1).is_empty());

        controller.update_axis(ControllerAxis::LeftStickX, 0.15);
        assert_eq!(
            controller.get_active(0.1),
            vec![ActiveInput::Axis(ControllerAxis::LeftStickX, 0.15)]
        );

        controller.update_axis(ControllerAxis::LeftStickX, -0.15);
        assert_eq!(controller.get_active(0.1).len(), 1);
    }

    #[test]
    fn test_trigger_uses_raw_value() {
        let mut controller = Controller::new();
        controller.update_axis(ControllerAxis::RightTrigger, 0.5);
        controller.update_button(ControllerButton::B, true, None);

        let active = controller.get_active(0.1);
        assert_eq!(
            active,
            vec![
                ActiveInput::Button(ControllerButton::B),
                ActiveInput::Axis(ControllerAxis::RightTrigger, 0.5),
            ]
        );
        assert_eq!(active[0].name(), "B");
        assert_eq!(active[1].to_string(), "RIGHT_TRIGGER");
    }
}
