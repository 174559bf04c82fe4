//! Event-driven native layer over gilrs
//!
//! gilrs delivers gamepad events only, so this layer has no keyboard, mouse
//! or window traffic and presenting is a no-op. Events are rewritten into the
//! SDL-style [`NativeEvent`] codes the event-driven backend understands.
//!
//! ```text
//! gilrs::next_event ──► GilrsPump::poll ──[NativeEvent]──► EventDrivenBackend
//! ```

use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};
use tracing::{debug, error, info, warn};

use crate::backend::mapping::sdl;
use crate::backend::{
    BackendError, NativeEvent, NativeEventPump, NativePoller, NativeSurface, Platform,
    SurfaceSettings,
};
use crate::event::ControllerId;

pub struct GilrsPump {
    /// `None` once released
    gilrs: Option<Gilrs>,
}

impl GilrsPump {
    pub fn new() -> Result<Self, BackendError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(BackendError::Initialization(e.to_string()));
            }
        };
        Ok(Self { gilrs: Some(gilrs) })
    }
}

impl NativeSurface for GilrsPump {
    fn present(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn release(&mut self) {
        if self.gilrs.take().is_some() {
            debug!("Released gilrs context");
        }
    }
}

impl NativeEventPump for GilrsPump {
    fn poll(&mut self) -> Vec<NativeEvent> {
        let mut events = Vec::new();
        let Some(gilrs) = self.gilrs.as_mut() else {
            return events;
        };
        while let Some(gilrs::Event { id, event, .. }) = gilrs.next_event() {
            debug!("Processing gilrs event: {:?} from {}", event, id);
            match translate(instance_id(id), event) {
                Some(native) => events.push(native),
                None => debug!("Event ignored due to filtering or mapping"),
            }
        }
        events
    }

    fn attached_controllers(&self) -> Vec<ControllerId> {
        let mut ids = Vec::new();
        let Some(gilrs) = self.gilrs.as_ref() else {
            return ids;
        };
        for (id, gamepad) in gilrs.gamepads() {
            info!("  ID: {}, Name: {}, UUID: {:?}", id, gamepad.name(), gamepad.uuid());
            ids.push(instance_id(id));
        }
        if ids.is_empty() {
            warn!("No gamepad connected");
        }
        ids
    }
}

fn instance_id(id: GamepadId) -> ControllerId {
    usize::from(id) as ControllerId
}

fn translate(instance_id: ControllerId, event: EventType) -> Option<NativeEvent> {
    match event {
        EventType::ButtonPressed(button, _) => {
            map_button(button).map(|button| NativeEvent::ControllerButtonDown {
                instance_id,
                button,
            })
        }
        EventType::ButtonReleased(button, _) => {
            map_button(button).map(|button| NativeEvent::ControllerButtonUp {
                instance_id,
                button,
            })
        }
        // Analog triggers arrive as button values in [0, 1]
        EventType::ButtonChanged(button, value, _) => {
            map_trigger(button).map(|axis| NativeEvent::ControllerAxisMotion {
                instance_id,
                axis,
                value: value * 2.0 - 1.0,
            })
        }
        EventType::AxisChanged(axis, value, _) => {
            map_axis(axis).map(|(axis, flipped)| NativeEvent::ControllerAxisMotion {
                instance_id,
                axis,
                value: if flipped { -value } else { value },
            })
        }
        EventType::Connected => Some(NativeEvent::ControllerDeviceAdded { instance_id }),
        EventType::Disconnected => Some(NativeEvent::ControllerDeviceRemoved { instance_id }),
        EventType::ButtonRepeated(button, _) => {
            debug!("Button repeat ignored: {:?}", button);
            None
        }
        _ => None,
    }
}

fn map_button(button: Button) -> Option<u8> {
    match button {
        Button::South => Some(sdl::CONTROLLER_BUTTON_A),
        Button::East => Some(sdl::CONTROLLER_BUTTON_B),
        Button::West => Some(sdl::CONTROLLER_BUTTON_X),
        Button::North => Some(sdl::CONTROLLER_BUTTON_Y),
        Button::Select => Some(sdl::CONTROLLER_BUTTON_BACK),
        Button::Mode => Some(sdl::CONTROLLER_BUTTON_GUIDE),
        Button::Start => Some(sdl::CONTROLLER_BUTTON_START),
        Button::LeftThumb => Some(sdl::CONTROLLER_BUTTON_LEFTSTICK),
        Button::RightThumb => Some(sdl::CONTROLLER_BUTTON_RIGHTSTICK),
        Button::LeftTrigger => Some(sdl::CONTROLLER_BUTTON_LEFTSHOULDER),
        Button::RightTrigger => Some(sdl::CONTROLLER_BUTTON_RIGHTSHOULDER),
        Button::DPadUp => Some(sdl::CONTROLLER_BUTTON_DPAD_UP),
        Button::DPadDown => Some(sdl::CONTROLLER_BUTTON_DPAD_DOWN),
        Button::DPadLeft => Some(sdl::CONTROLLER_BUTTON_DPAD_LEFT),
        Button::DPadRight => Some(sdl::CONTROLLER_BUTTON_DPAD_RIGHT),
        _ => None,
    }
}

fn map_trigger(button: Button) -> Option<u8> {
    match button {
        Button::LeftTrigger2 => Some(sdl::CONTROLLER_AXIS_TRIGGERLEFT),
        Button::RightTrigger2 => Some(sdl::CONTROLLER_AXIS_TRIGGERRIGHT),
        _ => None,
    }
}

// gilrs reports stick up as positive, SDL as negative
fn map_axis(axis: Axis) -> Option<(u8, bool)> {
    match axis {
        Axis::LeftStickX => Some((sdl::CONTROLLER_AXIS_LEFTX, false)),
        Axis::LeftStickY => Some((sdl::CONTROLLER_AXIS_LEFTY, true)),
        Axis::RightStickX => Some((sdl::CONTROLLER_AXIS_RIGHTX, false)),
        Axis::RightStickY => Some((sdl::CONTROLLER_AXIS_RIGHTY, true)),
        _ => {
            debug!("Ignoring unsupported axis: {:?}", axis);
            None
        }
    }
}

/// Platform backed by the host's gamepad subsystem
#[derive(Debug, Default)]
pub struct GilrsPlatform;

impl Platform for GilrsPlatform {
    fn open_event_pump(
        &mut self,
        settings: &SurfaceSettings,
    ) -> Result<Box<dyn NativeEventPump>, BackendError> {
        debug!("gilrs has no window surface, ignoring {:?}", settings);
        Ok(Box::new(GilrsPump::new()?))
    }

    fn open_poller(
        &mut self,
        _settings: &SurfaceSettings,
    ) -> Result<Box<dyn NativePoller>, BackendError> {
        Err(BackendError::Unsupported(
            "gilrs only delivers classified events".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ControllerButton;

    #[test]
    fn test_face_buttons_follow_controller_layout() {
        assert_eq!(map_button(Button::South), Some(sdl::CONTROLLER_BUTTON_A));
        assert_eq!(map_button(Button::East), Some(sdl::CONTROLLER_BUTTON_B));
        assert_eq!(map_button(Button::West), Some(sdl::CONTROLLER_BUTTON_X));
        assert_eq!(map_button(Button::North), Some(sdl::CONTROLLER_BUTTON_Y));
        assert_eq!(map_button(Button::LeftTrigger2), None);
    }

    #[test]
    fn test_north_and_west_reach_canonical_y_and_x() {
        let canonical = |button| map_button(button).and_then(sdl::controller_button);
        assert_eq!(canonical(Button::North), Some(ControllerButton::Y));
        assert_eq!(canonical(Button::West), Some(ControllerButton::X));
    }

    #[test]
    fn test_release_drops_gilrs_context() {
        // Hosts without a gamepad subsystem cannot open the pump at all.
        let Ok(mut pump) = GilrsPump::new() else {
            return;
        };
        pump.release();
        assert!(pump.gilrs.is_none());
        assert!(pump.poll().is_empty());
        assert!(pump.attached_controllers().is_empty());
        pump.release();
    }

    #[test]
    fn test_analog_triggers_and_sticks() {
        assert_eq!(
            map_trigger(Button::RightTrigger2),
            Some(sdl::CONTROLLER_AXIS_TRIGGERRIGHT)
        );
        assert_eq!(map_trigger(Button::South), None);
        assert_eq!(map_axis(Axis::LeftStickY), Some((sdl::CONTROLLER_AXIS_LEFTY, true)));
        assert_eq!(map_axis(Axis::DPadX), None);
    }

    #[test]
    fn test_poller_is_unsupported() {
        let settings = SurfaceSettings {
            size: (512, 512),
            resizable: true,
            title: String::new(),
            multisample: false,
            samples: 0,
            depth_buffer: 24,
            context_version: None,
        };
        assert!(matches!(
            GilrsPlatform.open_poller(&settings).err(),
            Some(BackendError::Unsupported(_))
        ));
    }
}
