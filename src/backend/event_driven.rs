//! Event-driven backend
//!
//! The native layer queues classified events (SDL style). Each poll translates
//! them through the [`sdl`] tables. D-pad hats and the per-direction d-pad
//! buttons are both reduced to the composite [`ControllerButton::Dpad`].

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::backend::mapping::{self, sdl, DpadButtons};
use crate::backend::{BackendError, NativeEventPump, Verbosity};
use crate::controller::Controller;
use crate::event::{ControllerId, DpadState, Event};

/// Native event as classified by an SDL-style windowing library
#[derive(Clone, Debug, PartialEq)]
pub enum NativeEvent {
    Quit,
    WindowMoved { x: i32, y: i32 },
    WindowResized { width: u32, height: u32 },
    /// Pointer entered (`true`) or left the window
    MouseFocus { gained: bool },
    /// Keyboard focus gained or lost
    InputFocus { gained: bool },

    KeyDown { keycode: i32 },
    KeyUp { keycode: i32 },

    MouseMotion { x: i32, y: i32 },
    MouseButtonDown { button: u8, x: i32, y: i32 },
    MouseButtonUp { button: u8, x: i32, y: i32 },
    MouseWheel { x: i32, y: i32, precise_x: f32, precise_y: f32 },

    ControllerDeviceAdded { instance_id: ControllerId },
    ControllerDeviceRemoved { instance_id: ControllerId },
    ControllerButtonDown { instance_id: ControllerId, button: u8 },
    ControllerButtonUp { instance_id: ControllerId, button: u8 },
    /// `value` normalized to `[-1, 1]`, triggers included
    ControllerAxisMotion { instance_id: ControllerId, axis: u8, value: f32 },
    JoyHatMotion { instance_id: ControllerId, hat: u8, value: (i8, i8) },

    /// Anything the native layer classifies but this layer has no use for
    Other { code: u32 },
}

#[derive(Debug, Default)]
struct DpadTracker {
    buttons: DpadButtons,
    state: DpadState,
}

pub struct EventDrivenBackend {
    pump: Box<dyn NativeEventPump>,
    verbosity: Verbosity,
    dpads: HashMap<ControllerId, DpadTracker>,
    released: bool,
}

impl EventDrivenBackend {
    pub fn new(pump: Box<dyn NativeEventPump>, verbosity: Verbosity) -> Self {
        Self {
            pump,
            verbosity,
            dpads: HashMap::new(),
            released: false,
        }
    }

    pub fn produce_events(&mut self) -> Vec<Event> {
        if self.released {
            warn!("Polling events after release, returning nothing");
            return Vec::new();
        }

        let native = self.pump.poll();
        let mut events = Vec::with_capacity(native.len());
        for event in native {
            self.translate(event, &mut events);
        }
        events
    }

    pub fn enumerate_controllers(&mut self) -> HashMap<ControllerId, Controller> {
        let ids = self.pump.attached_controllers();
        info!("Found {} attached controllers: {:?}", ids.len(), ids);
        ids.into_iter().map(|id| (id, Controller::new())).collect()
    }

    pub fn present(&mut self) -> Result<(), BackendError> {
        if self.released {
            return Err(BackendError::Released);
        }
        self.pump.present()
    }

    pub fn release(&mut self) {
        if self.released {
            debug!("Event-driven backend already released");
            return;
        }
        info!("Releasing event-driven backend");
        self.pump.release();
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn translate(&mut self, native: NativeEvent, out: &mut Vec<Event>) {
        match native {
            NativeEvent::Quit => out.push(Event::quit()),
            NativeEvent::WindowMoved { x, y } => out.push(Event::window_move(x, y)),
            NativeEvent::WindowResized { width, height } => {
                out.push(Event::window_resize(width, height))
            }
            NativeEvent::MouseFocus { gained } => out.push(Event::window_access(gained)),
            NativeEvent::InputFocus { gained } => out.push(Event::window_activation(gained)),

            NativeEvent::KeyDown { keycode } | NativeEvent::KeyUp { keycode } => {
                let Some(key) = sdl::key(keycode) else {
                    self.verbosity
                        .skipped(format_args!("unmapped keycode {:#x}", keycode));
                    return;
                };
                if matches!(native, NativeEvent::KeyDown { .. }) {
                    out.push(Event::key_down(key));
                } else {
                    out.push(Event::key_up(key));
                }
            }

            NativeEvent::MouseMotion { x, y } => {
                out.push(Event::mouse_move((f64::from(x), f64::from(y))))
            }
            NativeEvent::MouseButtonDown { button, x, y }
            | NativeEvent::MouseButtonUp { button, x, y } => {
                let Some(mouse_button) = sdl::mouse_button(button) else {
                    self.verbosity
                        .skipped(format_args!("unmapped mouse button {}", button));
                    return;
                };
                let position = (f64::from(x), f64::from(y));
                if matches!(native, NativeEvent::MouseButtonDown { .. }) {
                    out.push(Event::mouse_down(mouse_button, position));
                } else {
                    out.push(Event::mouse_up(mouse_button, position));
                }
            }
            NativeEvent::MouseWheel {
                x,
                y,
                precise_x,
                precise_y,
            } => out.push(Event::mouse_wheel((x, y), (precise_x, precise_y))),

            NativeEvent::ControllerDeviceAdded { instance_id } => {
                info!("Controller {} attached", instance_id);
                self.dpads.remove(&instance_id);
                out.push(Event::controller_added(instance_id));
            }
            NativeEvent::ControllerDeviceRemoved { instance_id } => {
                info!("Controller {} detached", instance_id);
                self.dpads.remove(&instance_id);
                out.push(Event::controller_removed(instance_id));
            }

            NativeEvent::ControllerButtonDown {
                instance_id,
                button,
            }
            | NativeEvent::ControllerButtonUp {
                instance_id,
                button,
            } => {
                let pressed = matches!(native, NativeEvent::ControllerButtonDown { .. });
                if let Some(direction) = sdl::dpad_direction(button) {
                    let tracker = self.dpads.entry(instance_id).or_default();
                    tracker.buttons.set(direction, pressed);
                    let hat = tracker.buttons.hat();
                    self.dpad_changed(instance_id, hat, out);
                    return;
                }
                let Some(canonical) = sdl::controller_button(button) else {
                    self.verbosity.skipped(format_args!(
                        "unmapped button {} on controller {}",
                        button, instance_id
                    ));
                    return;
                };
                if pressed {
                    out.push(Event::controller_button_down(instance_id, canonical));
                } else {
                    out.push(Event::controller_button_up(instance_id, canonical));
                }
            }

            NativeEvent::ControllerAxisMotion {
                instance_id,
                axis,
                value,
            } => {
                let Some(canonical) = sdl::controller_axis(axis) else {
                    self.verbosity.skipped(format_args!(
                        "unmapped axis {} on controller {}",
                        axis, instance_id
                    ));
                    return;
                };
                out.push(Event::controller_axis_move(
                    instance_id,
                    canonical,
                    mapping::axis_value(canonical, value),
                ));
            }

            NativeEvent::JoyHatMotion {
                instance_id,
                hat,
                value,
            } => {
                if hat != 0 {
                    self.verbosity.skipped(format_args!(
                        "hat {} on controller {} drives no d-pad",
                        hat, instance_id
                    ));
                    return;
                }
                self.dpad_changed(instance_id, value, out);
            }

            NativeEvent::Other { code } => {
                self.verbosity
                    .skipped(format_args!("native event type {:#x}", code));
            }
        }
    }

    // Emits the composite d-pad event when the hat resolves to a new state.
    fn dpad_changed(&mut self, id: ControllerId, hat: (i8, i8), out: &mut Vec<Event>) {
        let Some(state) = mapping::hat_to_dpad(hat) else {
            self.verbosity.skipped(format_args!(
                "hat value {:?} on controller {} has no d-pad state",
                hat, id
            ));
            return;
        };
        let tracker = self.dpads.entry(id).or_default();
        if tracker.state == state {
            return;
        }
        tracker.state = state;
        out.push(Event::controller_dpad(id, state));
    }
}

impl Drop for EventDrivenBackend {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessPump;
    use crate::event::{ControllerAxis, ControllerButton, EventType, Key, MouseButton};

    fn backend(frames: Vec<Vec<NativeEvent>>) -> EventDrivenBackend {
        let pump = HeadlessPump::new(frames, vec![0]);
        EventDrivenBackend::new(Box::new(pump), Verbosity::default())
    }

    #[test]
    fn test_keyboard_mouse_window_translation() {
        let mut backend = backend(vec![vec![
            NativeEvent::KeyDown { keycode: sdl::SDLK_A + 22 },
            NativeEvent::KeyUp { keycode: sdl::SDLK_LCTRL },
            NativeEvent::MouseButtonDown { button: 1, x: 3, y: 4 },
            NativeEvent::MouseMotion { x: 5, y: 6 },
            NativeEvent::MouseWheel { x: 0, y: -1, precise_x: 0.0, precise_y: -1.5 },
            NativeEvent::WindowResized { width: 640, height: 480 },
            NativeEvent::MouseFocus { gained: true },
            NativeEvent::InputFocus { gained: false },
            NativeEvent::Quit,
        ]]);

        let events = backend.produce_events();
        assert_eq!(
            events,
            vec![
                Event::key_down(Key::W),
                Event::key_up(Key::Ctrl),
                Event::mouse_down(MouseButton::Left, (3.0, 4.0)),
                Event::mouse_move((5.0, 6.0)),
                Event::mouse_wheel((0, -1), (0.0, -1.5)),
                Event::window_resize(640, 480),
                Event::window_access(true),
                Event::window_activation(false),
                Event::quit(),
            ]
        );
    }

    #[test]
    fn test_unmapped_codes_are_dropped() {
        let mut backend = backend(vec![vec![
            NativeEvent::KeyDown { keycode: 0x4000_003A },
            NativeEvent::MouseButtonDown { button: 9, x: 0, y: 0 },
            NativeEvent::ControllerButtonDown {
                instance_id: 0,
                button: sdl::CONTROLLER_BUTTON_GUIDE,
            },
            NativeEvent::ControllerAxisMotion { instance_id: 0, axis: 17, value: 0.3 },
            NativeEvent::Other { code: 0x700 },
        ]]);
        assert!(backend.produce_events().is_empty());
    }

    #[test]
    fn test_controller_translation_and_trigger_renormalization() {
        let mut backend = backend(vec![vec![
            NativeEvent::ControllerDeviceAdded { instance_id: 2 },
            NativeEvent::ControllerButtonDown {
                instance_id: 2,
                button: sdl::CONTROLLER_BUTTON_LEFTSHOULDER,
            },
            NativeEvent::ControllerAxisMotion {
                instance_id: 2,
                axis: sdl::CONTROLLER_AXIS_TRIGGERLEFT,
                value: -1.0,
            },
            NativeEvent::ControllerAxisMotion {
                instance_id: 2,
                axis: sdl::CONTROLLER_AXIS_TRIGGERRIGHT,
                value: 1.0,
            },
            NativeEvent::ControllerAxisMotion {
                instance_id: 2,
                axis: sdl::CONTROLLER_AXIS_LEFTY,
                value: -0.25,
            },
            NativeEvent::ControllerDeviceRemoved { instance_id: 2 },
        ]]);

        assert_eq!(
            backend.produce_events(),
            vec![
                Event::controller_added(2),
                Event::controller_button_down(2, ControllerButton::LB),
                Event::controller_axis_move(2, ControllerAxis::LeftTrigger, 0.0),
                Event::controller_axis_move(2, ControllerAxis::RightTrigger, 1.0),
                Event::controller_axis_move(2, ControllerAxis::LeftStickY, -0.25),
                Event::controller_removed(2),
            ]
        );
    }

    #[test]
    fn test_hat_motion_is_composite_dpad() {
        let mut backend = backend(vec![vec![
            NativeEvent::JoyHatMotion { instance_id: 0, hat: 0, value: (1, 1) },
            NativeEvent::JoyHatMotion { instance_id: 0, hat: 0, value: (0, 0) },
            NativeEvent::JoyHatMotion { instance_id: 0, hat: 0, value: (0, 0) },
            NativeEvent::JoyHatMotion { instance_id: 0, hat: 1, value: (1, 0) },
        ]]);

        let events = backend.produce_events();
        assert_eq!(
            events,
            vec![
                Event::controller_dpad(0, DpadState::UpRight),
                Event::controller_dpad(0, DpadState::Neutral),
            ]
        );
        assert_eq!(events[1].kind, EventType::ControllerButtonUp);
    }

    #[test]
    fn test_dpad_buttons_fold_into_composite() {
        let down = |button| NativeEvent::ControllerButtonDown { instance_id: 1, button };
        let up = |button| NativeEvent::ControllerButtonUp { instance_id: 1, button };
        let mut backend = backend(vec![vec![
            down(sdl::CONTROLLER_BUTTON_DPAD_UP),
            down(sdl::CONTROLLER_BUTTON_DPAD_RIGHT),
            up(sdl::CONTROLLER_BUTTON_DPAD_UP),
            up(sdl::CONTROLLER_BUTTON_DPAD_RIGHT),
        ]]);

        assert_eq!(
            backend.produce_events(),
            vec![
                Event::controller_dpad(1, DpadState::Up),
                Event::controller_dpad(1, DpadState::UpRight),
                Event::controller_dpad(1, DpadState::Right),
                Event::controller_dpad(1, DpadState::Neutral),
            ]
        );
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut backend = backend(vec![]);
        assert!(backend.present().is_ok());
        backend.release();
        backend.release();
        assert!(backend.is_released());
        assert!(matches!(backend.present(), Err(BackendError::Released)));
        assert!(backend.produce_events().is_empty());
    }

    #[test]
    fn test_enumerate_controllers() {
        let mut backend = backend(vec![]);
        let controllers = backend.enumerate_controllers();
        assert_eq!(controllers.len(), 1);
        assert!(controllers.contains_key(&0));
    }
}
