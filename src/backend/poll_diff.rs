//! Poll-and-diff backend
//!
//! The native layer (GLFW style) reports keyboard, mouse and window changes
//! through callbacks that write into a buffer shared with this backend. Each
//! poll pumps the native layer, drains that buffer, then diffs a full raw
//! snapshot of every gamepad against the previous frame to synthesize
//! controller events.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::backend::mapping::{self, glfw};
use crate::backend::{BackendError, NativePoller, Verbosity};
use crate::controller::Controller;
use crate::event::{ControllerId, Event};

/// Raw callback payload as captured from the native layer
#[derive(Clone, Debug, PartialEq)]
pub enum RawCallback {
    Key { key: i32, action: i32 },
    MouseButton { button: i32, action: i32 },
    CursorPos { x: f64, y: f64 },
    Scroll { x: f64, y: f64 },
    WindowPos { x: i32, y: i32 },
    WindowSize { width: i32, height: i32 },
    CursorEnter { entered: bool },
    Focus { focused: bool },
    Close,
}

/// Raw state of one gamepad at poll time
///
/// Axes are `[-1, 1]` (triggers included), hats are GLFW bitmasks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawDeviceSnapshot {
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
    pub hats: Vec<u8>,
}

type CallbackQueue = Rc<RefCell<VecDeque<RawCallback>>>;

pub struct PollDiffBackend {
    poller: Box<dyn NativePoller>,
    verbosity: Verbosity,
    queue: CallbackQueue,
    snapshots: BTreeMap<ControllerId, RawDeviceSnapshot>,
    cursor: (f64, f64),
    released: bool,
}

impl PollDiffBackend {
    pub fn new(mut poller: Box<dyn NativePoller>, verbosity: Verbosity) -> Self {
        let queue: CallbackQueue = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&queue);
        poller.set_callback(Box::new(move |raw| sink.borrow_mut().push_back(raw)));
        debug!("Installed native callback sink");

        Self {
            poller,
            verbosity,
            queue,
            snapshots: BTreeMap::new(),
            cursor: (0.0, 0.0),
            released: false,
        }
    }

    pub fn produce_events(&mut self) -> Vec<Event> {
        if self.released {
            warn!("Polling events after release, returning nothing");
            return Vec::new();
        }

        self.poller.poll_events();

        let buffered: Vec<RawCallback> = self.queue.borrow_mut().drain(..).collect();
        let mut events = Vec::with_capacity(buffered.len());
        for raw in buffered {
            self.translate(raw, &mut events);
        }

        let current: BTreeMap<ControllerId, RawDeviceSnapshot> =
            self.poller.joysticks().into_iter().collect();
        self.diff_devices(current, &mut events);

        events
    }

    /// Seeds the snapshot store so enumerated devices are not announced again
    pub fn enumerate_controllers(&mut self) -> HashMap<ControllerId, Controller> {
        let devices = self.poller.joysticks();
        info!("Found {} attached joysticks", devices.len());
        let mut controllers = HashMap::new();
        for (id, snapshot) in devices {
            controllers.insert(id, Controller::new());
            self.snapshots.insert(id, snapshot);
        }
        controllers
    }

    pub fn present(&mut self) -> Result<(), BackendError> {
        if self.released {
            return Err(BackendError::Released);
        }
        self.poller.present()
    }

    pub fn release(&mut self) {
        if self.released {
            debug!("Poll-and-diff backend already released");
            return;
        }
        info!("Releasing poll-and-diff backend");
        self.poller.release();
        self.queue.borrow_mut().clear();
        self.snapshots.clear();
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn translate(&mut self, raw: RawCallback, out: &mut Vec<Event>) {
        match raw {
            RawCallback::Key { key, action } => {
                let Some(canonical) = glfw::key(key) else {
                    self.verbosity.skipped(format_args!("unmapped key {}", key));
                    return;
                };
                match action {
                    glfw::PRESS => out.push(Event::key_down(canonical)),
                    glfw::RELEASE => out.push(Event::key_up(canonical)),
                    _ => self
                        .verbosity
                        .skipped(format_args!("key {} action {}", canonical, action)),
                }
            }
            RawCallback::MouseButton { button, action } => {
                let Some(canonical) = glfw::mouse_button(button) else {
                    self.verbosity
                        .skipped(format_args!("unmapped mouse button {}", button));
                    return;
                };
                match action {
                    glfw::PRESS => out.push(Event::mouse_down(canonical, self.cursor)),
                    glfw::RELEASE => out.push(Event::mouse_up(canonical, self.cursor)),
                    _ => self
                        .verbosity
                        .skipped(format_args!("mouse button {} action {}", canonical, action)),
                }
            }
            RawCallback::CursorPos { x, y } => {
                self.cursor = (x, y);
                out.push(Event::mouse_move((x, y)));
            }
            RawCallback::Scroll { x, y } => {
                let steps = (x.round() as i32, y.round() as i32);
                out.push(Event::mouse_wheel(steps, (x as f32, y as f32)));
            }
            RawCallback::WindowPos { x, y } => out.push(Event::window_move(x, y)),
            RawCallback::WindowSize { width, height } => out.push(Event::window_resize(
                width.max(0) as u32,
                height.max(0) as u32,
            )),
            RawCallback::CursorEnter { entered } => out.push(Event::window_access(entered)),
            RawCallback::Focus { focused } => out.push(Event::window_activation(focused)),
            RawCallback::Close => out.push(Event::quit()),
        }
    }

    fn diff_devices(
        &mut self,
        current: BTreeMap<ControllerId, RawDeviceSnapshot>,
        out: &mut Vec<Event>,
    ) {
        let vanished: Vec<ControllerId> = self
            .snapshots
            .keys()
            .filter(|id| !current.contains_key(id))
            .copied()
            .collect();
        for id in vanished {
            info!("Joystick {} disappeared", id);
            self.snapshots.remove(&id);
            out.push(Event::controller_removed(id));
        }

        for (id, snapshot) in current {
            match self.snapshots.get(&id) {
                None => {
                    info!("Joystick {} appeared", id);
                    out.push(Event::controller_added(id));
                }
                Some(previous) => self.diff_snapshot(id, previous, &snapshot, out),
            }
            self.snapshots.insert(id, snapshot);
        }
    }

    // Index-wise comparison; indices missing on either side read as released or centered.
    fn diff_snapshot(
        &self,
        id: ControllerId,
        previous: &RawDeviceSnapshot,
        current: &RawDeviceSnapshot,
        out: &mut Vec<Event>,
    ) {
        let buttons = previous.buttons.len().max(current.buttons.len());
        for index in 0..buttons {
            let before = previous.buttons.get(index).copied().unwrap_or(false);
            let now = current.buttons.get(index).copied().unwrap_or(false);
            if before == now {
                continue;
            }
            let Some(button) = glfw::gamepad_button(index) else {
                self.verbosity.skipped(format_args!(
                    "unmapped button index {} on joystick {}",
                    index, id
                ));
                continue;
            };
            if now {
                out.push(Event::controller_button_down(id, button));
            } else {
                out.push(Event::controller_button_up(id, button));
            }
        }

        let axes = previous.axes.len().max(current.axes.len());
        for index in 0..axes {
            let axis = glfw::gamepad_axis(index);
            // A released trigger reads -1.0 raw
            let neutral = match axis {
                Some(axis) if axis.is_trigger() => -1.0,
                _ => 0.0,
            };
            let before = previous.axes.get(index).copied().unwrap_or(neutral);
            let now = current.axes.get(index).copied().unwrap_or(neutral);
            if before == now {
                continue;
            }
            let Some(axis) = axis else {
                self.verbosity.skipped(format_args!(
                    "unmapped axis index {} on joystick {}",
                    index, id
                ));
                continue;
            };
            out.push(Event::controller_axis_move(
                id,
                axis,
                mapping::axis_value(axis, now),
            ));
        }

        let hats = previous.hats.len().max(current.hats.len());
        for index in 0..hats {
            let before = previous.hats.get(index).copied().unwrap_or(glfw::HAT_CENTERED);
            let now = current.hats.get(index).copied().unwrap_or(glfw::HAT_CENTERED);
            if before == now {
                continue;
            }
            if index != 0 {
                self.verbosity.skipped(format_args!(
                    "hat {} on joystick {} drives no d-pad",
                    index, id
                ));
                continue;
            }
            let before_state = mapping::hat_to_dpad(glfw::hat_position(before));
            let Some(state) = mapping::hat_to_dpad(glfw::hat_position(now)) else {
                self.verbosity.skipped(format_args!(
                    "hat mask {:#06b} on joystick {} has no d-pad state",
                    now, id
                ));
                continue;
            };
            if before_state == Some(state) {
                continue;
            }
            out.push(Event::controller_dpad(id, state));
        }
    }
}

impl Drop for PollDiffBackend {
    fn drop(&mut self) {
        self.release();
    }
}
