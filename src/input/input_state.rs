//! Aggregated input state
//!
//! [`InputState`] consumes the canonical events of a frame and keeps track of
//! what is currently held: keys, mouse buttons, the mouse position, window
//! metadata and one [`Controller`] per registered device.
//!
//! # Controller self-healing
//!
//! Some backends deliver controller input before (or without) the matching
//! attach notification. Input for an unknown id is counted in
//! `missed_controllers` instead of being applied. The third miss registers the
//! controller and emits a synthetic `CONTROLLER_ADDED`.
//!
//! # Axis noise
//!
//! An axis update whose value differs from the stored one by less than the
//! tolerance is consumed: it changes nothing and is not returned.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, trace};

use crate::controller::{Controller, DEFAULT_ACTIVE_PRECISION};
use crate::event::{ControllerId, Event, EventType, Key, MouseButton};
use crate::input::snapshot::{ActiveInputNames, ActiveInputs};

/// Minimum axis delta accepted into state
pub const DEFAULT_AXIS_TOLERANCE: f32 = 0.01;

/// Number of events referencing an unknown controller before it is registered
pub const MISSED_CONTROLLER_THRESHOLD: u32 = 3;

/// Tunables of [`InputState`]
#[derive(Clone, Debug)]
pub struct InputSettings {
    /// Ingestion tolerance for axis updates
    pub axis_tolerance: f32,
    /// Reporting deadzone for [`InputState::get_all_active`]
    pub deadzone: f32,
    /// Log dropped events at info level instead of trace
    pub log_skipped_events: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            axis_tolerance: DEFAULT_AXIS_TOLERANCE,
            deadzone: DEFAULT_ACTIVE_PRECISION,
            log_skipped_events: false,
        }
    }
}

/// Last known window metadata; `None` until the backend reported it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindowMetadata {
    pub position: Option<(i32, i32)>,
    pub size: Option<(u32, u32)>,
    pub accessed: Option<bool>,
    pub active: Option<bool>,
}

#[derive(Debug)]
pub struct InputState {
    keys: HashMap<Key, bool>,
    mouse_buttons: HashMap<MouseButton, bool>,
    mouse_position: (f64, f64),
    controllers: BTreeMap<ControllerId, Controller>,
    window: WindowMetadata,
    quit: bool,
    missed_controllers: HashMap<ControllerId, u32>,
    settings: InputSettings,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl InputState {
    /// Creates a state seeded with the controllers attached at startup
    pub fn new(controllers: HashMap<ControllerId, Controller>) -> Self {
        Self::with_settings(controllers, InputSettings::default())
    }

    pub fn with_settings(
        controllers: HashMap<ControllerId, Controller>,
        settings: InputSettings,
    ) -> Self {
        debug!(
            "Creating InputState with {} controllers and settings: {:?}",
            controllers.len(),
            settings
        );
        Self {
            keys: HashMap::new(),
            mouse_buttons: HashMap::new(),
            mouse_position: (0.0, 0.0),
            controllers: controllers.into_iter().collect(),
            window: WindowMetadata::default(),
            quit: false,
            missed_controllers: HashMap::new(),
            settings,
        }
    }

    /// Applies a frame of events and returns the ones that were not suppressed
    ///
    /// Returned events keep their arrival order. Self-healing may insert a
    /// synthetic `CONTROLLER_ADDED` at the position of the event that
    /// triggered it.
    pub fn update<I>(&mut self, events: I) -> Vec<Event>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut forwarded = Vec::new();

        for event in events {
            match event.kind {
                EventType::KeyDown | EventType::KeyUp => {
                    if let Some(key) = event.key {
                        self.keys.insert(key, event.kind == EventType::KeyDown);
                    }
                }

                EventType::MouseDown | EventType::MouseUp => {
                    if let Some(button) = event.mouse_button {
                        self.mouse_buttons
                            .insert(button, event.kind == EventType::MouseDown);
                    }
                }
                EventType::MouseMove => {
                    if let Some(position) = event.mouse_position {
                        self.mouse_position = position;
                    }
                }
                EventType::MouseWheel => {}

                EventType::ControllerButtonDown | EventType::ControllerButtonUp => {
                    let (Some(id), Some(button)) = (event.controller_id, event.controller_button)
                    else {
                        self.skip(&event, "controller button event without id or button");
                        continue;
                    };
                    match self.controllers.get_mut(&id) {
                        Some(controller) => {
                            let pressed = event.kind == EventType::ControllerButtonDown;
                            controller.update_button(button, pressed, event.dpad);
                        }
                        None => {
                            if let Some(added) = self.missing_controller_process(id) {
                                forwarded.push(added);
                            }
                            continue;
                        }
                    }
                }

                EventType::ControllerAxisMove => {
                    let (Some(id), Some(axis), Some(value)) =
                        (event.controller_id, event.axis, event.axis_value)
                    else {
                        self.skip(&event, "axis event without id, axis or value");
                        continue;
                    };
                    let tolerance = self.settings.axis_tolerance;
                    match self.controllers.get_mut(&id) {
                        Some(controller) => {
                            let stored = controller.get_axis(axis).unwrap_or(0.0);
                            if (value - stored).abs() < tolerance {
                                trace!(
                                    "Axis {:?} of controller {} moved {:.4} -> {:.4}, below tolerance",
                                    axis,
                                    id,
                                    stored,
                                    value
                                );
                                continue;
                            }
                            controller.update_axis(axis, value);
                        }
                        None => {
                            if let Some(added) = self.missing_controller_process(id) {
                                forwarded.push(added);
                            }
                            continue;
                        }
                    }
                }

                EventType::ControllerAdded => {
                    if let Some(id) = event.controller_id {
                        info!("Controller {} added", id);
                        self.missed_controllers.remove(&id);
                        self.controllers.insert(id, Controller::new());
                    }
                }
                EventType::ControllerRemoved => {
                    if let Some(id) = event.controller_id {
                        info!("Controller {} removed", id);
                        self.missed_controllers.remove(&id);
                        self.controllers.remove(&id);
                    }
                }

                EventType::Quit => self.quit = true,
                EventType::WindowMove => {
                    if event.window_position.is_some() {
                        self.window.position = event.window_position;
                    }
                }
                EventType::WindowResize => {
                    if event.window_size.is_some() {
                        self.window.size = event.window_size;
                    }
                }
                EventType::WindowAccess => {
                    if event.is_accessed.is_some() {
                        self.window.accessed = event.is_accessed;
                    }
                }
                EventType::WindowActivation => {
                    if event.is_active.is_some() {
                        self.window.active = event.is_active;
                    }
                }
            }

            forwarded.push(event);
        }

        forwarded
    }

    // Counts an event for an unregistered controller and registers it on the
    // third miss. The triggering event itself is never applied.
    fn missing_controller_process(&mut self, id: ControllerId) -> Option<Event> {
        let count = self.missed_controllers.entry(id).or_insert(0);
        *count += 1;

        if *count < MISSED_CONTROLLER_THRESHOLD {
            debug!(
                "Event for unknown controller {} dropped ({}/{})",
                id, count, MISSED_CONTROLLER_THRESHOLD
            );
            return None;
        }

        info!(
            "Controller {} referenced {} times without attach notification, registering it",
            id, MISSED_CONTROLLER_THRESHOLD
        );
        self.missed_controllers.remove(&id);
        self.controllers.insert(id, Controller::new());
        Some(Event::controller_added(id))
    }

    fn skip(&self, event: &Event, reason: &str) {
        if self.settings.log_skipped_events {
            info!("Event skipped ({}): {}", reason, event);
        } else {
            trace!("Event skipped ({}): {}", reason, event);
        }
    }

    /// Held keys, held mouse buttons and per-controller active inputs
    pub fn get_all_active(&self) -> ActiveInputs {
        let mut keys: Vec<Key> = self
            .keys
            .iter()
            .filter(|(_, held)| **held)
            .map(|(key, _)| *key)
            .collect();
        keys.sort();

        let mut mouse_buttons: Vec<MouseButton> = self
            .mouse_buttons
            .iter()
            .filter(|(_, held)| **held)
            .map(|(button, _)| *button)
            .collect();
        mouse_buttons.sort();

        let controllers = self
            .controllers
            .iter()
            .map(|(id, controller)| (*id, controller.get_active(self.settings.deadzone)))
            .collect();

        ActiveInputs {
            keys,
            mouse_buttons,
            mouse_position: self.mouse_position,
            controllers,
            quit: self.quit,
        }
    }

    /// Same as [`Self::get_all_active`] with display names instead of enum members
    pub fn get_all_active_names(&self) -> ActiveInputNames {
        self.get_all_active().names()
    }

    pub fn is_key_held(&self, key: Key) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    pub fn is_mouse_button_held(&self, button: MouseButton) -> bool {
        self.mouse_buttons.get(&button).copied().unwrap_or(false)
    }

    pub fn mouse_position(&self) -> (f64, f64) {
        self.mouse_position
    }

    pub fn controller(&self, id: ControllerId) -> Option<&Controller> {
        self.controllers.get(&id)
    }

    pub fn controllers(&self) -> &BTreeMap<ControllerId, Controller> {
        &self.controllers
    }

    pub fn window(&self) -> &WindowMetadata {
        &self.window
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Consecutive misses recorded for an unregistered controller id
    pub fn missed_count(&self, id: ControllerId) -> u32 {
        self.missed_controllers.get(&id).copied().unwrap_or(0)
    }

    pub fn settings(&self) -> &InputSettings {
        &self.settings
    }
}
