//! Window composition root
//!
//! A [`Window`] owns exactly one backend and one [`InputState`]. Per frame the
//! application calls [`Window::events`], which runs
//!
//! ```text
//! Backend::produce_events ──► InputState::update ──► Vec<Event> (returned)
//! ```
//!
//! and afterwards queries the aggregated state through
//! [`Window::get_all_active`] or [`Window::input_state`].

use tracing::{debug, info};

use crate::backend::{Backend, BackendError, BackendKind, Platform};
use crate::config::WindowConfig;
use crate::error::Result;
use crate::event::Event;
use crate::input::{ActiveInputNames, ActiveInputs, InputState};

#[derive(Debug)]
pub struct Window {
    backend: Backend,
    input_state: InputState,
    log_caught_events: bool,
}

impl Window {
    /// Validates `config`, opens the native layer and seeds the input state
    /// with the controllers attached right now
    pub fn new(config: &WindowConfig, platform: &mut dyn Platform) -> Result<Self> {
        config.validate()?;
        let surface = config.surface_settings()?;

        let mut backend = Backend::open(config.backend, &surface, platform, config.verbosity())?;
        let controllers = backend.enumerate_controllers();
        info!(
            "Window {:?} ready on {} backend with {} controllers",
            config.title,
            backend.kind(),
            controllers.len()
        );

        Ok(Self {
            backend,
            input_state: InputState::with_settings(controllers, config.input_settings()),
            log_caught_events: config.log_caught_events,
        })
    }

    /// Canonical events of this frame, after state aggregation
    pub fn events(&mut self) -> Vec<Event> {
        let raw = self.backend.produce_events();
        let events = self.input_state.update(raw);
        if self.log_caught_events {
            for event in &events {
                info!("Event caught: {}", event);
            }
        }
        events
    }

    pub fn get_all_active(&self) -> ActiveInputs {
        self.input_state.get_all_active()
    }

    pub fn get_all_active_names(&self) -> ActiveInputNames {
        self.input_state.get_all_active_names()
    }

    pub fn input_state(&self) -> &InputState {
        &self.input_state
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Presents the rendered frame
    pub fn display(&mut self) -> std::result::Result<(), BackendError> {
        self.backend.present()
    }

    /// Releases the native window; safe to call more than once
    pub fn quit(&mut self) {
        debug!("Quitting window");
        self.backend.release();
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_released()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessPlatform, NativeEvent};
    use crate::error::Error;
    use crate::event::{EventType, Key};

    #[test]
    fn test_events_flow_through_input_state() {
        let mut platform = HeadlessPlatform::new().with_pump_frames(vec![
            vec![NativeEvent::KeyDown { keycode: 32 }],
            vec![NativeEvent::KeyUp { keycode: 32 }, NativeEvent::Quit],
        ]);
        let mut window = Window::new(&WindowConfig::default(), &mut platform).unwrap();

        assert_eq!(window.events(), vec![Event::key_down(Key::Space)]);
        assert!(window.input_state().is_key_held(Key::Space));
        assert_eq!(window.get_all_active_names().keys, vec!["SPACE"]);

        let events = window.events();
        assert_eq!(events.last().map(|e| e.kind), Some(EventType::Quit));
        assert!(window.get_all_active().keys.is_empty());
        assert!(window.input_state().quit_requested());
    }

    #[test]
    fn test_attached_controllers_seed_state() {
        let mut platform = HeadlessPlatform::new().with_attached(vec![0, 5]);
        let window = Window::new(&WindowConfig::default(), &mut platform).unwrap();

        let active = window.get_all_active();
        assert_eq!(active.controllers.keys().copied().collect::<Vec<_>>(), vec![0, 5]);
        assert!(active.controllers.values().all(|inputs| inputs.is_empty()));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_opening() {
        let mut platform = HeadlessPlatform::new();
        let config = WindowConfig {
            deadzone: 2.0,
            ..WindowConfig::default()
        };
        assert!(matches!(
            Window::new(&config, &mut platform),
            Err(Error::Config(_))
        ));
        assert!(platform.last_settings().is_none());
    }

    #[test]
    fn test_init_failure_is_backend_error() {
        let mut platform = HeadlessPlatform::new().failing("no display");
        assert!(matches!(
            Window::new(&WindowConfig::default(), &mut platform),
            Err(Error::Backend(BackendError::Initialization(_)))
        ));
    }

    #[test]
    fn test_quit_then_display() {
        let mut platform = HeadlessPlatform::new();
        let counters = platform.counters();
        let mut window = Window::new(&WindowConfig::default(), &mut platform).unwrap();

        window.display().unwrap();
        window.quit();
        window.quit();
        assert!(window.is_closed());
        assert!(matches!(window.display(), Err(BackendError::Released)));
        assert!(window.events().is_empty());
        drop(window);

        assert_eq!(counters.presents(), 1);
        assert_eq!(counters.releases(), 1);
    }
}
