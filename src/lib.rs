//! Input and window event abstraction
//!
//! Native windowing layers report keyboard, mouse, window and gamepad input in
//! their own shapes. This crate translates them into one canonical [`Event`]
//! stream and aggregates it into a queryable [`InputState`].
//!
//! ```text
//! Platform ──► Backend (event-driven | poll-and-diff)
//!                 │ produce_events
//!                 ▼
//!             InputState::update ──► Vec<Event> ──► application loop
//!                 │
//!                 └─► get_all_active / per-item queries
//! ```
//!
//! [`Window`] wires the pieces together for one native window.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod input;
pub mod window;

pub use crate::backend::{Backend, BackendError, BackendKind, HeadlessPlatform, Platform};
pub use crate::config::{ConfigError, ContextVersion, WindowConfig};
pub use crate::controller::{ActiveInput, Controller};
pub use crate::error::{Error, Result};
pub use crate::event::{
    ControllerAxis, ControllerButton, ControllerId, DpadState, Event, EventType, Key, MouseButton,
};
pub use crate::input::{ActiveInputNames, ActiveInputs, InputSettings, InputState};
pub use crate::window::Window;

#[cfg(feature = "gilrs")]
pub use crate::backend::gilrs_pump::GilrsPlatform;
