//! Backend subsystem: native windowing layers behind one capability set
//!
//! Two backend variants reconcile different native delivery models:
//!
//! 1. [`event_driven`] - the native layer hands over a queue of classified events
//! 2. [`poll_diff`] - keyboard/mouse/window arrive through buffered callbacks,
//!    controllers are polled as raw arrays and diffed against the previous frame
//!
//! # Architecture
//!
//! ```text
//! Platform ──open──► NativeEventPump ──► EventDrivenBackend ─┐
//!          └─open──► NativePoller ─────► PollDiffBackend ────┴─► Backend ──[Event]──► Window
//! ```
//!
//! The native layers ([`NativeEventPump`], [`NativePoller`]) are external
//! collaborators; [`headless`] provides scripted ones.

pub mod event_driven;
#[cfg(feature = "gilrs")]
pub mod gilrs_pump;
pub mod headless;
pub mod mapping;
pub mod poll_diff;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, trace};

use crate::config::ContextVersion;
use crate::controller::Controller;
use crate::event::{ControllerId, Event};

pub use crate::backend::event_driven::{EventDrivenBackend, NativeEvent};
pub use crate::backend::headless::{
    HeadlessCounters, HeadlessFrame, HeadlessPlatform, HeadlessPoller, HeadlessPump,
};
pub use crate::backend::poll_diff::{PollDiffBackend, RawCallback, RawDeviceSnapshot};

/// Which backend variant a window runs on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    EventDriven,
    PollDiff,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::EventDriven => write!(f, "event-driven"),
            BackendKind::PollDiff => write!(f, "poll-and-diff"),
        }
    }
}

/// Backend errors
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Failed to initialize native layer: {0}")]
    Initialization(String),

    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    #[error("Unsupported by this platform: {0}")]
    Unsupported(String),

    /// Returned by [`NativeSurface::present`] when the native swap fails
    #[error("Failed to present frame: {0}")]
    Present(String),

    #[error("Backend resources were already released")]
    Released,
}

/// Window and context parameters handed to the native layer
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceSettings {
    pub size: (u32, u32),
    pub resizable: bool,
    pub title: String,
    pub multisample: bool,
    pub samples: u8,
    pub depth_buffer: u8,
    pub context_version: Option<ContextVersion>,
}

/// Capabilities every native window handle offers
pub trait NativeSurface {
    /// Swaps the framebuffers
    fn present(&mut self) -> Result<(), BackendError>;

    /// Frees the native window, context and device subsystems
    fn release(&mut self);
}

/// Native layer that delivers already classified events
pub trait NativeEventPump: NativeSurface {
    /// Everything queued since the last call; never blocks
    fn poll(&mut self) -> Vec<NativeEvent>;

    fn attached_controllers(&self) -> Vec<ControllerId>;
}

/// Native layer with callback delivery and pollable device arrays
pub trait NativePoller: NativeSurface {
    /// Installs the sink the native callbacks write into
    fn set_callback(&mut self, callback: Box<dyn FnMut(RawCallback)>);

    /// Pumps native events; callbacks run synchronously inside this call
    fn poll_events(&mut self);

    /// Raw axes/buttons/hats of every present gamepad
    fn joysticks(&mut self) -> Vec<(ControllerId, RawDeviceSnapshot)>;
}

/// Factory for native layers, one per windowing library
pub trait Platform {
    fn open_event_pump(
        &mut self,
        settings: &SurfaceSettings,
    ) -> Result<Box<dyn NativeEventPump>, BackendError>;

    fn open_poller(
        &mut self,
        settings: &SurfaceSettings,
    ) -> Result<Box<dyn NativePoller>, BackendError>;
}

/// Logging switches shared by the backends
#[derive(Clone, Copy, Debug, Default)]
pub struct Verbosity {
    pub log_skipped_events: bool,
}

impl Verbosity {
    pub(crate) fn skipped(&self, what: fmt::Arguments<'_>) {
        if self.log_skipped_events {
            info!("Event skipped: {}", what);
        } else {
            trace!("Event skipped: {}", what);
        }
    }
}

/// The active backend variant
pub enum Backend {
    EventDriven(EventDrivenBackend),
    PollDiff(PollDiffBackend),
}

impl Backend {
    /// Opens the native layer for `kind`; failures are fatal for the window
    pub fn open(
        kind: BackendKind,
        settings: &SurfaceSettings,
        platform: &mut dyn Platform,
        verbosity: Verbosity,
    ) -> Result<Self, BackendError> {
        info!("Opening {} backend with settings: {:?}", kind, settings);
        let backend = match kind {
            BackendKind::EventDriven => {
                let pump = platform.open_event_pump(settings)?;
                Backend::EventDriven(EventDrivenBackend::new(pump, verbosity))
            }
            BackendKind::PollDiff => {
                let poller = platform.open_poller(settings)?;
                Backend::PollDiff(PollDiffBackend::new(poller, verbosity))
            }
        };
        debug!("{} backend ready", kind);
        Ok(backend)
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::EventDriven(_) => BackendKind::EventDriven,
            Backend::PollDiff(_) => BackendKind::PollDiff,
        }
    }

    /// Canonical events for this frame
    pub fn produce_events(&mut self) -> Vec<Event> {
        match self {
            Backend::EventDriven(backend) => backend.produce_events(),
            Backend::PollDiff(backend) => backend.produce_events(),
        }
    }

    /// Controllers attached right now, used to seed the input state
    pub fn enumerate_controllers(&mut self) -> HashMap<ControllerId, Controller> {
        match self {
            Backend::EventDriven(backend) => backend.enumerate_controllers(),
            Backend::PollDiff(backend) => backend.enumerate_controllers(),
        }
    }

    pub fn present(&mut self) -> Result<(), BackendError> {
        match self {
            Backend::EventDriven(backend) => backend.present(),
            Backend::PollDiff(backend) => backend.present(),
        }
    }

    /// Releases native resources; later calls are no-ops
    pub fn release(&mut self) {
        match self {
            Backend::EventDriven(backend) => backend.release(),
            Backend::PollDiff(backend) => backend.release(),
        }
    }

    pub fn is_released(&self) -> bool {
        match self {
            Backend::EventDriven(backend) => backend.is_released(),
            Backend::PollDiff(backend) => backend.is_released(),
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind())
            .field("released", &self.is_released())
            .finish()
    }
}
