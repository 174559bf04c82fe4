//! Scripted native layers
//!
//! [`HeadlessPlatform`] hands out native layers that replay prepared frames
//! instead of talking to a display server. Each call to `poll`/`poll_events`
//! consumes one frame; once the script is exhausted the layers stay quiet.
//! Used by the test suites and by the demo binary when no device library is
//! compiled in.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, info};

use crate::backend::{
    BackendError, NativeEvent, NativeEventPump, NativePoller, NativeSurface, Platform,
    RawCallback, RawDeviceSnapshot, SurfaceSettings,
};
use crate::event::ControllerId;

/// Present/release counts shared between a platform and its native layers
#[derive(Clone, Debug, Default)]
pub struct HeadlessCounters {
    presents: Rc<Cell<u32>>,
    releases: Rc<Cell<u32>>,
}

impl HeadlessCounters {
    pub fn presents(&self) -> u32 {
        self.presents.get()
    }

    pub fn releases(&self) -> u32 {
        self.releases.get()
    }

    fn record_present(&self) {
        self.presents.set(self.presents.get() + 1);
    }

    fn record_release(&self) {
        self.releases.set(self.releases.get() + 1);
    }
}

/// One poll worth of poll-and-diff input
#[derive(Clone, Debug, Default)]
pub struct HeadlessFrame {
    pub callbacks: Vec<RawCallback>,
    /// New device list; `None` keeps the previous one
    pub joysticks: Option<Vec<(ControllerId, RawDeviceSnapshot)>>,
}

impl HeadlessFrame {
    pub fn callbacks(callbacks: Vec<RawCallback>) -> Self {
        Self {
            callbacks,
            joysticks: None,
        }
    }

    pub fn joysticks(joysticks: Vec<(ControllerId, RawDeviceSnapshot)>) -> Self {
        Self {
            callbacks: Vec::new(),
            joysticks: Some(joysticks),
        }
    }

    pub fn with_joysticks(mut self, joysticks: Vec<(ControllerId, RawDeviceSnapshot)>) -> Self {
        self.joysticks = Some(joysticks);
        self
    }
}

/// Event-driven native layer replaying queued frames
pub struct HeadlessPump {
    frames: VecDeque<Vec<NativeEvent>>,
    attached: Vec<ControllerId>,
    counters: HeadlessCounters,
    present_failure: Option<String>,
}

impl HeadlessPump {
    pub fn new(frames: Vec<Vec<NativeEvent>>, attached: Vec<ControllerId>) -> Self {
        Self {
            frames: frames.into(),
            attached,
            counters: HeadlessCounters::default(),
            present_failure: None,
        }
    }

    pub fn with_counters(mut self, counters: HeadlessCounters) -> Self {
        self.counters = counters;
        self
    }

    /// Every `present` fails with [`BackendError::Present`]
    pub fn with_present_failure(mut self, reason: Option<String>) -> Self {
        self.present_failure = reason;
        self
    }
}

fn present_frame(
    counters: &HeadlessCounters,
    failure: &Option<String>,
) -> Result<(), BackendError> {
    if let Some(reason) = failure {
        return Err(BackendError::Present(reason.clone()));
    }
    counters.record_present();
    Ok(())
}

impl NativeSurface for HeadlessPump {
    fn present(&mut self) -> Result<(), BackendError> {
        present_frame(&self.counters, &self.present_failure)
    }

    fn release(&mut self) {
        self.counters.record_release();
        self.frames.clear();
    }
}

impl NativeEventPump for HeadlessPump {
    fn poll(&mut self) -> Vec<NativeEvent> {
        self.frames.pop_front().unwrap_or_default()
    }

    fn attached_controllers(&self) -> Vec<ControllerId> {
        self.attached.clone()
    }
}

/// Poll-and-diff native layer replaying queued frames
pub struct HeadlessPoller {
    frames: VecDeque<HeadlessFrame>,
    joysticks: Vec<(ControllerId, RawDeviceSnapshot)>,
    callback: Option<Box<dyn FnMut(RawCallback)>>,
    counters: HeadlessCounters,
    present_failure: Option<String>,
}

impl HeadlessPoller {
    /// `joysticks` is the device list visible before the first frame
    pub fn new(
        frames: Vec<HeadlessFrame>,
        joysticks: Vec<(ControllerId, RawDeviceSnapshot)>,
    ) -> Self {
        Self {
            frames: frames.into(),
            joysticks,
            callback: None,
            counters: HeadlessCounters::default(),
            present_failure: None,
        }
    }

    pub fn with_counters(mut self, counters: HeadlessCounters) -> Self {
        self.counters = counters;
        self
    }

    /// Every `present` fails with [`BackendError::Present`]
    pub fn with_present_failure(mut self, reason: Option<String>) -> Self {
        self.present_failure = reason;
        self
    }
}

impl NativeSurface for HeadlessPoller {
    fn present(&mut self) -> Result<(), BackendError> {
        present_frame(&self.counters, &self.present_failure)
    }

    fn release(&mut self) {
        self.counters.record_release();
        self.frames.clear();
        self.joysticks.clear();
        self.callback = None;
    }
}

impl NativePoller for HeadlessPoller {
    fn set_callback(&mut self, callback: Box<dyn FnMut(RawCallback)>) {
        self.callback = Some(callback);
    }

    fn poll_events(&mut self) {
        let Some(frame) = self.frames.pop_front() else {
            return;
        };
        if let Some(callback) = self.callback.as_mut() {
            for raw in frame.callbacks {
                callback(raw);
            }
        }
        if let Some(joysticks) = frame.joysticks {
            self.joysticks = joysticks;
        }
    }

    fn joysticks(&mut self) -> Vec<(ControllerId, RawDeviceSnapshot)> {
        self.joysticks.clone()
    }
}

/// Platform handing out scripted native layers
///
/// Scripts are consumed by the first open of the matching variant.
#[derive(Default)]
pub struct HeadlessPlatform {
    pump_frames: Vec<Vec<NativeEvent>>,
    attached: Vec<ControllerId>,
    poll_frames: Vec<HeadlessFrame>,
    initial_joysticks: Vec<(ControllerId, RawDeviceSnapshot)>,
    failure: Option<String>,
    present_failure: Option<String>,
    counters: HeadlessCounters,
    last_settings: Option<SurfaceSettings>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pump_frames(mut self, frames: Vec<Vec<NativeEvent>>) -> Self {
        self.pump_frames = frames;
        self
    }

    /// Controllers reported by the event-driven layer at startup
    pub fn with_attached(mut self, attached: Vec<ControllerId>) -> Self {
        self.attached = attached;
        self
    }

    pub fn with_poll_frames(mut self, frames: Vec<HeadlessFrame>) -> Self {
        self.poll_frames = frames;
        self
    }

    pub fn with_initial_joysticks(
        mut self,
        joysticks: Vec<(ControllerId, RawDeviceSnapshot)>,
    ) -> Self {
        self.initial_joysticks = joysticks;
        self
    }

    /// Every open fails with [`BackendError::Initialization`]
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Opens succeed, but presenting a frame fails with [`BackendError::Present`]
    pub fn failing_present(mut self, reason: impl Into<String>) -> Self {
        self.present_failure = Some(reason.into());
        self
    }

    pub fn counters(&self) -> HeadlessCounters {
        self.counters.clone()
    }

    /// Settings passed to the most recent open
    pub fn last_settings(&self) -> Option<&SurfaceSettings> {
        self.last_settings.as_ref()
    }

    fn check_open(&mut self, settings: &SurfaceSettings) -> Result<(), BackendError> {
        if let Some(reason) = &self.failure {
            info!("Headless platform refusing to open: {}", reason);
            return Err(BackendError::Initialization(reason.clone()));
        }
        if settings.size.0 == 0 || settings.size.1 == 0 {
            return Err(BackendError::WindowCreation(format!(
                "invalid size {}x{}",
                settings.size.0, settings.size.1
            )));
        }
        self.last_settings = Some(settings.clone());
        Ok(())
    }
}

impl Platform for HeadlessPlatform {
    fn open_event_pump(
        &mut self,
        settings: &SurfaceSettings,
    ) -> Result<Box<dyn NativeEventPump>, BackendError> {
        self.check_open(settings)?;
        debug!(
            "Opening headless event pump with {} frames",
            self.pump_frames.len()
        );
        let pump = HeadlessPump::new(
            std::mem::take(&mut self.pump_frames),
            self.attached.clone(),
        )
        .with_counters(self.counters.clone())
        .with_present_failure(self.present_failure.clone());
        Ok(Box::new(pump))
    }

    fn open_poller(
        &mut self,
        settings: &SurfaceSettings,
    ) -> Result<Box<dyn NativePoller>, BackendError> {
        self.check_open(settings)?;
        debug!(
            "Opening headless poller with {} frames",
            self.poll_frames.len()
        );
        let poller = HeadlessPoller::new(
            std::mem::take(&mut self.poll_frames),
            std::mem::take(&mut self.initial_joysticks),
        )
        .with_counters(self.counters.clone())
        .with_present_failure(self.present_failure.clone());
        Ok(Box::new(poller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SurfaceSettings {
        SurfaceSettings {
            size: (512, 512),
            resizable: true,
            title: "test".to_string(),
            multisample: true,
            samples: 4,
            depth_buffer: 24,
            context_version: None,
        }
    }

    #[test]
    fn test_pump_replays_frames_then_goes_quiet() {
        let mut platform = HeadlessPlatform::new()
            .with_pump_frames(vec![vec![NativeEvent::Quit], vec![]])
            .with_attached(vec![4]);
        let mut pump = platform.open_event_pump(&settings()).unwrap();

        assert_eq!(pump.attached_controllers(), vec![4]);
        assert_eq!(pump.poll(), vec![NativeEvent::Quit]);
        assert!(pump.poll().is_empty());
        assert!(pump.poll().is_empty());
    }

    #[test]
    fn test_counters_are_shared() {
        let mut platform = HeadlessPlatform::new();
        let counters = platform.counters();
        let mut poller = platform.open_poller(&settings()).unwrap();

        poller.present().unwrap();
        poller.present().unwrap();
        poller.release();
        assert_eq!(counters.presents(), 2);
        assert_eq!(counters.releases(), 1);
        assert_eq!(platform.last_settings(), Some(&settings()));
    }

    #[test]
    fn test_failing_platform() {
        let mut platform = HeadlessPlatform::new().failing("no display");
        let err = platform.open_event_pump(&settings()).err().unwrap();
        assert!(matches!(err, BackendError::Initialization(reason) if reason == "no display"));
        assert!(platform.open_poller(&settings()).is_err());
    }

    #[test]
    fn test_present_failure() {
        let mut platform = HeadlessPlatform::new().failing_present("context lost");
        let counters = platform.counters();
        let mut pump = platform.open_event_pump(&settings()).unwrap();
        let mut poller = platform.open_poller(&settings()).unwrap();

        assert!(matches!(
            pump.present(),
            Err(BackendError::Present(reason)) if reason == "context lost"
        ));
        assert!(matches!(poller.present(), Err(BackendError::Present(_))));
        assert_eq!(counters.presents(), 0);
    }

    #[test]
    fn test_zero_size_window_is_rejected() {
        let mut platform = HeadlessPlatform::new();
        let mut zero = settings();
        zero.size = (0, 300);
        assert!(matches!(
            platform.open_poller(&zero).err(),
            Some(BackendError::WindowCreation(_))
        ));
    }

    #[test]
    fn test_poller_callbacks_and_persistent_devices() {
        use std::cell::RefCell;

        let pad = RawDeviceSnapshot {
            axes: vec![0.0; 6],
            buttons: vec![false; 11],
            hats: vec![0],
        };
        let mut poller = HeadlessPoller::new(
            vec![
                HeadlessFrame::callbacks(vec![RawCallback::Close]),
                HeadlessFrame::joysticks(vec![(1, pad.clone())]),
            ],
            Vec::new(),
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        poller.set_callback(Box::new(move |raw| sink.borrow_mut().push(raw)));

        poller.poll_events();
        assert_eq!(*seen.borrow(), vec![RawCallback::Close]);
        assert!(poller.joysticks().is_empty());

        poller.poll_events();
        poller.poll_events();
        assert_eq!(poller.joysticks(), vec![(1, pad)]);
    }
}
