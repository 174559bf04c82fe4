use chrono::Local;
use color_eyre::{eyre::eyre, Result};
use inputforge::{ControllerButton, Event, EventType, Key, Platform};
use inputforge::{Window, WindowConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const FRAME_TIME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    setup()?;

    let config = load_config()?;
    info!("Starting with config: {:?}", config);

    let mut platform = platform(&config);
    let mut window = Window::new(&config, platform.as_mut())
        .map_err(|e| eyre!("Failed to create window: {}", e))?;

    run(&mut window)?;

    window.quit();
    info!("Shutdown complete");
    Ok(())
}

fn run(window: &mut Window) -> Result<()> {
    let mut event_count = 0;
    let mut last_log_time = Local::now();
    let log_interval = chrono::Duration::seconds(1);

    loop {
        let events = window.events();
        event_count += events.len();
        if events.iter().any(is_exit) {
            info!("Exit requested");
            return Ok(());
        }

        let now = Local::now();
        if now - last_log_time > log_interval {
            let active = window.get_all_active_names();
            info!(
                "{} events in last {} seconds, held keys: {:?}, mouse: {:?}, controllers: {:?}",
                event_count,
                log_interval.num_seconds(),
                active.keys,
                active.mouse_buttons,
                active.controllers
            );
            event_count = 0;
            last_log_time = now;
        }

        window.display()?;
        std::thread::sleep(FRAME_TIME);
    }
}

fn is_exit(event: &Event) -> bool {
    match event.kind {
        EventType::Quit => true,
        EventType::KeyDown => event.key == Some(Key::Esc),
        EventType::ControllerButtonDown => event.controller_button == Some(ControllerButton::Start),
        _ => false,
    }
}

fn load_config() -> Result<WindowConfig> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(WindowConfig::default_path);

    let config = match path {
        Some(path) => WindowConfig::load_or_default(&path)?,
        None => {
            warn!("No config directory available, using defaults");
            WindowConfig::default()
        }
    };
    Ok(config)
}

#[cfg(feature = "gilrs")]
fn platform(config: &WindowConfig) -> Box<dyn Platform> {
    if config.backend == inputforge::BackendKind::PollDiff {
        warn!("gilrs supports the event-driven backend only");
    }
    Box::new(inputforge::GilrsPlatform)
}

#[cfg(not(feature = "gilrs"))]
fn platform(config: &WindowConfig) -> Box<dyn Platform> {
    info!("No device library compiled in, replaying a scripted session");
    Box::new(demo::platform(config.backend))
}

#[cfg(not(feature = "gilrs"))]
mod demo {
    use inputforge::backend::mapping::{glfw, sdl};
    use inputforge::backend::{HeadlessFrame, NativeEvent, RawCallback, RawDeviceSnapshot};
    use inputforge::{BackendKind, HeadlessPlatform};
    use tracing::debug;

    // A short session: a key press, a controller that connects late and pushes a
    // stick, then a close request.
    pub fn platform(kind: BackendKind) -> HeadlessPlatform {
        debug!("Building demo script for {} backend", kind);
        match kind {
            BackendKind::EventDriven => HeadlessPlatform::new().with_pump_frames(vec![
                vec![NativeEvent::KeyDown { keycode: sdl::SDLK_SPACE }],
                vec![NativeEvent::ControllerDeviceAdded { instance_id: 0 }],
                vec![NativeEvent::ControllerAxisMotion {
                    instance_id: 0,
                    axis: sdl::CONTROLLER_AXIS_LEFTX,
                    value: 0.75,
                }],
                vec![NativeEvent::KeyUp { keycode: sdl::SDLK_SPACE }],
                vec![NativeEvent::Quit],
            ]),
            BackendKind::PollDiff => {
                let idle = RawDeviceSnapshot {
                    axes: vec![0.0, 0.0, 0.0, 0.0, -1.0, -1.0],
                    buttons: vec![false; 11],
                    hats: vec![glfw::HAT_CENTERED],
                };
                let mut pushed = idle.clone();
                pushed.axes[glfw::GAMEPAD_AXIS_LEFT_X] = 0.75;

                HeadlessPlatform::new().with_poll_frames(vec![
                    HeadlessFrame::callbacks(vec![RawCallback::Key {
                        key: glfw::KEY_SPACE,
                        action: glfw::PRESS,
                    }]),
                    HeadlessFrame::joysticks(vec![(0, idle)]),
                    HeadlessFrame::joysticks(vec![(0, pushed)]),
                    HeadlessFrame::callbacks(vec![RawCallback::Key {
                        key: glfw::KEY_SPACE,
                        action: glfw::RELEASE,
                    }]),
                    HeadlessFrame::callbacks(vec![RawCallback::Close]),
                ])
            }
        }
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
