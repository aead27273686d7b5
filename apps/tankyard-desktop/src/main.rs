use anyhow::Result;
use clap::Parser;
use glam::Vec3;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tankyard_common::{GameConfig, Transform};
use tankyard_input::{InputSnapshot, Key, MouseButton};
use tankyard_kernel::{FrameLoop, FrameOutcome};
use tankyard_physics::CollisionShape;
use tankyard_tools::SessionInspector;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "tankyard-desktop", about = "Tankyard desktop client")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML game configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Local player number, as sent in position packets
    #[arg(long, default_value_t = 1)]
    player: i32,

    /// Number of crates dropped into the scene
    #[arg(long, default_value_t = 3)]
    crates: usize,
}

/// Ticks between window title refreshes.
const TITLE_EVERY: u64 = 30;

struct DesktopApp {
    game: FrameLoop,
    input: InputSnapshot,
    window: Option<Arc<Window>>,
    last_frame: Instant,
    last_title_tick: u64,
    failure: Option<anyhow::Error>,
}

impl DesktopApp {
    fn new(game: FrameLoop) -> Self {
        Self {
            game,
            input: InputSnapshot::new(),
            window: None,
            last_frame: Instant::now(),
            last_title_tick: 0,
            failure: None,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f64().min(0.1);
        self.last_frame = now;

        self.input.capture();
        let outcome = self.game.frame(dt, &self.input);

        let sent = self.game.drain_outbox().len();
        if sent > 0 {
            tracing::trace!(sent, "position packets produced");
        }

        if outcome == FrameOutcome::Shutdown {
            event_loop.exit();
            return;
        }

        let tick = self.game.tick_count();
        if tick >= self.last_title_tick + TITLE_EVERY {
            self.last_title_tick = tick;
            if let Some(window) = &self.window {
                window.set_title(&format!("Tankyard | {}", SessionInspector::summary(&self.game)));
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("Tankyard")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.failure = Some(anyhow::Error::new(e).context("creating window"));
                event_loop.exit();
                return;
            }
        };
        let size = window.inner_size();
        self.game.resize(size.width, size.height);
        self.last_frame = Instant::now();
        self.window = Some(window);
        tracing::info!(width = size.width, height = size.height, "window opened");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.game.window_closed();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.game.resize(new_size.width, new_size.height);
            }
            WindowEvent::Focused(false) => {
                self.input.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    self.input.set_key(key, key_state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => {
                if let Some(button) = map_button(button) {
                    self.input
                        .set_button(button, btn_state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.add_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyO => Key::O,
        KeyCode::Comma => Key::Comma,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    };
    Some(key)
}

fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let mut game = FrameLoop::new(config)?;
    let spawn_y = game.config().capsule_total_half_height() + 0.05;
    game.add_local_player("player", cli.player, Vec3::new(0.0, spawn_y, 0.0))?;
    for i in 0..cli.crates {
        let at = Vec3::new(-4.0 + 2.0 * i as f32, 6.0 + i as f32, -8.0);
        game.spawn_prop(
            &format!("crate-{i}"),
            1.0,
            CollisionShape::default(),
            Transform::from_position(at),
        )?;
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(game);
    event_loop.run_app(&mut app)?;

    if let Some(failure) = app.failure.take() {
        return Err(failure);
    }
    tracing::info!(summary = %SessionInspector::summary(&app.game), "session ended");
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("tankyard-desktop starting");

    // errors are reported, never turned into a failing exit status
    if let Err(e) = run(cli) {
        tracing::error!("tankyard-desktop stopped: {e:#}");
        eprintln!("tankyard-desktop: {e:#}");
    }
}
