use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use vantage_channel::CommandChannel;
use vantage_common::{SimulatorConfig, Viewpoint};
use vantage_input::{InputSampler, MoveKey};
use vantage_kernel::ViewpointMutator;
use vantage_render::{Lens, Terrain};
use vantage_render_wgpu::{GpuContext, GpuError, WgpuRenderer};
use vantage_scheduler::{
    FramePacer, FrameScheduler, FrameTarget, LifecycleEvent, SchedulerState, TickOutcome,
};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "vantage-desktop", about = "First-person viewer with a remote command channel")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn move_key(code: KeyCode) -> Option<MoveKey> {
    match code {
        KeyCode::KeyW => Some(MoveKey::Forward),
        KeyCode::KeyS => Some(MoveKey::Back),
        KeyCode::KeyA => Some(MoveKey::Left),
        KeyCode::KeyD => Some(MoveKey::Right),
        _ => None,
    }
}

fn lifecycle_key(code: KeyCode) -> Option<LifecycleEvent> {
    match code {
        KeyCode::Escape => Some(LifecycleEvent::EscapePressed),
        KeyCode::F1 => Some(LifecycleEvent::TogglePointerLock),
        _ => None,
    }
}

fn set_pointer_lock(window: &Window, locked: bool) {
    if locked {
        // Not every platform supports a hard lock; confinement is the fallback.
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(e) = grabbed {
            tracing::warn!("pointer lock unavailable: {e}");
        }
    } else if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
        tracing::warn!("failed to release pointer: {e}");
    }
    window.set_cursor_visible(!locked);
}

/// Wake at the next frame deadline, or once it has passed, sleep until the
/// requested redraw (or any other event) arrives. A hidden window may never
/// deliver that redraw, and waiting on a past deadline would spin.
fn next_control_flow(pacer: &FramePacer, now: Instant) -> ControlFlow {
    if pacer.is_due(now) {
        ControlFlow::Wait
    } else {
        ControlFlow::WaitUntil(pacer.deadline())
    }
}

/// Window plus everything needed to draw into it.
struct Gpu {
    window: Arc<Window>,
    context: GpuContext,
    renderer: WgpuRenderer,
}

/// Frame target for one tick: render into the window and present.
struct WindowTarget<'a> {
    gpu: &'a Gpu,
}

impl FrameTarget for WindowTarget<'_> {
    type Error = GpuError;

    fn draw(&mut self, viewpoint: &Viewpoint) -> Result<(), GpuError> {
        if !self.gpu.context.present(&self.gpu.renderer, viewpoint)? {
            tracing::debug!("frame skipped");
        }
        Ok(())
    }

    fn set_pointer_lock(&mut self, locked: bool) {
        set_pointer_lock(&self.gpu.window, locked);
    }
}

/// Application state.
struct ViewerApp {
    config: SimulatorConfig,
    mutator: ViewpointMutator,
    sampler: InputSampler,
    scheduler: FrameScheduler,
    pacer: FramePacer,
    terrain: Terrain,
    gpu: Option<Gpu>,
    fatal: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(config: SimulatorConfig, mutator: ViewpointMutator) -> Self {
        Self {
            sampler: InputSampler::new(config.velocity, config.sensitivity),
            scheduler: FrameScheduler::new(),
            pacer: FramePacer::new(config.frame_rate, Instant::now()),
            terrain: Terrain::from_config(&config),
            config,
            mutator,
            gpu: None,
            fatal: None,
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Vantage")
            .with_inner_size(PhysicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);

        let size = window.inner_size();
        let context = GpuContext::new(window.clone(), size.width, size.height)
            .context("initializing graphics")?;
        let (width, height) = context.size();
        let renderer = WgpuRenderer::new(
            context.device(),
            context.format(),
            width,
            height,
            &self.terrain,
            Lens::from_config(&self.config),
        );

        set_pointer_lock(&window, self.scheduler.pointer_locked());
        Ok(Gpu {
            window,
            context,
            renderer,
        })
    }

    /// Graphics and window failures end the process.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("fatal: {err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn run_tick(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        // Expose and resize redraws arrive off-schedule; movement is per tick.
        let now = Instant::now();
        if !self.pacer.is_due(now) {
            return;
        }
        self.pacer.frame_started(now);

        let mut target = WindowTarget { gpu };
        match self
            .scheduler
            .tick(&mut self.sampler, &self.mutator, &mut target)
        {
            Ok(TickOutcome::Rendered(_)) => {}
            Ok(TickOutcome::Stopped) => event_loop.exit(),
            Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("rendering frame")),
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.scheduler.push_event(LifecycleEvent::CloseRequested);
            }
            WindowEvent::Focused(false) => {
                self.sampler.release_all();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.context
                        .resize(&mut gpu.renderer, new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if let Some(k) = move_key(key) {
                    self.sampler.set_key(k, pressed);
                } else if let Some(lifecycle) = lifecycle_key(key) {
                    if pressed && !repeat {
                        self.scheduler.push_event(lifecycle);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.run_tick(event_loop),
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
            if self.scheduler.pointer_locked() {
                self.sampler.pointer_moved(delta.0, delta.1);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        if self.scheduler.has_pending_events() {
            let mut target = WindowTarget { gpu };
            if self.scheduler.handle_events(&mut target) == SchedulerState::Stopped {
                event_loop.exit();
                return;
            }
        }

        let now = Instant::now();
        if self.pacer.is_due(now) {
            gpu.window.request_redraw();
        }
        event_loop.set_control_flow(next_control_flow(&self.pacer, now));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("vantage-desktop starting");

    let config = SimulatorConfig::load_or_default();
    let mutator = ViewpointMutator::new();
    let channel = CommandChannel::spawn(config.listen_addr, mutator.clone())
        .context("starting command channel")?;

    let event_loop = EventLoop::new()?;
    let mut app = ViewerApp::new(config, mutator);
    let run = event_loop.run_app(&mut app);

    // The listener lives exactly as long as the frame loop.
    channel.shutdown();
    run?;
    if let Some(err) = app.fatal.take() {
        return Err(err);
    }

    let v = app.mutator.snapshot();
    tracing::info!(
        frames = app.scheduler.frames(),
        "stopped at ({:.2}, {:.2}, {:.2})",
        v.position.x,
        v.position.y,
        v.position.z
    );
    Ok(())
}
