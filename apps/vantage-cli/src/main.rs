use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use vantage_channel::CommandChannel;
use vantage_common::{SimulatorConfig, Viewpoint};
use vantage_input::InputSampler;
use vantage_kernel::ViewpointMutator;
use vantage_render::{DebugTextRenderer, Lens, Renderer, Terrain};
use vantage_scheduler::{FramePacer, FrameScheduler, FrameTarget, LifecycleEvent, TickOutcome};

#[derive(Parser)]
#[command(name = "vantage-cli", about = "CLI tool for vantage operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the fixed configuration
    Info,
    /// Send raw payloads to a running command channel, one message each
    Send {
        /// Command channel URL
        #[arg(short, long, default_value = "ws://127.0.0.1:8081")]
        url: String,
        /// Payloads to send, e.g. `1 1 2` (0..=4, anything else is ignored)
        #[arg(required = true)]
        payloads: Vec<String>,
    },
    /// Run the command channel and scheduler without a window
    Headless {
        /// Number of ticks to run; 0 runs until Ctrl-C
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Print the final viewpoint as JSON
        #[arg(long)]
        json: bool,
        /// Print every rendered frame
        #[arg(long)]
        frames: bool,
    },
}

/// Headless frame target: renders each frame as text.
struct TextTarget {
    renderer: DebugTextRenderer,
    terrain: Terrain,
    print_frames: bool,
    last: String,
}

impl FrameTarget for TextTarget {
    type Error = Infallible;

    fn draw(&mut self, viewpoint: &Viewpoint) -> Result<(), Infallible> {
        self.last = self.renderer.render(viewpoint, &self.terrain);
        if self.print_frames {
            print!("{}", self.last);
        }
        Ok(())
    }

    fn set_pointer_lock(&mut self, locked: bool) {
        tracing::debug!(locked, "pointer lock has no effect headless");
    }
}

fn run_headless(config: SimulatorConfig, ticks: u64, json: bool, print_frames: bool) -> Result<()> {
    let mutator = ViewpointMutator::new();
    let channel = CommandChannel::spawn(config.listen_addr, mutator.clone())
        .context("starting command channel")?;
    println!("command channel on {}", channel.url());

    // Ctrl-C asks the scheduler to stop instead of killing the process.
    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit = quit.clone();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        std::thread::spawn(move || {
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    quit.store(true, Ordering::SeqCst);
                }
            })
        });
    }

    let mut sampler = InputSampler::new(config.velocity, config.sensitivity);
    let mut scheduler = FrameScheduler::new();
    let mut pacer = FramePacer::new(config.frame_rate, Instant::now());
    let mut target = TextTarget {
        renderer: DebugTextRenderer::new(Lens::from_config(&config)),
        terrain: Terrain::from_config(&config),
        print_frames,
        last: String::new(),
    };

    loop {
        if quit.load(Ordering::SeqCst) || (ticks > 0 && scheduler.frames() >= ticks) {
            scheduler.push_event(LifecycleEvent::CloseRequested);
        }
        pacer.sleep_until_due();
        pacer.frame_started(Instant::now());
        match scheduler.tick(&mut sampler, &mutator, &mut target) {
            Ok(TickOutcome::Rendered(_)) => {}
            Ok(TickOutcome::Stopped) => break,
            Err(never) => match never {},
        }
    }

    channel.shutdown();

    let v = mutator.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&v)?);
    } else {
        print!("{}", target.last);
        println!("frames: {}, commands applied: {}", scheduler.frames(), mutator.applied());
    }
    Ok(())
}

fn send(url: &str, payloads: &[String]) -> Result<usize> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime
        .block_on(vantage_channel::send_payloads(url, payloads))
        .with_context(|| format!("sending to {url}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = SimulatorConfig::load_or_default();

    match cli.command {
        Commands::Info => {
            println!("vantage-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", vantage_render::crate_info());
            println!(
                "window: {}x{}, fov {}, terrain {}x{}, {} Hz",
                config.window_width,
                config.window_height,
                config.fov_degrees,
                config.terrain_width,
                config.terrain_depth,
                config.frame_rate
            );
            println!(
                "velocity divisor {}, look sensitivity {}",
                config.velocity, config.sensitivity
            );
            println!("command channel: {}", config.listen_addr);
            let start = Viewpoint::default();
            println!(
                "start viewpoint: ({}, {}, {})",
                start.position.x, start.position.y, start.position.z
            );
        }
        Commands::Send { url, payloads } => {
            let sent = send(&url, &payloads)?;
            println!("sent {sent} payload(s) to {url}");
        }
        Commands::Headless {
            ticks,
            json,
            frames,
        } => run_headless(config, ticks, json, frames)?,
    }

    Ok(())
}
