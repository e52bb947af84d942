use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use gesture_fireworks_core::{
    AppConfig, BlankStencil, CannedWish, CelebrationSession, FontStencil, FrameCanvas, HandFrame,
    ParticleStage, Point, RenderLoop, TextStencil,
};
use tracing_subscriber::EnvFilter;

fn main() -> gesture_fireworks_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { name, font, ticks } => run_demo(&name, font.as_deref(), ticks),
        Commands::Burst {
            text,
            font,
            output,
            ticks,
            width,
            height,
        } => run_burst(&text, &font, &output, ticks, width, height),
    }
}

fn run_demo(
    name: &str,
    font: Option<&std::path::Path>,
    trailing_ticks: u32,
) -> gesture_fireworks_core::Result<()> {
    tracing::info!(name, "starting scripted demo");

    let config = AppConfig::default();
    let stencil = load_stencil(font, &config)?;
    let mut session = CelebrationSession::new(
        config,
        stencil,
        &CannedWish::default(),
        name,
        "ACCEPT",
        1280,
        720,
    );
    tracing::info!(wish = session.wish(), "wish resolved");

    // Fist, open into palm, then wave side to side.
    let script: Vec<Option<HandFrame>> = vec![
        Some(HandFrame::synthetic_fist(0.5)),
        Some(HandFrame::synthetic_fist(0.5)),
        Some(HandFrame::synthetic_palm(0.5)),
        Some(HandFrame::synthetic_palm(0.3)),
        Some(HandFrame::synthetic_palm(0.6)),
        Some(HandFrame::synthetic_palm(0.3)),
        None,
    ];

    for frame in &script {
        let classification = session.ingest_frame(frame.as_ref(), Instant::now());
        tracing::info!(
            gesture = ?classification.gesture,
            events = classification.events.len(),
            candles_lit = session.candles_lit(),
            "frame classified"
        );
        // Render runs roughly twice per capture frame.
        session.tick();
        session.tick();
    }

    // Let the remaining particles decay on a steady 60Hz-style cadence.
    let mut render_loop = RenderLoop::new(Duration::from_millis(16));
    render_loop.run_frames(u64::from(trailing_ticks), |_| session.tick());

    tracing::info!(
        particles = session.particle_count(),
        ticks = render_loop.clock().ticks,
        "demo finished"
    );
    Ok(())
}

fn run_burst(
    text: &str,
    font: &PathBuf,
    output: &PathBuf,
    ticks: u32,
    width: u32,
    height: u32,
) -> gesture_fireworks_core::Result<()> {
    tracing::info!(text, ?output, "rendering burst");

    if width == 0 || height == 0 {
        return Err(gesture_fireworks_core::FireworksError::InvalidInput(
            "burst frame must have a non-zero area",
        ));
    }

    let config = AppConfig::default();
    let stencil = FontStencil::from_file(font, config.stencil.clone())?;
    let mut stage = ParticleStage::new(config.stage, Box::new(stencil));
    let mut canvas = FrameCanvas::new(width, height);

    let origin = Point::new(width as f32 * 0.5, height as f32 * 0.3);
    stage.spawn_text_burst(origin, text);
    tracing::info!(particles = stage.len(), "burst spawned");

    for _ in 0..ticks {
        stage.advance(&mut canvas);
    }
    canvas.save_png(output)?;
    tracing::info!(?output, "frame written");
    Ok(())
}

fn load_stencil(
    font: Option<&std::path::Path>,
    config: &AppConfig,
) -> gesture_fireworks_core::Result<Box<dyn TextStencil>> {
    match font {
        Some(path) => Ok(Box::new(FontStencil::from_file(
            path,
            config.stencil.clone(),
        )?)),
        None => {
            tracing::warn!("no font given, bursts will be invisible");
            Ok(Box::new(BlankStencil::new(config.stencil.clone())))
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Gesture-driven celebratory display", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scripted gesture sequence through a full session.
    Demo {
        /// Name the wish is addressed to.
        #[arg(short, long, default_value = "friend")]
        name: String,
        /// Optional font file used to shape the bursts.
        #[arg(short, long)]
        font: Option<PathBuf>,
        /// Extra render ticks after the script, to let particles decay.
        #[arg(short, long, default_value_t = 150)]
        ticks: u32,
    },
    /// Spawn one text burst and write the resulting frame as a PNG.
    Burst {
        /// Text the burst should take the shape of.
        #[arg(short = 'x', long, default_value = "ACCEPT")]
        text: String,
        /// Font file used to rasterise the text.
        #[arg(short, long)]
        font: PathBuf,
        /// Output path for the rendered frame.
        #[arg(short, long)]
        output: PathBuf,
        /// Render ticks to advance before capturing the frame.
        #[arg(short, long, default_value_t = 30)]
        ticks: u32,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
    },
}
