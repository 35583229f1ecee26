use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pixelboard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame of the reveal animation as a PNG.
    Frame(FrameArgs),
    /// Render a run of frames to an MP4 (requires `ffmpeg` on PATH) or a PNG directory.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Input board scene JSON. Relative image paths resolve next to it.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Simulated display rate.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Override the scene's random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads for image loading.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Frame index (0-based) from the start of the cycle.
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Presentation width; scaled nearest-neighbour.
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Presentation height; scaled nearest-neighbour.
    #[arg(long, requires = "width")]
    height: Option<u32>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output `.mp4` file, or a directory for a PNG sequence.
    #[arg(long)]
    out: PathBuf,

    /// Number of frames; defaults to one full cycle.
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_engine(args: &SceneArgs) -> anyhow::Result<(pixelboard::BoardEngine, pixelboard::Fps)> {
    let scene = pixelboard::BoardScene::from_path(&args.in_path)
        .with_context(|| format!("load scene '{}'", args.in_path.display()))?;
    let fps = pixelboard::Fps::new(args.fps, 1)?;

    let mut opts = scene.opts.clone();
    if args.seed.is_some() {
        opts.seed = args.seed;
    }
    let mut engine = pixelboard::BoardEngine::new(opts)?;

    let root = args
        .in_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let source = pixelboard::AutoImageSource::new(root)?;
    let failures = engine.load(
        scene.board,
        scene.domains,
        &source,
        &pixelboard::LoaderOpts {
            threads: args.threads,
        },
    )?;
    if !failures.is_empty() {
        eprintln!("{} image(s) fell back to placeholders", failures.len());
    }
    Ok((engine, fps))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (mut engine, fps) = load_engine(&args.scene)?;
    engine.restart()?;
    for i in 0..args.frame {
        engine.tick(fps.frame_start(i))?;
    }
    let frame = engine.tick(fps.frame_start(args.frame))?.clone();

    let status = engine.status();
    let frame = match (args.width, args.height) {
        (Some(w), Some(h)) => pixelboard::present_nearest(&frame, w, h)?,
        _ => frame,
    };
    pixelboard::write_png(&frame, &args.out)?;

    eprintln!(
        "wrote {} ({}, {}/{} cells, {}% complete)",
        args.out.display(),
        status.phase,
        status.visible_count,
        status.total_grid_pixels,
        status.completion_percentage
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut engine, fps) = load_engine(&args.scene)?;
    let frames = args
        .frames
        .unwrap_or_else(|| pixelboard::cycle_frame_count(&engine, fps));

    let is_mp4 = args
        .out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"));
    let mut sink: Box<dyn pixelboard::FrameSink> = if is_mp4 {
        Box::new(pixelboard::FfmpegSink::new(pixelboard::FfmpegSinkOpts::new(
            &args.out,
        )))
    } else {
        Box::new(pixelboard::PngSequenceSink::new(&args.out))
    };

    let stats = pixelboard::export_frames(&mut engine, fps, frames, &mut sink)?;
    eprintln!("wrote {} ({} frames)", args.out.display(), stats.frames);
    Ok(())
}
