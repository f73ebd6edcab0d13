use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "moshpit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an effect chain over a sequence of image frames, writing one PNG per frame.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Chain document (JSON).
    #[arg(long)]
    chain: PathBuf,

    /// Output directory; frames are written as `frame_00000.png`, ...
    #[arg(long)]
    out_dir: PathBuf,

    /// Still image appended to the media source list (repeatable, index order).
    #[arg(long = "media")]
    media: Vec<PathBuf>,

    /// External timeline frame for motion-smear bloom (repeatable).
    #[arg(long = "timeline")]
    timeline: Vec<PathBuf>,

    /// Run block motion search on a thread pool.
    #[arg(long)]
    parallel: bool,

    /// Thread count for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    /// Input frames, in playback order. The frame index is its timestamp.
    #[arg(required = true)]
    frames: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frames(args) => cmd_frames(args),
    }
}

fn read_chain(path: &Path) -> anyhow::Result<moshpit::EffectChain> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("open chain '{}'", path.display()))?;
    let chain = moshpit::EffectChain::from_json_str(&s)
        .with_context(|| format!("parse chain '{}'", path.display()))?;
    Ok(chain)
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let chain = read_chain(&args.chain)?;

    let mut media = moshpit::MediaSources::new();
    for p in &args.media {
        let img = moshpit::load_image(p).with_context(|| format!("load media '{}'", p.display()))?;
        media.append(img);
    }
    let timeline = args
        .timeline
        .iter()
        .map(|p| {
            moshpit::load_image(p).with_context(|| format!("load timeline '{}'", p.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut driver = moshpit::ChainDriver::new(&moshpit::ChainDriverOpts {
        parallel_search: args.parallel,
        threads: args.threads,
    })?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut totals = moshpit::RenderStats::default();
    for (i, path) in args.frames.iter().enumerate() {
        let mut frame = moshpit::load_frame(path, i as f64)
            .with_context(|| format!("load frame '{}'", path.display()))?;
        let stats = driver.render(&mut frame, &chain, &media, &timeline);
        totals.applied += stats.applied;
        totals.pass_through += stats.pass_through;
        totals.skipped += stats.skipped;
        totals.degraded += stats.degraded;

        let out = args.out_dir.join(format!("frame_{i:05}.png"));
        moshpit::save_png(&frame, &out)?;
    }

    eprintln!(
        "wrote {} frames to {} (applied {}, pass-through {}, skipped {}, degraded {})",
        args.frames.len(),
        args.out_dir.display(),
        totals.applied,
        totals.pass_through,
        totals.skipped,
        totals.degraded
    );
    Ok(())
}
