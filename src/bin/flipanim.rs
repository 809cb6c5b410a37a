use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "flipanim", version)]
struct Cli {
    /// Log per-frame progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an animated image into a 128x64 1-bit animation.
    Convert(ConvertArgs),
    /// Check an animation directory against its manifest.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input GIF, APNG, WebP or still image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory. When omitted, frames are converted but nothing is written.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Luminance cutoff; pixels at or above it are white.
    #[arg(long, default_value_t = flipanim::DEFAULT_THRESHOLD, allow_negative_numbers = true)]
    threshold: i32,

    /// Keep one source frame out of every N.
    #[arg(long, default_value_t = flipanim::DEFAULT_STRIDE.get() as i64, allow_negative_numbers = true)]
    stride: i64,

    /// Print the conversion report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Animation directory containing `meta.txt`.
    #[arg(long)]
    dir: PathBuf,

    /// Print the asset description as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let params = flipanim::ConversionParams::new(args.threshold, args.stride)?;
    let (_, report) = flipanim::convert_with(flipanim::ConvertOpts {
        input: args.in_path.clone(),
        output_dir: args.out.clone(),
        params,
        cancel: None,
    })
    .with_context(|| format!("convert '{}'", args.in_path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    match &report.asset {
        Some(asset) => eprintln!("wrote {} frames to {}", report.frames, asset.dir.display()),
        None => eprintln!("converted {} frames (preview only)", report.frames),
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let asset = flipanim::inspect_asset(&args.dir)
        .with_context(|| format!("inspect '{}'", args.dir.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&asset)?);
    } else {
        eprintln!(
            "{}: {} frames, order {:?}",
            asset.dir.display(),
            asset.manifest.passive_frames,
            asset.manifest.frames_order
        );
    }
    Ok(())
}
