use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "textmark", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a JSON watermark job against an image.
    Apply(ApplyArgs),
    /// Stamp a single watermark at the centre, a corner or an edge.
    Stamp(StampArgs),
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Watermark job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Output image path; the format follows the extension.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct StampArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path; the format follows the extension.
    #[arg(long)]
    out: PathBuf,

    /// Watermark text.
    #[arg(long)]
    text: String,

    /// `centre`, a corner (`top_left`, ...) or an edge (`left`, ...).
    #[arg(long, default_value = "centre")]
    at: String,

    /// Font file.
    #[arg(long)]
    font: Option<String>,

    /// Font size in points.
    #[arg(long)]
    size: Option<i64>,

    /// Colour as `r,g,b`.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    colour: Option<Vec<i64>>,

    /// Anticlockwise rotation in degrees, 0 to 360.
    #[arg(long, allow_negative_numbers = true)]
    rotation: Option<i64>,

    /// Flip the text horizontally before rotating.
    #[arg(long)]
    mirror: bool,

    /// Margin from the anchored edges in pixels; may be negative.
    #[arg(long, allow_negative_numbers = true)]
    margin: Option<i64>,
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
        Command::Apply(args) => cmd_apply(args),
        Command::Stamp(args) => cmd_stamp(args),
    }
}

fn read_image(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let img = image::open(path).with_context(|| format!("open image '{}'", path.display()))?;
    Ok(img.to_rgba8())
}

fn write_image(path: &Path, img: &image::RgbaImage) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save(path)
        .with_context(|| format!("write image '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let job = textmark::WatermarkJob::from_path(&args.job)?;
    let mut wm = textmark::Watermarker::new(read_image(&args.in_path)?);
    let count = job
        .run(&mut wm)
        .with_context(|| format!("run job '{}'", args.job.display()))?;
    tracing::info!(placements = count, "job finished");
    write_image(&args.out, &wm.collect())
}

fn cmd_stamp(args: StampArgs) -> anyhow::Result<()> {
    let placement = match args.at.trim() {
        "centre" | "center" => textmark::Placement::Centre,
        name => match textmark::Anchor::from_name(name) {
            Some(textmark::Anchor::Corner(c)) => textmark::Placement::Corner(c),
            Some(textmark::Anchor::Edge(e)) => textmark::Placement::Edge(e),
            None => anyhow::bail!("unknown anchor '{name}'"),
        },
    };

    let mut wm = textmark::Watermarker::new(read_image(&args.in_path)?);
    if let Some(font) = &args.font {
        wm.font(font)?;
    }
    if let Some(size) = args.size {
        wm.size(size)?;
    }
    if let Some(colour) = &args.colour {
        wm.colour(colour)?;
    }
    if let Some(rotation) = args.rotation {
        wm.rotation(rotation)?;
    }
    if let Some(margin) = args.margin {
        wm.margin(margin)?;
    }
    wm.mirror(args.mirror)?;

    wm.apply(&args.text, &placement)?;
    write_image(&args.out, &wm.collect())
}
