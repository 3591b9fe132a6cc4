//! tincture - color space conversion and compositing from the command line
//!
//! Lists the catalog, resolves and runs conversions, and benchmarks
//! compositing on synthetic buffers.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tincture_dispatch::DispatchConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tincture")]
#[command(author, version, about = "Color space conversion and compositing engine")]
#[command(long_about = "
Inspect and exercise the tincture pixel engine.

Color spaces are written MODEL/DEPTH[/PROFILE], e.g. RGBA/U8, RGBA/F32/Rec.2020.

Examples:
  tincture spaces                              # Models, depths and profiles
  tincture ops RGBA U16                        # Blend modes of a color space
  tincture path RGBA/U8 XYZA/F32               # Show the resolved conversion
  tincture convert RGBA/U8 RGBA/U16 255,128,64,255
  tincture composite RGBA/U8 over --size 4096x4096 --opacity 0.5
  tincture --scalar tiers                      # Force the scalar tier
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Dispatch configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Force the scalar tier
    #[arg(long, global = true)]
    scalar: bool,

    /// Forbid AVX tiers
    #[arg(long = "no-avx", global = true)]
    no_avx: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered models, depths, profiles and conversions
    #[command(visible_alias = "ls")]
    Spaces(SpacesArgs),

    /// List the composite ops of a color space
    Ops(OpsArgs),

    /// Resolve the conversion path between two color spaces
    Path(PathArgs),

    /// Convert one pixel between color spaces
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Composite synthetic buffers in parallel row bands
    #[command(visible_alias = "comp")]
    Composite(CompositeArgs),

    /// Show detected CPU tiers and the selected one
    Tiers,
}

#[derive(Args)]
struct SpacesArgs {
    /// Also list conversion factories
    #[arg(short, long)]
    conversions: bool,
}

#[derive(Args)]
struct OpsArgs {
    /// Model id (RGBA, GRAYA, ...)
    model: String,

    /// Depth id (U8, U16, F16, F32)
    depth: String,

    /// Profile name
    #[arg(short, long)]
    profile: Option<String>,
}

#[derive(Args)]
struct PathArgs {
    /// Source color space
    from: String,

    /// Destination color space
    to: String,
}

#[derive(Args)]
struct ConvertArgs {
    /// Source color space
    from: String,

    /// Destination color space
    to: String,

    /// Channel values in native units, comma separated (e.g. 255,128,64,255)
    pixel: String,
}

#[derive(Args)]
struct CompositeArgs {
    /// Color space
    space: String,

    /// Blend mode id (over, copy, multiply, ...)
    mode: String,

    /// Region size as WxH
    #[arg(short, long, default_value = "1024x1024")]
    size: String,

    /// Opacity in [0, 1]
    #[arg(short, long, default_value = "1.0")]
    opacity: f32,

    /// Number of row bands (0 = one per thread)
    #[arg(short, long, default_value = "0")]
    bands: usize,

    /// Use a synthetic coverage mask
    #[arg(short, long)]
    mask: bool,

    /// Channels to write, comma separated indices (default: all)
    #[arg(long)]
    channels: Option<String>,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("TINCTURE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Dispatch configuration from `--config` and the override flags, if any.
fn dispatch_config(cli: &Cli) -> Result<Option<DispatchConfig>> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read: {}", path.display()))?;
            serde_yaml::from_str::<DispatchConfig>(&text)
                .with_context(|| format!("Invalid dispatch config: {}", path.display()))?
        }
        None if cli.scalar || cli.no_avx => DispatchConfig::from_env(),
        None => return Ok(None),
    };
    config.disable_vectorization |= cli.scalar;
    config.disable_avx |= cli.no_avx;
    Ok(Some(config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(config) = dispatch_config(&cli)? {
        tincture_dispatch::configure(config).context("Failed to apply dispatch config")?;
    }

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Spaces(args) => commands::spaces::run(args),
        Commands::Ops(args) => commands::ops::run(args),
        Commands::Path(args) => commands::path::run(args),
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Composite(args) => commands::composite::run(args),
        Commands::Tiers => commands::tiers::run(),
    }
}
