use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use stratafx::{LoggingConfig, PixelBuffer, Recipe, RenderEngine};

#[derive(Parser, Debug)]
#[command(name = "stratafx", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON recipe to an image.
    Apply(ApplyArgs),
    /// Print the normalized RGB histograms of an image as JSON.
    Levels(LevelsArgs),
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Recipe JSON.
    #[arg(long)]
    recipe: PathBuf,

    /// Output image; the format follows the extension.
    #[arg(long)]
    out: PathBuf,

    /// Blocks per filter job (overrides the recipe).
    #[arg(long)]
    blocks: Option<usize>,

    /// Worker threads (overrides the recipe).
    #[arg(long)]
    threads: Option<usize>,

    /// Run blocks sequentially on the calling thread.
    #[arg(long)]
    sequential: bool,
}

#[derive(Parser, Debug)]
struct LevelsArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    stratafx::logging::init_logging(&LoggingConfig {
        level: cli.log_level.clone(),
        json: cli.json_logs,
    });

    match cli.cmd {
        Command::Apply(args) => cmd_apply(args),
        Command::Levels(args) => cmd_levels(args),
    }
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let recipe = Recipe::from_path(&args.recipe)
        .with_context(|| format!("load recipe '{}'", args.recipe.display()))?;

    let mut config = recipe.config.clone().unwrap_or_default();
    if let Some(blocks) = args.blocks {
        config.blocks = blocks;
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    if args.sequential {
        config.parallel = false;
    }
    config.validate()?;

    let frame = stratafx::assets::load_frame(&args.in_path)?;
    let overlay_root = args
        .recipe
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut engine = RenderEngine::new(frame, config)?
        .with_overlay_fetcher(stratafx::assets::FileOverlayFetcher::with_root(overlay_root));
    recipe.apply(&mut engine)?;

    let mut rendered: Option<PixelBuffer> = None;
    engine.render(|frame| rendered = Some(frame.clone()))?;
    let frame = rendered.context("render finished without a frame")?;

    stratafx::assets::save_frame(&frame, &args.out)?;
    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        frame.width(),
        frame.height()
    );
    Ok(())
}

fn cmd_levels(args: LevelsArgs) -> anyhow::Result<()> {
    let frame = stratafx::assets::load_frame(&args.in_path)?;
    let levels = stratafx::Levels::calculate(&frame);
    let json = serde_json::to_string_pretty(&levels).context("serialize levels")?;
    println!("{json}");
    Ok(())
}
