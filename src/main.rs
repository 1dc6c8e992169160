use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lutwatch::error::ConfigError;
use lutwatch::models::{validate_quality, AppConfig, ConfigFile, ConfigOverrides, DEFAULT_QUALITY};
use lutwatch::services::{DirectoryMonitor, EventDispatcher, Pipeline};

#[derive(Parser)]
#[command(name = "lutwatch")]
#[command(about = "Apply a 3D color LUT to JPEG files as they arrive in a directory")]
struct Cli {
    /// Path to config.yaml (overrides CONFIG_FILE)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the input directory and process images until Ctrl-C
    Watch {
        /// Directory to watch for incoming JPEG files
        #[arg(long)]
        watch_dir: Option<PathBuf>,

        /// Directory receiving processed files
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// The .cube LUT to apply
        #[arg(long)]
        lut: Option<PathBuf>,

        /// JPEG quality (1-100)
        #[arg(short, long)]
        quality: Option<u8>,
    },
    /// Process a single JPEG file
    Apply {
        /// Source JPEG file
        #[arg(short, long)]
        input: PathBuf,

        /// Output JPEG file
        #[arg(short, long)]
        output: PathBuf,

        /// The .cube LUT to apply
        #[arg(long)]
        lut: Option<PathBuf>,

        /// JPEG quality (1-100)
        #[arg(short, long)]
        quality: Option<u8>,
    },
    /// Load a .cube file and print its lattice size
    InspectLut {
        /// Path to the .cube file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var("CONFIG_FILE").ok().map(PathBuf::from));

    match cli.command {
        Some(Commands::Watch {
            watch_dir,
            output_dir,
            lut,
            quality,
        }) => {
            let cli_overrides = ConfigOverrides {
                watch_dir,
                output_dir,
                lut_path: lut,
                quality,
            };
            run_watch(config_path.as_deref(), cli_overrides).await
        }
        Some(Commands::Apply {
            input,
            output,
            lut,
            quality,
        }) => run_apply_command(config_path.as_deref(), &input, &output, lut, quality),
        Some(Commands::InspectLut { path }) => run_inspect_lut_command(&path),
        None => {
            run_status_command(config_path.as_deref());
            Ok(())
        }
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Read config.yaml if one was given and layer environment and CLI settings on top
fn load_layers(
    config_path: Option<&Path>,
    cli_overrides: ConfigOverrides,
) -> Result<(ConfigFile, ConfigOverrides), ConfigError> {
    let file = match config_path {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let overrides = ConfigOverrides::from_env()?.merge(cli_overrides);
    Ok((file, overrides))
}

/// Watch the configured directory until interrupted
async fn run_watch(config_path: Option<&Path>, cli_overrides: ConfigOverrides) -> anyhow::Result<()> {
    init_tracing("lutwatch=info");

    let (file, overrides) = load_layers(config_path, cli_overrides)?;
    let config = AppConfig::resolve(file, overrides)?;

    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create output directory {}: {e}",
            config.output_dir.display()
        )
    })?;
    // Both directories exist now, so symlinked spellings are caught too
    config.validate()?;

    // Fail fast on a broken LUT instead of on the first image
    let table = cube_lut::LutTable::load(&config.lut_path)
        .map_err(|e| anyhow::anyhow!("Failed to load LUT {}: {e}", config.lut_path.display()))?;
    tracing::info!(
        path = %config.lut_path.display(),
        lattice_size = table.lattice_size(),
        "LUT validated"
    );

    let watch_dir = config.watch_dir.clone();
    tracing::info!(
        watch_dir = %watch_dir.display(),
        output_dir = %config.output_dir.display(),
        quality = config.quality,
        attempts = config.retry.attempts,
        "Starting lutwatch"
    );

    let pipeline = Pipeline::new(config.lut_path.clone());
    let mut dispatcher = EventDispatcher::new(config, pipeline);

    let mut monitor = DirectoryMonitor::new();
    monitor.start(&watch_dir, move |event| {
        dispatcher.handle(event);
    })?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    // Joins the monitor thread; blocking is fine, nothing else runs now
    tokio::task::block_in_place(|| monitor.stop());

    Ok(())
}

/// Run the pipeline once for a single file
fn run_apply_command(
    config_path: Option<&Path>,
    input: &Path,
    output: &Path,
    lut: Option<PathBuf>,
    quality: Option<u8>,
) -> anyhow::Result<()> {
    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lutwatch=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli_overrides = ConfigOverrides {
        lut_path: lut,
        quality,
        ..Default::default()
    };
    let (file, overrides) = load_layers(config_path, cli_overrides)?;

    let lut_path = overrides
        .lut_path
        .or(file.lut_path)
        .ok_or(ConfigError::Missing("lut_path"))?;
    let quality = overrides
        .quality
        .or(file.quality)
        .unwrap_or(DEFAULT_QUALITY);
    validate_quality(quality)?;

    let report = Pipeline::new(lut_path).run(input, output, quality)?;
    println!(
        "Wrote {} ({}x{}, {} ms)",
        report.output.display(),
        report.width,
        report.height,
        report.elapsed.as_millis()
    );

    Ok(())
}

fn run_inspect_lut_command(path: &Path) -> anyhow::Result<()> {
    let table = cube_lut::LutTable::load(path)
        .map_err(|e| anyhow::anyhow!("Failed to load LUT {}: {e}", path.display()))?;

    println!("{}", path.display());
    println!("  Lattice size: {}", table.lattice_size());
    println!("  Samples:      {}", table.len());

    let size = table.lattice_size();
    if let (Some(black), Some(white)) = (
        table.sample(0, 0, 0),
        table.sample(size - 1, size - 1, size - 1),
    ) {
        println!("  Black maps to ({:.4}, {:.4}, {:.4})", black.r, black.g, black.b);
        println!("  White maps to ({:.4}, {:.4}, {:.4})", white.r, white.g, white.b);
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command(config_path: Option<&Path>) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let env_var = |key: &str| std::env::var(key).ok();

    println!("lutwatch v{VERSION}");
    println!("Applies a 3D LUT to JPEG files as they arrive in a directory\n");

    println!("Environment Variables:");
    for key in [
        "CONFIG_FILE",
        "WATCH_DIR",
        "OUTPUT_DIR",
        "LUT_PATH",
        "JPEG_QUALITY",
    ] {
        println!(
            "  {key:<12} = {}",
            env_var(key).as_deref().unwrap_or("(not set)")
        );
    }

    println!("\nConfiguration:");
    let source = match config_path {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (file not found)", path.display()),
        None => "(none, environment and flags only)".to_string(),
    };
    println!("  Config file: {source}");

    match load_layers(config_path, ConfigOverrides::default())
        .and_then(|(file, overrides)| AppConfig::resolve(file, overrides))
    {
        Ok(config) => {
            println!("  Watch dir:   {}", config.watch_dir.display());
            println!("  Output dir:  {}", config.output_dir.display());
            println!("  LUT:         {}", config.lut_path.display());
            println!("  Quality:     {}", config.quality);
            println!(
                "  Retry:       {} attempts, {} ms apart",
                config.retry.attempts, config.retry.delay_ms
            );
        }
        Err(e) => println!("  Not ready:   {e}"),
    }

    println!("\nCommands:");
    println!("  lutwatch watch              Watch the input directory until Ctrl-C");
    println!("  lutwatch apply -i IN -o OUT Process a single file");
    println!("  lutwatch inspect-lut PATH   Show information about a .cube file");
    println!("\nRun 'lutwatch --help' for more options.");
}
