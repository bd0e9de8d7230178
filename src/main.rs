use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use orrery_render::renderer::RendererOptions;
use orrery_sim::SimConfig;
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;

/// wgpu and naga are chatty at info level.
const DEFAULT_LOG_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=error,naga=warn";

#[derive(Parser)]
#[command(name = "orrery")]
#[command(about = "Earth, Moon and Sun with day/night shading and shadow mapping")]
struct Cli {
    /// Directory containing meshes/ and textures/
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// JSON simulation config; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "1280")]
    width: u32,

    #[arg(long, default_value = "720")]
    height: u32,

    /// Shadow map edge length in texels
    #[arg(long, default_value = "2048")]
    shadow_resolution: u32,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    config.validate().context("Invalid simulation config")?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let options = RendererOptions {
        assets_dir: cli.assets,
        shadow_resolution: cli.shadow_resolution,
    };
    tracing::info!("Starting orrery at {}x{}", cli.width, cli.height);
    orrery_render::run(options, config, PhysicalSize::new(cli.width, cli.height))
}
