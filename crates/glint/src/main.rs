use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use glint_engine::device::GpuInit;
use glint_engine::logging::{LoggingConfig, init_logging};
use glint_engine::render::WgpuBackend;
use glint_engine::window::WinitPlatform;
use glint_game::{App, Settings};

#[derive(Debug, Parser)]
#[command(name = "glint", version, about = "Tile map with draggable mirror tilters")]
struct Args {
    /// Settings file; defaults are used when it does not exist.
    #[arg(long, default_value = "settings.toml")]
    settings: PathBuf,

    /// Log filter in env_logger syntax, e.g. "debug" or "glint_game=trace".
    #[arg(long)]
    log: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let settings = Settings::load_or_default(&args.settings)
        .with_context(|| format!("failed to load settings from {}", args.settings.display()))?;

    let platform = WinitPlatform::new(settings.window.clone()).context("failed to create window")?;
    let backend = WgpuBackend::new(platform.window(), settings.target.viewport(), GpuInit::default())
        .context("failed to initialize renderer")?;

    let mut app = App::new(platform, backend, &settings)?;
    app.run()
}
