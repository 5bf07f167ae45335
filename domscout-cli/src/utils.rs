use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "domscout",
    version,
    about = "🔬 Interactive DOM reconnaissance for undocumented web UIs"
)]
pub struct Args {
    /// URL to open after launch; login and navigation stay manual
    #[arg(short, long)]
    pub url: Option<String>,

    /// Path of the JSON report written at the end of the run
    #[arg(short, long, default_value = "dom-inspection-report.json")]
    pub output: PathBuf,

    /// JSON file overriding the built-in selector guesses
    #[arg(long)]
    pub probes: Option<PathBuf>,

    /// Deadline in seconds for each element wait
    #[arg(long, default_value_t = 10)]
    pub wait_timeout: u64,

    /// How many artifact panels to inspect at most
    #[arg(long, default_value_t = 2)]
    pub max_artifacts: usize,

    /// Launch the browser without a window (fixture runs)
    #[arg(long)]
    pub headless: bool,

    /// Skip the interactive pauses (fixture runs)
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Chrome/Chromium executable override
    #[arg(long)]
    pub chrome: Option<PathBuf>,
}

pub fn init_logging() -> Result<()> {
    let log_level = env::var("LOG_LEVEL")
        .map(|level| match level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        })
        .unwrap_or(Level::WARN);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    Ok(())
}
