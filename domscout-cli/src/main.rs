use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use domscout::{LaunchOptions, ProbeSet, Session};
use domscout_cli::driver::{InspectOptions, Inspector};
use domscout_cli::utils::{init_logging, Args};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let args = Args::parse();

    println!("🔬 domscout live DOM inspector");
    println!("{}", "=".repeat(50));

    let probes = match &args.probes {
        Some(path) => ProbeSet::from_path(path)
            .with_context(|| format!("loading probe overrides from {}", path.display()))?,
        None => ProbeSet::default(),
    };
    info!(?probes, "probe set resolved");

    // Launch failure is the one error with no cleanup state to worry about.
    let session = Session::launch(LaunchOptions {
        headless: args.headless,
        chrome_executable: args.chrome.clone(),
        ..Default::default()
    })
    .await
    .context("failed to launch browser")?;
    println!("✅ Browser started. Log into the target app manually.");

    let opts = InspectOptions {
        url: args.url.clone(),
        output: args.output.clone(),
        wait_timeout: Duration::from_secs(args.wait_timeout),
        max_artifacts: args.max_artifacts,
        assume_yes: args.yes,
        ..Default::default()
    };

    Inspector::new(session, probes, opts).run().await
}
