use anyhow::Context;
use artimirror_core::{ApiCredential, SyncConfig, SyncEngine};
use clap::Parser;

mod cli;
mod logging;

use cli::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::parse();
    let _log_guard = logging::init(app.log_format, app.log_file.as_deref())?;

    let config = SyncConfig::load(&app.config)
        .with_context(|| format!("loading configuration from {}", app.config.display()))?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        repo = %config.repo,
        download_dir = %config.download_root.display(),
        "starting sync"
    );

    let engine = SyncEngine::from_config(config, ApiCredential::new(app.api_key))?;
    let report = engine.run().await.context("sync run failed")?;

    if report.mismatched > 0 {
        tracing::error!(mismatched = report.mismatched, "some artifacts failed verification");
    }
    Ok(())
}
