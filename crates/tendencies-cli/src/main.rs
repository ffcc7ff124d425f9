// Tendencies pipeline entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, filtered by RUST_LOG)
// 2. Resolve the project root (first argument, else the working directory)
// 3. Copy missing defaults into config/ and load tendencies.toml
// 4. Run the pipeline over every configured format
// 5. Report the summary

use tendencies_core::config;
use tendencies_core::pipeline;

use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Tendencies pipeline starting up");

    // 2. Resolve project root
    let base_dir = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => std::env::current_dir().context("failed to read working directory")?,
    };

    // 3. Load config
    let config = config::load_config(&base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: raw={}, processed={}, formats=[{}], seed={:?}, parallel={}",
        config.raw_dir.display(),
        config.processed_dir.display(),
        config.formats.join(", "),
        config.seed,
        config.parallel
    );

    // 4. Run
    let summary = pipeline::run(&config).context("pipeline failed")?;

    // 5. Report
    for f in &summary.formats {
        info!(
            "{}: {} files ({} skipped), {} deliveries, {} batters, {} bowlers",
            f.format,
            f.files_loaded,
            f.files_skipped,
            f.deliveries,
            f.batters_written,
            f.bowlers_written
        );
    }
    if !summary.skipped_formats.is_empty() {
        info!("Skipped formats: {}", summary.skipped_formats.join(", "));
    }
    info!(
        "Wrote {} batting and {} bowling profiles across {} teams; index at {}",
        summary.batters_written(),
        summary.bowlers_written(),
        summary.teams,
        summary.index_path.display()
    );

    Ok(())
}

/// Initialize tracing to stderr so stdout stays free for piping.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tendencies_core=info,tendencies=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
