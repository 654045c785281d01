use anyhow::Result;
use cijferscraper::{Config, Pipeline};
use std::env;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(LevelFilter::INFO.into())),
        )
        .init();
    info!("startup");

    // ─── 2) configure ────────────────────────────────────────────────
    let config = Config::from_env()?;
    info!(
        site = %config.base_url,
        output = %config.output_dir.display(),
        proxies = %config.proxy_file.display(),
        "configured"
    );

    // ─── 3) list, fetch, extract, write ──────────────────────────────
    let pipeline = Pipeline::new(config)?;
    let summary = pipeline.run().await?;

    // partial failures never change the exit status
    info!(%summary, "all done");
    Ok(())
}
