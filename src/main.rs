use clap::Parser;
use twinslide::{config::Config, error};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let config = Config::parse();
  error::init_tracing(config.log_dir.as_deref())?;

  if let Err(e) = twinslide::run(config).await {
    tracing::error!(error = ?e, "twinslide failed");
    return Err(e);
  }
  Ok(())
}
