use anyhow::Result;
use clap::Parser;
use tracing::info;

use minicade::config::LauncherCli;
use minicade::{launcher, logging};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_stderr()?;
    let config = LauncherCli::parse().launcher_config();
    info!(?config, "starting launcher");
    launcher::serve(&config).await?;
    Ok(())
}
