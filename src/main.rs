use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedsync::app::AppContext;
use feedsync::cli::{commands, Cli, Commands};
use feedsync::config::{parse_interval, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feedsync=info")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(interval) = &cli.interval {
        config.sync.interval = parse_interval(interval).map_err(anyhow::Error::msg)?;
    }
    if let Some(workers) = cli.workers {
        config.sync.workers = workers;
    }
    config.validate()?;

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Watch { urls, json } => {
            commands::watch(&ctx, &urls, json).await?;
        }
        Commands::Fetch { url } => {
            commands::fetch(&ctx, &url).await?;
        }
    }

    Ok(())
}
