//! HTTP server for exercise suggestions.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use server::ServeConfig;

#[derive(Parser, Debug)]
#[command(
    name = "rep-recs-server",
    about = "Serves exercise suggestions ranked by TF-IDF similarity"
)]
struct ServerCli {
    #[command(flatten)]
    config: ServeConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = ServerCli::parse();
    server::serve(cli.config).await
}
