mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Credentials commonly live within a local `.env`; it's fine if there isn't one.
    dotenvy::dotenv().ok();

    // Logs go to stderr so that stdout stays pure JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli::Cli::parse()).await
}
