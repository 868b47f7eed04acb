use clap::Parser;
use wotlwedu_console::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so WOTLWEDU_CONSOLE_CONFIG_DIR and RUST_LOG
    // can be set per checkout.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli::run(cli).await
}
