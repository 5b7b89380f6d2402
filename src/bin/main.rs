use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env so --database-url can fall back to it
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.run().await?;

    Ok(())
}
