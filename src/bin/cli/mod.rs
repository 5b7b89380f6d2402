use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use commands::{init_database, print_balances};

#[derive(Parser)]
#[command(name = "ledgerust-cli")]
#[command(about = "Ledgerust CLI tool for database management and ledger inspection")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the ledger database using migrations
    InitDb {
        /// Database URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Print every account with its derived balance
    Balances {
        /// Database URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::InitDb { database_url } => {
                init_database(&database_url).await?;
            }
            Commands::Balances { database_url } => {
                print_balances(&database_url).await?;
            }
        }
        Ok(())
    }
}
