use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI for inspecting how raw NFT metadata resolves
#[derive(Parser)]
#[command(name = "collectibles")]
#[command(about = "Resolve raw NFT metadata into displayable collectibles", long_about = None)]
pub struct Cli {
    /// Resolver config (toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a raw record (or a json array of records) and print the result as json
    Resolve {
        /// Path to the raw indexer json
        file: PathBuf,
        /// Schema of the record: ethereum, metaplex, helius or star-atlas
        #[arg(short, long)]
        source: String,
        /// Wallet the records were fetched for
        #[arg(short, long)]
        wallet: Option<String>,
        /// Blocklist (toml or json) applied to solana records before resolving
        #[arg(short, long)]
        blocklist: Option<PathBuf>,
    },
    /// Check a raw record against a blocklist
    Check {
        file: PathBuf,
        #[arg(short, long)]
        source: String,
        #[arg(short, long)]
        blocklist: PathBuf,
    },
    /// Print the gateway URL for an ipfs:// or ar:// URI
    Gateway {
        url: String,
    },
}
