mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use collectibles::aggregator::{Aggregator, SolanaEntry};
use collectibles::blocklist::{is_record_valid, Blocklist};
use collectibles::config::ResolverConfig;
use collectibles::records::{RawNftRecord, SourceKind};
use collectibles::Collectibles;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ResolverConfig::load(path)?.with_env_overrides(),
        None => ResolverConfig::from_env(),
    };

    match cli.command {
        Commands::Resolve { file, source, wallet, blocklist } => {
            let kind: SourceKind = source.parse()?;
            let (records, many) = read_records(&file, kind)?;
            let blocklist = match blocklist {
                Some(path) => Blocklist::load(&path)?,
                None => Blocklist::default(),
            };
            let aggregator = Aggregator::new(Collectibles::new(config)?, blocklist);

            let out = match kind {
                SourceKind::Ethereum => {
                    let assets: Vec<_> = records
                        .into_iter()
                        .filter_map(|r| match r {
                            RawNftRecord::Ethereum(asset) => Some(asset),
                            _ => None,
                        })
                        .collect();
                    aggregator.resolve_ethereum_batch(&assets).await
                }
                _ => {
                    let wallet = wallet.unwrap_or_default();
                    let entries: Vec<_> = records.into_iter().map(SolanaEntry::new).collect();
                    aggregator.resolve_solana_batch(&entries, &wallet).await
                }
            };
            let rendered = if many {
                serde_json::to_string_pretty(&out)?
            } else {
                serde_json::to_string_pretty(&out.first())?
            };
            println!("{}", rendered);
        }
        Commands::Check { file, source, blocklist } => {
            let kind: SourceKind = source.parse()?;
            let blocklist = Blocklist::load(&blocklist)?;
            let (records, _) = read_records(&file, kind)?;
            for record in records {
                println!("{}", is_record_valid(&record, &blocklist));
            }
        }
        Commands::Gateway { url } => {
            let resolver = collectibles::protocol::ProtocolResolver::from_config(&config);
            println!("{}", resolver.resolve(&url));
        }
    }
    Ok(())
}

/// A file holds one record or a json array of them; the flag says which.
fn read_records(path: &Path, kind: SourceKind) -> Result<(Vec<RawNftRecord>, bool)> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    let (values, many) = match value {
        Value::Array(items) => (items, true),
        single => (vec![single], false),
    };
    let records = values
        .into_iter()
        .map(|v| RawNftRecord::from_json(kind, v))
        .collect::<Result<Vec<_>>>()?;
    Ok((records, many))
}
