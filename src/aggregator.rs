use futures::future::join_all;
use tracing::{debug, info};

use crate::blocklist::{is_record_valid, Blocklist};
use crate::records::{OpenSeaAsset, RawNftRecord};
use crate::types::{Collectible, SolanaChainMetadata};
use crate::Collectibles;

/// A Solana record paired with its on-chain metadata account, if fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct SolanaEntry {
    pub record: RawNftRecord,
    pub chain_metadata: Option<SolanaChainMetadata>,
}

impl SolanaEntry {
    pub fn new(record: RawNftRecord) -> Self { Self { record, chain_metadata: None } }

    pub fn with_chain_metadata(mut self, chain_metadata: SolanaChainMetadata) -> Self {
        self.chain_metadata = Some(chain_metadata);
        self
    }
}

/// Aggregator owns a resolver plus the blocklist and resolves whole wallets at once.
///
/// Records resolve concurrently; output keeps input order and dropped records
/// (blocked, no identity, no media) simply leave a gap.
pub struct Aggregator {
    resolver: Collectibles,
    blocklist: Blocklist,
}

impl Aggregator {
    pub fn new(resolver: Collectibles, blocklist: Blocklist) -> Self { Self { resolver, blocklist } }

    /// Blocklist first, then resolve the survivors.
    pub async fn resolve_solana_batch(&self, entries: &[SolanaEntry], wallet: &str) -> Vec<Collectible> {
        let allowed: Vec<&SolanaEntry> = entries
            .iter()
            .filter(|e| {
                let ok = is_record_valid(&e.record, &self.blocklist);
                if !ok {
                    debug!(source = ?e.record.source_kind(), "record rejected by blocklist");
                }
                ok
            })
            .collect();
        let blocked = entries.len() - allowed.len();

        let resolved = join_all(
            allowed
                .iter()
                .map(|e| self.resolver.resolve_solana(&e.record, wallet, e.chain_metadata.as_ref())),
        )
        .await;
        let out: Vec<Collectible> = resolved.into_iter().flatten().collect();
        info!(total = entries.len(), blocked, resolved = out.len(), "solana batch resolved");
        out
    }

    /// Marketplace assets skip the blocklist; every asset yields a record.
    pub async fn resolve_ethereum_batch(&self, assets: &[OpenSeaAsset]) -> Vec<Collectible> {
        let out = join_all(assets.iter().map(|a| self.resolver.resolve_ethereum(a))).await;
        info!(total = assets.len(), "ethereum batch resolved");
        out
    }
}
