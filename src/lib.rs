pub mod adapters;
pub mod aggregator;
pub mod blocklist;
pub mod config;
pub mod mapping;
pub mod probe;
pub mod protocol;
pub mod records;
pub mod strategy;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::aggregator::{Aggregator, SolanaEntry};
    pub use crate::blocklist::Blocklist;
    pub use crate::config::ResolverConfig;
    pub use crate::probe::{ContentProbe, HttpProber, ProbeError, ProbeMode, ProbeReport};
    pub use crate::protocol::ProtocolResolver;
    pub use crate::records::{HeliusAsset, MetaplexMetadata, OpenSeaAsset, RawNftRecord, SourceKind, StarAtlasAsset};
    pub use crate::types::{Chain, ChainDetails, Collectible, MediaDescriptor, MediaType, SolanaChainMetadata};
    pub use crate::Collectibles;
}

use anyhow::Result;
use tracing::warn;

use crate::adapters::{EthereumAdapter, HeliusAdapter, MetaplexAdapter, SourceAdapter, StarAtlasAdapter};
use crate::blocklist::{is_record_valid, Blocklist};
use crate::config::ResolverConfig;
use crate::probe::{ContentProbe, HttpProber};
use crate::protocol::ProtocolResolver;
use crate::records::{OpenSeaAsset, RawNftRecord};
use crate::strategy::ResolveContext;
use crate::types::{Collectible, SolanaChainMetadata};

/// Async library entry point. Owns the prober, gateway settings and one adapter per schema.
///
/// Holds no mutable state, so a single instance can resolve any number of
/// records concurrently.
pub struct Collectibles {
    config: ResolverConfig,
    prober: Box<dyn ContentProbe>,
    gateway: ProtocolResolver,
    ethereum: EthereumAdapter,
    metaplex: MetaplexAdapter,
    helius: HeliusAdapter,
    star_atlas: StarAtlasAdapter,
}

impl Collectibles {
    /// Build with the HTTP prober.
    pub fn new(config: ResolverConfig) -> Result<Self> {
        let prober = HttpProber::new(&config)?;
        Ok(Self::with_prober(config, prober))
    }

    /// Build around any [`ContentProbe`], e.g. a simulated network.
    pub fn with_prober(config: ResolverConfig, prober: impl ContentProbe + 'static) -> Self {
        let gateway = ProtocolResolver::from_config(&config);
        Self {
            config,
            prober: Box::new(prober),
            gateway,
            ethereum: EthereumAdapter::new(),
            metaplex: MetaplexAdapter::new(),
            helius: HeliusAdapter::new(),
            star_atlas: StarAtlasAdapter::new(),
        }
    }

    fn context(&self) -> ResolveContext<'_> {
        ResolveContext::new(self.prober.as_ref(), &self.config, &self.gateway)
    }

    /// Resolve a marketplace asset. Never fails; unresolvable media yields the placeholder.
    pub async fn resolve_ethereum(&self, asset: &OpenSeaAsset) -> Collectible {
        self.ethereum.resolve_asset(asset, None, &self.context()).await
    }

    /// Resolve a Solana record for `wallet`, dispatching on its schema tag.
    ///
    /// Returns `None` when the record lacks identity, when a Metaplex-style
    /// record has no usable media at all, or when handed an Ethereum record.
    pub async fn resolve_solana(
        &self,
        record: &RawNftRecord,
        wallet: &str,
        chain_metadata: Option<&SolanaChainMetadata>,
    ) -> Option<Collectible> {
        if let RawNftRecord::Ethereum(_) = record {
            warn!("ethereum record passed to the solana path; skipping");
            return None;
        }
        self.resolve(record, Some(wallet), chain_metadata).await
    }

    /// Resolve a record of any schema.
    pub async fn resolve(
        &self,
        record: &RawNftRecord,
        wallet: Option<&str>,
        chain_metadata: Option<&SolanaChainMetadata>,
    ) -> Option<Collectible> {
        let ctx = self.context();
        match record {
            RawNftRecord::Ethereum(asset) => Some(self.ethereum.resolve_asset(asset, wallet, &ctx).await),
            RawNftRecord::Metaplex(nft) => self.metaplex.resolve(nft, wallet, chain_metadata, &ctx).await,
            RawNftRecord::Helius(asset) => self.helius.resolve(asset, wallet, chain_metadata, &ctx).await,
            RawNftRecord::StarAtlas(asset) => self.star_atlas.resolve(asset, wallet, chain_metadata, &ctx).await,
        }
    }

    /// Blocklist check. Pure; async only to match the other entry points.
    pub async fn is_valid_against_blocklist(&self, record: &RawNftRecord, blocklist: &Blocklist) -> bool {
        is_record_valid(record, blocklist)
    }
}
