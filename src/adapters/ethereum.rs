use anyhow::Result;
use async_trait::async_trait;
use tracing::instrument;

use super::{or_placeholder, probe_distributed, three_d_with_frame, video_with_frame, SourceAdapter};
use crate::mapping::{collectible_from, EntityFields};
use crate::protocol::ProtocolResolver;
use crate::records::{OpenSeaAsset, SourceKind};
use crate::strategy::{MediaStrategy, ResolveContext, StrategyChain};
use crate::types::{ChainDetails, Collectible, EthereumDetails, MediaDescriptor, MediaType, Resolution, SolanaChainMetadata};

/// Marketplace (OpenSea-shaped) Ethereum assets.
pub struct EthereumAdapter {
    chain: StrategyChain<OpenSeaAsset>,
}

impl Default for EthereumAdapter {
    fn default() -> Self {
        Self {
            chain: StrategyChain::new()
                .then(Gif)
                .then(ThreeDWithFrame)
                .then(Video)
                .then(Image)
                .then(DistributedProbe),
        }
    }
}

impl EthereumAdapter {
    pub fn new() -> Self { Self::default() }

    pub fn strategy_names(&self) -> Vec<&'static str> { self.chain.names() }

    /// Marketplace assets always produce a record; unresolved media becomes the placeholder.
    #[instrument(skip_all, fields(token_id = asset.token_id.as_deref().unwrap_or_default()))]
    pub async fn resolve_asset(&self, asset: &OpenSeaAsset, owner_wallet: Option<&str>, ctx: &ResolveContext<'_>) -> Collectible {
        let entity = entity_fields(asset, owner_wallet);
        let outcome = self.chain.resolve(asset, ctx).await;
        let resolution = or_placeholder(outcome, ctx, &entity.id);
        collectible_from(entity, resolution, ctx.config, ctx.gateway)
    }
}

#[async_trait]
impl SourceAdapter for EthereumAdapter {
    type Record = OpenSeaAsset;

    fn kind(&self) -> SourceKind { SourceKind::Ethereum }

    async fn resolve(
        &self,
        asset: &OpenSeaAsset,
        owner_wallet: Option<&str>,
        _chain_metadata: Option<&SolanaChainMetadata>,
        ctx: &ResolveContext<'_>,
    ) -> Option<Collectible> {
        Some(self.resolve_asset(asset, owner_wallet, ctx).await)
    }
}

fn entity_fields(asset: &OpenSeaAsset, owner_wallet: Option<&str>) -> EntityFields {
    let contract = asset.asset_contract.as_ref();
    let contract_address = contract.and_then(|c| c.address.clone());
    let token_id = asset.token_id.clone().unwrap_or_default();
    let name = asset
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .or_else(|| contract.and_then(|c| c.name.clone()))
        .unwrap_or_default();

    let details = ChainDetails::Eth(EthereumDetails {
        asset_contract_address: contract_address.clone(),
        standard: contract.and_then(|c| c.schema_name.clone()),
        collection_slug: asset.collection.as_ref().and_then(|c| c.slug.clone()),
        collection_name: asset.collection.as_ref().and_then(|c| c.name.clone()),
        collection_image_url: asset.collection.as_ref().and_then(|c| c.image_url.clone()),
    });

    let wallet = owner_wallet.map(str::to_string).or_else(|| asset.wallet.clone());
    let owner = asset.owner.as_ref().and_then(|o| o.address.as_deref());
    let is_owned = match (owner, wallet.as_deref()) {
        (Some(owner), Some(wallet)) => owner.eq_ignore_ascii_case(wallet),
        _ => true,
    };

    let mut entity = EntityFields::new(
        format!("{}:::{}", token_id, contract_address.as_deref().unwrap_or_default()),
        token_id,
        name,
        details,
    );
    entity.description = asset.description.clone();
    entity.external_link = asset.external_link.clone();
    entity.perma_link = asset.permalink.clone();
    entity.animation_url = asset.animation_url.clone();
    entity.date_created = asset.date_created.clone();
    entity.date_last_transferred = asset.date_last_transferred.clone();
    entity.is_owned = is_owned;
    entity.wallet = wallet;
    entity
}

/// First image field that is not excluded by the video/3D/audio extension sets.
fn still_image<'a>(asset: &'a OpenSeaAsset, ctx: &ResolveContext<'_>) -> Option<&'a str> {
    asset.image_urls().find(|u| ctx.config.is_plain_image_url(u))
}

struct Gif;

#[async_trait]
impl MediaStrategy<OpenSeaAsset> for Gif {
    fn name(&self) -> &'static str { "gif" }

    async fn apply(&self, asset: &OpenSeaAsset, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        Ok(asset
            .image_urls()
            .chain(asset.animation_urls())
            .find(|u| ctx.config.is_gif_url(u))
            .map(|u| MediaDescriptor::animated(MediaType::Gif, u).into()))
    }
}

struct ThreeDWithFrame;

#[async_trait]
impl MediaStrategy<OpenSeaAsset> for ThreeDWithFrame {
    fn name(&self) -> &'static str { "3d" }

    async fn apply(&self, asset: &OpenSeaAsset, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let Some(model) = asset.all_urls().find(|u| ctx.config.is_three_d_url(u)) else { return Ok(None); };
        let Some(frame) = still_image(asset, ctx) else { return Ok(None); };
        three_d_with_frame(ctx, model, frame).await
    }
}

struct Video;

#[async_trait]
impl MediaStrategy<OpenSeaAsset> for Video {
    fn name(&self) -> &'static str { "video" }

    async fn apply(&self, asset: &OpenSeaAsset, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let Some(video) = asset
            .all_urls()
            .find(|u| ctx.config.is_video_url(u) || ctx.config.is_streaming_url(u))
        else {
            return Ok(None);
        };
        video_with_frame(ctx, video, still_image(asset, ctx)).await.map(Some)
    }
}

struct Image;

#[async_trait]
impl MediaStrategy<OpenSeaAsset> for Image {
    fn name(&self) -> &'static str { "image" }

    async fn apply(&self, asset: &OpenSeaAsset, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        Ok(still_image(asset, ctx).map(|u| MediaDescriptor::image(u).into()))
    }
}

struct DistributedProbe;

#[async_trait]
impl MediaStrategy<OpenSeaAsset> for DistributedProbe {
    fn name(&self) -> &'static str { "protocol-probe" }

    async fn apply(&self, asset: &OpenSeaAsset, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let Some(url) = asset.all_urls().find(|u| ProtocolResolver::is_distributed(u)) else { return Ok(None); };
        probe_distributed(ctx, url, still_image(asset, ctx)).await.map(Some)
    }
}
