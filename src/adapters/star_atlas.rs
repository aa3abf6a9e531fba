use anyhow::Result;
use async_trait::async_trait;
use tracing::{instrument, warn};

use super::{or_placeholder, SourceAdapter};
use crate::mapping::{collectible_from, EntityFields};
use crate::records::{SourceKind, StarAtlasAsset};
use crate::strategy::{MediaStrategy, ResolveContext, StrategyChain};
use crate::types::{ChainDetails, Collectible, MediaDescriptor, MediaType, Resolution, SolanaChainMetadata, SolanaDetails};

/// Star Atlas items: a model or image plus a thumbnail. Never probes.
pub struct StarAtlasAdapter {
    chain: StrategyChain<StarAtlasAsset>,
}

impl Default for StarAtlasAdapter {
    fn default() -> Self {
        Self { chain: StrategyChain::new().then(ThreeD).then(Image) }
    }
}

impl StarAtlasAdapter {
    pub fn new() -> Self { Self::default() }

    pub fn strategy_names(&self) -> Vec<&'static str> { self.chain.names() }
}

#[async_trait]
impl SourceAdapter for StarAtlasAdapter {
    type Record = StarAtlasAsset;

    fn kind(&self) -> SourceKind { SourceKind::StarAtlas }

    #[instrument(skip_all, fields(id = %asset.id))]
    async fn resolve(
        &self,
        asset: &StarAtlasAsset,
        owner_wallet: Option<&str>,
        chain_metadata: Option<&SolanaChainMetadata>,
        ctx: &ResolveContext<'_>,
    ) -> Option<Collectible> {
        let identifier = asset.identifier();
        if identifier.is_empty() {
            warn!("star atlas asset has no id, symbol or name; skipping");
            return None;
        }

        let resolution = or_placeholder(self.chain.resolve(asset, ctx).await, ctx, &identifier);

        let details = ChainDetails::Sol(SolanaDetails {
            solana_chain_metadata: chain_metadata.cloned(),
            helius_collection: None,
        });
        let mut entity = EntityFields::new(identifier, asset.id.clone(), asset.name.clone(), details);
        entity.description = asset.description.clone();
        entity.date_created = asset.created_at.clone();
        entity.wallet = owner_wallet.map(str::to_string);

        Some(collectible_from(entity, resolution, ctx.config, ctx.gateway))
    }
}

fn image(asset: &StarAtlasAsset) -> Option<&str> {
    Some(asset.image.as_str()).filter(|u| !u.is_empty())
}

struct ThreeD;

#[async_trait]
impl MediaStrategy<StarAtlasAsset> for ThreeD {
    fn name(&self) -> &'static str { "3d" }

    async fn apply(&self, asset: &StarAtlasAsset, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let cfg = ctx.config;
        let pair = match (image(asset), asset.thumbnail_url()) {
            (Some(img), Some(thumb)) if cfg.is_three_d_url(img) && !cfg.is_three_d_url(thumb) => Some((img, thumb)),
            (Some(img), Some(thumb)) if cfg.is_three_d_url(thumb) && !cfg.is_three_d_url(img) => Some((thumb, img)),
            _ => None,
        };
        Ok(pair.map(|(model, frame)| MediaDescriptor::new(MediaType::ThreeD, model, Some(frame.to_string())).into()))
    }
}

struct Image;

#[async_trait]
impl MediaStrategy<StarAtlasAsset> for Image {
    fn name(&self) -> &'static str { "image" }

    async fn apply(&self, asset: &StarAtlasAsset, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let displayable = |u: &&str| !ctx.config.is_three_d_url(u);
        let Some(url) = image(asset).filter(displayable).or_else(|| asset.thumbnail_url().filter(displayable)) else {
            return Ok(None);
        };
        let frame = asset.thumbnail_url().unwrap_or(url);
        Ok(Some(MediaDescriptor::new(MediaType::Image, url, Some(frame.to_string())).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResolverConfig, DEFAULT_PLACEHOLDER_IMAGE};
    use crate::probe::testing::ScriptedProbe;
    use crate::protocol::ProtocolResolver;
    use crate::records::StarAtlasMedia;

    fn asset(image: &str, thumb: Option<&str>) -> StarAtlasAsset {
        StarAtlasAsset {
            id: "sa-42".into(),
            name: "Pearce X4".into(),
            symbol: "PX4".into(),
            image: image.into(),
            media: Some(StarAtlasMedia { thumbnail_url: thumb.map(str::to_string) }),
            created_at: Some("2021-09-01T00:00:00Z".into()),
            ..Default::default()
        }
    }

    async fn run(a: &StarAtlasAsset, probe: &ScriptedProbe) -> Option<Collectible> {
        let (cfg, gw) = (ResolverConfig::default(), ProtocolResolver::default());
        let ctx = ResolveContext::new(probe, &cfg, &gw);
        StarAtlasAdapter::new().resolve(a, Some("Wallet1"), None, &ctx).await
    }

    #[tokio::test]
    async fn model_with_thumbnail_is_three_d() {
        let probe = ScriptedProbe::new();
        let c = run(&asset("https://sa/ship.glb", Some("https://sa/ship.jpg")), &probe).await.unwrap();
        assert_eq!(c.media_type, MediaType::ThreeD);
        assert_eq!(c.three_d_url.as_deref(), Some("https://sa/ship.glb"));
        assert_eq!(c.frame_url.as_deref(), Some("https://sa/ship.jpg"));
        assert!(probe.calls().is_empty());
    }

    #[tokio::test]
    async fn image_uses_thumbnail_as_frame() {
        let c = run(&asset("https://sa/ship.png", Some("https://sa/thumb.jpg")), &ScriptedProbe::new()).await.unwrap();
        assert_eq!(c.media_type, MediaType::Image);
        assert_eq!(c.image_url.as_deref(), Some("https://sa/ship.png"));
        assert_eq!(c.frame_url.as_deref(), Some("https://sa/thumb.jpg"));
    }

    #[tokio::test]
    async fn identity_fields_are_carried() {
        let c = run(&asset("https://sa/ship.png", None), &ScriptedProbe::new()).await.unwrap();
        assert_eq!(c.id, "sa-42:::PX4:::Pearce X4");
        assert_eq!(c.token_id, "sa-42");
        assert_eq!(c.date_created.as_deref(), Some("2021-09-01T00:00:00Z"));
        assert_eq!(c.frame_url.as_deref(), Some("https://sa/ship.png"));
        assert!(c.is_owned);
    }

    #[tokio::test]
    async fn model_without_frame_is_placeholder() {
        let c = run(&asset("https://sa/ship.glb", None), &ScriptedProbe::new()).await.unwrap();
        assert_eq!(c.media_type, MediaType::Image);
        assert_eq!(c.image_url.as_deref(), Some(DEFAULT_PLACEHOLDER_IMAGE));
        let empty = run(&asset("", None), &ScriptedProbe::new()).await.unwrap();
        assert_eq!(empty.image_url.as_deref(), Some(DEFAULT_PLACEHOLDER_IMAGE));
    }

    #[tokio::test]
    async fn empty_identity_is_excluded() {
        assert!(run(&StarAtlasAsset::default(), &ScriptedProbe::new()).await.is_none());
    }
}
