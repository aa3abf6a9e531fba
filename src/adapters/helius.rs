use async_trait::async_trait;
use tracing::{instrument, warn};

use super::{MetaplexAdapter, SourceAdapter};
use crate::records::{HeliusAsset, MetaplexFile, MetaplexMetadata, MetaplexProperties, SourceKind};
use crate::strategy::ResolveContext;
use crate::types::{ChainDetails, Collectible, HeliusCollection, SolanaChainMetadata};

/// Helius DAS assets, resolved through the Metaplex chain. The record is derived
/// from the DAS content unless `fetch_helius_json_metadata` asks for `json_uri`.
#[derive(Default)]
pub struct HeliusAdapter {
    metaplex: MetaplexAdapter,
}

impl HeliusAdapter {
    pub fn new() -> Self { Self::default() }

    pub fn strategy_names(&self) -> Vec<&'static str> { self.metaplex.strategy_names() }

    async fn metadata_for(&self, asset: &HeliusAsset, ctx: &ResolveContext<'_>) -> MetaplexMetadata {
        let derived = derive_metadata(asset);
        let json_uri = asset.content.json_uri.as_str();
        if !ctx.config.fetch_helius_json_metadata || json_uri.is_empty() {
            return derived;
        }

        let url = ctx.gateway.resolve(json_uri);
        let fetched = match ctx.prober.fetch_json(&url).await {
            Ok(doc) => serde_json::from_value::<MetaplexMetadata>(doc).map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };
        match fetched {
            Ok(nft) => nft,
            Err(e) => {
                warn!(id = %asset.id, url = %url, error = %format!("{e:#}"), "json metadata unavailable; using DAS content");
                derived
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for HeliusAdapter {
    type Record = HeliusAsset;

    fn kind(&self) -> SourceKind { SourceKind::Helius }

    #[instrument(skip_all, fields(id = %asset.id))]
    async fn resolve(
        &self,
        asset: &HeliusAsset,
        owner_wallet: Option<&str>,
        chain_metadata: Option<&SolanaChainMetadata>,
        ctx: &ResolveContext<'_>,
    ) -> Option<Collectible> {
        if asset.id.is_empty() {
            warn!("helius asset has no id; skipping");
            return None;
        }

        let nft = self.metadata_for(asset, ctx).await;
        let mut collectible = self.metaplex.resolve_metadata(&nft, owner_wallet, chain_metadata, ctx).await?;

        collectible.id = asset.id.clone();
        collectible.token_id = asset.id.clone();
        collectible.is_owned = owner_wallet.map_or(true, |w| asset.ownership.owner == w);
        if let ChainDetails::Sol(details) = &mut collectible.details {
            details.helius_collection = helius_collection(asset);
        }
        Some(collectible)
    }
}

/// Metaplex-shaped view of the DAS content block.
fn derive_metadata(asset: &HeliusAsset) -> MetaplexMetadata {
    let content = &asset.content;
    let files = content
        .files
        .iter()
        .filter(|f| !f.uri.is_empty())
        .map(|f| MetaplexFile::Typed { uri: f.uri.clone(), mime: f.mime.clone() })
        .collect();

    MetaplexMetadata {
        name: content.metadata.name.clone(),
        symbol: content.metadata.symbol.clone(),
        description: content.metadata.description.clone(),
        image: content.links.image.clone().unwrap_or_default(),
        animation_url: content.links.animation_url.clone(),
        external_url: content.links.external_url.clone(),
        attributes: content.metadata.attributes.clone(),
        properties: Some(MetaplexProperties { files, ..Default::default() }),
        ..Default::default()
    }
}

fn helius_collection(asset: &HeliusAsset) -> Option<HeliusCollection> {
    let group = asset.collection_group()?;
    let meta = group.collection_metadata.clone().unwrap_or_default();
    Some(HeliusCollection {
        address: group.group_value.clone(),
        name: meta.name.unwrap_or_default(),
        image_url: meta.image.unwrap_or_default(),
        external_link: meta.external_url.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::probe::testing::ScriptedProbe;
    use crate::protocol::ProtocolResolver;
    use crate::records::{HeliusCollectionMetadata, HeliusFile, HeliusGrouping};
    use crate::types::MediaType;
    use serde_json::json;

    fn asset() -> HeliusAsset {
        let mut a = HeliusAsset { id: "MintAbc".into(), ..Default::default() };
        a.content.json_uri = "https://arweave.net/meta".into();
        a.content.metadata.name = "Claynosaurz #9".into();
        a.content.metadata.symbol = "DINO".into();
        a.content.links.image = Some("https://arweave.net/dino.png".into());
        a.content.files = vec![HeliusFile {
            uri: "https://arweave.net/dino.png".into(),
            mime: Some("image/png".into()),
            ..Default::default()
        }];
        a.ownership.owner = "Wallet1".into();
        a.grouping = vec![HeliusGrouping {
            group_key: "collection".into(),
            group_value: "CollAddr".into(),
            collection_metadata: Some(HeliusCollectionMetadata {
                name: Some("Claynosaurz".into()),
                image: Some("https://x/coll.png".into()),
                ..Default::default()
            }),
        }];
        a
    }

    async fn run(a: &HeliusAsset, probe: &ScriptedProbe, cfg: &ResolverConfig, wallet: &str) -> Option<Collectible> {
        let gw = ProtocolResolver::default();
        let ctx = ResolveContext::new(probe, cfg, &gw);
        HeliusAdapter::new().resolve(a, Some(wallet), None, &ctx).await
    }

    #[tokio::test]
    async fn derived_record_resolves_as_image() {
        let c = run(&asset(), &ScriptedProbe::new(), &ResolverConfig::default(), "Wallet1").await.unwrap();
        assert_eq!(c.id, "MintAbc");
        assert_eq!(c.media_type, MediaType::Image);
        assert_eq!(c.image_url.as_deref(), Some("https://arweave.net/dino.png"));
        assert!(c.is_owned);
        let ChainDetails::Sol(details) = &c.details else { panic!("expected solana details") };
        let coll = details.helius_collection.as_ref().unwrap();
        assert_eq!(coll.address, "CollAddr");
        assert_eq!(coll.name, "Claynosaurz");
    }

    #[tokio::test]
    async fn ownership_compares_owner_with_wallet() {
        let c = run(&asset(), &ScriptedProbe::new(), &ResolverConfig::default(), "Someone").await.unwrap();
        assert!(!c.is_owned);
    }

    #[tokio::test]
    async fn typed_video_file_becomes_video() {
        let mut a = asset();
        a.content.files.push(HeliusFile {
            uri: "https://x/clip.mp4".into(),
            mime: Some("video/mp4".into()),
            ..Default::default()
        });
        let probe = ScriptedProbe::new().content_type("https://arweave.net/dino.png", "image/png");
        let c = run(&a, &probe, &ResolverConfig::default(), "Wallet1").await.unwrap();
        assert_eq!(c.media_type, MediaType::Video);
        assert_eq!(c.video_url.as_deref(), Some("https://x/clip.mp4"));
        assert_eq!(c.frame_url.as_deref(), Some("https://arweave.net/dino.png"));
    }

    fn untyped(uri: &str) -> HeliusFile {
        HeliusFile { uri: uri.into(), mime: None, ..Default::default() }
    }

    #[tokio::test]
    async fn glb_file_without_mime_becomes_three_d() {
        let mut a = asset();
        a.content.links.image = Some("https://x/ship.png".into());
        a.content.files = vec![untyped("https://x/ship.png"), untyped("https://x/ship.glb")];
        let probe = ScriptedProbe::new().content_type("https://x/ship.png", "image/png");
        let c = run(&a, &probe, &ResolverConfig::default(), "Wallet1").await.unwrap();
        assert_eq!(c.media_type, MediaType::ThreeD);
        assert_eq!(c.three_d_url.as_deref(), Some("https://x/ship.glb"));
        assert_eq!(c.frame_url.as_deref(), Some("https://x/ship.png"));
    }

    #[tokio::test]
    async fn mp4_file_without_mime_becomes_video() {
        let mut a = asset();
        a.content.files.push(untyped("https://x/clip.mp4"));
        let probe = ScriptedProbe::new().content_type("https://arweave.net/dino.png", "image/png");
        let c = run(&a, &probe, &ResolverConfig::default(), "Wallet1").await.unwrap();
        assert_eq!(c.media_type, MediaType::Video);
        assert_eq!(c.video_url.as_deref(), Some("https://x/clip.mp4"));
        assert_eq!(c.frame_url.as_deref(), Some("https://arweave.net/dino.png"));
    }

    #[tokio::test]
    async fn fetched_json_replaces_derived_content() {
        let cfg = ResolverConfig { fetch_helius_json_metadata: true, ..Default::default() };
        let probe = ScriptedProbe::new().document(
            "https://arweave.net/meta",
            json!({ "name": "Claynosaurz #9", "symbol": "DINO", "image": "https://arweave.net/dino.gif" }),
        );
        let c = run(&asset(), &probe, &cfg, "Wallet1").await.unwrap();
        assert_eq!(c.media_type, MediaType::Gif);
        assert_eq!(c.gif_url.as_deref(), Some("https://arweave.net/dino.gif"));
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_derived_content() {
        let cfg = ResolverConfig { fetch_helius_json_metadata: true, ..Default::default() };
        let c = run(&asset(), &ScriptedProbe::new(), &cfg, "Wallet1").await.unwrap();
        assert_eq!(c.media_type, MediaType::Image);
        assert_eq!(c.image_url.as_deref(), Some("https://arweave.net/dino.png"));
    }

    #[tokio::test]
    async fn asset_without_id_is_excluded() {
        let a = HeliusAsset { id: String::new(), ..asset() };
        assert!(run(&a, &ScriptedProbe::new(), &ResolverConfig::default(), "Wallet1").await.is_none());
    }
}
