use anyhow::Result;
use async_trait::async_trait;
use tracing::{instrument, warn};

use super::{or_placeholder, probe_content, probe_distributed, three_d_with_frame, video_with_frame, SourceAdapter};
use crate::config::ResolverConfig;
use crate::mapping::{collectible_from, EntityFields};
use crate::protocol::ProtocolResolver;
use crate::records::{MetaplexFile, MetaplexMetadata, SourceKind};
use crate::strategy::{MediaStrategy, ResolveContext, StrategyChain};
use crate::types::{ChainDetails, Collectible, MediaDescriptor, MediaType, Resolution, SolanaChainMetadata, SolanaDetails};

const THREE_D_CATEGORIES: &[&str] = &["vr", "3d"];

/// Off-chain Metaplex JSON. `properties.files` are not ordered reliably; when
/// nothing else identifies the media, one file is taken as-is and otherwise
/// the second one is.
pub struct MetaplexAdapter {
    chain: StrategyChain<MetaplexMetadata>,
}

impl Default for MetaplexAdapter {
    fn default() -> Self {
        Self {
            chain: StrategyChain::new()
                .then(Gif)
                .then(ThreeDWithFrame)
                .then(Video)
                .then(Image)
                .then(DistributedProbe)
                .then(RawContent),
        }
    }
}

impl MetaplexAdapter {
    pub fn new() -> Self { Self::default() }

    pub fn strategy_names(&self) -> Vec<&'static str> { self.chain.names() }

    /// Shared with the Helius adapter, which feeds in a derived record.
    pub(crate) async fn resolve_metadata(
        &self,
        nft: &MetaplexMetadata,
        owner_wallet: Option<&str>,
        chain_metadata: Option<&SolanaChainMetadata>,
        ctx: &ResolveContext<'_>,
    ) -> Option<Collectible> {
        let identifier = nft.identifier();
        if identifier.is_empty() {
            warn!("metaplex record has no symbol, name or image; skipping");
            return None;
        }

        let resolution = match self.chain.resolve(nft, ctx).await {
            Ok(None) => {
                warn!(id = %identifier, "metaplex record has no usable media; skipping");
                return None;
            }
            outcome => or_placeholder(outcome, ctx, &identifier),
        };

        let is_owned = match owner_wallet {
            Some(wallet) => !nft.creators().iter().any(|c| c.address == wallet),
            None => true,
        };
        let details = ChainDetails::Sol(SolanaDetails {
            solana_chain_metadata: chain_metadata.cloned(),
            helius_collection: None,
        });
        let mut entity = EntityFields::new(identifier.clone(), identifier, nft.name.clone(), details);
        entity.description = nft.description.clone();
        entity.external_link = nft.external_url.clone();
        entity.animation_url = nft.animation_url().map(str::to_string);
        entity.is_owned = is_owned;
        entity.wallet = owner_wallet.map(str::to_string);

        Some(collectible_from(entity, resolution, ctx.config, ctx.gateway))
    }
}

#[async_trait]
impl SourceAdapter for MetaplexAdapter {
    type Record = MetaplexMetadata;

    fn kind(&self) -> SourceKind { SourceKind::Metaplex }

    #[instrument(skip_all, fields(name = %nft.name))]
    async fn resolve(
        &self,
        nft: &MetaplexMetadata,
        owner_wallet: Option<&str>,
        chain_metadata: Option<&SolanaChainMetadata>,
        ctx: &ResolveContext<'_>,
    ) -> Option<Collectible> {
        self.resolve_metadata(nft, owner_wallet, chain_metadata, ctx).await
    }
}

/// One file is the media; with several, the second one is.
fn media_file(files: &[MetaplexFile]) -> Option<&str> {
    match files {
        [] => None,
        [only] => Some(only.uri()),
        [_, second, ..] => Some(second.uri()),
    }
}

fn typed_file<'a>(files: &'a [MetaplexFile], pred: impl Fn(&str) -> bool) -> Option<&'a MetaplexFile> {
    files.iter().find(|f| f.mime().map_or(false, &pred))
}

/// Bare URLs and entries without a declared type are judged by their URL.
fn untyped_file<'a>(files: &'a [MetaplexFile], pred: impl Fn(&str) -> bool) -> Option<&'a str> {
    files.iter().find(|f| !f.is_typed() && pred(f.uri())).map(MetaplexFile::uri)
}

fn mime_names_extension(mime: &str, extensions: &[String]) -> bool {
    let mime = mime.to_ascii_lowercase();
    extensions.iter().any(|ext| mime.contains(ext.as_str()))
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Every URL the record mentions, image first.
fn all_urls(nft: &MetaplexMetadata) -> impl Iterator<Item = &str> {
    non_empty(&nft.image)
        .into_iter()
        .chain(nft.animation_url())
        .chain(nft.files().iter().map(MetaplexFile::uri))
}

fn three_d_model<'a>(nft: &'a MetaplexMetadata, cfg: &ResolverConfig) -> Option<&'a str> {
    let files = nft.files();
    typed_file(files, |m| mime_names_extension(m, &cfg.three_d_extensions))
        .map(MetaplexFile::uri)
        .or_else(|| untyped_file(files, |u| cfg.is_three_d_url(u)))
        .or_else(|| nft.animation_url().filter(|u| cfg.is_three_d_url(u)))
        .or_else(|| non_empty(&nft.image).filter(|u| cfg.is_three_d_url(u)))
        .or_else(|| {
            let category = nft.category()?.to_ascii_lowercase();
            THREE_D_CATEGORIES
                .contains(&category.as_str())
                .then(|| nft.animation_url().or_else(|| media_file(files)))
                .flatten()
        })
}

fn three_d_frame<'a>(nft: &'a MetaplexMetadata, model: &str, cfg: &ResolverConfig) -> Option<&'a str> {
    let files = nft.files();
    non_empty(&nft.image)
        .filter(|u| !cfg.is_three_d_url(u))
        .or_else(|| typed_file(files, |m| m.contains("image")).map(MetaplexFile::uri))
        .or_else(|| untyped_file(files, |u| !cfg.is_three_d_url(u)))
        .filter(|u| *u != model)
}

struct Gif;

#[async_trait]
impl MediaStrategy<MetaplexMetadata> for Gif {
    fn name(&self) -> &'static str { "gif" }

    async fn apply(&self, nft: &MetaplexMetadata, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let url = typed_file(nft.files(), |m| m.eq_ignore_ascii_case("image/gif"))
            .map(MetaplexFile::uri)
            .or_else(|| all_urls(nft).find(|u| ctx.config.is_gif_url(u)));
        Ok(url.map(|u| MediaDescriptor::animated(MediaType::Gif, u).into()))
    }
}

struct ThreeDWithFrame;

#[async_trait]
impl MediaStrategy<MetaplexMetadata> for ThreeDWithFrame {
    fn name(&self) -> &'static str { "3d" }

    async fn apply(&self, nft: &MetaplexMetadata, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let Some(model) = three_d_model(nft, ctx.config) else { return Ok(None); };
        let Some(frame) = three_d_frame(nft, model, ctx.config) else { return Ok(None); };
        three_d_with_frame(ctx, model, frame).await
    }
}

struct Video;

#[async_trait]
impl MediaStrategy<MetaplexMetadata> for Video {
    fn name(&self) -> &'static str { "video" }

    async fn apply(&self, nft: &MetaplexMetadata, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let cfg = ctx.config;
        let files = nft.files();
        let video_file = typed_file(files, |m| m.contains("video") && !mime_names_extension(m, &cfg.three_d_extensions))
            .map(MetaplexFile::uri);
        let is_video = |u: &str| cfg.is_video_url(u) || cfg.is_streaming_url(u);
        let by_category = nft.category().map_or(false, |c| c.eq_ignore_ascii_case("video"));

        let url = video_file
            .or_else(|| untyped_file(files, is_video))
            .or_else(|| nft.animation_url().filter(|u| is_video(*u)))
            .or_else(|| non_empty(&nft.image).filter(|u| is_video(*u)))
            .or_else(|| by_category.then(|| media_file(files)).flatten());
        let Some(url) = url else { return Ok(None); };

        let frame = non_empty(&nft.image).filter(|f| *f != url && cfg.is_plain_image_url(f));
        video_with_frame(ctx, url, frame).await.map(Some)
    }
}

struct Image;

#[async_trait]
impl MediaStrategy<MetaplexMetadata> for Image {
    fn name(&self) -> &'static str { "image" }

    async fn apply(&self, nft: &MetaplexMetadata, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let files = nft.files();
        let is_image = |u: &&str| ctx.config.is_plain_image_url(u);
        let image_file = typed_file(files, |m| m.contains("image")).map(MetaplexFile::uri);
        let by_category = nft.category().map_or(false, |c| c.eq_ignore_ascii_case("image"));

        let url = non_empty(&nft.image)
            .filter(is_image)
            .or(image_file)
            .or_else(|| by_category.then(|| media_file(files).filter(is_image)).flatten());
        Ok(url.map(|u| MediaDescriptor::image(u).into()))
    }
}

struct DistributedProbe;

#[async_trait]
impl MediaStrategy<MetaplexMetadata> for DistributedProbe {
    fn name(&self) -> &'static str { "protocol-probe" }

    async fn apply(&self, nft: &MetaplexMetadata, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let Some(url) = all_urls(nft).find(|u| ProtocolResolver::is_distributed(u)) else { return Ok(None); };
        let still = non_empty(&nft.image).filter(|u| ctx.config.is_plain_image_url(u));
        probe_distributed(ctx, url, still).await.map(Some)
    }
}

struct RawContent;

#[async_trait]
impl MediaStrategy<MetaplexMetadata> for RawContent {
    fn name(&self) -> &'static str { "content-probe" }

    async fn apply(&self, nft: &MetaplexMetadata, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        let Some(url) = media_file(nft.files()) else { return Ok(None); };
        probe_content(ctx, url).await.map(Some)
    }
}
