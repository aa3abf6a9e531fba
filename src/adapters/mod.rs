pub mod ethereum;
pub mod helius;
pub mod metaplex;
pub mod star_atlas;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::probe::{MimeCategory, ProbeMode};
use crate::records::SourceKind;
use crate::strategy::ResolveContext;
use crate::types::{Collectible, MediaDescriptor, MediaType, Resolution, SolanaChainMetadata};

pub use ethereum::EthereumAdapter;
pub use helius::HeliusAdapter;
pub use metaplex::MetaplexAdapter;
pub use star_atlas::StarAtlasAdapter;

/// Turns one raw schema into a canonical [`Collectible`].
///
/// Implementations never fail: probe and strategy errors degrade to the
/// placeholder image, and `None` is reserved for records without identity.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    type Record: Sync;

    fn kind(&self) -> SourceKind;

    async fn resolve(
        &self,
        record: &Self::Record,
        owner_wallet: Option<&str>,
        chain_metadata: Option<&SolanaChainMetadata>,
        ctx: &ResolveContext<'_>,
    ) -> Option<Collectible>;
}

/// Collapse a chain outcome into something displayable.
pub(crate) fn or_placeholder(outcome: Result<Option<Resolution>>, ctx: &ResolveContext<'_>, id: &str) -> Resolution {
    match outcome {
        Ok(Some(resolution)) => resolution,
        Ok(None) => {
            warn!(id, "no media strategy applied; using placeholder");
            ctx.placeholder().into()
        }
        Err(e) => {
            warn!(id, error = %format!("{e:#}"), "media resolution failed; using placeholder");
            ctx.placeholder().into()
        }
    }
}

/// A 3D model with a candidate poster. An animated poster takes over as the
/// primary media; a video poster means there is no usable frame.
pub(crate) async fn three_d_with_frame(ctx: &ResolveContext<'_>, model_url: &str, frame_url: &str) -> Result<Option<Resolution>> {
    let report = ctx.probe(frame_url, ProbeMode::Head).await?;
    let descriptor = match report.category {
        MimeCategory::Gif => MediaDescriptor::animated(MediaType::Gif, frame_url),
        MimeCategory::Webp { animated: true } => MediaDescriptor::animated(MediaType::AnimatedWebp, frame_url),
        MimeCategory::Video => return Ok(None),
        _ => MediaDescriptor::new(MediaType::ThreeD, model_url, Some(frame_url.to_string())),
    };
    Ok(Some(descriptor.into()))
}

/// A video with an optional poster; the poster is dropped if it is itself animated.
pub(crate) async fn video_with_frame(ctx: &ResolveContext<'_>, video_url: &str, frame_url: Option<&str>) -> Result<Resolution> {
    let frame = match frame_url {
        Some(frame) => {
            let report = ctx.probe(frame, ProbeMode::Head).await?;
            (!report.is_animated()).then(|| frame.to_string())
        }
        None => None,
    };
    Ok(MediaDescriptor::new(MediaType::Video, video_url, frame).into())
}

/// Rewrite a distributed-storage URL and classify it with a ranged GET.
/// Audio keeps `still_image` (or the placeholder) as the displayed media.
pub(crate) async fn probe_distributed(ctx: &ResolveContext<'_>, url: &str, still_image: Option<&str>) -> Result<Resolution> {
    let gateway_url = ctx.gateway.resolve(url);
    let report = ctx.probe(&gateway_url, ProbeMode::RangedGet).await?;
    let resolution = match report.category.media_type() {
        Some(MediaType::Image) => MediaDescriptor::image(gateway_url).into(),
        Some(media_type) => MediaDescriptor::animated(media_type, gateway_url).into(),
        None => Resolution {
            descriptor: still_image
                .map(MediaDescriptor::image)
                .unwrap_or_else(|| ctx.placeholder()),
            audio_url: Some(gateway_url),
        },
    };
    Ok(resolution)
}

/// Classify a URL purely by what the server reports.
pub(crate) async fn probe_content(ctx: &ResolveContext<'_>, url: &str) -> Result<Resolution> {
    let report = ctx.probe(url, ProbeMode::Head).await?;
    let descriptor = match report.category.media_type() {
        Some(MediaType::Image) | None => MediaDescriptor::image(url),
        Some(media_type) => MediaDescriptor::animated(media_type, url),
    };
    Ok(descriptor.into())
}
