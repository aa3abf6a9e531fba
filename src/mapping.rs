use tracing::debug;

use crate::config::ResolverConfig;
use crate::protocol::ProtocolResolver;
use crate::types::{ChainDetails, Collectible, MediaType, Resolution};

/// Entity-level fields an adapter extracts from its record.
#[derive(Debug, Clone)]
pub struct EntityFields {
    pub id: String,
    pub token_id: String,
    pub name: String,
    pub description: Option<String>,
    pub external_link: Option<String>,
    pub perma_link: Option<String>,
    pub animation_url: Option<String>,
    pub date_created: Option<String>,
    pub date_last_transferred: Option<String>,
    pub is_owned: bool,
    pub wallet: Option<String>,
    pub details: ChainDetails,
}

impl EntityFields {
    pub fn new(id: impl Into<String>, token_id: impl Into<String>, name: impl Into<String>, details: ChainDetails) -> Self {
        Self {
            id: id.into(),
            token_id: token_id.into(),
            name: name.into(),
            description: None,
            external_link: None,
            perma_link: None,
            animation_url: None,
            date_created: None,
            date_last_transferred: None,
            is_owned: true,
            wallet: None,
            details,
        }
    }
}

/// Merge resolved media with entity fields into the canonical record.
///
/// Every URL placed in the output passes through the gateway rewrite. A poster
/// frame that is recognisably animated or 3D by extension is dropped.
pub fn collectible_from(entity: EntityFields, resolution: Resolution, cfg: &ResolverConfig, gateway: &ProtocolResolver) -> Collectible {
    let Resolution { descriptor, audio_url } = resolution;
    let primary = gateway.resolve(&descriptor.primary_url);

    let frame_url = match descriptor.media_type {
        MediaType::Gif | MediaType::AnimatedWebp => None,
        _ => descriptor
            .frame_url
            .as_deref()
            .map(|f| gateway.resolve(f))
            .filter(|f| {
                let usable = !(cfg.is_video_url(f) || cfg.is_gif_url(f) || cfg.is_three_d_url(f));
                if !usable {
                    debug!(id = %entity.id, frame = %f, "dropping animated poster frame");
                }
                usable
            }),
    };

    let (mut image_url, mut video_url, mut gif_url, mut three_d_url) = (None, None, None, None);
    match descriptor.media_type {
        MediaType::Image => image_url = Some(primary),
        MediaType::Video => video_url = Some(primary),
        MediaType::Gif | MediaType::AnimatedWebp => gif_url = Some(primary),
        MediaType::ThreeD => three_d_url = Some(primary),
    }

    let has_audio = audio_url.is_some();
    let animation_url = audio_url.or(entity.animation_url).map(|u| gateway.resolve(&u));

    Collectible {
        id: entity.id,
        token_id: entity.token_id,
        name: entity.name,
        description: entity.description,
        media_type: descriptor.media_type,
        image_url,
        video_url,
        gif_url,
        three_d_url,
        frame_url,
        animation_url,
        has_audio,
        is_owned: entity.is_owned,
        date_created: entity.date_created,
        date_last_transferred: entity.date_last_transferred,
        external_link: entity.external_link,
        perma_link: entity.perma_link,
        wallet: entity.wallet,
        details: entity.details,
    }
}
