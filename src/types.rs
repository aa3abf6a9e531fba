use serde::{Deserialize, Serialize};

/// Kind of media a collectible displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Image,
    Video,
    Gif,
    #[serde(rename = "THREE_D")]
    ThreeD,
    AnimatedWebp,
}

impl MediaType {
    /// Animated kinds can never serve as a poster frame.
    pub fn is_animated(self) -> bool {
        matches!(self, MediaType::Video | MediaType::Gif | MediaType::AnimatedWebp)
    }
}

/// Resolved media kind plus primary and poster URLs for one NFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub media_type: MediaType,
    pub primary_url: String,
    pub frame_url: Option<String>,
}

impl MediaDescriptor {
    pub fn new(media_type: MediaType, primary_url: impl Into<String>, frame_url: Option<String>) -> Self {
        Self { media_type, primary_url: primary_url.into(), frame_url }
    }

    /// Static image whose poster is itself.
    pub fn image(url: impl Into<String>) -> Self {
        let url = url.into();
        Self { media_type: MediaType::Image, frame_url: Some(url.clone()), primary_url: url }
    }

    /// Animated media without a poster; the display layer computes one.
    pub fn animated(media_type: MediaType, url: impl Into<String>) -> Self {
        Self { media_type, primary_url: url.into(), frame_url: None }
    }

    /// Placeholder used whenever nothing real could be resolved.
    pub fn placeholder(placeholder_image: &str) -> Self {
        Self::image(placeholder_image)
    }
}

/// Outcome of a strategy chain: the descriptor plus any audio detected on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub descriptor: MediaDescriptor,
    /// Gateway URL of an audio asset found behind a distributed-storage link.
    pub audio_url: Option<String>,
}

impl From<MediaDescriptor> for Resolution {
    fn from(descriptor: MediaDescriptor) -> Self {
        Self { descriptor, audio_url: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Eth,
    Sol,
}

/// Collection grouping surfaced by the Helius indexer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeliusCollection {
    pub address: String,
    pub name: String,
    pub image_url: String,
    pub external_link: String,
}

/// On-chain Metaplex metadata account, carried through verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaChainMetadata {
    #[serde(default)]
    pub mint: Option<String>,
    #[serde(default)]
    pub update_authority: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub seller_fee_basis_points: Option<u16>,
    #[serde(default)]
    pub primary_sale_happened: Option<bool>,
    #[serde(default)]
    pub is_mutable: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthereumDetails {
    pub asset_contract_address: Option<String>,
    pub standard: Option<String>,
    pub collection_slug: Option<String>,
    pub collection_name: Option<String>,
    pub collection_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaDetails {
    pub solana_chain_metadata: Option<SolanaChainMetadata>,
    pub helius_collection: Option<HeliusCollection>,
}

/// Chain tag plus the fields only that chain produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chain", rename_all = "lowercase")]
pub enum ChainDetails {
    Eth(EthereumDetails),
    Sol(SolanaDetails),
}

impl ChainDetails {
    pub fn chain(&self) -> Chain {
        match self {
            ChainDetails::Eth(_) => Chain::Eth,
            ChainDetails::Sol(_) => Chain::Sol,
        }
    }
}

/// Canonical, display-ready record. Exactly one of the media URL fields is set,
/// the one matching `media_type` (animated WebP shares `gif_url`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collectible {
    pub id: String,
    pub token_id: String,
    pub name: String,
    pub description: Option<String>,
    pub media_type: MediaType,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub gif_url: Option<String>,
    pub three_d_url: Option<String>,
    pub frame_url: Option<String>,
    pub animation_url: Option<String>,
    pub has_audio: bool,
    pub is_owned: bool,
    pub date_created: Option<String>,
    pub date_last_transferred: Option<String>,
    pub external_link: Option<String>,
    pub perma_link: Option<String>,
    pub wallet: Option<String>,
    #[serde(flatten)]
    pub details: ChainDetails,
}

impl Collectible {
    pub fn chain(&self) -> Chain { self.details.chain() }

    /// The populated media URL matching `media_type`.
    pub fn media_url(&self) -> Option<&str> {
        match self.media_type {
            MediaType::Image => self.image_url.as_deref(),
            MediaType::Video => self.video_url.as_deref(),
            MediaType::Gif | MediaType::AnimatedWebp => self.gif_url.as_deref(),
            MediaType::ThreeD => self.three_d_url.as_deref(),
        }
    }
}
