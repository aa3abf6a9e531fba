use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Which indexer schema a raw record follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Ethereum,
    Metaplex,
    Helius,
    StarAtlas,
}

impl std::str::FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" | "eth" | "opensea" => Ok(Self::Ethereum),
            "metaplex" => Ok(Self::Metaplex),
            "helius" => Ok(Self::Helius),
            "star-atlas" | "star_atlas" | "staratlas" => Ok(Self::StarAtlas),
            other => Err(anyhow::anyhow!(
                "unknown source `{}` (expected ethereum, metaplex, helius, star-atlas)",
                other
            )),
        }
    }
}

/// Tagged union over the four supported schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNftRecord {
    Ethereum(OpenSeaAsset),
    Metaplex(MetaplexMetadata),
    Helius(HeliusAsset),
    StarAtlas(StarAtlasAsset),
}

impl RawNftRecord {
    /// Parse indexer JSON into the variant named by `kind`.
    pub fn from_json(kind: SourceKind, value: serde_json::Value) -> Result<Self> {
        let record = match kind {
            SourceKind::Ethereum => Self::Ethereum(serde_json::from_value(value).context("parsing marketplace asset")?),
            SourceKind::Metaplex => Self::Metaplex(serde_json::from_value(value).context("parsing metaplex metadata")?),
            SourceKind::Helius => Self::Helius(serde_json::from_value(value).context("parsing helius asset")?),
            SourceKind::StarAtlas => Self::StarAtlas(serde_json::from_value(value).context("parsing star atlas asset")?),
        };
        Ok(record)
    }

    pub fn source_kind(&self) -> SourceKind {
        match self {
            Self::Ethereum(_) => SourceKind::Ethereum,
            Self::Metaplex(_) => SourceKind::Metaplex,
            Self::Helius(_) => SourceKind::Helius,
            Self::StarAtlas(_) => SourceKind::StarAtlas,
        }
    }
}

// --- Ethereum marketplace ---

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetContract {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetCollection {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetOwner {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenSeaAsset {
    pub token_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub external_link: Option<String>,
    pub permalink: Option<String>,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub image_original_url: Option<String>,
    pub image_preview_url: Option<String>,
    pub image_thumbnail_url: Option<String>,
    pub animation_url: Option<String>,
    pub animation_original_url: Option<String>,
    pub asset_contract: Option<AssetContract>,
    pub collection: Option<AssetCollection>,
    pub owner: Option<AssetOwner>,
    /// Wallet the asset was fetched for.
    pub wallet: Option<String>,
    pub date_created: Option<String>,
    pub date_last_transferred: Option<String>,
}

impl OpenSeaAsset {
    /// Image-like fields in priority order.
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        [
            &self.image_url,
            &self.image_original_url,
            &self.image_preview_url,
            &self.image_thumbnail_url,
            &self.image,
        ]
        .into_iter()
        .filter_map(|u| u.as_deref())
        .filter(|u| !u.is_empty())
    }

    pub fn animation_urls(&self) -> impl Iterator<Item = &str> {
        [&self.animation_url, &self.animation_original_url]
            .into_iter()
            .filter_map(|u| u.as_deref())
            .filter(|u| !u.is_empty())
    }

    /// Animation fields first, then image fields.
    pub fn all_urls(&self) -> impl Iterator<Item = &str> {
        self.animation_urls().chain(self.image_urls())
    }
}

// --- Metaplex ---

/// Entry of `properties.files`: either a bare URL or a typed descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaplexFile {
    Url(String),
    Typed {
        uri: String,
        #[serde(default, rename = "type")]
        mime: Option<String>,
    },
}

impl MetaplexFile {
    pub fn uri(&self) -> &str {
        match self {
            Self::Url(u) => u,
            Self::Typed { uri, .. } => uri,
        }
    }

    /// Declared type, only present on typed entries.
    pub fn mime(&self) -> Option<&str> {
        match self {
            Self::Url(_) => None,
            Self::Typed { mime, .. } => mime.as_deref(),
        }
    }

    /// An object entry without a `type` counts as a bare URL.
    pub fn is_typed(&self) -> bool { self.mime().is_some() }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetaplexCreator {
    pub address: String,
    #[serde(default)]
    pub share: Option<u8>,
    #[serde(default)]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaplexProperties {
    pub files: Vec<MetaplexFile>,
    pub category: Option<String>,
    pub creators: Vec<MetaplexCreator>,
}

/// Off-chain JSON metadata following the Metaplex token standard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaplexMetadata {
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
    pub seller_fee_basis_points: Option<u16>,
    pub image: String,
    pub animation_url: Option<String>,
    pub external_url: Option<String>,
    pub attributes: Option<serde_json::Value>,
    pub properties: Option<MetaplexProperties>,
}

impl MetaplexMetadata {
    /// `symbol:::name:::image`, skipping empty parts.
    pub fn identifier(&self) -> String {
        join_identifier(&[self.symbol.as_str(), self.name.as_str(), self.image.as_str()])
    }

    pub fn files(&self) -> &[MetaplexFile] {
        self.properties.as_ref().map(|p| p.files.as_slice()).unwrap_or(&[])
    }

    pub fn category(&self) -> Option<&str> {
        self.properties.as_ref().and_then(|p| p.category.as_deref())
    }

    pub fn creators(&self) -> &[MetaplexCreator] {
        self.properties.as_ref().map(|p| p.creators.as_slice()).unwrap_or(&[])
    }

    pub fn animation_url(&self) -> Option<&str> {
        self.animation_url.as_deref().filter(|u| !u.is_empty())
    }
}

// --- Helius ---

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeliusMetadata {
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
    pub attributes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeliusLinks {
    pub image: Option<String>,
    pub animation_url: Option<String>,
    pub external_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeliusFile {
    pub uri: String,
    pub cdn_uri: Option<String>,
    pub mime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeliusContent {
    pub json_uri: String,
    pub metadata: HeliusMetadata,
    pub links: HeliusLinks,
    pub files: Vec<HeliusFile>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeliusCollectionMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub external_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeliusGrouping {
    pub group_key: String,
    pub group_value: String,
    pub collection_metadata: Option<HeliusCollectionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeliusOwnership {
    pub owner: String,
    pub frozen: bool,
    pub delegated: bool,
}

/// Asset as returned by the Helius DAS API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeliusAsset {
    pub id: String,
    pub content: HeliusContent,
    pub grouping: Vec<HeliusGrouping>,
    pub ownership: HeliusOwnership,
}

impl HeliusAsset {
    /// The `"collection"` grouping, if declared.
    pub fn collection_group(&self) -> Option<&HeliusGrouping> {
        self.grouping.iter().find(|g| g.group_key == "collection")
    }
}

// --- Star Atlas ---

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StarAtlasMedia {
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StarAtlasAsset {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
    pub image: String,
    pub media: Option<StarAtlasMedia>,
    pub created_at: Option<String>,
}

impl StarAtlasAsset {
    /// `_id:::symbol:::name`, skipping empty parts.
    pub fn identifier(&self) -> String {
        join_identifier(&[self.id.as_str(), self.symbol.as_str(), self.name.as_str()])
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.media
            .as_ref()
            .and_then(|m| m.thumbnail_url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

fn join_identifier(parts: &[&str]) -> String {
    parts.iter().filter(|p| !p.is_empty()).copied().collect::<Vec<_>>().join(":::")
}
