use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::records::RawNftRecord;

/// Domain fragments known to be used by drainer and fake-claim sites.
pub const BUILTIN_BLOCKED_DOMAINS: &[&str] = &[
    "solanaclaim",
    "sol-airdrop",
    "solgift",
    "claim-nft",
    "nftclaim",
    "free-mint",
];

/// Name fragments typical of airdropped scam NFTs.
pub const BUILTIN_BLOCKED_NAME_FRAGMENTS: &[&str] = &[
    "airdrop",
    "giveaway",
    "free mint",
    "claim your",
    "voucher",
];

/// Caller-supplied rules. Unioned with the built-in lists at evaluation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Blocklist {
    pub url_blocklist: HashSet<String>,
    pub nft_blocklist: HashSet<String>,
    pub name_contains: HashSet<String>,
    pub symbol_contains: HashSet<String>,
}

impl Blocklist {
    /// Load from `.json` or (anything else) toml.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading blocklist: {}", path.display()))?;
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&raw).with_context(|| format!("parsing blocklist json: {}", path.display()))
        } else {
            toml::from_str(&raw).with_context(|| format!("parsing blocklist toml: {}", path.display()))
        }
    }
}

/// The fields of a record the filter looks at.
#[derive(Debug, Default, Clone)]
pub struct BlocklistSubject<'a> {
    pub id: Cow<'a, str>,
    pub external_link: Option<&'a str>,
    pub name: &'a str,
    pub collection_name: Option<&'a str>,
    pub symbol: &'a str,
}

impl<'a> BlocklistSubject<'a> {
    pub fn from_record(record: &'a RawNftRecord) -> Self {
        match record {
            RawNftRecord::Helius(asset) => {
                let meta = &asset.content.metadata;
                Self {
                    id: Cow::Borrowed(&asset.id),
                    external_link: asset.content.links.external_url.as_deref(),
                    name: &meta.name,
                    collection_name: asset
                        .collection_group()
                        .and_then(|g| g.collection_metadata.as_ref())
                        .and_then(|m| m.name.as_deref()),
                    symbol: &meta.symbol,
                }
            }
            RawNftRecord::Metaplex(nft) => Self {
                id: Cow::Owned(nft.identifier()),
                external_link: nft.external_url.as_deref(),
                name: &nft.name,
                collection_name: None,
                symbol: &nft.symbol,
            },
            RawNftRecord::StarAtlas(asset) => Self {
                id: Cow::Borrowed(&asset.id),
                external_link: None,
                name: &asset.name,
                collection_name: None,
                symbol: &asset.symbol,
            },
            RawNftRecord::Ethereum(asset) => Self {
                id: Cow::Borrowed(asset.token_id.as_deref().unwrap_or_default()),
                external_link: asset.external_link.as_deref(),
                name: asset.name.as_deref().unwrap_or_default(),
                collection_name: asset.collection.as_ref().and_then(|c| c.name.as_deref()),
                symbol: "",
            },
        }
    }
}

/// False when any rule matches; checks short-circuit in a fixed order.
pub fn is_valid(subject: &BlocklistSubject<'_>, blocklist: &Blocklist) -> bool {
    if let Some(link) = subject.external_link.filter(|l| !l.is_empty()) {
        let blocked_domains = blocklist
            .url_blocklist
            .iter()
            .map(String::as_str)
            .chain(BUILTIN_BLOCKED_DOMAINS.iter().copied());
        if contains_any(link, blocked_domains) {
            return false;
        }
    }

    if blocklist.nft_blocklist.contains(subject.id.as_ref()) {
        return false;
    }

    let name_fragments = || {
        blocklist
            .name_contains
            .iter()
            .map(String::as_str)
            .chain(BUILTIN_BLOCKED_NAME_FRAGMENTS.iter().copied())
    };
    if contains_any(subject.name, name_fragments()) {
        return false;
    }
    if let Some(collection) = subject.collection_name {
        if contains_any(collection, name_fragments()) {
            return false;
        }
    }

    !contains_any(subject.symbol, blocklist.symbol_contains.iter().map(String::as_str))
}

pub fn is_record_valid(record: &RawNftRecord, blocklist: &Blocklist) -> bool {
    is_valid(&BlocklistSubject::from_record(record), blocklist)
}

fn contains_any<'a>(haystack: &str, needles: impl IntoIterator<Item = &'a str>) -> bool {
    if haystack.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    needles
        .into_iter()
        .filter(|n| !n.is_empty())
        .any(|n| haystack.contains(&n.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{HeliusAsset, HeliusCollectionMetadata, HeliusGrouping};

    fn helius(id: &str, name: &str, symbol: &str, link: Option<&str>) -> RawNftRecord {
        let mut asset = HeliusAsset { id: id.into(), ..Default::default() };
        asset.content.metadata.name = name.into();
        asset.content.metadata.symbol = symbol.into();
        asset.content.links.external_url = link.map(str::to_string);
        RawNftRecord::Helius(asset)
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clean_record_passes() {
        let record = helius("mint1", "Okay Bear #12", "OKB", Some("https://okaybears.com"));
        assert!(is_record_valid(&record, &Blocklist::default()));
    }

    #[test]
    fn configured_domain_matches_case_insensitively() {
        let record = helius("mint1", "Okay Bear", "OKB", Some("https://WWW.Scam-Site.io/claim"));
        let bl = Blocklist { url_blocklist: set(&["scam-site.io"]), ..Default::default() };
        assert!(!is_record_valid(&record, &bl));
    }

    #[test]
    fn builtin_domain_blocks_without_configuration() {
        let record = helius("mint1", "Nice art", "ART", Some("https://SolanaClaim.app/x"));
        assert!(!is_record_valid(&record, &Blocklist::default()));
    }

    #[test]
    fn blocked_id_is_rejected() {
        let record = helius("mint-bad", "Nice art", "ART", None);
        let bl = Blocklist { nft_blocklist: set(&["mint-bad"]), ..Default::default() };
        assert!(!is_record_valid(&record, &bl));
    }

    #[test]
    fn name_fragments_include_builtins() {
        let record = helius("m", "USDC AIRDROP Voucher", "X", None);
        assert!(!is_record_valid(&record, &Blocklist::default()));
        let record = helius("m", "Rare Pepe", "X", None);
        let bl = Blocklist { name_contains: set(&["pepe"]), ..Default::default() };
        assert!(!is_record_valid(&record, &bl));
    }

    #[test]
    fn collection_name_is_checked() {
        let RawNftRecord::Helius(mut asset) = helius("m", "Token #1", "T", None) else { unreachable!() };
        asset.grouping.push(HeliusGrouping {
            group_key: "collection".into(),
            group_value: "Coll111".into(),
            collection_metadata: Some(HeliusCollectionMetadata { name: Some("Mega Giveaway".into()), ..Default::default() }),
        });
        assert!(!is_record_valid(&RawNftRecord::Helius(asset), &Blocklist::default()));
    }

    #[test]
    fn symbol_uses_configured_list_only() {
        let record = helius("m", "Token", "AIRDROP", None);
        // name/collection builtins do not apply to the symbol
        assert!(is_record_valid(&record, &Blocklist::default()));
        let bl = Blocklist { symbol_contains: set(&["drop"]), ..Default::default() };
        assert!(!is_record_valid(&record, &bl));
    }

    #[test]
    fn blocklist_loads_from_toml_and_json() {
        let tmp = tempfile::tempdir().unwrap();
        let toml_path = tmp.path().join("blocklist.toml");
        std::fs::write(&toml_path, "urlBlocklist = [\"bad.io\"]\nnftBlocklist = [\"m1\"]\n").unwrap();
        let bl = Blocklist::load(&toml_path).unwrap();
        assert!(bl.url_blocklist.contains("bad.io"));
        assert!(bl.nft_blocklist.contains("m1"));

        let json_path = tmp.path().join("blocklist.json");
        std::fs::write(&json_path, r#"{"symbolContains": ["SCAM"]}"#).unwrap();
        let bl = Blocklist::load(&json_path).unwrap();
        assert!(bl.symbol_contains.contains("SCAM"));
        assert!(bl.url_blocklist.is_empty());
    }
}
