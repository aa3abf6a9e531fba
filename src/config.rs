use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
pub const DEFAULT_ARWEAVE_GATEWAY: &str = "https://arweave.net/";
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "static/images/collectible-placeholder.png";

/// Resolver settings. Every field has a default so a partial toml file is enough.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ResolverConfig {
    pub probe_timeout_ms: u64,
    pub ipfs_gateway: String,
    pub arweave_gateway: String,
    pub placeholder_image: String,
    pub video_extensions: Vec<String>,
    pub audio_extensions: Vec<String>,
    pub three_d_extensions: Vec<String>,
    /// Hosts whose URLs are always video streams.
    pub streaming_hosts: Vec<String>,
    /// Helius only: fetch `content.json_uri` instead of trusting indexed fields.
    pub fetch_helius_json_metadata: bool,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            ipfs_gateway: DEFAULT_IPFS_GATEWAY.to_string(),
            arweave_gateway: DEFAULT_ARWEAVE_GATEWAY.to_string(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            video_extensions: strings(&["webm", "mp4", "m4v", "ogv", "ogg", "mov"]),
            audio_extensions: strings(&["mp3", "wav", "oga"]),
            three_d_extensions: strings(&["glb", "gltf"]),
            streaming_hosts: strings(&["watch.videodelivery.net"]),
            fetch_helius_json_metadata: false,
            user_agent: "collectibles/0.1".to_string(),
        }
    }
}

impl ResolverConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: Self = toml::from_str(s).context("parsing resolver config")?;
        cfg.normalize();
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading resolver config: {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// Defaults with `COLLECTIBLES_PROBE_TIMEOUT_MS` applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ms) = std::env::var("COLLECTIBLES_PROBE_TIMEOUT_MS").ok().and_then(|s| s.parse().ok()) {
            self.probe_timeout_ms = ms;
        }
        self
    }

    pub fn probe_timeout(&self) -> Duration { Duration::from_millis(self.probe_timeout_ms) }

    /// Extensions that disqualify a URL from counting as a plain image.
    /// Video and audio always win over image when lists overlap.
    pub fn non_image_extensions(&self) -> impl Iterator<Item = &str> {
        self.video_extensions
            .iter()
            .chain(&self.three_d_extensions)
            .chain(&self.audio_extensions)
            .map(String::as_str)
    }

    pub fn is_video_url(&self, url: &str) -> bool { has_extension(url, &self.video_extensions) }
    pub fn is_three_d_url(&self, url: &str) -> bool { has_extension(url, &self.three_d_extensions) }
    pub fn is_gif_url(&self, url: &str) -> bool { has_extension(url, &["gif"]) }

    pub fn is_plain_image_url(&self, url: &str) -> bool {
        let lower = url.to_ascii_lowercase();
        !url.is_empty() && self.non_image_extensions().all(|ext| !lower.ends_with(&format!(".{}", ext)))
    }

    /// True when the URL's host is one of `streaming_hosts` (or a subdomain).
    pub fn is_streaming_url(&self, url: &str) -> bool {
        let Ok(parsed) = url::Url::parse(url) else { return false; };
        let Some(host) = parsed.host_str() else { return false; };
        let host = host.to_ascii_lowercase();
        self.streaming_hosts.iter().any(|h| host == *h || host.ends_with(&format!(".{}", h)))
    }

    fn normalize(&mut self) {
        for list in [&mut self.video_extensions, &mut self.audio_extensions, &mut self.three_d_extensions, &mut self.streaming_hosts] {
            *list = list
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect();
        }
    }
}

/// Case-insensitive suffix match against bare extensions (`"glb"`, not `".glb"`).
pub fn has_extension<S: AsRef<str>>(url: &str, extensions: &[S]) -> bool {
    let lower = url.to_ascii_lowercase();
    extensions.iter().any(|ext| lower.ends_with(&format!(".{}", ext.as_ref())))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
