use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, RANGE};
use thiserror::Error;

use crate::config::ResolverConfig;
use crate::types::MediaType;

/// Chunk marker present only in animated WebP files.
const ANIMATED_WEBP_MARKER: &[u8] = b"ANMF";
const PROBE_RANGE: &str = "bytes=0-100";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    Head,
    /// GET of the first ~100 bytes, for hosts with unreliable HEAD support.
    RangedGet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeCategory {
    Gif,
    Video,
    Audio,
    Webp { animated: bool },
    Other,
}

impl MimeCategory {
    /// Media type implied by the category. Audio has no visual media of its own.
    pub fn media_type(self) -> Option<MediaType> {
        match self {
            MimeCategory::Gif => Some(MediaType::Gif),
            MimeCategory::Video => Some(MediaType::Video),
            MimeCategory::Webp { animated: true } => Some(MediaType::AnimatedWebp),
            MimeCategory::Webp { animated: false } | MimeCategory::Other => Some(MediaType::Image),
            MimeCategory::Audio => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub status: u16,
    pub content_type: Option<String>,
    pub category: MimeCategory,
}

impl ProbeReport {
    pub fn is_animated_webp(&self) -> bool {
        matches!(self.category, MimeCategory::Webp { animated: true })
    }

    /// Video, GIF or animated WebP: unusable as a poster frame.
    pub fn is_animated(&self) -> bool {
        self.category.media_type().map(MediaType::is_animated).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => ProbeError::Status(status.as_u16()),
            None => ProbeError::Transport(e.to_string()),
        }
    }
}

/// Network access the resolvers need. Implemented over HTTP by [`HttpProber`];
/// tests substitute simulated networks.
#[async_trait]
pub trait ContentProbe: Send + Sync {
    async fn probe(&self, url: &str, mode: ProbeMode) -> Result<ProbeReport, ProbeError>;

    /// Fetch a JSON document (off-chain metadata).
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value>;
}

/// Classify a `Content-Type` header by case-insensitive substring.
pub fn classify(content_type: Option<&str>) -> MimeCategory {
    let Some(ct) = content_type else { return MimeCategory::Other; };
    let ct = ct.to_ascii_lowercase();
    if ct.contains("gif") {
        MimeCategory::Gif
    } else if ct.contains("video") {
        MimeCategory::Video
    } else if ct.contains("audio") {
        MimeCategory::Audio
    } else if ct.contains("webp") {
        MimeCategory::Webp { animated: false }
    } else {
        MimeCategory::Other
    }
}

pub fn is_animated_webp(body: &[u8]) -> bool {
    body.windows(ANIMATED_WEBP_MARKER.len()).any(|w| w == ANIMATED_WEBP_MARKER)
}

/// HEAD or `Range: bytes=0-100` GET under one timeout. A body is only read when
/// a WebP response has to be checked for animation.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(cfg: &ResolverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .build()
            .context("building probe http client")?;
        Ok(Self { client, timeout: cfg.probe_timeout() })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration { self.timeout }

    async fn probe_inner(&self, url: &str, mode: ProbeMode) -> Result<ProbeReport, ProbeError> {
        let parsed = url::Url::parse(url).map_err(|_| ProbeError::InvalidUrl(url.to_string()))?;
        let request = match mode {
            ProbeMode::Head => self.client.head(parsed.clone()),
            ProbeMode::RangedGet => self.client.get(parsed.clone()).header(RANGE, PROBE_RANGE),
        };
        let resp = request.send().await?;
        let status = resp.status().as_u16();
        if status >= 300 {
            return Err(ProbeError::Status(status));
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        drop(resp);

        let mut category = classify(content_type.as_deref());
        if let MimeCategory::Webp { .. } = category {
            let body = self.client.get(parsed).send().await?.error_for_status()?.bytes().await?;
            category = MimeCategory::Webp { animated: is_animated_webp(&body) };
        }
        Ok(ProbeReport { status, content_type, category })
    }
}

#[async_trait]
impl ContentProbe for HttpProber {
    async fn probe(&self, url: &str, mode: ProbeMode) -> Result<ProbeReport, ProbeError> {
        match tokio::time::timeout(self.timeout, self.probe_inner(url, mode)).await {
            Ok(res) => res,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        let fetch = async {
            let resp = self.client.get(url).send().await?.error_for_status()?;
            let doc = resp.json::<serde_json::Value>().await?;
            Ok::<_, reqwest::Error>(doc)
        };
        tokio::time::timeout(self.timeout, fetch)
            .await
            .with_context(|| format!("metadata fetch timed out: {url}"))?
            .with_context(|| format!("fetching metadata: {url}"))
    }
}
