use crate::config::ResolverConfig;

const IPFS_SCHEME: &str = "ipfs://";
const ARWEAVE_SCHEME: &str = "ar://";

/// Gateway rewrite for `ipfs://` and `ar://` URIs.
#[derive(Debug, Clone)]
pub struct ProtocolResolver {
    ipfs_gateway: String,
    arweave_gateway: String,
}

impl Default for ProtocolResolver {
    fn default() -> Self { Self::from_config(&ResolverConfig::default()) }
}

impl ProtocolResolver {
    pub fn new(ipfs_gateway: &str, arweave_gateway: &str) -> Self {
        Self {
            ipfs_gateway: with_trailing_slash(ipfs_gateway),
            arweave_gateway: with_trailing_slash(arweave_gateway),
        }
    }

    pub fn from_config(cfg: &ResolverConfig) -> Self {
        Self::new(&cfg.ipfs_gateway, &cfg.arweave_gateway)
    }

    /// Whether `url` uses a scheme this resolver rewrites.
    pub fn is_distributed(url: &str) -> bool {
        url.starts_with(IPFS_SCHEME) || url.starts_with(ARWEAVE_SCHEME)
    }

    /// Rewrite `ipfs://` and `ar://` URIs to gateway URLs; anything else passes through.
    pub fn resolve(&self, url: &str) -> String {
        if let Some(rest) = url.strip_prefix(IPFS_SCHEME) {
            let rest = rest.strip_prefix("ipfs/").unwrap_or(rest);
            format!("{}{}", self.ipfs_gateway, rest)
        } else if let Some(rest) = url.strip_prefix(ARWEAVE_SCHEME) {
            format!("{}{}", self.arweave_gateway, rest)
        } else {
            url.to_string()
        }
    }
}

fn with_trailing_slash(s: &str) -> String {
    if s.ends_with('/') { s.to_string() } else { format!("{}/", s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipfs_goes_through_gateway() {
        let r = ProtocolResolver::default();
        assert_eq!(
            r.resolve("ipfs://bafybeijkc/image.png"),
            "https://ipfs.io/ipfs/bafybeijkc/image.png"
        );
    }

    #[test]
    fn redundant_ipfs_segment_is_stripped() {
        let r = ProtocolResolver::default();
        assert_eq!(r.resolve("ipfs://ipfs/QmHash/1.gif"), "https://ipfs.io/ipfs/QmHash/1.gif");
    }

    #[test]
    fn arweave_goes_through_gateway() {
        let r = ProtocolResolver::default();
        assert_eq!(r.resolve("ar://abc123"), "https://arweave.net/abc123");
    }

    #[test]
    fn other_urls_pass_through() {
        let r = ProtocolResolver::default();
        assert_eq!(r.resolve("https://example.com/a.png"), "https://example.com/a.png");
        assert_eq!(r.resolve(""), "");
        assert!(!ProtocolResolver::is_distributed("https://ipfs.io/ipfs/x"));
    }

    #[test]
    fn custom_gateway_gets_separator() {
        let r = ProtocolResolver::new("https://gw.example/ipfs", "https://ar.example");
        assert_eq!(r.resolve("ipfs://Qm"), "https://gw.example/ipfs/Qm");
        assert_eq!(r.resolve("ar://tx"), "https://ar.example/tx");
    }
}
