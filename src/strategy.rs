use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::config::ResolverConfig;
use crate::probe::{ContentProbe, ProbeMode, ProbeReport};
use crate::protocol::ProtocolResolver;
use crate::types::{MediaDescriptor, Resolution};

/// Everything a strategy may consult besides the record itself.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub prober: &'a dyn ContentProbe,
    pub config: &'a ResolverConfig,
    pub gateway: &'a ProtocolResolver,
}

impl<'a> ResolveContext<'a> {
    pub fn new(prober: &'a dyn ContentProbe, config: &'a ResolverConfig, gateway: &'a ProtocolResolver) -> Self {
        Self { prober, config, gateway }
    }

    pub fn placeholder(&self) -> MediaDescriptor {
        MediaDescriptor::placeholder(&self.config.placeholder_image)
    }

    /// Probe `url` after gateway rewrite. Any probe failure becomes an error.
    pub async fn probe(&self, url: &str, mode: ProbeMode) -> Result<ProbeReport> {
        let target = self.gateway.resolve(url);
        let report = self
            .prober
            .probe(&target, mode)
            .await
            .with_context(|| format!("probing {target}"))?;
        Ok(report)
    }
}

#[async_trait]
pub trait MediaStrategy<R: ?Sized + Sync>: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means "not applicable"; the chain moves on.
    async fn apply(&self, record: &R, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>>;
}

/// Strategies run in order; the first `Some` decides the media and later ones never run.
pub struct StrategyChain<R: ?Sized + Sync> {
    strategies: Vec<Box<dyn MediaStrategy<R>>>,
}

impl<R: ?Sized + Sync> Default for StrategyChain<R> {
    fn default() -> Self { Self { strategies: Vec::new() } }
}

impl<R: ?Sized + Sync> StrategyChain<R> {
    pub fn new() -> Self { Self::default() }

    pub fn then(mut self, strategy: impl MediaStrategy<R> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run strategies in order, stopping at the first applicable one.
    /// An error from any strategy aborts the chain.
    pub async fn resolve(&self, record: &R, ctx: &ResolveContext<'_>) -> Result<Option<Resolution>> {
        for strategy in &self.strategies {
            let outcome = strategy
                .apply(record, ctx)
                .await
                .with_context(|| format!("{} strategy", strategy.name()))?;
            if let Some(resolution) = outcome {
                debug!(strategy = strategy.name(), media_type = ?resolution.descriptor.media_type, "media resolved");
                return Ok(Some(resolution));
            }
        }
        Ok(None)
    }
}
