use futures::future::join_all;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{CandidateSource, CanonicalChannel};
use crate::services::metrics;
use crate::services::prober::Prober;

/// Limits for one verification run
#[derive(Debug, Clone)]
pub struct VerifySettings {
    /// Channels probed concurrently
    pub batch_size: usize,
    /// Bounded prefix of sources probed per channel
    pub sources_per_channel: usize,
    /// Non-premium channels admitted to the probe pool
    pub max_non_premium: usize,
    /// Stop scheduling batches once this many channels are verified
    pub display_limit: usize,
}

impl VerifySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.probe_batch_size,
            sources_per_channel: config.probe_sources_per_channel,
            max_non_premium: config.max_non_premium_probes,
            display_limit: config.display_limit,
        }
    }
}

impl Default for VerifySettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            sources_per_channel: 4,
            max_non_premium: 200,
            display_limit: 200,
        }
    }
}

/// Higher quality first, then lower latency
pub fn rank_sources(sources: &mut [CandidateSource]) {
    sources.sort_by(|a, b| {
        b.quality_score.cmp(&a.quality_score).then_with(|| {
            let a_latency = a.latency_ms.unwrap_or(u64::MAX);
            let b_latency = b.latency_ms.unwrap_or(u64::MAX);
            a_latency.cmp(&b_latency)
        })
    });
}

/// Premium channels first, then category name ascending
pub fn rank_channels(channels: &mut [CanonicalChannel]) {
    channels.sort_by(|a, b| match (a.is_premium, b.is_premium) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.category.as_str().cmp(b.category.as_str()),
    });
}

/// Drives liveness probes over an unverified catalog
pub struct ChannelVerifier {
    prober: Arc<dyn Prober>,
    settings: VerifySettings,
}

impl ChannelVerifier {
    pub fn new(prober: Arc<dyn Prober>, settings: VerifySettings) -> Self {
        Self { prober, settings }
    }

    /// Probe a channel's leading sources; `None` when none of them answered
    async fn verify_channel(&self, mut channel: CanonicalChannel) -> Option<CanonicalChannel> {
        let mut reachable = Vec::new();

        // Sequential within a channel, so a channel holds at most one connection
        for source in channel.sources.iter().take(self.settings.sources_per_channel) {
            let result = self.prober.probe(&source.stream_url).await;
            metrics::record_probe(result.reachable);

            if result.reachable {
                let mut source = source.clone();
                source.latency_ms = Some(result.latency_ms);
                reachable.push(source);
            }
        }

        if reachable.is_empty() {
            tracing::debug!("No reachable source for {}", channel.name);
            return None;
        }

        rank_sources(&mut reachable);
        channel.primary_url = reachable.first().map(|s| s.stream_url.clone());
        channel.sources = reachable;
        Some(channel)
    }

    /// Keep channels with at least one reachable source, ranked for display
    pub async fn verify(&self, channels: Vec<CanonicalChannel>) -> Vec<CanonicalChannel> {
        let (premium, regular): (Vec<_>, Vec<_>) =
            channels.into_iter().partition(|c| c.is_premium);

        let pool_size = premium.len() + regular.len().min(self.settings.max_non_premium);
        let mut pending = premium
            .into_iter()
            .chain(regular.into_iter().take(self.settings.max_non_premium));

        let batch_size = self.settings.batch_size.max(1);
        let mut verified = Vec::new();
        let mut batches = 0usize;

        loop {
            let batch: Vec<_> = pending.by_ref().take(batch_size).collect();
            if batch.is_empty() {
                break;
            }
            batches += 1;

            let results = join_all(batch.into_iter().map(|c| self.verify_channel(c))).await;
            verified.extend(results.into_iter().flatten());

            if verified.len() >= self.settings.display_limit {
                tracing::info!(
                    "Display limit reached after {} batches ({} verified)",
                    batches,
                    verified.len()
                );
                break;
            }
        }

        tracing::info!(
            "Verified {} of {} probed channels",
            verified.len(),
            pool_size
        );

        rank_channels(&mut verified);
        verified
    }
}
