use anyhow::Result;
use futures::future::join_all;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use crate::models::{CandidateSource, CanonicalChannel, Category, RawChannelEntry};
use crate::services::classifier::ContentClassifier;
use crate::services::m3u_parser::parse_playlist;
use crate::services::metrics;
use crate::services::normalizer::normalize_name;

/// Why a playlist source contributed nothing
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Http(u16),
}

/// Result of one aggregation run
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    /// Unverified catalog, merged and filtered
    pub channels: Vec<CanonicalChannel>,
    pub sources_ok: usize,
    pub sources_failed: usize,
}

/// Accumulates entries into canonical channels, keyed by identity in
/// first-seen order
#[derive(Debug, Default)]
pub struct ChannelMerger {
    index: HashMap<String, usize>,
    channels: Vec<CanonicalChannel>,
    vetoed: usize,
}

impl ChannelMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize, classify and fold one playlist entry into the catalog
    pub fn push(&mut self, entry: RawChannelEntry) {
        let raw_name = if entry.display_name.is_empty() {
            "Unknown"
        } else {
            entry.display_name.as_str()
        };
        let name = normalize_name(raw_name);
        if name.is_empty() {
            return;
        }

        let Some(verdict) = ContentClassifier::classify(
            &name,
            entry.source_category.as_deref(),
            entry.logo_url.as_deref(),
            entry.external_id.as_deref(),
            entry.language.as_deref(),
        ) else {
            self.vetoed += 1;
            return;
        };

        let id = CanonicalChannel::identity_for(&name);
        let slot = match self.index.get(&id) {
            Some(&slot) => slot,
            None => {
                // First entry under a key seeds category, premium flag and logo
                self.channels.push(CanonicalChannel {
                    id: id.clone(),
                    name,
                    category: verdict.category,
                    is_premium: verdict.is_premium,
                    logo_url: None,
                    sources: Vec::new(),
                    primary_url: None,
                });
                self.index.insert(id, self.channels.len() - 1);
                self.channels.len() - 1
            }
        };

        let channel = &mut self.channels[slot];
        if !channel.has_source(&entry.stream_url) {
            let mut source = CandidateSource::from_entry(&entry);
            source.label = raw_name.to_string();
            channel.sources.push(source);
        }
        if channel.logo_url.is_none() {
            channel.logo_url = entry.logo_url;
        }
    }

    /// Entries dropped by the language veto so far
    pub fn vetoed(&self) -> usize {
        self.vetoed
    }

    /// Premium channels, or any sourced channel outside the catch-all category,
    /// capped at `max_channels`
    pub fn finish(self, max_channels: usize) -> Vec<CanonicalChannel> {
        self.channels
            .into_iter()
            .filter(|c| c.is_premium || (!c.sources.is_empty() && c.category != Category::General))
            .take(max_channels)
            .collect()
    }
}

/// Fetches every configured playlist and builds the unverified catalog
pub struct ChannelAggregator {
    client: Client,
    max_channels: usize,
}

impl ChannelAggregator {
    pub fn new(user_agent: &str, timeout_ms: u64, max_channels: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(timeout_ms))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            max_channels,
        })
    }

    async fn fetch_source(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        Ok(resp.text().await?)
    }

    /// Download all sources concurrently and merge them
    ///
    /// A failing source is logged and contributes nothing. Documents are
    /// merged in configuration order, so the result does not depend on which
    /// download finished first.
    pub async fn aggregate(&self, sources: &[String]) -> AggregateOutcome {
        let documents = join_all(sources.iter().map(|url| async move {
            let result = self.fetch_source(url).await;
            (url, result)
        }))
        .await;

        let mut outcome = AggregateOutcome::default();
        let mut merger = ChannelMerger::new();
        let mut parsed = 0usize;

        for (url, result) in documents {
            match result {
                Ok(text) => {
                    outcome.sources_ok += 1;
                    for entry in parse_playlist(&text) {
                        parsed += 1;
                        merger.push(entry);
                    }
                }
                Err(e) => {
                    outcome.sources_failed += 1;
                    metrics::record_source_failure();
                    tracing::warn!("Source error: {}: {}", url, e);
                }
            }
        }

        let vetoed = merger.vetoed();
        outcome.channels = merger.finish(self.max_channels);

        tracing::info!(
            "Aggregated {} entries from {}/{} sources into {} channels ({} vetoed as foreign)",
            parsed,
            outcome.sources_ok,
            sources.len(),
            outcome.channels.len(),
            vetoed
        );

        outcome
    }
}
