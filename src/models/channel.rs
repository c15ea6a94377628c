use chrono::{DateTime, Utc};
use serde::Serialize;

/// Latency reported for a source that did not answer; sorts after any real measurement
pub const UNREACHABLE_LATENCY_MS: u64 = 9999;

/// Content category assigned by the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    News,
    Sports,
    Movies,
    Documentary,
    Entertainment,
    Kids,
    Music,
    /// Catch-all when no keyword matched
    #[default]
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::News => "News",
            Category::Sports => "Sports",
            Category::Movies => "Movies",
            Category::Documentary => "Documentary",
            Category::Entertainment => "Entertainment",
            Category::Kids => "Kids",
            Category::Music => "Music",
            Category::General => "General",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `#EXTINF` + URL pair read from a playlist document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawChannelEntry {
    pub display_name: String,
    pub logo_url: Option<String>,
    /// `group-title` as declared by the playlist
    pub source_category: Option<String>,
    /// `tvg-id`
    pub external_id: Option<String>,
    /// `tvg-language`
    pub language: Option<String>,
    pub stream_url: String,
    /// 100 / 80 / 50 / 0 from resolution keywords in the name
    pub quality_score: u8,
}

/// A stream option attached to a canonical channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSource {
    #[serde(rename = "url")]
    pub stream_url: String,
    /// Raw display name the source was discovered under
    pub label: String,
    pub quality_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Set once the source has been probed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CandidateSource {
    pub fn from_entry(entry: &RawChannelEntry) -> Self {
        Self {
            stream_url: entry.stream_url.clone(),
            label: entry.display_name.clone(),
            quality_score: entry.quality_score,
            external_id: entry.external_id.clone(),
            latency_ms: None,
        }
    }
}

/// Merge unit and final catalog row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalChannel {
    /// `ch-` + slug of the canonical name; unique within a run
    pub id: String,
    pub name: String,
    pub category: Category,
    pub is_premium: bool,
    #[serde(rename = "logo", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub sources: Vec<CandidateSource>,
    /// Best reachable source, filled in by the verifier
    #[serde(rename = "url", skip_serializing_if = "Option::is_none")]
    pub primary_url: Option<String>,
}

impl CanonicalChannel {
    /// Identity key for a canonical name
    pub fn identity_for(name: &str) -> String {
        let slug = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        format!("ch-{}", slug)
    }

    pub fn has_source(&self, stream_url: &str) -> bool {
        self.sources.iter().any(|s| s.stream_url == stream_url)
    }
}

/// Verified catalog snapshot held by the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedCatalog {
    pub entries: Vec<CanonicalChannel>,
    pub fetched_at: DateTime<Utc>,
}

impl CachedCatalog {
    pub fn new(entries: Vec<CanonicalChannel>) -> Self {
        Self {
            entries,
            fetched_at: Utc::now(),
        }
    }
}

/// Outcome of one liveness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub reachable: bool,
    pub latency_ms: u64,
}

impl ProbeResult {
    pub fn reachable(latency_ms: u64) -> Self {
        Self {
            reachable: true,
            latency_ms,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            latency_ms: UNREACHABLE_LATENCY_MS,
        }
    }
}

/// Response body for GET /api/iptv
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsResponse {
    pub success: bool,
    pub data: Vec<CanonicalChannel>,
    pub cached: bool,
    /// `fetchedAt` of the catalog, epoch milliseconds
    pub timestamp: i64,
}

/// Failure body for GET /api/iptv
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_slug() {
        assert_eq!(CanonicalChannel::identity_for("BBC ONE"), "ch-bbc-one");
        assert_eq!(
            CanonicalChannel::identity_for("CBC News  Network"),
            "ch-cbc-news-network"
        );
    }

    #[test]
    fn test_channel_serializes_with_endpoint_field_names() {
        let channel = CanonicalChannel {
            id: "ch-espn".to_string(),
            name: "ESPN".to_string(),
            category: Category::Sports,
            is_premium: true,
            logo_url: None,
            sources: vec![CandidateSource {
                stream_url: "http://s.test/espn.m3u8".to_string(),
                label: "ESPN HD".to_string(),
                quality_score: 80,
                external_id: None,
                latency_ms: Some(42),
            }],
            primary_url: Some("http://s.test/espn.m3u8".to_string()),
        };

        let json = serde_json::to_value(&channel).unwrap();
        assert_eq!(json["category"], "Sports");
        assert_eq!(json["isPremium"], true);
        assert_eq!(json["url"], "http://s.test/espn.m3u8");
        assert_eq!(json["sources"][0]["qualityScore"], 80);
        assert_eq!(json["sources"][0]["latencyMs"], 42);
        assert!(json.get("logo").is_none());
    }

    #[test]
    fn test_default_category_is_general() {
        assert_eq!(Category::default(), Category::General);
    }

    #[test]
    fn test_unreachable_probe_uses_sentinel() {
        let result = ProbeResult::unreachable();
        assert!(!result.reachable);
        assert_eq!(result.latency_ms, UNREACHABLE_LATENCY_MS);
    }
}
