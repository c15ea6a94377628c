use std::env;
use std::str::FromStr;

/// Public playlists aggregated when `IPTV_SOURCES` is not set
const DEFAULT_SOURCES: &[&str] = &[
    "https://iptv-org.github.io/iptv/countries/uk.m3u",
    "https://iptv-org.github.io/iptv/countries/us.m3u",
    "https://iptv-org.github.io/iptv/countries/ca.m3u",
    "https://iptv-org.github.io/iptv/countries/au.m3u",
    "https://iptv-org.github.io/iptv/countries/nz.m3u",
    "https://iptv-org.github.io/iptv/countries/ie.m3u",
    "https://iptv-org.github.io/iptv/countries/ph.m3u",
    "https://raw.githubusercontent.com/iptv-org/iptv/master/streams/us_firetv.m3u",
    "https://raw.githubusercontent.com/iptv-org/iptv/master/streams/us_klowdtv.m3u",
    "https://raw.githubusercontent.com/iptv-org/iptv/master/streams/us_pbs.m3u",
    "https://raw.githubusercontent.com/iptv-org/iptv/master/streams/us_tubi.m3u",
    "https://raw.githubusercontent.com/iptv-org/iptv/master/streams/us_plex.m3u",
    "https://raw.githubusercontent.com/iptv-org/iptv/master/streams/us_pluto.m3u",
    "https://raw.githubusercontent.com/iptv-org/iptv/master/streams/us_samsung.m3u",
    "https://raw.githubusercontent.com/Free-TV/IPTV/master/playlists/playlist_canada.m3u8",
    "https://raw.githubusercontent.com/Free-TV/IPTV/master/playlists/playlist_usa.m3u8",
];

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Sources
    pub sources: Vec<String>,
    pub fetch_timeout_ms: u64,

    // Cache
    pub catalog_cache_ttl_ms: u64,

    // Verification
    pub probe_timeout_ms: u64,
    pub probe_batch_size: usize,
    pub probe_sources_per_channel: usize,
    pub max_catalog_channels: usize,
    pub max_non_premium_probes: usize,
    pub display_limit: usize,

    // Misc
    pub user_agent: String,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Split a comma-separated source list, dropping blank entries
fn parse_sources(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let sources = env::var("IPTV_SOURCES")
            .map(|raw| parse_sources(&raw))
            .unwrap_or_else(|_| DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect());

        Self {
            port: env_or("PORT", 3001),

            sources,
            fetch_timeout_ms: env_or("FETCH_TIMEOUT_MS", 30_000),

            // Short TTL: liveness is a point-in-time answer
            catalog_cache_ttl_ms: env_or("CATALOG_CACHE_TTL_MS", 60_000),

            probe_timeout_ms: env_or("PROBE_TIMEOUT_MS", 3_500),
            probe_batch_size: env_or("PROBE_BATCH_SIZE", 10),
            probe_sources_per_channel: env_or("PROBE_SOURCES_PER_CHANNEL", 4),
            max_catalog_channels: env_or("MAX_CATALOG_CHANNELS", 300),
            max_non_premium_probes: env_or("MAX_NON_PREMIUM_PROBES", 200),
            display_limit: env_or("DISPLAY_LIMIT", 200),

            // Some stream origins reject clients without a browser-like UA
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| "Mozilla/5.0".to_string()),
        }
    }
}
