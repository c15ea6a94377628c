//! Channel name normalization and brand folding
//!
//! Regional and resolution variants of a channel ("ABC 7", "FOX 5 News",
//! "BBC One (1080p)") are collapsed to one canonical brand name, which is the
//! merge key used by the aggregator.

use lazy_static::lazy_static;
use lru::LruCache;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Markers of streams that must keep their full name ("CNN International",
/// "BBC World News", "ABC News Live"): folding them would merge distinct feeds.
pub const PROTECTED_MARKERS: &[&str] = &["news live", "news now", "international", "world"];

/// What a matched brand folds to
#[derive(Debug)]
pub enum BrandFold {
    /// The uppercase brand
    Brand,
    /// "BRAND SUBCHANNEL" when the name names a known programming stream
    SubChannel(Regex),
    /// A fixed label when the name contains `marker`
    NetworkFeed {
        marker: &'static str,
        label: &'static str,
    },
}

/// One entry of the ordered brand table
#[derive(Debug)]
pub struct BrandRule {
    pub brand: &'static str,
    pattern: Regex,
    fold: BrandFold,
}

impl BrandRule {
    fn new(brand: &'static str, fold: BrandFold) -> Self {
        // brand followed by a numeral, a word, or a hyphenated qualifier
        let pattern = Regex::new(&format!(
            r"(?i)^{}(\s+\d+|\s+[a-z]+|\s*-\s*[a-z]+)",
            regex::escape(brand)
        ))
        .unwrap();

        Self {
            brand,
            pattern,
            fold,
        }
    }

    /// Canonical name if this rule applies to `name`
    pub fn apply(&self, name: &str) -> Option<String> {
        if !self.pattern.is_match(name) {
            return None;
        }

        let folded = match &self.fold {
            BrandFold::Brand => None,
            BrandFold::SubChannel(sub) => sub.find(name).map(|m| m.as_str().to_uppercase()),
            BrandFold::NetworkFeed { marker, label } => name
                .to_lowercase()
                .contains(*marker)
                .then(|| label.to_string()),
        };

        Some(folded.unwrap_or_else(|| self.brand.to_uppercase()))
    }
}

lazy_static! {
    /// Brand table. Order is significant: the first matching rule wins.
    pub static ref BRAND_RULES: Vec<BrandRule> = vec![
        BrandRule::new("abc", BrandFold::Brand),
        BrandRule::new("nbc", BrandFold::Brand),
        BrandRule::new("cbs", BrandFold::Brand),
        BrandRule::new("fox", BrandFold::Brand),
        BrandRule::new("pbs", BrandFold::Brand),
        BrandRule::new(
            "bbc",
            BrandFold::SubChannel(
                Regex::new(r"(?i)^bbc\s+(one|two|three|four|news|hd|alba|parliament)").unwrap(),
            ),
        ),
        BrandRule::new(
            "cbc",
            BrandFold::NetworkFeed {
                marker: "network",
                label: "CBC News Network",
            },
        ),
        BrandRule::new("itv", BrandFold::Brand),
        BrandRule::new("sky", BrandFold::Brand),
        BrandRule::new("cnn", BrandFold::Brand),
        BrandRule::new("hsn", BrandFold::Brand),
        BrandRule::new("qvc", BrandFold::Brand),
        BrandRule::new("global", BrandFold::Brand),
        BrandRule::new("ctv", BrandFold::Brand),
        BrandRule::new("citynews", BrandFold::Brand),
    ];

    static ref PARENTHESIZED: Regex = Regex::new(r"\([^)]*\)").unwrap();
    static ref BRACKETED: Regex = Regex::new(r"\[[^\]]*\]").unwrap();
    static ref QUALITY_TOKENS: Regex = Regex::new(r"(?i)\b(1080p|720p|fhd|hd|sd)\b").unwrap();
    static ref MULTI_SPACES: Regex = Regex::new(r"\s+").unwrap();

    static ref NAME_CACHE: Mutex<LruCache<String, String>> =
        Mutex::new(LruCache::new(NonZeroUsize::new(10_000).unwrap()));
}

/// Strip tags and quality tokens, collapse whitespace
pub fn clean_name(raw: &str) -> String {
    let result = PARENTHESIZED.replace_all(raw, "");
    let result = BRACKETED.replace_all(&result, "");
    let result = QUALITY_TOKENS.replace_all(&result, "");
    let result = MULTI_SPACES.replace_all(&result, " ");
    result.trim().to_string()
}

pub fn is_protected(name: &str) -> bool {
    let lower = name.to_lowercase();
    PROTECTED_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// First brand rule that folds `name`, if any
pub fn fold_brand(name: &str) -> Option<String> {
    BRAND_RULES.iter().find_map(|rule| rule.apply(name))
}

fn normalize_uncached(raw: &str) -> String {
    let name = clean_name(raw);

    if is_protected(&name) {
        return name;
    }

    fold_brand(&name).unwrap_or(name)
}

/// Canonical brand-level name for a raw display name
///
/// Memoized with an LRU: the same names recur across sources and refreshes.
pub fn normalize_name(raw: &str) -> String {
    if let Ok(mut cache) = NAME_CACHE.lock() {
        if let Some(hit) = cache.get(raw) {
            return hit.clone();
        }
    }

    let canonical = normalize_uncached(raw);

    if let Ok(mut cache) = NAME_CACHE.lock() {
        cache.put(raw.to_string(), canonical.clone());
    }

    canonical
}
