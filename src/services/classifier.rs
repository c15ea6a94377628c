use url::Url;

use crate::models::Category;

/// Keyword table for categories. Order is significant: first match wins.
pub const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::News,
        &[
            "news", "bbc news", "cnn", "msnbc", "reuters", "bloomberg", "cnbc", "al jazeera",
            "sky news", "citynews", "cbc news",
        ],
    ),
    (
        Category::Sports,
        &[
            "sports", "espn", "tsn", "stadium", "fifa", "f1", "golf", "football", "nba", "ufc",
            "fight",
        ],
    ),
    (
        Category::Movies,
        &["movie", "hbo", "amc", "cinema", "film", "star movies", "paramount"],
    ),
    (
        Category::Documentary,
        &[
            "discovery", "history", "nasa", "national geographic", "nat geo", "animal planet",
            "science", "nature", "curiosity",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "entertainment", "comedy", "mtv", "tnt", "tbs", "abc", "cbs", "nbc", "fox", "bbc",
            "itv", "channel 4", "channel 5", "hgtv", "food",
        ],
    ),
    (
        Category::Kids,
        &["kids", "nick", "disney", "cartoon", "cbeebies", "pop", "boing", "baby"],
    ),
    (
        Category::Music,
        &["music", "mtv", "v2beat", "stingray", "concert"],
    ),
];

/// Language markers that veto a channel when found in any metadata field
pub const FOREIGN_KEYWORDS: &[&str] = &[
    "pashto", "persian", "iran", "farsi", "arabic", "urdu", "bengali", "tamil", "punjabi",
    "turkish", "hindi", "afghan", "espanol", "spanish", "norsk", "polonia",
];

/// Logo host suffixes that veto a channel
pub const FOREIGN_TLDS: &[&str] = &[
    ".ir", ".pk", ".af", ".tr", ".sa", ".ae", ".eg", ".in", ".ru", ".vn", ".cn", ".bd", ".il",
    ".br", ".it", ".de", ".fr", ".es",
];

/// Prefixes that make a `.@` tvg-id suffix acceptable (`.@us`, `.@usa`, `.@eng`)
const ALLOWED_ID_SUFFIXES: &[&str] = &["us", "uk", "ca", "en", "com", "org", "net", "edu", "int"];

/// Regional feed markers that veto a tvg-id outright
const FOREIGN_ID_MARKERS: &[&str] = &[".ir@", ".pk@", ".tr@"];

/// Top-tier networks that get priority in filtering and ordering
pub const PREMIUM_KEYWORDS: &[&str] = &[
    "cnn", "bbc", "hbo", "discovery", "history", "star", "espn", "tsn", "abc", "nbc", "cbs", "fox",
];

/// Classifier verdict for a channel that passed the language veto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub is_premium: bool,
}

/// Content classifier for aggregated channels
pub struct ContentClassifier;

impl ContentClassifier {
    /// Full classification; `None` means the channel is vetoed as foreign-language
    pub fn classify(
        name: &str,
        source_category: Option<&str>,
        logo: Option<&str>,
        external_id: Option<&str>,
        language: Option<&str>,
    ) -> Option<Classification> {
        // Language veto runs first; a vetoed channel gets no category at all
        if Self::is_foreign(name, logo, source_category, external_id, language) {
            return None;
        }

        Some(Classification {
            category: Self::category(name, source_category),
            is_premium: Self::is_premium(name, logo, external_id),
        })
    }

    /// Heuristic language veto over every piece of metadata we have
    pub fn is_foreign(
        name: &str,
        logo: Option<&str>,
        source_category: Option<&str>,
        external_id: Option<&str>,
        language: Option<&str>,
    ) -> bool {
        let logo = logo.unwrap_or_default().to_lowercase();
        let tvg_id = external_id.unwrap_or_default().to_lowercase();

        let fields = [
            name.to_lowercase(),
            logo.clone(),
            tvg_id.clone(),
            source_category.unwrap_or_default().to_lowercase(),
            language.unwrap_or_default().to_lowercase(),
        ];
        if FOREIGN_KEYWORDS
            .iter()
            .any(|kw| fields.iter().any(|field| field.contains(kw)))
        {
            return true;
        }

        Self::has_foreign_logo_host(&logo) || Self::has_foreign_id_suffix(&tvg_id)
    }

    fn has_foreign_logo_host(logo: &str) -> bool {
        if !logo.starts_with("http") {
            return false;
        }

        Url::parse(logo)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .map(|host| FOREIGN_TLDS.iter().any(|tld| host.ends_with(tld)))
            .unwrap_or(false)
    }

    /// `xxx.@es`-style suffix not starting with an allowed token, or a known
    /// regional marker
    fn has_foreign_id_suffix(tvg_id: &str) -> bool {
        if FOREIGN_ID_MARKERS.iter().any(|m| tvg_id.contains(m)) {
            return true;
        }

        match tvg_id.rfind(".@") {
            Some(idx) => {
                let suffix = &tvg_id[idx + 2..];
                (2..=3).contains(&suffix.len())
                    && suffix.chars().all(|c| c.is_ascii_lowercase())
                    && !ALLOWED_ID_SUFFIXES.iter().any(|a| suffix.starts_with(a))
            }
            None => false,
        }
    }

    /// First matching category for the name or declared group; `General` otherwise
    pub fn category(name: &str, source_category: Option<&str>) -> Category {
        let name = name.to_lowercase();
        let group = source_category.unwrap_or_default().to_lowercase();

        CATEGORY_RULES
            .iter()
            .find(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|kw| name.contains(kw) || group.contains(kw))
            })
            .map(|(category, _)| *category)
            .unwrap_or_default()
    }

    /// Well-known network that is not vetoed by the language heuristic
    pub fn is_premium(name: &str, logo: Option<&str>, external_id: Option<&str>) -> bool {
        if Self::is_foreign(name, logo, None, external_id, None) {
            return false;
        }

        let name = name.to_lowercase();
        PREMIUM_KEYWORDS.iter().any(|kw| name.contains(kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_keyword_vetoes_regardless_of_category() {
        assert!(ContentClassifier::classify("Persian Sports", Some("Sports"), None, None, None).is_none());
        assert!(ContentClassifier::classify("ESPN", Some("Arabic"), None, None, None).is_none());
        assert!(ContentClassifier::classify("CNN", None, Some("http://logo.test/hindi/cnn.png"), None, None).is_none());
        assert!(ContentClassifier::classify("Channel", None, None, Some("IranTV.us"), None).is_none());
        assert!(ContentClassifier::classify("Cine", None, None, None, Some("Spanish")).is_none());
    }

    #[test]
    fn test_foreign_logo_tld() {
        assert!(ContentClassifier::is_foreign("Kanal", Some("https://static.example.tr/logo.png"), None, None, None));
        assert!(ContentClassifier::is_foreign("Kanal", Some("https://cdn.example.de/logo.png"), None, None, None));
        assert!(!ContentClassifier::is_foreign("Kanal", Some("https://i.imgur.com/logo.png"), None, None, None));
        // Not a URL: the host check is skipped
        assert!(!ContentClassifier::is_foreign("Kanal", Some("logo.de"), None, None, None));
    }

    #[test]
    fn test_foreign_id_suffix() {
        assert!(ContentClassifier::has_foreign_id_suffix("channel.@es"));
        assert!(ContentClassifier::has_foreign_id_suffix("gem.ir@sd"));
        assert!(ContentClassifier::has_foreign_id_suffix("kanal.tr@hd"));
        assert!(!ContentClassifier::has_foreign_id_suffix("channel.@us"));
        assert!(!ContentClassifier::has_foreign_id_suffix("channel.@com"));
        // Allowed tokens are prefixes, not whole suffixes
        assert!(!ContentClassifier::has_foreign_id_suffix("channel.@usa"));
        assert!(!ContentClassifier::has_foreign_id_suffix("channel.@eng"));
        assert!(!ContentClassifier::has_foreign_id_suffix("channel.@ukr"));
        assert!(!ContentClassifier::has_foreign_id_suffix("channel.@can"));
        assert!(ContentClassifier::has_foreign_id_suffix("channel.@fr"));
        assert!(!ContentClassifier::has_foreign_id_suffix("bbcone.uk@hd"));
        assert!(!ContentClassifier::has_foreign_id_suffix("cnn.us"));
    }

    #[test]
    fn test_category_first_match() {
        assert_eq!(ContentClassifier::category("BBC NEWS", None), Category::News);
        assert_eq!(ContentClassifier::category("ESPN", None), Category::Sports);
        assert_eq!(ContentClassifier::category("HBO", None), Category::Movies);
        assert_eq!(ContentClassifier::category("Nat Geo Wild", None), Category::Documentary);
        assert_eq!(ContentClassifier::category("BBC ONE", None), Category::Entertainment);
        assert_eq!(ContentClassifier::category("Cartoon Classics", None), Category::Kids);
        assert_eq!(ContentClassifier::category("Stingray Hits", None), Category::Music);
        // MTV is listed under Entertainment before Music
        assert_eq!(ContentClassifier::category("MTV", None), Category::Entertainment);
    }

    #[test]
    fn test_category_uses_source_group() {
        assert_eq!(ContentClassifier::category("Channel 9", Some("Sports")), Category::Sports);
    }

    #[test]
    fn test_category_is_total() {
        assert_eq!(ContentClassifier::category("Weather Channel", None), Category::General);
        assert_eq!(ContentClassifier::category("", None), Category::General);
    }

    #[test]
    fn test_premium() {
        assert!(ContentClassifier::is_premium("ESPN", None, None));
        assert!(ContentClassifier::is_premium("BBC ONE", None, None));
        assert!(!ContentClassifier::is_premium("Weather Channel", None, None));
        assert!(!ContentClassifier::is_premium("BBC Persian", None, None));
        assert!(!ContentClassifier::is_premium("CNN", Some("https://logo.example.ru/cnn.png"), None));
    }

    #[test]
    fn test_classify_accepts_english_channel() {
        let verdict = ContentClassifier::classify(
            "ESPN",
            Some("Sports"),
            Some("https://i.imgur.com/espn.png"),
            Some("ESPN.us"),
            Some("English"),
        );

        assert_eq!(
            verdict,
            Some(Classification {
                category: Category::Sports,
                is_premium: true,
            })
        );
    }
}
