use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::str::Lines;

use crate::models::RawChannelEntry;

const EXTINF_PREFIX: &str = "#EXTINF:";

lazy_static! {
    /// Regex to parse EXTINF attributes (tvg-id="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).unwrap();
}

/// Parsed EXTINF line data, waiting for its URL line
#[derive(Debug, Clone, Default)]
struct ExtinfData {
    attributes: HashMap<String, String>,
    title: String,
}

impl ExtinfData {
    /// Attribute value, treating an empty value as absent
    fn attr(&self, key: &str) -> Option<String> {
        self.attributes
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }

    fn into_entry(self, stream_url: &str) -> RawChannelEntry {
        RawChannelEntry {
            logo_url: self.attr("tvg-logo"),
            source_category: self.attr("group-title"),
            external_id: self.attr("tvg-id"),
            language: self.attr("tvg-language"),
            quality_score: quality_score(&self.title),
            display_name: self.title,
            stream_url: stream_url.to_string(),
        }
    }
}

/// Parse an EXTINF line
/// Format: #EXTINF:-1 tvg-id="..." tvg-logo="..." group-title="...",Title
///
/// The title is whatever follows the last comma. Attributes are looked up
/// independently, so a missing one never invalidates the line.
fn parse_extinf(line: &str) -> Option<ExtinfData> {
    let content = line.strip_prefix(EXTINF_PREFIX)?;

    let (header, title) = match content.rfind(',') {
        Some(idx) => (&content[..idx], content[idx + 1..].trim()),
        None => (content, ""),
    };

    let attributes = ATTR_REGEX
        .captures_iter(header)
        .map(|caps| (caps[1].to_lowercase(), caps[2].to_string()))
        .collect();

    Some(ExtinfData {
        attributes,
        title: title.to_string(),
    })
}

/// Resolution score from keywords in a display name: 100 / 80 / 50 / 0
pub fn quality_score(name: &str) -> u8 {
    let lower = name.to_lowercase();
    if lower.contains("1080p") || lower.contains("fhd") {
        100
    } else if lower.contains("720p") || lower.contains("hd") {
        80
    } else if lower.contains("480p") || lower.contains("sd") {
        50
    } else {
        0
    }
}

/// Lazy iterator over the entries of one playlist document
///
/// Cloning the iterator (or calling [`parse_playlist`] again) restarts
/// parsing from the same position.
#[derive(Debug, Clone)]
pub struct PlaylistEntries<'a> {
    lines: Lines<'a>,
    pending: Option<ExtinfData>,
}

impl<'a> Iterator for PlaylistEntries<'a> {
    type Item = RawChannelEntry;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            let trimmed = line.trim();

            if trimmed.starts_with(EXTINF_PREFIX) {
                // An EXTINF without its URL is dropped when the next one opens
                self.pending = parse_extinf(trimmed);
                continue;
            }

            if trimmed.starts_with("http") {
                if let Some(extinf) = self.pending.take() {
                    return Some(extinf.into_entry(trimmed));
                }
            }

            // Blank lines, #EXTM3U, #EXTVLCOPT and stray text are ignored
        }

        self.pending = None;
        None
    }
}

/// Parse the full text of an extended M3U playlist
///
/// Malformed or truncated input never fails; it yields fewer entries.
pub fn parse_playlist(text: &str) -> PlaylistEntries<'_> {
    PlaylistEntries {
        lines: text.lines(),
        pending: None,
    }
}
