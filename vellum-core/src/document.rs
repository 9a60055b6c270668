//! The document data model.
//!
//! A [`Document`] is the live editable state: raw markup text plus title and
//! author metadata. It is owned exclusively by the active editing session —
//! there are no concurrent writers. [`PersistedState`] is the single durable
//! snapshot of it, and [`VersionEntry`] is an immutable entry in the bounded
//! version history.

use serde::{Deserialize, Serialize};

/// Reading speed used for the estimated read time, in characters per minute.
const READ_CHARS_PER_MINUTE: usize = 500;

/// The live editable document: raw markup text plus metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Raw markup text — the source of truth for the session.
    pub text: String,
    /// Article title.
    pub title: String,
    /// Article author.
    pub author: String,
}

impl Document {
    /// Create a document from its three fields.
    pub fn new(
        text: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            title: title.into(),
            author: author.into(),
        }
    }

    /// Compute text statistics with a single pass over the content.
    pub fn stats(&self) -> DocumentStats {
        DocumentStats::scan(&self.text)
    }
}

/// The single durable snapshot of the document plus session theme.
///
/// Exactly one instance exists in the store at a time; each commit overwrites
/// it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub text: String,
    pub title: String,
    pub author: String,
    /// Hex-rendered fingerprint of `text + title + author` at commit time.
    pub fingerprint: String,
    /// Active theme name.
    pub theme: String,
}

/// An immutable saved snapshot in the bounded version history.
///
/// Entries are ordered newest-first; the ring holds at most ten and evicts
/// the oldest on overflow (insertion order, not access order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Creation time in milliseconds since the epoch; doubles as the id.
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author: String,
    /// Human-readable creation time, for display only.
    pub display_timestamp: String,
}

/// Statistics over the raw markup text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Non-whitespace character count.
    pub chars: usize,
    /// Non-blank line count.
    pub paragraphs: usize,
    /// Image-markup occurrences (`![..](..)`).
    pub images: usize,
    /// ATX heading lines (`#` through `######`).
    pub headings: usize,
    /// Estimated reading time in minutes, rounded up.
    pub read_minutes: usize,
}

impl DocumentStats {
    /// Scan the text and count characters, paragraphs, images and headings.
    pub fn scan(text: &str) -> Self {
        let chars = text.chars().filter(|c| !c.is_whitespace()).count();

        let mut paragraphs = 0;
        let mut headings = 0;
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            paragraphs += 1;
            if is_heading(trimmed) {
                headings += 1;
            }
        }

        let images = count_image_markup(text);
        let read_minutes = chars.div_ceil(READ_CHARS_PER_MINUTE);

        Self {
            chars,
            paragraphs,
            images,
            headings,
            read_minutes,
        }
    }
}

/// A line is a heading when it starts with 1–6 `#` followed by a space.
fn is_heading(line: &str) -> bool {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    (1..=6).contains(&hashes) && line.as_bytes().get(hashes) == Some(&b' ')
}

/// Count `![..](..)` occurrences without backtracking.
fn count_image_markup(text: &str) -> usize {
    let mut count = 0;
    let mut rest = text;
    while let Some(bang) = rest.find("![") {
        let after = &rest[bang + 2..];
        match after.find(']') {
            Some(close) if after[close + 1..].starts_with('(') => {
                match after[close + 2..].find(')') {
                    Some(paren) => {
                        count += 1;
                        rest = &after[close + 2 + paren + 1..];
                    }
                    None => break,
                }
            }
            Some(close) => rest = &after[close + 1..],
            None => break,
        }
    }
    count
}
