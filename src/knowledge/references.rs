//! Cross-reference detection.
//!
//! Scans a block of text against a [`NameIndex`] and reports which topics it
//! mentions, each with a confidence score. Three passes run in precedence order:
//!
//! | Pass | Matches | Confidence |
//! |------|---------|------------|
//! | Link | `[Label](target)` whose label equals a name | 1.0 |
//! | Exact | the name as a whole word | 0.9 |
//! | Fuzzy | the name's characters with whitespace gaps, word-bounded | 0.7 |
//!
//! A name recorded by an earlier pass is never revisited, so confidence per name
//! only ever reflects the strongest evidence. The detector is pure: no I/O, no
//! knowledge of which topic the content belongs to.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use super::name_index::{fold, IndexedName, NameIndex};

pub const LINK_CONFIDENCE: f64 = 1.0;
pub const EXACT_CONFIDENCE: f64 = 0.9;
pub const FUZZY_CONFIDENCE: f64 = 0.7;

/// Names longer than this skip the fuzzy pass unless configured otherwise.
pub const DEFAULT_FUZZY_MAX_NAME_LEN: usize = 64;

static MARKDOWN_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(!?)\[([^\]\n]+)\]\(([^)\n]*)\)").expect("valid markdown link regex")
});

/// Which pass produced a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Link,
    Exact,
    Fuzzy,
}

impl MatchKind {
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Link => LINK_CONFIDENCE,
            Self::Exact => EXACT_CONFIDENCE,
            Self::Fuzzy => FUZZY_CONFIDENCE,
        }
    }
}

/// A topic name found in scanned content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mention {
    /// Dictionary spelling of the name, not the spelling found in the text.
    pub name: String,
    pub confidence: f64,
    pub kind: MatchKind,
}

/// Three-pass mention scanner.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceDetector {
    fuzzy_max_name_len: usize,
}

impl Default for ReferenceDetector {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_MAX_NAME_LEN)
    }
}

impl ReferenceDetector {
    pub fn new(fuzzy_max_name_len: usize) -> Self {
        Self { fuzzy_max_name_len }
    }

    /// Detect mentions of indexed names in `content`.
    ///
    /// Returns one mention per matched name, strongest first, then in index order.
    pub fn detect(&self, content: &str, index: &NameIndex) -> Vec<Mention> {
        if content.trim().is_empty() || index.is_empty() {
            return Vec::new();
        }

        let mut found: HashMap<usize, MatchKind> = HashMap::new();

        for label in link_labels(content) {
            if let Some(pos) = index.position(label) {
                found.entry(pos).or_insert(MatchKind::Link);
            }
        }

        let haystack = fold(content);

        for (pos, entry) in index.iter().enumerate() {
            if found.contains_key(&pos) {
                continue;
            }
            if contains_word(&haystack, &entry.folded) {
                found.insert(pos, MatchKind::Exact);
            }
        }

        for (pos, entry) in index.iter().enumerate() {
            if found.contains_key(&pos) || !self.fuzzy_eligible(entry) {
                continue;
            }
            if contains_spaced(&haystack, &entry.compact) {
                found.insert(pos, MatchKind::Fuzzy);
            }
        }

        let mut ordered: Vec<(usize, MatchKind)> = found.into_iter().collect();
        ordered.sort_by(|(pa, ka), (pb, kb)| {
            kb.confidence()
                .total_cmp(&ka.confidence())
                .then_with(|| pa.cmp(pb))
        });

        ordered
            .into_iter()
            .map(|(pos, kind)| Mention {
                name: index.entry(pos).name.clone(),
                confidence: kind.confidence(),
                kind,
            })
            .collect()
    }

    fn fuzzy_eligible(&self, entry: &IndexedName) -> bool {
        !entry.compact.is_empty() && entry.compact.len() <= self.fuzzy_max_name_len
    }
}

/// Convenience wrapper: build an index from `names` and run the default detector.
pub fn detect<S: AsRef<str>>(content: &str, names: &[S]) -> Vec<Mention> {
    ReferenceDetector::default().detect(content, &NameIndex::new(names))
}

/// Labels of every non-image markdown link, trimmed.
fn link_labels(content: &str) -> impl Iterator<Item = &str> {
    MARKDOWN_LINK_RE.captures_iter(content).filter_map(|caps| {
        if caps.get(1).is_some_and(|m| m.as_str() == "!") {
            return None;
        }
        caps.get(2).map(|m| m.as_str().trim())
    })
}

/// True when `at` is a string edge or a non-alphanumeric character.
fn is_boundary(haystack: &[char], at: Option<usize>) -> bool {
    match at {
        Some(i) => haystack.get(i).is_none_or(|c| !c.is_alphanumeric()),
        None => true,
    }
}

/// Whole-word occurrence of `needle` in `haystack`.
fn contains_word(haystack: &[char], needle: &[char]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .any(|(start, window)| {
            window == needle
                && is_boundary(haystack, start.checked_sub(1))
                && is_boundary(haystack, Some(start + needle.len()))
        })
}

/// Occurrence of `needle` with any run of whitespace allowed between consecutive
/// characters, bounded like a whole word. Linear in the haystack per start position.
fn contains_spaced(haystack: &[char], needle: &[char]) -> bool {
    let Some(&first) = needle.first() else {
        return false;
    };

    for start in 0..haystack.len() {
        if haystack[start] != first || !is_boundary(haystack, start.checked_sub(1)) {
            continue;
        }

        let mut at = start + 1;
        let mut matched = 1;
        while matched < needle.len() {
            while at < haystack.len() && haystack[at].is_whitespace() {
                at += 1;
            }
            if at < haystack.len() && haystack[at] == needle[matched] {
                at += 1;
                matched += 1;
            } else {
                break;
            }
        }

        if matched == needle.len() && is_boundary(haystack, Some(at)) {
            return true;
        }
    }
    false
}
