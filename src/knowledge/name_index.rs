//! Topic name dictionary used for mention scanning.
//!
//! [`NameIndex`] holds a de-duplicated, length-ordered snapshot of topic names.
//! [`list_all_topic_names`] and [`find_topic_id_by_slug_or_name`] are the storage
//! lookups that feed and resolve it.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};

use super::slugify;

/// One dictionary entry with its pre-folded forms.
#[derive(Debug, Clone)]
pub struct IndexedName {
    /// The name as first seen.
    pub name: String,
    /// Lowercased characters, used by the exact pass.
    pub(crate) folded: Vec<char>,
    /// Lowercased characters with whitespace removed, used by the fuzzy pass.
    pub(crate) compact: Vec<char>,
}

/// Snapshot of known topic names, longest first.
///
/// Names that differ only by case collapse to one entry (first spelling wins).
/// Ordering is by descending character count, ties broken alphabetically on the
/// folded form, so "React Native" is always tried before "React".
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    entries: Vec<IndexedName>,
    by_folded: HashMap<String, usize>,
}

/// Lowercase a string character by character.
///
/// This is Unicode lowercasing, not full case folding: `ß` and `SS` stay distinct.
/// `İ` is the one special case and folds to a plain `i` instead of `i` plus a
/// combining dot, so "İstanbul" matches "istanbul".
pub(crate) fn fold(s: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\u{130}' => out.push('i'),
            _ => out.extend(ch.to_lowercase()),
        }
    }
    out
}

impl NameIndex {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();

        for raw in names {
            let name = raw.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let folded = fold(name);
            let key: String = folded.iter().collect();
            if !seen.insert(key) {
                continue;
            }
            let compact = folded.iter().copied().filter(|c| !c.is_whitespace()).collect();
            entries.push(IndexedName {
                name: name.to_string(),
                folded,
                compact,
            });
        }

        entries.sort_by(|a, b| {
            b.folded
                .len()
                .cmp(&a.folded.len())
                .then_with(|| a.folded.cmp(&b.folded))
        });

        let by_folded = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.folded.iter().collect::<String>(), i))
            .collect();

        Self { entries, by_folded }
    }

    /// Load the full current name index from storage.
    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self::new(list_all_topic_names(conn)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in matching order (longest first).
    pub fn iter(&self) -> impl Iterator<Item = &IndexedName> {
        self.entries.iter()
    }

    /// Names in matching order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Position of a name in matching order, compared case-insensitively.
    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        let key: String = fold(name.trim()).into_iter().collect();
        self.by_folded.get(&key).copied()
    }

    pub(crate) fn entry(&self, position: usize) -> &IndexedName {
        &self.entries[position]
    }
}

/// Every topic name in storage, active or not.
pub fn list_all_topic_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM topics ORDER BY id")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Resolve a mention to a topic id.
///
/// A case-insensitive name match is preferred over a slug match; among equals the
/// oldest topic wins.
pub fn find_topic_id_by_slug_or_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let name = name.trim();
    let slug = slugify(name);
    let id = conn
        .query_row(
            "SELECT id FROM topics \
             WHERE name = ?1 COLLATE NOCASE OR (slug = ?2 AND ?2 <> '') \
             ORDER BY (name = ?1 COLLATE NOCASE) DESC, id ASC \
             LIMIT 1",
            params![name, slug],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(id)
}
