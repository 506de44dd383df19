//! Topic relationship graph.
//!
//! Edges are directed `(source, target, type)` triples with a strength in `[0, 1]`.
//! [`upsert_edge`] is the single write primitive: re-inserting a triple replaces
//! its strength. [`apply_references`] turns detected mentions into a `references`
//! edge plus a discounted `referenced_by` edge.

use anyhow::{bail, Result};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashSet;

use super::name_index::{find_topic_id_by_slug_or_name, fold, list_all_topic_names, NameIndex};
use super::references::{Mention, ReferenceDetector};
use super::topics::get_topic_by_id;
use super::types::Relation;
use super::{now, KnowledgeError};

pub const REFERENCES: &str = "references";
pub const REFERENCED_BY: &str = "referenced_by";

/// Being referenced is a weaker signal than referencing.
pub const REVERSE_DISCOUNT: f64 = 0.7;

/// Strength used when a manual relation does not specify one.
pub const DEFAULT_STRENGTH: f64 = 0.5;

/// Storage capabilities the cross-reference protocol needs.
///
/// Implemented for [`Connection`] (and so for a `Transaction` via deref); tests can
/// substitute an in-memory fake.
pub trait ReferenceStore {
    /// Every known topic name.
    fn topic_names(&self) -> Result<Vec<String>>;

    /// Resolve a mentioned name to a topic id.
    fn resolve_topic(&self, name: &str) -> Result<Option<i64>>;

    /// Insert the edge, or replace its strength if the triple exists.
    ///
    /// `strength` must already be within `[0, 1]`.
    fn upsert_edge(&self, source_id: i64, target_id: i64, relation_type: &str, strength: f64)
        -> Result<()>;
}

impl ReferenceStore for Connection {
    fn topic_names(&self) -> Result<Vec<String>> {
        list_all_topic_names(self)
    }

    fn resolve_topic(&self, name: &str) -> Result<Option<i64>> {
        find_topic_id_by_slug_or_name(self, name)
    }

    fn upsert_edge(
        &self,
        source_id: i64,
        target_id: i64,
        relation_type: &str,
        strength: f64,
    ) -> Result<()> {
        upsert_edge(self, source_id, target_id, relation_type, strength)
    }
}

/// Native upsert on the `(source_id, target_id, relation_type)` unique key.
pub fn upsert_edge(
    conn: &Connection,
    source_id: i64,
    target_id: i64,
    relation_type: &str,
    strength: f64,
) -> Result<()> {
    let now = now();
    conn.execute(
        "INSERT INTO relations (source_id, target_id, relation_type, strength, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5) \
         ON CONFLICT(source_id, target_id, relation_type) \
         DO UPDATE SET strength = excluded.strength, updated_at = excluded.updated_at",
        params![source_id, target_id, relation_type, strength, now],
    )?;
    Ok(())
}

/// An edge pair written for one mention.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedReference {
    pub target_id: i64,
    pub name: String,
    /// Strength of the `references` edge.
    pub confidence: f64,
    /// Strength of the `referenced_by` edge.
    pub reverse_strength: f64,
}

/// Write forward and reverse edges for each resolvable mention.
///
/// Mentions of `topic_name` itself are dropped before resolution, so a topic that
/// shares its name with one in another category never links to it. Mentions that
/// resolve to no topic or to `topic_id` are skipped too. When two names resolve to
/// the same topic, the first (strongest) one wins, so callers should pass mentions
/// in the order the detector returns them.
pub fn apply_references<S: ReferenceStore + ?Sized>(
    store: &S,
    topic_id: i64,
    topic_name: &str,
    mentions: &[Mention],
) -> Result<Vec<AppliedReference>> {
    let mut applied = Vec::new();
    let mut linked: HashSet<i64> = HashSet::new();
    let own_name = fold(topic_name.trim());

    for mention in mentions {
        if fold(mention.name.trim()) == own_name {
            tracing::debug!(topic_id, name = %mention.name, "skipping mention of own name");
            continue;
        }
        let Some(target_id) = store.resolve_topic(&mention.name)? else {
            tracing::debug!(name = %mention.name, "mention does not resolve to a topic");
            continue;
        };
        if target_id == topic_id {
            tracing::debug!(topic_id, name = %mention.name, "skipping self-reference");
            continue;
        }
        if !linked.insert(target_id) {
            continue;
        }

        let reverse_strength = mention.confidence * REVERSE_DISCOUNT;
        store.upsert_edge(topic_id, target_id, REFERENCES, mention.confidence)?;
        store.upsert_edge(target_id, topic_id, REFERENCED_BY, reverse_strength)?;

        applied.push(AppliedReference {
            target_id,
            name: mention.name.clone(),
            confidence: mention.confidence,
            reverse_strength,
        });
    }

    Ok(applied)
}

/// Full cross-reference pass for one content write: refresh the name index,
/// detect mentions, and apply edges.
pub fn cross_reference<S: ReferenceStore + ?Sized>(
    store: &S,
    detector: &ReferenceDetector,
    topic_id: i64,
    topic_name: &str,
    content: &str,
) -> Result<Vec<AppliedReference>> {
    let index = NameIndex::new(store.topic_names()?);
    let mentions = detector.detect(content, &index);
    let applied = apply_references(store, topic_id, topic_name, &mentions)?;

    tracing::debug!(
        topic_id,
        names = index.len(),
        mentions = mentions.len(),
        edges = applied.len(),
        "cross-reference pass complete"
    );
    Ok(applied)
}

/// Result returned from a manual store_relation operation.
#[derive(Debug, Serialize)]
pub struct StoreRelationResult {
    pub source_id: i64,
    pub target_id: i64,
    pub relation_type: String,
    pub strength: f64,
    /// `true` if the triple already existed and its strength was replaced.
    pub updated: bool,
}

/// Create or update a relation supplied directly by a caller. No detection runs.
///
/// Both topics must exist and differ; strength defaults to [`DEFAULT_STRENGTH`] and
/// must lie within `[0, 1]`.
pub fn store_relation(
    conn: &Connection,
    source_id: i64,
    target_id: i64,
    relation_type: &str,
    strength: Option<f64>,
) -> Result<StoreRelationResult> {
    let relation_type = relation_type.trim();
    if relation_type.is_empty() {
        bail!(KnowledgeError::EmptyRelationType);
    }

    let strength = strength.unwrap_or(DEFAULT_STRENGTH);
    if !(0.0..=1.0).contains(&strength) {
        bail!(KnowledgeError::InvalidStrength(strength));
    }

    if source_id == target_id {
        bail!(KnowledgeError::SelfRelation(source_id));
    }

    get_topic_by_id(conn, source_id)?;
    get_topic_by_id(conn, target_id)?;

    let updated: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM relations \
         WHERE source_id = ?1 AND target_id = ?2 AND relation_type = ?3",
        params![source_id, target_id, relation_type],
        |row| row.get(0),
    )?;

    upsert_edge(conn, source_id, target_id, relation_type, strength)?;

    tracing::info!(
        source_id,
        target_id,
        relation_type,
        strength,
        updated,
        "relation stored"
    );

    Ok(StoreRelationResult {
        source_id,
        target_id,
        relation_type: relation_type.to_string(),
        strength,
        updated,
    })
}

/// Which edges [`related_topics`] follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outgoing" | "out" => Ok(Self::Outgoing),
            "incoming" | "in" => Ok(Self::Incoming),
            "both" => Ok(Self::Both),
            _ => Err(format!("unknown direction: {s}")),
        }
    }
}

/// One neighbour of a topic in the graph.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedTopic {
    pub topic_id: i64,
    pub name: String,
    pub slug: String,
    pub relation_type: String,
    pub strength: f64,
    /// `"outgoing"` when the queried topic is the source, `"incoming"` otherwise.
    pub direction: &'static str,
}

/// Neighbours of `topic_id`, strongest first.
pub fn related_topics(
    conn: &Connection,
    topic_id: i64,
    relation_type: Option<&str>,
    direction: Direction,
    min_strength: f64,
) -> Result<Vec<RelatedTopic>> {
    get_topic_by_id(conn, topic_id)?;

    let mut related = Vec::new();
    if matches!(direction, Direction::Outgoing | Direction::Both) {
        related.extend(neighbours(conn, topic_id, relation_type, min_strength, true)?);
    }
    if matches!(direction, Direction::Incoming | Direction::Both) {
        related.extend(neighbours(conn, topic_id, relation_type, min_strength, false)?);
    }

    related.sort_by(|a, b| {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(related)
}

fn neighbours(
    conn: &Connection,
    topic_id: i64,
    relation_type: Option<&str>,
    min_strength: f64,
    outgoing: bool,
) -> Result<Vec<RelatedTopic>> {
    let (anchor, other, label) = if outgoing {
        ("source_id", "target_id", "outgoing")
    } else {
        ("target_id", "source_id", "incoming")
    };
    let sql = format!(
        "SELECT t.id, t.name, t.slug, r.relation_type, r.strength \
         FROM relations r JOIN topics t ON t.id = r.{other} \
         WHERE r.{anchor} = ?1 AND r.strength >= ?2 AND (?3 IS NULL OR r.relation_type = ?3)"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![topic_id, min_strength, relation_type], |row| {
            Ok(RelatedTopic {
                topic_id: row.get(0)?,
                name: row.get(1)?,
                slug: row.get(2)?,
                relation_type: row.get(3)?,
                strength: row.get(4)?,
                direction: label,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// All edges, oldest first.
pub fn list_relations(conn: &Connection) -> Result<Vec<Relation>> {
    let mut stmt = conn.prepare(
        "SELECT id, source_id, target_id, relation_type, strength, created_at, updated_at \
         FROM relations ORDER BY id",
    )?;
    let relations = stmt
        .query_map([], |row| {
            Ok(Relation {
                id: row.get(0)?,
                source_id: row.get(1)?,
                target_id: row.get(2)?,
                relation_type: row.get(3)?,
                strength: row.get(4)?,
                created_at: row.get(5)?,
                updated_at: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(relations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::knowledge::references::MatchKind;
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn insert_topic(conn: &Connection, name: &str) -> i64 {
        conn.execute(
            "INSERT INTO topics (name, slug, created_at, updated_at) VALUES (?1, ?2, 'now', 'now')",
            params![name, crate::knowledge::slugify(name)],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn edge_strength(conn: &Connection, source: i64, target: i64, kind: &str) -> Option<f64> {
        conn.query_row(
            "SELECT strength FROM relations WHERE source_id = ?1 AND target_id = ?2 AND relation_type = ?3",
            params![source, target, kind],
            |row| row.get(0),
        )
        .ok()
    }

    fn mention(name: &str, kind: MatchKind) -> Mention {
        Mention {
            name: name.to_string(),
            confidence: kind.confidence(),
            kind,
        }
    }

    /// In-memory stand-in for the topic and relation tables.
    #[derive(Default)]
    struct FakeStore {
        topics: HashMap<String, i64>,
        edges: RefCell<HashMap<(i64, i64, String), f64>>,
        fail_upserts: bool,
    }

    impl ReferenceStore for FakeStore {
        fn topic_names(&self) -> Result<Vec<String>> {
            Ok(self.topics.keys().cloned().collect())
        }

        fn resolve_topic(&self, name: &str) -> Result<Option<i64>> {
            Ok(self
                .topics
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, id)| *id))
        }

        fn upsert_edge(&self, s: i64, t: i64, kind: &str, strength: f64) -> Result<()> {
            if self.fail_upserts {
                bail!("disk full");
            }
            self.edges.borrow_mut().insert((s, t, kind.to_string()), strength);
            Ok(())
        }
    }

    fn fake(topics: &[(&str, i64)]) -> FakeStore {
        FakeStore {
            topics: topics.iter().map(|(n, id)| (n.to_string(), *id)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn upsert_is_idempotent() {
        let conn = db::open_in_memory().unwrap();
        let a = insert_topic(&conn, "A");
        let b = insert_topic(&conn, "B");

        upsert_edge(&conn, a, b, "related", 0.4).unwrap();
        upsert_edge(&conn, a, b, "related", 0.4).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM relations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(edge_strength(&conn, a, b, "related"), Some(0.4));
    }

    #[test]
    fn upsert_replaces_strength() {
        let conn = db::open_in_memory().unwrap();
        let a = insert_topic(&conn, "A");
        let b = insert_topic(&conn, "B");

        upsert_edge(&conn, a, b, "related", 0.9).unwrap();
        upsert_edge(&conn, a, b, "related", 0.2).unwrap();

        assert_eq!(edge_strength(&conn, a, b, "related"), Some(0.2));
    }

    #[test]
    fn types_are_distinct_edges() {
        let conn = db::open_in_memory().unwrap();
        let a = insert_topic(&conn, "A");
        let b = insert_topic(&conn, "B");

        upsert_edge(&conn, a, b, REFERENCES, 0.9).unwrap();
        upsert_edge(&conn, a, b, REFERENCED_BY, 0.3).unwrap();

        assert_eq!(edge_strength(&conn, a, b, REFERENCES), Some(0.9));
        assert_eq!(edge_strength(&conn, a, b, REFERENCED_BY), Some(0.3));
    }

    #[test]
    fn apply_writes_forward_and_discounted_reverse() {
        let store = fake(&[("Foo", 1), ("Bar", 2)]);
        let applied =
            apply_references(&store, 1, "Foo", &[mention("Bar", MatchKind::Exact)]).unwrap();

        assert_eq!(applied.len(), 1);
        let edges = store.edges.borrow();
        assert_eq!(edges[&(1, 2, REFERENCES.to_string())], 0.9);
        assert_eq!(edges[&(2, 1, REFERENCED_BY.to_string())], 0.9 * 0.7);
    }

    #[test]
    fn apply_skips_self_and_unresolved() {
        let store = fake(&[("Foo", 1)]);
        let applied = apply_references(
            &store,
            1,
            "Foo",
            &[mention("Foo", MatchKind::Exact), mention("Ghost", MatchKind::Link)],
        )
        .unwrap();

        assert!(applied.is_empty());
        assert!(store.edges.borrow().is_empty());
    }

    #[test]
    fn apply_skips_own_name_even_when_it_resolves_elsewhere() {
        // "Intro" resolves to topic 1, but topic 2 is also called "Intro".
        let store = fake(&[("Intro", 1)]);
        let applied =
            apply_references(&store, 2, "intro", &[mention("Intro", MatchKind::Exact)]).unwrap();

        assert!(applied.is_empty());
        assert!(store.edges.borrow().is_empty());
    }

    #[test]
    fn apply_keeps_strongest_mention_per_target() {
        let store = fake(&[("Foo", 1), ("Bar", 2), ("bar", 2)]);
        let applied = apply_references(
            &store,
            1,
            "Foo",
            &[mention("Bar", MatchKind::Link), mention("bar", MatchKind::Fuzzy)],
        )
        .unwrap();

        assert_eq!(applied.len(), 1);
        assert_eq!(store.edges.borrow()[&(1, 2, REFERENCES.to_string())], 1.0);
    }

    #[test]
    fn apply_surfaces_upsert_failure() {
        let mut store = fake(&[("Foo", 1), ("Bar", 2)]);
        store.fail_upserts = true;
        let result = apply_references(&store, 1, "Foo", &[mention("Bar", MatchKind::Exact)]);
        assert!(result.unwrap_err().to_string().contains("disk full"));
    }

    #[test]
    fn cross_reference_against_fake_store() {
        let store = fake(&[("Foo", 1), ("Bar", 2), ("Baz", 3)]);
        let applied = cross_reference(
            &store,
            &ReferenceDetector::default(),
            1,
            "Foo",
            "Foo depends on [Bar](bar.md) and B a z.",
        )
        .unwrap();

        let mut names: Vec<&str> = applied.iter().map(|a| a.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Bar", "Baz"]);
        let edges = store.edges.borrow();
        assert_eq!(edges[&(1, 2, REFERENCES.to_string())], 1.0);
        assert_eq!(edges[&(1, 3, REFERENCES.to_string())], 0.7);
        assert!(!edges.contains_key(&(1, 1, REFERENCES.to_string())));
    }

    #[test]
    fn store_relation_defaults_and_validates() {
        let conn = db::open_in_memory().unwrap();
        let a = insert_topic(&conn, "A");
        let b = insert_topic(&conn, "B");

        let first = store_relation(&conn, a, b, "depends_on", None).unwrap();
        assert_eq!(first.strength, 0.5);
        assert!(!first.updated);

        let second = store_relation(&conn, a, b, "depends_on", Some(0.8)).unwrap();
        assert!(second.updated);
        assert_eq!(edge_strength(&conn, a, b, "depends_on"), Some(0.8));

        let err = store_relation(&conn, a, b, "depends_on", Some(1.5)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KnowledgeError>(),
            Some(KnowledgeError::InvalidStrength(_))
        ));

        let err = store_relation(&conn, a, a, "depends_on", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KnowledgeError>(),
            Some(KnowledgeError::SelfRelation(_))
        ));

        let err = store_relation(&conn, a, 999, "depends_on", None).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn related_topics_follows_direction() {
        let conn = db::open_in_memory().unwrap();
        let a = insert_topic(&conn, "A");
        let b = insert_topic(&conn, "B");
        let c = insert_topic(&conn, "C");

        upsert_edge(&conn, a, b, REFERENCES, 0.9).unwrap();
        upsert_edge(&conn, c, a, REFERENCES, 0.7).unwrap();

        let out = related_topics(&conn, a, None, Direction::Outgoing, 0.0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].topic_id, b);
        assert_eq!(out[0].direction, "outgoing");

        let inc = related_topics(&conn, a, None, Direction::Incoming, 0.0).unwrap();
        assert_eq!(inc.len(), 1);
        assert_eq!(inc[0].topic_id, c);

        let both = related_topics(&conn, a, Some(REFERENCES), Direction::Both, 0.8).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].strength, 0.9);
    }
}
