mod helpers;

use helpers::{count, edge_strength, test_db, write, write_quiet};
use scriptorium::knowledge::relations::{
    related_topics, store_relation, Direction, DEFAULT_STRENGTH, REFERENCED_BY, REFERENCES,
};
use scriptorium::knowledge::KnowledgeError;

#[test]
fn store_and_read_back_relation() {
    let mut conn = test_db();
    let axum = write_quiet(&mut conn, "Axum", "").id;
    let tokio = write_quiet(&mut conn, "Tokio", "").id;

    let rel = store_relation(&conn, axum, tokio, "depends_on", Some(0.8)).unwrap();
    assert!(!rel.updated);
    assert_eq!(rel.strength, 0.8);

    let related = related_topics(&conn, axum, None, Direction::Outgoing, 0.0).unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].topic_id, tokio);
    assert_eq!(related[0].relation_type, "depends_on");
    assert_eq!(related[0].direction, "outgoing");

    // Manual relations get no automatic reverse edge.
    let incoming = related_topics(&conn, axum, None, Direction::Incoming, 0.0).unwrap();
    assert!(incoming.is_empty());
}

#[test]
fn store_relation_is_idempotent_and_reweights() {
    let mut conn = test_db();
    let a = write_quiet(&mut conn, "A topic", "").id;
    let b = write_quiet(&mut conn, "B topic", "").id;

    let first = store_relation(&conn, a, b, "see_also", None).unwrap();
    assert!(!first.updated);
    assert_eq!(first.strength, DEFAULT_STRENGTH);

    let second = store_relation(&conn, a, b, "see_also", Some(0.9)).unwrap();
    assert!(second.updated);

    assert_eq!(count(&conn, "relations"), 1);
    assert_eq!(edge_strength(&conn, a, b, "see_also"), Some(0.9));
}

#[test]
fn store_relation_rejects_bad_input() {
    let mut conn = test_db();
    let a = write_quiet(&mut conn, "A topic", "").id;
    let b = write_quiet(&mut conn, "B topic", "").id;

    let err = store_relation(&conn, a, a, "see_also", None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<KnowledgeError>(),
        Some(KnowledgeError::SelfRelation(_))
    ));

    for bad in [-0.1, 1.5, f64::NAN] {
        let err = store_relation(&conn, a, b, "see_also", Some(bad)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KnowledgeError>(),
            Some(KnowledgeError::InvalidStrength(_))
        ));
    }

    let err = store_relation(&conn, a, b, "   ", None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<KnowledgeError>(),
        Some(KnowledgeError::EmptyRelationType)
    ));

    let err = store_relation(&conn, a, 9999, "see_also", None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<KnowledgeError>(),
        Some(KnowledgeError::TopicNotFound(_))
    ));

    assert_eq!(count(&conn, "relations"), 0);
}

#[test]
fn related_topics_orders_and_filters() {
    let mut conn = test_db();
    let rust = write_quiet(&mut conn, "Rust", "").id;
    let go = write_quiet(&mut conn, "Go", "").id;
    let guide = write(&mut conn, "Guide", None, "Compare [Rust](r) with Go.").id;

    let out = related_topics(&conn, guide, None, Direction::Outgoing, 0.0).unwrap();
    let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Rust", "Go"]);
    assert_eq!(out[0].strength, 1.0);
    assert_eq!(out[1].strength, 0.9);

    let strong = related_topics(&conn, guide, None, Direction::Outgoing, 0.95).unwrap();
    assert_eq!(strong.len(), 1);

    let incoming = related_topics(&conn, rust, Some(REFERENCED_BY), Direction::Outgoing, 0.0)
        .unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].topic_id, guide);

    let both = related_topics(&conn, go, None, Direction::Both, 0.0).unwrap();
    assert_eq!(both.len(), 2);
    assert!(both.iter().any(|r| r.direction == "incoming" && r.relation_type == REFERENCES));
    assert!(both.iter().any(|r| r.direction == "outgoing" && r.relation_type == REFERENCED_BY));
}

#[test]
fn deleting_a_topic_row_cascades_to_relations() {
    let mut conn = test_db();
    write_quiet(&mut conn, "Rust", "");
    let guide = write(&mut conn, "Guide", None, "All about Rust.").id;
    assert_eq!(count(&conn, "relations"), 2);

    conn.execute("DELETE FROM topics WHERE id = ?1", [guide]).unwrap();
    assert_eq!(count(&conn, "relations"), 0);
}

#[test]
fn direction_parses_aliases() {
    assert_eq!("out".parse::<Direction>().unwrap(), Direction::Outgoing);
    assert_eq!("incoming".parse::<Direction>().unwrap(), Direction::Incoming);
    assert_eq!("both".parse::<Direction>().unwrap(), Direction::Both);
    assert!("sideways".parse::<Direction>().is_err());
}
