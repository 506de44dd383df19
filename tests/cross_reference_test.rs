mod helpers;

use helpers::{count, edge_strength, test_db, try_write, write, write_quiet};
use scriptorium::knowledge::relations::{REFERENCED_BY, REFERENCES, REVERSE_DISCOUNT};
use scriptorium::knowledge::topics::{get_topic_by_id, set_topic_active};

#[test]
fn goroutines_scenario_end_to_end() {
    let mut conn = test_db();
    let go = write_quiet(&mut conn, "Go", "A language.").id;
    let routines = write_quiet(&mut conn, "Go Routines", "Lightweight threads.").id;

    let notes = write(
        &mut conn,
        "Notes",
        None,
        "Goroutines are lightweight. See [Go](http://golang.org) docs. Also G o  R o u t i n e s style works.",
    );

    assert_eq!(notes.references.len(), 2);
    assert_eq!(notes.references[0].name, "Go");
    assert_eq!(notes.references[0].confidence, 1.0);
    assert_eq!(notes.references[1].name, "Go Routines");
    assert_eq!(notes.references[1].confidence, 0.7);

    assert_eq!(edge_strength(&conn, notes.id, go, REFERENCES), Some(1.0));
    assert_eq!(edge_strength(&conn, go, notes.id, REFERENCED_BY), Some(REVERSE_DISCOUNT));
    assert_eq!(edge_strength(&conn, notes.id, routines, REFERENCES), Some(0.7));
    assert_eq!(
        edge_strength(&conn, routines, notes.id, REFERENCED_BY),
        Some(0.7 * REVERSE_DISCOUNT)
    );
    assert_eq!(count(&conn, "relations"), 4);
}

#[test]
fn goroutines_alone_is_not_an_exact_mention_of_go() {
    let mut conn = test_db();
    let go = write_quiet(&mut conn, "Go", "").id;

    let notes = write(&mut conn, "Notes", None, "Goroutines are lightweight.");
    assert!(notes.references.is_empty());
    assert_eq!(edge_strength(&conn, notes.id, go, REFERENCES), None);
}

#[test]
fn reverse_edge_is_discounted_forward_strength() {
    let mut conn = test_db();
    let ts = write_quiet(&mut conn, "TypeScript", "").id;

    let doc = write(&mut conn, "Frontend", None, "We write TypeScript everywhere.");
    let forward = edge_strength(&conn, doc.id, ts, REFERENCES).unwrap();
    let reverse = edge_strength(&conn, ts, doc.id, REFERENCED_BY).unwrap();
    assert_eq!(forward, 0.9);
    assert_eq!(reverse, forward * REVERSE_DISCOUNT);
}

#[test]
fn rewriting_replaces_edge_strength_without_duplicating() {
    let mut conn = test_db();
    let ts = write_quiet(&mut conn, "TypeScript", "").id;

    let doc = write(&mut conn, "Frontend", None, "We write TypeScript everywhere.").id;
    assert_eq!(edge_strength(&conn, doc, ts, REFERENCES), Some(0.9));

    write(&mut conn, "Frontend", None, "See [TypeScript](https://typescriptlang.org).");
    assert_eq!(edge_strength(&conn, doc, ts, REFERENCES), Some(1.0));
    assert_eq!(edge_strength(&conn, ts, doc, REFERENCED_BY), Some(REVERSE_DISCOUNT));

    write(&mut conn, "Frontend", None, "Type Script, spaced out.");
    assert_eq!(edge_strength(&conn, doc, ts, REFERENCES), Some(0.7));

    assert_eq!(count(&conn, "relations"), 2);
}

#[test]
fn topic_never_references_itself() {
    let mut conn = test_db();
    let rust = write(
        &mut conn,
        "Rust",
        None,
        "Rust is a language. See [Rust](https://rust-lang.org). R u s t.",
    );
    assert!(rust.references.is_empty());
    assert_eq!(count(&conn, "relations"), 0);
}

#[test]
fn inactive_topics_remain_reference_targets() {
    let mut conn = test_db();
    let legacy = write_quiet(&mut conn, "Legacy Stack", "").id;
    set_topic_active(&conn, legacy, false).unwrap();

    let doc = write(&mut conn, "Migration Plan", None, "Move off the legacy stack by Q3.");
    assert_eq!(edge_strength(&conn, doc.id, legacy, REFERENCES), Some(0.9));
}

#[test]
fn detection_can_be_switched_off() {
    let mut conn = test_db();
    write_quiet(&mut conn, "Rust", "");
    let doc = try_write(&mut conn, "Notes", None, "All about Rust.", false).unwrap();
    assert!(doc.references.is_empty());
    assert_eq!(count(&conn, "relations"), 0);
}

#[test]
fn mention_resolves_across_categories() {
    let mut conn = test_db();
    let rust = write(&mut conn, "Rust", Some("Languages"), "").id;
    let doc = write(&mut conn, "Cargo", Some("Tooling"), "The Rust build tool.");
    assert_eq!(edge_strength(&conn, doc.id, rust, REFERENCES), Some(0.9));
}

#[test]
fn own_name_in_another_category_is_not_a_reference() {
    let mut conn = test_db();
    let rust_intro = write(&mut conn, "Intro", Some("Rust"), "Start here.").id;
    let go_intro = write(&mut conn, "Intro", Some("Go"), "Intro to Go").id;

    assert_ne!(rust_intro, go_intro);
    assert_eq!(edge_strength(&conn, go_intro, rust_intro, REFERENCES), None);
    assert_eq!(edge_strength(&conn, rust_intro, go_intro, REFERENCED_BY), None);
    assert_eq!(count(&conn, "relations"), 0);
}

#[test]
fn failed_edge_write_rolls_back_the_content_write() {
    let mut conn = test_db();
    let target = write_quiet(&mut conn, "Target", "").id;
    let source = write_quiet(&mut conn, "Source", "original").id;

    conn.execute_batch(
        "CREATE TRIGGER refuse_relations BEFORE INSERT ON relations \
         BEGIN SELECT RAISE(ABORT, 'relations are read-only'); END;",
    )
    .unwrap();

    let err = try_write(&mut conn, "Source", None, "now mentions Target", true);
    assert!(err.is_err());

    let topic = get_topic_by_id(&conn, source).unwrap();
    assert_eq!(topic.content, "original");
    assert_eq!(topic.version, 1);
    assert_eq!(count(&conn, "topic_history"), 0);

    let created = try_write(&mut conn, "Fresh", None, "also mentions Target", true);
    assert!(created.is_err());
    assert_eq!(count(&conn, "topics"), 2);

    // Writes with nothing to link are unaffected.
    try_write(&mut conn, "Source", None, "plain text", true).unwrap();
    assert_eq!(edge_strength(&conn, source, target, REFERENCES), None);
}
